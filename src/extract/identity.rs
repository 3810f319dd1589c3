//! Authenticated-identity extractor.
//!
//! Authentication lives upstream of this service; requests arrive with the
//! resolved identity in the `X-User-Id` header, which is trusted as-is. The
//! extractor loads the matching user row so handlers get the current role.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::models::user::{User, UserRole};
use crate::utils::error::AppError;
use crate::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::AuthError("Authentication required".to_string()))?;

        let user_id = parse_user_id(raw)
            .ok_or_else(|| AppError::AuthError("Malformed identity header".to_string()))?;

        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = $1 AND is_active = TRUE",
        )
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::AuthError("Unknown or inactive user".to_string()))?;

        Ok(AuthUser(user))
    }
}

impl AuthUser {
    pub fn require_role(&self, allowed: &[UserRole]) -> Result<(), AppError> {
        if allowed.contains(&self.0.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Your role is not permitted to perform this action".to_string(),
            ))
        }
    }

    pub fn is_admin(&self) -> bool {
        self.0.role == UserRole::Admin
    }

    /// Admins act on any resource; everyone else only on their own.
    pub fn can_manage(&self, owner_id: Uuid) -> bool {
        self.is_admin() || self.0.id == owner_id
    }
}

fn parse_user_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: UserRole) -> AuthUser {
        let now = Utc::now();
        AuthUser(User {
            id: Uuid::new_v4(),
            email: "kofi@example.com".to_string(),
            first_name: "Kofi".to_string(),
            last_name: "Agossa".to_string(),
            phone: None,
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    #[test]
    fn test_parse_user_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_user_id(&id.to_string()), Some(id));
        assert_eq!(parse_user_id(&format!("  {id}  ")), Some(id));
        assert_eq!(parse_user_id("not-a-uuid"), None);
    }

    #[test]
    fn test_require_role() {
        let organizer = user(UserRole::Organizer);
        assert!(organizer
            .require_role(&[UserRole::Organizer, UserRole::Admin])
            .is_ok());
        assert!(organizer.require_role(&[UserRole::Admin]).is_err());
    }

    #[test]
    fn test_can_manage() {
        let participant = user(UserRole::Participant);
        assert!(participant.can_manage(participant.0.id));
        assert!(!participant.can_manage(Uuid::new_v4()));

        let admin = user(UserRole::Admin);
        assert!(admin.can_manage(Uuid::new_v4()));
    }
}
