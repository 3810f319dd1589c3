use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum UserRole {
    Participant,
    Organizer,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
}

impl RegisterUser {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(AppError::ValidationError(
                "A valid email address is required".to_string(),
            ));
        }
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "First and last name are required".to_string(),
            ));
        }
        if self.role == Some(UserRole::Admin) {
            return Err(AppError::ValidationError(
                "Cannot self-register with the admin role".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> RegisterUser {
        RegisterUser {
            email: "ama@example.com".to_string(),
            first_name: "Ama".to_string(),
            last_name: "Dossou".to_string(),
            phone: None,
            role: None,
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(registration().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_email() {
        let mut req = registration();
        req.email = "not-an-email".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_rejects_blank_name() {
        let mut req = registration();
        req.first_name = "  ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_rejects_self_assigned_admin() {
        let mut req = registration();
        req.role = Some(UserRole::Admin);
        assert!(req.validate().is_err());
    }
}
