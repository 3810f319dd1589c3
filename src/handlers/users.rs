use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::extract::AuthUser;
use crate::models::user::{RegisterUser, User, UserRole};
use crate::utils::error::AppError;
use crate::utils::response::{created, success};
use crate::AppState;

pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUser>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let email = payload.email.trim().to_lowercase();
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.pool)
        .await?;
    if existing.is_some() {
        return Err(AppError::ValidationError(
            "Email is already registered".to_string(),
        ));
    }

    let role = payload.role.unwrap_or(UserRole::Participant);
    let user: User = sqlx::query_as(
        "INSERT INTO users (id, email, first_name, last_name, phone, role)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(payload.first_name.trim())
    .bind(payload.last_name.trim())
    .bind(&payload.phone)
    .bind(role)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(user_id = %user.id, role = ?user.role, "user registered");

    Ok(created(user, "User registered").into_response())
}

pub async fn current_user(auth: AuthUser) -> Response {
    success(auth.0, "Profile retrieved").into_response()
}
