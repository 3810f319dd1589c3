use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::extract::AuthUser;
use crate::models::purchase::{
    CredentialVerification, Purchase, PurchaseRequest, VerifyCredentialRequest,
};
use crate::models::user::UserRole;
use crate::services::ledger;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};
use crate::AppState;

#[derive(Debug, FromRow)]
struct PurchaseWithOrganizer {
    #[sqlx(flatten)]
    purchase: Purchase,
    organizer_id: Uuid,
}

pub async fn purchase_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(ticket_id): Path<Uuid>,
    Json(payload): Json<PurchaseRequest>,
) -> Result<Response, AppError> {
    let purchase = ledger::execute_purchase(&state.pool, &auth.0, ticket_id, &payload).await?;

    Ok(created(purchase, "Purchase completed").into_response())
}

/// Participants see their own purchases, organizers those of their events,
/// admins everything.
pub async fn list_purchases(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Response, AppError> {
    let purchases: Vec<Purchase> = match auth.0.role {
        UserRole::Admin => {
            sqlx::query_as("SELECT * FROM purchases ORDER BY created_at DESC")
                .fetch_all(&state.pool)
                .await?
        }
        UserRole::Organizer => {
            sqlx::query_as(
                "SELECT p.* FROM purchases p
                 JOIN tickets t ON t.id = p.ticket_id
                 JOIN events e ON e.id = t.event_id
                 WHERE e.organizer_id = $1
                 ORDER BY p.created_at DESC",
            )
            .bind(auth.0.id)
            .fetch_all(&state.pool)
            .await?
        }
        UserRole::Participant => {
            sqlx::query_as(
                "SELECT * FROM purchases WHERE user_id = $1 ORDER BY created_at DESC",
            )
            .bind(auth.0.id)
            .fetch_all(&state.pool)
            .await?
        }
    };

    Ok(success(purchases, "Purchases retrieved").into_response())
}

/// Reading a purchase is idempotent: a paid record always comes back with
/// the same status, total and credential.
pub async fn get_purchase(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(purchase_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let row: PurchaseWithOrganizer = sqlx::query_as(
        "SELECT p.*, e.organizer_id
         FROM purchases p
         JOIN tickets t ON t.id = p.ticket_id
         JOIN events e ON e.id = t.event_id
         WHERE p.id = $1",
    )
    .bind(purchase_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| {
        AppError::NotFound(format!("Purchase with id '{}' was not found", purchase_id))
    })?;

    if auth.0.id != row.purchase.user_id && !auth.can_manage(row.organizer_id) {
        return Err(AppError::Forbidden(
            "You are not allowed to view this purchase".to_string(),
        ));
    }

    Ok(success(row.purchase, "Purchase retrieved").into_response())
}

/// Entry-gate check: a credential is only as good as its ledger match.
pub async fn verify_credential(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<VerifyCredentialRequest>,
) -> Result<Response, AppError> {
    auth.require_role(&[UserRole::Organizer, UserRole::Admin])?;

    let credential = payload.credential.trim();
    if credential.is_empty() {
        return Err(AppError::ValidationError(
            "Credential is required".to_string(),
        ));
    }

    // Organizers can only validate entries for their own events.
    let organizer_scope: Option<Uuid> = if auth.is_admin() { None } else { Some(auth.0.id) };

    let verification: CredentialVerification = sqlx::query_as(
        "SELECT p.id AS purchase_id, p.credential, p.quantity, p.paid_at,
                e.title AS event_title, t.name AS ticket_name, u.email AS purchaser_email
         FROM purchases p
         JOIN tickets t ON t.id = p.ticket_id
         JOIN events e ON e.id = t.event_id
         JOIN users u ON u.id = p.user_id
         WHERE p.credential = $1 AND p.status = 'paid'
           AND ($2::uuid IS NULL OR e.organizer_id = $2)",
    )
    .bind(credential)
    .bind(organizer_scope)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("No paid purchase matches this credential".to_string()))?;

    tracing::info!(
        purchase_id = %verification.purchase_id,
        validated_by = %auth.0.id,
        "credential verified"
    );

    Ok(success(verification, "Credential is valid").into_response())
}
