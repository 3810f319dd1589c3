use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::extract::AuthUser;
use crate::models::ticket::{
    validate_ticket_fields, CreateTicketType, TicketType, TicketTypeView, UpdateTicketType,
};
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};
use crate::AppState;

#[derive(Debug, FromRow)]
struct TicketWithOrganizer {
    #[sqlx(flatten)]
    ticket: TicketType,
    organizer_id: Uuid,
}

pub async fn list_event_tickets(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event_exists: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM events WHERE id = $1 AND is_active")
            .bind(event_id)
            .fetch_optional(&state.pool)
            .await?;
    if event_exists.is_none() {
        return Err(AppError::NotFound(format!(
            "Event with id '{}' was not found",
            event_id
        )));
    }

    let tickets: Vec<TicketType> = sqlx::query_as(
        "SELECT * FROM tickets WHERE event_id = $1 AND is_active ORDER BY price",
    )
    .bind(event_id)
    .fetch_all(&state.pool)
    .await?;

    let views: Vec<TicketTypeView> = tickets.into_iter().map(TicketTypeView::from).collect();

    Ok(success(views, "Tickets retrieved").into_response())
}

pub async fn create_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<CreateTicketType>,
) -> Result<Response, AppError> {
    let organizer_id: Option<(Uuid,)> =
        sqlx::query_as("SELECT organizer_id FROM events WHERE id = $1")
            .bind(event_id)
            .fetch_optional(&state.pool)
            .await?;
    let Some((organizer_id,)) = organizer_id else {
        return Err(AppError::NotFound(format!(
            "Event with id '{}' was not found",
            event_id
        )));
    };
    if !auth.can_manage(organizer_id) {
        return Err(AppError::Forbidden(
            "You can only create tickets for your own events".to_string(),
        ));
    }

    payload.validate()?;

    let ticket: TicketType = sqlx::query_as(
        "INSERT INTO tickets (id, event_id, name, description, price, quantity_available)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(event_id)
    .bind(payload.name.trim())
    .bind(&payload.description)
    .bind(payload.price)
    .bind(payload.quantity_available)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(ticket_id = %ticket.id, %event_id, "ticket type created");

    Ok(created(TicketTypeView::from(ticket), "Ticket type created").into_response())
}

/// Read-only availability: reports the same counter the reservation path
/// updates, never a cached copy.
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let ticket: TicketType = sqlx::query_as("SELECT * FROM tickets WHERE id = $1 AND is_active")
        .bind(ticket_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ticket with id '{}' was not found", ticket_id)))?;

    Ok(success(TicketTypeView::from(ticket), "Ticket retrieved").into_response())
}

pub async fn update_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(ticket_id): Path<Uuid>,
    Json(payload): Json<UpdateTicketType>,
) -> Result<Response, AppError> {
    let TicketWithOrganizer { ticket, .. } = fetch_owned_ticket(&state, &auth, ticket_id).await?;

    let name = payload.name.unwrap_or(ticket.name);
    let description = payload.description.or(ticket.description);
    let price = payload.price.unwrap_or(ticket.price);
    let quantity_available = payload.quantity_available.unwrap_or(ticket.quantity_available);
    let is_active = payload.is_active.unwrap_or(ticket.is_active);

    validate_ticket_fields(&name, price, quantity_available)?;
    if quantity_available < ticket.quantity_sold {
        return Err(AppError::ValidationError(format!(
            "Cannot reduce quantity below already sold tickets ({})",
            ticket.quantity_sold
        )));
    }

    let ticket: TicketType = sqlx::query_as(
        "UPDATE tickets
         SET name = $2, description = $3, price = $4, quantity_available = $5,
             is_active = $6, updated_at = NOW()
         WHERE id = $1
         RETURNING *",
    )
    .bind(ticket_id)
    .bind(name.trim())
    .bind(&description)
    .bind(price)
    .bind(quantity_available)
    .bind(is_active)
    .fetch_one(&state.pool)
    .await?;

    Ok(success(TicketTypeView::from(ticket), "Ticket type updated").into_response())
}

pub async fn delete_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(ticket_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let TicketWithOrganizer { ticket, .. } = fetch_owned_ticket(&state, &auth, ticket_id).await?;

    // Cascades to purchases; irreversible.
    sqlx::query("DELETE FROM tickets WHERE id = $1")
        .bind(ticket.id)
        .execute(&state.pool)
        .await?;

    tracing::warn!(ticket_id = %ticket.id, deleted_by = %auth.0.id, "ticket type deleted with its purchases");

    Ok(empty_success("Ticket type deleted").into_response())
}

async fn fetch_owned_ticket(
    state: &AppState,
    auth: &AuthUser,
    ticket_id: Uuid,
) -> Result<TicketWithOrganizer, AppError> {
    let row: TicketWithOrganizer = sqlx::query_as(
        "SELECT t.*, e.organizer_id
         FROM tickets t
         JOIN events e ON e.id = t.event_id
         WHERE t.id = $1",
    )
    .bind(ticket_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Ticket with id '{}' was not found", ticket_id)))?;

    if !auth.can_manage(row.organizer_id) {
        return Err(AppError::Forbidden(
            "Only the event organizer or an admin can manage this ticket type".to_string(),
        ));
    }

    Ok(row)
}
