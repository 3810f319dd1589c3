use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::extract::AuthUser;
use crate::models::event::{
    validate_event_fields, CreateEvent, EventFilter, EventListing, UpdateEvent,
};
use crate::models::user::UserRole;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};
use crate::AppState;

pub async fn list_events(
    State(state): State<AppState>,
    Query(filter): Query<EventFilter>,
) -> Result<Response, AppError> {
    let search = filter.search.as_deref().map(|s| format!("%{}%", s.trim()));
    let status = filter.status.map(|s| s.as_str());

    let events: Vec<EventListing> = sqlx::query_as(
        "SELECT * FROM events
         WHERE is_active
           AND ($1::event_category IS NULL OR category = $1)
           AND ($2::text IS NULL
                OR ($2 = 'upcoming' AND starts_at > NOW())
                OR ($2 = 'past' AND ends_at < NOW()))
           AND ($3::text IS NULL OR title ILIKE $3 OR description ILIKE $3 OR location ILIKE $3)
         ORDER BY created_at DESC",
    )
    .bind(filter.category)
    .bind(status)
    .bind(search)
    .fetch_all(&state.pool)
    .await?;

    Ok(success(events, "Events retrieved").into_response())
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event: EventListing = sqlx::query_as("SELECT * FROM events WHERE id = $1 AND is_active")
        .bind(event_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event with id '{}' was not found", event_id)))?;

    Ok(success(event, "Event retrieved").into_response())
}

pub async fn create_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateEvent>,
) -> Result<Response, AppError> {
    auth.require_role(&[UserRole::Organizer, UserRole::Admin])?;
    payload.validate()?;

    let event: EventListing = sqlx::query_as(
        "INSERT INTO events (id, organizer_id, title, description, location, category, starts_at, ends_at, capacity)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(auth.0.id)
    .bind(payload.title.trim())
    .bind(&payload.description)
    .bind(payload.location.trim())
    .bind(payload.category)
    .bind(payload.starts_at)
    .bind(payload.ends_at)
    .bind(payload.capacity)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(event_id = %event.id, organizer_id = %event.organizer_id, "event created");

    Ok(created(event, "Event created").into_response())
}

pub async fn update_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<UpdateEvent>,
) -> Result<Response, AppError> {
    let event = fetch_owned_event(&state, &auth, event_id).await?;

    let title = payload.title.unwrap_or(event.title);
    let description = payload.description.or(event.description);
    let location = payload.location.unwrap_or(event.location);
    let category = payload.category.unwrap_or(event.category);
    let starts_at = payload.starts_at.unwrap_or(event.starts_at);
    let ends_at = payload.ends_at.unwrap_or(event.ends_at);
    let capacity = payload.capacity.or(event.capacity);
    let is_active = payload.is_active.unwrap_or(event.is_active);

    validate_event_fields(&title, &location, starts_at, ends_at, capacity)?;

    let event: EventListing = sqlx::query_as(
        "UPDATE events
         SET title = $2, description = $3, location = $4, category = $5,
             starts_at = $6, ends_at = $7, capacity = $8, is_active = $9, updated_at = NOW()
         WHERE id = $1
         RETURNING *",
    )
    .bind(event_id)
    .bind(title.trim())
    .bind(&description)
    .bind(location.trim())
    .bind(category)
    .bind(starts_at)
    .bind(ends_at)
    .bind(capacity)
    .bind(is_active)
    .fetch_one(&state.pool)
    .await?;

    Ok(success(event, "Event updated").into_response())
}

pub async fn delete_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = fetch_owned_event(&state, &auth, event_id).await?;

    // Cascades to ticket types and purchases; irreversible.
    sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(event.id)
        .execute(&state.pool)
        .await?;

    tracing::warn!(event_id = %event.id, deleted_by = %auth.0.id, "event deleted with all ticket types and purchases");

    Ok(empty_success("Event deleted").into_response())
}

/// Load an event and check the caller may manage it (organizer or admin).
async fn fetch_owned_event(
    state: &AppState,
    auth: &AuthUser,
    event_id: Uuid,
) -> Result<EventListing, AppError> {
    let event: EventListing = sqlx::query_as("SELECT * FROM events WHERE id = $1")
        .bind(event_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event with id '{}' was not found", event_id)))?;

    if !auth.can_manage(event.organizer_id) {
        return Err(AppError::Forbidden(
            "Only the event organizer or an admin can manage this event".to_string(),
        ));
    }

    Ok(event)
}
