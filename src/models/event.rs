use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "event_category", rename_all = "snake_case")]
pub enum EventCategory {
    Music,
    Sports,
    Conference,
    Art,
    Theater,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventListing {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub category: EventCategory,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub capacity: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEvent {
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub category: EventCategory,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub capacity: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub category: Option<EventCategory>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub capacity: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatusFilter {
    Upcoming,
    Past,
}

impl EventStatusFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            EventStatusFilter::Upcoming => "upcoming",
            EventStatusFilter::Past => "past",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EventFilter {
    pub category: Option<EventCategory>,
    pub status: Option<EventStatusFilter>,
    pub search: Option<String>,
}

/// Shared validation for create and merged-update payloads.
pub fn validate_event_fields(
    title: &str,
    location: &str,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    capacity: Option<i32>,
) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::ValidationError("Title is required".to_string()));
    }
    if location.trim().is_empty() {
        return Err(AppError::ValidationError("Location is required".to_string()));
    }
    if ends_at <= starts_at {
        return Err(AppError::ValidationError(
            "End time must be after start time".to_string(),
        ));
    }
    if let Some(capacity) = capacity {
        if capacity < 1 {
            return Err(AppError::ValidationError(
                "Capacity must be at least 1".to_string(),
            ));
        }
    }
    Ok(())
}

impl CreateEvent {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_event_fields(
            &self.title,
            &self.location,
            self.starts_at,
            self.ends_at,
            self.capacity,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn payload() -> CreateEvent {
        let starts_at = Utc::now() + Duration::days(7);
        CreateEvent {
            title: "Cotonou Jazz Night".to_string(),
            description: None,
            location: "Palais des Congrès".to_string(),
            category: EventCategory::Music,
            starts_at,
            ends_at: starts_at + Duration::hours(4),
            capacity: Some(500),
        }
    }

    #[test]
    fn test_valid_event() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn test_end_must_be_after_start() {
        let mut event = payload();
        event.ends_at = event.starts_at;
        assert!(event.validate().is_err());

        event.ends_at = event.starts_at - Duration::hours(1);
        assert!(event.validate().is_err());
    }

    #[test]
    fn test_rejects_blank_title() {
        let mut event = payload();
        event.title = "   ".to_string();
        assert!(event.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let mut event = payload();
        event.capacity = Some(0);
        assert!(event.validate().is_err());
    }
}
