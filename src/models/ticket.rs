use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::error::AppError;

/// A priced, quantity-limited ticket category under an event. The
/// `quantity_sold` counter only ever moves through the reservation path,
/// which guarantees `0 <= quantity_sold <= quantity_available`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketType {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity_available: i32,
    pub quantity_sold: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TicketType {
    pub fn quantity_remaining(&self) -> i32 {
        (self.quantity_available - self.quantity_sold).max(0)
    }

    pub fn is_sold_out(&self) -> bool {
        self.quantity_remaining() == 0
    }
}

/// Read payload reporting availability from the same row the reservation
/// path updates.
#[derive(Debug, Serialize)]
pub struct TicketTypeView {
    #[serde(flatten)]
    pub ticket: TicketType,
    pub quantity_remaining: i32,
    pub is_sold_out: bool,
}

impl From<TicketType> for TicketTypeView {
    fn from(ticket: TicketType) -> Self {
        let quantity_remaining = ticket.quantity_remaining();
        let is_sold_out = ticket.is_sold_out();
        Self {
            ticket,
            quantity_remaining,
            is_sold_out,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTicketType {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity_available: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTicketType {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub quantity_available: Option<i32>,
    pub is_active: Option<bool>,
}

pub fn validate_ticket_fields(
    name: &str,
    price: Decimal,
    quantity_available: i32,
) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::ValidationError("Name is required".to_string()));
    }
    if price.is_sign_negative() {
        return Err(AppError::ValidationError(
            "Price must not be negative".to_string(),
        ));
    }
    if quantity_available < 1 {
        return Err(AppError::ValidationError(
            "Quantity available must be at least 1".to_string(),
        ));
    }
    Ok(())
}

impl CreateTicketType {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_ticket_fields(&self.name, self.price, self.quantity_available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(available: i32, sold: i32) -> TicketType {
        let now = Utc::now();
        TicketType {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            name: "Early Bird".to_string(),
            description: None,
            price: Decimal::from(5000),
            quantity_available: available,
            quantity_sold: sold,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_quantity_remaining() {
        assert_eq!(ticket(100, 0).quantity_remaining(), 100);
        assert_eq!(ticket(100, 37).quantity_remaining(), 63);
        assert_eq!(ticket(100, 100).quantity_remaining(), 0);
    }

    #[test]
    fn test_sold_out() {
        assert!(ticket(10, 10).is_sold_out());
        assert!(!ticket(10, 9).is_sold_out());
    }

    #[test]
    fn test_create_validation() {
        let mut payload = CreateTicketType {
            name: "VIP".to_string(),
            description: None,
            price: Decimal::from(20000),
            quantity_available: 50,
        };
        assert!(payload.validate().is_ok());

        payload.quantity_available = 0;
        assert!(payload.validate().is_err());

        payload.quantity_available = 50;
        payload.price = Decimal::from(-1);
        assert!(payload.validate().is_err());

        payload.price = Decimal::ZERO;
        assert!(payload.validate().is_ok());
    }
}
