use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
pub enum PaymentMethod {
    MobileMoney,
    Card,
}

/// Purchase lifecycle: `pending` exists only inside the purchase
/// transaction; every purchase visible through the API is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "purchase_status", rename_all = "snake_case")]
pub enum PurchaseStatus {
    Pending,
    Paid,
    Cancelled,
}

impl PurchaseStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, PurchaseStatus::Paid | PurchaseStatus::Cancelled)
    }

    pub fn can_transition_to(self, next: PurchaseStatus) -> bool {
        matches!(
            (self, next),
            (PurchaseStatus::Pending, PurchaseStatus::Paid)
                | (PurchaseStatus::Pending, PurchaseStatus::Cancelled)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Purchase {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_reference: Option<String>,
    pub status: PurchaseStatus,
    pub credential: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    pub quantity: i32,
    pub payment_method: PaymentMethod,

    // Mobile money fields
    pub phone: Option<String>,

    // Card payment fields
    pub card_number: Option<String>,
    pub card_expiry: Option<String>,
    pub card_cvv: Option<String>,
    pub card_holder_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCredentialRequest {
    pub credential: String,
}

/// Ledger-backed summary handed to entry staff when a credential matches.
#[derive(Debug, Serialize, FromRow)]
pub struct CredentialVerification {
    pub purchase_id: Uuid,
    pub credential: String,
    pub quantity: i32,
    pub event_title: String,
    pub ticket_name: String,
    pub purchaser_email: String,
    pub paid_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!PurchaseStatus::Pending.is_terminal());
        assert!(PurchaseStatus::Paid.is_terminal());
        assert!(PurchaseStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_only_pending_transitions() {
        assert!(PurchaseStatus::Pending.can_transition_to(PurchaseStatus::Paid));
        assert!(PurchaseStatus::Pending.can_transition_to(PurchaseStatus::Cancelled));

        // Terminal states never move again
        assert!(!PurchaseStatus::Paid.can_transition_to(PurchaseStatus::Cancelled));
        assert!(!PurchaseStatus::Paid.can_transition_to(PurchaseStatus::Pending));
        assert!(!PurchaseStatus::Cancelled.can_transition_to(PurchaseStatus::Paid));
        assert!(!PurchaseStatus::Pending.can_transition_to(PurchaseStatus::Pending));
    }
}
