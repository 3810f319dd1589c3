//! Purchase ledger.
//!
//! A purchase runs as one unit of work: reserve inventory, insert the
//! pending record, charge, mark paid. Any failure rolls the whole
//! transaction back, so a paid purchase without reserved inventory (or an
//! incremented counter without a purchase row) is never observable. A
//! purchase row only becomes visible once reservation and validation have
//! both succeeded.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::purchase::{Purchase, PurchaseRequest};
use crate::models::user::User;
use crate::services::{catalog, credential, payment};
use crate::utils::error::AppError;

pub async fn execute_purchase(
    pool: &PgPool,
    buyer: &User,
    ticket_id: Uuid,
    request: &PurchaseRequest,
) -> Result<Purchase, AppError> {
    validate_request(request)?;

    let mut tx = pool.begin().await?;

    let reservation = catalog::reserve(&mut tx, ticket_id, request.quantity).await?;
    let total_amount = compute_total(reservation.unit_price, request.quantity);

    let pending: Purchase = sqlx::query_as(
        "INSERT INTO purchases (id, ticket_id, user_id, quantity, unit_price, total_amount, payment_method, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending')
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(ticket_id)
    .bind(buyer.id)
    .bind(request.quantity)
    .bind(reservation.unit_price)
    .bind(total_amount)
    .bind(request.payment_method)
    .fetch_one(&mut *tx)
    .await?;

    let receipt = payment::charge(request.payment_method, total_amount);
    let token = credential::issue(pending.id);

    // Terminal transition; the status guard keeps paid rows immutable even
    // if this path is ever re-entered.
    let purchase: Purchase = sqlx::query_as(
        "UPDATE purchases
         SET status = 'paid', credential = $2, payment_reference = $3, paid_at = NOW(), updated_at = NOW()
         WHERE id = $1 AND status = 'pending'
         RETURNING *",
    )
    .bind(pending.id)
    .bind(&token)
    .bind(&receipt.reference)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| {
        AppError::InternalServerError("Purchase left the pending state unexpectedly".to_string())
    })?;

    tx.commit().await?;

    tracing::info!(
        purchase_id = %purchase.id,
        %ticket_id,
        user_id = %buyer.id,
        quantity = purchase.quantity,
        total_amount = %purchase.total_amount,
        "purchase confirmed"
    );

    Ok(purchase)
}

/// Rejects malformed requests before any row is created or counter touched.
pub fn validate_request(request: &PurchaseRequest) -> Result<(), AppError> {
    if request.quantity < 1 {
        return Err(AppError::ValidationError(
            "Quantity must be at least 1".to_string(),
        ));
    }
    payment::validate(request)
}

/// `total_amount = quantity x unit_price`, exact decimal arithmetic.
pub fn compute_total(unit_price: Decimal, quantity: i32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_is_exact() {
        assert_eq!(
            compute_total(Decimal::from(1000), 3),
            Decimal::from(3000)
        );
    }

    #[test]
    fn test_total_preserves_decimal_places() {
        let unit_price = Decimal::new(12_550, 2); // 125.50
        assert_eq!(compute_total(unit_price, 4), Decimal::new(50_200, 2));
    }

    #[test]
    fn test_total_for_single_unit() {
        let unit_price = Decimal::new(999, 2);
        assert_eq!(compute_total(unit_price, 1), unit_price);
    }

    #[test]
    fn test_rejects_non_positive_quantity() {
        use crate::models::purchase::PaymentMethod;

        let mut request = PurchaseRequest {
            quantity: 0,
            payment_method: PaymentMethod::MobileMoney,
            phone: Some("+22997001122".to_string()),
            card_number: None,
            card_expiry: None,
            card_cvv: None,
            card_holder_name: None,
        };
        assert!(validate_request(&request).is_err());

        request.quantity = -3;
        assert!(validate_request(&request).is_err());

        request.quantity = 1;
        assert!(validate_request(&request).is_ok());
    }
}
