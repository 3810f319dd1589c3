//! Simulated payment processing.
//!
//! Payment details are format-validated only; there is no gateway
//! round-trip. A well-formed request charges synchronously and yields a
//! `PAY-`-prefixed reference.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::purchase::{PaymentMethod, PurchaseRequest};
use crate::utils::error::AppError;

const REFERENCE_LEN: usize = 12;

#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    pub reference: String,
}

/// Validate the payment-method-specific fields of a purchase request.
pub fn validate(request: &PurchaseRequest) -> Result<(), AppError> {
    match request.payment_method {
        PaymentMethod::MobileMoney => {
            let phone = request
                .phone
                .as_deref()
                .ok_or_else(|| invalid("Phone number is required for mobile money payment"))?;
            if !is_valid_phone(phone) {
                return Err(invalid("Phone number is not a valid mobile money number"));
            }
        }
        PaymentMethod::Card => {
            let number = request
                .card_number
                .as_deref()
                .ok_or_else(|| invalid("Card number is required for card payment"))?;
            let expiry = request
                .card_expiry
                .as_deref()
                .ok_or_else(|| invalid("Card expiry is required for card payment"))?;
            let cvv = request
                .card_cvv
                .as_deref()
                .ok_or_else(|| invalid("Card CVV is required for card payment"))?;
            let holder = request
                .card_holder_name
                .as_deref()
                .ok_or_else(|| invalid("Card holder name is required for card payment"))?;

            if !is_valid_card_number(number) {
                return Err(invalid("Card number must be 13 to 19 digits"));
            }
            if !is_valid_expiry(expiry) {
                return Err(invalid("Invalid expiry format. Use MM/YYYY"));
            }
            if !is_valid_cvv(cvv) {
                return Err(invalid("Card CVV must be 3 or 4 digits"));
            }
            if holder.trim().is_empty() {
                return Err(invalid("Card holder name is required for card payment"));
            }
        }
    }
    Ok(())
}

/// Charge a validated request. The simulation always succeeds; the returned
/// reference stands in for a gateway confirmation id.
pub fn charge(method: PaymentMethod, amount: Decimal) -> PaymentReceipt {
    let reference = generate_payment_reference();
    tracing::debug!(?method, %amount, %reference, "simulated payment accepted");
    PaymentReceipt { reference }
}

fn generate_payment_reference() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("PAY-{}", hex[..REFERENCE_LEN].to_uppercase())
}

fn invalid(message: &str) -> AppError {
    AppError::ValidationError(message.to_string())
}

fn is_valid_phone(raw: &str) -> bool {
    let cleaned: String = raw.chars().filter(|c| !matches!(c, ' ' | '-')).collect();
    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    (8..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

fn is_valid_card_number(raw: &str) -> bool {
    let digits: String = raw.chars().filter(|c| *c != ' ').collect();
    (13..=19).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

// MM/YYYY, month 1-12
fn is_valid_expiry(raw: &str) -> bool {
    let Some((month, year)) = raw.split_once('/') else {
        return false;
    };
    let month_ok = month.parse::<u32>().map(|m| (1..=12).contains(&m)).unwrap_or(false);
    let year_ok = year.len() == 4 && year.chars().all(|c| c.is_ascii_digit());
    month_ok && year_ok
}

fn is_valid_cvv(raw: &str) -> bool {
    (3..=4).contains(&raw.len()) && raw.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mobile_money(phone: Option<&str>) -> PurchaseRequest {
        PurchaseRequest {
            quantity: 1,
            payment_method: PaymentMethod::MobileMoney,
            phone: phone.map(str::to_string),
            card_number: None,
            card_expiry: None,
            card_cvv: None,
            card_holder_name: None,
        }
    }

    fn card() -> PurchaseRequest {
        PurchaseRequest {
            quantity: 1,
            payment_method: PaymentMethod::Card,
            phone: None,
            card_number: Some("4111 1111 1111 1111".to_string()),
            card_expiry: Some("09/2027".to_string()),
            card_cvv: Some("123".to_string()),
            card_holder_name: Some("Ama Dossou".to_string()),
        }
    }

    #[test]
    fn test_mobile_money_requires_phone() {
        assert!(validate(&mobile_money(None)).is_err());
        assert!(validate(&mobile_money(Some("+229 97 00 11 22"))).is_ok());
        assert!(validate(&mobile_money(Some("97001122"))).is_ok());
    }

    #[test]
    fn test_mobile_money_rejects_bad_phone() {
        assert!(validate(&mobile_money(Some("123"))).is_err());
        assert!(validate(&mobile_money(Some("not a phone"))).is_err());
        assert!(validate(&mobile_money(Some("+1234567890123456"))).is_err());
    }

    #[test]
    fn test_card_happy_path() {
        assert!(validate(&card()).is_ok());
    }

    #[test]
    fn test_card_requires_all_fields() {
        for strip in 0..4 {
            let mut req = card();
            match strip {
                0 => req.card_number = None,
                1 => req.card_expiry = None,
                2 => req.card_cvv = None,
                _ => req.card_holder_name = None,
            }
            assert!(validate(&req).is_err(), "missing field {strip} should fail");
        }
    }

    #[test]
    fn test_card_expiry_format() {
        let mut req = card();
        for bad in ["13/2027", "0/2027", "09/27", "092027", "ab/cdef"] {
            req.card_expiry = Some(bad.to_string());
            assert!(validate(&req).is_err(), "expiry '{bad}' should fail");
        }
        req.card_expiry = Some("01/2030".to_string());
        assert!(validate(&req).is_ok());
    }

    #[test]
    fn test_card_number_length() {
        let mut req = card();
        req.card_number = Some("1234".to_string());
        assert!(validate(&req).is_err());
        req.card_number = Some("12345678901234567890".to_string());
        assert!(validate(&req).is_err());
    }

    #[test]
    fn test_cvv_format() {
        let mut req = card();
        req.card_cvv = Some("12".to_string());
        assert!(validate(&req).is_err());
        req.card_cvv = Some("1234".to_string());
        assert!(validate(&req).is_ok());
        req.card_cvv = Some("12a".to_string());
        assert!(validate(&req).is_err());
    }

    #[test]
    fn test_payment_reference_shape() {
        let receipt = charge(PaymentMethod::Card, Decimal::from(5000));
        assert!(receipt.reference.starts_with("PAY-"));
        assert_eq!(receipt.reference.len(), 4 + REFERENCE_LEN);

        let other = charge(PaymentMethod::MobileMoney, Decimal::from(5000));
        assert_ne!(receipt.reference, other.reference);
    }
}
