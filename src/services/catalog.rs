//! Ticket-type availability.
//!
//! The `quantity_sold` counter is only ever moved through [`reserve`], whose
//! guard and increment are a single conditional UPDATE. Concurrent
//! reservations against the same ticket type serialize on the row write, so
//! two racers can never jointly oversell; the loser observes zero affected
//! rows and gets `OutOfStock`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::utils::error::AppError;

/// Outcome of a successful reservation. The unit price is the one read at
/// reservation time; later edits to the ticket type never affect it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub unit_price: Decimal,
}

/// Atomically consume `quantity` units of a ticket type's inventory.
///
/// Runs inside the caller's transaction so the increment commits or rolls
/// back together with the purchase record. Fails with `NotFound` when the
/// ticket type or its event is missing/inactive or the event has ended, and
/// with `OutOfStock` when fewer than `quantity` units remain.
pub async fn reserve(
    tx: &mut Transaction<'_, Postgres>,
    ticket_id: Uuid,
    quantity: i32,
) -> Result<Reservation, AppError> {
    let row: Option<(DateTime<Utc>,)> = sqlx::query_as(
        "SELECT e.ends_at
         FROM tickets t
         JOIN events e ON e.id = t.event_id
         WHERE t.id = $1 AND t.is_active AND e.is_active",
    )
    .bind(ticket_id)
    .fetch_optional(&mut **tx)
    .await?;

    let Some((ends_at,)) = row else {
        return Err(AppError::NotFound("Ticket type not found".to_string()));
    };

    if sales_closed(ends_at, Utc::now()) {
        return Err(AppError::NotFound(
            "Ticket sales have closed for this event".to_string(),
        ));
    }

    // The oversell guard: check and increment in one statement.
    let updated: Option<(Decimal,)> = sqlx::query_as(
        "UPDATE tickets
         SET quantity_sold = quantity_sold + $2, updated_at = NOW()
         WHERE id = $1 AND quantity_sold + $2 <= quantity_available
         RETURNING price",
    )
    .bind(ticket_id)
    .bind(quantity)
    .fetch_optional(&mut **tx)
    .await?;

    match updated {
        Some((unit_price,)) => Ok(Reservation { unit_price }),
        None => {
            tracing::debug!(%ticket_id, quantity, "reservation rejected, insufficient inventory");
            Err(AppError::OutOfStock(
                "Not enough tickets remaining for this quantity".to_string(),
            ))
        }
    }
}

// No sales once the event's end time has passed.
fn sales_closed(ends_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    ends_at <= now
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_sales_close_at_event_end() {
        let now = Utc::now();
        assert!(sales_closed(now - Duration::hours(1), now));
        assert!(sales_closed(now, now));
        assert!(!sales_closed(now + Duration::hours(1), now));
    }
}
