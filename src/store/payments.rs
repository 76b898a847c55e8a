use chrono::{DateTime, NaiveDate, Utc};

use crate::db::Db;
use crate::error::AppResult;
use crate::model::Payment;

pub const INITIAL_PAYMENT_NOTE: &str = "Initial payment";

/// Installments of one enrollment, oldest first.
pub async fn list_for_enrollment(db: &Db, enrollment_id: i64) -> AppResult<Vec<Payment>> {
    let payments = sqlx::query_as::<_, Payment>(
        r#"
        SELECT id, enrollment_id, amount, payment_date, note, created_at
        FROM payments
        WHERE enrollment_id = ?
        ORDER BY payment_date ASC, id ASC
        "#,
    )
    .bind(enrollment_id)
    .fetch_all(db.pool())
    .await?;

    Ok(payments)
}

/// Appends one installment. Payments are never edited or voided.
pub async fn record(
    db: &Db,
    enrollment_id: i64,
    amount: i64,
    payment_date: NaiveDate,
    note: &str,
    now: DateTime<Utc>,
) -> AppResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO payments (enrollment_id, amount, payment_date, note, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(enrollment_id)
    .bind(amount)
    .bind(payment_date.format("%Y-%m-%d").to_string())
    .bind(note)
    .bind(now.to_rfc3339())
    .execute(db.pool())
    .await?;

    Ok(result.last_insert_rowid())
}
