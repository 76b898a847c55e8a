use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sqlx::{Sqlite, SqliteConnection};
use tracing::{info, warn};

use crate::billing::{can_follow, next_invoice_number};
use crate::db::Db;
use crate::error::{AppError, AppResult};
use crate::model::EnrollmentDetail;
use crate::store::payments::INITIAL_PAYMENT_NOTE;

const DETAIL_SELECT: &str = r#"
    SELECT e.id,
           e.student_id,
           e.course_id,
           e.invoice_number,
           e.invoice_date,
           e.gst_rate,
           e.created_at,
           e.pan,
           s.name AS student_name,
           s.email AS student_email,
           s.phone AS student_phone,
           c.name AS course_name,
           c.base_amount,
           IFNULL(SUM(p.amount), 0) AS amount_paid
    FROM enrollments e
    JOIN students s ON e.student_id = s.id
    JOIN courses c ON e.course_id = c.id
    LEFT JOIN payments p ON p.enrollment_id = e.id
"#;

#[derive(Debug, Clone)]
pub struct EnrollmentInput {
    pub student_id: i64,
    pub course_id: i64,
    /// Requested number; blank or already used means "assign the next one".
    pub invoice_number: Option<String>,
    pub invoice_date: NaiveDate,
    pub gst_rate: i64,
    pub pan: Option<String>,
    /// Recorded as an `Initial payment` in the same transaction when > 0.
    pub first_payment: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedEnrollment {
    pub id: i64,
    pub invoice_number: String,
}

pub async fn list(db: &Db) -> AppResult<Vec<EnrollmentDetail>> {
    let sql = format!("{DETAIL_SELECT} GROUP BY e.id ORDER BY e.id DESC");
    let rows = sqlx::query_as::<_, EnrollmentDetail>(&sql)
        .fetch_all(db.pool())
        .await?;

    Ok(rows)
}

pub async fn find(db: &Db, id: i64) -> AppResult<Option<EnrollmentDetail>> {
    let sql = format!("{DETAIL_SELECT} WHERE e.id = ? GROUP BY e.id");
    let row = sqlx::query_as::<_, EnrollmentDetail>(&sql)
        .bind(id)
        .fetch_optional(db.pool())
        .await?;

    Ok(row)
}

/// Like [`find`] but a missing enrollment is [`AppError::NotFound`].
pub async fn get(db: &Db, id: i64) -> AppResult<EnrollmentDetail> {
    find(db, id).await?.ok_or(AppError::NotFound)
}

/// Number the enrollment form should propose, as of `today`. Blank when
/// the sequence cannot advance.
pub async fn preview_next_invoice_number(db: &Db, today: NaiveDate) -> AppResult<String> {
    let last = last_invoice_number(db.pool()).await?;
    Ok(next_invoice_number(last.as_deref(), today.year()).unwrap_or_default())
}

/// Creates the enrollment, and its first installment if any, atomically.
///
/// Runs under the writer lock and a `BEGIN IMMEDIATE` transaction, so two
/// creations cannot draw the same invoice number and a write from another
/// connection cannot invalidate the number read.
pub async fn create(
    db: &Db,
    input: EnrollmentInput,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> AppResult<CreatedEnrollment> {
    let _writer = db.lock_writer().await;
    let mut tx = db.begin_immediate().await?;

    match insert_enrollment(&mut tx, &input, today, now).await {
        Ok(created) => {
            tx.commit().await?;
            info!(
                enrollment_id = created.id,
                invoice_number = %created.invoice_number,
                "Enrollment created"
            );
            Ok(created)
        }
        Err(e) => {
            tx.rollback().await?;
            Err(e)
        }
    }
}

async fn insert_enrollment(
    conn: &mut SqliteConnection,
    input: &EnrollmentInput,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> AppResult<CreatedEnrollment> {
    let mut honored = None;
    if let Some(wanted) = requested_number(input) {
        if !can_follow(wanted) {
            return Err(AppError::BadRequest(format!(
                "Invoice number {wanted} is out of range"
            )));
        }

        if invoice_number_taken(&mut *conn, wanted).await? {
            warn!(requested = wanted, "Invoice number already used, assigning the next one");
        } else {
            honored = Some(wanted.to_string());
        }
    }

    let invoice_number = match honored {
        Some(number) => number,
        None => allocate_invoice_number(&mut *conn, today.year()).await?,
    };

    let inserted = sqlx::query(
        r#"
        INSERT INTO enrollments
            (student_id, course_id, invoice_number, invoice_date, gst_rate, amount_paid, created_at, pan)
        VALUES (?, ?, ?, ?, ?, 0, ?, ?)
        "#,
    )
    .bind(input.student_id)
    .bind(input.course_id)
    .bind(&invoice_number)
    .bind(input.invoice_date.format("%Y-%m-%d").to_string())
    .bind(input.gst_rate)
    .bind(now.to_rfc3339())
    .bind(input.pan.as_deref().map(str::trim).unwrap_or(""))
    .execute(&mut *conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            AppError::BadRequest("Unknown student or course".to_string())
        }
        e => AppError::Db(e),
    })?;

    let id = inserted.last_insert_rowid();

    if input.first_payment > 0 {
        sqlx::query(
            r#"
            INSERT INTO payments (enrollment_id, amount, payment_date, note, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(input.first_payment)
        .bind(today.format("%Y-%m-%d").to_string())
        .bind(INITIAL_PAYMENT_NOTE)
        .bind(now.to_rfc3339())
        .execute(&mut *conn)
        .await?;
    }

    Ok(CreatedEnrollment { id, invoice_number })
}

/// Removes the enrollment and its payments.
pub async fn delete(db: &Db, id: i64) -> AppResult<bool> {
    let mut tx = db.begin_immediate().await?;

    sqlx::query("DELETE FROM payments WHERE enrollment_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM enrollments WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(result.rows_affected() > 0)
}

fn requested_number(input: &EnrollmentInput) -> Option<&str> {
    input
        .invoice_number
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
}

async fn last_invoice_number<'e, E>(executor: E) -> AppResult<Option<String>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let last = sqlx::query_scalar::<_, String>(
        "SELECT invoice_number FROM enrollments ORDER BY id DESC LIMIT 1",
    )
    .fetch_optional(executor)
    .await?;

    Ok(last)
}

async fn invoice_number_taken(conn: &mut SqliteConnection, number: &str) -> AppResult<bool> {
    let found = sqlx::query_scalar::<_, i64>("SELECT id FROM enrollments WHERE invoice_number = ?")
        .bind(number)
        .fetch_optional(conn)
        .await?;

    Ok(found.is_some())
}

/// Next free number after the most recently issued one.
async fn allocate_invoice_number(conn: &mut SqliteConnection, year: i32) -> AppResult<String> {
    let last = last_invoice_number(&mut *conn).await?;
    let mut candidate =
        next_invoice_number(last.as_deref(), year).ok_or_else(sequence_exhausted)?;

    // Hand-typed numbers can sit ahead of the sequence.
    while invoice_number_taken(&mut *conn, &candidate).await? {
        candidate = next_invoice_number(Some(&candidate), year).ok_or_else(sequence_exhausted)?;
    }

    Ok(candidate)
}

fn sequence_exhausted() -> AppError {
    AppError::BadRequest("Invoice sequence cannot advance; enter an invoice number".to_string())
}
