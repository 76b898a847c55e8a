use actix_web::{HttpResponse, web};
use chrono::Utc;
use tracing::{debug, info};

use crate::{
    api::{form_date, see_other, today},
    auth::auth::SessionUser,
    db::Db,
    billing::MAX_AMOUNT,
    error::{AppError, AppResult},
    models::{NewPayment, parse_int_field},
    store::{enrollments, payments},
    views::{self, Views},
};

pub async fn list_payments(
    user: SessionUser,
    db: web::Data<Db>,
    views: web::Data<Views>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let enrollment = enrollments::get(&db, path.into_inner()).await?;
    let payments = payments::list_for_enrollment(&db, enrollment.id).await?;

    let mut ctx = views::context(Some(&user));
    ctx.insert("ledger", &enrollment.ledger());
    ctx.insert("enrollment", &enrollment);
    ctx.insert("payments", &payments);
    ctx.insert("today", &today().format("%Y-%m-%d").to_string());
    views.page("payments.html", &ctx)
}

/// Records an installment. Zero or unparseable amounts are ignored.
pub async fn create_payment(
    db: web::Data<Db>,
    path: web::Path<i64>,
    form: web::Form<NewPayment>,
) -> AppResult<HttpResponse> {
    let enrollment = enrollments::get(&db, path.into_inner()).await?;

    let amount = parse_int_field(&form.amount, 0);
    if amount > MAX_AMOUNT {
        return Err(AppError::BadRequest("Payment amount is too large".to_string()));
    }

    if amount > 0 {
        let date = form_date(&form.payment_date, today());
        let id = payments::record(&db, enrollment.id, amount, date, form.note.trim(), Utc::now())
            .await?;
        info!(payment_id = id, enrollment_id = enrollment.id, amount, "Payment recorded");
    } else {
        debug!(enrollment_id = enrollment.id, raw = %form.amount, "Ignoring non-positive payment");
    }

    Ok(see_other(&format!("/enrollments/{}/payments", enrollment.id)))
}
