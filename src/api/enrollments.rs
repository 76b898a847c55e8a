use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::{
    api::{form_date, see_other, today},
    auth::auth::SessionUser,
    billing::{Ledger, MAX_AMOUNT, MAX_GST_RATE},
    db::Db,
    error::{AppError, AppResult},
    model::EnrollmentDetail,
    models::{NewEnrollment, parse_int_field},
    store::{
        courses,
        enrollments::{self, EnrollmentInput},
        students,
    },
    views::{self, Views},
};

pub const DEFAULT_GST_RATE: i64 = 18;

#[derive(Serialize)]
struct EnrollmentRow {
    enrollment: EnrollmentDetail,
    ledger: Ledger,
}

pub async fn list_enrollments(
    user: SessionUser,
    db: web::Data<Db>,
    views: web::Data<Views>,
) -> AppResult<HttpResponse> {
    let rows: Vec<EnrollmentRow> = enrollments::list(&db)
        .await?
        .into_iter()
        .map(|enrollment| EnrollmentRow {
            ledger: enrollment.ledger(),
            enrollment,
        })
        .collect();

    let mut ctx = views::context(Some(&user));
    ctx.insert("rows", &rows);
    views.page("enrollments.html", &ctx)
}

pub async fn new_enrollment(
    user: SessionUser,
    db: web::Data<Db>,
    views: web::Data<Views>,
) -> AppResult<HttpResponse> {
    let today = today();

    let mut ctx = views::context(Some(&user));
    ctx.insert("students", &students::list(&db).await?);
    ctx.insert("courses", &courses::list(&db).await?);
    ctx.insert(
        "default_invoice_number",
        &enrollments::preview_next_invoice_number(&db, today).await?,
    );
    ctx.insert("today", &today.format("%Y-%m-%d").to_string());
    views.page("enrollment_form.html", &ctx)
}

pub async fn create_enrollment(
    db: web::Data<Db>,
    form: web::Form<NewEnrollment>,
) -> AppResult<HttpResponse> {
    let today = today();
    let input = enrollment_input(&form, today)?;

    let created = enrollments::create(&db, input, today, Utc::now()).await?;
    info!(
        enrollment_id = created.id,
        invoice_number = %created.invoice_number,
        "Enrollment submitted"
    );

    Ok(see_other("/enrollments"))
}

pub async fn delete_enrollment(
    db: web::Data<Db>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let enrollment_id = path.into_inner();
    let existed = enrollments::delete(&db, enrollment_id).await?;
    info!(enrollment_id, existed, "Enrollment deleted with payments");

    Ok(see_other("/enrollments"))
}

fn enrollment_input(form: &NewEnrollment, today: chrono::NaiveDate) -> AppResult<EnrollmentInput> {
    let id = |raw: &str, what: &str| {
        raw.trim()
            .parse::<i64>()
            .map_err(|_| AppError::BadRequest(format!("Select a {what}")))
    };

    let gst_rate = parse_int_field(&form.gst_rate, DEFAULT_GST_RATE);
    if !(0..=MAX_GST_RATE).contains(&gst_rate) {
        return Err(AppError::BadRequest(format!(
            "GST rate must be between 0 and {MAX_GST_RATE}"
        )));
    }

    let first_payment = parse_int_field(&form.amount_paid, 0);
    if first_payment > MAX_AMOUNT {
        return Err(AppError::BadRequest("First payment is too large".to_string()));
    }

    let pan = form.pan.trim();

    Ok(EnrollmentInput {
        student_id: id(&form.student_id, "student")?,
        course_id: id(&form.course_id, "course")?,
        invoice_number: Some(form.invoice_number.trim().to_string()),
        invoice_date: form_date(&form.invoice_date, today),
        gst_rate,
        pan: (!pan.is_empty()).then(|| pan.to_string()),
        first_payment,
    })
}
