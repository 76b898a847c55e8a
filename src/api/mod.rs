pub mod courses;
pub mod enrollments;
pub mod health;
pub mod invoices;
pub mod payments;
pub mod students;

use actix_web::{HttpResponse, http::header};
use chrono::{Local, NaiveDate};

/// Post/redirect/get answer after a form submission.
pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `YYYY-MM-DD` form date, or `fallback` when blank or malformed.
pub fn form_date(raw: &str, fallback: NaiveDate) -> NaiveDate {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").unwrap_or(fallback)
}
