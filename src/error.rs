//! Application error type shared by handlers, the store and the CLI.
//!
//! Users only ever see a generic body; the cause goes to the log.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Password hashing error: {0}")]
    Password(String),

    #[error("Session token error: {0}")]
    Session(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] actix_web::error::HttpError),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    #[error("Not found")]
    NotFound,

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<argon2::password_hash::Error> for AppError {
    fn from(e: argon2::password_hash::Error) -> Self {
        AppError::Password(e.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = match self {
            AppError::BadRequest(msg) => msg.clone(),
            _ => status
                .canonical_reason()
                .unwrap_or("Something went wrong")
                .to_string(),
        };

        HttpResponse::build(status).body(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let err = AppError::Config("secret path /etc/hiq".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn usable_behind_anyhow() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<AppError>();

        let wrapped = anyhow::Error::from(AppError::NotFound);
        assert!(wrapped.downcast_ref::<AppError>().is_some());
    }

    #[test]
    fn cookie_errors_convert() {
        fn assert_from<T: From<actix_web::error::HttpError>>() {}
        assert_from::<AppError>();

        let mut resp = HttpResponse::Ok().finish();
        let added: AppResult<()> = resp
            .add_cookie(&actix_web::cookie::Cookie::new("k", "v"))
            .map_err(AppError::from);
        assert!(added.is_ok());
    }
}
