use actix_web::{
    FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data,
};
use futures::future::{Ready, ready};
use serde::Serialize;

use crate::auth::jwt::{SESSION_COOKIE, verify_token};
use crate::config::Config;

/// The logged-in account behind the current request.
#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    pub user_id: i64,
    pub username: String,
}

impl SessionUser {
    /// Reads and verifies the session cookie. `None` for a missing,
    /// forged or expired session.
    pub fn from_cookie(req: &HttpRequest, config: &Config) -> Option<Self> {
        let cookie = req.cookie(SESSION_COOKIE)?;
        let claims = verify_token(cookie.value(), &config.session_secret).ok()?;

        Some(SessionUser {
            user_id: claims.user_id,
            username: claims.sub,
        })
    }
}

impl FromRequest for SessionUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // Already resolved by the session middleware on protected routes.
        if let Some(user) = req.extensions().get::<SessionUser>() {
            return ready(Ok(user.clone()));
        }

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        match SessionUser::from_cookie(req, config) {
            Some(user) => ready(Ok(user)),
            None => ready(Err(ErrorUnauthorized("Not logged in"))),
        }
    }
}
