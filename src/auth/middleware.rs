use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header,
    middleware::Next,
    web::Data,
};
use tracing::debug;

use crate::auth::auth::SessionUser;
use crate::config::Config;

/// Lets the request through only with a valid session; otherwise
/// redirects to the login page.
pub async fn require_session(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let user = SessionUser::from_cookie(req.request(), &config);

    match user {
        Some(user) => {
            req.extensions_mut().insert(user);
            next.call(req).await
        }
        None => {
            debug!(path = %req.path(), "No session, redirecting to login");
            let resp = HttpResponse::SeeOther()
                .insert_header((header::LOCATION, "/login"))
                .finish();
            Ok(req.into_response(resp.map_into_boxed_body()))
        }
    }
}
