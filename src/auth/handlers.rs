use crate::{
    api::see_other,
    auth::{
        auth::SessionUser,
        jwt::{SESSION_COOKIE, generate_session_token},
        password::verify_password,
    },
    config::Config,
    db::Db,
    error::AppResult,
    models::LoginForm,
    store::users,
    views::{self, Views},
};
use actix_web::{
    HttpResponse,
    cookie::{Cookie, SameSite, time::Duration},
    web,
};
use tracing::{debug, info, instrument};

/// Same message for unknown user and wrong password.
pub const LOGIN_ERROR: &str = "Invalid username or password";

pub async fn login_form(
    user: Option<SessionUser>,
    views: web::Data<Views>,
) -> AppResult<HttpResponse> {
    if user.is_some() {
        return Ok(see_other("/enrollments"));
    }
    views.page("login.html", &views::context(None))
}

#[instrument(
    name = "auth_login",
    skip(db, config, views, form),
    fields(username = %form.username.trim())
)]
pub async fn login(
    form: web::Form<LoginForm>,
    db: web::Data<Db>,
    config: web::Data<Config>,
    views: web::Data<Views>,
) -> AppResult<HttpResponse> {
    info!("Login request received");

    let db_user = match users::find_by_username(&db, &form.username).await? {
        Some(user) => {
            debug!(user_id = user.id, "User found");
            user
        }
        None => {
            info!("Invalid credentials: user not found");
            return login_failed(&views);
        }
    };

    if let Err(e) = verify_password(&form.password, &db_user.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return login_failed(&views);
    }

    let token = generate_session_token(
        db_user.id,
        db_user.username.clone(),
        &config.session_secret,
        config.session_ttl,
    )?;

    let cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(config.session_ttl as i64))
        .finish();

    info!(user_id = db_user.id, "Login successful");

    let mut resp = see_other("/enrollments");
    resp.add_cookie(&cookie)?;
    Ok(resp)
}

pub async fn logout() -> AppResult<HttpResponse> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();

    let mut resp = see_other("/login");
    resp.add_cookie(&cookie)?;
    Ok(resp)
}

fn login_failed(views: &Views) -> AppResult<HttpResponse> {
    let mut ctx = views::context(None);
    ctx.insert("error", LOGIN_ERROR);
    views.page("login.html", &ctx)
}
