use actix_web::{HttpResponse, web};
use tracing::info;

use crate::{
    api::see_other,
    auth::auth::SessionUser,
    billing::MAX_AMOUNT,
    db::Db,
    error::{AppError, AppResult},
    models::NewCourse,
    store::courses,
    views::{self, Views},
};

pub async fn list_courses(
    user: SessionUser,
    db: web::Data<Db>,
    views: web::Data<Views>,
) -> AppResult<HttpResponse> {
    let mut ctx = views::context(Some(&user));
    ctx.insert("courses", &courses::list(&db).await?);
    views.page("courses.html", &ctx)
}

pub async fn new_course(user: SessionUser, views: web::Data<Views>) -> AppResult<HttpResponse> {
    views.page("course_form.html", &views::context(Some(&user)))
}

pub async fn create_course(
    db: web::Data<Db>,
    form: web::Form<NewCourse>,
) -> AppResult<HttpResponse> {
    if form.name.trim().is_empty() {
        return Err(AppError::BadRequest("Course name is required".to_string()));
    }

    let base_amount: i64 = form
        .base_amount
        .trim()
        .parse()
        .ok()
        .filter(|amount| (0..=MAX_AMOUNT).contains(amount))
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "Base amount must be a whole number up to {MAX_AMOUNT}"
            ))
        })?;

    let id = courses::create(&db, &form.name, base_amount).await?;
    info!(course_id = id, base_amount, "Course created");

    Ok(see_other("/courses"))
}

pub async fn delete_course(db: web::Data<Db>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let course_id = path.into_inner();
    let existed = courses::delete(&db, course_id).await?;
    info!(course_id, existed, "Course deleted with enrollments and payments");

    Ok(see_other("/courses"))
}
