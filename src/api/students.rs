use actix_web::{HttpResponse, web};
use tracing::info;

use crate::{
    api::see_other,
    auth::auth::SessionUser,
    db::Db,
    error::{AppError, AppResult},
    models::NewStudent,
    store::students,
    views::{self, Views},
};

pub async fn list_students(
    user: SessionUser,
    db: web::Data<Db>,
    views: web::Data<Views>,
) -> AppResult<HttpResponse> {
    let mut ctx = views::context(Some(&user));
    ctx.insert("students", &students::list(&db).await?);
    views.page("students.html", &ctx)
}

pub async fn new_student(user: SessionUser, views: web::Data<Views>) -> AppResult<HttpResponse> {
    views.page("student_form.html", &views::context(Some(&user)))
}

pub async fn create_student(
    db: web::Data<Db>,
    form: web::Form<NewStudent>,
) -> AppResult<HttpResponse> {
    if form.name.trim().is_empty() {
        return Err(AppError::BadRequest("Student name is required".to_string()));
    }

    let id = students::create(&db, &form.name, &form.email, &form.phone).await?;
    info!(student_id = id, "Student created");

    Ok(see_other("/students"))
}

pub async fn delete_student(db: web::Data<Db>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let student_id = path.into_inner();
    let existed = students::delete(&db, student_id).await?;
    info!(student_id, existed, "Student deleted with enrollments and payments");

    Ok(see_other("/students"))
}
