use actix_web::{HttpResponse, http::header, web};

use crate::{
    auth::auth::SessionUser,
    company::HIQODE,
    db::Db,
    error::AppResult,
    pdf::render_invoice,
    store::enrollments,
    views::{self, Views},
};

pub async fn invoice_html(
    user: SessionUser,
    db: web::Data<Db>,
    views: web::Data<Views>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let enrollment = enrollments::get(&db, path.into_inner()).await?;

    let mut ctx = views::context(Some(&user));
    ctx.insert("ledger", &enrollment.ledger());
    ctx.insert("enrollment", &enrollment);
    ctx.insert("company", &HIQODE);
    views.page("invoice.html", &ctx)
}

pub async fn invoice_pdf(db: web::Data<Db>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let enrollment = enrollments::get(&db, path.into_inner()).await?;
    let bytes = render_invoice(&enrollment);

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=invoice-{}.pdf", enrollment.invoice_number),
        ))
        .body(bytes))
}
