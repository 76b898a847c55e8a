use crate::{
    api::{courses, enrollments, health, invoices, payments, see_other, students},
    auth::{handlers, middleware::require_session},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let requests_per_min = requests_per_min.max(1);
        let per_ms = (60_000 / requests_per_min as u64).max(1);
        let cfg = GovernorConfigBuilder::default()
            .milliseconds_per_request(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .expect("period and burst size are non-zero");
        Governor::new(&cfg)
    }

    // Public routes
    cfg.service(health::health)
        .service(
            web::resource("/login")
                .wrap(build_limiter(config.rate_login_per_min))
                .route(web::get().to(handlers::login_form))
                .route(web::post().to(handlers::login)),
        )
        .service(web::resource("/logout").route(web::post().to(handlers::logout)));

    // Everything else needs a session
    cfg.service(
        web::scope("")
            .wrap(from_fn(require_session))
            .route("/", web::get().to(|| async { see_other("/enrollments") }))
            // /students
            .service(
                web::resource("/students")
                    .route(web::get().to(students::list_students))
                    .route(web::post().to(students::create_student)),
            )
            .route("/students/new", web::get().to(students::new_student))
            .route("/students/{id}/delete", web::post().to(students::delete_student))
            // /courses
            .service(
                web::resource("/courses")
                    .route(web::get().to(courses::list_courses))
                    .route(web::post().to(courses::create_course)),
            )
            .route("/courses/new", web::get().to(courses::new_course))
            .route("/courses/{id}/delete", web::post().to(courses::delete_course))
            // /enrollments
            .service(
                web::resource("/enrollments")
                    .route(web::get().to(enrollments::list_enrollments))
                    .route(web::post().to(enrollments::create_enrollment)),
            )
            .route("/enrollments/new", web::get().to(enrollments::new_enrollment))
            .route(
                "/enrollments/{id}/delete",
                web::post().to(enrollments::delete_enrollment),
            )
            // /enrollments/{id}/payments
            .service(
                web::resource("/enrollments/{id}/payments")
                    .route(web::get().to(payments::list_payments))
                    .route(web::post().to(payments::create_payment)),
            )
            // invoices
            .route(
                "/enrollments/{id}/invoice.pdf",
                web::get().to(invoices::invoice_pdf),
            )
            .route("/enrollments/{id}/invoice", web::get().to(invoices::invoice_html)),
    );
}
