use std::net::SocketAddr;

use actix_web::{
    App,
    cookie::Cookie,
    http::{StatusCode, header},
    test,
    web::Data,
};
use chrono::Utc;

use hiq_invoice::auth::handlers::LOGIN_ERROR;
use hiq_invoice::auth::jwt::SESSION_COOKIE;
use hiq_invoice::config::Config;
use hiq_invoice::db::{DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME, Db};
use hiq_invoice::routes;
use hiq_invoice::store::{courses, enrollments, students};
use hiq_invoice::views::Views;

macro_rules! init_app {
    ($db:expr) => {{
        let config = Config::default();
        test::init_service(
            App::new()
                .app_data(Data::new($db.clone()))
                .app_data(Data::new(config.clone()))
                .app_data(Data::new(Views::new().unwrap()))
                .configure(|cfg| routes::configure(cfg, &config)),
        )
        .await
    }};
}

fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

fn location(resp: &actix_web::dev::ServiceResponse) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn session_cookie(resp: &actix_web::dev::ServiceResponse) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
}

/// Logs in as the seeded admin and returns the session cookie.
macro_rules! login {
    ($app:expr) => {{
        let req = test::TestRequest::post()
            .uri("/login")
            .peer_addr(peer())
            .set_form([
                ("username", DEFAULT_ADMIN_USERNAME),
                ("password", DEFAULT_ADMIN_PASSWORD),
            ])
            .to_request();
        let resp = test::call_service(&$app, req).await;
        session_cookie(&resp).expect("login sets a session cookie")
    }};
}

#[actix_web::test]
async fn health_is_public() {
    let db = Db::in_memory().await.unwrap();
    let app = init_app!(db);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, serde_json::json!({ "status": "ok" }));
}

#[actix_web::test]
async fn protected_pages_redirect_to_login() {
    let db = Db::in_memory().await.unwrap();
    let app = init_app!(db);

    for uri in ["/", "/students", "/courses", "/enrollments", "/enrollments/1/invoice.pdf"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&resp), "/login", "{uri}");
    }
}

#[actix_web::test]
async fn forged_session_is_rejected() {
    let db = Db::in_memory().await.unwrap();
    let app = init_app!(db);

    let req = test::TestRequest::get()
        .uri("/students")
        .cookie(Cookie::new(SESSION_COOKIE, "not.a.token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
}

#[actix_web::test]
async fn correct_login_sets_session_and_redirects() {
    let db = Db::in_memory().await.unwrap();
    let app = init_app!(db);

    let req = test::TestRequest::post()
        .uri("/login")
        .peer_addr(peer())
        .set_form([
            ("username", DEFAULT_ADMIN_USERNAME),
            ("password", DEFAULT_ADMIN_PASSWORD),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/enrollments");
    let cookie = session_cookie(&resp).expect("session cookie");
    assert!(cookie.http_only().unwrap_or(false));

    let req = test::TestRequest::get()
        .uri("/enrollments")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn wrong_password_rerenders_form_without_session() {
    let db = Db::in_memory().await.unwrap();
    let app = init_app!(db);

    for (username, password) in [(DEFAULT_ADMIN_USERNAME, "wrong"), ("nobody", "Admin@123")] {
        let req = test::TestRequest::post()
            .uri("/login")
            .peer_addr(peer())
            .set_form([("username", username), ("password", password)])
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(session_cookie(&resp).is_none());

        let body = test::read_body(resp).await;
        let html = String::from_utf8_lossy(&body);
        assert!(html.contains(LOGIN_ERROR), "{username}");
    }
}

#[actix_web::test]
async fn login_page_redirects_when_already_signed_in() {
    let db = Db::in_memory().await.unwrap();
    let app = init_app!(db);
    let cookie = login!(app);

    let req = test::TestRequest::get()
        .uri("/login")
        .peer_addr(peer())
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/enrollments");
}

#[actix_web::test]
async fn logout_clears_cookie() {
    let db = Db::in_memory().await.unwrap();
    let app = init_app!(db);
    let cookie = login!(app);

    let req = test::TestRequest::post()
        .uri("/logout")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");

    let cleared = session_cookie(&resp).expect("removal cookie");
    assert_eq!(cleared.value(), "");
}

#[actix_web::test]
async fn enrollment_flow_through_forms() {
    let db = Db::in_memory().await.unwrap();
    let app = init_app!(db);
    let cookie = login!(app);

    let req = test::TestRequest::post()
        .uri("/students")
        .cookie(cookie.clone())
        .set_form([("name", " Asha Rao "), ("email", "asha@example.com"), ("phone", "")])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::SEE_OTHER);

    let req = test::TestRequest::post()
        .uri("/courses")
        .cookie(cookie.clone())
        .set_form([("name", "Data Science"), ("base_amount", "10000")])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::SEE_OTHER);

    let student = students::list(&db).await.unwrap()[0].clone();
    assert_eq!(student.name, "Asha Rao");
    let course = courses::list(&db).await.unwrap()[0].clone();

    let req = test::TestRequest::get()
        .uri("/enrollments/new")
        .cookie(cookie.clone())
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    let year = chrono::Local::now().format("%Y").to_string();
    assert!(String::from_utf8_lossy(&body).contains(&format!("HIQ-{year}-0001")));

    let student_id = student.id.to_string();
    let course_id = course.id.to_string();
    let req = test::TestRequest::post()
        .uri("/enrollments")
        .cookie(cookie.clone())
        .set_form([
            ("student_id", student_id.as_str()),
            ("course_id", course_id.as_str()),
            ("invoice_number", ""),
            ("invoice_date", "2024-06-01"),
            ("gst_rate", "18"),
            ("amount_paid", "5000"),
            ("pan", "ABCDE1234F"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/enrollments");

    let enrollment = enrollments::list(&db).await.unwrap()[0].clone();
    assert_eq!(enrollment.amount_paid, 5_000);
    assert_eq!(enrollment.ledger().balance, 6_800);

    let req = test::TestRequest::post()
        .uri(&format!("/enrollments/{}/payments", enrollment.id))
        .cookie(cookie.clone())
        .set_form([("amount", "6800"), ("payment_date", "2024-07-01"), ("note", "final")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/enrollments/{}/payments", enrollment.id));

    let req = test::TestRequest::get()
        .uri(&format!("/enrollments/{}/invoice", enrollment.id))
        .cookie(cookie.clone())
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    let html = String::from_utf8_lossy(&body);
    assert!(html.contains("11,800"));
    assert!(html.contains("01/06/2024"));
    assert!(html.contains("PAN: ABCDE1234F"));

    let req = test::TestRequest::get()
        .uri(&format!("/enrollments/{}/invoice.pdf", enrollment.id))
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    let disposition = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(
        disposition,
        format!("attachment; filename=invoice-{}.pdf", enrollment.invoice_number)
    );
    let pdf = test::read_body(resp).await;
    assert!(pdf.starts_with(b"%PDF-"));

    let detail = enrollments::get(&db, enrollment.id).await.unwrap();
    assert_eq!(detail.ledger().balance, 0);
}

#[actix_web::test]
async fn zero_payment_is_ignored() {
    let db = Db::in_memory().await.unwrap();
    let student = students::create(&db, "Ravi", "", "").await.unwrap();
    let course = courses::create(&db, "Python", 5_000).await.unwrap();
    let created = enrollments::create(
        &db,
        enrollments::EnrollmentInput {
            student_id: student,
            course_id: course,
            invoice_number: None,
            invoice_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            gst_rate: 18,
            pan: None,
            first_payment: 0,
        },
        chrono::NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        Utc::now(),
    )
    .await
    .unwrap();

    let app = init_app!(db);
    let cookie = login!(app);

    let req = test::TestRequest::post()
        .uri(&format!("/enrollments/{}/payments", created.id))
        .cookie(cookie)
        .set_form([("amount", "0"), ("note", "nothing")])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::SEE_OTHER);

    assert_eq!(enrollments::get(&db, created.id).await.unwrap().amount_paid, 0);
}

#[actix_web::test]
async fn missing_enrollment_is_not_found() {
    let db = Db::in_memory().await.unwrap();
    let app = init_app!(db);
    let cookie = login!(app);

    for uri in [
        "/enrollments/42/payments",
        "/enrollments/42/invoice",
        "/enrollments/42/invoice.pdf",
    ] {
        let req = test::TestRequest::get().uri(uri).cookie(cookie.clone()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }

    let req = test::TestRequest::post()
        .uri("/enrollments/42/payments")
        .cookie(cookie)
        .set_form([("amount", "100")])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn delete_student_route_cascades() {
    let db = Db::in_memory().await.unwrap();
    let student = students::create(&db, "Ravi", "", "").await.unwrap();
    let course = courses::create(&db, "Python", 5_000).await.unwrap();
    enrollments::create(
        &db,
        enrollments::EnrollmentInput {
            student_id: student,
            course_id: course,
            invoice_number: None,
            invoice_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            gst_rate: 18,
            pan: None,
            first_payment: 1_000,
        },
        chrono::NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        Utc::now(),
    )
    .await
    .unwrap();

    let app = init_app!(db);
    let cookie = login!(app);

    let req = test::TestRequest::post()
        .uri(&format!("/students/{student}/delete"))
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/students");

    let payments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(payments, 0);
    assert!(enrollments::list(&db).await.unwrap().is_empty());
}

#[actix_web::test]
async fn oversized_amounts_are_rejected() {
    let db = Db::in_memory().await.unwrap();
    let app = init_app!(db);
    let cookie = login!(app);

    let req = test::TestRequest::post()
        .uri("/courses")
        .cookie(cookie.clone())
        .set_form([("name", "Huge"), ("base_amount", "922337203685477580")])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    assert!(courses::list(&db).await.unwrap().is_empty());

    let student = students::create(&db, "Ravi", "", "").await.unwrap().to_string();
    let course = courses::create(&db, "Python", 5_000).await.unwrap().to_string();
    let req = test::TestRequest::post()
        .uri("/enrollments")
        .cookie(cookie.clone())
        .set_form([
            ("student_id", student.as_str()),
            ("course_id", course.as_str()),
            ("invoice_number", ""),
            ("invoice_date", "2024-06-01"),
            ("gst_rate", "922337203685477580"),
            ("amount_paid", "0"),
            ("pan", ""),
        ])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    assert!(enrollments::list(&db).await.unwrap().is_empty());

    let req = test::TestRequest::get()
        .uri("/enrollments")
        .cookie(cookie)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}
