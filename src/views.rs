//! Server-rendered pages.
//!
//! Templates are compiled into the binary so the server has no runtime
//! dependency on the working directory.

use std::collections::HashMap;

use actix_web::{HttpResponse, http::header::ContentType};
use tera::{Context, Filter, Tera, Value, escape_html};

use crate::auth::auth::SessionUser;
use crate::error::AppResult;
use crate::format;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("students.html", include_str!("../templates/students.html")),
    ("student_form.html", include_str!("../templates/student_form.html")),
    ("courses.html", include_str!("../templates/courses.html")),
    ("course_form.html", include_str!("../templates/course_form.html")),
    ("enrollments.html", include_str!("../templates/enrollments.html")),
    ("enrollment_form.html", include_str!("../templates/enrollment_form.html")),
    ("payments.html", include_str!("../templates/payments.html")),
    ("invoice.html", include_str!("../templates/invoice.html")),
];

pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn new() -> AppResult<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        tera.register_filter("amount", AmountFilter);
        tera.register_filter("date_dmy", DateDmyFilter);

        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, ctx: &Context) -> AppResult<String> {
        Ok(self.tera.render(name, ctx)?)
    }

    /// 200 HTML response.
    pub fn page(&self, name: &str, ctx: &Context) -> AppResult<HttpResponse> {
        let body = self.render(name, ctx)?;
        Ok(HttpResponse::Ok()
            .content_type(ContentType::html())
            .body(body))
    }
}

/// Base context every page gets: the logged-in user, if any.
pub fn context(user: Option<&SessionUser>) -> Context {
    let mut ctx = Context::new();
    ctx.insert("current_user", &user);
    ctx
}

/// `{{ n | amount }}`. Output is digits and commas only, so it skips
/// autoescaping.
struct AmountFilter;

impl Filter for AmountFilter {
    fn filter(&self, value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
        match value.as_i64() {
            Some(n) => Ok(Value::String(format::amount(n))),
            None => Err(tera::Error::msg(format!(
                "amount filter expects an integer, got {value}"
            ))),
        }
    }

    fn is_safe(&self) -> bool {
        true
    }
}

/// `{{ d | date_dmy }}`. Marked safe so the slashes survive; input that is
/// not a date is escaped here instead.
struct DateDmyFilter;

impl Filter for DateDmyFilter {
    fn filter(&self, value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
        let raw = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let formatted = format::date_dmy(&raw);

        if formatted == raw {
            Ok(Value::String(escape_html(&raw)))
        } else {
            Ok(Value::String(formatted))
        }
    }

    fn is_safe(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_templates_compile() {
        Views::new().unwrap();
    }

    #[test]
    fn login_page_shows_error() {
        let views = Views::new().unwrap();
        let mut ctx = context(None);
        ctx.insert("error", "Invalid username or password");

        let html = views.render("login.html", &ctx).unwrap();
        assert!(html.contains("Invalid username or password"));
    }

    #[test]
    fn user_input_is_escaped() {
        let views = Views::new().unwrap();
        let mut ctx = context(Some(&SessionUser {
            user_id: 1,
            username: "admin".into(),
        }));
        ctx.insert(
            "students",
            &vec![crate::model::Student {
                id: 1,
                name: "<script>x</script>".into(),
                email: None,
                phone: None,
            }],
        );

        let html = views.render("students.html", &ctx).unwrap();
        assert!(!html.contains("<script>x</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    fn render_one(template: &str, value: Value) -> String {
        let mut tera = Tera::default();
        tera.add_raw_template("one.html", template).unwrap();
        tera.register_filter("amount", AmountFilter);
        tera.register_filter("date_dmy", DateDmyFilter);

        let mut ctx = Context::new();
        ctx.insert("v", &value);
        tera.render("one.html", &ctx).unwrap()
    }

    #[test]
    fn dates_render_with_plain_slashes() {
        assert_eq!(
            render_one("{{ v | date_dmy }}", Value::from("2024-06-01")),
            "01/06/2024"
        );
        assert_eq!(
            render_one("{{ v | date_dmy }}", Value::from("2024-06-01T09:30:00+00:00")),
            "01/06/2024"
        );
    }

    #[test]
    fn unparseable_dates_are_still_escaped() {
        assert_eq!(
            render_one("{{ v | date_dmy }}", Value::from("<b>soon</b>")),
            "&lt;b&gt;soon&lt;&#x2F;b&gt;"
        );
    }

    #[test]
    fn amounts_render_grouped() {
        assert_eq!(render_one("{{ v | amount }}", Value::from(-1_234_567)), "-1,234,567");
    }
}
