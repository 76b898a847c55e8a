//! Form payloads and the session claims.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct NewStudent {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct NewCourse {
    pub name: String,
    pub base_amount: String,
}

#[derive(Debug, Deserialize)]
pub struct NewEnrollment {
    pub student_id: String,
    pub course_id: String,
    #[serde(default)]
    pub invoice_number: String,
    #[serde(default)]
    pub invoice_date: String,
    #[serde(default)]
    pub gst_rate: String,
    /// First installment, recorded together with the enrollment when > 0.
    #[serde(default)]
    pub amount_paid: String,
    #[serde(default)]
    pub pan: String,
}

#[derive(Debug, Deserialize)]
pub struct NewPayment {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub payment_date: String,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub sub: String,
    pub exp: usize,
    pub jti: String,
}

/// Leading integer of a form field; blank or garbage gives `default`.
pub fn parse_int_field(raw: &str, default: i64) -> i64 {
    let raw = raw.trim();
    let end = raw
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(raw.len());

    raw[..end].parse().unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::parse_int_field;

    #[test]
    fn lenient_integer_parsing() {
        assert_eq!(parse_int_field("18", 0), 18);
        assert_eq!(parse_int_field("  5000 ", 0), 5000);
        assert_eq!(parse_int_field("12abc", 0), 12);
        assert_eq!(parse_int_field("", 18), 18);
        assert_eq!(parse_int_field("abc", 7), 7);
        assert_eq!(parse_int_field("-3", 0), -3);
        assert_eq!(parse_int_field("-", 9), 9);
    }
}
