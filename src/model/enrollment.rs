use serde::{Deserialize, Serialize};

use crate::billing::Ledger;

/// Enrollment joined with its student and course.
///
/// `amount_paid` is the sum of the enrollment's payments, not the
/// legacy column of the same name.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EnrollmentDetail {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub invoice_number: String,
    pub invoice_date: String,
    pub gst_rate: i64,
    pub created_at: String,
    pub pan: Option<String>,
    pub student_name: String,
    pub student_email: Option<String>,
    pub student_phone: Option<String>,
    pub course_name: String,
    pub base_amount: i64,
    pub amount_paid: i64,
}

impl EnrollmentDetail {
    pub fn ledger(&self) -> Ledger {
        Ledger::compute(self.base_amount, self.gst_rate, self.amount_paid)
    }
}
