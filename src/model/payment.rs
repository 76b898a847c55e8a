use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    pub id: i64,
    pub enrollment_id: i64,
    pub amount: i64,
    pub payment_date: String,
    pub note: Option<String>,
    pub created_at: String,
}
