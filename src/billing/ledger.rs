use serde::Serialize;

/// Largest fee or installment the forms accept, in rupees.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Largest GST percentage the forms accept.
pub const MAX_GST_RATE: i64 = 100;

/// Tax, total and outstanding balance of one enrollment.
///
/// All amounts are whole rupees. `balance` goes negative on overpayment
/// and is shown that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ledger {
    pub base: i64,
    pub gst_rate: i64,
    pub tax: i64,
    pub total: i64,
    pub paid: i64,
    pub balance: i64,
}

impl Ledger {
    pub fn compute(base: i64, gst_rate: i64, paid: i64) -> Self {
        let tax = gst_amount(base, gst_rate);
        let total = base.saturating_add(tax);

        Self {
            base,
            gst_rate,
            tax,
            total,
            paid,
            balance: total.saturating_sub(paid),
        }
    }
}

/// `round(base * rate / 100)` with halves rounded up, i.e. `floor(x + 0.5)`.
///
/// Worked in `i128`; a result beyond `i64` saturates.
pub fn gst_amount(base: i64, rate: i64) -> i64 {
    let tax = (i128::from(base) * i128::from(rate) + 50).div_euclid(100);
    i64::try_from(tax).unwrap_or(if tax < 0 { i64::MIN } else { i64::MAX })
}
