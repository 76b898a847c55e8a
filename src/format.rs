use chrono::NaiveDate;

/// Whole-rupee amount with thousands separators: `11800` -> `11,800`.
pub fn amount(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// `YYYY-MM-DD` as `DD/MM/YYYY`; anything unparseable is returned as-is.
pub fn date_dmy(iso: &str) -> String {
    let head = iso.get(..10).unwrap_or(iso);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|_| iso.to_string())
}
