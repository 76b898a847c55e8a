pub const INVOICE_PREFIX: &str = "HIQ";

/// Next invoice number after `last`, for the given calendar year.
///
/// Numbers look like `HIQ-2024-0007`. The counter restarts at `0001` when
/// the last issued number belongs to another year. Past `9999` the suffix
/// just widens. Only the leading digits of each part are read, so
/// `HIQ-2024-0007x` continues from 7 and a suffix with no digits counts
/// as 0.
///
/// `None` when the counter cannot advance: the suffix is too wide for a
/// `u64`, or is `u64::MAX` already.
pub fn next_invoice_number(last: Option<&str>, year: i32) -> Option<String> {
    let next = match last {
        Some(last) => {
            let mut parts = last.trim().split('-');
            let _prefix = parts.next();
            let last_year = parts
                .next()
                .and_then(|y| leading_digits(y).parse::<i32>().ok());

            match last_year {
                Some(y) if y != year => 1,
                _ => {
                    let digits = parts.next().map(leading_digits).unwrap_or("");
                    let last_seq = if digits.is_empty() {
                        0
                    } else {
                        digits.parse::<u64>().ok()?
                    };
                    last_seq.checked_add(1)?
                }
            }
        }
        None => 1,
    };

    Some(format!("{INVOICE_PREFIX}-{year}-{next:04}"))
}

/// Whether a number can sit at the head of the sequence, i.e. some
/// number can still follow it within its year.
pub fn can_follow(number: &str) -> bool {
    let suffix = number.trim().split('-').nth(2).map(leading_digits).unwrap_or("");
    suffix.is_empty() || suffix.parse::<u64>().is_ok_and(|n| n < u64::MAX)
}

fn leading_digits(s: &str) -> &str {
    let s = s.trim_start();
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    &s[..end]
}
