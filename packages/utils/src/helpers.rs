use authz_grant_spec::Grant;
use chrono::{DateTime, Utc};

pub trait Expirable {
    fn is_expired(&self, now: &DateTime<Utc>) -> bool;
    fn is_not_expired(&self, now: &DateTime<Utc>) -> bool;
}

impl Expirable for Grant {
    // grants without an expiration never expire
    fn is_expired(&self, now: &DateTime<Utc>) -> bool {
        self.expiration.map_or(false, |expiration| *now > expiration)
    }
    fn is_not_expired(&self, now: &DateTime<Utc>) -> bool {
        !self.is_expired(now)
    }
}

/// Converts a base denom amount string into display units, e.g. "1500000" with 6 decimals -> 1.5
pub fn parse_denom_amount(amount: &str, decimals: u32) -> f64 {
    let exponent = i32::try_from(decimals).unwrap_or(i32::MAX);
    amount
        .parse::<f64>()
        .map(|amount| amount / 10f64.powi(exponent))
        .unwrap_or(0.0)
}

/// Formats a display amount with at most two fractional digits and thousands separators
pub fn format_number(amount: f64) -> String {
    let rounded = format!("{:.2}", amount);
    let (whole, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let (sign, digits) = match whole.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", whole),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, fraction)
    }
}

/// Cuts a long string (usually an address) down to `len` characters followed by "..."
pub fn shorten(value: &str, len: usize) -> String {
    if value.chars().count() <= len {
        return value.to_string();
    }
    format!("{}...", value.chars().take(len).collect::<String>())
}
