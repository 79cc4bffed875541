//! Display and date-label helpers shared by the listing and report layers.
//!
//! Date labels are always computed from explicit year/month/day components
//! instead of `Date`-style timestamp parsing. This is the canonical
//! technique here: parsing `YYYY-MM-DD` through a timezone-aware clock
//! shifts the calendar day for users west of UTC.

use chrono::{Datelike, NaiveDate};

const WEEKDAY_LABELS: [&str; 7] = [
    "DOMINGO", "SEGUNDA", "TERÇA", "QUARTA", "QUINTA", "SEXTA", "SÁBADO",
];

/// Parse a `YYYY-MM-DD` string into a date via explicit components.
/// Returns `None` for malformed or impossible dates.
pub fn parse_ymd(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.trim().split('-');
    let year: i32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let day: u32 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `2025-03-26` -> `26/03/2025`. Already-BR strings pass through, as does
/// anything that does not split into three parts.
pub fn format_date_br(raw: &str) -> String {
    if raw.is_empty() || raw.contains('/') {
        return raw.to_string();
    }
    let parts: Vec<&str> = raw.split('-').collect();
    match parts.as_slice() {
        [year, month, day] if !year.is_empty() && !month.is_empty() && !day.is_empty() => {
            format!("{:0>2}/{:0>2}/{year}", day, month)
        }
        _ => raw.to_string(),
    }
}

/// Uppercase weekday label (`DOMINGO`..`SÁBADO`) for a `YYYY-MM-DD`
/// string; empty when the date does not parse.
pub fn day_label(raw: &str) -> &'static str {
    match parse_ymd(raw) {
        Some(date) => WEEKDAY_LABELS[date.weekday().num_days_from_sunday() as usize],
        None => "",
    }
}

/// `MM/YYYY` month label for a `YYYY-MM-DD` string; empty when malformed.
pub fn month_label(raw: &str) -> String {
    let mut parts = raw.split('-');
    match (parts.next(), parts.next()) {
        (Some(year), Some(month)) if !year.is_empty() && !month.is_empty() => {
            format!("{:0>2}/{year}", month)
        }
        _ => String::new(),
    }
}

/// BRL currency display: `1234.56` -> `R$ 1.234,56` (dot thousands,
/// comma decimals).
pub fn format_brl(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let cents = (value.abs() * 100.0).round() as i64;
    let int_part = group_thousands(cents / 100);
    format!("R$ {sign}{int_part},{:02}", cents % 100)
}

fn group_thousands(value: i64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// Quantity display: whole numbers without a fraction, fractional ones
/// with the BR comma decimal ("1,5" kg). Zero renders empty, matching
/// the blank lines of the order sheet.
pub fn format_quantity(quantity: f64) -> String {
    if quantity <= 0.0 {
        String::new()
    } else if quantity.fract() == 0.0 {
        format!("{}", quantity as i64)
    } else {
        format!("{quantity}").replace('.', ",")
    }
}

/// Keep only ASCII digits; used by id filters and quantity inputs.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Brazilian phone mask, tolerant of partial input:
/// `11987654321` -> `(11) 98765-4321`, `1132654321` -> `(11) 3265-4321`.
pub fn format_phone(raw: &str) -> String {
    let digits: String = digits_only(raw).chars().take(11).collect();
    match digits.len() {
        0 => String::new(),
        1..=2 => format!("({digits}"),
        3..=6 => format!("({}) {}", &digits[..2], &digits[2..]),
        7..=10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        _ => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_explicit_components_only() {
        assert_eq!(
            parse_ymd("2026-08-07"),
            NaiveDate::from_ymd_opt(2026, 8, 7)
        );
        assert_eq!(parse_ymd("2026-13-01"), None);
        assert_eq!(parse_ymd("2026-08"), None);
        assert_eq!(parse_ymd(""), None);
        assert_eq!(parse_ymd("hoje"), None);
    }

    #[test]
    fn br_date_formatting() {
        assert_eq!(format_date_br("2025-03-26"), "26/03/2025");
        assert_eq!(format_date_br("26/03/2025"), "26/03/2025");
        assert_eq!(format_date_br(""), "");
        assert_eq!(format_date_br("2025"), "2025");
    }

    #[test]
    fn weekday_and_month_labels() {
        // 2026-08-07 is a Friday
        assert_eq!(day_label("2026-08-07"), "SEXTA");
        assert_eq!(day_label("2026-08-09"), "DOMINGO");
        assert_eq!(day_label("n/a"), "");
        assert_eq!(month_label("2026-08-07"), "08/2026");
        assert_eq!(month_label(""), "");
    }

    #[test]
    fn brl_formatting_groups_thousands() {
        assert_eq!(format_brl(1234.56), "R$ 1.234,56");
        assert_eq!(format_brl(0.0), "R$ 0,00");
        assert_eq!(format_brl(89.9), "R$ 89,90");
        assert_eq!(format_brl(1_000_000.0), "R$ 1.000.000,00");
        assert_eq!(format_brl(-12.5), "R$ -12,50");
    }

    #[test]
    fn phone_mask_handles_partial_and_full_numbers() {
        assert_eq!(format_phone(""), "");
        assert_eq!(format_phone("11"), "(11");
        assert_eq!(format_phone("119876"), "(11) 9876");
        assert_eq!(format_phone("1132654321"), "(11) 3265-4321");
        assert_eq!(format_phone("11987654321"), "(11) 98765-4321");
        assert_eq!(format_phone("(11) 98765-4321 ext"), "(11) 98765-4321");
    }
}
