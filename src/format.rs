use crate::api::StatValue;

const THOUSANDS_SEP: char = ',';
const MAX_FRACTION_DIGITS: usize = 3;

/// Integer prefix of `raw` the way `parseInt` reads it: optional sign, then
/// leading ASCII digits. `None` when no digit is found.
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits: &str = {
        let end = rest
            .bytes()
            .position(|b| !b.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }
    let value = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

/// True when the whole string reads as a finite number.
pub fn is_numeric_text(raw: &str) -> bool {
    let trimmed = raw.trim();
    !trimmed.is_empty() && trimmed.parse::<f64>().is_ok_and(f64::is_finite)
}

pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(THOUSANDS_SEP);
        }
        out.push(ch);
    }
    out
}

/// Locale-style number: grouped integer part, at most three fraction digits,
/// trailing zeros dropped.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let fixed = format!("{:.*}", MAX_FRACTION_DIGITS, value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');
    let grouped = group_thousands(int_part.parse::<i64>().unwrap_or(0));
    let sign = if value < 0.0 && (int_part != "0" || !frac.is_empty()) {
        "-"
    } else {
        ""
    };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

/// Generic stat cell: numbers and numeric-looking strings get separators,
/// other strings pass through, absent values read `0`.
pub fn format_stat(value: Option<&StatValue>) -> String {
    match value {
        Some(StatValue::Int(v)) => group_thousands(*v),
        Some(StatValue::Float(v)) => format_number(*v),
        Some(StatValue::Text(s)) if is_numeric_text(s) => {
            group_thousands(parse_int_prefix(s).unwrap_or(0))
        }
        Some(StatValue::Text(s)) => s.clone(),
        None => "0".to_string(),
    }
}

/// Ratios (K/D) keep one decimal. Text is shown as sent.
pub fn format_ratio(value: Option<&StatValue>) -> String {
    match value {
        Some(StatValue::Int(v)) => format!("{:.1}", *v as f64),
        Some(StatValue::Float(v)) => format!("{v:.1}"),
        Some(StatValue::Text(s)) => s.clone(),
        None => "0.0".to_string(),
    }
}

/// `0.4567` -> `45.7%`.
pub fn format_percent(fraction: f64) -> String {
    let fraction = if fraction.is_finite() { fraction } else { 0.0 };
    format!("{:.1}%", fraction * 100.0)
}

pub fn format_distance(value: Option<&StatValue>) -> String {
    format!("{} m", format_stat(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_prefix_follows_parse_int() {
        assert_eq!(parse_int_prefix("42"), Some(42));
        assert_eq!(parse_int_prefix("  12.9"), Some(12));
        assert_eq!(parse_int_prefix("-7kg"), Some(-7));
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix(""), None);
    }

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
        assert_eq!(group_thousands(-12345), "-12,345");
    }

    #[test]
    fn numbers_keep_up_to_three_decimals() {
        assert_eq!(format_number(1234.5), "1,234.5");
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(0.12345), "0.123");
        assert_eq!(format_number(-0.0001), "0");
    }

    #[test]
    fn stat_cells() {
        assert_eq!(format_stat(Some(&StatValue::Text("15230".into()))), "15,230");
        assert_eq!(format_stat(Some(&StatValue::Text("12h 30m".into()))), "12h 30m");
        assert_eq!(format_stat(Some(&StatValue::Int(4200))), "4,200");
        assert_eq!(format_stat(None), "0");
    }

    #[test]
    fn ratios_and_percentages_use_one_decimal() {
        assert_eq!(format_ratio(Some(&StatValue::Float(2.345))), "2.3");
        assert_eq!(format_ratio(Some(&StatValue::Int(3))), "3.0");
        assert_eq!(format_percent(0.4567), "45.7%");
        assert_eq!(format_percent(0.0), "0.0%");
    }
}
