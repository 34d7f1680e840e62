// Utility helpers for parsing and display formatting.
//
// This module centralizes the "dirty" cell handling so the rest of the code
// can assume clean, typed values.
use num_format::{Locale, ToFormattedString};

/// Normalize a raw `ACCTIME` cell into an hour of day.
///
/// The export stores times as 3-or-4-digit clock values ("1430" is 2:30 pm),
/// so the hour is whatever remains after dropping the trailing two minute
/// digits. The sentinel `99` (checked after the drop, matching how the
/// source data encodes it) and empty/missing cells normalize to 0.
///
/// Returns `None` for cells that are not digit strings or that leave an
/// hour outside `0..=23`; those violate the load contract.
pub fn normalize_hour(raw: Option<&str>) -> Option<u32> {
    let s = raw.unwrap_or("").trim();
    if s.is_empty() {
        return Some(0);
    }
    if !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let head = &s[..s.len().saturating_sub(2)];
    if head.is_empty() || head == "99" {
        return Some(0);
    }
    let hour: u32 = head.parse().ok()?;
    if hour <= 23 {
        Some(hour)
    } else {
        None
    }
}

/// Parse an injury/fatality cell into a non-negative count.
pub fn parse_count(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<u32>().ok()
}

/// Share of `part` in `total`, in percent. A zero total yields 0 rather
/// than NaN.
pub fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    // First, format to a plain fixed-decimal string like `1234567.89`.
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion.
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values, used for
    // counts in console messages (e.g., `555 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_hour_drops_minutes() {
        assert_eq!(normalize_hour(Some("1430")), Some(14));
        assert_eq!(normalize_hour(Some("930")), Some(9));
        assert_eq!(normalize_hour(Some("0015")), Some(0));
    }

    #[test]
    fn test_normalize_hour_sentinels() {
        assert_eq!(normalize_hour(Some("99")), Some(0));
        assert_eq!(normalize_hour(Some("")), Some(0));
        assert_eq!(normalize_hour(None), Some(0));
        // Sentinel with minute digits attached.
        assert_eq!(normalize_hour(Some("9999")), Some(0));
        // A bare minute value has no hour digits left.
        assert_eq!(normalize_hour(Some("30")), Some(0));
    }

    #[test]
    fn test_normalize_hour_rejects_garbage() {
        assert_eq!(normalize_hour(Some("2560")), None);
        assert_eq!(normalize_hour(Some("14:30")), None);
        assert_eq!(normalize_hour(Some("noon")), None);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("3"), Some(3));
        assert_eq!(parse_count(" 0 "), Some(0));
        assert_eq!(parse_count(""), None);
        assert_eq!(parse_count("-1"), None);
        assert_eq!(parse_count("two"), None);
    }

    #[test]
    fn test_percentage_zero_total() {
        assert_eq!(percentage(5, 0), 0.0);
        assert_eq!(percentage(3, 4), 75.0);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(75.0, 2), "75.00");
        assert_eq!(format_number(-12.5, 1), "-12.5");
    }

    #[test]
    fn test_format_int() {
        assert_eq!(format_int(555), "555");
        assert_eq!(format_int(1000), "1,000");
    }
}
