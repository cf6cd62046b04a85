//! Utility functions for formatting and input checks
//!
//! This module provides centralized formatting utilities for consistent
//! display of NAV, share and money values throughout the application,
//! plus the fund-code validation shared by every command.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::FundError;

/// Core formatting function with full control over output.
///
/// Formats a Decimal value rounded to 2 places with `,` as thousands
/// separator and `.` as decimal separator (zh-CN convention).
///
/// # Examples
/// ```
/// use fundwatch::utils::format_amount_with_width;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_amount_with_width(dec!(1234.56), 0), "1,234.56");
/// assert_eq!(format_amount_with_width(dec!(1234), 12), "    1,234.00");
/// ```
pub fn format_amount_with_width(value: Decimal, width: usize) -> String {
    let is_negative = value < Decimal::ZERO;
    let abs_value = value.abs().round_dp(2);

    let formatted = format!("{:.2}", abs_value);
    let (integer_part, decimal_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    // Add thousands separators to integer part
    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative && abs_value > Decimal::ZERO {
        "-"
    } else {
        ""
    };
    let result = format!("{}{}.{}", sign, with_separators, decimal_part);

    if width > 0 && result.len() < width {
        format!("{:>width$}", result, width = width)
    } else {
        result
    }
}

/// Format a money/share amount: "1,234.56"
pub fn format_amount(value: Decimal) -> String {
    format_amount_with_width(value, 0)
}

/// Format an optional amount, `-` when absent
pub fn format_optional_amount(value: Option<Decimal>) -> String {
    value.map(format_amount).unwrap_or_else(|| "-".to_string())
}

/// Format a growth percentage with explicit sign: "+1.23%"
///
/// # Examples
/// ```
/// use fundwatch::utils::format_percent;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_percent(dec!(10)), "+10.00%");
/// assert_eq!(format_percent(dec!(-0.5)), "-0.50%");
/// ```
pub fn format_percent(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let prefix = if rounded > Decimal::ZERO { "+" } else { "" };
    format!("{}{:.2}%", prefix, rounded)
}

/// Format a signed delta: "+10.00" / "-3.20"
pub fn format_signed_amount(value: Decimal) -> String {
    let formatted = format_amount(value);
    if value.round_dp(2) > Decimal::ZERO {
        format!("+{}", formatted)
    } else {
        formatted
    }
}

/// Check that `code` is a 6-digit ASCII fund code.
pub fn validate_code(code: &str) -> Result<(), FundError> {
    if code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(FundError::Validation(format!(
            "invalid fund code '{}': expected 6 digits",
            code
        )))
    }
}

/// True when `date` is between `days` days ago and `today`, inclusive.
pub fn is_within_days(date: NaiveDate, today: NaiveDate, days: i64) -> bool {
    let diff = today.signed_duration_since(date).num_days();
    (0..=days).contains(&diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_amount_basic() {
        assert_eq!(format_amount(dec!(1234.56)), "1,234.56");
        assert_eq!(format_amount(dec!(0.99)), "0.99");
        assert_eq!(format_amount(dec!(1000000)), "1,000,000.00");
    }

    #[test]
    fn test_format_amount_small_values() {
        assert_eq!(format_amount(dec!(0)), "0.00");
        assert_eq!(format_amount(dec!(0.01)), "0.01");
        assert_eq!(format_amount(dec!(12)), "12.00");
        assert_eq!(format_amount(dec!(999.99)), "999.99");
    }

    #[test]
    fn test_format_amount_negative() {
        assert_eq!(format_amount(dec!(-1234.56)), "-1,234.56");
        assert_eq!(format_amount(dec!(-1000000)), "-1,000,000.00");
    }

    #[test]
    fn test_format_amount_rounds_to_cents() {
        assert_eq!(format_amount(dec!(1.235)), "1.24");
        assert_eq!(format_amount(dec!(2.5001)), "2.50");
    }

    #[test]
    fn test_format_with_width() {
        let result = format_amount_with_width(dec!(100), 10);
        assert_eq!(result, "    100.00");
        let result = format_amount_with_width(dec!(1000000), 5);
        assert_eq!(result, "1,000,000.00");
    }

    #[test]
    fn test_format_percent_and_signed() {
        assert_eq!(format_percent(dec!(0)), "0.00%");
        assert_eq!(format_percent(dec!(1.234)), "+1.23%");
        assert_eq!(format_signed_amount(dec!(10)), "+10.00");
        assert_eq!(format_signed_amount(dec!(-2.5)), "-2.50");
        assert_eq!(format_optional_amount(None), "-");
    }

    #[test]
    fn test_validate_code_accepts_six_digits() {
        for code in ["000001", "110022", "999999", "519674"] {
            assert!(validate_code(code).is_ok(), "{} should be valid", code);
        }
    }

    #[test]
    fn test_validate_code_rejects_everything_else() {
        for code in ["", "12345", "1234567", "00000a", " 00001", "abcdef", "１２３４５６", "12-456"] {
            assert!(
                matches!(validate_code(code), Err(FundError::Validation(_))),
                "{:?} should be rejected",
                code
            );
        }
    }

    #[test]
    fn test_is_within_days() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!(is_within_days(today, today, 45));
        assert!(is_within_days(NaiveDate::from_ymd_opt(2024, 1, 16).unwrap(), today, 45));
        assert!(!is_within_days(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(), today, 45));
        // future dates are not "recent"
        assert!(!is_within_days(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(), today, 45));
    }
}
