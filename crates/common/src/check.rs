//! Cross-screen consistency checks.
//!
//! Values captured on one screen are compared with text rendered on a later
//! one. Both sides go through the same formatter before comparison, and the
//! first mismatch is returned as a hard error carrying both values verbatim.

use chrono::NaiveDate;

use crate::date_format::{format_date, parse_display_date, DateFormat};
use crate::error::{Result, VerifyError};
use crate::money::{parse_amount, pay_button_label, Money};

/// Rendered text must equal `expected` once surrounding whitespace is trimmed.
pub fn expect_eq(field: &str, expected: &str, actual: &str) -> Result<()> {
    let actual = actual.trim();
    if actual == expected {
        Ok(())
    } else {
        Err(VerifyError::mismatch(field, expected, actual))
    }
}

/// Rendered text must contain `expected`.
pub fn expect_contains(field: &str, expected: &str, actual: &str) -> Result<()> {
    if actual.contains(expected) {
        Ok(())
    } else {
        Err(VerifyError::mismatch(field, expected, actual.trim()))
    }
}

/// Rendered amount must parse to exactly `expected`.
pub fn expect_amount(field: &str, expected: Money, rendered: &str) -> Result<()> {
    let actual = parse_amount(rendered)?;
    if actual == expected {
        Ok(())
    } else {
        Err(VerifyError::mismatch(
            field,
            expected.to_string(),
            actual.to_string(),
        ))
    }
}

/// Rendered date text must denote `expected`.
///
/// The text is parsed back into a date and both sides are rendered with
/// `format`, so layout differences on the page do not matter, only the date.
pub fn expect_same_date(
    field: &str,
    expected: NaiveDate,
    rendered: &str,
    format: &DateFormat,
) -> Result<()> {
    let expected = format_date(expected, format);
    let actual = match parse_display_date(rendered) {
        Ok(date) => format_date(date, format),
        Err(_) => return Err(VerifyError::mismatch(field, expected, rendered.trim())),
    };
    if actual == expected {
        Ok(())
    } else {
        Err(VerifyError::mismatch(field, expected, actual))
    }
}

/// The pay button must advertise the computed deposit.
pub fn expect_pay_label(deposit: Money, button_text: &str) -> Result<()> {
    let expected = pay_button_label(deposit);
    if button_text.contains(&expected) {
        Ok(())
    } else {
        Err(VerifyError::BusinessRule {
            rule: "Button text does not match the expected downpayment".to_string(),
            expected,
            actual: button_text.trim().to_string(),
        })
    }
}
