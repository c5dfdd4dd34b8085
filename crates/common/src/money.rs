//! Currency amounts and the deposit/balance split.

use std::fmt;
use std::ops::{Add, Sub};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VerifyError};

/// Currency prefix the booking app prints before amounts
pub const CURRENCY_PREFIX: &str = "AUD $";

/// Share of the total charged at checkout, in percent
pub const DEPOSIT_PERCENT: i64 = 10;

/// Largest magnitude, in cents, accepted from rendered text. Any split or
/// sum of two such amounts stays within `i64`.
pub const MAX_CENTS: i64 = i64::MAX / 100;

/// An amount of money in minor units (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Whole currency units, e.g. `Money::from_major(500)` is 500.00
    pub const fn from_major(units: i64) -> Self {
        Money(units * 100)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// `self × percent / 100`, rounded half-up to the cent; `None` on overflow
    pub fn percent(self, percent: i64) -> Option<Money> {
        let scaled = i128::from(self.0) * i128::from(percent) + 50;
        i64::try_from(scaled.div_euclid(100)).ok().map(Money)
    }

    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

/// Split of a booking total into the deposit paid today and the balance due later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentBreakdown {
    pub total: Money,
    pub deposit: Money,
    pub balance: Money,
}

impl PaymentBreakdown {
    /// Derive the split from the cart total.
    ///
    /// The balance is computed by subtraction so `deposit + balance == total`
    /// holds exactly.
    pub fn from_total(total: Money) -> Result<Self> {
        let overflow = || VerifyError::InvalidAmount(total.to_string());
        let deposit = total.percent(DEPOSIT_PERCENT).ok_or_else(overflow)?;
        let balance = total.checked_sub(deposit).ok_or_else(overflow)?;
        Ok(Self {
            total,
            deposit,
            balance,
        })
    }

    /// Amount shown as outstanding on the confirmation screen
    pub fn outstanding(&self) -> Money {
        self.balance
    }
}

impl fmt::Display for PaymentBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total: {}, Deposit: {}, Balance: {}",
            self.total, self.deposit, self.balance
        )
    }
}

static AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?[0-9][0-9,]*(?:\.[0-9]+)?").expect("amount pattern is valid"));

/// Parse a displayed amount such as `"AUD $1,234.50"` or `"Deposit AUD $50.00"`.
///
/// The first number in the text is taken; currency code, sign, labels and
/// thousands separators are ignored. Fractions beyond cents round half-up.
/// Non-ASCII digits and amounts above [`MAX_CENTS`] are rejected.
pub fn parse_amount(text: &str) -> Result<Money> {
    let invalid = || VerifyError::InvalidAmount(text.to_string());
    if text.chars().any(|c| c.is_numeric() && !c.is_ascii_digit()) {
        return Err(invalid());
    }

    let token = AMOUNT.find(text).ok_or_else(invalid)?.as_str();
    let cleaned = token.replace(',', "");
    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };

    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    let whole: i64 = whole.parse().map_err(|_| invalid())?;

    let mut fraction_digits = fraction.bytes().map(|b| i64::from(b - b'0'));
    let tenths = fraction_digits.next().unwrap_or(0);
    let hundredths = fraction_digits.next().unwrap_or(0);
    let round_up = fraction_digits.next().map_or(false, |d| d >= 5);

    let cents = whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(tenths * 10 + hundredths + i64::from(round_up)))
        .filter(|c| *c <= MAX_CENTS)
        .ok_or_else(invalid)?;
    Ok(Money(if negative { -cents } else { cents }))
}

/// Text the pay button must contain for a given deposit.
///
/// A zero fraction is dropped the way the app prints it: 50.00 becomes
/// `"AUD $50"` while 52.50 stays `"AUD $52.50"`.
pub fn pay_button_label(deposit: Money) -> String {
    let label = format!("{}{}", CURRENCY_PREFIX, deposit);
    match label.strip_suffix(".00") {
        Some(trimmed) => trimmed.to_string(),
        None => label,
    }
}
