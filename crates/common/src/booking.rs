//! Booking value objects shared across a scenario

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VerifyError};

/// Stay dates picked in the calendar. `check_in` is always before `check_out`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl DateRange {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self> {
        if check_in >= check_out {
            return Err(VerifyError::InvalidDateRange {
                check_in: check_in.to_string(),
                check_out: check_out.to_string(),
            });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// Stay starting `lead_days` after `today` for `nights` nights
    pub fn starting_after(today: NaiveDate, lead_days: u32, nights: u32) -> Result<Self> {
        let offset = |days: u32| {
            today
                .checked_add_days(chrono::Days::new(u64::from(days)))
                .ok_or_else(|| VerifyError::InvalidDate(format!("{} + {} days", today, days)))
        };
        Self::new(offset(lead_days)?, offset(lead_days + nights)?)
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

/// Guest identity entered in the booking form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile: String,
}

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

impl Guest {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        mobile: impl Into<String>,
    ) -> Result<Self> {
        let guest = Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            mobile: mobile.into(),
        };
        guest.validate()?;
        Ok(guest)
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("first name", &self.first_name),
            ("last name", &self.last_name),
            ("email", &self.email),
            ("mobile", &self.mobile),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(VerifyError::InvalidGuest(format!("{} is empty", name)));
            }
        }
        if !EMAIL.is_match(&self.email) {
            return Err(VerifyError::InvalidGuest(format!(
                "email {:?} is not a valid address",
                self.email
            )));
        }
        Ok(())
    }

    /// Name as printed on the confirmation screen
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Test card entered into the payment fields, passed through verbatim
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetails {
    pub number: String,
    pub expiry: String,
    pub security_code: String,
    pub holder: String,
}

impl CardDetails {
    /// The payment gateway's Visa test card, held by `holder`
    pub fn test_visa(holder: impl Into<String>) -> Self {
        Self {
            number: "4917610000000000".to_string(),
            expiry: "03/30".to_string(),
            security_code: "737".to_string(),
            holder: holder.into(),
        }
    }
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tail = self
            .number
            .get(self.number.len().saturating_sub(4)..)
            .unwrap_or_default();
        f.debug_struct("CardDetails")
            .field("number", &format!("****{}", tail))
            .field("expiry", &self.expiry)
            .field("security_code", &"***")
            .field("holder", &self.holder)
            .finish()
    }
}
