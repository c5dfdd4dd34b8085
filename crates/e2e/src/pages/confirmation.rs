//! Booking confirmation shown after payment

use bookflow_common::check::{expect_amount, expect_eq, expect_same_date};
use bookflow_common::{
    parse_amount, DateFormat, DateRange, Guest, PaymentBreakdown, VerifyError,
};
use tracing::info;

use super::read_text;
use crate::error::E2eResult;
use crate::locator::{LocatorPath, Query};
use crate::pages::home::Suite;
use crate::surface::Surface;

pub mod locators {
    use super::*;

    pub fn guest_name() -> LocatorPath {
        Query::test_id_prefix("booking-confirmation-Name").into()
    }

    pub fn guest_email() -> LocatorPath {
        Query::test_id("booking-confirmation-Email-1").into()
    }

    pub fn guest_mobile() -> LocatorPath {
        Query::test_id("booking-confirmation-Mobile Number-2").into()
    }

    pub fn category_title() -> LocatorPath {
        Query::css(r#"[data-id^="confirmation-category-title"]"#).into()
    }

    pub fn deposit() -> LocatorPath {
        Query::test_id("booking-confirmation-deposit").into()
    }

    pub fn outstanding() -> LocatorPath {
        Query::test_id("booking-confirmation-outstanding-payment").into()
    }

    pub fn total() -> LocatorPath {
        Query::test_id_prefix("booking-confirmation-Total").into()
    }

    pub fn check_in() -> LocatorPath {
        Query::test_id_prefix("booking-confirmation-Check-in").into()
    }

    pub fn check_out() -> LocatorPath {
        Query::test_id_prefix("booking-confirmation-Check-out").into()
    }
}

pub async fn validate_guest_details(surface: &dyn Surface, guest: &Guest) -> E2eResult<()> {
    let name = read_text(surface, &locators::guest_name()).await?;
    expect_eq("Name", &guest.full_name(), &name)?;

    let email = read_text(surface, &locators::guest_email()).await?;
    expect_eq("Email", &guest.email, &email)?;

    let mobile = read_text(surface, &locators::guest_mobile()).await?;
    expect_eq("Mobile Number", &guest.mobile, &mobile)?;

    info!("Guest details validated");
    Ok(())
}

/// Paid today is the deposit, outstanding is the balance, and they add up to the total
pub async fn validate_payments(surface: &dyn Surface, expected: &PaymentBreakdown) -> E2eResult<()> {
    let paid_today = read_text(surface, &locators::deposit()).await?;
    expect_amount("Deposit", expected.deposit, &paid_today)?;

    let outstanding = read_text(surface, &locators::outstanding()).await?;
    expect_amount("Outstanding payment", expected.outstanding(), &outstanding)?;

    let total = read_text(surface, &locators::total()).await?;
    expect_amount("Total", expected.total, &total)?;

    let paid = parse_amount(&paid_today)?;
    let sum = paid
        .checked_add(parse_amount(&outstanding)?)
        .ok_or_else(|| VerifyError::InvalidAmount(outstanding.trim().to_string()))?;
    expect_eq("Deposit plus outstanding", &expected.total.to_string(), &sum.to_string())?;

    info!("Payment details validated");
    Ok(())
}

pub async fn validate_suite_type(surface: &dyn Surface, suite: Suite) -> E2eResult<()> {
    let title = read_text(surface, &locators::category_title()).await?;
    expect_eq("Suite", suite.as_str(), &title)?;
    Ok(())
}

/// Reservation dates denote the selected stay, whatever layout they are printed in
pub async fn validate_reservation_dates(surface: &dyn Surface, range: &DateRange) -> E2eResult<()> {
    let format = DateFormat::short();

    let check_in = read_text(surface, &locators::check_in()).await?;
    expect_same_date("Check-in", range.check_in(), &check_in, &format)?;

    let check_out = read_text(surface, &locators::check_out()).await?;
    expect_same_date("Check-out", range.check_out(), &check_out, &format)?;
    Ok(())
}
