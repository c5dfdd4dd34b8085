//! Checkout summary, guest form and card entry

use bookflow_common::check::{expect_contains, expect_pay_label};
use bookflow_common::{
    format_date, parse_amount, CardDetails, DateFormat, DateRange, Guest, Money, PaymentBreakdown,
};
use tracing::info;

use super::{expect_visible, read_text};
use crate::error::E2eResult;
use crate::locator::{LocatorPath, Query};
use crate::playwright::Device;
use crate::surface::{Surface, WaitState};

pub mod locators {
    use super::*;

    pub fn cart_check_in(device: Device) -> LocatorPath {
        match device {
            Device::Desktop => Query::test_id("cart-breakdown-checkin-1").into(),
            Device::Mobile => Query::test_id("cart-item-checkin-1").into(),
        }
    }

    pub fn cart_check_out(device: Device) -> LocatorPath {
        match device {
            Device::Desktop => Query::test_id("cart-breakdown-checkout-1").into(),
            Device::Mobile => Query::test_id("cart-item-checkout-1").into(),
        }
    }

    pub fn cart_total(device: Device) -> LocatorPath {
        match device {
            Device::Desktop => Query::test_id("cart-breakdown-total").into(),
            Device::Mobile => Query::test_id("cart-item-rates-1").into(),
        }
    }

    pub const BOOKING_DETAIL_FIELDS: [&str; 4] = [
        "cart-breakdown-guests-1",
        "cart-breakdown-duration-1",
        "cart-breakdown-rates-1",
        "cart-breakdown-total",
    ];

    /// Chevron that expands the collapsed cart on small screens
    pub fn expand_cart() -> LocatorPath {
        Query::test_id("ChevronRightIcon").into()
    }

    pub fn close_summary() -> LocatorPath {
        Query::role("button", "Close").into()
    }

    /// Text input inside a booking form field wrapper
    pub fn form_input(field: &str) -> LocatorPath {
        LocatorPath::within(
            Query::test_id(format!("booking-summary-form-{}", field)),
            Query::css("input"),
        )
    }

    pub fn first_name() -> LocatorPath {
        form_input("first-name")
    }

    pub fn last_name() -> LocatorPath {
        form_input("last-name")
    }

    pub fn email() -> LocatorPath {
        form_input("email")
    }

    pub fn mobile() -> LocatorPath {
        form_input("mobile")
    }

    pub fn address() -> LocatorPath {
        form_input("address")
    }

    pub fn address_option() -> LocatorPath {
        Query::css(r#"[id^="address-finder-option"]"#).first().into()
    }

    fn card_frame_field(frame_title: &str, input_id: &str) -> LocatorPath {
        LocatorPath::inside_frame(
            Query::css(format!(r#"[title="{}"]"#, frame_title)),
            Query::css(format!(r#"[id^="{}"]"#, input_id)).first(),
        )
    }

    pub fn card_number() -> LocatorPath {
        card_frame_field("Iframe for card number", "adyen-checkout-encryptedCardNumber")
    }

    pub fn card_expiry() -> LocatorPath {
        card_frame_field("Iframe for expiry date", "adyen-checkout-encryptedExpiryDate")
    }

    pub fn card_security_code() -> LocatorPath {
        card_frame_field("Iframe for security code", "adyen-checkout-encryptedSecurityCode")
    }

    /// Holder name is rendered in the top document, not in a frame
    pub fn card_holder() -> LocatorPath {
        Query::css(r#"[id^="adyen-checkout-holderName"]"#).first().into()
    }

    pub fn pay_button() -> LocatorPath {
        Query::test_id("pay-btn-summary").into()
    }
}

/// Open the collapsed cart summary (mobile layout)
pub async fn expand_cart(surface: &dyn Surface) -> E2eResult<()> {
    surface.click(&locators::expand_cart()).await
}

/// Dismiss the cart summary sheet (mobile layout)
pub async fn close_summary(surface: &dyn Surface) -> E2eResult<()> {
    surface.click(&locators::close_summary()).await
}

/// Checkout cart shows the same stay, without the year
pub async fn validate_checkout_dates(
    surface: &dyn Surface,
    range: &DateRange,
    device: Device,
) -> E2eResult<()> {
    let format = DateFormat::short_without_year();

    let check_in = read_text(surface, &locators::cart_check_in(device)).await?;
    expect_contains(
        "Checkout check-in",
        &format_date(range.check_in(), &format),
        &check_in,
    )?;

    let check_out = read_text(surface, &locators::cart_check_out(device)).await?;
    expect_contains(
        "Checkout check-out",
        &format_date(range.check_out(), &format),
        &check_out,
    )?;
    Ok(())
}

/// Guests, duration, rates and total are all shown (desktop layout)
pub async fn validate_booking_details(surface: &dyn Surface) -> E2eResult<()> {
    for field in locators::BOOKING_DETAIL_FIELDS {
        expect_visible(surface, &Query::test_id(field).into()).await?;
    }
    Ok(())
}

pub async fn read_total(surface: &dyn Surface, device: Device) -> E2eResult<Money> {
    let text = read_text(surface, &locators::cart_total(device)).await?;
    Ok(parse_amount(&text)?)
}

/// Read the cart total and derive the deposit and balance from it
pub async fn calculate_payment(surface: &dyn Surface, device: Device) -> E2eResult<PaymentBreakdown> {
    let breakdown = PaymentBreakdown::from_total(read_total(surface, device).await?)?;
    info!("{}", breakdown);
    Ok(breakdown)
}

pub async fn fill_booking_form(surface: &dyn Surface, guest: &Guest, address: &str) -> E2eResult<()> {
    let fields = [
        (locators::first_name(), guest.first_name.as_str()),
        (locators::last_name(), guest.last_name.as_str()),
        (locators::email(), guest.email.as_str()),
        (locators::mobile(), guest.mobile.as_str()),
        (locators::address(), address),
    ];

    for (locator, _) in &fields {
        surface.wait_for(locator, WaitState::Attached).await?;
    }
    for (locator, value) in &fields {
        surface.fill(locator, value).await?;
    }

    let suggestion = locators::address_option();
    surface.wait_for(&suggestion, WaitState::Attached).await?;
    surface.click(&suggestion).await?;
    Ok(())
}

/// Enter the card into the gateway's frames, and the holder into the page
pub async fn fill_card_details(surface: &dyn Surface, card: &CardDetails) -> E2eResult<()> {
    surface.fill(&locators::card_number(), &card.number).await?;
    surface.fill(&locators::card_expiry(), &card.expiry).await?;
    surface
        .fill(&locators::card_security_code(), &card.security_code)
        .await?;
    surface.fill(&locators::card_holder(), &card.holder).await?;
    Ok(())
}

/// The pay button must advertise the deposit before it is clicked
pub async fn validate_and_click_pay_button(surface: &dyn Surface, deposit: Money) -> E2eResult<()> {
    let button = locators::pay_button();
    let text = read_text(surface, &button).await?;
    expect_pay_label(deposit, &text)?;
    surface.click(&button).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::E2eError;
    use crate::mock::MockSurface;
    use bookflow_common::VerifyError;

    #[tokio::test]
    async fn test_card_number_filled_inside_frame_verbatim() {
        let surface = MockSurface::new()
            .with_element(&locators::card_number())
            .with_element(&locators::card_expiry())
            .with_element(&locators::card_security_code())
            .with_element(&locators::card_holder());

        let card = CardDetails::test_visa("Jane");
        fill_card_details(&surface, &card).await.unwrap();

        assert_eq!(locators::card_number().frame_depth(), 1);
        assert_eq!(locators::card_holder().frame_depth(), 0);
        assert_eq!(
            surface.filled(&locators::card_number()).as_deref(),
            Some("4917610000000000")
        );
        assert_eq!(surface.filled(&locators::card_expiry()).as_deref(), Some("03/30"));
        assert_eq!(surface.filled(&locators::card_holder()).as_deref(), Some("Jane"));
    }

    #[tokio::test]
    async fn test_calculate_payment_from_mobile_total() {
        let surface =
            MockSurface::new().with_text(&locators::cart_total(Device::Mobile), "AUD $500.00");

        let breakdown = calculate_payment(&surface, Device::Mobile).await.unwrap();
        assert_eq!(breakdown.deposit, Money::from_major(50));
        assert_eq!(breakdown.balance, Money::from_major(450));
    }

    #[tokio::test]
    async fn test_pay_button_not_clicked_on_wrong_label() {
        let surface = MockSurface::new().with_text(&locators::pay_button(), "Pay AUD $60");

        let err = validate_and_click_pay_button(&surface, Money::from_major(50))
            .await
            .unwrap_err();
        assert!(matches!(err, E2eError::Verify(VerifyError::BusinessRule { .. })));
        assert!(!surface.clicked(&locators::pay_button()));
    }

    #[tokio::test]
    async fn test_booking_form_waits_then_fills() {
        let guest = Guest::new("Jane", "Doe", "jane.doe@example.com", "1234567890").unwrap();
        let surface = MockSurface::new()
            .with_element(&locators::first_name())
            .with_element(&locators::last_name())
            .with_element(&locators::email())
            .with_element(&locators::mobile())
            .with_element(&locators::address())
            .with_element(&locators::address_option());

        fill_booking_form(&surface, &guest, "Melbourne").await.unwrap();

        assert_eq!(surface.filled(&locators::email()).as_deref(), Some("jane.doe@example.com"));
        assert_eq!(surface.filled(&locators::address()).as_deref(), Some("Melbourne"));
        assert!(surface.clicked(&locators::address_option()));
    }
}
