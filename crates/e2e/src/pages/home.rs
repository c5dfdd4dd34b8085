//! Search results, calendar and cart drawer

use bookflow_common::check::{expect_contains, expect_eq};
use bookflow_common::{format_date, DateFormat, DateRange, VerifyError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{expect_visible, read_text};
use crate::error::E2eResult;
use crate::locator::{LocatorPath, Query};
use crate::surface::Surface;

/// Room categories offered by the property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Suite {
    #[serde(rename = "Family Suite")]
    FamilySuite,
    #[serde(rename = "Deluxe King")]
    DeluxeKing,
}

impl Suite {
    pub fn as_str(&self) -> &'static str {
        match self {
            Suite::FamilySuite => "Family Suite",
            Suite::DeluxeKing => "Deluxe King",
        }
    }
}

/// Rate plans listed under each room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rate {
    #[serde(rename = "Bed & Breakfast")]
    BedAndBreakfast,
    #[serde(rename = "Best Available Rate")]
    BestAvailableRate,
}

impl Rate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rate::BedAndBreakfast => "Bed & Breakfast",
            Rate::BestAvailableRate => "Best Available Rate",
        }
    }
}

pub mod locators {
    use super::*;

    pub fn cart_button() -> LocatorPath {
        Query::test_id("btnShowCart").into()
    }

    pub fn calendar_icon() -> LocatorPath {
        Query::test_id("CalendarMonthOutlinedIcon").into()
    }

    /// Enabled calendar cell for `date`, labelled with its long form
    pub fn calendar_day(date: NaiveDate) -> LocatorPath {
        Query::css(format!(
            r#"div[aria-label="{}"]:not(.disabled)"#,
            format_date(date, &DateFormat::default())
        ))
        .into()
    }

    pub fn calendar_done() -> LocatorPath {
        Query::role("button", "Done").into()
    }

    pub fn search_button() -> LocatorPath {
        Query::test_id("search").into()
    }

    pub fn room_items() -> LocatorPath {
        Query::test_id_prefix("roomItem").into()
    }

    pub fn see_prices() -> LocatorPath {
        Query::test_id("see-prices-btn-rates-page").first().into()
    }

    /// Add-to-cart button of `rate` in the room card for `suite`.
    ///
    /// The price list sits four levels above the room title element.
    pub fn add_to_cart(suite: Suite, rate: Rate) -> LocatorPath {
        LocatorPath::within(
            Query::test_id_prefix("roomItem").with_text(suite.as_str()),
            LocatorPath::within(
                Query::xpath("../../../.."),
                LocatorPath::within(
                    Query::test_id("room-price-list-item")
                        .having(Query::test_id("price-title").with_text(rate.as_str())),
                    Query::test_id("add-to-cart-btn-rates-page").first(),
                ),
            ),
        )
    }

    pub fn cart_component() -> LocatorPath {
        Query::test_id("cartContentComponent").into()
    }

    /// Element inside the cart drawer
    pub fn cart_field(test_id: &str) -> LocatorPath {
        LocatorPath::within(Query::test_id("cartContentComponent"), Query::test_id(test_id))
    }

    pub fn cart_item_title() -> LocatorPath {
        Query::test_id("cart-item-title-1").into()
    }

    pub fn cart_check_in() -> LocatorPath {
        Query::test_id("cart-item-checkin-1").into()
    }

    pub fn cart_check_out() -> LocatorPath {
        Query::test_id("cart-item-checkout-1").into()
    }

    pub fn checkout_button() -> LocatorPath {
        Query::test_id("btnCheckoutOnCart").into()
    }

    pub const CART_CONTENT_FIELDS: [&str; 6] = [
        "adults-value",
        "children-value",
        "infants-value",
        "cart-item-duration-1",
        "cart-item-rates-1",
        "cart-item-remove-room-1",
    ];
}

pub async fn navigate(surface: &dyn Surface, path: &str) -> E2eResult<()> {
    surface.navigate(path).await
}

/// The cart badge must read zero before anything is added
pub async fn verify_cart_empty(surface: &dyn Surface) -> E2eResult<()> {
    let text = read_text(surface, &locators::cart_button()).await?;
    expect_contains("Cart count", "0", &text)?;
    Ok(())
}

/// Open the calendar and pick a one-night stay starting `lead_days` after `today`.
///
/// A day that is disabled or not rendered is skipped with a warning; the
/// returned range is what the flow expects the cart to show.
pub async fn select_date_range(
    surface: &dyn Surface,
    today: NaiveDate,
    lead_days: u32,
    nights: u32,
) -> E2eResult<DateRange> {
    surface.click(&locators::calendar_icon()).await?;

    let range = DateRange::starting_after(today, lead_days, nights)?;
    for date in [range.check_in(), range.check_out()] {
        let day = locators::calendar_day(date);
        if surface.count(&day).await? > 0 {
            surface.click(&day.first()).await?;
        } else {
            warn!(
                "Date {:?} is disabled or not found",
                format_date(date, &DateFormat::default())
            );
        }
    }

    info!("Selected stay {} -> {}", range.check_in(), range.check_out());
    Ok(range)
}

/// Close the calendar sheet (mobile layout)
pub async fn confirm_dates(surface: &dyn Surface) -> E2eResult<()> {
    surface.click(&locators::calendar_done()).await
}

pub async fn search_rooms(surface: &dyn Surface) -> E2eResult<()> {
    surface.click(&locators::search_button()).await
}

/// At least one room must be listed
pub async fn validate_rooms(surface: &dyn Surface) -> E2eResult<()> {
    let rooms = locators::room_items();
    expect_visible(surface, &rooms.clone().first()).await?;

    let count = surface.count(&rooms).await?;
    if count == 0 {
        return Err(VerifyError::mismatch("Room results", "at least one room", "0").into());
    }
    info!("{} room(s) listed", count);
    Ok(())
}

pub async fn select_suite_rate(surface: &dyn Surface, suite: Suite, rate: Rate) -> E2eResult<()> {
    surface.click(&locators::see_prices()).await?;
    surface.click(&locators::add_to_cart(suite, rate)).await?;
    info!("Added {} ({}) to cart", suite.as_str(), rate.as_str());
    Ok(())
}

pub async fn wait_for_cart_visible(surface: &dyn Surface) -> E2eResult<()> {
    expect_visible(surface, &locators::cart_component()).await
}

pub async fn expect_cart_item_title(surface: &dyn Surface, suite: Suite) -> E2eResult<()> {
    let text = read_text(surface, &locators::cart_item_title()).await?;
    expect_eq("Cart item title", suite.as_str(), &text)?;
    Ok(())
}

/// Guest counts, duration, rates and the remove action are all shown
pub async fn validate_cart_content(surface: &dyn Surface) -> E2eResult<()> {
    for field in locators::CART_CONTENT_FIELDS {
        expect_visible(surface, &locators::cart_field(field)).await?;
    }
    Ok(())
}

/// Cart shows the stay as `"Wed, Mar 12, 2025"`
pub async fn validate_cart_dates(surface: &dyn Surface, range: &DateRange) -> E2eResult<()> {
    let format = DateFormat::short();

    let check_in = read_text(surface, &locators::cart_check_in()).await?;
    expect_eq("Cart check-in", &format_date(range.check_in(), &format), &check_in)?;

    let check_out = read_text(surface, &locators::cart_check_out()).await?;
    expect_eq("Cart check-out", &format_date(range.check_out(), &format), &check_out)?;
    Ok(())
}

pub async fn click_checkout(surface: &dyn Surface) -> E2eResult<()> {
    surface.click(&locators::checkout_button()).await
}
