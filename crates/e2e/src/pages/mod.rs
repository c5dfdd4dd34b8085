//! Screens of the booking app.
//!
//! Each module holds a `locators` table for its screen and free functions
//! that drive or check that screen through a [`Surface`].

pub mod checkout;
pub mod confirmation;
pub mod home;

use crate::error::E2eResult;
use crate::locator::LocatorPath;
use crate::surface::{Surface, WaitState};

/// Wait for the element to be visible
pub async fn expect_visible(surface: &dyn Surface, locator: &LocatorPath) -> E2eResult<()> {
    surface.wait_for(locator, WaitState::Visible).await
}

/// Wait for the element to be visible, then read its text
pub async fn read_text(surface: &dyn Surface, locator: &LocatorPath) -> E2eResult<String> {
    surface.wait_for(locator, WaitState::Visible).await?;
    surface.text(locator).await
}
