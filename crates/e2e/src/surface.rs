//! The interactive surface a scenario drives.
//!
//! Every operation suspends until the browser confirms it or its bounded
//! timeout expires; the timeout belongs to the implementation, not callers.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::E2eResult;
use crate::locator::LocatorPath;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

impl WaitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitState::Visible => "visible",
            WaitState::Hidden => "hidden",
            WaitState::Attached => "attached",
            WaitState::Detached => "detached",
        }
    }
}

/// Browser capabilities consumed by the page modules.
#[async_trait]
pub trait Surface: Send + Sync {
    /// Navigate to a path relative to the base URL
    async fn navigate(&self, path: &str) -> E2eResult<()>;

    /// Number of elements currently matching, without waiting
    async fn count(&self, locator: &LocatorPath) -> E2eResult<usize>;

    async fn click(&self, locator: &LocatorPath) -> E2eResult<()>;

    async fn fill(&self, locator: &LocatorPath, text: &str) -> E2eResult<()>;

    async fn wait_for(&self, locator: &LocatorPath, state: WaitState) -> E2eResult<()>;

    /// Text content of the element; empty when it has none
    async fn text(&self, locator: &LocatorPath) -> E2eResult<String>;

    /// Capture the current page, returning where the image was written
    async fn screenshot(&self, name: &str) -> E2eResult<PathBuf>;

    /// Release the browser session
    async fn close(&self) -> E2eResult<()>;
}
