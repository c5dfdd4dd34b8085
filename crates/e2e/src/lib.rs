//! Bookflow E2E Test Framework
//!
//! This crate drives the hotel booking app through a real browser and checks
//! every screen against the model in `bookflow-common`:
//! - Pings the booking site before launching anything
//! - Controls Playwright through a long-lived Node bridge speaking JSON lines
//! - Describes elements as locator trees, including ones inside payment iframes
//! - Runs the desktop and mobile booking flows, sequentially or in parallel
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── wait_for_site(base_url)                              │
//! │    ├── plan(today) -> base seed + ScenarioConfig per flow   │
//! │    ├── SurfaceFactory::launch(device) -> Surface            │
//! │    └── execute(surface, device, scenario) -> TestResult     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  pages::{home, checkout, confirmation}                      │
//! │    ├── locators: LocatorPath tables                         │
//! │    └── actions and checks over &dyn Surface                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Surface                                                    │
//! │    ├── PlaywrightSurface (node bridge)                      │
//! │    └── MockSurface (in-memory, for tests)                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod fixtures;
pub mod locator;
pub mod mock;
pub mod pages;
pub mod playwright;
pub mod preflight;
pub mod runner;
pub mod scenario;
pub mod surface;

pub use error::{E2eError, E2eResult};
pub use fixtures::{FixtureConfig, GuestSource, ScenarioConfig, SeededGuests};
pub use locator::{LocatorPath, Query, Selector};
pub use mock::MockSurface;
pub use playwright::{Browser, Device, PlaywrightConfig, PlaywrightSurface, Viewport};
pub use runner::{
    PlaywrightLauncher, RunPlan, RunnerConfig, SurfaceFactory, TestResult, TestRunner,
    TestSuiteResult,
};
pub use scenario::{desktop_booking_flow, mobile_booking_flow, FlowReport};
pub use surface::{Surface, WaitState};
