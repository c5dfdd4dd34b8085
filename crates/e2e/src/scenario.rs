//! Booking flow scenarios
//!
//! Both flows walk the same journey and differ only where the mobile
//! layout adds a sheet to dismiss or uses different cart elements:
//!
//! ```text
//! home      navigate, cart empty, pick dates, [Done], search, pick suite + rate
//! cart      title, content, dates (with year), checkout
//! checkout  [expand cart], dates (no year), [details], total -> deposit/balance,
//!           [Close], guest form, card frames, pay button label, pay
//! confirm   guest, deposit/outstanding/total, suite, dates
//! ```

use std::future::Future;
use std::path::PathBuf;
use std::time::Instant;

use bookflow_common::{DateRange, PaymentBreakdown};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::E2eResult;
use crate::fixtures::ScenarioConfig;
use crate::pages::{checkout, confirmation, home};
use crate::playwright::Device;
use crate::surface::Surface;

/// Result of executing a flow step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub success: bool,
    pub step_name: String,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub screenshot_path: Option<PathBuf>,
}

/// Times and records each step of a flow
#[derive(Debug, Default)]
pub struct FlowRecorder {
    steps: Vec<StepResult>,
}

impl FlowRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one step, recording its outcome; the error is passed through unchanged
    pub async fn step<T, F>(&mut self, name: &str, fut: F) -> E2eResult<T>
    where
        F: Future<Output = E2eResult<T>>,
    {
        debug!("Executing step: {}", name);
        let start = Instant::now();
        let result = fut.await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => info!("✓ {} ({} ms)", name, duration_ms),
            Err(e) => error!("✗ {} - {}", name, e),
        }

        self.steps.push(StepResult {
            success: result.is_ok(),
            step_name: name.to_string(),
            duration_ms,
            error: result.as_ref().err().map(|e| e.to_string()),
            screenshot_path: None,
        });
        result
    }

    /// Attach a failure screenshot to the last recorded step
    pub fn attach_screenshot(&mut self, path: PathBuf) {
        if let Some(last) = self.steps.last_mut() {
            last.screenshot_path = Some(path);
        }
    }

    pub fn steps(&self) -> &[StepResult] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<StepResult> {
        self.steps
    }
}

/// Values a completed flow verified
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowOutcome {
    pub device: Device,
    pub dates: DateRange,
    pub payment: PaymentBreakdown,
}

/// A completed flow with its step records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowReport {
    pub outcome: FlowOutcome,
    pub steps: Vec<StepResult>,
}

pub fn flow_name(device: Device) -> &'static str {
    match device {
        Device::Desktop => "Desktop Booking Flow",
        Device::Mobile => "Mobile Booking Flow",
    }
}

/// Desktop booking flow, from search to confirmation
pub async fn desktop_booking_flow(
    surface: &dyn Surface,
    config: &ScenarioConfig,
) -> E2eResult<FlowReport> {
    let mut recorder = FlowRecorder::new();
    let outcome = run_flow(surface, Device::Desktop, config, &mut recorder).await?;
    Ok(FlowReport {
        outcome,
        steps: recorder.into_steps(),
    })
}

/// Mobile booking flow, from search to confirmation
pub async fn mobile_booking_flow(
    surface: &dyn Surface,
    config: &ScenarioConfig,
) -> E2eResult<FlowReport> {
    let mut recorder = FlowRecorder::new();
    let outcome = run_flow(surface, Device::Mobile, config, &mut recorder).await?;
    Ok(FlowReport {
        outcome,
        steps: recorder.into_steps(),
    })
}

/// Run the booking journey for `device`, stopping at the first failure
pub async fn run_flow(
    surface: &dyn Surface,
    device: Device,
    config: &ScenarioConfig,
    rec: &mut FlowRecorder,
) -> E2eResult<FlowOutcome> {
    let mobile = device.is_mobile();

    // Home
    rec.step("navigate", home::navigate(surface, &config.home_path)).await?;
    rec.step("verify cart empty", home::verify_cart_empty(surface)).await?;
    let dates = rec
        .step(
            "select date range",
            home::select_date_range(surface, config.today, config.lead_days, config.nights),
        )
        .await?;
    if mobile {
        rec.step("confirm dates", home::confirm_dates(surface)).await?;
    }
    rec.step("search rooms", home::search_rooms(surface)).await?;
    rec.step("validate rooms", home::validate_rooms(surface)).await?;
    rec.step(
        "select suite rate",
        home::select_suite_rate(surface, config.suite, config.rate),
    )
    .await?;

    // Cart
    rec.step("wait for cart", home::wait_for_cart_visible(surface)).await?;
    rec.step("cart item title", home::expect_cart_item_title(surface, config.suite))
        .await?;
    rec.step("cart content", home::validate_cart_content(surface)).await?;
    rec.step("cart dates", home::validate_cart_dates(surface, &dates)).await?;
    rec.step("click checkout", home::click_checkout(surface)).await?;

    // Checkout
    if mobile {
        rec.step("expand cart", checkout::expand_cart(surface)).await?;
    }
    rec.step(
        "checkout dates",
        checkout::validate_checkout_dates(surface, &dates, device),
    )
    .await?;
    if !mobile {
        rec.step("booking details", checkout::validate_booking_details(surface))
            .await?;
    }
    let payment = rec
        .step("calculate payment", checkout::calculate_payment(surface, device))
        .await?;
    if mobile {
        rec.step("close summary", checkout::close_summary(surface)).await?;
    }
    rec.step(
        "fill booking form",
        checkout::fill_booking_form(surface, &config.guest, &config.address),
    )
    .await?;
    rec.step("fill card details", checkout::fill_card_details(surface, &config.card))
        .await?;
    rec.step(
        "pay",
        checkout::validate_and_click_pay_button(surface, payment.deposit),
    )
    .await?;

    // Confirmation
    rec.step(
        "guest details",
        confirmation::validate_guest_details(surface, &config.guest),
    )
    .await?;
    rec.step("payments", confirmation::validate_payments(surface, &payment))
        .await?;
    rec.step("suite type", confirmation::validate_suite_type(surface, config.suite))
        .await?;
    rec.step(
        "reservation dates",
        confirmation::validate_reservation_dates(surface, &dates),
    )
    .await?;

    Ok(FlowOutcome {
        device,
        dates,
        payment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::E2eError;

    #[tokio::test]
    async fn test_recorder_records_failure_and_passes_error_through() {
        let mut rec = FlowRecorder::new();

        rec.step("ok", async { Ok(()) }).await.unwrap();
        let err = rec
            .step("broken", async {
                Err::<(), _>(E2eError::Timeout("cart".to_string()))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, E2eError::Timeout(_)));
        assert_eq!(rec.steps().len(), 2);
        assert!(rec.steps()[0].success);
        assert!(!rec.steps()[1].success);
        assert_eq!(rec.steps()[1].error.as_deref(), Some("Timeout waiting for: cart"));

        rec.attach_screenshot(PathBuf::from("failure.png"));
        assert_eq!(
            rec.steps()[1].screenshot_path.as_deref(),
            Some(std::path::Path::new("failure.png"))
        );
    }
}
