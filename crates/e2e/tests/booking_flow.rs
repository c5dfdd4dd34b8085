//! Full booking flows against an in-memory booking app

use std::sync::Arc;

use bookflow_common::{
    format_date, pay_button_label, CardDetails, DateFormat, DateRange, Guest, Money,
    PaymentBreakdown, VerifyError,
};
use bookflow_e2e::mock::Action;
use bookflow_e2e::pages::home::{Rate, Suite};
use bookflow_e2e::pages::{checkout, confirmation, home};
use bookflow_e2e::runner::execute;
use bookflow_e2e::{
    desktop_booking_flow, mobile_booking_flow, Device, E2eError, E2eResult, FixtureConfig,
    LocatorPath, MockSurface, Query, RunnerConfig, ScenarioConfig, Surface, SurfaceFactory,
    TestRunner, TestSuiteResult,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use test_case::test_case;

fn scenario() -> ScenarioConfig {
    let guest = Guest::new("Jane", "Doe", "jane.doe42@example.com", "1234567890").unwrap();
    ScenarioConfig {
        home_path: "/22749/1".to_string(),
        card: CardDetails::test_visa(guest.first_name.clone()),
        guest,
        suite: Suite::DeluxeKing,
        rate: Rate::BedAndBreakfast,
        address: "Melbourne".to_string(),
        today: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
        lead_days: 3,
        nights: 1,
    }
}

fn stay() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(),
        NaiveDate::from_ymd_opt(2025, 3, 13).unwrap(),
    )
    .unwrap()
}

/// What the fake app renders where the real one computes values
struct Rendered {
    total: &'static str,
    pay_label: String,
    deposit: &'static str,
    outstanding: &'static str,
    confirmed_total: &'static str,
}

impl Default for Rendered {
    fn default() -> Self {
        Self {
            total: "AUD $500.00",
            pay_label: format!("Pay {}", pay_button_label(Money::from_major(50))),
            deposit: "AUD $50.00",
            outstanding: "AUD $450.00",
            confirmed_total: "AUD $500.00",
        }
    }
}

fn booking_app(device: Device, config: &ScenarioConfig, rendered: &Rendered) -> MockSurface {
    let range = stay();
    let with_year = DateFormat::short();
    let without_year = DateFormat::short_without_year();
    let check_in_day = home::locators::calendar_day(range.check_in());
    let check_out_day = home::locators::calendar_day(range.check_out());
    let rooms = home::locators::room_items();

    let mut app = MockSurface::new()
        // search page
        .with_text(&home::locators::cart_button(), "0")
        .with_element(&home::locators::calendar_icon())
        .with_count(&check_in_day, 1)
        .with_element(&check_in_day.clone().first())
        .with_count(&check_out_day, 1)
        .with_element(&check_out_day.clone().first())
        .with_element(&home::locators::calendar_done())
        .with_element(&home::locators::search_button())
        .with_count(&rooms, 2)
        .with_element(&rooms.clone().first())
        .with_element(&home::locators::see_prices())
        .with_element(&home::locators::add_to_cart(config.suite, config.rate))
        // cart drawer
        .with_element(&home::locators::cart_component())
        .with_text(&home::locators::cart_item_title(), config.suite.as_str())
        .with_text(
            &home::locators::cart_check_in(),
            format_date(range.check_in(), &with_year),
        )
        .with_text(
            &home::locators::cart_check_out(),
            format_date(range.check_out(), &with_year),
        )
        .with_element(&home::locators::checkout_button());
    for field in home::locators::CART_CONTENT_FIELDS {
        app = app.with_element(&home::locators::cart_field(field));
    }

    // checkout summary
    for field in checkout::locators::BOOKING_DETAIL_FIELDS {
        app = app.with_element(&Query::test_id(field).into());
    }
    if device == Device::Desktop {
        app = app
            .with_text(
                &checkout::locators::cart_check_in(device),
                format!("Check-in {}", format_date(range.check_in(), &without_year)),
            )
            .with_text(
                &checkout::locators::cart_check_out(device),
                format!("Check-out {}", format_date(range.check_out(), &without_year)),
            );
    }
    app = app
        .with_text(&checkout::locators::cart_total(device), rendered.total)
        .with_element(&checkout::locators::expand_cart())
        .with_element(&checkout::locators::close_summary())
        .with_element(&checkout::locators::first_name())
        .with_element(&checkout::locators::last_name())
        .with_element(&checkout::locators::email())
        .with_element(&checkout::locators::mobile())
        .with_element(&checkout::locators::address())
        .with_element(&checkout::locators::address_option())
        .with_element(&checkout::locators::card_number())
        .with_element(&checkout::locators::card_expiry())
        .with_element(&checkout::locators::card_security_code())
        .with_element(&checkout::locators::card_holder())
        .with_text(&checkout::locators::pay_button(), rendered.pay_label.clone());

    // confirmation
    app.with_text(&confirmation::locators::guest_name(), config.guest.full_name())
        .with_text(&confirmation::locators::guest_email(), config.guest.email.clone())
        .with_text(&confirmation::locators::guest_mobile(), config.guest.mobile.clone())
        .with_text(&confirmation::locators::category_title(), config.suite.as_str())
        .with_text(&confirmation::locators::deposit(), rendered.deposit)
        .with_text(&confirmation::locators::outstanding(), rendered.outstanding)
        .with_text(&confirmation::locators::total(), rendered.confirmed_total)
        .with_text(&confirmation::locators::check_in(), "Wed, Mar 12 2025")
        .with_text(&confirmation::locators::check_out(), "Thu, Mar 13 2025")
}

#[tokio::test]
async fn test_desktop_flow_books_and_confirms() {
    let config = scenario();
    let app = booking_app(Device::Desktop, &config, &Rendered::default());

    let report = desktop_booking_flow(&app, &config).await.unwrap();

    assert_eq!(report.outcome.dates, stay());
    assert_eq!(
        report.outcome.payment,
        PaymentBreakdown::from_total(Money::from_major(500)).unwrap()
    );
    assert!(report.steps.iter().all(|step| step.success));
    assert!(report.steps.iter().any(|s| s.step_name == "booking details"));
    assert!(!report.steps.iter().any(|s| s.step_name == "confirm dates"));

    assert_eq!(app.actions()[0], Action::Navigate("/22749/1".to_string()));
    assert_eq!(
        app.filled(&checkout::locators::card_number()).as_deref(),
        Some("4917610000000000")
    );
    assert_eq!(app.filled(&checkout::locators::card_holder()).as_deref(), Some("Jane"));
    assert!(app.clicked(&checkout::locators::pay_button()));
    assert!(!app.clicked(&checkout::locators::close_summary()));
}

#[tokio::test]
async fn test_mobile_flow_dismisses_sheets() {
    let config = scenario();
    let app = booking_app(Device::Mobile, &config, &Rendered::default());

    let report = mobile_booking_flow(&app, &config).await.unwrap();

    assert_eq!(report.outcome.device, Device::Mobile);
    assert!(app.clicked(&home::locators::calendar_done()));
    assert!(app.clicked(&checkout::locators::expand_cart()));
    assert!(app.clicked(&checkout::locators::close_summary()));
    assert!(!report.steps.iter().any(|s| s.step_name == "booking details"));

    // the chevron opens the cart before dates are read, Close comes after the total
    let actions = app.actions();
    let position = |action: &Action| actions.iter().position(|a| a == action).unwrap();
    let expand = position(&Action::Click(checkout::locators::expand_cart().to_string()));
    let close = position(&Action::Click(checkout::locators::close_summary().to_string()));
    let first_name = checkout::locators::first_name().to_string();
    let form = actions
        .iter()
        .position(|a| matches!(a, Action::Fill(target, _) if *target == first_name))
        .unwrap();
    assert!(expand < close);
    assert!(close < form);
}

#[tokio::test]
async fn test_wrong_pay_label_stops_before_payment() {
    let config = scenario();
    let rendered = Rendered {
        pay_label: "Pay AUD $60".to_string(),
        ..Default::default()
    };
    let app = booking_app(Device::Desktop, &config, &rendered);

    let err = desktop_booking_flow(&app, &config).await.unwrap_err();

    match err {
        E2eError::Verify(VerifyError::BusinessRule { expected, actual, .. }) => {
            assert_eq!(expected, "AUD $50");
            assert_eq!(actual, "Pay AUD $60");
        }
        other => panic!("expected pay label failure, got {:?}", other),
    }
    assert!(!app.clicked(&checkout::locators::pay_button()));
}

#[test_case("AUD $450.00", "AUD $500.00", "Outstanding payment" ; "outstanding is the full total")]
#[test_case("AUD $450.00", "AUD $550.00", "Total" ; "confirmed total differs from cart")]
#[tokio::test]
async fn test_confirmation_payment_mismatch(outstanding: &'static str, total: &'static str, field: &str) {
    let config = scenario();
    let rendered = Rendered {
        outstanding,
        confirmed_total: total,
        ..Default::default()
    };
    let app = booking_app(Device::Desktop, &config, &rendered);

    match desktop_booking_flow(&app, &config).await {
        Err(E2eError::Verify(VerifyError::Mismatch { field: got, .. })) => assert_eq!(got, field),
        other => panic!("expected {} mismatch, got {:?}", field, other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_odd_total_splits_in_cents() {
    let config = scenario();
    let rendered = Rendered {
        total: "AUD $333.35",
        pay_label: "Pay AUD $33.34".to_string(),
        deposit: "AUD $33.34",
        outstanding: "AUD $300.01",
        confirmed_total: "AUD $333.35",
    };
    let app = booking_app(Device::Desktop, &config, &rendered);

    let report = desktop_booking_flow(&app, &config).await.unwrap();
    assert_eq!(report.outcome.payment.deposit, Money::from_cents(3334));
    assert_eq!(report.outcome.payment.balance, Money::from_cents(30001));
}

#[tokio::test]
async fn test_execute_screenshots_failure_and_closes() {
    let config = scenario();
    let app = MockSurface::new().with_text(&home::locators::cart_button(), "1");

    let result = execute(&app, Device::Mobile, &config).await;

    assert!(!result.success);
    assert_eq!(result.name, "Mobile Booking Flow");
    assert!(result.outcome.is_none());
    let failed = result.steps.last().unwrap();
    assert_eq!(failed.step_name, "verify cart empty");
    assert_eq!(
        failed.screenshot_path.as_deref(),
        Some(std::path::Path::new("mobile-failure.png"))
    );
    assert!(app.is_closed());
}

#[tokio::test]
async fn test_results_written_as_json() {
    let config = scenario();
    let app = booking_app(Device::Desktop, &config, &Rendered::default());
    let result = execute(&app, Device::Desktop, &config).await;
    assert!(result.success, "{:?}", result.error);

    let dir = tempfile::tempdir().unwrap();
    let runner = TestRunner::new(RunnerConfig {
        output_dir: dir.path().to_path_buf(),
        ..Default::default()
    });
    let suite = TestSuiteResult::from_results(vec![result], 5);
    let path = runner.write_results(&suite).unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(written["passed"], 1);
    assert_eq!(written["results"][0]["device"], "desktop");
    assert_eq!(written["results"][0]["outcome"]["payment"]["deposit"], 5000);
}

#[test]
fn test_calendar_cell_for_stay() {
    let path: LocatorPath = home::locators::calendar_day(stay().check_in());
    assert!(path.to_string().contains("Wednesday, March 12, 2025"));
}

/// Hands each flow its own prepared booking app
struct MockLauncher {
    desktop: Arc<MockSurface>,
    mobile: Option<Arc<MockSurface>>,
}

#[async_trait]
impl SurfaceFactory for MockLauncher {
    async fn launch(&self, device: Device) -> E2eResult<Arc<dyn Surface>> {
        match device {
            Device::Desktop => Ok(self.desktop.clone()),
            Device::Mobile => match &self.mobile {
                Some(app) => Ok(app.clone()),
                None => panic!("mobile browser crashed"),
            },
        }
    }
}

fn parallel_config() -> RunnerConfig {
    let mut config = RunnerConfig {
        fixtures: FixtureConfig {
            seed: Some(3),
            ..Default::default()
        },
        parallel: true,
        today: NaiveDate::from_ymd_opt(2025, 3, 9),
        ..Default::default()
    };
    config.preflight.enabled = false;
    config
}

fn planned_app(runner: &TestRunner, device: Device) -> Arc<MockSurface> {
    let plan = runner.plan(NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()).unwrap();
    let (_, scenario) = plan
        .scenarios
        .iter()
        .find(|(planned, _)| *planned == device)
        .unwrap();
    Arc::new(booking_app(device, scenario, &Rendered::default()))
}

#[tokio::test]
async fn test_parallel_run_reports_every_flow_in_order() {
    let config = parallel_config();
    let planner = TestRunner::new(config.clone());
    let desktop = planned_app(&planner, Device::Desktop);
    let mobile = planned_app(&planner, Device::Mobile);
    let launcher = MockLauncher {
        desktop: desktop.clone(),
        mobile: Some(mobile.clone()),
    };

    let runner = TestRunner::with_factory(config, Arc::new(launcher));
    let suite = runner.run_all().await.unwrap();

    assert_eq!(suite.seed, Some(3));
    assert_eq!(suite.total, 2);
    assert_eq!(suite.passed, 2, "{:?}", suite.results);
    assert_eq!(suite.results[0].device, Device::Desktop);
    assert_eq!(suite.results[1].device, Device::Mobile);
    assert!(desktop.is_closed());
    assert!(mobile.is_closed());
    assert_ne!(
        desktop.filled(&checkout::locators::email()),
        mobile.filled(&checkout::locators::email())
    );
}

#[tokio::test]
async fn test_parallel_run_keeps_crashed_flow() {
    let config = parallel_config();
    let planner = TestRunner::new(config.clone());
    let desktop = planned_app(&planner, Device::Desktop);
    let launcher = MockLauncher {
        desktop: desktop.clone(),
        mobile: None,
    };

    let runner = TestRunner::with_factory(config, Arc::new(launcher));
    let suite = runner.run_all().await.unwrap();

    assert_eq!(suite.total, 2);
    assert_eq!(suite.passed, 1);
    assert!(!suite.success());
    let crashed = &suite.results[1];
    assert_eq!(crashed.device, Device::Mobile);
    assert_eq!(crashed.name, "Mobile Booking Flow");
    assert!(crashed
        .error
        .as_deref()
        .unwrap()
        .starts_with("flow task aborted"));
    assert!(desktop.is_closed());
}
