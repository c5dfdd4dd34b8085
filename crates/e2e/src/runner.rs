//! Main test runner that checks the site, launches browsers and runs the booking flows

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::fixtures::{FixtureConfig, ScenarioConfig};
use crate::playwright::{Device, PlaywrightConfig, PlaywrightSurface};
use crate::preflight::{wait_for_site, PreflightConfig};
use crate::scenario::{flow_name, run_flow, FlowOutcome, FlowRecorder, StepResult};
use crate::surface::Surface;

/// Result of running a single flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub device: Device,
    pub success: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepResult>,
    pub outcome: Option<FlowOutcome>,
    pub error: Option<String>,
}

impl TestResult {
    fn failed(device: Device, error: impl ToString) -> Self {
        Self {
            name: flow_name(device).to_string(),
            device,
            success: false,
            duration_ms: 0,
            steps: vec![],
            outcome: None,
            error: Some(error.to_string()),
        }
    }
}

/// Result of running all flows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,

    /// Base guest seed; pass it back as `--seed` to replay the run
    pub seed: Option<u64>,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn from_results(results: Vec<TestResult>, duration_ms: u64) -> Self {
        let passed = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            duration_ms,
            seed: None,
            results,
        }
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Configuration for the test runner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub playwright: PlaywrightConfig,
    pub fixtures: FixtureConfig,
    pub preflight: PreflightConfig,

    /// Flows to run, in order
    pub flows: Vec<Device>,

    /// Run the flows concurrently, each in its own browser
    pub parallel: bool,

    pub output_dir: PathBuf,

    /// Date the calendar offsets count from; the local date when unset
    pub today: Option<NaiveDate>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            playwright: PlaywrightConfig::default(),
            fixtures: FixtureConfig::default(),
            preflight: PreflightConfig::default(),
            flows: vec![Device::Desktop, Device::Mobile],
            parallel: false,
            output_dir: PathBuf::from("test-results"),
            today: None,
        }
    }
}

impl RunnerConfig {
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> E2eResult<()> {
        if self.flows.is_empty() {
            return Err(E2eError::Config("no flows selected".to_string()));
        }
        if !self.playwright.base_url.starts_with("http://")
            && !self.playwright.base_url.starts_with("https://")
        {
            return Err(E2eError::Config(format!(
                "base_url must be an http(s) URL: {}",
                self.playwright.base_url
            )));
        }
        Ok(())
    }
}

/// Opens one browser session per flow
#[async_trait]
pub trait SurfaceFactory: Send + Sync {
    async fn launch(&self, device: Device) -> E2eResult<Arc<dyn Surface>>;
}

/// Launches a Playwright bridge for each flow
pub struct PlaywrightLauncher {
    config: PlaywrightConfig,
}

impl PlaywrightLauncher {
    pub fn new(config: PlaywrightConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SurfaceFactory for PlaywrightLauncher {
    async fn launch(&self, device: Device) -> E2eResult<Arc<dyn Surface>> {
        let surface = PlaywrightSurface::launch(&self.config, device).await?;
        Ok(Arc::new(surface))
    }
}

/// Scenarios for one run, all derived from a single base seed
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub seed: u64,
    pub scenarios: Vec<(Device, ScenarioConfig)>,
}

/// Main E2E test runner
pub struct TestRunner {
    config: RunnerConfig,
    factory: Arc<dyn SurfaceFactory>,
}

impl TestRunner {
    pub fn new(config: RunnerConfig) -> Self {
        let factory = Arc::new(PlaywrightLauncher::new(config.playwright.clone()));
        Self { config, factory }
    }

    /// Runner that opens surfaces through `factory` instead of Playwright
    pub fn with_factory(config: RunnerConfig, factory: Arc<dyn SurfaceFactory>) -> Self {
        Self { config, factory }
    }

    /// Build the scenario for every configured flow from one base seed
    pub fn plan(&self, today: NaiveDate) -> E2eResult<RunPlan> {
        let seed = self.config.fixtures.base_seed();
        info!("Guest seed: {} (replay with --seed {})", seed, seed);

        let mut scenarios = Vec::with_capacity(self.config.flows.len());
        for device in &self.config.flows {
            scenarios.push((*device, self.config.fixtures.scenario(*device, today, seed)?));
        }
        Ok(RunPlan { seed, scenarios })
    }

    /// Run every configured flow and collect the results
    pub async fn run_all(&self) -> E2eResult<TestSuiteResult> {
        self.config.validate()?;
        let start = Instant::now();

        if self.config.preflight.enabled {
            wait_for_site(&self.config.playwright.base_url, &self.config.preflight).await?;
        }

        let today = self.config.today.unwrap_or_else(|| Local::now().date_naive());
        let plan = self.plan(today)?;

        info!("Running {} flow(s)...", plan.scenarios.len());

        let results = if self.config.parallel {
            self.run_parallel(plan.scenarios).await
        } else {
            let mut results = Vec::with_capacity(plan.scenarios.len());
            for (device, scenario) in plan.scenarios {
                results.push(launch_and_execute(self.factory.as_ref(), device, scenario).await);
            }
            results
        };

        let mut suite = TestSuiteResult::from_results(results, start.elapsed().as_millis() as u64);
        suite.seed = Some(plan.seed);
        for result in &suite.results {
            if result.success {
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                error!(
                    "✗ {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
        }
        info!(
            "Test Results: {} passed, {} failed ({} ms)",
            suite.passed, suite.failed, suite.duration_ms
        );
        Ok(suite)
    }

    /// Every flow yields a result in plan order, including flows whose task panicked
    async fn run_parallel(&self, scenarios: Vec<(Device, ScenarioConfig)>) -> Vec<TestResult> {
        let devices: Vec<Device> = scenarios.iter().map(|(device, _)| *device).collect();
        let mut slots: Vec<Option<TestResult>> = vec![None; devices.len()];
        let mut aborted = Vec::new();

        let mut set = JoinSet::new();
        for (index, (device, scenario)) in scenarios.into_iter().enumerate() {
            let factory = Arc::clone(&self.factory);
            set.spawn(async move {
                (index, launch_and_execute(factory.as_ref(), device, scenario).await)
            });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => {
                    error!("Flow task failed: {}", e);
                    aborted.push(e.to_string());
                }
            }
        }

        // a JoinError carries no index, so unfilled slots take the messages in order
        let mut aborted = aborted.into_iter();
        slots
            .into_iter()
            .zip(devices)
            .map(|(slot, device)| {
                slot.unwrap_or_else(|| {
                    let reason = aborted
                        .next()
                        .unwrap_or_else(|| "task did not finish".to_string());
                    TestResult::failed(device, format!("flow task aborted: {}", reason))
                })
            })
            .collect()
    }

    /// Write results to `test-results.json` in the output directory
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

async fn launch_and_execute(
    factory: &dyn SurfaceFactory,
    device: Device,
    scenario: ScenarioConfig,
) -> TestResult {
    match factory.launch(device).await {
        Ok(surface) => execute(surface.as_ref(), device, &scenario).await,
        Err(e) => {
            error!("Failed to launch browser for {} flow: {}", device.as_str(), e);
            TestResult::failed(device, e)
        }
    }
}

/// Run one flow on an open surface, screenshot on failure, then close it
pub async fn execute(surface: &dyn Surface, device: Device, scenario: &ScenarioConfig) -> TestResult {
    let start = Instant::now();
    let mut recorder = FlowRecorder::new();

    let outcome = run_flow(surface, device, scenario, &mut recorder).await;

    let mut error = None;
    let outcome = match outcome {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            let name = format!("{}-failure", device.as_str());
            match surface.screenshot(&name).await {
                Ok(path) => recorder.attach_screenshot(path),
                Err(shot) => warn!("Failure screenshot not captured: {}", shot),
            }
            error = Some(e.to_string());
            None
        }
    };

    if let Err(e) = surface.close().await {
        warn!("Failed to close {} browser: {}", device.as_str(), e);
    }

    TestResult {
        name: flow_name(device).to_string(),
        device,
        success: error.is_none(),
        duration_ms: start.elapsed().as_millis() as u64,
        steps: recorder.into_steps(),
        outcome,
        error,
    }
}
