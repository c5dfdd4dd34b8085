//! Playwright browser automation
//!
//! A long-lived `node` process runs a generated bridge script that owns one
//! browser context. Rust sends one JSON request per line on its stdin and
//! reads one JSON response per line from its stdout:
//!
//! ```text
//! -> {"id":7,"op":"fill","locator":{"kind":"inside_frame",...},"text":"4917610000000000"}
//! <- {"id":7,"ok":true,"value":null}
//! <- {"id":8,"ok":false,"error":"locator.click: Timeout 10000ms exceeded.","timeout":true}
//! ```
//!
//! Locator descriptors are resolved on the JavaScript side, so frame descent
//! and filters map directly onto Playwright's own locator chaining.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::locator::LocatorPath;
use crate::surface::{Surface, WaitState};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> E2eResult<Self> {
        match s {
            "chromium" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(E2eError::Config(format!("unknown browser: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Device class a flow is run on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    Desktop,
    Mobile,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Desktop => "desktop",
            Device::Mobile => "mobile",
        }
    }

    pub fn is_mobile(&self) -> bool {
        matches!(self, Device::Mobile)
    }

    fn user_agent(&self) -> Option<&'static str> {
        match self {
            Device::Desktop => None,
            Device::Mobile => Some(
                "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 \
                 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1",
            ),
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaywrightConfig {
    pub base_url: String,
    pub screenshot_dir: PathBuf,
    pub browser: Browser,
    pub headless: bool,
    pub desktop_viewport: Viewport,
    pub mobile_viewport: Viewport,

    /// Playwright's own per-action timeout
    pub action_timeout_ms: u64,

    /// Time allowed for the browser to launch
    pub startup_timeout_ms: u64,

    /// Directory holding the `playwright` package (defaults to `./node_modules`)
    pub node_modules: Option<PathBuf>,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            base_url: "https://booking.example.com".to_string(),
            screenshot_dir: PathBuf::from("test-results/screenshots"),
            browser: Browser::Chromium,
            headless: true,
            desktop_viewport: Viewport {
                width: 1280,
                height: 720,
            },
            mobile_viewport: Viewport {
                width: 390,
                height: 844,
            },
            action_timeout_ms: 10_000,
            startup_timeout_ms: 30_000,
            node_modules: None,
        }
    }
}

impl PlaywrightConfig {
    pub fn viewport(&self, device: Device) -> Viewport {
        match device {
            Device::Desktop => self.desktop_viewport,
            Device::Mobile => self.mobile_viewport,
        }
    }

    fn node_path(&self) -> E2eResult<PathBuf> {
        match &self.node_modules {
            Some(path) => Ok(path.clone()),
            None => Ok(std::env::current_dir()?.join("node_modules")),
        }
    }
}

/// Values baked into the bridge script
#[derive(Debug, Serialize)]
struct BridgeSettings<'a> {
    browser: &'static str,
    headless: bool,
    base_url: &'a str,
    viewport: Viewport,
    is_mobile: bool,
    has_touch: bool,
    user_agent: Option<&'static str>,
    action_timeout_ms: u64,
}

/// Build the bridge script for one browser context
pub fn build_script(config: &PlaywrightConfig, device: Device) -> E2eResult<String> {
    let settings = BridgeSettings {
        browser: config.browser.as_str(),
        headless: config.headless,
        base_url: &config.base_url,
        viewport: config.viewport(device),
        is_mobile: device.is_mobile(),
        has_touch: device.is_mobile(),
        user_agent: device.user_agent(),
        action_timeout_ms: config.action_timeout_ms,
    };

    Ok(format!(
        "const settings = {};\n{}",
        serde_json::to_string(&settings)?,
        BRIDGE_BODY
    ))
}

const BRIDGE_BODY: &str = r#"
const playwright = require('playwright');
const readline = require('readline');

function reply(message) {
  process.stdout.write(JSON.stringify(message) + '\n');
}

(async () => {
  const browser = await playwright[settings.browser].launch({ headless: settings.headless });
  const contextOptions = {
    baseURL: settings.base_url,
    viewport: settings.viewport,
    isMobile: settings.is_mobile,
    hasTouch: settings.has_touch,
  };
  if (settings.user_agent) {
    contextOptions.userAgent = settings.user_agent;
  }
  const context = await browser.newContext(contextOptions);
  context.setDefaultTimeout(settings.action_timeout_ms);
  const page = await context.newPage();

  function select(scope, selector) {
    switch (selector.kind) {
      case 'test_id':
        return scope.getByTestId(selector.value);
      case 'test_id_prefix':
        return scope.locator(`[data-testid^=${JSON.stringify(selector.value)}]`);
      case 'css':
        return scope.locator(selector.value);
      case 'xpath':
        return scope.locator('xpath=' + selector.value);
      case 'role':
        return scope.getByRole(selector.value.role, { name: selector.value.name });
      default:
        throw new Error('unknown selector kind: ' + selector.kind);
    }
  }

  function query(scope, q) {
    let locator = select(scope, q.selector);
    if (q.has_text !== undefined) {
      locator = locator.filter({ hasText: q.has_text });
    }
    if (q.has !== undefined) {
      locator = locator.filter({ has: query(page, q.has) });
    }
    if (q.first) {
      locator = locator.first();
    }
    return locator;
  }

  function resolve(scope, path) {
    switch (path.kind) {
      case 'root':
        return query(scope, path.query);
      case 'within':
        return resolve(query(scope, path.scope), path.inner);
      case 'inside_frame':
        return resolve(query(scope, path.frame).contentFrame(), path.inner);
      default:
        throw new Error('unknown locator kind: ' + path.kind);
    }
  }

  async function handle(request) {
    switch (request.op) {
      case 'navigate':
        await page.goto(request.path);
        return null;
      case 'count':
        return await resolve(page, request.locator).count();
      case 'click':
        await resolve(page, request.locator).click();
        return null;
      case 'fill':
        await resolve(page, request.locator).fill(request.text);
        return null;
      case 'wait_for':
        await resolve(page, request.locator).waitFor({ state: request.state });
        return null;
      case 'text':
        return (await resolve(page, request.locator).textContent()) ?? '';
      case 'screenshot':
        await page.screenshot({ path: request.path, fullPage: true });
        return request.path;
      case 'close':
        await browser.close();
        return null;
      default:
        throw new Error('unknown op: ' + request.op);
    }
  }

  reply({ id: 0, ok: true, value: 'ready' });

  const input = readline.createInterface({ input: process.stdin });
  for await (const line of input) {
    if (!line.trim()) {
      continue;
    }
    const request = JSON.parse(line);
    try {
      const value = await handle(request);
      reply({ id: request.id, ok: true, value });
    } catch (error) {
      reply({ id: request.id, ok: false, error: error.message, timeout: error.name === 'TimeoutError' });
    }
    if (request.op === 'close') {
      break;
    }
  }

  await browser.close().catch(() => {});
  process.exit(0);
})().catch((error) => {
  console.error(JSON.stringify({ fatal: error.message, stack: error.stack }));
  process.exit(1);
});
"#;

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Command<'a> {
    Navigate { path: &'a str },
    Count { locator: &'a LocatorPath },
    Click { locator: &'a LocatorPath },
    Fill { locator: &'a LocatorPath, text: &'a str },
    WaitFor { locator: &'a LocatorPath, state: WaitState },
    Text { locator: &'a LocatorPath },
    Screenshot { path: String },
    Close,
}

impl Command<'_> {
    fn describe(&self) -> String {
        match self {
            Command::Navigate { path } => format!("navigate:{}", path),
            Command::Count { locator } => format!("count:{}", locator),
            Command::Click { locator } => format!("click:{}", locator),
            Command::Fill { locator, .. } => format!("fill:{}", locator),
            Command::WaitFor { locator, state } => format!("wait:{}:{}", state.as_str(), locator),
            Command::Text { locator } => format!("text:{}", locator),
            Command::Screenshot { path } => format!("screenshot:{}", path),
            Command::Close => "close".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Request<'a> {
    id: u64,
    #[serde(flatten)]
    command: Command<'a>,
}

#[derive(Debug, Deserialize)]
struct Response {
    id: u64,
    ok: bool,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    timeout: bool,
}

/// Lines of bridge stderr kept for the exit error
const STDERR_TAIL: usize = 8;

type StderrTail = Arc<parking_lot::Mutex<VecDeque<String>>>;

fn exit_error(stderr_tail: &VecDeque<String>) -> E2eError {
    if stderr_tail.is_empty() {
        return E2eError::Bridge("bridge process exited".to_string());
    }
    let tail: Vec<&str> = stderr_tail.iter().map(String::as_str).collect();
    E2eError::Bridge(format!("bridge process exited: {}", tail.join("\n")))
}

struct Bridge {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    stderr_tail: StderrTail,
    stderr_reader: Option<JoinHandle<()>>,
    closed: bool,
}

impl Bridge {
    async fn read_response(&mut self, id: u64) -> E2eResult<Response> {
        while let Some(line) = self.stdout.next_line().await? {
            match serde_json::from_str::<Response>(&line) {
                Ok(response) if response.id == id => return Ok(response),
                Ok(response) => debug!("Discarding stale bridge response {}", response.id),
                Err(_) => debug!("[bridge stdout] {}", line),
            }
        }

        // stderr closes with the process; let the reader drain it first
        if let Some(reader) = self.stderr_reader.take() {
            let _ = timeout(Duration::from_millis(500), reader).await;
        }
        let tail = self.stderr_tail.lock();
        Err(exit_error(&tail))
    }

    /// Terminate the node process, gracefully first
    async fn stop(&mut self) -> E2eResult<()> {
        if let Ok(Ok(_)) = timeout(Duration::from_secs(5), self.child.wait()).await {
            return Ok(());
        }

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = self.child.id() {
                if kill(Pid::from_raw(pid as i32), Signal::SIGTERM).is_ok() {
                    if let Ok(Ok(_)) = timeout(Duration::from_millis(500), self.child.wait()).await {
                        return Ok(());
                    }
                }
            }
        }

        self.child.kill().await?;
        Ok(())
    }
}

/// Surface backed by a Playwright browser context
pub struct PlaywrightSurface {
    bridge: Mutex<Bridge>,
    next_id: AtomicU64,
    request_timeout: Duration,
    screenshot_dir: PathBuf,

    // Holds the bridge script for the lifetime of the process
    _script_dir: tempfile::TempDir,
}

impl PlaywrightSurface {
    /// Launch a browser context for `device`
    pub async fn launch(config: &PlaywrightConfig, device: Device) -> E2eResult<Self> {
        let node_path = config.node_path()?;
        Self::check_playwright_installed(&node_path).await?;

        std::fs::create_dir_all(&config.screenshot_dir)?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("bridge.js");
        std::fs::write(&script_path, build_script(config, device)?)?;

        info!(
            "Launching {} ({}) against {}",
            config.browser.as_str(),
            device.as_str(),
            config.base_url
        );

        let mut child = TokioCommand::new("node")
            .arg(&script_path)
            .env("NODE_PATH", &node_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Bridge("bridge stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Bridge("bridge stdout unavailable".to_string()))?;

        let stderr_tail = StderrTail::default();
        let stderr_reader = child.stderr.take().map(|stderr| {
            let tail = Arc::clone(&stderr_tail);
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!("[bridge stderr] {}", line);
                    let mut kept = tail.lock();
                    if kept.len() == STDERR_TAIL {
                        kept.pop_front();
                    }
                    kept.push_back(line);
                }
            })
        });

        let mut bridge = Bridge {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            stderr_tail,
            stderr_reader,
            closed: false,
        };

        let startup = Duration::from_millis(config.startup_timeout_ms);
        match timeout(startup, bridge.read_response(0)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(E2eError::Timeout("browser launch".to_string())),
        }

        Ok(Self {
            bridge: Mutex::new(bridge),
            next_id: AtomicU64::new(1),
            // Playwright enforces the action timeout; this guard only catches a hung bridge
            request_timeout: Duration::from_millis(config.action_timeout_ms * 2 + 5_000),
            screenshot_dir: config.screenshot_dir.clone(),
            _script_dir: script_dir,
        })
    }

    /// Check that node can load the playwright package
    async fn check_playwright_installed(node_path: &Path) -> E2eResult<()> {
        let status = TokioCommand::new("node")
            .args(["-e", "require.resolve('playwright')"])
            .env("NODE_PATH", node_path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    async fn request(&self, command: Command<'_>) -> E2eResult<serde_json::Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let step = command.describe();

        let mut line = serde_json::to_string(&Request { id, command })?;
        line.push('\n');

        let mut bridge = self.bridge.lock().await;
        if bridge.closed {
            return Err(E2eError::Bridge(format!("{} after close", step)));
        }

        debug!("-> {}", step);
        bridge.stdin.write_all(line.as_bytes()).await?;
        bridge.stdin.flush().await?;

        let response = timeout(self.request_timeout, bridge.read_response(id))
            .await
            .map_err(|_| E2eError::Timeout(step.clone()))??;

        if response.ok {
            return Ok(response.value);
        }

        let error = response.error.unwrap_or_else(|| "unknown error".to_string());
        if response.timeout {
            Err(E2eError::Timeout(format!("{} ({})", step, error)))
        } else {
            Err(E2eError::Playwright(format!("{}: {}", step, error)))
        }
    }
}

fn unexpected(op: &str, value: &serde_json::Value) -> E2eError {
    E2eError::Bridge(format!("unexpected {} response: {}", op, value))
}

#[async_trait]
impl Surface for PlaywrightSurface {
    async fn navigate(&self, path: &str) -> E2eResult<()> {
        self.request(Command::Navigate { path }).await?;
        Ok(())
    }

    async fn count(&self, locator: &LocatorPath) -> E2eResult<usize> {
        let value = self.request(Command::Count { locator }).await?;
        value
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| unexpected("count", &value))
    }

    async fn click(&self, locator: &LocatorPath) -> E2eResult<()> {
        self.request(Command::Click { locator }).await?;
        Ok(())
    }

    async fn fill(&self, locator: &LocatorPath, text: &str) -> E2eResult<()> {
        self.request(Command::Fill { locator, text }).await?;
        Ok(())
    }

    async fn wait_for(&self, locator: &LocatorPath, state: WaitState) -> E2eResult<()> {
        self.request(Command::WaitFor { locator, state }).await?;
        Ok(())
    }

    async fn text(&self, locator: &LocatorPath) -> E2eResult<String> {
        let value = self.request(Command::Text { locator }).await?;
        value
            .as_str()
            .map(String::from)
            .ok_or_else(|| unexpected("text", &value))
    }

    async fn screenshot(&self, name: &str) -> E2eResult<PathBuf> {
        let path = self.screenshot_dir.join(format!("{}.png", name));
        self.request(Command::Screenshot {
            path: path.to_string_lossy().to_string(),
        })
        .await?;
        Ok(path)
    }

    async fn close(&self) -> E2eResult<()> {
        let result = self.request(Command::Close).await;
        if let Err(e) = &result {
            warn!("Browser did not close cleanly: {}", e);
        }

        let mut bridge = self.bridge.lock().await;
        bridge.closed = true;
        bridge.stop().await
    }
}
