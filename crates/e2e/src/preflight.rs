//! Reachability check run before any browser is launched

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreflightConfig {
    pub enabled: bool,
    pub attempts: usize,
    pub interval_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for PreflightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            attempts: 5,
            interval_ms: 1_000,
            request_timeout_ms: 5_000,
        }
    }
}

/// Poll `url` until it answers with a non-server-error status
pub async fn wait_for_site(url: &str, config: &PreflightConfig) -> E2eResult<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.request_timeout_ms))
        .build()?;

    let attempts = config.attempts.max(1);
    let mut reason = String::new();

    for attempt in 1..=attempts {
        match client.get(url).send().await {
            Ok(resp) if !resp.status().is_server_error() => {
                info!("Booking site reachable at {} ({})", url, resp.status());
                return Ok(());
            }
            Ok(resp) => {
                warn!("Preflight attempt {} returned {}", attempt, resp.status());
                reason = format!("status {}", resp.status());
            }
            Err(e) => {
                if attempt == 1 {
                    info!("Waiting for booking site at {}...", url);
                }
                if !e.is_connect() {
                    warn!("Preflight error: {}", e);
                }
                reason = e.to_string();
            }
        }

        if attempt < attempts {
            sleep(Duration::from_millis(config.interval_ms)).await;
        }
    }

    Err(E2eError::Preflight { attempts, reason })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_site_reports_attempts() {
        // Nothing listens on the discard port locally
        let config = PreflightConfig {
            attempts: 2,
            interval_ms: 10,
            request_timeout_ms: 500,
            ..Default::default()
        };

        match wait_for_site("http://127.0.0.1:9/", &config).await {
            Err(E2eError::Preflight { attempts, reason }) => {
                assert_eq!(attempts, 2);
                assert!(!reason.is_empty());
            }
            other => panic!("expected preflight failure, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_defaults() {
        let config: PreflightConfig = serde_yaml::from_str("attempts: 3").unwrap();
        assert!(config.enabled);
        assert_eq!(config.attempts, 3);
        assert_eq!(config.interval_ms, 1_000);
    }
}
