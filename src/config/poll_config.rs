//! Poll loop configuration.

use super::parse_or;
use anyhow::Result;
use std::time::Duration;

pub const DEFAULT_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_METRIC_NAME: &str = "ac_meter_balance";

#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
    pub metric_name: String,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            metric_name: DEFAULT_METRIC_NAME.to_string(),
        }
    }
}

impl PollConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secs = parse_or(lookup, "POLL_INTERVAL_SECS", DEFAULT_INTERVAL_SECS)?;
        if secs == 0 {
            anyhow::bail!("POLL_INTERVAL_SECS must be at least 1");
        }
        let metric_name = lookup("METRIC_NAME")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_METRIC_NAME.to_string());

        Ok(Self {
            interval: Duration::from_secs(secs),
            metric_name,
        })
    }
}
