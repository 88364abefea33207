//! Configuration module for meterwatch.
//!
//! Everything is read once at startup from environment variables (a `.env`
//! file is honoured by the binary) and handed to the components explicitly,
//! organized by domain: upstream portal, log store and poll loop.

mod poll_config;
mod sls_config;
mod ydapp_config;

pub use poll_config::PollConfig;
pub use sls_config::SlsConfig;
pub use ydapp_config::YdappConfig;

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub ydapp: YdappConfig,
    pub sls: SlsConfig,
    pub poll: PollConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            ydapp: YdappConfig::from_lookup(&lookup).context("Failed to load ydapp config")?,
            sls: SlsConfig::from_lookup(&lookup).context("Failed to load SLS config")?,
            poll: PollConfig::from_lookup(&lookup).context("Failed to load poll config")?,
        })
    }
}

/// Fetch a mandatory variable. Unset and empty are both treated as missing.
pub(crate) fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => anyhow::bail!("Missing required environment variable {}", key),
    }
}

/// Parse an optional variable, falling back to `default` when unset.
pub(crate) fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid value for {}: {}", key, raw)),
        _ => Ok(default),
    }
}
