//! Upstream portal configuration.

use super::required;
use anyhow::{Context, Result};

const DEFAULT_BASE_URL: &str = "https://ydapp.bjut.edu.cn";

/// Identity and target of the balance reader
#[derive(Debug, Clone)]
pub struct YdappConfig {
    pub openid: String,
    pub room_id: i64,
    pub base_url: String,
}

impl YdappConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let openid = required(lookup, "YDAPP_OPENID")?;
        let room_raw = required(lookup, "YDAPP_ROOM_ID")?;
        let room_id = room_raw
            .trim()
            .parse::<i64>()
            .with_context(|| format!("YDAPP_ROOM_ID must be an integer, got {}", room_raw))?;
        let base_url = lookup("YDAPP_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            openid,
            room_id,
            base_url,
        })
    }
}
