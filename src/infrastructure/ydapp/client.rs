//! Session-backed balance reader for the campus utility app.
//!
//! The upstream keeps its session in a cookie. When the session expires the
//! balance query answers with a redirect to an error page instead of JSON;
//! the client then re-runs the home-page bootstrap and retries once.

use crate::config::YdappConfig;
use crate::domain::errors::BalancePayloadError;
use crate::domain::ports::BalanceSource;
use crate::infrastructure::core::HttpClientFactory;
use crate::infrastructure::observability::Metrics;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, warn};
use url::Url;

const HOME_PATH: &str = "/home/openHomePageApp";
const QUERY_PATH: &str = "/channel/querySydl";
const ORG_ID: &str = "2";
const FACTORY_CODE: &str = "N002";
const USER_AGENT: &str = "Mozilla/5.0";

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(rename = "resultData")]
    result_data: Option<ResultData>,
}

#[derive(Debug, Deserialize)]
struct ResultData {
    #[serde(rename = "MeterBalance")]
    meter_balance: Option<serde_json::Value>,
}

pub struct YdappClient {
    client: Client,
    base_url: Url,
    openid: String,
    metrics: Metrics,
}

impl YdappClient {
    /// Build the client and establish the initial session.
    pub async fn connect(config: &YdappConfig, metrics: Metrics) -> Result<Self> {
        let client = HttpClientFactory::create_session_client(USER_AGENT)?;
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid ydapp base URL: {}", config.base_url))?;

        let reader = Self {
            client,
            base_url,
            openid: config.openid.clone(),
            metrics,
        };
        reader
            .authenticate()
            .await
            .context("Failed to bootstrap ydapp session")?;
        Ok(reader)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Failed to build ydapp URL for {}", path))
    }

    fn identity_params(&self) -> [(&str, &str); 2] {
        [("openid", self.openid.as_str()), ("orgid", ORG_ID)]
    }

    /// Hit the home page so the server hands out a fresh session cookie.
    /// The response body and status are irrelevant.
    async fn authenticate(&self) -> Result<()> {
        let url = self.endpoint(HOME_PATH)?;
        let response = self
            .client
            .get(url)
            .query(&self.identity_params())
            .send()
            .await
            .context("Failed to send ydapp session bootstrap")?;
        debug!("ydapp session bootstrap answered {}", response.status());
        Ok(())
    }

    async fn query(&self, room_id: i64) -> Result<Response> {
        let url = self.endpoint(QUERY_PATH)?;
        let room = room_id.to_string();
        let started = Instant::now();

        let response = self
            .client
            .get(url)
            .query(&self.identity_params())
            .query(&[("group_id", room.as_str()), ("factorycode", FACTORY_CODE)])
            .send()
            .await
            .context("Failed to send ydapp balance query")?;

        self.metrics.observe_api_latency(
            "ydapp",
            "querySydl",
            started.elapsed().as_secs_f64(),
        );
        Ok(response)
    }

    pub async fn read_balance(&self, room_id: i64) -> Result<f64> {
        let mut response = self.query(room_id).await?;

        if is_session_expired(&response) {
            warn!("ydapp session expired, re-authenticating");
            self.metrics.session_refreshes_total.inc();
            self.authenticate().await?;
            response = self.query(room_id).await?;
        }

        let response = response
            .error_for_status()
            .context("ydapp balance query failed")?;
        let body = response
            .bytes()
            .await
            .context("Failed to read ydapp balance response")?;

        let balance = parse_balance(&body)?;
        Ok(balance)
    }
}

#[async_trait]
impl BalanceSource for YdappClient {
    async fn read_balance(&self, room_id: i64) -> Result<f64> {
        YdappClient::read_balance(self, room_id).await
    }
}

/// A redirect carrying a `Location` that mentions "error" means the session
/// cookie is no longer accepted.
fn is_session_expired(response: &Response) -> bool {
    let is_redirect = matches!(
        response.status(),
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    );
    if !is_redirect {
        return false;
    }

    response
        .headers()
        .get(LOCATION)
        .is_some_and(|location| location_signals_error(location.as_bytes()))
}

fn location_signals_error(location: &[u8]) -> bool {
    String::from_utf8_lossy(location)
        .to_lowercase()
        .contains("error")
}

fn parse_balance(body: &[u8]) -> Result<f64, BalancePayloadError> {
    let payload: QueryResponse =
        serde_json::from_slice(body).map_err(|e| BalancePayloadError::Malformed {
            reason: e.to_string(),
        })?;

    let raw = payload
        .result_data
        .ok_or(BalancePayloadError::MissingResultData)?
        .meter_balance
        .ok_or(BalancePayloadError::MissingBalance)?;

    let parsed = match &raw {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| BalancePayloadError::NotNumeric {
        raw: raw.to_string(),
    })
}
