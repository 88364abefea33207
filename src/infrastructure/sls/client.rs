//! Alibaba Cloud Simple Log Service writer.
//!
//! Provides the batched `PutLogs` call used to ship metric points:
//! - protobuf `LogGroup` body, lz4 block-compressed by default
//! - HMAC-SHA1 request signing
//! - typed errors for non-2xx answers

use crate::config::SlsConfig;
use crate::domain::metric::MetricEntry;
use crate::domain::ports::LogStore;
use crate::infrastructure::core::HttpClientFactory;
use crate::infrastructure::observability::Metrics;
use crate::infrastructure::sls::error::SlsError;
use crate::infrastructure::sls::proto::LogGroup;
use crate::infrastructure::sls::signer::{self, RequestSigner, SIGNATURE_METHOD};
use anyhow::Result;
use async_trait::async_trait;
use prost::Message;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, DATE};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::debug;
use url::{Host, Url};

const API_VERSION: &str = "0.6.0";
const PROTOBUF_CONTENT_TYPE: &str = "application/x-protobuf";

pub struct SlsLogStore {
    client: Client,
    base_url: Url,
    store: String,
    compress: bool,
    signer: RequestSigner,
    metrics: Metrics,
}

impl SlsLogStore {
    pub fn new(config: &SlsConfig, metrics: Metrics) -> Result<Self> {
        let base_url = resolve_base_url(&config.endpoint, &config.project)?;
        debug!("SLS project endpoint resolved to {}", base_url);

        Ok(Self {
            client: HttpClientFactory::create_client()?,
            base_url,
            store: config.store.clone(),
            compress: config.compress,
            signer: RequestSigner::new(
                config.access_key_id.clone(),
                config.access_key_secret.clone(),
            ),
            metrics,
        })
    }

    fn resource(&self) -> String {
        format!("/logstores/{}/shards/lb", self.store)
    }

    async fn put_logs(&self, group: &LogGroup) -> Result<(), SlsError> {
        let raw = group.encode_to_vec();
        let raw_size = raw.len();
        let body = if self.compress {
            lz4_flex::block::compress(&raw)
        } else {
            raw
        };

        let mut log_headers = BTreeMap::new();
        log_headers.insert("x-log-apiversion".to_string(), API_VERSION.to_string());
        log_headers.insert(
            "x-log-signaturemethod".to_string(),
            SIGNATURE_METHOD.to_string(),
        );
        log_headers.insert("x-log-bodyrawsize".to_string(), raw_size.to_string());
        if self.compress {
            log_headers.insert("x-log-compresstype".to_string(), "lz4".to_string());
        }

        let resource = self.resource();
        let date = http_date(chrono::Utc::now());
        let canonical = signer::string_to_sign(
            "POST",
            None,
            PROTOBUF_CONTENT_TYPE,
            &date,
            &log_headers,
            &resource,
        );

        let url = self
            .base_url
            .join(resource.trim_start_matches('/'))
            .map_err(|e| SlsError::InvalidEndpoint {
                endpoint: self.base_url.to_string(),
                reason: e.to_string(),
            })?;

        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, PROTOBUF_CONTENT_TYPE)
            .header(DATE, &date)
            .header(AUTHORIZATION, self.signer.authorization(&canonical));
        for (key, value) in &log_headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let started = Instant::now();
        let response = request.body(body).send().await?;
        self.metrics
            .observe_api_latency("sls", "put_logs", started.elapsed().as_secs_f64());

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let request_id = response
            .headers()
            .get("x-log-requestid")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let text = response.text().await.unwrap_or_default();
        Err(SlsError::from_response(status.as_u16(), request_id, &text))
    }
}

#[async_trait]
impl LogStore for SlsLogStore {
    async fn put_entries(&self, entries: &[MetricEntry]) -> Result<()> {
        let group = LogGroup::from_entries(entries)?;
        self.put_logs(&group).await?;
        Ok(())
    }
}

/// Project endpoints are addressed as `<project>.<endpoint>`; bare IP
/// endpoints are used unchanged.
pub fn resolve_base_url(endpoint: &str, project: &str) -> Result<Url, SlsError> {
    let invalid = |reason: String| SlsError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };

    let with_scheme = if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{}", endpoint)
    };
    let mut url = Url::parse(&with_scheme).map_err(|e| invalid(e.to_string()))?;

    let prefixed = match url.host() {
        Some(Host::Domain(domain)) => Some(format!("{}.{}", project, domain)),
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => None,
        None => return Err(invalid("missing host".to_string())),
    };
    if let Some(host) = prefixed {
        url.set_host(Some(&host))
            .map_err(|e| invalid(e.to_string()))?;
    }
    url.set_path("/");
    Ok(url)
}

/// RFC 1123 date as SLS expects in the `Date` header.
fn http_date(now: chrono::DateTime<chrono::Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
