use anyhow::{Context, Result};
use reqwest::{Client, redirect};
use std::time::Duration;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates a plain HTTP client for signed API calls.
    ///
    /// No retry middleware: a failed request is reported to the caller as-is.
    pub fn create_client() -> Result<Client> {
        Client::builder()
            .pool_max_idle_per_host(5)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")
    }

    /// Creates a client that keeps cookies between requests and never follows
    /// redirects, so callers can inspect the `Location` of a 3xx themselves.
    pub fn create_session_client(user_agent: &str) -> Result<Client> {
        Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .user_agent(user_agent)
            .pool_max_idle_per_host(5)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build session HTTP client")
    }
}
