//! Log store configuration.

use super::{parse_or, required};
use anyhow::Result;
use std::fmt;

/// Credentials and target of the Simple Log Service writer
#[derive(Clone)]
pub struct SlsConfig {
    pub access_key_id: String,
    pub access_key_secret: String,
    pub endpoint: String,
    pub project: String,
    pub store: String,
    pub compress: bool,
}

impl SlsConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            access_key_id: required(lookup, "ALIBABA_CLOUD_ACCESS_KEY_ID")?,
            access_key_secret: required(lookup, "ALIBABA_CLOUD_ACCESS_KEY_SECRET")?,
            endpoint: required(lookup, "ALIBABA_CLOUD_SLS_ENDPOINT")?,
            project: required(lookup, "ALIBABA_CLOUD_SLS_PROJECT")?,
            store: required(lookup, "ALIBABA_CLOUD_SLS_STORE")?,
            compress: parse_or(lookup, "ALIBABA_CLOUD_SLS_COMPRESS", true)?,
        })
    }
}

// The secret never reaches the logs.
impl fmt::Debug for SlsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlsConfig")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("project", &self.project)
            .field("store", &self.store)
            .field("compress", &self.compress)
            .finish()
    }
}
