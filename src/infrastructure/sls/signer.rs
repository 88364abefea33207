//! SLS request signing (`hmac-sha1`, API version 0.6.0).
//!
//! ```text
//! VERB\nCONTENT-MD5\nCONTENT-TYPE\nDATE\n<x-log-*/x-acs-* headers>\n<resource>
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::collections::BTreeMap;

pub const SIGNATURE_METHOD: &str = "hmac-sha1";

pub struct RequestSigner {
    access_key_id: String,
    access_key_secret: String,
}

impl RequestSigner {
    pub fn new(access_key_id: String, access_key_secret: String) -> Self {
        Self {
            access_key_id,
            access_key_secret,
        }
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self, string_to_sign: &str) -> String {
        format!("LOG {}:{}", self.access_key_id, self.sign(string_to_sign))
    }

    /// base64(HMAC-SHA1(secret, string_to_sign))
    fn sign(&self, string_to_sign: &str) -> String {
        type HmacSha1 = Hmac<Sha1>;

        let mut mac = HmacSha1::new_from_slice(self.access_key_secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(string_to_sign.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

/// Build the canonical string for a request.
///
/// `headers` keys must already be lowercase; only `x-log-` and `x-acs-`
/// headers take part, in key order.
pub fn string_to_sign(
    method: &str,
    content_md5: Option<&str>,
    content_type: &str,
    date: &str,
    headers: &BTreeMap<String, String>,
    resource: &str,
) -> String {
    let mut out = format!(
        "{}\n{}\n{}\n{}\n",
        method,
        content_md5.unwrap_or(""),
        content_type,
        date
    );

    for (key, value) in headers
        .iter()
        .filter(|(k, _)| k.starts_with("x-log-") || k.starts_with("x-acs-"))
    {
        out.push_str(key);
        out.push(':');
        out.push_str(value);
        out.push('\n');
    }
    out.push_str(resource);
    out
}
