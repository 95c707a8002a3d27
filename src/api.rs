//! API client for the game's static resources

use crate::config::Config;
use crate::error::Result;
use crate::trace;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{error, info};
use url::Url;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_10_1) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/39.0.2171.95 Safari/537.36";

/// Response body: parsed JSON, or the raw text fallback
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestBody {
    Json(Value),
    Text(String),
}

impl ManifestBody {
    pub fn is_json(&self) -> bool {
        matches!(self, ManifestBody::Json(_))
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ManifestBody::Json(value) => Some(value),
            ManifestBody::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ManifestBody::Text(text) => Some(text),
            ManifestBody::Json(_) => None,
        }
    }
}

/// What the caller asserts on besides the body
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    pub status: StatusCode,
    pub reason: String,
    pub content_type: Option<String>,
}

/// HTTP client for the application under test
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<ApiClient> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let http = reqwest::Client::builder().default_headers(headers).build()?;
        let base_url = Url::parse(&config.app.base_url)?;

        Ok(ApiClient { http, base_url })
    }

    /// One GET of `{base_url}/manifest.json`.
    ///
    /// The body is parsed as JSON; on parse failure the raw text is
    /// returned instead, or the HTTP reason phrase when the body is empty.
    /// Transport errors are logged and propagate unchanged — no retry.
    pub async fn get_manifest(&self) -> Result<(ManifestBody, ResponseMeta)> {
        trace::traced_async("ApiClient", "get_manifest", async {
            let url = self.base_url.join("manifest.json")?;
            let response = self.http.get(url).send().await?;

            let status = response.status();
            let reason = status.canonical_reason().unwrap_or("").to_string();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            let text = response.text().await?;

            let body = decode_body(&text, &reason);
            info!("RESPONSE: {:?}", body);

            Ok((
                body,
                ResponseMeta {
                    status,
                    reason,
                    content_type,
                },
            ))
        })
        .await
    }
}

fn decode_body(text: &str, reason: &str) -> ManifestBody {
    match serde_json::from_str::<Value>(text) {
        Ok(json) => ManifestBody::Json(json),
        Err(e) => {
            error!("Failed to parse response json: {}", e);
            if text.is_empty() {
                ManifestBody::Text(reason.to_string())
            } else {
                ManifestBody::Text(text.to_string())
            }
        }
    }
}
