//! HTTP client wrapping one request/response exchange

use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE};
use serde_json::Value;

use crate::config::HarnessConfig;
use crate::error::{CheckError, CheckResult};
use crate::spec::{Encoding, Method, RequestBody};
use crate::xml;

/// Everything the runner needs from one response
#[derive(Debug, Clone)]
pub struct Exchange {
    pub status: u16,
    pub headers: HeaderMap,
    pub text: String,
    /// Leniently parsed body; `None` when the text is empty or unparseable
    pub body: Option<Value>,
}

/// Sends one HTTP request against the configured base URL.
///
/// Transport failures (timeout, refused, DNS) surface as
/// `CheckError::Connection`; an unparseable body does not fail the exchange,
/// the runner decides what absence of a parsed body means. No retries.
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(config: &HarnessConfig) -> CheckResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&RequestBody>,
        encoding: Encoding,
    ) -> CheckResult<Exchange> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        let url = format!("{}{}", self.base_url, path);

        let mut request = self.client.request(method.as_reqwest(), &url);
        match encoding {
            Encoding::Json => {
                request = request.header(ACCEPT, "application/json");
                if let Some(body) = body {
                    request = match body {
                        RequestBody::Json(payload) => request.json(payload),
                        RequestBody::Raw(text) => request.body(text.clone()),
                    };
                }
            }
            Encoding::Xml => {
                request = request
                    .header(ACCEPT, "application/xml")
                    .header(CONTENT_TYPE, "application/xml");
                if let Some(body) = body {
                    let payload = match body {
                        RequestBody::Json(Value::Object(fields)) => xml::encode_flat(fields),
                        // non-mapping bodies are rejected by spec validation
                        RequestBody::Json(other) => other.to_string(),
                        RequestBody::Raw(text) => text.clone(),
                    };
                    request = request.body(payload);
                }
            }
        }

        let connection_error = |source: reqwest::Error| CheckError::Connection {
            method: method.to_string(),
            url: url.clone(),
            source,
        };

        let response = request.send().await.map_err(connection_error)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let text = response.text().await.map_err(connection_error)?;

        let body = if text.trim().is_empty() {
            None
        } else {
            match encoding {
                Encoding::Json => serde_json::from_str(&text).ok(),
                Encoding::Xml => xml::parse_document(&text).ok(),
            }
        };

        Ok(Exchange {
            status,
            headers,
            text,
            body,
        })
    }
}
