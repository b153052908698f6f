use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;
use zeroize::Zeroizing;

use crate::retry::{decide_retry, RetryConfig, RetryDecision, RetryReason};
use crate::secrets::{redact_headers, SecretValue};
use crate::transport::{
    FormField, HttpClient, HttpRequestParts, HttpResponseParts, RequestBody, TransportError,
};

/// Workflow listing, relative to the server base URL.
pub const WORKFLOW_LIST_PATH: &str = "pseven/.rest/v1/workflows/";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub request_timeout: Duration,
    pub max_response_bytes: usize,
    pub retry: RetryConfig,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            request_timeout: Duration::from_secs(30),
            max_response_bytes: 64 * 1024 * 1024,
            retry: RetryConfig::default(),
        }
    }
}

/// Authenticated access to the REST API.
///
/// Reads, run creation, the partial update and the start action go through the
/// retry policy; multipart uploads are sent once.
pub struct ApiClient {
    http: Arc<dyn HttpClient>,
    config: ClientConfig,
    /// Complete `Authorization` header value.
    authorization: Zeroizing<String>,
    cancel: CancellationToken,
}

impl ApiClient {
    /// Fails when the token is not UTF-8 text or is blank.
    pub fn new(
        http: Arc<dyn HttpClient>,
        config: ClientConfig,
        token: SecretValue,
    ) -> Result<Self, TransportError> {
        let token = token
            .expose_str()
            .filter(|t| !t.is_empty())
            .ok_or(TransportError::InvalidToken)?;
        Ok(Self {
            http,
            config,
            authorization: Zeroizing::new(format!("Token {token}")),
            cancel: CancellationToken::new(),
        })
    }

    /// Abort in-flight requests and retry backoff once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve a possibly relative `href` returned by the server.
    pub fn resolve(&self, href: &str) -> Result<Url, TransportError> {
        self.config
            .base_url
            .join(href)
            .map_err(|source| TransportError::InvalidUrl {
                href: href.to_string(),
                source,
            })
    }

    pub fn workflows_url(&self) -> Result<Url, TransportError> {
        self.resolve(WORKFLOW_LIST_PATH)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, TransportError> {
        let resp = self.send_with_retry(self.request("GET", url, RequestBody::Empty)).await?;
        decode(url, &resp)
    }

    /// POST with an optional JSON body; the response body is returned as JSON
    /// (`null` when empty).
    pub async fn post_json<B: Serialize>(
        &self,
        url: &Url,
        body: Option<&B>,
    ) -> Result<serde_json::Value, TransportError> {
        let body = match body {
            Some(b) => RequestBody::Json(serde_json::to_vec(b).map_err(TransportError::Encode)?),
            None => RequestBody::Empty,
        };
        let resp = self.send_with_retry(self.request("POST", url, body)).await?;
        if resp.body.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        decode(url, &resp)
    }

    pub async fn patch_json<B: Serialize>(&self, url: &Url, body: &B) -> Result<(), TransportError> {
        let body = RequestBody::Json(serde_json::to_vec(body).map_err(TransportError::Encode)?);
        self.send_with_retry(self.request("PATCH", url, body)).await?;
        Ok(())
    }

    /// Raw GET through the retry policy (file downloads).
    pub async fn get_bytes(&self, url: &Url) -> Result<HttpResponseParts, TransportError> {
        self.send_with_retry(self.request("GET", url, RequestBody::Empty)).await
    }

    /// Single multipart POST. Any HTTP status is returned as a response;
    /// only a missing response is an error.
    pub async fn send_form(
        &self,
        url: &Url,
        fields: Vec<FormField>,
    ) -> Result<HttpResponseParts, TransportError> {
        let mut req = self.request("POST", url, RequestBody::Form(fields));
        // the multipart encoder sets its own content type
        req.headers.remove("Content-Type");
        let sent = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(TransportError::Cancelled),
            sent = self.http.send(req, self.config.request_timeout, self.config.max_response_bytes) => sent,
        };
        sent.map_err(|source| TransportError::Network {
            method: "POST".to_string(),
            url: url.to_string(),
            source,
        })
    }

    fn request(&self, method: &str, url: &Url, body: RequestBody) -> HttpRequestParts {
        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_string(), self.authorization.to_string());
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        HttpRequestParts {
            method: method.to_string(),
            url: url.clone(),
            headers,
            body,
        }
    }

    async fn send_with_retry(
        &self,
        req: HttpRequestParts,
    ) -> Result<HttpResponseParts, TransportError> {
        let started = Instant::now();
        let mut attempt_no = 0usize;

        loop {
            attempt_no += 1;
            debug!(
                method = %req.method,
                url = %req.url,
                attempt = attempt_no,
                headers = ?redact_headers(&req.headers),
                "sending request"
            );

            let sent = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(TransportError::Cancelled),
                sent = self.http.send(
                    req.clone(),
                    self.config.request_timeout,
                    self.config.max_response_bytes,
                ) => sent,
            };

            let (status, headers, failure) = match sent {
                Ok(resp) if resp.is_success() => return Ok(resp),
                Ok(resp) => {
                    let failure = TransportError::Status {
                        method: req.method.clone(),
                        url: req.url.to_string(),
                        status: resp.status,
                        body: String::from_utf8_lossy(&resp.body).chars().take(512).collect(),
                    };
                    (Some(resp.status), Some(resp.headers), failure)
                }
                Err(source) => {
                    let failure = TransportError::Network {
                        method: req.method.clone(),
                        url: req.url.to_string(),
                        source,
                    };
                    (None, None, failure)
                }
            };

            let decision = decide_retry(
                &self.config.retry,
                attempt_no,
                started.elapsed(),
                status,
                headers.as_ref(),
                status.is_none(),
                SystemTime::now(),
                || fastrand::u64(..),
            );

            match decision {
                RetryDecision::RetryAfter { delay, reason } => {
                    warn!(
                        method = %req.method,
                        url = %req.url,
                        attempt = attempt_no,
                        ?reason,
                        delay_ms = delay.as_millis() as u64,
                        error = %failure,
                        "request failed, backing off"
                    );
                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => return Err(TransportError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                RetryDecision::Stop {
                    reason: RetryReason::BudgetExhausted | RetryReason::AttemptsExhausted,
                } if attempt_no > 1 => {
                    return Err(TransportError::GaveUp {
                        attempts: attempt_no,
                        elapsed: started.elapsed(),
                        last: Box::new(failure),
                    });
                }
                RetryDecision::Stop { .. } => return Err(failure),
            }
        }
    }
}

/// `<base>/<path>` with `base` treated as a directory even without a trailing slash.
pub fn child_url(base: &Url, path: &str) -> Result<Url, TransportError> {
    let mut dir = base.clone();
    if !dir.path().ends_with('/') {
        let p = format!("{}/", dir.path());
        dir.set_path(&p);
    }
    dir.join(path).map_err(|source| TransportError::InvalidUrl {
        href: path.to_string(),
        source,
    })
}

fn decode<T: DeserializeOwned>(url: &Url, resp: &HttpResponseParts) -> Result<T, TransportError> {
    serde_json::from_slice(&resp.body).map_err(|source| TransportError::Decode {
        url: url.to_string(),
        source,
    })
}
