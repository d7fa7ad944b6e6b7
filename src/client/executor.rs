// Request executor: auth headers, per-attempt timeout, retries, error normalization

use super::{ApiClient, RequestOptions};
use crate::credentials::CredentialStore;
use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::metrics;
use crate::utils::logging::sanitize;
use crate::utils::retry::RetryPolicy;
use backoff::backoff::Backoff;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn, Instrument};

impl ApiClient {
    /// Execute one logical request.
    ///
    /// Makes up to `retries + 1` attempts. Each attempt gets its own timeout;
    /// a timeout ends the request with `408 TIMEOUT`. Responses in 400..=499
    /// end it immediately. Network errors, other statuses and undecodable
    /// success bodies are retried after `base * 2^attempt`, and the last error is returned once the
    /// budget is spent. Dropping the returned future cancels the whole
    /// request, backoff sleeps included.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| ApiError::invalid_request(format!("Failed to serialize request body: {}", e)))?;

        let span = tracing::debug_span!(
            "api_request",
            request_id = %uuid::Uuid::new_v4(),
            method = %method,
            path = %path,
        );

        self.execute(method, path, body, options).instrument(span).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request::<T, ()>(Method::GET, path, None, RequestOptions::default()).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body), RequestOptions::default()).await
    }

    /// POST without a request body.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request::<T, ()>(Method::POST, path, None, RequestOptions::default()).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, Some(body), RequestOptions::default()).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request::<T, ()>(Method::DELETE, path, None, RequestOptions::default()).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        options: RequestOptions,
    ) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url_for(options.service), path);
        let headers = self.build_headers(&options)?;
        let timeout = options.timeout.unwrap_or(self.default_timeout);
        let policy = match options.retries {
            Some(retries) => self.retry_policy.with_max_retries(retries),
            None => self.retry_policy,
        };

        let started = Instant::now();
        let result = self
            .run_attempts(&method, &url, &headers, body.as_deref(), timeout, policy)
            .await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => metrics::outcome_label(e),
        };
        metrics::record_request(method.as_str(), outcome, started.elapsed().as_secs_f64());

        result
    }

    async fn run_attempts<T: DeserializeOwned>(
        &self,
        method: &Method,
        url: &str,
        headers: &HeaderMap,
        body: Option<&[u8]>,
        timeout: Duration,
        policy: RetryPolicy,
    ) -> ApiResult<T> {
        let mut backoff = policy.backoff();
        let mut attempt: u32 = 0;

        loop {
            debug!("{} {} (attempt {}/{})", method, url, attempt + 1, policy.max_attempts());

            match self.attempt(method, url, headers, body, timeout).await {
                Ok(value) => {
                    metrics::record_attempt(method.as_str(), "success");
                    if attempt > 0 {
                        debug!("{} {} succeeded on attempt {}", method, url, attempt + 1);
                    }
                    return Ok(value);
                }
                Err(err) => {
                    metrics::record_attempt(method.as_str(), metrics::outcome_label(&err));

                    if !err.is_retryable() {
                        debug!("{} {} failed terminally: {}", method, url, err);
                        return Err(err);
                    }
                    if attempt >= policy.max_retries {
                        error!(
                            "{} {} failed after {} attempts: {}",
                            method,
                            url,
                            attempt + 1,
                            err
                        );
                        return Err(err);
                    }

                    let delay = backoff.next_backoff().unwrap_or(policy.base_delay);
                    warn!(
                        "{} {} failed with {} (attempt {}), retrying after {}ms",
                        method,
                        url,
                        err,
                        attempt + 1,
                        delay.as_millis()
                    );
                    metrics::record_retry(method.as_str());
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One physical round trip, bounded by `timeout`.
    ///
    /// The timer covers sending, the response head and reading the body.
    /// When it fires the in-flight future is dropped, which aborts the
    /// connection's request without touching the caller's retry state.
    async fn attempt<T: DeserializeOwned>(
        &self,
        method: &Method,
        url: &str,
        headers: &HeaderMap,
        body: Option<&[u8]>,
        timeout: Duration,
    ) -> ApiResult<T> {
        let mut request = self
            .http_client
            .request(method.clone(), url)
            .headers(headers.clone());
        if let Some(body) = body {
            request = request.body(body.to_vec());
        }

        match tokio::time::timeout(timeout, self.send(request)).await {
            Ok(result) => result,
            Err(_) => {
                debug!("{} {} timed out after {}ms", method, url, timeout.as_millis());
                Err(ApiError::timeout())
            }
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> ApiResult<T> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown Status");
            let err = ErrorBody::parse(&text).into_api_error(status.as_u16(), reason);
            debug!(
                "HTTP {} - Response body: {}",
                status,
                self.loggable(&text)
            );
            return Err(err);
        }

        decode_success(status, &text).map_err(|err| {
            warn!("{} - Response body: {}", err, self.loggable(&text));
            err
        })
    }

    fn build_headers(&self, options: &RequestOptions) -> ApiResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for (name, value) in options.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }

        if !options.skip_auth {
            if let Some(token) = self.credentials.read() {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|_| ApiError::invalid_request("Stored token is not a valid header value"))?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
        }

        Ok(headers)
    }

    fn loggable(&self, text: &str) -> String {
        let snippet: String = text.chars().take(500).collect();
        if self.sanitize_logs {
            sanitize(&snippet)
        } else {
            snippet
        }
    }
}

/// Any failure reported by reqwest, timeouts included. The attempt timer in
/// `attempt` is the only source of `408 TIMEOUT`.
fn transport_error(e: reqwest::Error) -> ApiError {
    ApiError::network(format!("Network error: {}", e))
}

/// Decode a 2xx body. An empty body decodes as JSON `null`.
fn decode_success<T: DeserializeOwned>(status: StatusCode, text: &str) -> ApiResult<T> {
    let raw = if text.trim().is_empty() { "null" } else { text };
    serde_json::from_str(raw).map_err(|e| {
        ApiError::invalid_response(
            status.as_u16(),
            format!("Failed to decode response body: {}", e),
        )
    })
}
