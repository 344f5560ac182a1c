use crate::chat::Message;
use crate::constants::{defaults, endpoints};
use crate::error::ChatError;
use crate::llm::traits::{prompt_from, CompletionClient};
use crate::llm::{CompletionOptions, RetryPolicy};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Url;
use std::time::Duration;

/// Client for the Pollinations plain-text endpoint:
/// `GET {base_url}/{prompt}?model=&temperature=&max_tokens=`.
pub struct PollinationsClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl PollinationsClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: endpoints::POLLINATIONS_TEXT_URL.to_string(),
            timeout: Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Percent-encode the prompt into the path and append the options as
    /// query parameters.
    pub fn build_request_url(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<Url, ChatError> {
        let raw = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(prompt)
        );
        let mut url = Url::parse(&raw)
            .map_err(|e| ChatError::Config(format!("Invalid base URL {}: {e}", self.base_url)))?;
        url.query_pairs_mut().extend_pairs(options.query_pairs());
        Ok(url)
    }

    /// One GET against the endpoint. Every failure comes back as
    /// [`ChatError::Transient`].
    async fn attempt(&self, url: Url, timeout: Duration) -> Result<String, ChatError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/plain")
            .header(USER_AGENT, endpoints::USER_AGENT)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("");
            let message = format!("API request failed: {} {}", status.as_u16(), reason);
            return Err(ChatError::transient(message.trim_end(), Some(status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, timeout))?;
        let text = body.trim();
        if text.is_empty() {
            return Err(ChatError::transient("API returned an empty response", None));
        }

        Ok(text.to_string())
    }

    /// Probe the endpoint with a short prompt. Never errors; any failure is `false`.
    pub async fn test_connection(&self) -> bool {
        let options = CompletionOptions::default().with_max_tokens(None);
        let url = match self.build_request_url(defaults::CONNECTION_TEST_PROMPT, &options) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, "connection test skipped");
                return false;
            }
        };

        let timeout = Duration::from_secs(defaults::CONNECTION_TEST_TIMEOUT_SECS);
        let connected = self.attempt(url, timeout).await;
        match &connected {
            Ok(_) => tracing::info!(base_url = %self.base_url, "connection test succeeded"),
            Err(e) => tracing::warn!(base_url = %self.base_url, error = %e, "connection test failed"),
        }
        connected.is_ok()
    }
}

impl Default for PollinationsClient {
    fn default() -> Self {
        Self::new()
    }
}

fn transport_error(error: reqwest::Error, timeout: Duration) -> ChatError {
    if error.is_timeout() {
        ChatError::transient(
            format!("Request timed out after {} ms", timeout.as_millis()),
            None,
        )
    } else {
        ChatError::transient(
            format!("Network error: {error}"),
            error.status().map(|s| s.as_u16()),
        )
    }
}

#[async_trait::async_trait]
impl CompletionClient for PollinationsClient {
    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String, ChatError> {
        options.validate()?;
        let prompt = prompt_from(messages)?;
        let url = self.build_request_url(prompt, options)?;

        let mut attempt = 1;
        let last_error = loop {
            tracing::debug!(attempt, max_attempts = self.retry.max_attempts, "sending completion request");
            let error = match self.attempt(url.clone(), self.timeout).await {
                Ok(text) => {
                    tracing::debug!(attempt, chars = text.len(), "completion received");
                    return Ok(text);
                }
                Err(e) if e.is_transient() => e,
                Err(e) => return Err(e),
            };
            tracing::warn!(attempt, error = %error, "completion attempt failed");

            if !self.retry.has_attempt_after(attempt) {
                break error;
            }
            attempt += 1;
            let delay = self.retry.delay_before(attempt);
            tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "waiting before retry");
            tokio::time::sleep(delay).await;
        };

        let message = last_error.to_string();
        let status = last_error.status();
        Err(ChatError::RetryExhausted {
            attempts: attempt,
            message,
            status,
        })
    }
}
