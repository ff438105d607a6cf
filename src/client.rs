use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::client_logger::ExchangeLogger;
use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_RATE_LIMITED, CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS,
};
use crate::types::{ChatRequest, ChatResponse, HealthCheck, QuotaResponse};

/// Base URL used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

const SESSION_HEADER: &str = "x-session-id";
const REQUESTED_WITH_HEADER: &str = "x-requested-with";
const REQUESTED_WITH_VALUE: &str = "XMLHttpRequest";

/// Anything that can carry one chat turn to the assistant backend.
///
/// A failed send is terminal for the turn; implementations must not retry.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send `request` and return the parsed reply.
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

#[async_trait]
impl<T: ChatTransport + ?Sized> ChatTransport for Arc<T> {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse> {
        (**self).send(request).await
    }
}

/// HTTP client for the portfolio assistant API.
#[derive(Clone)]
pub struct ChatClient {
    client: ReqwestClient,
    base_url: String,
    timeout: Option<Duration>,
    logger: Option<Arc<dyn ExchangeLogger>>,
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

impl ChatClient {
    /// Create a client for the API rooted at `base_url`.
    ///
    /// No request timeout is applied; the transport default governs.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_options(base_url, None)
    }

    /// Create a client with an explicit request timeout.
    pub fn with_options(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let parsed = Url::parse(base_url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::validation(
                format!("unsupported URL scheme {:?}", parsed.scheme()),
                Some("api_url".to_string()),
            ));
        }

        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {}", e),
                Some(Box::new(e)),
            )
        })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            logger: None,
        })
    }

    /// Attach a logger that observes every chat exchange.
    pub fn with_logger(mut self, logger: Arc<dyn ExchangeLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The API root, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The configured request timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self, session_id: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            REQUESTED_WITH_HEADER,
            HeaderValue::from_static(REQUESTED_WITH_VALUE),
        );
        if let Some(session_id) = session_id {
            let value = HeaderValue::from_str(session_id).map_err(|_| {
                Error::validation(
                    "session identifier is not a valid header value",
                    Some("session_id".to_string()),
                )
            })?;
            headers.insert(SESSION_HEADER, value);
        }
        Ok(headers)
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                self.timeout.map(|t| t.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|val| val.to_str().ok())
            .map(String::from);

        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.trim().parse::<u64>().ok());

        // The backend answers `{"error": ..., "detail": ...}`; FastAPI's own
        // validation errors carry only `detail`.
        #[derive(Deserialize)]
        struct ErrorBody {
            error: Option<String>,
            detail: Option<serde_json::Value>,
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        let parsed = serde_json::from_str::<ErrorBody>(&body).ok();
        let message = parsed
            .and_then(|b| {
                b.error.or(match b.detail {
                    Some(serde_json::Value::String(s)) => Some(s),
                    _ => None,
                })
            })
            .unwrap_or(body);

        match status_code {
            429 => Error::rate_limit(message, retry_after),
            _ => Error::api(status_code, message, request_id),
        }
    }

    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }
        response.json::<T>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    /// Send one chat turn to `POST {base}/chat`.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        CLIENT_REQUESTS.click();
        if let Some(logger) = &self.logger {
            logger.log_request(request);
        }
        let start = Instant::now();
        let result = self.chat_inner(request).await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        match &result {
            Ok(response) => {
                if let Some(logger) = &self.logger {
                    logger.log_response(response);
                }
            }
            Err(err) => {
                CLIENT_REQUEST_ERRORS.click();
                if err.is_rate_limit() {
                    CLIENT_RATE_LIMITED.click();
                }
                if let Some(logger) = &self.logger {
                    logger.log_failure(err);
                }
            }
        }
        result
    }

    async fn chat_inner(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let response = self
            .client
            .post(self.endpoint("chat"))
            .headers(self.default_headers(Some(&request.session_id))?)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.read_json(response).await
    }

    /// Fetch the caller's remaining quota from `GET {base}/chat/quota`.
    pub async fn quota(&self) -> Result<QuotaResponse> {
        let response = self
            .client
            .get(self.endpoint("chat/quota"))
            .headers(self.default_headers(None)?)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.read_json(response).await
    }

    /// Fetch backend health from `GET {base}/health`.
    pub async fn health(&self) -> Result<HealthCheck> {
        let response = self
            .client
            .get(self.endpoint("health"))
            .headers(self.default_headers(None)?)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.read_json(response).await
    }
}

#[async_trait]
impl ChatTransport for ChatClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.chat(request).await
    }
}
