// Inventra API HTTP client
//
// Wraps `reqwest::Client` with envelope unwrapping, bearer-token injection,
// status classification, and a bounded serial retry loop. Endpoint modules
// (auth, products, assets, analytics) are implemented as inherent methods
// via separate files to keep this module focused on transport mechanics.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::Envelope;
use crate::token::TokenCell;
use crate::transport::TransportConfig;

/// What a single attempt produced: a settled result, or a transient
/// failure the retry loop may try again.
enum Attempt<T> {
    Settled(Result<Option<T>, Error>),
    Transient(Error),
}

/// Raw HTTP client for the Inventra API.
///
/// Handles the `{ success, data, message, error }` envelope, per-request
/// timeout, and the retry/backoff policy for 429s and network failures.
/// All methods return unwrapped `data` payloads -- the envelope is stripped
/// before the caller sees it.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    /// Bearer token shared with the session manager. Re-read on every
    /// attempt, so a mid-sequence 401-triggered clear is observed by
    /// subsequent attempts only, not the one already in flight.
    token: TokenCell,
    retries: u32,
    base_delay: Duration,
    timeout: Duration,
}

impl ApiClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// The `base_url` is the server root (e.g. `https://inventory.example.com`);
    /// all endpoint paths are appended under `/api/`.
    pub fn new(base_url: Url, transport: &TransportConfig, token: TokenCell) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            token,
            retries: transport.retries,
            base_delay: transport.base_delay,
            timeout: transport.timeout,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// Use this when the caller already configured a client (tests do, to
    /// skip TLS setup). Retry tuning starts from the defaults; adjust with
    /// [`with_retry`](Self::with_retry).
    pub fn with_client(http: reqwest::Client, base_url: Url, token: TokenCell) -> Self {
        let defaults = TransportConfig::default();
        Self {
            http,
            base_url,
            token,
            retries: defaults.retries,
            base_delay: defaults.base_delay,
            timeout: defaults.timeout,
        }
    }

    /// Override the retry budget and backoff base delay.
    pub fn with_retry(mut self, retries: u32, base_delay: Duration) -> Self {
        self.retries = retries;
        self.base_delay = base_delay;
        self
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The shared token cell.
    pub fn token(&self) -> &TokenCell {
        &self.token
    }

    // ── Probing ──────────────────────────────────────────────────────

    /// Single-attempt health probe: `GET /api/health`, retries disabled.
    ///
    /// The connectivity monitor calls this on an interval; letting it run
    /// the backoff schedule would turn one probe tick into a retry cascade.
    pub async fn probe(&self) -> Result<(), Error> {
        let url = self.api_url("health")?;
        self.dispatch::<Value>(Method::GET, url, None, 0)
            .await
            .map(|_| ())
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and unwrap the envelope.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request(Method::GET, path, None).await
    }

    /// Send a POST request with JSON body and unwrap the envelope.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl serde::Serialize + Sync),
    ) -> Result<T, Error> {
        self.request(Method::POST, path, Some(to_value(body)?)).await
    }

    /// Send a PUT request with JSON body and unwrap the envelope.
    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl serde::Serialize + Sync),
    ) -> Result<T, Error> {
        self.request(Method::PUT, path, Some(to_value(body)?)).await
    }

    /// Send a PATCH request with JSON body and unwrap the envelope.
    #[allow(dead_code)]
    pub(crate) async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl serde::Serialize + Sync),
    ) -> Result<T, Error> {
        self.request(Method::PATCH, path, Some(to_value(body)?))
            .await
    }

    /// Send a DELETE request; the envelope may carry no `data`.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), Error> {
        self.request_unit(Method::DELETE, path, None).await
    }

    /// Send a request whose successful envelope must carry `data`.
    pub(crate) async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, Error> {
        let url = self.api_url(path)?;
        match self.dispatch(method, url, body, self.retries).await? {
            Some(data) => Ok(data),
            None => Err(Error::Deserialization {
                message: "response envelope carried no data".into(),
                body: String::new(),
            }),
        }
    }

    /// Send a request where a successful envelope without `data` is fine
    /// (logout, delete).
    pub(crate) async fn request_unit(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<(), Error> {
        let url = self.api_url(path)?;
        self.dispatch::<Value>(method, url, body, self.retries)
            .await
            .map(|_| ())
    }

    // ── Core dispatch loop ───────────────────────────────────────────

    /// Issue the request, retrying transient failures (429, network,
    /// timeout) up to `retries` times with exponential backoff
    /// `delay = base_delay * 2^(attempt - 1)`. Attempts are strictly
    /// serial; each one rebuilds the request with the current token.
    async fn dispatch<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
        retries: u32,
    ) -> Result<Option<T>, Error> {
        debug!("{} {}", method, url);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let mut builder = self.http.request(method.clone(), url.clone());
            if let Some(ref b) = body {
                builder = builder.json(b);
            }
            if let Some(bearer) = self.token.bearer() {
                builder = builder.bearer_auth(bearer);
            }

            let outcome = match builder.send().await {
                Ok(resp) => self.classify(resp, attempt).await,
                Err(e) => Attempt::Transient(Error::from_send(&e, self.timeout.as_secs())),
            };

            match outcome {
                Attempt::Settled(result) => return result,
                Attempt::Transient(err) => {
                    if attempt > retries {
                        return Err(err);
                    }
                    let delay = self.base_delay * 2u32.saturating_pow(attempt - 1);
                    debug!(attempt, ?delay, error = %err, "transient failure, backing off");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Classify a response by status, then unwrap the envelope.
    async fn classify<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
        attempt: u32,
    ) -> Attempt<T> {
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED {
            // The token is no longer accepted; drop it so later calls go
            // out unauthenticated instead of repeating a dead credential.
            self.token.clear();
            return Attempt::Settled(Err(Error::Unauthorized));
        }

        if status == StatusCode::FORBIDDEN {
            return Attempt::Settled(Err(Error::Forbidden));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            trace!(attempt, "rate limited");
            return Attempt::Transient(Error::RateLimited { attempts: attempt });
        }

        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => return Attempt::Transient(Error::Network(e.to_string())),
        };

        if !status.is_success() {
            let message = serde_json::from_str::<Envelope<Value>>(&body)
                .map(|env| env.failure_message())
                .unwrap_or_else(|_| body.chars().take(200).collect());
            return Attempt::Settled(Err(Error::Http {
                status: status.as_u16(),
                message,
            }));
        }

        match serde_json::from_str::<Envelope<T>>(&body) {
            Ok(env) if env.success => Attempt::Settled(Ok(env.data)),
            // 2xx with `success: false` -- the server refused at the
            // application level.
            Ok(env) => Attempt::Settled(Err(Error::Http {
                status: status.as_u16(),
                message: env.failure_message(),
            })),
            Err(e) => {
                let preview: String = body.chars().take(200).collect();
                Attempt::Settled(Err(Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }))
            }
        }
    }

    /// Build a full URL for an API path: `{base}/api/{path}`.
    fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let full = format!("{base}/api/{path}");
        Url::parse(&full).map_err(Error::InvalidUrl)
    }
}

fn to_value(body: &impl serde::Serialize) -> Result<Value, Error> {
    serde_json::to_value(body).map_err(|e| Error::Deserialization {
        message: format!("failed to serialize request body: {e}"),
        body: String::new(),
    })
}
