//! Qroom HTTP client
//!
//! [`QroomClient`] attaches the stored access token to every call and recovers
//! from expiry on its own: a 401 parks the call, a single refresh runs, and the
//! parked calls are replayed with the new token.

pub mod auth;
pub mod config;
pub mod error;
pub mod group;
pub mod pdf;
pub mod qa;
pub mod quiz;
pub mod refresh;
pub mod request;

pub use config::ClientSettings;
pub use error::ClientError;
pub use request::{ApiRequest, MultipartField, RequestBody};

use crate::types::{ApiEnvelope, RefreshTokenRequest};
use futures::future::join_all;
use qroom_core::{KeyValueStorage, MemoryStorage, SessionStore};
use refresh::{PendingRequest, RefreshCoordinator, RefreshRole};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub type ClientResult<T> = Result<T, ClientError>;

/// Why a refresh attempt could not produce a new access token
#[derive(Debug, Clone)]
struct RefreshFailure {
    status: Option<u16>,
    body: Option<Value>,
    reason: String,
}

impl RefreshFailure {
    fn new(status: Option<u16>, body: Option<Value>, reason: impl Into<String>) -> Self {
        Self {
            status,
            body,
            reason: reason.into(),
        }
    }
}

struct ClientInner {
    http: Client,
    base_url: String,
    refresh_path: String,
    session: SessionStore,
    refresh: RefreshCoordinator,
}

/// Qroom API client
///
/// Clones share the connection pool, the session store and the refresh state.
#[derive(Clone)]
pub struct QroomClient {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for QroomClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QroomClient")
            .field("base_url", &self.inner.base_url)
            .field("refresh_path", &self.inner.refresh_path)
            .finish_non_exhaustive()
    }
}

impl QroomClient {
    /// Create a new client with default configuration and in-memory session
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> QroomClientBuilder {
        QroomClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Session store shared by every clone of this client
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Whether a token refresh is currently in flight
    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_refreshing()
    }

    /// Execute a request and deserialize its JSON body
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> ClientResult<T> {
        let value = self.execute_value(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Execute a request answered with an [`ApiEnvelope`] and unwrap its data
    pub async fn execute_data<T: DeserializeOwned>(&self, request: ApiRequest) -> ClientResult<T> {
        let value = self.execute_value(request).await?;
        ApiEnvelope::<T>::data_from_value(value)
    }

    /// Execute a request whose envelope carries no data worth keeping
    pub async fn execute_ack(&self, request: ApiRequest) -> ClientResult<()> {
        let value = self.execute_value(request).await?;
        if value.is_null() {
            return Ok(());
        }
        ApiEnvelope::<Option<Value>>::data_from_value(value).map(|_| ())
    }

    /// Execute a request and return the raw JSON body (`null` when absent)
    pub async fn execute_value(&self, request: ApiRequest) -> ClientResult<Value> {
        let token = if request.skip_auth {
            None
        } else {
            self.inner.session.access_token()
        };

        let response = self.dispatch(&request, token.as_deref()).await?;
        if response.status() == StatusCode::UNAUTHORIZED && !request.skip_auth {
            return self.recover_unauthorized(request, token).await;
        }

        read_response(response, request.skip_json_parse).await
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
    ) -> ClientResult<Response> {
        let url = format!("{}{}", self.inner.base_url, request.normalized_path());

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.extend(request.headers.clone());

        if !request.skip_content_type && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        if !request.skip_auth {
            if let Some(token) = access_token {
                let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                    ClientError::Configuration(format!("stored access token is not a valid header: {e}"))
                })?;
                headers.insert(AUTHORIZATION, value);
            }
        }

        debug!(method = %request.method, %url, "Sending request");

        let builder = self
            .inner
            .http
            .request(request.method.clone(), url)
            .headers(headers);
        let builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.body(serde_json::to_vec(value)?),
            RequestBody::Multipart(fields) => builder.multipart(ApiRequest::build_form(fields)?),
        };

        Ok(builder.send().await?)
    }

    /// Park a request that got 401 until the shared refresh settles
    async fn recover_unauthorized(
        &self,
        request: ApiRequest,
        sent_with: Option<String>,
    ) -> ClientResult<Value> {
        let path = request.path.clone();
        let (pending, rx) = PendingRequest::new(request);
        let session = &self.inner.session;
        match self
            .inner
            .refresh
            .enqueue(pending, sent_with.as_deref(), || session.access_token())
        {
            RefreshRole::Replay {
                access_token,
                request,
            } => {
                debug!(%path, "Access token changed in flight, replaying");
                return self.replay(&request, &access_token).await;
            }
            RefreshRole::Leader => {
                info!(%path, "Access token rejected, starting refresh");
                let client = self.clone();
                tokio::spawn(async move { client.run_refresh().await });
            }
            RefreshRole::Follower => {
                debug!(%path, "Refresh already in flight, queued");
            }
        }

        rx.await
            .unwrap_or_else(|_| Err(ClientError::refresh_failed(None, None)))
    }

    /// Refresh once, then release every queued request with the outcome
    async fn run_refresh(self) {
        match self.refresh_access_token().await {
            Ok(token) => {
                self.inner.session.update_access_token(&token);
                let pending = self.inner.refresh.settle();
                info!(
                    queued = pending.len(),
                    "Access token refreshed, replaying queued requests"
                );

                let client = &self;
                let token = token.as_str();
                join_all(pending.into_iter().map(|pending| async move {
                    let result = client.replay(&pending.request, token).await;
                    pending.complete(result);
                }))
                .await;
            }
            Err(failure) => {
                warn!(status = ?failure.status, "Token refresh failed: {}", failure.reason);
                self.inner.session.clear();
                let pending = self.inner.refresh.settle();
                for pending in pending {
                    pending.complete(Err(ClientError::refresh_failed(
                        failure.status,
                        failure.body.clone(),
                    )));
                }
            }
        }
    }

    async fn refresh_access_token(&self) -> Result<String, RefreshFailure> {
        let Some(refresh_token) = self.inner.session.refresh_token() else {
            return Err(RefreshFailure::new(None, None, "no refresh token stored"));
        };

        let url = format!("{}{}", self.inner.base_url, self.inner.refresh_path);
        let response = self
            .inner
            .http
            .post(url)
            .header(ACCEPT, "application/json")
            .json(&RefreshTokenRequest { refresh_token })
            .send()
            .await
            .map_err(|e| RefreshFailure::new(None, None, e.to_string()))?;

        let status = response.status();
        let body = match response.bytes().await {
            Ok(bytes) => parse_body(&bytes),
            Err(e) => {
                warn!("Failed to read refresh response body: {e}");
                None
            }
        };

        if !status.is_success() {
            return Err(RefreshFailure::new(
                Some(status.as_u16()),
                body,
                format!("refresh endpoint answered {status}"),
            ));
        }

        body.as_ref()
            .and_then(|body| body.get("accessToken"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                RefreshFailure::new(
                    Some(StatusCode::UNAUTHORIZED.as_u16()),
                    None,
                    "refresh response carried no access token",
                )
            })
    }

    /// Send a parked request once more; a second 401 is final
    async fn replay(&self, request: &ApiRequest, access_token: &str) -> ClientResult<Value> {
        let response = self.dispatch(request, Some(access_token)).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(path = %request.path, "Request rejected again after refresh");
            let body = response
                .bytes()
                .await
                .ok()
                .and_then(|bytes| parse_body(&bytes));
            return Err(ClientError::AuthenticationFailed {
                status: Some(StatusCode::UNAUTHORIZED.as_u16()),
                message: error::REFRESH_FAILURE_MESSAGE.to_string(),
                body,
            });
        }

        read_response(response, request.skip_json_parse).await
    }
}

fn parse_body(bytes: &[u8]) -> Option<Value> {
    serde_json::from_slice(bytes).ok()
}

async fn read_response(response: Response, skip_json_parse: bool) -> ClientResult<Value> {
    let status = response.status();
    let bytes = response.bytes().await?;
    let body = if skip_json_parse {
        None
    } else {
        parse_body(&bytes)
    };

    if status.is_success() {
        Ok(body.unwrap_or(Value::Null))
    } else {
        Err(ClientError::from_status(status, body))
    }
}

/// Builder for QroomClient
#[derive(Default)]
pub struct QroomClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    refresh_path: Option<String>,
    storage: Option<Arc<dyn KeyValueStorage>>,
}

impl QroomClientBuilder {
    /// Apply every field of a settings value
    pub fn settings(mut self, settings: &ClientSettings) -> Self {
        if !settings.base_url.is_empty() {
            self.base_url = Some(settings.base_url.clone());
        }
        self.timeout = settings.timeout();
        self.user_agent = Some(settings.user_agent.clone());
        self.refresh_path = Some(settings.refresh_path.clone());
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set the token refresh endpoint
    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = Some(path.into());
        self
    }

    /// Set the storage the session is persisted in
    pub fn storage(mut self, storage: Arc<dyn KeyValueStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Build the client
    pub fn build(self) -> ClientResult<QroomClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        let parsed = url::Url::parse(&base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base_url {base_url:?}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::Configuration(format!(
                "base_url must be http or https, got {}",
                parsed.scheme()
            )));
        }

        let refresh_path = self
            .refresh_path
            .unwrap_or_else(|| config::DEFAULT_REFRESH_PATH.to_string());
        let refresh_path = if refresh_path.starts_with('/') {
            refresh_path
        } else {
            format!("/{refresh_path}")
        };

        let mut client_builder = ClientBuilder::new().user_agent(
            self.user_agent
                .unwrap_or_else(|| config::DEFAULT_USER_AGENT.to_string()),
        );
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        let http = client_builder.build()?;

        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStorage::new()));

        Ok(QroomClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                refresh_path,
                session: SessionStore::new(storage),
                refresh: RefreshCoordinator::new(),
            }),
        })
    }
}
