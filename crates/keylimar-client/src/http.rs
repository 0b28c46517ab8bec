//! # API Client
//!
//! The single fetch wrapper every backend call goes through.
//!
//! ## Response Contract
//! ```text
//! 401 / 403  →  session invalidated (tokens cleared, event emitted),
//!               SessionExpired error regardless of body content
//! other non-2xx → Api { status, body } with the body text verbatim
//! 2xx        →  JSON-decoded into the expected type
//! ```
//!
//! ## Retry Policy
//! Transport failures on idempotent GETs retry with exponential backoff up
//! to the configured cap. Mutations never retry automatically; the user
//! decides whether to resubmit.

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::{CatalogApi, ClientsApi, CurrencyApi, PaymentsApi, SalesApi, UsersApi};
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::session::SessionManager;

/// Authenticated JSON client for the Keylimar backend.
pub struct ApiClient {
    config: ClientConfig,
    http: reqwest::Client,
    session: Arc<SessionManager>,
}

impl ApiClient {
    pub fn new(config: ClientConfig, session: Arc<SessionManager>) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(ApiClient {
            config,
            http,
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    // =========================================================================
    // Endpoint Groups
    // =========================================================================

    pub fn clients(&self) -> ClientsApi<'_> {
        ClientsApi::new(self)
    }

    pub fn catalog(&self) -> CatalogApi<'_> {
        CatalogApi::new(self)
    }

    pub fn sales(&self) -> SalesApi<'_> {
        SalesApi::new(self)
    }

    pub fn payments(&self) -> PaymentsApi<'_> {
        PaymentsApi::new(self)
    }

    pub fn currency(&self) -> CurrencyApi<'_> {
        CurrencyApi::new(self)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    // =========================================================================
    // Verbs
    // =========================================================================

    /// GET with automatic retry on transport errors.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let mut attempt: u32 = 0;
        let mut backoff = self.config.initial_backoff;

        loop {
            let rb = self.authed(Method::GET, path).await?;
            match self.dispatch(rb).await {
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(path, attempt, error = %e, "transport error, retrying GET");
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(self.config.max_backoff);
                }
                other => return other,
            }
        }
    }

    /// GET where 404 means "not found" rather than an error.
    pub async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> ApiResult<Option<T>> {
        match self.get::<T>(path).await {
            Ok(value) => Ok(Some(value)),
            Err(ApiError::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let rb = self.authed(Method::POST, path).await?.json(body);
        self.dispatch(rb).await
    }

    /// POST with no request body (action endpoints like deliver/reject).
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let rb = self.authed(Method::POST, path).await?;
        self.dispatch(rb).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let rb = self.authed(Method::PUT, path).await?.json(body);
        self.dispatch(rb).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        let rb = self.authed(Method::DELETE, path).await?;
        let response = rb.send().await?;
        self.check_status(response).await?;
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Builds an authenticated request, refreshing the token first when
    /// its `exp` has passed.
    async fn authed(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
        let token = self.session.get_valid_access_token().await?;
        let url = self.config.endpoint(path)?;
        debug!(%method, %url, "request");
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    async fn dispatch<T: DeserializeOwned>(&self, rb: RequestBuilder) -> ApiResult<T> {
        let response = rb.send().await?;
        let response = self.check_status(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Applies the response contract; returns the response only for 2xx.
    async fn check_status(&self, response: Response) -> ApiResult<Response> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let reason = format!("backend returned {}", status.as_u16());
            self.session.invalidate(&reason).await;
            return Err(ApiError::SessionExpired(reason));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}
