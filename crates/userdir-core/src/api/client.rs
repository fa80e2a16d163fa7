//! HTTP client wrapper that attaches the session credential to API calls.
//!
//! Every request built through `AuthorizedClient` passes the session's
//! interception hook: requests to the configured API root (same scheme, host
//! and port, path under the root) get an `Authorization` header while a live
//! credential exists. Requests to any other origin are sent untouched, so the
//! credential never leaks to third-party endpoints.

use std::time::Duration;

use reqwest::{header, Client, Request, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::SessionManager;

use super::ApiError;

/// HTTP request timeout in seconds.
/// A timed-out call fails like any other transport error instead of hanging.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Build the shared HTTP client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
pub fn build_http_client(timeout: Duration) -> Result<Client, ApiError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Check if response is successful, returning an error with body if not.
pub(crate) async fn check_response(response: Response) -> Result<Response, ApiError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body))
    }
}

/// Decorator over `reqwest::Client` owned by a `SessionManager`.
#[derive(Clone)]
pub struct AuthorizedClient {
    client: Client,
    session: SessionManager,
}

impl AuthorizedClient {
    pub(crate) fn new(client: Client, session: SessionManager) -> Self {
        Self { client, session }
    }

    pub fn get(&self, url: &str) -> AuthorizedRequest {
        self.wrap(self.client.get(url))
    }

    pub fn post(&self, url: &str) -> AuthorizedRequest {
        self.wrap(self.client.post(url))
    }

    fn wrap(&self, builder: RequestBuilder) -> AuthorizedRequest {
        AuthorizedRequest {
            client: self.clone(),
            builder,
        }
    }

    /// Apply the session's interception hook to a built request.
    fn intercept(&self, request: &mut Request) {
        let Some(authorization) = self.session.authorization_for_url(request.url()) else {
            return;
        };
        match header::HeaderValue::from_str(&authorization) {
            Ok(mut value) => {
                value.set_sensitive(true);
                debug!(url = %request.url(), "Adding Authorization header to request");
                request.headers_mut().insert(header::AUTHORIZATION, value);
            }
            Err(e) => {
                warn!(url = %request.url(), error = %e, "Auth token is not a valid header value");
            }
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, ApiError> {
        let response = check_response(response).await?;
        response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e))
        })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self.get(url).send().await?;
        Self::decode(response, url).await
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.post(url).json(body).send().await?;
        Self::decode(response, url).await
    }
}

/// A request under construction. It can only leave through `build` or `send`,
/// both of which apply the session's interception hook.
pub struct AuthorizedRequest {
    client: AuthorizedClient,
    builder: RequestBuilder,
}

impl AuthorizedRequest {
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        self.builder = self.builder.json(body);
        self
    }

    pub fn query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Self {
        self.builder = self.builder.query(query);
        self
    }

    pub fn header(mut self, name: header::HeaderName, value: header::HeaderValue) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Build the request with the `Authorization` header applied where due.
    pub fn build(self) -> Result<Request, ApiError> {
        let mut request = self.builder.build()?;
        self.client.intercept(&mut request);
        Ok(request)
    }

    pub async fn send(self) -> Result<Response, ApiError> {
        let client = self.client.client.clone();
        let request = self.build()?;
        Ok(client.execute(request).await?)
    }
}
