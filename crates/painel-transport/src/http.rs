//! HTTP implementation of the API traits using `reqwest`.

use std::time::Duration;

use painel_protocol::{
    Codec, CurrentUserResponse, ErrorBody, JsonCodec, LoginRequest,
    LoginResponse, LogoutRequest,
};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;

use crate::{ApiError, IdentityApi, ResourceApi, join_url};

/// Dashboard API client over HTTP(S).
///
/// Cheap to clone — `reqwest::Client` is reference-counted internally.
/// Every request is bounded by the timeout given at construction; a
/// request that exceeds it fails with [`ApiError::Timeout`].
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    codec: JsonCodec,
}

impl HttpApi {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// # Errors
    /// Returns [`ApiError::Network`] if the TLS backend fails to
    /// initialize.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            codec: JsonCodec,
        })
    }

    /// The base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn json_body<T: Serialize>(
        &self,
        builder: RequestBuilder,
        body: &T,
    ) -> Result<RequestBuilder, ApiError> {
        let bytes = self.codec.encode(body)?;
        Ok(builder.header(CONTENT_TYPE, "application/json").body(bytes))
    }

    /// Sends the request and returns the body of a 2xx response.
    ///
    /// Non-2xx responses become [`ApiError::Status`] with whatever message
    /// the error body carried.
    async fn send(&self, builder: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = builder
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest)?;

        if status.is_success() {
            return Ok(body.to_vec());
        }

        let message = self
            .codec
            .decode::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message);
        tracing::debug!(status = status.as_u16(), ?message, "api returned error status");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

impl IdentityApi for HttpApi {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let builder = self.json_body(self.client.post(self.url("/login")), request)?;
        let body = self.send(builder).await?;
        Ok(self.codec.decode(&body)?)
    }

    async fn logout(&self, token: &str) -> Result<(), ApiError> {
        let builder = self.json_body(
            self.client.post(self.url("/logout")),
            &LogoutRequest::new(token),
        )?;
        self.send(builder).await.map(|_| ())
    }

    async fn current_user(&self, token: &str) -> Result<CurrentUserResponse, ApiError> {
        let builder = self.client.get(self.url("/current_user")).bearer_auth(token);
        let body = self.send(builder).await?;
        Ok(self.codec.decode(&body)?)
    }
}

impl ResourceApi for HttpApi {
    async fn get(&self, path: &str, token: Option<&str>) -> Result<Vec<u8>, ApiError> {
        let mut builder = self.client.get(self.url(path));
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        self.send(builder).await
    }
}

fn map_reqwest(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Network(err.to_string())
    }
}
