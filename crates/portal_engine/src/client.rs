use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use portal_logging::portal_debug;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::token_store::{token_or_empty, TokenStore};
use crate::types::{ApiError, Method};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 20 * 1024 * 1024,
        }
    }
}

/// Authenticated JSON client for the portal API.
///
/// The bearer token is read from the store on every request, so a login or
/// logout takes effect on the next call. No retries and no caching.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    max_bytes: u64,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(settings: ClientSettings, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let base_url = Url::parse(&settings.base_url).map_err(|err| ApiError::InvalidUrl {
            url: settings.base_url.clone(),
            reason: err.to_string(),
        })?;
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::Network {
                method: Method::Get,
                url: base_url.to_string(),
                reason: err.to_string(),
            })?;
        Ok(Self {
            http,
            base_url,
            max_bytes: settings.max_bytes,
            tokens,
        })
    }

    /// Absolute URL for a path such as `/api/jobs/`.
    pub fn resolve(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url.join(path).map_err(|err| ApiError::InvalidUrl {
            url: path.to_string(),
            reason: err.to_string(),
        })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.send(Method::Get, path, None).await?;
        decode(path, &body)
    }

    pub async fn post_json<B, T>(&self, path: &str, payload: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let encoded = serde_json::to_vec(payload).map_err(|err| ApiError::Encode {
            url: path.to_string(),
            reason: err.to_string(),
        })?;
        let body = self.send(Method::Post, path, Some(encoded)).await?;
        decode(path, &body)
    }

    /// Raw GET, used for file exports.
    pub async fn get_bytes(&self, path: &str) -> Result<Bytes, ApiError> {
        self.send(Method::Get, path, None).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        payload: Option<Vec<u8>>,
    ) -> Result<Bytes, ApiError> {
        let url = self.resolve(path)?;
        let mut request = self
            .http
            .request(method.as_reqwest(), url.clone())
            .header(ACCEPT, "application/json");

        let token = token_or_empty(self.tokens.as_ref());
        if !token.is_empty() {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(payload) = payload {
            request = request.header(CONTENT_TYPE, "application/json").body(payload);
        }

        portal_debug!("{method} {url}");
        let response = request
            .send()
            .await
            .map_err(|err| map_reqwest_error(method, path, err))?;

        let status = response.status();
        let body = self.read_body(method, path, response).await?;
        if !status.is_success() {
            let text = String::from_utf8_lossy(&body).trim().to_string();
            return Err(ApiError::HttpStatus {
                method,
                status: status.as_u16(),
                url: path.to_string(),
                body: (!text.is_empty()).then_some(text),
            });
        }
        Ok(body)
    }

    async fn read_body(
        &self,
        method: Method,
        path: &str,
        response: reqwest::Response,
    ) -> Result<Bytes, ApiError> {
        let too_large = || ApiError::TooLarge {
            method,
            url: path.to_string(),
            max_bytes: self.max_bytes,
        };
        if response.content_length().is_some_and(|len| len > self.max_bytes) {
            return Err(too_large());
        }

        let mut buffer = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| map_reqwest_error(method, path, err))?;
            if buffer.len() as u64 + chunk.len() as u64 > self.max_bytes {
                return Err(too_large());
            }
            buffer.extend_from_slice(&chunk);
        }
        Ok(buffer.freeze())
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| ApiError::Decode {
        url: path.to_string(),
        reason: err.to_string(),
    })
}

fn map_reqwest_error(method: Method, path: &str, err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout {
            method,
            url: path.to_string(),
        };
    }
    ApiError::Network {
        method,
        url: path.to_string(),
        reason: err.to_string(),
    }
}
