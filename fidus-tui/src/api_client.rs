//! REST client for the advisory backend.
//!
//! Each operation issues exactly one HTTP request and maps the response body
//! to a typed result, or surfaces the failure with its HTTP status and the
//! backend-provided message. The operations are also expressed as the
//! [`PlatformApi`] trait so the cached gateway can run against a fake
//! backend in tests.

use crate::config::TuiConfig;
use async_trait::async_trait;
use fidus_api::types::{
    AllocationResponse, AssetResponse, ClientResponse, CreateAllocationRequest,
    CreateClientRequest, UpdateClientRequest,
};
use fidus_api::ApiError;
use fidus_core::ClientId;
use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(String),
}

impl ApiClientError {
    /// HTTP status of the failure, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiClientError::Status { status, .. } => Some(*status),
            ApiClientError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The 409 case callers special-case onto the email field.
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    /// Bare message suitable for field-level display, without the
    /// `HTTP <status>:` prefix `Display` adds.
    pub fn message(&self) -> String {
        match self {
            ApiClientError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Backend operations used by the console, one HTTP call each.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    async fn list_clients(&self) -> Result<Vec<ClientResponse>, ApiClientError>;
    async fn get_client(&self, id: ClientId) -> Result<ClientResponse, ApiClientError>;
    async fn create_client(
        &self,
        req: &CreateClientRequest,
    ) -> Result<ClientResponse, ApiClientError>;
    async fn update_client(
        &self,
        id: ClientId,
        req: &UpdateClientRequest,
    ) -> Result<ClientResponse, ApiClientError>;
    async fn delete_client(&self, id: ClientId) -> Result<(), ApiClientError>;
    async fn list_assets(&self) -> Result<Vec<AssetResponse>, ApiClientError>;
    async fn list_client_allocations(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<AllocationResponse>, ApiClientError>;
    async fn create_client_allocation(
        &self,
        client_id: ClientId,
        req: &CreateAllocationRequest,
    ) -> Result<AllocationResponse, ApiClientError>;
}

#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
}

impl RestClient {
    pub fn new(config: &TuiConfig) -> Result<Self, ApiClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, ApiClientError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        parse_response(response).await
    }

    async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiClientError>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "POST");
        let response = self.client.post(url).json(body).send().await?;
        parse_response(response).await
    }

    async fn put_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiClientError>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "PUT");
        let response = self.client.put(url).json(body).send().await?;
        parse_response(response).await
    }

    async fn delete_empty(&self, path: &str) -> Result<(), ApiClientError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "DELETE");
        let response = self.client.delete(url).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await?;
        Err(status_error(status, &text))
    }
}

#[async_trait]
impl PlatformApi for RestClient {
    async fn list_clients(&self) -> Result<Vec<ClientResponse>, ApiClientError> {
        self.get_json("/clients").await
    }

    async fn get_client(&self, id: ClientId) -> Result<ClientResponse, ApiClientError> {
        let path = format!("/clients/{}", id.as_uuid());
        self.get_json(&path).await
    }

    async fn create_client(
        &self,
        req: &CreateClientRequest,
    ) -> Result<ClientResponse, ApiClientError> {
        self.post_json("/clients", req).await
    }

    async fn update_client(
        &self,
        id: ClientId,
        req: &UpdateClientRequest,
    ) -> Result<ClientResponse, ApiClientError> {
        let path = format!("/clients/{}", id.as_uuid());
        self.put_json(&path, req).await
    }

    async fn delete_client(&self, id: ClientId) -> Result<(), ApiClientError> {
        let path = format!("/clients/{}", id.as_uuid());
        self.delete_empty(&path).await
    }

    async fn list_assets(&self) -> Result<Vec<AssetResponse>, ApiClientError> {
        self.get_json("/assets").await
    }

    async fn list_client_allocations(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<AllocationResponse>, ApiClientError> {
        let path = format!("/clients/{}/allocations", client_id.as_uuid());
        self.get_json(&path).await
    }

    async fn create_client_allocation(
        &self,
        client_id: ClientId,
        req: &CreateAllocationRequest,
    ) -> Result<AllocationResponse, ApiClientError> {
        let path = format!("/clients/{}/allocations", client_id.as_uuid());
        self.post_json(&path, req).await
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response.json::<T>().await?)
    } else {
        let text = response.text().await?;
        Err(status_error(status, &text))
    }
}

/// Extract the backend-provided message from an error body: a structured
/// `ApiError`, a bare `{"message": ...}` object, or raw text, in that order.
fn status_error(status: StatusCode, body: &str) -> ApiClientError {
    if let Ok(api_error) = serde_json::from_str::<ApiError>(body) {
        return ApiClientError::Status {
            status: status.as_u16(),
            message: api_error.message,
        };
    }

    #[derive(Deserialize)]
    struct MessageOnly {
        message: String,
    }
    if let Ok(body) = serde_json::from_str::<MessageOnly>(body) {
        return ApiClientError::Status {
            status: status.as_u16(),
            message: body.message,
        };
    }

    let fallback = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.trim().to_string()
    };
    ApiClientError::Status {
        status: status.as_u16(),
        message: fallback,
    }
}
