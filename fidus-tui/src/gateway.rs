//! Cached gateway to the advisory backend.
//!
//! Composes the REST client with the query cache so views never talk to
//! either directly. Reads go through [`fidus_cache::QueryCache`] keyed by
//! [`QueryKey`]; writes pass straight through to the backend and, on
//! success, invalidate exactly the keys whose data the write could have
//! changed. On write failure nothing is invalidated.

use crate::api_client::{ApiClientError, PlatformApi};
use fidus_api::types::{
    AllocationResponse, AssetResponse, ClientResponse, CreateAllocationRequest,
    CreateClientRequest, UpdateClientRequest,
};
use fidus_cache::{QueryCache, QueryError};
use fidus_core::ClientId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

/// Cache key: resource tag plus identifying parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The full client list.
    Clients,
    /// A single client record.
    Client(ClientId),
    /// The asset catalogue.
    Assets,
    /// One client's allocations.
    Allocations(ClientId),
}

pub struct Gateway<A: PlatformApi> {
    api: Arc<A>,
    cache: Arc<QueryCache<QueryKey>>,
}

impl<A: PlatformApi> Clone for Gateway<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<A: PlatformApi + 'static> Gateway<A> {
    pub fn new(api: A, cache: Arc<QueryCache<QueryKey>>) -> Self {
        Self {
            api: Arc::new(api),
            cache,
        }
    }

    pub fn cache(&self) -> &QueryCache<QueryKey> {
        &self.cache
    }

    // ------------------------------------------------------------------
    // Reads (cached, single-flight per key)
    // ------------------------------------------------------------------

    pub async fn clients(&self) -> Result<Vec<ClientResponse>, QueryError> {
        let api = Arc::clone(&self.api);
        self.read(QueryKey::Clients, async move { api.list_clients().await })
            .await
    }

    pub async fn client(&self, id: ClientId) -> Result<ClientResponse, QueryError> {
        let api = Arc::clone(&self.api);
        self.read(QueryKey::Client(id), async move {
            api.get_client(id).await
        })
        .await
    }

    pub async fn assets(&self) -> Result<Vec<AssetResponse>, QueryError> {
        let api = Arc::clone(&self.api);
        self.read(QueryKey::Assets, async move { api.list_assets().await })
            .await
    }

    /// Allocations for a client. With no client id the read is disabled:
    /// it resolves to an empty list without touching the network or the
    /// cache.
    pub async fn allocations(
        &self,
        client_id: Option<ClientId>,
    ) -> Result<Vec<AllocationResponse>, QueryError> {
        let Some(id) = client_id else {
            return Ok(Vec::new());
        };
        let api = Arc::clone(&self.api);
        self.read(QueryKey::Allocations(id), async move {
            api.list_client_allocations(id).await
        })
        .await
    }

    // ------------------------------------------------------------------
    // Mutations (write through, then invalidate)
    // ------------------------------------------------------------------

    pub async fn create_client(
        &self,
        req: CreateClientRequest,
    ) -> Result<ClientResponse, ApiClientError> {
        let created = self.api.create_client(&req).await?;
        self.cache.invalidate(&QueryKey::Clients).await;
        tracing::info!(client_id = %created.id, "client created");
        Ok(created)
    }

    pub async fn update_client(
        &self,
        id: ClientId,
        req: UpdateClientRequest,
    ) -> Result<ClientResponse, ApiClientError> {
        let updated = self.api.update_client(id, &req).await?;
        // Replace the cached record with the server-returned object right
        // away so no stale value is rendered before the list refetches.
        let value = serde_json::to_value(&updated)?;
        self.cache.put(QueryKey::Client(id), value).await;
        self.cache.invalidate(&QueryKey::Clients).await;
        tracing::info!(client_id = %id, "client updated");
        Ok(updated)
    }

    pub async fn delete_client(&self, id: ClientId) -> Result<(), ApiClientError> {
        self.api.delete_client(id).await?;
        self.cache.invalidate(&QueryKey::Clients).await;
        self.cache.invalidate(&QueryKey::Client(id)).await;
        tracing::info!(client_id = %id, "client deleted");
        Ok(())
    }

    pub async fn create_allocation(
        &self,
        client_id: ClientId,
        req: CreateAllocationRequest,
    ) -> Result<AllocationResponse, ApiClientError> {
        let created = self.api.create_client_allocation(client_id, &req).await?;
        // Only the owning client's allocations are stale now.
        self.cache
            .invalidate(&QueryKey::Allocations(client_id))
            .await;
        tracing::info!(client_id = %client_id, allocation_id = %created.id, "allocation created");
        Ok(created)
    }

    async fn read<T, Fut>(&self, key: QueryKey, fetch: Fut) -> Result<T, QueryError>
    where
        T: Serialize + DeserializeOwned,
        Fut: Future<Output = Result<T, ApiClientError>>,
    {
        let value = self
            .cache
            .get_with(key, || async move {
                let fetched = fetch.await.map_err(to_query_error)?;
                serde_json::to_value(&fetched)
                    .map_err(|e| QueryError::new(format!("failed to encode cached value: {}", e)))
            })
            .await?;
        serde_json::from_value(value)
            .map_err(|e| QueryError::new(format!("failed to decode cached value: {}", e)))
    }
}

fn to_query_error(err: ApiClientError) -> QueryError {
    match err.status() {
        Some(status) => QueryError::with_status(status, err.message()),
        None => QueryError::new(err.message()),
    }
}
