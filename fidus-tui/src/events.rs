//! Event types for the console event loop.
//!
//! Fetches and mutations run in spawned tasks; their results come back
//! over the event channel tagged with the generation of the request that
//! started them, so results for a superseded fetch can be dropped.

use crate::api_client::ApiClientError;
use crossterm::event::KeyEvent;
use fidus_api::types::{AllocationResponse, AssetResponse, ClientResponse};
use fidus_cache::QueryError;
use fidus_core::ClientId;

#[derive(Debug)]
pub enum TuiEvent {
    Input(KeyEvent),
    Tick,
    Resize {
        width: u16,
        height: u16,
    },
    ClientsLoaded {
        generation: u64,
        result: Result<Vec<ClientResponse>, QueryError>,
    },
    /// Prefill fetch for the edit form.
    ClientPrefillLoaded {
        generation: u64,
        result: Result<ClientResponse, QueryError>,
    },
    /// Client fetch for the allocation ledger banner.
    LedgerClientLoaded {
        generation: u64,
        result: Result<ClientResponse, QueryError>,
    },
    AssetsLoaded {
        generation: u64,
        result: Result<Vec<AssetResponse>, QueryError>,
    },
    AllocationsLoaded {
        generation: u64,
        client_id: ClientId,
        result: Result<Vec<AllocationResponse>, QueryError>,
    },
    MutationDone(MutationOutcome),
}

#[derive(Debug)]
pub enum MutationOutcome {
    Success(MutationSuccess),
    Failure(MutationFailure),
}

#[derive(Debug)]
pub enum MutationSuccess {
    ClientCreated(ClientResponse),
    ClientUpdated(ClientResponse),
    ClientDeleted(ClientId),
    AllocationCreated(AllocationResponse),
}

/// What kind of write failed, with enough detail for field-level display.
#[derive(Debug, Clone)]
pub struct MutationFailure {
    pub kind: MutationKind,
    pub status: Option<u16>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    CreateClient,
    UpdateClient,
    DeleteClient,
    CreateAllocation,
}

impl MutationFailure {
    pub fn from_api(kind: MutationKind, err: &ApiClientError) -> Self {
        Self {
            kind,
            status: err.status(),
            message: err.message(),
        }
    }

    /// Duplicate-email conflict, mapped onto the email field by client
    /// create/update forms.
    pub fn is_conflict(&self) -> bool {
        self.status == Some(409)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_detection_keeps_bare_message() {
        let api_err = ApiClientError::Status {
            status: 409,
            message: "email in use".to_string(),
        };
        let failure = MutationFailure::from_api(MutationKind::CreateClient, &api_err);
        assert!(failure.is_conflict());
        assert_eq!(failure.message, "email in use");
    }

    #[test]
    fn test_non_status_errors_are_not_conflicts() {
        let api_err = ApiClientError::Config("bad base url".to_string());
        let failure = MutationFailure::from_api(MutationKind::DeleteClient, &api_err);
        assert!(!failure.is_conflict());
        assert_eq!(failure.status, None);
    }
}
