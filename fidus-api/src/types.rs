//! API Request and Response Types
//!
//! This module defines the request and response types for the FIDUS backend
//! API. Bodies are JSON with camelCase member names, matching what the
//! backend emits (`createdAt`, `clientId`, `currentValue`, ...).

use fidus_core::{AllocationId, AssetId, ClientId, ClientStatus, Timestamp};
use serde::{Deserialize, Serialize};

// ============================================================================
// CLIENT TYPES
// ============================================================================

/// Request to create a new client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    /// Display name of the client
    pub name: String,
    /// Contact email; the backend enforces uniqueness
    pub email: String,
    /// Initial lifecycle status
    pub status: ClientStatus,
}

/// Request to replace a client's editable fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest {
    pub name: String,
    pub email: String,
    pub status: ClientStatus,
}

/// Client record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientResponse {
    pub id: ClientId,
    pub name: String,
    pub email: String,
    pub status: ClientStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ============================================================================
// ASSET TYPES
// ============================================================================

/// Financial asset as returned by the backend.
///
/// Assets are read-only from this system's perspective; `current_value` is
/// authoritative on the backend and never mutated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetResponse {
    pub id: AssetId,
    pub name: String,
    pub current_value: f64,
}

// ============================================================================
// ALLOCATION TYPES
// ============================================================================

/// Request to allocate an asset to a client's portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAllocationRequest {
    pub asset_id: AssetId,
    /// Number of units; must be >= 1
    pub quantity: i64,
}

/// Allocation as returned by the backend, with the asset snapshot embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResponse {
    pub id: AllocationId,
    pub client_id: ClientId,
    pub asset_id: AssetId,
    pub quantity: i64,
    pub assigned_at: Timestamp,
    pub asset: AssetResponse,
}

impl AllocationResponse {
    /// Current value of the position (quantity times the asset snapshot's
    /// unit value).
    pub fn position_value(&self) -> f64 {
        self.quantity as f64 * self.asset.current_value
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn sample_client() -> ClientResponse {
        ClientResponse {
            id: ClientId::new(Uuid::nil()),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            status: ClientStatus::Active,
            created_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    #[test]
    fn test_client_response_uses_camel_case_wire_names() {
        let json = serde_json::to_value(sample_client()).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("created_at").is_none());
        assert_eq!(json["status"], "active");
    }

    #[test]
    fn test_client_response_parses_backend_payload() {
        let payload = r#"{
            "id": "0193814c-5f2e-7cc3-a7f1-000000000001",
            "name": "Grace Hopper",
            "email": "grace@example.com",
            "status": "inactive",
            "createdAt": "2025-02-01T10:00:00Z",
            "updatedAt": "2025-02-03T12:30:00Z"
        }"#;
        let client: ClientResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(client.name, "Grace Hopper");
        assert_eq!(client.status, ClientStatus::Inactive);
    }

    #[test]
    fn test_allocation_wire_names_and_position_value() {
        let payload = r#"{
            "id": "0193814c-5f2e-7cc3-a7f1-000000000002",
            "clientId": "0193814c-5f2e-7cc3-a7f1-000000000003",
            "assetId": "0193814c-5f2e-7cc3-a7f1-000000000004",
            "quantity": 4,
            "assignedAt": "2025-03-01T09:00:00Z",
            "asset": {
                "id": "0193814c-5f2e-7cc3-a7f1-000000000004",
                "name": "Global Equity Fund",
                "currentValue": 125.5
            }
        }"#;
        let allocation: AllocationResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(allocation.quantity, 4);
        assert!((allocation.position_value() - 502.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_create_allocation_request_wire_names() {
        let req = CreateAllocationRequest {
            asset_id: AssetId::new(Uuid::nil()),
            quantity: 2,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("assetId").is_some());
        assert!(json.get("asset_id").is_none());
    }
}
