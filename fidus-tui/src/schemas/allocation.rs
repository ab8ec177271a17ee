//! Allocation form schema.

use super::FieldErrors;
use fidus_api::types::CreateAllocationRequest;
use fidus_core::AssetId;

pub const FIELD_ASSET_ID: &str = "asset_id";
pub const FIELD_QUANTITY: &str = "quantity";

/// Raw form text for a new allocation.
#[derive(Debug, Clone, Copy)]
pub struct AllocationFormInput<'a> {
    pub asset_id: &'a str,
    pub quantity: &'a str,
}

/// Normalized, validated allocation fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationDraft {
    pub asset_id: AssetId,
    pub quantity: i64,
}

impl From<AllocationDraft> for CreateAllocationRequest {
    fn from(draft: AllocationDraft) -> Self {
        Self {
            asset_id: draft.asset_id,
            quantity: draft.quantity,
        }
    }
}

/// Validate raw allocation form input, collecting every field failure.
pub fn validate(input: &AllocationFormInput<'_>) -> Result<AllocationDraft, FieldErrors> {
    let mut errors = FieldErrors::new();

    let asset_id = if input.asset_id.trim().is_empty() {
        errors.push(FIELD_ASSET_ID, "Select an asset.");
        None
    } else {
        match input.asset_id.parse::<AssetId>() {
            Ok(id) => Some(id),
            Err(_) => {
                errors.push(FIELD_ASSET_ID, "Asset id must be a valid identifier.");
                None
            }
        }
    };

    // Coerce the raw text to an integer; anything fractional or non-numeric
    // fails, as does anything below 1.
    let quantity = match input.quantity.trim().parse::<i64>() {
        Ok(quantity) if quantity >= 1 => Some(quantity),
        Ok(_) => {
            errors.push(FIELD_QUANTITY, "Quantity must be at least 1.");
            None
        }
        Err(_) => {
            errors.push(FIELD_QUANTITY, "Quantity must be a whole number.");
            None
        }
    };

    match (asset_id, quantity) {
        (Some(asset_id), Some(quantity)) if errors.is_empty() => Ok(AllocationDraft {
            asset_id,
            quantity,
        }),
        _ => Err(errors),
    }
}
