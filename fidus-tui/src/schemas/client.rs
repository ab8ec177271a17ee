//! Client form schema.

use super::FieldErrors;
use fidus_api::types::{CreateClientRequest, UpdateClientRequest};
use fidus_core::ClientStatus;
use once_cell::sync::Lazy;
use regex::Regex;

pub const FIELD_NAME: &str = "name";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_STATUS: &str = "status";

pub const MIN_NAME_CHARS: usize = 3;

// Conservative shape check: one `@`, no whitespace, dotted domain.
// Uniqueness is the backend's job.
static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"));

/// Raw form text, exactly as the user typed it.
#[derive(Debug, Clone, Copy)]
pub struct ClientFormInput<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub status: &'a str,
}

/// Normalized, validated client fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientDraft {
    pub name: String,
    pub email: String,
    pub status: ClientStatus,
}

impl From<ClientDraft> for CreateClientRequest {
    fn from(draft: ClientDraft) -> Self {
        Self {
            name: draft.name,
            email: draft.email,
            status: draft.status,
        }
    }
}

impl From<ClientDraft> for UpdateClientRequest {
    fn from(draft: ClientDraft) -> Self {
        Self {
            name: draft.name,
            email: draft.email,
            status: draft.status,
        }
    }
}

/// Validate raw client form input, collecting every field failure.
pub fn validate(input: &ClientFormInput<'_>) -> Result<ClientDraft, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = input.name.trim();
    if name.chars().count() < MIN_NAME_CHARS {
        errors.push(
            FIELD_NAME,
            format!("Name must be at least {} characters long.", MIN_NAME_CHARS),
        );
    }

    let email = input.email.trim();
    if !EMAIL_SHAPE.is_match(email) {
        errors.push(FIELD_EMAIL, "Enter a valid email address.");
    }

    let status = match input.status.parse::<ClientStatus>() {
        Ok(status) => Some(status),
        Err(_) => {
            errors.push(FIELD_STATUS, "Select a status: active or inactive.");
            None
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ClientDraft {
        name: name.to_string(),
        email: email.to_string(),
        status: status.unwrap_or(ClientStatus::Active),
    })
}
