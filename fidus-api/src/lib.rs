//! FIDUS API contract.
//!
//! Request and response shapes exchanged with the advisory backend, plus the
//! structured error body it returns for non-2xx responses. The backend itself
//! lives outside this repository; every consumer of these types is a client.

pub mod error;
pub mod types;

pub use error::{ApiError, ErrorCode};
