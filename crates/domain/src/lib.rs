//! # frontcli Domain
//!
//! Pure domain types for the Front API client.
//!
//! This crate contains:
//! - Front resource types and the list envelope
//! - Resource-ID prefixes and validation
//! - Configuration structures with defaults
//! - Domain errors and constants
//!
//! ## Architecture
//! - No dependencies on other frontcli crates
//! - No I/O; everything here is data and pure functions

pub mod config;
pub mod constants;
pub mod errors;
pub mod ids;
pub mod macros;
pub mod query;
pub mod types;

pub use config::*;
pub use errors::*;
pub use ids::{
    extract_prefix, resource_type, sanitize_id, validate_id_prefix, validate_resource_id,
    ResourceKind,
};
pub use query::{parse_status, ListConversationsOptions};
pub use types::*;
