//! Shared types for the parts catalog: the part payload, its identifier,
//! typed partial updates and payload validation.
//!
//! # Invariants
//! - A part identifier is assigned by the store and never changes.
//! - Price and shipment weight are finite and non-negative on every stored part.

mod patch;
mod types;

pub use patch::PartPatch;
pub use types::{Part, PartId, ShipmentInfo, ValidationError};

pub fn crate_info() -> &'static str {
    "partcat-common v0.1.0"
}
