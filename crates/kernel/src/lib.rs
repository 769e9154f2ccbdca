//! Catalog kernel: the versioned record store behind the parts catalog.
//!
//! # Invariants
//! - Every live identifier maps to a non-empty version chain.
//! - Versions within a chain are numbered 1, 2, 3, ... with no gaps or reuse.
//! - Identifiers are minted from a monotonic counter and never reused.
//! - Every mutation is recorded by the journal before it becomes visible.

pub mod chain;
pub mod journal;
pub mod policy;
pub mod store;

pub use chain::{PartVersion, VersionChain, VersionInfo};
pub use journal::{CatalogEvent, CatalogImage, Journal, JournalError, NullJournal, ReplayError};
pub use policy::{ConflictPolicy, ParsePolicyError};
pub use store::{CatalogSummary, ConflictError, StoreError, VersionedStore};
