//! Persistence for the parts catalog: an append-only journal of committed
//! mutation batches, periodic snapshots, and a hash-chained integrity manifest.
//!
//! # Invariants
//! - Segments are append-only; one segment holds exactly one committed batch.
//! - The metadata file is the commit point. Files it does not count are ignored.
//! - Recovery is snapshot + replay of the segments written after it.

mod snapshot;
mod store;

pub use snapshot::Snapshot;
pub use store::{
    CatalogMeta, CatalogStore, FileJournal, IntegrityManifest, ManifestEntry, PersistError,
    Recovered, open_catalog,
};

pub fn crate_info() -> &'static str {
    "partcat-persist v0.1.0"
}
