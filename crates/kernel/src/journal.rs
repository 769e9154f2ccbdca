use partcat_common::PartId;
use serde::{Deserialize, Serialize};

use crate::chain::{PartVersion, VersionChain};

/// A committed change to the catalog.
///
/// Every mutation is expressed as a batch of events. The same events drive
/// the live store and recovery, so a replayed journal reproduces the catalog
/// exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CatalogEvent {
    /// A new chain was born with its first version.
    Created { id: PartId, version: PartVersion },
    /// A version was appended to an existing chain.
    Appended { id: PartId, version: PartVersion },
    /// A whole chain was removed.
    Deleted { id: PartId },
}

impl CatalogEvent {
    pub fn id(&self) -> &PartId {
        match self {
            Self::Created { id, .. } | Self::Appended { id, .. } | Self::Deleted { id } => id,
        }
    }
}

/// Full catalog state, written at checkpoints so recovery can skip the
/// journal prefix it covers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogImage {
    /// Sequence number the next minted identifier will use.
    pub next_seq: u64,
    pub chains: Vec<VersionChain>,
}

/// Boxed error returned by journal implementations.
pub type JournalError = Box<dyn std::error::Error + Send + Sync>;

/// Durability hook for the store.
///
/// `record` is called with the store's write lock held, before the batch is
/// applied in memory. Returning an error aborts the mutation and leaves the
/// catalog unchanged, so an implementation must either persist the whole
/// batch or none of it.
pub trait Journal: Send + Sync {
    fn record(&mut self, events: &[CatalogEvent]) -> Result<(), JournalError>;

    /// Persist a full image. Journals without compaction ignore it.
    fn checkpoint(&mut self, image: &CatalogImage) -> Result<(), JournalError> {
        let _ = image;
        Ok(())
    }
}

/// Journal for the process-local medium: nothing outlives the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullJournal;

impl Journal for NullJournal {
    fn record(&mut self, _events: &[CatalogEvent]) -> Result<(), JournalError> {
        Ok(())
    }
}

/// Inconsistencies found while applying events or loading an image.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReplayError {
    #[error("part {0} created twice")]
    DuplicatePart(PartId),
    #[error("event refers to unknown part {0}")]
    UnknownPart(PartId),
    #[error("part {id}: expected version {expected}, found {found}")]
    VersionGap {
        id: PartId,
        expected: u32,
        found: u32,
    },
    #[error("part {0} has an empty version chain")]
    EmptyChain(PartId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use partcat_common::Part;

    #[test]
    fn event_id_accessor() {
        let id = PartId::from_sequence(3);
        let created = CatalogEvent::Created {
            id: id.clone(),
            version: PartVersion {
                version: 1,
                timestamp: Utc::now(),
                part: Part::default(),
            },
        };
        assert_eq!(created.id(), &id);
        assert_eq!(CatalogEvent::Deleted { id: id.clone() }.id(), &id);
    }

    #[test]
    fn null_journal_accepts_everything() {
        let mut journal = NullJournal;
        let batch = [CatalogEvent::Deleted {
            id: PartId::from_sequence(1),
        }];
        assert!(journal.record(&batch).is_ok());
        assert!(journal.checkpoint(&CatalogImage::default()).is_ok());
    }
}
