use chrono::Utc;
use parking_lot::RwLock;
use partcat_common::{Part, PartId, PartPatch, ValidationError};
use std::collections::BTreeMap;
use std::fmt;

use crate::chain::{PartVersion, VersionChain, VersionInfo};
use crate::journal::{CatalogEvent, CatalogImage, Journal, JournalError, NullJournal, ReplayError};
use crate::policy::ConflictPolicy;

/// Errors returned by store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid part: {0}")]
    Validation(#[from] ValidationError),
    #[error("part {0} not found")]
    NotFound(PartId),
    #[error("version {version} of part {id} not found")]
    VersionNotFound { id: PartId, version: u32 },
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    #[error("storage failure: {0}")]
    Storage(#[source] JournalError),
    #[error("inconsistent catalog history: {0}")]
    Replay(#[from] ReplayError),
}

impl StoreError {
    /// True for both an unknown identifier and an unknown version.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::VersionNotFound { .. })
    }
}

/// Duplicate-matching outcomes the configured policy refuses to resolve.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error("{policy} policy matched several live parts: {candidates:?}")]
    Ambiguous {
        policy: ConflictPolicy,
        candidates: Vec<PartId>,
    },
    #[error("a part with the same SKU already exists: {existing}")]
    Duplicate { existing: PartId },
}

/// Point-in-time counters for inspection tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSummary {
    pub live_parts: usize,
    pub total_versions: usize,
    pub next_id: PartId,
    pub policy: ConflictPolicy,
}

impl fmt::Display for CatalogSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Catalog: parts={} versions={} next_id={} policy={}",
            self.live_parts, self.total_versions, self.next_id, self.policy
        )
    }
}

/// What a create turns into once the conflict policy has looked at it.
enum Resolution {
    Fresh,
    MergeInto(PartId),
    Replace(PartId),
}

/// State guarded by the store lock.
struct Catalog {
    chains: BTreeMap<PartId, VersionChain>,
    /// Counter behind the next minted identifier.
    next_seq: u64,
    journal: Box<dyn Journal>,
}

impl Catalog {
    fn chain(&self, id: &PartId) -> Result<&VersionChain, StoreError> {
        self.chains
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn current(&self, id: &PartId) -> Result<&Part, StoreError> {
        self.chain(id)?
            .current()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn peek_id(&self) -> PartId {
        PartId::from_sequence(self.next_seq)
    }

    fn resolve(&self, policy: ConflictPolicy, candidate: &Part) -> Result<Resolution, ConflictError> {
        let matches: Vec<PartId> = self
            .chains
            .values()
            .filter(|chain| {
                chain
                    .current()
                    .is_some_and(|existing| policy.collides(existing, candidate))
            })
            .map(|chain| chain.id().clone())
            .collect();

        match (policy, matches.as_slice()) {
            (_, []) => Ok(Resolution::Fresh),
            (ConflictPolicy::RejectDuplicate, [existing, ..]) => Err(ConflictError::Duplicate {
                existing: existing.clone(),
            }),
            (ConflictPolicy::Merge, [id]) => Ok(Resolution::MergeInto(id.clone())),
            (ConflictPolicy::ReplaceChain, [id]) => Ok(Resolution::Replace(id.clone())),
            (_, _) => Err(ConflictError::Ambiguous {
                policy,
                candidates: matches,
            }),
        }
    }

    /// Under `RejectDuplicate` a new version may not take a SKU that another
    /// live part already holds.
    fn check_unique(
        &self,
        policy: ConflictPolicy,
        id: &PartId,
        part: &Part,
    ) -> Result<(), ConflictError> {
        if policy != ConflictPolicy::RejectDuplicate {
            return Ok(());
        }
        let holder = self.chains.values().find(|chain| {
            chain.id() != id
                && chain
                    .current()
                    .is_some_and(|existing| policy.collides(existing, part))
        });
        match holder {
            Some(chain) => Err(ConflictError::Duplicate {
                existing: chain.id().clone(),
            }),
            None => Ok(()),
        }
    }

    /// Event appending `part` as the next version of `id`.
    fn append_event(&self, id: &PartId, mut part: Part) -> Result<CatalogEvent, StoreError> {
        part.id = id.clone();
        let version = self.chain(id)?.successor(part, Utc::now());
        Ok(CatalogEvent::Appended {
            id: id.clone(),
            version,
        })
    }

    /// Event creating a chain under a freshly minted identifier.
    fn create_event(&self, mut part: Part) -> CatalogEvent {
        let id = self.peek_id();
        part.id = id.clone();
        CatalogEvent::Created {
            id,
            version: PartVersion {
                version: 1,
                timestamp: Utc::now(),
                part,
            },
        }
    }

    /// Record a batch in the journal, then make it visible.
    ///
    /// Nothing changes in memory unless the journal accepted the batch.
    fn commit(&mut self, events: Vec<CatalogEvent>) -> Result<(), StoreError> {
        self.journal.record(&events).map_err(StoreError::Storage)?;
        for event in events {
            self.apply(event)?;
        }
        Ok(())
    }

    fn apply(&mut self, event: CatalogEvent) -> Result<(), ReplayError> {
        match event {
            CatalogEvent::Created { id, version } => {
                if self.chains.contains_key(&id) {
                    return Err(ReplayError::DuplicatePart(id));
                }
                if let Some(seq) = id.sequence() {
                    self.next_seq = self.next_seq.max(seq + 1);
                }
                tracing::debug!(%id, "created part");
                let chain = VersionChain::new(id.clone(), version)?;
                self.chains.insert(id, chain);
            }
            CatalogEvent::Appended { id, version } => {
                let chain = self
                    .chains
                    .get_mut(&id)
                    .ok_or_else(|| ReplayError::UnknownPart(id.clone()))?;
                tracing::debug!(%id, version = version.version, "appended version");
                chain.push(version)?;
            }
            CatalogEvent::Deleted { id } => {
                if self.chains.remove(&id).is_none() {
                    return Err(ReplayError::UnknownPart(id));
                }
                tracing::debug!(%id, "deleted part");
            }
        }
        Ok(())
    }
}

/// The versioned record store.
///
/// Owns the identifier counter, the identifier → chain map and the journal
/// behind one read/write lock. Writers hold the write lock for the whole
/// operation including the journal write; readers see a consistent snapshot.
pub struct VersionedStore {
    policy: ConflictPolicy,
    inner: RwLock<Catalog>,
}

impl VersionedStore {
    /// A process-local store with no durability.
    pub fn in_memory(policy: ConflictPolicy) -> Self {
        Self::with_journal(policy, Box::new(NullJournal))
    }

    /// An empty store recording every mutation in `journal`.
    pub fn with_journal(policy: ConflictPolicy, journal: Box<dyn Journal>) -> Self {
        Self {
            policy,
            inner: RwLock::new(Catalog {
                chains: BTreeMap::new(),
                next_seq: 1,
                journal,
            }),
        }
    }

    /// Rebuild a store from an optional checkpoint image plus the events
    /// recorded after it. Replayed events are not written back to `journal`.
    pub fn restore(
        policy: ConflictPolicy,
        image: Option<CatalogImage>,
        events: impl IntoIterator<Item = CatalogEvent>,
        journal: Box<dyn Journal>,
    ) -> Result<Self, StoreError> {
        let store = Self::with_journal(policy, journal);
        {
            let mut catalog = store.inner.write();
            if let Some(image) = image {
                catalog.next_seq = image.next_seq.max(1);
                for chain in image.chains {
                    chain.check()?;
                    let id = chain.id().clone();
                    if catalog.chains.insert(id.clone(), chain).is_some() {
                        return Err(ReplayError::DuplicatePart(id).into());
                    }
                }
                // The counter must clear every identifier the image holds.
                if let Some(highest) = catalog.chains.keys().filter_map(PartId::sequence).max() {
                    catalog.next_seq = catalog.next_seq.max(highest + 1);
                }
            }
            let mut replayed = 0usize;
            for event in events {
                catalog.apply(event)?;
                replayed += 1;
            }
            tracing::info!(
                parts = catalog.chains.len(),
                replayed,
                next_id = %catalog.peek_id(),
                "catalog restored"
            );
        }
        Ok(store)
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Create a part, reconciling it with live parts per the conflict policy.
    /// Returns the identifier the candidate ended up under.
    pub fn create(&self, candidate: Part) -> Result<PartId, StoreError> {
        self.create_part(candidate).map(|part| part.id)
    }

    /// Like [`VersionedStore::create`], but returns the current view of the
    /// part as committed. The view is read under the same write lock, so no
    /// other writer can change or remove it first.
    pub fn create_part(&self, candidate: Part) -> Result<Part, StoreError> {
        candidate.validate()?;
        let mut catalog = self.inner.write();

        let resolution = catalog.resolve(self.policy, &candidate).inspect_err(|err| {
            tracing::warn!(%err, sku = %candidate.sku, "create refused by conflict policy");
        })?;

        let (id, events) = match resolution {
            Resolution::Fresh => {
                let event = catalog.create_event(candidate);
                (event.id().clone(), vec![event])
            }
            Resolution::MergeInto(existing) => {
                let event = catalog.append_event(&existing, candidate)?;
                (existing, vec![event])
            }
            Resolution::Replace(old) => {
                let event = catalog.create_event(candidate);
                tracing::debug!(%old, new = %event.id(), "replacing chain");
                (
                    event.id().clone(),
                    vec![CatalogEvent::Deleted { id: old }, event],
                )
            }
        };

        catalog.commit(events)?;
        catalog.current(&id).cloned()
    }

    /// Current view of a part.
    pub fn get(&self, id: &PartId) -> Result<Part, StoreError> {
        self.inner.read().current(id).cloned()
    }

    /// Append `replacement` as the next version of `id`.
    /// The payload's identifier is normalized to `id`.
    pub fn update(&self, id: &PartId, replacement: Part) -> Result<(), StoreError> {
        replacement.validate()?;
        let mut catalog = self.inner.write();
        catalog.chain(id)?;
        catalog.check_unique(self.policy, id, &replacement)?;
        let event = catalog.append_event(id, replacement)?;
        catalog.commit(vec![event])
    }

    /// Apply the present fields of `patch` to the current view of `id` and
    /// append the result. Load and append happen under one write lock.
    pub fn patch(&self, id: &PartId, patch: PartPatch) -> Result<(), StoreError> {
        let mut catalog = self.inner.write();
        let mut part = catalog.current(id)?.clone();
        patch.apply_to(&mut part);
        part.validate()?;
        catalog.check_unique(self.policy, id, &part)?;
        let event = catalog.append_event(id, part)?;
        catalog.commit(vec![event])
    }

    /// Remove the whole chain of `id`.
    pub fn delete(&self, id: &PartId) -> Result<(), StoreError> {
        let mut catalog = self.inner.write();
        catalog.chain(id)?;
        catalog.commit(vec![CatalogEvent::Deleted { id: id.clone() }])
    }

    /// The payload recorded at exactly `version`.
    pub fn get_version(&self, id: &PartId, version: u32) -> Result<Part, StoreError> {
        let catalog = self.inner.read();
        catalog
            .chain(id)?
            .get(version)
            .map(|v| v.part.clone())
            .ok_or_else(|| StoreError::VersionNotFound {
                id: id.clone(),
                version,
            })
    }

    /// Version numbers and timestamps of `id`, ascending.
    pub fn list_versions(&self, id: &PartId) -> Result<Vec<VersionInfo>, StoreError> {
        Ok(self.inner.read().chain(id)?.infos())
    }

    /// Current view of every live part.
    pub fn list_current(&self) -> Vec<Part> {
        self.inner
            .read()
            .chains
            .values()
            .filter_map(|chain| chain.current().cloned())
            .collect()
    }

    /// Live parts whose current name contains `needle`, ignoring case.
    pub fn search_by_name(&self, needle: &str) -> Vec<Part> {
        let needle = needle.to_lowercase();
        self.inner
            .read()
            .chains
            .values()
            .filter_map(VersionChain::current)
            .filter(|part| part.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    pub fn summary(&self) -> CatalogSummary {
        let catalog = self.inner.read();
        CatalogSummary {
            live_parts: catalog.chains.len(),
            total_versions: catalog.chains.values().map(VersionChain::len).sum(),
            next_id: catalog.peek_id(),
            policy: self.policy,
        }
    }

    /// Copy of the full catalog state.
    pub fn image(&self) -> CatalogImage {
        let catalog = self.inner.read();
        CatalogImage {
            next_seq: catalog.next_seq,
            chains: catalog.chains.values().cloned().collect(),
        }
    }

    /// Hand a full image to the journal so it can compact its history.
    /// Writers are blocked while the image is taken and written.
    pub fn checkpoint(&self) -> Result<(), StoreError> {
        let mut catalog = self.inner.write();
        let image = CatalogImage {
            next_seq: catalog.next_seq,
            chains: catalog.chains.values().cloned().collect(),
        };
        catalog
            .journal
            .checkpoint(&image)
            .map_err(StoreError::Storage)?;
        tracing::info!(parts = image.chains.len(), "catalog checkpoint written");
        Ok(())
    }
}

impl fmt::Debug for VersionedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionedStore")
            .field("policy", &self.policy)
            .field("summary", &self.summary())
            .finish()
    }
}
