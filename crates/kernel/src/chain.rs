use chrono::{DateTime, Utc};
use partcat_common::{Part, PartId};
use serde::{Deserialize, Serialize};

use crate::journal::ReplayError;

/// One immutable snapshot of a part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartVersion {
    pub version: u32,
    pub timestamp: DateTime<Utc>,
    pub part: Part,
}

/// Version metadata without the payload, as returned by version listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: u32,
    pub timestamp: DateTime<Utc>,
}

/// The append-only history of one part.
///
/// Never empty: a chain is born with version 1 and only ever grows by one
/// version at a time. Whole-chain removal is the store's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionChain {
    id: PartId,
    versions: Vec<PartVersion>,
}

impl VersionChain {
    /// Start a chain from its first version.
    pub fn new(id: PartId, first: PartVersion) -> Result<Self, ReplayError> {
        if first.version != 1 {
            return Err(ReplayError::VersionGap {
                id,
                expected: 1,
                found: first.version,
            });
        }
        Ok(Self {
            id,
            versions: vec![first],
        })
    }

    pub fn id(&self) -> &PartId {
        &self.id
    }

    /// Number of versions in the chain.
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Always false for a chain built through [`VersionChain::new`].
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn versions(&self) -> &[PartVersion] {
        &self.versions
    }

    /// The highest-numbered version.
    pub fn latest(&self) -> Option<&PartVersion> {
        self.versions.last()
    }

    /// The current view of the part.
    pub fn current(&self) -> Option<&Part> {
        self.latest().map(|v| &v.part)
    }

    /// Look up an exact version number.
    pub fn get(&self, version: u32) -> Option<&PartVersion> {
        let index = usize::try_from(version).ok()?.checked_sub(1)?;
        self.versions.get(index).filter(|v| v.version == version)
    }

    /// Number the next append would receive.
    pub fn next_version(&self) -> u32 {
        self.latest().map_or(1, |v| v.version + 1)
    }

    /// Build the successor version for `part`, stamped no earlier than the
    /// current latest version so timestamps never run backwards.
    pub fn successor(&self, part: Part, now: DateTime<Utc>) -> PartVersion {
        let timestamp = self.latest().map_or(now, |v| now.max(v.timestamp));
        PartVersion {
            version: self.next_version(),
            timestamp,
            part,
        }
    }

    /// Append a version. It must be numbered exactly one past the latest.
    pub fn push(&mut self, version: PartVersion) -> Result<(), ReplayError> {
        let expected = self.next_version();
        if version.version != expected {
            return Err(ReplayError::VersionGap {
                id: self.id.clone(),
                expected,
                found: version.version,
            });
        }
        self.versions.push(version);
        Ok(())
    }

    /// Version metadata in ascending order.
    pub fn infos(&self) -> Vec<VersionInfo> {
        self.versions
            .iter()
            .map(|v| VersionInfo {
                version: v.version,
                timestamp: v.timestamp,
            })
            .collect()
    }

    /// Check a chain that arrived from outside (e.g. a persisted image).
    pub fn check(&self) -> Result<(), ReplayError> {
        if self.versions.is_empty() {
            return Err(ReplayError::EmptyChain(self.id.clone()));
        }
        for (index, v) in self.versions.iter().enumerate() {
            let expected = index as u32 + 1;
            if v.version != expected {
                return Err(ReplayError::VersionGap {
                    id: self.id.clone(),
                    expected,
                    found: v.version,
                });
            }
        }
        Ok(())
    }
}
