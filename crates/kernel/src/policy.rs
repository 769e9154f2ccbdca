use partcat_common::Part;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How `create` treats a candidate that collides with a live part.
///
/// Selected once when the store is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// A candidate sharing a live part's SKU becomes a new version of that
    /// part. History is preserved.
    #[default]
    Merge,
    /// A candidate matching a live part on name, SKU and price replaces it:
    /// the old chain is discarded and a fresh identifier starts at version 1.
    ReplaceChain,
    /// A candidate sharing a live part's SKU is refused.
    RejectDuplicate,
}

impl ConflictPolicy {
    pub const ALL: [ConflictPolicy; 3] = [Self::Merge, Self::ReplaceChain, Self::RejectDuplicate];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::ReplaceChain => "replace-chain",
            Self::RejectDuplicate => "reject-duplicate",
        }
    }

    /// Whether `existing` collides with `candidate` under this policy.
    pub fn collides(self, existing: &Part, candidate: &Part) -> bool {
        match self {
            Self::Merge | Self::RejectDuplicate => {
                candidate.has_sku() && existing.sku == candidate.sku
            }
            Self::ReplaceChain => {
                existing.name == candidate.name
                    && existing.sku == candidate.sku
                    && existing.price == candidate.price
            }
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown conflict policy {0:?} (expected merge, replace-chain or reject-duplicate)")]
pub struct ParsePolicyError(pub String);

impl FromStr for ConflictPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParsePolicyError(s.to_owned()))
    }
}
