use partcat_kernel::CatalogImage;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::store::PersistError;

/// A content-addressed image of the whole catalog.
///
/// The hash covers the CBOR encoding of the image, so a snapshot that was
/// altered after capture fails [`Snapshot::verify`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Number of journal segments already folded into this image.
    pub segments: u32,
    pub image: CatalogImage,
    /// Hex SHA-256 of the CBOR-encoded image.
    pub hash: String,
}

impl Snapshot {
    /// Capture an image that covers the first `segments` journal segments.
    pub fn capture(image: CatalogImage, segments: u32) -> Result<Self, PersistError> {
        let hash = image_hash(&image)?;
        Ok(Self {
            segments,
            image,
            hash,
        })
    }

    /// Recompute the content hash and compare.
    pub fn verify(&self) -> bool {
        image_hash(&self.image).is_ok_and(|actual| actual == self.hash)
    }
}

fn image_hash(image: &CatalogImage) -> Result<String, PersistError> {
    let mut buf = Vec::new();
    ciborium::into_writer(image, &mut buf).map_err(|e| PersistError::CborEncode(e.to_string()))?;
    Ok(format!("{:x}", Sha256::digest(&buf)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use partcat_common::Part;
    use partcat_kernel::{ConflictPolicy, VersionedStore};

    #[test]
    fn snapshot_capture_and_verify() {
        let store = VersionedStore::in_memory(ConflictPolicy::Merge);
        store.create(Part::new("Brake Pad", "BP100", 29.99)).unwrap();

        let snap = Snapshot::capture(store.image(), 3).unwrap();
        assert!(snap.verify());
        assert_eq!(snap.segments, 3);
        assert_eq!(snap.image.chains.len(), 1);
    }

    #[test]
    fn snapshot_corruption_detected() {
        let store = VersionedStore::in_memory(ConflictPolicy::Merge);
        store.create(Part::new("Brake Pad", "BP100", 29.99)).unwrap();

        let mut snap = Snapshot::capture(store.image(), 1).unwrap();
        snap.image.next_seq = 999;
        assert!(!snap.verify());
    }
}
