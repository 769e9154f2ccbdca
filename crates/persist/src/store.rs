//! File-backed catalog journal.
//!
//! Layout inside the store directory:
//! ```text
//! catalog.meta.json            - metadata and schema versions (commit point)
//! snapshots/
//!   000001.snapshot.cbor.zst   - CBOR+zstd compressed catalog images
//! events/
//!   000001.log.cbor.zst        - one CBOR+zstd compressed batch per mutation
//! integrity/
//!   manifest.json              - hash chain manifest
//! ```

use crate::snapshot::Snapshot;
use partcat_kernel::{
    CatalogEvent, CatalogImage, ConflictPolicy, Journal, JournalError, StoreError, VersionedStore,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Current schema versions.
const CATALOG_SCHEMA_VERSION: u32 = 1;
const EVENT_SCHEMA_VERSION: u32 = 1;

const META_FILE: &str = "catalog.meta.json";
const MANIFEST_FILE: &str = "manifest.json";
const SNAPSHOT_SUFFIX: &str = ".snapshot.cbor.zst";
const SEGMENT_SUFFIX: &str = ".log.cbor.zst";

/// Errors from file-backed persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CBOR serialization error: {0}")]
    CborEncode(String),
    #[error("CBOR deserialization error: {0}")]
    CborDecode(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },
    #[error("schema version mismatch: file has v{file_version}, expected v{expected_version}")]
    SchemaMismatch {
        file_version: u32,
        expected_version: u32,
    },
    #[error("committed file {0} is missing")]
    MissingSegment(String),
    #[error("could not rebuild catalog: {0}")]
    Restore(#[from] StoreError),
}

/// Metadata stored in catalog.meta.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogMeta {
    pub catalog_schema_version: u32,
    pub event_schema_version: u32,
    pub snapshot_count: u32,
    pub event_segment_count: u32,
}

/// A single entry in the integrity manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub filename: String,
    pub sha256: String,
    pub prev_hash: Option<String>,
}

/// Integrity manifest tracking all file hashes in a chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrityManifest {
    pub entries: Vec<ManifestEntry>,
}

/// What recovery hands to the kernel: the latest image, if any, and the
/// events recorded after it.
#[derive(Debug, Clone, Default)]
pub struct Recovered {
    pub image: Option<CatalogImage>,
    pub events: Vec<CatalogEvent>,
}

/// File-backed catalog journal with schema versioning and integrity checking.
#[derive(Debug)]
pub struct CatalogStore {
    root: PathBuf,
    meta: CatalogMeta,
    manifest: IntegrityManifest,
}

impl CatalogStore {
    /// Open or create a catalog store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(root.join("snapshots"))?;
        std::fs::create_dir_all(root.join("events"))?;
        std::fs::create_dir_all(root.join("integrity"))?;

        let meta_path = root.join(META_FILE);
        let manifest_path = root.join("integrity").join(MANIFEST_FILE);

        let mut store = if meta_path.exists() {
            let meta: CatalogMeta = serde_json::from_reader(File::open(&meta_path)?)?;
            if meta.catalog_schema_version != CATALOG_SCHEMA_VERSION {
                return Err(PersistError::SchemaMismatch {
                    file_version: meta.catalog_schema_version,
                    expected_version: CATALOG_SCHEMA_VERSION,
                });
            }
            if meta.event_schema_version != EVENT_SCHEMA_VERSION {
                return Err(PersistError::SchemaMismatch {
                    file_version: meta.event_schema_version,
                    expected_version: EVENT_SCHEMA_VERSION,
                });
            }
            let manifest: IntegrityManifest = if manifest_path.exists() {
                serde_json::from_reader(File::open(&manifest_path)?)?
            } else {
                IntegrityManifest::default()
            };
            Self {
                root,
                meta,
                manifest,
            }
        } else {
            let store = Self {
                root,
                meta: CatalogMeta {
                    catalog_schema_version: CATALOG_SCHEMA_VERSION,
                    event_schema_version: EVENT_SCHEMA_VERSION,
                    snapshot_count: 0,
                    event_segment_count: 0,
                },
                manifest: IntegrityManifest::default(),
            };
            store.save_manifest()?;
            store.save_meta()?;
            store
        };

        store.drop_uncommitted_entries();
        tracing::info!(
            root = %store.root.display(),
            snapshots = store.meta.snapshot_count,
            segments = store.meta.event_segment_count,
            "catalog store opened"
        );
        Ok(store)
    }

    /// Load the latest snapshot and collect the events written after it.
    pub fn recover(&self) -> Result<Recovered, PersistError> {
        let (image, first_segment) = if self.meta.snapshot_count == 0 {
            (None, 1)
        } else {
            let snap = self.load_snapshot(self.meta.snapshot_count)?;
            if !snap.verify() {
                return Err(PersistError::IntegrityMismatch {
                    expected: "valid snapshot hash".into(),
                    actual: "snapshot hash mismatch".into(),
                });
            }
            (Some(snap.image), snap.segments + 1)
        };

        let mut events = Vec::new();
        for seg_idx in first_segment..=self.meta.event_segment_count {
            events.extend(self.load_event_segment(seg_idx)?);
        }
        tracing::debug!(
            from_snapshot = image.is_some(),
            events = events.len(),
            "catalog journal recovered"
        );
        Ok(Recovered { image, events })
    }

    /// Append one committed batch as a new segment.
    ///
    /// On failure the in-memory counters are rolled back, so the next append
    /// reuses the same segment number and nothing half-written is counted.
    pub fn append_events(&mut self, events: &[CatalogEvent]) -> Result<(), PersistError> {
        if events.is_empty() {
            return Ok(());
        }
        let seg_idx = self.meta.event_segment_count + 1;
        let filename = segment_name(seg_idx);
        let path = self.root.join("events").join(&filename);

        let compressed = zstd_compress(&cbor_serialize(events)?)?;
        self.meta.event_segment_count = seg_idx;
        if let Err(err) = self.commit_file(&path, filename, &compressed) {
            self.meta.event_segment_count = seg_idx - 1;
            return Err(err);
        }
        tracing::debug!(segment = seg_idx, events = events.len(), "journal segment written");
        Ok(())
    }

    /// Write a snapshot covering every segment written so far.
    pub fn take_snapshot(&mut self, image: &CatalogImage) -> Result<(), PersistError> {
        let snap = Snapshot::capture(image.clone(), self.meta.event_segment_count)?;
        let snap_idx = self.meta.snapshot_count + 1;
        let filename = snapshot_name(snap_idx);
        let path = self.root.join("snapshots").join(&filename);

        let compressed = zstd_compress(&cbor_serialize(&snap)?)?;
        self.meta.snapshot_count = snap_idx;
        if let Err(err) = self.commit_file(&path, filename, &compressed) {
            self.meta.snapshot_count = snap_idx - 1;
            return Err(err);
        }
        tracing::info!(snapshot = snap_idx, covers = snap.segments, "snapshot written");
        Ok(())
    }

    /// Verify all integrity hashes in the manifest.
    pub fn verify_integrity(&self) -> Result<(), PersistError> {
        let mut prev_hash: Option<String> = None;
        for entry in &self.manifest.entries {
            // Check chain continuity
            if entry.prev_hash != prev_hash {
                return Err(PersistError::IntegrityMismatch {
                    expected: prev_hash.unwrap_or_else(|| "None".into()),
                    actual: entry.prev_hash.clone().unwrap_or_else(|| "None".into()),
                });
            }

            let data = std::fs::read(self.file_path(&entry.filename))?;
            let actual_hash = sha256_hex(&data);
            if actual_hash != entry.sha256 {
                return Err(PersistError::IntegrityMismatch {
                    expected: entry.sha256.clone(),
                    actual: actual_hash,
                });
            }

            prev_hash = Some(entry.sha256.clone());
        }
        Ok(())
    }

    /// Get the path to the store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn meta(&self) -> &CatalogMeta {
        &self.meta
    }

    pub fn manifest(&self) -> &IntegrityManifest {
        &self.manifest
    }

    /// Write `data` under its final name, record it in the manifest, then
    /// persist manifest and meta. Meta goes last: it is the commit point.
    fn commit_file(
        &mut self,
        path: &Path,
        filename: String,
        data: &[u8],
    ) -> Result<(), PersistError> {
        write_atomic(path, data)?;

        let prev_hash = self.manifest.entries.last().map(|e| e.sha256.clone());
        self.manifest.entries.push(ManifestEntry {
            filename,
            sha256: sha256_hex(data),
            prev_hash,
        });

        let saved = self.save_manifest().and_then(|()| self.save_meta());
        if saved.is_err() {
            self.manifest.entries.pop();
        }
        saved
    }

    /// Forget manifest entries for files the metadata never committed
    /// (a crash between manifest and meta writes leaves one behind).
    fn drop_uncommitted_entries(&mut self) {
        let meta = &self.meta;
        let before = self.manifest.entries.len();
        self.manifest.entries.retain(|entry| {
            let (index, limit) = if let Some(stem) = entry.filename.strip_suffix(SEGMENT_SUFFIX) {
                (stem.parse::<u32>().ok(), meta.event_segment_count)
            } else if let Some(stem) = entry.filename.strip_suffix(SNAPSHOT_SUFFIX) {
                (stem.parse::<u32>().ok(), meta.snapshot_count)
            } else {
                (None, 0)
            };
            index.is_some_and(|i| i <= limit)
        });
        let dropped = before - self.manifest.entries.len();
        if dropped > 0 {
            tracing::warn!(dropped, "ignoring uncommitted manifest entries");
        }
    }

    fn file_path(&self, filename: &str) -> PathBuf {
        if filename.ends_with(SNAPSHOT_SUFFIX) {
            self.root.join("snapshots").join(filename)
        } else {
            self.root.join("events").join(filename)
        }
    }

    fn load_snapshot(&self, index: u32) -> Result<Snapshot, PersistError> {
        let filename = snapshot_name(index);
        let compressed = self.read_committed(&filename)?;

        // Verify hash against manifest
        self.verify_file_hash(&filename, &compressed)?;

        let cbor_bytes = zstd_decompress(&compressed)?;
        cbor_deserialize(&cbor_bytes)
    }

    fn load_event_segment(&self, index: u32) -> Result<Vec<CatalogEvent>, PersistError> {
        let filename = segment_name(index);
        let compressed = self.read_committed(&filename)?;

        self.verify_file_hash(&filename, &compressed)?;

        let cbor_bytes = zstd_decompress(&compressed)?;
        cbor_deserialize(&cbor_bytes)
    }

    fn read_committed(&self, filename: &str) -> Result<Vec<u8>, PersistError> {
        std::fs::read(self.file_path(filename)).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => PersistError::MissingSegment(filename.to_owned()),
            _ => PersistError::Io(err),
        })
    }

    fn verify_file_hash(&self, filename: &str, data: &[u8]) -> Result<(), PersistError> {
        let Some(entry) = self
            .manifest
            .entries
            .iter()
            .rev()
            .find(|e| e.filename == filename)
        else {
            return Err(PersistError::IntegrityMismatch {
                expected: format!("manifest entry for {filename}"),
                actual: "none".into(),
            });
        };
        let actual = sha256_hex(data);
        if entry.sha256 != actual {
            return Err(PersistError::IntegrityMismatch {
                expected: entry.sha256.clone(),
                actual,
            });
        }
        Ok(())
    }

    fn save_meta(&self) -> Result<(), PersistError> {
        let bytes = serde_json::to_vec_pretty(&self.meta)?;
        write_atomic(&self.root.join(META_FILE), &bytes)
    }

    fn save_manifest(&self) -> Result<(), PersistError> {
        let bytes = serde_json::to_vec_pretty(&self.manifest)?;
        write_atomic(&self.root.join("integrity").join(MANIFEST_FILE), &bytes)
    }
}

/// [`Journal`] backed by a [`CatalogStore`] directory.
#[derive(Debug)]
pub struct FileJournal {
    store: CatalogStore,
}

impl FileJournal {
    pub fn new(store: CatalogStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }
}

impl Journal for FileJournal {
    fn record(&mut self, events: &[CatalogEvent]) -> Result<(), JournalError> {
        Ok(self.store.append_events(events)?)
    }

    fn checkpoint(&mut self, image: &CatalogImage) -> Result<(), JournalError> {
        Ok(self.store.take_snapshot(image)?)
    }
}

/// Open the catalog at `path`, replay its journal, and return a store that
/// keeps journaling into the same directory.
pub fn open_catalog(
    path: impl AsRef<Path>,
    policy: ConflictPolicy,
) -> Result<VersionedStore, PersistError> {
    let store = CatalogStore::open(path)?;
    let Recovered { image, events } = store.recover()?;
    let catalog = VersionedStore::restore(policy, image, events, Box::new(FileJournal::new(store)))?;
    Ok(catalog)
}

fn segment_name(index: u32) -> String {
    format!("{index:06}{SEGMENT_SUFFIX}")
}

fn snapshot_name(index: u32) -> String {
    format!("{index:06}{SNAPSHOT_SUFFIX}")
}

/// Write to a sibling temp file, sync, then rename over the target.
fn write_atomic(path: &Path, data: &[u8]) -> Result<(), PersistError> {
    let tmp = path.with_extension("tmp");
    {
        let mut file = File::create(&tmp)?;
        file.write_all(data)?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp, path)?;
    // The rename is only durable once the directory entry is.
    fsync_dir(path)?;
    Ok(())
}

#[cfg(unix)]
fn fsync_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            File::open(parent)?.sync_all()?;
        }
    }
    Ok(())
}

#[cfg(not(unix))]
fn fsync_dir(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

fn cbor_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, PersistError> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| PersistError::CborEncode(e.to_string()))?;
    Ok(buf)
}

fn cbor_deserialize<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, PersistError> {
    ciborium::from_reader(data).map_err(|e| PersistError::CborDecode(e.to_string()))
}

fn zstd_compress(data: &[u8]) -> Result<Vec<u8>, PersistError> {
    let mut encoder = zstd::Encoder::new(Vec::new(), 3)?;
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn zstd_decompress(data: &[u8]) -> Result<Vec<u8>, PersistError> {
    let mut decoder = zstd::Decoder::new(data)?;
    let mut buf = Vec::new();
    decoder.read_to_end(&mut buf)?;
    Ok(buf)
}

fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use partcat_common::{Part, PartId};

    fn brake_pad() -> Part {
        Part::new("Brake Pad", "BP100", 29.99)
    }

    #[test]
    fn store_open_creates_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let store = CatalogStore::open(tmp.path().join("catalog")).unwrap();
        assert_eq!(store.meta().snapshot_count, 0);
        assert_eq!(store.meta().event_segment_count, 0);
        assert!(store.root().join("snapshots").is_dir());
        assert!(store.root().join("events").is_dir());
        assert!(store.root().join("integrity").is_dir());
        assert!(store.root().join(META_FILE).is_file());
    }

    #[test]
    fn store_schema_version_recorded() {
        let tmp = tempfile::tempdir().unwrap();
        let store = CatalogStore::open(tmp.path().join("catalog")).unwrap();
        assert_eq!(store.meta().catalog_schema_version, CATALOG_SCHEMA_VERSION);
        assert_eq!(store.meta().event_schema_version, EVENT_SCHEMA_VERSION);
    }

    #[test]
    fn atomic_write_replaces_and_syncs_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join(META_FILE);
        write_atomic(&target, b"first").unwrap();
        write_atomic(&target, b"second").unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"second");
        assert!(!target.with_extension("tmp").exists());
        fsync_dir(&target).unwrap();
        // A bare file name has no directory component to sync.
        fsync_dir(Path::new(META_FILE)).unwrap();
    }

    #[test]
    fn reopen_reproduces_catalog() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog");

        let (first, before) = {
            let catalog = open_catalog(&path, ConflictPolicy::Merge).unwrap();
            let first = catalog.create(brake_pad()).unwrap();
            let second = catalog.create(Part::new("Rotor", "R1", 80.0)).unwrap();
            let mut cheaper = brake_pad();
            cheaper.price = 24.99;
            catalog.update(&first, cheaper).unwrap();
            catalog.delete(&second).unwrap();
            (first, catalog.image())
        };

        let catalog = open_catalog(&path, ConflictPolicy::Merge).unwrap();
        assert_eq!(catalog.image(), before);
        assert_eq!(catalog.get_version(&first, 1).unwrap().price, 29.99);
        assert_eq!(catalog.get(&first).unwrap().price, 24.99);
        // Deleted identifiers stay retired across restarts.
        assert_eq!(
            catalog.create(Part::new("Wiper", "W1", 9.0)).unwrap(),
            PartId::from_sequence(3)
        );
    }

    #[test]
    fn one_segment_per_mutation() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog");
        {
            let catalog = open_catalog(&path, ConflictPolicy::ReplaceChain).unwrap();
            catalog.create(brake_pad()).unwrap();
            catalog.create(brake_pad()).unwrap();
        }
        let store = CatalogStore::open(&path).unwrap();
        assert_eq!(store.meta().event_segment_count, 2);
        let recovered = store.recover().unwrap();
        // create, then delete+create from the replacing batch
        assert_eq!(recovered.events.len(), 3);
    }

    #[test]
    fn checkpoint_then_replay_tail() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog");
        let id = {
            let catalog = open_catalog(&path, ConflictPolicy::Merge).unwrap();
            let id = catalog.create(brake_pad()).unwrap();
            catalog.checkpoint().unwrap();
            catalog.update(&id, Part::new("Brake Pad", "BP100", 19.99)).unwrap();
            id
        };

        let store = CatalogStore::open(&path).unwrap();
        assert_eq!(store.meta().snapshot_count, 1);
        let recovered = store.recover().unwrap();
        assert!(recovered.image.is_some());
        assert_eq!(recovered.events.len(), 1);

        let catalog = open_catalog(&path, ConflictPolicy::Merge).unwrap();
        assert_eq!(catalog.list_versions(&id).unwrap().len(), 2);
        assert_eq!(catalog.get(&id).unwrap().price, 19.99);
    }

    #[test]
    fn store_integrity_verification() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog");
        {
            let catalog = open_catalog(&path, ConflictPolicy::Merge).unwrap();
            catalog.create(brake_pad()).unwrap();
            catalog.checkpoint().unwrap();
        }
        let store = CatalogStore::open(&path).unwrap();
        assert_eq!(store.manifest().entries.len(), 2);
        store.verify_integrity().unwrap();
    }

    #[test]
    fn store_integrity_fail_closed_on_corruption() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog");
        {
            let catalog = open_catalog(&path, ConflictPolicy::Merge).unwrap();
            catalog.create(brake_pad()).unwrap();
        }

        // Corrupt the segment file
        let seg_path = path.join("events").join("000001.log.cbor.zst");
        let mut data = std::fs::read(&seg_path).unwrap();
        if let Some(byte) = data.last_mut() {
            *byte ^= 0xff;
        }
        std::fs::write(&seg_path, &data).unwrap();

        let store = CatalogStore::open(&path).unwrap();
        assert!(store.verify_integrity().is_err());
        assert!(matches!(
            store.recover(),
            Err(PersistError::IntegrityMismatch { .. })
        ));
        assert!(open_catalog(&path, ConflictPolicy::Merge).is_err());
    }

    #[test]
    fn uncounted_segment_is_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog");
        {
            let catalog = open_catalog(&path, ConflictPolicy::Merge).unwrap();
            catalog.create(brake_pad()).unwrap();
        }
        // A segment that never reached the commit point.
        std::fs::write(path.join("events").join("000002.log.cbor.zst"), b"torn").unwrap();

        let catalog = open_catalog(&path, ConflictPolicy::Merge).unwrap();
        assert_eq!(catalog.list_current().len(), 1);
        // The next mutation takes over segment 2.
        catalog.create(Part::new("Rotor", "R1", 80.0)).unwrap();
        drop(catalog);

        let store = CatalogStore::open(&path).unwrap();
        store.verify_integrity().unwrap();
        assert_eq!(store.recover().unwrap().events.len(), 2);
    }

    #[test]
    fn uncommitted_manifest_entry_is_dropped_on_open() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog");
        {
            let mut store = CatalogStore::open(&path).unwrap();
            store
                .append_events(&[CatalogEvent::Deleted {
                    id: PartId::from_sequence(1),
                }])
                .unwrap();
            // Simulate a crash after the manifest write but before meta.
            store.manifest.entries.push(ManifestEntry {
                filename: segment_name(2),
                sha256: "feed".into(),
                prev_hash: store.manifest.entries.last().map(|e| e.sha256.clone()),
            });
            store.save_manifest().unwrap();
        }
        let store = CatalogStore::open(&path).unwrap();
        assert_eq!(store.manifest().entries.len(), 1);
        store.verify_integrity().unwrap();
    }

    #[test]
    fn missing_segment_fail_closed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog");
        {
            let catalog = open_catalog(&path, ConflictPolicy::Merge).unwrap();
            catalog.create(brake_pad()).unwrap();
        }
        std::fs::remove_file(path.join("events").join(segment_name(1))).unwrap();

        let store = CatalogStore::open(&path).unwrap();
        assert!(matches!(
            store.recover(),
            Err(PersistError::MissingSegment(name)) if name == segment_name(1)
        ));
    }

    #[test]
    fn schema_mismatch_fail_closed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog");

        let _store = CatalogStore::open(&path).unwrap();

        // Tamper with the meta file to have a wrong version
        let meta_path = path.join(META_FILE);
        let mut meta: CatalogMeta =
            serde_json::from_reader(File::open(&meta_path).unwrap()).unwrap();
        meta.catalog_schema_version = 999;
        serde_json::to_writer_pretty(File::create(&meta_path).unwrap(), &meta).unwrap();

        match CatalogStore::open(&path) {
            Err(PersistError::SchemaMismatch {
                file_version,
                expected_version,
            }) => {
                assert_eq!(file_version, 999);
                assert_eq!(expected_version, CATALOG_SCHEMA_VERSION);
            }
            Err(e) => panic!("expected SchemaMismatch, got: {e}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }
}
