//! Persistence of fitted model bundles
//!
//! A [`ModelStore`] holds one opaque artifact per [`ModelKind`]. Typed access
//! goes through [`store_bundle`] and [`load_or_none`], which wrap the bundle in
//! a versioned JSON envelope:
//!
//! ```json
//! { "formatVersion": 1, "kind": "churn", "trainedAt": "...", "bundle": { ... } }
//! ```

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::pipeline::ModelKind;
use crate::report::TrainingReport;

/// Envelope format written by this version of the crate
pub const FORMAT_VERSION: u32 = 1;

/// Byte-level storage for one bundle per model
pub trait ModelStore: Send + Sync {
    /// Replace the artifact for `kind`
    fn put(&self, kind: ModelKind, bytes: &[u8]) -> Result<()>;

    /// Read the artifact for `kind`, `None` if nothing has been stored
    fn get(&self, kind: ModelKind) -> Result<Option<Vec<u8>>>;

    fn contains(&self, kind: ModelKind) -> bool;

    /// Human-readable location of the artifact, for messages
    fn location(&self, kind: ModelKind) -> String;
}

/// A fitted pipeline that can be persisted
pub trait Bundle: Serialize + DeserializeOwned {
    const KIND: ModelKind;

    fn trained_at(&self) -> DateTime<Utc>;

    fn report(&self) -> &TrainingReport;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeOut<'a, B> {
    format_version: u32,
    kind: ModelKind,
    trained_at: DateTime<Utc>,
    bundle: &'a B,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeHeader {
    format_version: u32,
    kind: ModelKind,
    trained_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct EnvelopeBody<B> {
    bundle: B,
}

#[derive(Deserialize)]
struct ReportOnly {
    report: TrainingReport,
}

/// What `status` knows about a stored bundle without loading its estimators
#[derive(Debug, Clone)]
pub struct BundleInfo {
    pub kind: ModelKind,
    pub location: String,
    pub trained_at: DateTime<Utc>,
    pub report: TrainingReport,
}

/// Serialize `bundle` and write it to its slot in `store`
pub fn store_bundle<B: Bundle>(store: &dyn ModelStore, bundle: &B) -> Result<()> {
    let envelope = EnvelopeOut {
        format_version: FORMAT_VERSION,
        kind: B::KIND,
        trained_at: bundle.trained_at(),
        bundle,
    };
    let bytes = serde_json::to_vec(&envelope)?;
    store.put(B::KIND, &bytes)
}

/// Load the bundle for `B::KIND`, or `None` if none has been stored.
///
/// A stored artifact that cannot be decoded is an error.
pub fn load_or_none<B: Bundle>(store: &dyn ModelStore) -> Result<Option<B>> {
    let Some(bytes) = store.get(B::KIND)? else {
        return Ok(None);
    };
    check_header(store, B::KIND, &bytes)?;

    let body: EnvelopeBody<B> =
        serde_json::from_slice(&bytes).map_err(|e| corrupt(store, B::KIND, e.to_string()))?;
    Ok(Some(body.bundle))
}

/// Read envelope metadata and the training report for `kind`
pub fn bundle_info(store: &dyn ModelStore, kind: ModelKind) -> Result<Option<BundleInfo>> {
    let Some(bytes) = store.get(kind)? else {
        return Ok(None);
    };
    let header = check_header(store, kind, &bytes)?;

    let body: EnvelopeBody<ReportOnly> =
        serde_json::from_slice(&bytes).map_err(|e| corrupt(store, kind, e.to_string()))?;
    Ok(Some(BundleInfo {
        kind,
        location: store.location(kind),
        trained_at: header.trained_at,
        report: body.bundle.report,
    }))
}

fn check_header(store: &dyn ModelStore, kind: ModelKind, bytes: &[u8]) -> Result<EnvelopeHeader> {
    let header: EnvelopeHeader =
        serde_json::from_slice(bytes).map_err(|e| corrupt(store, kind, e.to_string()))?;

    if header.format_version != FORMAT_VERSION {
        return Err(corrupt(
            store,
            kind,
            format!("unsupported format version {}", header.format_version),
        ));
    }
    if header.kind != kind {
        return Err(corrupt(
            store,
            kind,
            format!("envelope holds a {} bundle", header.kind),
        ));
    }
    Ok(header)
}

fn corrupt(store: &dyn ModelStore, kind: ModelKind, message: String) -> ModelError {
    ModelError::CorruptBundle {
        kind,
        location: store.location(kind),
        message,
    }
}

/// Bundles as JSON files under a root directory
#[derive(Debug, Clone)]
pub struct FsModelStore {
    root: PathBuf,
}

impl FsModelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, kind: ModelKind) -> PathBuf {
        self.root.join(kind.bundle_file_name())
    }
}

impl ModelStore for FsModelStore {
    fn put(&self, kind: ModelKind, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(kind);
        let tmp = path.with_extension("json.tmp");

        // rename is atomic on the same filesystem
        let written = write_synced(&tmp, bytes).and_then(|()| fs::rename(&tmp, &path));
        if written.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        Ok(written?)
    }

    fn get(&self, kind: ModelKind) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(kind)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn contains(&self, kind: ModelKind) -> bool {
        self.path_for(kind).is_file()
    }

    fn location(&self, kind: ModelKind) -> String {
        self.path_for(kind).display().to_string()
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// In-process store, used by tests and embedders that do not want files
#[derive(Debug, Default)]
pub struct MemoryModelStore {
    slots: RwLock<HashMap<ModelKind, Vec<u8>>>,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelStore for MemoryModelStore {
    fn put(&self, kind: ModelKind, bytes: &[u8]) -> Result<()> {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        slots.insert(kind, bytes.to_vec());
        Ok(())
    }

    fn get(&self, kind: ModelKind) -> Result<Option<Vec<u8>>> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        Ok(slots.get(&kind).cloned())
    }

    fn contains(&self, kind: ModelKind) -> bool {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots.contains_key(&kind)
    }

    fn location(&self, kind: ModelKind) -> String {
        format!("memory://{}", kind)
    }
}
