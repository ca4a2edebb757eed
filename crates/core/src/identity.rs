//! Persona snapshots — who the companion is for a given user.
//!
//! An [`IdentitySnapshot`] is an immutable value object owned by the
//! identity subsystem; the turn pipeline only reads it. When resolution
//! fails or times out, the process-wide [`MINIMAL_SKELETON_IDENTITY`] is
//! substituted instead — constructed once at startup, shared read-only,
//! never mutated.

use crate::error::IdentityError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

/// A point-in-time persona for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentitySnapshot {
    /// The companion's name as this user knows it.
    pub name: String,

    /// The role it plays (assistant, tutor, planning partner, ...).
    pub role: String,

    /// Core values, rendered comma-separated into the prompt.
    #[serde(default)]
    pub core_values: Vec<String>,

    /// Communication style description.
    pub communication_style: String,

    /// Declared expertise domains; also handed to memory recall for
    /// domain-boosted scoring.
    #[serde(default)]
    pub expertise_domains: Vec<String>,

    /// Behavioral invariants that must hold regardless of mood or memory.
    pub invariants: String,

    /// Snapshot version, echoed back in the turn result.
    pub version: String,
}

impl IdentitySnapshot {
    /// Render the fixed field-per-line block used for the persona section
    /// of the prompt.
    pub fn prompt_block(&self) -> String {
        format!(
            "Name: {}\nRole: {}\nCore Values: {}\nCommunication: {}\nExpertise: {}\nInvariants: {}",
            self.name,
            self.role,
            self.core_values.join(", "),
            self.communication_style,
            self.expertise_domains.join(", "),
            self.invariants,
        )
    }
}

/// The minimal safe persona used whenever identity resolution is
/// unavailable. Read-only shared reference; do not mutate.
pub static MINIMAL_SKELETON_IDENTITY: LazyLock<IdentitySnapshot> =
    LazyLock::new(|| IdentitySnapshot {
        name: "Kindred".into(),
        role: "general-purpose companion".into(),
        core_values: vec!["honesty".into(), "care".into()],
        communication_style: "plain, warm, concise".into(),
        expertise_domains: vec![],
        invariants: "Stay helpful and safe; never invent facts about the user.".into(),
        version: "skeleton-1".into(),
    });

/// The identity collaborator contract.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// A human-readable name for this store (e.g. "file", "static").
    fn name(&self) -> &str;

    /// Resolve the persona snapshot for `user_id`.
    async fn resolve(&self, user_id: &str) -> std::result::Result<IdentitySnapshot, IdentityError>;
}

/// An identity store that always returns one fixed snapshot.
///
/// Useful for single-persona deployments and tests.
pub struct StaticIdentityStore {
    snapshot: IdentitySnapshot,
}

impl StaticIdentityStore {
    pub fn new(snapshot: IdentitySnapshot) -> Self {
        Self { snapshot }
    }

    /// A store that serves the skeleton persona to everyone.
    pub fn skeleton() -> Self {
        Self::new(MINIMAL_SKELETON_IDENTITY.clone())
    }
}

#[async_trait]
impl IdentityStore for StaticIdentityStore {
    fn name(&self) -> &str {
        "static"
    }

    async fn resolve(&self, _user_id: &str) -> std::result::Result<IdentitySnapshot, IdentityError> {
        Ok(self.snapshot.clone())
    }
}

/// An identity store backed by per-user JSON snapshot files.
///
/// Reads `<dir>/<user_id>.json`. Missing files resolve to
/// [`IdentityError::NotFound`]; unparseable files to
/// [`IdentityError::Malformed`]. User ids containing path separators are
/// rejected before touching the filesystem.
pub struct FileIdentityStore {
    dir: PathBuf,
}

impl FileIdentityStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn snapshot_path(&self, user_id: &str) -> std::result::Result<PathBuf, IdentityError> {
        if user_id.is_empty()
            || user_id.contains(['/', '\\'])
            || user_id.contains("..")
            || user_id.starts_with('.')
        {
            return Err(IdentityError::InvalidUserId(user_id.to_string()));
        }
        Ok(self.dir.join(format!("{user_id}.json")))
    }

    /// The directory this store reads from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl IdentityStore for FileIdentityStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn resolve(&self, user_id: &str) -> std::result::Result<IdentitySnapshot, IdentityError> {
        let path = self.snapshot_path(user_id)?;

        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(IdentityError::NotFound(user_id.to_string()));
            }
            Err(e) => return Err(IdentityError::Storage(e.to_string())),
        };

        let snapshot: IdentitySnapshot =
            serde_json::from_str(&raw).map_err(|e| IdentityError::Malformed(e.to_string()))?;

        debug!(user_id, version = %snapshot.version, "Resolved identity snapshot from file");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> IdentitySnapshot {
        IdentitySnapshot {
            name: "Wren".into(),
            role: "writing partner".into(),
            core_values: vec!["curiosity".into(), "candor".into()],
            communication_style: "playful but precise".into(),
            expertise_domains: vec!["fiction".into(), "poetry".into()],
            invariants: "Never ghostwrite exams.".into(),
            version: "v7".into(),
        }
    }

    #[test]
    fn prompt_block_renders_every_field() {
        let block = sample_snapshot().prompt_block();
        assert!(block.contains("Name: Wren"));
        assert!(block.contains("Role: writing partner"));
        assert!(block.contains("Core Values: curiosity, candor"));
        assert!(block.contains("Communication: playful but precise"));
        assert!(block.contains("Expertise: fiction, poetry"));
        assert!(block.contains("Invariants: Never ghostwrite exams."));
    }

    #[test]
    fn skeleton_identity_is_complete() {
        let skeleton = &*MINIMAL_SKELETON_IDENTITY;
        assert_eq!(skeleton.version, "skeleton-1");
        assert!(!skeleton.name.is_empty());
        assert!(!skeleton.invariants.is_empty());
        // Safe default: no claimed expertise.
        assert!(skeleton.expertise_domains.is_empty());
    }

    #[tokio::test]
    async fn static_store_returns_fixed_snapshot() {
        let store = StaticIdentityStore::new(sample_snapshot());
        let resolved = store.resolve("anyone").await.unwrap();
        assert_eq!(resolved.version, "v7");
    }

    #[tokio::test]
    async fn file_store_roundtrips_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        let snapshot = sample_snapshot();
        std::fs::write(
            tmp.path().join("alice.json"),
            serde_json::to_string(&snapshot).unwrap(),
        )
        .unwrap();

        let store = FileIdentityStore::new(tmp.path());
        let resolved = store.resolve("alice").await.unwrap();
        assert_eq!(resolved, snapshot);
    }

    #[tokio::test]
    async fn file_store_missing_user_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileIdentityStore::new(tmp.path());
        match store.resolve("nobody").await {
            Err(IdentityError::NotFound(user)) => assert_eq!(user, "nobody"),
            other => panic!("Expected NotFound, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn file_store_rejects_traversal_user_ids() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileIdentityStore::new(tmp.path());
        for bad in ["../etc/passwd", "a/b", "", ".hidden"] {
            match store.resolve(bad).await {
                Err(IdentityError::InvalidUserId(_)) => {}
                other => panic!("Expected InvalidUserId for {bad:?}, got: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn file_store_malformed_json_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("bob.json"), "{not json").unwrap();
        let store = FileIdentityStore::new(tmp.path());
        match store.resolve("bob").await {
            Err(IdentityError::Malformed(_)) => {}
            other => panic!("Expected Malformed, got: {other:?}"),
        }
    }
}
