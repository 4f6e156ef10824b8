//! Per-floor rotation persistence.
//!
//! Rotations are stored as plain integer degrees under the key
//! `rot:<floor id>`. A stored value that is not one of 0, 90, 180 or 270 reads
//! back as 0; entries for floors that no longer exist are simply never read.

use crate::error::OrientationError;
use crate::rotation::Rotation;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key under which a floor's rotation is stored.
pub fn orientation_key(floor_id: &str) -> String {
    format!("rot:{floor_id}")
}

/// Key-value backing for per-floor rotations.
pub trait OrientationStore {
    /// Raw stored degrees for `key`, if any.
    fn get_raw(&self, key: &str) -> Option<i64>;

    fn set_raw(&mut self, key: &str, degrees: i64) -> Result<(), OrientationError>;

    /// Rotation remembered for `floor_id`, defaulting to 0°.
    fn rotation(&self, floor_id: &str) -> Rotation {
        self.get_raw(&orientation_key(floor_id))
            .and_then(Rotation::from_degrees)
            .unwrap_or_default()
    }

    fn set_rotation(&mut self, floor_id: &str, rotation: Rotation) -> Result<(), OrientationError> {
        self.set_raw(&orientation_key(floor_id), rotation.degrees())
    }
}

/// Orientation store that lives only as long as the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryOrientationStore {
    entries: BTreeMap<String, i64>,
}

impl MemoryOrientationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrientationStore for MemoryOrientationStore {
    fn get_raw(&self, key: &str) -> Option<i64> {
        self.entries.get(key).copied()
    }

    fn set_raw(&mut self, key: &str, degrees: i64) -> Result<(), OrientationError> {
        self.entries.insert(key.to_owned(), degrees);
        Ok(())
    }
}

/// Orientation store persisted as a RON map, rewritten on every change.
#[derive(Debug)]
pub struct RonOrientationStore {
    path: PathBuf,
    entries: BTreeMap<String, i64>,
}

impl RonOrientationStore {
    /// Default location: `<config dir>/floor-map/orientations.ron`.
    pub fn default_path() -> Result<PathBuf, OrientationError> {
        let dir = dirs::config_dir().ok_or(OrientationError::NoConfigDir)?;
        Ok(dir.join("floor-map").join("orientations.ron"))
    }

    /// Opens the store at `path`. A missing file starts out empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, OrientationError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => ron::from_str(&text)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        log::debug!(
            "Loaded {} floor orientations from {}",
            entries.len(),
            path.display()
        );
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), OrientationError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = ron::ser::to_string_pretty(&self.entries, ron::ser::PrettyConfig::default())?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl OrientationStore for RonOrientationStore {
    fn get_raw(&self, key: &str) -> Option<i64> {
        self.entries.get(key).copied()
    }

    fn set_raw(&mut self, key: &str, degrees: i64) -> Result<(), OrientationError> {
        self.entries.insert(key.to_owned(), degrees);
        log::debug!("Saving orientation {key} = {degrees}");
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_floor_defaults_to_zero() {
        let store = MemoryOrientationStore::new();
        assert_eq!(store.rotation("lobby"), Rotation::Deg0);
    }

    #[test]
    fn rotation_round_trips_per_floor() {
        let mut store = MemoryOrientationStore::new();
        store.set_rotation("a", Rotation::Deg90).unwrap();
        store.set_rotation("b", Rotation::Deg270).unwrap();
        assert_eq!(store.rotation("a"), Rotation::Deg90);
        assert_eq!(store.rotation("b"), Rotation::Deg270);
        assert_eq!(store.get_raw("rot:b"), Some(270));
    }

    #[test]
    fn invalid_stored_value_reads_as_zero() {
        let mut store = MemoryOrientationStore::new();
        store.set_raw("rot:a", 45).unwrap();
        store.set_raw("rot:b", 360).unwrap();
        store.set_raw("rot:c", -90).unwrap();
        assert_eq!(store.rotation("a"), Rotation::Deg0);
        assert_eq!(store.rotation("b"), Rotation::Deg0);
        assert_eq!(store.rotation("c"), Rotation::Deg0);
    }

    #[test]
    fn ron_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("orientations.ron");

        let mut store = RonOrientationStore::open(&path).unwrap();
        assert_eq!(store.rotation("main"), Rotation::Deg0);
        store.set_rotation("main", Rotation::Deg180).unwrap();

        let reopened = RonOrientationStore::open(&path).unwrap();
        assert_eq!(reopened.rotation("main"), Rotation::Deg180);
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn ron_store_reads_hand_edited_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orientations.ron");
        fs::write(&path, r#"{"rot:main": 270, "rot:annex": 30}"#).unwrap();

        let store = RonOrientationStore::open(&path).unwrap();
        assert_eq!(store.rotation("main"), Rotation::Deg270);
        assert_eq!(store.rotation("annex"), Rotation::Deg0);
    }

    #[test]
    fn ron_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orientations.ron");
        fs::write(&path, "not ron at all {").unwrap();
        assert!(matches!(
            RonOrientationStore::open(&path),
            Err(OrientationError::Parse(_))
        ));
    }
}
