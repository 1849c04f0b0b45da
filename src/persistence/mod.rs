//! Save/load persistence
//!
//! Features:
//! - Versioned JSON snapshot (`schemaVersion`)
//! - Atomic replace through the storage backend
//! - Backup rotation (old good save → backup before overwrite)
//! - Corruption detection and fallback to the backup, then to defaults
//!
//! Failures are logged and reported as `false`/`None`; they never stop the game.

pub mod snapshot;

pub use snapshot::{Position, ProgressionSnapshot};

use thiserror::Error;

use crate::consts::{PROGRESS_BACKUP_KEY, PROGRESS_KEY, SCHEMA_VERSION, SETTINGS_KEY};
use crate::platform::{BlobStore, StorageError};
use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Could not encode save: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("Save data is unreadable: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("Save was written by a newer version (schema {found}, supported {supported})")]
    UnsupportedSchema { found: u32, supported: u32 },
}

/// Reads and writes the progress and settings blobs
#[derive(Debug)]
pub struct PersistenceGateway<S: BlobStore> {
    store: S,
}

impl<S: BlobStore> PersistenceGateway<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    // === Progress ===

    /// Write the snapshot, keeping the previous save as a backup.
    ///
    /// A previous save that is unreadable is not backed up; one written by a
    /// newer build is kept byte for byte.
    pub fn try_save(&mut self, snapshot: &ProgressionSnapshot) -> Result<(), PersistenceError> {
        let bytes = encode_snapshot(snapshot)?;

        if let Some(previous) = self.store.read(PROGRESS_KEY)? {
            match decode_snapshot(&previous) {
                Ok(_) | Err(PersistenceError::UnsupportedSchema { .. }) => {
                    self.store.write_atomic(PROGRESS_BACKUP_KEY, &previous)?;
                }
                Err(e) => log::warn!("Not backing up the previous save: {}", e),
            }
        }
        self.store.write_atomic(PROGRESS_KEY, &bytes)?;
        Ok(())
    }

    pub fn save(&mut self, snapshot: &ProgressionSnapshot) -> bool {
        match self.try_save(snapshot) {
            Ok(()) => {
                log::info!(
                    "Progress saved ({} coins, move {})",
                    snapshot.coins,
                    snapshot.completed_move_count
                );
                true
            }
            Err(e) => {
                log::warn!("Failed to save progress: {}", e);
                false
            }
        }
    }

    /// `Ok(None)` on first run
    pub fn try_load(&self) -> Result<Option<ProgressionSnapshot>, PersistenceError> {
        self.read_snapshot(PROGRESS_KEY)
    }

    /// Load the save, falling back to the backup if the main save is unreadable
    pub fn load(&self) -> Option<ProgressionSnapshot> {
        match self.try_load() {
            Ok(Some(snapshot)) => {
                log::info!("Loaded progress saved at {}", snapshot.saved_at);
                Some(snapshot)
            }
            Ok(None) => {
                log::info!("No saved progress found, starting fresh");
                None
            }
            Err(e) => {
                log::warn!("Failed to load progress: {}", e);
                match self.read_snapshot(PROGRESS_BACKUP_KEY) {
                    Ok(Some(snapshot)) => {
                        log::info!("Recovered progress from backup saved at {}", snapshot.saved_at);
                        Some(snapshot)
                    }
                    Ok(None) => None,
                    Err(e) => {
                        log::warn!("Backup is unreadable too: {}", e);
                        None
                    }
                }
            }
        }
    }

    /// Remove the save and its backup
    pub fn clear_progress(&mut self) -> bool {
        let result = self
            .store
            .remove(PROGRESS_KEY)
            .and_then(|()| self.store.remove(PROGRESS_BACKUP_KEY));
        match result {
            Ok(()) => {
                log::info!("Saved progress cleared");
                true
            }
            Err(e) => {
                log::warn!("Failed to clear saved progress: {}", e);
                false
            }
        }
    }

    fn read_snapshot(&self, key: &str) -> Result<Option<ProgressionSnapshot>, PersistenceError> {
        match self.store.read(key)? {
            Some(bytes) => decode_snapshot(&bytes).map(Some),
            None => Ok(None),
        }
    }

    // === Settings ===

    pub fn try_save_settings(&mut self, settings: &Settings) -> Result<(), PersistenceError> {
        let bytes = serde_json::to_vec_pretty(settings).map_err(PersistenceError::Encode)?;
        self.store.write_atomic(SETTINGS_KEY, &bytes)?;
        Ok(())
    }

    pub fn save_settings(&mut self, settings: &Settings) -> bool {
        match self.try_save_settings(settings) {
            Ok(()) => {
                log::debug!("Settings saved");
                true
            }
            Err(e) => {
                log::warn!("Failed to save settings: {}", e);
                false
            }
        }
    }

    /// Stored settings, or defaults when absent or unreadable
    pub fn load_settings(&self) -> Settings {
        let bytes = match self.store.read(SETTINGS_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                log::info!("Using default settings");
                return Settings::default();
            }
            Err(e) => {
                log::warn!("Failed to read settings: {}", e);
                return Settings::default();
            }
        };
        match serde_json::from_slice::<Settings>(&bytes) {
            Ok(mut settings) => {
                settings.economy.normalize();
                log::info!("Loaded settings");
                settings
            }
            Err(e) => {
                log::warn!("Settings are unreadable, using defaults: {}", e);
                Settings::default()
            }
        }
    }
}

/// JSON has no NaN or infinity, so such a snapshot would save fine and never load
fn encode_snapshot(snapshot: &ProgressionSnapshot) -> Result<Vec<u8>, PersistenceError> {
    if let Some(field) = snapshot.non_finite_position() {
        return Err(PersistenceError::Encode(serde::ser::Error::custom(format!(
            "non-finite coordinate in {field}"
        ))));
    }
    serde_json::to_vec_pretty(snapshot).map_err(PersistenceError::Encode)
}

fn decode_snapshot(bytes: &[u8]) -> Result<ProgressionSnapshot, PersistenceError> {
    let snapshot: ProgressionSnapshot =
        serde_json::from_slice(bytes).map_err(PersistenceError::Decode)?;
    if snapshot.schema_version > SCHEMA_VERSION {
        return Err(PersistenceError::UnsupportedSchema {
            found: snapshot.schema_version,
            supported: SCHEMA_VERSION,
        });
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{FileStore, MemoryStore};
    use crate::settings::EconomyField;
    use crate::sim::{GameState, InteractableId};
    use chrono::{TimeZone, Utc};
    use glam::Vec2;

    fn snapshot_with_coins(coins: i64) -> ProgressionSnapshot {
        let mut state = GameState::default_world();
        state.ledger.add_coins(coins);
        let when = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        ProgressionSnapshot::capture(&state, when)
    }

    #[test]
    fn test_first_run_loads_nothing() {
        let gateway = PersistenceGateway::new(MemoryStore::new());
        assert!(gateway.load().is_none());
        assert!(gateway.try_load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_is_identical() {
        let mut gateway = PersistenceGateway::new(MemoryStore::new());
        let snapshot = snapshot_with_coins(31);
        assert!(gateway.save(&snapshot));
        assert_eq!(gateway.load(), Some(snapshot));
    }

    #[test]
    fn test_file_backed_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut gateway = PersistenceGateway::new(FileStore::new(dir.path()));
        let snapshot = snapshot_with_coins(8);
        assert!(gateway.save(&snapshot));

        let reopened = PersistenceGateway::new(FileStore::new(dir.path()));
        assert_eq!(reopened.load(), Some(snapshot));
    }

    #[test]
    fn test_corrupt_save_falls_back_to_backup() {
        let mut gateway = PersistenceGateway::new(MemoryStore::new());
        let first = snapshot_with_coins(1);
        let second = snapshot_with_coins(2);
        gateway.save(&first);
        gateway.save(&second);

        gateway
            .store_mut()
            .write_atomic(PROGRESS_KEY, b"{ not json")
            .unwrap();
        assert!(matches!(gateway.try_load(), Err(PersistenceError::Decode(_))));
        assert_eq!(gateway.load(), Some(first));
    }

    #[test]
    fn test_corrupt_save_without_backup_is_none() {
        let mut store = MemoryStore::new();
        store.write_atomic(PROGRESS_KEY, b"\xff\xfe").unwrap();
        let gateway = PersistenceGateway::new(store);
        assert!(gateway.load().is_none());
    }

    #[test]
    fn test_corrupt_save_never_overwrites_backup() {
        let mut gateway = PersistenceGateway::new(MemoryStore::new());
        let good = snapshot_with_coins(5);
        gateway.save(&good);
        gateway.save(&good);
        gateway
            .store_mut()
            .write_atomic(PROGRESS_KEY, b"garbage")
            .unwrap();
        gateway.save(&snapshot_with_coins(6));

        let backup = gateway.read_snapshot(PROGRESS_BACKUP_KEY).unwrap();
        assert_eq!(backup, Some(good));
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let mut snapshot = snapshot_with_coins(3);
        snapshot.schema_version = SCHEMA_VERSION + 1;
        let mut gateway = PersistenceGateway::new(MemoryStore::new());
        gateway.save(&snapshot);
        assert!(matches!(
            gateway.try_load(),
            Err(PersistenceError::UnsupportedSchema { .. })
        ));
        assert!(gateway.load().is_none());
    }

    #[test]
    fn test_successful_save_always_loads() {
        let mut gateway = PersistenceGateway::new(MemoryStore::new());
        let good = snapshot_with_coins(4);
        assert!(gateway.save(&good));

        let mut lost = GameState::default_world();
        lost.player.pos = Vec2::new(f32::NAN, 3.0);
        let mut far = GameState::default_world();
        far.player.pos = Vec2::new(0.0, f32::INFINITY);
        let when = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let mut broken_goat = ProgressionSnapshot::capture(&GameState::default_world(), when);
        broken_goat.interactable_positions_by_id.insert(
            InteractableId::from("goat_0"),
            Position {
                x: f32::NAN,
                y: f32::NAN,
            },
        );

        let snapshots = [
            ProgressionSnapshot::capture(&lost, when),
            ProgressionSnapshot::capture(&far, when),
            broken_goat,
            ProgressionSnapshot::capture(&GameState::default_world(), when),
        ];
        for snapshot in snapshots {
            let finite = snapshot.non_finite_position().is_none();
            assert_eq!(gateway.save(&snapshot), finite);
            let loaded = gateway.try_load().unwrap();
            if finite {
                assert_eq!(loaded, Some(snapshot));
            } else {
                assert!(matches!(
                    gateway.try_save(&snapshot),
                    Err(PersistenceError::Encode(_))
                ));
                assert_eq!(loaded, Some(good.clone()));
            }
        }
        // Nothing unreadable ever reached the backup slot either
        assert!(gateway.read_snapshot(PROGRESS_BACKUP_KEY).is_ok());
    }

    #[test]
    fn test_rejected_save_keeps_previous() {
        let mut gateway = PersistenceGateway::new(MemoryStore::new());
        let good = snapshot_with_coins(9);
        gateway.save(&good);

        let mut state = GameState::default_world();
        state.player.pos = Vec2::new(f32::NAN, 0.0);
        assert!(!gateway.save(&ProgressionSnapshot::capture(&state, Utc::now())));
        assert_eq!(gateway.load(), Some(good));
    }

    #[test]
    fn test_newer_schema_save_is_backed_up_raw() {
        let mut newer = snapshot_with_coins(70);
        newer.schema_version = SCHEMA_VERSION + 1;
        let newer_bytes = serde_json::to_vec(&newer).unwrap();
        let mut store = MemoryStore::new();
        store.write_atomic(PROGRESS_KEY, &newer_bytes).unwrap();

        let mut gateway = PersistenceGateway::new(store);
        assert!(gateway.save(&snapshot_with_coins(1)));
        assert_eq!(
            gateway.store().read(PROGRESS_BACKUP_KEY).unwrap(),
            Some(newer_bytes)
        );
    }

    #[test]
    fn test_clear_progress() {
        let mut gateway = PersistenceGateway::new(MemoryStore::new());
        gateway.save(&snapshot_with_coins(1));
        gateway.save(&snapshot_with_coins(2));
        assert!(gateway.clear_progress());
        assert!(gateway.store().is_empty());
        assert!(gateway.load().is_none());
    }

    #[test]
    fn test_settings_round_trip_and_fallback() {
        let mut gateway = PersistenceGateway::new(MemoryStore::new());
        assert_eq!(gateway.load_settings(), Settings::default());

        let mut settings = Settings::default();
        settings.economy.set(EconomyField::GoatReward, 12);
        settings.quiz_stats.record("Mathematics", 5, 3);
        assert!(gateway.save_settings(&settings));
        assert_eq!(gateway.load_settings(), settings);

        gateway
            .store_mut()
            .write_atomic(SETTINGS_KEY, b"[1,2,3]")
            .unwrap();
        assert_eq!(gateway.load_settings(), Settings::default());
    }

    #[test]
    fn test_failed_write_reports_false() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let mut gateway = PersistenceGateway::new(FileStore::new(&blocker));
        assert!(!gateway.save(&snapshot_with_coins(1)));
        assert!(!gateway.save_settings(&Settings::default()));
    }
}
