//! Ledger persistence layer
//!
//! Saves and loads the whole ledger snapshot as one JSON document. A save
//! writes a temporary file, syncs it and renames it over the previous
//! snapshot, so a failed save leaves the old snapshot authoritative.

use crate::core::{LedgerError, LedgerState};
use log::{debug, info, warn};
use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("No ledger found at {0}; run `bfc init` first")]
    NotFound(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub ledger_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".bfc_data"),
            ledger_file: "ledger.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

/// Ledger storage manager
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    /// Create a new storage manager
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    /// Directory holding the snapshot and its backups
    pub fn data_dir(&self) -> &std::path::Path {
        &self.config.data_dir
    }

    /// Get the ledger file path
    fn ledger_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.ledger_file)
    }

    /// Get a backup file path
    fn backup_path(&self, index: usize) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.ledger_file, index))
    }

    /// Save the ledger to disk
    pub fn save(&self, state: &LedgerState) -> Result<(), StorageError> {
        let path = self.ledger_path();

        if self.config.backup_enabled && self.config.max_backups > 0 && path.exists() {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        // Write to temporary file first
        let temp_path = self
            .config
            .data_dir
            .join(format!("{}.tmp", self.config.ledger_file));
        let file = fs::File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, state)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;

        // Atomic rename
        fs::rename(&temp_path, &path)?;

        debug!("Saved ledger at height {} to {}", state.height(), path.display());
        Ok(())
    }

    /// Load the ledger from disk
    pub fn load(&self) -> Result<LedgerState, StorageError> {
        let path = self.ledger_path();

        if !path.exists() {
            return Err(StorageError::NotFound(path.display().to_string()));
        }

        let file = fs::File::open(&path)?;
        let state: LedgerState = serde_json::from_reader(BufReader::new(file))?;

        if !state.tip.verify_hash() {
            return Err(StorageError::InvalidData(format!(
                "tip hash {} does not match its header",
                state.tip.hash
            )));
        }
        Ok(state)
    }

    /// Check if a saved ledger exists
    pub fn exists(&self) -> bool {
        self.ledger_path().exists()
    }

    /// Run `op` on `state` and persist the result. If `op` or the save
    /// fails, `state` is restored to what it was before the call.
    pub fn commit<T, F>(&self, state: &mut LedgerState, op: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut LedgerState) -> Result<T, LedgerError>,
    {
        let snapshot = state.clone();

        let value = match op(state) {
            Ok(value) => value,
            Err(e) => {
                *state = snapshot;
                return Err(e);
            }
        };

        if let Err(e) = self.save(state) {
            warn!("Save failed, rolling back to height {}: {}", snapshot.height(), e);
            *state = snapshot;
            return Err(LedgerError::PersistenceFailure(e));
        }
        Ok(value)
    }

    /// Rotate backup files
    fn rotate_backups(&self) -> Result<(), StorageError> {
        // Delete oldest backup
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        // Shift existing backups
        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                fs::rename(&current, self.backup_path(i + 1))?;
            }
        }

        Ok(())
    }

    /// Restore a backup over the current snapshot and return it
    pub fn restore_backup(&self, backup_index: usize) -> Result<LedgerState, StorageError> {
        let backup_path = self.backup_path(backup_index);

        if !backup_path.exists() {
            return Err(StorageError::NotFound(backup_path.display().to_string()));
        }

        let file = fs::File::open(&backup_path)?;
        let state: LedgerState = serde_json::from_reader(BufReader::new(file))?;
        self.save(&state)?;

        info!("Restored ledger backup {} (height {})", backup_index, state.height());
        Ok(state)
    }

    /// List available backups
    pub fn list_backups(&self) -> Vec<usize> {
        (0..self.config.max_backups)
            .filter(|i| self.backup_path(*i).exists())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ChainParams;
    use crate::mining::BlockAssembler;

    fn storage_in(dir: &std::path::Path, max_backups: usize) -> Storage {
        Storage::new(StorageConfig {
            data_dir: dir.to_path_buf(),
            max_backups,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_save_load_ledger() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage_in(temp_dir.path(), 5);
        let mut state = LedgerState::genesis(ChainParams::default());
        BlockAssembler::new("BFCminer").assemble(&mut state).unwrap();

        assert!(!storage.exists());
        storage.save(&state).unwrap();
        assert!(storage.exists());

        let loaded = storage.load().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_missing_ledger_is_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage_in(temp_dir.path(), 5);
        assert!(matches!(storage.load(), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_tampered_tip_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage_in(temp_dir.path(), 5);
        let mut state = LedgerState::genesis(ChainParams::default());
        state.tip.header.nonce = 7;
        storage.save(&state).unwrap();

        assert!(matches!(storage.load(), Err(StorageError::InvalidData(_))));
    }

    #[test]
    fn test_backup_rotation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage_in(temp_dir.path(), 3);
        let mut state = LedgerState::genesis(ChainParams::default());

        for _ in 0..5 {
            storage.save(&state).unwrap();
            BlockAssembler::new("BFCminer").assemble(&mut state).unwrap();
        }

        assert_eq!(storage.list_backups(), vec![0, 1, 2]);
        let restored = storage.restore_backup(0).unwrap();
        assert_eq!(restored.height(), 3);
        assert_eq!(storage.load().unwrap().height(), 3);
    }

    #[test]
    fn test_commit_persists_on_success() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage_in(temp_dir.path(), 0);
        let mut state = LedgerState::genesis(ChainParams::default());

        let height = storage
            .commit(&mut state, |s| {
                BlockAssembler::new("BFCminer")
                    .assemble(s)
                    .map(|(block, _)| block.height)
            })
            .unwrap();

        assert_eq!(height, 1);
        assert_eq!(storage.load().unwrap(), state);
    }

    #[test]
    fn test_commit_rolls_back_failed_operation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage_in(temp_dir.path(), 0);
        let mut state = LedgerState::genesis(ChainParams::default());
        let before = state.clone();

        let result: Result<(), LedgerError> = storage.commit(&mut state, |s| {
            BlockAssembler::new("BFCminer").assemble(s)?;
            Err(LedgerError::InvalidTransaction("abort".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(state, before);
        assert!(!storage.exists());
    }

    #[test]
    fn test_commit_rolls_back_failed_save() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = storage_in(temp_dir.path(), 0);
        let mut state = LedgerState::genesis(ChainParams::default());
        storage.save(&state).unwrap();
        let before = state.clone();

        // A directory where the temp file should go makes the save fail
        fs::create_dir(temp_dir.path().join("ledger.json.tmp")).unwrap();

        let result = storage.commit(&mut state, |s| {
            BlockAssembler::new("BFCminer").assemble(s).map(|_| ())
        });

        assert!(matches!(result, Err(LedgerError::PersistenceFailure(_))));
        assert_eq!(state, before);
        assert_eq!(storage.load().unwrap(), before);
    }
}
