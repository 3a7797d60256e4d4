use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::Utc;
use serde_json::Value;

use crate::{core::utils::ensure_dir, errors::StoreError};

use super::{DocumentStore, Result, WriteGuard};

const COLLECTION_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%6f";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// Filesystem-backed store keeping one JSON array file per collection.
///
/// Every write first copies the previous file into `backups/<collection>/` and
/// prunes that directory down to the configured retention.
pub struct JsonStorage {
    collections_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
    write_lock: Mutex<()>,
    exclusive: Mutex<()>,
}

impl JsonStorage {
    pub fn new(root: PathBuf, retention: Option<usize>) -> Result<Self> {
        ensure_dir(&root)?;
        let collections_dir = root.join("collections");
        let backups_dir = root.join("backups");
        ensure_dir(&collections_dir)?;
        ensure_dir(&backups_dir)?;
        tracing::info!(root = %root.display(), "opened JSON entity store");
        Ok(Self {
            collections_dir,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
            write_lock: Mutex::new(()),
            exclusive: Mutex::new(()),
        })
    }

    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.collections_dir.join(format!(
            "{}.{}",
            canonical_name(collection),
            COLLECTION_EXTENSION
        ))
    }

    fn backup_dir(&self, collection: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(collection))
    }

    /// Lists backup files for a collection, newest first.
    pub fn list_backups(&self, collection: &str) -> Result<Vec<PathBuf>> {
        let dir = self.backup_dir(collection);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some(COLLECTION_EXTENSION) {
                entries.push(path);
            }
        }
        // Timestamped names sort chronologically.
        entries.sort_by_key(|path| Reverse(path.file_name().map(|name| name.to_os_string())));
        Ok(entries)
    }

    /// Restores a collection from one of its backup files.
    pub fn restore_backup(&self, collection: &str, backup: &Path) -> Result<Vec<Value>> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let documents = read_documents(backup)?;
        write_documents(&self.collection_path(collection), &documents)?;
        tracing::info!(collection, backup = %backup.display(), "restored collection");
        Ok(documents)
    }

    fn backup_existing_file(&self, collection: &str, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(collection);
        ensure_dir(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let file_name = format!(
            "{}_{}.{}",
            canonical_name(collection),
            timestamp,
            COLLECTION_EXTENSION
        );
        fs::copy(path, dir.join(file_name))?;
        self.prune_backups(collection)
    }

    fn prune_backups(&self, collection: &str) -> Result<()> {
        for stale in self.list_backups(collection)?.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&stale) {
                tracing::warn!(path = %stale.display(), error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl DocumentStore for JsonStorage {
    fn load(&self, collection: &str) -> Result<Vec<Value>> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        read_documents(&self.collection_path(collection))
    }

    fn modify(
        &self,
        collection: &str,
        apply: &mut dyn FnMut(&mut Vec<Value>) -> Result<()>,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let path = self.collection_path(collection);
        let mut documents = read_documents(&path)?;
        let before = documents.clone();
        apply(&mut documents)?;
        if documents == before {
            tracing::debug!(collection, "collection unchanged; skipping write");
            return Ok(());
        }
        self.backup_existing_file(collection, &path)?;
        write_documents(&path, &documents)
    }

    fn exclusive(&self) -> Result<WriteGuard<'_>> {
        self.exclusive.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn read_documents(path: &Path) -> Result<Vec<Value>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = fs::read_to_string(path)?;
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&data)?)
}

fn write_documents(path: &Path, documents: &[Value]) -> Result<()> {
    let json = serde_json::to_string_pretty(documents)?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "collection".into()
    } else {
        sanitized
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
