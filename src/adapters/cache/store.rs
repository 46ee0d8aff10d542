//! On-disk cache store
//!
//! Maps a `(category, key)` pair to one CSV file under the cache root. The
//! store owns this subtree: parsers never write into it directly.
//!
//! A category counts as cached only when its folder holds **more than one**
//! file, so a freshly scaffolded folder with a stray placeholder is not taken
//! for a populated one. The only invalidation is [`CacheStore::delete_all`].

use super::category::CacheCategory;
use super::codec;
use crate::adapters::export::layout::{stem_of, visible_files};
use crate::domain::{CacheError, Result, Table};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File extension of cached tables
const TABLE_EXTENSION: &str = "csv";

/// Name of the cache info file
pub const CACHE_INFO_FILE: &str = "cache.json";

/// Format of [`CacheInfo::last_updated`]
pub const LAST_UPDATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Contents of `cache.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheInfo {
    /// Local time of the last successful ingestion
    pub last_updated: String,
}

impl CacheInfo {
    /// Info stamped with the current local time
    pub fn now() -> Self {
        Self {
            last_updated: Local::now().format(LAST_UPDATED_FORMAT).to_string(),
        }
    }

    /// Parsed timestamp, `None` if the file holds something else
    pub fn last_updated_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.last_updated, LAST_UPDATED_FORMAT).ok()
    }
}

/// File-backed table cache
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Creates a store rooted at `root`; nothing is created on disk yet
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache root folder
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder of a category
    pub fn folder(&self, category: CacheCategory) -> PathBuf {
        match category.folder() {
            Some(folder) => self.root.join(folder),
            None => self.root.clone(),
        }
    }

    /// Path of the artifact `key` in `category`
    pub fn path(&self, category: CacheCategory, key: &str) -> PathBuf {
        self.folder(category)
            .join(format!("{}.{TABLE_EXTENSION}", sanitize_key(key)))
    }

    /// Creates the cache root and every category folder
    ///
    /// Safe to call any number of times.
    pub fn scaffold(&self) -> Result<()> {
        for category in CacheCategory::ALL {
            self.ensure_folder(category)?;
        }
        Ok(())
    }

    /// True when the category folder holds more than one file
    pub fn exists(&self, category: CacheCategory) -> bool {
        visible_files(&self.folder(category))
            .map(|files| files.len() > 1)
            .unwrap_or(false)
    }

    /// True when the single artifact `key` is cached
    pub fn contains(&self, category: CacheCategory, key: &str) -> bool {
        self.path(category, key).is_file()
    }

    /// Persists a table as `key`, silently replacing an older version
    pub fn write(&self, category: CacheCategory, key: &str, table: &Table) -> Result<PathBuf> {
        self.ensure_folder(category)?;
        let path = self.path(category, key);
        codec::write_table(&path, table)?;
        tracing::debug!(
            category = %category,
            key = key,
            rows = table.len(),
            "Cached table"
        );
        Ok(path)
    }

    /// Reads the table cached as `key`
    ///
    /// Fails with [`CacheError::Miss`] when nothing was cached under that key.
    pub fn read(&self, category: CacheCategory, key: &str) -> Result<Table> {
        let path = self.path(category, key);
        if !path.is_file() {
            return Err(CacheError::Miss {
                category: category.to_string(),
                key: key.to_string(),
            }
            .into());
        }
        codec::read_table(&path)
    }

    /// Keys of all tables cached in a category, sorted
    pub fn keys(&self, category: CacheCategory) -> Result<Vec<String>> {
        let keys = visible_files(&self.folder(category))?
            .into_iter()
            .filter(|p| p.extension().is_some_and(|e| e == TABLE_EXTENSION))
            .map(|p| stem_of(&p))
            .collect();
        Ok(keys)
    }

    /// Number of files in a category folder
    pub fn file_count(&self, category: CacheCategory) -> usize {
        visible_files(&self.folder(category))
            .map(|files| files.len())
            .unwrap_or(0)
    }

    /// Removes every file of a category and returns how many were removed
    ///
    /// Sub-folders are left alone, so clearing the root keeps the other
    /// categories intact.
    pub fn delete_all(&self, category: CacheCategory) -> Result<usize> {
        let folder = self.folder(category);
        if !folder.is_dir() {
            return Ok(0);
        }

        let mut removed = 0;
        let entries = fs::read_dir(&folder).map_err(|e| io_error(&folder, e))?;
        for entry in entries {
            let path = entry.map_err(|e| io_error(&folder, e))?.path();
            if path.is_file() {
                fs::remove_file(&path).map_err(|e| io_error(&path, e))?;
                removed += 1;
            }
        }

        tracing::info!(category = %category, removed, "Cleared cache category");
        Ok(removed)
    }

    /// Writes `cache.json`
    pub fn write_info(&self, info: &CacheInfo) -> Result<()> {
        self.ensure_folder(CacheCategory::Root)?;
        let path = self.root.join(CACHE_INFO_FILE);
        let json = serde_json::to_string_pretty(info)?;
        fs::write(&path, json).map_err(|e| io_error(&path, e))?;
        Ok(())
    }

    /// Reads `cache.json`, `None` if the cache was never populated
    pub fn read_info(&self) -> Result<Option<CacheInfo>> {
        let path = self.root.join(CACHE_INFO_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn ensure_folder(&self, category: CacheCategory) -> Result<()> {
        let folder = self.folder(category);
        fs::create_dir_all(&folder).map_err(|e| io_error(&folder, e))?;
        Ok(())
    }
}

fn io_error(path: &Path, err: std::io::Error) -> CacheError {
    CacheError::Io {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

/// Keeps keys inside their category folder
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            _ => c,
        })
        .collect()
}
