//! Extraction cache keyed by file path and content hash.
//!
//! Repeated runs skip reparsing files whose contents are unchanged. Entries
//! live in memory for the process (or the lifetime of a privately owned
//! instance).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use once_cell::sync::Lazy;

use crate::types::ImportRecord;

static SHARED: Lazy<ParseCache> = Lazy::new(ParseCache::new);

/// The process-wide cache instance.
pub fn shared() -> &'static ParseCache {
    &SHARED
}

/// 128-bit content digest, rendered as 32 hex chars.
pub fn content_hash(content: &str) -> String {
    let digest = blake3::hash(content.as_bytes());
    let mut out = String::with_capacity(32);
    for byte in &digest.as_bytes()[..16] {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

struct CacheEntry {
    hash: String,
    records: Vec<ImportRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

#[derive(Default)]
pub struct ParseCache {
    entries: Mutex<HashMap<PathBuf, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ParseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records for `path` if the stored hash matches, else nothing.
    pub fn get(&self, path: &Path, hash: &str) -> Option<Vec<ImportRecord>> {
        let entries = self.entries.lock().ok()?;
        match entries.get(path) {
            Some(entry) if entry.hash == hash => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.records.clone())
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn put(&self, path: &Path, hash: String, records: Vec<ImportRecord>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(path.to_path_buf(), CacheEntry { hash, records });
        }
    }

    pub fn invalidate(&self, path: &Path) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(path);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        let size = self.entries.lock().map(|e| e.len()).unwrap_or(0);
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        CacheStats {
            size,
            hits,
            misses,
            hit_rate: if total == 0 {
                0.0
            } else {
                hits as f64 / total as f64
            },
        }
    }
}
