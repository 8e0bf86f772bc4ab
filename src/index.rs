use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io;
use std::path::Path;

use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::Result;

/// Content hash → archive paths known to hold that content.
///
/// Advisory only: recorded paths may have been deleted out-of-band, so a hit is
/// trusted only after [`HashIndex::live_match`] confirms the file is still there.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HashIndex {
    entries: BTreeMap<String, BTreeSet<String>>,
}

/// How an index came to be in memory.
#[derive(Debug)]
pub enum IndexLoad {
    /// No index file yet.
    Fresh(HashIndex),
    /// An index file existed but could not be used; starting empty.
    Recovered(HashIndex),
    Loaded(HashIndex),
}

impl IndexLoad {
    pub fn into_index(self) -> HashIndex {
        match self {
            Self::Fresh(index) | Self::Recovered(index) | Self::Loaded(index) => index,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Fresh(_) => "fresh",
            Self::Recovered(_) => "recovered (malformed file ignored)",
            Self::Loaded(_) => "loaded",
        }
    }
}

pub struct IndexStats {
    pub hashes: usize,
    pub paths: usize,
    pub stale_paths: usize,
}

impl HashIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, hash: &str) -> BTreeSet<String> {
        self.entries.get(hash).cloned().unwrap_or_default()
    }

    /// Returns true when the path was not already recorded for this hash.
    pub fn record(&mut self, hash: &str, path: &Path) -> bool {
        self.entries
            .entry(hash.to_string())
            .or_default()
            .insert(path.to_string_lossy().to_string())
    }

    /// First recorded path for `hash` that still exists on disk.
    pub fn live_match(&self, hash: &str) -> Option<String> {
        self.lookup(hash)
            .into_iter()
            .find(|p| Path::new(p).exists())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> IndexStats {
        let mut paths = 0;
        let mut stale_paths = 0;
        for path in self.entries.values().flatten() {
            paths += 1;
            if !Path::new(path).exists() {
                stale_paths += 1;
            }
        }
        IndexStats {
            hashes: self.entries.len(),
            paths,
            stale_paths,
        }
    }

    /// Build from an arbitrary JSON value, keeping only string → array entries.
    /// Array elements that are not strings are kept in their JSON text form.
    fn from_value(value: Value) -> Option<Self> {
        let Value::Object(map) = value else {
            return None;
        };
        let entries = map
            .into_iter()
            .filter_map(|(hash, paths)| match paths {
                Value::Array(items) => {
                    let paths: BTreeSet<String> = items
                        .into_iter()
                        .map(|item| match item {
                            Value::String(s) => s,
                            other => other.to_string(),
                        })
                        .collect();
                    Some((hash, paths))
                }
                _ => None,
            })
            .collect();
        Some(Self { entries })
    }
}

/// Never fails: a missing or malformed file yields an empty index.
pub fn load_index(index_path: &Path) -> IndexLoad {
    if !index_path.exists() {
        debug!(path = %index_path.display(), "no hash index yet");
        return IndexLoad::Fresh(HashIndex::new());
    }
    let parsed = std::fs::read_to_string(index_path)
        .ok()
        .and_then(|content| serde_json::from_str::<Value>(&content).ok())
        .and_then(HashIndex::from_value);
    match parsed {
        Some(index) => {
            debug!(path = %index_path.display(), hashes = index.len(), "hash index loaded");
            IndexLoad::Loaded(index)
        }
        None => {
            warn!(path = %index_path.display(), "hash index unreadable, starting empty");
            IndexLoad::Recovered(HashIndex::new())
        }
    }
}

/// Write sorted, pretty JSON so successive indexes diff cleanly.
pub fn save_index(index_path: &Path, index: &HashIndex) -> Result<()> {
    if let Some(parent) = index_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&index.entries)?;
    std::fs::write(index_path, format!("{json}\n"))?;
    Ok(())
}

/// Hex SHA-256 of a file's contents, streamed.
pub fn content_hash(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}
