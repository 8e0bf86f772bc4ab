use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{FilestashError, Result};
use crate::keys::normalize_key;

/// File name of the persisted duplicate index inside the destination root.
pub const INDEX_FILE_NAME: &str = ".filing_hash_index.json";

const REVIEW_DIR_NAME: &str = "_Needs Review";

#[derive(Debug, Deserialize)]
struct RawConfig {
    source_dir: String,
    destination_root: String,
    #[serde(default)]
    review_dir: Option<String>,
    #[serde(default = "default_file_extensions")]
    file_extensions: Vec<String>,
    #[serde(default)]
    company_aliases: HashMap<String, String>,
    #[serde(default)]
    medical_people: HashMap<String, String>,
    #[serde(default)]
    medical_companies: Vec<String>,
    #[serde(default = "default_move_files")]
    move_files: bool,
}

fn default_file_extensions() -> Vec<String> {
    vec![".pdf".to_string()]
}

fn default_move_files() -> bool {
    true
}

/// Immutable run configuration. Lookup maps are keyed by normalized keys.
#[derive(Debug, Clone)]
pub struct Config {
    pub source_dir: PathBuf,
    pub destination_root: PathBuf,
    pub review_dir: PathBuf,
    /// Lower-cased, each with a leading dot.
    pub file_extensions: Vec<String>,
    pub company_aliases: HashMap<String, String>,
    pub medical_people: HashMap<String, String>,
    pub medical_companies: HashSet<String>,
    pub move_files: bool,
}

impl Config {
    pub fn index_path(&self) -> PathBuf {
        self.destination_root.join(INDEX_FILE_NAME)
    }

    pub fn accepts_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .is_some_and(|ext| self.file_extensions.contains(&ext))
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(FilestashError::ConfigNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let raw: RawConfig =
        serde_json::from_str(content).map_err(|e| FilestashError::InvalidConfig(e.to_string()))?;

    let destination_root = resolve_path(&raw.destination_root)?;
    let review_dir = match raw.review_dir {
        Some(dir) => resolve_path(&dir)?,
        None => destination_root.join(REVIEW_DIR_NAME),
    };

    Ok(Config {
        source_dir: resolve_path(&raw.source_dir)?,
        destination_root,
        review_dir,
        file_extensions: raw.file_extensions.iter().map(|e| normalize_extension(e)).collect(),
        company_aliases: canonical_map(raw.company_aliases),
        medical_people: canonical_map(raw.medical_people),
        medical_companies: raw.medical_companies.iter().map(|c| normalize_key(c)).collect(),
        move_files: raw.move_files,
    })
}

/// Normalize keys, trim values, and drop entries whose value is blank.
fn canonical_map(raw: HashMap<String, String>) -> HashMap<String, String> {
    raw.into_iter()
        .filter_map(|(k, v)| {
            let v = v.trim();
            (!v.is_empty()).then(|| (normalize_key(&k), v.to_string()))
        })
        .collect()
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}

/// Expand a leading `~` and anchor relative paths at the working directory.
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let expanded = match path.strip_prefix('~') {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    };
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(std::env::current_dir()?.join(expanded))
    }
}
