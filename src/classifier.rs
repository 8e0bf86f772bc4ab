use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};

use crate::config::Config;
use crate::filename::parse_filename;
use crate::keys::{normalize_key, sanitize_component};

const MEDICAL_DIR: &str = "Medical";
const NAME_SEPARATOR: &str = " - ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    Ok,
    Review,
}

impl ActionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Review => "review",
        }
    }
}

/// Why a document was sent to the review directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewReason {
    MissingDatePrefix,
    InvalidDate,
    EmptyCompany,
    EmptyPerson,
    MedicalWithoutPerson,
}

impl fmt::Display for ReviewReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::MissingDatePrefix => "missing or invalid date prefix (expected YYYY.MM.DD - ...)",
            Self::InvalidDate => "invalid date prefix",
            Self::EmptyCompany => "company name is empty after normalization",
            Self::EmptyPerson => "person name is empty after normalization",
            Self::MedicalWithoutPerson => {
                "classified medical but no person token matched medical_people map"
            }
        };
        f.write_str(text)
    }
}

/// One classification decision. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedAction {
    pub source: PathBuf,
    pub destination: Option<PathBuf>,
    pub status: ActionStatus,
    pub reason: String,
}

impl PlannedAction {
    fn filed(source: &Path, destination: PathBuf) -> Self {
        Self {
            source: source.to_path_buf(),
            destination: Some(destination),
            status: ActionStatus::Ok,
            reason: "classified".to_string(),
        }
    }

    /// Review keeps the original file name untouched for the operator.
    fn review(source: &Path, cfg: &Config, reason: ReviewReason) -> Self {
        Self {
            source: source.to_path_buf(),
            destination: source.file_name().map(|name| cfg.review_dir.join(name)),
            status: ActionStatus::Review,
            reason: reason.to_string(),
        }
    }
}

pub fn classify(file_path: &Path, cfg: &Config) -> PlannedAction {
    match placement(file_path, cfg) {
        Ok(destination) => PlannedAction::filed(file_path, destination),
        Err(reason) => PlannedAction::review(file_path, cfg, reason),
    }
}

fn placement(file_path: &Path, cfg: &Config) -> Result<PathBuf, ReviewReason> {
    let stem = file_path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let parsed = parse_filename(&stem).ok_or(ReviewReason::MissingDatePrefix)?;

    let date = NaiveDate::parse_from_str(&parsed.date, "%Y.%m.%d")
        .ok()
        .filter(|d| d.year() >= 1)
        .ok_or(ReviewReason::InvalidDate)?;
    let year = format!("{:04}", date.year());

    let company = sanitize_component(&canonical_company(&parsed.fields[0], cfg));
    if company.is_empty() {
        return Err(ReviewReason::EmptyCompany);
    }

    let trailing: Vec<String> = parsed.fields[1..]
        .iter()
        .map(|f| sanitize_component(f))
        .filter(|f| !f.is_empty())
        .collect();

    let matched = match_person(&trailing, cfg);
    let medical = matched.is_some() || cfg.medical_companies.contains(&normalize_key(&company));

    let extension = file_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default();

    if !medical {
        let name = file_name(&[parsed.date.as_str(), company.as_str()], &trailing, &extension);
        return Ok(cfg.destination_root.join(year).join(&company).join(name));
    }

    let Some((token_key, person)) = matched else {
        return Err(ReviewReason::MedicalWithoutPerson);
    };
    let person_dir = sanitize_component(person);
    if person_dir.is_empty() {
        return Err(ReviewReason::EmptyPerson);
    }

    let person_key = normalize_key(person);
    let description: Vec<String> = trailing
        .into_iter()
        .filter(|f| {
            let key = normalize_key(f);
            key != token_key && key != person_key
        })
        .collect();

    let name = file_name(
        &[parsed.date.as_str(), company.as_str(), person_dir.as_str()],
        &description,
        &extension,
    );
    Ok(cfg
        .destination_root
        .join(year)
        .join(MEDICAL_DIR)
        .join(&person_dir)
        .join(name))
}

fn canonical_company(raw: &str, cfg: &Config) -> String {
    cfg.company_aliases
        .get(&normalize_key(raw))
        .cloned()
        .unwrap_or_else(|| raw.trim().to_string())
}

/// First trailing field that names a known person wins; later fields are not consulted.
fn match_person<'a>(fields: &[String], cfg: &'a Config) -> Option<(String, &'a str)> {
    fields.iter().find_map(|field| {
        let key = normalize_key(field);
        cfg.medical_people
            .get(&key)
            .map(|person| (key, person.as_str()))
    })
}

fn file_name(head: &[&str], description: &[String], extension: &str) -> String {
    let mut parts: Vec<&str> = head.to_vec();
    let description = description.join(NAME_SEPARATOR);
    if !description.is_empty() {
        parts.push(&description);
    }
    format!("{}{extension}", parts.join(NAME_SEPARATOR))
}
