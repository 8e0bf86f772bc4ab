use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use filetime::FileTime;
use tracing::{debug, info};

use crate::classifier::{classify, ActionStatus, PlannedAction};
use crate::config::Config;
use crate::error::{FilestashError, Result};
use crate::index::{content_hash, load_index, save_index, HashIndex};
use crate::runlog::{default_log_path, Decision, RunLog};

/// Terminal state of one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    SkippedNoDestination,
    HashError,
    Duplicate,
    FiledReview(PathBuf),
    FiledOk(PathBuf),
    MoveError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub candidates: usize,
    pub filed: usize,
    pub reviewed: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl RunSummary {
    fn tally(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::SkippedNoDestination => self.skipped += 1,
            Outcome::HashError | Outcome::MoveError => self.errors += 1,
            Outcome::Duplicate => self.duplicates += 1,
            Outcome::FiledReview(_) => self.reviewed += 1,
            Outcome::FiledOk(_) => self.filed += 1,
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.errors > 0 {
            1
        } else {
            0
        }
    }
}

/// Regular files directly inside the source directory with an accepted extension, sorted.
pub fn list_candidates(cfg: &Config) -> Result<Vec<PathBuf>> {
    if !cfg.source_dir.is_dir() {
        return Err(FilestashError::SourceMissing(cfg.source_dir.clone()));
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(&cfg.source_dir)? {
        let path = entry?.path();
        if path.is_file() && cfg.accepts_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Classify every candidate without touching the filesystem.
pub fn plan(cfg: &Config) -> Result<Vec<PlannedAction>> {
    Ok(list_candidates(cfg)?
        .iter()
        .map(|path| classify(path, cfg))
        .collect())
}

/// `path` if free, otherwise the first of `name (2).ext`, `name (3).ext`, ... that is.
pub fn unique_destination(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let suffix = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    (2u32..)
        .map(|n| parent.join(format!("{stem} ({n}){suffix}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Move (rename, or copy then remove across devices) or copy `source` to `target`.
fn transfer(source: &Path, target: &Path, move_files: bool) -> io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    if !move_files {
        return copy_preserving_mtime(source, target);
    }
    if fs::rename(source, target).is_ok() {
        return Ok(());
    }
    copy_preserving_mtime(source, target)?;
    if let Err(e) = fs::remove_file(source) {
        let _ = fs::remove_file(target);
        return Err(e);
    }
    Ok(())
}

/// `fs::copy` keeps permissions only; carry the modification time over too.
fn copy_preserving_mtime(source: &Path, target: &Path) -> io::Result<()> {
    let meta = fs::metadata(source)?;
    fs::copy(source, target)?;
    filetime::set_file_mtime(target, FileTime::from_last_modification_time(&meta))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Carry one planned action to its terminal outcome.
pub fn file_action(
    action: &PlannedAction,
    cfg: &Config,
    dry_run: bool,
    index: &mut HashIndex,
    log: &mut RunLog,
) -> Outcome {
    let name = display_name(&action.source);
    let Some(destination) = &action.destination else {
        log.decision(Decision::Skip, &format!("{name}: no destination"));
        return Outcome::SkippedNoDestination;
    };

    let hash = match content_hash(&action.source) {
        Ok(hash) => hash,
        Err(e) => {
            log.decision(Decision::Error, &format!("{name}: failed to hash source ({e})"));
            return Outcome::HashError;
        }
    };

    if let Some(existing) = index.live_match(&hash) {
        log.decision(
            Decision::Dup,
            &format!("{name}: identical file already indexed at {existing}"),
        );
        return Outcome::Duplicate;
    }

    let target = unique_destination(destination);
    let review = action.status == ActionStatus::Review;
    let (decision, message) = if review {
        (
            Decision::Review,
            format!("{name} -> {} ({})", target.display(), action.reason),
        )
    } else if cfg.move_files {
        (Decision::Move, format!("{name} -> {}", target.display()))
    } else {
        (Decision::Copy, format!("{name} -> {}", target.display()))
    };

    if !dry_run {
        if let Err(e) = transfer(&action.source, &target, cfg.move_files) {
            log.decision(
                Decision::Error,
                &format!("{name} -> {}: move/copy failed ({e})", target.display()),
            );
            return Outcome::MoveError;
        }
        index.record(&hash, &target);
    }
    log.decision(decision, &message);

    if review {
        Outcome::FiledReview(target)
    } else {
        Outcome::FiledOk(target)
    }
}

/// Process candidates in order against an explicit index and log.
/// In dry-run mode nothing on disk changes and the index is left as given.
pub fn file_all(
    cfg: &Config,
    files: &[PathBuf],
    dry_run: bool,
    index: &mut HashIndex,
    log: &mut RunLog,
) -> RunSummary {
    let mut summary = RunSummary {
        candidates: files.len(),
        ..Default::default()
    };
    for path in files {
        let action = classify(path, cfg);
        debug!(
            source = %action.source.display(),
            status = action.status.label(),
            reason = %action.reason,
            "classified"
        );
        let outcome = file_action(&action, cfg, dry_run, index, log);
        if let Outcome::FiledOk(target) | Outcome::FiledReview(target) = &outcome {
            debug!(target = %target.display(), dry_run, "placed");
        }
        summary.tally(&outcome);
    }
    summary
}

/// Full run: open the log, load the index, file every candidate, persist, summarize.
pub fn run(cfg: &Config, dry_run: bool) -> Result<RunSummary> {
    let log_path = default_log_path(&cfg.destination_root, Local::now());
    let mut log = RunLog::open(&log_path)?;

    log.line(&format!("Config source_dir: {}", cfg.source_dir.display()));
    log.line(&format!("Config destination_root: {}", cfg.destination_root.display()));
    log.line(&format!("Config review_dir: {}", cfg.review_dir.display()));
    log.line(&format!("Dry run: {dry_run}"));

    let files = match list_candidates(cfg) {
        Ok(files) => files,
        Err(e) => {
            log.line(&format!("ERROR: {e}"));
            log.line(&format!("Log file: {}", log.path().display()));
            return Err(e);
        }
    };

    let index_path = cfg.index_path();
    let loaded = load_index(&index_path);
    log.line(&format!("Hash index: {} ({})", index_path.display(), loaded.label()));
    let mut index = loaded.into_index();

    if files.is_empty() {
        log.line("No candidate files found.");
        log.line(&format!("Log file: {}", log.path().display()));
        return Ok(RunSummary::default());
    }

    let summary = file_all(cfg, &files, dry_run, &mut index, &mut log);

    if !dry_run {
        save_index(&index_path, &index)?;
        info!(path = %index_path.display(), hashes = index.len(), "hash index saved");
    }

    log.line("");
    log.line("Summary");
    log.line(&format!("  Candidates: {}", summary.candidates));
    log.line(&format!("  Filed:      {}", summary.filed));
    log.line(&format!("  To review:  {}", summary.reviewed));
    log.line(&format!("  Duplicates: {}", summary.duplicates));
    if summary.skipped > 0 {
        log.line(&format!("  Skipped:    {}", summary.skipped));
    }
    log.line(&format!("  Errors:     {}", summary.errors));
    log.line(&format!("  Dry run:    {dry_run}"));
    log.line(&format!("Log file: {}", log.path().display()));

    Ok(summary)
}
