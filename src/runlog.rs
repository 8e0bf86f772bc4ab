use std::ffi::OsStr;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use colored::Colorize;
use tracing::warn;

use crate::error::Result;

/// Per-file decision tags written to the run log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Move,
    Copy,
    Review,
    Dup,
    Skip,
    Error,
}

impl Decision {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Move => "MOVE",
            Self::Copy => "COPY",
            Self::Review => "REVIEW",
            Self::Dup => "DUP",
            Self::Skip => "SKIP",
            Self::Error => "ERROR",
        }
    }

    fn colored_tag(&self) -> String {
        let tag = format!("{:<6}", self.tag());
        match self {
            Self::Move | Self::Copy => tag.green().to_string(),
            Self::Review => tag.yellow().to_string(),
            Self::Dup | Self::Skip => tag.dimmed().to_string(),
            Self::Error => tag.red().bold().to_string(),
        }
    }
}

/// Log file name for a run started at `now`, placed under the destination's current year.
pub fn default_log_path(destination_root: &Path, now: DateTime<Local>) -> PathBuf {
    destination_root
        .join(now.format("%Y").to_string())
        .join(format!("filestash_{}.log", now.format("%Y%m%d_%H%M%S")))
}

/// Append-only run record, echoed to stdout. Flushed after every line and on drop.
pub struct RunLog {
    path: PathBuf,
    file: File,
}

impl RunLog {
    /// Open `primary`, falling back once to a same-named file in the working directory.
    pub fn open(primary: &Path) -> Result<Self> {
        Self::open_or_fallback(primary, std::env::current_dir)
    }

    /// `fallback_dir` is only consulted when `primary` cannot be opened.
    fn open_or_fallback<F>(primary: &Path, fallback_dir: F) -> Result<Self>
    where
        F: FnOnce() -> io::Result<PathBuf>,
    {
        match open_append(primary) {
            Ok(file) => {
                let mut log = Self {
                    path: primary.to_path_buf(),
                    file,
                };
                log.start();
                Ok(log)
            }
            Err(primary_err) => {
                let name = primary
                    .file_name()
                    .unwrap_or_else(|| OsStr::new("filestash.log"));
                let fallback = fallback_dir()?.join(name);
                let file = open_append(&fallback)?;
                warn!(
                    primary = %primary.display(),
                    fallback = %fallback.display(),
                    error = %primary_err,
                    "primary log path unavailable"
                );
                let mut log = Self {
                    path: fallback,
                    file,
                };
                log.start();
                let notice = format!(
                    "WARNING: primary log path unavailable ({primary_err}); using fallback log path {}",
                    log.path.display()
                );
                log.line(&notice);
                Ok(log)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn start(&mut self) {
        self.line("");
        let started = Local::now().format("%Y-%m-%dT%H:%M:%S");
        self.line(&format!("==== Run started {started} ===="));
    }

    pub fn line(&mut self, message: &str) {
        println!("{message}");
        self.append(message);
    }

    pub fn decision(&mut self, decision: Decision, message: &str) {
        println!("{} {message}", decision.colored_tag());
        self.append(&format!("{:<6} {message}", decision.tag()));
    }

    fn append(&mut self, message: &str) {
        if let Err(e) = writeln!(self.file, "{message}").and_then(|_| self.file.flush()) {
            warn!(path = %self.path.display(), error = %e, "failed to append to run log");
        }
    }
}

impl Drop for RunLog {
    fn drop(&mut self) {
        let _ = self.file.flush();
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
