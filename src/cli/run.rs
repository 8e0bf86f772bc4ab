use crate::error::Result;
use crate::filer;

/// Returns the process exit code: 1 when any file failed, 0 otherwise.
pub fn run(config_path: &str, dry_run: bool) -> Result<i32> {
    let cfg = super::load(config_path)?;
    let summary = filer::run(&cfg, dry_run)?;
    Ok(summary.exit_code())
}
