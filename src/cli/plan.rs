use comfy_table::{Cell, Table};

use crate::classifier::ActionStatus;
use crate::error::Result;
use crate::filer;
use crate::fmt::short_path;

pub fn run(config_path: &str) -> Result<i32> {
    let cfg = super::load(config_path)?;
    let actions = filer::plan(&cfg)?;

    if actions.is_empty() {
        println!("No candidate files found.");
        return Ok(0);
    }

    let mut table = Table::new();
    table.set_header(vec!["Source", "Status", "Destination", "Reason"]);
    for action in &actions {
        let source = action
            .source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let destination = action
            .destination
            .as_deref()
            .map(|d| short_path(d, &cfg.destination_root))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(source),
            Cell::new(action.status.label()),
            Cell::new(destination),
            Cell::new(&action.reason),
        ]);
    }

    let review = actions
        .iter()
        .filter(|a| a.status == ActionStatus::Review)
        .count();
    println!("Plan for {}\n{table}", cfg.source_dir.display());
    println!("{} to file, {} to review", actions.len() - review, review);
    Ok(0)
}
