use crate::error::Result;
use crate::filer::list_candidates;
use crate::fmt::format_bytes;
use crate::index::load_index;

pub fn run(config_path: &str) -> Result<i32> {
    let cfg = super::load(config_path)?;

    println!("Source dir:   {}", cfg.source_dir.display());
    println!("Archive root: {}", cfg.destination_root.display());
    println!("Review dir:   {}", cfg.review_dir.display());
    println!("Extensions:   {}", cfg.file_extensions.join(", "));
    println!("Mode:         {}", if cfg.move_files { "move" } else { "copy" });
    println!(
        "Lookups:      {} company aliases, {} people, {} medical companies",
        cfg.company_aliases.len(),
        cfg.medical_people.len(),
        cfg.medical_companies.len()
    );

    match list_candidates(&cfg) {
        Ok(files) => println!("Candidates:   {}", files.len()),
        Err(e) => println!("Candidates:   ({e})"),
    }

    let index_path = cfg.index_path();
    let loaded = load_index(&index_path);
    println!();
    println!("Hash index:   {} ({})", index_path.display(), loaded.label());
    if let Ok(meta) = std::fs::metadata(&index_path) {
        println!("Index size:   {}", format_bytes(meta.len()));
    }
    let index = loaded.into_index();
    if index.is_empty() {
        println!("Hashes:       0 (nothing filed yet)");
        return Ok(0);
    }
    let stats = index.stats();
    println!("Hashes:       {}", stats.hashes);
    println!("Paths:        {}", stats.paths);
    println!("Missing:      {}", stats.stale_paths);

    Ok(0)
}
