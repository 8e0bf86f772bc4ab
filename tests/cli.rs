use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        let ws = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        fs::create_dir_all(ws.inbox()).unwrap();
        ws
    }

    fn inbox(&self) -> PathBuf {
        self.dir.path().join("inbox")
    }

    fn archive(&self) -> PathBuf {
        self.dir.path().join("archive")
    }

    fn write_config(&self, extra: serde_json::Value) -> PathBuf {
        let mut cfg = serde_json::json!({
            "source_dir": self.inbox(),
            "destination_root": self.archive(),
        });
        if let (Some(base), Some(more)) = (cfg.as_object_mut(), extra.as_object()) {
            base.extend(more.clone());
        }
        let path = self.dir.path().join("filestash.json");
        fs::write(&path, cfg.to_string()).unwrap();
        path
    }

    fn drop_file(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.inbox().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn cmd(&self, config: &Path) -> Command {
        let mut cmd = Command::cargo_bin("filestash").unwrap();
        cmd.current_dir(self.dir.path()).arg("--config").arg(config);
        cmd
    }
}

fn no_extra() -> serde_json::Value {
    serde_json::json!({})
}

#[test]
fn files_general_document() {
    let ws = Workspace::new();
    let config = ws.write_config(no_extra());
    ws.drop_file("2024.03.15 - Acme Corp - invoice.pdf", b"invoice");

    ws.cmd(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("MOVE"))
        .stdout(predicate::str::contains("Filed:      1"));

    assert!(ws
        .archive()
        .join("2024/Acme Corp/2024.03.15 - Acme Corp - invoice.pdf")
        .exists());
    assert!(ws.archive().join(".filing_hash_index.json").exists());
}

#[test]
fn files_medical_document_under_person() {
    let ws = Workspace::new();
    let config = ws.write_config(serde_json::json!({
        "medical_companies": ["acme corp"],
        "medical_people": {"dr smith": "Dr. Smith"},
    }));
    ws.drop_file("2024.03.15 - Acme Corp - Dr Smith - visit.pdf", b"visit");

    ws.cmd(&config).assert().success();

    assert!(ws
        .archive()
        .join("2024/Medical/Dr. Smith/2024.03.15 - Acme Corp - Dr. Smith - visit.pdf")
        .exists());
}

#[test]
fn medical_without_person_is_reviewed_not_an_error() {
    let ws = Workspace::new();
    let config = ws.write_config(serde_json::json!({"medical_companies": ["acme corp"]}));
    ws.drop_file("2024.03.15 - Acme Corp - visit.pdf", b"visit");

    ws.cmd(&config)
        .assert()
        .code(0)
        .stdout(predicate::str::contains(
            "classified medical but no person token matched medical_people map",
        ));

    assert!(ws
        .archive()
        .join("_Needs Review/2024.03.15 - Acme Corp - visit.pdf")
        .exists());
}

#[test]
fn malformed_name_is_reviewed() {
    let ws = Workspace::new();
    let config = ws.write_config(no_extra());
    ws.drop_file("invoice_final.pdf", b"?");

    ws.cmd(&config)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("REVIEW"))
        .stdout(predicate::str::contains("missing or invalid date prefix"));

    assert!(ws.archive().join("_Needs Review/invoice_final.pdf").exists());
}

#[test]
fn second_run_reports_duplicate_and_changes_nothing() {
    let ws = Workspace::new();
    let config = ws.write_config(no_extra());
    ws.drop_file("2024.03.15 - Acme Corp - invoice.pdf", b"same");
    ws.cmd(&config).assert().success();
    let index_path = ws.archive().join(".filing_hash_index.json");
    let index_before = fs::read_to_string(&index_path).unwrap();

    let source = ws.drop_file("2024.03.15 - Acme Corp - invoice.pdf", b"same");
    ws.cmd(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("DUP"))
        .stdout(predicate::str::contains("Duplicates: 1"));

    assert!(source.exists());
    assert!(!ws
        .archive()
        .join("2024/Acme Corp/2024.03.15 - Acme Corp - invoice (2).pdf")
        .exists());
    assert_eq!(fs::read_to_string(&index_path).unwrap(), index_before);
}

#[test]
fn different_content_same_name_gets_counter() {
    let ws = Workspace::new();
    let config = ws.write_config(no_extra());
    ws.drop_file("2024.03.15 - Acme Corp - invoice.pdf", b"first");
    ws.cmd(&config).assert().success();
    ws.drop_file("2024.03.15 - Acme Corp - invoice.pdf", b"second");
    ws.cmd(&config).assert().success();

    let dir = ws.archive().join("2024/Acme Corp");
    assert_eq!(fs::read(dir.join("2024.03.15 - Acme Corp - invoice.pdf")).unwrap(), b"first");
    assert_eq!(
        fs::read(dir.join("2024.03.15 - Acme Corp - invoice (2).pdf")).unwrap(),
        b"second"
    );
}

#[test]
fn dry_run_leaves_files_in_place() {
    let ws = Workspace::new();
    let config = ws.write_config(no_extra());
    let source = ws.drop_file("2024.03.15 - Acme Corp - invoice.pdf", b"invoice");

    ws.cmd(&config)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run:    true"));

    assert!(source.exists());
    assert!(!ws.archive().join("2024/Acme Corp").exists());
    assert!(!ws.archive().join(".filing_hash_index.json").exists());
}

#[test]
fn copy_mode_preserves_source() {
    let ws = Workspace::new();
    let config = ws.write_config(serde_json::json!({"move_files": false}));
    let source = ws.drop_file("2024.03.15 - Acme Corp - invoice.pdf", b"invoice");

    ws.cmd(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("COPY"));

    assert!(source.exists());
    assert!(ws
        .archive()
        .join("2024/Acme Corp/2024.03.15 - Acme Corp - invoice.pdf")
        .exists());
}

#[test]
fn run_log_is_written_under_destination_year() {
    let ws = Workspace::new();
    let config = ws.write_config(no_extra());
    ws.drop_file("2024.03.15 - Acme Corp - invoice.pdf", b"invoice");
    ws.cmd(&config).assert().success();

    let year = chrono::Local::now().format("%Y").to_string();
    let logs: Vec<_> = fs::read_dir(ws.archive().join(year))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("filestash_"))
        .collect();
    assert_eq!(logs.len(), 1);
    let content = fs::read_to_string(logs[0].path()).unwrap();
    assert!(content.contains("==== Run started"));
    assert!(content.contains("Summary"));
}

#[test]
fn missing_source_dir_exits_two() {
    let ws = Workspace::new();
    let config = ws.write_config(serde_json::json!({
        "source_dir": ws.dir.path().join("no-such-inbox"),
    }));
    ws.cmd(&config)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("source_dir does not exist"));
}

#[test]
fn missing_config_exits_two() {
    let ws = Workspace::new();
    ws.cmd(&ws.dir.path().join("absent.json"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn invalid_config_exits_two() {
    let ws = Workspace::new();
    let path = ws.dir.path().join("broken.json");
    fs::write(&path, r#"{"source_dir": "/only/one/key"}"#).unwrap();
    ws.cmd(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid config"));
}

#[test]
fn unreadable_destination_counts_error_and_exits_one() {
    let ws = Workspace::new();
    let config = ws.write_config(no_extra());
    fs::create_dir_all(ws.archive().join("2024")).unwrap();
    // A regular file where the company directory needs to go.
    fs::write(ws.archive().join("2024/Acme Corp"), b"blocker").unwrap();
    let source = ws.drop_file("2024.03.15 - Acme Corp - invoice.pdf", b"invoice");

    ws.cmd(&config)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Errors:     1"));
    assert!(source.exists());
}

#[test]
fn plan_prints_table_without_moving() {
    let ws = Workspace::new();
    let config = ws.write_config(no_extra());
    let source = ws.drop_file("2024.03.15 - Acme Corp - invoice.pdf", b"invoice");
    ws.drop_file("invoice_final.pdf", b"?");

    ws.cmd(&config)
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("Destination"))
        .stdout(predicate::str::contains("1 to file, 1 to review"));

    assert!(source.exists());
    assert!(!ws.archive().exists());
}

#[test]
fn status_reports_index_statistics() {
    let ws = Workspace::new();
    let config = ws.write_config(no_extra());
    ws.drop_file("2024.03.15 - Acme Corp - invoice.pdf", b"invoice");
    ws.cmd(&config).assert().success();

    ws.cmd(&config)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hashes:       1"))
        .stdout(predicate::str::contains("Missing:      0"));
}
