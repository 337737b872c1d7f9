// End-to-end runs of the `tithe` binary against a throwaway HOME and data dir.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tithe(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tithe").unwrap();
    cmd.env("HOME", home).env_remove("RUST_LOG");
    cmd
}

fn setup() -> TempDir {
    let home = TempDir::new().unwrap();
    let data = home.path().join("data");
    tithe(home.path())
        .args(["init", "--data-dir"])
        .arg(&data)
        .args(["--officer-id", "OFF-1", "--officer-name", "Deacon Kofi", "--year", "2025"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized tithe at"));
    home
}

fn add_member(home: &Path, name: &str, fellowship: &str) -> String {
    tithe(home)
        .args(["members", "add", name, "--fellowship", fellowship, "--phone", "0244000000"])
        .assert()
        .success();
    let out = tithe(home).args(["members", "list", "--json"]).output().unwrap();
    let members: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    members
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["name"] == name)
        .and_then(|m| m["id"].as_str())
        .unwrap()
        .to_string()
}

fn give(home: &Path, member: &str, amount: &str, method: &str, week: &str) {
    tithe(home)
        .args(["give", member, amount, "--method", method, "--month", "JANUARY", "--week", week])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded"));
}

#[test]
fn test_commands_require_init() {
    let home = TempDir::new().unwrap();
    tithe(home.path())
        .args(["members", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tithe init"));
    tithe(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Database not found"));
}

#[test]
fn test_give_count_and_finalize() {
    let home = setup();
    let ama = add_member(home.path(), "Ama Boateng", "Thyatira");
    give(home.path(), &ama, "50", "CASH", "1");
    give(home.path(), &ama, "20", "MOMO", "1");

    // MOMO is not counted against the drawer.
    tithe(home.path())
        .args(["reconcile", "--count", "20=2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Please recount or check for missing transaction slips."));

    tithe(home.path())
        .args(["batch", "finalize", "--count", "50=1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPEN"));

    tithe(home.path())
        .args(["batch", "count", "--count", "20=2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Counting batch"));

    // Week 9 of January is not a collection week.
    tithe(home.path())
        .args(["give", &ama, "5", "--month", "JANUARY", "--week", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid week number: 9"));

    // Entry is frozen while counting.
    tithe(home.path())
        .args(["give", &ama, "5", "--month", "JANUARY", "--week", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("entries are frozen"));

    tithe(home.path())
        .args(["batch", "finalize", "--count", "20=2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot finalize while variance exists"));

    tithe(home.path())
        .args(["batch", "finalize", "--count", "50=1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BALANCED"))
        .stdout(predicate::str::contains("finalized by Deacon Kofi"));

    tithe(home.path())
        .args(["batch", "sync"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SYNCED"));

    // A fresh batch opens for the next gift.
    give(home.path(), &ama, "10", "CASH", "2");
    tithe(home.path())
        .args(["batch", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OPEN"));

    tithe(home.path())
        .args(["members", "search", "ama"])
        .assert()
        .success()
        .stdout(predicate::str::contains("GH₵80.00"));
}

#[test]
fn test_transactions_csv_and_undo() {
    let home = setup();
    let ama = add_member(home.path(), "Ama Boateng", "Thyatira");
    let kwesi = add_member(home.path(), "Kwesi Mensah", "Berea");
    give(home.path(), &ama, "50", "CASH", "1");
    give(home.path(), &kwesi, "25.5", "CHECK", "2");

    tithe(home.path())
        .args(["transactions", "list", "--csv", "--method", "CHECK"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("id,date,member_id"))
        .stdout(predicate::str::contains("Kwesi Mensah,Berea,25.50,CHECK"))
        .stdout(predicate::str::contains("Ama Boateng").not());

    tithe(home.path())
        .args(["transactions", "undo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Kwesi Mensah"));

    tithe(home.path())
        .args(["transactions", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 matching"));

    tithe(home.path())
        .args(["members", "show", &kwesi])
        .assert()
        .success()
        .stdout(predicate::str::contains("No gifts recorded."));
    tithe(home.path())
        .args(["members", "show", "MEM-missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown member: MEM-missing"));
}

#[test]
fn test_report_summary() {
    let home = setup();
    let ama = add_member(home.path(), "Ama Boateng", "Thyatira");
    let kwesi = add_member(home.path(), "Kwesi Mensah", "Berea");
    give(home.path(), &ama, "50", "CASH", "1");
    give(home.path(), &kwesi, "30", "CASH", "1");
    give(home.path(), &kwesi, "40", "CASH", "3");

    tithe(home.path())
        .args(["report", "summary", "--month", "january", "--week", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("JANUARY 2025 - WEEK 1"))
        .stdout(predicate::str::contains("Thyatira"));

    let out = tithe(home.path())
        .args(["report", "summary", "--month", "JANUARY", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["total"], 120.0);
    assert_eq!(report["best"]["names"], "Berea");

    tithe(home.path())
        .args(["report", "summary", "--month", "SMARCH"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown month"));
}

#[test]
fn test_export_then_import_elsewhere() {
    let home = setup();
    let ama = add_member(home.path(), "Ama Boateng", "Thyatira");
    give(home.path(), &ama, "50", "CASH", "1");
    give(home.path(), &ama, "15", "CASH", "2");

    let workbook = home.path().join("book.xlsx");
    tithe(home.path())
        .arg("export")
        .arg(&workbook)
        .assert()
        .success()
        .stdout(predicate::str::contains("10 sheets"));
    assert!(workbook.exists());

    let other = setup();
    tithe(other.path())
        .arg("import")
        .arg(&workbook)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    tithe(other.path())
        .arg("import")
        .arg(&workbook)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 members and 2 gifts written"));

    tithe(other.path())
        .arg("import")
        .arg(&workbook)
        .assert()
        .success()
        .stdout(predicate::str::contains("imported before"));

    tithe(other.path())
        .args(["members", "search", "Boateng"])
        .assert()
        .success()
        .stdout(predicate::str::contains("GH₵65.00"));
}
