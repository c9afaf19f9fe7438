use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn rollbook(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("rollbook").unwrap();
    cmd.env("ROLLBOOK_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_of(home: &Path, args: &[&str]) -> String {
    let output = rollbook(home).args(args).assert().success();
    String::from_utf8(output.get_output().stdout.clone()).unwrap()
}

/// Short id of the first listed row containing `needle`.
fn short_id(listing: &str, needle: &str) -> String {
    listing
        .lines()
        .find(|line| line.contains(needle))
        .and_then(|line| line.split_whitespace().next())
        .unwrap_or_else(|| panic!("{needle} not listed in:\n{listing}"))
        .to_string()
}

#[test]
fn init_creates_the_data_dir() {
    let temp = tempfile::tempdir().unwrap();
    let home = temp.path().join("data");

    rollbook(&home)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized rollbook data"));
    assert!(home.is_dir());
}

#[test]
fn students_are_listed_searched_and_paged() {
    let temp = tempfile::tempdir().unwrap();
    let home = temp.path();

    for name in ["Alice", "Bob", "Dalia"] {
        rollbook(home)
            .args(["student", "add", name, "--phone", "5550100"])
            .assert()
            .success()
            .stdout(predicate::str::contains(format!("Student added: {name}")));
    }

    let all = stdout_of(home, &["student", "list"]);
    assert!(all.contains("Alice") && all.contains("Bob") && all.contains("Dalia"));

    let found = stdout_of(home, &["student", "list", "--search", "BOB"]);
    assert!(found.contains("Bob"));
    assert!(!found.contains("Alice"));

    let first = stdout_of(home, &["student", "list", "--per-page", "2"]);
    assert!(first.contains("page 1 of 2"));
    let second = stdout_of(home, &["student", "list", "--per-page", "2", "--page", "2"]);
    assert!(second.contains("Dalia"));
    assert!(!second.contains("Alice"));

    for page in ["0", "3"] {
        let shown = stdout_of(home, &["student", "list", "--per-page", "2", "--page", page]);
        assert!(shown.contains(&format!("page {page} is out of range (1..=2)")));
        assert!(shown.contains("Alice"));
        assert!(shown.contains("page 1 of 2"));
    }
}

#[test]
fn blank_student_name_is_not_saved() {
    let temp = tempfile::tempdir().unwrap();
    rollbook(temp.path())
        .args(["student", "add", "  "])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing saved"));

    rollbook(temp.path())
        .args(["student", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No students found."));
}

#[test]
fn attendance_keeps_the_latest_mark() {
    let temp = tempfile::tempdir().unwrap();
    let home = temp.path();
    rollbook(home).args(["student", "add", "Alice"]).assert().success();
    let id = short_id(&stdout_of(home, &["student", "list"]), "Alice");

    for status in ["present", "late"] {
        rollbook(home)
            .args(["attendance", "mark", &id, status, "--date", "2024-03-04"])
            .assert()
            .success();
    }

    rollbook(home)
        .args(["attendance", "show", "--date", "2024-03-04"])
        .assert()
        .success()
        .stdout(predicate::str::contains("present 0  late 1  absent 0"));

    let records = std::fs::read_to_string(home.join("attendance.json")).unwrap();
    let records: serde_json::Value = serde_json::from_str(&records).unwrap();
    assert_eq!(records.as_array().unwrap().len(), 1);
}

#[test]
fn paying_a_booking_issues_an_invoice() {
    let temp = tempfile::tempdir().unwrap();
    let home = temp.path();
    rollbook(home).args(["student", "add", "Alice"]).assert().success();

    rollbook(home)
        .args([
            "booking", "add", "alice", "--start", "09:00", "--end", "10:30", "--rate", "50",
            "--date", "2024-05-01",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.50 h, total 75.00"));

    let listing = stdout_of(home, &["booking", "list"]);
    assert!(listing.contains("pending"));
    assert!(!listing.contains("(guest)"));
    let id = short_id(&listing, "alice");

    rollbook(home)
        .args(["booking", "status", &id, "paid"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Invoice INV-"));

    rollbook(home)
        .args(["booking", "summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Revenue: ₹75.00"))
        .stdout(predicate::str::contains("Pending: ₹0.00"));

    let invoices = stdout_of(home, &["invoice", "list"]);
    let invoice_id = short_id(&invoices, "INV-");
    rollbook(home)
        .args(["invoice", "show", &invoice_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bill to: alice"))
        .stdout(predicate::str::contains("Turf booking on 2024-05-01 (09:00 - 10:30)"))
        .stdout(predicate::str::contains("Total: ₹75.00"));

    // Paid is final.
    rollbook(home)
        .args(["booking", "status", &id, "pending"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Cannot move booking from paid to pending"));
}

#[test]
fn unmatched_customer_is_a_guest_booking() {
    let temp = tempfile::tempdir().unwrap();
    rollbook(temp.path())
        .args(["booking", "add", "Walk-in", "--start", "18:00", "--end", "19:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("saved as a guest booking"));

    rollbook(temp.path())
        .args(["booking", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Walk-in (guest)"))
        .stdout(predicate::str::contains("₹50.00"));
}

#[test]
fn unreadable_times_are_named_in_the_warning() {
    let temp = tempfile::tempdir().unwrap();
    rollbook(temp.path())
        .args(["booking", "add", "Guest", "--start", "9am", "--end", "10:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Start time \"9am\" is not a valid HH:MM time"));

    rollbook(temp.path())
        .args(["booking", "add", "Guest", "--start", "10:00", "--end", "09:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("End time is not after start time"));
}

#[test]
fn delete_asks_for_confirmation() {
    let temp = tempfile::tempdir().unwrap();
    let home = temp.path();
    rollbook(home).args(["student", "add", "Alice"]).assert().success();
    let id = short_id(&stdout_of(home, &["student", "list"]), "Alice");

    rollbook(home)
        .args(["student", "rm", &id])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing removed"));
    assert!(stdout_of(home, &["student", "list"]).contains("Alice"));

    rollbook(home)
        .args(["student", "rm", &id, "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Student removed: Alice"));
    assert!(stdout_of(home, &["student", "list"]).contains("No students found."));
}

#[test]
fn unknown_ids_fail() {
    let temp = tempfile::tempdir().unwrap();
    rollbook(temp.path())
        .args(["booking", "status", "deadbeef", "paid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No booking matches id deadbeef"));
}

#[test]
fn config_round_trip() {
    let temp = tempfile::tempdir().unwrap();
    let home = temp.path();

    rollbook(home)
        .args(["config", "currency", "$"])
        .assert()
        .success()
        .stdout(predicate::str::contains("currency set to $"));
    rollbook(home)
        .args(["config", "page-size", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("page-size must be at least 1"));

    rollbook(home)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("page-size = 10"))
        .stdout(predicate::str::contains("currency = $"));

    rollbook(home)
        .args(["booking", "add", "Guest", "--start", "09:00", "--end", "10:00"])
        .assert()
        .success();
    rollbook(home)
        .args(["booking", "summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pending: $50.00"));
}

#[test]
fn report_shows_dashboard_totals() {
    let temp = tempfile::tempdir().unwrap();
    let home = temp.path();
    rollbook(home)
        .args(["student", "add", "Alice", "--registered", "2024-03-02"])
        .assert()
        .success();

    rollbook(home)
        .args(["report", "--date", "2024-03-20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 registered this month"))
        .stdout(predicate::str::contains("0 present, 0 late, 0 absent"));
}
