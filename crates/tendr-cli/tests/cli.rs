//! End-to-end checks of the `tendr` binary.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const NOTICE: &str = "\
Enquiry Number: EAPH250035 Dated: 12.05.2025
Organisation Name: Northern Coalfields Limited
Approximate Value of Work: Rs. 24,95,000/-
1\tRoof Bolts Grouting M20 x 1800M\t20 Nos\tPer No.
";

fn tendr() -> Command {
    Command::cargo_bin("tendr").unwrap()
}

#[test]
fn test_analyze_text_file_as_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notice.txt");
    fs::write(&path, NOTICE).unwrap();

    tendr()
        .arg("analyze")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"enquiryNumber\": \"EAPH250035\""))
        .stdout(predicate::str::contains("\"source\": \"fallback\""));
}

#[test]
fn test_analyze_writes_csv_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("notice.txt");
    let output = dir.path().join("items.csv");
    fs::write(&input, NOTICE).unwrap();

    tendr()
        .args(["analyze", "-f", "csv", "-o"])
        .arg(&output)
        .arg(&input)
        .assert()
        .success();

    let csv = fs::read_to_string(&output).unwrap();
    assert!(csv.starts_with("serial_number,description"));
    assert!(csv.contains("Roof Bolts Grouting M20 x 1800M"));
}

#[test]
fn test_analyze_missing_file_fails() {
    tendr()
        .args(["analyze", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_compare_flags_identical_prices() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("alpha.txt");
    let second = dir.path().join("beta.txt");
    fs::write(&first, "Quoted total for the works: Rs. 24,95,000 inclusive of taxes.").unwrap();
    fs::write(&second, "Our offer for the complete scope is Rs. 24,95,000 all inclusive.").unwrap();

    tendr()
        .arg("compare")
        .arg(&first)
        .arg(&second)
        .assert()
        .success()
        .stdout(predicate::str::contains("price collusion"))
        .stdout(predicate::str::contains("alpha"))
        .stdout(predicate::str::contains("Recommendation:"));
}

#[test]
fn test_compare_needs_two_documents() {
    let dir = TempDir::new().unwrap();
    let only = dir.path().join("alpha.txt");
    fs::write(&only, NOTICE).unwrap();

    tendr()
        .arg("compare")
        .arg(&only)
        .assert()
        .failure()
        .stderr(predicate::str::contains("At least two documents"));
}

#[test]
fn test_validate_lists_clauses() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bid.txt");
    fs::write(&path, "EMD of Rs. 49,900 is enclosed. Payment Terms: 90% on delivery.").unwrap();

    tendr()
        .args(["validate", "--json"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"presentClauses\""))
        .stdout(predicate::str::contains("Termination Clause"));
}

#[test]
fn test_validate_strict_fails_on_missing_clauses() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bid.txt");
    fs::write(&path, "EMD of Rs. 49,900 is enclosed with this offer.").unwrap();

    tendr()
        .args(["validate", "--strict"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("mandatory clause(s) missing"));
}

#[test]
fn test_config_path() {
    tendr()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file:"));
}

#[test]
fn test_custom_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    let input = dir.path().join("notice.txt");
    fs::write(&config, r#"{"extraction": {"min_text_length": 5000}}"#).unwrap();
    fs::write(&input, NOTICE).unwrap();

    tendr()
        .arg("-c")
        .arg(&config)
        .arg("analyze")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"complianceScore\": 0"));
}

#[test]
fn test_inconsistent_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    let input = dir.path().join("notice.txt");
    fs::write(
        &config,
        r#"{"comparison": {"similarity_note_percent": 90.0, "similarity_red_flag_percent": 40.0}}"#,
    )
    .unwrap();
    fs::write(&input, NOTICE).unwrap();

    tendr()
        .arg("-c")
        .arg(&config)
        .arg("analyze")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration error"));
}
