use assert_cmd::Command;
use predicates::prelude::*;

const SALES: &str = "\
TransactionID|Date|ProductID|ProductName|Quantity|UnitPrice|CustomerID|Region
T001|2024-12-01|P101|Laptop|2|45,000.00|C001|North
T002|2024-12-01|P102|Mouse,Wireless|10|500.00|C002|South
T003|2024-12-02|P103|Keyboard|5|1,500.00|C001|East
T004|2024-12-02|P104|Monitor|0|12000.00|C003|West
X005|2024-12-03|P105|Webcam|1|3000.00|C004|North
T006|2024-12-03|P102|Mouse|1
";

fn bin() -> Command {
    Command::cargo_bin("sales-analytics").unwrap()
}

#[test]
fn offline_run_writes_enriched_file_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sales_data.txt");
    std::fs::write(&input, SALES).unwrap();
    let enriched = dir.path().join("data").join("enriched.txt");
    let report = dir.path().join("output").join("report.txt");

    bin()
        .arg("--config")
        .arg(dir.path().join("settings.json"))
        .arg("run")
        .arg("--input")
        .arg(&input)
        .arg("--enriched-output")
        .arg(&enriched)
        .arg("--report-output")
        .arg(&report)
        .arg("--offline")
        .arg("--no-interactive")
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully read 6 raw lines"))
        .stdout(predicate::str::contains("Parsed 5 records"))
        .stdout(predicate::str::contains("Valid: 3 | Invalid: 2"))
        .stdout(predicate::str::contains("Enriched 0/3 transactions (0.0%)"));

    let enriched_text = std::fs::read_to_string(&enriched).unwrap();
    let lines: Vec<&str> = enriched_text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].ends_with("APIRating|APIMatch"));
    assert_eq!(lines[2], "T002|2024-12-01|P102|MouseWireless|10|500.0|C002|South||||False");

    let report_text = std::fs::read_to_string(&report).unwrap();
    assert!(report_text.contains("Total Revenue: 102,500.00"));
    assert!(report_text.contains("Date Range: 2024-12-01 to 2024-12-02"));
    assert!(report_text.contains("Success rate: 0.00%"));
}

#[test]
fn region_filter_flag_limits_records() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sales_data.txt");
    std::fs::write(&input, SALES).unwrap();
    let report = dir.path().join("report.txt");

    bin()
        .arg("--config")
        .arg(dir.path().join("settings.json"))
        .arg("run")
        .arg("--input")
        .arg(&input)
        .arg("--enriched-output")
        .arg(dir.path().join("enriched.txt"))
        .arg("--report-output")
        .arg(&report)
        .arg("--offline")
        .arg("--region")
        .arg("North")
        .assert()
        .success()
        .stdout(predicate::str::contains("Filtered by region: 1"))
        .stdout(predicate::str::contains("Filtered by amount: 0"));

    let report_text = std::fs::read_to_string(&report).unwrap();
    assert!(report_text.contains("Records Processed: 1"));
    assert!(report_text.contains("Total Revenue: 90,000.00"));
}

#[test]
fn missing_input_still_completes() {
    let dir = tempfile::tempdir().unwrap();
    bin()
        .arg("--config")
        .arg(dir.path().join("settings.json"))
        .arg("run")
        .arg("--input")
        .arg(dir.path().join("does_not_exist.txt"))
        .arg("--enriched-output")
        .arg(dir.path().join("enriched.txt"))
        .arg("--report-output")
        .arg(dir.path().join("report.txt"))
        .arg("--offline")
        .arg("--no-interactive")
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully read 0 raw lines"));
    assert!(dir.path().join("report.txt").exists());
}

#[test]
fn config_prints_defaults() {
    let dir = tempfile::tempdir().unwrap();
    bin()
        .arg("--config")
        .arg(dir.path().join("settings.json"))
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"catalog_url\": \"https://dummyjson.com/products\""))
        .stdout(predicate::str::contains("\"low_stock_threshold\": 10"));
}

#[test]
fn init_writes_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("conf").join("settings.json");
    bin()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&settings)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Settings written to"));
    assert!(settings.exists());
    assert!(dir.path().join("data").is_dir());
    assert!(dir.path().join("output").is_dir());
}
