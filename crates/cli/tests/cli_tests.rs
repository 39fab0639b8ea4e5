//! CLI integration tests
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("alertsift")
}

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn get_mailbox_path(name: &str) -> String {
    format!("../../tests/fixtures/mailbox/{}", name)
}

fn list_cmd() -> assert_cmd::Command {
    let mut cmd = cmd();
    cmd.args([
        "list",
        "--google-alerts",
        &get_fixture_path("report.json"),
        "--scholar-alerts",
        &get_fixture_path("scholar_report.json"),
    ]);
    cmd
}

#[test]
fn test_cli_extract_json() {
    let output = cmd().args(["extract", &get_mailbox_path("01_google_alert.eml")]).output().unwrap();
    assert!(output.status.success());

    let alerts: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(alerts[0]["alert_query"], "machine learning mineral exploration");
    assert_eq!(alerts[0]["message_id"], "alert-0001@google.com");
    assert_eq!(alerts[0]["articles"][0]["url"], "https://www.mining.com/machine-learning-maps-copper-porphyry-targets/");
    assert_eq!(alerts[0]["articles"].as_array().unwrap().len(), 2);
}

#[test]
fn test_cli_extract_text_multiple_files() {
    cmd()
        .args(["extract", "-f", "text", &get_mailbox_path("02_scholar_alert.eml"), &get_mailbox_path("03_plain_alert.eml")])
        .assert()
        .success()
        .stdout(predicate::str::contains("mineral prospectivity"))
        .stdout(predicate::str::contains("   https://www.sciencedirect.com/science/article/pii/S0169136824000123"))
        .stdout(predicate::str::contains("lithium exploration"));
}

#[test]
fn test_cli_extract_explicit_channel() {
    let output = cmd()
        .args(["extract", "--channel", "google", &get_mailbox_path("02_scholar_alert.eml")])
        .output()
        .unwrap();
    let alerts: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(alerts[0]["alert_query"], "Google Scholar Alert - mineral prospectivity");
}

#[test]
fn test_cli_extract_exclude_domain() {
    let output = cmd()
        .args(["extract", "--exclude", "techcrunch.com", &get_mailbox_path("01_google_alert.eml")])
        .output()
        .unwrap();
    let alerts: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(alerts[0]["articles"].as_array().unwrap().len(), 1);
}

#[test]
fn test_cli_extract_missing_file() {
    cmd().args(["extract", "nonexistent.eml"]).assert().failure();
}

#[test]
fn test_cli_extract_requires_files() {
    cmd().arg("extract").assert().failure();
}

#[test]
fn test_cli_list_text() {
    list_cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("CHRONOLOGICAL ARTICLE LIST"))
        .stdout(predicate::str::contains("Total Articles: 3"))
        .stdout(predicate::str::contains("1. [x] Machine learning maps copper porphyry targets in Arizona"))
        .stdout(predicate::str::contains("[Scholar Alert] | Date: 2024-01-10T08:00:00"))
        .stdout(predicate::str::contains("Bitcoin").not());
}

#[test]
fn test_cli_list_show_all_json() {
    let output = list_cmd().args(["--show-all", "-f", "json"]).output().unwrap();
    assert!(output.status.success());

    let articles: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let articles = articles.as_array().unwrap();
    assert_eq!(articles.len(), 4);
    assert_eq!(articles[0]["source"], "google_alerts");
    assert!(articles.iter().any(|a| a["is_relevant"] == false));
}

#[test]
fn test_cli_list_single_channel() {
    list_cmd()
        .args(["--scholar-alerts-only", "-f", "markdown"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Chronological Article List"))
        .stdout(predicate::str::contains("**Total Articles:** 1"));
}

#[test]
fn test_cli_list_conflicting_filters() {
    list_cmd().args(["--google-alerts-only", "--scholar-alerts-only"]).assert().failure();
}

#[test]
fn test_cli_list_no_reports() {
    let tmp = TempDir::new().unwrap();
    cmd()
        .args(["list", "--google-alerts"])
        .arg(tmp.path().join("missing.json"))
        .arg("--scholar-alerts")
        .arg(tmp.path().join("also_missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No articles found in any report files."));
}

#[test]
fn test_cli_list_output_file() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("articles.md");

    list_cmd().args(["-f", "markdown", "-o", output.to_str().unwrap()]).assert().success();

    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.contains("## 1. Machine learning maps copper porphyry targets in Arizona"));
}

#[test]
fn test_cli_list_separate() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("articles.txt");

    list_cmd().args(["--separate", "-o", output.to_str().unwrap()]).assert().success();

    let google = std::fs::read_to_string(tmp.path().join("articles_google.txt")).unwrap();
    let scholar = std::fs::read_to_string(tmp.path().join("articles_scholar.txt")).unwrap();
    assert!(google.contains("Total Articles: 2"));
    assert!(scholar.contains("Total Articles: 1"));
    assert!(!output.exists());
}

#[test]
fn test_cli_separate_requires_output() {
    list_cmd().arg("--separate").assert().failure();
}

#[test]
fn test_cli_report() {
    cmd()
        .args(["report", &get_fixture_path("report.json")])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Google Alerts Analysis Report"))
        .stdout(predicate::str::contains("- **Relevance Rate:** 50.0%"));
}

#[test]
fn test_cli_report_mailbox_statistics() {
    cmd()
        .args(["report", "--channel", "scholar", &get_fixture_path("scholar_mailbox_report.json")])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Scholar Alerts Analysis Report"))
        .stdout(predicate::str::contains("- **Total Scholar Alerts (in period):** 12"))
        .stdout(predicate::str::contains("- **Unread:** 3"))
        .stdout(predicate::str::contains("### 1. hyperspectral core logging"));
}

#[test]
fn test_cli_report_invalid_json() {
    cmd().args(["report", &get_fixture_path("google_alert.html")]).assert().failure();
}

#[test]
fn test_cli_resolve() {
    cmd()
        .args([
            "resolve",
            "https://www.google.com/url?rct=j&sa=t&url=https://example.com/article&ct=ga",
            "https://www.google.com/url?url=https://www.facebook.com/sharer/sharer.php",
            "https://scholar.google.de/scholar?q=copper",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://example.com/article\tkept"))
        .stdout(predicate::str::contains("https://www.facebook.com/sharer/sharer.php\texcluded"))
        .stdout(predicate::str::contains("https://scholar.google.de/scholar?q=copper\texcluded"));
}

#[test]
fn test_cli_verbose() {
    cmd()
        .args(["-v", "extract", &get_mailbox_path("01_google_alert.eml")])
        .assert()
        .success()
        .stderr(predicate::str::contains("alertsift"))
        .stderr(predicate::str::contains("Debug logging enabled"));
}
