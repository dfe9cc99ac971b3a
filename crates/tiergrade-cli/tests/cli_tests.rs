//! CLI integration tests using assert_cmd.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const STATISTICS: &str = "../../rule-sets/statistics.toml";
const BASICS: &str = "../../rule-sets/basics.toml";

fn tiergrade() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("tiergrade").unwrap()
}

/// Write a config whose default provider is an offline mock scoring `score`.
fn mock_config(dir: &TempDir, score: &str, appeals_enabled: bool) -> PathBuf {
    let path = dir.path().join("tiergrade.toml");
    std::fs::write(
        &path,
        format!(
            r#"
default_provider = "offline"

[providers.offline]
type = "mock"
score = "{score}"
feedback = "Judged offline."

[appeals]
enabled = {appeals_enabled}
"#
        ),
    )
    .unwrap();
    path
}

fn json_stdout(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn validate_valid_rule_set() {
    tiergrade()
        .arg("validate")
        .arg("--rules")
        .arg(STATISTICS)
        .assert()
        .success()
        .stdout(predicate::str::contains("5 questions"))
        .stdout(predicate::str::contains("All rule sets valid"));
}

#[test]
fn validate_directory() {
    tiergrade()
        .arg("validate")
        .arg("--rules")
        .arg("../../rule-sets")
        .assert()
        .success()
        .stdout(predicate::str::contains("Intro Statistics"))
        .stdout(predicate::str::contains("Basics"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(
        &path,
        r#"
[rule_set]
id = "bad"
name = "Bad"

[[questions]]
id = "q1"
kind = "essay"

[[questions]]
id = "q1"
kind = "numeric"
expected = 3
tolerance = -0.1
"#,
    )
    .unwrap();

    tiergrade()
        .arg("validate")
        .arg("--rules")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown kind 'essay'"))
        .stdout(predicate::str::contains("duplicate question ID"))
        .stdout(predicate::str::contains("tolerance is negative"))
        .stdout(predicate::str::contains("warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    tiergrade()
        .arg("validate")
        .arg("--rules")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

// ---------------------------------------------------------------------------
// grade
// ---------------------------------------------------------------------------

#[test]
fn grade_rubric_excellent_as_json() {
    let output = tiergrade()
        .args(["grade", "--rules", STATISTICS, "--question", "describe-distribution"])
        .args(["--answer", "Skewed right, median of 22 minutes, IQR of 15"])
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = json_stdout(&output);
    assert_eq!(json["question"], "describe-distribution");
    assert_eq!(json["tier"], "excellent");
    assert_eq!(json["correct"], true);
    assert_eq!(json["source"], "local");
    assert_eq!(json["matched"], serde_json::json!(["shape", "center", "spread"]));
    assert!(json["graded_at"].is_string());
}

#[test]
fn grade_rubric_partial_as_text() {
    tiergrade()
        .args(["grade", "--rules", STATISTICS, "--question", "describe-distribution"])
        .args(["--answer", "It is skewed with a median of 22"])
        .assert()
        .success()
        .stdout(predicate::str::contains("partial"))
        .stdout(predicate::str::contains("Good start. To improve, address: spread."));
}

#[test]
fn grade_forbidden_term() {
    tiergrade()
        .args(["grade", "--rules", STATISTICS, "--question", "describe-distribution"])
        .args(["--answer", "Skewed, median 22, IQR 15. This proves commutes are long."])
        .assert()
        .success()
        .stdout(predicate::str::contains("insufficient"))
        .stdout(predicate::str::contains("incorrect statement"));
}

#[test]
fn grade_blank_answer() {
    tiergrade()
        .args(["grade", "--rules", BASICS, "--question", "capital"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No answer provided."));
}

#[test]
fn grade_answer_from_file() {
    let dir = TempDir::new().unwrap();
    let answer = dir.path().join("answer.txt");
    std::fs::write(&answer, "  paris \n").unwrap();

    let output = tiergrade()
        .args(["grade", "--rules", BASICS, "--question", "capital", "--format", "json"])
        .arg("--answer-file")
        .arg(&answer)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(json_stdout(&output)["tier"], "excellent");
}

#[test]
fn grade_numeric_from_context() {
    let output = tiergrade()
        .args(["grade", "--rules", STATISTICS, "--question", "expected-count"])
        .args(["--answer", "15", "--context", "expected_count=15", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(json_stdout(&output)["tier"], "excellent");
}

#[test]
fn grade_numeric_without_context_is_unresolved() {
    tiergrade()
        .args(["grade", "--rules", STATISTICS, "--question", "expected-count"])
        .args(["--answer", "15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("could not be graded automatically"));
}

#[test]
fn grade_conditional_item_follows_context() {
    let answer = "The statistic is 2.1 standard errors above the null";

    let without = tiergrade()
        .args(["grade", "--rules", STATISTICS, "--question", "test-statistic"])
        .args(["--answer", answer, "--format", "json"])
        .output()
        .unwrap();
    assert_eq!(json_stdout(&without)["tier"], "excellent");

    let with_t = tiergrade()
        .args(["grade", "--rules", STATISTICS, "--question", "test-statistic"])
        .args(["--answer", answer, "--context", "test=t", "--format", "json"])
        .output()
        .unwrap();
    let json = json_stdout(&with_t);
    assert_eq!(json["tier"], "excellent");
    assert_eq!(json["missing"], serde_json::json!(["degrees-of-freedom"]));
}

#[test]
fn grade_unknown_question() {
    tiergrade()
        .args(["grade", "--rules", BASICS, "--question", "nope", "--answer", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("question 'nope' not found"));
}

#[test]
fn grade_with_ai_upgrades() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(&dir, "E", true);

    let output = tiergrade()
        .args(["grade", "--rules", STATISTICS, "--question", "describe-distribution"])
        .args(["--answer", "the middle value is 22 and the middle half spans 15"])
        .args(["--ai", "--format", "json"])
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = json_stdout(&output);
    assert_eq!(json["tier"], "excellent");
    assert_eq!(json["source"], "ai");
    assert_eq!(json["local_tier"], "insufficient");
    assert_eq!(json["feedback"], "Judged offline.");
}

#[test]
fn grade_with_ai_never_downgrades() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(&dir, "I", true);

    let output = tiergrade()
        .args(["grade", "--rules", BASICS, "--question", "capital", "--answer", "Paris"])
        .args(["--ai", "--format", "json"])
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    let json = json_stdout(&output);
    assert_eq!(json["tier"], "excellent");
    assert_eq!(json["source"], "local");
    assert_eq!(json["ai_tier"], "insufficient");
}

#[test]
fn grade_blank_answer_with_ai_stays_insufficient() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(&dir, "E", true);

    let output = tiergrade()
        .args(["grade", "--rules", BASICS, "--question", "capital", "--answer", "   "])
        .args(["--ai", "--format", "json"])
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = json_stdout(&output);
    assert_eq!(json["tier"], "insufficient");
    assert_eq!(json["source"], "local");
    assert_eq!(json["ai_tier"], serde_json::Value::Null);
    assert_eq!(json["feedback"], "No answer provided.");
}

#[test]
fn grade_with_ai_unconfigured_falls_back_to_local() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("tiergrade.toml");
    std::fs::write(&config, "default_provider = \"missing\"\n").unwrap();

    let output = tiergrade()
        .args(["grade", "--rules", BASICS, "--question", "capital", "--answer", "Lyon"])
        .args(["--ai", "--format", "json"])
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = json_stdout(&output);
    assert_eq!(json["tier"], "insufficient");
    assert_eq!(json["source"], "local");
}

// ---------------------------------------------------------------------------
// appeal
// ---------------------------------------------------------------------------

#[test]
fn appeal_granted_by_adjudicator() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(&dir, "E", true);

    let output = tiergrade()
        .args(["appeal", "--rules", STATISTICS, "--question", "describe-distribution"])
        .args(["--answer", "skewed with median 22"])
        .args(["--reasoning", "I described the spread with the range"])
        .args(["--prior-tier", "P"])
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = json_stdout(&output);
    assert_eq!(json["accepted"], true);
    assert_eq!(json["granted"], true);
    assert_eq!(json["tier"], "excellent");
    assert_eq!(json["previous_tier"], "partial");
    assert_eq!(json["upgraded"], true);
}

#[test]
fn appeal_regrades_when_no_prior_given() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(&dir, "P", true);

    let output = tiergrade()
        .args(["appeal", "--rules", BASICS, "--question", "capital"])
        .args(["--answer", "Lyon", "--reasoning", "Lyon was once considered"])
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    let json = json_stdout(&output);
    assert_eq!(json["previous_tier"], "insufficient");
    assert_eq!(json["tier"], "partial");
}

#[test]
fn appeal_reads_prior_from_grade_output() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(&dir, "E", true);

    let graded = tiergrade()
        .args(["grade", "--rules", BASICS, "--question", "percent", "--answer", "120"])
        .args(["--format", "json"])
        .output()
        .unwrap();
    let prior = dir.path().join("prior.json");
    std::fs::write(&prior, &graded.stdout).unwrap();

    let output = tiergrade()
        .args(["appeal", "--rules", BASICS, "--question", "percent"])
        .args(["--answer", "120", "--reasoning", "I misread the percentage"])
        .arg("--prior")
        .arg(&prior)
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = json_stdout(&output);
    assert_eq!(json["previous_tier"], "insufficient");
    assert_eq!(json["accepted"], true);
}

#[test]
fn appeal_without_reasoning_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(&dir, "E", true);

    let output = tiergrade()
        .args(["appeal", "--rules", BASICS, "--question", "capital"])
        .args(["--answer", "Lyon", "--reasoning", "  ", "--prior-tier", "I"])
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    let json = json_stdout(&output);
    assert_eq!(json["accepted"], false);
    assert_eq!(json["tier"], "insufficient");
    assert_eq!(json["error"], "Please provide reasoning for your appeal.");
}

#[test]
fn appeal_when_disabled() {
    let dir = TempDir::new().unwrap();
    let config = mock_config(&dir, "E", false);

    let output = tiergrade()
        .args(["appeal", "--rules", BASICS, "--question", "capital"])
        .args(["--answer", "Lyon", "--reasoning", "please", "--prior-tier", "I"])
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    let json = json_stdout(&output);
    assert_eq!(json["accepted"], false);
    assert_eq!(json["error"], "AI appeals are not available.");
}

#[test]
fn appeal_rejects_unknown_prior_tier() {
    tiergrade()
        .args(["appeal", "--rules", BASICS, "--question", "capital"])
        .args(["--answer", "Lyon", "--reasoning", "please", "--prior-tier", "A+"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown tier"));
}

// ---------------------------------------------------------------------------
// init / help
// ---------------------------------------------------------------------------

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    tiergrade()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created tiergrade.toml"))
        .stdout(predicate::str::contains("Created rule-sets/example.toml"));

    assert!(dir.path().join("tiergrade.toml").exists());
    assert!(dir.path().join("rule-sets/example.toml").exists());

    tiergrade()
        .current_dir(dir.path())
        .args(["validate", "--rules", "rule-sets/example.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 questions"))
        .stdout(predicate::str::contains("All rule sets valid"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    tiergrade()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    tiergrade()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn help_output() {
    tiergrade()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tiered answer grading engine"));
}
