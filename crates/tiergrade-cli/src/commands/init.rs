//! The `tiergrade init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("tiergrade.toml").exists() {
        println!("tiergrade.toml already exists, skipping.");
    } else {
        std::fs::write("tiergrade.toml", SAMPLE_CONFIG)?;
        println!("Created tiergrade.toml");
    }

    std::fs::create_dir_all("rule-sets")?;
    let example_path = std::path::Path::new("rule-sets/example.toml");
    if example_path.exists() {
        println!("rule-sets/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_RULE_SET)?;
        println!("Created rule-sets/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit tiergrade.toml with your API keys");
    println!("  2. Run: tiergrade validate --rules rule-sets/example.toml");
    println!(
        "  3. Run: tiergrade grade --rules rule-sets/example.toml --question capital --answer Paris"
    );

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# tiergrade configuration

default_provider = "anthropic"
default_model = "claude-sonnet-4-20250514"
judge_timeout_secs = 20

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[grading]
default_tolerance = 0.01
default_decimals = 2

[appeals]
enabled = true
timeout_secs = 30
"#;

const EXAMPLE_RULE_SET: &str = r#"[rule_set]
id = "example"
name = "Example Rule Set"
description = "One question of each kind to get started"

[[questions]]
id = "capital"
prompt = "What is the capital of France?"
kind = "exact"
expected = "Paris"

[[questions]]
id = "sample-mean"
prompt = "The values are 98, 100 and 102. What is their mean?"
kind = "numeric"
expected = 100
tolerance = 0.01
decimals = 1

[[questions]]
id = "describe-center"
prompt = "Describe the center and spread of a right-skewed distribution."
kind = "pattern"
forbidden = [{ regex = "\\bmean is (the )?best\\b" }]

[[questions.rubric]]
id = "center"
patterns = ["median"]

[[questions.rubric]]
id = "spread"
patterns = ["iqr", "interquartile range"]

[[questions.rubric]]
id = "shape"
required = false
patterns = ["skew", "tail"]
"#;
