//! TOML rule set parser.
//!
//! Loads question banks from TOML files and directories, compiles every
//! pattern once, and validates the result.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{
    ContextCondition, Expected, GradingRule, Question, RubricItem, RuleSet, Scoring,
};
use crate::pattern::Pattern;

/// Intermediate TOML structure for parsing rule set files.
#[derive(Debug, Deserialize)]
struct TomlRuleFile {
    rule_set: TomlRuleSetHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlRuleSetHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    #[serde(default)]
    prompt: String,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    expected: Option<toml::Value>,
    #[serde(default)]
    tolerance: Option<f64>,
    #[serde(default)]
    decimals: Option<u32>,
    #[serde(default)]
    rubric: Vec<TomlRubricItem>,
    #[serde(default)]
    forbidden: Vec<TomlPattern>,
    #[serde(default)]
    scoring: Scoring,
}

/// A phrase, or `{ regex = "..." }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TomlPattern {
    Phrase(String),
    Regex { regex: String },
}

impl TomlPattern {
    fn compile(&self) -> Pattern {
        match self {
            TomlPattern::Phrase(phrase) => Pattern::literal(phrase),
            TomlPattern::Regex { regex } => Pattern::regex_or_literal(regex),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TomlRubricItem {
    id: String,
    #[serde(default = "default_true")]
    required: bool,
    #[serde(default)]
    pattern: Option<TomlPattern>,
    #[serde(default)]
    patterns: Vec<TomlPattern>,
    #[serde(default)]
    when: Option<TomlCondition>,
}

#[derive(Debug, Deserialize)]
struct TomlCondition {
    key: String,
    #[serde(default)]
    equals: Option<toml::Value>,
    #[serde(default)]
    one_of: Option<Vec<toml::Value>>,
    #[serde(default)]
    present: Option<bool>,
    #[serde(default)]
    negate: bool,
}

fn default_true() -> bool {
    true
}

/// Parse a single TOML file into a `RuleSet`.
pub fn parse_rule_set(path: &Path) -> Result<RuleSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read rule set file: {}", path.display()))?;

    parse_rule_set_str(&content, path)
}

/// Parse a TOML string into a `RuleSet` (useful for testing).
pub fn parse_rule_set_str(content: &str, source_path: &Path) -> Result<RuleSet> {
    let parsed: TomlRuleFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let mut notes = Vec::new();
    let questions = parsed
        .questions
        .into_iter()
        .map(|q| build_question(q, &mut notes))
        .collect();

    for note in &notes {
        tracing::warn!(
            question = note.question_id.as_deref().unwrap_or("-"),
            "{}: {}",
            source_path.display(),
            note.message
        );
    }

    Ok(RuleSet {
        id: parsed.rule_set.id,
        name: parsed.rule_set.name,
        description: parsed.rule_set.description,
        questions,
        notes,
    })
}

/// Build one question. Malformed parts degrade with a note instead of
/// failing the whole rule set.
fn build_question(q: TomlQuestion, notes: &mut Vec<ValidationWarning>) -> Question {
    let mut note = |message: String| {
        notes.push(ValidationWarning {
            question_id: Some(q.id.clone()),
            message,
        });
    };

    let rule = match q.kind.as_deref().map(str::to_lowercase).as_deref() {
        Some("numeric") => GradingRule::Numeric {
            expected: numeric_expected(q.expected.as_ref()).unwrap_or_else(|message| {
                note(format!("{message}; the question cannot be graded"));
                Expected::computed(|_| None)
            }),
            tolerance: q.tolerance,
            decimals: q.decimals,
        },
        Some("exact") => GradingRule::Exact {
            expected: match &q.expected {
                Some(toml::Value::String(s)) => s.clone(),
                Some(toml::Value::Integer(i)) => i.to_string(),
                Some(toml::Value::Float(f)) => f.to_string(),
                Some(toml::Value::Boolean(b)) => b.to_string(),
                Some(other) => {
                    note(format!(
                        "exact expected must be a string, got {other}; the question cannot be graded"
                    ));
                    String::new()
                }
                None => {
                    note("exact rule has no expected value; the question cannot be graded".into());
                    String::new()
                }
            },
        },
        other => {
            if let Some(kind) = other.filter(|k| *k != "pattern") {
                note(format!("unknown kind '{kind}', graded as a pattern rule"));
            }
            GradingRule::Pattern {
                rubric: q
                    .rubric
                    .into_iter()
                    .map(|item| build_item(item, &mut note))
                    .collect(),
                forbidden: q.forbidden.iter().map(TomlPattern::compile).collect(),
                scoring: q.scoring,
            }
        }
    };

    Question {
        id: q.id,
        prompt: q.prompt,
        rule,
    }
}

fn numeric_expected(value: Option<&toml::Value>) -> Result<Expected, String> {
    match value {
        Some(toml::Value::Integer(i)) => Ok(Expected::Literal(*i as f64)),
        Some(toml::Value::Float(f)) => Ok(Expected::Literal(*f)),
        Some(toml::Value::String(s)) => s
            .trim()
            .parse()
            .map(Expected::Literal)
            .map_err(|_| format!("numeric expected '{s}' is not a number")),
        Some(toml::Value::Table(t)) => match t.get("from_context") {
            Some(toml::Value::String(key)) => Ok(Expected::FromContext(key.clone())),
            _ => Err("numeric expected table needs a string 'from_context' key".into()),
        },
        Some(other) => Err(format!("unsupported numeric expected value: {other}")),
        None => Err("numeric rule has no expected value".into()),
    }
}

fn build_item(item: TomlRubricItem, note: &mut impl FnMut(String)) -> RubricItem {
    let patterns = item
        .pattern
        .iter()
        .chain(item.patterns.iter())
        .map(TomlPattern::compile)
        .collect();
    let condition = item.when.and_then(|when| {
        build_condition(when)
            .map_err(|message| {
                note(format!(
                    "rubric item '{}': {message}; condition dropped",
                    item.id
                ))
            })
            .ok()
    });

    RubricItem {
        id: item.id,
        required: item.required,
        patterns,
        condition,
    }
}

fn build_condition(c: TomlCondition) -> Result<ContextCondition, String> {
    let to_json = |v: &toml::Value| serde_json::to_value(v).map_err(|e| e.to_string());

    let condition = match (&c.equals, &c.one_of, c.present) {
        (Some(value), None, None) => ContextCondition::Equals {
            key: c.key.clone(),
            value: to_json(value)?,
        },
        (None, Some(values), None) => ContextCondition::OneOf {
            key: c.key.clone(),
            values: values.iter().map(to_json).collect::<Result<_, _>>()?,
        },
        (None, None, Some(present)) => {
            let cond = ContextCondition::Present { key: c.key.clone() };
            if present {
                cond
            } else {
                ContextCondition::Not(Box::new(cond))
            }
        }
        _ => {
            return Err(format!(
                "condition on '{}' needs exactly one of equals, one_of, present",
                c.key
            ))
        }
    };

    Ok(if c.negate {
        ContextCondition::Not(Box::new(condition))
    } else {
        condition
    })
}

/// Recursively load all `.toml` rule set files from a directory.
pub fn load_rule_directory(dir: &Path) -> Result<Vec<RuleSet>> {
    let mut sets = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            sets.extend(load_rule_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_rule_set(&path) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(sets)
}

/// A warning from rule set validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a rule set for common authoring mistakes.
pub fn validate_rule_set(set: &RuleSet) -> Vec<ValidationWarning> {
    let mut warnings = set.notes.clone();
    let warn = |warnings: &mut Vec<ValidationWarning>, id: &str, message: String| {
        warnings.push(ValidationWarning {
            question_id: Some(id.to_string()),
            message,
        });
    };

    let mut seen_ids = HashSet::new();
    for q in &set.questions {
        if !seen_ids.insert(&q.id) {
            warn(&mut warnings, &q.id, format!("duplicate question ID: {}", q.id));
        }
    }

    for q in &set.questions {
        match &q.rule {
            GradingRule::Numeric { tolerance, .. } => {
                if tolerance.is_some_and(|t| t < 0.0) {
                    warn(&mut warnings, &q.id, "tolerance is negative".into());
                }
            }
            GradingRule::Exact { expected } => {
                if expected.trim().is_empty() {
                    warn(&mut warnings, &q.id, "exact expected value is blank".into());
                }
            }
            GradingRule::Pattern {
                rubric,
                forbidden,
                scoring,
            } => {
                if rubric.is_empty() {
                    warn(
                        &mut warnings,
                        &q.id,
                        "pattern rule has an empty rubric and accepts any answer".into(),
                    );
                }
                for item in rubric {
                    if item.patterns.is_empty() {
                        warn(
                            &mut warnings,
                            &q.id,
                            format!("rubric item '{}' has no patterns and never matches", item.id),
                        );
                    }
                }
                if let (Some(e), Some(p)) = (scoring.excellent_min, scoring.partial_min) {
                    if p > e {
                        warn(
                            &mut warnings,
                            &q.id,
                            format!("partial_min ({p}) exceeds excellent_min ({e})"),
                        );
                    }
                }
                let required = rubric.iter().filter(|i| i.required).count() as u32;
                if scoring.excellent_min.is_some_and(|e| e > required) {
                    warn(
                        &mut warnings,
                        &q.id,
                        format!("excellent_min exceeds the {required} required item(s)"),
                    );
                }
                for item in rubric {
                    if item.patterns.iter().any(|p| p.source().as_str().is_empty()) {
                        warn(
                            &mut warnings,
                            &q.id,
                            format!("rubric item '{}' has a blank pattern that matches every answer", item.id),
                        );
                    }
                }
                if forbidden.iter().any(|p| p.source().as_str().is_empty()) {
                    warn(
                        &mut warnings,
                        &q.id,
                        "forbidden list has a blank pattern that matches every answer".into(),
                    );
                }
                let degraded = rubric
                    .iter()
                    .flat_map(|i| i.patterns.iter())
                    .chain(forbidden.iter())
                    .filter(|p| p.is_degraded());
                for p in degraded {
                    warn(
                        &mut warnings,
                        &q.id,
                        format!("regex /{}/ does not compile, matched literally", p.source().as_str()),
                    );
                }
            }
        }
    }

    warnings
}
