//! Grading rule model.
//!
//! Rules are built once (by hand or by [`crate::parser`]) with every pattern
//! already compiled. They hold no interior mutability, so a rule can be
//! shared across threads and evaluated concurrently without locks.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::parser::ValidationWarning;
use crate::pattern::Pattern;

// ---------------------------------------------------------------------------
// Grading context
// ---------------------------------------------------------------------------

/// Arbitrary key/value data supplied alongside an answer.
///
/// Only context conditions and context-derived expected values look at it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradingContext(Map<String, Value>);

impl GradingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Numeric lookup. Accepts JSON numbers and numeric strings.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for GradingContext {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// ---------------------------------------------------------------------------
// Context conditions
// ---------------------------------------------------------------------------

/// Predicate deciding whether a rubric item applies in a given context.
#[derive(Clone)]
pub enum ContextCondition {
    /// `context[key] == value`. Strings compare case-insensitively.
    Equals { key: String, value: Value },
    /// `context[key]` is one of `values`.
    OneOf { key: String, values: Vec<Value> },
    /// `context[key]` is set and not null.
    Present { key: String },
    Not(Box<ContextCondition>),
    Custom(Arc<dyn Fn(&GradingContext) -> bool + Send + Sync>),
}

impl ContextCondition {
    pub fn custom(f: impl Fn(&GradingContext) -> bool + Send + Sync + 'static) -> Self {
        ContextCondition::Custom(Arc::new(f))
    }

    pub fn holds(&self, context: &GradingContext) -> bool {
        match self {
            ContextCondition::Equals { key, value } => context
                .get(key)
                .is_some_and(|actual| values_equal(actual, value)),
            ContextCondition::OneOf { key, values } => context
                .get(key)
                .is_some_and(|actual| values.iter().any(|v| values_equal(actual, v))),
            ContextCondition::Present { key } => {
                context.get(key).is_some_and(|v| !v.is_null())
            }
            ContextCondition::Not(inner) => !inner.holds(context),
            ContextCondition::Custom(f) => f(context),
        }
    }
}

fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::String(a), Value::String(b)) => a.eq_ignore_ascii_case(b),
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        // Context values often arrive as strings from form fields.
        (Value::String(a), Value::Number(b)) | (Value::Number(b), Value::String(a)) => {
            a.trim().parse::<f64>().ok() == b.as_f64()
        }
        _ => actual == expected,
    }
}

impl fmt::Debug for ContextCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextCondition::Equals { key, value } => f
                .debug_struct("Equals")
                .field("key", key)
                .field("value", value)
                .finish(),
            ContextCondition::OneOf { key, values } => f
                .debug_struct("OneOf")
                .field("key", key)
                .field("values", values)
                .finish(),
            ContextCondition::Present { key } => {
                f.debug_struct("Present").field("key", key).finish()
            }
            ContextCondition::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
            ContextCondition::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Rubric items
// ---------------------------------------------------------------------------

/// A named concept an answer should demonstrate.
#[derive(Debug, Clone)]
pub struct RubricItem {
    pub id: String,
    /// Only required items count toward the tier thresholds.
    pub required: bool,
    /// Alternative phrasings; the item matches if any of them does.
    pub patterns: Vec<Pattern>,
    /// The item is evaluated only when this holds.
    pub condition: Option<ContextCondition>,
}

impl RubricItem {
    pub fn required(id: &str, patterns: impl IntoIterator<Item = Pattern>) -> Self {
        Self {
            id: id.to_string(),
            required: true,
            patterns: patterns.into_iter().collect(),
            condition: None,
        }
    }

    pub fn optional(id: &str, patterns: impl IntoIterator<Item = Pattern>) -> Self {
        Self {
            required: false,
            ..Self::required(id, patterns)
        }
    }

    pub fn when(mut self, condition: ContextCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Whether this item is evaluated in `context`.
    pub fn applies(&self, context: &GradingContext) -> bool {
        self.condition.as_ref().is_none_or(|c| c.holds(context))
    }

    /// Whether any pattern matches `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Where a numeric rule's expected value comes from.
#[derive(Clone)]
pub enum Expected {
    Literal(f64),
    /// Looked up in the grading context.
    FromContext(String),
    Computed(Arc<dyn Fn(&GradingContext) -> Option<f64> + Send + Sync>),
}

impl Expected {
    pub fn computed(f: impl Fn(&GradingContext) -> Option<f64> + Send + Sync + 'static) -> Self {
        Expected::Computed(Arc::new(f))
    }

    /// Resolve to a finite number, or `None` if the context cannot supply one.
    pub fn resolve(&self, context: &GradingContext) -> Option<f64> {
        let value = match self {
            Expected::Literal(v) => Some(*v),
            Expected::FromContext(key) => context.get_f64(key),
            Expected::Computed(f) => f(context),
        }?;
        value.is_finite().then_some(value)
    }
}

impl fmt::Debug for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            Expected::FromContext(key) => f.debug_tuple("FromContext").field(key).finish(),
            Expected::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<f64> for Expected {
    fn from(value: f64) -> Self {
        Expected::Literal(value)
    }
}

/// Tier thresholds for pattern rules. Unset fields use the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoring {
    #[serde(default)]
    pub excellent_min: Option<u32>,
    #[serde(default)]
    pub partial_min: Option<u32>,
}

impl Scoring {
    pub fn new(excellent_min: u32, partial_min: u32) -> Self {
        Self {
            excellent_min: Some(excellent_min),
            partial_min: Some(partial_min),
        }
    }

    /// Resolve thresholds for a rubric with `total_required` applicable
    /// required items. Returns `(excellent_min, partial_min)` with
    /// `excellent_min >= partial_min`.
    pub fn resolve(&self, total_required: u32) -> (u32, u32) {
        let excellent = self.excellent_min.unwrap_or(total_required);
        let partial = self
            .partial_min
            .unwrap_or_else(|| excellent.div_ceil(2))
            .min(excellent);
        (excellent, partial)
    }
}

/// A declarative grading rule.
#[derive(Debug, Clone)]
pub enum GradingRule {
    Numeric {
        expected: Expected,
        /// Relative tolerance; the engine default applies when unset.
        tolerance: Option<f64>,
        /// Decimals shown in feedback; the engine default applies when unset.
        decimals: Option<u32>,
    },
    Exact {
        expected: String,
    },
    Pattern {
        rubric: Vec<RubricItem>,
        forbidden: Vec<Pattern>,
        scoring: Scoring,
    },
}

impl GradingRule {
    pub fn numeric(expected: impl Into<Expected>, tolerance: f64) -> Self {
        GradingRule::Numeric {
            expected: expected.into(),
            tolerance: Some(tolerance),
            decimals: None,
        }
    }

    pub fn exact(expected: &str) -> Self {
        GradingRule::Exact {
            expected: expected.to_string(),
        }
    }

    pub fn pattern(rubric: Vec<RubricItem>) -> Self {
        GradingRule::Pattern {
            rubric,
            forbidden: Vec::new(),
            scoring: Scoring::default(),
        }
    }

    /// Short name of the rule kind.
    pub fn kind(&self) -> RuleKind {
        match self {
            GradingRule::Numeric { .. } => RuleKind::Numeric,
            GradingRule::Exact { .. } => RuleKind::Exact,
            GradingRule::Pattern { .. } => RuleKind::Pattern,
        }
    }

    /// Ids of the required rubric items that apply in `context`.
    /// Empty for numeric and exact rules.
    pub fn required_item_ids(&self, context: &GradingContext) -> Vec<String> {
        match self {
            GradingRule::Pattern { rubric, .. } => rubric
                .iter()
                .filter(|item| item.required && item.applies(context))
                .map(|item| item.id.clone())
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Rule kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Numeric,
    Exact,
    Pattern,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Numeric => write!(f, "numeric"),
            RuleKind::Exact => write!(f, "exact"),
            RuleKind::Pattern => write!(f, "pattern"),
        }
    }
}

// ---------------------------------------------------------------------------
// Rule sets
// ---------------------------------------------------------------------------

/// A question and the rule that grades it.
#[derive(Debug, Clone)]
pub struct Question {
    pub id: String,
    /// Question text, forwarded to AI judges for context.
    pub prompt: String,
    pub rule: GradingRule,
}

/// A collection of questions loaded from one rule file.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub id: String,
    pub name: String,
    pub description: String,
    pub questions: Vec<Question>,
    /// Problems noticed while parsing, reported again by validation.
    pub notes: Vec<ValidationWarning>,
}

impl RuleSet {
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}
