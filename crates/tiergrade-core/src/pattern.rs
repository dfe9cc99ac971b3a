//! Compiled text patterns.
//!
//! Rubric phrases arrive either as plain phrases or as raw regular
//! expressions. Both are normalized into one compiled, case-insensitive
//! [`Pattern`] when the rule is built, so matching never compiles anything.

use std::fmt;

use regex::{Regex, RegexBuilder};

/// Where a pattern came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSource {
    /// A phrase matched as a literal substring.
    Literal(String),
    /// A raw regular expression.
    Regex(String),
}

impl PatternSource {
    pub fn as_str(&self) -> &str {
        match self {
            PatternSource::Literal(s) | PatternSource::Regex(s) => s,
        }
    }
}

/// A compiled, case-insensitive text pattern.
#[derive(Clone)]
pub struct Pattern {
    source: PatternSource,
    regex: Regex,
    degraded: bool,
}

impl Pattern {
    /// Compile a literal phrase.
    pub fn literal(phrase: &str) -> Self {
        Self {
            source: PatternSource::Literal(phrase.to_string()),
            regex: build(&regex::escape(phrase)).unwrap_or_else(|_| never_matches()),
            degraded: false,
        }
    }

    /// Compile a raw regular expression, failing on invalid syntax.
    pub fn regex(expr: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            source: PatternSource::Regex(expr.to_string()),
            regex: build(expr)?,
            degraded: false,
        })
    }

    /// Compile a raw regular expression, falling back to a literal match of
    /// its source text when it does not compile.
    pub fn regex_or_literal(expr: &str) -> Self {
        match Self::regex(expr) {
            Ok(pattern) => pattern,
            Err(e) => {
                tracing::warn!("invalid pattern /{expr}/, matching it literally: {e}");
                Self {
                    degraded: true,
                    ..Self::literal(expr)
                }
            }
        }
    }

    pub fn source(&self) -> &PatternSource {
        &self.source
    }

    /// `true` if this pattern was meant as a regex but failed to compile.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// The first matching span of `text`, if any.
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex.find(text).map(|m| m.as_str())
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("source", &self.source)
            .field("degraded", &self.degraded)
            .finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl From<&str> for Pattern {
    fn from(phrase: &str) -> Self {
        Pattern::literal(phrase)
    }
}

fn build(expr: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(expr).case_insensitive(true).build()
}

// An escaped literal only fails to compile past the regex size limit.
fn never_matches() -> Regex {
    Regex::new(r"\b\B").expect("contradictory assertions are a valid regex")
}
