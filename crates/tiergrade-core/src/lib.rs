//! tiergrade-core — Tiered answer grading engine.
//!
//! This crate defines the grading rule model, the three comparators
//! (rubric, numeric, exact), the engine that dispatches between them, the
//! upgrade-only merge of local and AI verdicts, and the appeal workflow.

pub mod appeal;
pub mod combine;
pub mod engine;
pub mod error;
pub mod exact;
pub mod model;
pub mod numeric;
pub mod parser;
pub mod pattern;
pub mod results;
pub mod rubric;
pub mod tier;
pub mod traits;

pub use engine::{EngineConfig, GradingEngine};
pub use model::{GradingContext, GradingRule};
pub use results::{DualResult, GradeResult};
pub use tier::Tier;
