//! tiergrade-providers — AI judge and appeal adjudicator backends.
//!
//! Implements the core `Adjudicator` trait on top of chat-completion APIs
//! (Anthropic and OpenAI-compatible), plus a mock for tests and the
//! configuration layer that selects between them.

pub mod adjudicator;
pub mod anthropic;
pub mod backend;
pub mod config;
pub mod error;
pub mod mock;
pub mod openai;

pub use adjudicator::LlmAdjudicator;
pub use config::{create_adjudicator, load_config, load_config_from, ProviderConfig, TiergradeConfig};
pub use mock::MockAdjudicator;
pub use error::ProviderError;
