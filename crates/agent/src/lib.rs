//! Oracle boundary for Compass.
//!
//! The language model is strictly a text generator: it proposes a strategy,
//! it never decides what gets persisted or which HTTP status the caller
//! sees. Everything model-shaped lives behind [`llm::LlmClient`] so the rest
//! of the system can swap in stubs or run without an oracle at all.

pub mod llm;
pub mod prompt;
pub mod strategist;

pub use llm::{ChatCompletionsClient, LlmClient, LlmError};
pub use strategist::{GeneratedStrategy, Strategist};
