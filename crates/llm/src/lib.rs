//! SpecFlow text-generation adapters.
//!
//! Implements the [`pipeline::GenerationClient`] trait once per pipeline role:
//!
//! | Role | Type | Service |
//! |------|------|---------|
//! | Specifier | [`AnthropicSpecifier`] | Anthropic Messages API |
//! | Designer | [`OpenAiDesigner`] | OpenAI Chat Completions |
//! | Researcher | [`PerplexityResearcher`] | Perplexity (OpenAI-compatible chat) |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** All HTTP transport, request formatting, and response
//! extraction live here. The [`pipeline`] crate sees only
//! [`pipeline::GenerationClient`]; locating the text inside a provider's
//! response payload never leaks past this crate.
//!
//! No adapter retries. Any transport error, non-success status, or
//! undecodable body becomes a [`ProviderError`] wrapped in a
//! [`pipeline::GenerationFailure`] for the adapter's role.

mod chat;
mod http;

pub mod anthropic;
pub mod credential;
pub mod error;
pub mod openai;
pub mod perplexity;
pub mod prompts;

pub use anthropic::{AnthropicConfig, AnthropicSpecifier};
pub use credential::Credential;
pub use error::ProviderError;
pub use openai::{OpenAiConfig, OpenAiDesigner};
pub use perplexity::{PerplexityConfig, PerplexityResearcher};
pub use prompts::RESEARCH_UNAVAILABLE;
