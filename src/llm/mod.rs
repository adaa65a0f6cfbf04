//! LLM client capability
//!
//! The pipeline only needs `complete(system, user) -> text`. Which vendor
//! answers is a configuration choice, see [`provider::create_client`].

pub mod provider;

pub use provider::{create_client, AnthropicClient, LlmClient, LlmError, LlmResponse, OpenAIClient};
