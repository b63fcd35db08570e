//! neuronews-llm — text-completion backends and the enrichment processor.

pub mod backend;
pub mod enrich;

pub use backend::{
    AnthropicBackend, LlmBackend, LlmError, LlmRequest, LlmResponse, Message,
    OpenAiCompatibleBackend,
};
pub use enrich::{enrich_article, EnrichError, Enrichment};
