//! neuronews-ingestion — the two batch runs of the pipeline.
//!
//! Ingestion: search PubMed, fetch and parse article XML, count citations
//! via Europe PMC, upsert to storage, sync journals and resolve impact
//! factors from OpenAlex. Enrichment: drive the LLM processor over
//! not-yet-summarized articles.

pub mod enrichment;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod sources;
pub mod xml;

pub use enrichment::{run_enrichment, EnrichmentOutcome};
pub use models::ArticleRecord;
pub use pipeline::{run_ingestion, IngestionJob, IngestionOutcome};
