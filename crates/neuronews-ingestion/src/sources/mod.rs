//! External-service clients and the seams the orchestrator depends on.

pub mod europepmc;
pub mod openalex;
pub mod pubmed;

use std::collections::HashMap;

use async_trait::async_trait;

/// Search + fetch against the literature database.
#[async_trait]
pub trait LiteratureGateway: Send + Sync {
    /// Identifiers matching `query` within the lookback window ending
    /// today. May be empty. Transport or decode failure is fatal for the
    /// current run.
    async fn search(
        &self,
        query: &str,
        lookback_days: i64,
        max_results: usize,
    ) -> anyhow::Result<Vec<String>>;

    /// Raw XML for one batch of identifiers. The caller keeps the batch
    /// within a safe per-request size.
    async fn fetch(&self, ids: &[String]) -> anyhow::Result<String>;
}

/// One bounded query against the citation index. Batching and merging
/// live in [`europepmc::fetch_citation_counts`].
#[async_trait]
pub trait CitationIndex: Send + Sync {
    async fn cited_by_batch(&self, ids: &[String]) -> anyhow::Result<HashMap<String, i32>>;
}

/// A bibliometrics source object: an id plus the two-year mean-citedness
/// statistic, when the service knows it.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    pub id: String,
    pub two_year_mean_citedness: Option<f64>,
}

/// Journal lookups against the bibliometrics service.
#[async_trait]
pub trait Bibliometrics: Send + Sync {
    async fn source_by_issn(&self, issn: &str) -> anyhow::Result<Option<SourceRecord>>;
    async fn source_by_name(&self, name: &str) -> anyhow::Result<Option<SourceRecord>>;
}
