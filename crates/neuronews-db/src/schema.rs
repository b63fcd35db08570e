//! Row types for the two tables the pipeline owns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const TABLE_ARTICLES: &str = "articles";
pub const TABLE_JOURNALS: &str = "journals";

/// One normalized literature record, ready for upsert. `url` is the
/// natural unique key; re-ingesting the same identifier is a no-op.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleRow {
    pub pmid: String,
    pub title: String,
    /// Short display form: up to 3 "Last Initials" names, then "et al.".
    pub authors: String,
    pub authors_full: String,
    pub journal: String,
    pub pub_date: String,
    pub abstract_text: String,
    pub doi: String,
    pub pub_types: String,
    pub mesh_terms: String,
    pub affiliation: String,
    pub citation_count: i32,
    pub grants: String,
    pub coi_statement: String,
    pub is_open_access: i32,
    pub pmc_id: String,
    pub issn: String,
    pub url: String,
}

/// One journal, keyed by `journal_name`. `impact_factor` stays NULL until
/// the bibliometrics resolver succeeds, which keeps the row eligible for
/// retry on later runs.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JournalRow {
    pub id: i64,
    pub journal_name: String,
    pub issn: String,
    pub impact_factor: Option<f64>,
    pub openalex_id: String,
    pub if_updated_at: Option<DateTime<Utc>>,
}

/// Projection handed to the enrichment orchestrator: articles with an
/// abstract but no summary yet.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UnenrichedArticle {
    pub id: i64,
    pub title: String,
    pub journal: String,
    pub abstract_text: String,
}

/// The six enrichment fields written back after a successful LLM call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleEnrichment {
    pub summary: String,
    pub importance: String,
    pub news_value: i32,
    pub subspecialty: String,
    pub article_type: String,
    pub clinical_relevance: String,
}
