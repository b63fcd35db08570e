//! The persistence seam between orchestrators and the database.

use async_trait::async_trait;

use crate::error::Result;
use crate::schema::{ArticleEnrichment, ArticleRow, JournalRow, UnenrichedArticle};

/// Everything the two batch orchestrators need from storage. Implemented
/// by [`crate::PgStore`] in production and by in-memory fakes in tests.
#[async_trait]
pub trait NewsStore: Send + Sync {
    /// Insert articles, ignoring any whose `url` already exists.
    /// Returns the number of newly inserted rows.
    async fn upsert_articles(&self, articles: &[ArticleRow]) -> Result<u64>;

    async fn article_count(&self) -> Result<i64>;

    /// Distinct (journal, issn) pairs across stored articles, excluding
    /// articles with no journal name.
    async fn distinct_journal_pairs(&self) -> Result<Vec<(String, String)>>;

    /// Insert one journal row per distinct name, ignoring conflicts so an
    /// existing row (and its ISSN) is never overwritten.
    async fn upsert_journals(&self, pairs: &[(String, String)]) -> Result<u64>;

    /// Fill in an empty journal ISSN from any stored article of that
    /// journal that has one. Returns the number of journals updated.
    async fn backfill_journal_issn(&self) -> Result<u64>;

    /// Journals still lacking an impact factor, each visited at most once
    /// per run by the resolver.
    async fn journals_missing_impact(&self) -> Result<Vec<JournalRow>>;

    /// Record the outcome of a bibliometrics lookup that found a source:
    /// the extracted impact factor (possibly absent), the source id, and
    /// the resolve timestamp.
    async fn record_journal_resolution(
        &self,
        journal_id: i64,
        impact_factor: Option<f64>,
        openalex_id: &str,
    ) -> Result<()>;

    /// Copy each resolved journal impact factor onto that journal's
    /// articles whose own value is still NULL. Append-only: previously
    /// denormalized values are never overwritten.
    async fn denormalize_impact_factors(&self) -> Result<u64>;

    /// Up to `limit` articles with an empty summary and a non-empty
    /// abstract, oldest id first.
    async fn unenriched_articles(&self, limit: i64) -> Result<Vec<UnenrichedArticle>>;

    async fn save_enrichment(&self, article_id: i64, data: &ArticleEnrichment) -> Result<()>;
}
