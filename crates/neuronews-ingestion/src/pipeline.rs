//! Ingestion orchestrator.
//!
//! One batch run is a linear pass:
//!   search → fetch → parse → count-citations → upsert-articles →
//!   sync-journals → backfill-journal-issn → resolve-impact-factors →
//!   denormalize-impact-factors → done
//!
//! A hard failure in search, fetch, or the articles upsert aborts the run
//! with an error result. Everything after the upsert is per-item: a
//! failed citation batch, journal sync, or impact-factor lookup is logged
//! and skipped, and the next scheduled run retries it.

use serde::Serialize;
use tracing::{info, instrument, warn};

use neuronews_common::config::DEFAULT_TOPIC_QUERY;
use neuronews_db::{ArticleRow, NewsStore};

use crate::parser::parse_articles;
use crate::sources::europepmc::fetch_citation_counts;
use crate::sources::openalex::{impact_factor_from, resolve_journal};
use crate::sources::{Bibliometrics, CitationIndex, LiteratureGateway};

// ── Job config ────────────────────────────────────────────────────────────────

/// Parameters for a single ingestion run. Callers cap per-run work here;
/// backlog drains across scheduled runs.
#[derive(Debug, Clone, Serialize)]
pub struct IngestionJob {
    pub query: String,
    pub lookback_days: i64,
    pub max_results: usize,
}

impl Default for IngestionJob {
    fn default() -> Self {
        Self {
            query: DEFAULT_TOPIC_QUERY.to_string(),
            lookback_days: 7,
            max_results: 200,
        }
    }
}

// ── Result ────────────────────────────────────────────────────────────────────

/// Operator-visible outcome of one run: success flag, optional error, and
/// the ordered log of human-readable progress lines.
#[derive(Debug, Clone, Serialize)]
pub struct IngestionOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub articles_found: usize,
    pub articles_inserted: u64,
    pub log: Vec<String>,
}

impl IngestionOutcome {
    fn failed(mut log: Vec<String>, articles_found: usize, error: String) -> Self {
        warn!("ingestion run failed: {error}");
        log.push(format!("Error: {error}"));
        Self {
            success: false,
            error: Some(error),
            articles_found,
            articles_inserted: 0,
            log,
        }
    }
}

// ── Orchestrator ──────────────────────────────────────────────────────────────

/// Run the end-to-end ingestion pipeline once.
///
/// Dependencies are constructed per run and passed in, so tests can
/// substitute fakes for every external service.
#[instrument(skip_all, fields(query = %job.query))]
pub async fn run_ingestion(
    job: &IngestionJob,
    gateway: &dyn LiteratureGateway,
    citations: &dyn CitationIndex,
    bibliometrics: &dyn Bibliometrics,
    store: &dyn NewsStore,
) -> IngestionOutcome {
    let mut log: Vec<String> = Vec::new();

    // ── search ───────────────────────────────────────────────────────────────
    let pmids = match gateway
        .search(&job.query, job.lookback_days, job.max_results)
        .await
    {
        Ok(ids) => ids,
        Err(e) => return IngestionOutcome::failed(log, 0, format!("search failed: {e}")),
    };
    info!(count = pmids.len(), "search complete");
    log.push(format!("Found {} articles on PubMed", pmids.len()));

    if pmids.is_empty() {
        return IngestionOutcome {
            success: true,
            error: None,
            articles_found: 0,
            articles_inserted: 0,
            log,
        };
    }

    // ── fetch ────────────────────────────────────────────────────────────────
    let xml = match gateway.fetch(&pmids).await {
        Ok(xml) => xml,
        Err(e) => return IngestionOutcome::failed(log, 0, format!("fetch failed: {e}")),
    };

    // ── parse ────────────────────────────────────────────────────────────────
    let mut records = match parse_articles(&xml) {
        Ok(records) => records,
        Err(e) => return IngestionOutcome::failed(log, 0, format!("parse failed: {e}")),
    };
    let articles_found = records.len();
    log.push(format!("Parsed {articles_found} articles"));

    // ── count-citations ──────────────────────────────────────────────────────
    let with_ids: Vec<String> = records
        .iter()
        .map(|r| r.pmid.clone())
        .filter(|p| !p.is_empty())
        .collect();
    let counts = fetch_citation_counts(citations, &with_ids).await;
    for rec in &mut records {
        rec.citation_count = counts.get(&rec.pmid).copied().unwrap_or(0);
    }
    let cited = records.iter().filter(|r| r.citation_count > 0).count();
    log.push(format!("Citations found for {cited} articles"));

    // ── upsert-articles ──────────────────────────────────────────────────────
    let rows: Vec<ArticleRow> = records
        .into_iter()
        .filter(|r| !r.url.is_empty())
        .map(ArticleRow::from)
        .collect();
    let articles_inserted = match store.upsert_articles(&rows).await {
        Ok(n) => n,
        Err(e) => {
            return IngestionOutcome::failed(log, articles_found, format!("upsert failed: {e}"))
        }
    };
    log.push(format!(
        "Upserted {articles_inserted} new articles ({} duplicates skipped)",
        rows.len() as u64 - articles_inserted
    ));

    // ── sync-journals ────────────────────────────────────────────────────────
    match sync_journals(store).await {
        Ok(n) => log.push(format!("Synced {n} new journals")),
        Err(e) => {
            warn!("journal sync failed: {e}");
            log.push(format!("Journal sync failed: {e}"));
        }
    }

    // ── backfill-journal-issn ────────────────────────────────────────────────
    match store.backfill_journal_issn().await {
        Ok(n) => log.push(format!("Backfilled ISSN for {n} journals")),
        Err(e) => {
            warn!("ISSN backfill failed: {e}");
            log.push(format!("ISSN backfill failed: {e}"));
        }
    }

    // ── resolve-impact-factors ───────────────────────────────────────────────
    // Each unresolved journal is visited at most once per run; a journal
    // still unresolved afterwards waits for the next scheduled run.
    let journals = match store.journals_missing_impact().await {
        Ok(journals) => journals,
        Err(e) => {
            warn!("journal selection failed: {e}");
            log.push(format!("Journal selection failed: {e}"));
            Vec::new()
        }
    };
    let mut resolved = 0;
    for journal in &journals {
        let Some(source) =
            resolve_journal(bibliometrics, &journal.journal_name, &journal.issn).await
        else {
            continue;
        };
        let impact = impact_factor_from(&source);
        match store
            .record_journal_resolution(journal.id, impact, &source.id)
            .await
        {
            Ok(()) => {
                if impact.is_some() {
                    resolved += 1;
                }
            }
            Err(e) => {
                warn!(journal = %journal.journal_name, "journal update failed: {e}");
                log.push(format!(
                    "Journal update failed for {}: {e}",
                    journal.journal_name
                ));
            }
        }
    }
    log.push(format!(
        "Updated impact factor for {resolved} of {} journals",
        journals.len()
    ));

    // ── denormalize-impact-factors ───────────────────────────────────────────
    match store.denormalize_impact_factors().await {
        Ok(n) => log.push(format!("Denormalized impact factor to {n} articles")),
        Err(e) => {
            warn!("impact-factor denormalization failed: {e}");
            log.push(format!("Impact-factor denormalization failed: {e}"));
        }
    }

    if let Ok(total) = store.article_count().await {
        log.push(format!("Total articles in database: {total}"));
    }

    info!(articles_found, articles_inserted, "ingestion run complete");
    IngestionOutcome {
        success: true,
        error: None,
        articles_found,
        articles_inserted,
        log,
    }
}

/// Upsert one journal row per distinct journal name currently stored.
/// Conflicting rows are left untouched; the backfill stage fills empty
/// ISSNs afterwards.
async fn sync_journals(store: &dyn NewsStore) -> neuronews_db::Result<u64> {
    let pairs = store.distinct_journal_pairs().await?;
    store.upsert_journals(&pairs).await
}
