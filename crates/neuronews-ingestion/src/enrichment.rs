//! Enrichment orchestrator.
//!
//! Selects the oldest articles that have an abstract but no summary yet,
//! runs the enrichment processor on each, and writes the six enrichment
//! fields back. Per-record failures are logged and skipped; the record
//! stays unenriched and is picked up again on a future run.

use serde::Serialize;
use tracing::{info, instrument, warn};

use neuronews_db::{ArticleEnrichment, NewsStore};
use neuronews_llm::{enrich_article, Enrichment, LlmBackend};

#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub enriched: usize,
    pub log: Vec<String>,
}

fn to_update(data: Enrichment) -> ArticleEnrichment {
    ArticleEnrichment {
        summary: data.summary,
        importance: data.importance,
        news_value: data.news_value,
        subspecialty: data.subspecialty,
        article_type: data.article_type,
        clinical_relevance: data.clinical_relevance,
    }
}

/// Run one enrichment batch of at most `limit` articles.
#[instrument(skip_all, fields(limit))]
pub async fn run_enrichment(
    limit: i64,
    backend: &dyn LlmBackend,
    store: &dyn NewsStore,
) -> EnrichmentOutcome {
    let mut log: Vec<String> = Vec::new();

    let articles = match store.unenriched_articles(limit).await {
        Ok(articles) => articles,
        Err(e) => {
            warn!("selection query failed: {e}");
            return EnrichmentOutcome {
                success: false,
                error: Some(format!("selection query failed: {e}")),
                enriched: 0,
                log,
            };
        }
    };

    if articles.is_empty() {
        return EnrichmentOutcome {
            success: true,
            error: None,
            enriched: 0,
            log: vec!["No articles to enrich".to_string()],
        };
    }

    log.push(format!("Found {} articles to enrich", articles.len()));

    let mut enriched = 0;
    for article in &articles {
        match enrich_article(backend, &article.title, &article.journal, &article.abstract_text)
            .await
        {
            Ok(data) => {
                let update = to_update(data);
                match store.save_enrichment(article.id, &update).await {
                    Ok(()) => {
                        enriched += 1;
                        log.push(format!(
                            "[{enriched}] {:.60}... -> {} | {} | NV:{}",
                            article.title,
                            update.subspecialty,
                            update.article_type,
                            update.news_value
                        ));
                    }
                    Err(e) => {
                        warn!(article_id = article.id, "enrichment update failed: {e}");
                        log.push(format!("Update failed for article {}: {e}", article.id));
                    }
                }
            }
            Err(e) => {
                warn!(article_id = article.id, "enrichment failed: {e}");
                log.push(format!("Error enriching article {}: {e}", article.id));
            }
        }
    }

    info!(enriched, total = articles.len(), "enrichment run complete");
    EnrichmentOutcome {
        success: true,
        error: None,
        enriched,
        log,
    }
}
