//! In-memory test doubles for the orchestrator tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use neuronews_db::{
    ArticleEnrichment, ArticleRow, DbError, JournalRow, NewsStore, UnenrichedArticle,
};
use neuronews_ingestion::sources::{
    Bibliometrics, CitationIndex, LiteratureGateway, SourceRecord,
};
use neuronews_llm::{LlmBackend, LlmError, LlmRequest, LlmResponse};

// ── Store ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StoredArticle {
    pub id: i64,
    pub row: ArticleRow,
    pub impact_factor: Option<f64>,
    pub summary: String,
    pub importance: String,
    pub news_value: i32,
    pub subspecialty: String,
    pub article_type: String,
    pub clinical_relevance: String,
}

#[derive(Debug, Clone)]
pub struct StoredJournal {
    pub id: i64,
    pub journal_name: String,
    pub issn: String,
    pub impact_factor: Option<f64>,
    pub openalex_id: String,
    pub resolved_at: Option<chrono::DateTime<Utc>>,
}

/// In-memory [`NewsStore`] with the same upsert-ignore semantics as the
/// PostgreSQL implementation.
#[derive(Default)]
pub struct MemStore {
    pub articles: Mutex<Vec<StoredArticle>>,
    pub journals: Mutex<Vec<StoredJournal>>,
    pub fail_article_upsert: bool,
}

impl MemStore {
    pub fn article_urls(&self) -> Vec<String> {
        self.articles
            .lock()
            .unwrap()
            .iter()
            .map(|a| a.row.url.clone())
            .collect()
    }

    pub fn journal(&self, name: &str) -> Option<StoredJournal> {
        self.journals
            .lock()
            .unwrap()
            .iter()
            .find(|j| j.journal_name == name)
            .cloned()
    }

    /// Seed one article directly, bypassing the pipeline.
    pub fn seed_article(&self, row: ArticleRow) -> i64 {
        let mut articles = self.articles.lock().unwrap();
        let id = articles.len() as i64 + 1;
        articles.push(StoredArticle {
            id,
            row,
            impact_factor: None,
            summary: String::new(),
            importance: String::new(),
            news_value: 0,
            subspecialty: String::new(),
            article_type: String::new(),
            clinical_relevance: String::new(),
        });
        id
    }
}

#[async_trait]
impl NewsStore for MemStore {
    async fn upsert_articles(&self, rows: &[ArticleRow]) -> Result<u64, DbError> {
        if self.fail_article_upsert {
            return Err(DbError::Store("simulated upsert failure".to_string()));
        }
        let mut articles = self.articles.lock().unwrap();
        let mut inserted = 0;
        for row in rows {
            if articles.iter().any(|a| a.row.url == row.url) {
                continue;
            }
            let id = articles.len() as i64 + 1;
            articles.push(StoredArticle {
                id,
                row: row.clone(),
                impact_factor: None,
                summary: String::new(),
                importance: String::new(),
                news_value: 0,
                subspecialty: String::new(),
                article_type: String::new(),
                clinical_relevance: String::new(),
            });
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn article_count(&self) -> Result<i64, DbError> {
        Ok(self.articles.lock().unwrap().len() as i64)
    }

    async fn distinct_journal_pairs(&self) -> Result<Vec<(String, String)>, DbError> {
        let articles = self.articles.lock().unwrap();
        let mut pairs: Vec<(String, String)> = Vec::new();
        for a in articles.iter() {
            let journal = a.row.journal.clone();
            if journal.is_empty() || journal == "N/A" {
                continue;
            }
            let pair = (journal, a.row.issn.clone());
            if !pairs.contains(&pair) {
                pairs.push(pair);
            }
        }
        Ok(pairs)
    }

    async fn upsert_journals(&self, pairs: &[(String, String)]) -> Result<u64, DbError> {
        let mut journals = self.journals.lock().unwrap();
        let mut inserted = 0;
        for (name, issn) in pairs {
            if name.is_empty() || journals.iter().any(|j| &j.journal_name == name) {
                continue;
            }
            let id = journals.len() as i64 + 1;
            journals.push(StoredJournal {
                id,
                journal_name: name.clone(),
                issn: issn.clone(),
                impact_factor: None,
                openalex_id: String::new(),
                resolved_at: None,
            });
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn backfill_journal_issn(&self) -> Result<u64, DbError> {
        let articles = self.articles.lock().unwrap();
        let mut journals = self.journals.lock().unwrap();
        let mut updated = 0;
        for journal in journals.iter_mut().filter(|j| j.issn.is_empty()) {
            if let Some(article) = articles
                .iter()
                .find(|a| a.row.journal == journal.journal_name && !a.row.issn.is_empty())
            {
                journal.issn = article.row.issn.clone();
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn journals_missing_impact(&self) -> Result<Vec<JournalRow>, DbError> {
        Ok(self
            .journals
            .lock()
            .unwrap()
            .iter()
            .filter(|j| j.impact_factor.is_none())
            .map(|j| JournalRow {
                id: j.id,
                journal_name: j.journal_name.clone(),
                issn: j.issn.clone(),
                impact_factor: j.impact_factor,
                openalex_id: j.openalex_id.clone(),
                if_updated_at: j.resolved_at,
            })
            .collect())
    }

    async fn record_journal_resolution(
        &self,
        journal_id: i64,
        impact_factor: Option<f64>,
        openalex_id: &str,
    ) -> Result<(), DbError> {
        let mut journals = self.journals.lock().unwrap();
        let journal = journals
            .iter_mut()
            .find(|j| j.id == journal_id)
            .ok_or_else(|| DbError::Store(format!("no journal {journal_id}")))?;
        journal.impact_factor = impact_factor;
        journal.openalex_id = openalex_id.to_string();
        journal.resolved_at = Some(Utc::now());
        Ok(())
    }

    async fn denormalize_impact_factors(&self) -> Result<u64, DbError> {
        let journals = self.journals.lock().unwrap();
        let mut articles = self.articles.lock().unwrap();
        let mut updated = 0;
        for article in articles
            .iter_mut()
            .filter(|a| a.impact_factor.is_none())
        {
            let resolved = journals
                .iter()
                .find(|j| j.journal_name == article.row.journal)
                .and_then(|j| j.impact_factor);
            if let Some(impact) = resolved {
                article.impact_factor = Some(impact);
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn unenriched_articles(&self, limit: i64) -> Result<Vec<UnenrichedArticle>, DbError> {
        let mut candidates: Vec<UnenrichedArticle> = self
            .articles
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.summary.is_empty() && !a.row.abstract_text.is_empty())
            .map(|a| UnenrichedArticle {
                id: a.id,
                title: a.row.title.clone(),
                journal: a.row.journal.clone(),
                abstract_text: a.row.abstract_text.clone(),
            })
            .collect();
        candidates.sort_by_key(|a| a.id);
        candidates.truncate(limit as usize);
        Ok(candidates)
    }

    async fn save_enrichment(
        &self,
        article_id: i64,
        data: &ArticleEnrichment,
    ) -> Result<(), DbError> {
        let mut articles = self.articles.lock().unwrap();
        let article = articles
            .iter_mut()
            .find(|a| a.id == article_id)
            .ok_or_else(|| DbError::Store(format!("no article {article_id}")))?;
        article.summary = data.summary.clone();
        article.importance = data.importance.clone();
        article.news_value = data.news_value;
        article.subspecialty = data.subspecialty.clone();
        article.article_type = data.article_type.clone();
        article.clinical_relevance = data.clinical_relevance.clone();
        Ok(())
    }
}

// ── Gateway ───────────────────────────────────────────────────────────────────

/// Scripted literature gateway: fixed id list and XML payload.
pub struct FakeGateway {
    pub ids: Vec<String>,
    pub xml: String,
    pub fail_search: bool,
    pub fail_fetch: bool,
}

impl FakeGateway {
    pub fn new(ids: &[&str], xml: &str) -> Self {
        Self {
            ids: ids.iter().map(|s| s.to_string()).collect(),
            xml: xml.to_string(),
            fail_search: false,
            fail_fetch: false,
        }
    }
}

#[async_trait]
impl LiteratureGateway for FakeGateway {
    async fn search(
        &self,
        _query: &str,
        _lookback_days: i64,
        max_results: usize,
    ) -> anyhow::Result<Vec<String>> {
        if self.fail_search {
            anyhow::bail!("simulated search outage");
        }
        Ok(self.ids.iter().take(max_results).cloned().collect())
    }

    async fn fetch(&self, _ids: &[String]) -> anyhow::Result<String> {
        if self.fail_fetch {
            anyhow::bail!("simulated fetch outage");
        }
        Ok(self.xml.clone())
    }
}

// ── Citation index ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeCitations {
    pub counts: HashMap<String, i32>,
}

impl FakeCitations {
    pub fn with(counts: &[(&str, i32)]) -> Self {
        Self {
            counts: counts
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }
}

#[async_trait]
impl CitationIndex for FakeCitations {
    async fn cited_by_batch(&self, ids: &[String]) -> anyhow::Result<HashMap<String, i32>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.counts.get(id).map(|c| (id.clone(), *c)))
            .collect())
    }
}

// ── Bibliometrics ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeBibliometrics {
    pub by_issn: HashMap<String, SourceRecord>,
    pub by_name: HashMap<String, SourceRecord>,
}

impl FakeBibliometrics {
    pub fn record(id: &str, citedness: f64) -> SourceRecord {
        SourceRecord {
            id: id.to_string(),
            two_year_mean_citedness: Some(citedness),
        }
    }
}

#[async_trait]
impl Bibliometrics for FakeBibliometrics {
    async fn source_by_issn(&self, issn: &str) -> anyhow::Result<Option<SourceRecord>> {
        Ok(self.by_issn.get(issn).cloned())
    }

    async fn source_by_name(&self, name: &str) -> anyhow::Result<Option<SourceRecord>> {
        Ok(self.by_name.get(name).cloned())
    }
}

// ── LLM backend ───────────────────────────────────────────────────────────────

/// Pops one scripted response per call; the sentinel `!error` simulates
/// an API failure.
pub struct ScriptedBackend {
    pub responses: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().rev().map(|s| s.to_string()).collect()),
        }
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn complete(&self, _req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let next = self
            .responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| "!error".to_string());
        if next == "!error" {
            return Err(LlmError::ApiError {
                status: 500,
                message: "simulated completion outage".to_string(),
            });
        }
        Ok(LlmResponse {
            content: next,
            model: "scripted".to_string(),
            prompt_tokens: 0,
            completion_tokens: 0,
        })
    }

    fn model_id(&self) -> &str {
        "scripted"
    }
}
