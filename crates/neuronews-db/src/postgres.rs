//! PostgreSQL implementation of [`NewsStore`].
//!
//! All statements are individually atomic; the pipeline does not wrap
//! stages in a cross-row transaction, so partial completion between
//! stages is a recoverable intermediate state.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::Result;
use crate::schema::{ArticleEnrichment, ArticleRow, JournalRow, UnenrichedArticle};
use crate::store::NewsStore;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Build a store whose pool connects on first use.
    pub fn connect_lazy(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the two tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id                 BIGSERIAL PRIMARY KEY,
                pmid               TEXT NOT NULL DEFAULT '',
                title              TEXT NOT NULL DEFAULT 'N/A',
                authors            TEXT NOT NULL DEFAULT '',
                authors_full       TEXT NOT NULL DEFAULT '',
                journal            TEXT NOT NULL DEFAULT 'N/A',
                pub_date           TEXT NOT NULL DEFAULT 'N/A',
                abstract           TEXT NOT NULL DEFAULT '',
                doi                TEXT NOT NULL DEFAULT '',
                pub_types          TEXT NOT NULL DEFAULT '',
                mesh_terms         TEXT NOT NULL DEFAULT '',
                affiliation        TEXT NOT NULL DEFAULT '',
                citation_count     INTEGER NOT NULL DEFAULT 0,
                grants             TEXT NOT NULL DEFAULT 'Unknown',
                coi_statement      TEXT NOT NULL DEFAULT 'Unknown',
                is_open_access     INTEGER NOT NULL DEFAULT 0,
                pmc_id             TEXT NOT NULL DEFAULT '',
                issn               TEXT NOT NULL DEFAULT '',
                url                TEXT NOT NULL UNIQUE,
                impact_factor      DOUBLE PRECISION,
                summary            TEXT NOT NULL DEFAULT '',
                importance         TEXT NOT NULL DEFAULT '',
                news_value         INTEGER NOT NULL DEFAULT 0,
                subspecialty       TEXT NOT NULL DEFAULT '',
                article_type       TEXT NOT NULL DEFAULT '',
                clinical_relevance TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS journals (
                id            BIGSERIAL PRIMARY KEY,
                journal_name  TEXT NOT NULL UNIQUE,
                issn          TEXT NOT NULL DEFAULT '',
                impact_factor DOUBLE PRECISION,
                openalex_id   TEXT NOT NULL DEFAULT '',
                if_updated_at TIMESTAMPTZ
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl NewsStore for PgStore {
    async fn upsert_articles(&self, articles: &[ArticleRow]) -> Result<u64> {
        let mut inserted = 0;
        for a in articles {
            let result = sqlx::query(
                r#"
                INSERT INTO articles
                    (pmid, title, authors, authors_full, journal, pub_date,
                     abstract, doi, pub_types, mesh_terms, affiliation,
                     citation_count, grants, coi_statement, is_open_access,
                     pmc_id, issn, url)
                VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18)
                ON CONFLICT (url) DO NOTHING
                "#,
            )
            .bind(&a.pmid)
            .bind(&a.title)
            .bind(&a.authors)
            .bind(&a.authors_full)
            .bind(&a.journal)
            .bind(&a.pub_date)
            .bind(&a.abstract_text)
            .bind(&a.doi)
            .bind(&a.pub_types)
            .bind(&a.mesh_terms)
            .bind(&a.affiliation)
            .bind(a.citation_count)
            .bind(&a.grants)
            .bind(&a.coi_statement)
            .bind(a.is_open_access)
            .bind(&a.pmc_id)
            .bind(&a.issn)
            .bind(&a.url)
            .execute(&self.pool)
            .await?;
            inserted += result.rows_affected();
        }
        tracing::debug!(total = articles.len(), inserted, "article upsert complete");
        Ok(inserted)
    }

    async fn article_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn distinct_journal_pairs(&self) -> Result<Vec<(String, String)>> {
        let pairs: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT DISTINCT journal, issn FROM articles
            WHERE journal <> '' AND journal <> 'N/A'
            ORDER BY journal, issn DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(pairs)
    }

    async fn upsert_journals(&self, pairs: &[(String, String)]) -> Result<u64> {
        let mut inserted = 0;
        for (name, issn) in pairs {
            if name.is_empty() {
                continue;
            }
            let result = sqlx::query(
                r#"
                INSERT INTO journals (journal_name, issn)
                VALUES ($1, $2)
                ON CONFLICT (journal_name) DO NOTHING
                "#,
            )
            .bind(name)
            .bind(issn)
            .execute(&self.pool)
            .await?;
            inserted += result.rows_affected();
        }
        Ok(inserted)
    }

    async fn backfill_journal_issn(&self) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE journals SET issn = sub.issn
            FROM (
                SELECT DISTINCT ON (journal) journal, issn
                FROM articles WHERE issn <> ''
            ) AS sub
            WHERE journals.issn = '' AND journals.journal_name = sub.journal
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn journals_missing_impact(&self) -> Result<Vec<JournalRow>> {
        let journals: Vec<JournalRow> = sqlx::query_as(
            r#"
            SELECT id, journal_name, issn, impact_factor, openalex_id, if_updated_at
            FROM journals
            WHERE impact_factor IS NULL
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(journals)
    }

    async fn record_journal_resolution(
        &self,
        journal_id: i64,
        impact_factor: Option<f64>,
        openalex_id: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE journals
            SET impact_factor = $1, openalex_id = $2, if_updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(impact_factor)
        .bind(openalex_id)
        .bind(journal_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn denormalize_impact_factors(&self) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE articles SET impact_factor = j.impact_factor
            FROM journals j
            WHERE articles.journal = j.journal_name
              AND j.impact_factor IS NOT NULL
              AND articles.impact_factor IS NULL
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn unenriched_articles(&self, limit: i64) -> Result<Vec<UnenrichedArticle>> {
        let articles: Vec<UnenrichedArticle> = sqlx::query_as(
            r#"
            SELECT id, title, journal, abstract AS abstract_text
            FROM articles
            WHERE summary = '' AND abstract <> ''
            ORDER BY id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(articles)
    }

    async fn save_enrichment(&self, article_id: i64, data: &ArticleEnrichment) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE articles
            SET summary = $1, importance = $2, news_value = $3,
                subspecialty = $4, article_type = $5, clinical_relevance = $6
            WHERE id = $7
            "#,
        )
        .bind(&data.summary)
        .bind(&data.importance)
        .bind(data.news_value)
        .bind(&data.subspecialty)
        .bind(&data.article_type)
        .bind(&data.clinical_relevance)
        .bind(article_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
