//! Data model for the ingestion pipeline.

use neuronews_common::defaults::default_for;
use neuronews_db::ArticleRow;
use serde::{Deserialize, Serialize};

/// One normalized literature record as extracted from the wire format.
///
/// Every field starts at its policy default and is overwritten only when
/// the source entry actually carries the data, so a malformed entry
/// degrades to a best-effort partial record instead of failing the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub pmid: String,
    pub title: String,
    pub authors_short: String,
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
    /// Canonical article URL; the natural unique key for persistence.
    /// Empty only when the entry had no usable identifier.
    pub url: String,
}

impl Default for ArticleRecord {
    fn default() -> Self {
        Self {
            pmid: String::new(),
            title: default_for("title").to_string(),
            authors_short: default_for("authors_short").to_string(),
            authors_full: default_for("authors_full").to_string(),
            journal: default_for("journal").to_string(),
            pub_date: default_for("pub_date").to_string(),
            abstract_text: default_for("abstract").to_string(),
            doi: default_for("doi").to_string(),
            pub_types: default_for("pub_types").to_string(),
            mesh_terms: default_for("mesh_terms").to_string(),
            affiliation: default_for("affiliation").to_string(),
            citation_count: 0,
            grants: default_for("grants").to_string(),
            coi_statement: default_for("coi_statement").to_string(),
            is_open_access: 0,
            pmc_id: default_for("pmc_id").to_string(),
            issn: default_for("issn").to_string(),
            url: String::new(),
        }
    }
}

impl From<ArticleRecord> for ArticleRow {
    fn from(r: ArticleRecord) -> Self {
        ArticleRow {
            pmid: r.pmid,
            title: r.title,
            authors: r.authors_short,
            authors_full: r.authors_full,
            journal: r.journal,
            pub_date: r.pub_date,
            abstract_text: r.abstract_text,
            doi: r.doi,
            pub_types: r.pub_types,
            mesh_terms: r.mesh_terms,
            affiliation: r.affiliation,
            citation_count: r.citation_count,
            grants: r.grants,
            coi_statement: r.coi_statement,
            is_open_access: r.is_open_access,
            pmc_id: r.pmc_id,
            issn: r.issn,
            url: r.url,
        }
    }
}
