//! Europe PMC REST API client — citation counts by PMID.
//!
//! Endpoint: https://www.ebi.ac.uk/europepmc/webservices/rest/search

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use neuronews_common::{Result, SandboxClient};

use super::CitationIndex;

const EPMC_SEARCH_URL: &str = "https://www.ebi.ac.uk/europepmc/webservices/rest/search";

/// The index accepts at most this many ids per disjunctive query.
pub const CITATION_BATCH_SIZE: usize = 50;

pub struct EuropePmcClient {
    client: SandboxClient,
}

impl EuropePmcClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: SandboxClient::new()?,
        })
    }
}

#[async_trait]
impl CitationIndex for EuropePmcClient {
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn cited_by_batch(&self, ids: &[String]) -> anyhow::Result<HashMap<String, i32>> {
        let query = ids
            .iter()
            .map(|id| format!("EXT_ID:{id}"))
            .collect::<Vec<_>>()
            .join(" OR ");
        let page_size = ids.len().to_string();
        let params = [
            ("query", query.as_str()),
            ("format", "json"),
            ("resultType", "core"),
            ("pageSize", page_size.as_str()),
        ];

        let resp: serde_json::Value = self
            .client
            .get(EPMC_SEARCH_URL)?
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut counts = HashMap::new();
        for result in resp["resultList"]["result"].as_array().unwrap_or(&vec![]) {
            if let Some(pmid) = result["pmid"].as_str() {
                let cited = result["citedByCount"].as_i64().unwrap_or(0) as i32;
                counts.insert(pmid.to_string(), cited);
            }
        }

        debug!(returned = counts.len(), "citation batch resolved");
        Ok(counts)
    }
}

/// Query the citation index in bounded batches and merge the results.
///
/// Every input identifier ends up in the map (0 when the index returned
/// nothing for it). A failed batch is logged and contributes zeros; it
/// does not abort counting for the other batches.
pub async fn fetch_citation_counts(
    index: &dyn CitationIndex,
    pmids: &[String],
) -> HashMap<String, i32> {
    let mut counts: HashMap<String, i32> = pmids.iter().map(|p| (p.clone(), 0)).collect();

    for batch in pmids.chunks(CITATION_BATCH_SIZE) {
        match index.cited_by_batch(batch).await {
            Ok(batch_counts) => {
                for (pmid, cited) in batch_counts {
                    if let Some(entry) = counts.get_mut(&pmid) {
                        *entry = cited;
                    }
                }
            }
            Err(e) => {
                warn!(batch_len = batch.len(), "citation batch failed: {e}");
            }
        }
    }

    counts
}
