//! PubMed E-utilities client.
//!
//! Endpoints used:
//!   esearch: https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi
//!   efetch:  https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::{debug, instrument};

use neuronews_common::{Result, SandboxClient};

use super::LiteratureGateway;

const ESEARCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi";
const EFETCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi";

pub struct PubMedClient {
    client: SandboxClient,
    api_key: Option<String>,
}

impl PubMedClient {
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            client: SandboxClient::new()?,
            api_key,
        })
    }

    fn push_api_key(&self, params: &mut Vec<(&'static str, String)>) {
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
    }
}

#[async_trait]
impl LiteratureGateway for PubMedClient {
    /// Date-bounded esearch over the entry-date (edat) axis.
    #[instrument(skip(self))]
    async fn search(
        &self,
        query: &str,
        lookback_days: i64,
        max_results: usize,
    ) -> anyhow::Result<Vec<String>> {
        let max_date = Utc::now().date_naive();
        let min_date = max_date - Duration::days(lookback_days);

        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("term", query.to_string()),
            ("retmax", max_results.to_string()),
            ("datetype", "edat".to_string()),
            ("mindate", min_date.format("%Y/%m/%d").to_string()),
            ("maxdate", max_date.format("%Y/%m/%d").to_string()),
            ("retmode", "json".to_string()),
        ];
        self.push_api_key(&mut params);

        let resp: serde_json::Value = self
            .client
            .get(ESEARCH_URL)?
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let ids: Vec<String> = resp["esearchresult"]["idlist"]
            .as_array()
            .unwrap_or(&vec![])
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect();

        debug!(count = ids.len(), "esearch returned identifiers");
        Ok(ids)
    }

    /// One efetch request for the whole batch, raw XML back.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn fetch(&self, ids: &[String]) -> anyhow::Result<String> {
        if ids.is_empty() {
            return Ok(String::new());
        }

        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("id", ids.join(",")),
            ("retmode", "xml".to_string()),
        ];
        self.push_api_key(&mut params);

        let xml = self
            .client
            .get(EFETCH_URL)?
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(xml)
    }
}
