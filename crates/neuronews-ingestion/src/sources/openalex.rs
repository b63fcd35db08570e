//! OpenAlex bibliometrics client — journal impact-factor resolution.
//!
//! Endpoints: https://api.openalex.org/sources/issn:{issn}
//!            https://api.openalex.org/sources?search={name}

use async_trait::async_trait;
use tracing::{instrument, warn};

use neuronews_common::{Result, SandboxClient};

use super::{Bibliometrics, SourceRecord};

const OPENALEX_BASE: &str = "https://api.openalex.org";

pub struct OpenAlexClient {
    client: SandboxClient,
}

impl OpenAlexClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: SandboxClient::new()?,
        })
    }
}

fn source_record(json: &serde_json::Value) -> SourceRecord {
    SourceRecord {
        id: json["id"].as_str().unwrap_or("").to_string(),
        two_year_mean_citedness: json["summary_stats"]["2yr_mean_citedness"].as_f64(),
    }
}

#[async_trait]
impl Bibliometrics for OpenAlexClient {
    #[instrument(skip(self))]
    async fn source_by_issn(&self, issn: &str) -> anyhow::Result<Option<SourceRecord>> {
        let url = format!("{OPENALEX_BASE}/sources/issn:{issn}");
        let resp = self.client.get(&url)?.send().await?;
        if !resp.status().is_success() {
            // unknown ISSNs come back as 404
            return Ok(None);
        }
        let json: serde_json::Value = resp.json().await?;
        Ok(Some(source_record(&json)))
    }

    #[instrument(skip(self))]
    async fn source_by_name(&self, name: &str) -> anyhow::Result<Option<SourceRecord>> {
        let url = format!("{OPENALEX_BASE}/sources");
        let resp = self.client.get(&url)?.query(&[("search", name)]).send().await?;
        if !resp.status().is_success() {
            return Ok(None);
        }
        let json: serde_json::Value = resp.json().await?;
        Ok(json["results"]
            .as_array()
            .and_then(|results| results.first())
            .map(source_record))
    }
}

/// Resolve a journal to a bibliometrics source: ISSN lookup first, name
/// search as the fallback. Lookup failures are non-fatal and resolve to
/// `None`, leaving the journal eligible for retry on a future run.
pub async fn resolve_journal(
    bibliometrics: &dyn Bibliometrics,
    name: &str,
    issn: &str,
) -> Option<SourceRecord> {
    if !issn.is_empty() {
        match bibliometrics.source_by_issn(issn).await {
            Ok(Some(source)) => return Some(source),
            Ok(None) => {}
            Err(e) => warn!(issn, "ISSN lookup failed: {e}"),
        }
    }
    match bibliometrics.source_by_name(name).await {
        Ok(source) => source,
        Err(e) => {
            warn!(journal = name, "name search failed: {e}");
            None
        }
    }
}

/// The two-year mean-citedness statistic becomes the impact factor when
/// strictly positive, rounded to 2 decimal places.
pub fn impact_factor_from(source: &SourceRecord) -> Option<f64> {
    source
        .two_year_mean_citedness
        .filter(|v| *v > 0.0)
        .map(|v| (v * 100.0).round() / 100.0)
}
