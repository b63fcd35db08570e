use std::collections::HashSet;
use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use url::Url;

use crate::error::{NewsError, Result};

const USER_AGENT: &str = "neuronews/0.1 (mailto:contact@neuronews.dev)";

/// An HTTP client capped to an allowlist of approved hostnames.
///
/// Every outbound call the pipeline makes goes to one of a handful of
/// well-known services; anything else is a bug, so requests to other
/// domains are refused before they leave the process.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    pub fn new() -> Result<Self> {
        let mut allowlist = HashSet::new();
        let domains = [
            "eutils.ncbi.nlm.nih.gov", // PubMed E-utilities
            "www.ebi.ac.uk",           // Europe PMC
            "api.openalex.org",        // OpenAlex bibliometrics
            "localhost",               // local test doubles
            "127.0.0.1",
        ];
        for d in domains {
            allowlist.insert(d.to_string());
        }

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client, allowlist })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Whether a URL is permitted under the current allowlist. Subdomains
    /// of an allowed domain are permitted.
    pub fn is_allowed(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        self.allowlist
            .iter()
            .any(|allowed| host == allowed || host.ends_with(&format!(".{allowed}")))
    }

    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder> {
        if !self.is_allowed(url) {
            return Err(NewsError::Security(format!(
                "domain not in allowlist for URL {url}"
            )));
        }
        Ok(self.client.get(url))
    }
}
