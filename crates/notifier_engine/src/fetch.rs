use std::time::Duration;

use futures_util::StreamExt;
use notifier_core::{Identifier, Metadata, SearchParams};
use notifier_logging::notifier_debug;
use url::Url;

use crate::decode::{decode_articles, decode_search, DecodeError};
use crate::{FailureKind, FetchError};

/// Public NCBI E-utilities endpoint.
pub const EUTILS_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// E-utilities needs both date bounds; this stands in for "no upper bound".
const OPEN_MAXDATE: &str = "3000";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub base_url: String,
    /// Reported to NCBI as the `tool` parameter.
    pub tool: String,
    /// Contact address reported to NCBI as the `email` parameter.
    pub email: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            base_url: EUTILS_BASE.to_string(),
            tool: "pubmednotifier".to_string(),
            email: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Remote literature search: identifiers for a query, metadata for an identifier.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn search(&self, term: &str, params: &SearchParams)
        -> Result<Vec<Identifier>, FetchError>;

    async fn fetch_metadata(&self, id: &Identifier) -> Result<Metadata, FetchError>;
}

/// [`Fetcher`] backed by the PubMed E-utilities HTTP API.
#[derive(Debug, Clone)]
pub struct EutilsFetcher {
    settings: FetchSettings,
    client: reqwest::Client,
}

impl EutilsFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(format!("{}/{}", settings.tool, env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self, utility: &str, params: &[(&str, String)]) -> Result<Url, FetchError> {
        let base = format!("{}/{}", self.settings.base_url.trim_end_matches('/'), utility);
        let mut pairs: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        pairs.push(("tool", self.settings.tool.as_str()));
        if let Some(email) = self.settings.email.as_deref() {
            pairs.push(("email", email));
        }
        Url::parse_with_params(&base, &pairs)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn get_body(&self, url: Url) -> Result<Vec<u8>, FetchError> {
        notifier_debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl Fetcher for EutilsFetcher {
    async fn search(
        &self,
        term: &str,
        params: &SearchParams,
    ) -> Result<Vec<Identifier>, FetchError> {
        let url = self.endpoint("esearch.fcgi", &search_params(term, params))?;
        let body = self.get_body(url).await?;
        decode_search(&body).map_err(map_decode_error)
    }

    async fn fetch_metadata(&self, id: &Identifier) -> Result<Metadata, FetchError> {
        let params = [
            ("db", "pubmed".to_string()),
            ("id", id.to_string()),
            ("retmode", "xml".to_string()),
        ];
        let url = self.endpoint("efetch.fcgi", &params)?;
        let body = self.get_body(url).await?;
        let xml = String::from_utf8_lossy(&body);
        decode_articles(&xml)
            .map_err(map_decode_error)?
            .into_iter()
            .find(|(found, _)| found == id)
            .map(|(_, metadata)| metadata)
            .ok_or_else(|| FetchError::new(FailureKind::NotFound, format!("PMID {id}")))
    }
}

fn search_params(term: &str, params: &SearchParams) -> Vec<(&'static str, String)> {
    let mut pairs = vec![
        ("db", "pubmed".to_string()),
        ("term", term.to_string()),
        ("retstart", params.retstart.to_string()),
        ("retmax", params.retmax.to_string()),
        ("retmode", "json".to_string()),
    ];
    if params.mindate.is_some() || params.maxdate.is_some() {
        pairs.push(("datetype", "pdat".to_string()));
        pairs.push((
            "mindate",
            params.mindate.clone().unwrap_or_else(|| "1800".to_string()),
        ));
        pairs.push((
            "maxdate",
            params
                .maxdate
                .clone()
                .unwrap_or_else(|| OPEN_MAXDATE.to_string()),
        ));
    }
    pairs
}

fn too_large(max_bytes: u64, actual: u64) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_decode_error(err: DecodeError) -> FetchError {
    match err {
        DecodeError::Api(message) => FetchError::new(FailureKind::Api(message), ""),
        other => FetchError::new(FailureKind::Decode, other.to_string()),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
