//! CrossRef REST API metadata adapter

use async_trait::async_trait;
use serde::Deserialize;

use crate::application::ports::{MetadataError, MetadataProvider};
use crate::domain::config::DEFAULT_CROSSREF_URL;
use crate::domain::duration::Duration;
use crate::domain::paper::{Doi, PaperMetadata, UNKNOWN_TITLE};

// Response types for the works endpoint

#[derive(Debug, Deserialize)]
struct WorkResponse {
    message: Work,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Work {
    #[serde(default)]
    title: Vec<String>,
    #[serde(default)]
    author: Vec<Author>,
    #[serde(default)]
    container_title: Vec<String>,
    created: Option<DateStamp>,
}

#[derive(Debug, Deserialize)]
struct Author {
    given: Option<String>,
    family: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DateStamp {
    #[serde(default)]
    date_parts: Vec<Vec<Option<i32>>>,
}

/// CrossRef metadata client
pub struct CrossrefClient {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl CrossrefClient {
    /// Client for the public CrossRef API
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_CROSSREF_URL)
    }

    /// Client for another CrossRef-compatible endpoint
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::default_lookup_timeout(),
            client: reqwest::Client::new(),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the API URL
    fn work_url(&self, doi: &Doi) -> String {
        format!("{}/works/{}", self.base_url, doi.as_str())
    }

    fn into_metadata(work: Work) -> PaperMetadata {
        let title = work
            .title
            .into_iter()
            .next()
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        let authors = work
            .author
            .iter()
            .map(|a| {
                let given = a.given.as_deref().unwrap_or_default();
                let family = a.family.as_deref().unwrap_or_default();
                format!("{} {}", given, family).trim().to_string()
            })
            .collect();

        let journal = work.container_title.into_iter().next().unwrap_or_default();

        let year = work
            .created
            .and_then(|c| c.date_parts.into_iter().next())
            .and_then(|parts| parts.into_iter().next())
            .flatten()
            .unwrap_or(0);

        PaperMetadata::new(title, authors, journal, year)
    }
}

impl Default for CrossrefClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataProvider for CrossrefClient {
    async fn lookup(&self, doi: &Doi) -> Result<PaperMetadata, MetadataError> {
        let url = self.work_url(doi);
        tracing::debug!(url = %url, "looking up DOI");

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout.as_std())
            .send()
            .await
            .map_err(|e| MetadataError::RequestFailed(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MetadataError::NotFound);
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MetadataError::ApiError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| MetadataError::RequestFailed(e.to_string()))?;
        let response: WorkResponse =
            serde_json::from_str(&body).map_err(|e| MetadataError::ParseError(e.to_string()))?;

        Ok(Self::into_metadata(response.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> PaperMetadata {
        let response: WorkResponse = serde_json::from_str(json).unwrap();
        CrossrefClient::into_metadata(response.message)
    }

    #[test]
    fn work_url_joins_base_and_doi() {
        let client = CrossrefClient::with_base_url("http://localhost:1234/");
        let doi: Doi = "10.1038/s41586-025-10062-6".parse().unwrap();
        assert_eq!(
            client.work_url(&doi),
            "http://localhost:1234/works/10.1038/s41586-025-10062-6"
        );
    }

    #[test]
    fn full_record() {
        let paper = parse(
            r#"{"message": {
                "title": ["Deep Sea Vents"],
                "author": [{"given": "Ada", "family": "Lovelace"}, {"given": "Alan", "family": "Turing"}],
                "container-title": ["Nature"],
                "created": {"date-parts": [[2025, 3, 1]]}
            }}"#,
        );
        assert_eq!(paper.title, "Deep Sea Vents");
        assert_eq!(paper.authors, vec!["Ada Lovelace", "Alan Turing"]);
        assert_eq!(paper.journal_display(), "Nature (2025)");
    }

    #[test]
    fn sparse_record_uses_defaults() {
        let paper = parse(r#"{"message": {}}"#);
        assert_eq!(paper.title, "Unknown Title");
        assert!(paper.authors.is_empty());
        assert_eq!(paper.journal, "");
        assert_eq!(paper.year, 0);
    }

    #[test]
    fn author_without_given_name() {
        let paper = parse(r#"{"message": {"author": [{"family": "Consortium"}]}}"#);
        assert_eq!(paper.authors, vec!["Consortium"]);
    }

    #[test]
    fn custom_timeout() {
        let client = CrossrefClient::new().timeout(Duration::from_secs(2));
        assert_eq!(client.timeout.as_secs(), 2);
        assert_eq!(client.base_url, "https://api.crossref.org");
    }
}
