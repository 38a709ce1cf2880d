use crate::config::ReportConfig;
use crate::error::{ApiError, ReportError, Result};
use crate::providers::link;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

const API_VERSION: &str = "2022-11-28";

/// Page size requested from list endpoints (the API maximum).
pub const PAGE_SIZE: u32 = 100;

/// GitHub REST client holding the static credential and API root.
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: String,
}

impl GitHubClient {
    /// Create a new GitHub API client
    pub fn new(config: &ReportConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            HeaderName::from_static("x-github-api-version"),
            HeaderValue::from_static(API_VERSION),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("alertreport/", env!("CARGO_PKG_VERSION"))),
        );

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token.trim()))
            .map_err(|_| ReportError::Config("Invalid GitHub token".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|source| ReportError::Transport {
                url: config.api_url.to_string(),
                source,
            })?;

        Ok(Self {
            client,
            api_url: config.api_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Absolute URL for an API path such as `repos/acme/api/properties/values`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    /// Fetch every page of a list endpoint, following `rel="next"` links.
    ///
    /// Records come back in page order. A failed page fails the whole call;
    /// nothing fetched before it is returned.
    pub async fn fetch_all<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
        let mut records = Vec::new();
        let mut next = Some(url.to_string());
        let mut page = 0usize;

        while let Some(current) = next {
            let response = self.send(&current).await?;
            next = link::next_page_url(response.headers());

            let batch: Vec<T> = decode(&current, response).await?;
            page += 1;
            records.extend(batch);
            debug!(url = %current, page, total = records.len(), "Fetched page");
        }

        Ok(records)
    }

    /// Fetch a single page and decode it as `T`.
    pub async fn fetch_one<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.send(url).await?;
        decode(url, response).await
    }

    /// GET without status handling, for endpoints where 202 carries meaning.
    pub(crate) async fn get_raw(&self, url: &str) -> Result<Response> {
        trace!(url, "GET");
        self.client
            .get(url)
            .send()
            .await
            .map_err(|source| ReportError::Transport {
                url: url.to_string(),
                source,
            })
    }

    async fn send(&self, url: &str) -> Result<Response> {
        let response = self.get_raw(url).await?;
        ensure_success(url, response).await
    }
}

/// Turn a non-2xx response into an [`ApiError`] carrying the raw body.
pub(crate) async fn ensure_success(url: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = read_text(url, response).await?;
    Err(ApiError::new(status.as_u16(), body).into())
}

pub(crate) async fn read_text(url: &str, response: Response) -> Result<String> {
    response.text().await.map_err(|source| ReportError::Transport {
        url: url.to_string(),
        source,
    })
}

async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T> {
    let body = read_text(url, response).await?;
    serde_json::from_str(&body).map_err(|source| ReportError::Decode {
        url: url.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Scope;

    fn client_for(api_url: &str) -> GitHubClient {
        let config = ReportConfig::new("token", Scope::Organization, "acme")
            .unwrap()
            .with_api_url(api_url)
            .unwrap();
        GitHubClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_joins_cloud_root() {
        let client = client_for("https://api.github.com");
        assert_eq!(
            client.endpoint("/orgs/acme/code-scanning/alerts"),
            "https://api.github.com/orgs/acme/code-scanning/alerts"
        );
    }

    #[test]
    fn test_endpoint_keeps_server_api_prefix() {
        let client = client_for("https://ghe.example.com/api/v3/");
        assert_eq!(client.api_url(), "https://ghe.example.com/api/v3");
        assert_eq!(client.endpoint("meta"), "https://ghe.example.com/api/v3/meta");
    }

    #[test]
    fn test_rejects_token_with_newline() {
        let config = ReportConfig::new("bad\ntoken", Scope::Organization, "acme").unwrap();
        assert!(matches!(
            GitHubClient::new(&config),
            Err(ReportError::Config(_))
        ));
    }
}
