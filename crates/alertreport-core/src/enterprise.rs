//! Server version detection and the site-admin repository report.
//!
//! Enterprise Server 3.5 and 3.6 have no enterprise-wide code scanning
//! endpoint, so alerts there are collected repository by repository using
//! the stafftools `all_repositories.csv` report as the repository listing.

use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::models::RepositoryId;
use crate::providers::github_api::{ensure_success, read_text, GitHubClient};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{info, warn};

/// Version of the platform behind the API root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerVersion {
    /// The hosted service, which has no version restrictions.
    Cloud,
    /// A server install reporting `installed_version`.
    Server(String),
}

impl ServerVersion {
    /// Numeric `(major, minor)` of a server version, if it parses.
    pub fn release(&self) -> Option<(u32, u32)> {
        match self {
            ServerVersion::Cloud => None,
            ServerVersion::Server(raw) => parse_release(raw),
        }
    }

    /// True for 3.5.x and 3.6.x, which lack enterprise code scanning alerts.
    ///
    /// Anything unparseable is assumed to have the endpoint.
    pub fn lacks_enterprise_code_scanning(&self) -> bool {
        matches!(self.release(), Some((3, 5)) | Some((3, 6)))
    }
}

fn parse_release(raw: &str) -> Option<(u32, u32)> {
    let mut parts = raw.trim().split('.');
    let major = parts.next()?.parse().ok()?;
    let minor_part = parts.next()?;
    let digits: String = minor_part.chars().take_while(|c| c.is_ascii_digit()).collect();
    let minor = digits.parse().ok()?;
    Some((major, minor))
}

#[derive(Debug, Deserialize)]
struct MetaResponse {
    installed_version: Option<String>,
}

/// Determine which platform version the configured API root belongs to.
///
/// The cloud API is recognised without a request. Server installs are asked
/// via `GET /meta`; any failure there is a [`ReportError::VersionLookup`].
pub async fn server_version(client: &GitHubClient, config: &ReportConfig) -> Result<ServerVersion> {
    if config.is_cloud() {
        return Ok(ServerVersion::Cloud);
    }

    let url = client.endpoint("meta");
    let meta: MetaResponse = client
        .fetch_one(&url)
        .await
        .map_err(|e| ReportError::VersionLookup {
            url: url.clone(),
            reason: e.to_string(),
        })?;

    match meta.installed_version {
        Some(version) => {
            info!(version = %version, "Detected server version");
            Ok(ServerVersion::Server(version))
        }
        None => Err(ReportError::VersionLookup {
            url,
            reason: "response has no installed_version".to_string(),
        }),
    }
}

/// Download the stafftools repository report and list its repositories.
///
/// The server answers 202 while it is still generating the report; the
/// request is repeated every `report_poll_interval` up to
/// `report_poll_attempts` times.
pub async fn repository_listing(
    client: &GitHubClient,
    config: &ReportConfig,
) -> Result<Vec<RepositoryId>> {
    let url = format!(
        "{}/stafftools/reports/all_repositories.csv",
        config.server_url.as_str().trim_end_matches('/')
    );

    let attempts = config.report_poll_attempts.max(1);
    for attempt in 1..=attempts {
        let response = client.get_raw(&url).await?;
        if response.status() == StatusCode::ACCEPTED {
            if attempt < attempts {
                info!(attempt, "Waiting for repository report to generate...");
                tokio::time::sleep(config.report_poll_interval).await;
            }
            continue;
        }

        let response = ensure_success(&url, response).await?;
        let body = read_text(&url, response).await?;
        let repos = parse_repository_report(&body)?;
        info!(count = repos.len(), "Loaded repository listing");
        return Ok(repos);
    }

    Err(ReportError::ReportNotReady { url, attempts })
}

/// Parse `all_repositories.csv`, keeping row order.
///
/// Columns are located by header name (`owner_name`, `repo_name`).
pub fn parse_repository_report(text: &str) -> Result<Vec<RepositoryId>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let (owner_idx, repo_idx) = match (column("owner_name"), column("repo_name")) {
        (Some(o), Some(r)) => (o, r),
        _ => {
            return Err(ReportError::Config(
                "Repository report is missing the owner_name or repo_name column".to_string(),
            ))
        }
    };

    let mut repos = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row?;
        let owner = row.get(owner_idx).map(str::trim).unwrap_or("");
        let name = row.get(repo_idx).map(str::trim).unwrap_or("");
        if owner.is_empty() || name.is_empty() {
            warn!(row = line + 2, "Skipping repository report row without owner or name");
            continue;
        }
        repos.push(RepositoryId::from_parts(owner, name));
    }
    Ok(repos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(v: &str) -> ServerVersion {
        ServerVersion::Server(v.to_string())
    }

    #[test]
    fn test_fan_out_versions() {
        assert!(server("3.5").lacks_enterprise_code_scanning());
        assert!(server("3.5.0").lacks_enterprise_code_scanning());
        assert!(server("3.6.2").lacks_enterprise_code_scanning());
    }

    #[test]
    fn test_aggregate_versions() {
        for v in ["3.7.1", "3.4", "3.10.0", "3.60", "2.22.5", "ghes-99", "", "3", "3.x"] {
            assert!(
                !server(v).lacks_enterprise_code_scanning(),
                "{} should use the enterprise endpoint",
                v
            );
        }
        assert!(!ServerVersion::Cloud.lacks_enterprise_code_scanning());
    }

    #[test]
    fn test_parse_release() {
        assert_eq!(parse_release("3.6.2"), Some((3, 6)));
        assert_eq!(parse_release("3.12"), Some((3, 12)));
        assert_eq!(parse_release("3.9-rc1"), Some((3, 9)));
        assert_eq!(parse_release("enterprise"), None);
    }

    #[test]
    fn test_parse_repository_report() {
        let csv = "created_at,owner_id,owner_name,owner_type,repo_id,repo_name,visibility\n\
                   2022-01-01,1,acme,Organization,10,api,private\n\
                   2022-01-02,1,acme,Organization,11,web,internal\n\
                   2022-01-03,2,,User,12,orphan,public\n\
                   2022-01-04,3,jdoe,User,13,dotfiles,public\n";
        let repos = parse_repository_report(csv).unwrap();
        let names: Vec<&str> = repos.iter().map(|r| r.as_str()).collect();
        assert_eq!(names, vec!["acme/api", "acme/web", "jdoe/dotfiles"]);
    }

    #[test]
    fn test_parse_repository_report_missing_columns() {
        let csv = "id,name\n1,api\n";
        assert!(matches!(
            parse_repository_report(csv),
            Err(ReportError::Config(_))
        ));
    }

    #[test]
    fn test_parse_repository_report_empty() {
        let csv = "owner_name,repo_name\n";
        assert!(parse_repository_report(csv).unwrap().is_empty());
    }
}
