use crate::error::{ReportError, Result};
use crate::models::RepositoryId;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_SERVER_URL: &str = "https://github.com";

/// Granularity of a report request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Enterprise,
    Organization,
    Repository,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Enterprise => "enterprise",
            Scope::Organization => "organization",
            Scope::Repository => "repository",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enterprise" => Ok(Scope::Enterprise),
            "organization" => Ok(Scope::Organization),
            "repository" => Ok(Scope::Repository),
            other => Err(ReportError::Config(format!(
                "Invalid report scope '{}'. Valid scopes are: enterprise, organization, repository",
                other
            ))),
        }
    }
}

/// One of the three alert categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    SecretScanning,
    CodeScanning,
    Dependabot,
}

impl Feature {
    /// Allow-list, in run order.
    pub const ALL: [Feature; 3] = [
        Feature::SecretScanning,
        Feature::CodeScanning,
        Feature::Dependabot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::SecretScanning => "secretscanning",
            Feature::CodeScanning => "codescanning",
            Feature::Dependabot => "dependabot",
        }
    }

    /// Path segment used by the alert endpoints.
    pub fn api_segment(&self) -> &'static str {
        match self {
            Feature::SecretScanning => "secret-scanning",
            Feature::CodeScanning => "code-scanning",
            Feature::Dependabot => "dependabot",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Feature::SecretScanning => "Secret Scanning",
            Feature::CodeScanning => "Code Scanning",
            Feature::Dependabot => "Dependabot",
        }
    }

    pub fn report_file_name(&self) -> &'static str {
        match self {
            Feature::SecretScanning => "secrets_list.csv",
            Feature::CodeScanning => "cs_list.csv",
            Feature::Dependabot => "dependabot_list.csv",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        Feature::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ReportError::Config(format!("Invalid feature: {}", s)))
    }
}

/// Result of parsing a comma-separated feature list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSelection {
    pub features: Vec<Feature>,
    pub rejected: Vec<String>,
}

/// Parse a feature list such as `"secretscanning,dependabot"`.
///
/// `None`, empty input and `"all"` select every feature. Unknown entries are
/// dropped with a warning. The result follows [`Feature::ALL`] order.
pub fn parse_features(raw: Option<&str>) -> FeatureSelection {
    let raw = raw.map(str::trim).unwrap_or("");
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        return FeatureSelection {
            features: Feature::ALL.to_vec(),
            rejected: Vec::new(),
        };
    }

    let mut requested = Vec::new();
    let mut rejected = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        match entry.to_ascii_lowercase().parse::<Feature>() {
            Ok(feature) => requested.push(feature),
            Err(_) => {
                let valid: Vec<&str> = Feature::ALL.iter().map(|f| f.as_str()).collect();
                warn!(
                    "Invalid feature: {}. Proceeding without. Valid features are: {}",
                    entry,
                    valid.join(", ")
                );
                rejected.push(entry.to_string());
            }
        }
    }

    let features = Feature::ALL
        .into_iter()
        .filter(|f| requested.contains(f))
        .collect();

    FeatureSelection { features, rejected }
}

/// Everything a report run needs, built once at startup.
#[derive(Clone)]
pub struct ReportConfig {
    pub api_url: Url,
    /// Web root of the server, used for the stafftools repository report.
    pub server_url: Url,
    pub token: String,
    pub scope: Scope,
    pub scope_name: String,
    pub features: Vec<Feature>,
    pub output_dir: PathBuf,
    pub include_properties: bool,
    pub request_timeout: Duration,
    pub report_poll_interval: Duration,
    pub report_poll_attempts: u32,
}

impl ReportConfig {
    pub fn new(token: impl Into<String>, scope: Scope, scope_name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            api_url: parse_url(DEFAULT_API_URL)?,
            server_url: parse_url(DEFAULT_SERVER_URL)?,
            token: token.into(),
            scope,
            scope_name: scope_name.into(),
            features: Feature::ALL.to_vec(),
            output_dir: PathBuf::from("."),
            include_properties: true,
            request_timeout: Duration::from_secs(30),
            report_poll_interval: Duration::from_secs(10),
            report_poll_attempts: 6,
        })
    }

    pub fn with_api_url(mut self, url: &str) -> Result<Self> {
        self.api_url = parse_url(url)?;
        Ok(self)
    }

    pub fn with_server_url(mut self, url: &str) -> Result<Self> {
        self.server_url = parse_url(url)?;
        Ok(self)
    }

    /// True when talking to a hosted cloud API rather than a server install.
    ///
    /// Covers `api.github.com` and the data residency hosts under `ghe.com`.
    pub fn is_cloud(&self) -> bool {
        match self.api_url.host_str() {
            Some(host) => {
                let host = host.to_ascii_lowercase();
                host == "api.github.com" || host.ends_with(".ghe.com")
            }
            None => false,
        }
    }

    /// The repository named by `scope_name`, for repository scope.
    pub fn scope_repository(&self) -> Result<RepositoryId> {
        self.scope_name.parse()
    }

    /// Check the invariants the run relies on.
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(ReportError::Config(
                "No token provided. Set GITHUB_PAT or GITHUB_TOKEN".to_string(),
            ));
        }
        if self.scope_name.trim().is_empty() {
            return Err(ReportError::Config(
                "No scope name provided. Set SCOPE_NAME or GITHUB_REPOSITORY".to_string(),
            ));
        }
        if self.features.is_empty() {
            return Err(ReportError::Config("No valid features requested".to_string()));
        }
        if self.scope == Scope::Repository {
            self.scope_repository()?;
        }
        Ok(())
    }
}

impl fmt::Debug for ReportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportConfig")
            .field("api_url", &self.api_url.as_str())
            .field("server_url", &self.server_url.as_str())
            .field("token", &"***")
            .field("scope", &self.scope)
            .field("scope_name", &self.scope_name)
            .field("features", &self.features)
            .field("output_dir", &self.output_dir)
            .field("include_properties", &self.include_properties)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw.trim()).map_err(|source| ReportError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}
