use crate::config::{Feature, ReportConfig, Scope};
use crate::disabled;
use crate::enterprise::{self, ServerVersion};
use crate::error::Result;
use crate::models::{AlertRecord, RepositoryId, ScopedAlert};
use crate::providers::github_api::{GitHubClient, PAGE_SIZE};
use tracing::{info, warn};

/// How enterprise code scanning alerts are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterpriseRoute {
    /// One call to the enterprise-wide endpoint.
    Aggregate,
    /// One call per repository from the stafftools listing.
    PerRepository,
}

/// Pick the enterprise code scanning route for a server version.
pub fn code_scanning_route(version: &ServerVersion) -> EnterpriseRoute {
    if version.lacks_enterprise_code_scanning() {
        EnterpriseRoute::PerRepository
    } else {
        EnterpriseRoute::Aggregate
    }
}

/// Maps a scope and feature onto the alert endpoints that must be visited.
pub struct ScopeResolver<'a> {
    client: &'a GitHubClient,
    config: &'a ReportConfig,
}

impl<'a> ScopeResolver<'a> {
    pub fn new(client: &'a GitHubClient, config: &'a ReportConfig) -> Self {
        Self { client, config }
    }

    /// Alert listing URL for one repository.
    pub fn repository_alerts_url(&self, feature: Feature, repo: &RepositoryId) -> String {
        self.alerts_url(&format!("repos/{}", repo), feature)
    }

    /// Alert listing URL at the configured scope's own granularity.
    pub fn scope_alerts_url(&self, feature: Feature) -> String {
        let prefix = match self.config.scope {
            Scope::Repository => "repos",
            Scope::Organization => "orgs",
            Scope::Enterprise => "enterprises",
        };
        self.alerts_url(&format!("{}/{}", prefix, self.config.scope_name.trim()), feature)
    }

    fn alerts_url(&self, owner_path: &str, feature: Feature) -> String {
        self.client.endpoint(&format!(
            "{}/{}/alerts?per_page={}",
            owner_path,
            feature.api_segment(),
            PAGE_SIZE
        ))
    }

    /// Collect every alert of `feature` at the configured scope.
    pub async fn resolve(&self, feature: Feature) -> Result<Vec<ScopedAlert>> {
        match self.config.scope {
            Scope::Repository => {
                let repo = self.config.scope_repository()?;
                let records: Vec<AlertRecord> = self
                    .client
                    .fetch_all(&self.repository_alerts_url(feature, &repo))
                    .await?;
                Ok(records
                    .into_iter()
                    .map(|r| ScopedAlert::for_repository(repo.clone(), r))
                    .collect())
            }
            Scope::Enterprise if feature == Feature::CodeScanning => {
                let version = enterprise::server_version(self.client, self.config).await?;
                match code_scanning_route(&version) {
                    EnterpriseRoute::PerRepository => {
                        info!(
                            version = ?version,
                            "No enterprise code scanning endpoint, collecting per repository"
                        );
                        let repos = enterprise::repository_listing(self.client, self.config).await?;
                        self.fan_out(feature, &repos).await
                    }
                    EnterpriseRoute::Aggregate => self.aggregate(feature).await,
                }
            }
            Scope::Organization | Scope::Enterprise => self.aggregate(feature).await,
        }
    }

    async fn aggregate(&self, feature: Feature) -> Result<Vec<ScopedAlert>> {
        let url = self.scope_alerts_url(feature);
        info!(feature = %feature, scope = %self.config.scope, "Fetching alerts");
        let records: Vec<AlertRecord> = self.client.fetch_all(&url).await?;
        Ok(records.into_iter().map(ScopedAlert::from_record).collect())
    }

    /// One fetch per repository, sequentially and in listing order.
    ///
    /// Repositories where the feature is disabled are skipped. If that is
    /// every repository, the last disabled response is returned as the error.
    pub async fn fan_out(
        &self,
        feature: Feature,
        repos: &[RepositoryId],
    ) -> Result<Vec<ScopedAlert>> {
        let mut alerts = Vec::new();
        let mut last_disabled = None;
        let mut fetched = 0usize;

        for (idx, repo) in repos.iter().enumerate() {
            info!(repo = %repo, "Fetching alerts for repository {}/{}", idx + 1, repos.len());
            let result: Result<Vec<AlertRecord>> = self
                .client
                .fetch_all(&self.repository_alerts_url(feature, repo))
                .await;
            let records = match result {
                Ok(records) => records,
                Err(e) => {
                    if disabled::disabled_reason(feature, &e).is_none() {
                        return Err(e);
                    }
                    warn!(
                        repo = %repo,
                        error = %e,
                        "Skipping repository, {} is not enabled",
                        feature.label()
                    );
                    last_disabled = Some(e);
                    continue;
                }
            };
            fetched += 1;
            alerts.extend(
                records
                    .into_iter()
                    .map(|r| ScopedAlert::for_repository(repo.clone(), r)),
            );
        }

        match last_disabled {
            Some(e) if fetched == 0 => Err(e),
            _ => Ok(alerts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(scope: Scope, name: &str) -> ReportConfig {
        ReportConfig::new("token", scope, name).unwrap()
    }

    #[test]
    fn test_scope_urls() {
        let cfg = config(Scope::Repository, "octo/hello");
        let client = GitHubClient::new(&cfg).unwrap();
        let resolver = ScopeResolver::new(&client, &cfg);
        assert_eq!(
            resolver.scope_alerts_url(Feature::SecretScanning),
            "https://api.github.com/repos/octo/hello/secret-scanning/alerts?per_page=100"
        );

        let cfg = config(Scope::Organization, "acme");
        let resolver = ScopeResolver::new(&client, &cfg);
        assert_eq!(
            resolver.scope_alerts_url(Feature::Dependabot),
            "https://api.github.com/orgs/acme/dependabot/alerts?per_page=100"
        );

        let cfg = config(Scope::Enterprise, "big-corp");
        let resolver = ScopeResolver::new(&client, &cfg);
        assert_eq!(
            resolver.scope_alerts_url(Feature::CodeScanning),
            "https://api.github.com/enterprises/big-corp/code-scanning/alerts?per_page=100"
        );
    }

    #[test]
    fn test_repository_alerts_url() {
        let cfg = config(Scope::Enterprise, "big-corp");
        let client = GitHubClient::new(&cfg).unwrap();
        let resolver = ScopeResolver::new(&client, &cfg);
        let repo: RepositoryId = "acme/api".parse().unwrap();
        assert_eq!(
            resolver.repository_alerts_url(Feature::CodeScanning, &repo),
            "https://api.github.com/repos/acme/api/code-scanning/alerts?per_page=100"
        );
    }

    #[test]
    fn test_code_scanning_route() {
        let route = |v: &str| code_scanning_route(&ServerVersion::Server(v.to_string()));
        assert_eq!(route("3.5.3"), EnterpriseRoute::PerRepository);
        assert_eq!(route("3.6.2"), EnterpriseRoute::PerRepository);
        assert_eq!(route("3.7.1"), EnterpriseRoute::Aggregate);
        assert_eq!(route("3.4"), EnterpriseRoute::Aggregate);
        assert_eq!(route("ghes-99"), EnterpriseRoute::Aggregate);
        assert_eq!(route(""), EnterpriseRoute::Aggregate);
        assert_eq!(
            code_scanning_route(&ServerVersion::Cloud),
            EnterpriseRoute::Aggregate
        );
    }
}
