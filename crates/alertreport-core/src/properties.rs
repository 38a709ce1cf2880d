use crate::error::{ReportError, Result};
use crate::models::{RepositoryId, ScopedAlert};
use crate::providers::github_api::GitHubClient;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Custom property name to value for one repository.
pub type PropertyMap = BTreeMap<String, Value>;

#[derive(Debug, Deserialize)]
struct PropertyValue {
    property_name: String,
    #[serde(default)]
    value: Value,
}

/// Fetch the custom property values of one repository.
pub async fn repo_properties(client: &GitHubClient, repo: &RepositoryId) -> Result<PropertyMap> {
    let url = client.endpoint(&format!("repos/{}/properties/values", repo));
    let values: Vec<PropertyValue> = client.fetch_one(&url).await?;
    Ok(values
        .into_iter()
        .map(|p| (p.property_name, p.value))
        .collect())
}

/// Per-run cache so each repository's properties are fetched at most once.
#[derive(Debug, Default)]
pub struct PropertyCache {
    entries: BTreeMap<RepositoryId, PropertyMap>,
}

impl PropertyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure every repository referenced by `alerts` is loaded.
    ///
    /// A repository whose lookup is refused by the API (no endpoint on older
    /// servers, user-owned repositories) gets an empty map. Transport and
    /// decode failures still fail the call.
    pub async fn load_for(&mut self, client: &GitHubClient, alerts: &[ScopedAlert]) -> Result<()> {
        for repo in alerts.iter().filter_map(|a| a.repository.as_ref()) {
            if self.entries.contains_key(repo) {
                continue;
            }
            let properties = match repo_properties(client, repo).await {
                Ok(properties) => {
                    debug!(repo = %repo, count = properties.len(), "Loaded custom properties");
                    properties
                }
                Err(ReportError::Api(e)) => {
                    warn!(repo = %repo, status = e.status, "Custom properties unavailable: {}", e);
                    PropertyMap::new()
                }
                Err(e) => return Err(e),
            };
            self.entries.insert(repo.clone(), properties);
        }
        Ok(())
    }

    pub fn insert(&mut self, repo: RepositoryId, properties: PropertyMap) {
        self.entries.insert(repo, properties);
    }

    pub fn get(&self, repo: &RepositoryId) -> Option<&PropertyMap> {
        self.entries.get(repo)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted union of property names across the repositories in `alerts`.
    pub fn property_names(&self, alerts: &[ScopedAlert]) -> Vec<String> {
        let names: BTreeSet<&String> = alerts
            .iter()
            .filter_map(|a| a.repository.as_ref())
            .filter_map(|repo| self.entries.get(repo))
            .flat_map(|props| props.keys())
            .collect();
        names.into_iter().cloned().collect()
    }
}
