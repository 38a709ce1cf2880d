use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// An alert as returned by the API, passed through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertRecord(pub Map<String, Value>);

impl AlertRecord {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Follow a chain of object keys, e.g. `["rule", "severity"]`.
    pub fn lookup(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.0.get(*first)?;
        for key in rest {
            current = current.get(*key)?;
        }
        Some(current)
    }

    /// `repository.full_name`, present on organization and enterprise listings.
    pub fn repository_name(&self) -> Option<&str> {
        self.lookup(&["repository", "full_name"])?.as_str()
    }
}

/// A repository in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepositoryId(String);

impl RepositoryId {
    /// Build from listing columns the server already validated.
    pub(crate) fn from_parts(owner: &str, name: &str) -> Self {
        Self(format!("{}/{}", owner, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn owner(&self) -> &str {
        self.0.split_once('/').map(|(o, _)| o).unwrap_or(&self.0)
    }

    pub fn name(&self) -> &str {
        self.0.split_once('/').map(|(_, n)| n).unwrap_or("")
    }
}

impl FromStr for RepositoryId {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_matches('/');
        match trimmed.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self(trimmed.to_string()))
            }
            _ => Err(ReportError::Config(format!(
                "Repository '{}' must be in owner/name form",
                s
            ))),
        }
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An alert paired with the repository it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopedAlert {
    pub repository: Option<RepositoryId>,
    pub record: AlertRecord,
}

impl ScopedAlert {
    /// Attribute a record using its own `repository.full_name`.
    pub fn from_record(record: AlertRecord) -> Self {
        let repository = record
            .repository_name()
            .and_then(|name| name.parse().ok());
        Self { repository, record }
    }

    pub fn for_repository(repository: RepositoryId, record: AlertRecord) -> Self {
        Self {
            repository: Some(repository),
            record,
        }
    }
}
