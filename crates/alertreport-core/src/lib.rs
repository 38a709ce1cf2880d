pub mod config;
pub mod disabled;
pub mod enterprise;
pub mod error;
pub mod models;
pub mod properties;
pub mod providers;
pub mod report;
pub mod resolver;
pub mod runner;

pub use config::{Feature, ReportConfig, Scope};
pub use error::{ApiError, ReportError, Result};
pub use models::{AlertRecord, RepositoryId, ScopedAlert};
pub use providers::github_api::GitHubClient;
pub use resolver::ScopeResolver;
pub use runner::{run_report, FeatureOutcome};
