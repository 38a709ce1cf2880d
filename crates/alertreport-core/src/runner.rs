use crate::config::{Feature, ReportConfig};
use crate::disabled;
use crate::error::{ApiError, Result};
use crate::properties::PropertyCache;
use crate::providers::github_api::GitHubClient;
use crate::report::ReportWriter;
use crate::resolver::ScopeResolver;
use std::path::PathBuf;
use tracing::info;

/// What happened to one requested feature.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureOutcome {
    Written {
        feature: Feature,
        path: PathBuf,
        alerts: usize,
    },
    /// The feature is not enabled for the scope; no report was written.
    Skipped { feature: Feature, reason: ApiError },
}

impl FeatureOutcome {
    pub fn feature(&self) -> Feature {
        match self {
            FeatureOutcome::Written { feature, .. } | FeatureOutcome::Skipped { feature, .. } => {
                *feature
            }
        }
    }
}

/// Run every requested feature and write its report.
pub async fn run_report(config: &ReportConfig) -> Result<Vec<FeatureOutcome>> {
    run_report_with(config, |_| {}).await
}

/// Like [`run_report`], calling `on_outcome` as each feature finishes.
///
/// Features run one after another. A disabled-feature response is recorded as
/// [`FeatureOutcome::Skipped`]; any other error stops the run.
pub async fn run_report_with<F>(
    config: &ReportConfig,
    mut on_outcome: F,
) -> Result<Vec<FeatureOutcome>>
where
    F: FnMut(&FeatureOutcome),
{
    config.validate()?;

    let client = GitHubClient::new(config)?;
    let resolver = ScopeResolver::new(&client, config);
    let writer = ReportWriter::new(&config.output_dir);
    let mut properties = PropertyCache::new();
    let mut outcomes = Vec::with_capacity(config.features.len());

    for &feature in &config.features {
        info!(
            feature = %feature,
            scope = %config.scope,
            name = %config.scope_name,
            "Starting feature"
        );

        let outcome = match resolver.resolve(feature).await {
            Ok(alerts) => {
                if config.include_properties {
                    properties.load_for(&client, &alerts).await?;
                }
                let path = writer.write(feature, &alerts, &properties)?;
                FeatureOutcome::Written {
                    feature,
                    path,
                    alerts: alerts.len(),
                }
            }
            Err(e) => match disabled::disabled_reason(feature, &e) {
                Some(reason) => {
                    info!(
                        feature = %feature,
                        error = %reason,
                        "Skipping {} as it is not enabled",
                        feature.label()
                    );
                    FeatureOutcome::Skipped {
                        feature,
                        reason: reason.clone(),
                    }
                }
                None => return Err(e),
            },
        };

        on_outcome(&outcome);
        outcomes.push(outcome);
    }

    Ok(outcomes)
}
