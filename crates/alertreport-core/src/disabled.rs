//! Recognising "feature not enabled" API responses.
//!
//! GitHub reports a disabled feature as an ordinary error whose only
//! distinguishing mark is the message text, so this matches known phrases.
//! Keep all phrase matching here.

use crate::config::Feature;
use crate::error::{ApiError, ReportError};

const SECRET_SCANNING_PHRASES: &[&str] = &[
    "secret scanning is not enabled",
    "secret scanning is disabled",
];

const DEPENDABOT_PHRASES: &[&str] = &[
    "dependabot alerts are not enabled",
    "dependabot alerts are disabled",
];

const CODE_SCANNING_PHRASES: &[&str] = &[
    "code scanning is not enabled",
    "advanced security must be enabled",
];

fn phrases(feature: Feature) -> &'static [&'static str] {
    match feature {
        Feature::SecretScanning => SECRET_SCANNING_PHRASES,
        Feature::CodeScanning => CODE_SCANNING_PHRASES,
        Feature::Dependabot => DEPENDABOT_PHRASES,
    }
}

/// True if `error` says `feature` is switched off for the scope.
pub fn is_feature_disabled(feature: Feature, error: &ApiError) -> bool {
    let text = error.message().unwrap_or_else(|| error.body.clone());
    let lower = text.to_lowercase();
    phrases(feature).iter().any(|p| lower.contains(p))
}

/// The API error behind `error` when it is a disabled-feature response.
pub fn disabled_reason(feature: Feature, error: &ReportError) -> Option<&ApiError> {
    error
        .as_api()
        .filter(|api| is_feature_disabled(feature, api))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_scanning_phrases() {
        let err = ApiError::new(
            404,
            r#"{"message":"Secret scanning is disabled on this repository.","documentation_url":"https://docs.github.com/rest"}"#,
        );
        assert!(is_feature_disabled(Feature::SecretScanning, &err));
        assert!(!is_feature_disabled(Feature::Dependabot, &err));

        let plain = ApiError::new(404, "Secret Scanning is NOT enabled for this org");
        assert!(is_feature_disabled(Feature::SecretScanning, &plain));
    }

    #[test]
    fn test_dependabot_phrases() {
        let err = ApiError::new(
            403,
            r#"{"message":"Dependabot alerts are disabled for this repository."}"#,
        );
        assert!(is_feature_disabled(Feature::Dependabot, &err));

        let err = ApiError::new(403, "Dependabot alerts are not enabled for this repository");
        assert!(is_feature_disabled(Feature::Dependabot, &err));
    }

    #[test]
    fn test_code_scanning_phrases() {
        let err = ApiError::new(
            403,
            r#"{"message":"Advanced Security must be enabled for this repository to use code scanning."}"#,
        );
        assert!(is_feature_disabled(Feature::CodeScanning, &err));
    }

    #[test]
    fn test_other_errors_are_not_disabled() {
        let err = ApiError::new(401, r#"{"message":"Bad credentials"}"#);
        for feature in Feature::ALL {
            assert!(!is_feature_disabled(feature, &err));
        }
    }

    #[test]
    fn test_disabled_reason_only_for_api_errors() {
        let err = ReportError::from(ApiError::new(404, "secret scanning is disabled"));
        assert!(disabled_reason(Feature::SecretScanning, &err).is_some());

        let err = ReportError::Config("secret scanning is disabled".into());
        assert!(disabled_reason(Feature::SecretScanning, &err).is_none());
    }
}
