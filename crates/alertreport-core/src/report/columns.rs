use crate::config::Feature;

/// A report column filled from a path into the alert JSON.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub header: &'static str,
    pub path: &'static [&'static str],
}

const fn col(header: &'static str, path: &'static [&'static str]) -> Column {
    Column { header, path }
}

const SECRET_SCANNING: &[Column] = &[
    col("number", &["number"]),
    col("created_at", &["created_at"]),
    col("html_url", &["html_url"]),
    col("state", &["state"]),
    col("resolution", &["resolution"]),
    col("resolved_at", &["resolved_at"]),
    col("resolved_by_username", &["resolved_by", "login"]),
    col("resolved_by_type", &["resolved_by", "type"]),
    col("resolved_by_isadmin", &["resolved_by", "site_admin"]),
    col("secret_type", &["secret_type"]),
    col("secret_type_display_name", &["secret_type_display_name"]),
    col("validity", &["validity"]),
    col("push_protection_bypassed", &["push_protection_bypassed"]),
];

const CODE_SCANNING: &[Column] = &[
    col("number", &["number"]),
    col("created_at", &["created_at"]),
    col("html_url", &["html_url"]),
    col("state", &["state"]),
    col("fixed_at", &["fixed_at"]),
    col("dismissed_at", &["dismissed_at"]),
    col("dismissed_by", &["dismissed_by", "login"]),
    col("dismissed_reason", &["dismissed_reason"]),
    col("dismissed_comment", &["dismissed_comment"]),
    col("rule_id", &["rule", "id"]),
    col("rule_severity", &["rule", "severity"]),
    col("rule_security_severity_level", &["rule", "security_severity_level"]),
    col("rule_tags", &["rule", "tags"]),
    col("rule_description", &["rule", "description"]),
    col("tool_name", &["tool", "name"]),
    col("tool_version", &["tool", "version"]),
    col("most_recent_instance_ref", &["most_recent_instance", "ref"]),
    col("most_recent_instance_state", &["most_recent_instance", "state"]),
    col("most_recent_instance_sha", &["most_recent_instance", "commit_sha"]),
    col("most_recent_instance_path", &["most_recent_instance", "location", "path"]),
    col("instances_url", &["instances_url"]),
];

const DEPENDABOT: &[Column] = &[
    col("number", &["number"]),
    col("state", &["state"]),
    col("created_at", &["created_at"]),
    col("updated_at", &["updated_at"]),
    col("fixed_at", &["fixed_at"]),
    col("dismissed_at", &["dismissed_at"]),
    col("dismissed_by", &["dismissed_by", "login"]),
    col("dismissed_reason", &["dismissed_reason"]),
    col("dismissed_comment", &["dismissed_comment"]),
    col("package_ecosystem", &["dependency", "package", "ecosystem"]),
    col("package_name", &["dependency", "package", "name"]),
    col("manifest_path", &["dependency", "manifest_path"]),
    col("dependency_scope", &["dependency", "scope"]),
    col("ghsa_id", &["security_advisory", "ghsa_id"]),
    col("cve_id", &["security_advisory", "cve_id"]),
    col("summary", &["security_advisory", "summary"]),
    col("severity", &["security_advisory", "severity"]),
    col("cvss_score", &["security_advisory", "cvss", "score"]),
    col(
        "vulnerable_version_range",
        &["security_vulnerability", "vulnerable_version_range"],
    ),
    col(
        "first_patched_version",
        &["security_vulnerability", "first_patched_version", "identifier"],
    ),
    col("html_url", &["html_url"]),
];

/// Fixed alert columns for a feature, before `repository` and properties.
pub fn columns_for(feature: Feature) -> &'static [Column] {
    match feature {
        Feature::SecretScanning => SECRET_SCANNING,
        Feature::CodeScanning => CODE_SCANNING,
        Feature::Dependabot => DEPENDABOT,
    }
}
