pub mod columns;

use crate::config::Feature;
use crate::error::{ReportError, Result};
use crate::models::ScopedAlert;
use crate::properties::PropertyCache;
use columns::columns_for;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes one CSV file per feature into an output directory.
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn path_for(&self, feature: Feature) -> PathBuf {
        self.output_dir.join(feature.report_file_name())
    }

    /// Write the report for `feature`, returning the file path.
    pub fn write(
        &self,
        feature: Feature,
        alerts: &[ScopedAlert],
        properties: &PropertyCache,
    ) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| ReportError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let path = self.path_for(feature);
        let file = std::fs::File::create(&path).map_err(|source| io_error(&path, source))?;
        write_csv(file, feature, alerts, properties)?;

        info!(path = %path.display(), rows = alerts.len(), "Wrote report");
        Ok(path)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ReportError {
    ReportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Serialize alerts as CSV: fixed columns, `repository`, then one column per
/// custom property name.
pub fn write_csv<W: Write>(
    writer: W,
    feature: Feature,
    alerts: &[ScopedAlert],
    properties: &PropertyCache,
) -> Result<()> {
    let columns = columns_for(feature);
    let property_names = properties.property_names(alerts);

    let mut csv = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = columns.iter().map(|c| c.header).collect();
    header.push("repository");
    header.extend(property_names.iter().map(String::as_str));
    csv.write_record(&header)?;

    for alert in alerts {
        let mut row: Vec<String> = columns
            .iter()
            .map(|c| alert.record.lookup(c.path).map(cell).unwrap_or_default())
            .collect();

        row.push(
            alert
                .repository
                .as_ref()
                .map(|r| r.to_string())
                .unwrap_or_default(),
        );

        let props = alert.repository.as_ref().and_then(|r| properties.get(r));
        for name in &property_names {
            row.push(
                props
                    .and_then(|p| p.get(name))
                    .map(cell)
                    .unwrap_or_default(),
            );
        }

        csv.write_record(&row)?;
    }

    csv.flush().map_err(|e| ReportError::Csv(e.into()))?;
    Ok(())
}

/// Render one JSON value as a CSV cell.
fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(cell).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlertRecord;
    use crate::properties::PropertyMap;
    use serde_json::json;

    fn alert(repo: &str, value: Value) -> ScopedAlert {
        let record: AlertRecord = serde_json::from_value(value).unwrap();
        ScopedAlert::for_repository(repo.parse().unwrap(), record)
    }

    fn render(feature: Feature, alerts: &[ScopedAlert], cache: &PropertyCache) -> String {
        let mut out = Vec::new();
        write_csv(&mut out, feature, alerts, cache).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_cell_rendering() {
        assert_eq!(cell(&Value::Null), "");
        assert_eq!(cell(&json!(7)), "7");
        assert_eq!(cell(&json!(false)), "false");
        assert_eq!(cell(&json!(["security", "cwe-79"])), "security,cwe-79");
        assert_eq!(cell(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_code_scanning_row() {
        let alerts = vec![alert(
            "acme/api",
            json!({
                "number": 3,
                "state": "open",
                "rule": {"id": "js/xss", "severity": "error", "tags": ["security", "external/cwe/cwe-079"]},
                "tool": {"name": "CodeQL", "version": "2.15.0"},
                "most_recent_instance": {"ref": "refs/heads/main", "location": {"path": "src/app.js"}}
            }),
        )];
        let out = render(Feature::CodeScanning, &alerts, &PropertyCache::new());
        let mut lines = out.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("number,created_at,html_url,state"));
        assert!(header.ends_with("instances_url,repository"));

        let row = lines.next().unwrap();
        assert!(row.starts_with("3,,,open,"));
        assert!(row.contains("js/xss,error"));
        assert!(row.contains("\"security,external/cwe/cwe-079\""));
        assert!(row.contains("src/app.js"));
        assert!(row.ends_with(",acme/api"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_property_columns_appended() {
        let mut cache = PropertyCache::new();
        cache.insert(
            "acme/api".parse().unwrap(),
            PropertyMap::from([("team".to_string(), json!("core"))]),
        );
        cache.insert("acme/web".parse().unwrap(), PropertyMap::new());

        let alerts = vec![
            alert("acme/api", json!({"number": 1, "secret_type": "github_pat"})),
            alert("acme/web", json!({"number": 2, "secret_type": "aws_key"})),
        ];
        let out = render(Feature::SecretScanning, &alerts, &cache);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].ends_with(",repository,team"));
        assert!(lines[1].ends_with(",acme/api,core"));
        assert!(lines[2].ends_with(",acme/web,"));
    }

    #[test]
    fn test_empty_report_has_header_only() {
        let out = render(Feature::Dependabot, &[], &PropertyCache::new());
        assert_eq!(out.lines().count(), 1);
        assert!(out.starts_with("number,state,created_at"));
    }

    #[test]
    fn test_writer_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("reports"));
        let path = writer
            .write(Feature::Dependabot, &[], &PropertyCache::new())
            .unwrap();
        assert!(path.ends_with("reports/dependabot_list.csv"));
        assert!(path.exists());
    }
}
