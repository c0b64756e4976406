//! Mapping from SonarQube metric keys to Prometheus names and labels.

use sonarqube_client::Metric;

/// Label carrying the project key.
pub const LABEL_PROJECT_KEY: &str = "project_key";
/// Label carrying the project display name.
pub const LABEL_PROJECT_NAME: &str = "project_name";
/// Label carrying the project qualifier (TRK, APP, ...).
pub const LABEL_QUALIFIER: &str = "qualifier";
/// Label carrying the project visibility.
pub const LABEL_VISIBILITY: &str = "visibility";
/// Constant label carrying the metric's catalog domain.
pub const LABEL_DOMAIN: &str = "domain";

/// Sanitize a SonarQube metric key into a Prometheus name fragment.
///
/// Lowercases, then replaces `-` and `.` with `_`. Applying it twice gives
/// the same result as applying it once.
pub fn sanitize_metric_name(key: &str) -> String {
    key.to_lowercase()
        .chars()
        .map(|c| match c {
            '-' | '.' => '_',
            other => other,
        })
        .collect()
}

/// Build a full metric name from the exporter prefix and a metric key.
///
/// Format: `{prefix}_{sanitized key}`
pub fn build_metric_name(prefix: &str, key: &str) -> String {
    let sanitized = sanitize_metric_name(key);

    if prefix.is_empty() {
        sanitized
    } else {
        format!("{}_{}", prefix, sanitized)
    }
}

/// Keys of catalog metrics that are numeric and not hidden, in catalog order.
pub fn numeric_metric_keys(metrics: &[Metric]) -> Vec<String> {
    metrics
        .iter()
        .filter(|m| !m.hidden && m.metric_type.is_numeric())
        .map(|m| m.key.clone())
        .collect()
}
