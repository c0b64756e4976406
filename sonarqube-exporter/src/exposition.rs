//! Prometheus text exposition (format 0.0.4).

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::collector::{CollectorStats, Sample};

/// Content type of the rendered exposition.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render samples followed by the exporter's own statistics.
///
/// Families are ordered by name; series inside a family keep the order in
/// which they were collected.
pub fn render(samples: &[Sample], stats: &CollectorStats, prefix: &str) -> String {
    let mut output = String::with_capacity(samples.len() * 100);

    let mut by_name: BTreeMap<&str, Vec<&Sample>> = BTreeMap::new();
    for sample in samples {
        by_name
            .entry(sample.descriptor.name.as_str())
            .or_default()
            .push(sample);
    }

    for (name, series) in &by_name {
        let Some(first) = series.first() else {
            continue;
        };

        if !first.descriptor.help.is_empty() {
            writeln!(output, "# HELP {} {}", name, escape_help(&first.descriptor.help)).ok();
        }
        writeln!(output, "# TYPE {} gauge", name).ok();

        for sample in series {
            writeln!(
                output,
                "{}{} {}",
                name,
                format_labels(&sample_labels(sample)),
                format_value(sample.value)
            )
            .ok();
        }
    }

    render_stats(&mut output, stats, prefix);
    output
}

/// Suffix, type and help of the exporter's own metric families, appended
/// to the prefix.
pub(crate) const STATS_FAMILIES: [(&str, &str, &str); 6] = [
    ("exporter_scrapes_total", "counter", "Collection cycles run"),
    (
        "exporter_failed_scrapes_total",
        "counter",
        "Collection cycles aborted by a catalog or project list failure",
    ),
    (
        "exporter_measure_fetch_errors_total",
        "counter",
        "Projects whose measures could not be fetched",
    ),
    (
        "exporter_parse_errors_total",
        "counter",
        "Measures skipped because their value did not parse",
    ),
    (
        "exporter_last_scrape_duration_seconds",
        "gauge",
        "Duration of the most recent collection cycle",
    ),
    (
        "exporter_last_scrape_samples",
        "gauge",
        "Samples produced by the most recent collection cycle",
    ),
];

fn render_stats(output: &mut String, stats: &CollectorStats, prefix: &str) {
    let values = [
        stats.scrapes.to_string(),
        stats.failed_scrapes.to_string(),
        stats.measure_fetch_errors.to_string(),
        stats.parse_errors.to_string(),
        format_value(stats.last_duration.as_secs_f64()),
        stats.last_sample_count.to_string(),
    ];

    for ((suffix, kind, help), value) in STATS_FAMILIES.iter().zip(values) {
        let name = format!("{}_{}", prefix, suffix);
        writeln!(output, "# HELP {} {}", name, help).ok();
        writeln!(output, "# TYPE {} {}", name, kind).ok();
        writeln!(output, "{} {}", name, value).ok();
    }
}

/// Variable and constant labels of a sample, sorted by label name.
fn sample_labels(sample: &Sample) -> Vec<(&str, &str)> {
    let descriptor = &sample.descriptor;
    let mut labels: Vec<(&str, &str)> =
        Vec::with_capacity(descriptor.variable_labels.len() + descriptor.const_labels.len());

    for (name, value) in descriptor.variable_labels.iter().zip(&sample.label_values) {
        labels.push((*name, value.as_str()));
    }
    for (name, value) in &descriptor.const_labels {
        labels.push((name.as_str(), value.as_str()));
    }

    labels.sort_by(|a, b| a.0.cmp(b.0));
    labels
}

/// Escape special characters in label values.
fn escape_label_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape HELP text; quotes are left as-is.
fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Format a floating point value for Prometheus.
fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "+Inf".to_string()
        } else {
            "-Inf".to_string()
        }
    } else if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

/// Format labels for Prometheus exposition format.
fn format_labels(labels: &[(&str, &str)]) -> String {
    if labels.is_empty() {
        return String::new();
    }

    let parts: Vec<String> = labels
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label_value(v)))
        .collect();

    format!("{{{}}}", parts.join(","))
}
