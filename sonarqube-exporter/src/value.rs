//! Type-directed parsing of measure values.

use sonarqube_client::MetricType;
use thiserror::Error;

/// A measure value that does not match its metric's declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {metric_type} value {value:?}")]
pub struct ParseError {
    pub metric_type: MetricType,
    pub value: String,
}

/// Parse a raw measure value according to the metric's declared type.
///
/// An empty string means the server has no value yet and yields `0.0`.
/// Ratings arrive already numeric (1 = A through 5 = E). Non-numeric types
/// yield `0.0`; they are filtered out before measures are requested.
pub fn parse_value(raw: &str, metric_type: MetricType) -> Result<f64, ParseError> {
    if raw.is_empty() {
        return Ok(0.0);
    }

    let invalid = || ParseError {
        metric_type,
        value: raw.to_string(),
    };

    match metric_type {
        MetricType::Int | MetricType::Millisec | MetricType::WorkDur => {
            raw.parse::<i64>().map(|v| v as f64).map_err(|_| invalid())
        }
        MetricType::Float | MetricType::Percent | MetricType::Rating => {
            raw.parse::<f64>().map_err(|_| invalid())
        }
        MetricType::Bool
        | MetricType::String
        | MetricType::Data
        | MetricType::Level
        | MetricType::Distrib
        | MetricType::Unknown => Ok(0.0),
    }
}
