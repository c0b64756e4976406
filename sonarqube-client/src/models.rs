//! Wire models for the SonarQube web API.
//!
//! Only the fields the exporter reads are modeled. Optional fields default
//! so that older servers that omit them still decode, and an explicit
//! `null` decodes the same as a missing field.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Decode `null` as the type's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Declared value type of a SonarQube metric.
///
/// The set is closed: every type the server documents has a variant, and
/// anything newer lands in [`MetricType::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricType {
    Int,
    Float,
    Percent,
    Bool,
    String,
    Millisec,
    Data,
    Level,
    Distrib,
    Rating,
    WorkDur,
    #[serde(other)]
    Unknown,
}

impl MetricType {
    /// Whether measures of this type can be exposed as a gauge.
    pub fn is_numeric(&self) -> bool {
        match self {
            MetricType::Int
            | MetricType::Float
            | MetricType::Percent
            | MetricType::Rating
            | MetricType::Millisec
            | MetricType::WorkDur => true,
            MetricType::Bool
            | MetricType::String
            | MetricType::Data
            | MetricType::Level
            | MetricType::Distrib
            | MetricType::Unknown => false,
        }
    }

    /// The upstream spelling of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Int => "INT",
            MetricType::Float => "FLOAT",
            MetricType::Percent => "PERCENT",
            MetricType::Bool => "BOOL",
            MetricType::String => "STRING",
            MetricType::Millisec => "MILLISEC",
            MetricType::Data => "DATA",
            MetricType::Level => "LEVEL",
            MetricType::Distrib => "DISTRIB",
            MetricType::Rating => "RATING",
            MetricType::WorkDur => "WORK_DUR",
            MetricType::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric definition from `/api/metrics/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    pub key: String,
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub domain: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub direction: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub qualitative: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hidden: bool,
}

/// Response body of `/api/metrics/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub metrics: Vec<Metric>,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub p: u32,
    #[serde(default)]
    pub ps: u32,
}

/// The metric catalog as returned to callers: one page of definitions and
/// the total the server reported.
#[derive(Debug, Clone, Default)]
pub struct MetricCatalog {
    pub metrics: Vec<Metric>,
    pub total: usize,
    by_key: HashMap<String, usize>,
}

impl MetricCatalog {
    /// Build a catalog and index it by metric key. On duplicate keys the
    /// first definition wins.
    pub fn new(metrics: Vec<Metric>, total: usize) -> Self {
        let mut by_key = HashMap::with_capacity(metrics.len());
        for (i, metric) in metrics.iter().enumerate() {
            by_key.entry(metric.key.clone()).or_insert(i);
        }

        Self {
            metrics,
            total,
            by_key,
        }
    }

    /// Look up a definition by metric key.
    pub fn get(&self, key: &str) -> Option<&Metric> {
        self.by_key.get(key).and_then(|&i| self.metrics.get(i))
    }
}

/// A project from `/api/components/search_projects`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub qualifier: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub visibility: String,
}

/// Paging block of a paginated response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    pub page_index: u32,
    pub page_size: u32,
    pub total: usize,
}

/// Response body of `/api/components/search_projects`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentsResponse {
    pub paging: Paging,
    #[serde(default, deserialize_with = "null_as_default")]
    pub components: Vec<Component>,
}

/// A single measure. An empty `value` means the server has no value yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measure {
    pub metric: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
}

/// Component block of `/api/measures/component`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentMeasures {
    pub key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub measures: Vec<Measure>,
}

/// Response body of `/api/measures/component`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasuresResponse {
    pub component: ComponentMeasures,
}
