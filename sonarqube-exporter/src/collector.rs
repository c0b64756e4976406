//! Collection cycle: catalog, projects, measures, samples.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use sonarqube_client::{ClientError, Component, SonarQubeClient};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::config::PrometheusConfig;
use crate::descriptor::{Descriptor, DescriptorCache};
use crate::exposition::{self, STATS_FAMILIES};
use crate::mapping::{
    LABEL_PROJECT_KEY, LABEL_PROJECT_NAME, LABEL_QUALIFIER, LABEL_VISIBILITY,
    build_metric_name, numeric_metric_keys,
};
use crate::value::parse_value;

/// One exposed sample: a descriptor, its variable label values and a value.
#[derive(Debug, Clone)]
pub struct Sample {
    pub descriptor: Arc<Descriptor>,
    /// Values for `descriptor.variable_labels`, in the same order.
    pub label_values: Vec<String>,
    pub value: f64,
}

impl Sample {
    /// Look up a variable label value by name.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.descriptor
            .variable_labels
            .iter()
            .position(|l| *l == name)
            .and_then(|i| self.label_values.get(i))
            .map(String::as_str)
    }
}

/// Failures that abort a whole cycle.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("Failed to fetch metric catalog: {0}")]
    Catalog(#[source] ClientError),
    #[error("Failed to fetch projects: {0}")]
    Projects(#[source] ClientError),
}

/// Collector statistics.
#[derive(Debug, Clone, Default)]
pub struct CollectorStats {
    /// Collection cycles run.
    pub scrapes: u64,
    /// Cycles aborted by a catalog or project failure.
    pub failed_scrapes: u64,
    /// Projects whose measure fetch failed.
    pub measure_fetch_errors: u64,
    /// Measures skipped because their value did not parse.
    pub parse_errors: u64,
    /// Duration of the most recent cycle.
    pub last_duration: Duration,
    /// Samples produced by the most recent cycle.
    pub last_sample_count: usize,
}

#[derive(Debug, Default)]
struct CycleCounters {
    measure_fetch_errors: u64,
    parse_errors: u64,
}

/// Drives collection cycles against a SonarQube server.
///
/// The descriptor cache lock is held for the whole cycle, so concurrent
/// scrapes run one after another.
pub struct SonarQubeCollector {
    client: SonarQubeClient,
    prefix: String,
    project_info: Arc<Descriptor>,
    descriptors: Mutex<DescriptorCache>,
    stats: RwLock<CollectorStats>,
}

/// Create a shareable collector handle.
pub type SharedCollector = Arc<SonarQubeCollector>;

impl SonarQubeCollector {
    /// Create a new collector.
    pub fn new(client: SonarQubeClient, prometheus_config: &PrometheusConfig) -> Self {
        let prefix = prometheus_config.prefix.clone();
        let project_info = Arc::new(Descriptor::new(
            build_metric_name(&prefix, "project_info"),
            "Information about SonarQube projects",
            vec![
                LABEL_PROJECT_KEY,
                LABEL_PROJECT_NAME,
                LABEL_QUALIFIER,
                LABEL_VISIBILITY,
            ],
        ));

        let mut descriptors = DescriptorCache::new(prefix.clone());
        descriptors.reserve(project_info.name.clone());
        for (suffix, _, _) in STATS_FAMILIES {
            descriptors.reserve(format!("{}_{}", prefix, suffix));
        }

        Self {
            client,
            descriptors: Mutex::new(descriptors),
            prefix,
            project_info,
            stats: RwLock::new(CollectorStats::default()),
        }
    }

    /// Get collector statistics.
    pub fn stats(&self) -> CollectorStats {
        self.stats.read().clone()
    }

    /// Number of metric descriptors created since start.
    pub async fn descriptor_count(&self) -> usize {
        self.descriptors.lock().await.len()
    }

    /// Run one collection cycle and return the produced samples.
    ///
    /// Never fails: a catalog or project-list failure yields no samples,
    /// a measure failure drops only that project's measures.
    pub async fn collect(&self) -> Vec<Sample> {
        self.collect_with_stats().await.0
    }

    /// Run one cycle and render it in Prometheus text format, followed by
    /// the exporter's own statistics as of the end of that cycle.
    pub async fn scrape(&self) -> String {
        let (samples, stats) = self.collect_with_stats().await;
        exposition::render(&samples, &stats, &self.prefix)
    }

    /// Run one cycle and snapshot the statistics before the cycle lock is
    /// released, so a queued cycle cannot overwrite them first.
    async fn collect_with_stats(&self) -> (Vec<Sample>, CollectorStats) {
        let mut descriptors = self.descriptors.lock().await;
        let started = Instant::now();
        let mut counters = CycleCounters::default();

        let result = self.run_cycle(&mut descriptors, &mut counters).await;

        let elapsed = started.elapsed();
        let mut stats = self.stats.write();
        stats.scrapes += 1;
        stats.measure_fetch_errors += counters.measure_fetch_errors;
        stats.parse_errors += counters.parse_errors;
        stats.last_duration = elapsed;

        let samples = match result {
            Ok(samples) => {
                stats.last_sample_count = samples.len();
                debug!(
                    samples = samples.len(),
                    measure_fetch_errors = counters.measure_fetch_errors,
                    parse_errors = counters.parse_errors,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Collection cycle finished"
                );
                samples
            }
            Err(e) => {
                stats.failed_scrapes += 1;
                stats.last_sample_count = 0;
                error!(error = %e, "Collection cycle aborted");
                Vec::new()
            }
        };

        let snapshot = stats.clone();
        drop(stats);
        drop(descriptors);
        (samples, snapshot)
    }

    async fn run_cycle(
        &self,
        descriptors: &mut DescriptorCache,
        counters: &mut CycleCounters,
    ) -> Result<Vec<Sample>, CollectError> {
        let catalog = self
            .client
            .get_metrics()
            .await
            .map_err(CollectError::Catalog)?;

        if catalog.total > catalog.metrics.len() {
            warn!(
                fetched = catalog.metrics.len(),
                total = catalog.total,
                "Metric catalog truncated to its first page"
            );
        }

        let numeric_keys = numeric_metric_keys(&catalog.metrics);

        let projects = self
            .client
            .get_projects()
            .await
            .map_err(CollectError::Projects)?;

        let mut samples = Vec::with_capacity(projects.len() * (1 + numeric_keys.len()));

        for project in &projects {
            samples.push(self.project_info_sample(project));

            let measures = match self
                .client
                .get_project_measures(&project.key, &numeric_keys)
                .await
            {
                Ok(measures) => measures,
                Err(e) => {
                    counters.measure_fetch_errors += 1;
                    warn!(
                        project = %project.key,
                        endpoint = e.endpoint().unwrap_or_default(),
                        error = %e,
                        "Failed to fetch project measures"
                    );
                    continue;
                }
            };

            for measure in measures {
                // The catalog may have changed since it was fetched.
                let Some(metric) = catalog.get(&measure.metric) else {
                    continue;
                };

                let value = match parse_value(&measure.value, metric.metric_type) {
                    Ok(v) => v,
                    Err(e) => {
                        counters.parse_errors += 1;
                        warn!(
                            project = %project.key,
                            metric = %measure.metric,
                            error = %e,
                            "Failed to parse measure value"
                        );
                        continue;
                    }
                };

                samples.push(Sample {
                    descriptor: descriptors.get_or_create(metric),
                    label_values: vec![project.key.clone(), project.name.clone()],
                    value,
                });
            }
        }

        Ok(samples)
    }

    fn project_info_sample(&self, project: &Component) -> Sample {
        Sample {
            descriptor: Arc::clone(&self.project_info),
            label_values: vec![
                project.key.clone(),
                project.name.clone(),
                project.qualifier.clone(),
                project.visibility.clone(),
            ],
            value: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_collector() -> SonarQubeCollector {
        let client = SonarQubeClient::new("http://127.0.0.1:1", "t").unwrap();
        SonarQubeCollector::new(client, &PrometheusConfig::default())
    }

    #[test]
    fn test_project_info_descriptor() {
        let collector = make_collector();
        let desc = Arc::clone(&collector.project_info);

        assert_eq!(desc.name, "sonarqube_project_info");
        assert_eq!(
            desc.variable_labels,
            vec!["project_key", "project_name", "qualifier", "visibility"]
        );
        assert!(desc.const_labels.is_empty());
    }

    #[test]
    fn test_project_info_sample() {
        let collector = make_collector();
        let project = Component {
            key: "project1".to_string(),
            name: "Project 1".to_string(),
            qualifier: "TRK".to_string(),
            is_favorite: false,
            analysis_date: None,
            tags: vec![],
            visibility: "private".to_string(),
        };

        let sample = collector.project_info_sample(&project);

        assert_eq!(sample.value, 1.0);
        assert_eq!(sample.label("project_key"), Some("project1"));
        assert_eq!(sample.label("visibility"), Some("private"));
        assert_eq!(sample.label("domain"), None);
    }

    #[tokio::test]
    async fn test_unreachable_server_yields_no_samples() {
        let collector = make_collector();

        let samples = collector.collect().await;

        assert!(samples.is_empty());
        let stats = collector.stats();
        assert_eq!(stats.scrapes, 1);
        assert_eq!(stats.failed_scrapes, 1);
        assert_eq!(collector.descriptor_count().await, 0);
    }
}
