//! Metric descriptors and the process-wide descriptor cache.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use sonarqube_client::Metric;
use tracing::{debug, warn};

use crate::mapping::{LABEL_DOMAIN, LABEL_PROJECT_KEY, LABEL_PROJECT_NAME, build_metric_name};

/// Schema of one exposed metric family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    /// Full Prometheus metric name.
    pub name: String,
    /// HELP text.
    pub help: String,
    /// Label names whose values vary per sample, in sample order.
    pub variable_labels: Vec<&'static str>,
    /// Labels fixed for every sample of this family.
    pub const_labels: Vec<(String, String)>,
}

impl Descriptor {
    /// Create a descriptor without constant labels.
    pub fn new(
        name: impl Into<String>,
        help: impl Into<String>,
        variable_labels: Vec<&'static str>,
    ) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            variable_labels,
            const_labels: Vec::new(),
        }
    }

    /// Add a constant label.
    pub fn with_const_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.const_labels.push((key.into(), value.into()));
        self
    }
}

/// Write-once map from metric key to its [`Descriptor`].
///
/// The first definition seen for a key wins: later catalog changes to a
/// metric's description or domain are not reflected until restart.
///
/// Distinct keys can sanitize to the same name (`sqale.index` and
/// `sqale_index`), or onto a name the exporter uses itself. Such keys still
/// get a descriptor, but the collision is logged since their series end up
/// in one family.
#[derive(Debug)]
pub struct DescriptorCache {
    prefix: String,
    entries: HashMap<String, Arc<Descriptor>>,
    names: HashSet<String>,
}

impl DescriptorCache {
    /// Create an empty cache producing names under `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            entries: HashMap::new(),
            names: HashSet::new(),
        }
    }

    /// Mark a metric name as taken by a family outside the cache.
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// Return the descriptor for `metric.key`, creating it on first use.
    pub fn get_or_create(&mut self, metric: &Metric) -> Arc<Descriptor> {
        if let Some(existing) = self.entries.get(&metric.key) {
            return Arc::clone(existing);
        }

        let descriptor = Arc::new(
            Descriptor::new(
                build_metric_name(&self.prefix, &metric.key),
                metric.description.clone(),
                vec![LABEL_PROJECT_KEY, LABEL_PROJECT_NAME],
            )
            .with_const_label(LABEL_DOMAIN, metric.domain.clone()),
        );

        if self.names.insert(descriptor.name.clone()) {
            debug!(
                metric = %metric.key,
                name = %descriptor.name,
                "Created metric descriptor"
            );
        } else {
            warn!(
                metric = %metric.key,
                name = %descriptor.name,
                "Metric name already in use, series will share one family"
            );
        }

        self.entries
            .insert(metric.key.clone(), Arc::clone(&descriptor));
        descriptor
    }

    /// Number of cached descriptors.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
