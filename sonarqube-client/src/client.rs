//! HTTP client for the SonarQube web API.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::error::{ClientError, Result};
use crate::models::{
    Component, ComponentsResponse, Measure, MeasuresResponse, MetricCatalog, MetricsResponse,
};

/// Page size used for both the metric catalog and the project search.
pub const PAGE_SIZE: u32 = 500;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const METRICS_SEARCH: &str = "/api/metrics/search";
const PROJECTS_SEARCH: &str = "/api/components/search_projects";
const COMPONENT_MEASURES: &str = "/api/measures/component";

/// Client for a single SonarQube server, authenticated with a static token.
#[derive(Clone)]
pub struct SonarQubeClient {
    base_url: String,
    token: String,
    http: reqwest::Client,
}

impl std::fmt::Debug for SonarQubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SonarQubeClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SonarQubeClient {
    /// Create a client with the default 30 second request timeout.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, token, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom per-request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Build)?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            base_url,
            token: token.into(),
            http,
        })
    }

    /// The server URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the metric catalog.
    ///
    /// Only the first page of [`PAGE_SIZE`] definitions is requested; the
    /// reported total is returned alongside so callers can detect truncation.
    pub async fn get_metrics(&self) -> Result<MetricCatalog> {
        let response: MetricsResponse = self
            .get_json(METRICS_SEARCH, &[("ps", PAGE_SIZE.to_string())])
            .await?;

        debug!(
            fetched = response.metrics.len(),
            total = response.total,
            "Fetched metric catalog"
        );

        Ok(MetricCatalog::new(response.metrics, response.total))
    }

    /// Fetch every project, following pagination.
    ///
    /// Paging stops once the number of accumulated projects reaches the
    /// total reported by the first page. A failure on any page fails the
    /// whole call.
    pub async fn get_projects(&self) -> Result<Vec<Component>> {
        let mut projects: Vec<Component> = Vec::new();
        let mut page_index: u32 = 1;
        let mut expected_total: Option<usize> = None;

        loop {
            let page: ComponentsResponse = self
                .get_json(
                    PROJECTS_SEARCH,
                    &[
                        ("ps", PAGE_SIZE.to_string()),
                        ("p", page_index.to_string()),
                    ],
                )
                .await?;

            let total = *expected_total.get_or_insert(page.paging.total);
            projects.extend(page.components);

            trace!(
                page = page_index,
                fetched = projects.len(),
                total,
                "Fetched project page"
            );

            if projects.len() >= total {
                break;
            }
            page_index += 1;
        }

        debug!(count = projects.len(), pages = page_index, "Fetched projects");
        Ok(projects)
    }

    /// Fetch measures of one project for the given metric keys.
    ///
    /// An empty key set returns an empty list without contacting the server.
    pub async fn get_project_measures(
        &self,
        project_key: &str,
        metric_keys: &[String],
    ) -> Result<Vec<Measure>> {
        if metric_keys.is_empty() {
            return Ok(Vec::new());
        }

        let response: MeasuresResponse = self
            .get_json(
                COMPONENT_MEASURES,
                &[
                    ("component", project_key.to_string()),
                    ("metricKeys", metric_keys.join(",")),
                ],
            )
            .await?;

        Ok(response.component.measures)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .query(query)
            .send()
            .await
            .map_err(|source| ClientError::Transport { endpoint, source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ClientError::Transport { endpoint, source })?;

        if !status.is_success() {
            return Err(ClientError::Upstream {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| ClientError::Decode { endpoint, source })
    }
}
