//! SonarQube API client.
//!
//! This crate provides the pieces of the SonarQube web API the exporter needs:
//!
//! - [`models`] - Wire types (`Metric`, `MetricType`, `Component`, `Measure`)
//! - [`client`] - `SonarQubeClient` with catalog, project and measure fetches
//! - [`error`] - Error types

pub mod client;
pub mod error;
pub mod models;

pub use client::{DEFAULT_TIMEOUT, PAGE_SIZE, SonarQubeClient};
pub use error::{ClientError, Result};
pub use models::{Component, Measure, Metric, MetricCatalog, MetricType, Paging};
