//! Buy-to-let deal evaluation: metrics, layered thresholds, traffic-light scoring and
//! stress scenarios, plus the configuration and telemetry plumbing hosts share.

pub mod appraisal;
pub mod config;
pub mod error;
pub mod telemetry;

pub use appraisal::{DealAppraisal, DealAppraiser, ScenarioAnalysis};
