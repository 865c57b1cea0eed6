//! Core library for the water quality monitor
//!
//! This crate provides the shared functionality for:
//! - IAM token exchange with caching
//! - Remote potability scoring
//! - Verdict interpretation and alerting
//! - Raw data uploads to object storage
//! - Metrics exposition

pub mod alert;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod monitor;
pub mod observability;
pub mod scoring;
pub mod storage;

pub use alert::{assess, Assessment};
pub use auth::{Token, TokenProvider, IAM_TOKEN_URL};
pub use config::{ScoringConfig, StorageConfig, DEFAULT_COS_ENDPOINT};
pub use error::{Error, Result};
pub use models::*;
pub use monitor::PotabilityMonitor;
pub use observability::MonitorMetrics;
pub use scoring::ScoringClient;
pub use storage::ObjectStore;
