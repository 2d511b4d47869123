//! Post-deployment route verification.
//!
//! Given a deployed service and build, this library fetches the GET routes a
//! route source observed for that build, probes each one against the
//! service's base URL under a concurrency cap, and reports which answered 2xx.
//!
//! # Flow
//!
//! ```text
//! request ─► connect to route source ─► retrieve GET routes
//!         ─► substitute {placeholders} ─► probe (≤ max_concurrent in flight)
//!         ─► report { total, passed, failed, results, duration }
//! ```
//!
//! A route that times out or answers non-2xx only fails its own outcome. An
//! unreachable route source fails the whole run before any probe is sent.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`verify`]: Substitution, probes, worker pool, report, orchestration
//! - [`source`]: Route sources (Contrast Security, mock)
//! - [`resolver`]: Base URL resolution (OpenShift)
//! - [`api`]: HTTP API for runs, health and metrics
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod resolver;
pub mod source;
pub mod utils;
pub mod verify;

pub use config::Config;
pub use error::{MonitorError, Result, VerifyError};
pub use verify::{VerificationOrchestrator, VerificationReport, VerificationRequest};
