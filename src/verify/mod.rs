//! Route verification engine.
//!
//! This module handles:
//! - Placeholder substitution in route templates
//! - Single-route HTTP probes
//! - The bounded worker pool running probes
//! - Report aggregation
//! - The connect, retrieve, test orchestration

pub mod orchestrator;
pub mod probe;
pub mod report;
pub mod runner;
pub mod substitute;
pub mod types;

pub use orchestrator::VerificationOrchestrator;
pub use probe::{build_http_client, probe_route, HttpProbe, Prober};
pub use report::aggregate;
pub use runner::ConcurrentRunner;
pub use substitute::substitute;
pub use types::{
    status_message, RouteDescriptor, RouteOutcome, RunPhase, VerificationReport,
    VerificationRequest,
};
