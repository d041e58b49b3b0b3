//! Crater Core
//!
//! Allocation-free helpers that sit on top of a loaded graphics API:
//! - Bounded, stack-resident buffers
//! - Capability negotiation (layer / extension filtering)
//! - Physical device ranking by caller-supplied priority
//!
//! Nothing in this crate talks to a driver directly. The loading layer
//! implements [`CapabilitySource`] and [`CandidateSource`] and the helpers
//! here only ever see what those traits report.

pub mod bounded;
pub mod capability;
pub mod query;
pub mod ranking;

pub use bounded::{FillReport, FixedVec};
pub use capability::{
    filter_capabilities, filter_instance_extensions, filter_layers, CapabilityName,
    CAPABILITY_NAME_SIZE, MAX_AVAILABLE_CAPABILITIES,
};
pub use query::{CandidateSource, CapabilityKind, CapabilitySource, QueryStatus};
pub use ranking::{rank_candidates, AcceptAll, CandidateScorer, Ranked, Score, MAX_CANDIDATES};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
