//! Seams to the loading layer
//!
//! The loading layer owns the library handle and performs the raw
//! enumeration calls. The helpers in this crate only consume what it reports.

use crate::bounded::FixedVec;
use crate::capability::{CapabilityName, MAX_AVAILABLE_CAPABILITIES};
use crate::ranking::MAX_CANDIDATES;

/// Status reported alongside an enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Every entry the system knows about was written.
    Complete,
    /// More entries existed than fit in the scratch buffer.
    Truncated,
    /// The query failed; whatever was written is not trustworthy.
    Failed,
}

impl QueryStatus {
    /// Fail-closed acceptance rule shared by every enumeration.
    ///
    /// A failed query is rejected outright. A complete or truncated query is
    /// only accepted when it reported at least one entry.
    #[inline]
    pub fn accepts(self, count: usize) -> bool {
        self != QueryStatus::Failed && count > 0
    }
}

/// Which capability list to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    Layers,
    InstanceExtensions,
}

/// Something that can report the capabilities present on this system.
pub trait CapabilitySource {
    /// Write the available names of `kind` into `out` in system order.
    fn enumerate_capabilities(
        &self,
        kind: CapabilityKind,
        out: &mut FixedVec<CapabilityName, MAX_AVAILABLE_CAPABILITIES>,
    ) -> QueryStatus;
}

/// Something that can report candidate devices.
pub trait CandidateSource {
    type Candidate: Copy;

    /// Write discovered candidates into `out` in discovery order.
    fn enumerate_candidates(
        &self,
        out: &mut FixedVec<Self::Candidate, MAX_CANDIDATES>,
    ) -> QueryStatus;
}

impl<S: CapabilitySource + ?Sized> CapabilitySource for &S {
    fn enumerate_capabilities(
        &self,
        kind: CapabilityKind,
        out: &mut FixedVec<CapabilityName, MAX_AVAILABLE_CAPABILITIES>,
    ) -> QueryStatus {
        (**self).enumerate_capabilities(kind, out)
    }
}

impl<S: CandidateSource + ?Sized> CandidateSource for &S {
    type Candidate = S::Candidate;

    fn enumerate_candidates(
        &self,
        out: &mut FixedVec<Self::Candidate, MAX_CANDIDATES>,
    ) -> QueryStatus {
        (**self).enumerate_candidates(out)
    }
}
