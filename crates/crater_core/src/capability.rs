//! Capability negotiation
//!
//! Intersects the layers or extensions an application asks for with the ones
//! the system actually reports, so instance creation never names something
//! the loader would reject.

use std::ffi::{c_char, CStr};
use std::fmt;

use tracing::debug;

use crate::bounded::{FillReport, FixedVec};
use crate::query::{CapabilityKind, CapabilitySource, QueryStatus};

/// Scratch limit for one capability enumeration.
pub const MAX_AVAILABLE_CAPABILITIES: usize = 64;

/// Size of a fixed-format capability name, terminator included.
pub const CAPABILITY_NAME_SIZE: usize = 256;

/// A layer or extension name as reported by the system.
///
/// Stored inline and NUL-terminated, matching the fixed-size name arrays the
/// graphics API hands back. Comparison is exact and byte-for-byte.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CapabilityName {
    bytes: [u8; CAPABILITY_NAME_SIZE],
}

impl CapabilityName {
    /// Build a name from raw bytes. Fails on interior NUL or if it is too long.
    pub fn from_bytes(name: &[u8]) -> Option<Self> {
        if name.len() >= CAPABILITY_NAME_SIZE || name.contains(&0) {
            return None;
        }
        let mut bytes = [0u8; CAPABILITY_NAME_SIZE];
        bytes[..name.len()].copy_from_slice(name);
        Some(Self { bytes })
    }

    pub fn from_c_str(name: &CStr) -> Option<Self> {
        Self::from_bytes(name.to_bytes())
    }

    /// Copy a driver-reported character array, stopping at the first NUL.
    ///
    /// An unterminated array is cut at `CAPABILITY_NAME_SIZE - 1` bytes.
    pub fn from_raw(raw: &[c_char]) -> Self {
        let mut bytes = [0u8; CAPABILITY_NAME_SIZE];
        for (dst, &src) in bytes[..CAPABILITY_NAME_SIZE - 1].iter_mut().zip(raw) {
            if src == 0 {
                break;
            }
            *dst = src as u8;
        }
        Self { bytes }
    }

    /// Name bytes without the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        let len = self
            .bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(CAPABILITY_NAME_SIZE);
        &self.bytes[..len]
    }

    pub fn as_c_str(&self) -> &CStr {
        // The last byte is always zero, so a terminator is guaranteed.
        CStr::from_bytes_until_nul(&self.bytes).unwrap_or_default()
    }

    #[inline]
    pub fn matches(&self, requested: &CStr) -> bool {
        self.as_bytes() == requested.to_bytes()
    }
}

impl fmt::Debug for CapabilityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(self.as_bytes()))
    }
}

impl fmt::Display for CapabilityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

/// Keep the requested names that the system reports as available.
///
/// `out` is cleared first. Entries come out in the order the system lists
/// them, not the order they were requested in, and each entry is the
/// caller's own reference. A failed or empty query leaves `out` empty.
pub fn filter_capabilities<'r, S, const N: usize>(
    source: &S,
    kind: CapabilityKind,
    requested: &[&'r CStr],
    out: &mut FixedVec<&'r CStr, N>,
) -> FillReport
where
    S: CapabilitySource + ?Sized,
{
    out.clear();

    let mut available = FixedVec::<CapabilityName, MAX_AVAILABLE_CAPABILITIES>::new();
    let status = source.enumerate_capabilities(kind, &mut available);
    if !status.accepts(available.len()) {
        debug!(?kind, ?status, "capability query rejected, treating as none available");
        return FillReport::empty(N);
    }
    if status == QueryStatus::Truncated {
        debug!(?kind, count = available.len(), "capability query truncated, using partial list");
    }

    let mut dropped = 0;
    for name in &available {
        let Some(&matched) = requested.iter().find(|candidate| name.matches(candidate)) else {
            continue;
        };
        if out.push(matched).is_err() {
            dropped += 1;
        }
    }

    if dropped > 0 {
        debug!(?kind, capacity = N, dropped, "capability output buffer full");
    }

    FillReport {
        capacity: N,
        written: out.len(),
        dropped,
    }
}

/// [`filter_capabilities`] over instance layers.
pub fn filter_layers<'r, S, const N: usize>(
    source: &S,
    requested: &[&'r CStr],
    out: &mut FixedVec<&'r CStr, N>,
) -> FillReport
where
    S: CapabilitySource + ?Sized,
{
    filter_capabilities(source, CapabilityKind::Layers, requested, out)
}

/// [`filter_capabilities`] over instance extensions.
pub fn filter_instance_extensions<'r, S, const N: usize>(
    source: &S,
    requested: &[&'r CStr],
    out: &mut FixedVec<&'r CStr, N>,
) -> FillReport
where
    S: CapabilitySource + ?Sized,
{
    filter_capabilities(source, CapabilityKind::InstanceExtensions, requested, out)
}
