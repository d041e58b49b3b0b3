//! Vulkan loader library
//!
//! Owns the dynamically loaded loader and answers capability queries through
//! its global entry points.

use std::ffi::OsStr;

use ash::vk;
use crater_core::{
    CapabilityKind, CapabilityName, CapabilitySource, FixedVec, QueryStatus,
    MAX_AVAILABLE_CAPABILITIES,
};
use tracing::{debug, info};

use crate::error::Result;

/// The loaded Vulkan loader. Unloaded when dropped.
///
/// Every object created through it borrows it, so the library cannot go away
/// while an instance or device is still alive.
pub struct VulkanLibrary {
    entry: ash::Entry,
}

impl VulkanLibrary {
    /// Load the platform's default loader (`vulkan-1.dll`, `libvulkan.so.1`, ...).
    pub fn load() -> Result<Self> {
        // SAFETY: the loader is a well-known system library; its init routines
        // are expected to be sound.
        let entry = unsafe { ash::Entry::load() }?;
        info!("Vulkan loader initialized");
        Ok(Self { entry })
    }

    /// Load the loader from an explicit path or library name.
    pub fn load_from(path: impl AsRef<OsStr>) -> Result<Self> {
        let path = path.as_ref();
        // SAFETY: as above, the caller vouches for the library behind `path`.
        let entry = unsafe { ash::Entry::load_from(path) }?;
        info!(path = %path.to_string_lossy(), "Vulkan loader initialized");
        Ok(Self { entry })
    }

    /// Global-level function table.
    pub fn entry(&self) -> &ash::Entry {
        &self.entry
    }

    fn enumerate_layers(
        &self,
        out: &mut FixedVec<CapabilityName, MAX_AVAILABLE_CAPABILITIES>,
    ) -> QueryStatus {
        let mut properties = [vk::LayerProperties::default(); MAX_AVAILABLE_CAPABILITIES];
        let mut count = MAX_AVAILABLE_CAPABILITIES as u32;
        // SAFETY: `count` matches the length of `properties`.
        let result = unsafe {
            (self.entry.fp_v1_0().enumerate_instance_layer_properties)(
                &mut count,
                properties.as_mut_ptr(),
            )
        };

        let status = collect_written(query_status(result), &properties, count, out, |layer| {
            CapabilityName::from_raw(&layer.layer_name)
        });
        debug!(?result, count = out.len(), "enumerated instance layers");
        status
    }

    fn enumerate_instance_extensions(
        &self,
        out: &mut FixedVec<CapabilityName, MAX_AVAILABLE_CAPABILITIES>,
    ) -> QueryStatus {
        let mut properties = [vk::ExtensionProperties::default(); MAX_AVAILABLE_CAPABILITIES];
        let mut count = MAX_AVAILABLE_CAPABILITIES as u32;
        // SAFETY: no layer name, and `count` matches the length of `properties`.
        let result = unsafe {
            (self.entry.fp_v1_0().enumerate_instance_extension_properties)(
                std::ptr::null(),
                &mut count,
                properties.as_mut_ptr(),
            )
        };

        let status = collect_written(query_status(result), &properties, count, out, |extension| {
            CapabilityName::from_raw(&extension.extension_name)
        });
        debug!(?result, count = out.len(), "enumerated instance extensions");
        status
    }
}

impl CapabilitySource for VulkanLibrary {
    fn enumerate_capabilities(
        &self,
        kind: CapabilityKind,
        out: &mut FixedVec<CapabilityName, MAX_AVAILABLE_CAPABILITIES>,
    ) -> QueryStatus {
        match kind {
            CapabilityKind::Layers => self.enumerate_layers(out),
            CapabilityKind::InstanceExtensions => self.enumerate_instance_extensions(out),
        }
    }
}

impl Drop for VulkanLibrary {
    fn drop(&mut self) {
        info!("Vulkan loader released");
    }
}

/// Map an enumeration result onto the three outcomes the helpers understand.
pub(crate) fn query_status(result: vk::Result) -> QueryStatus {
    match result {
        vk::Result::SUCCESS => QueryStatus::Complete,
        vk::Result::INCOMPLETE => QueryStatus::Truncated,
        _ => QueryStatus::Failed,
    }
}

/// The prefix of `scratch` the driver claims to have written.
fn written<T>(scratch: &[T], count: u32) -> &[T] {
    let count = (count as usize).min(scratch.len());
    &scratch[..count]
}

/// Convert the written prefix of `scratch` into `out`.
///
/// Entries that do not fit in `out` turn the result into
/// [`QueryStatus::Truncated`]. A failed query writes nothing.
pub(crate) fn collect_written<T, U, const N: usize>(
    status: QueryStatus,
    scratch: &[T],
    count: u32,
    out: &mut FixedVec<U, N>,
    mut convert: impl FnMut(&T) -> U,
) -> QueryStatus {
    if status == QueryStatus::Failed {
        return status;
    }
    for item in written(scratch, count) {
        if out.push(convert(item)).is_err() {
            return QueryStatus::Truncated;
        }
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_complete() {
        assert_eq!(query_status(vk::Result::SUCCESS), QueryStatus::Complete);
    }

    #[test]
    fn incomplete_is_truncated() {
        assert_eq!(query_status(vk::Result::INCOMPLETE), QueryStatus::Truncated);
    }

    #[test]
    fn errors_are_failures() {
        for result in [
            vk::Result::ERROR_OUT_OF_HOST_MEMORY,
            vk::Result::ERROR_INITIALIZATION_FAILED,
            vk::Result::ERROR_LAYER_NOT_PRESENT,
            vk::Result::NOT_READY,
        ] {
            assert_eq!(query_status(result), QueryStatus::Failed, "{result:?}");
        }
    }

    #[test]
    fn written_never_exceeds_scratch() {
        let scratch = [1, 2, 3];
        assert_eq!(written(&scratch, 2), &[1, 2]);
        assert_eq!(written(&scratch, 99), &[1, 2, 3]);
        assert!(written(&scratch, 0).is_empty());
    }

    #[test]
    fn collect_copies_written_prefix() {
        let mut out = FixedVec::<u32, 4>::new();
        let status = collect_written(QueryStatus::Complete, &[1, 2, 3], 2, &mut out, |&n| n * 10);
        assert_eq!(status, QueryStatus::Complete);
        assert_eq!(out.as_slice(), &[10, 20]);
    }

    #[test]
    fn collect_keeps_driver_truncation() {
        let mut out = FixedVec::<u32, 4>::new();
        let status = collect_written(QueryStatus::Truncated, &[1, 2], 2, &mut out, |&n| n);
        assert_eq!(status, QueryStatus::Truncated);
        assert_eq!(out.as_slice(), &[1, 2]);
    }

    #[test]
    fn collect_reports_overflow_as_truncated() {
        let mut out = FixedVec::<u32, 2>::new();
        out.push(7).unwrap();

        let status = collect_written(QueryStatus::Complete, &[1, 2, 3], 3, &mut out, |&n| n);

        assert_eq!(status, QueryStatus::Truncated);
        assert_eq!(out.as_slice(), &[7, 1]);
    }

    #[test]
    fn collect_skips_failed_queries() {
        let mut out = FixedVec::<u32, 4>::new();
        let status = collect_written(QueryStatus::Failed, &[1, 2], 2, &mut out, |&n| n);
        assert_eq!(status, QueryStatus::Failed);
        assert!(out.is_empty());
    }

    #[test]
    fn layer_properties_convert_to_names() {
        let mut layer = vk::LayerProperties::default();
        for (dst, src) in layer.layer_name.iter_mut().zip(b"VK_LAYER_KHRONOS_validation") {
            *dst = *src as std::ffi::c_char;
        }

        let name = CapabilityName::from_raw(&layer.layer_name);

        assert!(name.matches(c"VK_LAYER_KHRONOS_validation"));
    }
}
