//! Vulkan instance

use std::ffi::{c_char, CStr, CString};

use ash::vk;
use crater_core::{CandidateSource, FixedVec, QueryStatus, MAX_CANDIDATES};
use tracing::{debug, info};

use crate::error::{Result, VulkanError};
use crate::library::{collect_written, query_status, VulkanLibrary};

/// Parameters for [`VulkanInstance::create`].
#[derive(Debug, Clone, Copy)]
pub struct InstanceDescriptor<'a> {
    pub application_name: &'a CStr,
    pub application_version: u32,
    pub engine_name: &'a CStr,
    pub engine_version: u32,
    pub api_version: u32,
    /// Layers to enable. Filter them against the library first.
    pub layers: &'a [&'a CStr],
    /// Instance extensions to enable. Filter them against the library first.
    pub extensions: &'a [&'a CStr],
}

impl Default for InstanceDescriptor<'_> {
    fn default() -> Self {
        Self {
            application_name: c"crater",
            application_version: 0,
            engine_name: c"crater",
            engine_version: 0,
            api_version: vk::API_VERSION_1_0,
            layers: &[],
            extensions: &[],
        }
    }
}

/// A created `VkInstance`, destroyed on drop.
pub struct VulkanInstance<'lib> {
    library: &'lib VulkanLibrary,
    instance: ash::Instance,
}

impl<'lib> VulkanInstance<'lib> {
    pub fn create(library: &'lib VulkanLibrary, desc: &InstanceDescriptor<'_>) -> Result<Self> {
        let layers: Vec<*const c_char> = desc.layers.iter().map(|name| name.as_ptr()).collect();
        let extensions: Vec<*const c_char> =
            desc.extensions.iter().map(|name| name.as_ptr()).collect();

        let app_info = vk::ApplicationInfo::default()
            .application_name(desc.application_name)
            .application_version(desc.application_version)
            .engine_name(desc.engine_name)
            .engine_version(desc.engine_version)
            .api_version(desc.api_version);
        let create_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_layer_names(&layers)
            .enabled_extension_names(&extensions);

        // SAFETY: every pointer in `create_info` refers to locals or to names
        // borrowed from `desc`, all of which outlive this call.
        let instance = unsafe { library.entry().create_instance(&create_info, None) }
            .map_err(VulkanError::call("vkCreateInstance"))?;

        info!(
            layers = desc.layers.len(),
            extensions = desc.extensions.len(),
            "Vulkan instance created"
        );
        Ok(Self { library, instance })
    }

    pub fn library(&self) -> &'lib VulkanLibrary {
        self.library
    }

    /// Instance-level function table.
    pub fn raw(&self) -> &ash::Instance {
        &self.instance
    }

    pub fn handle(&self) -> vk::Instance {
        self.instance.handle()
    }

    pub fn device_properties(&self, physical_device: vk::PhysicalDevice) -> vk::PhysicalDeviceProperties {
        // SAFETY: `physical_device` was enumerated from this instance.
        unsafe { self.instance.get_physical_device_properties(physical_device) }
    }

    pub fn queue_families(&self, physical_device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties> {
        // SAFETY: `physical_device` was enumerated from this instance.
        unsafe {
            self.instance
                .get_physical_device_queue_family_properties(physical_device)
        }
    }

    /// First queue family on `physical_device` supporting all of `flags`.
    pub fn find_queue_family(
        &self,
        physical_device: vk::PhysicalDevice,
        flags: vk::QueueFlags,
    ) -> Option<u32> {
        first_matching_family(&self.queue_families(physical_device), flags)
    }
}

impl CandidateSource for VulkanInstance<'_> {
    type Candidate = vk::PhysicalDevice;

    fn enumerate_candidates(
        &self,
        out: &mut FixedVec<vk::PhysicalDevice, MAX_CANDIDATES>,
    ) -> QueryStatus {
        let mut devices = [vk::PhysicalDevice::null(); MAX_CANDIDATES];
        let mut count = MAX_CANDIDATES as u32;
        // SAFETY: `count` matches the length of `devices`.
        let result = unsafe {
            (self.instance.fp_v1_0().enumerate_physical_devices)(
                self.instance.handle(),
                &mut count,
                devices.as_mut_ptr(),
            )
        };

        let status = collect_written(query_status(result), &devices, count, out, |&device| device);
        debug!(?result, count = out.len(), "enumerated physical devices");
        status
    }
}

impl Drop for VulkanInstance<'_> {
    fn drop(&mut self) {
        // SAFETY: objects created from this instance borrow it and are gone by now.
        unsafe { self.instance.destroy_instance(None) };
        info!("Vulkan instance destroyed");
    }
}

/// Owned NUL-terminated copy of a configured name.
pub fn c_name(name: &str) -> Result<CString> {
    Ok(CString::new(name)?)
}

/// [`c_name`] over a list, keeping its order. Fails on the first bad name.
pub fn c_names<S: AsRef<str>>(names: &[S]) -> Result<Vec<CString>> {
    names.iter().map(|name| c_name(name.as_ref())).collect()
}

pub(crate) fn first_matching_family(
    families: &[vk::QueueFamilyProperties],
    flags: vk::QueueFlags,
) -> Option<u32> {
    families
        .iter()
        .position(|family| family.queue_count > 0 && family.queue_flags.contains(flags))
        .map(|index| index as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family(flags: vk::QueueFlags, queue_count: u32) -> vk::QueueFamilyProperties {
        vk::QueueFamilyProperties {
            queue_flags: flags,
            queue_count,
            ..Default::default()
        }
    }

    #[test]
    fn picks_first_family_with_all_flags() {
        let families = [
            family(vk::QueueFlags::TRANSFER, 2),
            family(vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER, 1),
            family(vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE, 4),
        ];

        assert_eq!(first_matching_family(&families, vk::QueueFlags::COMPUTE), Some(1));
        assert_eq!(first_matching_family(&families, vk::QueueFlags::GRAPHICS), Some(2));
        assert_eq!(first_matching_family(&families, vk::QueueFlags::empty()), Some(0));
    }

    #[test]
    fn skips_families_without_queues() {
        let families = [
            family(vk::QueueFlags::GRAPHICS, 0),
            family(vk::QueueFlags::GRAPHICS, 1),
        ];
        assert_eq!(first_matching_family(&families, vk::QueueFlags::GRAPHICS), Some(1));
    }

    #[test]
    fn no_match_is_none() {
        let families = [family(vk::QueueFlags::TRANSFER, 1)];
        assert_eq!(first_matching_family(&families, vk::QueueFlags::GRAPHICS), None);
        assert_eq!(first_matching_family(&[], vk::QueueFlags::empty()), None);
    }

    #[test]
    fn names_convert_in_order() {
        let names = c_names(&["VK_LAYER_KHRONOS_validation", "VK_LAYER_RENDERDOC_Capture"]).unwrap();
        assert_eq!(names[0].as_c_str(), c"VK_LAYER_KHRONOS_validation");
        assert_eq!(names[1].as_c_str(), c"VK_LAYER_RENDERDOC_Capture");
        assert!(c_names::<String>(&[]).unwrap().is_empty());
    }

    #[test]
    fn interior_nul_is_an_invalid_name() {
        let err = c_name("bad\0name").unwrap_err();
        assert!(matches!(err, VulkanError::InvalidName(_)));

        let err = c_names(&["ok".to_string(), "bad\0name".to_string()]).unwrap_err();
        assert!(matches!(err, VulkanError::InvalidName(_)));
    }

    #[test]
    fn default_descriptor_enables_nothing() {
        let desc = InstanceDescriptor::default();
        assert!(desc.layers.is_empty());
        assert!(desc.extensions.is_empty());
        assert_eq!(desc.api_version, vk::API_VERSION_1_0);
    }
}
