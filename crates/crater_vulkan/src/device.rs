//! Logical device

use std::ffi::{c_char, CStr};
use std::marker::PhantomData;

use ash::vk;
use tracing::info;

use crate::error::{Result, VulkanError};
use crate::instance::VulkanInstance;

/// Parameters for [`LogicalDevice::create`].
#[derive(Debug, Clone, Copy)]
pub struct DeviceDescriptor<'a> {
    pub queue_family_index: u32,
    /// One priority per queue, each in `0.0..=1.0`.
    pub queue_priorities: &'a [f32],
    pub extensions: &'a [&'a CStr],
}

impl Default for DeviceDescriptor<'_> {
    fn default() -> Self {
        Self {
            queue_family_index: 0,
            queue_priorities: &[1.0],
            extensions: &[],
        }
    }
}

/// A created `VkDevice` with its device-level function table. Destroyed on drop.
pub struct LogicalDevice<'i> {
    device: ash::Device,
    physical_device: vk::PhysicalDevice,
    queue_family_index: u32,
    _instance: PhantomData<&'i ()>,
}

impl<'i> LogicalDevice<'i> {
    pub fn create(
        instance: &'i VulkanInstance<'_>,
        physical_device: vk::PhysicalDevice,
        desc: &DeviceDescriptor<'_>,
    ) -> Result<Self> {
        let queue_infos = [vk::DeviceQueueCreateInfo::default()
            .queue_family_index(desc.queue_family_index)
            .queue_priorities(desc.queue_priorities)];
        let extensions: Vec<*const c_char> =
            desc.extensions.iter().map(|name| name.as_ptr()).collect();
        let create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&extensions);

        // SAFETY: `physical_device` comes from `instance`, and every pointer in
        // `create_info` outlives this call.
        let device = unsafe { instance.raw().create_device(physical_device, &create_info, None) }
            .map_err(VulkanError::call("vkCreateDevice"))?;

        info!(
            queue_family = desc.queue_family_index,
            queues = desc.queue_priorities.len(),
            "logical device created"
        );
        Ok(Self {
            device,
            physical_device,
            queue_family_index: desc.queue_family_index,
            _instance: PhantomData,
        })
    }

    /// Device-level function table.
    pub fn raw(&self) -> &ash::Device {
        &self.device
    }

    pub fn handle(&self) -> vk::Device {
        self.device.handle()
    }

    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    pub fn queue_family_index(&self) -> u32 {
        self.queue_family_index
    }

    /// Queue `index` of the family the device was created with.
    pub fn queue(&self, index: u32) -> vk::Queue {
        // SAFETY: the family was requested at creation; callers stay within the
        // number of priorities they passed.
        unsafe { self.device.get_device_queue(self.queue_family_index, index) }
    }
}

impl Drop for LogicalDevice<'_> {
    fn drop(&mut self) {
        // SAFETY: nothing created from this device outlives it.
        unsafe {
            let _ = self.device.device_wait_idle();
            self.device.destroy_device(None);
        }
        info!("logical device destroyed");
    }
}
