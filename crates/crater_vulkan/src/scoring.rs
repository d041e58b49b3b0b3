//! Device scoring
//!
//! Default priorities used when ranking physical devices.

use ash::vk;
use crater_core::{CandidateScorer, Score};

use crate::instance::VulkanInstance;

/// Priority of a device by type alone. Dedicated hardware wins.
pub fn device_type_priority(device_type: vk::PhysicalDeviceType) -> Score {
    match device_type {
        vk::PhysicalDeviceType::DISCRETE_GPU => 400,
        vk::PhysicalDeviceType::INTEGRATED_GPU => 200,
        vk::PhysicalDeviceType::VIRTUAL_GPU => 100,
        vk::PhysicalDeviceType::CPU => 100,
        _ => 0,
    }
}

/// Scores devices by [`device_type_priority`].
///
/// With a queue requirement, a device lacking a family that supports all the
/// required flags scores -1 and is left out of the ranking.
pub struct DeviceTypeScorer<'a, 'lib> {
    instance: &'a VulkanInstance<'lib>,
    required_queue: Option<vk::QueueFlags>,
}

impl<'a, 'lib> DeviceTypeScorer<'a, 'lib> {
    pub fn new(instance: &'a VulkanInstance<'lib>) -> Self {
        Self {
            instance,
            required_queue: None,
        }
    }

    pub fn require_queue(mut self, flags: vk::QueueFlags) -> Self {
        self.required_queue = Some(flags);
        self
    }
}

impl CandidateScorer<vk::PhysicalDevice> for DeviceTypeScorer<'_, '_> {
    fn score(&mut self, physical_device: vk::PhysicalDevice) -> Score {
        if let Some(flags) = self.required_queue {
            if self.instance.find_queue_family(physical_device, flags).is_none() {
                return -1;
            }
        }
        let properties = self.instance.device_properties(physical_device);
        device_type_priority(properties.device_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discrete_beats_integrated_beats_virtual() {
        let discrete = device_type_priority(vk::PhysicalDeviceType::DISCRETE_GPU);
        let integrated = device_type_priority(vk::PhysicalDeviceType::INTEGRATED_GPU);
        let virtual_gpu = device_type_priority(vk::PhysicalDeviceType::VIRTUAL_GPU);
        assert!(discrete > integrated);
        assert!(integrated > virtual_gpu);
    }

    #[test]
    fn known_priorities() {
        assert_eq!(device_type_priority(vk::PhysicalDeviceType::DISCRETE_GPU), 400);
        assert_eq!(device_type_priority(vk::PhysicalDeviceType::INTEGRATED_GPU), 200);
        assert_eq!(device_type_priority(vk::PhysicalDeviceType::CPU), 100);
    }

    #[test]
    fn unknown_types_are_neutral_not_excluded() {
        assert_eq!(device_type_priority(vk::PhysicalDeviceType::OTHER), 0);
        assert_eq!(device_type_priority(vk::PhysicalDeviceType::from_raw(42)), 0);
    }
}
