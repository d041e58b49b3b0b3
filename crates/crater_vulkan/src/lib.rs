//! Crater Vulkan Loading Layer
//!
//! Loads the Vulkan loader at runtime and wraps the handful of objects the
//! selection helpers need:
//! - [`VulkanLibrary`] answers layer and extension queries
//! - [`VulkanInstance`] enumerates physical devices
//! - [`DebugMessenger`] forwards validation output to `tracing`
//! - [`LogicalDevice`] carries the device-level function table
//!
//! Each object borrows the one it was created from and releases its handle
//! on drop, so teardown always runs in reverse creation order.

pub mod debug;
pub mod device;
pub mod error;
pub mod instance;
pub mod library;
pub mod scoring;

pub use ash;
pub use ash::vk;

pub use debug::{DebugMessenger, DebugMessengerConfig, DEBUG_UTILS_EXTENSION};
pub use device::{DeviceDescriptor, LogicalDevice};
pub use error::{Result, VulkanError};
pub use instance::{c_name, c_names, InstanceDescriptor, VulkanInstance};
pub use library::VulkanLibrary;
pub use scoring::{device_type_priority, DeviceTypeScorer};
