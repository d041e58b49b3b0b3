//! Validation message forwarding
//!
//! Routes `VK_EXT_debug_utils` messages into `tracing`. Only debug builds
//! create a real messenger; release builds get an inert one.

use std::borrow::Cow;
use std::ffi::{c_void, CStr};
use std::marker::PhantomData;

use ash::vk;
use tracing::{debug, error, info, trace, warn, Level};

use crate::error::{Result, VulkanError};
use crate::instance::VulkanInstance;

/// Name of the extension the messenger requires.
pub const DEBUG_UTILS_EXTENSION: &CStr = ash::ext::debug_utils::NAME;

/// Which messages the messenger subscribes to.
#[derive(Debug, Clone, Copy)]
pub struct DebugMessengerConfig {
    pub severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    pub types: vk::DebugUtilsMessageTypeFlagsEXT,
}

impl Default for DebugMessengerConfig {
    fn default() -> Self {
        Self {
            severity: vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            types: vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        }
    }
}

struct Active {
    loader: ash::ext::debug_utils::Instance,
    messenger: vk::DebugUtilsMessengerEXT,
}

/// A debug messenger tied to an instance. Destroyed on drop.
///
/// The instance must have been created with [`DEBUG_UTILS_EXTENSION`].
pub struct DebugMessenger<'i> {
    active: Option<Active>,
    _instance: PhantomData<&'i ()>,
}

impl<'i> DebugMessenger<'i> {
    pub fn create(instance: &'i VulkanInstance<'_>, config: &DebugMessengerConfig) -> Result<Self> {
        if !cfg!(debug_assertions) {
            return Ok(Self::disabled());
        }

        let loader = ash::ext::debug_utils::Instance::new(instance.library().entry(), instance.raw());
        let messenger = create_messenger(&loader, config)?;
        info!("debug messenger created");
        Ok(Self {
            active: Some(Active { loader, messenger }),
            _instance: PhantomData,
        })
    }

    /// A messenger that never receives anything.
    pub fn disabled() -> Self {
        Self {
            active: None,
            _instance: PhantomData,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Replace the current subscription. Inert messengers stay inert.
    pub fn replace(&mut self, config: &DebugMessengerConfig) -> Result<()> {
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        // SAFETY: the messenger belongs to this loader and is not used afterwards.
        unsafe {
            active
                .loader
                .destroy_debug_utils_messenger(active.messenger, None)
        };
        active.messenger = vk::DebugUtilsMessengerEXT::null();
        match create_messenger(&active.loader, config) {
            Ok(messenger) => {
                active.messenger = messenger;
                Ok(())
            }
            Err(err) => {
                self.active = None;
                Err(err)
            }
        }
    }
}

impl Drop for DebugMessenger<'_> {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            // SAFETY: the owning instance is borrowed for `'i` and still alive.
            unsafe {
                active
                    .loader
                    .destroy_debug_utils_messenger(active.messenger, None)
            };
            info!("debug messenger destroyed");
        }
    }
}

fn create_messenger(
    loader: &ash::ext::debug_utils::Instance,
    config: &DebugMessengerConfig,
) -> Result<vk::DebugUtilsMessengerEXT> {
    let create_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(config.severity)
        .message_type(config.types)
        .pfn_user_callback(Some(forward_to_tracing));
    // SAFETY: `create_info` only references a static callback.
    unsafe { loader.create_debug_utils_messenger(&create_info, None) }
        .map_err(VulkanError::call("vkCreateDebugUtilsMessengerEXT"))
}

unsafe extern "system" fn forward_to_tracing(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    types: vk::DebugUtilsMessageTypeFlagsEXT,
    data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut c_void,
) -> vk::Bool32 {
    // SAFETY: the loader passes either null or valid callback data whose
    // message is a NUL-terminated string for the duration of the call.
    let message = unsafe {
        match data.as_ref() {
            Some(data) if !data.p_message.is_null() => CStr::from_ptr(data.p_message).to_string_lossy(),
            _ => Cow::Borrowed("<no message>"),
        }
    };

    let level = severity_level(severity);
    if level == Level::ERROR {
        error!(target: "vulkan", ?types, "{message}");
    } else if level == Level::WARN {
        warn!(target: "vulkan", ?types, "{message}");
    } else if level == Level::INFO {
        info!(target: "vulkan", ?types, "{message}");
    } else if level == Level::DEBUG {
        debug!(target: "vulkan", ?types, "{message}");
    } else {
        trace!(target: "vulkan", ?types, "{message}");
    }

    // Never abort the call that triggered the message.
    vk::FALSE
}

fn severity_level(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> Level {
    use ash::vk::DebugUtilsMessageSeverityFlagsEXT as Severity;

    if severity.contains(Severity::ERROR) {
        Level::ERROR
    } else if severity.contains(Severity::WARNING) {
        Level::WARN
    } else if severity.contains(Severity::INFO) {
        Level::INFO
    } else if severity.contains(Severity::VERBOSE) {
        Level::DEBUG
    } else {
        Level::TRACE
    }
}
