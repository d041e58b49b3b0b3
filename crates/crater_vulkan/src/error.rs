use ash::vk;
use thiserror::Error;

/// Errors raised by the loading layer.
#[derive(Debug, Error)]
pub enum VulkanError {
    #[error("failed to load the Vulkan library: {0}")]
    Load(#[from] ash::LoadingError),

    #[error("{call} failed: {result}")]
    Call {
        call: &'static str,
        result: vk::Result,
    },

    #[error("name contains an interior NUL byte: {0}")]
    InvalidName(#[from] std::ffi::NulError),

    #[error("no queue family supports {0:?}")]
    NoQueueFamily(vk::QueueFlags),
}

impl VulkanError {
    pub(crate) fn call(call: &'static str) -> impl FnOnce(vk::Result) -> Self {
        move |result| VulkanError::Call { call, result }
    }
}

pub type Result<T> = std::result::Result<T, VulkanError>;
