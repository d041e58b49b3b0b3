//! Crater Services Layer
//!
//! Settings for the probe runtime.

pub mod settings;

pub use settings::{
    InstanceSettings, LoaderSettings, QueueRequirement, SelectionSettings, Settings, SettingsError,
    LIBRARY_PATH_ENV,
};
