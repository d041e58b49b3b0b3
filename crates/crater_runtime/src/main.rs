//! Crater Probe Runtime
//!
//! Loads Vulkan, negotiates layers and extensions, ranks the physical devices
//! and opens the best one. Usage: `crater-probe [settings.json]`.

use std::ffi::{CStr, CString};
use std::path::PathBuf;

use anyhow::{Context, Result};
use crater_core::{
    filter_instance_extensions, filter_layers, rank_candidates, FillReport, FixedVec, Ranked,
};
use crater_services::{QueueRequirement, Settings};
use crater_vulkan::{
    c_name, c_names, vk, DebugMessenger, DebugMessengerConfig, DeviceDescriptor,
    DeviceTypeScorer, InstanceDescriptor, LogicalDevice, VulkanError, VulkanInstance,
    VulkanLibrary, DEBUG_UTILS_EXTENSION,
};

/// Upper bound on layers or extensions enabled at instance creation.
const MAX_ENABLED_NAMES: usize = 16;

/// Physical devices kept after ranking.
const MAX_RANKED_DEVICES: usize = 4;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    tracing::info!("Crater v{}", crater_core::VERSION);

    let settings_path = std::env::args_os().nth(1).map(PathBuf::from);
    let mut settings = Settings::load_or_default(settings_path.as_deref())?;
    settings.apply_env_overrides();

    let library = match &settings.loader.library_path {
        Some(path) => VulkanLibrary::load_from(path),
        None => VulkanLibrary::load(),
    }
    .context("loading the Vulkan loader")?;

    let requested_layers = c_names(&settings.instance.layers).context("layer names")?;
    let requested_extensions =
        c_names(&settings.instance.extensions).context("extension names")?;
    let layer_names: Vec<&CStr> = requested_layers.iter().map(CString::as_c_str).collect();
    let extension_names: Vec<&CStr> = requested_extensions.iter().map(CString::as_c_str).collect();

    let mut layers = FixedVec::<&CStr, MAX_ENABLED_NAMES>::new();
    let report = filter_layers(&library, &layer_names, &mut layers);
    log_filtered("layers", &layer_names, &layers, report);

    let mut extensions = FixedVec::<&CStr, MAX_ENABLED_NAMES>::new();
    let report = filter_instance_extensions(&library, &extension_names, &mut extensions);
    log_filtered("extensions", &extension_names, &extensions, report);

    let application_name =
        c_name(&settings.instance.application_name).context("application name")?;
    let engine_name = c_name(&settings.instance.engine_name).context("engine name")?;
    let (major, minor) = settings.instance.api_version;

    let instance = VulkanInstance::create(
        &library,
        &InstanceDescriptor {
            application_name: &application_name,
            application_version: 0,
            engine_name: &engine_name,
            engine_version: 0,
            api_version: vk::make_api_version(0, major, minor, 0),
            layers: layers.as_slice(),
            extensions: extensions.as_slice(),
        },
    )?;

    let debug_utils_enabled = extensions.iter().any(|&name| name == DEBUG_UTILS_EXTENSION);
    let _messenger = if settings.instance.debug_messenger && debug_utils_enabled {
        DebugMessenger::create(&instance, &DebugMessengerConfig::default())?
    } else {
        DebugMessenger::disabled()
    };

    let required_queue = queue_flags(settings.selection.required_queue);
    let mut scorer = DeviceTypeScorer::new(&instance);
    if let Some(flags) = required_queue {
        scorer = scorer.require_queue(flags);
    }

    let mut ranked = FixedVec::<Ranked<vk::PhysicalDevice>, MAX_RANKED_DEVICES>::new();
    let report = rank_candidates(&instance, &mut ranked, scorer);
    for (rank, entry) in ranked.iter().enumerate() {
        let properties = instance.device_properties(entry.candidate);
        tracing::info!(
            rank,
            score = entry.score,
            device_type = ?properties.device_type,
            "{}",
            device_name(&properties)
        );
    }
    if report.is_truncated() {
        tracing::info!(dropped = report.dropped, "lower ranked devices not kept");
    }

    let Some(best) = ranked.first().copied() else {
        tracing::warn!("no suitable physical device found");
        return Ok(());
    };

    let flags = required_queue.unwrap_or_else(vk::QueueFlags::empty);
    let queue_family_index = instance
        .find_queue_family(best.candidate, flags)
        .ok_or(VulkanError::NoQueueFamily(flags))?;
    let device = LogicalDevice::create(
        &instance,
        best.candidate,
        &DeviceDescriptor {
            queue_family_index,
            ..Default::default()
        },
    )?;

    tracing::info!(
        queue_family = device.queue_family_index(),
        "opened {}",
        device_name(&instance.device_properties(device.physical_device()))
    );

    // Device, messenger, instance and library are released in that order.
    Ok(())
}

fn log_filtered(what: &str, requested: &[&CStr], enabled: &[&CStr], report: FillReport) {
    for name in requested {
        if !enabled.contains(name) {
            tracing::info!("{what}: {} not available", name.to_string_lossy());
        }
    }
    tracing::info!(
        requested = requested.len(),
        enabled = report.written,
        dropped = report.dropped,
        "{what} negotiated"
    );
}

fn queue_flags(requirement: QueueRequirement) -> Option<vk::QueueFlags> {
    match requirement {
        QueueRequirement::Any => None,
        QueueRequirement::Graphics => Some(vk::QueueFlags::GRAPHICS),
        QueueRequirement::Compute => Some(vk::QueueFlags::COMPUTE),
    }
}

fn device_name(properties: &vk::PhysicalDeviceProperties) -> String {
    properties
        .device_name_as_c_str()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
