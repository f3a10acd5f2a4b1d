use crate::{CoreResult, NoteError};

use std::panic::Location;

use cpal::{
    Device, Host,
    traits::{DeviceTrait, HostTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, warn};

/// Resolve an input device by name, or the default one.
#[track_caller]
pub(crate) fn input_device(name: Option<&str>) -> CoreResult<Device> {
    let caller = Location::caller();
    let host = cpal::default_host();

    if let Some(name) = name {
        let devices = host.input_devices().map_err(|e| NoteError::DeviceError {
            reason: format!("Failed to list input devices: {}", e),
            location: ErrorLocation::from(caller),
        })?;
        if let Some(device) = find_named(devices, name) {
            return Ok(device);
        }
        warn!(device = name, "Configured input device not found, using default");
    }

    host.default_input_device()
        .ok_or_else(|| NoteError::DeviceError {
            reason: "No microphone found".to_string(),
            location: ErrorLocation::from(caller),
        })
}

/// Resolve an output device by name, or the default one.
#[track_caller]
pub(crate) fn output_device(name: Option<&str>) -> CoreResult<Device> {
    let caller = Location::caller();
    let host: Host = cpal::default_host();

    if let Some(name) = name {
        let devices = host.output_devices().map_err(|e| NoteError::DeviceError {
            reason: format!("Failed to list output devices: {}", e),
            location: ErrorLocation::from(caller),
        })?;
        if let Some(device) = find_named(devices, name) {
            return Ok(device);
        }
        warn!(device = name, "Configured output device not found, using default");
    }

    host.default_output_device()
        .ok_or_else(|| NoteError::DeviceError {
            reason: "No output device found".to_string(),
            location: ErrorLocation::from(caller),
        })
}

#[allow(deprecated)]
fn find_named(mut devices: impl Iterator<Item = Device>, name: &str) -> Option<Device> {
    devices.find(|device| match device.name() {
        Ok(device_name) => {
            debug!(device = %device_name, "Checking audio device");
            device_name == name
        }
        Err(_) => false,
    })
}
