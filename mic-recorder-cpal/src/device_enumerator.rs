//! Host and input device resolution over cpal.

use cpal::traits::{DeviceTrait, HostTrait};

use mic_recorder_core::{CaptureBackend, CaptureError, DeviceInfo, InputDevice};

use crate::config::CpalBackendConfig;
use crate::cpal_stream::CpalInputDevice;
use crate::negotiation::{self, ConfigRange, NegotiatedFormat, ReportedDefault};
use crate::permissions;

/// Production `CaptureBackend` built on cpal.
///
/// Construction only validates the configuration; hosts and devices are
/// resolved on every `open_default_input`, so a device plugged in after
/// construction is picked up by the next recording.
pub struct CpalBackend {
    config: CpalBackendConfig,
}

impl CpalBackend {
    pub fn new(config: CpalBackendConfig) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::InvalidConfiguration)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CpalBackendConfig {
        &self.config
    }

    /// Names of the audio hosts compiled into this build.
    pub fn available_hosts() -> Vec<&'static str> {
        cpal::available_hosts().into_iter().map(|id| id.name()).collect()
    }

    /// Every input device on the configured host, default first.
    ///
    /// Devices whose format cannot be negotiated are skipped.
    pub fn list_input_devices(&self) -> Result<Vec<DeviceInfo>, CaptureError> {
        let host = self.host()?;
        let default_name = host.default_input_device().and_then(|d| d.name().ok());
        let devices = host
            .input_devices()
            .map_err(|e| CaptureError::DeviceUnavailable(format!("failed to enumerate input devices: {}", e)))?;

        let mut listed = Vec::new();
        for device in devices {
            let Ok(name) = device.name() else {
                continue;
            };
            let format = match negotiate_format(&device, &self.config) {
                Ok(negotiated) => negotiated.format,
                Err(e) => {
                    log::debug!("Skipping input device '{}': {}", name, e);
                    continue;
                }
            };
            listed.push(DeviceInfo {
                id: device_id(&host, &name),
                is_default: default_name.as_deref() == Some(name.as_str()),
                name,
                format,
            });
        }

        listed.sort_by(|a, b| b.is_default.cmp(&a.is_default).then_with(|| a.name.cmp(&b.name)));
        Ok(listed)
    }

    fn host(&self) -> Result<cpal::Host, CaptureError> {
        let Some(wanted) = self.config.host.as_deref() else {
            return Ok(cpal::default_host());
        };
        let id = cpal::available_hosts()
            .into_iter()
            .find(|id| id.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                CaptureError::DeviceUnavailable(format!(
                    "audio host '{}' not available (have: {})",
                    wanted,
                    Self::available_hosts().join(", ")
                ))
            })?;
        cpal::host_from_id(id).map_err(|e| CaptureError::DeviceUnavailable(format!("audio host '{}': {}", wanted, e)))
    }

    fn resolve_device(&self, host: &cpal::Host) -> Result<(cpal::Device, bool), CaptureError> {
        match self.config.requested_device() {
            None => host
                .default_input_device()
                .map(|device| (device, true))
                .ok_or_else(|| CaptureError::DeviceUnavailable("no default input device".into())),
            Some(wanted) => {
                let default_name = host.default_input_device().and_then(|d| d.name().ok());
                let devices = host.input_devices().map_err(|e| {
                    CaptureError::DeviceUnavailable(format!("failed to enumerate input devices: {}", e))
                })?;
                let device = devices
                    .into_iter()
                    .find(|d| d.name().map(|n| n == wanted).unwrap_or(false))
                    .ok_or_else(|| CaptureError::DeviceUnavailable(format!("input device '{}' not found", wanted)))?;
                Ok((device, default_name.as_deref() == Some(wanted)))
            }
        }
    }
}

impl CaptureBackend for CpalBackend {
    fn open_default_input(&self) -> Result<Box<dyn InputDevice>, CaptureError> {
        let host = self.host()?;
        let (device, is_default) = self.resolve_device(&host)?;
        let name = device.name().unwrap_or_else(|_| "Unknown input".into());
        log::debug!("Resolved input device '{}' on host {}", name, host.id().name());

        let negotiated = negotiate_format(&device, &self.config)?;
        let info = DeviceInfo {
            id: device_id(&host, &name),
            name,
            is_default,
            format: negotiated.format,
        };
        Ok(Box::new(CpalInputDevice::new(device, info, negotiated.native)))
    }
}

/// Query the device's configurations and negotiate a format.
fn negotiate_format(device: &cpal::Device, config: &CpalBackendConfig) -> Result<NegotiatedFormat, CaptureError> {
    let default = match device.default_input_config() {
        Ok(supported) => Some(ReportedDefault {
            sample_rate: supported.sample_rate().0,
            channels: supported.channels(),
            sample_format: supported.sample_format(),
        }),
        Err(e) => match permissions::default_config_error(e) {
            CaptureError::FormatNegotiationFailed(reason) => {
                log::debug!("No default input config: {}", reason);
                None
            }
            other => return Err(other),
        },
    };

    // An encodable default needs no range query.
    if default.is_some_and(|d| negotiation::map_sample_format(d.sample_format).is_some()) {
        return negotiation::negotiate(default, &[], config.fallback_sample_rate, config.fallback_channels);
    }

    let ranges: Vec<ConfigRange> = device
        .supported_input_configs()
        .map_err(permissions::supported_configs_error)?
        .map(|range| ConfigRange {
            channels: range.channels(),
            min_sample_rate: range.min_sample_rate().0,
            max_sample_rate: range.max_sample_rate().0,
            sample_format: range.sample_format(),
        })
        .collect();

    negotiation::negotiate(default, &ranges, config.fallback_sample_rate, config.fallback_channels)
}

fn device_id(host: &cpal::Host, name: &str) -> String {
    format!("{}:{}", host.id().name().to_lowercase(), name)
}
