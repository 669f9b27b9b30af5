/// Device selection and negotiation fallbacks for the cpal backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpalBackendConfig {
    /// Audio host name (e.g. `"ALSA"`, `"JACK"`, `"CoreAudio"`), matched
    /// case-insensitively. `None` uses the platform default host.
    pub host: Option<String>,

    /// Input device name. `None` or `"default"` uses the default input.
    pub device_name: Option<String>,

    /// Sample rate used when the device reports no default configuration.
    pub fallback_sample_rate: u32,

    /// Preferred channel count when choosing among supported ranges.
    pub fallback_channels: u16,
}

impl CpalBackendConfig {
    pub fn validate(&self) -> Result<(), String> {
        if matches!(self.host.as_deref(), Some(h) if h.trim().is_empty()) {
            return Err("host name must not be empty".into());
        }
        if matches!(self.device_name.as_deref(), Some(d) if d.trim().is_empty()) {
            return Err("device name must not be empty".into());
        }
        if !(8_000..=384_000).contains(&self.fallback_sample_rate) {
            return Err(format!(
                "fallback sample rate {} Hz is out of range",
                self.fallback_sample_rate
            ));
        }
        if !(1..=2).contains(&self.fallback_channels) {
            return Err(format!(
                "fallback channel count must be 1 or 2, got {}",
                self.fallback_channels
            ));
        }
        Ok(())
    }

    /// The configured device name, or `None` for the default device.
    pub(crate) fn requested_device(&self) -> Option<&str> {
        self.device_name
            .as_deref()
            .filter(|name| !name.eq_ignore_ascii_case("default"))
    }
}

impl Default for CpalBackendConfig {
    fn default() -> Self {
        Self {
            host: None,
            device_name: None,
            fallback_sample_rate: 44_100,
            fallback_channels: 2,
        }
    }
}
