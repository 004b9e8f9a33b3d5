//! Device configuration.
//!
//! One JSON document covers every tunable the core consumes: active
//! protocols (in priority order), port overrides, smoothing, staleness,
//! color bands, and render cadences. The configuration is read once at
//! startup and is read-only afterwards; persisting or editing it is an
//! external concern.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use rgb::RGB8;
use serde::{Deserialize, Serialize};

use revring_policy::{ColorBand, ColorTable, PolicyConfig};
use revring_render::RenderConfig;
use revring_telemetry::{ProtocolProfile, SourceProtocol, StateConfig};

/// Complete device configuration with sensible defaults for every
/// field, so a partial (or absent) config file works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Active protocols in priority order.
    pub protocols: Vec<String>,
    /// Per-protocol UDP port overrides, keyed by protocol id.
    pub ports: HashMap<String, u16>,
    /// RPM exponential-moving-average coefficient.
    pub smoothing_alpha: f32,
    /// Milliseconds without telemetry before the idle transition.
    pub staleness_ms: u64,
    /// Floor (and idle reset value) for the learned rev ceiling.
    pub fallback_rpm_max: f32,
    /// RPM at which the ring starts filling.
    pub low_threshold_rpm: f32,
    /// Fallback shift point as a fraction of the rev ceiling.
    pub shift_fraction: f32,
    /// Fill-ratio color bands, lowest first.
    pub bands: Vec<ColorBand>,
    /// Number of pixels on the ring.
    pub led_count: usize,
    /// Global LED brightness in [0, 1].
    pub brightness: f32,
    /// Shift-flash rate in full cycles per second.
    pub flash_hz: f32,
    /// Breathe the ring while idle instead of going dark.
    pub idle_animation: bool,
    /// Scheduler tick rate in Hz.
    pub tick_hz: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            protocols: SourceProtocol::ALL.iter().map(|p| p.id().to_string()).collect(),
            ports: HashMap::new(),
            smoothing_alpha: 0.35,
            staleness_ms: 2000,
            fallback_rpm_max: 3000.0,
            low_threshold_rpm: 0.0,
            shift_fraction: 0.95,
            bands: ColorTable::green_yellow_red().bands().to_vec(),
            led_count: 24,
            brightness: 0.25,
            flash_hz: 5.0,
            idle_animation: true,
            tick_hz: 60,
        }
    }
}

impl DeviceConfig {
    /// Load a configuration file, falling back to defaults when the
    /// file does not exist. A present-but-invalid file is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config at {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the active protocol profiles in priority order,
    /// applying port overrides.
    pub fn profiles(&self) -> Result<Vec<ProtocolProfile>> {
        let mut profiles = Vec::with_capacity(self.protocols.len());
        for id in &self.protocols {
            let Some(protocol) = SourceProtocol::from_id(id) else {
                bail!("unknown protocol {id:?} in config (expected one of dirt, forza, bridge)");
            };
            let mut profile = ProtocolProfile::default_for(protocol);
            if let Some(&port) = self.ports.get(protocol.id()) {
                profile = profile.with_port(port);
            }
            profiles.push(profile);
        }
        Ok(profiles)
    }

    /// Tunables for the telemetry state.
    pub fn state_config(&self) -> StateConfig {
        StateConfig {
            smoothing_alpha: self.smoothing_alpha,
            staleness: Duration::from_millis(self.staleness_ms),
            fallback_rpm_max: self.fallback_rpm_max,
        }
    }

    /// Tunables for the shift policy.
    pub fn policy_config(&self) -> PolicyConfig {
        PolicyConfig {
            low_threshold_rpm: self.low_threshold_rpm,
            shift_fraction: self.shift_fraction,
            bands: ColorTable::new(self.bands.clone()),
            idle_color: RGB8::new(0, 150, 150),
        }
    }

    /// Tunables for the renderer.
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            brightness: self.brightness,
            flash_hz: self.flash_hz,
            tick_hz: self.tick_hz,
            idle_animation: self.idle_animation,
        }
    }

    /// Scheduler tick period.
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_hz.max(1)))
    }

    fn validate(&self) -> Result<()> {
        if self.protocols.is_empty() {
            bail!("config enables no protocols");
        }
        // Resolve early so typos fail at startup, not first packet.
        let _ = self.profiles()?;
        if !(0.0..=1.0).contains(&self.smoothing_alpha) {
            bail!("smoothing_alpha must be in [0, 1], got {}", self.smoothing_alpha);
        }
        if !(0.0..=1.0).contains(&self.brightness) {
            bail!("brightness must be in [0, 1], got {}", self.brightness);
        }
        if self.led_count == 0 {
            bail!("led_count must be at least 1");
        }
        if self.tick_hz == 0 {
            bail!("tick_hz must be at least 1");
        }
        Ok(())
    }
}
