//! Deterministic mapping from telemetry state to display intent.
//!
//! [`ShiftPolicy::compute_intent`] is a pure function: the same
//! [`TelemetryView`] always yields the same [`DisplayIntent`], with no
//! side effects and no clock access. Color banding and thresholds are
//! declarative configuration consumed here — tuning a profile never
//! touches decoding or rendering code.

#![deny(static_mut_refs)]

use rgb::RGB8;
use serde::{Deserialize, Serialize};

use revring_telemetry::{TelemetryView, gear_label};

/// One color band: `color` applies while `fill_ratio <= upper`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorBand {
    /// Upper fill-ratio bound of this band, inclusive.
    pub upper: f32,
    /// Color for the lit portion of the ring inside this band.
    pub color: RGB8,
}

/// Ordered fill-ratio palette, e.g. green, yellow, red.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorTable {
    bands: Vec<ColorBand>,
}

impl ColorTable {
    /// Build a table from bands. Bands are sorted by their upper bound;
    /// the last band catches everything up to 1.0.
    pub fn new(mut bands: Vec<ColorBand>) -> Self {
        bands.sort_by(|a, b| a.upper.total_cmp(&b.upper));
        Self { bands }
    }

    /// The classic green / yellow / red ramp.
    pub fn green_yellow_red() -> Self {
        Self::new(vec![
            ColorBand {
                upper: 0.60,
                color: RGB8::new(0, 255, 0),
            },
            ColorBand {
                upper: 0.85,
                color: RGB8::new(255, 255, 0),
            },
            ColorBand {
                upper: 1.0,
                color: RGB8::new(255, 0, 0),
            },
        ])
    }

    /// Color for a fill ratio. Falls back to the last band (or black
    /// for an empty table).
    pub fn color_for(&self, fill_ratio: f32) -> RGB8 {
        self.bands
            .iter()
            .find(|band| fill_ratio <= band.upper)
            .or_else(|| self.bands.last())
            .map(|band| band.color)
            .unwrap_or(RGB8::new(0, 0, 0))
    }

    /// The configured bands, ordered by upper bound.
    pub fn bands(&self) -> &[ColorBand] {
        &self.bands
    }
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::green_yellow_red()
    }
}

/// Shift policy tunables, read-only after load.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyConfig {
    /// RPM at which the ring starts filling.
    pub low_threshold_rpm: f32,
    /// Fallback shift point as a fraction of the rev ceiling, used when
    /// the game does not supply an optimal shift RPM.
    pub shift_fraction: f32,
    /// Fill-ratio color bands.
    pub bands: ColorTable,
    /// Ring color while idle (rendered dim/breathing by the renderer).
    pub idle_color: RGB8,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            low_threshold_rpm: 0.0,
            shift_fraction: 0.95,
            bands: ColorTable::default(),
            idle_color: RGB8::new(0, 150, 150),
        }
    }
}

/// What the renderer should put on the hardware this tick.
///
/// Recomputed from the state every tick and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayIntent {
    /// Fraction of the LED ring to illuminate, always in [0, 1].
    pub fill_ratio: f32,
    /// Color for the lit portion.
    pub color: RGB8,
    /// True when the driver should shift now; the renderer flashes the
    /// whole ring instead of showing the fill.
    pub flashing: bool,
    /// True when no live telemetry is present; a terminal rendering
    /// state, not derived from stale numeric fields.
    pub idle: bool,
    /// Short lines for the text panel (gear, then RPM). Empty while
    /// idle.
    pub text_lines: Vec<String>,
}

/// Maps a [`TelemetryView`] to a [`DisplayIntent`].
#[derive(Debug, Clone)]
pub struct ShiftPolicy {
    config: PolicyConfig,
}

impl ShiftPolicy {
    /// Create a policy with the given tunables.
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// Policy with default tunables.
    pub fn with_defaults() -> Self {
        Self::new(PolicyConfig::default())
    }

    /// Compute the display intent for the current state.
    ///
    /// Pure and deterministic: calling this twice on an unchanged view
    /// yields an identical intent.
    pub fn compute_intent(&self, view: &TelemetryView) -> DisplayIntent {
        if view.idle {
            return DisplayIntent {
                fill_ratio: 0.0,
                color: self.config.idle_color,
                flashing: false,
                idle: true,
                text_lines: Vec::new(),
            };
        }

        let shift_rpm = self.shift_rpm(view);
        let fill_ratio = self.fill_ratio(view.rpm, shift_rpm);
        // Shift cue is distinct from "ring full": it fires exactly when
        // the shift point is met, however the ratio was clamped.
        let flashing = shift_rpm > 0.0 && view.rpm >= shift_rpm;

        DisplayIntent {
            fill_ratio,
            color: self.config.bands.color_for(fill_ratio),
            flashing,
            idle: false,
            text_lines: vec![
                gear_label(view.gear).to_string(),
                format!("{:.0}", view.rpm.max(0.0)),
            ],
        }
    }

    /// Band color for a fill ratio, e.g. for boot animations that
    /// bypass intent computation.
    pub fn color_for(&self, fill_ratio: f32) -> RGB8 {
        self.config.bands.color_for(fill_ratio)
    }

    fn shift_rpm(&self, view: &TelemetryView) -> f32 {
        match view.optimal_shift_rpm {
            Some(shift) if shift > 0.0 => shift,
            _ => (view.rpm_max.max(0.0)) * self.config.shift_fraction.clamp(0.0, 1.0),
        }
    }

    fn fill_ratio(&self, rpm: f32, shift_rpm: f32) -> f32 {
        let low = self.config.low_threshold_rpm.max(0.0);
        let span = shift_rpm - low;
        if !span.is_finite() || span <= 0.0 {
            // Degenerate configuration or no ceiling at all: the ring
            // is either empty or pegged, never mid-scale garbage.
            return if rpm >= shift_rpm && shift_rpm > 0.0 {
                1.0
            } else {
                0.0
            };
        }
        let ratio = (rpm - low) / span;
        if ratio.is_finite() {
            ratio.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

impl Default for ShiftPolicy {
    fn default() -> Self {
        Self::with_defaults()
    }
}
