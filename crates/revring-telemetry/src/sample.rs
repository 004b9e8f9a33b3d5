//! Normalized telemetry snapshot types.
//!
//! Every protocol decoder converts its game-specific wire format into a
//! [`TelemetrySample`]. The sample is immutable once constructed and
//! carries only the fields a shift light needs; anything else a game
//! broadcasts is dropped at decode time.

use serde::{Deserialize, Serialize};

/// Identifies which wire protocol produced a sample.
///
/// This is a closed set: adding a game means adding a variant here plus
/// its profile data and decoder, never touching the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceProtocol {
    /// Codemasters "extradata" flat packet of little-endian floats.
    Dirt,
    /// Forza "Data Out" Sled/CarDash binary packet.
    Forza,
    /// JSON dashboard-bridge datagram with typed messages.
    Bridge,
}

impl SourceProtocol {
    /// All supported protocols, in default priority order.
    pub const ALL: [SourceProtocol; 3] = [
        SourceProtocol::Dirt,
        SourceProtocol::Forza,
        SourceProtocol::Bridge,
    ];

    /// Stable identifier used in configuration and log fields.
    pub fn id(&self) -> &'static str {
        match self {
            SourceProtocol::Dirt => "dirt",
            SourceProtocol::Forza => "forza",
            SourceProtocol::Bridge => "bridge",
        }
    }

    /// Parse a configuration identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "dirt" => Some(SourceProtocol::Dirt),
            "forza" => Some(SourceProtocol::Forza),
            "bridge" => Some(SourceProtocol::Bridge),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// One decoded snapshot of race-car state from a single datagram.
///
/// Produced exactly once per successfully decoded datagram. RPM is in
/// game-native revolutions per minute and never negative; `rpm_max` of
/// zero means the protocol did not report a rev ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Protocol that produced this sample.
    pub source: SourceProtocol,

    /// Engine speed in RPM, clamped to be non-negative and finite.
    pub rpm: f32,

    /// Reported rev ceiling in RPM; 0.0 when the protocol has none.
    #[serde(default)]
    pub rpm_max: f32,

    /// Game-supplied optimal shift point in RPM, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimal_shift_rpm: Option<f32>,

    /// Current gear (-1 = reverse, 0 = neutral, 1+ = forward gears).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gear: Option<i8>,

    /// Vehicle speed in meters per second, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_ms: Option<f32>,

    /// Protocol-local ordering value (packet counter or wire
    /// timestamp). Only comparable between samples of the same source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,
}

impl TelemetrySample {
    /// Create a sample for `source` with the given engine speed.
    ///
    /// Non-finite or negative RPM collapses to 0.0 so downstream code
    /// never sees an out-of-domain value.
    pub fn new(source: SourceProtocol, rpm: f32) -> Self {
        Self {
            source,
            rpm: sanitize_rpm(rpm),
            rpm_max: 0.0,
            optimal_shift_rpm: None,
            gear: None,
            speed_ms: None,
            sequence: None,
        }
    }

    /// Set the reported rev ceiling. Non-finite or negative values are
    /// treated as unreported.
    pub fn with_rpm_max(mut self, rpm_max: f32) -> Self {
        self.rpm_max = sanitize_rpm(rpm_max);
        self
    }

    /// Set the game-supplied optimal shift point.
    pub fn with_optimal_shift_rpm(mut self, rpm: f32) -> Self {
        let rpm = sanitize_rpm(rpm);
        self.optimal_shift_rpm = (rpm > 0.0).then_some(rpm);
        self
    }

    /// Set the current gear.
    pub fn with_gear(mut self, gear: i8) -> Self {
        self.gear = Some(gear);
        self
    }

    /// Set the vehicle speed in m/s.
    pub fn with_speed_ms(mut self, speed_ms: f32) -> Self {
        self.speed_ms = speed_ms.is_finite().then_some(speed_ms.max(0.0));
        self
    }

    /// Set the protocol-local ordering value.
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = Some(sequence);
        self
    }
}

fn sanitize_rpm(rpm: f32) -> f32 {
    if rpm.is_finite() { rpm.max(0.0) } else { 0.0 }
}

/// Label for a gear value as shown on the device display.
///
/// `R` for reverse, `N` for neutral, the digit for forward gears 1-9,
/// and `-` when the gear is unknown or out of the displayable range.
pub fn gear_label(gear: Option<i8>) -> char {
    match gear {
        Some(g) if g < 0 => 'R',
        Some(0) => 'N',
        Some(g @ 1..=9) => (b'0' + g.unsigned_abs()) as char,
        _ => '-',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sample_clamps_negative_rpm() {
        let sample = TelemetrySample::new(SourceProtocol::Dirt, -500.0);
        assert_eq!(sample.rpm, 0.0);
    }

    #[test]
    fn new_sample_collapses_non_finite_rpm() {
        let sample = TelemetrySample::new(SourceProtocol::Dirt, f32::NAN);
        assert_eq!(sample.rpm, 0.0);
        let sample = TelemetrySample::new(SourceProtocol::Dirt, f32::INFINITY);
        assert_eq!(sample.rpm, 0.0);
    }

    #[test]
    fn optimal_shift_zero_means_absent() {
        let sample = TelemetrySample::new(SourceProtocol::Bridge, 4000.0)
            .with_optimal_shift_rpm(0.0);
        assert_eq!(sample.optimal_shift_rpm, None);
    }

    #[test]
    fn gear_labels_match_display_conventions() {
        assert_eq!(gear_label(Some(-1)), 'R');
        assert_eq!(gear_label(Some(0)), 'N');
        assert_eq!(gear_label(Some(3)), '3');
        assert_eq!(gear_label(Some(9)), '9');
        assert_eq!(gear_label(Some(10)), '-');
        assert_eq!(gear_label(None), '-');
    }

    #[test]
    fn protocol_ids_round_trip() {
        for protocol in SourceProtocol::ALL {
            assert_eq!(SourceProtocol::from_id(protocol.id()), Some(protocol));
        }
        assert_eq!(SourceProtocol::from_id("not_a_game"), None);
    }
}
