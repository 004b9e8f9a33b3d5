//! JSON dashboard-bridge UDP decoder (default port 5555).
//!
//! Bridge tools forward telemetry from many games as UTF-8 JSON
//! datagrams. Every message is an object with a `"Type"` discriminator;
//! only `"Telemetry"` carries shift-light fields, and the other message
//! types (`"Session"`, `"Event"`, `"Lap"`, ...) are decoded and
//! ignored.
//!
//! Telemetry payload example:
//! ```json
//! {
//!   "Type": "Telemetry",
//!   "PacketId": 4711,
//!   "Rpms": 4500.0,
//!   "MaxRpms": 8000.0,
//!   "OptimalShiftRpm": 7400.0,
//!   "Gear": "3",
//!   "SpeedMs": 22.5
//! }
//! ```
//!
//! Fields:
//! - `Rpms` / `Rpm`        - engine RPM
//! - `MaxRpms`             - rev ceiling
//! - `OptimalShiftRpm`     - game-supplied shift point, optional
//! - `Gear`                - string: "R" = reverse, ""/"N" = neutral,
//!   "1"-"9" = forward gears
//! - `SpeedMs`             - vehicle speed in m/s
//! - `PacketId`            - monotonic counter, used for ordering

use revring_telemetry::{BridgeProfile, DecodeError, SourceProtocol, TelemetrySample};
use serde::Deserialize;

/// Message type that carries shift-light fields.
const TELEMETRY_TYPE: &str = "Telemetry";

#[derive(Debug, Deserialize)]
struct TelemetryMessage {
    #[serde(default, rename = "Rpms", alias = "Rpm")]
    rpms: f32,

    #[serde(default, rename = "MaxRpms")]
    max_rpms: f32,

    #[serde(default, rename = "OptimalShiftRpm")]
    optimal_shift_rpm: Option<f32>,

    #[serde(default, rename = "Gear")]
    gear: String,

    #[serde(default, rename = "SpeedMs")]
    speed_ms: Option<f32>,

    #[serde(default, rename = "PacketId")]
    packet_id: Option<u64>,
}

/// Parse a gear string.
///
/// - `"R"` is reverse
/// - `""` or `"N"` is neutral
/// - `"1"`-`"9"` are forward gears
/// - anything else falls back to neutral
fn parse_gear(s: &str) -> i8 {
    match s.trim() {
        "R" => -1,
        "" | "N" => 0,
        other => other.parse::<i8>().unwrap_or(0),
    }
}

/// Decode one bridge datagram.
pub fn decode(data: &[u8], _profile: &BridgeProfile) -> Result<TelemetrySample, DecodeError> {
    if data.is_empty() {
        return Err(DecodeError::NotThisProtocol);
    }

    let text = std::str::from_utf8(data).map_err(|_| DecodeError::NotThisProtocol)?;
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|_| DecodeError::NotThisProtocol)?;

    let Some(message_type) = value.get("Type").and_then(|t| t.as_str()) else {
        // An object without the envelope discriminator is some other
        // JSON speaker on the network, not a bridge message.
        return Err(DecodeError::NotThisProtocol);
    };

    if message_type != TELEMETRY_TYPE {
        return Err(DecodeError::Ignored);
    }

    let message: TelemetryMessage = serde_json::from_value(value)
        .map_err(|e| DecodeError::Malformed(format!("telemetry message: {e}")))?;

    let mut sample = TelemetrySample::new(SourceProtocol::Bridge, message.rpms)
        .with_rpm_max(message.max_rpms)
        .with_gear(parse_gear(&message.gear));

    if let Some(shift) = message.optimal_shift_rpm {
        sample = sample.with_optimal_shift_rpm(shift);
    }
    if let Some(speed) = message.speed_ms {
        sample = sample.with_speed_ms(speed);
    }
    if let Some(id) = message.packet_id {
        sample = sample.with_sequence(id);
    }

    Ok(sample)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn telemetry_packet() -> &'static [u8] {
        br#"{"Type":"Telemetry","PacketId":42,"Rpms":4500.0,"MaxRpms":8000.0,"OptimalShiftRpm":7400.0,"Gear":"3","SpeedMs":22.5}"#
    }

    #[test]
    fn telemetry_message_produces_sample() {
        let sample = decode(telemetry_packet(), &BridgeProfile::default()).unwrap();
        assert!((sample.rpm - 4500.0).abs() < 0.1);
        assert!((sample.rpm_max - 8000.0).abs() < 0.1);
        assert_eq!(sample.optimal_shift_rpm, Some(7400.0));
        assert_eq!(sample.gear, Some(3));
        assert_eq!(sample.sequence, Some(42));
        let speed = sample.speed_ms.unwrap();
        assert!((speed - 22.5).abs() < 0.01);
    }

    #[test]
    fn session_message_is_ignored() {
        let data = br#"{"Type":"Session","Track":"brands_hatch","AirTemp":21.5}"#;
        assert_eq!(
            decode(data, &BridgeProfile::default()),
            Err(DecodeError::Ignored)
        );
    }

    #[test]
    fn unknown_message_type_is_ignored() {
        let data = br#"{"Type":"PitStrategy","Laps":12}"#;
        assert_eq!(
            decode(data, &BridgeProfile::default()),
            Err(DecodeError::Ignored)
        );
    }

    #[test]
    fn missing_type_field_is_not_this_protocol() {
        let data = br#"{"Rpms":4500.0}"#;
        assert_eq!(
            decode(data, &BridgeProfile::default()),
            Err(DecodeError::NotThisProtocol)
        );
    }

    #[test]
    fn binary_garbage_is_not_this_protocol() {
        let data = [0u8, 159, 146, 150];
        assert_eq!(
            decode(&data, &BridgeProfile::default()),
            Err(DecodeError::NotThisProtocol)
        );
    }

    #[test]
    fn empty_datagram_is_not_this_protocol() {
        assert_eq!(
            decode(&[], &BridgeProfile::default()),
            Err(DecodeError::NotThisProtocol)
        );
    }

    #[test]
    fn rpm_alias_is_accepted() {
        let data = br#"{"Type":"Telemetry","Rpm":3000.0}"#;
        let sample = decode(data, &BridgeProfile::default()).unwrap();
        assert!((sample.rpm - 3000.0).abs() < 0.1);
    }

    #[test]
    fn gear_string_parsing() {
        assert_eq!(parse_gear("R"), -1);
        assert_eq!(parse_gear("N"), 0);
        assert_eq!(parse_gear(""), 0);
        assert_eq!(parse_gear("7"), 7);
        assert_eq!(parse_gear("boost"), 0);
    }

    #[test]
    fn missing_optional_fields_default() {
        let data = br#"{"Type":"Telemetry","Rpms":2500.0}"#;
        let sample = decode(data, &BridgeProfile::default()).unwrap();
        assert_eq!(sample.rpm_max, 0.0);
        assert_eq!(sample.optimal_shift_rpm, None);
        assert_eq!(sample.sequence, None);
        assert_eq!(sample.gear, Some(0));
    }
}
