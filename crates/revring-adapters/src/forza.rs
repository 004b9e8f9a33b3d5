//! Forza Motorsport / Forza Horizon "Data Out" UDP decoder.
//!
//! Two packet formats, both little-endian, distinguished by length:
//!
//! - **Sled** (232 bytes): FM7 and earlier. Physics data only.
//! - **CarDash** (311 bytes): FM8, FH4+. Sled data plus dashboard
//!   fields (speed, gear).
//!
//! The leading `IsRaceOn` flag is 0 while the player sits in menus;
//! those packets are decoded and ignored rather than treated as
//! errors. `TimestampMS` provides the ordering value.

use revring_telemetry::{DecodeError, ForzaProfile, SourceProtocol, TelemetrySample};

use crate::{read_f32, read_i32, read_u32};

/// Sled packet: 58 x 4-byte fields.
const SLED_SIZE: usize = 232;
/// CarDash packet: Sled plus dashboard extension.
const CARDASH_SIZE: usize = 311;

const OFF_IS_RACE_ON: usize = 0; // i32
const OFF_TIMESTAMP_MS: usize = 4; // u32
const OFF_ENGINE_MAX_RPM: usize = 8; // f32
const OFF_CURRENT_RPM: usize = 16; // f32
const OFF_VEL_X: usize = 32; // f32
const OFF_VEL_Y: usize = 36; // f32
const OFF_VEL_Z: usize = 40; // f32
const OFF_DASH_SPEED: usize = 244; // f32 m/s
const OFF_DASH_GEAR: usize = 307; // u8 (0=R, 1=N, 2=1st, ...)

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PacketFormat {
    Sled,
    CarDash,
}

fn detect_format(len: usize) -> Option<PacketFormat> {
    match len {
        SLED_SIZE => Some(PacketFormat::Sled),
        CARDASH_SIZE => Some(PacketFormat::CarDash),
        _ => None,
    }
}

/// Decode one Data Out datagram.
pub fn decode(data: &[u8], _profile: &ForzaProfile) -> Result<TelemetrySample, DecodeError> {
    let format = detect_format(data.len()).ok_or(DecodeError::NotThisProtocol)?;

    let is_race_on = read_i32(data, OFF_IS_RACE_ON).unwrap_or(0);
    if is_race_on == 0 {
        // Menu traffic: a well-formed packet with nothing to show.
        return Err(DecodeError::Ignored);
    }

    let rpm = read_f32(data, OFF_CURRENT_RPM).unwrap_or(0.0);
    let max_rpm = read_f32(data, OFF_ENGINE_MAX_RPM).unwrap_or(0.0);
    let timestamp_ms = read_u32(data, OFF_TIMESTAMP_MS).unwrap_or(0);

    let mut sample = TelemetrySample::new(SourceProtocol::Forza, rpm)
        .with_rpm_max(max_rpm)
        .with_sequence(u64::from(timestamp_ms));

    match format {
        PacketFormat::Sled => {
            // No direct speed field; use the velocity magnitude.
            let vx = read_f32(data, OFF_VEL_X).unwrap_or(0.0);
            let vy = read_f32(data, OFF_VEL_Y).unwrap_or(0.0);
            let vz = read_f32(data, OFF_VEL_Z).unwrap_or(0.0);
            let speed = (vx * vx + vy * vy + vz * vz).sqrt();
            if speed.is_finite() {
                sample = sample.with_speed_ms(speed);
            }
        }
        PacketFormat::CarDash => {
            if let Some(speed) = read_f32(data, OFF_DASH_SPEED) {
                sample = sample.with_speed_ms(speed.abs());
            }
            if let Some(&raw) = data.get(OFF_DASH_GEAR) {
                sample = sample.with_gear(decode_gear(raw));
            }
        }
    }

    Ok(sample)
}

/// Gear wire encoding: 0 = reverse, 1 = neutral, 2..=9 = gears 1-8.
fn decode_gear(raw: u8) -> i8 {
    match raw {
        0 => -1,
        1 => 0,
        g => i8::try_from(g - 1).unwrap_or(i8::MAX).min(9),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_packet(len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        // Live by default; menu tests overwrite.
        buf[OFF_IS_RACE_ON..OFF_IS_RACE_ON + 4].copy_from_slice(&1i32.to_le_bytes());
        buf
    }

    fn write_f32(buf: &mut [u8], offset: usize, value: f32) {
        buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    fn write_u32(buf: &mut [u8], offset: usize, value: u32) {
        buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    #[test]
    fn unknown_length_is_not_this_protocol() {
        let profile = ForzaProfile::default();
        for len in [0, 100, SLED_SIZE - 1, SLED_SIZE + 1, CARDASH_SIZE + 1] {
            let raw = vec![0u8; len];
            assert_eq!(decode(&raw, &profile), Err(DecodeError::NotThisProtocol));
        }
    }

    #[test]
    fn menu_packet_is_ignored_not_an_error_sample() {
        let profile = ForzaProfile::default();
        let mut raw = make_packet(SLED_SIZE);
        raw[OFF_IS_RACE_ON..OFF_IS_RACE_ON + 4].copy_from_slice(&0i32.to_le_bytes());
        assert_eq!(decode(&raw, &profile), Err(DecodeError::Ignored));
    }

    #[test]
    fn sled_packet_extracts_rpm_and_timestamp() {
        let profile = ForzaProfile::default();
        let mut raw = make_packet(SLED_SIZE);
        write_f32(&mut raw, OFF_CURRENT_RPM, 5000.0);
        write_f32(&mut raw, OFF_ENGINE_MAX_RPM, 8000.0);
        write_u32(&mut raw, OFF_TIMESTAMP_MS, 123_456);
        let sample = decode(&raw, &profile).unwrap();
        assert!((sample.rpm - 5000.0).abs() < 0.01);
        assert!((sample.rpm_max - 8000.0).abs() < 0.01);
        assert_eq!(sample.sequence, Some(123_456));
        assert_eq!(sample.gear, None);
    }

    #[test]
    fn sled_speed_falls_back_to_velocity_magnitude() {
        let profile = ForzaProfile::default();
        let mut raw = make_packet(SLED_SIZE);
        write_f32(&mut raw, OFF_VEL_X, 3.0);
        write_f32(&mut raw, OFF_VEL_Z, 4.0);
        let sample = decode(&raw, &profile).unwrap();
        let speed = sample.speed_ms.unwrap();
        assert!((speed - 5.0).abs() < 0.001, "got {speed}");
    }

    #[test]
    fn cardash_gear_encoding() {
        let profile = ForzaProfile::default();
        let cases = [(0u8, -1i8), (1, 0), (2, 1), (7, 6)];
        for (wire, expected) in cases {
            let mut raw = make_packet(CARDASH_SIZE);
            raw[OFF_DASH_GEAR] = wire;
            let sample = decode(&raw, &profile).unwrap();
            assert_eq!(sample.gear, Some(expected), "wire gear {wire}");
        }
    }

    #[test]
    fn cardash_prefers_dash_speed() {
        let profile = ForzaProfile::default();
        let mut raw = make_packet(CARDASH_SIZE);
        write_f32(&mut raw, OFF_VEL_X, 100.0);
        write_f32(&mut raw, OFF_DASH_SPEED, 42.0);
        let sample = decode(&raw, &profile).unwrap();
        let speed = sample.speed_ms.unwrap();
        assert!((speed - 42.0).abs() < 0.001);
    }
}
