//! Codemasters "extradata" UDP decoder.
//!
//! Enable in-game: UDP telemetry on port 20777, extra data mode. The
//! packet is a flat array of little-endian `f32`s (256 bytes and up);
//! every field sits at a fixed byte offset declared by the
//! [`DirtProfile`]. The wire engine-rate field carries RPM divided by a
//! title-specific factor, so the profile also declares the scale.

use revring_telemetry::{DecodeError, DirtProfile, SourceProtocol, TelemetrySample};

use crate::read_f32;

/// Decode one extradata datagram.
pub fn decode(data: &[u8], profile: &DirtProfile) -> Result<TelemetrySample, DecodeError> {
    if data.len() < profile.min_packet_len {
        return Err(DecodeError::TooShort {
            expected: profile.min_packet_len,
            actual: data.len(),
        });
    }

    let field = |offset: usize, name: &str| -> Result<f32, DecodeError> {
        read_f32(data, offset)
            .ok_or_else(|| DecodeError::Malformed(format!("{name} offset {offset} out of range")))
    };

    let time_s = field(profile.time_offset, "total time")?;
    let speed_ms = field(profile.speed_offset, "speed")?;
    let gear_raw = field(profile.gear_offset, "gear")?;
    let rpm_raw = field(profile.rpm_offset, "engine rate")?;
    let max_rpm_raw = field(profile.max_rpm_offset, "max rpm")?;

    let rpm = scale_rpm(rpm_raw, profile.rpm_scale);
    let max_rpm = scale_rpm(max_rpm_raw, profile.rpm_scale);

    let mut sample = TelemetrySample::new(SourceProtocol::Dirt, rpm)
        .with_rpm_max(max_rpm)
        .with_gear(decode_gear(gear_raw));

    if speed_ms.is_finite() {
        sample = sample.with_speed_ms(speed_ms.abs());
    }

    // Stage-relative time doubles as the ordering value (milliseconds).
    if time_s.is_finite() && time_s >= 0.0 {
        sample = sample.with_sequence((time_s * 1000.0) as u64);
    }

    Ok(sample)
}

fn scale_rpm(raw: f32, scale: f32) -> f32 {
    if raw.is_finite() && scale.is_finite() && scale > 0.0 {
        (raw * scale).max(0.0)
    } else {
        0.0
    }
}

/// Gear wire encoding: below 0.5 is reverse, 1.0 and up are forward
/// gears. The packet never distinguishes neutral.
fn decode_gear(raw: f32) -> i8 {
    if !raw.is_finite() || raw < 0.5 {
        -1
    } else {
        (raw.round() as i64).clamp(1, 9) as i8
    }
}
