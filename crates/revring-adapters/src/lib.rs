//! Game-specific telemetry packet decoders.
//!
//! One module per supported wire protocol plus the [`ProtocolSelector`]
//! that tries active decoders in priority order. Decoders are pure
//! functions of the raw bytes and the static [`ProtocolProfile`]: no
//! shared mutable state, so they can be attempted concurrently and unit
//! tested against captured byte fixtures.

#![deny(static_mut_refs)]

pub mod bridge;
pub mod dirt;
pub mod forza;
pub mod selector;

pub use revring_telemetry::{DecodeError, ProtocolProfile, SourceProtocol, TelemetrySample};
pub use selector::ProtocolSelector;

/// Decode one datagram against one protocol profile.
///
/// Dispatches to the decoder matching the profile variant. This is the
/// whole of the protocol polymorphism: adding a game adds a variant and
/// a module, not selector control flow.
pub fn decode(raw: &[u8], profile: &ProtocolProfile) -> Result<TelemetrySample, DecodeError> {
    match profile {
        ProtocolProfile::Dirt(p) => dirt::decode(raw, p),
        ProtocolProfile::Forza(p) => forza::decode(raw, p),
        ProtocolProfile::Bridge(p) => bridge::decode(raw, p),
    }
}

/// Read a little-endian `f32` from `data` at `offset`. Returns `None`
/// if out of bounds.
pub(crate) fn read_f32(data: &[u8], offset: usize) -> Option<f32> {
    data.get(offset..offset.checked_add(4)?)
        .and_then(|b| b.try_into().ok())
        .map(f32::from_le_bytes)
}

/// Read a little-endian `i32` from `data` at `offset`.
pub(crate) fn read_i32(data: &[u8], offset: usize) -> Option<i32> {
    data.get(offset..offset.checked_add(4)?)
        .and_then(|b| b.try_into().ok())
        .map(i32::from_le_bytes)
}

/// Read a little-endian `u32` from `data` at `offset`.
pub(crate) fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    data.get(offset..offset.checked_add(4)?)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
}
