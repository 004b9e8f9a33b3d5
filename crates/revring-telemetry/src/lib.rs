//! Telemetry domain model and device state for the RevRing shift light.
//!
//! This crate holds the types shared by every layer of the device:
//! the normalized [`TelemetrySample`] produced by protocol decoders,
//! the [`DecodeError`] contract those decoders report through, the
//! static per-game [`ProtocolProfile`] descriptions, and the single
//! authoritative [`TelemetryState`] the scheduler loop owns.
//!
//! ## Modules
//! - `sample` - normalized telemetry snapshot types
//! - `error` - decoder error contract
//! - `profile` - static per-protocol wire descriptions
//! - `state` - smoothed, staleness-aware device state

#![deny(static_mut_refs)]

pub mod error;
pub mod profile;
pub mod sample;
pub mod state;

pub use error::DecodeError;
pub use profile::{BridgeProfile, DirtProfile, ForzaProfile, ProtocolProfile};
pub use sample::{SourceProtocol, TelemetrySample, gear_label};
pub use state::{StateConfig, TelemetryState, TelemetryView};
