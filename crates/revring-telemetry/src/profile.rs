//! Static per-protocol wire descriptions.
//!
//! A [`ProtocolProfile`] is configuration data, not runtime state: the
//! UDP port to listen on plus whatever layout parameters the matching
//! decoder needs. Profiles are read-only after load.

use serde::{Deserialize, Serialize};

use crate::sample::SourceProtocol;

/// Codemasters "extradata" layout parameters.
///
/// The packet is a flat array of little-endian `f32`s. Byte offsets and
/// the wire RPM scale vary between titles and UDP modes, so they live
/// here rather than in the decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirtProfile {
    /// UDP port the game broadcasts on.
    pub port: u16,
    /// Wire engine-rate values are RPM divided by this factor.
    pub rpm_scale: f32,
    /// Byte offset of the stage-relative total time (f32 seconds).
    pub time_offset: usize,
    /// Byte offset of vehicle speed (f32 m/s).
    pub speed_offset: usize,
    /// Byte offset of the gear field (f32; below 0.5 encodes reverse).
    pub gear_offset: usize,
    /// Byte offset of the engine rate field (f32, scaled RPM).
    pub rpm_offset: usize,
    /// Byte offset of the rev-ceiling field (f32, scaled RPM).
    pub max_rpm_offset: usize,
    /// Minimum packet length in bytes.
    pub min_packet_len: usize,
}

impl Default for DirtProfile {
    fn default() -> Self {
        Self {
            port: 20777,
            rpm_scale: 10.0,
            time_offset: 0,
            speed_offset: 28,
            gear_offset: 132,
            rpm_offset: 148,
            max_rpm_offset: 240,
            min_packet_len: 256,
        }
    }
}

/// Forza "Data Out" parameters. The Sled/CarDash layouts are fixed by
/// the game, so only the port is tunable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForzaProfile {
    /// UDP port configured in the game's Data Out settings.
    pub port: u16,
}

impl Default for ForzaProfile {
    fn default() -> Self {
        Self { port: 5300 }
    }
}

/// JSON dashboard-bridge parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeProfile {
    /// UDP port the bridge sends to.
    pub port: u16,
}

impl Default for BridgeProfile {
    fn default() -> Self {
        Self { port: 5555 }
    }
}

/// Static description of one game's telemetry wire format.
///
/// One variant per supported protocol; the selector dispatches on the
/// variant, so adding a game adds a variant plus its decoder and never
/// touches selection control flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "protocol", rename_all = "snake_case")]
pub enum ProtocolProfile {
    Dirt(DirtProfile),
    Forza(ForzaProfile),
    Bridge(BridgeProfile),
}

impl ProtocolProfile {
    /// Default profile for a protocol.
    pub fn default_for(protocol: SourceProtocol) -> Self {
        match protocol {
            SourceProtocol::Dirt => ProtocolProfile::Dirt(DirtProfile::default()),
            SourceProtocol::Forza => ProtocolProfile::Forza(ForzaProfile::default()),
            SourceProtocol::Bridge => ProtocolProfile::Bridge(BridgeProfile::default()),
        }
    }

    /// The protocol this profile describes.
    pub fn protocol(&self) -> SourceProtocol {
        match self {
            ProtocolProfile::Dirt(_) => SourceProtocol::Dirt,
            ProtocolProfile::Forza(_) => SourceProtocol::Forza,
            ProtocolProfile::Bridge(_) => SourceProtocol::Bridge,
        }
    }

    /// The UDP port this profile listens on.
    pub fn port(&self) -> u16 {
        match self {
            ProtocolProfile::Dirt(p) => p.port,
            ProtocolProfile::Forza(p) => p.port,
            ProtocolProfile::Bridge(p) => p.port,
        }
    }

    /// Override the UDP port.
    pub fn with_port(mut self, port: u16) -> Self {
        match &mut self {
            ProtocolProfile::Dirt(p) => p.port = port,
            ProtocolProfile::Forza(p) => p.port = port,
            ProtocolProfile::Bridge(p) => p.port = port,
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profiles_use_well_known_ports() {
        assert_eq!(
            ProtocolProfile::default_for(SourceProtocol::Dirt).port(),
            20777
        );
        assert_eq!(
            ProtocolProfile::default_for(SourceProtocol::Forza).port(),
            5300
        );
        assert_eq!(
            ProtocolProfile::default_for(SourceProtocol::Bridge).port(),
            5555
        );
    }

    #[test]
    fn with_port_overrides_any_variant() {
        for protocol in SourceProtocol::ALL {
            let profile = ProtocolProfile::default_for(protocol).with_port(9999);
            assert_eq!(profile.port(), 9999);
            assert_eq!(profile.protocol(), protocol);
        }
    }
}
