//! Priority-ordered protocol selection.

use revring_telemetry::{ProtocolProfile, SourceProtocol, TelemetrySample};
use tracing::trace;

use crate::decode;

/// Tries each active decoder in configured priority order and forwards
/// the first successful sample.
///
/// When several profiles are active and more than one could plausibly
/// decode the same datagram, priority order wins — the first decoder
/// that produces a sample ends the attempt. Datagrams every decoder
/// rejects are dropped silently: on a broadcast network, foreign
/// traffic is background noise, not a fault.
#[derive(Debug, Clone)]
pub struct ProtocolSelector {
    profiles: Vec<ProtocolProfile>,
}

impl ProtocolSelector {
    /// Create a selector over the given profiles, in priority order.
    pub fn new(profiles: Vec<ProtocolProfile>) -> Self {
        Self { profiles }
    }

    /// Selector over all supported protocols with default profiles.
    pub fn with_defaults() -> Self {
        Self::new(
            SourceProtocol::ALL
                .into_iter()
                .map(ProtocolProfile::default_for)
                .collect(),
        )
    }

    /// Active profiles, in priority order.
    pub fn profiles(&self) -> &[ProtocolProfile] {
        &self.profiles
    }

    /// Decode one datagram against the active profiles.
    ///
    /// Returns the first successful decode, or `None` when every
    /// decoder declines. Never mutates device state; committing the
    /// sample is the scheduler's job.
    pub fn select_and_decode(&self, raw: &[u8]) -> Option<TelemetrySample> {
        for profile in &self.profiles {
            match decode(raw, profile) {
                Ok(sample) => return Some(sample),
                Err(error) => {
                    trace!(
                        protocol = %profile.protocol(),
                        %error,
                        len = raw.len(),
                        "decoder declined datagram"
                    );
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revring_telemetry::{BridgeProfile, DirtProfile};

    fn dirt_packet(rpm_wire: f32) -> Vec<u8> {
        let p = DirtProfile::default();
        let mut raw = vec![0u8; p.min_packet_len];
        raw[p.rpm_offset..p.rpm_offset + 4].copy_from_slice(&rpm_wire.to_le_bytes());
        raw
    }

    #[test]
    fn garbage_yields_no_sample() {
        let selector = ProtocolSelector::with_defaults();
        assert_eq!(selector.select_and_decode(&[]), None);
        assert_eq!(selector.select_and_decode(&[0xde, 0xad, 0xbe, 0xef]), None);
        assert_eq!(selector.select_and_decode(&vec![0x55u8; 100]), None);
    }

    #[test]
    fn first_matching_decoder_wins() {
        let selector = ProtocolSelector::with_defaults();
        let sample = selector.select_and_decode(&dirt_packet(600.0)).unwrap();
        assert_eq!(sample.source, SourceProtocol::Dirt);
        assert!((sample.rpm - 6000.0).abs() < 0.01);
    }

    #[test]
    fn inactive_protocols_are_never_tried() {
        let selector = ProtocolSelector::new(vec![ProtocolProfile::Bridge(
            BridgeProfile::default(),
        )]);
        // A valid dirt packet must not decode when only the bridge
        // profile is active.
        assert_eq!(selector.select_and_decode(&dirt_packet(600.0)), None);
    }

    #[test]
    fn bridge_sample_decodes_through_selector() {
        let selector = ProtocolSelector::with_defaults();
        let data = br#"{"Type":"Telemetry","Rpms":3000.0}"#;
        let sample = selector.select_and_decode(data).unwrap();
        assert_eq!(sample.source, SourceProtocol::Bridge);
    }

    #[test]
    fn empty_selector_decodes_nothing() {
        let selector = ProtocolSelector::new(Vec::new());
        assert_eq!(selector.select_and_decode(&dirt_packet(600.0)), None);
    }
}
