//! Decoder error contract.

use thiserror::Error;

/// Why a decoder declined to produce a sample from a datagram.
///
/// None of these are faults: on a broadcast network, foreign and
/// malformed traffic is expected background noise. The selector drops
/// datagrams that every decoder rejects and the loop carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The datagram does not carry this protocol's signature; another
    /// decoder may still accept it.
    #[error("datagram does not match this protocol")]
    NotThisProtocol,

    /// The datagram matches the protocol but is truncated.
    #[error("packet too short: need at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    /// Recognized traffic that carries no shift-light data (menu
    /// packets, non-telemetry message types). Decoded and ignored.
    #[error("recognized message carries no shift-light data")]
    Ignored,

    /// The datagram matches the protocol's shape but its content is
    /// uninterpretable.
    #[error("malformed packet: {0}")]
    Malformed(String),
}
