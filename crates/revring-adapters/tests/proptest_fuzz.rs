//! Fuzz-style robustness tests for the decoder set.
//!
//! The selector sits directly on a broadcast socket, so arbitrary bytes
//! are first-class input: nothing here may panic, and byte sequences
//! that match no signature must yield no sample.

use proptest::prelude::*;
use revring_adapters::{ProtocolSelector, decode};
use revring_telemetry::{ProtocolProfile, SourceProtocol};

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(500))]

    /// Arbitrary bytes never panic any decoder.
    #[test]
    fn any_bytes_never_panic(data in proptest::collection::vec(any::<u8>(), 0..1024)) {
        for protocol in SourceProtocol::ALL {
            let profile = ProtocolProfile::default_for(protocol);
            let _ = decode(&data, &profile);
        }
    }

    /// Arbitrary bytes never panic the full selector either.
    #[test]
    fn selector_never_panics(data in proptest::collection::vec(any::<u8>(), 0..1024)) {
        let selector = ProtocolSelector::with_defaults();
        let _ = selector.select_and_decode(&data);
    }

    /// Every decoded sample satisfies the RPM domain invariant,
    /// whatever bytes produced it.
    #[test]
    fn decoded_rpm_is_always_non_negative_and_finite(
        data in proptest::collection::vec(any::<u8>(), 0..1024)
    ) {
        let selector = ProtocolSelector::with_defaults();
        if let Some(sample) = selector.select_and_decode(&data) {
            prop_assert!(sample.rpm.is_finite());
            prop_assert!(sample.rpm >= 0.0);
            prop_assert!(sample.rpm_max.is_finite());
            prop_assert!(sample.rpm_max >= 0.0);
        }
    }

    /// Short datagrams (below every binary minimum, invalid JSON) match
    /// no signature.
    #[test]
    fn short_binary_noise_yields_no_sample(
        data in proptest::collection::vec(any::<u8>(), 1..100)
    ) {
        // Exclude anything that happens to be valid bridge JSON.
        prop_assume!(serde_json::from_slice::<serde_json::Value>(&data).is_err());
        let selector = ProtocolSelector::with_defaults();
        prop_assert_eq!(selector.select_and_decode(&data), None);
    }
}
