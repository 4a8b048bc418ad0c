#![no_main]

use handsync_core::{BoneTopology, PoseSample};
use handsync_wire::{decode, encode, DecodedPose, WireConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    for bones in [1, 5, 24] {
        let Ok(topology) = BoneTopology::with_count(bones) else {
            return;
        };
        for config in [WireConfig::default(), WireConfig::legacy()] {
            // Anything that decodes must re-encode and decode to the same pose
            if let Ok(DecodedPose::Visible(rotations)) = decode(text, &topology, &config) {
                assert_eq!(rotations.len(), bones);
                let sample = PoseSample::valid(rotations);
                if let Ok(payload) = encode(&sample, &topology, &config) {
                    assert!(decode(payload.as_str(), &topology, &config).is_ok());
                }
            }
        }
    }
});
