//! Pose payload encoding and decoding
//!
//! Decoding is all-or-nothing: every field a topology needs is parsed before
//! any rotation is handed back, so a truncated or corrupt payload never yields
//! a partial pose.

use std::fmt;

use handsync_core::{BoneTopology, EulerAngles, PoseSample, SyncError, SyncResult};

use crate::{parse_field, FloatFormat, UnknownFlagPolicy, ValidityFlag, WireConfig, DELIMITER};

/// Payload sent while the pose is invalid
pub const HIDDEN_PAYLOAD: &str = "0|";

/// Rough upper bound for one written angle, used to size buffers
const FIELD_CAPACITY: usize = 10;

/// Serialized pose, as carried by the channel
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WirePayload(String);

impl WirePayload {
    pub fn hidden() -> Self {
        WirePayload(HIDDEN_PAYLOAD.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flag of this payload, if it carries a recognized one
    pub fn flag(&self) -> Option<ValidityFlag> {
        self.0.split(DELIMITER).next().and_then(ValidityFlag::parse)
    }
}

impl fmt::Display for WirePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<WirePayload> for String {
    fn from(payload: WirePayload) -> Self {
        payload.0
    }
}

impl AsRef<str> for WirePayload {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Incremental writer for a visible payload.
///
/// Lets a caller emit each bone as soon as it has produced it, so driving the
/// local rig and encoding stay one pass.
#[derive(Debug)]
pub struct PayloadWriter {
    buf: String,
    format: FloatFormat,
    bones: usize,
}

impl PayloadWriter {
    /// Start a `1|` payload sized for `bone_capacity` bones
    pub fn visible(format: FloatFormat, bone_capacity: usize) -> Self {
        let mut buf = String::with_capacity(2 + bone_capacity * 3 * FIELD_CAPACITY);
        buf.push_str(ValidityFlag::Visible.as_str());
        buf.push(DELIMITER);
        PayloadWriter {
            buf,
            format,
            bones: 0,
        }
    }

    /// Append the next bone's x, y, z fields
    pub fn push_bone(&mut self, euler: EulerAngles) -> SyncResult<()> {
        if !euler.is_finite() {
            return Err(SyncError::NonFiniteRotation { bone: self.bones });
        }
        for angle in euler.to_array() {
            self.format.write(angle, &mut self.buf);
            self.buf.push(DELIMITER);
        }
        self.bones += 1;
        Ok(())
    }

    /// Bones written so far
    pub fn bones(&self) -> usize {
        self.bones
    }

    pub fn finish(self) -> WirePayload {
        WirePayload(self.buf)
    }
}

/// Encode a pose sample.
///
/// An invalid sample always yields `0|`, whatever the topology. A valid one
/// must carry exactly one rotation per bone.
pub fn encode(
    sample: &PoseSample,
    topology: &BoneTopology,
    config: &WireConfig,
) -> SyncResult<WirePayload> {
    if !sample.valid {
        return Ok(WirePayload::hidden());
    }
    sample.check(topology)?;

    let mut writer = PayloadWriter::visible(config.float_format, topology.len());
    for euler in &sample.rotations {
        writer.push_bone(*euler)?;
    }
    Ok(writer.finish())
}

/// Result of decoding one payload
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedPose {
    /// Hand hidden; no rotations were read
    Hidden,
    /// One rotation per topology bone, topology order
    Visible(Vec<EulerAngles>),
}

impl DecodedPose {
    pub fn is_visible(&self) -> bool {
        matches!(self, DecodedPose::Visible(_))
    }
}

/// Decode a payload against the receiver's topology.
///
/// A `0` flag short-circuits: later fields are neither read nor validated.
/// For `1`, the first `3 * N` fields after the flag must all parse; fields past
/// those are ignored.
pub fn decode(text: &str, topology: &BoneTopology, config: &WireConfig) -> SyncResult<DecodedPose> {
    if text.is_empty() {
        return Err(SyncError::EmptyPayload);
    }

    let tokens: Vec<&str> = text.split(DELIMITER).collect();
    let flag_token = tokens[0];
    if flag_token.is_empty() {
        return Err(SyncError::MissingFlag);
    }

    match ValidityFlag::parse(flag_token) {
        Some(ValidityFlag::Hidden) => return Ok(DecodedPose::Hidden),
        Some(ValidityFlag::Visible) => {}
        None => {
            return match config.unknown_flag {
                UnknownFlagPolicy::Hide => Ok(DecodedPose::Hidden),
                UnknownFlagPolicy::Reject => Err(SyncError::UnknownFlag(flag_token.to_string())),
            };
        }
    }

    let expected = 1 + topology.field_count();
    if tokens.len() < expected {
        return Err(SyncError::TokenCount {
            expected,
            actual: tokens.len(),
        });
    }

    let mut rotations = Vec::with_capacity(topology.len());
    for bone in 0..topology.len() {
        let base = 1 + bone * 3;
        rotations.push(EulerAngles::new(
            parse_field(tokens[base], base)?,
            parse_field(tokens[base + 1], base + 1)?,
            parse_field(tokens[base + 2], base + 2)?,
        ));
    }

    Ok(DecodedPose::Visible(rotations))
}

/// Non-empty fields a visible payload carries beyond what `topology` reads.
///
/// Non-zero usually means the sender bound a larger skeleton.
pub fn surplus_fields(text: &str, topology: &BoneTopology) -> usize {
    text.split(DELIMITER)
        .skip(1 + topology.field_count())
        .filter(|t| !t.is_empty())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_bones() -> BoneTopology {
        BoneTopology::with_count(2).unwrap()
    }

    #[test]
    fn test_encode_example() {
        let sample = PoseSample::valid(vec![
            EulerAngles::new(10.5, 0.0, 0.0),
            EulerAngles::new(0.0, 0.0, 90.25),
        ]);
        let payload = encode(&sample, &two_bones(), &WireConfig::default()).unwrap();
        assert_eq!(payload.as_str(), "1|10.5|0|0|0|0|90.25|");
        assert_eq!(payload.flag(), Some(ValidityFlag::Visible));
    }

    #[test]
    fn test_encode_invalid_ignores_topology() {
        for n in [1, 5, 24] {
            let topology = BoneTopology::with_count(n).unwrap();
            let mut sample = PoseSample::invalid();
            sample.rotations = vec![EulerAngles::new(1.0, 2.0, 3.0); 3];
            let payload = encode(&sample, &topology, &WireConfig::default()).unwrap();
            assert_eq!(payload.as_str(), "0|");
        }
    }

    #[test]
    fn test_encode_rejects_wrong_count() {
        let sample = PoseSample::valid(vec![EulerAngles::zero(); 3]);
        assert_eq!(
            encode(&sample, &two_bones(), &WireConfig::default()),
            Err(SyncError::TopologyMismatch {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn test_encode_rejects_nan() {
        let sample = PoseSample::valid(vec![
            EulerAngles::zero(),
            EulerAngles::new(0.0, f32::NAN, 0.0),
        ]);
        assert_eq!(
            encode(&sample, &two_bones(), &WireConfig::default()),
            Err(SyncError::NonFiniteRotation { bone: 1 })
        );
    }

    #[test]
    fn test_decode_example() {
        let decoded = decode("1|10.5|0|0|0|0|90.25|", &two_bones(), &WireConfig::default()).unwrap();
        assert_eq!(
            decoded,
            DecodedPose::Visible(vec![
                EulerAngles::new(10.5, 0.0, 0.0),
                EulerAngles::new(0.0, 0.0, 90.25),
            ])
        );
    }

    #[test]
    fn test_decode_hidden_skips_fields() {
        let config = WireConfig::default();
        assert_eq!(decode("0|", &two_bones(), &config), Ok(DecodedPose::Hidden));
        assert_eq!(decode("0|1|2|3|", &two_bones(), &config), Ok(DecodedPose::Hidden));
        assert_eq!(decode("0|garbage", &two_bones(), &config), Ok(DecodedPose::Hidden));
        assert_eq!(decode("0", &two_bones(), &config), Ok(DecodedPose::Hidden));
    }

    #[test]
    fn test_decode_too_few_fields() {
        assert_eq!(
            decode("1|10|20|", &two_bones(), &WireConfig::default()),
            Err(SyncError::TokenCount {
                expected: 7,
                actual: 4
            })
        );
    }

    #[test]
    fn test_decode_non_numeric() {
        let err = decode("1|10|x|0|0|0|0|", &two_bones(), &WireConfig::default()).unwrap_err();
        assert_eq!(
            err,
            SyncError::InvalidNumber {
                index: 2,
                token: "x".into()
            }
        );
        assert!(err.is_malformed());
    }

    #[test]
    fn test_decode_missing_last_delimiter() {
        let decoded = decode("1|1|2|3|4|5|6", &two_bones(), &WireConfig::default()).unwrap();
        assert!(decoded.is_visible());
    }

    #[test]
    fn test_decode_empty_and_missing_flag() {
        let config = WireConfig::default();
        assert_eq!(decode("", &two_bones(), &config), Err(SyncError::EmptyPayload));
        assert_eq!(
            decode("|1|2|3|4|5|6|", &two_bones(), &config),
            Err(SyncError::MissingFlag)
        );
    }

    #[test]
    fn test_unknown_flag_policies() {
        let text = "2|1|2|3|4|5|6|";
        assert_eq!(
            decode(text, &two_bones(), &WireConfig::default()),
            Err(SyncError::UnknownFlag("2".into()))
        );
        assert_eq!(
            decode(text, &two_bones(), &WireConfig::legacy()),
            Ok(DecodedPose::Hidden)
        );
    }

    #[test]
    fn test_surplus_fields() {
        let one_bone = BoneTopology::with_count(1).unwrap();
        assert_eq!(surplus_fields("1|1|2|3|", &one_bone), 0);
        assert_eq!(surplus_fields("1|1|2|3|4|5|6|", &one_bone), 3);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn angle() -> impl Strategy<Value = f32> {
            (0u32..3_600_000).prop_map(|v| v as f32 / 10_000.0)
        }

        fn rotations() -> impl Strategy<Value = Vec<EulerAngles>> {
            prop::collection::vec(
                (angle(), angle(), angle()).prop_map(|(x, y, z)| EulerAngles::new(x, y, z)),
                1..32,
            )
        }

        proptest! {
            #[test]
            fn decode_inverts_encode(rots in rotations()) {
                let topology = BoneTopology::with_count(rots.len()).unwrap();
                for config in [WireConfig::default(), WireConfig::legacy(), WireConfig::compact()] {
                    let payload = encode(&PoseSample::valid(rots.clone()), &topology, &config).unwrap();
                    prop_assert_eq!(payload.as_str().matches(DELIMITER).count(), 1 + topology.field_count());

                    let decoded = decode(payload.as_str(), &topology, &config).unwrap();
                    let DecodedPose::Visible(back) = decoded else {
                        panic!("visible payload decoded as hidden");
                    };
                    let tolerance = config.float_format.tolerance();
                    for (a, b) in rots.iter().zip(&back) {
                        for (x, y) in a.to_array().into_iter().zip(b.to_array()) {
                            prop_assert!((x - y).abs() <= tolerance, "{} vs {}", x, y);
                        }
                    }
                }
            }

            #[test]
            fn decode_never_panics(text in ".{0,64}", n in 1usize..6) {
                let topology = BoneTopology::with_count(n).unwrap();
                let _ = decode(&text, &topology, &WireConfig::default());
            }

            #[test]
            fn truncation_is_rejected(rots in rotations(), cut in 0usize..64) {
                let topology = BoneTopology::with_count(rots.len()).unwrap();
                let config = WireConfig::default();
                let payload = encode(&PoseSample::valid(rots), &topology, &config).unwrap();
                let fields: Vec<&str> = payload.as_str().split(DELIMITER).collect();
                let keep = 1 + cut % topology.field_count();
                let truncated = fields[..keep].join("|");
                prop_assert!(decode(&truncated, &topology, &config).is_err());
            }
        }
    }
}
