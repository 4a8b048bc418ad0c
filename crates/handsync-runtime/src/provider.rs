//! Tracking provider - source of raw hand poses on the authoritative side

use handsync_core::TrackedPose;

/// Yields one pose sample per call
pub trait TrackingProvider {
    fn pose_sample(&mut self) -> TrackedPose;
}

impl<F> TrackingProvider for F
where
    F: FnMut() -> TrackedPose,
{
    fn pose_sample(&mut self) -> TrackedPose {
        self()
    }
}

/// Replays a fixed list of samples, repeating the last one
#[derive(Debug, Clone)]
pub struct ScriptedProvider {
    samples: Vec<TrackedPose>,
    cursor: usize,
}

impl ScriptedProvider {
    pub fn new(samples: Vec<TrackedPose>) -> Self {
        Self { samples, cursor: 0 }
    }
}

impl TrackingProvider for ScriptedProvider {
    fn pose_sample(&mut self) -> TrackedPose {
        let sample = match self.samples.get(self.cursor) {
            Some(sample) => sample.clone(),
            None => self.samples.last().cloned().unwrap_or_default(),
        };
        self.cursor = (self.cursor + 1).min(self.samples.len());
        sample
    }
}
