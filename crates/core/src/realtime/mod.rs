use crate::classify::{classify, Classification, FeatureSnapshot};
use crate::store::RollingAverages;

/// Continuous-mode classification over a session's rolling averages.
///
/// Until the window holds `min_samples` entries the estimate is pinned
/// to neutral; a couple of chunks are not enough smoothing to commit to
/// anything stronger. Continuous mode carries no speech-rate signal, so
/// the classifier always sees wpm 0 here.
#[derive(Clone, Copy, Debug)]
pub struct RealtimeAggregator {
    min_samples: usize,
}

impl RealtimeAggregator {
    pub fn new(min_samples: usize) -> Self {
        Self { min_samples }
    }

    pub fn evaluate(&self, averages: &RollingAverages) -> Classification {
        if averages.samples < self.min_samples {
            return Classification::neutral(FeatureSnapshot {
                volume: averages.avg_volume,
                pitch: averages.avg_pitch,
                wpm: 0.0,
            });
        }
        classify(averages.avg_volume, averages.avg_pitch, 0.0)
    }
}
