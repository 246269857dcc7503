use super::PitchDetector;

const DEFAULT_HARMONIC_THRESHOLD: f32 = 0.15;
const DEFAULT_MIN_FREQUENCY_HZ: f32 = 60.0;
const DEFAULT_MAX_FREQUENCY_HZ: f32 = 500.0;

/// YIN fundamental-frequency estimator (de Cheveigne & Kawahara 2002).
///
/// The frame is autocorrelated through the squared-difference function,
/// normalized by its cumulative mean, and the first lag dipping under
/// the harmonic threshold is refined by parabolic interpolation. Frames
/// without such a dip, which includes silence and noise, come back
/// `None`.
#[derive(Clone, Debug)]
pub struct YinPitchDetector {
    harmonic_threshold: f32,
    min_frequency_hz: f32,
    max_frequency_hz: f32,
}

impl YinPitchDetector {
    pub fn new(harmonic_threshold: f32, min_frequency_hz: f32, max_frequency_hz: f32) -> Self {
        Self {
            harmonic_threshold,
            min_frequency_hz,
            max_frequency_hz,
        }
    }
}

impl Default for YinPitchDetector {
    fn default() -> Self {
        Self::new(
            DEFAULT_HARMONIC_THRESHOLD,
            DEFAULT_MIN_FREQUENCY_HZ,
            DEFAULT_MAX_FREQUENCY_HZ,
        )
    }
}

impl PitchDetector for YinPitchDetector {
    fn detect(&self, samples: &[f32], sample_rate_hz: u32) -> Option<f32> {
        if sample_rate_hz == 0 || self.min_frequency_hz <= 0.0 || self.max_frequency_hz <= 0.0 {
            return None;
        }
        if samples.iter().any(|s| !s.is_finite()) {
            return None;
        }

        let sr = sample_rate_hz as f32;
        let tau_min = ((sr / self.max_frequency_hz) as usize).max(2);
        let tau_max = ((sr / self.min_frequency_hz).ceil() as usize).min(samples.len() / 2);
        // The search range needs room for the dip and its neighbors.
        if tau_min + 2 > tau_max {
            return None;
        }

        let diff = difference(samples, tau_max);
        let cmnd = cumulative_mean_normalized(&diff);
        let tau = absolute_threshold(&cmnd, tau_min, self.harmonic_threshold)?;
        let refined = parabolic_interpolation(&cmnd, tau);
        if refined <= 0.0 {
            return None;
        }
        let frequency = sr / refined;
        (frequency.is_finite() && frequency > 0.0).then_some(frequency)
    }
}

/// Squared-difference function d(tau) over a half-frame window, so every
/// lag compares the same number of sample pairs.
fn difference(samples: &[f32], tau_max: usize) -> Vec<f32> {
    let window = samples.len() / 2;
    let mut d = vec![0.0f32; tau_max];
    for (tau, slot) in d.iter_mut().enumerate().skip(1) {
        let mut sum = 0.0f32;
        for i in 0..window {
            let delta = samples[i] - samples[i + tau];
            sum += delta * delta;
        }
        *slot = sum;
    }
    d
}

/// d'(tau): d(tau) normalized by its running mean, with d'(0) = 1.
fn cumulative_mean_normalized(diff: &[f32]) -> Vec<f32> {
    let mut out = vec![1.0f32; diff.len()];
    let mut running = 0.0f32;
    for tau in 1..diff.len() {
        running += diff[tau];
        out[tau] = if running > 0.0 {
            diff[tau] * tau as f32 / running
        } else {
            1.0
        };
    }
    out
}

/// First lag where d' dips under the threshold, walked forward to the
/// bottom of that dip.
fn absolute_threshold(cmnd: &[f32], tau_min: usize, threshold: f32) -> Option<usize> {
    let mut tau = tau_min;
    while tau < cmnd.len() {
        if cmnd[tau] < threshold {
            while tau + 1 < cmnd.len() && cmnd[tau + 1] < cmnd[tau] {
                tau += 1;
            }
            return Some(tau);
        }
        tau += 1;
    }
    None
}

/// Refines an integer lag by fitting a parabola through its neighbors.
fn parabolic_interpolation(cmnd: &[f32], tau: usize) -> f32 {
    if tau == 0 || tau + 1 >= cmnd.len() {
        return tau as f32;
    }
    let (left, center, right) = (cmnd[tau - 1], cmnd[tau], cmnd[tau + 1]);
    let denominator = left + right - 2.0 * center;
    if denominator.abs() < f32::EPSILON {
        return tau as f32;
    }
    let adjustment = 0.5 * (left - right) / denominator;
    tau as f32 + adjustment.clamp(-1.0, 1.0)
}
