use std::collections::VecDeque;

/// Fixed-capacity window over the most recent feature samples. Smooths
/// the continuous estimate independently of how much timed history the
/// session retains.
#[derive(Clone, Debug)]
pub struct RollingWindow {
    entries: VecDeque<RollingEntry>,
    capacity: usize,
}

#[derive(Clone, Copy, Debug)]
struct RollingEntry {
    volume: f32,
    pitch: Option<f32>,
}

/// Averages over the rolling window. `avg_pitch` covers voiced entries
/// only and is 0 when none are voiced; `samples` is the window fill,
/// not the voiced count.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RollingAverages {
    pub avg_volume: f32,
    pub avg_pitch: f32,
    pub samples: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, volume: f32, pitch: Option<f32>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(RollingEntry { volume, pitch });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn averages(&self) -> RollingAverages {
        if self.entries.is_empty() {
            return RollingAverages::default();
        }
        let avg_volume =
            self.entries.iter().map(|e| e.volume).sum::<f32>() / self.entries.len() as f32;
        let voiced: Vec<f32> = self
            .entries
            .iter()
            .filter_map(|e| e.pitch)
            .filter(|p| *p > 0.0)
            .collect();
        let avg_pitch = if voiced.is_empty() {
            0.0
        } else {
            voiced.iter().sum::<f32>() / voiced.len() as f32
        };
        RollingAverages {
            avg_volume,
            avg_pitch,
            samples: self.entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_the_newest_entries() {
        let mut window = RollingWindow::new(3);
        for volume in [10.0, 20.0, 30.0, 40.0] {
            window.push(volume, None);
        }
        assert_eq!(window.len(), 3);
        let averages = window.averages();
        assert!((averages.avg_volume - 30.0).abs() < 1e-4);
    }

    #[test]
    fn pitch_average_skips_unvoiced_entries() {
        let mut window = RollingWindow::new(4);
        window.push(10.0, Some(100.0));
        window.push(10.0, None);
        window.push(10.0, Some(200.0));
        let averages = window.averages();
        assert_eq!(averages.samples, 3);
        assert!((averages.avg_pitch - 150.0).abs() < 1e-4);
    }

    #[test]
    fn all_unvoiced_reports_zero_pitch() {
        let mut window = RollingWindow::new(4);
        window.push(25.0, None);
        window.push(35.0, None);
        let averages = window.averages();
        assert_eq!(averages.avg_pitch, 0.0);
        assert!((averages.avg_volume - 30.0).abs() < 1e-4);
    }

    #[test]
    fn empty_window_is_all_zero() {
        let window = RollingWindow::new(10);
        assert!(window.is_empty());
        assert_eq!(window.averages(), RollingAverages::default());
    }
}
