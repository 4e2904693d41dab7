use glam::Vec3;
use std::collections::VecDeque;
use thiserror::Error;

/// Why a hit-test sample was refused.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SampleRejection {
    #[error("Sample too close to the observer ({distance:.2} m)")]
    TooClose { distance: f32 },
    #[error("Sample too far from the observer ({distance:.2} m)")]
    TooFar { distance: f32 },
}

/// Sliding window over recent hit-test positions.
///
/// The window is stable once it is full and every sample lies strictly
/// within `threshold` of the window mean.
pub struct PoseSampleFilter {
    window: VecDeque<Vec3>,
    capacity: usize,
    threshold: f32,
    min_distance: f32,
    max_distance: f32,
}

impl PoseSampleFilter {
    pub fn new(capacity: usize, threshold: f32) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity + 1),
            capacity,
            threshold,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
        }
    }

    /// Restrict accepted samples to `min..=max` meters from the observer.
    pub fn with_range(mut self, min: f32, max: f32) -> Self {
        self.min_distance = min;
        self.max_distance = max;
        self
    }

    /// Append a sample, evicting the oldest once the window is over capacity.
    ///
    /// A sample farther than `threshold` from the current mean starts a new
    /// window, so stability needs a full run of consistent samples again.
    pub fn ingest(&mut self, sample: Vec3) {
        if !self.window.is_empty() && sample.distance(self.mean_position()) > self.threshold {
            self.window.clear();
        }
        self.window.push_back(sample);
        while self.window.len() > self.capacity {
            self.window.pop_front();
        }
    }

    /// Range-check a sample against the observer, then ingest it.
    ///
    /// A rejected sample also clears the window, so stability has to be
    /// rebuilt from samples taken under the new conditions.
    pub fn ingest_from(&mut self, sample: Vec3, observer: Vec3) -> Result<(), SampleRejection> {
        let distance = sample.distance(observer);
        let rejection = if distance < self.min_distance {
            Some(SampleRejection::TooClose { distance })
        } else if distance > self.max_distance {
            Some(SampleRejection::TooFar { distance })
        } else {
            None
        };

        match rejection {
            Some(reason) => {
                self.reset();
                Err(reason)
            }
            None => {
                self.ingest(sample);
                Ok(())
            }
        }
    }

    pub fn is_stable(&self) -> bool {
        self.is_full() && self.max_deviation() < self.threshold
    }

    /// Arithmetic mean of the window, zero when empty.
    pub fn mean_position(&self) -> Vec3 {
        if self.window.is_empty() {
            return Vec3::ZERO;
        }
        let sum: Vec3 = self.window.iter().copied().sum();
        sum / self.window.len() as f32
    }

    /// Largest distance of any sample from the mean, zero when empty.
    pub fn max_deviation(&self) -> f32 {
        let mean = self.mean_position();
        self.window
            .iter()
            .map(|p| p.distance(mean))
            .fold(0.0, f32::max)
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.window.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_never_exceeds_capacity() {
        let mut filter = PoseSampleFilter::new(4, 100.0);
        for i in 0..20 {
            filter.ingest(Vec3::new(i as f32, 0.0, 0.0));
            assert!(filter.len() <= 4);
            if i >= 3 {
                assert_eq!(filter.len(), 4);
            }
        }
        // Oldest evicted first: 16..=19 remain.
        assert!((filter.mean_position().x - 17.5).abs() < 1e-5);
    }

    #[test]
    fn three_close_samples_are_stable() {
        let mut filter = PoseSampleFilter::new(3, 0.01);
        filter.ingest(Vec3::new(0.0, 0.0, 0.0));
        filter.ingest(Vec3::new(0.002, 0.0, 0.0));
        filter.ingest(Vec3::new(0.0, 0.001, 0.002));

        assert!(filter.is_stable());
        let mean = filter.mean_position();
        assert!((mean.x - 0.000_667).abs() < 1e-6);
        assert!((mean.y - 0.000_333).abs() < 1e-6);
        assert!((mean.z - 0.000_667).abs() < 1e-6);
    }

    #[test]
    fn partial_window_is_not_stable() {
        let mut filter = PoseSampleFilter::new(3, 0.01);
        filter.ingest(Vec3::ZERO);
        filter.ingest(Vec3::ZERO);
        assert!(!filter.is_stable());
    }

    #[test]
    fn outlier_breaks_stability_until_window_refills() {
        let mut filter = PoseSampleFilter::new(5, 0.01);
        for _ in 0..5 {
            filter.ingest(Vec3::ZERO);
        }
        assert!(filter.is_stable());

        filter.ingest(Vec3::new(0.05, 0.0, 0.0));
        assert!(!filter.is_stable());
        assert_eq!(filter.len(), 1);

        // Returning to the surface restarts the window once more.
        for _ in 0..4 {
            filter.ingest(Vec3::ZERO);
            assert!(!filter.is_stable());
        }
        filter.ingest(Vec3::ZERO);
        assert!(filter.is_stable());
    }

    #[test]
    fn marginal_outlier_breaks_stability() {
        let mut filter = PoseSampleFilter::new(10, 0.01);
        for _ in 0..10 {
            filter.ingest(Vec3::ZERO);
        }
        assert!(filter.is_stable());

        // Just past the threshold; its deviation after averaging would not be.
        let outlier = Vec3::new(0.0105, 0.0, 0.0);
        filter.ingest(outlier);
        assert!(!filter.is_stable());

        for _ in 0..8 {
            filter.ingest(outlier);
            assert!(!filter.is_stable());
        }
        filter.ingest(outlier);
        assert!(filter.is_stable());
        assert!(filter.mean_position().distance(outlier) < 1e-6);
    }

    #[test]
    fn slow_drift_within_threshold_keeps_window() {
        let mut filter = PoseSampleFilter::new(4, 0.01);
        for i in 0..4 {
            filter.ingest(Vec3::new(i as f32 * 0.002, 0.0, 0.0));
        }
        assert_eq!(filter.len(), 4);
        assert!(filter.is_stable());
    }

    #[test]
    fn empty_window_mean_is_zero() {
        let filter = PoseSampleFilter::new(3, 0.01);
        assert_eq!(filter.mean_position(), Vec3::ZERO);
        assert_eq!(filter.max_deviation(), 0.0);
    }

    #[test]
    fn out_of_range_sample_clears_window() {
        let mut filter = PoseSampleFilter::new(3, 0.01).with_range(0.3, 2.0);
        let observer = Vec3::new(0.0, 1.0, 0.0);
        for _ in 0..3 {
            filter.ingest_from(Vec3::ZERO, observer).unwrap();
        }
        assert!(filter.is_stable());

        let err = filter
            .ingest_from(Vec3::new(0.0, 0.9, 0.0), observer)
            .unwrap_err();
        assert!(matches!(err, SampleRejection::TooClose { .. }));
        assert!(filter.is_empty());

        let err = filter
            .ingest_from(Vec3::new(0.0, 1.0, -3.0), observer)
            .unwrap_err();
        assert!(matches!(err, SampleRejection::TooFar { .. }));
    }
}
