//! Inertial trajectory samples and segments handed to the presentation layer.

use thiserror::Error;

use crate::vector::Vector3;

/// One inertial-frame sample; times are seconds relative to the owning segment's epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    pub time_s: f64,
    pub position_m: Vector3,
    pub velocity_m_s: Option<Vector3>,
}

impl TrajectorySample {
    pub fn new(time_s: f64, position_m: Vector3) -> Self {
        Self {
            time_s,
            position_m,
            velocity_m_s: None,
        }
    }

    pub fn with_velocity(mut self, velocity_m_s: Vector3) -> Self {
        self.velocity_m_s = Some(velocity_m_s);
        self
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SegmentError {
    #[error("sample time {next} s precedes previous sample at {previous} s")]
    NonMonotonic { previous: f64, next: f64 },
    #[error("segment epochs differ ({left} vs {right})")]
    EpochMismatch { left: f64, right: f64 },
    #[error("sample at index {index} contains a non-finite value")]
    NonFinite { index: usize },
}

/// Ordered, non-decreasing sequence of samples sharing one epoch (ephemeris seconds).
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectorySegment {
    pub epoch_et: f64,
    samples: Vec<TrajectorySample>,
}

impl TrajectorySegment {
    pub fn new(epoch_et: f64) -> Self {
        Self {
            epoch_et,
            samples: Vec::new(),
        }
    }

    /// Build a segment, validating ordering and finiteness.
    pub fn from_samples(
        epoch_et: f64,
        samples: Vec<TrajectorySample>,
    ) -> Result<Self, SegmentError> {
        let mut segment = Self::with_capacity(epoch_et, samples.len());
        for sample in samples {
            segment.push(sample)?;
        }
        Ok(segment)
    }

    pub fn with_capacity(epoch_et: f64, capacity: usize) -> Self {
        Self {
            epoch_et,
            samples: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, sample: TrajectorySample) -> Result<(), SegmentError> {
        let finite = sample.time_s.is_finite()
            && sample.position_m.iter().all(|v| v.is_finite())
            && sample
                .velocity_m_s
                .map_or(true, |v| v.iter().all(|c| c.is_finite()));
        if !finite {
            return Err(SegmentError::NonFinite {
                index: self.samples.len(),
            });
        }
        if let Some(last) = self.samples.last() {
            if sample.time_s < last.time_s {
                return Err(SegmentError::NonMonotonic {
                    previous: last.time_s,
                    next: sample.time_s,
                });
            }
        }
        self.samples.push(sample);
        Ok(())
    }

    /// Append `other` after this segment. Both must share the same epoch and
    /// `other` must not start before this segment ends.
    pub fn append(&mut self, other: TrajectorySegment) -> Result<(), SegmentError> {
        if other.epoch_et != self.epoch_et {
            return Err(SegmentError::EpochMismatch {
                left: self.epoch_et,
                right: other.epoch_et,
            });
        }
        self.samples.reserve(other.samples.len());
        for sample in other.samples {
            self.push(sample)?;
        }
        Ok(())
    }

    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn start_time_s(&self) -> Option<f64> {
        self.samples.first().map(|s| s.time_s)
    }

    pub fn end_time_s(&self) -> Option<f64> {
        self.samples.last().map(|s| s.time_s)
    }

    /// Absolute ephemeris time of the last sample (the epoch for an empty segment).
    pub fn end_et(&self) -> f64 {
        self.epoch_et + self.end_time_s().unwrap_or(0.0)
    }

    /// Flatten into `[t, x, y, z, t, x, y, z, ...]`.
    pub fn flat_cartesian(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.samples.len() * 4);
        for sample in &self.samples {
            out.push(sample.time_s);
            out.extend_from_slice(&sample.position_m);
        }
        out
    }
}
