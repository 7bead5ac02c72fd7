//! Position lookup in a sparse, precomputed time series.
//!
//! Queries before the first sample return the first position, queries after
//! the last sample return the last position, and anything in between is
//! linearly interpolated between the bracketing samples. Nothing is
//! extrapolated.

use deflector_core::units::m_to_km3;
use deflector_core::vector::{self, Vector3};
use deflector_ephem_spice::{EphemerisError, EphemerisSession, normalize_epoch_text};
use log::debug;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SamplerError {
    #[error("packet `{id}` not found")]
    NotFound { id: String },
    #[error("packet `{id}` is malformed: {reason}")]
    Malformed { id: String, reason: String },
    #[error("time series is empty")]
    Empty,
    #[error("flat cartesian length {len} is not a multiple of 4")]
    PartialSample { len: usize },
    #[error("sample offsets must be strictly increasing (index {index})")]
    NotIncreasing { index: usize },
    #[error(transparent)]
    Ephemeris(#[from] EphemerisError),
}

/// Read-only `(offset_s, position)` samples relative to `epoch_et`.
///
/// Positions keep the unit they were supplied in.
#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisTimeSeries {
    epoch_et: f64,
    offsets_s: Vec<f64>,
    positions: Vec<Vector3>,
}

impl EphemerisTimeSeries {
    pub fn new(
        epoch_et: f64,
        offsets_s: Vec<f64>,
        positions: Vec<Vector3>,
    ) -> Result<Self, SamplerError> {
        if offsets_s.is_empty() || offsets_s.len() != positions.len() {
            return Err(SamplerError::Empty);
        }
        if let Some(index) = offsets_s
            .windows(2)
            .position(|pair| !(pair[1] > pair[0]))
        {
            return Err(SamplerError::NotIncreasing { index: index + 1 });
        }
        Ok(Self {
            epoch_et,
            offsets_s,
            positions,
        })
    }

    /// Build from a flat `[t, x, y, z, ...]` array.
    pub fn from_flat_cartesian(epoch_et: f64, flat: &[f64]) -> Result<Self, SamplerError> {
        if flat.is_empty() {
            return Err(SamplerError::Empty);
        }
        if flat.len() % 4 != 0 {
            return Err(SamplerError::PartialSample { len: flat.len() });
        }
        let mut offsets = Vec::with_capacity(flat.len() / 4);
        let mut positions = Vec::with_capacity(flat.len() / 4);
        for chunk in flat.chunks_exact(4) {
            offsets.push(chunk[0]);
            positions.push([chunk[1], chunk[2], chunk[3]]);
        }
        Self::new(epoch_et, offsets, positions)
    }

    pub fn epoch_et(&self) -> f64 {
        self.epoch_et
    }

    pub fn len(&self) -> usize {
        self.offsets_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets_s.is_empty()
    }

    /// First and last sample times as ephemeris seconds.
    pub fn span_et(&self) -> (f64, f64) {
        let first = self.offsets_s.first().copied().unwrap_or(0.0);
        let last = self.offsets_s.last().copied().unwrap_or(0.0);
        (self.epoch_et + first, self.epoch_et + last)
    }

    /// Position at ephemeris time `query_et`, clamped to the series ends.
    pub fn position_at(&self, query_et: f64) -> Vector3 {
        let offset = query_et - self.epoch_et;
        let last = self.offsets_s.len() - 1;
        // Upper bound: first index whose offset is strictly greater than the query.
        let idx = self.offsets_s.partition_point(|t| *t <= offset);
        if idx == 0 {
            return self.positions[0];
        }
        if idx > last {
            return self.positions[last];
        }
        let (t1, t2) = (self.offsets_s[idx - 1], self.offsets_s[idx]);
        let fraction = (offset - t1) / (t2 - t1);
        vector::lerp(&self.positions[idx - 1], &self.positions[idx], fraction)
    }

    /// Same series with positions converted from metres to kilometres.
    pub fn metres_to_km(&self) -> Self {
        Self {
            epoch_et: self.epoch_et,
            offsets_s: self.offsets_s.clone(),
            positions: self.positions.iter().map(m_to_km3).collect(),
        }
    }
}

/// Locate packet `id` in a CZML document and load its sampled `position`.
///
/// The packet epoch is normalised and resolved through `session`. Positions
/// stay in the document's unit (metres for CZML).
pub fn from_czml<S: EphemerisSession + ?Sized>(
    document: &Value,
    id: &str,
    session: &S,
) -> Result<EphemerisTimeSeries, SamplerError> {
    let malformed = |reason: &str| SamplerError::Malformed {
        id: id.to_string(),
        reason: reason.to_string(),
    };

    let packets = document
        .as_array()
        .ok_or_else(|| malformed("document is not an array of packets"))?;
    let packet = packets
        .iter()
        .find(|packet| packet.get("id").and_then(Value::as_str) == Some(id))
        .ok_or_else(|| SamplerError::NotFound { id: id.to_string() })?;

    let position = packet
        .get("position")
        .ok_or_else(|| malformed("missing `position`"))?;
    let epoch = position
        .get("epoch")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("missing `position.epoch`"))?;
    let cartesian = position
        .get("cartesian")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("missing `position.cartesian`"))?;
    if cartesian.is_empty() || cartesian.len() % 4 != 0 {
        return Err(malformed(&format!(
            "`position.cartesian` length {} is not a positive multiple of 4",
            cartesian.len()
        )));
    }
    let flat = cartesian
        .iter()
        .map(|value| {
            value
                .as_f64()
                .ok_or_else(|| malformed("`position.cartesian` contains a non-number"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let epoch_et = session.epoch_from_text(&normalize_epoch_text(epoch)?)?;
    let series = EphemerisTimeSeries::from_flat_cartesian(epoch_et, &flat).map_err(|err| {
        SamplerError::Malformed {
            id: id.to_string(),
            reason: err.to_string(),
        }
    })?;
    debug!("loaded {} samples for packet `{id}`", series.len());
    Ok(series)
}
