//! Ephemeris and reference-frame sessions consumed by the trajectory engine.
//!
//! Providers hand out a [`EphemerisSession`] from [`EphemerisProvider::load`].
//! The session is the only way to issue queries, and whatever the provider
//! loaded is released when the session is dropped, on every exit path.

use std::path::PathBuf;

use deflector_core::matrix::{self, Matrix3, Matrix6};
use deflector_core::state::{Inertial, StateVector};
use thiserror::Error;

pub mod analytic;
pub mod kernels;
#[cfg(feature = "spice")]
pub mod spice;
pub mod time;

pub use analytic::{AnalyticEphemeris, AnalyticSession};
#[cfg(feature = "spice")]
pub use spice::{SpiceEphemeris, SpiceSession};

/// Errors surfaced while loading ephemeris data or querying a session.
#[derive(Debug, Error)]
pub enum EphemerisError {
    #[error("kernel `{name}` is missing at {path}")]
    MissingKernel { name: &'static str, path: PathBuf },
    #[error("kernel `{name}` is not in the kernel catalog")]
    UnknownKernel { name: String },
    #[error("kernel `{name}` path contains invalid UTF-8: {path}")]
    InvalidKernelPath { name: &'static str, path: PathBuf },
    #[error("failed to read metadata for kernel `{name}`: {source}")]
    Io {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid epoch string `{epoch}`")]
    InvalidEpoch { epoch: String },
    #[error("unknown reference frame `{frame}`")]
    UnknownFrame { frame: String },
    #[error("reference frame `{frame}` is not inertial")]
    FrameNotInertial { frame: String },
    #[error("no ephemeris data for body `{body}`")]
    UnknownBody { body: String },
    #[error("ephemeris session lock is poisoned")]
    SessionPoisoned,
    #[error("SPICE call failed: {short} {message}")]
    Spice { short: String, message: String },
}

/// CSPICE short messages raised for an unreadable time string, as opposed to
/// a kernel-pool problem such as `SPICE(NOLEAPSECONDS)`.
const TIME_PARSE_FAILURES: &[&str] = &[
    "SPICE(UNPARSEDTIME)",
    "SPICE(INVALIDTIMESTRING)",
    "SPICE(TIMECONFLICT)",
    "SPICE(BADTIMETYPE)",
    "SPICE(EMPTYSTRING)",
];

impl EphemerisError {
    /// True for errors caused by the caller's input rather than by missing or broken data.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidEpoch { .. })
    }

    /// Reclassify a failed time conversion of `text`: parse failures become
    /// [`EphemerisError::InvalidEpoch`], everything else is passed through.
    pub fn for_epoch_text(self, text: &str) -> Self {
        match self {
            Self::Spice { short, message } if TIME_PARSE_FAILURES.contains(&short.as_str()) => {
                Self::InvalidEpoch {
                    epoch: format!("{text}: {message}"),
                }
            }
            other => other,
        }
    }
}

/// Source of ephemeris sessions. Each worker loads its own session.
pub trait EphemerisProvider: Send + Sync {
    type Session<'a>: EphemerisSession
    where
        Self: 'a;

    /// Load whatever data the provider needs and return a query handle.
    fn load(&self) -> Result<Self::Session<'_>, EphemerisError>;

    /// Short label used in logs and CLI output.
    fn name(&self) -> &'static str;
}

/// Query interface of a loaded ephemeris. Dropping the session unloads it.
pub trait EphemerisSession {
    /// 3×3 rotation taking vectors from frame `from` to frame `to` at `et`.
    fn rotation(&self, from: &str, to: &str, et: f64) -> Result<Matrix3, EphemerisError> {
        Ok(matrix::rotation_block(&self.state_transform(from, to, et)?))
    }

    /// 6×6 state transformation from frame `from` to frame `to` at `et`.
    fn state_transform(&self, from: &str, to: &str, et: f64) -> Result<Matrix6, EphemerisError>;

    /// State of `target` relative to `observer`, expressed in inertial frame `frame`.
    fn relative_state(
        &self,
        target: &str,
        observer: &str,
        frame: &str,
        et: f64,
    ) -> Result<StateVector<Inertial>, EphemerisError>;

    /// Parse a normalised UTC timestamp (see [`normalize_epoch_text`]) into ephemeris seconds.
    fn epoch_from_text(&self, text: &str) -> Result<f64, EphemerisError>;

    /// Format ephemeris seconds as an ISO-8601 UTC string with millisecond precision.
    fn format_epoch(&self, et: f64) -> Result<String, EphemerisError>;
}

/// Normalise an ISO-like timestamp before handing it to [`EphemerisSession::epoch_from_text`].
///
/// RFC 3339 timestamps with a `Z` or numeric offset are shifted to UTC. Other
/// inputs lose a trailing `Z` or `+hh:mm` suffix and have the `T` separator
/// replaced by a space.
pub fn normalize_epoch_text(text: &str) -> Result<String, EphemerisError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(EphemerisError::InvalidEpoch {
            epoch: text.to_string(),
        });
    }
    if let Ok(stamp) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Ok(stamp
            .naive_utc()
            .format("%Y-%m-%d %H:%M:%S%.f")
            .to_string());
    }
    let without_zone = trimmed
        .strip_suffix('Z')
        .or_else(|| trimmed.strip_suffix('z'))
        .unwrap_or(trimmed);
    let without_offset = without_zone
        .split_once('+')
        .map_or(without_zone, |(head, _)| head);
    Ok(without_offset.replacen('T', " ", 1))
}
