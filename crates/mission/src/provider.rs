//! Ephemeris provider chosen at runtime from configuration.

use deflector_config::{EphemerisConfig, ProviderKind};
use deflector_core::matrix::{Matrix3, Matrix6};
use deflector_core::state::{Inertial, StateVector};
use deflector_ephem_spice::{
    AnalyticEphemeris, AnalyticSession, EphemerisError, EphemerisProvider, EphemerisSession,
};
#[cfg(feature = "spice")]
use deflector_ephem_spice::{SpiceEphemeris, SpiceSession};

use crate::MissionError;

#[derive(Debug, Clone)]
pub enum ConfiguredEphemeris {
    Analytic(AnalyticEphemeris),
    #[cfg(feature = "spice")]
    Spice(SpiceEphemeris),
}

impl ConfiguredEphemeris {
    pub fn from_config(config: &EphemerisConfig) -> Result<Self, MissionError> {
        match config.provider {
            ProviderKind::Analytic => Ok(Self::Analytic(AnalyticEphemeris::new())),
            #[cfg(feature = "spice")]
            ProviderKind::Spice => {
                let provider = if config.kernels.is_empty() {
                    SpiceEphemeris::new(&config.kernel_dir)
                } else {
                    SpiceEphemeris::with_kernels(&config.kernel_dir, &config.kernels)?
                };
                Ok(Self::Spice(provider))
            }
            #[cfg(not(feature = "spice"))]
            ProviderKind::Spice => Err(MissionError::ProviderUnavailable { provider: "spice" }),
        }
    }
}

pub enum ConfiguredSession<'a> {
    Analytic(AnalyticSession<'a>),
    #[cfg(feature = "spice")]
    Spice(SpiceSession<'a>),
}

impl EphemerisProvider for ConfiguredEphemeris {
    type Session<'a> = ConfiguredSession<'a>;

    fn load(&self) -> Result<Self::Session<'_>, EphemerisError> {
        match self {
            Self::Analytic(provider) => provider.load().map(ConfiguredSession::Analytic),
            #[cfg(feature = "spice")]
            Self::Spice(provider) => provider.load().map(ConfiguredSession::Spice),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Analytic(provider) => provider.name(),
            #[cfg(feature = "spice")]
            Self::Spice(provider) => provider.name(),
        }
    }
}

impl ConfiguredSession<'_> {
    fn inner(&self) -> &dyn EphemerisSession {
        match self {
            Self::Analytic(session) => session,
            #[cfg(feature = "spice")]
            Self::Spice(session) => session,
        }
    }
}

impl EphemerisSession for ConfiguredSession<'_> {
    fn rotation(&self, from: &str, to: &str, et: f64) -> Result<Matrix3, EphemerisError> {
        self.inner().rotation(from, to, et)
    }

    fn state_transform(&self, from: &str, to: &str, et: f64) -> Result<Matrix6, EphemerisError> {
        self.inner().state_transform(from, to, et)
    }

    fn relative_state(
        &self,
        target: &str,
        observer: &str,
        frame: &str,
        et: f64,
    ) -> Result<StateVector<Inertial>, EphemerisError> {
        self.inner().relative_state(target, observer, frame, et)
    }

    fn epoch_from_text(&self, text: &str) -> Result<f64, EphemerisError> {
        self.inner().epoch_from_text(text)
    }

    fn format_epoch(&self, et: f64) -> Result<String, EphemerisError> {
        self.inner().format_epoch(et)
    }
}
