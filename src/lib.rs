//! Deflector: mitigation-vehicle trajectory engine.
//!
//! The workspace crates are re-exported here so front-ends (the CLI
//! binaries, tests, services) depend on a single library.

pub use deflector_ascent as ascent;
pub use deflector_config as config;
pub use deflector_core as primitives;
pub use deflector_ephem_spice as ephemeris;
pub use deflector_export as export;
pub use deflector_frames as frames;
pub use deflector_importer as importer;
pub use deflector_mission as mission;
pub use deflector_orbits as orbits;
pub use deflector_sampler as sampler;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
