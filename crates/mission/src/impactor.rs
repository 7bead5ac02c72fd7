//! Impactor position lookup from a precomputed CZML document.

use deflector_core::vector::Vector3;
use deflector_ephem_spice::EphemerisSession;
use deflector_sampler::{self as sampler, EphemerisTimeSeries};
use log::warn;
use serde_json::Value;

use crate::MissionError;

/// Position (km) of packet `id` at `query_et`, clamped to the sampled span.
pub fn impactor_position<S: EphemerisSession + ?Sized>(
    session: &S,
    document: &Value,
    id: &str,
    query_et: f64,
) -> Result<Vector3, MissionError> {
    let series: EphemerisTimeSeries = sampler::from_czml(document, id, session)?;
    let (first_et, last_et) = series.span_et();
    if query_et < first_et || query_et > last_et {
        warn!(
            "query ET {query_et:.3} lies outside `{id}` samples [{first_et:.3}, {last_et:.3}], clamping"
        );
    }
    Ok(series.metres_to_km().position_at(query_et))
}
