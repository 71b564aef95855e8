//! Terrain transect sampling and altitude band recommendation.
//!
//! Before a waypoint is committed, a west-east transect of sample
//! coordinates around the candidate location is sent to the elevation
//! provider; the returned elevations become a recommendation band for the
//! altitude slider.

use crate::error::TerrainError;
use crate::models::Coordinate;

/// Kilometers per degree of latitude (and of longitude at the equator).
const KM_PER_DEG: f64 = 111.32;

/// Altitude slider precision in meters.
const SLIDER_STEP_M: f64 = 0.2;

/// Build the transect of sample coordinates around `center`.
///
/// Yields `2 * sample_count + 1` points: the center first, then for each
/// ring index a west point and its symmetric east point, evenly spaced out
/// to `radius_km`. Longitude spacing is divided by `cos(lat)` so ground
/// spacing stays approximately even away from the equator.
///
/// The iterator is lazy and a pure function of its inputs.
pub fn sample_transect(
    center: Coordinate,
    sample_count: usize,
    radius_km: f64,
) -> impl Iterator<Item = Coordinate> {
    let lat = center.lat;
    let lon = center.lon;

    std::iter::once(Coordinate::new(lat, lon)).chain((1..=sample_count).flat_map(move |i| {
        let step_km = radius_km / sample_count as f64;
        let offset_deg = i as f64 * step_km / KM_PER_DEG / lat.to_radians().cos();
        [
            Coordinate::new(lat, lon - offset_deg),
            Coordinate::new(lat, lon + offset_deg),
        ]
    }))
}

/// Elevation samples along one transect, paired with their coordinates.
///
/// Transient: scoped to a single altitude-selection interaction and
/// discarded once the operator confirms or cancels.
#[derive(Debug, Clone, Default)]
pub struct TerrainProfile {
    pub samples: Vec<(Coordinate, f64)>,
}

impl TerrainProfile {
    pub fn elevations(&self) -> Vec<f64> {
        self.samples.iter().map(|(_, elev)| *elev).collect()
    }

    /// Samples ordered west to east, the order the profile chart draws them in.
    pub fn chart_series(&self) -> Vec<(Coordinate, f64)> {
        let mut series = self.samples.clone();
        series.sort_by(|a, b| a.0.lon.total_cmp(&b.0.lon));
        series
    }
}

/// Recommended altitude band derived from transect elevations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudeBands {
    /// The highest obstacle in the transect; the floor below which flight
    /// is unsafe. Note this is the maximum elevation sample, "min" refers
    /// to the minimum safe altitude.
    pub min_clearance_m: f64,
    pub recommended_m: f64,
    pub safe_m: f64,
}

/// Bounds for the altitude selection slider, quantized to 0.2 m.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudeSlider {
    pub min_m: f64,
    pub max_m: f64,
    pub default_m: f64,
    pub step_m: f64,
}

/// Derive the altitude band from elevation samples in meters.
///
/// Fails with [`TerrainError::DataUnavailable`] when there are no samples;
/// the caller must not proceed to waypoint placement.
pub fn recommend_altitude(elevations: &[f64]) -> Result<AltitudeBands, TerrainError> {
    if elevations.is_empty() {
        return Err(TerrainError::DataUnavailable);
    }

    let min_clearance_m = elevations.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let average = elevations.iter().sum::<f64>() / elevations.len() as f64;
    let recommended_m = (min_clearance_m + 2.0).max(average);

    Ok(AltitudeBands {
        min_clearance_m,
        recommended_m,
        safe_m: recommended_m + 4.0,
    })
}

impl AltitudeBands {
    /// Slider bounds: floor of the clearance, ceiling of safe + 10 m of
    /// headroom, default at the recommendation.
    pub fn slider(&self) -> AltitudeSlider {
        AltitudeSlider {
            min_m: round_down_to_step(self.min_clearance_m),
            max_m: round_up_to_step(self.safe_m + 10.0),
            default_m: round_up_to_step(self.recommended_m),
            step_m: SLIDER_STEP_M,
        }
    }
}

fn round_down_to_step(value: f64) -> f64 {
    (value / SLIDER_STEP_M).floor() * SLIDER_STEP_M
}

fn round_up_to_step(value: f64) -> f64 {
    (value / SLIDER_STEP_M).ceil() * SLIDER_STEP_M
}
