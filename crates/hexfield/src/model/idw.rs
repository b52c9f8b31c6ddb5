//! Inverse-distance-weighted interpolation between measurement stations.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::FieldModel;
use crate::tiling::GeoPoint;

/// Distances below this many degrees are clamped, so a sample on a station stays finite.
pub const MIN_DISTANCE_DEG: f64 = 0.01;

/// A measured value at a location.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Station {
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub value: f64,
}

impl Station {
    pub fn new(lat: f64, lng: f64, value: f64) -> Self {
        Self {
            name: String::new(),
            lat,
            lng,
            value,
        }
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// Weighted mean of station values with weights `1 / d^power`, where `d` is
/// [`GeoPoint::distance_deg`].
#[derive(Clone, Debug)]
pub struct IdwModel {
    stations: Vec<Station>,
    power: f64,
}

impl IdwModel {
    pub fn new(stations: Vec<Station>, power: f64) -> Result<Self> {
        if stations.is_empty() {
            return Err(Error::InvalidConfig(
                "interpolation needs at least one station".into(),
            ));
        }
        if !power.is_finite() || power <= 0.0 {
            return Err(Error::InvalidConfig(
                "interpolation power must be finite and > 0".into(),
            ));
        }
        if let Some(bad) = stations
            .iter()
            .find(|s| !s.location().is_valid() || !s.value.is_finite())
        {
            return Err(Error::InvalidConfig(format!(
                "station '{}' has an invalid location or value",
                bad.name
            )));
        }
        Ok(Self { stations, power })
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn power(&self) -> f64 {
        self.power
    }
}

impl FieldModel for IdwModel {
    fn sample(&self, p: GeoPoint) -> f64 {
        let mut num = 0.0;
        let mut den = 0.0;
        for s in &self.stations {
            let d = p.distance_deg(s.location()).max(MIN_DISTANCE_DEG);
            let w = d.powf(-self.power);
            num += w * s.value;
            den += w;
        }
        num / den
    }
}
