//! Closed-form latitude/longitude gradient.
use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::FieldModel;
use crate::tiling::GeoPoint;

/// Declared extent of a gradient and the weight of each axis.
///
/// With `u` the clamped position between `lat_min` and `lat_max` and `v` the clamped
/// position between `lng_min` and `lng_max`, the raw value is
/// `lat_weight * (1 - u) + lng_weight * v`: largest in the south-east corner.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct GradientBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
    #[cfg_attr(feature = "serde", serde(default = "default_lat_weight"))]
    pub lat_weight: f64,
    #[cfg_attr(feature = "serde", serde(default = "default_lng_weight"))]
    pub lng_weight: f64,
}

fn default_lat_weight() -> f64 {
    0.7
}

fn default_lng_weight() -> f64 {
    0.3
}

impl GradientBounds {
    /// Bounds with the default axis weights (0.7 latitude, 0.3 longitude).
    pub fn new(lat_min: f64, lat_max: f64, lng_min: f64, lng_max: f64) -> Self {
        Self {
            lat_min,
            lat_max,
            lng_min,
            lng_max,
            lat_weight: default_lat_weight(),
            lng_weight: default_lng_weight(),
        }
    }

    /// Sets both axis weights.
    pub fn with_weights(mut self, lat_weight: f64, lng_weight: f64) -> Self {
        self.lat_weight = lat_weight;
        self.lng_weight = lng_weight;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let all_finite = [
            self.lat_min,
            self.lat_max,
            self.lng_min,
            self.lng_max,
            self.lat_weight,
            self.lng_weight,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !all_finite {
            return Err(Error::InvalidConfig(
                "gradient bounds and weights must be finite".into(),
            ));
        }
        if self.lat_max <= self.lat_min {
            return Err(Error::InvalidConfig(
                "gradient bounds: lat_max must be > lat_min".into(),
            ));
        }
        if self.lng_max <= self.lng_min {
            return Err(Error::InvalidConfig(
                "gradient bounds: lng_max must be > lng_min".into(),
            ));
        }
        Ok(())
    }

    /// Position of `p` inside the bounds as `(u, v)`, each clamped to [0, 1].
    #[inline]
    pub fn normalized(&self, p: GeoPoint) -> DVec2 {
        let min = DVec2::new(self.lat_min, self.lng_min);
        let max = DVec2::new(self.lat_max, self.lng_max);
        ((p.as_dvec2() - min) / (max - min)).clamp(DVec2::ZERO, DVec2::ONE)
    }
}

/// Model evaluating [`GradientBounds`]. Construct with [`GradientModel::new`] to validate.
#[derive(Clone, Debug)]
pub struct GradientModel {
    bounds: GradientBounds,
}

impl GradientModel {
    pub fn new(bounds: GradientBounds) -> Result<Self> {
        bounds.validate()?;
        Ok(Self { bounds })
    }

    pub fn bounds(&self) -> &GradientBounds {
        &self.bounds
    }
}

impl FieldModel for GradientModel {
    #[inline]
    fn sample(&self, p: GeoPoint) -> f64 {
        let uv = self.bounds.normalized(p);
        self.bounds.lat_weight * (1.0 - uv.x) + self.bounds.lng_weight * uv.y
    }
}
