//! Weighted Gaussian influence sources.
//!
//! Each [`InfluenceSource`] contributes
//! `weight * exp(-(dlat² / (2·σlat²) + dlng² / (2·σlng²)))` at a point. A positive
//! weight models supply, a negative weight models demand. [`SourceSet`] validates a
//! list of sources once, then sums their contributions in list order so results are
//! reproducible bit for bit.
use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::FieldModel;
use crate::tiling::GeoPoint;

/// A point source with an anisotropic Gaussian falloff.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct InfluenceSource {
    /// Label used in diagnostics.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    /// Signed weight; the contribution at the source location.
    pub weight: f64,
    /// Standard deviation along latitude, in degrees.
    pub radius_lat: f64,
    /// Standard deviation along longitude, in degrees.
    pub radius_lng: f64,
}

impl InfluenceSource {
    pub fn new(lat: f64, lng: f64, weight: f64, radius_lat: f64, radius_lng: f64) -> Self {
        Self {
            name: String::new(),
            lat,
            lng,
            weight,
            radius_lat,
            radius_lng,
        }
    }

    /// Source with the same radius on both axes.
    pub fn isotropic(lat: f64, lng: f64, weight: f64, radius: f64) -> Self {
        Self::new(lat, lng, weight, radius, radius)
    }

    /// Sets the diagnostic name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    /// Checks location, weight and both radii.
    pub fn validate(&self) -> Result<()> {
        if !self.location().is_valid() {
            return Err(invalid(&self.name, "location is outside the valid coordinate range"));
        }
        if !self.weight.is_finite() {
            return Err(invalid(&self.name, "weight must be finite"));
        }
        if !positive_radius(self.radius_lat) {
            return Err(invalid(&self.name, "radius_lat must be finite and > 0"));
        }
        if !positive_radius(self.radius_lng) {
            return Err(invalid(&self.name, "radius_lng must be finite and > 0"));
        }
        Ok(())
    }

    /// Contribution of this source at `p`.
    #[inline]
    pub fn contribution(&self, p: GeoPoint) -> f64 {
        let delta = p.as_dvec2() - self.location().as_dvec2();
        let sigma = DVec2::new(self.radius_lat, self.radius_lng);
        let z = (delta * delta) / (2.0 * sigma * sigma);
        self.weight * (-(z.x + z.y)).exp()
    }
}

/// A line-segment source with an isotropic Gaussian falloff around the segment.
///
/// The distance is measured in the `(lat, lng)` degree plane to the closest point of
/// the segment, so the whole corridor carries the full weight along its length.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct CorridorSource {
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    pub from: GeoPoint,
    pub to: GeoPoint,
    pub weight: f64,
    /// Standard deviation of the falloff, in degrees.
    pub radius: f64,
}

impl CorridorSource {
    pub fn new(from: GeoPoint, to: GeoPoint, weight: f64, radius: f64) -> Self {
        Self {
            name: String::new(),
            from,
            to,
            weight,
            radius,
        }
    }

    /// Sets the diagnostic name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.from.is_valid() || !self.to.is_valid() {
            return Err(invalid(&self.name, "endpoint is outside the valid coordinate range"));
        }
        if !self.weight.is_finite() {
            return Err(invalid(&self.name, "weight must be finite"));
        }
        if !positive_radius(self.radius) {
            return Err(invalid(&self.name, "radius must be finite and > 0"));
        }
        Ok(())
    }

    /// Squared distance from `p` to the closest point of the segment, measured with
    /// [`GeoPoint::distance_deg`].
    pub fn distance_squared(&self, p: GeoPoint) -> f64 {
        let a = self.from.as_dvec2();
        let ab = self.to.as_dvec2() - a;
        let ap = p.as_dvec2() - a;
        let len2 = ab.length_squared();
        let t = if len2 > 0.0 {
            (ap.dot(ab) / len2).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let closest = a + ab * t;
        p.distance_deg(GeoPoint::new(closest.x, closest.y)).powi(2)
    }

    #[inline]
    pub fn contribution(&self, p: GeoPoint) -> f64 {
        let d2 = self.distance_squared(p);
        self.weight * (-d2 / (2.0 * self.radius * self.radius)).exp()
    }
}

/// A validated, ordered collection of sources.
#[derive(Clone, Debug, Default)]
pub struct SourceSet {
    sources: Vec<InfluenceSource>,
    corridors: Vec<CorridorSource>,
}

impl SourceSet {
    /// Validates `sources`. At least one source is required.
    pub fn new(sources: Vec<InfluenceSource>) -> Result<Self> {
        Self::with_corridors(sources, Vec::new())
    }

    /// Validates point and corridor sources together. At least one of either is required.
    pub fn with_corridors(
        sources: Vec<InfluenceSource>,
        corridors: Vec<CorridorSource>,
    ) -> Result<Self> {
        if sources.is_empty() && corridors.is_empty() {
            return Err(Error::InvalidConfig(
                "source set must contain at least one source".into(),
            ));
        }
        for s in &sources {
            s.validate()?;
        }
        for c in &corridors {
            c.validate()?;
        }
        Ok(Self { sources, corridors })
    }

    pub fn sources(&self) -> &[InfluenceSource] {
        &self.sources
    }

    pub fn corridors(&self) -> &[CorridorSource] {
        &self.corridors
    }

    pub fn len(&self) -> usize {
        self.sources.len() + self.corridors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of all contributions at `p`: point sources first, then corridors, each in list order.
    pub fn evaluate(&self, p: GeoPoint) -> f64 {
        let points: f64 = self.sources.iter().map(|s| s.contribution(p)).sum();
        let corridors: f64 = self.corridors.iter().map(|c| c.contribution(p)).sum();
        points + corridors
    }
}

impl FieldModel for SourceSet {
    #[inline]
    fn sample(&self, p: GeoPoint) -> f64 {
        self.evaluate(p)
    }
}

/// Raw influence of `sources` at `point`.
pub fn evaluate(point: GeoPoint, sources: &SourceSet) -> f64 {
    sources.evaluate(point)
}

fn positive_radius(r: f64) -> bool {
    r.is_finite() && r > 0.0
}

fn invalid(name: &str, message: &str) -> Error {
    if name.is_empty() {
        Error::InvalidConfig(format!("source: {message}"))
    } else {
        Error::InvalidConfig(format!("source '{name}': {message}"))
    }
}
