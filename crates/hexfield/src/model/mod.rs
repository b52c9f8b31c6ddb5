//! Raw scalar models evaluated at cell centroids.
//!
//! A [`FieldModel`] maps a geographic point to an unbounded real value. The field
//! builder samples one at every cell centroid of a tiled region.
//!
//! - [`SourceSet`]: superposition of anisotropic Gaussian point sources and corridor sources.
//! - [`GradientModel`]: closed-form gradient over normalized latitude/longitude.
//! - [`IdwModel`]: inverse-distance-weighted interpolation between stations.
use crate::tiling::GeoPoint;

pub mod gradient;
pub mod idw;
pub mod influence;

pub use gradient::{GradientBounds, GradientModel};
pub use idw::{IdwModel, Station};
pub use influence::{evaluate, CorridorSource, InfluenceSource, SourceSet};

/// Trait for raw scalar models sampled at a point in degrees.
///
/// Implementations must be pure: the same point always yields the same value.
pub trait FieldModel: Send + Sync {
    fn sample(&self, p: GeoPoint) -> f64;
}

impl<F> FieldModel for F
where
    F: Fn(GeoPoint) -> f64 + Send + Sync,
{
    #[inline]
    fn sample(&self, p: GeoPoint) -> f64 {
        self(p)
    }
}
