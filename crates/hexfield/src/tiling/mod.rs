//! Hexagonal tiling of a region boundary.
//!
//! The grid itself is an external collaborator: anything implementing [`HexTiler`]
//! can enumerate the cells covering a [`RegionBoundary`] and report their centroids.
//! [`H3Tiler`] is the implementation backed by `h3o`. [`tile_region`] turns the raw
//! enumeration into a sorted, duplicate-free [`TiledRegion`], and [`TilingCache`]
//! lets independent fields over the same region share one tiling.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::DVec2;
use h3o::Resolution;
use tracing::warn;

use crate::error::{Error, Result};

pub mod boundary;
pub mod cache;
pub mod h3;

pub use boundary::RegionBoundary;
pub use cache::TilingCache;
pub use h3::{Containment, H3Tiler};

/// Opaque grid-cell identifier.
pub type CellId = h3o::CellIndex;

/// A geographic coordinate in degrees.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns `true` when both components are finite and inside the valid degree ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Planar degree distance with the longitude difference scaled by the cosine of the
    /// mean latitude.
    pub fn distance_deg(&self, other: GeoPoint) -> f64 {
        let mean_lat = (self.lat + other.lat) * 0.5;
        let dlat = self.lat - other.lat;
        let dlng = (self.lng - other.lng) * mean_lat.to_radians().cos();
        dlat.hypot(dlng)
    }

    /// The point as `(lat, lng)` in a vector, for per-axis arithmetic.
    #[inline]
    pub fn as_dvec2(&self) -> DVec2 {
        DVec2::new(self.lat, self.lng)
    }
}

/// A tiled cell with its representative centroid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub id: CellId,
    pub centroid: GeoPoint,
}

/// Source of hexagonal cells for a region.
///
/// Implementations must be deterministic: the same boundary and resolution always
/// yield the same cell set, with every point of the region inside exactly one cell.
pub trait HexTiler {
    /// Enumerates the cells covering `boundary` at `resolution`.
    fn tile(&self, boundary: &RegionBoundary, resolution: Resolution) -> Result<Vec<CellId>>;

    /// Representative centroid of `cell`.
    fn centroid(&self, cell: CellId) -> GeoPoint;
}

/// The sorted, duplicate-free cell set of a region at a fixed resolution.
#[derive(Clone, Debug)]
pub struct TiledRegion {
    pub resolution: Resolution,
    pub cells: Vec<Cell>,
    /// Cells the tiler returned more than once, dropped before ordering.
    pub duplicates: usize,
}

impl TiledRegion {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell identifiers in iteration order.
    pub fn ids(&self) -> impl Iterator<Item = CellId> + '_ {
        self.cells.iter().map(|c| c.id)
    }
}

/// Tiles `boundary` and attaches centroids, ordering cells by identifier.
///
/// An empty tiling is reported as [`Error::EmptyTiling`] rather than returned as an
/// empty region.
pub fn tile_region<T: HexTiler + ?Sized>(
    tiler: &T,
    boundary: &RegionBoundary,
    resolution: Resolution,
) -> Result<TiledRegion> {
    let mut ids = tiler.tile(boundary, resolution)?;
    let enumerated = ids.len();
    ids.sort_unstable();
    ids.dedup();

    let duplicates = enumerated - ids.len();
    if duplicates > 0 {
        warn!(
            "Tiler returned {} duplicate cells at resolution {}.",
            duplicates,
            u8::from(resolution)
        );
    }

    if ids.is_empty() {
        return Err(Error::EmptyTiling {
            resolution: u8::from(resolution),
        });
    }

    let cells = ids
        .into_iter()
        .map(|id| Cell {
            id,
            centroid: tiler.centroid(id),
        })
        .collect();

    Ok(TiledRegion {
        resolution,
        cells,
        duplicates,
    })
}
