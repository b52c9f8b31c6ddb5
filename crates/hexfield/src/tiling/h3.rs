//! [`HexTiler`] backed by the H3 grid (`h3o`).
use h3o::geom::{ContainmentMode, TilerBuilder};
use h3o::{LatLng, Resolution};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tiling::{CellId, GeoPoint, HexTiler, RegionBoundary};

/// Rule deciding which boundary cells belong to a tiling.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Containment {
    /// Cells whose centroid lies inside the boundary.
    ContainsCentroid,
    /// Cells entirely inside the boundary.
    ContainsBoundary,
    /// Cells touching the boundary's interior.
    IntersectsBoundary,
    /// Every cell needed to cover the boundary, even when it is smaller than one cell.
    #[default]
    Covers,
}

impl From<Containment> for ContainmentMode {
    fn from(value: Containment) -> Self {
        match value {
            Containment::ContainsCentroid => ContainmentMode::ContainsCentroid,
            Containment::ContainsBoundary => ContainmentMode::ContainsBoundary,
            Containment::IntersectsBoundary => ContainmentMode::IntersectsBoundary,
            Containment::Covers => ContainmentMode::Covers,
        }
    }
}

/// H3 tiler.
#[derive(Clone, Copy, Debug, Default)]
pub struct H3Tiler {
    pub containment: Containment,
}

impl H3Tiler {
    pub fn new(containment: Containment) -> Self {
        Self { containment }
    }
}

impl HexTiler for H3Tiler {
    fn tile(&self, boundary: &RegionBoundary, resolution: Resolution) -> Result<Vec<CellId>> {
        let mut tiler = TilerBuilder::new(resolution)
            .containment_mode(self.containment.into())
            .build();
        tiler
            .add(boundary.to_polygon())
            .map_err(|e| Error::InvalidBoundary(e.to_string()))?;
        Ok(tiler.into_coverage().collect())
    }

    fn centroid(&self, cell: CellId) -> GeoPoint {
        let ll = LatLng::from(cell);
        GeoPoint::new(ll.lat(), ll.lng())
    }
}
