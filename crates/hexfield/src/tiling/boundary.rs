//! Region boundary validation.
use std::hash::{Hash, Hasher};

use geo::{Area, Coord, Intersects, Line, LineString, Polygon};

use crate::error::{Error, Result};
use crate::tiling::GeoPoint;

const CLOSURE_TOLERANCE_DEG: f64 = 1e-9;
const MIN_AREA_DEG2: f64 = 1e-12;

/// A simple closed polygon of `(lat, lng)` vertices, validated on construction.
///
/// The first and last vertex must coincide. Holes are not supported.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionBoundary {
    vertices: Vec<GeoPoint>,
}

impl RegionBoundary {
    /// Validates `vertices` as a closed, simple, non-degenerate ring.
    pub fn new(vertices: Vec<GeoPoint>) -> Result<Self> {
        validate(&vertices)?;
        Ok(Self { vertices })
    }

    /// Like [`RegionBoundary::new`], but appends the first vertex when the ring is open.
    pub fn closing(mut vertices: Vec<GeoPoint>) -> Result<Self> {
        if let (Some(first), Some(last)) = (vertices.first().copied(), vertices.last()) {
            if !same_point(&first, last) {
                vertices.push(first);
            }
        }
        Self::new(vertices)
    }

    /// The ring's vertices, closing vertex included.
    pub fn vertices(&self) -> &[GeoPoint] {
        &self.vertices
    }

    /// The boundary as a `geo` polygon with `x = lng` and `y = lat`.
    pub fn to_polygon(&self) -> Polygon<f64> {
        let exterior: LineString<f64> = self.vertices.iter().map(to_coord).collect();
        Polygon::new(exterior, Vec::new())
    }

    /// Planar area of the ring in square degrees.
    pub fn area_deg2(&self) -> f64 {
        self.to_polygon().unsigned_area()
    }

    /// Stable fingerprint over the exact vertex bits.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.vertices.len().hash(&mut hasher);
        for v in &self.vertices {
            v.lat.to_bits().hash(&mut hasher);
            v.lng.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }
}

fn to_coord(p: &GeoPoint) -> Coord<f64> {
    Coord { x: p.lng, y: p.lat }
}

fn same_point(a: &GeoPoint, b: &GeoPoint) -> bool {
    (a.lat - b.lat).abs() <= CLOSURE_TOLERANCE_DEG && (a.lng - b.lng).abs() <= CLOSURE_TOLERANCE_DEG
}

fn validate(vertices: &[GeoPoint]) -> Result<()> {
    let (first, last) = match (vertices.first(), vertices.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return Err(Error::InvalidBoundary("boundary has no vertices".into())),
    };

    if let Some(bad) = vertices.iter().find(|v| !v.is_valid()) {
        return Err(Error::InvalidBoundary(format!(
            "vertex ({}, {}) is outside the valid coordinate range",
            bad.lat, bad.lng
        )));
    }

    if vertices.len() < 2 || !same_point(first, last) {
        return Err(Error::InvalidBoundary(
            "ring is not closed (first and last vertex differ)".into(),
        ));
    }

    let mut ring: Vec<GeoPoint> = Vec::with_capacity(vertices.len());
    for v in vertices {
        if ring.last().is_none_or(|prev| !same_point(prev, v)) {
            ring.push(*v);
        }
    }
    // Closing vertex is the ring's last entry; it repeats the first.
    if ring.len() < 4 {
        return Err(Error::InvalidBoundary(format!(
            "ring needs at least 3 distinct vertices, found {}",
            ring.len().saturating_sub(1)
        )));
    }

    let edges: Vec<Line<f64>> = ring
        .windows(2)
        .map(|w| Line::new(to_coord(&w[0]), to_coord(&w[1])))
        .collect();
    let n = edges.len();
    for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            if edges[i].intersects(&edges[j]) {
                return Err(Error::InvalidBoundary(format!(
                    "ring self-intersects (edges {i} and {j})"
                )));
            }
        }
    }

    let area = Polygon::new(ring.iter().map(to_coord).collect(), Vec::new()).unsigned_area();
    if !(area > MIN_AREA_DEG2) {
        return Err(Error::InvalidBoundary("ring encloses zero area".into()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<GeoPoint> {
        raw.iter().map(|&(lat, lng)| GeoPoint::new(lat, lng)).collect()
    }

    #[test]
    fn accepts_closed_triangle() {
        let b = RegionBoundary::new(pts(&[(0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (0.0, 0.0)])).unwrap();
        assert_eq!(b.vertices().len(), 4);
        assert_relative_eq!(b.area_deg2(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn rejects_open_ring() {
        let err = RegionBoundary::new(pts(&[(0.0, 0.0), (0.0, 1.0), (1.0, 0.0)])).unwrap_err();
        assert!(matches!(err, Error::InvalidBoundary(ref m) if m.contains("not closed")));
    }

    #[test]
    fn closing_appends_first_vertex() {
        let b = RegionBoundary::closing(pts(&[(0.0, 0.0), (0.0, 1.0), (1.0, 0.0)])).unwrap();
        assert_eq!(b.vertices().len(), 4);
        assert_eq!(b.vertices()[0], b.vertices()[3]);
    }

    #[test]
    fn rejects_empty_and_too_few_vertices() {
        assert!(RegionBoundary::new(Vec::new()).is_err());
        let err = RegionBoundary::new(pts(&[(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)])).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn rejects_zero_area_ring() {
        let err = RegionBoundary::new(pts(&[
            (0.0, 0.0),
            (1.0, 1.0),
            (2.0, 2.0),
            (0.0, 0.0),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidBoundary(ref m) if m.contains("zero area")));
    }

    #[test]
    fn rejects_bow_tie() {
        let err = RegionBoundary::new(pts(&[
            (0.0, 0.0),
            (1.0, 1.0),
            (1.0, 0.0),
            (0.0, 1.0),
            (0.0, 0.0),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidBoundary(ref m) if m.contains("self-intersects")));
    }

    #[test]
    fn rejects_out_of_range_vertex() {
        let err = RegionBoundary::new(pts(&[
            (0.0, 0.0),
            (0.0, 181.0),
            (1.0, 0.0),
            (0.0, 0.0),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidBoundary(_)));
    }

    #[test]
    fn repeated_vertices_are_tolerated() {
        let b = RegionBoundary::new(pts(&[
            (0.0, 0.0),
            (0.0, 1.0),
            (0.0, 1.0),
            (1.0, 1.0),
            (1.0, 0.0),
            (0.0, 0.0),
        ]));
        assert!(b.is_ok());
    }

    #[test]
    fn polygon_uses_lng_as_x() {
        let b = RegionBoundary::closing(pts(&[(30.0, -100.0), (30.0, -99.0), (31.0, -99.0)])).unwrap();
        let first = b.to_polygon().exterior().0[0];
        assert_eq!(first.x, -100.0);
        assert_eq!(first.y, 30.0);
    }

    #[test]
    fn fingerprint_tracks_vertices() {
        let a = RegionBoundary::closing(pts(&[(0.0, 0.0), (0.0, 1.0), (1.0, 0.0)])).unwrap();
        let b = RegionBoundary::closing(pts(&[(0.0, 0.0), (0.0, 1.0), (1.0, 0.0)])).unwrap();
        let c = RegionBoundary::closing(pts(&[(0.0, 0.0), (0.0, 2.0), (1.0, 0.0)])).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
