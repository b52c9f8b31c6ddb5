use std::time::Duration;

use criterion::{Criterion, Throughput};
use hexfield::prelude::{GeoPoint, InfluenceSource, RegionBoundary, SeededSequence, SourceSet};

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(3);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn cells_throughput(cells: usize) -> Throughput {
    Throughput::Elements(cells.max(1) as u64)
}

/// Rectangle of `size` degrees with its south-west corner at (`lat`, `lng`).
pub fn rectangle(lat: f64, lng: f64, size: f64) -> RegionBoundary {
    RegionBoundary::closing(vec![
        GeoPoint::new(lat, lng),
        GeoPoint::new(lat, lng + size),
        GeoPoint::new(lat + size, lng + size),
        GeoPoint::new(lat + size, lng),
    ])
    .expect("valid rectangle")
}

/// `count` pseudo-random sources inside the rectangle, alternating supply and demand.
pub fn scattered_sources(count: usize, lat: f64, lng: f64, size: f64, seed: u32) -> SourceSet {
    let mut seq = SeededSequence::new(seed);
    let sources = (0..count)
        .map(|i| {
            let sign = if i % 3 == 2 { -1.0 } else { 1.0 };
            InfluenceSource::new(
                lat + seq.next_unit() * size,
                lng + seq.next_unit() * size,
                sign * (0.2 + seq.next_unit()),
                0.2 + seq.next_unit(),
                0.2 + seq.next_unit(),
            )
        })
        .collect();
    SourceSet::new(sources).expect("valid sources")
}
