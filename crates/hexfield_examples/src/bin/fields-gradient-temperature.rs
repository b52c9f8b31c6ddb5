use h3o::Resolution;
use hexfield::prelude::*;
use hexfield_examples::{init_tracing, scored_geojson, scored_table, write_json};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let bounds = GradientBounds::new(25.83, 36.5, -106.65, -93.51);
    let boundary = RegionBoundary::closing(vec![
        GeoPoint::new(bounds.lat_min, bounds.lng_min),
        GeoPoint::new(bounds.lat_min, bounds.lng_max),
        GeoPoint::new(bounds.lat_max, bounds.lng_max),
        GeoPoint::new(bounds.lat_max, bounds.lng_min),
    ])?;
    let display = DisplayScale::Bounded {
        min_unit: 55.0,
        max_unit: 75.0,
    };

    let mut builder = FieldBuilder::new(H3Tiler::default());
    let gradient = builder.build_gradient_field(
        &boundary,
        &bounds,
        &FieldConfig::new("gradient")
            .with_resolution(Resolution::Four)
            .with_seed(7)
            .with_display(display),
    )?;
    println!("{}", scored_table(&gradient, 10));

    // Interpolated station normals over the same cells, for comparison.
    let text = std::fs::read_to_string(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/assets/texas-temperature-normals.ron"
    ))?;
    let stations: Vec<Station> = ron::from_str(&text)?;
    let normals = IdwModel::new(stations, 2.0)?;
    let interpolated = builder.build_model_field(
        &boundary,
        &normals,
        &FieldConfig::new("normals")
            .with_resolution(Resolution::Four)
            .with_seed(7)
            .with_display(display),
    )?;
    println!("{}", scored_table(&interpolated, 10));

    let mean_gap = gradient
        .iter()
        .zip(interpolated.iter())
        .map(|(a, b)| (a.score - b.score).abs())
        .sum::<f64>()
        / gradient.len() as f64;
    info!(
        "{} cells; mean score gap between gradient and normals {:.3}.",
        gradient.len(),
        mean_gap
    );

    write_json(
        "fields-gradient-temperature.geojson",
        &scored_geojson(&gradient),
    )?;
    Ok(())
}
