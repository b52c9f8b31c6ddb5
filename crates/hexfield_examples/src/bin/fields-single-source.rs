use h3o::Resolution;
use hexfield::prelude::*;
use hexfield_examples::{init_tracing, scored_geojson, scored_table, write_json};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let plant = InfluenceSource::isotropic(32.0, -97.0, 1.0, 1.0).named("plant");
    let sources = SourceSet::new(vec![plant.clone()])?;
    info!(
        "Raw value at the source location: {}.",
        evaluate(plant.location(), &sources)
    );

    // A sink of equal magnitude at the same location cancels the source exactly.
    let cancelled = SourceSet::new(vec![
        plant.clone(),
        InfluenceSource::isotropic(32.0, -97.0, -1.0, 1.0).named("load"),
    ])?;
    info!(
        "Raw value with an opposing sink: {}.",
        evaluate(plant.location(), &cancelled)
    );

    let boundary = RegionBoundary::closing(vec![
        GeoPoint::new(30.5, -98.5),
        GeoPoint::new(30.5, -95.5),
        GeoPoint::new(33.5, -95.5),
        GeoPoint::new(33.5, -98.5),
    ])?;
    let config = FieldConfig::new("single-source")
        .with_resolution(Resolution::Five)
        .with_seed(42)
        .with_jitter_amplitude(0.05);

    let mut sink = VecSink::new();
    let mut builder = FieldBuilder::new(H3Tiler::default());
    let field = builder.build_scored_field_with_events(&boundary, &sources, &config, &mut sink)?;
    info!("{} events recorded.", sink.len());

    println!("{}", scored_table(&field, 10));

    // A cancelled field is flat; the default policy scores it as zero plus jitter.
    let flat = builder.build_scored_field(
        &boundary,
        &SourceSet::new(vec![
            InfluenceSource::isotropic(32.0, -97.0, 0.0, 1.0).named("idle"),
        ])?,
        &FieldConfig::new("flat").with_resolution(Resolution::Five),
    )?;
    info!(
        "Flat field: degenerate = {}, mean score {:.4}.",
        flat.degenerate,
        flat.mean_score()
    );

    write_json("fields-single-source.geojson", &scored_geojson(&field))?;
    Ok(())
}
