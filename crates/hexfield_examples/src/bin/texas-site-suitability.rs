use hexfield::prelude::*;
use hexfield_examples::{
    combined_table, init_tracing, load_scenario, scenario_geojson, scored_table, write_csv,
    write_json,
};
use tracing::{debug, info};

fn main() -> anyhow::Result<()> {
    init_tracing();

    // Usage: texas-site-suitability [scenario.ron] [out.geojson]
    let mut args = std::env::args().skip(1);
    let scenario_path = args.next().unwrap_or_else(|| {
        concat!(env!("CARGO_MANIFEST_DIR"), "/assets/texas.ron").to_string()
    });
    let out = args
        .next()
        .unwrap_or_else(|| "texas-site-suitability.geojson".to_string());

    let scenario = load_scenario(&scenario_path)?;
    info!(
        "Scenario '{}': {} sources, {} corridors.",
        scenario.name,
        scenario.sources.sources().len(),
        scenario.sources.corridors().len()
    );

    let mut sink = FnSink::new(|event: FieldEvent| debug!("{:?}", event));
    let result = scenario.run(&mut sink)?;

    println!("{}", combined_table(&result.combined, scenario.top));
    println!("{}", scored_table(&result.surplus, scenario.top));
    println!("{}", scored_table(&result.temperature, scenario.top));
    if let (Some(cooling), Some(site)) = (&result.cooling, &result.site) {
        println!("{}", scored_table(cooling, scenario.top));
        println!("{}", combined_table(site, scenario.top));
    }

    write_json(&out, &scenario_geojson(&result))?;
    let csv_out = std::path::Path::new(&out).with_extension("csv");
    write_csv(&csv_out, &result)?;
    info!(
        "Wrote {} cells to {} and {}.",
        result.combined.len(),
        out,
        csv_out.display()
    );

    Ok(())
}
