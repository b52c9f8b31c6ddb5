#![forbid(unsafe_code)]

pub mod cooling;
pub mod report;
pub mod scenario;

pub use cooling::{CoolingModel, CoolingWeights};
pub use report::{
    combined_table, scenario_geojson, scored_geojson, scored_table, write_csv, write_json,
    write_scenario_csv,
};
pub use scenario::{
    load_scenario, parse_scenario, Cooling, CoolingDef, Scenario, ScenarioDef, ScenarioResult,
};

use tracing_subscriber::EnvFilter;

/// Installs a fmt subscriber filtered by `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
