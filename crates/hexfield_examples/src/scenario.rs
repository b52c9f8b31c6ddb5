use std::path::Path;

use anyhow::Context;
use hexfield::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cooling::{CoolingModel, CoolingWeights};

/// A complete site-suitability scenario as stored in a RON file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScenarioDef {
    pub name: String,
    /// Region outline as `(lat, lng)` pairs. The ring is closed automatically.
    pub boundary: Vec<(f64, f64)>,
    pub resolution: u8,
    #[serde(default)]
    pub containment: Containment,
    pub surplus: SurplusDef,
    pub temperature: TemperatureDef,
    #[serde(default)]
    pub combine: CombineOp,
    /// Optional water and cooling field, blended with the surplus into a site score.
    #[serde(default)]
    pub cooling: Option<CoolingDef>,
    #[serde(default = "default_top")]
    pub top: usize,
}

fn default_top() -> usize {
    10
}

/// Normalization settings shared by every field definition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldDef {
    pub label: String,
    pub seed: u32,
    pub jitter: f64,
    #[serde(default)]
    pub display: DisplayScale,
    #[serde(default)]
    pub degenerate: DegeneratePolicy,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SurplusDef {
    pub field: FieldDef,
    pub sources: Vec<InfluenceSource>,
    #[serde(default)]
    pub corridors: Vec<CorridorSource>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TemperatureDef {
    pub field: FieldDef,
    pub model: TemperatureModelDef,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TemperatureModelDef {
    Gradient(GradientBounds),
    Stations { stations: Vec<Station>, power: f64 },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoolingDef {
    pub field: FieldDef,
    /// River-basin water availability on a 0..100 scale.
    pub basins: Vec<Station>,
    #[serde(default = "default_basin_power")]
    pub basin_power: f64,
    /// Annual mean temperatures in °F.
    pub normals: Vec<Station>,
    #[serde(default = "default_normals_power")]
    pub normals_power: f64,
    /// `(coolest, hottest)` annual mean in °F.
    #[serde(default = "default_temperature_range")]
    pub temperature_range: (f64, f64),
    #[serde(default)]
    pub weights: CoolingWeights,
    /// How the surplus and cooling fields form the site score.
    #[serde(default = "default_site_op")]
    pub site: CombineOp,
}

fn default_basin_power() -> f64 {
    1.5
}

fn default_normals_power() -> f64 {
    2.0
}

fn default_temperature_range() -> (f64, f64) {
    (55.0, 74.5)
}

fn default_site_op() -> CombineOp {
    CombineOp::WeightedSum {
        weight_a: 0.55,
        weight_b: 0.45,
    }
}

/// Cooling field settings resolved from a [`CoolingDef`].
#[derive(Debug)]
pub struct Cooling {
    pub config: FieldConfig,
    pub model: CoolingModel,
    pub site: CombineOp,
}

/// Temperature model resolved from a [`TemperatureModelDef`].
#[derive(Debug)]
pub enum TemperatureModel {
    Gradient(GradientBounds),
    Stations(IdwModel),
}

/// A validated scenario ready to build.
#[derive(Debug)]
pub struct Scenario {
    pub name: String,
    pub boundary: RegionBoundary,
    pub containment: Containment,
    pub surplus_config: FieldConfig,
    pub sources: SourceSet,
    pub temperature_config: FieldConfig,
    pub temperature: TemperatureModel,
    pub combine: CombineOp,
    pub cooling: Option<Cooling>,
    pub top: usize,
}

impl FieldDef {
    fn to_config(&self, resolution: h3o::Resolution) -> Result<FieldConfig> {
        let config = FieldConfig::new(self.label.clone())
            .with_resolution(resolution)
            .with_seed(self.seed)
            .with_jitter_amplitude(self.jitter)
            .with_display(self.display)
            .with_degenerate_policy(self.degenerate);
        config.validate()?;
        Ok(config)
    }
}

impl CoolingDef {
    fn into_cooling(self, resolution: h3o::Resolution) -> Result<Cooling> {
        self.site.validate()?;
        let water = IdwModel::new(self.basins, self.basin_power)?;
        let normals = IdwModel::new(self.normals, self.normals_power)?;
        Ok(Cooling {
            config: self.field.to_config(resolution)?,
            model: CoolingModel::new(water, normals, self.temperature_range, self.weights)?,
            site: self.site,
        })
    }
}

impl TryFrom<TemperatureModelDef> for TemperatureModel {
    type Error = Error;

    fn try_from(def: TemperatureModelDef) -> Result<Self> {
        match def {
            TemperatureModelDef::Gradient(bounds) => {
                bounds.validate()?;
                Ok(TemperatureModel::Gradient(bounds))
            }
            TemperatureModelDef::Stations { stations, power } => {
                Ok(TemperatureModel::Stations(IdwModel::new(stations, power)?))
            }
        }
    }
}

impl TryFrom<ScenarioDef> for Scenario {
    type Error = Error;

    fn try_from(def: ScenarioDef) -> Result<Self> {
        let resolution = parse_resolution(def.resolution)?;
        let boundary = RegionBoundary::closing(
            def.boundary
                .iter()
                .map(|&(lat, lng)| GeoPoint::new(lat, lng))
                .collect(),
        )?;
        let sources = SourceSet::with_corridors(def.surplus.sources, def.surplus.corridors)?;
        def.combine.validate()?;

        Ok(Scenario {
            name: def.name,
            boundary,
            containment: def.containment,
            surplus_config: def.surplus.field.to_config(resolution)?,
            sources,
            temperature_config: def.temperature.field.to_config(resolution)?,
            temperature: def.temperature.model.try_into()?,
            combine: def.combine,
            cooling: def
                .cooling
                .map(|c| c.into_cooling(resolution))
                .transpose()?,
            top: def.top,
        })
    }
}

/// Fields produced by running a [`Scenario`].
pub struct ScenarioResult {
    pub surplus: ScoredField,
    pub temperature: ScoredField,
    pub combined: CombinedField,
    pub cooling: Option<ScoredField>,
    /// Surplus blended with cooling, present when the scenario has a cooling field.
    pub site: Option<CombinedField>,
}

impl Scenario {
    /// Builds both fields over one shared tiling and combines them.
    pub fn run(&self, sink: &mut dyn EventSink) -> Result<ScenarioResult> {
        let mut builder = FieldBuilder::new(H3Tiler::new(self.containment));
        let surplus = builder.build_scored_field_with_events(
            &self.boundary,
            &self.sources,
            &self.surplus_config,
            sink,
        )?;
        let temperature = match &self.temperature {
            TemperatureModel::Gradient(bounds) => builder.build_gradient_field_with_events(
                &self.boundary,
                bounds,
                &self.temperature_config,
                sink,
            )?,
            TemperatureModel::Stations(model) => builder.build_model_field_with_events(
                &self.boundary,
                model,
                &self.temperature_config,
                sink,
            )?,
        };
        let combined = combine(&surplus, &temperature, self.combine)?;

        let (cooling, site) = match &self.cooling {
            Some(c) => {
                let field = builder.build_model_field_with_events(
                    &self.boundary,
                    &c.model,
                    &c.config,
                    sink,
                )?;
                let site = combine(&surplus, &field, c.site)?;
                (Some(field), Some(site))
            }
            None => (None, None),
        };

        Ok(ScenarioResult {
            surplus,
            temperature,
            combined,
            cooling,
            site,
        })
    }
}

/// Parses a scenario from RON text.
pub fn parse_scenario(text: &str) -> anyhow::Result<Scenario> {
    let def: ScenarioDef = ron::from_str(text).context("parsing scenario RON")?;
    Ok(Scenario::try_from(def)?)
}

/// Reads and parses a scenario file.
pub fn load_scenario(path: impl AsRef<Path>) -> anyhow::Result<Scenario> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading scenario {}", path.display()))?;
    parse_scenario(&text).with_context(|| format!("loading scenario {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"(
        name: "small",
        boundary: [(31.0, -98.0), (31.0, -97.0), (32.0, -97.0), (32.0, -98.0)],
        resolution: 5,
        surplus: (
            field: (label: "surplus", seed: 1, jitter: 0.05, display: Magnitude(scale_max: 500.0)),
            sources: [
                (name: "plant", lat: 31.5, lng: -97.5, weight: 1.0, radius_lat: 0.4, radius_lng: 0.6),
                (lat: 31.9, lng: -97.1, weight: -0.5, radius_lat: 0.2, radius_lng: 0.2),
            ],
            corridors: [
                (from: (lat: 31.0, lng: -98.0), to: (lat: 32.0, lng: -97.0), weight: 0.3, radius: 0.1),
            ],
        ),
        temperature: (
            field: (label: "temperature", seed: 2, jitter: 0.02,
                    display: Bounded(min_unit: 55.0, max_unit: 75.0)),
            model: Gradient((lat_min: 25.83, lat_max: 36.5, lng_min: -106.65, lng_max: -93.51)),
        ),
        top: 3,
    )"#;

    #[test]
    fn parses_and_converts() {
        let s = parse_scenario(SMALL).unwrap();
        assert_eq!(s.name, "small");
        assert_eq!(s.sources.sources().len(), 2);
        assert_eq!(s.sources.corridors().len(), 1);
        assert_eq!(s.surplus_config.seed, 1);
        assert_eq!(s.combine, CombineOp::Suitability);
        assert_eq!(s.containment, Containment::Covers);
        assert_eq!(s.top, 3);
        assert!(matches!(s.temperature, TemperatureModel::Gradient(ref b) if b.lat_weight == 0.7));
    }

    #[test]
    fn runs_end_to_end() {
        let s = parse_scenario(SMALL).unwrap();
        let result = s.run(&mut ()).unwrap();
        assert_eq!(result.surplus.len(), result.temperature.len());
        assert_eq!(result.combined.len(), result.surplus.len());
        assert!(result
            .combined
            .iter()
            .all(|c| (0.0..=1.0).contains(&c.score)));
    }

    const COOLING: &str = r#"cooling: Some((
            field: (label: "cooling", seed: 5, jitter: 0.02),
            basins: [
                (name: "Sabine", lat: 31.5, lng: -94.0, value: 92.0),
                (name: "Pecos", lat: 30.5, lng: -102.5, value: 12.0),
            ],
            normals: [
                (lat: 26.2, lng: -97.7, value: 73.5),
                (lat: 35.2, lng: -101.8, value: 57.6),
            ],
        )),
        top: 3,"#;

    #[test]
    fn cooling_is_optional_and_defaults_apply() {
        let plain = parse_scenario(SMALL).unwrap();
        assert!(plain.cooling.is_none());
        let result = plain.run(&mut ()).unwrap();
        assert!(result.cooling.is_none());
        assert!(result.site.is_none());

        let s = parse_scenario(&SMALL.replace("top: 3,", COOLING)).unwrap();
        let cooling = s.cooling.as_ref().unwrap();
        assert_eq!(
            cooling.site,
            CombineOp::WeightedSum {
                weight_a: 0.55,
                weight_b: 0.45
            }
        );
        assert_eq!(cooling.config.label, "cooling");
    }

    #[test]
    fn cooling_builds_site_score_over_shared_cells() {
        let s = parse_scenario(&SMALL.replace("top: 3,", COOLING)).unwrap();
        let mut sink = VecSink::new();
        let result = s.run(&mut sink).unwrap();
        let cooling = result.cooling.as_ref().unwrap();
        let site = result.site.as_ref().unwrap();
        assert!(cooling.ids().eq(result.surplus.ids()));
        assert_eq!(site.len(), result.surplus.len());
        assert!(site.iter().all(|c| (0.0..=1.0).contains(&c.score)));
        let finished = sink
            .as_slice()
            .iter()
            .filter(|e| e.kind() == FieldEventKind::BuildFinished)
            .count();
        assert_eq!(finished, 3);
        assert!(sink
            .as_slice()
            .iter()
            .any(|e| matches!(e, FieldEvent::RegionTiled { label, cached: true, .. } if label == "cooling")));
    }

    #[test]
    fn cooling_without_basins_is_rejected() {
        let def = COOLING.replace(
            r#"basins: [
                (name: "Sabine", lat: 31.5, lng: -94.0, value: 92.0),
                (name: "Pecos", lat: 30.5, lng: -102.5, value: 12.0),
            ],"#,
            "basins: [],",
        );
        let err = parse_scenario(&SMALL.replace("top: 3,", &def)).unwrap_err();
        assert!(err.downcast_ref::<Error>().unwrap().is_configuration());
    }

    #[test]
    fn bundled_texas_scenario_loads() {
        let s = load_scenario(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/texas.ron")).unwrap();
        assert_eq!(s.name, "texas-site-suitability");
        assert_eq!(s.sources.corridors().len(), 13);
        let cooling = s.cooling.as_ref().unwrap();
        assert_eq!(cooling.config.label, "cooling");
        assert_eq!(s.top, 15);
    }

    #[test]
    fn zero_radius_is_rejected() {
        let bad = SMALL.replace("radius_lat: 0.4", "radius_lat: 0.0");
        let err = parse_scenario(&bad).unwrap_err();
        let core = err.downcast_ref::<Error>().unwrap();
        assert!(core.is_configuration());
    }

    #[test]
    fn degenerate_boundary_is_rejected() {
        let bad = SMALL.replace(
            "[(31.0, -98.0), (31.0, -97.0), (32.0, -97.0), (32.0, -98.0)]",
            "[(31.0, -98.0), (31.5, -97.5), (32.0, -97.0)]",
        );
        let err = parse_scenario(&bad).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidBoundary(_))
        ));
    }
}
