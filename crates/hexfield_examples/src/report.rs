use std::fmt::Write as _;
use std::io;
use std::path::Path;

use anyhow::Context;
use hexfield::prelude::*;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::scenario::ScenarioResult;

/// Text table of the `n` best cells of a combined field.
pub fn combined_table(field: &CombinedField, n: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Top {} cells by {}", n, field.label);
    let _ = writeln!(
        out,
        "{:<5} {:>8} {:>9} {:>7} {:>6} {:>6}",
        "rank", "lat", "lng", "score", "A", "B"
    );
    for (rank, c) in field.top_n(n).into_iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<5} {:>8.3} {:>9.3} {:>7.3} {:>6} {:>6}",
            rank + 1,
            c.centroid.lat,
            c.centroid.lng,
            c.score,
            c.display_value_a,
            c.display_value_b
        );
    }
    out
}

/// Text table of the `n` best cells of a scored field.
pub fn scored_table(field: &ScoredField, n: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Top {} cells by {}", n, field.label);
    let _ = writeln!(
        out,
        "{:<5} {:>8} {:>9} {:>7} {:>8}",
        "rank", "lat", "lng", "score", "value"
    );
    for (rank, c) in field.top_n(n).into_iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<5} {:>8.3} {:>9.3} {:>7.3} {:>8}",
            rank + 1,
            c.centroid.lat,
            c.centroid.lng,
            c.score,
            c.display_value
        );
    }
    out
}

/// Closed `[lng, lat]` ring of a cell's hexagon (or pentagon).
fn cell_ring(id: CellId) -> Vec<[f64; 2]> {
    let boundary = id.boundary();
    let mut ring: Vec<[f64; 2]> = boundary.iter().map(|ll| [ll.lng(), ll.lat()]).collect();
    if let Some(&first) = ring.first() {
        ring.push(first);
    }
    ring
}

/// GeoJSON feature for a scored field on its own.
pub fn scored_geojson(field: &ScoredField) -> Value {
    let features: Vec<Value> = field
        .iter()
        .map(|c| {
            json!({
                "type": "Feature",
                "geometry": { "type": "Polygon", "coordinates": [cell_ring(c.id)] },
                "properties": {
                    "cell": c.id.to_string(),
                    "raw": c.raw,
                    "score": c.score,
                    "value": c.display_value,
                },
            })
        })
        .collect();
    json!({ "type": "FeatureCollection", "name": field.label, "features": features })
}

/// GeoJSON FeatureCollection with one polygon per cell and the scores of every field.
pub fn scenario_geojson(result: &ScenarioResult) -> Value {
    let features: Vec<Value> = (0..result.combined.len())
        .map(|i| {
            let c = &result.combined.cells[i];
            let mut props = Map::new();
            props.insert("cell".into(), json!(c.id.to_string()));
            props.insert("lat".into(), json!(c.centroid.lat));
            props.insert("lng".into(), json!(c.centroid.lng));
            props.insert("score".into(), json!(c.score));
            let mut scored = vec![&result.surplus, &result.temperature];
            scored.extend(result.cooling.as_ref());
            for field in scored {
                let cell = &field.cells[i];
                props.insert(format!("{}_score", field.label), json!(cell.score));
                props.insert(format!("{}_value", field.label), json!(cell.display_value));
            }
            if let Some(site) = &result.site {
                props.insert("site_score".into(), json!(site.cells[i].score));
            }
            json!({
                "type": "Feature",
                "geometry": { "type": "Polygon", "coordinates": [cell_ring(c.id)] },
                "properties": props,
            })
        })
        .collect();
    json!({
        "type": "FeatureCollection",
        "name": result.combined.label,
        "features": features,
    })
}

/// One CSV row per cell.
#[derive(Serialize)]
struct CsvRow {
    cell: String,
    lat: f64,
    lng: f64,
    surplus_score: f64,
    surplus_value: i64,
    temperature_score: f64,
    temperature_value: i64,
    combined_score: f64,
    cooling_score: Option<f64>,
    cooling_value: Option<i64>,
    site_score: Option<f64>,
}

/// Writes every cell of `result` as CSV. Cooling columns are empty when the scenario
/// has no cooling field.
pub fn write_scenario_csv<W: io::Write>(writer: W, result: &ScenarioResult) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (i, c) in result.combined.iter().enumerate() {
        let surplus = &result.surplus.cells[i];
        let temperature = &result.temperature.cells[i];
        let cooling = result.cooling.as_ref().map(|f| &f.cells[i]);
        wtr.serialize(CsvRow {
            cell: c.id.to_string(),
            lat: c.centroid.lat,
            lng: c.centroid.lng,
            surplus_score: surplus.score,
            surplus_value: surplus.display_value,
            temperature_score: temperature.score,
            temperature_value: temperature.display_value,
            combined_score: c.score,
            cooling_score: cooling.map(|cell| cell.score),
            cooling_value: cooling.map(|cell| cell.display_value),
            site_score: result.site.as_ref().map(|f| f.cells[i].score),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv(path: impl AsRef<Path>, result: &ScenarioResult) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_scenario_csv(io::BufWriter::new(file), result)
        .with_context(|| format!("writing {}", path.display()))
}

pub fn write_json(path: impl AsRef<Path>, value: &Value) -> anyhow::Result<()> {
    let path = path.as_ref();
    let text = serde_json::to_string(value)?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}
