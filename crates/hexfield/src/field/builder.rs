//! Field builds: tile a region, sample a model, normalize.
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::field::config::FieldConfig;
use crate::field::events::{EventSink, FieldEvent, FieldEventKind};
use crate::field::{RawField, ScoredField};
use crate::model::{FieldModel, GradientBounds, GradientModel, SourceSet};
use crate::sequence::SeededSequence;
use crate::tiling::{Cell, HexTiler, RegionBoundary, TiledRegion, TilingCache};

/// Samples `model` at the centroid of every cell of `region`.
///
/// With the `parallel` feature the samples are computed on the rayon pool; the result
/// keeps the region's cell order either way.
pub fn build_raw_field<M: FieldModel + ?Sized>(
    region: &TiledRegion,
    model: &M,
) -> Result<RawField> {
    let values = sample_cells(&region.cells, model);

    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(Error::NonFinite {
            cell: region.cells[i].id,
        });
    }

    Ok(RawField {
        resolution: region.resolution,
        cells: region.cells.clone(),
        values,
    })
}

#[cfg(not(feature = "parallel"))]
fn sample_cells<M: FieldModel + ?Sized>(cells: &[Cell], model: &M) -> Vec<f64> {
    cells.iter().map(|c| model.sample(c.centroid)).collect()
}

#[cfg(feature = "parallel")]
fn sample_cells<M: FieldModel + ?Sized>(cells: &[Cell], model: &M) -> Vec<f64> {
    cells.par_iter().map(|c| model.sample(c.centroid)).collect()
}

/// Builds fields over regions produced by one tiler, caching tilings so that fields
/// over the same boundary and resolution share an identical cell set.
pub struct FieldBuilder<T: HexTiler> {
    tiler: T,
    cache: TilingCache,
}

impl<T: HexTiler> FieldBuilder<T> {
    pub fn new(tiler: T) -> Self {
        Self {
            tiler,
            cache: TilingCache::new(),
        }
    }

    pub fn tiler(&self) -> &T {
        &self.tiler
    }

    pub fn cache(&self) -> &TilingCache {
        &self.cache
    }

    /// Tiled region for `boundary` at `resolution`, from the cache when possible.
    pub fn region(
        &mut self,
        boundary: &RegionBoundary,
        resolution: h3o::Resolution,
    ) -> Result<Arc<TiledRegion>> {
        self.cache
            .get_or_tile(&self.tiler, boundary, resolution)
            .map(|(region, _)| region)
    }

    /// Builds the superposition field of `sources`.
    pub fn build_scored_field(
        &mut self,
        boundary: &RegionBoundary,
        sources: &SourceSet,
        config: &FieldConfig,
    ) -> Result<ScoredField> {
        self.build_model_field_with_events(boundary, sources, config, &mut ())
    }

    pub fn build_scored_field_with_events(
        &mut self,
        boundary: &RegionBoundary,
        sources: &SourceSet,
        config: &FieldConfig,
        sink: &mut dyn EventSink,
    ) -> Result<ScoredField> {
        self.build_model_field_with_events(boundary, sources, config, sink)
    }

    /// Builds the closed-form gradient field described by `bounds`.
    pub fn build_gradient_field(
        &mut self,
        boundary: &RegionBoundary,
        bounds: &GradientBounds,
        config: &FieldConfig,
    ) -> Result<ScoredField> {
        self.build_gradient_field_with_events(boundary, bounds, config, &mut ())
    }

    pub fn build_gradient_field_with_events(
        &mut self,
        boundary: &RegionBoundary,
        bounds: &GradientBounds,
        config: &FieldConfig,
        sink: &mut dyn EventSink,
    ) -> Result<ScoredField> {
        let model = GradientModel::new(bounds.clone())?;
        self.build_model_field_with_events(boundary, &model, config, sink)
    }

    /// Builds a field from any [`FieldModel`].
    pub fn build_model_field<M: FieldModel + ?Sized>(
        &mut self,
        boundary: &RegionBoundary,
        model: &M,
        config: &FieldConfig,
    ) -> Result<ScoredField> {
        self.build_model_field_with_events(boundary, model, config, &mut ())
    }

    pub fn build_model_field_with_events<M: FieldModel + ?Sized>(
        &mut self,
        boundary: &RegionBoundary,
        model: &M,
        config: &FieldConfig,
        sink: &mut dyn EventSink,
    ) -> Result<ScoredField> {
        build_internal(&self.tiler, &mut self.cache, boundary, model, config, sink)
    }
}

/// Builds the superposition field of `sources` over a fresh tiling.
pub fn build_scored_field<T: HexTiler + ?Sized>(
    tiler: &T,
    boundary: &RegionBoundary,
    sources: &SourceSet,
    config: &FieldConfig,
) -> Result<ScoredField> {
    build_model_field(tiler, boundary, sources, config)
}

/// Builds the gradient field described by `bounds` over a fresh tiling.
pub fn build_gradient_field<T: HexTiler + ?Sized>(
    tiler: &T,
    boundary: &RegionBoundary,
    bounds: &GradientBounds,
    config: &FieldConfig,
) -> Result<ScoredField> {
    let model = GradientModel::new(bounds.clone())?;
    build_model_field(tiler, boundary, &model, config)
}

pub fn build_model_field<T: HexTiler + ?Sized, M: FieldModel + ?Sized>(
    tiler: &T,
    boundary: &RegionBoundary,
    model: &M,
    config: &FieldConfig,
) -> Result<ScoredField> {
    build_model_field_with_events(tiler, boundary, model, config, &mut ())
}

pub fn build_model_field_with_events<T: HexTiler + ?Sized, M: FieldModel + ?Sized>(
    tiler: &T,
    boundary: &RegionBoundary,
    model: &M,
    config: &FieldConfig,
    sink: &mut dyn EventSink,
) -> Result<ScoredField> {
    let mut cache = TilingCache::new();
    build_internal(tiler, &mut cache, boundary, model, config, sink)
}

fn build_internal<T: HexTiler + ?Sized, M: FieldModel + ?Sized>(
    tiler: &T,
    cache: &mut TilingCache,
    boundary: &RegionBoundary,
    model: &M,
    config: &FieldConfig,
    sink: &mut dyn EventSink,
) -> Result<ScoredField> {
    config.validate()?;
    let label = config.label.as_str();
    let resolution = u8::from(config.resolution);

    info!("Building field '{}' at resolution {}.", label, resolution);
    if sink.wants(FieldEventKind::BuildStarted) {
        sink.send(FieldEvent::BuildStarted {
            label: label.to_owned(),
            resolution,
        });
    }

    let (region, cached) = cache.get_or_tile(tiler, boundary, config.resolution)?;
    if sink.wants(FieldEventKind::RegionTiled) {
        sink.send(FieldEvent::RegionTiled {
            label: label.to_owned(),
            cells: region.len(),
            cached,
        });
    }
    if region.duplicates > 0 && sink.wants(FieldEventKind::Warning) {
        sink.send(FieldEvent::Warning {
            context: label.to_owned(),
            message: format!("tiler returned {} duplicate cells", region.duplicates),
        });
    }

    let raw = build_raw_field(&region, model)?;
    let (min, max) = raw.min_max().ok_or(Error::EmptyTiling { resolution })?;
    debug!("Field '{}' raw range [{}, {}].", label, min, max);
    if sink.wants(FieldEventKind::RawFieldBuilt) {
        sink.send(FieldEvent::RawFieldBuilt {
            label: label.to_owned(),
            min,
            max,
        });
    }

    let mut seq = SeededSequence::new(config.seed);
    let mut field = config.normalizer().normalize(&raw, &mut seq)?;
    field.label = config.label.clone();

    if field.degenerate {
        warn!(
            "Field '{}' is flat; every base score set to zero before jitter.",
            label
        );
        if sink.wants(FieldEventKind::DegenerateRange) {
            sink.send(FieldEvent::DegenerateRange {
                label: label.to_owned(),
                value: min,
            });
        }
    }

    let mean_score = field.mean_score();
    info!(
        "Field '{}' built: {} cells, mean score {:.3}.",
        label,
        field.len(),
        mean_score
    );
    if sink.wants(FieldEventKind::BuildFinished) {
        sink.send(FieldEvent::BuildFinished {
            label: label.to_owned(),
            cells: field.len(),
            mean_score,
        });
    }

    Ok(field)
}
