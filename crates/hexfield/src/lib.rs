#![forbid(unsafe_code)]
//! hexfield: seeded, reproducible score fields over hexagonal tilings of geographic regions.
//!
//! Modules:
//! - sequence: the linear-congruential jitter sequence
//! - tiling: region boundaries, the hex tiler contract, H3 tiling and the tiling cache
//! - model: raw scalar models (Gaussian sources and corridors, gradients, IDW interpolation)
//! - field: raw fields, normalization, builders, composites, ranking, events
//!
//! For a full pipeline, see the `hexfield_examples` crate.
pub mod error;
pub mod field;
pub mod model;
pub mod sequence;
pub mod tiling;

/// Convenient re-exports for common types. Import with `use hexfield::prelude::*;`.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::field::{
        build_combined_field, build_gradient_field, build_model_field, build_raw_field,
        build_scored_field, combine, normalize, parse_resolution, CombineOp, CombinedCell,
        CombinedField, DegeneratePolicy, DisplayScale, EventSink, FieldBuilder, FieldConfig,
        FieldEvent, FieldEventKind, FnSink, MultiSink, Normalizer, RawField, ScoredCell,
        ScoredField, VecSink,
    };
    pub use crate::model::{
        evaluate, CorridorSource, FieldModel, GradientBounds, GradientModel, IdwModel,
        InfluenceSource, SourceSet, Station,
    };
    pub use crate::sequence::SeededSequence;
    pub use crate::tiling::{
        tile_region, Cell, CellId, Containment, GeoPoint, H3Tiler, HexTiler, RegionBoundary,
        TiledRegion, TilingCache,
    };
}
