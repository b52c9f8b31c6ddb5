//! Cache for tiled regions.
//!
//! This module provides a cache that maps a boundary fingerprint and resolution to a
//! [`TiledRegion`], so that several fields built over the same region reuse one cell set.
//!
//! Typical usage:
//! - Look up a region with [`TilingCache::get_or_tile`] by passing a [`HexTiler`], the
//!   [`RegionBoundary`] and the resolution.
//! - Keep one cache per tiler; entries do not record which tiler produced them.
use std::collections::HashMap;
use std::sync::Arc;

use h3o::Resolution;
use tracing::debug;

use crate::error::Result;
use crate::tiling::{tile_region, HexTiler, RegionBoundary, TiledRegion};

type CacheKey = (u64, u8);

/// Cache of tiled regions keyed by boundary fingerprint and resolution.
///
/// Each entry keeps its boundary; a lookup only hits when the stored boundary equals the
/// requested one, so fingerprint collisions never return another region's cells.
#[derive(Default)]
pub struct TilingCache {
    entries: HashMap<CacheKey, Vec<(RegionBoundary, Arc<TiledRegion>)>>,
}

impl TilingCache {
    /// Creates a new, empty cache.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Returns the number of cached regions.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Returns `true` if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Gets the cached region for `boundary` at `resolution`, if present.
    pub fn get(&self, boundary: &RegionBoundary, resolution: Resolution) -> Option<Arc<TiledRegion>> {
        self.lookup(key(boundary, resolution), boundary)
    }

    /// Removes the cached region for `boundary` at `resolution`, returning it if it existed.
    pub fn remove(
        &mut self,
        boundary: &RegionBoundary,
        resolution: Resolution,
    ) -> Option<Arc<TiledRegion>> {
        let k = key(boundary, resolution);
        let bucket = self.entries.get_mut(&k)?;
        let pos = bucket.iter().position(|(b, _)| b == boundary)?;
        let (_, region) = bucket.swap_remove(pos);
        if bucket.is_empty() {
            self.entries.remove(&k);
        }
        Some(region)
    }

    /// Clears all entries from the cache.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Gets the region for `boundary` at `resolution`, tiling and caching it if necessary.
    ///
    /// The returned flag is `true` when the region came from the cache.
    pub fn get_or_tile<T: HexTiler + ?Sized>(
        &mut self,
        tiler: &T,
        boundary: &RegionBoundary,
        resolution: Resolution,
    ) -> Result<(Arc<TiledRegion>, bool)> {
        self.get_or_tile_keyed(tiler, boundary, resolution, key(boundary, resolution))
    }

    fn get_or_tile_keyed<T: HexTiler + ?Sized>(
        &mut self,
        tiler: &T,
        boundary: &RegionBoundary,
        resolution: Resolution,
        k: CacheKey,
    ) -> Result<(Arc<TiledRegion>, bool)> {
        if let Some(region) = self.lookup(k, boundary) {
            debug!(
                "Tiling cache hit at resolution {} ({} cells).",
                k.1,
                region.len()
            );
            return Ok((region, true));
        }

        let region = Arc::new(tile_region(tiler, boundary, resolution)?);
        debug!(
            "Tiled region at resolution {} into {} cells.",
            k.1,
            region.len()
        );
        self.entries
            .entry(k)
            .or_default()
            .push((boundary.clone(), region.clone()));
        Ok((region, false))
    }

    fn lookup(&self, k: CacheKey, boundary: &RegionBoundary) -> Option<Arc<TiledRegion>> {
        self.entries
            .get(&k)?
            .iter()
            .find(|(b, _)| b == boundary)
            .map(|(_, region)| region.clone())
    }
}

fn key(boundary: &RegionBoundary, resolution: Resolution) -> CacheKey {
    (boundary.fingerprint(), u8::from(resolution))
}
