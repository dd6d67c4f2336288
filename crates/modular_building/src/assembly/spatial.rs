//! Uniform hash grid over connector positions.
//!
//! Positions are quantized into cubic cells of `cell_size`. With `cell_size >= radius`,
//! every point strictly closer than `radius` to a query position lies in the query
//! cell or one of its 26 neighbours, so probing those cells and then applying the
//! exact distance test yields the same result set as a full scan.
use std::collections::HashMap;

use glam::{IVec3, Vec3};

#[derive(Clone, Debug)]
pub(crate) struct SpatialHash {
    cell_size: f32,
    cells: HashMap<IVec3, Vec<usize>>,
}

impl SpatialHash {
    #[cfg(test)]
    pub(crate) fn new(cell_size: f32) -> Self {
        debug_assert!(cell_size > 0.0, "cell_size must be > 0");
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    pub(crate) fn with_capacity(cell_size: f32, capacity: usize) -> Self {
        debug_assert!(cell_size > 0.0, "cell_size must be > 0");
        Self {
            cell_size,
            cells: HashMap::with_capacity(capacity),
        }
    }

    #[inline]
    fn cell_of(&self, p: Vec3) -> IVec3 {
        (p / self.cell_size).floor().as_ivec3()
    }

    pub(crate) fn insert(&mut self, p: Vec3, index: usize) {
        let cell = self.cell_of(p);
        self.cells.entry(cell).or_default().push(index);
    }

    /// Calls `visit` for every stored index in the 3x3x3 block of cells around `p`.
    ///
    /// Far coordinates clamp to the `i32` range in [`Self::cell_of`], so the block is
    /// cut at the border instead of wrapping. Each cell is visited once.
    pub(crate) fn for_each_near(&self, p: Vec3, mut visit: impl FnMut(usize)) {
        let center = self.cell_of(p);
        let around = |c: i32| c.saturating_sub(1)..=c.saturating_add(1);
        for z in around(center.z) {
            for y in around(center.y) {
                for x in around(center.x) {
                    let cell = IVec3::new(x, y, z);
                    if let Some(indices) = self.cells.get(&cell) {
                        for &i in indices {
                            visit(i);
                        }
                    }
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn cell_count(&self) -> usize {
        self.cells.len()
    }
}
