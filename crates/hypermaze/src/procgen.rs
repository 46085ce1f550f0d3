//! Maze generation: dimension-by-dimension expansion over the cell forest.
//!
//! The builder grows the maze from the all-zero seed cell one dimension at a
//! time, highest index first. Creating a neighbor along dimension `d` closes
//! the grid of neighbors in every higher dimension before the walk advances,
//! and decides the bound bit between each fresh pair of cells. Once dimension
//! 0 advances past a cell, that cell's mask is final: it is written into the
//! bound grid and dropped from the forest.
//!
//! The expansion pass alone does not connect everything, so a joining phase
//! walks each remaining set breadth-first and forces one bound open toward a
//! foreign set, repeating passes until a single set remains.

use std::collections::VecDeque;

use crate::bits;
use crate::config::DimensionConfig;
use crate::forest::{CellId, Forest};
use crate::rng::RandomSource;
use crate::world::BoundGrid;
use crate::GenerateError;

pub(crate) struct MazeBuilder<'a> {
    config: &'a DimensionConfig,
    rng: &'a mut RandomSource,
    forest: Forest,
    grid: BoundGrid,
}

impl<'a> MazeBuilder<'a> {
    pub fn new(config: &'a DimensionConfig, rng: &'a mut RandomSource) -> Self {
        Self {
            rng,
            forest: Forest::new(config.dims()),
            grid: BoundGrid::new(config),
            config,
        }
    }

    pub fn build(mut self) -> Result<BoundGrid, GenerateError> {
        let seed = self.forest.create_cell(self.config.origin());
        for d in (0..self.config.dims()).rev() {
            self.expand_dimension(d, seed);
        }
        self.join_sets()?;
        let root = self.forest.roots().first().copied();
        if let Some(root) = root {
            self.write_set(root);
        }
        Ok(self.grid)
    }

    #[inline]
    fn dims(&self) -> usize {
        self.config.dims()
    }

    /// Walk along dimension `d` from `from`, creating each next cell.
    fn expand_dimension(&mut self, d: usize, from: CellId) {
        let mut current = from;
        for _ in 0..(self.config.size(d) - 1) {
            current = self.ensure_neighbor(current, d);
        }
    }

    /// The neighbor of `cell` in dimension `d`, created on demand.
    ///
    /// Creation defines the bound between the pair, then asks every existing
    /// higher-dimension neighbor for its own `d`-neighbor so the fresh cell
    /// ends up fully linked sideways. The recursion steps through the extent
    /// of the already-expanded dimensions (see DESIGN.md). When `d` is 0 the
    /// current cell has no undecided bounds left and is finalized.
    fn ensure_neighbor(&mut self, cell: CellId, d: usize) -> CellId {
        if let Some(neighbor) = self.forest.neighbor(cell, d) {
            return neighbor;
        }

        let mut coords = self.forest.node(cell).coords;
        coords[d] += 1;
        let neighbor = self.forest.create_cell(coords);
        self.forest.set_neighbor(cell, d, neighbor);
        self.define_bound(cell, d);

        for n in ((d + 1)..self.dims()).rev() {
            if let Some(upper) = self.forest.neighbor(cell, n) {
                let across = self.ensure_neighbor(upper, d);
                self.forest.set_neighbor(neighbor, n, across);
                self.define_bound(neighbor, n);
            }
        }

        if d == 0 {
            self.finalize(cell);
        }
        neighbor
    }

    /// Decide the bound bit of `cell` in dimension `d`.
    ///
    /// Random by default; forced closed when the neighbor already shares the
    /// set or the cell sits at the dimension's end; forced open for a
    /// parentless cell in dimension 0 so no root is left stranded by the
    /// expansion pass. Opening merges the neighbor's set into this one.
    fn define_bound(&mut self, cell: CellId, d: usize) {
        let mut closed = self.rng.rand_int(0, 1) == 1;
        let at_end = self
            .config
            .at_dimension_end(&self.forest.node(cell).coords, d);
        if self.same_set_as_neighbor(cell, d) || at_end {
            closed = true;
        }
        if self.must_extend(cell, d) {
            closed = false;
        }

        let mask = self.forest.node(cell).bounds;
        self.set_bounds(cell, bits::set_bit(mask, d, closed));

        if !closed {
            self.add_neighbor_to_set(cell, d);
        }
    }

    /// Open the bound unconditionally, bypassing the usual rules.
    fn force_open_bound(&mut self, cell: CellId, d: usize) {
        let mask = self.forest.node(cell).bounds;
        self.set_bounds(cell, bits::set_bit(mask, d, false));
        self.add_neighbor_to_set(cell, d);
    }

    fn set_bounds(&mut self, cell: CellId, mask: u16) {
        self.forest.set_bounds(cell, mask);
    }

    fn same_set_as_neighbor(&self, cell: CellId, d: usize) -> bool {
        match self.forest.neighbor(cell, d) {
            Some(neighbor) => self.forest.same_set(cell, neighbor),
            None => false,
        }
    }

    /// A parentless cell in dimension 0 must keep extending its set unless it
    /// already sits at the end of the dimension.
    fn must_extend(&self, cell: CellId, d: usize) -> bool {
        d == 0
            && self.forest.node(cell).parent.is_none()
            && !self.config.at_dimension_end(&self.forest.node(cell).coords, d)
    }

    fn add_neighbor_to_set(&mut self, cell: CellId, d: usize) {
        let Some(neighbor) = self.forest.neighbor(cell, d) else {
            return;
        };
        if self.forest.same_set(cell, neighbor) {
            return;
        }
        self.forest.merge(neighbor, cell);
    }

    /// Join pass: while more than one set remains, let every root walk its
    /// set breadth-first and force one bound open toward a foreign set.
    ///
    /// Convergence relies on some root finding a cross-set neighbor each
    /// pass; the ceiling turns a stalled loop into an error instead of
    /// spinning forever.
    fn join_sets(&mut self) -> Result<(), GenerateError> {
        let ceiling = 4 * self.config.cell_count() + 64;
        let mut passes = 0usize;

        while self.forest.root_count() > 1 {
            self.forest.prune_roots();
            self.forest.dedup_roots();

            if self.forest.root_count() > 1 {
                let mut i = 0;
                while i < self.forest.root_count() {
                    let root = self.forest.root_at(i);
                    self.merge_from(root);
                    i += 1;
                }
            }

            passes += 1;
            log::debug!(
                "join pass {passes}: {} sets remaining",
                self.forest.root_count()
            );
            if passes > ceiling {
                return Err(GenerateError::JoinPassCeiling { passes });
            }
        }
        Ok(())
    }

    /// Breadth-first walk of `root`'s set; stops at the first cell that can
    /// open a bound toward another set.
    fn merge_from(&mut self, root: CellId) {
        let mut queue = VecDeque::new();
        queue.push_back(root);
        while let Some(current) = queue.pop_front() {
            if self.random_merge(current) {
                return;
            }
            queue.extend(self.forest.node(current).children.iter().copied());
        }
    }

    /// Force open one bound toward a uniformly chosen foreign neighbor.
    fn random_merge(&mut self, cell: CellId) -> bool {
        let foreign: Vec<usize> = (0..self.dims())
            .filter(|&d| {
                self.forest.neighbor(cell, d).is_some() && !self.same_set_as_neighbor(cell, d)
            })
            .collect();
        if foreign.is_empty() {
            return false;
        }
        let d = foreign[self.rng.rand_int(0, foreign.len() as i32 - 1) as usize];
        self.force_open_bound(cell, d);
        true
    }

    /// Write the cell's final mask into the grid and detach it from its set.
    fn finalize(&mut self, cell: CellId) {
        let (coords, bounds) = {
            let node = self.forest.node(cell);
            (node.coords, node.bounds)
        };
        self.grid.set(&coords, bounds);
        self.forest.remove_from_set(cell);
    }

    /// Recursively write an entire surviving set into the grid, children
    /// first. Removal substitutes cells around, so the child list is re-read
    /// every iteration.
    fn write_set(&mut self, cell: CellId) {
        loop {
            let first = self.forest.node(cell).children.first().copied();
            match first {
                Some(first) => self.write_set(first),
                None => break,
            }
        }
        self.finalize(cell);
    }
}
