//! Connectivity-tracking forest used while a maze is under construction.
//!
//! Every cell is a node in a tree; a tree is one connected component ("set")
//! and the forest is the list of tree roots. Cells live in an arena and refer
//! to each other by index, so merges and removals are pointer-rewrites on
//! plain data.
//!
//! Each set is kept a max-heap over the cell ordering (descending
//! lexicographic coordinates, child count as an unreachable tiebreak): a
//! parent never orders below its largest child. The heap shape is what makes
//! the "cell that should receive the next child" and "last cell" queries
//! cheap descents instead of full scans.

use std::cmp::Ordering;

use crate::config::MAX_DIMENSIONS;
use crate::Coords;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct CellId(u32);

impl CellId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

pub(crate) struct CellNode {
    pub coords: Coords,
    /// One bit per dimension, 1 = closed. Starts all-closed.
    pub bounds: u16,
    pub parent: Option<CellId>,
    pub children: Vec<CellId>,
    /// Construction-time links to the positive neighbor per dimension.
    pub neighbors: [Option<CellId>; MAX_DIMENSIONS],
}

pub(crate) struct Forest {
    dims: usize,
    cells: Vec<CellNode>,
    roots: Vec<CellId>,
}

impl Forest {
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            cells: Vec::new(),
            roots: Vec::new(),
        }
    }

    #[inline]
    pub fn node(&self, id: CellId) -> &CellNode {
        &self.cells[id.index()]
    }

    #[inline]
    fn node_mut(&mut self, id: CellId) -> &mut CellNode {
        &mut self.cells[id.index()]
    }

    /// Create a fresh cell as a singleton set.
    pub fn create_cell(&mut self, coords: Coords) -> CellId {
        let id = CellId(self.cells.len() as u32);
        self.cells.push(CellNode {
            coords,
            bounds: u16::MAX,
            parent: None,
            children: Vec::new(),
            neighbors: [None; MAX_DIMENSIONS],
        });
        self.roots.push(id);
        id
    }

    pub fn neighbor(&self, id: CellId, d: usize) -> Option<CellId> {
        self.node(id).neighbors[d]
    }

    pub fn set_bounds(&mut self, id: CellId, mask: u16) {
        self.node_mut(id).bounds = mask;
    }

    pub fn set_neighbor(&mut self, id: CellId, d: usize, neighbor: CellId) {
        self.node_mut(id).neighbors[d] = neighbor.into();
    }

    pub fn roots(&self) -> &[CellId] {
        &self.roots
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    pub fn root_at(&self, i: usize) -> CellId {
        self.roots[i]
    }

    /// Drop roots that have gained a parent since the last pass.
    pub fn prune_roots(&mut self) {
        let cells = &self.cells;
        self.roots.retain(|id| cells[id.index()].parent.is_none());
    }

    /// Collapse duplicate root entries, keeping one occurrence at the end of
    /// the list. Roots are expected to be unique; this is defensive.
    pub fn dedup_roots(&mut self) {
        loop {
            let duplicate = self
                .roots
                .iter()
                .copied()
                .find(|id| self.roots.iter().filter(|r| **r == *id).count() > 1);
            match duplicate {
                Some(id) => {
                    self.roots.retain(|r| *r != id);
                    self.roots.push(id);
                }
                None => return,
            }
        }
    }

    /// Total ordering over cells: later coordinates win, compared from the
    /// first dimension down; equal coordinates (only possible for the same
    /// cell) fall back to child count.
    pub fn cmp_cells(&self, a: CellId, b: CellId) -> Ordering {
        let (na, nb) = (self.node(a), self.node(b));
        for d in 0..self.dims {
            match na.coords[d].cmp(&nb.coords[d]) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        na.children.len().cmp(&nb.children.len())
    }

    pub fn root_of(&self, id: CellId) -> CellId {
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            current = parent;
        }
        current
    }

    pub fn same_set(&self, a: CellId, b: CellId) -> bool {
        self.root_of(a) == self.root_of(b)
    }

    pub fn set_size(&self, id: CellId) -> usize {
        self.subtree_size(self.root_of(id))
    }

    fn subtree_size(&self, id: CellId) -> usize {
        let mut size = 1;
        for &child in &self.node(id).children {
            size += self.subtree_size(child);
        }
        size
    }

    /// Attach `child` under `parent`. A cell cannot parent itself; that
    /// request is ignored. Gaining a parent removes the child from the root
    /// list.
    pub fn add_child(&mut self, parent: CellId, child: CellId) {
        if parent == child {
            return;
        }
        self.roots.retain(|r| *r != child);
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
    }

    /// Detach `id` from its parent and the root list without re-rooting it.
    fn null_parent(&mut self, id: CellId) {
        self.roots.retain(|r| *r != id);
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|c| *c != id);
            self.node_mut(id).parent = None;
        }
    }

    /// Fully unlink `id`: orphan its children and detach it from its parent.
    fn null_set(&mut self, id: CellId) {
        let children = std::mem::take(&mut self.node_mut(id).children);
        for child in children {
            self.roots.retain(|r| *r != child);
            self.node_mut(child).parent = None;
        }
        self.null_parent(id);
    }

    /// The set's "last" cell: descend from the root toward non-empty
    /// children with the fewest children, falling back to the first childless
    /// child. The result has no children of its own.
    pub fn last_in_set(&self, id: CellId) -> CellId {
        let mut last = self.root_of(id);
        loop {
            let children = &self.node(last).children;
            if children.is_empty() {
                return last;
            }
            let mut next = None;
            for &child in children {
                if self.node(child).children.is_empty() {
                    continue;
                }
                next = match next {
                    None => Some(child),
                    Some(best)
                        if self.node(child).children.len()
                            < self.node(best).children.len() =>
                    {
                        Some(child)
                    }
                    keep => keep,
                };
            }
            last = next.unwrap_or(children[0]);
        }
    }

    /// The cell that should receive the next child: descend from the root
    /// toward the fullest child that still has room, packing levels densely.
    /// When every child is full, continue through the largest one.
    pub fn cell_to_add_child_to(&self, id: CellId) -> CellId {
        let mut current = self.root_of(id);
        while self.node(current).children.len() >= self.dims {
            let children = &self.node(current).children;
            let mut open_slot = None;
            for &child in children {
                if self.node(child).children.len() >= self.dims {
                    continue;
                }
                open_slot = match open_slot {
                    None => Some(child),
                    Some(best) => {
                        let (c, b) =
                            (self.node(child).children.len(), self.node(best).children.len());
                        if c > b || (c == b && self.cmp_cells(child, best) == Ordering::Greater)
                        {
                            Some(child)
                        } else {
                            Some(best)
                        }
                    }
                };
            }
            current = match open_slot {
                Some(child) => child,
                None => {
                    let mut min = children[0];
                    for &child in &children[1..] {
                        if self.cmp_cells(child, min) == Ordering::Less {
                            min = child;
                        }
                    }
                    min
                }
            };
        }
        current
    }

    /// Merge the sets of `absorbed` and `initiator`: the smaller set drains
    /// into the larger one cell at a time from its "last" cell, re-heapifying
    /// the growing set after every relocation. On equal sizes the initiating
    /// cell's root survives.
    pub fn merge(&mut self, absorbed: CellId, initiator: CellId) {
        if self.same_set(absorbed, initiator) {
            return;
        }
        let (drained, surviving) = if self.set_size(absorbed) > self.set_size(initiator) {
            (self.root_of(initiator), self.root_of(absorbed))
        } else {
            (self.root_of(absorbed), self.root_of(initiator))
        };

        while !self.same_set(drained, surviving) {
            let moved = self.last_in_set(drained);
            self.add_cell_to_set(surviving, moved);
            let root = self.root_of(surviving);
            self.sort_set(root);
        }
    }

    /// Move a single cell into `set_cell`'s set.
    fn add_cell_to_set(&mut self, set_cell: CellId, cell: CellId) {
        if self.same_set(set_cell, cell) {
            return;
        }
        self.remove_from_set(cell);
        let target = self.cell_to_add_child_to(set_cell);
        self.add_child(target, cell);
    }

    /// Remove `cell` from its set, keeping the rest of the set intact by
    /// substituting the set's "last" cell into its place when needed.
    pub fn remove_from_set(&mut self, cell: CellId) {
        if self.node(cell).parent.is_none() && self.node(cell).children.is_empty() {
            self.roots.retain(|r| *r != cell);
            return;
        }
        let root = self.replace_with_last(cell);
        self.sort_set(root);
    }

    /// Swap the set's "last" cell into `cell`'s position and detach `cell`.
    /// Returns the root of the remaining set.
    fn replace_with_last(&mut self, cell: CellId) -> CellId {
        let last = self.last_in_set(cell);
        let start = self.root_of(last);
        self.null_set(last);

        if last == cell {
            return start;
        }

        let parent = self.node(cell).parent;
        let children = self.node(cell).children.clone();
        self.null_set(cell);

        match parent {
            Some(parent) => self.add_child(parent, last),
            None => self.roots.push(last),
        }
        for child in children {
            self.add_child(last, child);
        }
        self.root_of(last)
    }

    /// Repair the max-heap shape from `id` downward. Returns whether `id`
    /// itself was rotated below a child.
    pub fn sort_set(&mut self, id: CellId) -> bool {
        if self.node(id).children.is_empty() {
            return false;
        }

        let mut changed = self.switch_with_max_child(id);

        let mut child_changed = false;
        let mut i = 0;
        while i < self.node(id).children.len() {
            let child = self.node(id).children[i];
            child_changed |= self.sort_set(child);
            i += 1;
        }
        if child_changed {
            changed = self.switch_with_max_child(id);
        }
        changed
    }

    /// Rotate `id` below its largest child when that child outranks it,
    /// exchanging their child lists and parent link.
    fn switch_with_max_child(&mut self, id: CellId) -> bool {
        if self.node(id).children.is_empty() {
            return false;
        }

        let mut max_child = self.node(id).children[0];
        for &child in &self.node(id).children[1..] {
            if self.cmp_cells(child, max_child) == Ordering::Greater {
                max_child = child;
            }
        }
        if self.cmp_cells(id, max_child) == Ordering::Greater {
            return false;
        }

        let children = self.node(id).children.clone();
        let parent = self.node(id).parent;
        let max_child_children = self.node(max_child).children.clone();

        self.null_set(id);
        self.null_set(max_child);

        for child in max_child_children {
            self.add_child(id, child);
        }
        for child in children {
            // Skips max_child itself through the self-parent guard.
            self.add_child(max_child, child);
        }
        self.add_child(max_child, id);

        match parent {
            Some(parent) => self.add_child(parent, max_child),
            None => self.roots.push(max_child),
        }
        true
    }
}
