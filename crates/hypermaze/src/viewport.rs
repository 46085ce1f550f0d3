//! Two-dimensional projection of an N-dimensional maze.
//!
//! A viewport maps two dimensions onto the display X/Y axes, treats a third
//! as the layer (Z) axis, and fixes every other coordinate at the viewer's
//! position. The projected grid interleaves bound positions (even rows and
//! columns) with cell interiors (odd/odd); bounds classify as open or closed,
//! interiors carry ascending/descending flags for passage along the layer
//! axis.
//!
//! The grid is cached and only recomputed after an axis or position change.

use crate::bits;
use crate::rng::opening_coordinate;
use crate::{Coords, Maze};

/// Slot indices into the active-axis triple.
pub const AXIS_X: usize = 0;
pub const AXIS_Y: usize = 1;
pub const AXIS_Z: usize = 2;

/// Classification value of one projected grid position.
///
/// Bit 0 distinguishes bound from interior. For bounds, bit 1 set means
/// closed. For interiors, bit 1 marks an ascending opening and bit 2 a
/// descending one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewValue(u8);

impl ViewValue {
    fn bound() -> Self {
        Self(1)
    }

    fn interior() -> Self {
        Self(0)
    }

    #[inline]
    pub fn is_bound(self) -> bool {
        bits::bit(self.0 as u16, 0)
    }

    #[inline]
    pub fn is_interior(self) -> bool {
        !self.is_bound()
    }

    #[inline]
    pub fn is_closed(self) -> bool {
        self.is_bound() && bits::bit(self.0 as u16, 1)
    }

    #[inline]
    pub fn is_open(self) -> bool {
        self.is_bound() && !bits::bit(self.0 as u16, 1)
    }

    #[inline]
    pub fn is_ascending(self) -> bool {
        self.is_interior() && bits::bit(self.0 as u16, 1)
    }

    #[inline]
    pub fn is_descending(self) -> bool {
        self.is_interior() && bits::bit(self.0 as u16, 2)
    }

    fn set_open(&mut self, open: bool) {
        if self.is_bound() {
            self.0 = bits::set_bit(self.0 as u16, 1, !open) as u8;
        }
    }

    fn set_ascending(&mut self, on: bool) {
        if self.is_interior() {
            self.0 = bits::set_bit(self.0 as u16, 1, on) as u8;
        }
    }

    fn set_descending(&mut self, on: bool) {
        if self.is_interior() {
            self.0 = bits::set_bit(self.0 as u16, 2, on) as u8;
        }
    }
}

/// Render-space sizing for cells, bounds, and openings.
///
/// Interiors are forced odd and at least 3 so an opening can center; bounds
/// are at least 1; openings fit in half an interior.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewScales {
    interior: i32,
    bound: i32,
    opening: i32,
}

impl ViewScales {
    pub fn new(interior: i32, bound: i32, opening: i32) -> Self {
        let mut interior = interior.max(3);
        if interior % 2 == 0 {
            interior += 1;
        }
        Self {
            interior,
            bound: bound.max(1),
            opening: opening.clamp(1, interior / 2),
        }
    }

    #[inline]
    pub fn interior(&self) -> i32 {
        self.interior
    }

    #[inline]
    pub fn bound(&self) -> i32 {
        self.bound
    }

    #[inline]
    pub fn opening(&self) -> i32 {
        self.opening
    }

    /// Distance between the start of one cell and the next.
    pub fn cell_span(&self) -> i32 {
        self.interior + self.bound
    }
}

impl Default for ViewScales {
    fn default() -> Self {
        Self::new(15, 1, 5)
    }
}

/// Axis-aligned rectangle in render space, addressed by its center.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpeningRect {
    pub center_x: i32,
    pub center_y: i32,
    pub width: i32,
    pub height: i32,
}

pub struct Viewport {
    dims: usize,
    axes: [usize; 3],
    center: Coords,
    scales: ViewScales,
    width: usize,
    height: usize,
    grid: Vec<ViewValue>,
    dirty: bool,
}

impl Viewport {
    /// Viewport positioned at the maze's entrance, showing the initial axes.
    pub fn new(maze: &Maze, scales: ViewScales) -> Self {
        let mut viewport = Self {
            dims: maze.dims(),
            axes: maze.initial_axes(),
            center: *maze.entrance(),
            scales,
            width: 0,
            height: 0,
            grid: Vec::new(),
            dirty: true,
        };
        viewport.refresh(maze);
        viewport
    }

    pub fn axes(&self) -> [usize; 3] {
        self.axes
    }

    pub fn center(&self) -> &Coords {
        &self.center
    }

    pub fn scales(&self) -> ViewScales {
        self.scales
    }

    /// Grid columns; `1 + 2 * size_x` positions.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn value(&self, x: usize, y: usize) -> ViewValue {
        self.grid[y * self.width + x]
    }

    pub fn set_axes(&mut self, axes: [usize; 3]) {
        debug_assert!(axes.iter().all(|&a| a < self.dims));
        debug_assert!(axes[0] != axes[1] && axes[0] != axes[2] && axes[1] != axes[2]);
        if self.axes != axes {
            self.axes = axes;
            self.dirty = true;
        }
    }

    pub fn set_center(&mut self, center: Coords) {
        if self.center != center {
            self.center = center;
            self.dirty = true;
        }
    }

    /// Move along the layer axis.
    pub fn set_layer(&mut self, layer: i32) {
        let z = self.axes[AXIS_Z];
        if self.center[z] != layer {
            self.center[z] = layer;
            self.dirty = true;
        }
    }

    /// Recompute the cached grid if anything changed since the last call.
    /// Always pass the same maze the viewport was created over.
    pub fn refresh(&mut self, maze: &Maze) {
        if self.dirty {
            self.project(maze);
            self.dirty = false;
        }
    }

    /// Whether the slice currently shown contains the given cell: every
    /// coordinate outside the display axes must match the viewer's position.
    pub fn slice_contains(&self, coords: &Coords) -> bool {
        for d in 0..self.dims {
            if d != self.axes[AXIS_X] && d != self.axes[AXIS_Y] && coords[d] != self.center[d] {
                return false;
            }
        }
        true
    }

    pub fn entrance_visible(&self, maze: &Maze) -> bool {
        self.slice_contains(maze.entrance())
    }

    pub fn exit_visible(&self, maze: &Maze) -> bool {
        self.slice_contains(maze.exit())
    }

    /// Full maze coordinates of the cell shown at a view position.
    pub fn cell_at_view(&self, view: [i32; 2]) -> Coords {
        let mut cell = self.center;
        cell[self.axes[AXIS_X]] = (view[0] - 1).div_euclid(2);
        cell[self.axes[AXIS_Y]] = (view[1] - 1).div_euclid(2);
        cell
    }

    fn project(&mut self, maze: &Maze) {
        let dx = self.axes[AXIS_X];
        let dy = self.axes[AXIS_Y];
        let dz = self.axes[AXIS_Z];
        let size_x = maze.size(dx);
        let size_y = maze.size(dy);
        self.width = (1 + 2 * size_x) as usize;
        self.height = (1 + 2 * size_y) as usize;
        self.grid = vec![ViewValue::default(); self.width * self.height];

        // Even rows and columns are bounds; everything defaults open except
        // corners and the near perimeter. The far perimeter closes below,
        // written from the edge cells' forced-closed bits.
        for y in 0..self.height {
            for x in 0..self.width {
                let on_x_bound = x % 2 == 0;
                let on_y_bound = y % 2 == 0;
                let mut value = if on_x_bound || on_y_bound {
                    ViewValue::bound()
                } else {
                    ViewValue::interior()
                };
                value.set_open(!((on_x_bound && on_y_bound) || x == 0 || y == 0));
                self.grid[y * self.width + x] = value;
            }
        }

        let mut cursor = self.center;
        for cx in 0..size_x {
            cursor[dx] = cx;
            for cy in 0..size_y {
                cursor[dy] = cy;
                let gx = (1 + 2 * cx) as usize;
                let gy = (1 + 2 * cy) as usize;
                let mask = maze.bounds_at(&cursor);

                let ascending = !bits::bit(mask, dz);
                let descending = if cursor[dz] != 0 {
                    cursor[dz] -= 1;
                    let below = maze.bounds_at(&cursor);
                    cursor[dz] += 1;
                    !bits::bit(below, dz)
                } else {
                    false
                };
                let interior = &mut self.grid[gy * self.width + gx];
                interior.set_ascending(ascending);
                interior.set_descending(descending);

                self.grid[gy * self.width + gx + 1].set_open(!bits::bit(mask, dx));
                self.grid[(gy + 1) * self.width + gx].set_open(!bits::bit(mask, dy));
            }
        }

        let entrance = *maze.entrance();
        let exit = *maze.exit();
        for opening in [entrance, exit] {
            if self.slice_contains(&opening) {
                self.open_perimeter_for(maze, &opening);
            }
        }
    }

    /// Open the outer walls and layer passages at a visible entrance/exit.
    fn open_perimeter_for(&mut self, maze: &Maze, opening: &Coords) {
        let dx = self.axes[AXIS_X];
        let dy = self.axes[AXIS_Y];
        let dz = self.axes[AXIS_Z];
        let vx = (1 + 2 * opening[dx]) as usize;
        let vy = (1 + 2 * opening[dy]) as usize;
        let last_x = self.width - 1;
        let last_y = self.height - 1;

        let value = &mut self.grid[vy * self.width];
        let open = opening[dx] == 0 || value.is_open();
        value.set_open(open);

        let value = &mut self.grid[vy * self.width + last_x];
        let open = opening[dx] == maze.size(dx) - 1 || value.is_open();
        value.set_open(open);

        let value = &mut self.grid[vx];
        let open = opening[dy] == 0 || value.is_open();
        value.set_open(open);

        let value = &mut self.grid[last_y * self.width + vx];
        let open = opening[dy] == maze.size(dy) - 1 || value.is_open();
        value.set_open(open);

        let interior = &mut self.grid[vy * self.width + vx];
        let descending = opening[dz] == 0 || interior.is_descending();
        interior.set_descending(descending);
        let ascending = opening[dz] == maze.size(dz) - 1 || interior.is_ascending();
        interior.set_ascending(ascending);
    }

    /// Render-space corner of the cell a view coordinate falls into.
    fn cell_corner(&self, view: i32) -> i32 {
        self.scales.bound() + (view - 1).div_euclid(2) * self.scales.cell_span()
    }

    /// Rectangles to draw for a bound position: a closed bound is one solid
    /// block; an open bound is two segments flanking a stable gap.
    pub fn bound_geometry(&self, view: [i32; 2], value: ViewValue) -> Vec<OpeningRect> {
        if !value.is_bound() {
            return Vec::new();
        }
        let interior = self.scales.interior();
        let bound = self.scales.bound();
        let opening = self.scales.opening();
        let ul = [self.cell_corner(view[0]), self.cell_corner(view[1])];
        let on_x = (view[0] - 1).rem_euclid(2) >= 1;
        let on_y = (view[1] - 1).rem_euclid(2) >= 1;

        if value.is_closed() {
            let (center_x, width) = if on_x {
                (interior + bound / 2 + ul[0], bound)
            } else {
                (interior / 2 + ul[0], interior)
            };
            let (center_y, height) = if on_y {
                (interior + bound / 2 + ul[1], bound)
            } else {
                (interior / 2 + ul[1], interior)
            };
            return vec![OpeningRect {
                center_x,
                center_y,
                width,
                height,
            }];
        }

        // Open bound: never a corner, so exactly one of on_x/on_y holds. The
        // gap center derives from the cell position alone, so it survives
        // redraws.
        let cell = self.cell_at_view(view);
        let center = self.opening_center(AXIS_X, true, &cell);
        let gap_low = center[if on_x { 1 } else { 0 }] - opening / 2;
        let gap_high = center[if on_x { 1 } else { 0 }] + opening / 2;

        if on_x {
            let center_x = interior + bound / 2 + ul[0];
            vec![
                OpeningRect {
                    center_x,
                    center_y: gap_low / 2 + ul[1],
                    width: bound,
                    height: gap_low.abs(),
                },
                OpeningRect {
                    center_x,
                    center_y: (gap_high + interior) / 2 + ul[1],
                    width: bound,
                    height: (gap_high - interior).abs(),
                },
            ]
        } else {
            let center_y = interior + bound / 2 + ul[1];
            vec![
                OpeningRect {
                    center_x: gap_low / 2 + ul[0],
                    center_y,
                    width: gap_low.abs(),
                    height: bound,
                },
                OpeningRect {
                    center_x: (gap_high + interior) / 2 + ul[0],
                    center_y,
                    width: (gap_high - interior).abs(),
                    height: bound,
                },
            ]
        }
    }

    /// Ascending and descending opening rectangles for an interior position.
    pub fn interior_geometry(&self, view: [i32; 2], value: ViewValue) -> [Option<OpeningRect>; 2] {
        if !value.is_interior() {
            return [None, None];
        }
        let opening = self.scales.opening();
        let ul = [self.cell_corner(view[0]), self.cell_corner(view[1])];
        let cell = self.cell_at_view(view);
        let mut rects = [None, None];

        if value.is_ascending() {
            let center = self.opening_center(AXIS_Z, true, &cell);
            rects[0] = Some(OpeningRect {
                center_x: center[0] + ul[0],
                center_y: center[1] + ul[1],
                width: opening,
                height: opening,
            });
        }
        if value.is_descending() {
            let center = self.opening_center(AXIS_Z, false, &cell);
            rects[1] = Some(OpeningRect {
                center_x: center[0] + ul[0],
                center_y: center[1] + ul[1],
                width: opening,
                height: opening,
            });
        }
        rects
    }

    /// Stable in-cell center of an opening along one of the active axes.
    ///
    /// The coordinates orthogonal to the opening axis fold into constants so
    /// distinct cells get distinct but repeatable placements; `forwards`
    /// selects the positive- or negative-direction opening.
    fn opening_center(&self, slot: usize, forwards: bool, cell: &Coords) -> [i32; 2] {
        let open_d = self.axes[slot];
        let mut constants = [0i32; 2];
        for d in 0..self.dims {
            if d < open_d {
                constants[0] += cell[d];
            }
            if d > open_d {
                constants[1] += cell[d];
            }
        }
        let variable = cell[open_d] - if forwards { 0 } else { 1 };
        [
            opening_coordinate(
                constants[0],
                variable,
                1,
                self.scales.interior(),
                self.scales.opening(),
            ),
            opening_coordinate(
                constants[1],
                variable,
                3,
                self.scales.interior(),
                self.scales.opening(),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DimensionConfig;

    fn maze(sizes: &[i32], seed: u64) -> Maze {
        let config = DimensionConfig::new(sizes).unwrap();
        Maze::generate(config, Some(seed)).unwrap()
    }

    #[test]
    fn grid_dimensions_follow_active_axes() {
        let maze = maze(&[3, 4, 2, 2], 1);
        let mut viewport = Viewport::new(&maze, ViewScales::default());
        viewport.set_axes([0, 1, 2]);
        viewport.refresh(&maze);
        assert_eq!(viewport.width(), 7);
        assert_eq!(viewport.height(), 9);
    }

    #[test]
    fn classification_is_total() {
        let maze = maze(&[3, 3, 3], 2);
        let viewport = Viewport::new(&maze, ViewScales::default());
        for y in 0..viewport.height() {
            for x in 0..viewport.width() {
                let value = viewport.value(x, y);
                assert_ne!(value.is_bound(), value.is_interior());
                if value.is_bound() {
                    assert_ne!(value.is_open(), value.is_closed());
                    assert!(!value.is_ascending() && !value.is_descending());
                } else {
                    assert!(!value.is_open() && !value.is_closed());
                }
                // Parity decides the kind.
                assert_eq!(value.is_bound(), x % 2 == 0 || y % 2 == 0);
            }
        }
    }

    #[test]
    fn reprojection_is_idempotent() {
        let maze = maze(&[3, 3, 3], 3);
        let mut viewport = Viewport::new(&maze, ViewScales::default());
        let before = viewport.grid.clone();
        viewport.refresh(&maze);
        assert_eq!(viewport.grid, before);
        // Forcing a recompute with unchanged state gives the same grid too.
        viewport.dirty = true;
        viewport.refresh(&maze);
        assert_eq!(viewport.grid, before);
    }

    #[test]
    fn corners_are_closed_bounds() {
        let maze = maze(&[3, 3, 3], 4);
        let viewport = Viewport::new(&maze, ViewScales::default());
        let (w, h) = (viewport.width(), viewport.height());
        for y in (0..h).step_by(2) {
            for x in (0..w).step_by(2) {
                assert!(viewport.value(x, y).is_closed());
            }
        }
    }

    #[test]
    fn entrance_opens_its_perimeter_wall() {
        let maze = maze(&[2, 2, 2], 5);
        let viewport = Viewport::new(&maze, ViewScales::default());
        // The viewport starts at the entrance with an entrance-extreme axis
        // mapped to X, so one of the X-perimeter walls at the entrance row
        // must be open.
        let entrance = maze.entrance();
        let dx = viewport.axes()[AXIS_X];
        let vy = (1 + 2 * entrance[viewport.axes()[AXIS_Y]]) as usize;
        let at_min = entrance[dx] == 0;
        let x = if at_min { 0 } else { viewport.width() - 1 };
        assert!(viewport.value(x, vy).is_open());
    }

    #[test]
    fn interior_flags_mirror_layer_bits() {
        let maze = maze(&[3, 3, 3], 6);
        let mut viewport = Viewport::new(&maze, ViewScales::default());
        viewport.set_axes([0, 1, 2]);
        let mut center = *maze.entrance();
        center[2] = 1;
        viewport.set_center(center);
        viewport.refresh(&maze);

        for cy in 0..maze.size(1) {
            for cx in 0..maze.size(0) {
                let view = [(1 + 2 * cx) as usize, (1 + 2 * cy) as usize];
                let value = viewport.value(view[0], view[1]);
                let cell = viewport.cell_at_view([view[0] as i32, view[1] as i32]);
                if cell == *maze.entrance() || cell == *maze.exit() {
                    continue;
                }
                assert_eq!(value.is_ascending(), maze.is_open(&cell, 2));
                let mut below = cell;
                below[2] -= 1;
                assert_eq!(value.is_descending(), maze.is_open(&below, 2));
            }
        }
    }

    #[test]
    fn descending_is_clamped_at_the_bottom_layer() {
        let maze = maze(&[3, 3, 3], 7);
        let mut viewport = Viewport::new(&maze, ViewScales::default());
        viewport.set_axes([0, 1, 2]);
        let mut center = *maze.entrance();
        center[2] = 0;
        viewport.set_center(center);
        viewport.refresh(&maze);

        for cy in 0..maze.size(1) {
            for cx in 0..maze.size(0) {
                let value = viewport.value((1 + 2 * cx) as usize, (1 + 2 * cy) as usize);
                let cell = viewport.cell_at_view([(1 + 2 * cx), (1 + 2 * cy)]);
                if cell == *maze.entrance() || cell == *maze.exit() {
                    continue;
                }
                assert!(!value.is_descending());
            }
        }
    }

    #[test]
    fn closed_bound_renders_one_block() {
        let maze = maze(&[3, 3, 3], 8);
        let viewport = Viewport::new(&maze, ViewScales::new(15, 1, 5));
        // A corner is always closed.
        let rects = viewport.bound_geometry([0, 0], viewport.value(0, 0));
        assert_eq!(rects.len(), 1);
        assert_eq!(rects[0].width, 1);
        assert_eq!(rects[0].height, 1);

        // A closed wall between two cells spans a full interior on one axis.
        let value = viewport.value(2, 1);
        if value.is_closed() {
            let rects = viewport.bound_geometry([2, 1], value);
            assert_eq!(rects.len(), 1);
            assert_eq!(rects[0].width, 1);
            assert_eq!(rects[0].height, 15);
        }
    }

    #[test]
    fn open_bound_renders_two_segments_with_a_gap() {
        let maze = maze(&[2, 2, 2], 9);
        let viewport = Viewport::new(&maze, ViewScales::new(15, 1, 5));
        let mut checked = 0;
        for y in 0..viewport.height() {
            for x in 0..viewport.width() {
                let value = viewport.value(x, y);
                if !value.is_open() {
                    continue;
                }
                let rects = viewport.bound_geometry([x as i32, y as i32], value);
                assert_eq!(rects.len(), 2);
                let along_y = x % 2 == 0;
                let (a, b) = if along_y {
                    (rects[0].height, rects[1].height)
                } else {
                    (rects[0].width, rects[1].width)
                };
                // The two segments leave exactly the opening gap uncovered.
                assert_eq!(a + b, 15 - 2 * (5 / 2));
                assert_eq!(rects, viewport.bound_geometry([x as i32, y as i32], value));
                checked += 1;
            }
        }
        // The entrance-facing perimeter wall guarantees at least one open
        // bound in the initial slice.
        assert!(checked > 0);
    }

    #[test]
    fn interior_geometry_matches_flags() {
        let maze = maze(&[3, 3, 3], 10);
        let viewport = Viewport::new(&maze, ViewScales::new(15, 1, 5));
        for y in (1..viewport.height()).step_by(2) {
            for x in (1..viewport.width()).step_by(2) {
                let value = viewport.value(x, y);
                let [ascending, descending] =
                    viewport.interior_geometry([x as i32, y as i32], value);
                assert_eq!(ascending.is_some(), value.is_ascending());
                assert_eq!(descending.is_some(), value.is_descending());
                for rect in [ascending, descending].into_iter().flatten() {
                    assert_eq!(rect.width, 5);
                    assert_eq!(rect.height, 5);
                }
            }
        }
    }

    #[test]
    fn geometry_rejects_mismatched_values() {
        let maze = maze(&[3, 3, 3], 11);
        let viewport = Viewport::new(&maze, ViewScales::default());
        let interior = viewport.value(1, 1);
        assert!(viewport.bound_geometry([1, 1], interior).is_empty());
        let bound = viewport.value(0, 1);
        assert_eq!(viewport.interior_geometry([0, 1], bound), [None, None]);
    }

    #[test]
    fn scales_are_clamped() {
        let scales = ViewScales::new(2, 0, 9);
        assert_eq!(scales.interior(), 3);
        assert_eq!(scales.bound(), 1);
        assert_eq!(scales.opening(), 1);
        let scales = ViewScales::new(4, 1, 2);
        assert_eq!(scales.interior(), 5);
        assert_eq!(scales.opening(), 2);
    }

    #[test]
    fn layer_change_marks_dirty_and_reprojects() {
        let maze = maze(&[3, 3, 3], 12);
        let mut viewport = Viewport::new(&maze, ViewScales::default());
        viewport.set_axes([0, 1, 2]);
        viewport.refresh(&maze);
        viewport.set_layer(1);
        assert!(viewport.dirty);
        viewport.refresh(&maze);
        assert!(!viewport.dirty);
        assert_eq!(viewport.center()[2], 1);
    }
}
