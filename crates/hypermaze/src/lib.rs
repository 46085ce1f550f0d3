//! Procedural maze generation in 3 to 16 dimensions.
//!
//! A maze is built in one pass over a cell/set forest that tracks
//! connectivity while bounds are assigned, then flattened into a bit-packed
//! bound grid. Rendering front-ends read the grid through a [`Viewport`],
//! which projects any two dimensions onto a 2D classification grid and a
//! third onto layer passages.
//!
//! ```no_run
//! use hypermaze::{DimensionConfig, Maze, Viewport, ViewScales};
//!
//! let config = DimensionConfig::new(&[4, 4, 3]).unwrap();
//! let maze = Maze::generate(config, Some(7)).unwrap();
//! let viewport = Viewport::new(&maze, ViewScales::default());
//! assert!(viewport.value(1, 1).is_interior());
//! ```

pub mod bits;
mod config;
mod forest;
mod openings;
mod procgen;
mod rng;
mod viewport;
mod world;

use thiserror::Error;

pub use config::{
    ConfigError, DimensionConfig, GenerationConfig, DEFAULT_MAX_CELLS, MAX_DIMENSIONS,
    MIN_DIMENSIONS,
};
pub use rng::{opening_coordinate, RandomSource};
pub use viewport::{
    OpeningRect, ViewScales, ViewValue, Viewport, AXIS_X, AXIS_Y, AXIS_Z,
};
pub use world::BoundGrid;

/// Coordinate tuple; only the first [`Maze::dims`] entries are meaningful.
pub type Coords = [i32; MAX_DIMENSIONS];

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("set joining did not converge within {passes} passes")]
    JoinPassCeiling { passes: usize },
}

/// A fully generated maze: the finished bound grid plus its openings.
///
/// Read-only once built; generate a new maze instead of mutating one.
pub struct Maze {
    config: DimensionConfig,
    grid: BoundGrid,
    entrance: Coords,
    exit: Coords,
    initial_axes: [usize; 3],
}

impl Maze {
    /// Generate a maze. A fixed seed reproduces the same maze; without one
    /// the generator seeds from OS entropy.
    pub fn generate(config: DimensionConfig, seed: Option<u64>) -> Result<Self, GenerateError> {
        let mut rng = match seed {
            Some(seed) => RandomSource::from_seed(seed),
            None => RandomSource::from_entropy(),
        };
        Self::generate_with(config, &mut rng)
    }

    pub fn generate_with(
        config: DimensionConfig,
        rng: &mut RandomSource,
    ) -> Result<Self, GenerateError> {
        let grid = procgen::MazeBuilder::new(&config, rng).build()?;
        let entrance = openings::random_opening(&config, rng);
        let exit = openings::random_opening_excluding(&config, &entrance, rng);
        let initial_axes = openings::initial_axes(&config, &entrance);
        log::debug!(
            "generated {:?} maze, entrance {:?}, exit {:?}",
            config.sizes(),
            &entrance[..config.dims()],
            &exit[..config.dims()]
        );
        Ok(Self {
            config,
            grid,
            entrance,
            exit,
            initial_axes,
        })
    }

    #[inline]
    pub fn dims(&self) -> usize {
        self.config.dims()
    }

    #[inline]
    pub fn size(&self, d: usize) -> i32 {
        self.config.size(d)
    }

    pub fn sizes(&self) -> &[i32] {
        self.config.sizes()
    }

    pub fn cell_count(&self) -> usize {
        self.config.cell_count()
    }

    pub fn config(&self) -> &DimensionConfig {
        &self.config
    }

    pub fn grid(&self) -> &BoundGrid {
        &self.grid
    }

    pub fn entrance(&self) -> &Coords {
        &self.entrance
    }

    pub fn exit(&self) -> &Coords {
        &self.exit
    }

    /// The axis triple shown first: entrance-extreme dimensions, then the
    /// lowest remaining indices.
    pub fn initial_axes(&self) -> [usize; 3] {
        self.initial_axes
    }

    /// Bound mask of one cell; bit `d` set means the bound toward the
    /// positive neighbor in dimension `d` is closed.
    pub fn bounds_at(&self, coords: &Coords) -> u16 {
        self.grid.get(coords)
    }

    /// Whether passage toward the positive neighbor in `d` is open.
    pub fn is_open(&self, coords: &Coords, d: usize) -> bool {
        self.grid.is_open(coords, d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_maze_is_one_component() {
        let config = DimensionConfig::new(&[2, 2, 2]).unwrap();
        let maze = Maze::generate(config, Some(1)).unwrap();
        assert_eq!(maze.grid().reachable_from(maze.entrance()), 8);
        assert_eq!(maze.grid().reachable_from(maze.exit()), 8);
    }

    #[test]
    fn cube_openings_are_corners_and_axes_are_all_three() {
        let config = DimensionConfig::new(&[2, 2, 2]).unwrap();
        for seed in 0..8 {
            let maze = Maze::generate(config.clone(), Some(seed)).unwrap();
            assert_eq!(maze.initial_axes(), [0, 1, 2]);
            for d in 0..3 {
                assert!(maze.entrance()[d] == 0 || maze.entrance()[d] == 1);
                // A shared extreme would mean a shared outer face.
                assert_ne!(maze.entrance()[d], maze.exit()[d]);
            }
        }
    }

    #[test]
    fn same_seed_reproduces_the_maze() {
        let config = DimensionConfig::new(&[3, 4, 2, 2]).unwrap();
        let a = Maze::generate(config.clone(), Some(55)).unwrap();
        let b = Maze::generate(config, Some(55)).unwrap();
        assert_eq!(a.entrance(), b.entrance());
        assert_eq!(a.exit(), b.exit());
        assert_eq!(a.initial_axes(), b.initial_axes());
        assert_eq!(a.bounds_at(a.entrance()), b.bounds_at(b.entrance()));
    }

    #[test]
    fn entrance_and_exit_touch_the_boundary() {
        let config = DimensionConfig::new(&[3, 4, 5]).unwrap();
        for seed in 0..8 {
            let maze = Maze::generate(config.clone(), Some(seed)).unwrap();
            for coords in [maze.entrance(), maze.exit()] {
                let extremes = (0..maze.dims())
                    .filter(|&d| coords[d] == 0 || coords[d] == maze.size(d) - 1)
                    .count();
                assert!(extremes >= 1);
            }
        }
    }
}
