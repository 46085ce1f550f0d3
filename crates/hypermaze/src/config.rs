//! Maze dimension configuration and generation requests.

use serde::Deserialize;
use thiserror::Error;

use crate::rng::RandomSource;
use crate::Coords;

/// Hard ceiling on dimension count; bound masks carry one bit per dimension.
pub const MAX_DIMENSIONS: usize = 16;
/// A maze needs at least three dimensions to have a layer axis.
pub const MIN_DIMENSIONS: usize = 3;

/// Cell budget used when deriving sizes without an explicit request.
pub const DEFAULT_MAX_CELLS: i32 = 1000;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("a maze needs at least 3 dimensions, got {0}")]
    TooFewDimensions(usize),
    #[error("dimension {index} has size {size}; every size must be at least 1")]
    InvalidSize { index: usize, size: i32 },
    #[error("dimension sizes must produce at least two cells")]
    TooFewCells,
}

/// Validated per-dimension sizes of a maze.
///
/// Immutable once constructed. Requests longer than [`MAX_DIMENSIONS`] are
/// truncated with a warning; everything else out of range is an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DimensionConfig {
    sizes: Vec<i32>,
}

impl DimensionConfig {
    pub fn new(sizes: &[i32]) -> Result<Self, ConfigError> {
        let sizes = if sizes.len() > MAX_DIMENSIONS {
            log::warn!(
                "truncating {} requested dimensions to {}",
                sizes.len(),
                MAX_DIMENSIONS
            );
            &sizes[..MAX_DIMENSIONS]
        } else {
            sizes
        };
        if sizes.len() < MIN_DIMENSIONS {
            return Err(ConfigError::TooFewDimensions(sizes.len()));
        }
        for (index, &size) in sizes.iter().enumerate() {
            if size < 1 {
                return Err(ConfigError::InvalidSize { index, size });
            }
        }
        let config = Self {
            sizes: sizes.to_vec(),
        };
        if config.cell_count() < 2 {
            return Err(ConfigError::TooFewCells);
        }
        Ok(config)
    }

    /// Derive sizes from a cell budget, optionally with a fixed dimension
    /// count. Sizes are drawn uniformly so that the running product stays
    /// within the budget.
    pub fn from_cell_budget(
        max_cells: i32,
        dim_count: Option<usize>,
        rng: &mut RandomSource,
    ) -> Result<Self, ConfigError> {
        let max_cells = max_cells.max(2);
        let dims = match dim_count {
            Some(count) => count.clamp(MIN_DIMENSIONS, MAX_DIMENSIONS),
            None => {
                let max_dims = (max_cells as f64).log2().floor() as usize;
                let max_dims = max_dims.clamp(MIN_DIMENSIONS, MAX_DIMENSIONS);
                rng.rand_int(MIN_DIMENSIONS as i32, max_dims as i32) as usize
            }
        };
        let max_size = (max_cells as f64).powf(1.0 / dims as f64).ceil() as i32;

        // Retry a few draws; all-ones rolls are rare but possible.
        for _ in 0..16 {
            let mut sizes = vec![0i32; dims];
            let mut cell_count = 1i32;
            for size in sizes.iter_mut() {
                let cells_left = max_cells / cell_count;
                *size = rng.rand_int(cells_left.min(1), cells_left.min(max_size));
                cell_count *= *size;
            }
            if cell_count >= 2 {
                return Self::new(&sizes);
            }
        }
        let mut sizes = vec![1i32; dims];
        sizes[dims - 1] = 2;
        Self::new(&sizes)
    }

    #[inline]
    pub fn dims(&self) -> usize {
        self.sizes.len()
    }

    #[inline]
    pub fn size(&self, d: usize) -> i32 {
        self.sizes[d]
    }

    pub fn sizes(&self) -> &[i32] {
        &self.sizes
    }

    pub fn cell_count(&self) -> usize {
        self.sizes
            .iter()
            .fold(1i64, |count, &size| count.saturating_mul(size as i64)) as usize
    }

    pub fn origin(&self) -> Coords {
        [0; MAX_DIMENSIONS]
    }

    /// Whether `coords[d]` sits at the far edge of dimension `d`.
    #[inline]
    pub fn at_dimension_end(&self, coords: &Coords, d: usize) -> bool {
        coords[d] == self.sizes[d] - 1
    }
}

fn default_interior_scale() -> i32 {
    15
}

fn default_bound_scale() -> i32 {
    1
}

fn default_opening_scale() -> i32 {
    5
}

/// One-shot generation request, deserializable from a JSON config file.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    pub dimensions: Vec<i32>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_interior_scale")]
    pub interior_scale: i32,
    #[serde(default = "default_bound_scale")]
    pub bound_scale: i32,
    #[serde(default = "default_opening_scale")]
    pub opening_scale: i32,
}
