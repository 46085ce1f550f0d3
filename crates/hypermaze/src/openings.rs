//! Entrance and exit placement on the outer faces of the maze.

use crate::config::DimensionConfig;
use crate::rng::RandomSource;
use crate::Coords;

/// Whole-tuple retries before falling back to a pinned coordinate. Expected
/// retries are tiny; the cap guards degenerate size-1-heavy configurations.
const RETRY_CAP: usize = 10_000;

fn is_extreme(config: &DimensionConfig, d: usize, value: i32) -> bool {
    value == 0 || value == config.size(d) - 1
}

/// Random coordinate tuple with at least one coordinate at an extreme.
pub(crate) fn random_opening(config: &DimensionConfig, rng: &mut RandomSource) -> Coords {
    for _ in 0..RETRY_CAP {
        let mut coords = config.origin();
        let mut extremes = 0;
        for d in 0..config.dims() {
            coords[d] = rng.rand_int(0, config.size(d) - 1);
            if is_extreme(config, d, coords[d]) {
                extremes += 1;
            }
        }
        if extremes > 0 {
            return coords;
        }
    }
    let mut coords = config.origin();
    coords[0] = config.size(0) - 1;
    coords
}

/// Like [`random_opening`], but never lands on an outer face the existing
/// opening already uses: per dimension, the extreme taken by `other` is
/// excluded from the draw. Size-1 dimensions are pinned to 0; they offer no
/// face to avoid.
pub(crate) fn random_opening_excluding(
    config: &DimensionConfig,
    other: &Coords,
    rng: &mut RandomSource,
) -> Coords {
    for _ in 0..RETRY_CAP {
        let mut coords = config.origin();
        let mut extremes = 0;
        for d in 0..config.dims() {
            let top = config.size(d) - 1;
            coords[d] = if top == 0 {
                0
            } else if other[d] == 0 {
                rng.rand_int(1, top)
            } else if other[d] == top {
                rng.rand_int(0, top - 1)
            } else {
                rng.rand_int(0, top)
            };
            if is_extreme(config, d, coords[d]) {
                extremes += 1;
            }
        }
        if extremes > 0 {
            return coords;
        }
    }
    // Pin some dimension with room to the extreme the other opening avoids.
    let mut coords = config.origin();
    for d in 0..config.dims() {
        let top = config.size(d) - 1;
        if top == 0 {
            continue;
        }
        coords[d] = if other[d] == 0 { top } else { 0 };
        break;
    }
    coords
}

/// The three dimensions shown first: those where the entrance touches an
/// extreme, then the lowest unused indices.
pub(crate) fn initial_axes(config: &DimensionConfig, entrance: &Coords) -> [usize; 3] {
    let mut axes = [0usize; 3];
    let mut filled = 0;
    for d in 0..config.dims() {
        if is_extreme(config, d, entrance[d]) {
            axes[filled] = d;
            filled += 1;
            if filled == 3 {
                return axes;
            }
        }
    }
    for d in 0..config.dims() {
        if !axes[..filled].contains(&d) {
            axes[filled] = d;
            filled += 1;
            if filled == 3 {
                return axes;
            }
        }
    }
    axes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(sizes: &[i32]) -> DimensionConfig {
        DimensionConfig::new(sizes).unwrap()
    }

    fn count_extremes(config: &DimensionConfig, coords: &Coords) -> usize {
        (0..config.dims())
            .filter(|&d| is_extreme(config, d, coords[d]))
            .count()
    }

    #[test]
    fn openings_touch_an_outer_face() {
        let config = config(&[4, 5, 6]);
        let mut rng = RandomSource::from_seed(3);
        for _ in 0..50 {
            let entrance = random_opening(&config, &mut rng);
            assert!(count_extremes(&config, &entrance) >= 1);
            for d in 0..config.dims() {
                assert!(entrance[d] >= 0 && entrance[d] < config.size(d));
            }
        }
    }

    #[test]
    fn exit_never_shares_a_face_with_the_entrance() {
        let config = config(&[3, 4, 2, 2]);
        let mut rng = RandomSource::from_seed(17);
        for _ in 0..50 {
            let entrance = random_opening(&config, &mut rng);
            let exit = random_opening_excluding(&config, &entrance, &mut rng);
            assert!(count_extremes(&config, &exit) >= 1);
            for d in 0..config.dims() {
                let top = config.size(d) - 1;
                if top == 0 {
                    continue;
                }
                assert!(
                    !(entrance[d] == 0 && exit[d] == 0),
                    "shared minimum face in dimension {d}"
                );
                assert!(
                    !(entrance[d] == top && exit[d] == top),
                    "shared maximum face in dimension {d}"
                );
            }
        }
    }

    #[test]
    fn corner_entrance_in_a_cube() {
        // Every coordinate of a 2x2x2 maze is an extreme, so entrance and
        // exit are corners that differ in every dimension.
        let config = config(&[2, 2, 2]);
        let mut rng = RandomSource::from_seed(8);
        let entrance = random_opening(&config, &mut rng);
        let exit = random_opening_excluding(&config, &entrance, &mut rng);
        assert_eq!(count_extremes(&config, &entrance), 3);
        assert_eq!(count_extremes(&config, &exit), 3);
        for d in 0..3 {
            assert_ne!(entrance[d], exit[d]);
        }
    }

    #[test]
    fn three_dimensions_use_all_axes() {
        let config = config(&[2, 2, 2]);
        let mut rng = RandomSource::from_seed(4);
        let entrance = random_opening(&config, &mut rng);
        assert_eq!(initial_axes(&config, &entrance), [0, 1, 2]);
    }

    #[test]
    fn extreme_dimensions_come_first() {
        let config = config(&[3, 3, 3, 3, 3]);
        let mut entrance = config.origin();
        entrance[0] = 1;
        entrance[1] = 1;
        entrance[2] = 2;
        entrance[3] = 1;
        entrance[4] = 0;
        assert_eq!(initial_axes(&config, &entrance), [2, 4, 0]);
    }

    #[test]
    fn remaining_axes_fill_from_lowest() {
        let config = config(&[3, 3, 3, 3]);
        let mut entrance = config.origin();
        entrance[0] = 1;
        entrance[1] = 1;
        entrance[2] = 0;
        entrance[3] = 1;
        assert_eq!(initial_axes(&config, &entrance), [2, 0, 1]);
    }
}
