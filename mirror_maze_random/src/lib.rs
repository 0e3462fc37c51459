use mirror_maze::*;
use mirror_maze_json::Scene;

use core::iter;
pub use rand;

pub trait Random: Sized {
    /// Generate a random value fitting in `grid`, using the provided `rng`
    ///
    /// This method must not fail.
    fn random(grid: &Grid, rng: &mut (impl rand::Rng + ?Sized)) -> Self;
}

impl Random for RoomAddress {
    fn random(grid: &Grid, rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        Self::new(rng.gen_range(0..grid.rows()), rng.gen_range(0..grid.cols()))
    }
}

impl Random for LocalPoint {
    /// A point where a marker may be placed: away from the walls by at least
    /// [`MARKER_MARGIN`].
    fn random(grid: &Grid, rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        clamp_to_room(
            grid,
            LocalPoint::new(
                rand_coord(rng, grid.room_width()),
                rand_coord(rng, grid.room_height()),
            ),
        )
    }
}

impl Random for Wall {
    fn random(_grid: &Grid, rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// A coordinate in `MARKER_MARGIN..size - MARKER_MARGIN`, or the middle of
/// `0.0..size` if that range is empty.
pub fn rand_coord(rng: &mut (impl rand::Rng + ?Sized), size: Float) -> Float {
    let (min, max) = (MARKER_MARGIN, size - MARKER_MARGIN);
    if min < max {
        // the rng generates floats in 0.0..1.0, scale and translate the range accordingly
        min + rng.gen::<Float>() * (max - min)
    } else {
        size / 2.0
    }
}

/// A random scene on the grid described by `config`, with markers placed
/// anywhere in their room, and `num_toggles` random toggles of home room
/// walls.
pub fn random_scene(
    config: GridConfig,
    num_toggles: usize,
    rng: &mut (impl rand::Rng + ?Sized),
) -> Result<Scene, MazeError> {
    let grid = Grid::new(config)?;
    let home = RoomAddress::random(&grid, rng);

    Ok(Scene {
        config: SessionConfig {
            grid: config,
            home,
            target: RoomAddress::random(&grid, rng),
            object: LocalPoint::random(&grid, rng),
            receptor: LocalPoint::random(&grid, rng),
        },
        toggles: iter::repeat_with(|| (home, Wall::random(&grid, rng)))
            .take(num_toggles)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn random_scenes_build() {
        let mut rng = StdRng::seed_from_u64(0x4d49_5252);

        for num_toggles in 0..20 {
            let scene = random_scene(GridConfig::default(), num_toggles, &mut rng).unwrap();
            assert_eq!(scene.toggles.len(), num_toggles);
            assert!(scene
                .toggles
                .iter()
                .all(|&(room, _)| room == scene.config.home));

            let session = scene.build_session().unwrap();
            for marker in [session.object(), session.receptor()] {
                assert_eq!(marker.position, clamp_to_room(session.grid(), marker.position));
            }
        }
    }

    #[test]
    fn invalid_grids_are_rejected() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = GridConfig {
            rows: 0,
            ..Default::default()
        };
        assert!(random_scene(config, 3, &mut rng).is_err());
    }

    #[test]
    fn rooms_stay_in_the_grid() {
        let mut rng = StdRng::seed_from_u64(42);
        let grid = Grid::default();
        for _ in 0..200 {
            assert!(grid.contains(RoomAddress::random(&grid, &mut rng)));
        }
    }

    #[test]
    fn narrow_rooms_use_their_middle() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(rand_coord(&mut rng, 16.0), 8.0);
        let x = rand_coord(&mut rng, 240.0);
        assert!((MARKER_MARGIN..=230.0).contains(&x));
    }
}
