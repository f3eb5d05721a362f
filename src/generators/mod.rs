use rand::{Rng, SeedableRng, rngs::StdRng};

mod dfs;

pub use dfs::{carve, randomized_dfs};

use crate::maze::{Coord, Maze};

/// Get a random number generator, optionally seeded for reproducibility.
pub fn get_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// Carve `maze` from a uniformly random start cell.
/// Returns the start cell.
pub fn generate_maze(maze: &mut Maze, seed: Option<u64>) -> Coord {
    let mut rng = get_rng(seed);

    let start = (
        rng.random_range(0..maze.rows()),
        rng.random_range(0..maze.columns()),
    );
    tracing::debug!(
        "[generator] Carving {}x{} maze from {:?} (seed {:?})",
        maze.rows(),
        maze.columns(),
        start,
        seed
    );

    randomized_dfs(maze, start, &mut rng);

    tracing::debug!(
        "[generator] Done with {} open passages",
        maze.open_passages()
    );
    start
}
