use rand::{Rng, seq::SliceRandom};

use crate::maze::{Coord, Direction, Maze};

/// A cell on the traversal stack with its neighbors in visiting order.
struct Frame {
    cell: Coord,
    neighbors: [Direction; 4],
    next: usize,
}

/// Randomized depth-first carve starting at `start`.
///
/// Each cell's neighbors are visited in a Fisher-Yates shuffled order drawn from `rng`.
/// Afterwards every cell is visited and the open passages form a spanning tree.
pub fn randomized_dfs<R: Rng + ?Sized>(maze: &mut Maze, start: Coord, rng: &mut R) {
    carve(maze, start, |neighbors| neighbors.shuffle(&mut *rng));
}

/// Depth-first carve with a caller-supplied neighbor ordering.
///
/// `order` is called once per cell, when the cell is first entered, and may permute
/// the `[Up, Right, Down, Left]` candidates in place. A start cell that is already
/// visited leaves the maze untouched.
///
/// The traversal keeps its own stack, so a single long corridor is bounded by heap
/// memory rather than the call stack.
pub fn carve<F>(maze: &mut Maze, start: Coord, mut order: F)
where
    F: FnMut(&mut [Direction; 4]),
{
    if maze.is_visited(start) {
        return;
    }

    let mut stack = vec![enter(maze, start, &mut order)];

    while let Some(frame) = stack.last_mut() {
        if frame.next == frame.neighbors.len() {
            // All neighbors tried, backtrack
            stack.pop();
            continue;
        }
        let direction = frame.neighbors[frame.next];
        frame.next += 1;
        let cell = frame.cell;

        let Some(neighbor) = direction.step(cell).filter(|&c| maze.is_in_bounds(c)) else {
            continue;
        };
        if maze.is_visited(neighbor) {
            continue;
        }

        let (from, orientation) = direction.passage_from(cell);
        maze.open_passage(from, orientation);
        stack.push(enter(maze, neighbor, &mut order));
    }
}

fn enter<F>(maze: &mut Maze, cell: Coord, order: &mut F) -> Frame
where
    F: FnMut(&mut [Direction; 4]),
{
    maze.mark_visited(cell);
    let mut neighbors = Direction::ALL;
    order(&mut neighbors);
    Frame {
        cell,
        neighbors,
        next: 0,
    }
}
