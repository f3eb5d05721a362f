pub mod grid;

use std::{collections::VecDeque, fmt};

use grid::Grid;

/// A cell identity: `(row, column)`.
pub type Coord = (usize, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// The wall below a cell, between `(row, column)` and `(row + 1, column)`
    Horizontal,
    /// The wall to the right of a cell, between `(row, column)` and `(row, column + 1)`
    Vertical,
}

/// One of the four cardinal directions, in screen orientation (up is row - 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// The neighboring coordinate in this direction.
    /// Returns `None` when stepping would go below row or column zero; the upper
    /// bound is left for the caller to check against the maze.
    pub fn step(self, (row, column): Coord) -> Option<Coord> {
        match self {
            Direction::Up => Some((row.checked_sub(1)?, column)),
            Direction::Right => Some((row, column.checked_add(1)?)),
            Direction::Down => Some((row.checked_add(1)?, column)),
            Direction::Left => Some((row, column.checked_sub(1)?)),
        }
    }

    /// The adjacency entry crossed when leaving `from` in this direction, expressed
    /// as the cell with the lower index and the orientation of the wall after it.
    ///
    /// # Panics
    /// If the neighbor in this direction would have a negative index.
    pub fn passage_from(self, (row, column): Coord) -> (Coord, Orientation) {
        match self {
            Direction::Up => ((row - 1, column), Orientation::Horizontal),
            Direction::Right => ((row, column), Orientation::Vertical),
            Direction::Down => ((row, column), Orientation::Horizontal),
            Direction::Left => ((row, column - 1), Orientation::Vertical),
        }
    }
}

/// The maze grid model: visitation flags plus the two passage grids.
///
/// A `true` entry in `verticals` or `horizontals` means the passage is open (no wall).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    visited: Grid<bool>,
    /// `rows x (columns - 1)`: open between `(r, c)` and `(r, c + 1)`
    verticals: Grid<bool>,
    /// `(rows - 1) x columns`: open between `(r, c)` and `(r + 1, c)`
    horizontals: Grid<bool>,
}

impl Maze {
    /// Creates a maze with every cell unvisited and every passage closed.
    ///
    /// # Panics
    /// If either dimension is zero.
    pub fn new(rows: usize, columns: usize) -> Self {
        if rows == 0 || columns == 0 {
            panic!("Maze dimensions must be positive, got {}x{}", rows, columns);
        }
        Maze {
            visited: Grid::new(rows, columns, false),
            verticals: Grid::new(rows, columns - 1, false),
            horizontals: Grid::new(rows - 1, columns, false),
        }
    }

    /// Returns the number of cell rows.
    pub fn rows(&self) -> usize {
        self.visited.rows()
    }

    /// Returns the number of cell columns.
    pub fn columns(&self) -> usize {
        self.visited.columns()
    }

    /// Checks if the given coordinate is within the bounds of the maze.
    pub fn is_in_bounds(&self, coord: Coord) -> bool {
        self.visited.is_in_bounds(coord)
    }

    pub fn is_visited(&self, coord: Coord) -> bool {
        self.visited[coord]
    }

    pub(crate) fn mark_visited(&mut self, coord: Coord) {
        self.visited[coord] = true;
    }

    /// Checks whether the generator reached every cell.
    pub fn is_fully_visited(&self) -> bool {
        self.visited.iter().all(|(_, visited)| *visited)
    }

    /// Opens the passage after the given cell in the specified orientation.
    ///
    /// # Panics
    /// * If `from` is out of bounds
    /// * If `from` is in the bottommost row and `orientation` is `Horizontal`
    /// * If `from` is in the rightmost column and `orientation` is `Vertical`
    pub fn open_passage(&mut self, from: Coord, orientation: Orientation) {
        match orientation {
            Orientation::Horizontal => self.horizontals[from] = true,
            Orientation::Vertical => self.verticals[from] = true,
        }
    }

    /// Checks whether the passage after the given cell is open.
    /// Same panics as [`Maze::open_passage`].
    pub fn is_open_after(&self, from: Coord, orientation: Orientation) -> bool {
        match orientation {
            Orientation::Horizontal => self.horizontals[from],
            Orientation::Vertical => self.verticals[from],
        }
    }

    pub fn verticals(&self) -> &Grid<bool> {
        &self.verticals
    }

    pub fn horizontals(&self) -> &Grid<bool> {
        &self.horizontals
    }

    /// Total number of open entries across both passage grids.
    pub fn open_passages(&self) -> usize {
        self.verticals
            .iter()
            .chain(self.horizontals.iter())
            .filter(|(_, open)| **open)
            .count()
    }

    /// Total number of closed entries across both passage grids, i.e. interior walls.
    pub fn closed_passages(&self) -> usize {
        self.verticals.iter().count() + self.horizontals.iter().count() - self.open_passages()
    }

    /// Cells reachable from `coord` through a single open passage.
    pub fn passage_neighbors(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        Direction::ALL.into_iter().filter_map(move |direction| {
            let neighbor = direction.step(coord).filter(|&c| self.is_in_bounds(c))?;
            let (from, orientation) = direction.passage_from(coord);
            self.is_open_after(from, orientation).then_some(neighbor)
        })
    }

    /// Checks that the passage graph is a spanning tree: every cell reachable from
    /// `(0, 0)` and exactly `rows * columns - 1` open passages.
    pub fn is_perfect(&self) -> bool {
        let cells = self.rows() * self.columns();
        if self.open_passages() != cells - 1 {
            return false;
        }
        let mut reached = Grid::new(self.rows(), self.columns(), false);
        reached[(0, 0)] = true;
        let mut queue = VecDeque::from([(0, 0)]);
        let mut count = 1;
        while let Some(cell) = queue.pop_front() {
            for neighbor in self.passage_neighbors(cell) {
                if !reached[neighbor] {
                    reached[neighbor] = true;
                    count += 1;
                    queue.push_back(neighbor);
                }
            }
        }
        count == cells
    }
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows() {
            // Wall line above the row
            for column in 0..self.columns() {
                let open = row > 0 && self.horizontals[(row - 1, column)];
                write!(f, "+{}", if open { "   " } else { "---" })?;
            }
            writeln!(f, "+")?;

            write!(f, "|")?;
            for column in 0..self.columns() {
                let open = column + 1 < self.columns() && self.verticals[(row, column)];
                write!(f, "   {}", if open { ' ' } else { '|' })?;
            }
            writeln!(f)?;
        }
        for _ in 0..self.columns() {
            write!(f, "+---")?;
        }
        writeln!(f, "+")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_maze_is_closed() {
        let maze = Maze::new(3, 5);
        assert_eq!(maze.verticals().rows(), 3);
        assert_eq!(maze.verticals().columns(), 4);
        assert_eq!(maze.horizontals().rows(), 2);
        assert_eq!(maze.horizontals().columns(), 5);
        assert_eq!(maze.open_passages(), 0);
        assert_eq!(maze.closed_passages(), 3 * 4 + 2 * 5);
        assert!(!maze.is_visited((2, 4)));
    }

    #[test]
    #[should_panic]
    fn test_zero_dimension_panics() {
        Maze::new(0, 4);
    }

    #[test]
    fn test_direction_step() {
        assert_eq!(Direction::Up.step((0, 3)), None);
        assert_eq!(Direction::Left.step((2, 0)), None);
        assert_eq!(Direction::Down.step((2, 0)), Some((3, 0)));
        assert_eq!(Direction::Right.step((2, 0)), Some((2, 1)));
    }

    #[test]
    fn test_passage_uses_lower_index() {
        assert_eq!(
            Direction::Up.passage_from((2, 1)),
            ((1, 1), Orientation::Horizontal)
        );
        assert_eq!(
            Direction::Left.passage_from((2, 1)),
            ((2, 0), Orientation::Vertical)
        );
        assert_eq!(
            Direction::Down.passage_from((2, 1)),
            ((2, 1), Orientation::Horizontal)
        );
    }

    #[test]
    fn test_passage_neighbors() {
        let mut maze = Maze::new(2, 2);
        maze.open_passage((0, 0), Orientation::Vertical);
        maze.open_passage((0, 1), Orientation::Horizontal);
        // Visited in Up, Right, Down, Left order
        assert_eq!(
            maze.passage_neighbors((0, 1)).collect::<Vec<_>>(),
            vec![(1, 1), (0, 0)]
        );
        assert_eq!(maze.passage_neighbors((1, 0)).count(), 0);
    }

    #[test]
    fn test_is_perfect_rejects_cycles_and_islands() {
        let mut maze = Maze::new(2, 2);
        maze.open_passage((0, 0), Orientation::Vertical);
        maze.open_passage((0, 0), Orientation::Horizontal);
        // (1, 1) unreachable
        assert!(!maze.is_perfect());
        maze.open_passage((1, 0), Orientation::Vertical);
        assert!(maze.is_perfect());
        maze.open_passage((0, 1), Orientation::Horizontal);
        // Four passages on four cells form a cycle
        assert!(!maze.is_perfect());
    }

    #[test]
    fn test_display() {
        let mut maze = Maze::new(1, 2);
        maze.open_passage((0, 0), Orientation::Vertical);
        assert_eq!(maze.to_string(), "+---+---+\n|       |\n+---+---+\n");
    }
}
