//! Generate a maze without opening the game and print it with its wall layout.
//!
//! Usage: print_maze [COLUMNS] [ROWS] [SEED]

use mazefall::{
    generators::generate_maze,
    geometry::{Layout, Viewport},
    maze::Maze,
};

/// World units per maze cell side in the printed layout.
const UNITS_PER_CELL: f32 = 60.0;

fn main() -> std::io::Result<()> {
    let mut args = std::env::args();
    args.next(); // Skip executable name
    let columns = args.next().and_then(|s| s.parse::<usize>().ok()).unwrap_or(14);
    let rows = args.next().and_then(|s| s.parse::<usize>().ok()).unwrap_or(10);
    let seed = args.next().and_then(|s| s.parse::<u64>().ok());

    if columns == 0 || rows == 0 {
        eprintln!("Columns and rows must be at least 1.");
        return Ok(());
    }

    let mut maze = Maze::new(rows, columns);
    let start = generate_maze(&mut maze, seed);
    let layout = Layout::from_maze(&maze, Viewport::new(
        columns as f32 * UNITS_PER_CELL,
        rows as f32 * UNITS_PER_CELL,
    ));

    println!("{}", maze);
    println!("Carved from {:?}", start);
    println!(
        "Open passages: {}, closed passages: {}",
        maze.open_passages(),
        maze.closed_passages()
    );
    println!(
        "Wall bodies: {} horizontal, {} vertical, {} boundaries",
        layout.horizontal_walls.len(),
        layout.vertical_walls.len(),
        layout.boundaries.len()
    );
    println!("Spanning tree: {}", maze.is_perfect());
    Ok(())
}
