//! Translates a carved maze into the bodies placed in the physics world.

use std::fmt;

use rapier2d::na::Point2;

use crate::maze::{Maze, Orientation};

/// Thickness of an interior maze wall, in world units.
pub const WALL_THICKNESS: f32 = 5.0;
/// Thickness of the four walls enclosing the viewport.
pub const BOUNDARY_THICKNESS: f32 = 10.0;
/// Size of the goal relative to one cell.
pub const GOAL_SCALE: f32 = 0.7;
/// Ball radius relative to the shorter side of one cell.
pub const BALL_RADIUS_SCALE: f32 = 0.25;

/// Category attached to every body, used to recognize bodies in collision events
/// and when releasing the maze after a win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Interior maze wall; released into dynamic motion on win
    Wall,
    /// One of the four viewport edges; always static
    Boundary,
    Goal,
    Ball,
}

impl Tag {
    pub fn label(self) -> &'static str {
        match self {
            Tag::Wall => "wall",
            Tag::Boundary => "boundary",
            Tag::Goal => "goal",
            Tag::Ball => "ball",
        }
    }

    /// Decode a tag stored in a physics body's user data.
    pub fn from_user_data(data: u128) -> Option<Tag> {
        match data {
            1 => Some(Tag::Wall),
            2 => Some(Tag::Boundary),
            3 => Some(Tag::Goal),
            4 => Some(Tag::Ball),
            _ => None,
        }
    }
}

impl From<Tag> for u128 {
    fn from(tag: Tag) -> Self {
        // Zero is rapier's default user data, keep it meaning "untagged"
        match tag {
            Tag::Wall => 1,
            Tag::Boundary => 2,
            Tag::Goal => 3,
            Tag::Ball => 4,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rectangle { width: f32, height: f32 },
    Circle { radius: f32 },
}

/// Everything the simulation needs to create one body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySpec {
    pub tag: Tag,
    pub center: Point2<f32>,
    pub shape: Shape,
    pub is_static: bool,
}

impl BodySpec {
    fn fixed_rectangle(tag: Tag, x: f32, y: f32, width: f32, height: f32) -> Self {
        BodySpec {
            tag,
            center: Point2::new(x, y),
            shape: Shape::Rectangle { width, height },
            is_static: true,
        }
    }
}

/// Size of the playing field in world units. The y axis grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Viewport { width, height }
    }
}

/// All bodies of one game, in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub unit_width: f32,
    pub unit_height: f32,
    /// Walls lying on the boundary below a cell
    pub horizontal_walls: Vec<BodySpec>,
    /// Walls lying on the boundary to the right of a cell
    pub vertical_walls: Vec<BodySpec>,
    /// Top, bottom, left, right
    pub boundaries: [BodySpec; 4],
    pub goal: BodySpec,
    pub ball: BodySpec,
}

impl Layout {
    /// Lay out `maze` over `viewport`, one cell per `viewport / (columns, rows)`.
    /// Emits exactly one wall per closed passage.
    pub fn from_maze(maze: &Maze, viewport: Viewport) -> Self {
        let Viewport { width, height } = viewport;
        let unit_width = width / maze.columns() as f32;
        let unit_height = height / maze.rows() as f32;

        let wall = |(row, column): (usize, usize), orientation: Orientation| {
            let (row, column) = (row as f32, column as f32);
            match orientation {
                Orientation::Horizontal => BodySpec::fixed_rectangle(
                    Tag::Wall,
                    column * unit_width + unit_width / 2.0,
                    row * unit_height + unit_height,
                    unit_width,
                    WALL_THICKNESS,
                ),
                Orientation::Vertical => BodySpec::fixed_rectangle(
                    Tag::Wall,
                    column * unit_width + unit_width,
                    row * unit_height + unit_height / 2.0,
                    WALL_THICKNESS,
                    unit_height,
                ),
            }
        };

        let horizontal_walls = maze
            .horizontals()
            .iter()
            .filter(|(_, open)| !**open)
            .map(|(coord, _)| wall(coord, Orientation::Horizontal))
            .collect();
        let vertical_walls = maze
            .verticals()
            .iter()
            .filter(|(_, open)| !**open)
            .map(|(coord, _)| wall(coord, Orientation::Vertical))
            .collect();

        let boundaries = [
            BodySpec::fixed_rectangle(Tag::Boundary, width / 2.0, 0.0, width, BOUNDARY_THICKNESS),
            BodySpec::fixed_rectangle(
                Tag::Boundary,
                width / 2.0,
                height,
                width,
                BOUNDARY_THICKNESS,
            ),
            BodySpec::fixed_rectangle(
                Tag::Boundary,
                0.0,
                height / 2.0,
                BOUNDARY_THICKNESS,
                height,
            ),
            BodySpec::fixed_rectangle(
                Tag::Boundary,
                width,
                height / 2.0,
                BOUNDARY_THICKNESS,
                height,
            ),
        ];

        let goal = BodySpec::fixed_rectangle(
            Tag::Goal,
            width - unit_width / 2.0,
            height - unit_height / 2.0,
            unit_width * GOAL_SCALE,
            unit_height * GOAL_SCALE,
        );

        let ball = BodySpec {
            tag: Tag::Ball,
            center: Point2::new(unit_width / 2.0, unit_height / 2.0),
            shape: Shape::Circle {
                radius: unit_width.min(unit_height) * BALL_RADIUS_SCALE,
            },
            is_static: false,
        };

        Layout {
            unit_width,
            unit_height,
            horizontal_walls,
            vertical_walls,
            boundaries,
            goal,
            ball,
        }
    }

    pub fn interior_walls(&self) -> impl Iterator<Item = &BodySpec> {
        self.horizontal_walls.iter().chain(self.vertical_walls.iter())
    }

    /// Every body of the layout: boundaries, interior walls, goal, then ball.
    pub fn bodies(&self) -> impl Iterator<Item = &BodySpec> {
        self.boundaries
            .iter()
            .chain(self.interior_walls())
            .chain(std::iter::once(&self.goal))
            .chain(std::iter::once(&self.ball))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{carve, generate_maze};

    const VIEWPORT: Viewport = Viewport {
        width: 840.0,
        height: 600.0,
    };

    #[test]
    fn test_single_cell_layout() {
        let mut maze = Maze::new(1, 1);
        generate_maze(&mut maze, Some(0));
        let layout = Layout::from_maze(&maze, VIEWPORT);

        assert_eq!(layout.interior_walls().count(), 0);
        assert_eq!(layout.bodies().count(), 4 + 1 + 1);
        assert_eq!(layout.goal.center, Point2::new(420.0, 300.0));
        assert_eq!(layout.ball.center, Point2::new(420.0, 300.0));
    }

    #[test]
    fn test_one_wall_per_closed_passage() {
        for seed in 0..10 {
            let (rows, columns) = (10, 14);
            let mut maze = Maze::new(rows, columns);
            generate_maze(&mut maze, Some(seed));
            let layout = Layout::from_maze(&maze, VIEWPORT);

            let closed_horizontal = maze.horizontals().iter().filter(|(_, o)| !**o).count();
            let closed_vertical = maze.verticals().iter().filter(|(_, o)| !**o).count();
            assert_eq!(layout.horizontal_walls.len(), closed_horizontal);
            assert_eq!(layout.vertical_walls.len(), closed_vertical);
            assert_eq!(
                layout.interior_walls().count(),
                2 * rows * columns - rows - columns - maze.open_passages()
            );
            assert!(layout.interior_walls().all(|w| w.tag == Tag::Wall && w.is_static));
        }
    }

    #[test]
    fn test_wall_positions() {
        let mut maze = Maze::new(2, 2);
        carve(&mut maze, (0, 0), |_| {});
        // Only the horizontal passage below (0, 0) stays closed
        let layout = Layout::from_maze(&maze, Viewport::new(200.0, 100.0));

        assert!(layout.vertical_walls.is_empty());
        assert_eq!(layout.horizontal_walls.len(), 1);
        let wall = layout.horizontal_walls[0];
        assert_eq!(wall.center, Point2::new(50.0, 50.0));
        assert_eq!(
            wall.shape,
            Shape::Rectangle {
                width: 100.0,
                height: WALL_THICKNESS
            }
        );
    }

    #[test]
    fn test_vertical_wall_position() {
        let maze = Maze::new(2, 3);
        let layout = Layout::from_maze(&maze, Viewport::new(300.0, 100.0));
        // Closed maze: every entry is a wall
        assert_eq!(layout.vertical_walls.len(), 4);
        assert_eq!(layout.horizontal_walls.len(), 3);
        let last = layout.vertical_walls[3];
        assert_eq!(last.center, Point2::new(200.0, 75.0));
        assert_eq!(
            last.shape,
            Shape::Rectangle {
                width: WALL_THICKNESS,
                height: 50.0
            }
        );
    }

    #[test]
    fn test_boundaries_goal_and_ball() {
        let maze = Maze::new(10, 14);
        let layout = Layout::from_maze(&maze, VIEWPORT);

        assert_eq!(layout.unit_width, 60.0);
        assert_eq!(layout.unit_height, 60.0);

        let [top, bottom, left, right] = layout.boundaries;
        assert_eq!(top.center, Point2::new(420.0, 0.0));
        assert_eq!(bottom.center, Point2::new(420.0, 600.0));
        assert_eq!(left.center, Point2::new(0.0, 300.0));
        assert_eq!(right.center, Point2::new(840.0, 300.0));
        assert_eq!(
            right.shape,
            Shape::Rectangle {
                width: BOUNDARY_THICKNESS,
                height: 600.0
            }
        );
        assert!(layout.boundaries.iter().all(|b| b.tag == Tag::Boundary));

        assert_eq!(layout.goal.center, Point2::new(810.0, 570.0));
        assert!(layout.goal.is_static);
        match layout.goal.shape {
            Shape::Rectangle { width, height } => {
                assert!((width - 42.0).abs() < 1e-4);
                assert!((height - 42.0).abs() < 1e-4);
            }
            other => panic!("unexpected goal shape {:?}", other),
        }

        assert_eq!(layout.ball.center, Point2::new(30.0, 30.0));
        assert_eq!(layout.ball.shape, Shape::Circle { radius: 15.0 });
        assert!(!layout.ball.is_static);
    }

    #[test]
    fn test_tag_user_data() {
        for tag in [Tag::Wall, Tag::Boundary, Tag::Goal, Tag::Ball] {
            assert_eq!(Tag::from_user_data(tag.into()), Some(tag));
        }
        assert_eq!(Tag::from_user_data(0), None);
    }
}
