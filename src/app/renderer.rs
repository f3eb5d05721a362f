use std::io::{Stdout, Write};

use crossterm::{
    QueueableCommand, cursor, queue,
    style::{self, Attribute, Color, Stylize},
    terminal::{self, ClearType},
};
use unicode_truncate::UnicodeTruncateStr;

use crate::{
    geometry::{Shape, Tag, Viewport},
    host::BodyView,
    maze::grid::Grid,
};

/// What the terminal shows in each character cell of the play area.
pub type Canvas = Grid<Option<Tag>>;

/// Symbol and color drawn for a body tag.
fn symbol(tag: Option<Tag>) -> (&'static str, Color) {
    let styled = match tag {
        None => (" ", Color::Reset),
        Some(Tag::Boundary) => ("█", Color::DarkGrey),
        Some(Tag::Wall) => ("█", Color::Grey),
        Some(Tag::Goal) => ("█", Color::Green),
        Some(Tag::Ball) => ("●", Color::Red),
    };

    #[cfg(debug_assertions)]
    {
        use unicode_width::UnicodeWidthStr;
        assert_eq!(
            styled.0.width(),
            1,
            "Each symbol must occupy exactly one character width."
        );
    }

    styled
}

/// Higher draws on top of lower when bodies share a cell.
fn priority(tag: Tag) -> u8 {
    match tag {
        Tag::Boundary => 0,
        Tag::Wall => 1,
        Tag::Goal => 2,
        Tag::Ball => 3,
    }
}

/// Paint `bodies` onto `canvas`, which covers `viewport`.
///
/// A cell is painted when its center lies inside the body, with every body treated as at
/// least one cell across so thin walls still show up as a single line of characters. The
/// cell containing a ball's center is always painted.
pub fn rasterize(canvas: &mut Canvas, bodies: &[BodyView], viewport: Viewport) {
    canvas.fill(None);
    let (rows, columns) = (canvas.rows(), canvas.columns());
    if rows == 0 || columns == 0 {
        return;
    }
    let cell_width = viewport.width / columns as f32;
    let cell_height = viewport.height / rows as f32;

    fn paint(canvas: &mut Canvas, coord: (usize, usize), tag: Tag) {
        let cell = &mut canvas[coord];
        if cell.is_none_or(|current| priority(current) <= priority(tag)) {
            *cell = Some(tag);
        }
    }

    for body in bodies {
        let (sin, cos) = body.rotation.sin_cos();
        // The cell's half extents seen from the body's rotated frame
        let cell_half_x = (cos.abs() * cell_width + sin.abs() * cell_height) / 2.0;
        let cell_half_y = (sin.abs() * cell_width + cos.abs() * cell_height) / 2.0;

        let reach = match body.shape {
            Shape::Rectangle { width, height } => width.hypot(height) / 2.0,
            Shape::Circle { radius } => radius,
        } + cell_width.max(cell_height);

        let column_range = cell_range(body.center.x, reach, cell_width, columns);
        let row_range = cell_range(body.center.y, reach, cell_height, rows);

        for row in row_range {
            for column in column_range.clone() {
                let dx = (column as f32 + 0.5) * cell_width - body.center.x;
                let dy = (row as f32 + 0.5) * cell_height - body.center.y;
                // Rotate into the body's frame
                let local_x = cos * dx + sin * dy;
                let local_y = -sin * dx + cos * dy;

                let covered = match body.shape {
                    Shape::Rectangle { width, height } => {
                        let half_x = (width / 2.0).max(cell_half_x);
                        let half_y = (height / 2.0).max(cell_half_y);
                        (-half_x..half_x).contains(&local_x) && (-half_y..half_y).contains(&local_y)
                    }
                    Shape::Circle { radius } => {
                        let radius_x = radius.max(cell_width / 2.0);
                        let radius_y = radius.max(cell_height / 2.0);
                        (local_x / radius_x).powi(2) + (local_y / radius_y).powi(2) < 1.0
                    }
                };
                if covered {
                    paint(canvas, (row, column), body.tag);
                }
            }
        }

        // An ellipse a cell across can fall between cell centers
        if !matches!(body.shape, Shape::Circle { .. }) {
            continue;
        }
        let center_column = (body.center.x / cell_width).floor();
        let center_row = (body.center.y / cell_height).floor();
        if (0.0..columns as f32).contains(&center_column) && (0.0..rows as f32).contains(&center_row)
        {
            paint(
                canvas,
                (center_row as usize, center_column as usize),
                body.tag,
            );
        }
    }
}

/// Indices of the cells of size `cell_size` within `reach` of `center`, clamped to `0..count`.
fn cell_range(center: f32, reach: f32, cell_size: f32, count: usize) -> std::ops::Range<usize> {
    let first = ((center - reach) / cell_size).floor().max(0.0) as usize;
    let last = ((center + reach) / cell_size).ceil().max(0.0) as usize;
    first.min(count)..last.min(count)
}

/// Center `text` in a line of `columns` characters, cutting it if it does not fit.
pub fn status_line(text: &str, columns: usize) -> String {
    let (truncated, width) = text.unicode_truncate(columns);
    let padding = (columns - width) / 2;
    format!("{}{}", " ".repeat(padding), truncated)
}

pub struct Renderer {
    /// Standard output handle to write to the terminal
    stdout: Stdout,
    /// Terminal size (columns, rows), including the status row
    terminal_size: (u16, u16),
    /// World area drawn into the play area
    viewport: Viewport,
    canvas: Canvas,
}

impl Renderer {
    /// Number of terminal rows reserved below the play area for status messages
    pub const NUM_STATUS_ROWS: u16 = 1;

    pub fn new(terminal_columns: u16, terminal_rows: u16, viewport: Viewport) -> Self {
        let (columns, rows) = Renderer::play_area(terminal_columns, terminal_rows);
        Self {
            stdout: std::io::stdout(),
            terminal_size: (terminal_columns, terminal_rows),
            viewport,
            canvas: Grid::new(rows as usize, columns as usize, None),
        }
    }

    /// Size of the play area (columns, rows) for a terminal of the given size.
    pub fn play_area(terminal_columns: u16, terminal_rows: u16) -> (u16, u16) {
        (
            terminal_columns,
            terminal_rows.saturating_sub(Renderer::NUM_STATUS_ROWS),
        )
    }

    /// Adapt to a new terminal size. The world keeps its size and is scaled to fit.
    pub fn resize(&mut self, terminal_columns: u16, terminal_rows: u16) -> std::io::Result<()> {
        tracing::debug!(
            "[render] Terminal resized to {}x{}",
            terminal_columns,
            terminal_rows
        );
        let (columns, rows) = Renderer::play_area(terminal_columns, terminal_rows);
        self.terminal_size = (terminal_columns, terminal_rows);
        self.canvas = Grid::new(rows as usize, columns as usize, None);
        self.stdout.queue(terminal::Clear(ClearType::All))?;
        Ok(())
    }

    /// Draw one frame: the bodies in the play area and `status` on the bottom row.
    pub fn draw(&mut self, bodies: &[BodyView], status: &str, highlight: bool) -> std::io::Result<()> {
        rasterize(&mut self.canvas, bodies, self.viewport);

        for row in 0..self.canvas.rows() {
            self.stdout.queue(cursor::MoveTo(0, row as u16))?;
            // Print runs of equal cells in one styled chunk
            let cells = self.canvas.row(row);
            let mut start = 0;
            while start < cells.len() {
                let tag = cells[start];
                let end = cells[start..]
                    .iter()
                    .position(|cell| *cell != tag)
                    .map_or(cells.len(), |len| start + len);
                let (symbol, color) = symbol(tag);
                self.stdout.queue(style::PrintStyledContent(
                    symbol.repeat(end - start).with(color),
                ))?;
                start = end;
            }
        }

        let (columns, rows) = self.terminal_size;
        if rows >= Renderer::NUM_STATUS_ROWS {
            let line = status_line(status, columns as usize);
            let styled = if highlight {
                line.with(Color::Green).attribute(Attribute::Bold)
            } else {
                line.with(Color::Cyan)
            };
            queue!(
                self.stdout,
                cursor::MoveTo(0, rows - Renderer::NUM_STATUS_ROWS),
                terminal::Clear(ClearType::CurrentLine),
                style::PrintStyledContent(styled)
            )?;
        }
        self.stdout.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapier2d::na::Point2;

    fn view(tag: Tag, x: f32, y: f32, shape: Shape) -> BodyView {
        BodyView {
            tag,
            shape,
            center: Point2::new(x, y),
            rotation: 0.0,
        }
    }

    fn painted(canvas: &Canvas, tag: Tag) -> Vec<(usize, usize)> {
        canvas
            .iter()
            .filter(|(_, cell)| **cell == Some(tag))
            .map(|(coord, _)| coord)
            .collect()
    }

    #[test]
    fn test_thin_wall_is_one_row() {
        // 10 columns x 5 rows of 10x20 units
        let viewport = Viewport::new(100.0, 100.0);
        let mut canvas = Canvas::new(5, 10, None);
        let wall = view(
            Tag::Wall,
            30.0,
            40.0,
            Shape::Rectangle {
                width: 60.0,
                height: 5.0,
            },
        );
        rasterize(&mut canvas, &[wall], viewport);

        let cells = painted(&canvas, Tag::Wall);
        assert_eq!(cells, (0..6).map(|c| (1, c)).collect::<Vec<_>>());
    }

    #[test]
    fn test_vertical_wall_is_one_column() {
        let viewport = Viewport::new(100.0, 100.0);
        let mut canvas = Canvas::new(5, 10, None);
        let wall = view(
            Tag::Wall,
            50.0,
            50.0,
            Shape::Rectangle {
                width: 5.0,
                height: 100.0,
            },
        );
        rasterize(&mut canvas, &[wall], viewport);

        let cells = painted(&canvas, Tag::Wall);
        assert_eq!(cells, (0..5).map(|r| (r, 4)).collect::<Vec<_>>());
    }

    #[test]
    fn test_ball_draws_over_walls() {
        let viewport = Viewport::new(100.0, 100.0);
        let mut canvas = Canvas::new(5, 10, None);
        let bodies = [
            view(Tag::Ball, 55.0, 50.0, Shape::Circle { radius: 1.0 }),
            view(
                Tag::Wall,
                50.0,
                50.0,
                Shape::Rectangle {
                    width: 100.0,
                    height: 5.0,
                },
            ),
        ];
        rasterize(&mut canvas, &bodies, viewport);
        assert_eq!(canvas[(2, 5)], Some(Tag::Ball));
        assert_eq!(canvas[(2, 4)], Some(Tag::Wall));
    }

    #[test]
    fn test_bodies_outside_are_clipped() {
        let viewport = Viewport::new(100.0, 100.0);
        let mut canvas = Canvas::new(5, 10, None);
        rasterize(
            &mut canvas,
            &[view(Tag::Goal, 500.0, -300.0, Shape::Circle { radius: 4.0 })],
            viewport,
        );
        assert!(canvas.iter().all(|(_, cell)| cell.is_none()));
    }

    #[test]
    fn test_rotated_wall() {
        let viewport = Viewport::new(100.0, 100.0);
        let mut canvas = Canvas::new(5, 10, None);
        let mut wall = view(
            Tag::Wall,
            50.0,
            50.0,
            Shape::Rectangle {
                width: 60.0,
                height: 5.0,
            },
        );
        wall.rotation = std::f32::consts::FRAC_PI_2;
        rasterize(&mut canvas, &[wall], viewport);
        // Standing upright it spans rows instead of columns
        let cells = painted(&canvas, Tag::Wall);
        assert!(cells.iter().all(|&(_, column)| column == 4 || column == 5));
        assert!(cells.iter().any(|&(row, _)| row == 1));
        assert!(cells.iter().any(|&(row, _)| row == 3));
    }

    #[test]
    fn test_status_line() {
        assert_eq!(status_line("win", 9), "   win");
        assert_eq!(status_line("a long message", 6), "a long");
        assert_eq!(status_line("", 4), "  ");
    }
}
