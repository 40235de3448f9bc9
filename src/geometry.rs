//! Virtual-pixel coordinates.
//!
//! The behaviours are tuned in pixels (speeds, margins, hit radii), so the
//! coordinator works in virtual pixels and the renderer maps them onto
//! terminal cells.

pub(crate) const CELL_W: i32 = 8;
pub(crate) const CELL_H: i32 = 16;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Point {
    pub(crate) x: i32,
    pub(crate) y: i32,
}

impl Point {
    pub(crate) const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub(crate) fn distance_to(self, other: Point) -> f32 {
        let dx = (other.x - self.x) as f32;
        let dy = (other.y - self.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// Centre of the terminal cell at (col, row).
    pub(crate) fn from_cell(col: u16, row: u16) -> Self {
        Self {
            x: col as i32 * CELL_W + CELL_W / 2,
            y: row as i32 * CELL_H + CELL_H / 2,
        }
    }

    /// Cell containing this point; may be off-screen (negative).
    pub(crate) fn to_cell(self) -> (i32, i32) {
        (self.x.div_euclid(CELL_W), self.y.div_euclid(CELL_H))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Size {
    pub(crate) w: i32,
    pub(crate) h: i32,
}

impl Size {
    pub(crate) const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }

    pub(crate) fn from_cells(cols: u16, rows: u16) -> Self {
        Self {
            w: cols as i32 * CELL_W,
            h: rows as i32 * CELL_H,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub(crate) const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub(crate) fn name(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    /// Unit step in screen space (y grows downwards).
    pub(crate) fn unit(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    /// Dominant axis of a displacement; ties go vertical.
    pub(crate) fn dominant(dx: i32, dy: i32) -> Self {
        if dx.abs() > dy.abs() {
            if dx > 0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if dy > 0 {
            Direction::Down
        } else {
            Direction::Up
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominant_axis() {
        assert_eq!(Direction::dominant(10, 3), Direction::Right);
        assert_eq!(Direction::dominant(-10, 3), Direction::Left);
        assert_eq!(Direction::dominant(2, 5), Direction::Down);
        assert_eq!(Direction::dominant(4, -4), Direction::Up);
    }

    #[test]
    fn cell_mapping_round_trips_to_same_cell() {
        let p = Point::from_cell(3, 2);
        assert_eq!(p.to_cell(), (3, 2));
        assert_eq!(Point::new(-1, -1).to_cell(), (-1, -1));
    }
}
