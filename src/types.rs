//! Output types for the layout engine.
//!
//! All public types derive [`serde::Serialize`] and [`serde::Deserialize`]
//! with camelCase field names and lowercase tag strings, so a transport can
//! forward them to clients verbatim.

use serde::{Deserialize, Serialize};

/// A cardinal direction on the grid.
///
/// For belt tiles, directions name the *side* of the cell: an input of
/// `Up` means material enters from the neighbor above; an output of `Down`
/// means material exits toward the neighbor below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All four directions, in encoding order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// The opposite direction.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// Grid delta `(dx, dy)` with the origin at the top-left and Y growing
    /// downward.
    pub fn delta(self) -> (i64, i64) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// Stable index into per-direction arrays.
    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }
}

/// Outcome of a single bounded check, and of the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveStatus {
    Sat,
    Unsat,
    Unknown,
}

/// Rectangle dimensions of a probed or solved layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: u32,
    pub height: u32,
}

/// One bounded check at a specific rectangle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub iteration: u32,
    pub width: u32,
    pub height: u32,
    pub status: SolveStatus,
}

/// A machine footprint placed on the grid. `(x, y)` is the top-left corner;
/// `w` is the long (port-carrying) axis along X, `h` the short axis along Y.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedBuilding {
    pub node_id: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl PlacedBuilding {
    /// True if the two footprints share at least one cell.
    pub fn overlaps(&self, other: &PlacedBuilding) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    /// True if the two footprints share a grid edge (not merely a corner).
    pub fn touches(&self, other: &PlacedBuilding) -> bool {
        let x_overlap = self.x < other.x + other.w && other.x < self.x + self.w;
        let y_overlap = self.y < other.y + other.h && other.y < self.y + self.h;
        let x_abut = self.x + self.w == other.x || other.x + other.w == self.x;
        let y_abut = self.y + self.h == other.y || other.y + other.h == self.y;
        (x_overlap && y_abut) || (y_overlap && x_abut)
    }
}

/// A unit belt tile in the solved layout.
///
/// For a bridge, `in_dir`/`out_dir` record the vertical pair (the primary
/// axis by convention) and `edge_id` names the vertically routed edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeltSegment {
    pub x: u32,
    pub y: u32,
    pub in_dir: Direction,
    pub out_dir: Direction,
    pub is_bridge: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_id: Option<String>,
}

/// Terminal result of a solving session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSolution {
    pub status: SolveStatus,
    pub bounds: Bounds,
    pub placements: Vec<PlacedBuilding>,
    pub segments: Vec<BeltSegment>,
    pub attempts: Vec<Attempt>,
    pub elapsed_ms: f64,
}

impl LayoutSolution {
    /// Render the board as one glyph per cell: `.` empty, `#` machine,
    /// arrows for conveyors, `+` for bridges. Debug aid only.
    pub fn render(&self) -> String {
        let w = self.bounds.width as usize;
        let h = self.bounds.height as usize;
        let mut rows = vec![vec!['.'; w]; h];
        for p in &self.placements {
            for dy in 0..p.h as usize {
                for dx in 0..p.w as usize {
                    rows[p.y as usize + dy][p.x as usize + dx] = '#';
                }
            }
        }
        for s in &self.segments {
            let glyph = if s.is_bridge {
                '+'
            } else {
                match s.out_dir {
                    Direction::Up => '^',
                    Direction::Right => '>',
                    Direction::Down => 'v',
                    Direction::Left => '<',
                }
            };
            rows[s.y as usize][s.x as usize] = glyph;
        }
        let mut out = String::with_capacity(h * (w + 1));
        for row in rows {
            out.extend(row);
            out.push('\n');
        }
        out
    }
}

/// One item of the progress stream: interim attempts, then exactly one
/// terminal solution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum StreamItem {
    Attempt(Attempt),
    Solution(LayoutSolution),
}

/// The resolved state of a single grid cell, reconstructed from a model.
///
/// Exactly one variant holds per cell; the encoder works on the Boolean
/// projection of this enum and the extractor folds it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileState {
    Empty,
    /// Occupied by the machine at this node index.
    Machine(usize),
    Conveyor {
        input: Direction,
        output: Direction,
    },
    Bridge {
        vertical_in: Direction,
        vertical_out: Direction,
        horizontal_in: Direction,
        horizontal_out: Direction,
    },
}
