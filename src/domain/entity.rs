/// Movers and move records: the hero, skulls, and the undo unit.
/// Positions are row-major cell indices; all adjacency is index
/// arithmetic that refuses to wrap a row or leave the grid.

/// Row-major cell index into the level grid.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct CellIx(pub usize);

impl CellIx {
    pub fn row(self, columns: usize) -> usize {
        self.0 / columns
    }

    pub fn col(self, columns: usize) -> usize {
        self.0 % columns
    }
}

/// Movement direction for one logical turn.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// The adjacent cell in this direction, or None at the grid edge.
    /// Horizontal steps stop at the row boundary rather than wrapping
    /// into the neighbouring row.
    pub fn step(self, from: CellIx, columns: usize, rows: usize) -> Option<CellIx> {
        let row = from.row(columns);
        let col = from.col(columns);
        match self {
            Direction::Up => (row > 0).then(|| CellIx(from.0 - columns)),
            Direction::Down => (row + 1 < rows).then(|| CellIx(from.0 + columns)),
            Direction::Left => (col > 0).then(|| CellIx(from.0 - 1)),
            Direction::Right => (col + 1 < columns).then(|| CellIx(from.0 + 1)),
        }
    }
}

/// Stable skull identity: the cell index the skull started the level
/// on. Survives any amount of pushing, so undo records and events can
/// name a skull without chasing its current position.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SkullId(#[allow(dead_code)] pub usize);

/// One skull: identity plus current cell.
#[derive(Clone, Copy, Debug)]
pub struct Skull {
    pub id: SkullId,
    pub at: CellIx,
}

impl Skull {
    pub fn new(at: CellIx) -> Self {
        Skull {
            id: SkullId(at.0),
            at,
        }
    }
}

/// One undoable unit: where the hero stood before the move and, when
/// a skull was pushed, which one and where it stood.
#[derive(Clone, Copy, Debug)]
pub struct MoveBackup {
    pub hero_from: CellIx,
    pub skull: Option<(SkullId, CellIx)>,
}
