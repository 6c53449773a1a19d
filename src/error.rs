/// Error types for level loading and move application.
///
/// A `LevelError` means the descriptor cannot produce a playable
/// board; no partially-built level ever escapes the loader. The one
/// runtime arm is `PortalCycle`, which only a malformed teleport
/// table can trigger and which surfaces during move resolution.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("field `{field}` has an unusable value: `{value}`")]
    BadNumber { field: &'static str, value: String },

    #[error("map declares {declared} rows but only {found} follow the map header")]
    MapTooShort { declared: usize, found: usize },

    #[error("map row {row} has {found} cells, expected {declared}")]
    RowTooShort {
        row: usize,
        declared: usize,
        found: usize,
    },

    #[error("{what} cell {cell} lies outside the {cells}-cell grid")]
    CellOutOfBounds {
        what: &'static str,
        cell: usize,
        cells: usize,
    },

    #[error("hero cannot start on the tile at cell {cell}")]
    HeroOnBadTile { cell: usize },

    #[error("skull cannot start on the tile at cell {cell}")]
    SkullOnBadTile { cell: usize },

    #[error("two starting pieces share cell {cell}")]
    SkullCollision { cell: usize },

    #[error("portal tile at cell {cell} has no teleport entry")]
    UnwiredPortal { cell: usize },

    #[error("portal tile at cell {cell} has more than one teleport entry")]
    DoubledPortal { cell: usize },

    #[error("teleport exit at cell {cell} is a solid tile")]
    PortalExitSolid { cell: usize },

    #[error("teleport chain loops back through the portal at cell {cell}")]
    PortalCycle { cell: usize },

    #[error("cannot read level: {0}")]
    Io(#[from] std::io::Error),
}

/// Rejection of an `apply` whose outcome was resolved against an
/// older board state.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("move was resolved with the hero at cell {expected} but it now stands at cell {found}")]
pub struct StaleOutcome {
    pub expected: usize,
    pub found: usize,
}
