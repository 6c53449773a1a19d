/// Move resolution: pure scanning over a borrowed board view.
/// Nothing here mutates; one key press resolves to a complete outcome
/// (hero path, at most one pushed skull) which the session applies
/// afterwards in a single step.
///
/// ## Tile truth table (what happens when a walk reaches a cell)
/// | Tile        | Hero walk               | Skull travel            |
/// |-------------|-------------------------|-------------------------|
/// | Floor       | enter and rest          | enter and rest          |
/// | Destination | enter and rest, flagged | enter and rest          |
/// | Ice         | enter, keep sliding     | enter, keep sliding     |
/// | Portal      | relay to exit, continue | relay to exit, continue |
/// | Block/Empty | end short of the cell   | end short of the cell   |
/// | grid edge   | end short of the edge   | end short of the edge   |
///
/// A skull is pushed only when it sits directly beside the current
/// segment origin (the hero's cell, or the portal exit it last landed
/// on). A hero that slid across ice into a skull rests on the last
/// ice cell short of it instead. Skulls push nothing: their travel
/// ends short of any occupant, including the cell the hero is about
/// to take.
///
/// A portal exit is not itself re-triggered, so a linked pair relays
/// exactly once per crossing. Re-entering a portal already crossed in
/// the same walk can only loop forever and resolves to an error.
use crate::domain::entity::{CellIx, Direction, Skull, SkullId};
use crate::domain::tile::Tile;
use crate::error::LevelError;

// ─────────────────────────── Board view ───────────────────────────

/// Read-only view of one board: tiles, teleport table, occupancy.
/// Borrowed from the owning board so resolution can never mutate it.
pub struct BoardView<'a> {
    pub tiles: &'a [Tile],
    pub columns: usize,
    pub rows: usize,
    pub portals: &'a [(CellIx, CellIx)],
    pub hero: CellIx,
    pub skulls: &'a [Skull],
}

impl<'a> BoardView<'a> {
    /// Tile at a cell; anything off the slice reads as void.
    #[inline]
    pub fn tile_at(&self, cell: CellIx) -> Tile {
        self.tiles.get(cell.0).copied().unwrap_or(Tile::Empty)
    }

    #[inline]
    pub fn skull_at(&self, cell: CellIx) -> Option<SkullId> {
        self.skulls.iter().find(|s| s.at == cell).map(|s| s.id)
    }

    fn portal_exit(&self, entry: CellIx) -> Result<CellIx, LevelError> {
        self.portals
            .iter()
            .find(|(from, _)| *from == entry)
            .map(|(_, to)| *to)
            .ok_or(LevelError::UnwiredPortal { cell: entry.0 })
    }
}

// ─────────────────────────── Outcome types ───────────────────────────

/// One travel leg, in playback order.
#[allow(dead_code)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Leg {
    /// Direct glide between two cells: a single step, an ice run, or
    /// the straight hop back of a revert.
    Slide { from: CellIx, to: CellIx },
    /// Portal relay.
    Warp { entry: CellIx, exit: CellIx },
}

/// Complete travel of one mover: origin, final cell, ordered legs.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Path {
    pub from: CellIx,
    pub to: CellIx,
    pub legs: Vec<Leg>,
}

impl Path {
    /// A path that jumps straight between two cells, as a revert does.
    pub fn direct(from: CellIx, to: CellIx) -> Path {
        Path {
            from,
            to,
            legs: vec![Leg::Slide { from, to }],
        }
    }

    /// Portal relays along this path, in order.
    pub fn warps(&self) -> impl Iterator<Item = (CellIx, CellIx)> + '_ {
        self.legs.iter().filter_map(|leg| match leg {
            Leg::Warp { entry, exit } => Some((*entry, *exit)),
            Leg::Slide { .. } => None,
        })
    }
}

/// The skull moved by a push and its full travel.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SkullPush {
    pub id: SkullId,
    pub path: Path,
}

/// Resolved effect of one key press. Positions describe where things
/// end up; nothing has happened to the board yet.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MoveOutcome {
    pub hero: Path,
    pub push: Option<SkullPush>,
    /// The hero came to rest on a destination tile by walking onto it.
    pub touched_destination: bool,
}

// ─────────────────────────── Hero walk ───────────────────────────

/// Resolve one directional key press against the current board.
///
/// Returns `Ok(None)` when the hero cannot move at all: the adjacent
/// cell is solid, off the grid, or holds a skull that cannot budge.
/// The only error is a teleport table whose chain loops.
pub fn resolve(view: &BoardView, dir: Direction) -> Result<Option<MoveOutcome>, LevelError> {
    let mut legs: Vec<Leg> = Vec::new();
    let mut visited: Vec<CellIx> = Vec::new();
    let mut push: Option<SkullPush> = None;
    let mut touched = false;
    let mut seg_from = view.hero;

    let rest = 'walk: loop {
        // One straight segment; a portal relay starts the next one.
        let mut stop = seg_from;
        let mut cell = seg_from;
        loop {
            let next = match dir.step(cell, view.columns, view.rows) {
                Some(next) => next,
                None => {
                    if stop != seg_from {
                        legs.push(Leg::Slide { from: seg_from, to: stop });
                    }
                    break 'walk stop;
                }
            };

            if let Some(id) = view.skull_at(next) {
                if cell == seg_from {
                    // Directly beside the skull: try the push.
                    if let Some(path) = skull_travel(view, next, dir)? {
                        legs.push(Leg::Slide { from: seg_from, to: next });
                        push = Some(SkullPush { id, path });
                        break 'walk next;
                    }
                }
                // Pinned skull, or one reached over ice: rest short of it.
                if stop != seg_from {
                    legs.push(Leg::Slide { from: seg_from, to: stop });
                }
                break 'walk stop;
            }

            match view.tile_at(next) {
                Tile::Block | Tile::Empty => {
                    if stop != seg_from {
                        legs.push(Leg::Slide { from: seg_from, to: stop });
                    }
                    break 'walk stop;
                }
                Tile::Floor => {
                    legs.push(Leg::Slide { from: seg_from, to: next });
                    break 'walk next;
                }
                Tile::Destination => {
                    legs.push(Leg::Slide { from: seg_from, to: next });
                    touched = true;
                    break 'walk next;
                }
                Tile::Ice => {
                    stop = next;
                    cell = next;
                }
                Tile::Portal => {
                    if visited.contains(&next) {
                        return Err(LevelError::PortalCycle { cell: next.0 });
                    }
                    visited.push(next);
                    let exit = view.portal_exit(next)?;
                    if view.skull_at(exit).is_some() {
                        // Exit taken: the walk ends short of the portal.
                        if stop != seg_from {
                            legs.push(Leg::Slide { from: seg_from, to: stop });
                        }
                        break 'walk stop;
                    }
                    legs.push(Leg::Slide { from: seg_from, to: next });
                    legs.push(Leg::Warp { entry: next, exit });
                    seg_from = exit;
                    continue 'walk;
                }
            }
        }
    };

    if rest == view.hero {
        return Ok(None);
    }
    Ok(Some(MoveOutcome {
        hero: Path {
            from: view.hero,
            to: rest,
            legs,
        },
        push,
        touched_destination: touched,
    }))
}

// ─────────────────────────── Skull travel ───────────────────────────

/// Where a pushed skull ends up, or None when it cannot leave its
/// cell. The hero takes the vacated origin, so that cell blocks the
/// travel; the hero's pre-move cell is already empty and does not.
fn skull_travel(
    view: &BoardView,
    origin: CellIx,
    dir: Direction,
) -> Result<Option<Path>, LevelError> {
    let mut legs: Vec<Leg> = Vec::new();
    let mut visited: Vec<CellIx> = Vec::new();
    let mut seg_from = origin;

    let rest = 'travel: loop {
        let mut stop = seg_from;
        let mut cell = seg_from;
        loop {
            let next = match dir.step(cell, view.columns, view.rows) {
                Some(next) => next,
                None => {
                    if stop != seg_from {
                        legs.push(Leg::Slide { from: seg_from, to: stop });
                    }
                    break 'travel stop;
                }
            };

            if next == origin || view.skull_at(next).is_some() {
                if stop != seg_from {
                    legs.push(Leg::Slide { from: seg_from, to: stop });
                }
                break 'travel stop;
            }

            match view.tile_at(next) {
                Tile::Block | Tile::Empty => {
                    if stop != seg_from {
                        legs.push(Leg::Slide { from: seg_from, to: stop });
                    }
                    break 'travel stop;
                }
                Tile::Floor | Tile::Destination => {
                    legs.push(Leg::Slide { from: seg_from, to: next });
                    break 'travel next;
                }
                Tile::Ice => {
                    stop = next;
                    cell = next;
                }
                Tile::Portal => {
                    if visited.contains(&next) {
                        return Err(LevelError::PortalCycle { cell: next.0 });
                    }
                    visited.push(next);
                    let exit = view.portal_exit(next)?;
                    if exit == origin || view.skull_at(exit).is_some() {
                        if stop != seg_from {
                            legs.push(Leg::Slide { from: seg_from, to: stop });
                        }
                        break 'travel stop;
                    }
                    legs.push(Leg::Slide { from: seg_from, to: next });
                    legs.push(Leg::Warp { entry: next, exit });
                    seg_from = exit;
                    continue 'travel;
                }
            }
        }
    };

    if rest == origin {
        return Ok(None);
    }
    Ok(Some(Path {
        from: origin,
        to: rest,
        legs,
    }))
}
