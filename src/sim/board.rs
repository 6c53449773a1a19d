/// Board: the mutable state of one level in play.
///
/// Terrain and the teleport table never change after load; only the
/// hero and skull positions do, and only through the session's apply
/// and revert. Everything else reads the board through accessors or
/// through the borrowed view handed to the resolver.
use crate::domain::entity::{CellIx, Skull, SkullId};
use crate::domain::resolve::BoardView;
use crate::domain::tile::Tile;
use crate::sim::level::LevelDescriptor;

#[derive(Clone)]
pub struct Board {
    columns: usize,
    rows: usize,
    tiles: Vec<Tile>,
    portals: Vec<(CellIx, CellIx)>,
    hero: CellIx,
    skulls: Vec<Skull>,
    destination_count: usize,
}

impl Board {
    pub fn from_descriptor(level: &LevelDescriptor) -> Board {
        let destination_count = level.tiles.iter().filter(|t| t.is_destination()).count();
        Board {
            columns: level.columns,
            rows: level.rows,
            tiles: level.tiles.clone(),
            portals: level.portals.clone(),
            hero: level.hero_start,
            skulls: level.skull_starts.iter().map(|&at| Skull::new(at)).collect(),
            destination_count,
        }
    }

    // ── read access ──

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Tile at a cell; anything off the grid reads as void.
    #[inline]
    pub fn tile_at(&self, cell: CellIx) -> Tile {
        self.tiles.get(cell.0).copied().unwrap_or(Tile::Empty)
    }

    #[inline]
    pub fn hero(&self) -> CellIx {
        self.hero
    }

    pub fn skull_at(&self, cell: CellIx) -> Option<SkullId> {
        self.skulls.iter().find(|s| s.at == cell).map(|s| s.id)
    }

    pub fn skull_pos(&self, id: SkullId) -> Option<CellIx> {
        self.skulls.iter().find(|s| s.id == id).map(|s| s.at)
    }

    #[inline]
    pub fn skull_count(&self) -> usize {
        self.skulls.len()
    }

    #[allow(dead_code)]
    #[inline]
    pub fn destination_count(&self) -> usize {
        self.destination_count
    }

    /// Skulls currently at rest on a destination tile.
    pub fn collected_count(&self) -> usize {
        self.skulls
            .iter()
            .filter(|s| self.tile_at(s.at).is_destination())
            .count()
    }

    /// Borrowed view for the resolver.
    pub fn view(&self) -> BoardView<'_> {
        BoardView {
            tiles: &self.tiles,
            columns: self.columns,
            rows: self.rows,
            portals: &self.portals,
            hero: self.hero,
            skulls: &self.skulls,
        }
    }

    // ── mutation (session only) ──

    pub(crate) fn set_hero(&mut self, to: CellIx) {
        self.hero = to;
    }

    pub(crate) fn set_skull_pos(&mut self, id: SkullId, to: CellIx) {
        if let Some(skull) = self.skulls.iter_mut().find(|s| s.id == id) {
            skull.at = to;
        }
    }
}
