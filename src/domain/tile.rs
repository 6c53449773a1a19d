/// Tile vocabulary. Behavior is queried through methods rather than
/// stored as flags, so what each tile means lives in one place.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Floor,       // Walkable, stops a mover
    Block,       // Solid wall
    Ice,         // Walkable, mover keeps sliding
    Destination, // Where skulls must come to rest
    Portal,      // Relays a mover to its linked cell
    Empty,       // Void outside the level shape, blocks like a wall
}

impl Tile {
    /// Does this tile end a walk before it is entered? (i.e. is it a wall)
    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Block | Tile::Empty)
    }

    /// Is this the tile skulls are scored on?
    pub fn is_destination(self) -> bool {
        matches!(self, Tile::Destination)
    }

    /// Does a mover keep sliding across this tile?
    #[allow(dead_code)]
    pub fn is_slick(self) -> bool {
        matches!(self, Tile::Ice)
    }

    /// Does a mover come to rest on this tile?
    #[allow(dead_code)]
    pub fn is_rest(self) -> bool {
        matches!(self, Tile::Floor | Tile::Destination)
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Floor
    }
}
