/// Events emitted while applying or reverting a move.
/// The presentation layer consumes these for status text; an
/// animation layer would replay them in emission order.
use crate::domain::entity::{CellIx, SkullId};

/// Which mover crossed a portal.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mover {
    Hero,
    Skull,
}

#[derive(Clone, Debug)]
#[allow(dead_code)]
pub enum GameEvent {
    HeroMoved { from: CellIx, to: CellIx },
    SkullPushed { skull: SkullId, from: CellIx, to: CellIx },
    PortalTraversed { mover: Mover, entry: CellIx, exit: CellIx },
    DestinationTouched { cell: CellIx },
    PushesChanged { pushes: u32 },
    RevertsChanged { reverts: u32 },
    LevelCompleted { stars: u8 },
}
