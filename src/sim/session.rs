/// One play session: resolve, apply, revert, score.
///
/// ## Processing order (one key press)
/// 1. Resolve the whole move against the current board (pure).
/// 2. Apply it in a single step: hero first, then the pushed skull.
/// 3. Record the undo unit and bump the push counter.
/// 4. Re-evaluate completion and emit events in playback order.
///
/// The board never holds a half-applied move: between calls it is
/// always exactly the sum of the applied history. An animation layer
/// replays `AppliedMove` paths and the event list; the engine itself
/// is done synchronously.
use crate::domain::entity::{Direction, MoveBackup};
use crate::domain::resolve::{resolve, MoveOutcome, Path, SkullPush};
use crate::error::{LevelError, StaleOutcome};
use crate::sim::board::Board;
use crate::sim::event::{GameEvent, Mover};
use crate::sim::level::LevelDescriptor;

/// Everything a move produced: the applied record (None when the
/// hero could not move) and the events in playback order.
pub struct MoveFeedback {
    pub applied: Option<AppliedMove>,
    pub events: Vec<GameEvent>,
}

/// Record of one applied (or reverted) move, for playback.
#[allow(dead_code)]
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AppliedMove {
    pub hero: Path,
    pub push: Option<SkullPush>,
}

/// Completion snapshot after a mutation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ScoreState {
    pub collected: usize,
    pub total: usize,
    pub complete: bool,
}

// ══════════════════════════════════════════════════════════════
// Game session
// ══════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct Game {
    level: LevelDescriptor,
    board: Board,
    history: Vec<MoveBackup>,
    pushes: u32,
    reverts: u32,
}

impl Game {
    pub fn new(level: LevelDescriptor) -> Game {
        let board = Board::from_descriptor(&level);
        Game {
            level,
            board,
            history: Vec::new(),
            pushes: 0,
            reverts: 0,
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn level(&self) -> &LevelDescriptor {
        &self.level
    }

    #[inline]
    pub fn pushes(&self) -> u32 {
        self.pushes
    }

    #[inline]
    pub fn reverts(&self) -> u32 {
        self.reverts
    }

    #[allow(dead_code)]
    #[inline]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Pure resolution against the current board; applies nothing.
    pub fn resolve(&self, dir: Direction) -> Result<Option<MoveOutcome>, LevelError> {
        resolve(&self.board.view(), dir)
    }

    /// Resolve and, if the hero can move, apply in one call.
    pub fn move_hero(&mut self, dir: Direction) -> Result<MoveFeedback, LevelError> {
        let outcome = match self.resolve(dir)? {
            Some(outcome) => outcome,
            None => {
                return Ok(MoveFeedback {
                    applied: None,
                    events: Vec::new(),
                })
            }
        };
        let mut events = Vec::new();
        let applied = self.apply_outcome(&outcome, &mut events);
        Ok(MoveFeedback {
            applied: Some(applied),
            events,
        })
    }

    /// Apply an outcome resolved earlier. Rejected when the board has
    /// moved on since it was resolved.
    #[allow(dead_code)]
    pub fn apply(
        &mut self,
        outcome: &MoveOutcome,
        events: &mut Vec<GameEvent>,
    ) -> Result<AppliedMove, StaleOutcome> {
        if outcome.hero.from != self.board.hero() {
            return Err(StaleOutcome {
                expected: outcome.hero.from.0,
                found: self.board.hero().0,
            });
        }
        Ok(self.apply_outcome(outcome, events))
    }

    fn apply_outcome(&mut self, outcome: &MoveOutcome, events: &mut Vec<GameEvent>) -> AppliedMove {
        let was_complete = self.evaluate().complete;

        let hero_from = outcome.hero.from;
        self.board.set_hero(outcome.hero.to);
        events.push(GameEvent::HeroMoved {
            from: hero_from,
            to: outcome.hero.to,
        });
        for (entry, exit) in outcome.hero.warps() {
            events.push(GameEvent::PortalTraversed {
                mover: Mover::Hero,
                entry,
                exit,
            });
        }
        if outcome.touched_destination {
            events.push(GameEvent::DestinationTouched {
                cell: outcome.hero.to,
            });
        }

        let mut skull_backup = None;
        if let Some(push) = &outcome.push {
            skull_backup = Some((push.id, push.path.from));
            self.board.set_skull_pos(push.id, push.path.to);
            self.pushes += 1;
            events.push(GameEvent::SkullPushed {
                skull: push.id,
                from: push.path.from,
                to: push.path.to,
            });
            for (entry, exit) in push.path.warps() {
                events.push(GameEvent::PortalTraversed {
                    mover: Mover::Skull,
                    entry,
                    exit,
                });
            }
            events.push(GameEvent::PushesChanged {
                pushes: self.pushes,
            });
        }
        self.history.push(MoveBackup {
            hero_from,
            skull: skull_backup,
        });

        let score = self.evaluate();
        if score.complete && !was_complete {
            events.push(GameEvent::LevelCompleted {
                stars: self.award(),
            });
        }

        AppliedMove {
            hero: outcome.hero.clone(),
            push: outcome.push.clone(),
        }
    }

    /// Undo exactly one applied move. Returns the inverse motion for
    /// playback, or None when there is nothing to revert.
    pub fn revert(&mut self, events: &mut Vec<GameEvent>) -> Option<AppliedMove> {
        let backup = self.history.pop()?;

        let hero_at = self.board.hero();
        self.board.set_hero(backup.hero_from);
        events.push(GameEvent::HeroMoved {
            from: hero_at,
            to: backup.hero_from,
        });

        let mut push = None;
        if let Some((id, from)) = backup.skull {
            if let Some(at) = self.board.skull_pos(id) {
                self.board.set_skull_pos(id, from);
                self.pushes = self.pushes.saturating_sub(1);
                events.push(GameEvent::PushesChanged {
                    pushes: self.pushes,
                });
                push = Some(SkullPush {
                    id,
                    path: Path::direct(at, from),
                });
            }
        }

        self.reverts += 1;
        events.push(GameEvent::RevertsChanged {
            reverts: self.reverts,
        });

        Some(AppliedMove {
            hero: Path::direct(hero_at, backup.hero_from),
            push,
        })
    }

    /// Back to the level's starting placement. Clears the history and
    /// both counters; a fresh attempt scores from scratch.
    pub fn reset(&mut self) {
        self.board = Board::from_descriptor(&self.level);
        self.history.clear();
        self.pushes = 0;
        self.reverts = 0;
    }

    /// Completion snapshot: a level with no skulls is trivially done.
    pub fn evaluate(&self) -> ScoreState {
        let collected = self.board.collected_count();
        let total = self.board.skull_count();
        ScoreState {
            collected,
            total,
            complete: collected == total,
        }
    }

    /// Star award for the solved level: one for solving, one more for
    /// meeting the push par, one more for never reverting.
    pub fn award(&self) -> u8 {
        let mut stars = 1;
        if self.pushes <= self.level.par_pushes {
            stars += 1;
        }
        if self.reverts == 0 {
            stars += 1;
        }
        stars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{CellIx, SkullId};
    use crate::sim::level::parse_level;

    fn game(text: &str) -> Game {
        Game::new(parse_level("fixture", text).unwrap())
    }

    // Hero at 9, skull at 11, pad at 13, open floor at 14.
    // Two pushes to solve, par 1.
    const MOVES: &str = "\
columns: 8
rows: 3
pushes: 1
position: 9
skulls: 11
map:
XXXXXXXX
X****D*X
XXXXXXXX
";

    // Hero at 7, skull at 8 (on ice), pad at 9; floor pocket below.
    // One push to solve, par 1.
    const ICE_RUN: &str = "\
columns: 6
rows: 4
pushes: 1
position: 7
skulls: 8
map:
XXXXXX
X*SDXX
X**XXX
XXXXXX
";

    // Hero at 8, skull at 9, portal at 10 relaying to 11, pad at 12.
    // One push to solve, par 1.
    const SKULL_PORTAL: &str = "\
columns: 7
rows: 3
pushes: 1
position: 8
skulls: 9
teleports: 10-11
map:
XXXXXXX
X**T*DX
XXXXXXX
";

    fn completed_stars(events: &[GameEvent]) -> Option<u8> {
        events.iter().find_map(|e| match e {
            GameEvent::LevelCompleted { stars } => Some(*stars),
            _ => None,
        })
    }

    // ── apply and revert ──

    #[test]
    fn apply_then_revert_restores_everything() {
        let mut g = game(MOVES);
        g.move_hero(Direction::Right).unwrap(); // step to 10
        let feedback = g.move_hero(Direction::Right).unwrap(); // push 11 -> 12
        assert!(feedback.applied.is_some());
        assert_eq!(g.board().hero(), CellIx(11));
        assert_eq!(g.board().skull_pos(SkullId(11)), Some(CellIx(12)));
        assert_eq!(g.pushes(), 1);

        let mut events = Vec::new();
        let undone = g.revert(&mut events).unwrap();
        assert_eq!(undone.hero.to, CellIx(10));
        assert_eq!(g.board().hero(), CellIx(10));
        assert_eq!(g.board().skull_at(CellIx(11)), Some(SkullId(11)));
        assert_eq!(g.pushes(), 0);
        assert_eq!(g.reverts(), 1);
        assert_eq!(g.history_len(), 1);
    }

    #[test]
    fn revert_with_no_history_is_a_noop() {
        let mut g = game(MOVES);
        let mut events = Vec::new();
        assert!(g.revert(&mut events).is_none());
        assert!(events.is_empty());
        assert_eq!(g.reverts(), 0);
        assert_eq!(g.board().hero(), CellIx(9));
    }

    #[test]
    fn blocked_move_applies_nothing() {
        let mut g = game(MOVES);
        let feedback = g.move_hero(Direction::Up).unwrap();
        assert!(feedback.applied.is_none());
        assert!(feedback.events.is_empty());
        assert_eq!(g.board().hero(), CellIx(9));
        assert_eq!(g.history_len(), 0);
    }

    #[test]
    fn stale_outcome_is_rejected() {
        let mut g = game(MOVES);
        let outcome = g.resolve(Direction::Right).unwrap().unwrap();

        let mut events = Vec::new();
        assert!(g.apply(&outcome, &mut events).is_ok());
        let err = g.apply(&outcome, &mut events).unwrap_err();
        assert_eq!(
            err,
            StaleOutcome {
                expected: 9,
                found: 10
            }
        );
    }

    // ── counters ──

    #[test]
    fn pushes_count_only_moves_that_shift_a_skull() {
        let mut g = game(MOVES);
        g.move_hero(Direction::Right).unwrap(); // plain step
        assert_eq!(g.pushes(), 0);
        g.move_hero(Direction::Right).unwrap(); // push
        assert_eq!(g.pushes(), 1);
        g.move_hero(Direction::Right).unwrap(); // push onto the pad
        assert_eq!(g.pushes(), 2);
    }

    #[test]
    fn reverts_only_grow_until_reset() {
        let mut g = game(MOVES);
        g.move_hero(Direction::Right).unwrap();
        let mut events = Vec::new();
        g.revert(&mut events).unwrap();
        assert_eq!(g.reverts(), 1);
        g.move_hero(Direction::Right).unwrap();
        assert_eq!(g.reverts(), 1);
        g.reset();
        assert_eq!(g.reverts(), 0);
    }

    #[test]
    fn reset_restores_the_start() {
        let mut g = game(MOVES);
        g.move_hero(Direction::Right).unwrap();
        g.move_hero(Direction::Right).unwrap();
        g.reset();
        assert_eq!(g.board().hero(), CellIx(9));
        assert!(g.board().skull_at(CellIx(11)).is_some());
        assert_eq!(g.pushes(), 0);
        assert_eq!(g.history_len(), 0);
        assert!(!g.evaluate().complete);
    }

    // ── events ──

    #[test]
    fn push_emits_events_in_playback_order() {
        let mut g = game(MOVES);
        g.move_hero(Direction::Right).unwrap();
        let feedback = g.move_hero(Direction::Right).unwrap();
        let events = feedback.events;
        assert!(matches!(events[0], GameEvent::HeroMoved { .. }));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::SkullPushed { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::PushesChanged { pushes: 1 })));
    }

    #[test]
    fn skull_warp_is_reported_for_the_skull() {
        let mut g = game(SKULL_PORTAL);
        let feedback = g.move_hero(Direction::Right).unwrap();
        assert!(feedback.events.iter().any(|e| matches!(
            e,
            GameEvent::PortalTraversed {
                mover: Mover::Skull,
                ..
            }
        )));
        assert_eq!(g.evaluate().collected, 1);
        assert_eq!(completed_stars(&feedback.events), Some(3));
    }

    #[test]
    fn completion_fires_once() {
        let mut g = game(ICE_RUN);
        let feedback = g.move_hero(Direction::Right).unwrap();
        assert_eq!(completed_stars(&feedback.events), Some(3));
        assert!(g.evaluate().complete);

        // Wiggling afterwards must not re-announce completion.
        let feedback = g.move_hero(Direction::Down).unwrap();
        assert!(feedback.applied.is_some());
        assert_eq!(completed_stars(&feedback.events), None);
    }

    #[test]
    fn pushing_a_skull_off_its_pad_uncompletes() {
        let mut g = game(MOVES);
        g.move_hero(Direction::Right).unwrap();
        g.move_hero(Direction::Right).unwrap();
        g.move_hero(Direction::Right).unwrap(); // skull now on the pad
        assert!(g.evaluate().complete);

        let feedback = g.move_hero(Direction::Right).unwrap(); // push it off
        assert_eq!(g.evaluate().collected, 0);
        assert!(!g.evaluate().complete);
        // Landing on the pad by pushing is not a walking touch.
        assert!(!feedback
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::DestinationTouched { .. })));
    }

    #[test]
    fn revert_restores_a_portal_push() {
        let mut g = game(SKULL_PORTAL);
        g.move_hero(Direction::Right).unwrap();
        assert_eq!(g.evaluate().collected, 1);

        let mut events = Vec::new();
        let undone = g.revert(&mut events).unwrap();
        assert_eq!(g.board().hero(), CellIx(8));
        assert!(g.board().skull_at(CellIx(9)).is_some());
        assert_eq!(g.evaluate().collected, 0);
        assert_eq!(g.pushes(), 0);
        assert_eq!(undone.push.unwrap().path.to, CellIx(9));
    }

    // ── scoring ──

    #[test]
    fn zero_skull_level_is_complete_at_load() {
        let empty = "\
columns: 5
rows: 3
position: 6
map:
XXXXX
X***X
XXXXX
";
        let g = game(empty);
        let score = g.evaluate();
        assert_eq!(score.total, 0);
        assert!(score.complete);
    }

    #[test]
    fn award_drops_to_two_after_a_revert() {
        let mut g = game(ICE_RUN);
        g.move_hero(Direction::Right).unwrap();
        let mut events = Vec::new();
        g.revert(&mut events).unwrap();
        let feedback = g.move_hero(Direction::Right).unwrap();
        assert_eq!(completed_stars(&feedback.events), Some(2));
    }

    #[test]
    fn award_drops_to_one_over_par_with_reverts() {
        let mut g = game(MOVES); // par 1
        g.move_hero(Direction::Right).unwrap();
        g.move_hero(Direction::Right).unwrap(); // push 1
        let mut events = Vec::new();
        g.revert(&mut events).unwrap(); // pushes back to 0, reverts 1
        g.move_hero(Direction::Right).unwrap(); // push 1
        let feedback = g.move_hero(Direction::Right).unwrap(); // push 2, solved
        assert_eq!(g.pushes(), 2);
        assert_eq!(completed_stars(&feedback.events), Some(1));
    }

    // ── invariants ──

    #[test]
    fn hero_never_rests_on_a_wall_or_an_unmoved_skull() {
        for text in [MOVES, ICE_RUN, SKULL_PORTAL] {
            for dir in [
                Direction::Up,
                Direction::Down,
                Direction::Left,
                Direction::Right,
            ] {
                let mut g = game(text);
                g.move_hero(dir).unwrap();
                let hero = g.board().hero();
                assert!(!g.board().tile_at(hero).is_solid());
                assert_eq!(g.board().skull_at(hero), None);
            }
        }
    }
}
