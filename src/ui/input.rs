/// Keyboard mapping.
///
/// The game is turn-based: nothing happens between key presses, so the
/// reader blocks on the next terminal event instead of polling. Each
/// recognized press maps to exactly one `Action`; everything else is
/// swallowed here.

use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::Direction;

/// One player intent, decoded from a key press.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Move(Direction),
    Revert,
    Reset,
    NextLevel,
    PrevLevel,
    Quit,
    /// Terminal was resized; repaint without touching the game.
    Redraw,
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_REVERT: &[KeyCode] = &[KeyCode::Char('u'), KeyCode::Char('U'), KeyCode::Backspace];
const KEYS_RESET: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_NEXT: &[KeyCode] = &[KeyCode::Char('n'), KeyCode::Char('N')];
const KEYS_PREV: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc];

/// Block until the player does something meaningful.
pub fn wait_for_action() -> io::Result<Action> {
    loop {
        match event::read()? {
            Event::Key(key) => {
                // Terminals with keyboard enhancement also report
                // releases; a press is enough for a turn.
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                if is_ctrl_c(&key) {
                    return Ok(Action::Quit);
                }
                if let Some(action) = map_key(key.code) {
                    return Ok(action);
                }
            }
            Event::Resize(..) => return Ok(Action::Redraw),
            _ => {}
        }
    }
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && (key.code == KeyCode::Char('c') || key.code == KeyCode::Char('C'))
}

fn map_key(code: KeyCode) -> Option<Action> {
    if KEYS_LEFT.contains(&code) {
        Some(Action::Move(Direction::Left))
    } else if KEYS_RIGHT.contains(&code) {
        Some(Action::Move(Direction::Right))
    } else if KEYS_UP.contains(&code) {
        Some(Action::Move(Direction::Up))
    } else if KEYS_DOWN.contains(&code) {
        Some(Action::Move(Direction::Down))
    } else if KEYS_REVERT.contains(&code) {
        Some(Action::Revert)
    } else if KEYS_RESET.contains(&code) {
        Some(Action::Reset)
    } else if KEYS_NEXT.contains(&code) {
        Some(Action::NextLevel)
    } else if KEYS_PREV.contains(&code) {
        Some(Action::PrevLevel)
    } else if KEYS_QUIT.contains(&code) {
        Some(Action::Quit)
    } else {
        None
    }
}
