/// Presentation layer: full-frame terminal renderer.
///
/// The game is turn-based, so a frame is drawn once per accepted key
/// press rather than on a timer tick: clear, compose the whole screen,
/// flush. All commands are batched with `queue!` into one buffered
/// writer and flushed at the end, so each frame reaches the terminal
/// in a single write. With at most one repaint per key press there is
/// nothing to gain from diffing against a back buffer.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::entity::CellIx;
use crate::domain::tile::Tile;
use crate::sim::board::Board;
use crate::sim::session::Game;

// ── Layout ──

/// Each board cell is drawn this many terminal columns wide.
const CELL_W: u16 = 2;

/// Left margin for the board, in terminal columns.
const MAP_COL: u16 = 1;

const HUD_ROW: u16 = 0;
const MAP_ROW: u16 = 2;

const HELP_LINE: &str = " arrows/wasd: push   u: revert   r: reset   n/p: level   q: quit";

// ── Palette ──

const HERO_FG: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const SKULL_FG: Color = Color::Rgb { r: 230, g: 230, b: 220 };
const BLOCK_FG: Color = Color::Rgb { r: 130, g: 110, b: 90 };
const FLOOR_FG: Color = Color::Rgb { r: 90, g: 85, b: 80 };
const ICE_FG: Color = Color::Rgb { r: 110, g: 200, b: 255 };
const PAD_FG: Color = Color::Rgb { r: 255, g: 215, b: 60 };
const PORTAL_FG: Color = Color::Rgb { r: 200, g: 110, b: 230 };
const STATUS_FG: Color = Color::Rgb { r: 200, g: 180, b: 50 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Renderer {
            writer: BufWriter::new(io::stdout()),
            color,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            Clear(ClearType::All)
        )
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Draw one complete frame for the current game state.
    /// `level_ix` is 1-based, for the HUD only.
    pub fn render(
        &mut self,
        game: &Game,
        level_ix: usize,
        level_count: usize,
        status: &str,
    ) -> io::Result<()> {
        queue!(self.writer, Clear(ClearType::All))?;

        self.hud(game, level_ix, level_count)?;
        self.board(game)?;

        let below = MAP_ROW + game.board().rows() as u16 + 1;
        if !status.is_empty() {
            self.put(0, below, &format!(" ◈ {status}"), STATUS_FG)?;
        }
        self.put(0, below + 2, HELP_LINE, Color::DarkGrey)?;

        if game.evaluate().complete {
            self.banner(game, below + 4)?;
        }

        self.writer.flush()
    }

    // ── HUD row ──

    fn hud(&mut self, game: &Game, level_ix: usize, level_count: usize) -> io::Result<()> {
        let score = game.evaluate();
        let hud = format!(
            " {}  [{}/{}]   ⚑ {}/{}   pushes {} (par {})   reverts {}",
            game.level().name,
            level_ix,
            level_count,
            score.collected,
            score.total,
            game.pushes(),
            game.level().par_pushes,
            game.reverts(),
        );
        self.put(0, HUD_ROW, &hud, Color::White)
    }

    // ── Board ──

    fn board(&mut self, game: &Game) -> io::Result<()> {
        let board = game.board();
        for row in 0..board.rows() {
            queue!(self.writer, MoveTo(MAP_COL, MAP_ROW + row as u16))?;
            for col in 0..board.columns() {
                let cell = CellIx(row * board.columns() + col);
                let (glyph, fg) = glyph_for(board, cell);
                self.set_fg(fg)?;
                // CELL_W columns per cell keeps the board roughly square
                queue!(self.writer, Print(glyph))?;
                for _ in 1..CELL_W {
                    queue!(self.writer, Print(' '))?;
                }
            }
        }
        Ok(())
    }

    // ── Completion banner ──

    fn banner(&mut self, game: &Game, row: u16) -> io::Result<()> {
        let awarded = game.award();
        let stars: String = (1u8..=3)
            .map(|i| if i <= awarded { '★' } else { '☆' })
            .collect();
        self.put(1, row, "╔══════════════════════════════╗", PAD_FG)?;
        self.put(1, row + 1, &format!("║   CRYPT CLEARED   {stars}        ║"), PAD_FG)?;
        self.put(1, row + 2, "║   n: next crypt   r: retry   ║", HERO_FG)?;
        self.put(1, row + 3, "╚══════════════════════════════╝", PAD_FG)?;
        Ok(())
    }

    // ── Low-level helpers ──

    fn put(&mut self, col: u16, row: u16, text: &str, fg: Color) -> io::Result<()> {
        self.set_fg(fg)?;
        queue!(self.writer, MoveTo(col, row), Print(text))
    }

    /// With color disabled the terminal's own scheme is left untouched.
    fn set_fg(&mut self, fg: Color) -> io::Result<()> {
        if self.color {
            queue!(self.writer, SetForegroundColor(fg))?;
        }
        Ok(())
    }
}

/// Glyph and color for one cell: hero over skull over tile.
fn glyph_for(board: &Board, cell: CellIx) -> (char, Color) {
    if board.hero() == cell {
        return ('@', HERO_FG);
    }
    if board.skull_at(cell).is_some() {
        // A skull resting on its pad reads differently at a glance.
        return if board.tile_at(cell).is_destination() {
            ('0', PAD_FG)
        } else {
            ('o', SKULL_FG)
        };
    }
    match board.tile_at(cell) {
        Tile::Floor => ('·', FLOOR_FG),
        Tile::Block => ('#', BLOCK_FG),
        Tile::Ice => ('~', ICE_FG),
        Tile::Destination => ('x', PAD_FG),
        Tile::Portal => ('O', PORTAL_FG),
        Tile::Empty => (' ', Color::Reset),
    }
}
