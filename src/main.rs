/// Entry point and play loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use config::GameConfig;
use sim::event::GameEvent;
use sim::level::{embedded_levels, load_from_directory, LevelDescriptor};
use sim::session::Game;
use ui::input::{self, Action};
use ui::renderer::Renderer;

fn main() {
    let config = GameConfig::load();

    // levels/ dir takes priority when it holds any parseable files
    let mut levels = load_from_directory(&config.levels_dir);
    if levels.is_empty() {
        levels = embedded_levels();
    }
    if levels.is_empty() {
        eprintln!("No levels to play.");
        return;
    }

    let mut renderer = Renderer::new(config.display.color);

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = play_loop(&levels, &mut renderer);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    match result {
        Ok(cleared) => {
            println!();
            println!("Thanks for playing Skulldozer!");
            if cleared > 0 {
                println!("Crypts cleared this run: {cleared}");
            }
        }
        Err(e) => eprintln!("Game error: {e}"),
    }
}

/// Blocking turn loop: draw, wait for one action, mutate, repeat.
/// Returns how many crypts were cleared and left via `n`.
fn play_loop(
    levels: &[LevelDescriptor],
    renderer: &mut Renderer,
) -> Result<u32, Box<dyn std::error::Error>> {
    let mut current = 0usize;
    let mut cleared = 0u32;
    let mut game = Game::new(levels[current].clone());
    let mut status = String::new();

    loop {
        renderer.render(&game, current + 1, levels.len(), &status)?;

        match input::wait_for_action()? {
            Action::Move(dir) => {
                if game.evaluate().complete {
                    // The banner owns the keys now; no wandering off the pads.
                    status = String::from("Cleared. Press n for the next crypt.");
                } else {
                    match game.move_hero(dir) {
                        Ok(feedback) => {
                            status = if feedback.applied.is_some() {
                                describe(&feedback.events)
                            } else {
                                String::new()
                            };
                        }
                        // Broken portal wiring surfaces here; the crypt
                        // cannot be played further.
                        Err(e) => status = e.to_string(),
                    }
                }
            }
            Action::Revert => {
                let mut events = Vec::new();
                status = match game.revert(&mut events) {
                    Some(_) => String::from("Move reverted."),
                    None => String::from("Nothing to revert."),
                };
            }
            Action::Reset => {
                game.reset();
                status = String::from("Back to the start.");
            }
            Action::NextLevel => {
                if game.evaluate().complete {
                    cleared += 1;
                    current = (current + 1) % levels.len();
                    game = Game::new(levels[current].clone());
                    status = if current == 0 {
                        String::from("Back around to the first crypt.")
                    } else {
                        String::new()
                    };
                } else {
                    status = String::from("Clear this crypt first.");
                }
            }
            Action::PrevLevel => {
                if current > 0 {
                    current -= 1;
                    game = Game::new(levels[current].clone());
                    status = String::new();
                } else {
                    status = String::from("This is the first crypt.");
                }
            }
            Action::Redraw => {}
            Action::Quit => break,
        }
    }

    Ok(cleared)
}

/// One-line read on what the move did, for the status row.
/// Completion is announced by the banner, not here.
fn describe(events: &[GameEvent]) -> String {
    let mut pushed = false;
    let mut warped = false;
    let mut touched_pad = false;
    for event in events {
        match event {
            GameEvent::SkullPushed { .. } => pushed = true,
            GameEvent::PortalTraversed { .. } => warped = true,
            GameEvent::DestinationTouched { .. } => touched_pad = true,
            _ => {}
        }
    }
    match (pushed, warped, touched_pad) {
        (true, true, _) => String::from("Shoved through the portal."),
        (true, false, _) => String::from("Shoved."),
        (false, true, _) => String::from("Warped."),
        (false, false, true) => String::from("The pad hums underfoot."),
        _ => String::new(),
    }
}
