//! # Delve Main Entry Point
//!
//! Loads or starts a game, then runs a line-based terminal loop: each line of
//! keys is applied in order, the game is saved, and a fresh frame is drawn.

use clap::Parser;
use delve::{
    AsciiDisplay, DelveResult, FileStore, GameState, InputHandler, PlayerInput, SaveStore,
    TurnOutcome, DEFAULT_SAVE_FILE, HELP_TEXT,
};
use log::{debug, error, info};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Command line arguments for Delve.
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "Escape a five-level dungeon in your terminal")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Save file location
    #[arg(long, default_value = DEFAULT_SAVE_FILE)]
    save_file: PathBuf,

    /// Ignore any existing save and start over
    #[arg(long)]
    new_game: bool,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> DelveResult<()> {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    info!("Starting Delve v{}", delve::VERSION);

    let mut store = FileStore::new(&args.save_file);
    let mut game_state = if args.new_game {
        store.clear()?;
        GameState::new(args.seed)?
    } else {
        GameState::load_or_new(&store, args.seed)?
    };
    game_state.autosave(&mut store);

    run_game_loop(&mut game_state, &mut store)
}

/// Installs env_logger, honouring `RUST_LOG` over the given default.
fn initialize_logging(log_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_target(false)
        .init();
}

/// Reads key lines from stdin until quit or end of input.
fn run_game_loop(game_state: &mut GameState, store: &mut dyn SaveStore) -> DelveResult<()> {
    let input_handler = InputHandler::new();
    let mut display = AsciiDisplay::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    draw(&mut stdout, &display, game_state)?;

    for line in stdin.lock().lines() {
        let line = line?;

        for input in input_handler.map_line(&line) {
            match input {
                PlayerInput::Quit => {
                    info!("Player quit the game");
                    return Ok(());
                }
                PlayerInput::Help => writeln!(stdout, "{}", HELP_TEXT)?,
                PlayerInput::ToggleLook => display.toggle_look(game_state),
                PlayerInput::Move(direction) if display.look_cursor.is_some() => {
                    display.move_cursor(game_state, direction.to_delta());
                }
                PlayerInput::Restart => match game_state.restart_and_save(store) {
                    Ok(TurnOutcome::Restarted) => display.look_cursor = None,
                    Ok(outcome) => debug!("Restart ignored: {:?}", outcome),
                    Err(e) => error!("Restart failed: {}", e),
                },
                PlayerInput::UsePotion if display.look_cursor.is_some() => {}
                _ => {
                    if let Some(action) = input_handler.input_to_action(input) {
                        match game_state.apply(action) {
                            Ok(_) => game_state.autosave(store),
                            Err(e) => error!("Action {:?} failed: {}", action, e),
                        }
                    }
                }
            }
        }

        draw(&mut stdout, &display, game_state)?;
    }

    info!("Input closed");
    Ok(())
}

fn draw(out: &mut impl Write, display: &AsciiDisplay, game_state: &GameState) -> DelveResult<()> {
    writeln!(out, "{}", display.render(game_state))?;
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}
