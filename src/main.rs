// chess_turns - two-player chess in the terminal.
//
// Commands:
//   play local     - both sides at this keyboard
//   play computer  - you are White, the computer picks random moves for Black
//   history        - list finished games from the match history file
//   replay <id>    - step through a finished game
//   quit           - exit
//
// In a game, type a square (e2) to select a piece and another to move it.
// `moves` lists where the selected piece can go, `ok` dismisses a check
// warning, q/r/b/n answers a promotion. `resign` or `quit` forfeits the game,
// as does leaving it any other way before it is decided.
//
// Settings are read from chess_turns.json if present. RUST_LOG controls logging.

use anyhow::{Context, Result};
use colored::Colorize;
use log::{debug, info};
use rand::seq::SliceRandom;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chess_turns::config::DEFAULT_CONFIG_FILE;
use chess_turns::{
    Color, Config, GameId, IgnoreReason, JsonFileStore, MatchContext, MatchStore, Replay, Square,
    TurnController, TurnEvent, TurnState,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GameMode {
    Local,
    Computer,
}

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::load_or_default(DEFAULT_CONFIG_FILE);
    info!("Match history at {}", config.store_path.display());

    let running = Arc::new(AtomicBool::new(true));
    let running_c = running.clone();

    ctrlc::set_handler(move || {
        println!("\n[Ctrl+C] Shutting down...");
        running_c.store(false, Ordering::SeqCst);
    })
    .context("setting Ctrl-C handler")?;

    println!("{}", "chess_turns".bright_magenta().bold());
    println!("Commands:");
    println!("  play local     - Two players at one keyboard");
    println!("  play computer  - Play White against a random-move opponent");
    println!("  history        - List finished games");
    println!("  replay <id>    - Step through a finished game");
    println!("  quit           - Exit the program");

    while running.load(Ordering::SeqCst) {
        let Some(line) = prompt("\nEnter command:")? else {
            break;
        };
        let cmd = line.trim();
        match cmd {
            "play local" | "play" => play_game(&config, GameMode::Local, &running)?,
            "play computer" => play_game(&config, GameMode::Computer, &running)?,
            "history" => show_history(&config)?,
            c if c.starts_with("replay") => {
                let id = c.trim_start_matches("replay").trim();
                match id.parse::<GameId>() {
                    Ok(id) => replay_game(&config, id, &running)?,
                    Err(_) => println!("{}", "[Error] usage: replay <game-id>".red()),
                }
            }
            "quit" => {
                println!("[Info] Exiting program...");
                running.store(false, Ordering::SeqCst);
            }
            "" => continue,
            _ => println!("{}", "[Error] unknown command".red()),
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Reads one line, or `None` at end of input.
fn prompt(message: &str) -> Result<Option<String>> {
    println!("{}", message.cyan());
    io::stdout().flush()?;
    let mut line = String::new();
    let read = io::stdin().read_line(&mut line).context("reading input")?;
    Ok((read > 0).then_some(line))
}

fn play_game(config: &Config, mode: GameMode, running: &AtomicBool) -> Result<()> {
    let mut store = match JsonFileStore::open(&config.store_path) {
        Ok(store) => store,
        Err(e) => {
            print_error(format!("opening {}: {}", config.store_path.display(), e));
            return Ok(());
        }
    };
    let context = match MatchContext::start(&mut store, config.white_player, config.black_player) {
        Ok(context) => context,
        Err(e) => {
            print_error(e);
            return Ok(());
        }
    };
    println!("[Info] Game {} started", context.game_id.to_string().yellow());

    let mut controller = TurnController::new(config).with_match(context, Box::new(store));
    println!("{}", controller.board());

    while running.load(Ordering::SeqCst) && !controller.is_over() {
        if mode == GameMode::Computer && controller.turn() == Color::Black {
            if !computer_turn(&mut controller) {
                println!("{}", "[Computer] has no moves and leaves the game.".yellow());
                break;
            }
            continue;
        }

        let message = match controller.state() {
            TurnState::AwaitingPromotionChoice { square, .. } => {
                format!("Promote on {} to (q/r/b/n):", square)
            }
            TurnState::CheckAnnounced(color) => format!("{} is in check! (ok to continue)", color),
            TurnState::Selected { .. } => format!("{}: choose destination", controller.turn()),
            _ => format!("{}: select a piece", controller.turn()),
        };
        let Some(line) = prompt(&message)? else {
            break;
        };
        let input = line.trim().to_lowercase();

        let events = match input.as_str() {
            "" => continue,
            "quit" | "resign" => {
                println!("{} resigns.", controller.turn());
                break;
            }
            "ok" => controller.acknowledge_check(),
            "moves" => {
                show_moves(&controller);
                continue;
            }
            _ if matches!(controller.state(), TurnState::AwaitingPromotionChoice { .. }) => {
                controller.choose_promotion_named(&input)
            }
            square => match square.parse::<Square>() {
                Ok(sq) => controller.select(sq),
                Err(e) => {
                    print_error(e);
                    continue;
                }
            },
        };
        report(&controller, &events);
    }

    if !controller.is_over() {
        let events = controller.resign(controller.turn());
        report(&controller, &events);
    }
    Ok(())
}

/// Plays one random move for the computer. Returns false if it has none.
fn computer_turn(controller: &mut TurnController) -> bool {
    if matches!(controller.state(), TurnState::CheckAnnounced(_)) {
        controller.acknowledge_check();
    }
    if matches!(controller.state(), TurnState::AwaitingPromotionChoice { .. }) {
        let events = controller.choose_promotion_named("queen");
        report(controller, &events);
        return true;
    }

    let mut rng = rand::thread_rng();
    let movable = controller.movable_pieces();
    let Some((piece, destinations)) = movable.choose(&mut rng) else {
        return false;
    };
    let Some(dest) = destinations.choose(&mut rng) else {
        return false;
    };
    debug!("Computer picked {:?} -> {}", piece, dest.square);

    println!("[Computer] thinking...");
    controller.select(*piece);
    let events = controller.select(dest.square);
    report(controller, &events);
    true
}

fn show_moves(controller: &TurnController) {
    let destinations = controller.legal_destinations();
    if destinations.is_empty() {
        println!("Select a piece first.");
        return;
    }
    let list: Vec<String> = destinations
        .iter()
        .map(|d| {
            if d.is_capture {
                format!("{}x", d.square).red().to_string()
            } else {
                d.square.to_string().green().to_string()
            }
        })
        .collect();
    println!("Moves: {}", list.join(" "));
}

fn report(controller: &TurnController, events: &[TurnEvent]) {
    let mut redraw = false;
    for event in events {
        match event {
            TurnEvent::Selected { destinations, .. } => {
                println!("{} possible moves", destinations.len());
            }
            TurnEvent::Deselected => println!("Selection cleared."),
            TurnEvent::Ignored(reason) => println!("{}", ignored_message(*reason).red()),
            TurnEvent::Moved { mv, .. } => {
                println!("Moved {} -> {}", mv.from, mv.to);
                redraw = true;
            }
            TurnEvent::PromotionRequired { square, color } => {
                println!("{}", format!("{} pawn promotes on {}", color, square).yellow());
            }
            TurnEvent::Promoted { square, piece_type } => {
                println!("Promoted to {} on {}", piece_type, square);
                redraw = true;
            }
            TurnEvent::CheckStateChanged { color, active: true } => {
                println!("{}", format!("Check! {} king is under attack", color).bright_red().bold());
            }
            TurnEvent::CheckStateChanged { .. } => {}
            TurnEvent::GameOver { winner } => {
                println!("{}", format!("[Game Over] {} captured the king!", winner).green().bold());
            }
        }
    }
    if redraw {
        println!("{}", controller.board());
    }
}

fn ignored_message(reason: IgnoreReason) -> &'static str {
    match reason {
        IgnoreReason::InvalidSelection => "Select one of your own pieces.",
        IgnoreReason::IllegalDestination => "That piece cannot move there.",
        IgnoreReason::AwaitingPromotion => "Choose a promotion piece first.",
        IgnoreReason::NotAwaitingPromotion => "No promotion pending.",
        IgnoreReason::NoCheckToAcknowledge => "Nothing to acknowledge.",
        IgnoreReason::GameOver => "The game is over.",
    }
}

fn print_error(e: impl std::fmt::Display) {
    println!("{}", format!("[Error] {}", e).red());
}

fn show_history(config: &Config) -> Result<()> {
    let games = match JsonFileStore::open(&config.store_path).and_then(|store| store.completed_games()) {
        Ok(games) => games,
        Err(e) => {
            print_error(e);
            return Ok(());
        }
    };
    if games.is_empty() {
        println!("No finished games yet.");
        return Ok(());
    }
    for game in games {
        println!("{}  {}", game.id.to_string().yellow(), game);
    }
    Ok(())
}

fn replay_game(config: &Config, id: GameId, running: &AtomicBool) -> Result<()> {
    let moves = match JsonFileStore::open(&config.store_path).and_then(|store| store.game_moves(id)) {
        Ok(moves) => moves,
        Err(e) => {
            print_error(e);
            return Ok(());
        }
    };
    let mut replay = match Replay::new(moves.as_slice()) {
        Ok(replay) => replay,
        Err(e) => {
            print_error(format!("game {} has a damaged record: {}", id, e));
            return Ok(());
        }
    };
    println!("Replaying {} ({} moves). n = next, p = previous, q = quit", id, replay.len());
    println!("{}", replay.board());

    while running.load(Ordering::SeqCst) {
        let Some(line) = prompt(&format!("[{}/{}]", replay.position(), replay.len()))? else {
            break;
        };
        let moved = match line.trim() {
            "n" | "" => replay.step_forward(),
            "p" => replay.step_back(),
            "q" | "quit" => break,
            _ => {
                println!("{}", "[Error] n, p or q".red());
                continue;
            }
        };
        if moved {
            println!("{}", replay.board());
        } else {
            println!("No more moves that way.");
        }
    }
    Ok(())
}
