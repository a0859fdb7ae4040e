use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use minesweeper::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Parser, Debug)]
#[command(name = "minesweeper", about = "Play minesweeper, or watch the bot play it")]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Play from the terminal
    Play(PlayArgs),
    /// Let the bot play
    Bot(BotArgs),
}

#[derive(Args, Debug)]
struct BoardArgs {
    /// Board width
    #[arg(long, default_value_t = GameConfig::default().width)]
    width: usize,

    /// Board height
    #[arg(long, default_value_t = GameConfig::default().height)]
    height: usize,

    /// Number of mines
    #[arg(long, default_value_t = GameConfig::default().mines)]
    mines: usize,

    /// Random seed for reproducible games
    #[arg(long)]
    seed: Option<u64>,
}

impl BoardArgs {
    fn board(&self) -> Result<Board> {
        let config = GameConfig::new(self.width, self.height, self.mines);
        Board::from_config(config).context("invalid board configuration")
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

#[derive(Args, Debug)]
struct PlayArgs {
    #[command(flatten)]
    board: BoardArgs,
}

#[derive(Args, Debug)]
struct BotArgs {
    #[command(flatten)]
    board: BoardArgs,

    /// Pause between moves, in milliseconds
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,

    /// Wait for Enter before every move
    #[arg(long)]
    step: bool,

    /// Give up after this many moves
    #[arg(long, default_value_t = 10_000)]
    max_moves: usize,
}

fn main() -> Result<()> {
    match Cli::parse().mode {
        Mode::Play(args) => play(args),
        Mode::Bot(args) => run_bot(args),
    }
}

fn play(args: PlayArgs) -> Result<()> {
    let mut board = args.board.board()?;
    let mut rng = args.board.rng();
    let mut lines = io::stdin().lock().lines();

    println!("{}", board.render(true));
    while !board.is_game_over() {
        print!("Enter 'r x y' to reveal or 'f x y' to flag: ");
        io::stdout().flush().context("failed to flush stdout")?;

        let Some(line) = lines.next() else {
            println!();
            return Ok(());
        };
        let line = line.context("failed to read from stdin")?;

        match parse_command(&line) {
            Some((at, action)) => {
                if let Err(e) = board.act_with_rng(at, action, &mut rng) {
                    println!("Invalid input: {e}");
                }
            }
            None => println!("Invalid input"),
        }
        println!("{}", board.render(true));
    }

    if board.did_win() {
        println!("You win!");
    } else {
        println!("Game over, you hit a mine.");
    }
    Ok(())
}

/// Parses `r x y` or `f x y` with 1-based coordinates.
fn parse_command(line: &str) -> Option<(Point, Action)> {
    let mut parts = line.split_whitespace();
    let action = match parts.next()? {
        "r" | "R" => Action::Reveal,
        "f" | "F" => Action::Flag,
        _ => return None,
    };
    let x: usize = parts.next()?.parse().ok()?;
    let y: usize = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((Point::new(x.checked_sub(1)?, y.checked_sub(1)?), action))
}

fn run_bot(args: BotArgs) -> Result<()> {
    let mut board = args.board.board()?;
    let mut rng = args.board.rng();
    let mut bot = Bot::new();
    let mut lines = io::stdin().lock().lines();

    println!("--- Autonomous Minesweeper Bot ---");
    println!("{}\n", board.render(false));

    let mut move_count = 0;
    let mut last_reason = None;
    while !board.is_game_over() && move_count < args.max_moves {
        if args.step {
            match lines.next() {
                Some(line) => {
                    line.context("failed to read from stdin")?;
                }
                None => break,
            }
        }

        move_count += 1;
        let next = bot.next_move(&board.snapshot(), &mut rng);
        if last_reason != Some(next.reason) {
            println!("{}", narrate(next.reason));
            last_reason = Some(next.reason);
        }

        let verb = match next.action {
            Action::Reveal => "reveals",
            Action::Flag => "flags",
        };
        println!(
            "--- Move #{} --- Bot {} ({}, {})",
            move_count,
            verb,
            next.at.x + 1,
            next.at.y + 1
        );

        board.act_with_rng(next.at, next.action, &mut rng)?;
        println!("{}\n", board.render(false));

        if args.delay_ms > 0 {
            thread::sleep(Duration::from_millis(args.delay_ms));
        }
    }

    match board.state() {
        GameState::Won => println!("Result: The bot won!"),
        GameState::Lost => println!("Result: The bot hit a mine and lost."),
        GameState::Playing => {
            eprintln!("Result: The bot stopped after {move_count} moves without finishing.")
        }
    }
    Ok(())
}

fn narrate(reason: Reason) -> &'static str {
    match reason {
        Reason::Deduction => "Logic found certain moves.",
        Reason::Weighting => "No certain move found. Acting on the weight map...",
        Reason::Guess => "No safe move found. Making a random guess...",
    }
}
