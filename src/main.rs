//! Headless runner for the rules engine.
//!
//! `simulate` drives a game through the 20ms frame loop with a scripted
//! player and prints a JSON summary; `inspect` decodes a save file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use tetris_rules::core::frame::{self, FrameHost, FramePacer, FRAME};
use tetris_rules::core::persist::{self, SaveError};
use tetris_rules::core::{GameSnapshot, GameState, SimpleRng};
use tetris_rules::types::{GameAction, GameEvent, Phase, DEFAULT_SAVE_FILE};

#[derive(Debug, Parser)]
#[command(name = "tetris-rules")]
#[command(about = "Falling-block puzzle rules engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a game headless and print a summary
    Simulate {
        #[arg(long, default_value_t = 1)]
        seed: u32,
        /// Frames to run (20ms each)
        #[arg(long, default_value_t = 3000)]
        frames: u64,
        /// Let a random player press keys; otherwise pieces just fall
        #[arg(long, default_value_t = false)]
        autoplay: bool,
        /// Pace frames against the wall clock instead of running flat out
        #[arg(long, default_value_t = false)]
        realtime: bool,
        /// Resume from a save file before the first frame
        #[arg(long)]
        load: Option<PathBuf>,
        /// Save here when the run ends
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Decode a save file and print it as JSON
    Inspect {
        #[arg(default_value = DEFAULT_SAVE_FILE)]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            seed,
            frames,
            autoplay,
            realtime,
            load,
            save,
        } => simulate(SimConfig {
            seed,
            frames,
            autoplay,
            realtime,
            load,
            save,
        }),
        Commands::Inspect { file } => inspect(&file),
    }
}

#[derive(Debug)]
struct SimConfig {
    seed: u32,
    frames: u64,
    autoplay: bool,
    realtime: bool,
    load: Option<PathBuf>,
    save: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize)]
struct Tally {
    frames: u64,
    pieces_placed: u64,
    lines_cleared: u64,
    games_over: u64,
    save_errors: u64,
}

#[derive(Debug, Serialize)]
struct Summary {
    seed: u32,
    tally: Tally,
    state: GameSnapshot,
}

/// Player that presses random keys, or only restarts when `autoplay` is off
struct ScriptedHost {
    rng: SimpleRng,
    autoplay: bool,
    frames_left: u64,
    save_path: PathBuf,
    tally: Tally,
    game_over: bool,
    started: bool,
}

impl ScriptedHost {
    fn new(config: &SimConfig) -> Self {
        Self {
            rng: SimpleRng::new(config.seed ^ 0x9E37_79B9),
            autoplay: config.autoplay,
            frames_left: config.frames,
            save_path: config
                .save
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE_FILE)),
            tally: Tally::default(),
            game_over: false,
            started: false,
        }
    }

    fn random_action(&mut self) -> Option<GameAction> {
        // Roughly one key press every few frames.
        match self.rng.next_range(24) {
            0 => Some(GameAction::MoveLeft),
            1 => Some(GameAction::MoveRight),
            2 => Some(GameAction::RotateCw),
            3 => Some(GameAction::RotateCcw),
            4 => Some(GameAction::SoftDropStart),
            5 | 6 => Some(GameAction::SoftDropEnd),
            _ => None,
        }
    }
}

impl FrameHost for ScriptedHost {
    fn poll_actions(&mut self, actions: &mut Vec<GameAction>) {
        if !self.started || self.game_over {
            self.started = true;
            self.game_over = false;
            actions.push(GameAction::Reset);
            return;
        }

        if self.autoplay {
            actions.extend(self.random_action());
        }
    }

    fn render(&mut self, game: &GameState, events: &[GameEvent]) {
        self.tally.frames += 1;
        self.frames_left = self.frames_left.saturating_sub(1);

        for event in events {
            match *event {
                GameEvent::PiecePlaced => self.tally.pieces_placed += 1,
                GameEvent::LinesCleared(n) => self.tally.lines_cleared += u64::from(n),
                GameEvent::GameOver => {
                    self.tally.games_over += 1;
                    eprintln!(
                        "[tetris] game over at frame {} (score {}, level {})",
                        self.tally.frames,
                        game.score(),
                        game.level()
                    );
                }
                _ => {}
            }
        }

        self.game_over = game.is_game_over();
    }

    fn keep_running(&mut self) -> bool {
        self.frames_left > 0
    }

    fn save_path(&self) -> &Path {
        &self.save_path
    }

    fn report_error(&mut self, action: GameAction, err: &SaveError) {
        self.tally.save_errors += 1;
        eprintln!("[tetris] {} failed: {err}", action.as_str());
    }
}

fn simulate(config: SimConfig) -> Result<()> {
    let mut game = GameState::new(config.seed);
    let mut host = ScriptedHost::new(&config);

    if let Some(path) = &config.load {
        game.load(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        eprintln!("[tetris] resumed from {}", path.display());
        // A loaded game in progress must not be restarted on the first frame.
        host.started = !game.is_new_game();
        host.game_over = game.is_game_over();
    }

    eprintln!(
        "[tetris] simulating {} frames (seed {}, autoplay {}, realtime {})",
        config.frames, config.seed, config.autoplay, config.realtime
    );

    if config.realtime {
        let mut pacer = FramePacer::new(FRAME);
        frame::run(&mut game, &mut host, &mut pacer);
    } else {
        let mut actions = Vec::new();
        while host.keep_running() {
            frame::run_frame(&mut game, &mut host, &mut actions, FRAME);
        }
    }

    if let Some(path) = &config.save {
        game.save(path)
            .with_context(|| format!("failed to save {}", path.display()))?;
        eprintln!("[tetris] saved to {}", path.display());
    }

    let summary = Summary {
        seed: config.seed,
        tally: host.tally,
        state: game.snapshot(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    print_board(&summary.state);
    Ok(())
}

fn inspect(path: &Path) -> Result<()> {
    let record = persist::read_record(path)
        .with_context(|| format!("failed to read save file {}", path.display()))?;
    // Cell values are only checked when a board is built from them.
    record
        .board()
        .with_context(|| format!("{} holds an invalid board", path.display()))?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

/// Draw the visible rows to stderr
fn print_board(snapshot: &GameSnapshot) {
    const GLYPHS: &[u8; 8] = b".IJLOSTZ";
    let hidden = usize::from(tetris_rules::types::HIDDEN_ROWS);

    for row in snapshot.composited_board().iter().skip(hidden) {
        let line: String = row
            .iter()
            .map(|&c| char::from(GLYPHS[usize::from(c).min(7)]))
            .collect();
        eprintln!("[tetris] |{line}|");
    }

    if snapshot.phase == Phase::GameOver {
        eprintln!("[tetris] (game over)");
    }
}
