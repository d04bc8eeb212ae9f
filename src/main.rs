//! Terminal Brain Box runner (default binary).
//!
//! Uses crossterm for keyboard and mouse input and the framebuffer renderer
//! from `brainbox-term`. Blocks are dragged with the left button; clicks on
//! blocks go through the input crate's click classifier.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};

use brainbox::core::{Game, GameEvent, GameSnapshot};
use brainbox::input::{handle_key_event, map_mouse_event, should_quit, InputHandler};
use brainbox::leaderboard::timestamp::now_millis;
use brainbox::play::{advance_input, handle_pointer};
use brainbox::submit::{ScoreSubmitter, SubmitOutcome};
use brainbox::term::{format_elapsed, FrameBuffer, GameView, TerminalRenderer, Viewport};
use brainbox::types::{GameAction, TICK_MS};

#[derive(Parser, Debug)]
#[command(name = "brainbox", version, about = "Diamond-grid block puzzle")]
struct Args {
    /// Seed for the extra shapes; defaults to the clock
    #[arg(long, env = "BRAINBOX_SEED")]
    seed: Option<u32>,
    /// Leaderboard `host:port`; completion times are only submitted when set
    #[arg(long, env = "BRAINBOX_API_ADDR")]
    api_addr: Option<String>,
    /// Name submitted with completion times
    #[arg(long, env = "BRAINBOX_PLAYER", default_value = "player")]
    player: String,
    /// Report completion on the status line instead of the blinking banner
    #[arg(long, env = "BRAINBOX_NO_BANNER")]
    no_banner: bool,
    /// Write logs to this file; logging is off otherwise
    #[arg(long, env = "BRAINBOX_LOG_FILE")]
    log_file: Option<PathBuf>,
}

/// The game owns the terminal, so logs only go to a file.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let seed = args.seed.unwrap_or(now_millis() as u32);
    let submitter = args
        .api_addr
        .map(|addr| ScoreSubmitter::new(addr, args.player))
        .transpose()?;
    log::info!("starting game with seed {seed}");

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, seed, args.no_banner, submitter.as_ref());

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn run(
    term: &mut TerminalRenderer,
    seed: u32,
    no_banner: bool,
    submitter: Option<&ScoreSubmitter>,
) -> Result<()> {
    let mut game = Game::new(seed);
    game.set_external_banner(no_banner);
    game.start();

    let view = GameView::default();
    let mut input = InputHandler::new();
    let mut snap = GameSnapshot::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut status: Option<String> = None;

    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(u64::from(TICK_MS));

    loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);
        game.snapshot_into(&mut snap);
        view.render_into_with_status(&snap, status.as_deref(), viewport, &mut fb);
        term.draw_swap(&mut fb)?;
        let layout = view.layout(snap.canvas, viewport);

        // Input with timeout until next tick.
        let timeout = tick_duration.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if should_quit(key) {
                        return Ok(());
                    }
                    if let Some(action) = handle_key_event(key) {
                        if action == GameAction::Reset {
                            input.reset();
                            status = None;
                        }
                        game.apply_action(action);
                    }
                }
                Event::Mouse(mouse) => {
                    if let Some(pointer) = map_mouse_event(mouse) {
                        handle_pointer(&mut game, &mut input, &view, &layout, pointer);
                    }
                }
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();

            advance_input(&mut game, &mut input, TICK_MS);
            game.tick(TICK_MS);

            for event in game.take_events() {
                if let GameEvent::Completed { elapsed_ms } = event {
                    status = Some(match submitter {
                        Some(submitter) => {
                            submitter.submit(elapsed_ms);
                            format!("Solved in {}, submitting...", format_elapsed(elapsed_ms))
                        }
                        None => format!("Solved in {}", format_elapsed(elapsed_ms)),
                    });
                }
            }
            if game.take_external_completions() > 0 {
                let solved = status.take().unwrap_or_default();
                status = Some(format!("*** PUZZLE SOLVED *** {solved} (r: play again)"));
            }
        }

        if let Some(outcome) = submitter.and_then(ScoreSubmitter::poll) {
            status = Some(match outcome {
                SubmitOutcome::Ranked { rank, time_ms } => {
                    format!("{} - rank #{rank}", format_elapsed(time_ms))
                }
                SubmitOutcome::Failed(_) => "Score not submitted".to_string(),
            });
        }
    }
}
