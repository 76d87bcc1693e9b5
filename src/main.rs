//! Terminal Rock Em Blocks runner (default binary).
//!
//! Uses crossterm for keyboard and mouse input and the framebuffer renderer
//! from `rock_em_blocks::term`. Logs go to a file only when `--log-file` is
//! given, since the terminal itself is the game screen.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind, MouseButton, MouseEventKind};
use tracing::{info, warn, Level};

use rock_em_blocks::core::{GameSession, GameSnapshot, Outcome};
use rock_em_blocks::input::{handle_key_event, should_quit, InputEvent, InputHandler};
use rock_em_blocks::term::{BoardOverlay, CascadeReplay, FrameBuffer, GameView, TerminalRenderer, Viewport};
use rock_em_blocks::types::{
    BoardConfig, BoardError, GameAction, CASCADE_FRAME_MS, DEFAULT_GRID_SIZE, DEFAULT_MAX_CASCADE_ROUNDS,
    DEFAULT_PALETTE_SIZE, DEFAULT_SHUFFLE_COST, TICK_MS,
};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Board edge length
    #[clap(short, long, default_value_t = DEFAULT_GRID_SIZE)]
    size: usize,

    /// Number of block colors
    #[clap(short, long, default_value_t = DEFAULT_PALETTE_SIZE)]
    colors: usize,

    /// Score spent per shuffle
    #[clap(long, default_value_t = DEFAULT_SHUFFLE_COST)]
    shuffle_cost: u32,

    /// Cascade rounds allowed before the board is declared jammed
    #[clap(long, default_value_t = DEFAULT_MAX_CASCADE_ROUNDS)]
    max_cascade_rounds: u32,

    /// RNG seed (defaults to the clock)
    #[clap(long)]
    seed: Option<u64>,

    /// Milliseconds each cascade replay frame stays on screen
    #[clap(long, default_value_t = CASCADE_FRAME_MS)]
    cascade_frame_ms: u32,

    /// Skip cascade replay and show settled boards only
    #[clap(long)]
    no_replay: bool,

    /// Do not capture the mouse
    #[clap(long)]
    no_mouse: bool,

    /// Write logs to this file
    #[clap(long)]
    log_file: Option<PathBuf>,

    #[clap(long, default_value_t = Level::INFO)]
    log_level: Level,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let config = BoardConfig::default()
        .with_size(args.size)
        .with_color_count(args.colors)
        .with_shuffle_cost(args.shuffle_cost)
        .with_max_cascade_rounds(args.max_cascade_rounds);
    let seed = args.seed.unwrap_or_else(clock_seed);
    info!(seed, size = config.size, colors = config.palette.len(), "starting");

    // Config errors are reported before the terminal is taken over.
    let mut session = GameSession::with_seed(config, seed).context("cannot start a game with these settings")?;
    session.set_record_cascades(!args.no_replay);

    let mut term = TerminalRenderer::new().with_mouse(!args.no_mouse);
    term.enter()?;

    let result = run(&mut term, &mut session, &args);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn init_logging(args: &Args) -> Result<()> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("cannot create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(args.log_level)
        .init();
    Ok(())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}

fn run(term: &mut TerminalRenderer, session: &mut GameSession, args: &Args) -> Result<()> {
    let base_view = GameView::default();
    let size = session.config().size;
    let mut input = InputHandler::new(size);
    let mut replay = CascadeReplay::new(args.cascade_frame_ms);
    let mut snap = GameSnapshot::default();
    let mut fb = FrameBuffer::new(0, 0);

    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(TICK_MS as u64);

    loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);
        let view = base_view.fitted(size, viewport);
        session.snapshot_into(&mut snap);

        match replay.current() {
            Some((step, phase)) => view.render_cascade_into(&snap, step, phase, viewport, &mut fb),
            None => {
                let overlay = BoardOverlay {
                    cursor: Some(input.cursor()),
                    selected: input.selected(),
                    hint: input.hint(),
                    flash: None,
                };
                view.render_into(&snap, &overlay, viewport, &mut fb);
            }
        }
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration.saturating_sub(last_tick.elapsed());

        if event::poll(timeout)? {
            let action = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if should_quit(key) {
                        return Ok(());
                    }
                    match handle_key_event(key) {
                        // Input is ignored while a cascade is on screen.
                        _ if replay.is_active() => None,
                        Some(InputEvent::Hint) => {
                            input.set_hint(session.hint());
                            None
                        }
                        Some(ev) => input.handle_event(ev),
                        None => None,
                    }
                }
                Event::Mouse(mouse)
                    if mouse.kind == MouseEventKind::Down(MouseButton::Left) && !replay.is_active() =>
                {
                    view.layout(size, viewport)
                        .cell_at(mouse.column, mouse.row)
                        .and_then(|pos| input.click(pos))
                }
                Event::Resize(..) => {
                    term.invalidate();
                    None
                }
                _ => None,
            };

            if let Some(action) = action {
                apply(session, &mut replay, action)?;
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            replay.advance(TICK_MS);
        }
    }
}

fn apply(session: &mut GameSession, replay: &mut CascadeReplay, action: GameAction) -> Result<()> {
    match session.apply_action(action) {
        Ok(Outcome::Accepted { cleared, rounds }) => {
            info!(action = action.as_str(), cleared, rounds, score = session.score(), "accepted");
            if matches!(action, GameAction::Restart) {
                replay.stop();
            } else {
                replay.start(session.last_cascade());
            }
        }
        Ok(Outcome::Rejected(rejection)) => {
            info!(action = action.as_str(), code = rejection.code(), reason = rejection.message(), "rejected");
        }
        // The session stays Resolving; the screen asks for a restart.
        Err(err @ BoardError::ResolutionOverrun { .. }) => {
            warn!(action = action.as_str(), %err, "board jammed");
            replay.stop();
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}
