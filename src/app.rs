//! App: terminal init, frame loop, key handling.

use crate::Args;
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::ui::{self, View};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use log::{debug, info};
use panelrise::{Board, Config, Cue, Cursor, DifficultyRamp};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

/// Without release events a held key is only visible through its auto-repeat;
/// treat fast rise as released once repeats stop for this long.
const FAST_RISE_TIMEOUT_MS: u64 = 600;
/// How long a chain notice stays in the sidebar.
const STATUS_MS: u64 = 1500;
/// How long a startup notice stays in the sidebar.
const NOTICE_MS: u64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    GameOver,
}

/// Held state of the fast-rise key.
#[derive(Debug, Default)]
struct FastRiseHold {
    last_seen: Option<Instant>,
    /// The terminal reports key releases, so no timeout is needed.
    release_events: bool,
}

impl FastRiseHold {
    fn hold(&mut self, now: Instant) {
        self.last_seen = Some(now);
    }

    fn release(&mut self) {
        self.last_seen = None;
    }

    fn saw_release_event(&mut self) {
        self.release_events = true;
    }

    fn active(&mut self, now: Instant) -> bool {
        let Some(seen) = self.last_seen else {
            return false;
        };
        if self.release_events
            || now.saturating_duration_since(seen) < Duration::from_millis(FAST_RISE_TIMEOUT_MS)
        {
            return true;
        }
        self.last_seen = None;
        false
    }
}

pub struct App {
    config: Config,
    theme: Theme,
    /// Fixed seed from the command line; every restart replays it.
    seed: Option<u64>,
    frame_interval: Duration,
    max_dt: f32,
    board: Board,
    cursor: Cursor,
    ramp: DifficultyRamp,
    screen: Screen,
    paused: bool,
    fast_rise: FastRiseHold,
    last_frame: Instant,
    /// Sidebar message and the moment it disappears.
    status: Option<(String, Instant)>,
}

impl App {
    pub fn new(args: &Args, config: Config, theme: Theme) -> Result<Self> {
        let board = new_board(&config, args.seed)?;
        let frame_rate = if args.frame_rate > 0.0 {
            args.frame_rate
        } else {
            60.0
        };
        Ok(Self {
            config,
            theme,
            seed: args.seed,
            frame_interval: Duration::from_secs_f64(1.0 / frame_rate),
            max_dt: args.max_dt.max(0.001),
            board,
            cursor: Cursor::new(),
            ramp: DifficultyRamp::new(),
            screen: Screen::Playing,
            paused: false,
            fast_rise: FastRiseHold::default(),
            last_frame: Instant::now(),
            status: None,
        })
    }

    /// Show a message in the sidebar for the first few seconds of play.
    pub fn show_notice(&mut self, notice: String) {
        self.set_status(notice, Instant::now(), NOTICE_MS);
    }

    fn set_status(&mut self, message: String, now: Instant, millis: u64) {
        self.status = Some((message, now + Duration::from_millis(millis)));
    }

    fn restart(&mut self) -> Result<()> {
        self.board = new_board(&self.config, self.seed)?;
        self.cursor = Cursor::new();
        self.ramp = DifficultyRamp::new();
        self.screen = Screen::Playing;
        self.paused = false;
        self.fast_rise.release();
        self.status = None;
        self.last_frame = Instant::now();
        Ok(())
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{
                KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
                PushKeyboardEnhancementFlags,
            },
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        // Release events and bare Shift presses need the kitty keyboard protocol
        let _ = execute!(
            stdout,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                    | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
            )
        );

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        self.last_frame = Instant::now();
        let result = self.run_loop(&mut terminal);

        let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let frame_start = Instant::now();
            terminal.draw(|f| {
                let view = View {
                    board: &self.board,
                    cursor: self.cursor,
                    theme: &self.theme,
                    screen: self.screen,
                    paused: self.paused,
                    elapsed: self.ramp.elapsed(),
                    status: self.status.as_ref().map(|(s, _)| s.as_str()),
                };
                ui::draw(f, &view);
            })?;

            let timeout = self.frame_interval.saturating_sub(frame_start.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if !self.handle_key(key, Instant::now())? {
                            return Ok(());
                        }
                    }
                }
            }

            self.step(Instant::now());
        }
    }

    /// Returns false when the app should quit.
    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Result<bool> {
        let action = key_to_action(key);
        if key.kind == KeyEventKind::Release {
            self.fast_rise.saw_release_event();
            if action == Action::FastRise {
                self.fast_rise.release();
            }
            return Ok(true);
        }
        let repeat = key.kind == KeyEventKind::Repeat;

        match (self.screen, action) {
            (_, Action::Quit) => return Ok(false),
            (_, Action::Restart) if !repeat => self.restart()?,
            (Screen::GameOver, _) => {}
            (Screen::Playing, Action::Pause) if !repeat => {
                self.paused = !self.paused;
                self.fast_rise.release();
            }
            (Screen::Playing, _) if self.paused => {}
            (Screen::Playing, Action::FastRise) => self.fast_rise.hold(now),
            // moves and swaps wait out the post-swap lockout
            (Screen::Playing, _) if self.board.swap_locked() => {}
            (Screen::Playing, Action::Swap) if !repeat => {
                self.board.swap(self.cursor.x, self.cursor.y);
            }
            (Screen::Playing, action) => {
                if let Some((dx, dy)) = action.direction() {
                    self.cursor.move_by(dx, dy, &self.config);
                }
            }
        }
        Ok(true)
    }

    /// Advance the simulation by the real time since the last frame.
    fn step(&mut self, now: Instant) {
        let dt = now
            .saturating_duration_since(self.last_frame)
            .as_secs_f32()
            .min(self.max_dt);
        self.last_frame = now;

        if self
            .status
            .as_ref()
            .is_some_and(|(_, until)| now >= *until)
        {
            self.status = None;
        }

        if self.screen != Screen::Playing || self.paused {
            return;
        }

        let fast = self.fast_rise.active(now);
        self.board.update(dt, fast);
        self.ramp
            .tick(dt, self.board.tunables_mut(), &self.config);
        self.cursor.follow_rise(self.board.risen_rows());

        for cue in self.board.drain_cues() {
            match cue {
                Cue::ChainTriggered { size } => {
                    self.set_status(format!("Chain x{size}!"), now, STATUS_MS);
                }
                Cue::GameOver => {
                    info!("game over: score {}", self.board.score());
                    self.screen = Screen::GameOver;
                    self.fast_rise.release();
                }
                Cue::SwapInitiated | Cue::PanelVanish { .. } => debug!("{cue:?}"),
            }
        }
    }
}

fn new_board(config: &Config, seed: Option<u64>) -> Result<Board> {
    let seed = seed.unwrap_or_else(rand::random);
    debug!("new board with seed {seed}");
    Ok(Board::new(config.clone(), seed)?)
}
