//! Board: owns the grid and rise state and runs the per-frame update.
//!
//! One `update` runs, in order: swap lockout and panel animations, gravity,
//! the match lifecycle, rising (with row injection), the top-row game-over
//! timer, and finally the falling cascade. Later stages see earlier effects.

use crate::config::{Config, ConfigError};
use crate::cue::Cue;
use crate::difficulty::Tunables;
use crate::grid::Grid;
use crate::matcher::find_matches;
use crate::panel::{Panel, PanelState};
use crate::rise::RiseController;
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Two-phase match handling: detection arms a settle delay, expiry re-checks.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MatchPhase {
    /// No match event active; the next tick scans.
    #[default]
    Idle,
    /// A match was seen; it is confirmed (or dropped) when `remaining` runs out.
    Pending { remaining: f32 },
}

/// Everything the renderer needs about one panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelView {
    pub col: usize,
    pub row: usize,
    pub color_index: u8,
    pub state: PanelState,
    /// Horizontal offset from the swap animation, render units.
    pub offset_x: f32,
    /// Downward offset from the column's fall progress, render units.
    pub offset_y: f32,
    /// 0..=1 while clearing, 0 otherwise.
    pub clear_progress: f32,
}

#[derive(Debug, Clone)]
pub struct Board {
    config: Config,
    grid: Grid,
    rise: RiseController,
    match_phase: MatchPhase,
    upcoming_row: Vec<u8>,
    next_upcoming_row: Vec<u8>,
    score: u32,
    swap_lockout: f32,
    tunables: Tunables,
    /// Rows injected by the last `update`.
    risen_rows: u32,
    game_over: bool,
    cues: Vec<Cue>,
    rng: StdRng,
}

impl Board {
    /// Seeded board: the bottom `seeded_rows` rows are filled without ready-made matches.
    pub fn new(config: Config, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let grid = seed_grid(&config, &mut rng);
        Ok(Self::assemble(config, grid, rng))
    }

    /// Board with an explicit layout (rows top to bottom, bottom-aligned), all idle.
    pub fn from_layout(
        config: Config,
        layout: &[Vec<Option<u8>>],
        seed: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = Grid::from_layout(config.columns, config.rows, layout);
        Ok(Self::assemble(config, grid, StdRng::seed_from_u64(seed)))
    }

    fn assemble(config: Config, grid: Grid, mut rng: StdRng) -> Self {
        let upcoming_row = random_row(&config, &mut rng);
        let next_upcoming_row = random_row(&config, &mut rng);
        Self {
            rise: RiseController::new(&config),
            tunables: Tunables::new(&config),
            grid,
            match_phase: MatchPhase::Idle,
            upcoming_row,
            next_upcoming_row,
            score: 0,
            swap_lockout: 0.0,
            risen_rows: 0,
            game_over: false,
            cues: Vec::new(),
            rng,
            config,
        }
    }

    /// Advance the simulation by `dt` seconds. No-op once the game is over.
    pub fn update(&mut self, dt: f32, fast_rise: bool) {
        if self.game_over {
            return;
        }
        let dt = dt.max(0.0);
        self.risen_rows = 0;

        if self.swap_lockout > 0.0 {
            self.swap_lockout -= dt;
        }
        for variant in self.grid.tick_animations(dt, &self.config) {
            self.cues.push(Cue::PanelVanish { variant });
        }

        let frozen = self.rise.is_frozen();
        if !frozen || self.config.gravity_during_freeze {
            self.grid.apply_gravity(dt, frozen, &self.config);
        }

        self.step_match_phase(dt);
        self.step_rise(dt, fast_rise);

        if self
            .rise
            .track_top_row(dt, self.grid.top_row_occupied(), &self.config)
        {
            self.game_over = true;
            self.cues.push(Cue::GameOver);
            debug!("game over with score {}", self.score);
        }

        self.grid.advance_falls(dt, &self.config);
    }

    fn step_match_phase(&mut self, dt: f32) {
        match self.match_phase {
            MatchPhase::Idle => {
                let matches = find_matches(&self.grid);
                if matches.is_empty() {
                    return;
                }
                let remaining = if self.grid.is_stable() {
                    self.config.match_settle_delay
                } else {
                    self.config.match_settle_delay * 2.0
                };
                trace!("{} matched cells, confirming in {remaining:.2}s", matches.len());
                self.match_phase = MatchPhase::Pending { remaining };
            }
            MatchPhase::Pending { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.match_phase = MatchPhase::Pending { remaining };
                    return;
                }
                self.resolve_matches();
                self.match_phase = MatchPhase::Idle;
            }
        }
    }

    /// Re-scan and turn every matched panel into a staggered clear.
    fn resolve_matches(&mut self) {
        let matches = find_matches(&self.grid);
        if matches.is_empty() {
            trace!("match gone before confirmation");
            return;
        }
        let size = matches.len();
        let large = size >= self.config.large_match_size;
        self.rise.freeze(if large {
            self.config.large_chain_freeze
        } else {
            self.config.chain_freeze
        });
        if large {
            self.cues.push(Cue::ChainTriggered { size });
        }
        for (index, &(col, row)) in matches.iter().enumerate() {
            if let Some(panel) = self.grid.get_mut(col, row) {
                panel.begin_clear(index, size, &self.config);
            }
        }
        self.score += self.config.score_per_panel * size as u32;
        self.rise.reset_top_row_timer();
        debug!("cleared {size} panels, score {}", self.score);
    }

    fn step_rise(&mut self, dt: f32, fast_rise: bool) {
        self.rise
            .advance(dt, fast_rise, self.grid.top_row_occupied(), &self.config);
        while self.rise.offset() >= self.config.cell_length {
            // never push panels off the top
            if self.grid.top_row_occupied() {
                self.rise.discard_progress();
                break;
            }
            self.rise.take_full_cell(&self.config);
            self.inject_row();
            self.risen_rows += 1;
        }
    }

    fn inject_row(&mut self) {
        let fresh = random_row(&self.config, &mut self.rng);
        let upcoming = std::mem::replace(&mut self.next_upcoming_row, fresh);
        let colors = std::mem::replace(&mut self.upcoming_row, upcoming);
        self.grid.shift_up(&colors);
        debug!(
            "rose one row, interval now {:.2}s",
            self.rise.interval()
        );
    }

    /// Swap (col, row) with (col + 1, row). Out-of-range or blocked swaps are ignored.
    /// Returns whether the swap happened.
    pub fn swap(&mut self, col: usize, row: usize) -> bool {
        if self.game_over || !self.grid.swap(col, row, &self.config) {
            return false;
        }
        self.swap_lockout = self.config.swap_lockout_after_swap();
        self.cues.push(Cue::SwapInitiated);
        true
    }

    /// Take the cues recorded since the last call.
    pub fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn panel(&self, col: usize, row: usize) -> Option<&Panel> {
        self.grid.get(col, row)
    }

    /// Render view of every live panel.
    pub fn panels(&self) -> impl Iterator<Item = PanelView> + '_ {
        self.grid.panels().map(|p| {
            let (col, row) = p.position();
            PanelView {
                col,
                row,
                color_index: p.color_index(),
                state: p.state(),
                offset_x: p.offset_x(),
                offset_y: self.grid.fall_offset(col, row),
                clear_progress: p.clear_progress(),
            }
        })
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[inline]
    pub fn rise_offset(&self) -> f32 {
        self.rise.offset()
    }

    #[inline]
    pub fn rise_interval(&self) -> f32 {
        self.rise.interval()
    }

    #[inline]
    pub fn chain_pause_remaining(&self) -> f32 {
        self.rise.chain_pause().max(0.0)
    }

    #[inline]
    pub fn top_row_timer(&self) -> f32 {
        self.rise.top_row_timer()
    }

    /// Seconds until game over while the top row is occupied.
    pub fn game_over_countdown(&self) -> Option<f32> {
        self.rise.game_over_countdown(&self.config)
    }

    pub fn upcoming_row(&self) -> &[u8] {
        &self.upcoming_row
    }

    pub fn next_upcoming_row(&self) -> &[u8] {
        &self.next_upcoming_row
    }

    pub fn match_phase(&self) -> MatchPhase {
        self.match_phase
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// No panel is falling or about to fall.
    pub fn is_stable(&self) -> bool {
        self.grid.is_stable()
    }

    /// The stack reaches above the safe zone.
    pub fn in_danger(&self) -> bool {
        let safe_top = self.config.rows.saturating_sub(self.config.danger_rows);
        self.grid
            .highest_occupied_row()
            .is_some_and(|row| row < safe_top)
    }

    /// Moves and swaps should wait while this is true.
    pub fn swap_locked(&self) -> bool {
        self.swap_lockout > 0.0
    }

    /// Rows injected by the last `update`; the cursor follows by as many rows.
    pub fn risen_rows(&self) -> u32 {
        self.risen_rows
    }

    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    pub fn tunables_mut(&mut self) -> &mut Tunables {
        &mut self.tunables
    }

    pub fn current_fall_interval(&self) -> f32 {
        self.tunables.fall_interval
    }

    /// Difficulty shown to the player, 1..=10.
    pub fn speed_level(&self) -> u8 {
        self.tunables.speed_level(&self.config)
    }
}

fn random_row(config: &Config, rng: &mut StdRng) -> Vec<u8> {
    (0..config.columns)
        .map(|_| rng.random_range(0..config.color_count))
        .collect()
}

/// Fill the bottom rows so that no colour completes a run of three with the
/// two cells above it or the two cells to its left.
fn seed_grid(config: &Config, rng: &mut StdRng) -> Grid {
    let mut grid = Grid::new(config.columns, config.rows);
    let first_row = config.rows - config.seeded_rows;
    for col in 0..config.columns {
        for row in first_row..config.rows {
            let mut forbidden = Vec::with_capacity(2);
            if row >= first_row + 2 {
                forbidden.extend(repeated_color(&grid, (col, row - 1), (col, row - 2)));
            }
            if col >= 2 {
                forbidden.extend(repeated_color(&grid, (col - 1, row), (col - 2, row)));
            }
            let allowed: Vec<u8> = (0..config.color_count)
                .filter(|c| !forbidden.contains(c))
                .collect();
            // two colours can both be ruled out; accept the run then
            let color = if allowed.is_empty() {
                rng.random_range(0..config.color_count)
            } else {
                allowed[rng.random_range(0..allowed.len())]
            };
            grid.set(col, row, Some(Panel::new(color, col, row)));
        }
    }
    grid
}

fn repeated_color(grid: &Grid, a: (usize, usize), b: (usize, usize)) -> Option<u8> {
    let first = grid.get(a.0, a.1)?.color_index();
    (grid.get(b.0, b.1)?.color_index() == first).then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Option<u8> = Some(0);
    const B: Option<u8> = Some(1);
    const C: Option<u8> = Some(2);
    const D: Option<u8> = Some(3);

    fn board_with(layout: &[Vec<Option<u8>>]) -> Board {
        Board::from_layout(Config::default(), layout, 7).expect("valid config")
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let config = Config {
            color_count: 9,
            ..Config::default()
        };
        assert!(matches!(
            Board::new(config, 1),
            Err(ConfigError::ColorCount(9))
        ));
    }

    #[test]
    fn test_seeded_board_has_no_matches() {
        for seed in 0..50 {
            let board = Board::new(Config::default(), seed).expect("valid config");
            assert!(find_matches(board.grid()).is_empty(), "seed {seed}");
            assert_eq!(board.grid().panel_count(), 6 * 8);
            assert!(!board.grid().top_row_occupied());
            for row in 0..4 {
                assert!(board.grid().row_colors(row).iter().all(Option::is_none));
            }
        }
    }

    #[test]
    fn test_upcoming_rows_use_palette() {
        let board = Board::new(Config::with_fifth_symbol(), 3).expect("valid config");
        assert_eq!(board.upcoming_row().len(), 6);
        assert_eq!(board.next_upcoming_row().len(), 6);
        assert!(board.upcoming_row().iter().all(|&c| c < 5));
    }

    #[test]
    fn test_match_confirms_after_settle_delay() {
        let mut board = board_with(&[vec![A, A, A, B, C, D]]);
        board.update(0.0, false);
        assert_eq!(board.match_phase(), MatchPhase::Pending { remaining: 0.15 });
        assert_eq!(board.score(), 0);

        board.update(0.1, false);
        assert!(matches!(board.match_phase(), MatchPhase::Pending { .. }));

        board.update(0.06, false);
        assert_eq!(board.match_phase(), MatchPhase::Idle);
        assert_eq!(board.score(), 300);
        for col in 0..3 {
            assert_eq!(
                board.panel(col, 11).map(Panel::state),
                Some(PanelState::Clearing)
            );
            assert!(board.panel(col, 11).is_some_and(Panel::is_clearing));
        }
        assert_eq!(board.panel(3, 11).map(Panel::state), Some(PanelState::Idle));
        assert!(!board.panel(3, 11).is_some_and(Panel::is_clearing));
        // the rise stage already counted this tick off the freeze
        assert!((board.chain_pause_remaining() - 0.69).abs() < 1e-4);
        assert!(board.drain_cues().is_empty());
    }

    #[test]
    fn test_unstable_board_doubles_settle_delay() {
        let mut board = board_with(&[
            vec![B, None, None, None, None, None],
            vec![None, None, None, None, None, None],
            vec![A, A, A, C, D, C],
        ]);
        board.update(0.0, false);
        assert_eq!(board.match_phase(), MatchPhase::Pending { remaining: 0.3 });
    }

    #[test]
    fn test_large_match_freezes_longer_and_cues_chain() {
        let mut board = board_with(&[vec![A, A, A, A, C, D]]);
        board.update(0.0, false);
        board.update(0.2, false);
        assert_eq!(board.score(), 400);
        assert!((board.chain_pause_remaining() - 0.8).abs() < 1e-4);
        assert_eq!(board.drain_cues(), vec![Cue::ChainTriggered { size: 4 }]);
    }

    #[test]
    fn test_vanished_match_does_nothing() {
        let mut board = board_with(&[vec![A, A, A, B, C, D]]);
        board.update(0.0, false);
        board.grid.take(1, 11);
        board.update(0.2, false);
        assert_eq!(board.score(), 0);
        assert_eq!(board.match_phase(), MatchPhase::Idle);
        assert!(!board.rise.is_frozen());
    }

    #[test]
    fn test_clears_vanish_in_order_with_cues() {
        let mut board = board_with(&[vec![A, A, A, B, C, D]]);
        board.update(0.0, false);
        board.update(0.15, false);
        board.drain_cues();
        for _ in 0..100 {
            board.update(0.01, false);
        }
        let cues = board.drain_cues();
        assert_eq!(
            cues,
            vec![
                Cue::PanelVanish { variant: 0 },
                Cue::PanelVanish { variant: 1 },
                Cue::PanelVanish { variant: 2 },
            ]
        );
        assert_eq!(board.grid().row_colors(11), vec![None, None, None, B, C, D]);
    }

    #[test]
    fn test_swap_sets_lockout_and_cue() {
        let mut board = board_with(&[vec![A, B, C, D, A, B]]);
        assert!(board.swap(0, 11));
        assert!(board.swap_locked());
        assert_eq!(board.drain_cues(), vec![Cue::SwapInitiated]);
        assert_eq!(board.grid().row_colors(11)[..2], [B, A]);

        board.update(0.03, false);
        assert!(!board.swap_locked());
    }

    #[test]
    fn test_swap_ignores_out_of_range_and_empty() {
        let mut board = board_with(&[vec![A, B, C, D, A, B]]);
        assert!(!board.swap(5, 11));
        assert!(!board.swap(0, 12));
        assert!(!board.swap(0, 0));
        assert!(!board.swap(usize::MAX, 11));
        assert_eq!(board.grid().row_colors(11), vec![A, B, C, D, A, B]);
        assert!(board.drain_cues().is_empty());
        assert!(!board.swap_locked());
    }

    #[test]
    fn test_swap_past_last_column_keeps_every_panel() {
        let mut board = Board::new(Config::default(), 1).expect("valid config");
        let before = board.grid().panel_count();
        assert!(!board.swap(usize::MAX, 11));
        assert!(!board.swap(usize::MAX, usize::MAX));
        assert_eq!(board.grid().panel_count(), before);
        board.update(0.01, false);
        assert_eq!(board.grid().panel_count(), before);
    }

    #[test]
    fn test_difficulty_step_speeds_up_falls() {
        let config = Config::default();
        let mut board = board_with(&[vec![A, B, C, D, A, B]]);
        assert_eq!(board.tunables().fall_interval, config.base_fall_interval);
        assert_eq!(board.speed_level(), 1);

        let mut ramp = crate::difficulty::DifficultyRamp::new();
        let steps = ramp.tick(config.difficulty_period + 1.0, board.tunables_mut(), &config);
        assert_eq!(steps, 1);
        assert!(board.tunables().fall_interval < config.base_fall_interval);
        assert_eq!(board.tunables().fall_interval, board.current_fall_interval());
        assert!(board.tunables().chain_base_delay < config.chain_base_delay);
    }

    #[test]
    fn test_swap_into_hole_then_falls() {
        let mut board = board_with(&[
            vec![A, None, None, None, None, None],
            vec![B, None, D, A, B, C],
        ]);
        assert!(board.swap(0, 10));
        assert_eq!(board.panel(1, 10).map(Panel::color_index), Some(0));
        for _ in 0..80 {
            board.update(0.01, false);
        }
        assert!(board.panel(1, 10).is_none());
        assert_eq!(board.panel(1, 11).map(Panel::state), Some(PanelState::Idle));
        assert_eq!(board.grid().row_colors(11), vec![B, A, D, A, B, C]);
        assert!(board.is_stable());
    }

    #[test]
    fn test_fast_rise_injects_upcoming_row() {
        let mut board = board_with(&[vec![A, B, C, D, A, B]]);
        let upcoming: Vec<Option<u8>> = board.upcoming_row().iter().map(|&c| Some(c)).collect();
        let next = board.next_upcoming_row().to_vec();
        board.update(1.0, true);
        assert_eq!(board.risen_rows(), 1);
        assert_eq!(board.grid().row_colors(11), upcoming);
        assert_eq!(board.grid().row_colors(10), vec![A, B, C, D, A, B]);
        assert_eq!(board.upcoming_row(), next.as_slice());
        assert!((board.rise_interval() - 4.9).abs() < 1e-5);
        assert!(board.rise_offset() < 1e-5);
    }

    #[test]
    fn test_game_over_fires_once() {
        let column: Vec<Vec<Option<u8>>> = (0..12)
            .map(|row| {
                let mut line = vec![None; 6];
                line[0] = if row % 2 == 0 { A } else { B };
                line
            })
            .collect();
        let mut board = board_with(&column);
        board.update(1.0, false);
        board.update(1.0, false);
        assert!(!board.is_game_over());
        assert_eq!(board.game_over_countdown(), Some(1.0));
        board.update(1.0, false);
        assert!(board.is_game_over());
        board.update(1.0, false);
        assert_eq!(board.drain_cues(), vec![Cue::GameOver]);
        assert_eq!(board.rise_offset(), 0.0);
        assert!(!board.swap(0, 0));
    }

    #[test]
    fn test_in_danger() {
        let safe = board_with(&[vec![A, B, C, D, A, B]]);
        assert!(!safe.in_danger());
        let mut layout = vec![vec![None; 6]; 9];
        layout[0][0] = A;
        let tall = board_with(&layout);
        assert!(tall.in_danger());
    }

    #[test]
    fn test_falling_panel_offsets_in_view() {
        let mut board = board_with(&[
            vec![A, None, None, None, None, None],
            vec![None, None, None, None, None, None],
            vec![None, None, None, None, None, None],
            vec![B, C, D, A, B, C],
        ]);
        board.update(0.05, false);
        board.update(0.02, false);
        let view = board
            .panels()
            .find(|v| v.color_index == 0 && v.col == 0 && v.row < 11)
            .expect("falling panel");
        assert_eq!(view.state, PanelState::Falling);
        assert!(view.offset_y > 0.0);
    }
}
