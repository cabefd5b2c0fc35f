//! Tunables for the board simulation. Lengths are in cells, times in seconds.

use thiserror::Error;

/// Highest number of distinct panel colours/symbols.
pub const MAX_COLORS: u8 = 5;

/// Immutable configuration handed to [`crate::board::Board::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub columns: usize,
    pub rows: usize,
    /// Rows filled from the bottom when a board is seeded.
    pub seeded_rows: usize,
    /// Number of colours in play (4 classic, 5 with the fifth symbol).
    pub color_count: u8,
    /// Length of one cell in render units; rise and fall offsets use it.
    pub cell_length: f32,

    pub swap_duration: f32,
    /// Post-swap input lockout is `swap_lockout / 6`.
    pub swap_lockout: f32,
    pub clear_duration: f32,
    /// Clears start this much earlier than their even share of `clear_duration`.
    pub clear_stagger_lead: f32,
    /// Vanish cue variants are `0..vanish_variants`.
    pub vanish_variants: u8,

    /// Base teeter before an unsupported panel starts to fall.
    pub fall_start_delay: f32,
    /// Time for a falling panel to travel one cell.
    pub fall_hold: f32,
    /// Keep starting falls during a chain freeze, with a 1.5x teeter.
    /// Off by default: a freeze suspends gravity entirely.
    pub gravity_during_freeze: bool,

    /// Settle delay between detecting and confirming a match on a stable board.
    pub match_settle_delay: f32,
    /// Chain freeze after a match smaller than `large_match_size`.
    pub chain_freeze: f32,
    /// Chain freeze after a match of at least `large_match_size` cells.
    pub large_chain_freeze: f32,
    pub large_match_size: usize,
    pub score_per_panel: u32,

    pub initial_rise_interval: f32,
    /// Floor of the decaying rise interval; also the fast-rise interval.
    pub min_rise_interval: f32,
    pub rise_interval_step: f32,
    /// Seconds the top row may stay occupied before the game ends.
    pub game_over_hold: f32,
    /// Panels above `rows - danger_rows` put the board in danger.
    pub danger_rows: usize,

    pub base_fall_interval: f32,
    pub min_fall_interval: f32,
    pub fall_interval_step: f32,
    pub chain_base_delay: f32,
    pub min_chain_base_delay: f32,
    pub chain_base_delay_step: f32,
    pub chain_incremental_delay: f32,
    pub chain_incremental_delay_step: f32,
    /// Seconds of play between difficulty steps.
    pub difficulty_period: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            columns: 6,
            rows: 12,
            seeded_rows: 8,
            color_count: 4,
            cell_length: 1.0,

            swap_duration: 0.1,
            swap_lockout: 0.15,
            clear_duration: 0.8,
            clear_stagger_lead: 0.05,
            vanish_variants: 7,

            fall_start_delay: 0.05,
            fall_hold: 0.1,
            gravity_during_freeze: false,

            match_settle_delay: 0.15,
            chain_freeze: 0.75,
            large_chain_freeze: 1.0,
            large_match_size: 4,
            score_per_panel: 100,

            initial_rise_interval: 5.0,
            min_rise_interval: 1.0,
            rise_interval_step: 0.1,
            game_over_hold: 3.0,
            danger_rows: 8,

            base_fall_interval: 0.2,
            min_fall_interval: 0.08,
            fall_interval_step: 0.01,
            chain_base_delay: 0.3,
            min_chain_base_delay: 0.2,
            chain_base_delay_step: 0.02,
            chain_incremental_delay: 0.1,
            chain_incremental_delay_step: 0.01,
            difficulty_period: 30.0,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("grid must be at least 2x2, got {columns}x{rows}")]
    GridTooSmall { columns: usize, rows: usize },
    #[error("seeded rows ({seeded}) exceed grid rows ({rows})")]
    TooManySeededRows { seeded: usize, rows: usize },
    #[error("color count must be in 2..=5, got {0}")]
    ColorCount(u8),
    #[error("{0} must be positive")]
    NonPositive(&'static str),
    #[error("vanish variants must be at least 1")]
    NoVanishVariants,
}

impl Config {
    /// Classic constants with the optional fifth symbol enabled.
    pub fn with_fifth_symbol() -> Self {
        Self {
            color_count: MAX_COLORS,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns < 2 || self.rows < 2 {
            return Err(ConfigError::GridTooSmall {
                columns: self.columns,
                rows: self.rows,
            });
        }
        if self.seeded_rows > self.rows {
            return Err(ConfigError::TooManySeededRows {
                seeded: self.seeded_rows,
                rows: self.rows,
            });
        }
        if !(2..=MAX_COLORS).contains(&self.color_count) {
            return Err(ConfigError::ColorCount(self.color_count));
        }
        if self.vanish_variants == 0 {
            return Err(ConfigError::NoVanishVariants);
        }
        let positive = [
            ("cell_length", self.cell_length),
            ("swap_duration", self.swap_duration),
            ("clear_duration", self.clear_duration),
            ("fall_start_delay", self.fall_start_delay),
            ("fall_hold", self.fall_hold),
            ("match_settle_delay", self.match_settle_delay),
            ("min_rise_interval", self.min_rise_interval),
            ("initial_rise_interval", self.initial_rise_interval),
            ("game_over_hold", self.game_over_hold),
            ("difficulty_period", self.difficulty_period),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive(name));
            }
        }
        Ok(())
    }

    /// Lockout armed after every swap.
    #[inline]
    pub fn swap_lockout_after_swap(&self) -> f32 {
        self.swap_lockout / 6.0
    }

    /// Index of the highest vanish cue variant.
    #[inline]
    pub fn max_vanish_variant(&self) -> u8 {
        self.vanish_variants.saturating_sub(1)
    }
}
