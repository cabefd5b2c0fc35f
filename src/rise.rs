//! Continuous rise of the stack, chain freeze and the top-row game-over timer.

use crate::config::Config;

#[derive(Debug, Clone, PartialEq)]
pub struct RiseController {
    /// Sub-cell rise progress in render units, 0 <= offset < cell length after a tick.
    offset: f32,
    /// Current seconds per cell; only ever decreases, floored at `min_rise_interval`.
    interval: f32,
    /// Chain freeze left; rising stops while positive.
    chain_pause: f32,
    /// Seconds the top row has been continuously occupied.
    top_row_timer: f32,
}

impl RiseController {
    pub fn new(config: &Config) -> Self {
        Self {
            offset: 0.0,
            interval: config.initial_rise_interval.max(config.min_rise_interval),
            chain_pause: 0.0,
            top_row_timer: 0.0,
        }
    }

    #[inline]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    #[inline]
    pub fn interval(&self) -> f32 {
        self.interval
    }

    #[inline]
    pub fn chain_pause(&self) -> f32 {
        self.chain_pause
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.chain_pause > 0.0
    }

    #[inline]
    pub fn top_row_timer(&self) -> f32 {
        self.top_row_timer
    }

    /// Start (or restart) a chain freeze.
    pub fn freeze(&mut self, duration: f32) {
        self.chain_pause = duration;
    }

    /// Rise speed in render units per second for this tick. Counts the freeze down.
    pub fn speed(&mut self, dt: f32, fast_rise: bool, top_occupied: bool, config: &Config) -> f32 {
        let speed = if self.chain_pause > 0.0 {
            self.chain_pause -= dt;
            0.0
        } else {
            let interval = if fast_rise {
                config.min_rise_interval
            } else {
                self.interval
            };
            config.cell_length / interval
        };
        if top_occupied { 0.0 } else { speed }
    }

    /// Accumulate rise progress for this tick.
    pub fn advance(&mut self, dt: f32, fast_rise: bool, top_occupied: bool, config: &Config) {
        let speed = self.speed(dt, fast_rise, top_occupied, config);
        self.offset += speed * dt;
    }

    /// Consume one full cell of progress if available, ratcheting the interval down.
    pub fn take_full_cell(&mut self, config: &Config) -> bool {
        if self.offset < config.cell_length {
            return false;
        }
        self.offset -= config.cell_length;
        self.interval = (self.interval - config.rise_interval_step).max(config.min_rise_interval);
        true
    }

    /// Drop leftover progress that can no longer be spent (top row blocked).
    pub fn discard_progress(&mut self) {
        self.offset = 0.0;
    }

    /// Track how long the top row stays occupied. Returns true once the hold is reached.
    pub fn track_top_row(&mut self, dt: f32, occupied: bool, config: &Config) -> bool {
        if occupied {
            self.top_row_timer += dt;
        } else {
            self.top_row_timer = 0.0;
        }
        self.top_row_timer >= config.game_over_hold
    }

    pub fn reset_top_row_timer(&mut self) {
        self.top_row_timer = 0.0;
    }

    /// Seconds left before game over; `None` while the top row is clear.
    pub fn game_over_countdown(&self, config: &Config) -> Option<f32> {
        (self.top_row_timer > 0.0).then(|| (config.game_over_hold - self.top_row_timer).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rises_at_interval_speed() {
        let config = Config::default();
        let mut rise = RiseController::new(&config);
        rise.advance(1.0, false, false, &config);
        assert!((rise.offset() - 0.2).abs() < 1e-5);
        assert!(!rise.take_full_cell(&config));
    }

    #[test]
    fn test_fast_rise_uses_minimum_interval() {
        let config = Config::default();
        let mut rise = RiseController::new(&config);
        rise.advance(0.5, true, false, &config);
        assert!((rise.offset() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_freeze_stops_rising_and_counts_down() {
        let config = Config::default();
        let mut rise = RiseController::new(&config);
        rise.freeze(0.75);
        rise.advance(0.5, true, false, &config);
        assert_eq!(rise.offset(), 0.0);
        assert!(rise.is_frozen());
        rise.advance(0.5, true, false, &config);
        assert!(!rise.is_frozen());
        assert_eq!(rise.offset(), 0.0);
        rise.advance(0.5, true, false, &config);
        assert!(rise.offset() > 0.0);
    }

    #[test]
    fn test_occupied_top_row_blocks_rise() {
        let config = Config::default();
        let mut rise = RiseController::new(&config);
        rise.advance(2.0, true, true, &config);
        assert_eq!(rise.offset(), 0.0);
    }

    #[test]
    fn test_interval_ratchets_down_to_floor() {
        let config = Config::default();
        let mut rise = RiseController::new(&config);
        let mut last = rise.interval();
        for _ in 0..100 {
            rise.advance(1.0, true, false, &config);
            assert!(rise.take_full_cell(&config));
            assert!(rise.interval() <= last);
            assert!(rise.interval() >= config.min_rise_interval);
            last = rise.interval();
        }
        assert_eq!(rise.interval(), config.min_rise_interval);
    }

    #[test]
    fn test_top_row_timer() {
        let config = Config::default();
        let mut rise = RiseController::new(&config);
        assert!(!rise.track_top_row(1.5, true, &config));
        assert_eq!(rise.game_over_countdown(&config), Some(1.5));
        assert!(!rise.track_top_row(0.5, false, &config));
        assert_eq!(rise.top_row_timer(), 0.0);
        assert_eq!(rise.game_over_countdown(&config), None);
        assert!(!rise.track_top_row(2.0, true, &config));
        assert!(rise.track_top_row(1.0, true, &config));
    }
}
