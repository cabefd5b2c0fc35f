//! Time-driven difficulty ramp applied by the frame loop to the board's tunables.

use crate::config::Config;

/// Board values the ramp tightens over time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tunables {
    pub fall_interval: f32,
    pub chain_base_delay: f32,
    pub chain_incremental_delay: f32,
}

impl Tunables {
    pub fn new(config: &Config) -> Self {
        Self {
            fall_interval: config.base_fall_interval,
            chain_base_delay: config.chain_base_delay,
            chain_incremental_delay: config.chain_incremental_delay,
        }
    }

    /// One difficulty step; every value is floored.
    pub fn step(&mut self, config: &Config) {
        self.fall_interval =
            (self.fall_interval - config.fall_interval_step).max(config.min_fall_interval);
        self.chain_base_delay =
            (self.chain_base_delay - config.chain_base_delay_step).max(config.min_chain_base_delay);
        self.chain_incremental_delay =
            (self.chain_incremental_delay - config.chain_incremental_delay_step).max(0.0);
    }

    /// Speed shown to the player, 1 (start) to 10 (fastest fall interval).
    pub fn speed_level(&self, config: &Config) -> u8 {
        let range = config.base_fall_interval - config.min_fall_interval;
        if range <= 0.0 {
            return 10;
        }
        let level = ((config.base_fall_interval - self.fall_interval) / range * 9.0).round() + 1.0;
        level.clamp(1.0, 10.0) as u8
    }
}

/// Counts play time and steps the tunables every `difficulty_period` seconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DifficultyRamp {
    since_step: f32,
    total: f32,
}

impl DifficultyRamp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total play time seen by the ramp.
    pub fn elapsed(&self) -> f32 {
        self.total
    }

    /// Returns the number of steps applied this tick.
    pub fn tick(&mut self, dt: f32, tunables: &mut Tunables, config: &Config) -> u32 {
        self.total += dt;
        self.since_step += dt;
        let mut steps = 0;
        while self.since_step >= config.difficulty_period {
            self.since_step -= config.difficulty_period;
            tunables.step(config);
            steps += 1;
        }
        if steps > 0 {
            log::debug!(
                "difficulty step x{steps}: fall interval {:.3}",
                tunables.fall_interval
            );
        }
        steps
    }
}
