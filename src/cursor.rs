//! Two-cell-wide selector. Swaps act on (x, y) and (x + 1, y).

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub x: usize,
    pub y: usize,
}

impl Cursor {
    /// Starts at the top-left.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move by one step on one axis, clamped so both cells stay on the board.
    pub fn move_by(&mut self, dx: i32, dy: i32, config: &Config) {
        let max_x = config.columns.saturating_sub(2) as i64;
        let max_y = config.rows.saturating_sub(1) as i64;
        self.x = (self.x as i64 + i64::from(dx.signum())).clamp(0, max_x) as usize;
        self.y = (self.y as i64 + i64::from(dy.signum())).clamp(0, max_y) as usize;
    }

    /// Keep pointing at the same panels after the stack rose by `rows`.
    pub fn follow_rise(&mut self, rows: u32) {
        self.y = self.y.saturating_sub(rows as usize);
    }
}
