//! Panel: one occupied cell with its colour and animation state.

use crate::config::Config;

/// Lifecycle of a panel. Clearing is terminal; the cell is vacated when it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelState {
    #[default]
    Idle,
    Swapping,
    Falling,
    Clearing,
}

/// Result of advancing a clearing panel by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearTick {
    /// Vanish cue variant to emit this tick, if the cue fired.
    pub vanish: Option<u8>,
    /// The animation finished; the panel must be removed.
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    color_index: u8,
    state: PanelState,
    /// (col, row); kept equal to the panel's slot in the grid by `Grid`.
    pub(crate) col: usize,
    pub(crate) row: usize,

    swap_elapsed: f32,
    /// Horizontal start offset of the swap (±one cell); eases to 0.
    swap_origin_offset: f32,
    /// Horizontal render offset while swapping.
    offset_x: f32,

    /// Teeter time left before falling; 0 when not waiting.
    pub(crate) fall_wait: f32,
    /// The teeter has already been doubled once.
    pub(crate) fall_delay_extended: bool,

    clear_delay: f32,
    clear_elapsed: f32,
    clear_duration: f32,
    clear_sound_variant: Option<u8>,
    clear_sound_played: bool,
}

impl Panel {
    pub fn new(color_index: u8, col: usize, row: usize) -> Self {
        Self {
            color_index,
            state: PanelState::Idle,
            col,
            row,
            swap_elapsed: 0.0,
            swap_origin_offset: 0.0,
            offset_x: 0.0,
            fall_wait: 0.0,
            fall_delay_extended: false,
            clear_delay: 0.0,
            clear_elapsed: 0.0,
            clear_duration: 0.0,
            clear_sound_variant: None,
            clear_sound_played: false,
        }
    }

    #[inline]
    pub fn color_index(&self) -> u8 {
        self.color_index
    }

    #[inline]
    pub fn state(&self) -> PanelState {
        self.state
    }

    #[inline]
    pub fn position(&self) -> (usize, usize) {
        (self.col, self.row)
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.state == PanelState::Idle
    }

    #[inline]
    pub fn is_falling(&self) -> bool {
        self.state == PanelState::Falling
    }

    #[inline]
    pub fn is_clearing(&self) -> bool {
        self.state == PanelState::Clearing
    }

    /// Visible to match detection: neither falling nor clearing.
    #[inline]
    pub fn is_matchable(&self) -> bool {
        !matches!(self.state, PanelState::Falling | PanelState::Clearing)
    }

    /// Waiting to fall (teeter in progress).
    #[inline]
    pub fn is_waiting_to_fall(&self) -> bool {
        self.fall_wait > 0.0
    }

    /// Horizontal render offset (swap animation).
    #[inline]
    pub fn offset_x(&self) -> f32 {
        self.offset_x
    }

    pub fn clear_sound_variant(&self) -> Option<u8> {
        self.clear_sound_variant
    }

    pub fn clear_sound_played(&self) -> bool {
        self.clear_sound_played
    }

    /// Remaining stagger before the clear animation starts.
    pub fn clear_delay(&self) -> f32 {
        self.clear_delay
    }

    /// Clear animation progress in [0, 1]; 0 for panels that are not clearing.
    pub fn clear_progress(&self) -> f32 {
        if self.state != PanelState::Clearing {
            return 0.0;
        }
        if self.clear_duration <= 0.0 {
            return 1.0;
        }
        (self.clear_elapsed / self.clear_duration).clamp(0.0, 1.0)
    }

    pub(crate) fn set_state(&mut self, state: PanelState) {
        self.state = state;
    }

    pub(crate) fn reset_fall_wait(&mut self) {
        self.fall_wait = 0.0;
        self.fall_delay_extended = false;
    }

    /// Start sliding in from `origin` (±one cell) towards the new column.
    pub(crate) fn begin_swap(&mut self, origin: f32) {
        self.state = PanelState::Swapping;
        self.swap_elapsed = 0.0;
        self.swap_origin_offset = origin;
        self.offset_x = origin;
    }

    pub(crate) fn tick_swap(&mut self, dt: f32, config: &Config) {
        if self.state != PanelState::Swapping {
            return;
        }
        self.swap_elapsed += dt;
        let progress = self.swap_elapsed / config.swap_duration;
        if progress >= 1.0 {
            self.offset_x = 0.0;
            self.swap_elapsed = 0.0;
            self.state = PanelState::Idle;
        } else {
            self.offset_x = self.swap_origin_offset * (1.0 - progress);
        }
    }

    /// Seize the panel for clearing as number `index` of `count` in clear order.
    pub(crate) fn begin_clear(&mut self, index: usize, count: usize, config: &Config) {
        let share = config.clear_duration / count.max(1) as f32;
        let delay = (index as f32 * share - config.clear_stagger_lead).max(0.0);
        self.state = PanelState::Clearing;
        self.offset_x = 0.0;
        self.reset_fall_wait();
        self.clear_delay = delay;
        self.clear_duration = config.clear_duration - delay;
        self.clear_elapsed = 0.0;
        self.clear_sound_variant = Some(index.min(config.max_vanish_variant() as usize) as u8);
        self.clear_sound_played = false;
    }

    /// Stagger delay first (overshoot carries into the animation), then the animation.
    pub(crate) fn tick_clear(&mut self, dt: f32) -> ClearTick {
        let mut tick = ClearTick::default();
        if self.state != PanelState::Clearing {
            return tick;
        }
        if self.clear_delay > 0.0 {
            self.clear_delay -= dt;
            if self.clear_delay < 0.0 {
                self.clear_elapsed += -self.clear_delay;
                self.clear_delay = 0.0;
            }
        } else {
            self.clear_elapsed += dt;
            tick.vanish = self.take_vanish_cue();
        }
        if self.clear_progress() >= 1.0 {
            // a panel destroyed on its overshoot tick still gets its cue
            if tick.vanish.is_none() {
                tick.vanish = self.take_vanish_cue();
            }
            tick.finished = true;
        }
        tick
    }

    fn take_vanish_cue(&mut self) -> Option<u8> {
        if self.clear_sound_played {
            return None;
        }
        self.clear_sound_played = true;
        Some(self.clear_sound_variant.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_eases_to_idle() {
        let config = Config::default();
        let mut panel = Panel::new(0, 1, 5);
        panel.begin_swap(-1.0);
        assert_eq!(panel.state(), PanelState::Swapping);
        assert_eq!(panel.offset_x(), -1.0);

        panel.tick_swap(0.05, &config);
        assert!((panel.offset_x() + 0.5).abs() < 1e-4);
        assert_eq!(panel.state(), PanelState::Swapping);

        panel.tick_swap(0.06, &config);
        assert_eq!(panel.state(), PanelState::Idle);
        assert_eq!(panel.offset_x(), 0.0);
    }

    #[test]
    fn test_matchable_states() {
        let mut panel = Panel::new(2, 0, 0);
        assert!(panel.is_matchable());
        panel.set_state(PanelState::Swapping);
        assert!(panel.is_matchable());
        panel.set_state(PanelState::Falling);
        assert!(!panel.is_matchable());
        panel.set_state(PanelState::Clearing);
        assert!(!panel.is_matchable());
    }

    #[test]
    fn test_clear_stagger_and_variant() {
        let config = Config::default();
        let mut first = Panel::new(0, 0, 0);
        first.begin_clear(0, 4, &config);
        assert_eq!(first.clear_delay(), 0.0);
        assert_eq!(first.clear_sound_variant(), Some(0));

        let mut third = Panel::new(0, 2, 0);
        third.begin_clear(2, 4, &config);
        assert!((third.clear_delay() - 0.35).abs() < 1e-5);

        let mut late = Panel::new(0, 0, 0);
        late.begin_clear(9, 10, &config);
        assert_eq!(late.clear_sound_variant(), Some(6));
    }

    #[test]
    fn test_clear_delay_overshoot_carries_and_cue_fires_once() {
        let config = Config::default();
        let mut panel = Panel::new(0, 0, 0);
        panel.begin_clear(1, 2, &config);
        // delay 0.35, duration 0.45
        let tick = panel.tick_clear(0.45);
        assert_eq!(tick.vanish, None);
        assert!(!tick.finished);
        assert!((panel.clear_progress() - 0.1 / 0.45).abs() < 1e-4);

        let tick = panel.tick_clear(0.1);
        assert_eq!(tick.vanish, Some(1));
        let tick = panel.tick_clear(0.1);
        assert_eq!(tick.vanish, None);
        assert!(panel.clear_sound_played());

        let tick = panel.tick_clear(1.0);
        assert!(tick.finished);
        assert_eq!(tick.vanish, None);
    }

    #[test]
    fn test_overshoot_removal_still_emits_cue() {
        let config = Config::default();
        let mut panel = Panel::new(0, 0, 0);
        panel.begin_clear(1, 2, &config);
        let tick = panel.tick_clear(5.0);
        assert!(tick.finished);
        assert_eq!(tick.vanish, Some(1));
    }
}
