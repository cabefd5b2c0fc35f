//! Grid: columns x rows of optional panels, gravity, fall cascade, rise shift.

use crate::config::Config;
use crate::panel::{Panel, PanelState};
use std::collections::VecDeque;

/// Playfield of panels. Row 0 is the top; row `rows - 1` is the bottom.
#[derive(Debug, Clone)]
pub struct Grid {
    columns: usize,
    rows: usize,
    /// cells[row][col]. Rising pops the front row and pushes a new back row.
    cells: VecDeque<Vec<Option<Panel>>>,
    /// Per-column fall accumulator in render units. Drives both the logical
    /// one-row drops and the sub-cell offset of falling panels in that column.
    fall_offsets: Vec<f32>,
}

impl Grid {
    pub fn new(columns: usize, rows: usize) -> Self {
        let cells = (0..rows).map(|_| vec![None; columns]).collect();
        Self {
            columns,
            rows,
            cells,
            fall_offsets: vec![0.0; columns],
        }
    }

    /// Build a grid of idle panels from colour rows listed top to bottom.
    /// Fewer rows than the grid are aligned to the bottom; extra cells are ignored.
    pub fn from_layout(columns: usize, rows: usize, layout: &[Vec<Option<u8>>]) -> Self {
        let mut grid = Self::new(columns, rows);
        let skip = layout.len().saturating_sub(rows);
        let first_row = rows.saturating_sub(layout.len());
        for (i, line) in layout.iter().skip(skip).enumerate() {
            let row = first_row + i;
            for (col, color) in line.iter().take(columns).enumerate() {
                if let Some(color) = *color {
                    grid.set(col, row, Some(Panel::new(color, col, row)));
                }
            }
        }
        grid
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn get(&self, col: usize, row: usize) -> Option<&Panel> {
        self.cells.get(row).and_then(|r| r.get(col)).and_then(Option::as_ref)
    }

    #[inline]
    pub fn get_mut(&mut self, col: usize, row: usize) -> Option<&mut Panel> {
        self.cells
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .and_then(Option::as_mut)
    }

    #[inline]
    pub fn is_empty(&self, col: usize, row: usize) -> bool {
        self.get(col, row).is_none()
    }

    /// Place `panel` at (col, row), fixing up its stored position. Out of range is ignored.
    pub fn set(&mut self, col: usize, row: usize, panel: Option<Panel>) {
        if let Some(slot) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            *slot = panel.map(|mut p| {
                p.col = col;
                p.row = row;
                p
            });
        }
    }

    pub fn take(&mut self, col: usize, row: usize) -> Option<Panel> {
        self.cells
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .and_then(Option::take)
    }

    /// All live panels, row by row from the top.
    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.cells.iter().flat_map(|r| r.iter().flatten())
    }

    pub fn panel_count(&self) -> usize {
        self.panels().count()
    }

    /// Colours of one row, `None` for empty cells.
    pub fn row_colors(&self, row: usize) -> Vec<Option<u8>> {
        (0..self.columns)
            .map(|col| self.get(col, row).map(Panel::color_index))
            .collect()
    }

    pub fn top_row_occupied(&self) -> bool {
        self.cells
            .front()
            .is_some_and(|row| row.iter().any(Option::is_some))
    }

    /// Topmost row holding any panel.
    pub fn highest_occupied_row(&self) -> Option<usize> {
        self.cells
            .iter()
            .position(|row| row.iter().any(Option::is_some))
    }

    /// No panel is falling or teetering before a fall.
    pub fn is_stable(&self) -> bool {
        self.panels()
            .all(|p| !p.is_falling() && !p.is_waiting_to_fall())
    }

    /// Exchange (col, row) and (col + 1, row) and start both swap animations.
    /// Returns false (and changes nothing) when the swap is not allowed.
    pub fn swap(&mut self, col: usize, row: usize, config: &Config) -> bool {
        if col >= self.columns.saturating_sub(1) || row >= self.rows {
            return false;
        }
        let (left, right) = (self.get(col, row), self.get(col + 1, row));
        if left.is_none() && right.is_none() {
            return false;
        }
        if left.is_some_and(|p| !p.is_idle()) || right.is_some_and(|p| !p.is_idle()) {
            return false;
        }
        let left = self.take(col, row);
        let right = self.take(col + 1, row);
        let cell = config.cell_length;
        self.set(
            col + 1,
            row,
            left.map(|mut p| {
                p.begin_swap(-cell);
                p
            }),
        );
        self.set(
            col,
            row,
            right.map(|mut p| {
                p.begin_swap(cell);
                p
            }),
        );
        true
    }

    /// Advance swap and clear animations; vacate finished clears.
    /// Returns the vanish cue variants that fired this tick.
    pub fn tick_animations(&mut self, dt: f32, config: &Config) -> Vec<u8> {
        let mut vanished = Vec::new();
        for row in 0..self.rows {
            for col in 0..self.columns {
                let Some(panel) = self.get_mut(col, row) else {
                    continue;
                };
                match panel.state() {
                    PanelState::Swapping => panel.tick_swap(dt, config),
                    PanelState::Clearing => {
                        let tick = panel.tick_clear(dt);
                        if let Some(variant) = tick.vanish {
                            vanished.push(variant);
                        }
                        if tick.finished {
                            self.take(col, row);
                        }
                    }
                    PanelState::Idle | PanelState::Falling => {}
                }
            }
        }
        vanished
    }

    /// Start teeter timers for unsupported idle panels and turn expired ones into
    /// falling panels; then pull idle panels resting on falling ones along.
    /// `frozen` stretches the teeter by half.
    pub fn apply_gravity(&mut self, dt: f32, frozen: bool, config: &Config) {
        let base_delay = if frozen {
            config.fall_start_delay * 1.5
        } else {
            config.fall_start_delay
        };
        for col in 0..self.columns {
            for row in (0..self.rows.saturating_sub(1)).rev() {
                let unsupported = self.is_empty(col, row + 1);
                let Some(panel) = self.get_mut(col, row) else {
                    continue;
                };
                if !panel.is_idle() {
                    continue;
                }
                if !unsupported {
                    panel.reset_fall_wait();
                    continue;
                }
                if panel.fall_wait <= 0.0 {
                    panel.fall_wait = base_delay;
                    panel.fall_delay_extended = false;
                } else if !panel.fall_delay_extended {
                    panel.fall_wait = base_delay * 2.0;
                    panel.fall_delay_extended = true;
                }
                panel.fall_wait -= dt;
                if panel.fall_wait <= 0.0 {
                    panel.set_state(PanelState::Falling);
                    panel.reset_fall_wait();
                }
            }
        }
        self.cascade_falling();
    }

    /// An idle panel directly above a falling one falls with it, no teeter.
    fn cascade_falling(&mut self) {
        for col in 0..self.columns {
            for row in 0..self.rows.saturating_sub(1) {
                if !self.get(col, row + 1).is_some_and(Panel::is_falling) {
                    continue;
                }
                if let Some(panel) = self.get_mut(col, row).filter(|p| p.is_idle()) {
                    panel.set_state(PanelState::Falling);
                    panel.reset_fall_wait();
                }
            }
        }
    }

    /// Move falling panels along their column. Each full cell of accumulated
    /// offset drops every falling panel in the column by one row, or lands it.
    pub fn advance_falls(&mut self, dt: f32, config: &Config) {
        let cell = config.cell_length;
        let speed = cell / config.fall_hold;
        for col in 0..self.columns {
            if self.column_has_falling(col) {
                self.fall_offsets[col] += speed * dt;
            } else {
                self.fall_offsets[col] = 0.0;
            }
            while self.fall_offsets[col] >= cell {
                self.drop_column_once(col);
                if !self.column_has_falling(col) {
                    self.fall_offsets[col] = 0.0;
                    break;
                }
                self.fall_offsets[col] -= cell;
            }
        }
    }

    fn drop_column_once(&mut self, col: usize) {
        for row in (0..self.rows).rev() {
            if !self.get(col, row).is_some_and(Panel::is_falling) {
                continue;
            }
            if row + 1 < self.rows && self.is_empty(col, row + 1) {
                let panel = self.take(col, row);
                self.set(col, row + 1, panel);
            } else if let Some(panel) = self.get_mut(col, row) {
                panel.set_state(PanelState::Idle);
            }
        }
    }

    fn column_has_falling(&self, col: usize) -> bool {
        (0..self.rows).any(|row| self.get(col, row).is_some_and(Panel::is_falling))
    }

    /// Vertical render offset of the panel at (col, row): the column's fall
    /// progress for an unblocked falling panel, otherwise 0.
    pub fn fall_offset(&self, col: usize, row: usize) -> f32 {
        if !self.get(col, row).is_some_and(Panel::is_falling) || self.is_blocked(col, row) {
            return 0.0;
        }
        self.fall_offsets.get(col).copied().unwrap_or(0.0)
    }

    fn is_blocked(&self, col: usize, row: usize) -> bool {
        row + 1 >= self.rows || !self.is_empty(col, row + 1)
    }

    /// Shift every row up by one: drop row 0 and append a bottom row of idle
    /// panels with the given colours. Returns the panels that were in row 0.
    pub fn shift_up(&mut self, colors: &[u8]) -> Vec<Panel> {
        let popped = self
            .cells
            .pop_front()
            .map(|row| row.into_iter().flatten().collect())
            .unwrap_or_default();
        let bottom = self.rows.saturating_sub(1);
        let new_row = (0..self.columns)
            .map(|col| {
                colors
                    .get(col)
                    .map(|&color| Panel::new(color, col, bottom))
            })
            .collect();
        self.cells.push_back(new_row);
        for (row, cells) in self.cells.iter_mut().enumerate() {
            for panel in cells.iter_mut().flatten() {
                panel.row = row;
            }
        }
        popped
    }
}
