//! Simulation core of a Panel-de-Pon style puzzle: a grid of coloured panels
//! that rises from below, horizontal swaps under a two-cell cursor, gravity,
//! run-of-three matching with staggered clears, chain freezes and a top-row
//! game-over timer.
//!
//! The core has no rendering or input. A frontend calls [`Board::update`]
//! once per frame, forwards swaps, and reads [`Board::panels`] and
//! [`Board::drain_cues`] to draw and play sounds.

pub mod board;
pub mod config;
pub mod cue;
pub mod cursor;
pub mod difficulty;
pub mod grid;
pub mod matcher;
pub mod panel;
pub mod rise;

pub use board::{Board, MatchPhase, PanelView};
pub use config::{Config, ConfigError};
pub use cue::Cue;
pub use cursor::Cursor;
pub use difficulty::{DifficultyRamp, Tunables};
pub use panel::{Panel, PanelState};
