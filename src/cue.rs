//! Discrete events for the audio/presentation side. The board only records them.

/// One logical occurrence; each is emitted exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// A swap was accepted.
    SwapInitiated,
    /// A confirmed match of at least the large-match size.
    ChainTriggered { size: usize },
    /// A clearing panel started vanishing; `variant` picks the pitch (0 = lowest).
    PanelVanish { variant: u8 },
    /// The top row stayed occupied for the game-over hold.
    GameOver,
}
