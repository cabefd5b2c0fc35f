//! panelrise: Panel-de-Pon style rising-stack puzzle in the terminal.

mod app;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use panelrise::Config;

fn main() -> Result<()> {
    let args = Args::parse();
    let (theme, notice) = load_theme(&args);
    let config = args.board_config();
    config.validate().context("invalid board configuration")?;
    let mut app = App::new(&args, config, theme)?;
    if let Some(notice) = notice {
        app.show_notice(notice);
    }
    app.run()?;
    Ok(())
}

/// Theme from `--theme`, or One Dark with a notice for the sidebar when the
/// file cannot be read or parsed.
fn load_theme(args: &Args) -> (theme::Theme, Option<String>) {
    match theme::Theme::load(args.theme.as_deref(), args.palette) {
        Ok(theme) => (theme, None),
        Err(err) => {
            log::warn!("theme not loaded ({err}), using One Dark");
            let mut theme = theme::Theme::default();
            theme.apply_palette(args.palette);
            (theme, Some("Theme not loaded".to_string()))
        }
    }
}

/// Panel-de-Pon style puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "panelrise",
    version,
    about = "Rising-stack swap puzzle in the terminal. Line up three or more panels of a kind to clear them.",
    long_about = "panelrise is a terminal puzzle in the style of Panel de Pon / Tetris Attack.\n\n\
        The stack rises from below. Swap two horizontally adjacent panels under the cursor to line \
        up three or more of the same symbol in a row or column. Cleared panels let the ones above \
        fall. The game ends when the stack stays at the top for three seconds.\n\n\
        CONTROLS:\n  Arrows / WASD / hjkl  Move cursor   Space / Enter  Swap\n  f or Shift (hold)     Raise stack   p              Pause\n  r                     Restart       q / Esc        Quit\n\n\
        Use --theme to load a btop-style theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Play with five panel kinds instead of four.
    #[arg(long)]
    pub fifth_symbol: bool,

    /// Keep gravity running during a chain freeze (with a longer teeter).
    #[arg(long)]
    pub freeze_gravity: bool,

    /// RNG seed; the same seed replays the same stack. Random if not set.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Target frames per second.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Longest simulated step per frame in seconds, so a stalled terminal cannot skip ahead.
    #[arg(long, default_value = "0.1", value_name = "SECS")]
    pub max_dt: f32,
}

impl Args {
    pub fn board_config(&self) -> Config {
        let base = if self.fifth_symbol {
            Config::with_fifth_symbol()
        } else {
            Config::default()
        };
        Config {
            gravity_during_freeze: self.freeze_gravity,
            ..base
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["panelrise"]);
        assert_eq!(args.board_config(), Config::default());
        assert_eq!(args.palette, Palette::Normal);
        assert!(args.seed.is_none());
    }

    #[test]
    fn test_fifth_symbol_and_freeze_gravity() {
        let args = Args::parse_from([
            "panelrise",
            "--fifth-symbol",
            "--freeze-gravity",
            "--palette",
            "contrast",
            "--seed",
            "42",
        ]);
        let config = args.board_config();
        assert_eq!(config.color_count, 5);
        assert!(config.gravity_during_freeze);
        assert_eq!(args.palette, Palette::HighContrast);
        assert_eq!(args.seed, Some(42));
    }

    #[test]
    fn test_unreadable_theme_falls_back_with_notice() {
        let args = Args::parse_from([
            "panelrise",
            "--theme",
            "/nonexistent/panelrise/missing.theme",
            "--palette",
            "colorblind",
        ]);
        let (theme, notice) = load_theme(&args);
        let mut expected = theme::Theme::default();
        expected.apply_palette(Palette::Colorblind);
        assert_eq!(theme, expected);
        assert_eq!(notice.as_deref(), Some("Theme not loaded"));
    }

    #[test]
    fn test_default_theme_has_no_notice() {
        let args = Args::parse_from(["panelrise"]);
        let (theme, notice) = load_theme(&args);
        assert_eq!(theme, theme::Theme::default());
        assert!(notice.is_none());
    }
}
