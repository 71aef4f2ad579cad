//! Shared styling for ideamap's terminal output.
//!
//! Status lines (converged, skipped lookups, errors) and table cells take
//! their colours from one [`Theme`], so `NO_COLOR` and piped output are
//! handled in a single place.

use comfy_table::{Cell, Color};
use console::Style;
use owo_colors::OwoColorize;
use std::sync::LazyLock;

pub static THEME: LazyLock<Theme> = LazyLock::new(Theme::default);

/// Outcome a status line reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
    Error,
}

impl Tone {
    fn icon(self) -> &'static str {
        match self {
            Tone::Success => "✓",
            Tone::Warning => "⚠",
            Tone::Error => "✗",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    /// Section titles such as "Current Configuration:"
    pub header: Style,
    /// Recovery suggestions under an error
    pub dim: Style,
    /// Index and ideas file locations
    pub path: Style,
    /// Size cell of a cluster with no members
    pub empty_cluster: Color,
    /// Row of a centroid whose lookup failed and was skipped
    pub skipped_lookup: Color,
    /// Similarity scores at or above this are tinted `close_match`
    pub close_match_threshold: f32,
    pub close_match: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            success: Style::new().green().bright(),
            warning: Style::new().yellow().bright(),
            error: Style::new().red().bright(),
            header: Style::new().cyan().bold(),
            dim: Style::new().dim(),
            path: Style::new().magenta(),
            empty_cluster: Color::Yellow,
            skipped_lookup: Color::Red,
            close_match_threshold: 0.9,
            close_match: Color::Green,
        }
    }
}

impl Theme {
    /// Icon-prefixed status line, e.g. "✓ Converged after 4 iterations".
    pub fn status(&self, tone: Tone, text: &str) -> String {
        let icon = tone.icon();
        if Self::should_disable_colors() {
            return format!("{icon} {text}");
        }

        match tone {
            Tone::Success => format!("{} {}", icon.green(), self.success.apply_to(text)),
            Tone::Warning => format!("{} {}", icon.yellow(), self.warning.apply_to(text)),
            Tone::Error => format!("{} {}", icon.red(), self.error.apply_to(text)),
        }
    }

    /// Colors are off under `NO_COLOR` or when stdout is not a terminal.
    pub fn should_disable_colors() -> bool {
        use is_terminal::IsTerminal;
        std::env::var("NO_COLOR").is_ok() || !std::io::stdout().is_terminal()
    }

    /// Style `text` unless colors are disabled.
    pub fn apply<T: std::fmt::Display>(&self, style: &Style, text: T) -> String {
        if Self::should_disable_colors() {
            text.to_string()
        } else {
            style.apply_to(text).to_string()
        }
    }

    /// Set a table cell's foreground unless colors are disabled.
    pub fn tint(&self, cell: Cell, color: Color) -> Cell {
        if Self::should_disable_colors() {
            cell
        } else {
            cell.fg(color)
        }
    }

    /// Color for a similarity score cell, if it deserves one.
    pub fn similarity_color(&self, score: f32) -> Option<Color> {
        (score >= self.close_match_threshold).then_some(self.close_match)
    }
}
