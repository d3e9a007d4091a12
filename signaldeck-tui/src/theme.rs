//! Theme tokens for the SignalDeck TUI.
//!
//! Two palettes share one set of roles:
//! - **Accent**: focus, highlights, section titles
//! - **Positive**: bullish trend, buy action
//! - **Negative**: bearish trend, sell action, errors
//! - **Warning**: wait action, medium confidence, alerts
//! - **Neutral**: neutral trend, secondary info
//! - **Muted**: labels, disabled text

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};
use signaldeck_core::{Action, ConfidenceLevel, Trend};

/// Persisted display preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn toggle(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ThemeMode::Dark => "dark",
            ThemeMode::Light => "light",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub accent: Color,
    pub positive: Color,
    pub negative: Color,
    pub warning: Color,
    pub neutral: Color,
    pub muted: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Dark => Self::dark(),
            ThemeMode::Light => Self::light(),
        }
    }

    /// Neon accents on a near-black background.
    pub fn dark() -> Self {
        Self {
            background: Color::Rgb(18, 18, 20),
            accent: Color::Rgb(0, 255, 255),
            positive: Color::Rgb(0, 255, 128),
            negative: Color::Rgb(255, 20, 147),
            warning: Color::Rgb(255, 140, 0),
            neutral: Color::Rgb(147, 112, 219),
            muted: Color::Rgb(100, 149, 237),
            text_primary: Color::White,
            text_secondary: Color::Rgb(170, 170, 170),
        }
    }

    /// Saturated mid-tones that stay readable on a white background.
    pub fn light() -> Self {
        Self {
            background: Color::Rgb(250, 250, 247),
            accent: Color::Rgb(0, 110, 140),
            positive: Color::Rgb(0, 135, 60),
            negative: Color::Rgb(190, 20, 70),
            warning: Color::Rgb(185, 95, 0),
            neutral: Color::Rgb(100, 70, 170),
            muted: Color::Rgb(90, 100, 120),
            text_primary: Color::Rgb(20, 20, 24),
            text_secondary: Color::Rgb(80, 80, 80),
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.text_primary).bg(self.background)
    }

    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn accent_bold(&self) -> Style {
        self.accent_style().add_modifier(Modifier::BOLD)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn text_style(&self) -> Style {
        Style::default().fg(self.text_primary)
    }

    pub fn warning_style(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn negative_style(&self) -> Style {
        Style::default().fg(self.negative)
    }

    pub fn panel_border(&self, focused: bool) -> Style {
        if focused {
            self.accent_style()
        } else {
            self.muted_style()
        }
    }

    pub fn trend_color(&self, trend: Trend) -> Color {
        match trend {
            Trend::Bullish => self.positive,
            Trend::Bearish => self.negative,
            Trend::Neutral => self.neutral,
        }
    }

    pub fn action_color(&self, action: Action) -> Color {
        match action {
            Action::Buy => self.positive,
            Action::Sell => self.negative,
            Action::Wait => self.warning,
        }
    }

    pub fn confidence_color(&self, level: ConfidenceLevel) -> Color {
        match level {
            ConfidenceLevel::High => self.positive,
            ConfidenceLevel::Medium => self.warning,
            ConfidenceLevel::Low => self.muted,
        }
    }

    /// `Some(true)` present, `Some(false)` absent, `None` unknown.
    pub fn availability_color(&self, available: Option<bool>) -> Color {
        match available {
            Some(true) => self.positive,
            Some(false) => self.negative,
            None => self.muted,
        }
    }
}
