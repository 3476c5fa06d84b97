//! Shared theme tokens and accessibility profile hooks for dashboard rendering.

#![allow(missing_docs)]

use std::env;

use ratatui::style::{Color, Modifier, Style};

use crate::store::LogLevel;

/// Contrast profile used by theme token selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContrastMode {
    Standard,
    High,
}

/// Color output mode for compatibility with `NO_COLOR` and terminal policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Enabled,
    Disabled,
}

/// Accessibility knobs consumed by the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessibilityProfile {
    pub contrast: ContrastMode,
    pub color: ColorMode,
}

impl Default for AccessibilityProfile {
    fn default() -> Self {
        Self {
            contrast: ContrastMode::Standard,
            color: ColorMode::Enabled,
        }
    }
}

impl AccessibilityProfile {
    #[must_use]
    pub const fn new(no_color: bool, high_contrast: bool) -> Self {
        Self {
            contrast: if high_contrast {
                ContrastMode::High
            } else {
                ContrastMode::Standard
            },
            color: if no_color {
                ColorMode::Disabled
            } else {
                ColorMode::Enabled
            },
        }
    }

    /// Honour `NO_COLOR`; contrast comes from configuration.
    #[must_use]
    pub fn from_environment(high_contrast: bool) -> Self {
        Self::new(env::var_os("NO_COLOR").is_some(), high_contrast)
    }

    #[must_use]
    pub const fn no_color(self) -> bool {
        matches!(self.color, ColorMode::Disabled)
    }
}

/// Semantic token category independent of concrete colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticToken {
    Accent,
    Warning,
    Danger,
    Muted,
    Neutral,
}

/// Render-facing palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub accent: Color,
    pub warning: Color,
    pub danger: Color,
    pub muted: Color,
    pub neutral: Color,
}

impl ThemePalette {
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            accent: Color::Cyan,
            warning: Color::Yellow,
            danger: Color::Red,
            muted: Color::DarkGray,
            neutral: Color::Reset,
        }
    }

    #[must_use]
    pub const fn high_contrast() -> Self {
        Self {
            accent: Color::LightCyan,
            warning: Color::LightYellow,
            danger: Color::LightRed,
            muted: Color::Gray,
            neutral: Color::White,
        }
    }

    #[must_use]
    pub const fn from_contrast(mode: ContrastMode) -> Self {
        match mode {
            ContrastMode::Standard => Self::standard(),
            ContrastMode::High => Self::high_contrast(),
        }
    }

    #[must_use]
    pub const fn color(self, token: SemanticToken) -> Color {
        match token {
            SemanticToken::Accent => self.accent,
            SemanticToken::Warning => self.warning,
            SemanticToken::Danger => self.danger,
            SemanticToken::Muted => self.muted,
            SemanticToken::Neutral => self.neutral,
        }
    }
}

/// Semantic token for a log level.
#[must_use]
pub const fn level_token(level: LogLevel) -> SemanticToken {
    match level {
        LogLevel::Info => SemanticToken::Neutral,
        LogLevel::Warning => SemanticToken::Warning,
        LogLevel::Error => SemanticToken::Danger,
    }
}

/// Full render theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub accessibility: AccessibilityProfile,
    pub palette: ThemePalette,
}

impl Theme {
    #[must_use]
    pub const fn new(accessibility: AccessibilityProfile) -> Self {
        Self {
            palette: ThemePalette::from_contrast(accessibility.contrast),
            accessibility,
        }
    }

    /// Foreground style for `token`; plain when color is disabled.
    #[must_use]
    pub fn fg(&self, token: SemanticToken) -> Style {
        if self.accessibility.no_color() {
            Style::default()
        } else {
            Style::default().fg(self.palette.color(token))
        }
    }

    #[must_use]
    pub fn level(&self, level: LogLevel) -> Style {
        let style = self.fg(level_token(level));
        if self.accessibility.no_color() && level == LogLevel::Error {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    /// List highlight: reversed video works with and without color.
    #[must_use]
    pub fn selection(&self) -> Style {
        self.fg(SemanticToken::Accent)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(AccessibilityProfile::default())
    }
}
