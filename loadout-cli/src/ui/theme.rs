//! UI Theme Module - Consistent color palette and style helpers
//!
//! Provides a centralized theme system for the Loadout TUI with:
//! - Palette tokens (not hard-coded colors)
//! - StyleKit helpers for common states
//! - VS Code-esque dark theme defaults

use ratatui::style::{Color, Modifier, Style};

use loadout_core::model::Rarity;

/// Color palette tokens for the theme
#[allow(dead_code)]
#[derive(Clone, Debug)]
pub struct Palette {
    /// Main background color
    pub bg: Color,
    /// Panel border color
    pub panel_border: Color,
    /// Primary text color
    pub text: Color,
    /// Dimmed text (secondary info)
    pub text_dim: Color,
    /// Muted text (tertiary info, disabled)
    pub text_muted: Color,
    /// Accent color (highlights, focus)
    pub accent: Color,
    /// Checked rows, passing states
    pub success: Color,
    /// Warnings, rare-tier items
    pub warn: Color,
    /// Error state
    pub error: Color,
    /// Info state (informational)
    pub info: Color,
    /// Selection background
    pub selection_bg: Color,
    /// Selection foreground
    pub selection_fg: Color,
    /// Key hint text
    pub key_hint: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}

impl Palette {
    /// VS Code-esque dark theme
    pub fn dark() -> Self {
        Self {
            bg: Color::Reset,
            panel_border: Color::Rgb(60, 60, 60),
            text: Color::Rgb(212, 212, 212),
            text_dim: Color::Rgb(150, 150, 150),
            text_muted: Color::Rgb(100, 100, 100),
            accent: Color::Rgb(79, 193, 255), // Light blue
            success: Color::Rgb(78, 201, 176), // Teal green
            warn: Color::Rgb(220, 180, 100),  // Amber
            error: Color::Rgb(244, 135, 113), // Coral red
            info: Color::Rgb(156, 220, 254),  // Light cyan
            selection_bg: Color::Rgb(38, 79, 120), // Dark blue
            selection_fg: Color::White,
            key_hint: Color::Rgb(206, 145, 120), // Soft orange
        }
    }
}

/// Theme configuration
#[derive(Clone, Debug)]
pub struct Theme {
    pub palette: Palette,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            palette: Palette::dark(),
        }
    }
}

#[allow(dead_code)]
impl Theme {
    // ========== StyleKit Helper Functions ==========

    /// Style for a checklist row's checked state
    pub fn checked_style(&self, checked: bool) -> Style {
        if checked {
            Style::default()
                .fg(self.palette.text_muted)
                .add_modifier(Modifier::CROSSED_OUT)
        } else {
            Style::default().fg(self.palette.text)
        }
    }

    /// Checkbox glyph for a row
    pub fn check_icon(&self, checked: bool) -> &'static str {
        if checked { "[x]" } else { "[ ]" }
    }

    /// Style for a rarity tier badge
    pub fn rarity_style(&self, rarity: &Rarity) -> Style {
        match rarity {
            Rarity::Common => Style::default().fg(Color::Rgb(205, 127, 50)),
            Rarity::Uncommon => Style::default().fg(Color::Rgb(192, 192, 192)),
            Rarity::Rare => Style::default().fg(self.palette.warn),
            Rarity::Legendary => Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Style for tab/view labels
    pub fn tab_style(&self, active: bool) -> Style {
        if active {
            Style::default()
                .fg(self.palette.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.palette.text_dim)
        }
    }

    /// Style for key hints in footer
    pub fn key_hint_style(&self) -> Style {
        Style::default().fg(self.palette.key_hint)
    }

    /// Style for subtle borders
    pub fn subtle_border_style(&self) -> Style {
        Style::default().fg(self.palette.panel_border)
    }

    /// Style for focused borders
    pub fn focused_border_style(&self) -> Style {
        Style::default().fg(self.palette.accent)
    }

    /// Style for selected items
    pub fn selection_style(&self) -> Style {
        Style::default()
            .bg(self.palette.selection_bg)
            .fg(self.palette.selection_fg)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for primary text
    pub fn text_style(&self) -> Style {
        Style::default().fg(self.palette.text)
    }

    /// Style for dimmed text
    pub fn text_dim_style(&self) -> Style {
        Style::default().fg(self.palette.text_dim)
    }

    /// Style for muted text
    pub fn text_muted_style(&self) -> Style {
        Style::default().fg(self.palette.text_muted)
    }

    /// Style for accent text
    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.palette.accent)
    }

    /// Style for success text
    pub fn success_style(&self) -> Style {
        Style::default().fg(self.palette.success)
    }

    /// Style for warning text
    pub fn warn_style(&self) -> Style {
        Style::default().fg(self.palette.warn)
    }

    /// Style for error text
    pub fn error_style(&self) -> Style {
        Style::default().fg(self.palette.error)
    }

    /// Style for info text
    pub fn info_style(&self) -> Style {
        Style::default().fg(self.palette.info)
    }

    /// Style for title text
    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.palette.text)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for section headers
    pub fn section_header_style(&self) -> Style {
        Style::default()
            .fg(self.palette.accent)
            .add_modifier(Modifier::BOLD)
    }
}

/// Global theme instance - can be made configurable later
static DEFAULT_THEME: std::sync::OnceLock<Theme> = std::sync::OnceLock::new();

/// Get the default theme
pub fn theme() -> &'static Theme {
    DEFAULT_THEME.get_or_init(Theme::default)
}

/// Convenience re-exports for common use cases
#[allow(dead_code)]
pub mod styles {
    use super::*;

    pub fn checked(checked: bool) -> Style {
        theme().checked_style(checked)
    }

    pub fn check_icon(checked: bool) -> &'static str {
        theme().check_icon(checked)
    }

    pub fn rarity(rarity: &Rarity) -> Style {
        theme().rarity_style(rarity)
    }

    pub fn tab(active: bool) -> Style {
        theme().tab_style(active)
    }

    pub fn key_hint() -> Style {
        theme().key_hint_style()
    }

    pub fn border_subtle() -> Style {
        theme().subtle_border_style()
    }

    pub fn border_focused() -> Style {
        theme().focused_border_style()
    }

    pub fn selection() -> Style {
        theme().selection_style()
    }

    pub fn text() -> Style {
        theme().text_style()
    }

    pub fn text_dim() -> Style {
        theme().text_dim_style()
    }

    pub fn text_muted() -> Style {
        theme().text_muted_style()
    }

    pub fn accent() -> Style {
        theme().accent_style()
    }

    pub fn success() -> Style {
        theme().success_style()
    }

    pub fn warn() -> Style {
        theme().warn_style()
    }

    pub fn error() -> Style {
        theme().error_style()
    }

    pub fn info() -> Style {
        theme().info_style()
    }

    pub fn title() -> Style {
        theme().title_style()
    }

    pub fn section_header() -> Style {
        theme().section_header_style()
    }
}
