//! Console theme.
//!
//! A low-contrast dark palette tuned for long press-side shifts, with warm
//! severity accents that match the physical tower light colors.

#![allow(dead_code)]

use ratatui::style::Color;

use crate::models::{MachineStatus, Severity};

pub mod colors {
    use super::Color;

    // === Background ===
    /// Primary background
    pub const BG_DARK: Color = Color::Rgb(0x16, 0x17, 0x1A);
    /// Slightly lighter background for panels
    pub const BG_MEDIUM: Color = Color::Rgb(0x1C, 0x1E, 0x22);
    /// Background for highlighted/selected rows
    pub const BG_HIGHLIGHT: Color = Color::Rgb(0x2A, 0x2D, 0x33);
    /// Simulated paper surface behind the roll
    pub const PAPER_BG: Color = Color::Rgb(0x20, 0x22, 0x26);

    // === Foreground ===
    pub const FG_PRIMARY: Color = Color::Rgb(0xC9, 0xCC, 0xD1);
    pub const FG_DIM: Color = Color::Rgb(0x6E, 0x73, 0x7B);
    pub const FG_HINT: Color = Color::Rgb(0x4C, 0x50, 0x57);

    // === Accents ===
    pub const RED: Color = Color::Rgb(0xD4, 0x6A, 0x6A);
    pub const ORANGE: Color = Color::Rgb(0xD0, 0x8B, 0x5B);
    pub const YELLOW: Color = Color::Rgb(0xC9, 0xB4, 0x7C);
    pub const GREEN: Color = Color::Rgb(0x87, 0xA9, 0x87);
    pub const BLUE: Color = Color::Rgb(0x7F, 0xA6, 0xC4);
    pub const PURPLE: Color = Color::Rgb(0x9B, 0x87, 0xBE);

    // === Borders ===
    pub const BORDER: Color = Color::Rgb(0x6E, 0x73, 0x7B);
    pub const BORDER_DIM: Color = Color::Rgb(0x36, 0x39, 0x3F);
    pub const BORDER_ACCENT: Color = BLUE;

    // === Severity (tower light colors) ===
    pub const SEVERITY_CRITICAL: Color = Color::Rgb(0xE5, 0x3E, 0x3E);
    pub const SEVERITY_HIGH: Color = Color::Rgb(0xD4, 0x6A, 0x6A);
    pub const SEVERITY_MEDIUM: Color = Color::Rgb(0xDD, 0x6B, 0x20);
    pub const SEVERITY_LOW: Color = Color::Rgb(0x63, 0x98, 0xC9);

    // === Roll surface ===
    /// Plain print nest fill
    pub const NEST: Color = Color::Rgb(0x33, 0x37, 0x3E);
    /// Nest promoted under a defect
    pub const NEST_FLAGGED: Color = Color::Rgb(0x52, 0x46, 0x3A);
    /// Dismissed defect markers
    pub const MARKER_DISMISSED: Color = Color::Rgb(0x55, 0x58, 0x5E);
    /// Current-view indicator on the timeline rail
    pub const RAIL_INDICATOR: Color = BLUE;

    // === Machine header ===
    pub const MACHINE_BG: Color = Color::Rgb(0x24, 0x28, 0x30);
    pub const MACHINE_BRAND: Color = Color::Rgb(0x43, 0x49, 0x54);
    pub const MACHINE_LIP: Color = Color::Rgb(0x0C, 0x0D, 0x0F);
}

/// Marker color for a severity
pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Critical => colors::SEVERITY_CRITICAL,
        Severity::High => colors::SEVERITY_HIGH,
        Severity::Medium => colors::SEVERITY_MEDIUM,
        Severity::Low => colors::SEVERITY_LOW,
    }
}

/// Status dot color for a machine on the floor
pub fn machine_status_color(status: MachineStatus) -> Color {
    match status {
        MachineStatus::Running => colors::GREEN,
        MachineStatus::Paused => colors::YELLOW,
        MachineStatus::Error => colors::SEVERITY_CRITICAL,
        MachineStatus::Idle => colors::FG_DIM,
    }
}

/// Semantic styling helpers
pub mod styles {
    use super::colors;
    use ratatui::style::{Modifier, Style};

    pub fn text() -> Style {
        Style::default().fg(colors::FG_PRIMARY)
    }

    pub fn text_dim() -> Style {
        Style::default().fg(colors::FG_DIM)
    }

    pub fn text_hint() -> Style {
        Style::default().fg(colors::FG_HINT)
    }

    pub fn success() -> Style {
        Style::default().fg(colors::GREEN)
    }

    pub fn error() -> Style {
        Style::default().fg(colors::RED)
    }

    pub fn warning() -> Style {
        Style::default().fg(colors::YELLOW)
    }

    pub fn info() -> Style {
        Style::default().fg(colors::BLUE)
    }

    pub fn selected() -> Style {
        Style::default()
            .fg(colors::BG_DARK)
            .bg(colors::BLUE)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border() -> Style {
        Style::default().fg(colors::BORDER)
    }

    pub fn border_dim() -> Style {
        Style::default().fg(colors::BORDER_DIM)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(colors::BORDER_ACCENT)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(colors::FG_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title_accent() -> Style {
        Style::default()
            .fg(colors::BLUE)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab_active() -> Style {
        Style::default()
            .fg(colors::BLUE)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab_inactive() -> Style {
        Style::default().fg(colors::FG_DIM)
    }

    pub fn form_label() -> Style {
        Style::default().fg(colors::FG_DIM)
    }

    pub fn form_input() -> Style {
        Style::default()
            .fg(colors::FG_PRIMARY)
            .bg(colors::BG_MEDIUM)
    }

    pub fn form_input_focused() -> Style {
        Style::default()
            .fg(colors::FG_PRIMARY)
            .bg(colors::BG_HIGHLIGHT)
    }

    pub fn button() -> Style {
        Style::default()
            .fg(colors::FG_PRIMARY)
            .bg(colors::BG_MEDIUM)
    }

    pub fn button_focused() -> Style {
        Style::default()
            .fg(colors::BG_DARK)
            .bg(colors::BLUE)
            .add_modifier(Modifier::BOLD)
    }

    pub fn button_danger() -> Style {
        Style::default()
            .fg(colors::BG_DARK)
            .bg(colors::RED)
            .add_modifier(Modifier::BOLD)
    }
}
