// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nestnote-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nestnote and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;

use ratatui::style::{Color, Style};
use thiserror::Error;

use crate::view::StyleClass;

/// Optional palette override: `fg,bg,header,collapsed,odd`.
pub const PALETTE_ENV: &str = "NESTNOTE_PALETTE";

#[derive(Debug, Clone, Default)]
pub struct TuiTheme {
    palette: Option<TuiPalette>,
}

impl TuiTheme {
    pub fn from_env() -> Result<Self, ThemeError> {
        let palette = palette_override_from_env()?;
        Ok(Self { palette })
    }

    pub fn from_palette(value: &str) -> Result<Self, ThemeError> {
        let palette = TuiPalette::parse_csv(value.trim()).map_err(|error| ThemeError::InvalidEnv {
            name: PALETTE_ENV.to_owned(),
            value: format!("{value} ({error})"),
        })?;
        Ok(Self {
            palette: Some(palette),
        })
    }

    pub fn base_style(&self) -> Style {
        match &self.palette {
            Some(palette) => Style::default().fg(palette.fg).bg(palette.bg),
            None => Style::default(),
        }
    }

    fn header_color(&self) -> Color {
        self.palette.as_ref().map_or(Color::Red, |palette| palette.header)
    }

    fn collapsed_color(&self) -> Color {
        self.palette.as_ref().map_or(Color::Red, |palette| palette.collapsed)
    }

    fn odd_color(&self) -> Color {
        self.palette.as_ref().map_or(Color::Cyan, |palette| palette.odd)
    }

    pub fn style_for(&self, class: StyleClass) -> Style {
        match class {
            StyleClass::Even => self.base_style(),
            StyleClass::Odd => self.base_style().fg(self.odd_color()),
            StyleClass::Header => self.base_style().fg(self.header_color()),
            StyleClass::CollapsedHeader => {
                let fg = self.palette.as_ref().map_or(Color::White, |palette| palette.fg);
                self.base_style().fg(fg).bg(self.collapsed_color())
            }
        }
    }

    /// Style of the one-line banner under the outline.
    pub fn banner_style(&self) -> Style {
        self.base_style().fg(self.odd_color())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TuiPalette {
    fg: Color,
    bg: Color,
    header: Color,
    collapsed: Color,
    odd: Color,
}

impl TuiPalette {
    const CSV_LEN: usize = 5;

    fn parse_csv(value: &str) -> Result<Self, String> {
        let parts: Vec<&str> = value.split(',').map(|part| part.trim()).collect();
        if parts.len() != Self::CSV_LEN {
            return Err(format!(
                "expected {} comma-separated colors (fg,bg,header,collapsed,odd), got {}",
                Self::CSV_LEN,
                parts.len()
            ));
        }

        Ok(Self {
            fg: parse_palette_color(parts[0])?,
            bg: parse_palette_color(parts[1])?,
            header: parse_palette_color(parts[2])?,
            collapsed: parse_palette_color(parts[3])?,
            odd: parse_palette_color(parts[4])?,
        })
    }
}

fn palette_override_from_env() -> Result<Option<TuiPalette>, ThemeError> {
    let value = match env::var(PALETTE_ENV) {
        Ok(value) => value,
        Err(env::VarError::NotPresent) => return Ok(None),
        Err(env::VarError::NotUnicode(_)) => {
            return Err(ThemeError::InvalidEnv {
                name: PALETTE_ENV.to_owned(),
                value: "<non-unicode>".to_owned(),
            });
        }
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let parsed = TuiPalette::parse_csv(trimmed).map_err(|error| ThemeError::InvalidEnv {
        name: PALETTE_ENV.to_owned(),
        value: format!("{trimmed} ({error})"),
    })?;
    Ok(Some(parsed))
}

fn parse_palette_color(value: &str) -> Result<Color, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("empty color".to_owned());
    }

    let lower = trimmed.to_ascii_lowercase();
    if let Some(rest) = lower.strip_prefix("rgb:") {
        let parts: Vec<&str> = rest.split('/').collect();
        if parts.len() != 3 {
            return Err(format!("invalid rgb: value: {trimmed}"));
        }
        let r = parse_hex_channel(parts[0])?;
        let g = parse_hex_channel(parts[1])?;
        let b = parse_hex_channel(parts[2])?;
        return Ok(Color::Rgb(r, g, b));
    }

    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if hex.len() != 6 || !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(format!("invalid hex color: {trimmed} (expected #RRGGBB)"));
    }
    let rgb = u32::from_str_radix(hex, 16).map_err(|_| format!("invalid hex color: {trimmed}"))?;
    let [_, r, g, b] = rgb.to_be_bytes();
    Ok(Color::Rgb(r, g, b))
}

/// Two hex digits, or four of which the high byte counts.
fn parse_hex_channel(value: &str) -> Result<u8, String> {
    let value = value.trim();
    match value.len() {
        2 => u8::from_str_radix(value, 16).map_err(|_| format!("invalid rgb: component {value}")),
        4 => u16::from_str_radix(value, 16)
            .map(|parsed| (parsed >> 8) as u8)
            .map_err(|_| format!("invalid rgb: component {value}")),
        _ => Err(format!(
            "invalid rgb: component {value} (expected 2 or 4 hex digits)"
        )),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThemeError {
    #[error("invalid env {name}={value}")]
    InvalidEnv { name: String, value: String },
}
