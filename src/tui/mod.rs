// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nestnote-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nestnote and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal UI.
//!
//! Adapts the editor to a real terminal (ratatui + crossterm): translates key events, draws the
//! visible window through [`FrameCanvas`], and carries out the [`Effect`] of every command.

use std::io;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{buffer::Buffer, layout::Position, prelude::*};
use thiserror::Error;

use crate::commands::{default_commands, dispatch, Command, Effect, Key};
use crate::editor::Editor;
use crate::logging::targets;
use crate::store::OutlineFile;
use crate::view::{Canvas, StyleClass};

pub mod theme;

pub use theme::{ThemeError, TuiTheme};

const WELCOME: &str = "Ctrl-W save | Esc quit | Ctrl-K fold | Tab indent/new field";

#[derive(Debug, Error)]
pub enum TuiError {
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Theme(#[from] ThemeError),
}

/// Runs the editor on the terminal until the user quits.
pub fn run(editor: Editor, file: OutlineFile) -> Result<(), TuiError> {
    let theme = TuiTheme::from_env()?;
    let mut terminal = TerminalSession::new()?;
    let mut app = App::new(editor, file, theme);
    tracing::debug!(target: targets::TUI, path = ?app.file.path(), "editor started");

    while !app.should_quit() {
        terminal.draw(|frame| app.draw(frame))?;

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if app.handle_key(map_key(key)) == Effect::Bell {
                    terminal.bell()?;
                }
            }
            _ => {}
        }
    }

    tracing::debug!(target: targets::TUI, "editor stopped");
    Ok(())
}

/// Translates a crossterm key event into an editor [`Key`].
pub fn map_key(event: KeyEvent) -> Key {
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    let alt = event.modifiers.contains(KeyModifiers::ALT);
    match event.code {
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Tab if event.modifiers.contains(KeyModifiers::SHIFT) => Key::BackTab,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Left if ctrl => Key::CtrlLeft,
        KeyCode::Left => Key::Left,
        KeyCode::Right if ctrl => Key::CtrlRight,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Esc => Key::Esc,
        KeyCode::Char(ch) if ctrl => match ch.to_ascii_lowercase() {
            'k' => Key::CtrlK,
            'w' => Key::CtrlW,
            _ => Key::Other,
        },
        KeyCode::Char(_) if alt => Key::Other,
        KeyCode::Char(ch) => Key::Char(ch),
        _ => Key::Other,
    }
}

/// Message shown on the bottom row until the next redraw.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Banner {
    message: Option<String>,
}

impl Banner {
    pub fn set(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn has_message(&self) -> bool {
        self.message.is_some()
    }

    pub fn take(&mut self) -> Option<String> {
        self.message.take()
    }
}

pub struct App {
    editor: Editor,
    file: OutlineFile,
    theme: TuiTheme,
    commands: Vec<Command>,
    banner: Banner,
    should_quit: bool,
}

impl App {
    pub fn new(editor: Editor, file: OutlineFile, theme: TuiTheme) -> Self {
        let mut banner = Banner::default();
        banner.set(WELCOME);
        Self {
            editor,
            file,
            theme,
            commands: default_commands(),
            banner,
            should_quit: false,
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn banner(&self) -> &Banner {
        &self.banner
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Dispatches `key` and performs its effect. Returns [`Effect::Bell`] when the terminal
    /// should ring.
    pub fn handle_key(&mut self, key: Key) -> Effect {
        let effect = match dispatch(&self.commands, key, &mut self.editor) {
            Ok(effect) => effect,
            Err(err) => {
                tracing::warn!(target: targets::TUI, ?key, %err, "command failed");
                Effect::Bell
            }
        };

        match effect {
            Effect::Save => self.save(),
            Effect::Quit => self.should_quit = true,
            Effect::None | Effect::Bell => {}
        }
        effect
    }

    fn save(&mut self) {
        match self.file.save(self.editor.outline()) {
            Ok(()) => self.banner.set(format!("saved {}", self.file.path().display())),
            Err(err) => {
                tracing::warn!(target: targets::TUI, %err, "save failed");
                self.banner.set(format!("save failed: {err}"));
            }
        }
    }

    /// Lays out the outline above a one-row banner.
    pub fn draw(&mut self, frame: &mut Frame<'_>) {
        let area = frame.area();
        let outline_area = Rect {
            height: area.height.saturating_sub(1),
            ..area
        };
        let banner_y = area.y + outline_area.height;

        if let Err(err) = self
            .editor
            .set_viewport(usize::from(outline_area.height), usize::from(area.width))
        {
            tracing::warn!(target: targets::TUI, %err, "viewport update failed");
        }

        let buffer = frame.buffer_mut();
        buffer.set_style(area, self.theme.base_style());
        let mut canvas = FrameCanvas::new(buffer, outline_area, &self.theme);
        let cursor = match self.editor.render(&mut canvas) {
            Ok(cursor) => Some(cursor),
            Err(err) => {
                tracing::warn!(target: targets::TUI, %err, "render failed");
                None
            }
        };

        // A message waits until the terminal has a row to show it in.
        if self.banner.has_message() && outline_area.height < area.height {
            if let Some(message) = self.banner.take() {
                buffer.set_stringn(
                    area.x,
                    banner_y,
                    message,
                    usize::from(area.width),
                    self.theme.banner_style(),
                );
            }
        }

        if let Some((y, x)) = cursor {
            frame.set_cursor_position(cell_position(outline_area, y, x));
        }
    }
}

fn cell_position(area: Rect, y: usize, x: usize) -> Position {
    let clamp = |value: usize, len: u16| {
        u16::try_from(value)
            .unwrap_or(u16::MAX)
            .min(len.saturating_sub(1))
    };
    Position::new(
        area.x + clamp(x, area.width),
        area.y + clamp(y, area.height),
    )
}

/// [`Canvas`] over a region of a ratatui buffer.
pub struct FrameCanvas<'a> {
    buffer: &'a mut Buffer,
    area: Rect,
    theme: &'a TuiTheme,
}

impl<'a> FrameCanvas<'a> {
    pub fn new(buffer: &'a mut Buffer, area: Rect, theme: &'a TuiTheme) -> Self {
        let area = area.intersection(buffer.area);
        Self {
            buffer,
            area,
            theme,
        }
    }
}

impl Canvas for FrameCanvas<'_> {
    fn size(&self) -> (usize, usize) {
        (usize::from(self.area.height), usize::from(self.area.width))
    }

    fn put_str(&mut self, row: usize, col: usize, text: &str, style: StyleClass) {
        let (rows, cols) = self.size();
        if row >= rows || col >= cols {
            return;
        }
        // Both fit in u16 after the bounds check above.
        let x = self.area.x + col as u16;
        let y = self.area.y + row as u16;
        self.buffer
            .set_stringn(x, y, text, cols - col, self.theme.style_for(style));
    }
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|err| {
            teardown_terminal();
            err
        })?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(|err| {
            teardown_terminal();
            err
        })?;
        terminal.clear().map_err(|err| {
            teardown_terminal();
            err
        })?;

        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }

    fn bell(&mut self) -> io::Result<()> {
        execute!(self.terminal.backend_mut(), Print('\x07'))
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen);
}
