// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nestnote-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nestnote and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Key dispatch.
//!
//! Commands form an ordered list of `(applies, run)` pairs. [`dispatch`] runs the first command
//! whose predicate holds for the key and the editor state; when none applies the key is answered
//! with [`Effect::Bell`] and the document is left untouched.

use crate::editor::{EditError, Editor};
use crate::logging::targets;
use crate::model::row::text_width;
use crate::model::{Lateral, Vertical};

/// Keys the editor understands, independent of the terminal backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Backspace,
    Delete,
    Tab,
    BackTab,
    PageUp,
    PageDown,
    Home,
    End,
    Left,
    Right,
    Up,
    Down,
    CtrlLeft,
    CtrlRight,
    CtrlK,
    CtrlW,
    Esc,
    Char(char),
    Other,
}

/// What the caller has to do after a key was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Effect {
    #[default]
    None,
    Save,
    Quit,
    Bell,
}

pub type Applies = fn(Key, &Editor) -> Result<bool, EditError>;
pub type Run = fn(Key, &mut Editor) -> Result<Effect, EditError>;

#[derive(Debug, Clone, Copy)]
pub struct Command {
    pub name: &'static str,
    pub applies: Applies,
    pub run: Run,
}

impl Command {
    pub fn new(name: &'static str, applies: Applies, run: Run) -> Self {
        Self { name, applies, run }
    }
}

/// Runs the first applicable command.
pub fn dispatch(commands: &[Command], key: Key, editor: &mut Editor) -> Result<Effect, EditError> {
    for command in commands {
        if (command.applies)(key, editor)? {
            tracing::trace!(target: targets::EDITOR, command = command.name, ?key, "dispatch");
            return (command.run)(key, editor);
        }
    }
    tracing::debug!(target: targets::EDITOR, ?key, "no command applies");
    Ok(Effect::Bell)
}

pub fn default_commands() -> Vec<Command> {
    vec![
        Command::new("expand", expand_applies, toggle_collapsed),
        Command::new("toggle-collapse", toggle_applies, toggle_collapsed),
        Command::new("new-line", |key, _| Ok(key == Key::Enter), new_line),
        Command::new("join-lines", join_lines_applies, join_lines),
        Command::new("indent", indent_applies, indent),
        Command::new("split-field", split_field_applies, split_field),
        Command::new("unindent", unindent_applies, unindent),
        Command::new("join-field-left", join_left_applies, join_left),
        Command::new("join-field-right", join_right_applies, join_right),
        Command::new("insert", insert_applies, insert),
        Command::new("backspace", backspace_applies, backspace),
        Command::new("delete", delete_applies, delete),
        Command::new("page", page_applies, page),
        Command::new("line-end", line_end_applies, line_end),
        Command::new("move", move_applies, move_cursor),
        Command::new("field-jump", field_jump_applies, field_jump),
        Command::new("save", |key, _| Ok(key == Key::CtrlW), |_, _| Ok(Effect::Save)),
        Command::new("quit", |key, _| Ok(key == Key::Esc), |_, _| Ok(Effect::Quit)),
        Command::new("bell", |_, _| Ok(true), |_, _| Ok(Effect::Bell)),
    ]
}

fn done(result: Result<(), EditError>) -> Result<Effect, EditError> {
    result.map(|()| Effect::None)
}

fn expand_applies(key: Key, editor: &Editor) -> Result<bool, EditError> {
    Ok(key == Key::Enter && editor.collapsed()?)
}

fn toggle_applies(key: Key, editor: &Editor) -> Result<bool, EditError> {
    Ok(key == Key::CtrlK && editor.current_node_has_child()?)
}

fn toggle_collapsed(_: Key, editor: &mut Editor) -> Result<Effect, EditError> {
    editor.toggle_current_node_collapsed()?;
    Ok(Effect::None)
}

fn new_line(_: Key, editor: &mut Editor) -> Result<Effect, EditError> {
    done(editor.split_node())
}

fn join_lines_applies(key: Key, editor: &Editor) -> Result<bool, EditError> {
    Ok(key == Key::Backspace
        && editor.level()? == 0
        && editor.at_line_start()?
        && !editor.at_root()?)
}

fn join_lines(_: Key, editor: &mut Editor) -> Result<Effect, EditError> {
    done(editor.combine_nodes())
}

fn indent_applies(key: Key, editor: &Editor) -> Result<bool, EditError> {
    Ok(key == Key::Tab
        && editor.at_line_start()?
        && !editor.is_first_child()?
        && editor.previous_sibling()?.is_some())
}

fn indent(_: Key, editor: &mut Editor) -> Result<Effect, EditError> {
    done(editor.indent_current_node())
}

fn split_field_applies(key: Key, editor: &Editor) -> Result<bool, EditError> {
    Ok(key == Key::Tab && !editor.at_line_start()?)
}

fn split_field(_: Key, editor: &mut Editor) -> Result<Effect, EditError> {
    done(editor.split_field())
}

fn unindent_applies(key: Key, editor: &Editor) -> Result<bool, EditError> {
    let wanted = match key {
        Key::BackTab => true,
        Key::Backspace => editor.at_line_start()?,
        _ => false,
    };
    Ok(wanted && editor.level()? > 0)
}

fn unindent(_: Key, editor: &mut Editor) -> Result<Effect, EditError> {
    done(editor.unindent_current_node())
}

fn join_left_applies(key: Key, editor: &Editor) -> Result<bool, EditError> {
    Ok(key == Key::Backspace && !editor.at_line_start()? && editor.at_field_end(Lateral::Left)?)
}

fn join_left(_: Key, editor: &mut Editor) -> Result<Effect, EditError> {
    done(editor.combine_fields(Lateral::Left))
}

fn join_right_applies(key: Key, editor: &Editor) -> Result<bool, EditError> {
    Ok(key == Key::Delete && !editor.at_line_end()? && editor.at_field_end(Lateral::Right)?)
}

fn join_right(_: Key, editor: &mut Editor) -> Result<Effect, EditError> {
    done(editor.combine_fields(Lateral::Right))
}

fn insert_applies(key: Key, _: &Editor) -> Result<bool, EditError> {
    Ok(matches!(key, Key::Char(ch) if !ch.is_control()))
}

fn insert(key: Key, editor: &mut Editor) -> Result<Effect, EditError> {
    let Key::Char(ch) = key else {
        return Ok(Effect::Bell);
    };
    let mut buf = [0u8; 4];
    done(editor.insert(ch.encode_utf8(&mut buf)))
}

fn backspace_applies(key: Key, editor: &Editor) -> Result<bool, EditError> {
    Ok(key == Key::Backspace && !editor.at_field_end(Lateral::Left)?)
}

fn backspace(_: Key, editor: &mut Editor) -> Result<Effect, EditError> {
    editor.delete(-1)?;
    Ok(Effect::None)
}

fn delete_applies(key: Key, editor: &Editor) -> Result<bool, EditError> {
    Ok(key == Key::Delete && !editor.at_field_end(Lateral::Right)?)
}

fn delete(_: Key, editor: &mut Editor) -> Result<Effect, EditError> {
    editor.delete(0)?;
    Ok(Effect::None)
}

fn page_applies(key: Key, _: &Editor) -> Result<bool, EditError> {
    Ok(matches!(key, Key::PageUp | Key::PageDown))
}

fn page(key: Key, editor: &mut Editor) -> Result<Effect, EditError> {
    let direction = if key == Key::PageUp {
        Vertical::Up
    } else {
        Vertical::Down
    };
    done(editor.page(direction))
}

fn line_end_applies(key: Key, _: &Editor) -> Result<bool, EditError> {
    Ok(matches!(key, Key::Home | Key::End))
}

fn line_end(key: Key, editor: &mut Editor) -> Result<Effect, EditError> {
    let direction = if key == Key::Home {
        Lateral::Left
    } else {
        Lateral::Right
    };
    done(editor.move_end(direction))
}

fn move_applies(key: Key, _: &Editor) -> Result<bool, EditError> {
    Ok(matches!(key, Key::Up | Key::Down | Key::Left | Key::Right))
}

/// Right at the end of a field jumps over its padding to the next field.
fn move_cursor(key: Key, editor: &mut Editor) -> Result<Effect, EditError> {
    match key {
        Key::Up => done(editor.move_vertical(Vertical::Up)),
        Key::Down => done(editor.move_vertical(Vertical::Down)),
        Key::Left => done(editor.move_lateral(Lateral::Left, 1)),
        Key::Right => {
            let count = if editor.at_field_end(Lateral::Right)? {
                editor.padding_len()?
            } else {
                1
            };
            done(editor.move_lateral(Lateral::Right, count))
        }
        _ => Ok(Effect::Bell),
    }
}

fn field_jump_applies(key: Key, editor: &Editor) -> Result<bool, EditError> {
    Ok(match key {
        Key::CtrlLeft => !editor.at_line_start()?,
        Key::CtrlRight => !editor.at_line_end()?,
        _ => false,
    })
}

/// Ctrl-Left goes to the start of the current or previous field, Ctrl-Right to the end of the
/// current or next field.
fn field_jump(key: Key, editor: &mut Editor) -> Result<Effect, EditError> {
    let direction = if key == Key::CtrlLeft {
        Lateral::Left
    } else {
        Lateral::Right
    };
    if !editor.at_field_end(direction)? {
        return done(editor.move_field_end(direction));
    }
    let count = match direction {
        Lateral::Left => editor.neighbor_column_width(direction)?,
        Lateral::Right => {
            let padding = editor.padding_len()?;
            editor
                .neighbor_field(direction)?
                .map(|field| text_width(field) + padding)
        }
    };
    match count {
        Some(count) => done(editor.move_lateral(direction, count)),
        None => Ok(Effect::Bell),
    }
}
