// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nestnote-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nestnote and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Cursor-driven editing over an [`Outline`].
//!
//! The editor owns the document plus a cursor `(top, y, x)`: `top` is the first visible row on
//! screen, `y` the cursor row relative to `top` and `x` the virtual column within the line,
//! indentation included. The current node is the visible row at `top + y`.
//!
//! Every movement re-clamps `x` into the current line. Field boundaries are recomputed from the
//! outline on each query.

use thiserror::Error;

use crate::logging::targets;
use crate::model::row::text_width;
use crate::model::{
    Lateral, NodeId, Outline, OutlineError, OutlineNode, RowError, Vertical, INDENT_WIDTH,
};
use crate::view::{Canvas, StyleClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub rows: usize,
    pub cols: usize,
}

impl Viewport {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: rows.max(1),
            cols,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(24, 80)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub top: usize,
    pub y: usize,
    pub x: usize,
}

impl Cursor {
    /// Visible row index of the cursor within the whole document.
    pub fn absolute_y(&self) -> usize {
        self.top + self.y
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("the document root cannot be moved or merged")]
    AtRoot,
    #[error("the current row has no previous sibling")]
    NoPreviousSibling,
    #[error("the current row has no parent")]
    NoParent,
    #[error("the cursor is not at the {direction} end of its field")]
    NotAtFieldEnd { direction: Lateral },
    #[error(transparent)]
    Outline(#[from] OutlineError),
}

impl From<RowError> for EditError {
    fn from(err: RowError) -> Self {
        Self::Outline(err.into())
    }
}

#[derive(Debug)]
pub struct Editor {
    outline: Outline,
    cursor: Cursor,
    viewport: Viewport,
}

impl Editor {
    pub fn new(outline: Outline) -> Self {
        Self::with_viewport(outline, Viewport::default())
    }

    pub fn with_viewport(outline: Outline, viewport: Viewport) -> Self {
        Self {
            outline,
            cursor: Cursor::default(),
            viewport: Viewport::new(viewport.rows, viewport.cols),
        }
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    pub fn into_outline(self) -> Outline {
        self.outline
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Resizes the window, scrolling so the cursor row stays on screen.
    pub fn set_viewport(&mut self, rows: usize, cols: usize) -> Result<(), EditError> {
        self.viewport = Viewport::new(rows, cols);
        let rows = self.viewport.rows;
        if self.cursor.y >= rows {
            self.cursor.top += self.cursor.y + 1 - rows;
            self.cursor.y = rows - 1;
        }
        self.correct_lateral_bounds()
    }

    /// Puts the cursor on visible row `row` at column `x`, scrolling when needed.
    pub fn place_cursor(&mut self, row: usize, x: usize) -> Result<(), EditError> {
        let total = self.outline.visible_len();
        if row >= total {
            return Err(OutlineError::OutOfRange { offset: row, count: total }.into());
        }
        self.show_row(row);
        self.cursor.x = x;
        self.correct_lateral_bounds()
    }

    pub fn current_node_id(&self) -> Result<NodeId, EditError> {
        Ok(self.outline.node_at(self.cursor.absolute_y())?)
    }

    pub fn current_node(&self) -> Result<&OutlineNode, EditError> {
        Ok(self.outline.node(self.current_node_id()?)?)
    }

    // queries

    pub fn at_root(&self) -> Result<bool, EditError> {
        Ok(self.current_node_id()? == self.outline.root())
    }

    /// Whether the cursor sits right after the indentation.
    pub fn at_line_start(&self) -> Result<bool, EditError> {
        Ok(self.cursor.x == self.current_node()?.indent_width())
    }

    pub fn at_line_end(&self) -> Result<bool, EditError> {
        Ok(self.cursor.x == self.current_node()?.line_width())
    }

    pub fn at_field_end(&self, direction: Lateral) -> Result<bool, EditError> {
        let x = self.cursor.x;
        Ok(self.current_node()?.selected_field_end(x, direction) == x)
    }

    /// Whether the current node is the first child of its parent; false for the root.
    pub fn is_first_child(&self) -> Result<bool, EditError> {
        let abs = self.cursor.absolute_y();
        if abs == 0 {
            return Ok(false);
        }
        let previous = self.outline.node_at(abs - 1)?;
        Ok(self.outline.child(previous) == Some(self.current_node_id()?))
    }

    pub fn current_node_has_child(&self) -> Result<bool, EditError> {
        Ok(self.current_node()?.has_child())
    }

    pub fn collapsed(&self) -> Result<bool, EditError> {
        Ok(self.current_node()?.is_collapsed())
    }

    pub fn level(&self) -> Result<usize, EditError> {
        Ok(self.current_node()?.level())
    }

    /// Nearest row above the cursor on the same level, unless a shallower row comes first.
    pub fn previous_sibling(&self) -> Result<Option<NodeId>, EditError> {
        let level = self.level()?;
        let mut candidate = None;
        for id in self.outline.iter().take(self.cursor.absolute_y()) {
            match self.outline.level(id) {
                Some(found) if found == level => candidate = Some(id),
                Some(found) if found < level => candidate = None,
                _ => {}
            }
        }
        Ok(candidate)
    }

    pub fn parent(&self) -> Result<Option<NodeId>, EditError> {
        let Some(parent_level) = self.level()?.checked_sub(1) else {
            return Ok(None);
        };
        Ok(self
            .outline
            .iter()
            .take(self.cursor.absolute_y())
            .filter(|&id| self.outline.level(id) == Some(parent_level))
            .last())
    }

    /// Text of the field under the cursor.
    pub fn field(&self) -> Result<&str, EditError> {
        let node = self.current_node()?;
        let index = node.field_index_at(self.cursor.x);
        node.field(index).ok_or_else(|| missing_field(node, index))
    }

    pub fn neighbor_field(&self, direction: Lateral) -> Result<Option<&str>, EditError> {
        let node = self.current_node()?;
        Ok(self
            .neighbor_index(node, direction)
            .and_then(|index| node.field(index)))
    }

    /// Padded width of the column under the cursor.
    pub fn column_width(&self) -> Result<usize, EditError> {
        let node = self.current_node()?;
        let index = node.field_index_at(self.cursor.x);
        node.column_width(index)
            .ok_or_else(|| missing_field(node, index))
    }

    pub fn neighbor_column_width(&self, direction: Lateral) -> Result<Option<usize>, EditError> {
        let node = self.current_node()?;
        Ok(self
            .neighbor_index(node, direction)
            .and_then(|index| node.column_width(index)))
    }

    /// Padding after the field under the cursor, as if it were not the last field.
    pub fn padding_len(&self) -> Result<usize, EditError> {
        let node = self.current_node()?;
        let index = node.field_index_at(self.cursor.x);
        node.padding_len(index)
            .ok_or_else(|| missing_field(node, index))
    }

    pub fn neighbor_padding_len(&self, direction: Lateral) -> Result<Option<usize>, EditError> {
        let node = self.current_node()?;
        Ok(self
            .neighbor_index(node, direction)
            .and_then(|index| node.padding_len(index)))
    }

    // movement

    pub fn move_vertical(&mut self, direction: Vertical) -> Result<(), EditError> {
        let rows = self.viewport.rows;
        match direction {
            Vertical::Up if self.cursor.y == 0 => return self.scroll(direction),
            Vertical::Down if self.cursor.y + 1 >= rows => return self.scroll(direction),
            Vertical::Up => self.cursor.y -= 1,
            Vertical::Down => {
                if self.cursor.absolute_y() + 1 < self.outline.visible_len() {
                    self.cursor.y += 1;
                }
            }
        }
        self.correct_lateral_bounds()
    }

    pub fn move_lateral(&mut self, direction: Lateral, count: usize) -> Result<(), EditError> {
        self.cursor.x = direction.step(self.cursor.x, count);
        self.correct_lateral_bounds()
    }

    pub fn move_end(&mut self, direction: Lateral) -> Result<(), EditError> {
        let count = self.current_node()?.line_width();
        self.move_lateral(direction, count)
    }

    pub fn move_field_end(&mut self, direction: Lateral) -> Result<(), EditError> {
        self.cursor.x = self
            .current_node()?
            .selected_field_end(self.cursor.x, direction);
        Ok(())
    }

    /// Shifts the window by one row without moving past the first or last row.
    pub fn scroll(&mut self, direction: Vertical) -> Result<(), EditError> {
        match direction {
            Vertical::Up if self.cursor.top > 0 => self.cursor.top -= 1,
            Vertical::Down if self.outline.visible_len() > self.cursor.top + self.viewport.rows => {
                self.cursor.top += 1;
            }
            _ => {}
        }
        self.correct_lateral_bounds()
    }

    /// Moves the window by a full page, keeping the cursor on an existing row.
    pub fn page(&mut self, direction: Vertical) -> Result<(), EditError> {
        let rows = self.viewport.rows;
        let total = self.outline.visible_len();
        match direction {
            Vertical::Up => self.cursor.top = self.cursor.top.saturating_sub(rows),
            Vertical::Down => {
                if self.cursor.top + rows < total {
                    self.cursor.top += rows;
                }
            }
        }
        let last = total.saturating_sub(1).saturating_sub(self.cursor.top);
        self.cursor.y = self.cursor.y.min(last);
        self.correct_lateral_bounds()
    }

    // editing

    pub fn insert(&mut self, text: &str) -> Result<(), EditError> {
        let id = self.current_node_id()?;
        self.outline.insert_text(id, self.cursor.x, text)?;
        self.cursor.x += text_width(text);
        Ok(())
    }

    /// Deletes the character at `offset` from the cursor and moves the cursor there.
    pub fn delete(&mut self, offset: isize) -> Result<Option<char>, EditError> {
        let id = self.current_node_id()?;
        let target = self.cursor.x.saturating_add_signed(offset);
        let removed = self.outline.delete_char_at(id, target)?;
        self.cursor.x = target;
        Ok(removed)
    }

    /// Splits the field under the cursor; the cursor ends at the start of the new field.
    pub fn split_field(&mut self) -> Result<(), EditError> {
        let id = self.current_node_id()?;
        self.outline.split_field(id, self.cursor.x)?;
        self.cursor.x += self.padding_len()?;
        Ok(())
    }

    /// Breaks the line at the cursor and moves to the start of the new line.
    pub fn split_node(&mut self) -> Result<(), EditError> {
        if self.at_line_end()?
            || (!self.at_field_end(Lateral::Left)? && !self.at_field_end(Lateral::Right)?)
        {
            self.split_field()?;
        }
        if self.at_field_end(Lateral::Right)? {
            let padding = self.padding_len()?;
            self.move_lateral(Lateral::Right, padding)?;
        }
        let id = self.current_node_id()?;
        tracing::trace!(target: targets::EDITOR, node = ?id, x = self.cursor.x, "split node");
        self.outline.split(id, self.cursor.x)?;
        self.move_vertical(Vertical::Down)?;
        let x = self.cursor.x;
        self.move_lateral(Lateral::Left, x)
    }

    /// Appends the current level 0 row onto the row above it.
    pub fn combine_nodes(&mut self) -> Result<(), EditError> {
        let abs = self.cursor.absolute_y();
        if abs == 0 {
            return Err(EditError::AtRoot);
        }
        let id = self.current_node_id()?;
        let prev_row = self.outline.node_at(abs - 1)?;
        let prev_sibling = self.previous_sibling()?;
        let joined = self.outline.node(prev_row)?.num_fields();
        tracing::trace!(target: targets::EDITOR, node = ?id, ?prev_row, "combine nodes");

        self.outline.combine(id, prev_row, prev_sibling)?;
        self.move_vertical(Vertical::Up)?;
        // Removing the row can narrow the shared columns, so measure after the combine.
        let node = self.outline.node(prev_row)?;
        self.cursor.x = node.field_start(joined).unwrap_or_else(|| node.line_width());
        self.correct_lateral_bounds()
    }

    /// Merges the field under the cursor with its neighbor. The cursor must be at the field's
    /// edge facing that neighbor.
    pub fn combine_fields(&mut self, direction: Lateral) -> Result<(), EditError> {
        if !self.at_field_end(direction)? {
            return Err(EditError::NotAtFieldEnd { direction });
        }
        let id = self.current_node_id()?;
        let movement = self.neighbor_padding_len(direction)?.unwrap_or(0);
        self.outline.combine_fields(id, self.cursor.x, direction)?;
        if direction == Lateral::Left {
            self.cursor.x = self.cursor.x.saturating_sub(movement);
        }
        self.correct_lateral_bounds()
    }

    pub fn indent_current_node(&mut self) -> Result<(), EditError> {
        if self.cursor.absolute_y() == 0 {
            return Err(EditError::AtRoot);
        }
        let prev = self.previous_sibling()?.ok_or(EditError::NoPreviousSibling)?;
        let id = self.current_node_id()?;
        let was_collapsed = self.outline.is_collapsed(prev);
        if was_collapsed {
            self.outline.set_collapsed(prev, false)?;
        }
        self.outline.indent(id, prev)?;
        if was_collapsed {
            self.focus(id)?;
        }
        self.cursor.x += INDENT_WIDTH;
        self.correct_lateral_bounds()
    }

    pub fn unindent_current_node(&mut self) -> Result<(), EditError> {
        let parent = self.parent()?.ok_or(EditError::NoParent)?;
        let id = self.current_node_id()?;
        self.outline.unindent(id, parent)?;
        self.cursor.x = self.cursor.x.saturating_sub(INDENT_WIDTH);
        self.correct_lateral_bounds()
    }

    /// Returns the new collapse state.
    pub fn toggle_current_node_collapsed(&mut self) -> Result<bool, EditError> {
        let id = self.current_node_id()?;
        let collapsed = self.outline.toggle_collapsed(id)?;
        tracing::trace!(target: targets::EDITOR, node = ?id, collapsed, "toggle collapsed");
        Ok(collapsed)
    }

    /// Draws the rows in the window and returns the on-screen cursor position `(row, col)`.
    pub fn render(&self, canvas: &mut dyn Canvas) -> Result<(usize, usize), EditError> {
        let visible = self
            .outline
            .iter()
            .skip(self.cursor.top)
            .take(self.viewport.rows);
        for (row, id) in visible.enumerate() {
            let node = self.outline.node(id)?;
            let indent = node.indent_width();
            canvas.put_str(row, 0, &" ".repeat(indent), StyleClass::Even);
            let mut col = indent;
            for (index, text) in node.row().iter().enumerate() {
                canvas.put_str(row, col, &text, StyleClass::for_field(index, node.is_collapsed()));
                col += text_width(&text);
            }
        }
        Ok((self.cursor.y, self.cursor.x))
    }

    /// Keeps `x` inside the current line and out of inter-field padding.
    fn correct_lateral_bounds(&mut self) -> Result<(), EditError> {
        let node = self.current_node()?;
        let x = self.cursor.x;
        let left = node.indent_width();
        let right = node.line_width();
        let corrected = if x < left {
            left
        } else if x > right {
            right
        } else {
            node.selected_field_end(x, Lateral::Right).min(x)
        };
        self.cursor.x = corrected;
        Ok(())
    }

    fn neighbor_index(&self, node: &OutlineNode, direction: Lateral) -> Option<usize> {
        let index = node.field_index_at(self.cursor.x);
        match direction {
            Lateral::Left => index.checked_sub(1),
            Lateral::Right => Some(index + 1),
        }
    }

    /// Moves the cursor row onto `id`, scrolling as little as possible.
    fn focus(&mut self, id: NodeId) -> Result<(), EditError> {
        let row = self
            .outline
            .iter()
            .position(|visible| visible == id)
            .ok_or(OutlineError::UnknownNode(id))?;
        self.show_row(row);
        Ok(())
    }

    fn show_row(&mut self, row: usize) {
        let rows = self.viewport.rows;
        if row < self.cursor.top {
            self.cursor.top = row;
        } else if row >= self.cursor.top + rows {
            self.cursor.top = row + 1 - rows;
        }
        self.cursor.y = row - self.cursor.top;
    }
}

fn missing_field(node: &OutlineNode, index: usize) -> EditError {
    RowError::IndexOutOfRange {
        index,
        len: node.num_fields(),
    }
    .into()
}
