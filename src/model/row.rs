// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nestnote-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nestnote and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Rows of text fields bound to a shared [`ColumnSet`].
//!
//! Every field of a row is attached to the column at its own index, so widths are always measured
//! against the sibling group the row belongs to. Positions and widths count `char`s.

use std::borrow::Cow;

use thiserror::Error;

use crate::logging::targets;

use super::column::{ColumnError, ColumnSet};

/// Spacing added after every non-final field when a row is rendered.
pub const TAB_WIDTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("field index {index} is out of range for a row of {len} fields")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Column(#[from] ColumnError),
}

pub(crate) fn text_width(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset of the `index`-th char of `text`, clamped to the end of the string.
pub(crate) fn byte_offset(text: &str, index: usize) -> usize {
    text.char_indices()
        .nth(index)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}

#[derive(Debug)]
pub struct Row {
    fields: Vec<String>,
    columns: ColumnSet,
}

impl Row {
    pub fn new<I, S>(columns: ColumnSet, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row = Self {
            fields: Vec::new(),
            columns,
        };
        for field in fields {
            row.append(field);
        }
        row
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn append(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.columns.attach(self.fields.len(), text_width(&text));
        self.fields.push(text);
    }

    /// Inserts a field before `index`; `index == len` appends.
    pub fn insert(&mut self, index: usize, text: impl Into<String>) -> Result<(), RowError> {
        self.check_index(index, self.fields.len() + 1)?;
        self.detach_from(index)?;
        self.fields.insert(index, text.into());
        self.attach_from(index);
        Ok(())
    }

    pub fn delete(&mut self, index: usize) -> Result<String, RowError> {
        self.check_index(index, self.fields.len())?;
        self.detach_from(index)?;
        let removed = self.fields.remove(index);
        self.attach_from(index);
        Ok(removed)
    }

    /// Swaps the text at `index`, returning the previous text.
    pub fn replace(&mut self, index: usize, text: impl Into<String>) -> Result<String, RowError> {
        self.check_index(index, self.fields.len())?;
        let text = text.into();
        self.columns.detach(index, text_width(&self.fields[index]))?;
        self.columns.attach(index, text_width(&text));
        Ok(std::mem::replace(&mut self.fields[index], text))
    }

    /// Removes and returns the fields from `index` onward.
    pub fn split_off(&mut self, index: usize) -> Result<Vec<String>, RowError> {
        self.check_index(index, self.fields.len() + 1)?;
        self.detach_from(index)?;
        Ok(self.fields.split_off(index))
    }

    /// Moves every field of this row onto `columns`.
    pub fn rebind(&mut self, columns: ColumnSet) -> Result<(), RowError> {
        if self.columns.shares_with(&columns) {
            return Ok(());
        }
        self.detach_from(0)?;
        self.columns = columns;
        self.attach_from(0);
        Ok(())
    }

    /// Spaces that follow field `index` when it is padded to its column.
    pub fn padding_len(&self, index: usize) -> Option<usize> {
        let field = self.fields.get(index)?;
        Some((self.columns.width(index) + TAB_WIDTH).saturating_sub(text_width(field)))
    }

    pub fn padded_field(&self, index: usize) -> Option<String> {
        let field = self.fields.get(index)?;
        let padding = self.padding_len(index)?;
        let mut padded = String::with_capacity(field.len() + padding);
        padded.push_str(field);
        padded.extend(std::iter::repeat(' ').take(padding));
        Some(padded)
    }

    /// Width field `index` occupies on screen: padded unless it is the last field.
    pub fn rendered_len(&self, index: usize) -> Option<usize> {
        let field = self.fields.get(index)?;
        if index + 1 == self.fields.len() {
            Some(text_width(field))
        } else {
            Some(self.columns.width(index) + TAB_WIDTH)
        }
    }

    pub fn width(&self) -> usize {
        (0..self.fields.len())
            .filter_map(|index| self.rendered_len(index))
            .sum()
    }

    /// Rendered fields, left to right.
    pub fn iter(&self) -> RowIter<'_> {
        RowIter {
            row: self,
            index: 0,
        }
    }

    fn check_index(&self, index: usize, bound: usize) -> Result<(), RowError> {
        if index < bound {
            Ok(())
        } else {
            Err(RowError::IndexOutOfRange {
                index,
                len: self.fields.len(),
            })
        }
    }

    fn detach_from(&self, index: usize) -> Result<(), ColumnError> {
        for (offset, field) in self.fields.iter().enumerate().skip(index) {
            self.columns.detach(offset, text_width(field))?;
        }
        Ok(())
    }

    fn attach_from(&self, index: usize) {
        for (offset, field) in self.fields.iter().enumerate().skip(index) {
            self.columns.attach(offset, text_width(field));
        }
    }
}

impl Drop for Row {
    fn drop(&mut self) {
        if let Err(err) = self.detach_from(0) {
            tracing::warn!(target: targets::OUTLINE, %err, "dropped row could not leave its columns");
        }
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = Cow<'a, str>;
    type IntoIter = RowIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Yields each field padded to its column, except the last which is yielded as-is.
#[derive(Debug, Clone)]
pub struct RowIter<'a> {
    row: &'a Row,
    index: usize,
}

impl<'a> Iterator for RowIter<'a> {
    type Item = Cow<'a, str>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.index;
        let field = self.row.fields.get(index)?;
        self.index += 1;
        if index + 1 == self.row.fields.len() {
            Some(Cow::Borrowed(field.as_str()))
        } else {
            self.row.padded_field(index).map(Cow::Owned)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.row.fields.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RowIter<'_> {}
