// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nestnote-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nestnote and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnError {
    /// A field width was removed that no attached field ever contributed.
    ///
    /// This always points at broken bookkeeping in the caller, never at user input.
    #[error("column does not track a field of width {width}")]
    UntrackedWidth { width: usize },
    #[error("no column at index {index} (column set has {len})")]
    MissingColumn { index: usize, len: usize },
}

/// Counted multiset of the field widths observed at one position of a sibling group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Column {
    widths: BTreeMap<usize, usize>,
}

impl Column {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, width: usize) {
        *self.widths.entry(width).or_insert(0) += 1;
    }

    pub fn remove(&mut self, width: usize) -> Result<(), ColumnError> {
        match self.widths.get_mut(&width) {
            Some(count) if *count > 1 => {
                *count -= 1;
                Ok(())
            }
            Some(_) => {
                self.widths.remove(&width);
                Ok(())
            }
            None => Err(ColumnError::UntrackedWidth { width }),
        }
    }

    /// Widest field currently attached.
    ///
    /// Every column is created together with its first field, so an empty column is never
    /// rendered.
    pub fn width(&self) -> usize {
        debug_assert!(!self.widths.is_empty(), "width of a column with no attached fields");
        self.widths.last_key_value().map(|(width, _)| *width).unwrap_or(0)
    }

    /// Number of attached fields.
    pub fn len(&self) -> usize {
        self.widths.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }
}

/// Shared handle to the columns of one sibling group.
///
/// Cloning the handle shares the underlying columns; [`ColumnSet::new`] starts an independent
/// group. Columns are only ever appended, so a slot vacated by a removed field can be reused by
/// later content.
#[derive(Debug, Clone, Default)]
pub struct ColumnSet {
    columns: Rc<RefCell<Vec<Column>>>,
}

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.columns.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.borrow().is_empty()
    }

    /// Width of the column at `index`, or 0 when the slot is missing or has no fields.
    pub fn width(&self, index: usize) -> usize {
        self.columns
            .borrow()
            .get(index)
            .filter(|column| !column.is_empty())
            .map(Column::width)
            .unwrap_or(0)
    }

    /// Number of fields attached at `index`.
    pub fn field_count(&self, index: usize) -> usize {
        self.columns.borrow().get(index).map(Column::len).unwrap_or(0)
    }

    /// Records a field of `width` at `index`, allocating the column when `index` is one past the
    /// current end.
    pub fn attach(&self, index: usize, width: usize) {
        let mut columns = self.columns.borrow_mut();
        while columns.len() <= index {
            columns.push(Column::new());
        }
        columns[index].add(width);
    }

    pub fn detach(&self, index: usize, width: usize) -> Result<(), ColumnError> {
        let mut columns = self.columns.borrow_mut();
        let len = columns.len();
        columns
            .get_mut(index)
            .ok_or(ColumnError::MissingColumn { index, len })?
            .remove(width)
    }

    pub fn shares_with(&self, other: &ColumnSet) -> bool {
        Rc::ptr_eq(&self.columns, &other.columns)
    }
}
