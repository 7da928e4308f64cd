// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nestnote-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nestnote and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Display collaborator: the drawing surface the editor renders onto.

/// How a piece of text is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StyleClass {
    #[default]
    Even,
    Odd,
    Header,
    CollapsedHeader,
}

impl StyleClass {
    /// Field 0 is the header; later fields alternate starting with [`StyleClass::Even`].
    pub fn for_field(index: usize, collapsed: bool) -> Self {
        match index {
            0 if collapsed => Self::CollapsedHeader,
            0 => Self::Header,
            odd if odd % 2 == 1 => Self::Even,
            _ => Self::Odd,
        }
    }
}

pub trait Canvas {
    /// `(rows, cols)` of the drawable area.
    fn size(&self) -> (usize, usize);

    /// Draws `text` starting at `(row, col)`; anything past the right edge is clipped.
    fn put_str(&mut self, row: usize, col: usize, text: &str, style: StyleClass);
}

/// In-memory canvas holding one styled char per cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCanvas {
    rows: usize,
    cols: usize,
    cells: Vec<(char, StyleClass)>,
}

impl GridCanvas {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![(' ', StyleClass::Even); rows * cols],
        }
    }

    /// Text of `row` with trailing blanks removed.
    pub fn line(&self, row: usize) -> String {
        if row >= self.rows {
            return String::new();
        }
        let start = row * self.cols;
        let text: String = self.cells[start..start + self.cols]
            .iter()
            .map(|(ch, _)| *ch)
            .collect();
        text.trim_end().to_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        (0..self.rows).map(|row| self.line(row)).collect()
    }

    pub fn style_at(&self, row: usize, col: usize) -> Option<StyleClass> {
        (row < self.rows && col < self.cols).then(|| self.cells[row * self.cols + col].1)
    }
}

impl Canvas for GridCanvas {
    fn size(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn put_str(&mut self, row: usize, col: usize, text: &str, style: StyleClass) {
        if row >= self.rows {
            return;
        }
        for (offset, ch) in text.chars().enumerate() {
            let x = col + offset;
            if x >= self.cols {
                break;
            }
            self.cells[row * self.cols + x] = (ch, style);
        }
    }
}
