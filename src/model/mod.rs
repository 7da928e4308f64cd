// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nestnote-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nestnote and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core outline model.
//!
//! An outline is a forest of rows. Rows in one sibling chain align their fields through a shared
//! set of columns.

pub mod column;
pub mod direction;
pub mod outline;
pub mod record;
pub mod row;

pub use column::{Column, ColumnError, ColumnSet};
pub use direction::{Lateral, Vertical};
pub use outline::{NodeId, Outline, OutlineError, OutlineNode, PreOrder, INDENT_WIDTH};
pub use record::NodeRecord;
pub use row::{Row, RowError, RowIter, TAB_WIDTH};
