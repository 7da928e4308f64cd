// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nestnote-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nestnote and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Nestnote: a terminal outline editor.
//!
//! Rows are lists of tab-separated fields. Consecutive siblings share their column widths, so
//! every field lines up with the same field of its siblings.

pub mod commands;
pub mod editor;
pub mod logging;
pub mod model;
pub mod store;
pub mod tui;
pub mod view;
