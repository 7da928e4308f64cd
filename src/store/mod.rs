// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nestnote-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nestnote and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for outline documents on disk.

pub mod outline_file;

pub use outline_file::{
    available_document_path, default_document_path, initial_outline, OutlineFile, StoreError,
    WriteDurability, FILE_EXTENSION,
};
