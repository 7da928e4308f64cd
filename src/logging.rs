// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nestnote-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nestnote and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Logging bootstrap.
//!
//! The library only emits `tracing` events. The binary installs a subscriber when `NESTNOTE_LOG`
//! holds a filter directive (for example `NESTNOTE_LOG=nestnote=debug`). The terminal owns
//! stdout and stderr while the editor runs, so events are appended to a file instead.

use std::env;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Filter directive, in `EnvFilter` syntax.
pub const LOG_ENV: &str = "NESTNOTE_LOG";
/// Destination file; defaults to `nestnote.log` in the temp directory.
pub const LOG_FILE_ENV: &str = "NESTNOTE_LOG_FILE";

/// Target names for log filtering.
pub mod targets {
    pub const OUTLINE: &str = "nestnote::outline";
    pub const EDITOR: &str = "nestnote::editor";
    pub const STORE: &str = "nestnote::store";
    pub const TUI: &str = "nestnote::tui";
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot open log file {path:?}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("invalid NESTNOTE_LOG directive {value:?}: {message}")]
    Filter { value: String, message: String },
    #[error("a global tracing subscriber is already installed: {0}")]
    Install(String),
}

/// Installs the file subscriber. Returns the log path, or `None` when logging is disabled.
pub fn init() -> Result<Option<PathBuf>, LoggingError> {
    let Some(directive) = env::var(LOG_ENV).ok().filter(|value| !value.trim().is_empty()) else {
        return Ok(None);
    };
    let path = log_path();
    let filter = EnvFilter::try_new(directive.trim()).map_err(|err| LoggingError::Filter {
        value: directive.clone(),
        message: err.to_string(),
    })?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| LoggingError::Open {
            path: path.clone(),
            source,
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|err| LoggingError::Install(err.to_string()))?;

    tracing::debug!(target: targets::TUI, path = ?path, "logging initialised");
    Ok(Some(path))
}

fn log_path() -> PathBuf {
    env::var_os(LOG_FILE_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("nestnote.log"))
}
