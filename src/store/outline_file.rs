// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nestnote-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nestnote and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Outline documents on disk.
//!
//! A document is one UTF-8 JSON file holding nested `{fields, child, sibling}` records. Every
//! sibling is nested inside its predecessor, so a flat outline of `n` rows is `n` levels deep.
//! Encoding and decoding run on a worker thread with a large stack; the conversion between
//! records and the arena is iterative and stays on the caller's thread.

use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use directories::UserDirs;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use thiserror::Error;

use crate::logging::targets;
use crate::model::{NodeRecord, Outline, OutlineError};

/// Extension every document carries.
pub const FILE_EXTENSION: &str = "nnn";

const DEFAULT_STEM: &str = "nestnote";
const CODEC_STACK_BYTES: usize = 256 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error at {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("json error at {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid outline in {path:?}: {source}")]
    Outline { path: PathBuf, source: OutlineError },
    #[error("could not determine the documents directory")]
    NoDocumentsDir,
    #[error("refusing to write through symlink at {path:?}")]
    SymlinkRefused { path: PathBuf },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Writes a temp file and renames it into place without syncing.
    #[default]
    BestEffort,

    /// Also syncs the written file and its directory before returning.
    Durable,
}

/// Handle to one document file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineFile {
    path: PathBuf,
    durability: WriteDurability,
}

impl OutlineFile {
    /// Appends `.nnn` unless `path` already ends with it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: with_document_extension(path.into()),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn load(&self) -> Result<Outline, StoreError> {
        let contents = fs::read(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        let path = self.path.clone();
        let record = on_codec_stack(&self.path, move || decode(&path, &contents))?;
        let outline = Outline::from_record(record).map_err(|source| StoreError::Outline {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(
            target: targets::STORE,
            path = ?self.path,
            nodes = outline.len(),
            "loaded outline"
        );
        Ok(outline)
    }

    /// Writes the whole document, replacing the file atomically.
    pub fn save(&self, outline: &Outline) -> Result<(), StoreError> {
        let record = outline.to_record();
        let path = self.path.clone();
        let contents = on_codec_stack(&self.path, move || encode(&path, &record))?;
        write_atomic(&self.path, &contents, self.durability)?;
        tracing::debug!(
            target: targets::STORE,
            path = ?self.path,
            nodes = outline.len(),
            bytes = contents.len(),
            "saved outline"
        );
        Ok(())
    }

    /// Loads the document, or writes and returns the sample outline when the file is missing.
    pub fn load_or_init(&self) -> Result<Outline, StoreError> {
        match self.load() {
            Err(StoreError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(target: targets::STORE, path = ?self.path, "creating new document");
                let outline = initial_outline();
                self.save(&outline)?;
                Ok(outline)
            }
            other => other,
        }
    }
}

/// Sample document written when a new file is created.
pub fn initial_outline() -> Outline {
    let mut outline = Outline::new(["Information about the bean"]);
    let root = outline.root();
    let rows: [&[&str]; 4] = [
        &["Subject", "Good", "Bean-like", "Squidgely", "Grumpy", "Cookery"],
        &["This Bean", "I hope", "10/10", "Yep", "1/10"],
        &["Lima Bean", "Um?", "Totes", "Nope", "Debate-skies"],
        &["The Bean", "Yes!", "Certainly", "Seldom", "Yum"],
    ];
    for fields in rows {
        if let Err(err) = outline.append_child(root, fields.iter().copied()) {
            tracing::warn!(target: targets::STORE, %err, "sample row rejected");
        }
    }
    outline
}

/// `<documents dir>/nestnote.nnn`, or the first free `nestnote-<n>.nnn` next to it.
pub fn default_document_path() -> Result<PathBuf, StoreError> {
    let documents = UserDirs::new()
        .and_then(|dirs| dirs.document_dir().map(Path::to_path_buf))
        .ok_or(StoreError::NoDocumentsDir)?;
    Ok(available_document_path(&documents))
}

/// First name of the form `nestnote.nnn`, `nestnote-1.nnn`, ... that does not exist in `dir`.
pub fn available_document_path(dir: &Path) -> PathBuf {
    let candidate = |suffix: usize| {
        let stem = match suffix {
            0 => DEFAULT_STEM.to_owned(),
            n => format!("{DEFAULT_STEM}-{n}"),
        };
        dir.join(format!("{stem}.{FILE_EXTENSION}"))
    };
    (0..)
        .map(candidate)
        .find(|path| fs::symlink_metadata(path).is_err())
        .unwrap_or_else(|| candidate(0))
}

fn with_document_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == FILE_EXTENSION) {
        return path;
    }
    let mut raw = path.into_os_string();
    raw.push(".");
    raw.push(FILE_EXTENSION);
    PathBuf::from(raw)
}

fn decode(path: &Path, contents: &[u8]) -> Result<NodeRecord, StoreError> {
    let json_error = |source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    };
    let mut deserializer = serde_json::Deserializer::from_slice(contents);
    deserializer.disable_recursion_limit();
    let record = NodeRecord::deserialize(&mut deserializer).map_err(json_error)?;
    deserializer.end().map_err(json_error)?;
    Ok(record)
}

fn encode(path: &Path, record: &NodeRecord) -> Result<Vec<u8>, StoreError> {
    let mut contents = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut contents, PrettyFormatter::with_indent(b"    "));
    record
        .serialize(&mut serializer)
        .map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    contents.push(b'\n');
    Ok(contents)
}

/// Runs `work` on a scoped thread whose stack fits deeply nested documents.
fn on_codec_stack<T, F>(path: &Path, work: F) -> Result<T, StoreError>
where
    T: Send,
    F: FnOnce() -> Result<T, StoreError> + Send,
{
    thread::scope(|scope| {
        let handle = thread::Builder::new()
            .name("nestnote-codec".to_owned())
            .stack_size(CODEC_STACK_BYTES)
            .spawn_scoped(scope, work)
            .map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        match handle.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    })
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

fn write_atomic(path: &Path, contents: &[u8], durability: WriteDurability) -> Result<(), StoreError> {
    let io_error = |at: &Path| {
        let at = at.to_path_buf();
        move |source: io::Error| StoreError::Io { path: at, source }
    };

    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(StoreError::SymlinkRefused {
                path: path.to_path_buf(),
            });
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(io_error(parent))?;

    let Some(file_name) = path.file_name() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no file name"),
        });
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        ".nestnote.tmp.{}.{}",
        file_name.to_string_lossy(),
        nanos
    ));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(io_error(&tmp_path))?;
    file.write_all(contents).map_err(io_error(&tmp_path))?;
    if durability == WriteDurability::Durable {
        file.sync_all().map_err(io_error(&tmp_path))?;
    }
    drop(file);

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir = fs::File::open(parent).map_err(io_error(parent))?;
            dir.sync_all().map_err(io_error(parent))?;
        }
    }

    Ok(())
}
