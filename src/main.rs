// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nestnote-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nestnote and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Nestnote CLI entrypoint.
//!
//! Opens (or creates) one outline document and runs the terminal editor on it.

use std::error::Error;
use std::path::PathBuf;

use nestnote::editor::Editor;
use nestnote::store::{default_document_path, OutlineFile, WriteDurability};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<document>] [--durable-writes]\n  {program} -h | --help\n\nThe document gets the `.nnn` extension when it has none. Without <document>, the first free\nname of nestnote.nnn, nestnote-1.nnn, ... in the documents directory is used. Missing\ndocuments are created with a sample outline.\n\n--durable-writes syncs every save to disk before returning.\n\nKeys: Ctrl-W save, Esc quit, Ctrl-K fold, Tab indent or new field, Shift-Tab unindent."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    help: bool,
    document: Option<String>,
    durable_writes: bool,
}

fn parse_options(args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    for arg in args {
        match arg.as_str() {
            "-h" | "--help" => options.help = true,
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.document.is_some() {
                    return Err(());
                }
                options.document = Some(arg);
            }
        }
    }

    Ok(options)
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "nestnote".to_owned());

        let options = match parse_options(args) {
            Ok(options) if options.help => {
                print_usage(&program);
                return Ok(());
            }
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        nestnote::logging::init()?;

        let path = match options.document {
            Some(document) => PathBuf::from(document),
            None => default_document_path()?,
        };
        let durability = if options.durable_writes {
            WriteDurability::Durable
        } else {
            WriteDurability::BestEffort
        };
        let file = OutlineFile::new(path).with_durability(durability);
        let outline = file.load_or_init()?;

        nestnote::tui::run(Editor::new(outline), file)?;
        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("nestnote: {err}");
        std::process::exit(1);
    }
}
