//! TZ-005: Line scanner — partitions source into language-tagged blocks.
//!
//! Marker grammar, one check per physical line, in priority order:
//!
//! - `#T{` / `#T}` — paired script block delimiters (column 0, alone)
//! - `#B{` / `#B}` — paired shell block delimiters (column 0, alone)
//! - `#T> stmt`    — one inline script statement
//! - `#B> cmd`     — one inline shell command
//!
//! Leading whitespace is tolerated for inline markers only. Marker lines
//! never appear in any block body, and empty buffers never flush.

use super::{Block, Language};
use std::path::Path;

enum Marker {
    BlockStart(Language),
    BlockEnd(Language),
    Inline(Language, String),
}

fn classify(line: &str, inline_only: bool) -> Option<Marker> {
    if !inline_only {
        match line.trim_end() {
            "#T{" => return Some(Marker::BlockStart(Language::Script)),
            "#T}" => return Some(Marker::BlockEnd(Language::Script)),
            "#B{" => return Some(Marker::BlockStart(Language::Shell)),
            "#B}" => return Some(Marker::BlockEnd(Language::Shell)),
            _ => {}
        }
    }

    let lead = line.trim_start();
    if let Some(rest) = lead.strip_prefix("#T>") {
        return Some(Marker::Inline(Language::Script, rest.trim().to_string()));
    }
    if let Some(rest) = lead.strip_prefix("#B>") {
        return Some(Marker::Inline(Language::Shell, rest.trim().to_string()));
    }
    None
}

/// Initial language for a file, from its extension. Unrecognized
/// extensions behave as shell until the first explicit marker.
fn initial_language(path: &Path) -> Language {
    match path.extension().and_then(|e| e.to_str()) {
        Some("tz") => Language::Script,
        Some("sh") | Some("bash") => Language::Shell,
        _ => Language::Shell,
    }
}

/// Scan a polyglot file into blocks, in file order.
pub fn scan_file(path: &Path) -> Result<Vec<Block>, String> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    Ok(scan(&source, initial_language(path), false))
}

/// Scan an in-memory snippet. Snippets always start in the script
/// language and only inline markers apply.
pub fn scan_str(code: &str) -> Vec<Block> {
    scan(code, Language::Script, true)
}

fn scan(source: &str, initial: Language, inline_only: bool) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut active = initial;
    let mut buffer = String::new();

    for line in source.lines() {
        match classify(line, inline_only) {
            Some(Marker::BlockStart(lang)) => {
                flush(&mut blocks, active, &mut buffer);
                active = lang;
            }
            Some(Marker::BlockEnd(lang)) => {
                flush(&mut blocks, lang, &mut buffer);
                active = lang.complement();
            }
            Some(Marker::Inline(lang, stmt)) => {
                flush(&mut blocks, active, &mut buffer);
                if !stmt.is_empty() {
                    blocks.push(Block { lang, body: stmt });
                }
                // Inline markers do not change the active language.
            }
            None => {
                buffer.push_str(line);
                buffer.push('\n');
            }
        }
    }
    flush(&mut blocks, active, &mut buffer);

    blocks
}

fn flush(blocks: &mut Vec<Block>, lang: Language, buffer: &mut String) {
    if !buffer.trim().is_empty() {
        blocks.push(Block {
            lang,
            body: buffer.trim_end_matches('\n').to_string(),
        });
    }
    buffer.clear();
}
