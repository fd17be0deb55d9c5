//! Tree renamer: apply ordered substitution rules to a directory subtree.
//!
//! For each rule, in order:
//! 1. Rename directories whose name contains the pattern (deepest first)
//! 2. Rename files whose name contains the pattern
//! 3. Replace the pattern inside the contents of every text file
//!
//! A rule runs all three phases to completion before the next rule starts.
//! Per-item failures are counted in [`RenameStats`] and logged; they never
//! abort the walk.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::case::CaseVariant;
use crate::utils::io::is_hidden;

/// Counters accumulated across one rename run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenameStats {
    pub dirs_renamed: usize,
    pub files_renamed: usize,
    pub files_updated: usize,
    pub replacements_made: usize,
    pub errors: usize,
}

impl RenameStats {
    pub fn is_empty(&self) -> bool {
        *self == RenameStats::default()
    }

    fn record_error(&mut self, action: &str, path: &Path, error: impl std::fmt::Display) {
        eprintln!("[rename] Error {} {}: {}", action, path.display(), error);
        self.errors += 1;
    }
}

/// Apply every rule in order across `root`.
pub fn apply_rules(root: &Path, rules: &[CaseVariant], stats: &mut RenameStats) {
    for rule in rules {
        apply_rule(root, rule, stats);
    }
}

/// Apply one rule across `root`: directories, then files, then contents.
///
/// Identity rules (`from == to`) and empty patterns are skipped.
pub fn apply_rule(root: &Path, rule: &CaseVariant, stats: &mut RenameStats) {
    if rule.is_identity() || rule.from.is_empty() {
        return;
    }

    rename_directories(root, rule, stats);
    rename_files(root, rule, stats);
    replace_in_files(root, rule, stats);
}

// ============================================================================
// Walking
// ============================================================================

#[derive(Default)]
struct Listing {
    dirs: Vec<PathBuf>,
    files: Vec<PathBuf>,
}

/// List entries of `dir`, sorted by name. Symlinks are ignored.
fn list_dir(dir: &Path, stats: &mut RenameStats) -> Listing {
    let mut listing = Listing::default();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            stats.record_error("reading directory", dir, e);
            return listing;
        }
    };

    let mut entries: Vec<_> = entries.flatten().collect();
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        match entry.file_type() {
            Ok(ft) if ft.is_dir() => listing.dirs.push(entry.path()),
            Ok(ft) if ft.is_file() => listing.files.push(entry.path()),
            Ok(_) => {}
            Err(e) => stats.record_error("inspecting", &entry.path(), e),
        }
    }

    listing
}

fn has_hidden_name(path: &Path) -> bool {
    path.file_name()
        .map(|name| is_hidden(&name.to_string_lossy()))
        .unwrap_or(false)
}

/// Non-hidden directories below `dir`, children before their parents.
///
/// Hidden directories are walked but never returned themselves.
fn collect_dirs_bottom_up(dir: &Path, out: &mut Vec<PathBuf>, stats: &mut RenameStats) {
    for child in list_dir(dir, stats).dirs {
        collect_dirs_bottom_up(&child, out, stats);
        if !has_hidden_name(&child) {
            out.push(child);
        }
    }
}

/// Non-hidden files below `dir`, top-down, including those inside hidden directories.
fn collect_files(dir: &Path, out: &mut Vec<PathBuf>, stats: &mut RenameStats) {
    let listing = list_dir(dir, stats);
    out.extend(listing.files.into_iter().filter(|file| !has_hidden_name(file)));
    for child in listing.dirs {
        collect_files(&child, out, stats);
    }
}

fn renamed_target(path: &Path, rule: &CaseVariant) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    if !name.contains(&rule.from) {
        return None;
    }
    Some(path.with_file_name(name.replace(&rule.from, &rule.to)))
}

// ============================================================================
// Phases
// ============================================================================

fn rename_directories(root: &Path, rule: &CaseVariant, stats: &mut RenameStats) {
    let mut dirs = Vec::new();
    collect_dirs_bottom_up(root, &mut dirs, stats);

    for dir in dirs {
        let Some(target) = renamed_target(&dir, rule) else {
            continue;
        };
        if move_path(&dir, &target, "renaming directory", stats) {
            stats.dirs_renamed += 1;
        }
    }
}

fn rename_files(root: &Path, rule: &CaseVariant, stats: &mut RenameStats) {
    let mut files = Vec::new();
    collect_files(root, &mut files, stats);

    for file in files {
        let Some(target) = renamed_target(&file, rule) else {
            continue;
        };
        if move_path(&file, &target, "renaming file", stats) {
            stats.files_renamed += 1;
        }
    }
}

fn replace_in_files(root: &Path, rule: &CaseVariant, stats: &mut RenameStats) {
    let mut files = Vec::new();
    collect_files(root, &mut files, stats);

    for file in files {
        let bytes = match fs::read(&file) {
            Ok(bytes) => bytes,
            Err(e) => {
                stats.record_error("reading", &file, e);
                continue;
            }
        };

        // Binary or otherwise undecodable content is left alone.
        let Ok(content) = String::from_utf8(bytes) else {
            continue;
        };

        let count = content.matches(rule.from.as_str()).count();
        if count == 0 {
            continue;
        }

        let updated = content.replace(&rule.from, &rule.to);
        match fs::write(&file, updated) {
            Ok(()) => {
                stats.files_updated += 1;
                stats.replacements_made += count;
            }
            Err(e) => stats.record_error("writing", &file, e),
        }
    }
}

/// Rename `from` to `to`, refusing to overwrite. Returns whether it moved.
fn move_path(from: &Path, to: &Path, action: &str, stats: &mut RenameStats) -> bool {
    if to.exists() {
        stats.record_error(
            action,
            from,
            format!("target already exists: {}", to.display()),
        );
        return false;
    }

    match fs::rename(from, to) {
        Ok(()) => true,
        Err(e) => {
            stats.record_error(action, from, e);
            false
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
