// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Input file selection for the vector backend

use crate::config::ImportConfig;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions picked up when an input entry is a directory
const VECTOR_EXTENSIONS: &[&str] = &["geojson", "json"];

/// Files to import: configured inputs, or the default sample.
///
/// Directory entries expand to the vector files beneath them, sorted by
/// path. Plain file entries are kept as given, even if missing, so that
/// the backend reports them.
pub fn resolve_inputs(config: &ImportConfig) -> Vec<PathBuf> {
    let entries: Vec<&Path> = if config.input_files.is_empty() {
        vec![config.default_input.as_path()]
    } else {
        config.input_files.iter().map(PathBuf::as_path).collect()
    };

    let mut files = Vec::new();
    for entry in entries {
        if entry.is_dir() {
            files.extend(discover_vector_files(entry));
        } else {
            files.push(entry.to_path_buf());
        }
    }
    files
}

fn discover_vector_files(dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_vector_file(e.path()))
        .map(|e| e.into_path())
        .collect();
    found.sort();
    found
}

fn is_vector_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VECTOR_EXTENSIONS.iter().any(|v| ext.eq_ignore_ascii_case(v)))
        .unwrap_or(false)
}
