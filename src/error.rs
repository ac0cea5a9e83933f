// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for the import pipeline
//!
//! Errors fall in two classes. Feature-level errors spoil a single record;
//! the pipeline records them as diagnostics and moves on to the next
//! feature. Run-level errors end the whole run and are handed back to the
//! caller. [`SosiError::is_run_fatal`] tells them apart.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while decoding features or driving a backend
#[derive(Error, Debug)]
pub enum SosiError {
    /// Coordinate buffer declared a dimensionality other than 2 or 3
    #[error("Invalid dimensionality: {0} (expected 2 or 3)")]
    InvalidDimensionality(u32),

    /// Coordinate buffer length disagrees with `point_count * dimensionality`
    #[error("Coordinate buffer holds {actual} values, expected {expected}")]
    CoordinateCountMismatch { expected: usize, actual: usize },

    /// Arc tessellation needs at least one segment
    #[error("Invalid arc segment count: {0}")]
    InvalidSegmentCount(usize),

    /// Neither extraction backend can be used on this host
    #[error("No import backend available: {0}")]
    BackendUnavailable(String),

    /// Native SOSI library could not be loaded
    #[error("Failed to load SOSI library {path:?}: {source}")]
    LibraryLoad {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// Native SOSI library lacks an expected entry point
    #[error("SOSI library has no entry point '{symbol}': {source}")]
    MissingSymbol {
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },

    /// Vector source file could not be opened
    #[error("Failed to open vector source {path:?}: {source}")]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Vector source file is not valid GeoJSON
    #[error("Failed to parse vector source {path:?}: {source}")]
    SourceParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A feature sink asked the backend to stop
    #[error("Import aborted with status {0}")]
    Aborted(i32),

    /// Importer already ran; runs are not restarted
    #[error("Import run already finished")]
    RunFinished,

    /// Configuration is unusable
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SosiError {
    /// Whether this error ends the run rather than a single feature
    pub fn is_run_fatal(&self) -> bool {
        !matches!(
            self,
            SosiError::InvalidDimensionality(_) | SosiError::CoordinateCountMismatch { .. }
        )
    }
}

/// Result alias for import operations
pub type SosiResult<T> = Result<T, SosiError>;
