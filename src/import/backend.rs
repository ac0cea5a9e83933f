// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Backend selection

use super::discovery::resolve_inputs;
use super::native::{default_library_path, NativeBackend};
use super::pipeline::FeatureSink;
use super::report::SurveyOrigin;
use super::vector::VectorBackend;
use crate::config::ImportConfig;
use crate::error::{SosiError, SosiResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    /// Dynamic SOSI reader library
    Native,
    /// Vector-format file reader
    Vector,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Native => write!(f, "native"),
            BackendKind::Vector => write!(f, "vector"),
        }
    }
}

/// What the host offers for reading SOSI data
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Host platform can run the native library
    pub native_platform: bool,
    /// Native library file, when one exists on disk
    pub native_library: Option<PathBuf>,
    /// Vector reader compiled in
    pub vector_reader: bool,
}

impl Capabilities {
    /// Probe the running host
    pub fn detect(config: &ImportConfig) -> Self {
        let library = config
            .library_path
            .clone()
            .unwrap_or_else(default_library_path);
        Self {
            native_platform: cfg!(target_os = "windows"),
            native_library: library.is_file().then_some(library),
            vector_reader: cfg!(feature = "vector"),
        }
    }

    /// Nothing usable
    pub fn none() -> Self {
        Self::default()
    }

    /// Backend to use, preferring the native library
    pub fn preferred(&self) -> Option<BackendKind> {
        if self.native_platform && self.native_library.is_some() {
            Some(BackendKind::Native)
        } else if self.vector_reader {
            Some(BackendKind::Vector)
        } else {
            None
        }
    }
}

/// Result of a backend's enumeration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BackendRun {
    pub file_count: usize,
    pub origin: Option<SurveyOrigin>,
}

/// The extraction backend chosen for a run
#[derive(Debug)]
pub enum Backend {
    Native(NativeBackend),
    Vector(VectorBackend),
}

impl Backend {
    /// Choose once, at the start of a run
    pub fn select(capabilities: &Capabilities, config: &ImportConfig) -> SosiResult<Self> {
        match (capabilities.preferred(), &capabilities.native_library) {
            (Some(BackendKind::Native), Some(path)) => {
                Ok(Backend::Native(NativeBackend::new(path.clone(), config.scene)))
            }
            (Some(BackendKind::Vector), _) => {
                Ok(Backend::Vector(VectorBackend::new(resolve_inputs(config))))
            }
            _ => Err(SosiError::BackendUnavailable(
                "SOSI library not usable on this host and vector reader not built".into(),
            )),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Native(_) => BackendKind::Native,
            Backend::Vector(_) => BackendKind::Vector,
        }
    }

    /// Enumerate every input feature into `sink`
    pub fn run(&mut self, sink: &mut dyn FeatureSink) -> SosiResult<BackendRun> {
        match self {
            Backend::Native(native) => native.run(sink),
            Backend::Vector(vector) => vector.run(sink).map(|file_count| BackendRun {
                file_count,
                origin: None,
            }),
        }
    }
}
