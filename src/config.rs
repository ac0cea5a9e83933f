// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Import configuration

use crate::error::{SosiError, SosiResult};
use crate::geometry::DEFAULT_ARC_SEGMENTS;
use crate::logging::LogLevel;
use crate::scene::{DEFAULT_ANCHOR_NAME, DEFAULT_ROOT_GROUP};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory
pub const CONFIG_FILE_NAME: &str = "sosi.toml";

/// Environment variable holding a path list of input files
pub const ENV_INPUT_FILES: &str = "SOSI_FILES";
pub const ENV_LIBRARY_PATH: &str = "SOSI_LIBRARY_PATH";
pub const ENV_LOG_LEVEL: &str = "SOSI_LOG_LEVEL";

/// Host unit system, numbered as the native library expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnitSystem {
    None,
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn code(&self) -> i32 {
        match self {
            UnitSystem::None => 0,
            UnitSystem::Metric => 1,
            UnitSystem::Imperial => 2,
        }
    }
}

/// Host length unit, numbered as the native library expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnitLength {
    Adaptive,
    Micrometers,
    Millimeters,
    Centimeters,
    #[default]
    Meters,
    Kilometers,
    /// aka mil
    Thou,
    Inches,
    Feet,
    Miles,
}

impl UnitLength {
    pub fn code(&self) -> i32 {
        match self {
            UnitLength::Adaptive => 0,
            UnitLength::Micrometers => 1,
            UnitLength::Millimeters => 2,
            UnitLength::Centimeters => 3,
            UnitLength::Meters => 4,
            UnitLength::Kilometers => 5,
            UnitLength::Thou => 6,
            UnitLength::Inches => 7,
            UnitLength::Feet => 8,
            UnitLength::Miles => 9,
        }
    }
}

/// Scene parameters handed to the native library's discovery call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneUnits {
    pub unit_system: UnitSystem,
    pub unit_length: UnitLength,
    pub unit_scale: f64,
    /// View clip distance
    pub clip_end: f64,
    /// Scale applied to SOSI meter values
    pub scene_scale: f64,
}

impl Default for SceneUnits {
    fn default() -> Self {
        Self {
            unit_system: UnitSystem::default(),
            unit_length: UnitLength::default(),
            unit_scale: 1.0,
            clip_end: 1000.0,
            scene_scale: 1.0,
        }
    }
}

/// Import configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Native SOSI library; `None` means the platform default name
    pub library_path: Option<PathBuf>,
    /// Input files or directories for the vector backend
    pub input_files: Vec<PathBuf>,
    /// Sample used when no input is given
    pub default_input: PathBuf,
    /// Segments per BUEP arc
    pub arc_segments: usize,
    pub log_level: LogLevel,
    pub anchor_name: String,
    pub root_group: String,
    pub scene: SceneUnits,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            library_path: None,
            input_files: Vec::new(),
            default_input: PathBuf::from("test_data/SomeBorders.geojson"),
            arc_segments: DEFAULT_ARC_SEGMENTS,
            log_level: LogLevel::default(),
            anchor_name: DEFAULT_ANCHOR_NAME.to_string(),
            root_group: DEFAULT_ROOT_GROUP.to_string(),
            scene: SceneUnits::default(),
        }
    }
}

impl ImportConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: ImportConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `sosi.toml` when present, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE_NAME).exists() {
            Self::from_file(CONFIG_FILE_NAME)?
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var_os(key));
        Ok(config)
    }

    /// Apply overrides from a variable lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<std::ffi::OsString>,
    {
        if let Some(files) = lookup(ENV_INPUT_FILES).filter(|v| !v.is_empty()) {
            self.input_files = std::env::split_paths(&files).collect();
        }

        if let Some(path) = lookup(ENV_LIBRARY_PATH).filter(|v| !v.is_empty()) {
            self.library_path = Some(PathBuf::from(path));
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            if let Some(level) = level.to_str().and_then(|s| s.parse().ok()) {
                self.log_level = level;
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    pub fn validate(&self) -> SosiResult<()> {
        if self.arc_segments == 0 {
            return Err(SosiError::InvalidSegmentCount(0));
        }
        if self.anchor_name.trim().is_empty() {
            return Err(SosiError::Config("anchor_name must not be empty".into()));
        }
        if self.root_group.trim().is_empty() {
            return Err(SosiError::Config("root_group must not be empty".into()));
        }
        Ok(())
    }
}
