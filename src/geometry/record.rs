// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Raw feature records as delivered by a backend

use super::{GeometryKind, ResultFlags};
use serde::{Deserialize, Serialize};

/// One feature emitted through the backend callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryRecord {
    pub kind: GeometryKind,
    /// Backend-assigned identity of the source feature
    pub reference_number: i32,
    pub result_flags: ResultFlags,
    pub name: String,
    pub dimensionality: u32,
    pub point_count: usize,
    /// `point_count * dimensionality` values, row-major per point
    pub coordinates: Vec<f64>,
    pub source_label: String,
}

impl GeometryRecord {
    /// Build a record whose point count is derived from the buffer length
    pub fn new(
        kind: GeometryKind,
        name: impl Into<String>,
        dimensionality: u32,
        coordinates: Vec<f64>,
        source_label: impl Into<String>,
    ) -> Self {
        let point_count = match dimensionality {
            0 => 0,
            d => coordinates.len() / d as usize,
        };
        Self {
            kind,
            reference_number: 0,
            result_flags: ResultFlags::empty(),
            name: name.into(),
            dimensionality,
            point_count,
            coordinates,
            source_label: source_label.into(),
        }
    }

    pub fn with_reference(mut self, reference_number: i32) -> Self {
        self.reference_number = reference_number;
        self
    }

    pub fn with_flags(mut self, flags: ResultFlags) -> Self {
        self.result_flags = flags;
        self
    }

    /// Placeholder name for features the source leaves unnamed
    pub fn placeholder_name(index: impl std::fmt::Display) -> String {
        format!("feat_{}", index)
    }

    pub fn is_empty(&self) -> bool {
        self.point_count == 0
    }
}
