// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Feature kinds and backend result flags

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// SOSI geometry kind, as numbered on the backend callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    Curve,
    Surface,
    Arc,
}

impl GeometryKind {
    /// Decode the callback's kind code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(GeometryKind::Point),
            1 => Some(GeometryKind::Curve),
            2 => Some(GeometryKind::Surface),
            3 => Some(GeometryKind::Arc),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            GeometryKind::Point => 0,
            GeometryKind::Curve => 1,
            GeometryKind::Surface => 2,
            GeometryKind::Arc => 3,
        }
    }

    /// SOSI keyword for this kind
    pub fn keyword(&self) -> &'static str {
        match self {
            GeometryKind::Point => "PUNKT",
            GeometryKind::Curve => "KURVE",
            GeometryKind::Surface => "FLATE",
            GeometryKind::Arc => "BUEP",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

bitflags! {
    /// Per-feature result bits reported by a backend
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ResultFlags: u32 {
        const GENERAL_ERROR = 0x0001;
        const DIMENSION_MISMATCH = 0x0010;
        const LOOP_UNCLOSED = 0x0100;
    }
}
