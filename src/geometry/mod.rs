// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - feature records, decoding, topology and arcs

mod arc;
mod bbox;
mod decode;
mod kind;
mod record;
mod topology;

pub use arc::{ArcTessellator, DEFAULT_ARC_SEGMENTS};
pub use bbox::BoundingBox;
pub use decode::{decode_coordinates, Polyline};
pub use kind::{GeometryKind, ResultFlags};
pub use record::GeometryRecord;
pub use topology::{build_edges, Edge, EdgeTopology};
