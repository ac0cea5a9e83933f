// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Edge topology for survey polylines

use super::Polyline;
use serde::{Deserialize, Serialize};

/// Edge between two vertex indices
pub type Edge = [usize; 2];

/// Edge set of a single polyline plus its loop status
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EdgeTopology {
    pub edges: Vec<Edge>,
    pub closed: bool,
}

impl EdgeTopology {
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// Connect consecutive points in survey order.
///
/// No closing edge is invented; a loop is only closed when the source
/// repeats its first point at the end.
pub fn build_edges(line: &Polyline) -> EdgeTopology {
    let n = line.len();
    let edges = (1..n).map(|i| [i - 1, i]).collect();
    EdgeTopology {
        edges,
        closed: line.is_closed(),
    }
}
