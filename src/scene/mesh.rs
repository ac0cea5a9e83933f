// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh data carried by scene objects

use crate::geometry::{BoundingBox, Edge};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Vertices, edges and n-gon faces of a mesh
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshGeometry {
    pub vertices: Vec<Point3<f64>>,
    pub edges: Vec<Edge>,
    pub faces: Vec<Vec<usize>>,
}

impl MeshGeometry {
    pub fn new(vertices: Vec<Point3<f64>>, edges: Vec<Edge>, faces: Vec<Vec<usize>>) -> Self {
        Self {
            vertices,
            edges,
            faces,
        }
    }

    /// Loose vertices with no edges or faces
    pub fn point_cloud(vertices: Vec<Point3<f64>>) -> Self {
        Self::new(vertices, Vec::new(), Vec::new())
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Append another mesh, shifting its indices past the current vertices.
    ///
    /// Coincident vertices are kept as they are. Returns the offset applied
    /// to the appended indices.
    pub fn append(&mut self, other: MeshGeometry) -> usize {
        let offset = self.vertices.len();
        self.vertices.extend(other.vertices);
        self.edges
            .extend(other.edges.into_iter().map(|[a, b]| [a + offset, b + offset]));
        self.faces.extend(
            other
                .faces
                .into_iter()
                .map(|face| face.into_iter().map(|i| i + offset).collect()),
        );
        offset
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_offsets_indices() {
        let mut a = MeshGeometry::new(
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)],
            vec![[0, 1]],
            Vec::new(),
        );
        let b = MeshGeometry::new(
            vec![
                Point3::origin(),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
            vec![[0, 1], [1, 2], [2, 0]],
            vec![vec![0, 1, 2]],
        );

        let offset = a.append(b);
        assert_eq!(offset, 2);
        assert_eq!(a.vertex_count(), 5);
        assert_eq!(a.edges, vec![[0, 1], [2, 3], [3, 4], [4, 2]]);
        assert_eq!(a.faces, vec![vec![2, 3, 4]]);
        // Coincident vertices stay duplicated
        assert_eq!(a.vertices[0], a.vertices[2]);
    }

    #[test]
    fn test_point_cloud() {
        let mesh = MeshGeometry::point_cloud(vec![Point3::new(1.0, 2.0, 3.0)]);
        assert_eq!(mesh.vertex_count(), 1);
        assert_eq!(mesh.edge_count(), 0);
        assert_eq!(mesh.face_count(), 0);
    }
}
