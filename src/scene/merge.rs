// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Name-keyed merging of feature geometry into scene objects
//!
//! An object's name is its identity: a feature whose name matches an
//! existing object byte for byte is appended to that object, anything else
//! starts a new one. Case and whitespace count.

use super::{MeshGeometry, ObjectId, SceneGraph};
use tracing::debug;

/// Geometry of one feature, ready to be placed in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct MeshCandidate {
    pub name: String,
    pub mesh: MeshGeometry,
}

impl MeshCandidate {
    pub fn new(name: impl Into<String>, mesh: MeshGeometry) -> Self {
        Self {
            name: name.into(),
            mesh,
        }
    }
}

/// What happened to a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// A new object was created, parented, grouped and locked
    Created(ObjectId),
    /// The candidate was appended to an existing object
    Merged {
        id: ObjectId,
        /// Index of the first appended vertex
        vertex_offset: usize,
    },
}

impl MergeOutcome {
    pub fn object_id(&self) -> ObjectId {
        match self {
            MergeOutcome::Created(id) | MergeOutcome::Merged { id, .. } => *id,
        }
    }

    pub fn is_merge(&self) -> bool {
        matches!(self, MergeOutcome::Merged { .. })
    }
}

/// Place a candidate in the scene, merging by exact name.
///
/// The group for `source_label` is created on first use either way. New
/// objects go under the shared anchor, into that group, with their
/// transform locked. Merged objects keep their parent, group and lock.
pub fn merge_into_scene(
    scene: &mut SceneGraph,
    source_label: &str,
    candidate: MeshCandidate,
) -> MergeOutcome {
    let MeshCandidate { name, mesh } = candidate;
    let group = scene.ensure_file_group(source_label);

    if let Some(id) = scene.object_id(&name) {
        if let Some(object) = scene.object_mut(id) {
            let vertex_offset = object.mesh.append(mesh);
            debug!(
                name = %name,
                vertex_offset,
                vertices = object.mesh.vertex_count(),
                "joined feature into existing object"
            );
            return MergeOutcome::Merged { id, vertex_offset };
        }
    }

    let anchor = scene.ensure_root_anchor();
    let id = scene.insert_object(&name, mesh, group, Some(anchor));
    scene.lock_transform(id);
    MergeOutcome::Created(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn segment(x0: f64, x1: f64) -> MeshGeometry {
        MeshGeometry::new(
            vec![Point3::new(x0, 0.0, 0.0), Point3::new(x1, 0.0, 0.0)],
            vec![[0, 1]],
            Vec::new(),
        )
    }

    fn wall(x0: f64, x1: f64) -> MeshCandidate {
        MeshCandidate::new("Wall", segment(x0, x1))
    }

    #[test]
    fn test_first_feature_creates_object() {
        let mut scene = SceneGraph::new();
        let outcome = merge_into_scene(&mut scene, "a.sos", wall(0.0, 1.0));

        let MergeOutcome::Created(id) = outcome else {
            panic!("expected a new object, got {:?}", outcome);
        };
        let object = scene.object(id).unwrap();
        assert_eq!(object.name, "Wall");
        assert!(object.parent.is_some());
        assert!(object.is_transform_locked());
        assert_eq!(Some(object.group), scene.file_group("a.sos"));
        assert!(scene.anchor().is_some());
    }

    #[test]
    fn test_same_name_merges() {
        let mut scene = SceneGraph::new();
        let first = merge_into_scene(&mut scene, "a.sos", wall(0.0, 1.0));
        let second = merge_into_scene(&mut scene, "a.sos", wall(2.0, 3.0));

        assert_eq!(scene.object_count(), 1);
        assert_eq!(
            second,
            MergeOutcome::Merged {
                id: first.object_id(),
                vertex_offset: 2
            }
        );
        let wall = scene.mesh_object_named("Wall").unwrap();
        assert_eq!(wall.mesh.vertex_count(), 4);
        assert_eq!(wall.mesh.edges, vec![[0, 1], [2, 3]]);
    }

    #[test]
    fn test_merge_keeps_original_group() {
        let mut scene = SceneGraph::new();
        merge_into_scene(&mut scene, "a.sos", wall(0.0, 1.0));
        let outcome = merge_into_scene(&mut scene, "b.sos", wall(2.0, 3.0));

        assert!(outcome.is_merge());
        let wall = scene.object(outcome.object_id()).unwrap();
        assert_eq!(Some(wall.group), scene.file_group("a.sos"));
        assert!(wall.is_transform_locked());

        // The second file still got its group
        let b = scene.file_group("b.sos").unwrap();
        assert!(scene.group(b).unwrap().objects.is_empty());
    }

    #[test]
    fn test_names_must_match_exactly() {
        let mut scene = SceneGraph::new();
        for name in ["Wall", "Wall ", "wall", " Wall"] {
            merge_into_scene(&mut scene, "a.sos", MeshCandidate::new(name, segment(0.0, 1.0)));
        }
        assert_eq!(scene.object_count(), 4);
    }
}
