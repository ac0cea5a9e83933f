// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene module - object hierarchy and name-keyed mesh merging

mod graph;
mod merge;
mod mesh;

pub use graph::{
    Anchor, AnchorDisplay, AnchorId, Group, GroupId, MeshObject, ObjectId, SceneGraph,
    TransformLock, DEFAULT_ANCHOR_NAME, DEFAULT_ROOT_GROUP,
};
pub use merge::{merge_into_scene, MeshCandidate, MergeOutcome};
pub use mesh::MeshGeometry;
