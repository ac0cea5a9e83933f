// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! In-memory scene graph: anchor, groups and mesh objects
//!
//! The graph is passed explicitly to everything that mutates it. It is not
//! synchronized; callers that deliver features from several threads must
//! serialize access themselves.

use super::MeshGeometry;
use crate::geometry::BoundingBox;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Anchor object name used when none is configured
pub const DEFAULT_ANCHOR_NAME: &str = "SOSI_Parent";
/// Root group name used when none is configured
pub const DEFAULT_ROOT_GROUP: &str = "SOSI";

/// Index of a mesh object in its scene graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(usize);

/// Index of a group in its scene graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(usize);

/// Handle to the shared parent anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorId(());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorDisplay {
    Sphere,
    PlainAxes,
}

/// Empty object every imported mesh hangs under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub name: String,
    pub display: AnchorDisplay,
    pub display_size: f64,
}

/// Per-axis transform locks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransformLock {
    pub location: [bool; 3],
    pub rotation: [bool; 3],
    pub scale: [bool; 3],
}

impl TransformLock {
    pub fn all() -> Self {
        Self {
            location: [true; 3],
            rotation: [true; 3],
            scale: [true; 3],
        }
    }

    pub fn is_fully_locked(&self) -> bool {
        *self == Self::all()
    }
}

/// Named container in the scene hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub children: Vec<GroupId>,
    pub objects: Vec<ObjectId>,
}

impl Group {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            objects: Vec::new(),
        }
    }
}

/// Mesh entity assembled from one or more features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshObject {
    pub name: String,
    pub mesh: MeshGeometry,
    pub parent: Option<AnchorId>,
    pub group: GroupId,
    pub transform_lock: TransformLock,
}

impl MeshObject {
    pub fn is_transform_locked(&self) -> bool {
        self.transform_lock.is_fully_locked()
    }
}

/// Scene state shared by all import runs
#[derive(Debug, Clone)]
pub struct SceneGraph {
    anchor_name: String,
    root_group_name: String,
    anchor: Option<Anchor>,
    root_group: Option<GroupId>,
    groups: Vec<Group>,
    file_groups: AHashMap<String, GroupId>,
    objects: Vec<MeshObject>,
    object_names: AHashMap<String, ObjectId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::with_names(DEFAULT_ANCHOR_NAME, DEFAULT_ROOT_GROUP)
    }

    pub fn with_names(anchor_name: impl Into<String>, root_group_name: impl Into<String>) -> Self {
        Self {
            anchor_name: anchor_name.into(),
            root_group_name: root_group_name.into(),
            anchor: None,
            root_group: None,
            groups: Vec::new(),
            file_groups: AHashMap::new(),
            objects: Vec::new(),
            object_names: AHashMap::new(),
        }
    }

    /// Create the shared anchor on first use
    pub fn ensure_root_anchor(&mut self) -> AnchorId {
        if self.anchor.is_none() {
            debug!(name = %self.anchor_name, "creating anchor object");
            self.anchor = Some(Anchor {
                name: self.anchor_name.clone(),
                display: AnchorDisplay::Sphere,
                display_size: 1.0,
            });
        }
        AnchorId(())
    }

    /// Group for a source file, created under the root group on first use
    pub fn ensure_file_group(&mut self, source_label: &str) -> GroupId {
        if let Some(&id) = self.file_groups.get(source_label) {
            return id;
        }

        let root = self.ensure_root_group();
        let id = self.push_group(Group::new(source_label));
        self.groups[root.0].children.push(id);
        self.file_groups.insert(source_label.to_string(), id);
        debug!(group = source_label, "created file group");
        id
    }

    /// Lock translation, rotation and scale of a parented object.
    ///
    /// Parentless objects are left alone. Returns whether the lock applied.
    pub fn lock_transform(&mut self, id: ObjectId) -> bool {
        match self.objects.get_mut(id.0) {
            Some(object) if object.parent.is_some() => {
                object.transform_lock = TransformLock::all();
                true
            }
            _ => false,
        }
    }

    /// Create a named mesh object and link it into `group`
    pub(crate) fn insert_object(
        &mut self,
        name: &str,
        mesh: MeshGeometry,
        group: GroupId,
        parent: Option<AnchorId>,
    ) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.objects.push(MeshObject {
            name: name.to_string(),
            mesh,
            parent,
            group,
            transform_lock: TransformLock::default(),
        });
        self.groups[group.0].objects.push(id);
        self.object_names.insert(name.to_string(), id);
        id
    }

    pub(crate) fn object_mut(&mut self, id: ObjectId) -> Option<&mut MeshObject> {
        self.objects.get_mut(id.0)
    }

    fn ensure_root_group(&mut self) -> GroupId {
        match self.root_group {
            Some(id) => id,
            None => {
                let id = self.push_group(Group::new(self.root_group_name.clone()));
                self.root_group = Some(id);
                id
            }
        }
    }

    fn push_group(&mut self, group: Group) -> GroupId {
        let id = GroupId(self.groups.len());
        self.groups.push(group);
        id
    }

    /// Look up a mesh object by exact name
    pub fn object_id(&self, name: &str) -> Option<ObjectId> {
        self.object_names.get(name).copied()
    }

    pub fn mesh_object_named(&self, name: &str) -> Option<&MeshObject> {
        self.object_id(name).and_then(|id| self.object(id))
    }

    pub fn object(&self, id: ObjectId) -> Option<&MeshObject> {
        self.objects.get(id.0)
    }

    pub fn objects(&self) -> &[MeshObject] {
        &self.objects
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn anchor(&self) -> Option<&Anchor> {
        self.anchor.as_ref()
    }

    pub fn root_group(&self) -> Option<&Group> {
        self.root_group.and_then(|id| self.group(id))
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id.0)
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn file_group(&self, source_label: &str) -> Option<GroupId> {
        self.file_groups.get(source_label).copied()
    }

    /// Extent of every imported vertex
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.objects.iter().flat_map(|o| o.mesh.vertices.iter()))
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
