// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! SOSI geometry import
//!
//! Reads features from Norwegian SOSI survey data, either through the
//! native SOSI reader library or from vector-format exports, and assembles
//! them into named mesh objects in a scene graph. Features sharing a name
//! are merged into one object; each source file gets its own group.

pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod import;
pub mod logging;
pub mod scene;

pub use config::ImportConfig;
pub use error::{SosiError, SosiResult};
pub use geometry::{ArcTessellator, GeometryKind, GeometryRecord, Polyline, ResultFlags};
pub use import::{Capabilities, FeatureProcessor, FeatureSink, Importer, RunReport, RunState};
pub use scene::{MeshGeometry, SceneGraph};

/// Empty scene named after the configured anchor and root group
pub fn scene_for(config: &ImportConfig) -> SceneGraph {
    SceneGraph::with_names(config.anchor_name.clone(), config.root_group.clone())
}

/// Run one import into `scene` with whatever backend the host supports
pub fn import(config: ImportConfig, scene: &mut SceneGraph) -> SosiResult<RunReport> {
    Importer::new(config).run(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_for_uses_configured_names() {
        let config = ImportConfig {
            anchor_name: "Origin".into(),
            root_group: "Survey".into(),
            ..ImportConfig::default()
        };
        let mut scene = scene_for(&config);
        scene.ensure_root_anchor();
        scene.ensure_file_group("a.sos");

        assert_eq!(scene.anchor().unwrap().name, "Origin");
        assert_eq!(scene.root_group().unwrap().name, "Survey");
    }
}
