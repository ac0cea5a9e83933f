// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Vector-format backend reading GeoJSON exports of SOSI data
//!
//! Each feature maps to Point, Curve or Surface; arcs never come out of
//! this reader. Multi-part geometries yield one record per part under the
//! same name, so the merger joins them into one object. Polygons keep only
//! their exterior ring. Coordinates are always emitted in 3D.

use super::pipeline::{FeatureSink, FeatureStatus};
use crate::error::{SosiError, SosiResult};
use crate::geometry::{GeometryKind, GeometryRecord};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Property holding the SOSI object type name
pub const NAME_PROPERTY: &str = "objekttypenavn";

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Document {
    FeatureCollection { features: Vec<Feature> },
    Feature(Feature),
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

type Position = Vec<f64>;

/// Reads a list of GeoJSON files feature by feature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorBackend {
    files: Vec<PathBuf>,
}

impl VectorBackend {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Feed every file's features to `sink`; returns the number of files read
    pub fn run(&self, sink: &mut dyn FeatureSink) -> SosiResult<usize> {
        let mut count = 0;
        for path in &self.files {
            let features = read_file(path)?;
            let label = source_label(path);
            info!(file = %path.display(), features = features.len(), "reading vector source");

            for (index, feature) in features.into_iter().enumerate() {
                for record in feature_records(index, feature, &label) {
                    if let FeatureStatus::Abort(code) = sink.accept(record) {
                        return Err(SosiError::Aborted(code));
                    }
                }
            }
            count += 1;
        }
        Ok(count)
    }
}

fn read_file(path: &Path) -> SosiResult<Vec<Feature>> {
    let content = std::fs::read_to_string(path).map_err(|source| SosiError::SourceOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let document: Document =
        serde_json::from_str(&content).map_err(|source| SosiError::SourceParse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(match document {
        Document::FeatureCollection { features } => features,
        Document::Feature(feature) => vec![feature],
    })
}

fn source_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn feature_name(index: usize, properties: Option<&Map<String, Value>>) -> String {
    properties
        .and_then(|p| p.get(NAME_PROPERTY))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| GeometryRecord::placeholder_name(index))
}

fn feature_records(index: usize, feature: Feature, label: &str) -> Vec<GeometryRecord> {
    let Some(geometry) = feature.geometry else {
        return Vec::new();
    };
    let name = feature_name(index, feature.properties.as_ref());

    let parts = match geometry_parts(&geometry) {
        Ok(Some(parts)) => parts,
        Ok(None) => {
            debug!(index, kind = %geometry.kind, "unsupported geometry type");
            return Vec::new();
        }
        Err(err) => {
            warn!(index, kind = %geometry.kind, error = %err, "malformed coordinates");
            return Vec::new();
        }
    };

    let (kind, parts) = parts;
    let mut records = Vec::with_capacity(parts.len());
    for part in parts {
        let Some(coordinates) = flatten_3d(&part) else {
            warn!(index, name = %name, "position with fewer than two values");
            continue;
        };
        records.push(
            GeometryRecord::new(kind, name.clone(), 3, coordinates, label)
                .with_reference(i32::try_from(index).unwrap_or(i32::MAX)),
        );
    }
    records
}

fn geometry_parts(
    geometry: &Geometry,
) -> Result<Option<(GeometryKind, Vec<Vec<Position>>)>, serde_json::Error> {
    let coords = geometry.coordinates.clone();
    let parts = match geometry.kind.to_uppercase().as_str() {
        "POINT" => (GeometryKind::Point, vec![vec![serde_json::from_value(coords)?]]),
        "MULTIPOINT" => (GeometryKind::Point, vec![serde_json::from_value(coords)?]),
        "LINESTRING" => (GeometryKind::Curve, vec![serde_json::from_value(coords)?]),
        "MULTILINESTRING" => (GeometryKind::Curve, serde_json::from_value(coords)?),
        "POLYGON" => {
            let rings: Vec<Vec<Position>> = serde_json::from_value(coords)?;
            (GeometryKind::Surface, rings.into_iter().take(1).collect())
        }
        "MULTIPOLYGON" => {
            let polygons: Vec<Vec<Vec<Position>>> = serde_json::from_value(coords)?;
            let exteriors = polygons
                .into_iter()
                .filter_map(|rings| rings.into_iter().next())
                .collect();
            (GeometryKind::Surface, exteriors)
        }
        _ => return Ok(None),
    };
    Ok(Some(parts))
}

fn flatten_3d(positions: &[Position]) -> Option<Vec<f64>> {
    let mut flat = Vec::with_capacity(positions.len() * 3);
    for p in positions {
        match p.as_slice() {
            [x, y] => flat.extend_from_slice(&[*x, *y, 0.0]),
            [x, y, z, ..] => flat.extend_from_slice(&[*x, *y, *z]),
            _ => return None,
        }
    }
    Some(flat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[derive(Default)]
    struct Collect(Vec<GeometryRecord>);

    impl FeatureSink for Collect {
        fn accept(&mut self, record: GeometryRecord) -> FeatureStatus {
            self.0.push(record);
            FeatureStatus::Continue
        }
    }

    fn write_geojson(body: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".geojson")
            .tempfile()
            .unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_maps_geometry_types() {
        let file = write_geojson(
            r#"{
              "type": "FeatureCollection",
              "features": [
                {"type": "Feature", "properties": {"objekttypenavn": "Fastmerke"},
                 "geometry": {"type": "Point", "coordinates": [10.0, 20.0, 3.0]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 0]]}},
                {"type": "Feature", "properties": null,
                 "geometry": {"type": "Polygon", "coordinates": [
                    [[0, 0], [1, 0], [1, 1], [0, 0]],
                    [[0.2, 0.2], [0.4, 0.2], [0.2, 0.4], [0.2, 0.2]]
                 ]}},
                {"type": "Feature", "properties": {}, "geometry": null}
              ]
            }"#,
        );

        let backend = VectorBackend::new(vec![file.path().to_path_buf()]);
        let mut sink = Collect::default();
        assert_eq!(backend.run(&mut sink).unwrap(), 1);

        let records = sink.0;
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].kind, GeometryKind::Point);
        assert_eq!(records[0].name, "Fastmerke");
        assert_eq!(records[0].coordinates, vec![10.0, 20.0, 3.0]);

        assert_eq!(records[1].kind, GeometryKind::Curve);
        assert_eq!(records[1].name, "feat_1");
        assert_eq!(records[1].reference_number, 1);
        assert_eq!(records[1].dimensionality, 3);
        assert_eq!(records[1].coordinates, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

        // Exterior ring only
        assert_eq!(records[2].kind, GeometryKind::Surface);
        assert_eq!(records[2].point_count, 4);

        let label = file.path().file_name().unwrap().to_string_lossy();
        assert!(records.iter().all(|r| r.source_label == label));
    }

    #[test]
    fn test_multi_parts_share_a_name() {
        let file = write_geojson(
            r#"{"type": "Feature", "properties": {"objekttypenavn": "Veg"},
                "geometry": {"type": "MultiLineString",
                             "coordinates": [[[0, 0], [1, 0]], [[5, 5], [6, 5], [7, 5]]]}}"#,
        );
        let mut sink = Collect::default();
        VectorBackend::new(vec![file.path().to_path_buf()])
            .run(&mut sink)
            .unwrap();

        assert_eq!(sink.0.len(), 2);
        assert!(sink.0.iter().all(|r| r.name == "Veg"));
        assert_eq!(sink.0[1].point_count, 3);
    }

    #[test]
    fn test_unsupported_and_malformed_are_skipped() {
        let file = write_geojson(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "geometry": {"type": "GeometryCollection", "geometries": []}},
                {"type": "Feature", "geometry": {"type": "LineString", "coordinates": "oops"}},
                {"type": "Feature", "geometry": {"type": "LineString", "coordinates": [[1], [2]]}}
            ]}"#,
        );
        let mut sink = Collect::default();
        let files = VectorBackend::new(vec![file.path().to_path_buf()])
            .run(&mut sink)
            .unwrap();
        assert_eq!(files, 1);
        assert!(sink.0.is_empty());
    }

    #[test]
    fn test_missing_file_fails() {
        let backend = VectorBackend::new(vec![PathBuf::from("/nonexistent/borders.geojson")]);
        let result = backend.run(&mut Collect::default());
        assert!(matches!(result, Err(SosiError::SourceOpen { .. })));
    }

    #[test]
    fn test_invalid_json_fails() {
        let file = write_geojson("{ not json");
        let backend = VectorBackend::new(vec![file.path().to_path_buf()]);
        let result = backend.run(&mut Collect::default());
        assert!(matches!(result, Err(SosiError::SourceParse { .. })));
    }

    #[test]
    fn test_abort_status_stops_run() {
        struct Stop;
        impl FeatureSink for Stop {
            fn accept(&mut self, _record: GeometryRecord) -> FeatureStatus {
                FeatureStatus::Abort(7)
            }
        }

        let file = write_geojson(
            r#"{"type": "Feature", "geometry": {"type": "Point", "coordinates": [1, 2]}}"#,
        );
        let result = VectorBackend::new(vec![file.path().to_path_buf()]).run(&mut Stop);
        assert!(matches!(result, Err(SosiError::Aborted(7))));
    }
}
