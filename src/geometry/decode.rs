// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Coordinate decoding from flat backend buffers

use crate::error::{SosiError, SosiResult};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Ordered survey points
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point3<f64>>,
}

impl Polyline {
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First and last points coincide exactly.
    ///
    /// Zero tolerance: every component must compare equal. A single point
    /// is never a loop.
    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) if self.points.len() > 1 => first == last,
            _ => false,
        }
    }

    /// Flatten back into a row-major buffer of the given dimensionality
    pub fn flatten(&self, dimensionality: u32) -> SosiResult<Vec<f64>> {
        let dims = checked_dimensionality(dimensionality)?;
        let mut out = Vec::with_capacity(self.points.len() * dims);
        for p in &self.points {
            out.extend_from_slice(&p.coords.as_slice()[..dims]);
        }
        Ok(out)
    }
}

impl From<Vec<Point3<f64>>> for Polyline {
    fn from(points: Vec<Point3<f64>>) -> Self {
        Self::new(points)
    }
}

fn checked_dimensionality(dimensionality: u32) -> SosiResult<usize> {
    match dimensionality {
        2 | 3 => Ok(dimensionality as usize),
        other => Err(SosiError::InvalidDimensionality(other)),
    }
}

/// Decode `point_count` points from a flat coordinate buffer.
///
/// 2D input gets a zero Z component.
pub fn decode_coordinates(
    dimensionality: u32,
    point_count: usize,
    coordinates: &[f64],
) -> SosiResult<Polyline> {
    let dims = checked_dimensionality(dimensionality)?;
    let expected = point_count * dims;
    if coordinates.len() != expected {
        return Err(SosiError::CoordinateCountMismatch {
            expected,
            actual: coordinates.len(),
        });
    }

    let points = coordinates
        .chunks_exact(dims)
        .map(|c| Point3::new(c[0], c[1], if dims == 3 { c[2] } else { 0.0 }))
        .collect();

    Ok(Polyline::new(points))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_3d() {
        let line = decode_coordinates(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(line.len(), 2);
        assert_eq!(line.points[0], Point3::new(1.0, 2.0, 3.0));
        assert_eq!(line.points[1], Point3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_decode_2d_zero_z() {
        let line = decode_coordinates(2, 2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(line.points[0], Point3::new(1.0, 2.0, 0.0));
        assert_eq!(line.points[1], Point3::new(3.0, 4.0, 0.0));
    }

    #[test]
    fn test_decode_rejects_bad_dimensionality() {
        for dims in [0, 1, 4] {
            let result = decode_coordinates(dims, 1, &[0.0; 4]);
            assert!(matches!(result, Err(SosiError::InvalidDimensionality(d)) if d == dims));
        }
    }

    #[test]
    fn test_decode_rejects_short_buffer() {
        let result = decode_coordinates(3, 2, &[0.0; 5]);
        assert!(matches!(
            result,
            Err(SosiError::CoordinateCountMismatch {
                expected: 6,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_decode_empty() {
        let line = decode_coordinates(3, 0, &[]).unwrap();
        assert!(line.is_empty());
        assert!(!line.is_closed());
    }

    #[test]
    fn test_round_trip() {
        let buffers: [(u32, Vec<f64>); 3] = [
            (2, vec![0.5, -1.25, 1e9, 6.5e-3]),
            (3, vec![595_000.12, 6_640_000.5, 12.75, 595_010.0, 6_640_010.0, -3.0]),
            (3, vec![f64::MIN_POSITIVE, -0.0, f64::MAX]),
        ];
        for (dims, buffer) in buffers {
            let count = buffer.len() / dims as usize;
            let line = decode_coordinates(dims, count, &buffer).unwrap();
            let flat = line.flatten(dims).unwrap();
            let same_bits = flat
                .iter()
                .zip(&buffer)
                .all(|(a, b)| a.to_bits() == b.to_bits());
            assert!(same_bits, "round trip changed {:?}", buffer);
        }
    }

    #[test]
    fn test_closed_detection() {
        let open = Polyline::new(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)]);
        assert!(!open.is_closed());

        let closed = Polyline::new(vec![
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::origin(),
        ]);
        assert!(closed.is_closed());

        let nearly = Polyline::new(vec![
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1e-12, 0.0, 0.0),
        ]);
        assert!(!nearly.is_closed());

        let single = Polyline::new(vec![Point3::origin()]);
        assert!(!single.is_closed());
    }
}
