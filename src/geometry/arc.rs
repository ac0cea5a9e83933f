// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Arc tessellation through three survey points

use super::Polyline;
use crate::error::{SosiError, SosiResult};
use nalgebra::{Point3, Rotation3, Unit, Vector3};
use std::f64::consts::TAU;

/// Segments used for a BUEP arc when nothing else is configured
pub const DEFAULT_ARC_SEGMENTS: usize = 8;

/// Relative threshold below which the three points count as collinear
const COLLINEAR_EPSILON: f64 = 1e-12;

/// Expands start/through/end arc definitions into polylines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcTessellator {
    segments: usize,
}

impl ArcTessellator {
    pub fn new(segments: usize) -> SosiResult<Self> {
        if segments == 0 {
            return Err(SosiError::InvalidSegmentCount(segments));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> usize {
        self.segments
    }

    /// Tessellate the circular arc from `start` through `through` to `end`.
    ///
    /// Yields `segments + 1` points at equal angular steps, with the
    /// endpoints copied verbatim. Collinear or coincident input has no
    /// defined circle and collapses to the straight segment `[start, end]`.
    pub fn tessellate(
        &self,
        start: Point3<f64>,
        through: Point3<f64>,
        end: Point3<f64>,
    ) -> Polyline {
        let Some(circle) = Circle::through(&start, &through, &end) else {
            return Polyline::new(vec![start, end]);
        };

        let from_center = start - circle.center;
        let sweep = circle.sweep_to(&from_center, &(end - circle.center));

        let mut points = Vec::with_capacity(self.segments + 1);
        points.push(start);
        for i in 1..self.segments {
            let t = i as f64 / self.segments as f64;
            let rotation = Rotation3::from_axis_angle(&circle.axis, sweep * t);
            points.push(circle.center + rotation * from_center);
        }
        points.push(end);

        Polyline::new(points)
    }

    /// Tessellate an arc given as its decoded definition points
    pub fn tessellate_polyline(&self, definition: &Polyline) -> Option<Polyline> {
        match definition.points.as_slice() {
            [start, through, end] => Some(self.tessellate(*start, *through, *end)),
            _ => None,
        }
    }
}

impl Default for ArcTessellator {
    fn default() -> Self {
        Self {
            segments: DEFAULT_ARC_SEGMENTS,
        }
    }
}

/// Circle through three points, oriented so that start → through → end
/// runs counter-clockwise around `axis`
struct Circle {
    center: Point3<f64>,
    axis: Unit<Vector3<f64>>,
}

impl Circle {
    fn through(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<Self> {
        let ac = a - c;
        let bc = b - c;
        let normal = ac.cross(&bc);
        let normal_sq = normal.norm_squared();
        let scale = ac.norm_squared() * bc.norm_squared();
        if scale == 0.0 || normal_sq <= COLLINEAR_EPSILON * scale {
            return None;
        }

        let offset = (bc * ac.norm_squared() - ac * bc.norm_squared()).cross(&normal)
            / (2.0 * normal_sq);
        let center = c + offset;

        let axis = Unit::try_new((b - a).cross(&(c - b)), 0.0)?;
        Some(Self { center, axis })
    }

    /// Counter-clockwise angle in (0, 2π] from `from` to `to`
    fn sweep_to(&self, from: &Vector3<f64>, to: &Vector3<f64>) -> f64 {
        let angle = self.axis.dot(&from.cross(to)).atan2(from.dot(to));
        if angle <= 0.0 {
            angle + TAU
        } else {
            angle
        }
    }
}
