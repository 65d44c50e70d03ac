// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation and operations

mod bbox;
mod bisect;
mod mesh;
mod primitives;
mod shading;
mod transform;

pub use bbox::BoundingBox;
pub use bisect::{bisect, Plane};
pub use mesh::{Mesh, Triangle, Vertex};
pub use primitives::{Bevel, Primitive, MIN_RINGS, MIN_SEGMENTS};
pub use shading::{shade_smooth, AUTO_SMOOTH_ANGLE_DEG};
pub use transform::Transform;

use thiserror::Error;

/// Errors raised while generating geometry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("{kind} needs at least {min} segments, got {segments}")]
    TooFewSegments {
        kind: &'static str,
        segments: u32,
        min: u32,
    },

    #[error("{kind} dimension must be positive and finite, got {value}")]
    InvalidDimension { kind: &'static str, value: f64 },

    #[error("cut plane normal must be non-zero")]
    DegeneratePlane,
}
