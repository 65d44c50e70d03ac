// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Object transforms (location, XYZ Euler rotation, scale)

use nalgebra::{Matrix4, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Object-level placement, baked into vertex data on finish
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub location: Vector3<f64>,
    /// Euler angles in radians, applied X then Y then Z
    pub rotation: Vector3<f64>,
    pub scale: Vector3<f64>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            location: Vector3::zeros(),
            rotation: Vector3::zeros(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn at(location: Vector3<f64>) -> Self {
        Self {
            location,
            ..Self::identity()
        }
    }

    pub fn with_rotation(mut self, rotation: Vector3<f64>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vector3<f64>) -> Self {
        self.scale = scale;
        self
    }

    pub fn rotation_matrix(&self) -> Rotation3<f64> {
        // from_euler_angles composes Rz * Ry * Rx, the XYZ order
        Rotation3::from_euler_angles(self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Local-to-world matrix: T * R * S
    pub fn matrix(&self) -> Matrix4<f64> {
        Matrix4::new_translation(&self.location)
            * self.rotation_matrix().to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
