// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives generator
//!
//! All primitives are centered on the origin with Z as the long axis,
//! matching the placement conventions used by the body assembler.

use super::{GeometryError, Mesh, Triangle, Vertex};
use nalgebra::{Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_4, PI};

/// Minimum radial resolution of a cylinder or sphere
pub const MIN_SEGMENTS: u32 = 3;
/// Minimum ring count of a UV sphere
pub const MIN_RINGS: u32 = 2;

/// Edge rounding applied to a cube before shading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bevel {
    pub width: f64,
    pub segments: u32,
}

/// Geometric primitives
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    Cylinder {
        radius: f64,
        depth: f64,
        segments: u32,
    },
    UvSphere {
        radius: f64,
        segments: u32,
        rings: u32,
    },
    Cube {
        size: Vector3<f64>,
        bevel: Option<Bevel>,
    },
}

impl Primitive {
    pub fn cylinder(radius: f64, depth: f64, segments: u32) -> Self {
        Self::Cylinder {
            radius,
            depth,
            segments,
        }
    }

    pub fn uv_sphere(radius: f64, segments: u32, rings: u32) -> Self {
        Self::UvSphere {
            radius,
            segments,
            rings,
        }
    }

    pub fn cube(size: f64) -> Self {
        Self::Cube {
            size: Vector3::new(size, size, size),
            bevel: None,
        }
    }

    /// Attach a bevel modifier; no-op for non-cube primitives
    pub fn bevelled(self, bevel: Bevel) -> Self {
        match self {
            Self::Cube { size, .. } => Self::Cube {
                size,
                bevel: Some(bevel),
            },
            other => other,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Cylinder { .. } => "cylinder",
            Self::UvSphere { .. } => "uv_sphere",
            Self::Cube { .. } => "cube",
        }
    }

    /// Reject resolutions and dimensions that would degenerate
    pub fn validate(&self) -> Result<(), GeometryError> {
        let kind = self.kind();
        let positive = |value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(GeometryError::InvalidDimension { kind, value })
            }
        };

        match *self {
            Self::Cylinder {
                radius,
                depth,
                segments,
            } => {
                check_segments(kind, segments, MIN_SEGMENTS)?;
                positive(radius)?;
                positive(depth)
            }
            Self::UvSphere {
                radius,
                segments,
                rings,
            } => {
                check_segments(kind, segments, MIN_SEGMENTS)?;
                check_segments(kind, rings, MIN_RINGS)?;
                positive(radius)
            }
            Self::Cube { size, bevel } => {
                positive(size.x)?;
                positive(size.y)?;
                positive(size.z)?;
                if let Some(bevel) = bevel {
                    if !bevel.width.is_finite() || bevel.width < 0.0 {
                        return Err(GeometryError::InvalidDimension {
                            kind: "bevel",
                            value: bevel.width,
                        });
                    }
                    check_segments("bevel", bevel.segments, 1)?;
                }
                Ok(())
            }
        }
    }

    pub fn to_mesh(&self) -> Mesh {
        match *self {
            Self::Cylinder {
                radius,
                depth,
                segments,
            } => generate_cylinder_mesh(radius, depth, segments),
            Self::UvSphere {
                radius,
                segments,
                rings,
            } => generate_sphere_mesh(radius, segments, rings),
            Self::Cube { size, bevel } => generate_cube_mesh(size, bevel),
        }
    }
}

fn check_segments(kind: &'static str, segments: u32, min: u32) -> Result<(), GeometryError> {
    if segments < min {
        Err(GeometryError::TooFewSegments {
            kind,
            segments,
            min,
        })
    } else {
        Ok(())
    }
}

fn generate_cylinder_mesh(radius: f64, depth: f64, segments: u32) -> Mesh {
    let n = segments as usize;
    let half = depth / 2.0;
    let mut mesh = Mesh::with_capacity(4 * n + 2, 4 * n);

    // Side wall, seam column duplicated for texture coordinates
    for i in 0..=n {
        let angle = 2.0 * PI * i as f64 / n as f64;
        let (sin, cos) = angle.sin_cos();
        let normal = Vector3::new(cos, sin, 0.0);
        let u = i as f64 / n as f64;
        mesh.add_vertex(Vertex::new(
            Point3::new(radius * cos, radius * sin, -half),
            normal,
            Vector2::new(u, 0.0),
        ));
        mesh.add_vertex(Vertex::new(
            Point3::new(radius * cos, radius * sin, half),
            normal,
            Vector2::new(u, 1.0),
        ));
    }

    for i in 0..n {
        let b0 = 2 * i;
        let t0 = b0 + 1;
        let b1 = b0 + 2;
        let t1 = b0 + 3;
        mesh.add_triangle(Triangle::new([b0, b1, t1]));
        mesh.add_triangle(Triangle::new([b0, t1, t0]));
    }

    // N-gon caps, fan triangulated
    for (z, nz) in [(-half, -1.0), (half, 1.0)] {
        let base = mesh.vertex_count();
        for i in 0..n {
            let angle = 2.0 * PI * i as f64 / n as f64;
            let (sin, cos) = angle.sin_cos();
            mesh.add_vertex(Vertex::new(
                Point3::new(radius * cos, radius * sin, z),
                Vector3::new(0.0, 0.0, nz),
                Vector2::new(0.5 + 0.5 * cos, 0.5 + 0.5 * sin),
            ));
        }
        for i in 1..n - 1 {
            if nz < 0.0 {
                mesh.add_triangle(Triangle::new([base, base + i + 1, base + i]));
            } else {
                mesh.add_triangle(Triangle::new([base, base + i, base + i + 1]));
            }
        }
    }

    mesh
}

fn generate_sphere_mesh(radius: f64, segments: u32, rings: u32) -> Mesh {
    let slices = segments as usize;
    let stacks = rings as usize;
    let mut mesh = Mesh::with_capacity((stacks + 1) * (slices + 1), 2 * slices * stacks);

    // Ring 0 is the +Z pole
    for i in 0..=stacks {
        let theta = PI * i as f64 / stacks as f64;
        let (sin_t, cos_t) = theta.sin_cos();

        for j in 0..=slices {
            let phi = 2.0 * PI * j as f64 / slices as f64;
            let (sin_p, cos_p) = phi.sin_cos();
            let normal = Vector3::new(sin_t * cos_p, sin_t * sin_p, cos_t);
            mesh.add_vertex(Vertex::new(
                Point3::from(normal * radius),
                normal,
                Vector2::new(
                    j as f64 / slices as f64,
                    1.0 - i as f64 / stacks as f64,
                ),
            ));
        }
    }

    for i in 0..stacks {
        for j in 0..slices {
            let first = i * (slices + 1) + j;
            let second = first + slices + 1;

            if i != 0 {
                mesh.add_triangle(Triangle::new([first, second, first + 1]));
            }
            if i != stacks - 1 {
                mesh.add_triangle(Triangle::new([first + 1, second, second + 1]));
            }
        }
    }

    // One pole copy per cap is never referenced
    mesh.remove_orphaned_vertices();
    mesh
}

/// Face of a box: normal axis and sign, then the two tangent axes (u x v = normal)
const CUBE_FACES: [(usize, f64, usize, usize); 6] = [
    (0, 1.0, 1, 2),
    (0, -1.0, 2, 1),
    (1, 1.0, 2, 0),
    (1, -1.0, 0, 2),
    (2, 1.0, 0, 1),
    (2, -1.0, 1, 0),
];

fn generate_cube_mesh(size: Vector3<f64>, bevel: Option<Bevel>) -> Mesh {
    let half = size / 2.0;
    let min_half = half.x.min(half.y).min(half.z);
    let (radius, steps) = match bevel {
        Some(b) if b.width > 0.0 => (
            b.width.min(min_half * 0.5),
            // Each face carries half of the rounded edge
            b.segments.div_ceil(2).max(1) as usize,
        ),
        _ => (0.0, 0),
    };
    let inner = half.add_scalar(-radius);

    let axis_coords = |axis: usize| -> Vec<f64> {
        if radius == 0.0 {
            return vec![-half[axis], half[axis]];
        }
        let offset = |k: usize| inner[axis] + radius * (FRAC_PI_4 * k as f64 / steps as f64).tan();
        let mut coords: Vec<f64> = (0..=steps).rev().map(|k| -offset(k)).collect();
        coords.extend((0..=steps).map(offset));
        coords
    };

    let mut mesh = Mesh::new();

    for (axis_n, sign, axis_u, axis_v) in CUBE_FACES {
        let us = axis_coords(axis_u);
        let vs = axis_coords(axis_v);
        let cols = us.len();
        let rows = vs.len();
        let base = mesh.vertex_count();

        let mut face_normal = Vector3::zeros();
        face_normal[axis_n] = sign;

        for (j, &b) in vs.iter().enumerate() {
            for (i, &a) in us.iter().enumerate() {
                let mut p = Vector3::zeros();
                p[axis_n] = sign * half[axis_n];
                p[axis_u] = a;
                p[axis_v] = b;

                // Project onto the rounded box around the inner core
                let core = p.zip_map(&inner, |c, lim| c.clamp(-lim, lim));
                let offset = p - core;
                let (position, normal) = if radius > 0.0 && offset.norm() > 1e-12 {
                    let dir = offset.normalize();
                    (core + dir * radius, dir)
                } else {
                    (p, face_normal)
                };

                mesh.add_vertex(Vertex::new(
                    Point3::from(position),
                    normal,
                    Vector2::new(
                        i as f64 / (cols - 1) as f64,
                        j as f64 / (rows - 1) as f64,
                    ),
                ));
            }
        }

        for j in 0..rows - 1 {
            for i in 0..cols - 1 {
                let a = base + j * cols + i;
                let b = a + 1;
                let c = a + cols + 1;
                let d = a + cols;
                mesh.add_triangle(Triangle::new([a, b, c]));
                mesh.add_triangle(Triangle::new([a, c, d]));
            }
        }
    }

    mesh
}
