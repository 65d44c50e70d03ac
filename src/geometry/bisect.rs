// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Plane cut (bisect) of a triangle mesh

use super::{GeometryError, Mesh, Transform, Triangle, Vertex};
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};

/// Distances below this are treated as lying on the plane
const PLANE_EPS: f64 = 1e-12;

/// Cut plane through `point` facing `normal`; the normal side is kept
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Point3<f64>,
    pub normal: Vector3<f64>,
}

impl Plane {
    pub fn new(point: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self { point, normal }
    }

    /// Horizontal plane at height `z`, facing up
    pub fn horizontal(z: f64) -> Self {
        Self::new(Point3::new(0.0, 0.0, z), Vector3::z())
    }

    /// Express a world-space plane in the object space of `transform`
    pub fn to_local(&self, transform: &Transform) -> Result<Plane, GeometryError> {
        let matrix = transform.matrix();
        let inverse = matrix
            .try_inverse()
            .ok_or(GeometryError::DegeneratePlane)?;
        let linear = matrix.fixed_view::<3, 3>(0, 0);

        // n . (M x - p) == (A^T n) . (x - M^-1 p)
        let normal = linear.transpose() * self.normal;
        Ok(Plane::new(inverse.transform_point(&self.point), normal))
    }
}

/// Cut `mesh` along `plane`. Triangles crossing the plane are split; with
/// `clear_inner` everything on the back side of the plane is discarded.
pub fn bisect(mesh: &Mesh, plane: &Plane, clear_inner: bool) -> Result<Mesh, GeometryError> {
    let normal = plane
        .normal
        .try_normalize(PLANE_EPS)
        .ok_or(GeometryError::DegeneratePlane)?;

    let distances: Vec<f64> = mesh
        .vertices
        .iter()
        .map(|v| {
            let d = normal.dot(&(v.position - plane.point));
            if d.abs() < PLANE_EPS {
                0.0
            } else {
                d
            }
        })
        .collect();

    let mut out = Mesh::with_capacity(mesh.vertex_count(), mesh.triangle_count());
    out.vertices = mesh.vertices.clone();
    let mut cuts: AHashMap<(usize, usize), usize> = AHashMap::new();

    for triangle in &mesh.triangles {
        let d = triangle.indices.map(|i| distances[i]);

        if d.iter().all(|&x| x >= 0.0) {
            out.add_triangle(*triangle);
            continue;
        }
        if d.iter().all(|&x| x <= 0.0) {
            if !clear_inner {
                out.add_triangle(*triangle);
            }
            continue;
        }

        let mut front = Vec::with_capacity(4);
        let mut back = Vec::with_capacity(4);

        for k in 0..3 {
            let a = triangle.indices[k];
            let b = triangle.indices[(k + 1) % 3];
            let (da, db) = (d[k], d[(k + 1) % 3]);

            if da >= 0.0 {
                front.push(a);
            }
            if da <= 0.0 {
                back.push(a);
            }
            if (da > 0.0 && db < 0.0) || (da < 0.0 && db > 0.0) {
                let cut = cut_vertex(&mut out, &mut cuts, &distances, a, b);
                front.push(cut);
                back.push(cut);
            }
        }

        fan(&mut out, &front, triangle.material);
        if !clear_inner {
            fan(&mut out, &back, triangle.material);
        }
    }

    out.remove_orphaned_vertices();
    Ok(out)
}

/// Vertex where edge (a, b) meets the plane, shared between both faces of the edge
fn cut_vertex(
    out: &mut Mesh,
    cuts: &mut AHashMap<(usize, usize), usize>,
    distances: &[f64],
    a: usize,
    b: usize,
) -> usize {
    let key = (a.min(b), a.max(b));
    if let Some(&index) = cuts.get(&key) {
        return index;
    }

    let (lo, hi) = key;
    let t = distances[lo] / (distances[lo] - distances[hi]);
    let va = out.vertices[lo];
    let vb = out.vertices[hi];
    let normal = va.normal.lerp(&vb.normal, t);

    let vertex = Vertex::new(
        va.position + (vb.position - va.position) * t,
        normal.try_normalize(PLANE_EPS).unwrap_or(va.normal),
        va.uv.lerp(&vb.uv, t),
    );
    let index = out.add_vertex(vertex);
    cuts.insert(key, index);
    index
}

fn fan(out: &mut Mesh, polygon: &[usize], material: usize) {
    for i in 1..polygon.len().saturating_sub(1) {
        out.add_triangle(Triangle::with_material(
            [polygon[0], polygon[i], polygon[i + 1]],
            material,
        ));
    }
}
