// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Smooth shading with an auto-smooth crease angle

use super::{Mesh, Triangle};
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};

/// Crease angle used for every body part
pub const AUTO_SMOOTH_ANGLE_DEG: f64 = 60.0;

/// Positions closer than this are treated as the same vertex
const POSITION_QUANTUM: f64 = 1e-9;
const NORMAL_QUANTUM: f64 = 1e-6;

fn quantize(v: &Vector3<f64>, quantum: f64) -> [i64; 3] {
    [
        (v.x / quantum).round() as i64,
        (v.y / quantum).round() as i64,
        (v.z / quantum).round() as i64,
    ]
}

fn position_key(p: &Point3<f64>) -> [i64; 3] {
    quantize(&p.coords, POSITION_QUANTUM)
}

/// Shade `mesh` smooth, keeping edges sharper than `angle_deg` hard.
///
/// Each triangle corner gets the area-weighted average normal of the faces
/// sharing its position whose normals lie within `angle_deg` of its own face.
/// Vertices are split wherever corners end up with different normals, so UV
/// seams and coincident cap/wall vertices are smoothed across.
pub fn shade_smooth(mesh: &Mesh, angle_deg: f64) -> Mesh {
    let cos_threshold = angle_deg.to_radians().cos();
    let faces: Vec<(Vector3<f64>, f64)> = mesh.triangles.iter().map(|t| mesh.face_normal(t)).collect();

    let mut faces_at: AHashMap<[i64; 3], Vec<usize>> = AHashMap::new();
    for (t, triangle) in mesh.triangles.iter().enumerate() {
        for &idx in &triangle.indices {
            faces_at
                .entry(position_key(&mesh.vertices[idx].position))
                .or_default()
                .push(t);
        }
    }

    let mut out = Mesh::with_capacity(mesh.vertex_count(), mesh.triangle_count());
    let mut split: AHashMap<(usize, [i64; 3]), usize> = AHashMap::new();

    for (t, triangle) in mesh.triangles.iter().enumerate() {
        let (face_normal, area) = faces[t];
        let mut indices = [0usize; 3];

        for (corner, &idx) in triangle.indices.iter().enumerate() {
            let vertex = mesh.vertices[idx];
            let normal = if area > 0.0 {
                let mut sum = Vector3::zeros();
                // faces_at always contains this corner's own face
                for &f in &faces_at[&position_key(&vertex.position)] {
                    let (n, a) = faces[f];
                    if a > 0.0 && n.dot(&face_normal) >= cos_threshold {
                        sum += n * a;
                    }
                }
                sum.try_normalize(1e-14).unwrap_or(face_normal)
            } else {
                vertex.normal
            };

            let key = (idx, quantize(&normal, NORMAL_QUANTUM));
            indices[corner] = *split.entry(key).or_insert_with(|| {
                let mut shaded = vertex;
                shaded.normal = normal;
                out.add_vertex(shaded)
            });
        }

        out.add_triangle(Triangle::with_material(indices, triangle.material));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;

    #[test]
    fn test_cylinder_keeps_caps_sharp() {
        let mesh = Primitive::cylinder(0.5, 1.0, 20).to_mesh();
        let shaded = shade_smooth(&mesh, AUTO_SMOOTH_ANGLE_DEG);

        assert_eq!(shaded.triangle_count(), mesh.triangle_count());
        assert_eq!(shaded.vertex_count(), mesh.vertex_count());
        for v in &shaded.vertices {
            let n = v.normal;
            let is_cap = (n.z.abs() - 1.0).abs() < 1e-9;
            let is_wall = n.z.abs() < 1e-9;
            assert!(is_cap || is_wall, "unexpected normal {:?}", n);
        }
    }

    #[test]
    fn test_coarse_cylinder_is_faceted() {
        let mesh = Primitive::cylinder(0.5, 1.0, 4).to_mesh();
        let shaded = shade_smooth(&mesh, AUTO_SMOOTH_ANGLE_DEG);

        // Wall corners between 90 degree faces split into one vertex per face
        assert!(shaded.vertex_count() > mesh.vertex_count());
    }

    #[test]
    fn test_sphere_normals_follow_surface() {
        let mesh = Primitive::uv_sphere(1.0, 24, 12).to_mesh();
        let shaded = shade_smooth(&mesh, AUTO_SMOOTH_ANGLE_DEG);

        for v in &shaded.vertices {
            assert!(v.normal.dot(&v.position.coords.normalize()) > 0.99);
        }
    }

    #[test]
    fn test_materials_survive_shading() {
        let mut mesh = Primitive::cube(1.0).to_mesh();
        mesh.set_material(4);
        let shaded = shade_smooth(&mesh, AUTO_SMOOTH_ANGLE_DEG);
        assert!(shaded.triangles.iter().all(|t| t.material == 4));
    }
}
