// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh representation and utilities

use super::BoundingBox;
use nalgebra::{Matrix4, Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Vertex with position, normal and texture coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
    pub uv: Vector2<f64>,
}

impl Vertex {
    pub fn new(position: Point3<f64>, normal: Vector3<f64>, uv: Vector2<f64>) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        self.position = matrix.transform_point(&self.position);
        // Transform normal (use inverse transpose for normals)
        let normal_matrix = matrix
            .try_inverse()
            .map(|m| m.transpose())
            .unwrap_or(*matrix);
        self.normal = normal_matrix.transform_vector(&self.normal).normalize();
    }
}

/// Triangle defined by three vertex indices and a material slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    pub indices: [usize; 3],
    pub material: usize,
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self {
            indices,
            material: 0,
        }
    }

    pub fn with_material(indices: [usize; 3], material: usize) -> Self {
        Self { indices, material }
    }
}

/// Triangular mesh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, vertex: Vertex) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Transform all vertices by a matrix
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for vertex in &mut self.vertices {
            vertex.transform(matrix);
        }
    }

    /// Translate all vertices; normals are unaffected
    pub fn translate(&mut self, offset: &Vector3<f64>) {
        for vertex in &mut self.vertices {
            vertex.position += offset;
        }
    }

    /// Assign every triangle to one material slot
    pub fn set_material(&mut self, material: usize) {
        for triangle in &mut self.triangles {
            triangle.material = material;
        }
    }

    /// Compute bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_vertices(&self.vertices)
    }

    /// Lowest Z coordinate of any vertex, `None` for an empty mesh
    pub fn min_z(&self) -> Option<f64> {
        self.vertices
            .iter()
            .map(|v| v.position.z)
            .fold(None, |acc, z| Some(acc.map_or(z, |m: f64| m.min(z))))
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Append another mesh, keeping its material slots
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);

        for triangle in &other.triangles {
            self.triangles.push(Triangle::with_material(
                [
                    triangle.indices[0] + offset,
                    triangle.indices[1] + offset,
                    triangle.indices[2] + offset,
                ],
                triangle.material,
            ));
        }
    }

    /// Face normal and doubled area of a triangle
    pub fn face_normal(&self, triangle: &Triangle) -> (Vector3<f64>, f64) {
        let p0 = self.vertices[triangle.indices[0]].position;
        let p1 = self.vertices[triangle.indices[1]].position;
        let p2 = self.vertices[triangle.indices[2]].position;
        let cross = (p1 - p0).cross(&(p2 - p0));
        let norm = cross.norm();
        if norm > 1e-14 {
            (cross / norm, norm)
        } else {
            (Vector3::zeros(), 0.0)
        }
    }

    /// Remove orphaned vertices (vertices not referenced by any triangle)
    /// Returns the number of vertices removed
    pub fn remove_orphaned_vertices(&mut self) -> usize {
        if self.triangles.is_empty() {
            let removed = self.vertices.len();
            self.vertices.clear();
            return removed;
        }

        let mut used_vertices = vec![false; self.vertices.len()];
        for triangle in &self.triangles {
            for &idx in &triangle.indices {
                used_vertices[idx] = true;
            }
        }

        // old_index -> new_index
        let mut new_indices = vec![0; self.vertices.len()];
        let mut new_vertices = Vec::new();

        for (old_idx, &used) in used_vertices.iter().enumerate() {
            if used {
                new_indices[old_idx] = new_vertices.len();
                new_vertices.push(self.vertices[old_idx]);
            }
        }

        for triangle in &mut self.triangles {
            for idx in &mut triangle.indices {
                *idx = new_indices[*idx];
            }
        }

        let removed = self.vertices.len() - new_vertices.len();
        self.vertices = new_vertices;
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;

    #[test]
    fn test_merge_offsets_indices_and_keeps_materials() {
        let mut a = Primitive::cylinder(0.1, 0.5, 8).to_mesh();
        a.set_material(0);
        let mut b = Primitive::uv_sphere(0.2, 8, 4).to_mesh();
        b.set_material(3);

        let a_vertices = a.vertex_count();
        let a_triangles = a.triangle_count();
        a.merge(&b);

        assert_eq!(a.vertex_count(), a_vertices + b.vertex_count());
        assert_eq!(a.triangle_count(), a_triangles + b.triangle_count());
        let tail = &a.triangles[a_triangles..];
        assert!(tail.iter().all(|t| t.material == 3));
        assert!(tail.iter().all(|t| t.indices.iter().all(|&i| i >= a_vertices)));
    }

    #[test]
    fn test_remove_orphaned_vertices() {
        let mut mesh = Primitive::cylinder(1.0, 2.0, 6).to_mesh();
        let before = mesh.vertex_count();
        mesh.add_vertex(Vertex::new(
            Point3::new(9.0, 9.0, 9.0),
            Vector3::z(),
            Vector2::zeros(),
        ));

        assert_eq!(mesh.remove_orphaned_vertices(), 1);
        assert_eq!(mesh.vertex_count(), before);
    }

    #[test]
    fn test_min_z() {
        let mut mesh = Primitive::cylinder(0.5, 2.0, 8).to_mesh();
        assert_eq!(mesh.min_z(), Some(-1.0));
        mesh.translate(&Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(mesh.min_z(), Some(0.0));
        assert_eq!(Mesh::new().min_z(), None);
    }
}
