// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! GLTF/GLB importer, used to inspect exported figures

use crate::geometry::{Mesh, Triangle, Vertex};
use anyhow::{Context, Result};
use nalgebra::{Point3, Vector2, Vector3};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Geometry and material names read back from a glTF asset, in Z-up space
#[derive(Debug, Clone)]
pub struct ImportedAsset {
    /// All primitives merged; triangle materials index `material_names`
    pub mesh: Mesh,
    pub material_names: Vec<String>,
    pub node_names: Vec<String>,
    pub primitive_count: usize,
}

impl ImportedAsset {
    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    pub fn min_z(&self) -> Option<f64> {
        self.mesh.min_z()
    }
}

/// Import a .glb or .gltf file, converting Y-up back to Z-up
pub fn import_gltf(path: impl AsRef<Path>) -> Result<ImportedAsset> {
    let path = path.as_ref();
    let (document, buffers, _images) = gltf::import(path)
        .with_context(|| format!("Failed to import glTF file: {}", path.display()))?;

    let mut mesh = Mesh::new();
    let mut primitive_count = 0;

    for gltf_mesh in document.meshes() {
        for primitive in gltf_mesh.primitives() {
            primitive_count += 1;
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

            let positions: Vec<[f32; 3]> = reader
                .read_positions()
                .with_context(|| format!("Primitive without positions in {}", path.display()))?
                .collect();
            let normals: Vec<[f32; 3]> = reader
                .read_normals()
                .map(|n| n.collect())
                .unwrap_or_default();
            let uvs: Vec<[f32; 2]> = reader
                .read_tex_coords(0)
                .map(|t| t.into_f32().collect())
                .unwrap_or_default();

            let base = mesh.vertex_count();
            for (i, p) in positions.iter().enumerate() {
                let normal = normals.get(i).map_or(Vector3::zeros(), |n| {
                    Vector3::new(n[0] as f64, -n[2] as f64, n[1] as f64)
                });
                let uv = uvs.get(i).map_or(Vector2::zeros(), |t| {
                    Vector2::new(t[0] as f64, 1.0 - t[1] as f64)
                });
                mesh.add_vertex(Vertex::new(
                    Point3::new(p[0] as f64, -p[2] as f64, p[1] as f64),
                    normal,
                    uv,
                ));
            }

            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };
            let material = primitive.material().index().unwrap_or(0);
            for tri in indices.chunks_exact(3) {
                mesh.add_triangle(Triangle::with_material(
                    [
                        base + tri[0] as usize,
                        base + tri[1] as usize,
                        base + tri[2] as usize,
                    ],
                    material,
                ));
            }
        }
    }

    Ok(ImportedAsset {
        mesh,
        material_names: document
            .materials()
            .map(|m| m.name().unwrap_or_default().to_string())
            .collect(),
        node_names: document
            .nodes()
            .filter_map(|n| n.name().map(str::to_string))
            .collect(),
        primitive_count,
    })
}

/// Hex SHA-256 of a file's bytes
pub fn file_digest(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let digest = Sha256::digest(&bytes);
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}
