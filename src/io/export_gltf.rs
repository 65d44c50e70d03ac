// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! GLTF/GLB exporter

use crate::geometry::Mesh;
use crate::scene::{AssembledMesh, Material};
use anyhow::{Context, Result};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use tracing::info;

const ARRAY_BUFFER: u32 = 34962;
const ELEMENT_ARRAY_BUFFER: u32 = 34963;
const FLOAT: u32 = 5126;
const UNSIGNED_INT: u32 = 5125;
const TRIANGLES: u32 = 4;

const SPECULAR_EXTENSION: &str = "KHR_materials_specular";

/// Container layout of the written asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Single binary container
    Glb,
    /// JSON document with a sibling `.bin` buffer
    Gltf,
}

impl ExportFormat {
    /// Pick the format from the file extension, defaulting to GLB
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("gltf") => ExportFormat::Gltf,
            _ => ExportFormat::Glb,
        }
    }
}

/// Exporter switches; the defaults are the settings web engines expect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Convert from Z-up to the glTF Y-up convention
    pub y_up: bool,
    /// Bake the object transform into the vertices
    pub apply_transforms: bool,
    pub texcoords: bool,
    pub normals: bool,
    pub materials: bool,
    pub vertex_colors: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Glb,
            y_up: true,
            apply_transforms: true,
            texcoords: true,
            normals: true,
            materials: true,
            vertex_colors: true,
        }
    }
}

/// Export a finished mesh as binary glTF. A single attempt; any IO failure
/// is returned with the path attached.
pub fn export_glb(mesh: &AssembledMesh, path: impl AsRef<Path>, options: &ExportOptions) -> Result<()> {
    let path = path.as_ref();
    let bytes = to_glb_bytes(mesh, options)?;
    std::fs::write(path, &bytes)
        .with_context(|| format!("Failed to write GLB file: {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "exported GLB");
    Ok(())
}

/// Export in the container selected by `options.format`
pub fn export(mesh: &AssembledMesh, path: impl AsRef<Path>, options: &ExportOptions) -> Result<()> {
    match options.format {
        ExportFormat::Glb => export_glb(mesh, path, options),
        ExportFormat::Gltf => export_gltf_separate(mesh, path.as_ref(), options),
    }
}

/// Serialize to an in-memory GLB container
pub fn to_glb_bytes(mesh: &AssembledMesh, options: &ExportOptions) -> Result<Vec<u8>> {
    let (gltf_json_val, buffer_data) = create_gltf_json(mesh, options, None)?;

    let json_string = serde_json::to_string(&gltf_json_val)?;
    let json_offset = align_to_multiple_of_four(json_string.len());
    let json_padding = json_offset - json_string.len();

    let buffer_offset = align_to_multiple_of_four(buffer_data.len());
    let buffer_padding = buffer_offset - buffer_data.len();

    let total_length = 12 + 8 + json_offset + 8 + buffer_offset;
    let mut out = Vec::with_capacity(total_length);

    // GLB header
    out.extend_from_slice(&0x46546C67u32.to_le_bytes()); // magic: "glTF"
    out.extend_from_slice(&2u32.to_le_bytes()); // version
    out.extend_from_slice(&(total_length as u32).to_le_bytes());

    // JSON chunk
    out.extend_from_slice(&(json_offset as u32).to_le_bytes());
    out.extend_from_slice(&0x4E4F534Au32.to_le_bytes()); // type: "JSON"
    out.extend_from_slice(json_string.as_bytes());
    out.extend(std::iter::repeat(b' ').take(json_padding));

    // BIN chunk
    out.extend_from_slice(&(buffer_offset as u32).to_le_bytes());
    out.extend_from_slice(&0x004E4942u32.to_le_bytes()); // type: "BIN\0"
    out.extend_from_slice(&buffer_data);
    out.extend(std::iter::repeat(0u8).take(buffer_padding));

    Ok(out)
}

/// Export mesh to GLTF with separate .bin file
fn export_gltf_separate(mesh: &AssembledMesh, path: &Path, options: &ExportOptions) -> Result<()> {
    let bin_path = path.with_extension("bin");
    let bin_name = bin_path
        .file_name()
        .and_then(|n| n.to_str())
        .context("GLTF output path has no file name")?
        .to_string();

    let (gltf_json_val, buffer_data) = create_gltf_json(mesh, options, Some(&bin_name))?;

    let json_string = serde_json::to_string_pretty(&gltf_json_val)?;
    std::fs::write(path, json_string)
        .with_context(|| format!("Failed to write GLTF file: {}", path.display()))?;
    std::fs::write(&bin_path, buffer_data)
        .with_context(|| format!("Failed to write buffer file: {}", bin_path.display()))?;

    info!(path = %path.display(), "exported GLTF");
    Ok(())
}

/// Packs accessors into one little-endian buffer
struct BufferWriter {
    data: Vec<u8>,
    views: Vec<Value>,
    accessors: Vec<Value>,
}

impl BufferWriter {
    fn new() -> Self {
        Self {
            data: Vec::new(),
            views: Vec::new(),
            accessors: Vec::new(),
        }
    }

    /// Append a float attribute and return its accessor index
    fn push_floats<const N: usize>(
        &mut self,
        items: &[[f32; N]],
        kind: &str,
        with_bounds: bool,
    ) -> usize {
        let offset = self.data.len();
        for item in items {
            for component in item {
                self.data.extend_from_slice(&component.to_le_bytes());
            }
        }
        let view = self.push_view(offset, ARRAY_BUFFER);

        let mut accessor = json!({
            "bufferView": view,
            "byteOffset": 0,
            "componentType": FLOAT,
            "count": items.len(),
            "type": kind,
        });
        if with_bounds {
            let mut min = [f32::MAX; N];
            let mut max = [f32::MIN; N];
            for item in items {
                for k in 0..N {
                    min[k] = min[k].min(item[k]);
                    max[k] = max[k].max(item[k]);
                }
            }
            accessor["min"] = json!(min.to_vec());
            accessor["max"] = json!(max.to_vec());
        }
        self.accessors.push(accessor);
        self.accessors.len() - 1
    }

    fn push_indices(&mut self, indices: &[u32]) -> usize {
        let offset = self.data.len();
        for index in indices {
            self.data.extend_from_slice(&index.to_le_bytes());
        }
        let view = self.push_view(offset, ELEMENT_ARRAY_BUFFER);
        self.accessors.push(json!({
            "bufferView": view,
            "byteOffset": 0,
            "componentType": UNSIGNED_INT,
            "count": indices.len(),
            "type": "SCALAR",
        }));
        self.accessors.len() - 1
    }

    fn push_view(&mut self, offset: usize, target: u32) -> usize {
        self.views.push(json!({
            "buffer": 0,
            "byteOffset": offset,
            "byteLength": self.data.len() - offset,
            "target": target,
        }));
        self.views.len() - 1
    }
}

fn convert_point(p: &Point3<f64>, y_up: bool) -> [f32; 3] {
    if y_up {
        [p.x as f32, p.z as f32, -p.y as f32]
    } else {
        [p.x as f32, p.y as f32, p.z as f32]
    }
}

fn convert_vector(v: &Vector3<f64>, y_up: bool) -> [f32; 3] {
    convert_point(&Point3::from(*v), y_up)
}

/// Triangles of one material slot, with vertices re-indexed in first-use order
fn group_by_material(mesh: &Mesh, slot: Option<usize>) -> (Vec<usize>, Vec<u32>) {
    let mut remap = vec![u32::MAX; mesh.vertex_count()];
    let mut used = Vec::new();
    let mut indices = Vec::new();

    for triangle in &mesh.triangles {
        if slot.is_some_and(|s| s != triangle.material) {
            continue;
        }
        for &idx in &triangle.indices {
            if remap[idx] == u32::MAX {
                remap[idx] = used.len() as u32;
                used.push(idx);
            }
            indices.push(remap[idx]);
        }
    }

    (used, indices)
}

/// One primitive per referenced material slot of `mesh`
fn write_primitives(
    writer: &mut BufferWriter,
    mesh: &Mesh,
    materials: &[Material],
    offset: Vector3<f64>,
    options: &ExportOptions,
) -> Vec<Value> {
    let slots: Vec<Option<usize>> = if options.materials {
        (0..materials.len()).map(Some).collect()
    } else {
        vec![None]
    };

    let mut primitives = Vec::new();
    for slot in slots {
        let (used, indices) = group_by_material(mesh, slot);
        if indices.is_empty() {
            continue;
        }
        let vertices: Vec<_> = used.iter().map(|&i| mesh.vertices[i]).collect();

        let positions: Vec<[f32; 3]> = vertices
            .iter()
            .map(|v| convert_point(&(v.position + offset), options.y_up))
            .collect();
        let mut attributes = json!({
            "POSITION": writer.push_floats(&positions, "VEC3", true),
        });

        if options.normals {
            let normals: Vec<[f32; 3]> = vertices
                .iter()
                .map(|v| convert_vector(&v.normal, options.y_up))
                .collect();
            attributes["NORMAL"] = json!(writer.push_floats(&normals, "VEC3", false));
        }
        if options.texcoords {
            // glTF puts the texture origin at the top-left corner
            let uvs: Vec<[f32; 2]> = vertices
                .iter()
                .map(|v| [v.uv.x as f32, (1.0 - v.uv.y) as f32])
                .collect();
            attributes["TEXCOORD_0"] = json!(writer.push_floats(&uvs, "VEC2", false));
        }
        if options.vertex_colors {
            let color = slot
                .map(|s| materials[s].base_color)
                .unwrap_or([1.0; 4])
                .map(|c| c as f32);
            let colors = vec![color; vertices.len()];
            attributes["COLOR_0"] = json!(writer.push_floats(&colors, "VEC4", false));
        }

        let mut primitive = json!({
            "attributes": attributes,
            "indices": writer.push_indices(&indices),
            "mode": TRIANGLES,
        });
        if let Some(slot) = slot {
            primitive["material"] = json!(slot);
        }
        primitives.push(primitive);
    }
    primitives
}

fn create_gltf_json(
    mesh: &AssembledMesh,
    options: &ExportOptions,
    bin_uri: Option<&str>,
) -> Result<(Value, Vec<u8>)> {
    let mut writer = BufferWriter::new();

    let baked = if options.apply_transforms {
        mesh.origin
    } else {
        Vector3::zeros()
    };

    let mut node = json!({ "name": mesh.name, "mesh": 0 });
    if !options.apply_transforms && mesh.origin != Vector3::zeros() {
        node["translation"] = json!(convert_vector(&mesh.origin, options.y_up).to_vec());
    }
    let mut nodes = vec![node];
    let mut meshes = vec![json!({
        "name": mesh.name,
        "primitives": write_primitives(&mut writer, &mesh.mesh, &mesh.materials, baked, options),
    })];

    // Detached parts are already in world space
    for part in &mesh.detached {
        nodes.push(json!({ "name": part.name, "mesh": meshes.len() }));
        meshes.push(json!({
            "name": part.name,
            "primitives": write_primitives(
                &mut writer,
                &part.mesh,
                &mesh.materials,
                Vector3::zeros(),
                options,
            ),
        }));
    }

    let mut buffer = json!({ "byteLength": writer.data.len() });
    if let Some(uri) = bin_uri {
        buffer["uri"] = json!(uri);
    }

    let scene_nodes: Vec<usize> = (0..nodes.len()).collect();
    let mut gltf = json!({
        "asset": {
            "generator": format!("Figurine v{}", env!("CARGO_PKG_VERSION")),
            "version": "2.0"
        },
        "scene": 0,
        "scenes": [{ "nodes": scene_nodes }],
        "nodes": nodes,
        "meshes": meshes,
        "accessors": writer.accessors,
        "bufferViews": writer.views,
        "buffers": [buffer],
    });

    if options.materials {
        let materials: Vec<Value> = mesh
            .materials
            .iter()
            .map(|m| {
                json!({
                    "name": m.name,
                    "pbrMetallicRoughness": {
                        "baseColorFactor": m.base_color,
                        "metallicFactor": 0.0,
                        "roughnessFactor": m.roughness,
                    },
                    "extensions": {
                        SPECULAR_EXTENSION: { "specularFactor": m.specular }
                    }
                })
            })
            .collect();
        gltf["materials"] = json!(materials);
        gltf["extensionsUsed"] = json!([SPECULAR_EXTENSION]);
    }

    Ok((gltf, writer.data))
}

fn align_to_multiple_of_four(n: usize) -> usize {
    (n + 3) & !3
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Transform;
    use crate::scene::{Material, Scene};
    use tempfile::NamedTempFile;

    fn sample() -> AssembledMesh {
        let mut scene = Scene::new();
        let red = scene.add_material(Material::new("Red", [1.0, 0.0, 0.0, 1.0], 0.5, 0.2));
        let blue = scene.add_material(Material::new("Blue", [0.0, 0.0, 1.0, 1.0], 0.5, 0.2));
        let a = scene.add_cube("A", 1.0, Transform::identity()).unwrap();
        let b = scene
            .add_uv_sphere("B", 0.5, 8, 4, Transform::at(Vector3::new(0.0, 0.0, 2.0)))
            .unwrap();
        scene.assign_material(a, red).unwrap();
        scene.assign_material(b, blue).unwrap();
        scene.join("Sample").unwrap()
    }

    #[test]
    fn test_glb_layout() -> Result<()> {
        let bytes = to_glb_bytes(&sample(), &ExportOptions::default())?;

        assert_eq!(&bytes[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes(bytes[8..12].try_into()?) as usize, bytes.len());
        assert_eq!(bytes.len() % 4, 0);
        assert_eq!(&bytes[16..20], b"JSON");
        Ok(())
    }

    #[test]
    fn test_one_primitive_per_material() -> Result<()> {
        let mesh = sample();
        let (doc, _) = create_gltf_json(&mesh, &ExportOptions::default(), None)?;

        let primitives = doc["meshes"][0]["primitives"].as_array().unwrap();
        assert_eq!(primitives.len(), 2);
        assert_eq!(primitives[1]["material"], 1);
        assert!(primitives[0]["attributes"]["COLOR_0"].is_number());
        assert_eq!(doc["materials"][0]["name"], "Red");
        assert_eq!(
            doc["materials"][1]["extensions"][SPECULAR_EXTENSION]["specularFactor"],
            0.2
        );

        let counted: u64 = primitives
            .iter()
            .map(|p| {
                let accessor = p["attributes"]["POSITION"].as_u64().unwrap() as usize;
                doc["accessors"][accessor]["count"].as_u64().unwrap()
            })
            .sum();
        assert_eq!(counted as usize, mesh.vertex_count());
        Ok(())
    }

    #[test]
    fn test_detached_parts_become_nodes() -> Result<()> {
        let mut scene = Scene::new();
        let jeans = scene.add_material(Material::new("Jeans", [0.1, 0.1, 0.3, 1.0], 0.8, 0.08));
        let leg = scene.add_cylinder("Jeans_L", 0.05, 0.8, 8, Transform::identity())?;
        let cuff = scene.add_cylinder("Cuff_L", 0.06, 0.06, 8, Transform::identity())?;
        scene.assign_material(leg, jeans)?;
        scene.assign_material(cuff, jeans)?;
        scene.detach(cuff)?;
        let mesh = scene.join("Figure")?;

        let (doc, _) = create_gltf_json(&mesh, &ExportOptions::default(), None)?;
        assert_eq!(doc["scenes"][0]["nodes"], json!([0, 1]));
        assert_eq!(doc["nodes"][1]["name"], "Cuff_L");
        assert_eq!(doc["nodes"][1]["mesh"], 1);
        assert_eq!(doc["meshes"][1]["primitives"][0]["material"], 0);
        assert_eq!(doc["meshes"].as_array().unwrap().len(), 2);
        Ok(())
    }

    #[test]
    fn test_y_up_conversion() -> Result<()> {
        let (doc, _) = create_gltf_json(&sample(), &ExportOptions::default(), None)?;
        let sphere_positions = doc["meshes"][0]["primitives"][1]["attributes"]["POSITION"]
            .as_u64()
            .unwrap() as usize;
        // Sphere centered at Z = 2 ends up centered at Y = 2
        let max = &doc["accessors"][sphere_positions]["max"];
        assert!((max[1].as_f64().unwrap() - 2.5).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_optional_attributes() -> Result<()> {
        let options = ExportOptions {
            texcoords: false,
            vertex_colors: false,
            materials: false,
            ..ExportOptions::default()
        };
        let (doc, _) = create_gltf_json(&sample(), &options, None)?;
        let primitives = doc["meshes"][0]["primitives"].as_array().unwrap();
        assert_eq!(primitives.len(), 1);
        assert!(primitives[0]["attributes"]["TEXCOORD_0"].is_null());
        assert!(primitives[0]["material"].is_null());
        assert!(doc["materials"].is_null());
        Ok(())
    }

    #[test]
    fn test_export_gltf_writes_buffer() -> Result<()> {
        let file = NamedTempFile::with_suffix(".gltf")?;
        let options = ExportOptions {
            format: ExportFormat::from_path(file.path()),
            ..ExportOptions::default()
        };
        assert_eq!(options.format, ExportFormat::Gltf);

        export(&sample(), file.path(), &options)?;

        let bin_path = file.path().with_extension("bin");
        assert!(bin_path.exists());
        let doc: Value = serde_json::from_str(&std::fs::read_to_string(file.path())?)?;
        assert_eq!(
            doc["buffers"][0]["uri"],
            bin_path.file_name().unwrap().to_str().unwrap()
        );
        std::fs::remove_file(bin_path)?;
        Ok(())
    }

    #[test]
    fn test_bad_path_is_reported() {
        let err = export_glb(&sample(), "/nonexistent-dir/figure.glb", &ExportOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent-dir/figure.glb"));
    }
}
