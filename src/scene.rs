// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Explicit scene: owns every body part and material of one build

use crate::geometry::{
    bisect, shade_smooth, Bevel, BoundingBox, GeometryError, Mesh, Plane, Primitive, Transform,
};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Handle to a part owned by a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId(usize);

/// Handle to a material in a [`Scene`]'s library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(usize);

/// Principled surface description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub base_color: [f64; 4],
    pub roughness: f64,
    pub specular: f64,
}

impl Material {
    pub fn new(name: impl Into<String>, base_color: [f64; 4], roughness: f64, specular: f64) -> Self {
        Self {
            name: name.into(),
            base_color,
            roughness,
            specular,
        }
    }
}

/// Errors raised by scene operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("cannot create part {name}: {source}")]
    Primitive {
        name: String,
        #[source]
        source: GeometryError,
    },

    #[error("cannot cut part {name}: {source}")]
    Cut {
        name: String,
        #[source]
        source: GeometryError,
    },

    #[error("unknown part handle {0}")]
    UnknownPart(usize),

    #[error("unknown material handle {0}")]
    UnknownMaterial(usize),

    #[error("part {name} has no material")]
    MissingMaterial { name: String },

    #[error("{modifier} modifier is not supported on {kind} part {name}")]
    UnsupportedModifier {
        name: String,
        kind: &'static str,
        modifier: &'static str,
    },

    #[error("part {name} has pending modifiers; apply them before editing the mesh")]
    PendingModifiers { name: String },

    #[error("nothing to join")]
    EmptyJoin,
}

/// Named primitive with its placement and material
#[derive(Debug, Clone)]
pub struct BodyPart {
    pub name: String,
    pub primitive: Primitive,
    /// Object-space geometry
    pub mesh: Mesh,
    pub transform: Transform,
    pub material: Option<MaterialId>,
    pub bevel: Option<Bevel>,
    /// Kept out of the join and exported as its own object
    pub detached: bool,
}

impl BodyPart {
    /// World-space copy of the part geometry
    pub fn world_mesh(&self) -> Mesh {
        let mut mesh = self.mesh.clone();
        if !self.transform.is_identity() {
            mesh.transform(&self.transform.matrix());
        }
        mesh
    }
}

/// Every part and material created during one build
#[derive(Debug, Default)]
pub struct Scene {
    parts: Vec<BodyPart>,
    materials: Vec<Material>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn material(&self, id: MaterialId) -> Result<&Material, SceneError> {
        self.materials
            .get(id.0)
            .ok_or(SceneError::UnknownMaterial(id.0))
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Create a part from a primitive at `transform`
    pub fn add_primitive(
        &mut self,
        name: &str,
        primitive: Primitive,
        transform: Transform,
    ) -> Result<PartId, SceneError> {
        primitive.validate().map_err(|source| SceneError::Primitive {
            name: name.to_string(),
            source,
        })?;

        let mesh = primitive.to_mesh();
        debug!(
            part = name,
            kind = primitive.kind(),
            vertices = mesh.vertex_count(),
            "created part"
        );

        self.parts.push(BodyPart {
            name: name.to_string(),
            primitive,
            mesh,
            transform,
            material: None,
            bevel: None,
            detached: false,
        });
        Ok(PartId(self.parts.len() - 1))
    }

    pub fn add_cylinder(
        &mut self,
        name: &str,
        radius: f64,
        depth: f64,
        segments: u32,
        transform: Transform,
    ) -> Result<PartId, SceneError> {
        self.add_primitive(name, Primitive::cylinder(radius, depth, segments), transform)
    }

    pub fn add_uv_sphere(
        &mut self,
        name: &str,
        radius: f64,
        segments: u32,
        rings: u32,
        transform: Transform,
    ) -> Result<PartId, SceneError> {
        self.add_primitive(name, Primitive::uv_sphere(radius, segments, rings), transform)
    }

    pub fn add_cube(
        &mut self,
        name: &str,
        size: f64,
        transform: Transform,
    ) -> Result<PartId, SceneError> {
        self.add_primitive(name, Primitive::cube(size), transform)
    }

    pub fn part(&self, id: PartId) -> Result<&BodyPart, SceneError> {
        self.parts.get(id.0).ok_or(SceneError::UnknownPart(id.0))
    }

    pub fn part_mut(&mut self, id: PartId) -> Result<&mut BodyPart, SceneError> {
        self.parts.get_mut(id.0).ok_or(SceneError::UnknownPart(id.0))
    }

    pub fn part_ids(&self) -> impl Iterator<Item = PartId> {
        (0..self.parts.len()).map(PartId)
    }

    pub fn find(&self, name: &str) -> Option<PartId> {
        self.parts.iter().position(|p| p.name == name).map(PartId)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn assign_material(&mut self, id: PartId, material: MaterialId) -> Result<(), SceneError> {
        self.material(material)?;
        self.part_mut(id)?.material = Some(material);
        Ok(())
    }

    /// Keep the part out of [`Scene::join`]; it stays a separate object
    pub fn detach(&mut self, id: PartId) -> Result<(), SceneError> {
        self.part_mut(id)?.detached = true;
        Ok(())
    }

    /// Queue a bevel on a cube part; applied by [`Scene::apply_modifiers`]
    pub fn add_bevel(&mut self, id: PartId, bevel: Bevel) -> Result<(), SceneError> {
        let part = self.part_mut(id)?;
        match part.primitive {
            Primitive::Cube { .. } => {
                part.bevel = Some(bevel);
                Ok(())
            }
            other => Err(SceneError::UnsupportedModifier {
                name: part.name.clone(),
                kind: other.kind(),
                modifier: "bevel",
            }),
        }
    }

    /// Rebuild the part's geometry with its pending modifiers
    pub fn apply_modifiers(&mut self, id: PartId) -> Result<(), SceneError> {
        let part = self.part_mut(id)?;
        if let Some(bevel) = part.bevel.take() {
            let primitive = part.primitive.bevelled(bevel);
            primitive.validate().map_err(|source| SceneError::Primitive {
                name: part.name.clone(),
                source,
            })?;
            part.mesh = primitive.to_mesh();
            part.primitive = primitive;
        }
        Ok(())
    }

    /// Cut the part with a world-space plane
    pub fn bisect(&mut self, id: PartId, plane: &Plane, clear_inner: bool) -> Result<(), SceneError> {
        let part = self.part_mut(id)?;
        if part.bevel.is_some() {
            return Err(SceneError::PendingModifiers {
                name: part.name.clone(),
            });
        }

        let cut = plane
            .to_local(&part.transform)
            .and_then(|local| bisect(&part.mesh, &local, clear_inner))
            .map_err(|source| SceneError::Cut {
                name: part.name.clone(),
                source,
            })?;

        debug!(
            part = %part.name,
            before = part.mesh.vertex_count(),
            after = cut.vertex_count(),
            "bisected part"
        );
        part.mesh = cut;
        Ok(())
    }

    pub fn shade_smooth(&mut self, id: PartId, angle_deg: f64) -> Result<(), SceneError> {
        let part = self.part_mut(id)?;
        part.mesh = shade_smooth(&part.mesh, angle_deg);
        Ok(())
    }

    /// Bake location, rotation and scale into the vertices
    pub fn apply_transform(&mut self, id: PartId) -> Result<(), SceneError> {
        let part = self.part_mut(id)?;
        part.mesh = part.world_mesh();
        part.transform = Transform::identity();
        Ok(())
    }

    /// Merge every attached part, in creation order, into one object.
    /// Detached parts are carried alongside in world space. The parts are
    /// consumed; material slots follow first use.
    pub fn join(self, name: &str) -> Result<AssembledMesh, SceneError> {
        if self.parts.iter().all(|p| p.detached) {
            return Err(SceneError::EmptyJoin);
        }

        let mut slots: Vec<MaterialId> = Vec::new();
        let mut mesh = Mesh::new();
        let mut part_names = Vec::with_capacity(self.parts.len());
        let mut detached = Vec::new();

        for part in &self.parts {
            let material = part.material.ok_or_else(|| SceneError::MissingMaterial {
                name: part.name.clone(),
            })?;
            let slot = match slots.iter().position(|&m| m == material) {
                Some(slot) => slot,
                None => {
                    slots.push(material);
                    slots.len() - 1
                }
            };

            let mut world = part.world_mesh();
            world.set_material(slot);
            if part.detached {
                detached.push(DetachedPart {
                    name: part.name.clone(),
                    mesh: world,
                });
            } else {
                mesh.merge(&world);
                part_names.push(part.name.clone());
            }
        }

        let materials = slots
            .iter()
            .map(|&id| self.material(id).cloned())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AssembledMesh {
            name: name.to_string(),
            mesh,
            materials,
            parts: part_names,
            detached,
            origin: Vector3::zeros(),
        })
    }
}

/// Part left out of the join, in world space; triangles index the owning
/// [`AssembledMesh::materials`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetachedPart {
    pub name: String,
    pub mesh: Mesh,
}

/// Single merged object produced by [`Scene::join`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembledMesh {
    pub name: String,
    /// Geometry relative to `origin`; triangles index into `materials`
    pub mesh: Mesh,
    pub materials: Vec<Material>,
    /// Names of the joined parts, in join order
    pub parts: Vec<String>,
    /// Separate objects sharing the material list
    pub detached: Vec<DetachedPart>,
    pub origin: Vector3<f64>,
}

impl AssembledMesh {
    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn detached_names(&self) -> Vec<&str> {
        self.detached.iter().map(|p| p.name.as_str()).collect()
    }

    /// Vertices of the joined mesh and every detached part
    pub fn total_vertex_count(&self) -> usize {
        self.vertex_count() + self.detached.iter().map(|p| p.mesh.vertex_count()).sum::<usize>()
    }

    pub fn total_triangle_count(&self) -> usize {
        self.triangle_count() + self.detached.iter().map(|p| p.mesh.triangle_count()).sum::<usize>()
    }

    pub fn material_names(&self) -> Vec<&str> {
        self.materials.iter().map(|m| m.name.as_str()).collect()
    }

    /// World-space bounds
    pub fn bounding_box(&self) -> BoundingBox {
        let local = self.mesh.bounding_box();
        BoundingBox::new(local.min + self.origin, local.max + self.origin)
    }

    /// World-space bounds including detached parts
    pub fn full_bounding_box(&self) -> BoundingBox {
        let mut bbox = self.bounding_box();
        for part in &self.detached {
            for vertex in &part.mesh.vertices {
                bbox.expand_to_include(&vertex.position);
            }
        }
        bbox
    }

    /// Lowest world-space Z of the joined mesh
    pub fn min_z(&self) -> Option<f64> {
        self.mesh.min_z().map(|z| z + self.origin.z)
    }

    /// Move the origin to the center of the bounds, keeping the geometry in place
    pub fn origin_to_bounds_center(&mut self) {
        if self.mesh.vertices.is_empty() {
            return;
        }
        let center = self.mesh.bounding_box().center().coords;
        self.mesh.translate(&-center);
        self.origin += center;
    }

    /// Move the object along Z so its lowest vertex sits on Z = 0. Detached
    /// parts move by the same offset.
    pub fn drop_to_ground(&mut self) {
        if let Some(min_z) = self.min_z() {
            self.origin.z -= min_z;
            let offset = Vector3::new(0.0, 0.0, -min_z);
            for part in &mut self.detached {
                part.mesh.translate(&offset);
            }
        }
    }

    /// Bake the origin offset into the vertices
    pub fn apply_transform(&mut self) {
        let origin = self.origin;
        self.mesh.translate(&origin);
        self.origin = Vector3::zeros();
    }
}
