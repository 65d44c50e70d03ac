// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Body assembler: places every body part, clothing shell and the hair cap

use crate::geometry::{Bevel, Plane, Transform};
use crate::params::{ParameterSet, Rgba};
use crate::proportions::ProportionTable;
use crate::scene::{Material, MaterialId, PartId, Scene, SceneError};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Fixed pose offsets in meters; these do not scale with height
const HAND_OFFSET_X: f64 = 0.02;
const ARM_OFFSET_Y: f64 = 0.02;
const SLEEVE_OFFSET_Y: f64 = 0.03;
const SLEEVE_OFFSET_Z: f64 = 0.01;

const HEAD_TURN_DEG: f64 = 2.0;
const ARM_FORWARD_DEG: f64 = 3.0;
/// Leg stance angle per degree of knee bend
const STANCE_PER_KNEE_DEG: f64 = 0.2;
const SHOE_BEVEL_SEGMENTS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialTag {
    Skin,
    Hair,
    Shirt,
    Jeans,
    Shoes,
}

impl MaterialTag {
    pub const ALL: [MaterialTag; 5] = [
        MaterialTag::Skin,
        MaterialTag::Hair,
        MaterialTag::Shirt,
        MaterialTag::Jeans,
        MaterialTag::Shoes,
    ];

    pub fn material_name(&self) -> &'static str {
        match self {
            MaterialTag::Skin => "MAT_Skin",
            MaterialTag::Hair => "MAT_Hair",
            MaterialTag::Shirt => "MAT_TShirt",
            MaterialTag::Jeans => "MAT_Jeans",
            MaterialTag::Shoes => "MAT_Shoes",
        }
    }

    /// (roughness, specular)
    fn surface(&self) -> (f64, f64) {
        match self {
            MaterialTag::Skin => (0.55, 0.35),
            MaterialTag::Hair => (0.65, 0.15),
            MaterialTag::Shirt => (0.75, 0.10),
            MaterialTag::Jeans => (0.80, 0.08),
            MaterialTag::Shoes => (0.60, 0.20),
        }
    }

    fn color(&self, params: &ParameterSet) -> Rgba {
        let palette = &params.colors;
        match self {
            MaterialTag::Skin => palette.skin,
            MaterialTag::Hair => palette.hair,
            MaterialTag::Shirt => palette.shirt,
            MaterialTag::Jeans => palette.jeans,
            MaterialTag::Shoes => palette.shoes,
        }
    }

    pub fn material(&self, params: &ParameterSet) -> Material {
        let (roughness, specular) = self.surface();
        Material::new(self.material_name(), self.color(params), roughness, specular)
    }
}

/// Body region a part belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Leg,
    Shoe,
    Hips,
    Torso,
    Head,
    Hair,
    Arm,
    Hand,
    Shirt,
    Sleeve,
    Jeans,
    JeansHips,
    Cuff,
}

impl Region {
    /// Fixed part -> material table
    pub fn material(&self) -> MaterialTag {
        match self {
            Region::Leg
            | Region::Hips
            | Region::Torso
            | Region::Head
            | Region::Arm
            | Region::Hand => MaterialTag::Skin,
            Region::Hair => MaterialTag::Hair,
            Region::Shirt | Region::Sleeve => MaterialTag::Shirt,
            Region::Jeans | Region::JeansHips | Region::Cuff => MaterialTag::Jeans,
            Region::Shoe => MaterialTag::Shoes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Sign of the X offset: the left side sits at negative X
    pub fn sign(&self) -> f64 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            Side::Left => "L",
            Side::Right => "R",
        }
    }
}

const SIDES: [Side; 2] = [Side::Left, Side::Right];

/// A part created by the assembler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedPart {
    pub id: PartId,
    pub region: Region,
    pub side: Option<Side>,
}

/// One scene material per tag
#[derive(Debug, Clone, Copy)]
pub struct MaterialLibrary {
    ids: [MaterialId; 5],
}

impl MaterialLibrary {
    pub fn create(scene: &mut Scene, params: &ParameterSet) -> Self {
        let ids = MaterialTag::ALL.map(|tag| scene.add_material(tag.material(params)));
        Self { ids }
    }

    pub fn get(&self, tag: MaterialTag) -> MaterialId {
        self.ids[tag as usize]
    }
}

/// Tracks created parts and binds their materials
struct Builder<'a> {
    scene: &'a mut Scene,
    library: MaterialLibrary,
    placed: Vec<PlacedPart>,
}

impl Builder<'_> {
    fn name(region: Region, side: Option<Side>) -> String {
        let base = match region {
            Region::Leg => "Leg",
            Region::Shoe => "Shoe",
            Region::Hips => "Hips",
            Region::Torso => "Torso",
            Region::Head => "Head",
            Region::Hair => "Hair",
            Region::Arm => "Arm",
            Region::Hand => "Hand",
            Region::Shirt => "TShirt",
            Region::Sleeve => "Sleeve",
            Region::Jeans => "Jeans",
            Region::JeansHips => "Jeans_Hips",
            Region::Cuff => "Cuff",
        };
        match side {
            Some(side) => format!("{}_{}", base, side.suffix()),
            None => base.to_string(),
        }
    }

    fn finish_part(&mut self, id: PartId, region: Region, side: Option<Side>) -> Result<PartId, SceneError> {
        self.scene
            .assign_material(id, self.library.get(region.material()))?;
        self.placed.push(PlacedPart { id, region, side });
        Ok(id)
    }

    fn cylinder(
        &mut self,
        region: Region,
        side: Option<Side>,
        radius: f64,
        depth: f64,
        segments: u32,
        transform: Transform,
    ) -> Result<PartId, SceneError> {
        let name = Self::name(region, side);
        let id = self
            .scene
            .add_cylinder(&name, radius, depth, segments, transform)?;
        self.finish_part(id, region, side)
    }

    fn sphere(
        &mut self,
        region: Region,
        side: Option<Side>,
        radius: f64,
        segments: u32,
        transform: Transform,
    ) -> Result<PartId, SceneError> {
        let name = Self::name(region, side);
        let id = self
            .scene
            .add_uv_sphere(&name, radius, segments, rings_for(segments), transform)?;
        self.finish_part(id, region, side)
    }

    fn cube(
        &mut self,
        region: Region,
        side: Option<Side>,
        transform: Transform,
    ) -> Result<PartId, SceneError> {
        let name = Self::name(region, side);
        let id = self.scene.add_cube(&name, 1.0, transform)?;
        self.finish_part(id, region, side)
    }

    fn location(&self, id: PartId) -> Result<Vector3<f64>, SceneError> {
        Ok(self.scene.part(id)?.transform.location)
    }
}

/// Ring count of a UV sphere with `segments` around
pub fn rings_for(segments: u32) -> u32 {
    (segments / 2).max(crate::geometry::MIN_RINGS)
}

/// Build every part of the figure into `scene`, in the fixed order
/// legs, shoes, hips/torso, head/hair, arms/hands, shirt/sleeves, jeans/cuffs.
/// Cuffs are detached from the join.
pub fn assemble(
    table: &ProportionTable,
    params: &ParameterSet,
    scene: &mut Scene,
) -> Result<Vec<PlacedPart>, SceneError> {
    let library = MaterialLibrary::create(scene, params);
    let mut b = Builder {
        scene,
        library,
        placed: Vec::new(),
    };
    let t = table;
    let seg = params.segments;
    let ws = params.pose.weight_shift;
    let deg = f64::to_radians;

    // Legs
    let stance = deg(params.pose.knee_bend_deg * STANCE_PER_KNEE_DEG);
    let mut legs = Vec::with_capacity(2);
    for side in SIDES {
        let rotation = match side {
            Side::Left => Vector3::new(0.0, 0.0, stance),
            Side::Right => Vector3::new(stance, 0.0, -stance),
        };
        let transform = Transform::at(Vector3::new(side.sign() * t.hip_w * 0.35, 0.0, t.leg_h))
            .with_rotation(rotation);
        legs.push(b.cylinder(Region::Leg, Some(side), t.leg_r, t.leg_h * 2.0, seg.body, transform)?);
    }

    // Shoes, bevelled for a rounded low-poly look
    for side in SIDES {
        let transform = Transform::at(Vector3::new(
            side.sign() * t.hip_w * 0.35,
            t.shoe_len * 0.15,
            t.shoe_h * 0.5,
        ))
        .with_scale(Vector3::new(t.shoe_w * 0.5, t.shoe_len * 0.5, t.shoe_h * 0.5));
        let shoe = b.cube(Region::Shoe, Some(side), transform)?;
        b.scene.add_bevel(
            shoe,
            Bevel {
                width: t.bevel_width,
                segments: SHOE_BEVEL_SEGMENTS,
            },
        )?;
    }

    // Hips and torso, shifted onto one leg
    let hips = b.cylinder(
        Region::Hips,
        None,
        t.hip_w * 0.55,
        t.hip_h,
        seg.body,
        Transform::at(Vector3::new(ws, 0.0, t.z_legtop + t.hip_h * 0.5)),
    )?;
    let torso = b.cylinder(
        Region::Torso,
        None,
        t.shoulder_w * 0.42,
        t.torso_h,
        seg.body,
        Transform::at(Vector3::new(ws * 0.6, 0.0, t.z_hip + t.torso_h * 0.5)),
    )?;

    // Head and hair cap
    let head = b.sphere(
        Region::Head,
        None,
        t.head_r,
        seg.head,
        Transform::at(Vector3::new(ws * 0.5, 0.0, t.head_center_z))
            .with_rotation(Vector3::new(0.0, 0.0, deg(HEAD_TURN_DEG))),
    )?;
    let head_location = b.location(head)?;
    let hair = b.sphere(
        Region::Hair,
        None,
        t.head_r * 1.03,
        seg.head,
        Transform::at(head_location - Vector3::new(0.0, t.head_r * 0.05, 0.0))
            .with_scale(Vector3::new(1.0, 1.05, 0.92)),
    )?;
    b.scene.bisect(
        hair,
        &Plane::horizontal(head_location.z - t.head_r * 0.08),
        true,
    )?;

    // Relaxed arms and hands
    let relax = deg(params.pose.arm_relax_deg);
    let mut arms = Vec::with_capacity(2);
    for side in SIDES {
        let transform = Transform::at(Vector3::new(
            side.sign() * t.shoulder_w * 0.55 + ws * 0.2,
            ARM_OFFSET_Y,
            t.arm_z - t.arm_h,
        ))
        .with_rotation(Vector3::new(deg(ARM_FORWARD_DEG), 0.0, -side.sign() * relax));
        arms.push(b.cylinder(Region::Arm, Some(side), t.arm_r, t.arm_h * 2.0, seg.body, transform)?);
    }
    for (side, &arm) in SIDES.iter().zip(&arms) {
        let arm_x = b.location(arm)?.x;
        b.sphere(
            Region::Hand,
            Some(*side),
            t.hand_r,
            seg.hand_foot,
            Transform::at(Vector3::new(
                arm_x + side.sign() * HAND_OFFSET_X,
                ARM_OFFSET_Y,
                t.hand_z,
            )),
        )?;
    }

    // T-shirt shell over the torso, sleeves following the arms
    let torso_location = b.location(torso)?;
    b.cylinder(
        Region::Shirt,
        None,
        t.shoulder_w * 0.42 * 1.03,
        t.torso_h * 0.72,
        seg.body,
        Transform::at(torso_location + Vector3::new(0.0, 0.0, t.torso_h * 0.06)),
    )?;
    for (side, &arm) in SIDES.iter().zip(&arms) {
        let arm_transform = b.scene.part(arm)?.transform;
        b.cylinder(
            Region::Sleeve,
            Some(*side),
            t.arm_r * 1.15,
            t.sleeve_len,
            seg.body,
            Transform::at(Vector3::new(
                arm_transform.location.x,
                SLEEVE_OFFSET_Y,
                t.arm_z + SLEEVE_OFFSET_Z,
            ))
            .with_rotation(arm_transform.rotation),
        )?;
    }

    // Jeans shells over legs and hips
    let mut jeans = Vec::with_capacity(2);
    for (side, &leg) in SIDES.iter().zip(&legs) {
        let leg_location = b.location(leg)?;
        jeans.push(b.cylinder(
            Region::Jeans,
            Some(*side),
            t.leg_r * 1.06,
            t.leg_h * 2.05,
            seg.body,
            Transform::at(leg_location),
        )?);
    }
    let hips_location = b.location(hips)?;
    b.cylinder(
        Region::JeansHips,
        None,
        t.hip_w * 0.56,
        t.hip_h * 1.10,
        seg.body,
        Transform::at(hips_location),
    )?;

    if params.has_cuffs() {
        for (side, &leg_shell) in SIDES.iter().zip(&jeans) {
            let x = b.location(leg_shell)?.x;
            let cuff = b.cylinder(
                Region::Cuff,
                Some(*side),
                t.leg_r * 1.09,
                t.cuff_h,
                seg.body,
                Transform::at(Vector3::new(x, 0.0, t.cuff_h * 0.5)),
            )?;
            // Cuffs stay separate objects next to the joined figure
            b.scene.detach(cuff)?;
        }
    } else {
        debug!("cuffs disabled");
    }

    info!(parts = b.placed.len(), "assembled figure");
    Ok(b.placed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proportions::derive;

    fn build(params: &ParameterSet) -> (Scene, Vec<PlacedPart>) {
        let mut scene = Scene::new();
        let placed = assemble(&derive(params), params, &mut scene).unwrap();
        (scene, placed)
    }

    #[test]
    fn test_material_table() {
        assert_eq!(Region::Hand.material(), MaterialTag::Skin);
        assert_eq!(Region::Hair.material(), MaterialTag::Hair);
        assert_eq!(Region::Sleeve.material(), MaterialTag::Shirt);
        assert_eq!(Region::Cuff.material(), MaterialTag::Jeans);
        assert_eq!(Region::Shoe.material(), MaterialTag::Shoes);
    }

    #[test]
    fn test_creation_order() {
        let (scene, placed) = build(&ParameterSet::default());
        let names: Vec<&str> = placed
            .iter()
            .map(|p| scene.part(p.id).unwrap().name.as_str())
            .collect();

        assert_eq!(
            names,
            vec![
                "Leg_L", "Leg_R", "Shoe_L", "Shoe_R", "Hips", "Torso", "Head", "Hair", "Arm_L",
                "Arm_R", "Hand_L", "Hand_R", "TShirt", "Sleeve_L", "Sleeve_R", "Jeans_L",
                "Jeans_R", "Jeans_Hips", "Cuff_L", "Cuff_R",
            ]
        );
    }

    #[test]
    fn test_every_part_has_its_material() {
        let (scene, placed) = build(&ParameterSet::default());
        for p in &placed {
            let part = scene.part(p.id).unwrap();
            let material = scene.material(part.material.unwrap()).unwrap();
            assert_eq!(material.name, p.region.material().material_name());
        }
    }

    #[test]
    fn test_pose_offsets() {
        let params = ParameterSet::default();
        let (scene, _) = build(&params);
        let part = |name: &str| scene.part(scene.find(name).unwrap()).unwrap();

        assert_eq!(part("Hips").transform.location.x, 0.04);
        assert!((part("Torso").transform.location.x - 0.024).abs() < 1e-12);

        let arm_l = part("Arm_L").transform.rotation;
        let arm_r = part("Arm_R").transform.rotation;
        assert!((arm_l.z - 18f64.to_radians()).abs() < 1e-12);
        assert!((arm_r.z + 18f64.to_radians()).abs() < 1e-12);
        assert_eq!(part("Sleeve_L").transform.rotation, arm_l);

        let leg_l = part("Leg_L").transform.rotation;
        assert!((leg_l.z - 1f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn test_hair_is_cut_below_plane() {
        let params = ParameterSet::default();
        let table = derive(&params);
        let (scene, _) = build(&params);

        let hair = scene.part(scene.find("Hair").unwrap()).unwrap().world_mesh();
        let cut_z = table.head_center_z - table.head_r * 0.08;
        assert!(hair.vertices.iter().all(|v| v.position.z >= cut_z - 1e-9));
        assert!(hair.vertices.iter().any(|v| (v.position.z - cut_z).abs() < 1e-9));
    }

    #[test]
    fn test_no_cuffs_without_cuff_height() {
        let params = ParameterSet::default().with_cuff_height(0.0);
        let (_, placed) = build(&params);
        assert_eq!(placed.len(), 18);
        assert!(placed.iter().all(|p| p.region != Region::Cuff));
    }

    #[test]
    fn test_cuffs_follow_legs() {
        let params = ParameterSet::default().with_cuff_height(0.06);
        let (scene, placed) = build(&params);
        let cuffs: Vec<&PlacedPart> = placed.iter().filter(|p| p.region == Region::Cuff).collect();
        assert_eq!(cuffs.len(), 2);

        for cuff in cuffs {
            let leg = placed
                .iter()
                .find(|p| p.region == Region::Leg && p.side == cuff.side)
                .unwrap();
            let cuff_part = scene.part(cuff.id).unwrap();
            let leg_x = scene.part(leg.id).unwrap().transform.location.x;
            assert_eq!(cuff_part.transform.location.x, leg_x);
            assert!(cuff_part.detached);
        }
        assert_eq!(placed.iter().filter(|p| scene.part(p.id).unwrap().detached).count(), 2);
    }

    #[test]
    fn test_segment_failure_is_reported() {
        let mut scene = Scene::new();
        let mut params = ParameterSet::default();
        params.segments.body = 2;
        let result = assemble(&derive(&params), &params, &mut scene);
        assert!(matches!(result, Err(SceneError::Primitive { .. })));
    }
}
