// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Body proportions derived from the parameter set
//!
//! Every value is linear in `height / REFERENCE_HEIGHT`, so a figure twice as
//! tall has every length, radius and offset doubled.

use crate::params::ParameterSet;
use serde::{Deserialize, Serialize};

/// Height the base ratios were tuned at, in meters
pub const REFERENCE_HEIGHT: f64 = 1.65;

/// Lengths, radii and Z stack offsets of every body part, in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProportionTable {
    /// `height / REFERENCE_HEIGHT`
    pub scale: f64,

    pub head_r: f64,
    pub neck_h: f64,
    pub torso_h: f64,
    pub hip_h: f64,
    /// Half leg length
    pub leg_h: f64,
    /// Half arm length
    pub arm_h: f64,
    pub shoulder_w: f64,
    pub hip_w: f64,

    pub leg_r: f64,
    pub arm_r: f64,
    pub hand_r: f64,

    pub shoe_len: f64,
    pub shoe_w: f64,
    pub shoe_h: f64,
    pub bevel_width: f64,

    pub sleeve_len: f64,
    pub cuff_h: f64,

    // Z stack, feet at 0
    pub z_legtop: f64,
    pub z_hip: f64,
    pub z_torso: f64,
    pub z_neck: f64,
    pub z_head: f64,
    pub head_center_z: f64,
    /// Shoulder height the arms hang from
    pub arm_z: f64,
    pub hand_z: f64,
}

/// Map a parameter set to the proportion table. Pure and deterministic.
pub fn derive(params: &ParameterSet) -> ProportionTable {
    let s = params.height / REFERENCE_HEIGHT;

    let head_r = 0.095 * s;
    let neck_h = 0.05 * s;
    let torso_h = 0.45 * s;
    let hip_h = 0.12 * s;
    let leg_h = 0.78 * s * 0.5;
    let arm_h = 0.55 * s * 0.5;

    let z_legtop = leg_h * 2.0;
    let z_hip = z_legtop + hip_h;
    let z_torso = z_hip + torso_h;
    let z_neck = z_torso + neck_h;
    let z_head = z_neck + head_r * 1.2;

    ProportionTable {
        scale: s,
        head_r,
        neck_h,
        torso_h,
        hip_h,
        leg_h,
        arm_h,
        shoulder_w: 0.34 * s,
        hip_w: 0.28 * s,
        leg_r: 0.055 * s,
        arm_r: 0.040 * s,
        hand_r: 0.035 * s,
        shoe_len: 0.24 * s,
        shoe_w: 0.10 * s,
        shoe_h: 0.08 * s,
        bevel_width: 0.01 * s,
        sleeve_len: params.clothing.sleeve_length * s,
        cuff_h: params.clothing.cuff_height * s,
        z_legtop,
        z_hip,
        z_torso,
        z_neck,
        z_head,
        head_center_z: z_neck + head_r * 1.05,
        arm_z: z_hip + torso_h * 0.80,
        hand_z: z_hip + torso_h * 0.30,
    }
}

impl ProportionTable {
    /// Every field, in declaration order
    pub fn values(&self) -> [f64; 26] {
        [
            self.scale,
            self.head_r,
            self.neck_h,
            self.torso_h,
            self.hip_h,
            self.leg_h,
            self.arm_h,
            self.shoulder_w,
            self.hip_w,
            self.leg_r,
            self.arm_r,
            self.hand_r,
            self.shoe_len,
            self.shoe_w,
            self.shoe_h,
            self.bevel_width,
            self.sleeve_len,
            self.cuff_h,
            self.z_legtop,
            self.z_hip,
            self.z_torso,
            self.z_neck,
            self.z_head,
            self.head_center_z,
            self.arm_z,
            self.hand_z,
        ]
    }
}
