// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tunable figure parameters

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::MIN_SEGMENTS;

/// Linear RGBA color
pub type Rgba = [f64; 4];

/// Invalid parameter values, reported before any geometry is created
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("height must be positive and finite, got {0}")]
    Height(f64),

    #[error("{field} segments must be at least {min}, got {value}")]
    Segments {
        field: &'static str,
        value: u32,
        min: u32,
    },

    #[error("{field} is out of range, got {value}")]
    Dimension { field: &'static str, value: f64 },

    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} color channels must lie in [0, 1], got {value:?}")]
    Color { field: &'static str, value: Rgba },
}

/// Radial resolution per body region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Segments {
    /// Torso and limbs
    pub body: u32,
    pub head: u32,
    pub hand_foot: u32,
}

impl Default for Segments {
    fn default() -> Self {
        Self {
            body: 20,
            head: 24,
            hand_foot: 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub skin: Rgba,
    pub hair: Rgba,
    pub shirt: Rgba,
    pub jeans: Rgba,
    pub shoes: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            skin: [0.86, 0.73, 0.64, 1.0],
            hair: [0.12, 0.08, 0.05, 1.0],
            shirt: [0.20, 0.35, 0.70, 1.0],
            jeans: [0.08, 0.14, 0.28, 1.0],
            shoes: [0.90, 0.90, 0.92, 1.0],
        }
    }
}

/// Clothing dimensions in meters at the reference height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Clothing {
    /// 0.12 short, 0.22 longer
    pub sleeve_length: f64,
    /// 0 disables the jeans cuffs
    pub cuff_height: f64,
}

impl Default for Clothing {
    fn default() -> Self {
        Self {
            sleeve_length: 0.18,
            cuff_height: 0.06,
        }
    }
}

/// Fixed pose offsets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pose {
    /// Hip shift along X in meters
    pub weight_shift: f64,
    pub arm_relax_deg: f64,
    pub knee_bend_deg: f64,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            weight_shift: 0.04,
            arm_relax_deg: 18.0,
            knee_bend_deg: 5.0,
        }
    }
}

/// Immutable parameter set driving one build
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    /// Standing height in meters
    pub height: f64,
    pub segments: Segments,
    pub colors: Palette,
    pub clothing: Clothing,
    pub pose: Pose,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            height: 1.65,
            segments: Segments::default(),
            colors: Palette::default(),
            clothing: Clothing::default(),
            pose: Pose::default(),
        }
    }
}

impl ParameterSet {
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    pub fn with_cuff_height(mut self, cuff_height: f64) -> Self {
        self.clothing.cuff_height = cuff_height;
        self
    }

    pub fn with_segments(mut self, segments: Segments) -> Self {
        self.segments = segments;
        self
    }

    pub fn has_cuffs(&self) -> bool {
        self.clothing.cuff_height > 0.0
    }

    /// Fail fast on values that cannot produce a figure
    pub fn validate(&self) -> Result<(), ParamError> {
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(ParamError::Height(self.height));
        }

        for (field, value) in [
            ("body", self.segments.body),
            ("head", self.segments.head),
            ("hand_foot", self.segments.hand_foot),
        ] {
            if value < MIN_SEGMENTS {
                return Err(ParamError::Segments {
                    field,
                    value,
                    min: MIN_SEGMENTS,
                });
            }
        }

        let sleeve = self.clothing.sleeve_length;
        if !sleeve.is_finite() || sleeve <= 0.0 {
            return Err(ParamError::Dimension {
                field: "sleeve_length",
                value: sleeve,
            });
        }
        // Zero is allowed and means no cuffs
        let cuff = self.clothing.cuff_height;
        if !cuff.is_finite() || cuff < 0.0 {
            return Err(ParamError::Dimension {
                field: "cuff_height",
                value: cuff,
            });
        }

        for (field, value) in [
            ("weight_shift", self.pose.weight_shift),
            ("arm_relax_deg", self.pose.arm_relax_deg),
            ("knee_bend_deg", self.pose.knee_bend_deg),
        ] {
            if !value.is_finite() {
                return Err(ParamError::NotFinite { field, value });
            }
        }

        let colors = &self.colors;
        for (field, value) in [
            ("skin", colors.skin),
            ("hair", colors.hair),
            ("shirt", colors.shirt),
            ("jeans", colors.jeans),
            ("shoes", colors.shoes),
        ] {
            if value.iter().any(|c| !(0.0..=1.0).contains(c)) {
                return Err(ParamError::Color { field, value });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(ParameterSet::default().validate(), Ok(()));
        assert!(ParameterSet::default().has_cuffs());
        assert!(!ParameterSet::default().with_cuff_height(0.0).has_cuffs());
    }

    #[test]
    fn test_height_rejected() {
        for height in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                ParameterSet::default().with_height(height).validate(),
                Err(ParamError::Height(_))
            ));
        }
    }

    #[test]
    fn test_segment_boundary() {
        let mut params = ParameterSet::default();
        params.segments.head = 3;
        assert!(params.validate().is_ok());

        params.segments.head = 2;
        assert_eq!(
            params.validate(),
            Err(ParamError::Segments {
                field: "head",
                value: 2,
                min: 3
            })
        );
    }

    #[test]
    fn test_negative_clothing_rejected() {
        let params = ParameterSet::default().with_cuff_height(-0.01);
        assert!(matches!(
            params.validate(),
            Err(ParamError::Dimension {
                field: "cuff_height",
                ..
            })
        ));
    }

    #[test]
    fn test_color_range() {
        let mut params = ParameterSet::default();
        params.colors.hair = [0.1, 1.2, 0.0, 1.0];
        assert!(matches!(
            params.validate(),
            Err(ParamError::Color { field: "hair", .. })
        ));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let params: ParameterSet = toml::from_str(
            r#"
            height = 1.80

            [clothing]
            cuff_height = 0.0
            "#,
        )
        .unwrap();

        assert_eq!(params.height, 1.80);
        assert_eq!(params.clothing.cuff_height, 0.0);
        assert_eq!(params.clothing.sleeve_length, 0.18);
        assert_eq!(params.segments, Segments::default());
    }
}
