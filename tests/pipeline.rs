// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! End-to-end pipeline tests

use anyhow::Result;
use approx::assert_relative_eq;
use figurine::io::to_glb_bytes;
use figurine::{
    assemble, derive, generate, generate_to_file, ExportOptions, GeneratorConfig, ParamError,
    ParameterSet, Region, Scene,
};
use tempfile::tempdir;

#[test]
fn test_default_figure_without_cuffs() -> Result<()> {
    let mesh = generate(&ParameterSet::default().with_cuff_height(0.0))?;

    assert_eq!(mesh.part_count(), 18);
    assert!(mesh.detached.is_empty());

    // Slots follow first use in assembly order
    assert_eq!(
        mesh.material_names(),
        vec!["MAT_Skin", "MAT_Shoes", "MAT_Hair", "MAT_TShirt", "MAT_Jeans"]
    );
    for slot in 0..mesh.materials.len() {
        assert!(mesh.mesh.triangles.iter().any(|t| t.material == slot));
    }
    assert_relative_eq!(mesh.min_z().unwrap(), 0.0, epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_default_figure_joins_eighteen_parts() -> Result<()> {
    let mesh = generate(&ParameterSet::default())?;

    assert_eq!(mesh.part_count(), 18);
    assert_eq!(
        mesh.parts,
        [
            "Leg_L", "Leg_R", "Shoe_L", "Shoe_R", "Hips", "Torso", "Head", "Hair", "Arm_L",
            "Arm_R", "Hand_L", "Hand_R", "TShirt", "Sleeve_L", "Sleeve_R", "Jeans_L", "Jeans_R",
            "Jeans_Hips",
        ]
    );
    assert_eq!(mesh.materials.len(), 5);
    for slot in 0..mesh.materials.len() {
        assert!(mesh.mesh.triangles.iter().any(|t| t.material == slot));
    }

    // Cuffs exist as separate objects, grounded with the figure
    assert_eq!(mesh.detached_names(), vec!["Cuff_L", "Cuff_R"]);
    for cuff in &mesh.detached {
        assert!(cuff.mesh.min_z().unwrap() >= 0.0);
    }
    Ok(())
}

#[test]
fn test_cuffs_follow_legs() -> Result<()> {
    let params = ParameterSet::default();
    let mut scene = Scene::new();
    let placed = assemble(&derive(&params), &params, &mut scene)?;

    assert_eq!(placed.iter().filter(|p| p.region == Region::Cuff).count(), 2);
    for side in ["L", "R"] {
        let leg = scene.part(scene.find(&format!("Leg_{}", side)).unwrap())?;
        let cuff = scene.part(scene.find(&format!("Cuff_{}", side)).unwrap())?;
        assert_relative_eq!(leg.transform.location.x, cuff.transform.location.x);
    }
    Ok(())
}

#[test]
fn test_proportions_scale_with_height() {
    let base = derive(&ParameterSet::default().with_height(1.6));
    let doubled = derive(&ParameterSet::default().with_height(3.2));

    for (a, b) in base.values().iter().zip(doubled.values()) {
        assert_relative_eq!(a * 2.0, b, max_relative = 1e-12);
    }
}

#[test]
fn test_generation_is_deterministic() -> Result<()> {
    let params = ParameterSet::default().with_height(1.72);
    assert_eq!(derive(&params), derive(&params));

    let first = to_glb_bytes(&generate(&params)?, &ExportOptions::default())?;
    let second = to_glb_bytes(&generate(&params)?, &ExportOptions::default())?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_figure_grounded_at_any_height() -> Result<()> {
    for height in [0.9, 1.65, 2.1] {
        let mesh = generate(&ParameterSet::default().with_height(height))?;
        assert_relative_eq!(mesh.min_z().unwrap(), 0.0, epsilon = 1e-6);

        let size = mesh.bounding_box().size();
        assert!(size.z > 0.85 * height && size.z < height, "height {}", height);
    }
    Ok(())
}

#[test]
fn test_minimum_segments_build() -> Result<()> {
    let mut params = ParameterSet::default();
    params.segments.body = 3;
    params.segments.head = 3;
    params.segments.hand_foot = 3;

    let mesh = generate(&params)?;
    assert_eq!(mesh.part_count(), 18);
    assert_eq!(mesh.detached.len(), 2);
    Ok(())
}

#[test]
fn test_invalid_params_fail_before_geometry() {
    let mut params = ParameterSet::default();
    params.segments.body = 2;

    let err = generate(&params).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ParamError>(),
        Some(ParamError::Segments { field: "body", .. })
    ));

    let err = generate(&ParameterSet::default().with_height(-1.0)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ParamError>(),
        Some(ParamError::Height(_))
    ));
}

#[test]
fn test_generate_to_file() -> Result<()> {
    let dir = tempdir()?;
    let config = GeneratorConfig {
        output: dir.path().join("figure.glb"),
        ..GeneratorConfig::default()
    };

    let mesh = generate_to_file(&config)?;
    let bytes = std::fs::read(&config.output)?;
    assert_eq!(&bytes[0..4], b"glTF");
    assert_eq!(bytes, to_glb_bytes(&mesh, &ExportOptions::default())?);
    Ok(())
}

#[test]
fn test_generate_to_unwritable_path() {
    let config = GeneratorConfig {
        output: "/nonexistent-dir/figure.glb".into(),
        ..GeneratorConfig::default()
    };
    assert!(generate_to_file(&config).is_err());
}
