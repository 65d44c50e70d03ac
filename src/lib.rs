// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Figurine
//!
//! Procedural generator for a stylized low-poly standing figure. A small
//! parameter set drives proportions, primitive placement, clothing shells
//! and a hair cap; the result is joined into one ground-aligned mesh and
//! exported as binary glTF for web engines.

pub mod assembler;
pub mod cli;
pub mod config;
pub mod finisher;
pub mod geometry;
pub mod io;
pub mod params;
pub mod proportions;
pub mod scene;

pub use assembler::{assemble, MaterialTag, PlacedPart, Region};
pub use config::GeneratorConfig;
pub use finisher::finish;
pub use geometry::{Mesh, Primitive};
pub use io::{export_glb, export_gltf, import_gltf, ExportFormat, ExportOptions};
pub use params::{ParamError, ParameterSet};
pub use proportions::{derive, ProportionTable};
pub use scene::{AssembledMesh, Scene, SceneError};

use anyhow::Result;
use tracing::info;

/// Object name used by [`generate`]
pub const DEFAULT_OBJECT_NAME: &str = "Woman_LowPoly_Static";

/// Build the finished figure in memory
pub fn generate(params: &ParameterSet) -> Result<AssembledMesh> {
    build(params, DEFAULT_OBJECT_NAME)
}

/// Build the figure described by `config` and write it to `config.output`
pub fn generate_to_file(config: &GeneratorConfig) -> Result<AssembledMesh> {
    let mesh = build(&config.params, &config.object_name)?;

    let options = ExportOptions {
        format: ExportFormat::from_path(&config.output),
        ..ExportOptions::default()
    };
    export_gltf(&mesh, &config.output, &options)?;
    Ok(mesh)
}

fn build(params: &ParameterSet, name: &str) -> Result<AssembledMesh> {
    params.validate()?;

    let table = derive(params);
    info!(height = params.height, scale = table.scale, "derived proportions");

    let mut scene = Scene::new();
    assemble(&table, params, &mut scene)?;

    Ok(finish(scene, name)?)
}
