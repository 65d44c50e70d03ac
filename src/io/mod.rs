// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - glTF export and import

mod export_gltf;
mod importer;

pub use export_gltf::{export as export_gltf, export_glb, to_glb_bytes, ExportFormat, ExportOptions};
pub use importer::{file_digest, import_gltf, ImportedAsset};
