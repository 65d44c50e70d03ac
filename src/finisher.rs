// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Finisher: shading, transform baking, join and ground alignment

use crate::geometry::AUTO_SMOOTH_ANGLE_DEG;
use crate::scene::{AssembledMesh, Scene, SceneError};
use tracing::{debug, info};

/// Turn the scene into one ground-aligned mesh with an identity transform.
///
/// Every part is bevelled (where a bevel is queued), baked to world space and
/// then smooth shaded with the auto-smooth crease angle, so creases are judged
/// on the scaled geometry. The joined object gets its origin at the bounds
/// center, is dropped so its lowest vertex rests on Z = 0, and the offset is
/// baked into the vertices. Detached parts take the same ground offset.
pub fn finish(mut scene: Scene, name: &str) -> Result<AssembledMesh, SceneError> {
    let ids: Vec<_> = scene.part_ids().collect();
    for id in ids {
        scene.apply_modifiers(id)?;
        scene.apply_transform(id)?;
        scene.shade_smooth(id, AUTO_SMOOTH_ANGLE_DEG)?;
    }

    let mut joined = scene.join(name)?;
    joined.origin_to_bounds_center();
    joined.drop_to_ground();
    debug!(
        origin_x = joined.origin.x,
        origin_y = joined.origin.y,
        origin_z = joined.origin.z,
        "grounded origin"
    );
    joined.apply_transform();

    info!(
        name = %joined.name,
        parts = joined.part_count(),
        detached = joined.detached.len(),
        vertices = joined.vertex_count(),
        triangles = joined.triangle_count(),
        materials = joined.materials.len(),
        "finished mesh"
    );
    Ok(joined)
}
