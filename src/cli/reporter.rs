// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::geometry::BoundingBox;
use crate::io::ImportedAsset;
use crate::scene::AssembledMesh;
use colored::*;
use std::path::Path;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report a generated figure
    pub fn report_generated(mesh: &AssembledMesh, output: &Path, duration: Duration) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Object:".bold(), mesh.name.cyan());
        println!("{}", "━".repeat(80).bright_black());

        Self::print_count("Parts", mesh.part_count());
        if !mesh.detached.is_empty() {
            println!(
                "  {} {}",
                "Detached:".bright_black(),
                mesh.detached_names().join(", ").cyan()
            );
        }
        Self::print_count("Vertices", mesh.vertex_count());
        Self::print_count("Triangles", mesh.triangle_count());
        println!(
            "  {} {}",
            "Bounds:".bright_black(),
            Self::format_bounds(&mesh.full_bounding_box())
        );

        println!("\n{}", "Materials:".bold());
        for (slot, material) in mesh.materials.iter().enumerate() {
            let triangles = std::iter::once(&mesh.mesh)
                .chain(mesh.detached.iter().map(|p| &p.mesh))
                .flat_map(|m| &m.triangles)
                .filter(|t| t.material == slot)
                .count();
            println!(
                "  {} {} {}",
                format!("{:<12}", material.name).cyan(),
                triangles.to_string().yellow(),
                "triangles".bright_black()
            );
        }

        println!(
            "\n  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
        Self::success(&format!("Export done: {}", output.display()));
    }

    /// Report an imported asset
    pub fn report_inspect(file: &Path, asset: &ImportedAsset, digest: &str) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "File:".bold(), file.display().to_string().cyan());
        println!("{}", "━".repeat(80).bright_black());

        if !asset.node_names.is_empty() {
            println!(
                "  {} {}",
                "Nodes:".bright_black(),
                asset.node_names.join(", ").cyan()
            );
        }
        Self::print_count("Primitives", asset.primitive_count);
        Self::print_count("Vertices", asset.vertex_count());
        Self::print_count("Triangles", asset.triangle_count());
        Self::print_count("Materials", asset.material_names.len());
        for name in &asset.material_names {
            println!("    {}", name.bright_black());
        }
        println!(
            "  {} {}",
            "Bounds:".bright_black(),
            Self::format_bounds(&asset.mesh.bounding_box())
        );
        println!("  {} {}", "SHA-256:".bright_black(), digest.yellow());
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    fn print_count(name: &str, value: usize) {
        println!(
            "  {} {}",
            format!("{}:", name).bright_black(),
            value.to_string().cyan()
        );
    }

    fn format_bounds(bbox: &BoundingBox) -> String {
        if bbox.is_empty() {
            return "empty".to_string();
        }
        let size = bbox.size();
        format!(
            "[{:.3}, {:.3}, {:.3}] .. [{:.3}, {:.3}, {:.3}] (size {:.3} x {:.3} x {:.3})",
            bbox.min.x, bbox.min.y, bbox.min.z, bbox.max.x, bbox.max.y, bbox.max.z, size.x, size.y,
            size.z
        )
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_format_duration() {
        assert_eq!(
            Reporter::format_duration(Duration::from_micros(500)),
            "500µs"
        );
        assert_eq!(
            Reporter::format_duration(Duration::from_millis(5)),
            "5.00ms"
        );
        assert_eq!(Reporter::format_duration(Duration::from_secs(2)), "2.00s");
    }

    #[test]
    fn test_format_bounds() {
        assert_eq!(Reporter::format_bounds(&BoundingBox::empty()), "empty");

        let bbox = BoundingBox::new(Point3::new(-0.5, -0.25, 0.0), Point3::new(0.5, 0.25, 1.65));
        assert_eq!(
            Reporter::format_bounds(&bbox),
            "[-0.500, -0.250, 0.000] .. [0.500, 0.250, 1.650] (size 1.000 x 0.500 x 1.650)"
        );
    }
}
