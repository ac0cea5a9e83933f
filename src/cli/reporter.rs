// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::import::{RunReport, Severity};
use crate::scene::SceneGraph;
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Summarise a finished import run
    pub fn report_import(report: &RunReport, scene: &SceneGraph, duration: Duration) {
        println!("\n{}", "━".repeat(80).bright_black());
        let backend = report
            .backend
            .map(|b| b.to_string())
            .unwrap_or_else(|| "none".to_string());
        println!("{} {}", "Backend:".bold(), backend.cyan());
        println!("{}", "━".repeat(80).bright_black());

        Self::print_count("Files", report.file_count);
        Self::print_count("Features", report.features_processed);
        if report.features_skipped > 0 {
            println!(
                "  {} {}",
                "Skipped:".bright_black(),
                report.features_skipped.to_string().yellow()
            );
        }
        Self::print_count("Objects created", report.objects_created);
        Self::print_count("Objects merged", report.objects_merged);

        if let Some(origin) = report.origin {
            println!(
                "  {} E {:.3}  N {:.3}  unity {}",
                "Origin:".bright_black(),
                origin.easting,
                origin.northing,
                origin.unity
            );
        }

        let bbox = scene.bounding_box();
        if !bbox.is_empty() {
            let size = bbox.size();
            println!(
                "  {} {:.2} × {:.2} × {:.2}",
                "Extent:".bright_black(),
                size.x,
                size.y,
                size.z
            );
        }

        if let Some(root) = scene.root_group() {
            println!("\n{} {}", "Groups under".bold(), root.name.cyan());
            for id in &root.children {
                if let Some(group) = scene.group(*id) {
                    println!(
                        "  {} {} objects",
                        format!("{}:", group.name).bright_black(),
                        group.objects.len()
                    );
                }
            }
        }

        let warnings = report.count_at(Severity::Warning);
        let errors = report.count_at(Severity::Error);
        if warnings + errors > 0 {
            println!("\n{}", "Diagnostics:".bold());
            for d in report.warnings() {
                let tag = match d.severity {
                    Severity::Error => "error".red(),
                    _ => "warning".yellow(),
                };
                println!("  {} {} {} #{}: {}", tag, d.kind, d.name, d.reference_number, d.message);
            }
        }

        println!(
            "\n  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
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
