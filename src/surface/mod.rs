//! Argument-surface discovery for scenario programs.
//!
//! A scenario's surface comes from its explicit manifest when one exists, and
//! otherwise from scanning its source text. Both strategies produce the same
//! kind-partitioned [`DescriptorSet`].
mod manifest;
mod scan;

use manifest::ManifestSource;
use scan::ScanSource;

use crate::descriptor::DescriptorSet;
use crate::registry::Scenario;
use anyhow::Result;
use std::path::Path;

/// A strategy that yields a scenario's descriptors.
pub trait SurfaceSource {
    /// Short name used in logs.
    fn label(&self) -> &'static str;

    /// File the strategy reads from.
    fn path(&self) -> &Path;

    fn descriptors(&self) -> Result<DescriptorSet>;
}

/// Discover a scenario's surface, never failing.
///
/// An unusable manifest falls back to the source scan. An unreadable source
/// is reported and yields an empty set.
pub fn discover(scenario: &Scenario) -> DescriptorSet {
    let manifest_path = scenario.manifest_path();
    if manifest_path.is_file() {
        let source = ManifestSource::new(manifest_path);
        match load(&source) {
            Ok(set) => return set,
            Err(err) => {
                tracing::warn!(
                    scenario = %scenario.name,
                    error = %format!("{err:#}"),
                    "surface manifest unusable; scanning source"
                );
            }
        }
    } else if scenario.manifest.is_some() {
        tracing::warn!(
            scenario = %scenario.name,
            path = %manifest_path.display(),
            "configured surface manifest missing; scanning source"
        );
    }

    let source = ScanSource::new(&scenario.program);
    match load(&source) {
        Ok(set) => set,
        Err(err) => {
            tracing::error!(
                scenario = %scenario.name,
                error = %format!("{err:#}"),
                "scenario source unavailable"
            );
            eprintln!("[ERROR] Could not find script: {}", scenario.program.display());
            DescriptorSet::default()
        }
    }
}

fn load(source: &dyn SurfaceSource) -> Result<DescriptorSet> {
    let set = source.descriptors()?;
    tracing::info!(
        strategy = source.label(),
        path = %source.path().display(),
        flags = set.flags.len(),
        choices = set.choices.len(),
        values = set.values.len(),
        total = set.len(),
        "discovered argument surface"
    );
    Ok(set)
}
