//! Explicit surface manifests published by scenario programs.
use super::SurfaceSource;
use crate::descriptor::{ArgumentDescriptor, DescriptorSet};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct SurfaceManifest {
    pub schema_version: u32,
    #[serde(default)]
    pub arguments: Vec<ManifestArgument>,
}

/// Declared kind of a manifest argument.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ManifestKind {
    Flag,
    Choice,
    Value,
}

/// One argument as written in a manifest.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct ManifestArgument {
    pub name: String,
    pub kind: ManifestKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl ManifestArgument {
    /// Classify the entry: a non-empty choice set always makes a choice,
    /// whatever `kind` says.
    fn into_descriptor(self) -> Result<ArgumentDescriptor> {
        if !self.name.starts_with('-') {
            return Err(anyhow!(
                "manifest argument {:?} must be dash-prefixed",
                self.name
            ));
        }
        if !self.choices.is_empty() {
            if self.kind != ManifestKind::Choice {
                tracing::warn!(
                    name = %self.name,
                    kind = ?self.kind,
                    "manifest argument declares choices; treating it as a choice"
                );
            }
            return Ok(ArgumentDescriptor::choice(
                self.name,
                self.help,
                self.choices,
                self.default,
            ));
        }
        match self.kind {
            ManifestKind::Choice => Err(anyhow!(
                "manifest choice {:?} declares no choices",
                self.name
            )),
            ManifestKind::Flag => {
                if self.default.is_some() {
                    tracing::warn!(name = %self.name, "default on a manifest flag ignored");
                }
                Ok(ArgumentDescriptor::flag(self.name, self.help))
            }
            ManifestKind::Value => Ok(ArgumentDescriptor::value(
                self.name,
                self.help,
                self.default,
            )),
        }
    }
}

/// Reads descriptors from a `*.surface.json` manifest.
pub struct ManifestSource {
    path: PathBuf,
}

impl ManifestSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SurfaceSource for ManifestSource {
    fn label(&self) -> &'static str {
        "manifest"
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn descriptors(&self) -> Result<DescriptorSet> {
        let bytes = fs::read(&self.path)
            .with_context(|| format!("read surface manifest {}", self.path.display()))?;
        let manifest: SurfaceManifest = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse surface manifest {}", self.path.display()))?;
        descriptors_from_manifest(manifest)
    }
}

pub fn descriptors_from_manifest(manifest: SurfaceManifest) -> Result<DescriptorSet> {
    if manifest.schema_version != MANIFEST_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported surface manifest schema_version {}",
            manifest.schema_version
        ));
    }
    let mut set = DescriptorSet::default();
    for argument in manifest.arguments {
        let descriptor = argument.into_descriptor()?;
        let name = descriptor.name.clone();
        if !set.insert(descriptor) {
            tracing::warn!(%name, "duplicate manifest argument ignored");
        }
    }
    Ok(set)
}
