//! Scenario registry: which programs the dispatcher can launch.
//!
//! The registry is configuration, not logic. A JSON file can replace the
//! built-in table; relative paths in it resolve against the file's directory.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const REGISTRY_SCHEMA_VERSION: u32 = 1;

/// Environment variable naming a registry file.
pub const REGISTRY_ENV: &str = "SKYWALKER_REGISTRY";

const REGISTRY_FILE_NAME: &str = "registry.json";
const SURFACE_SIDECAR_SUFFIX: &str = "surface.json";
const DEFAULT_INTERPRETER: &str = "python3";

/// On-disk registry layout.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct RegistryFile {
    pub schema_version: u32,
    #[serde(default)]
    pub scenarios: Vec<ScenarioEntry>,
}

/// One registry row as written by the operator.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct ScenarioEntry {
    pub name: String,
    pub program: String,
    /// Command prefix used to run the program, e.g. `python3 -u`.
    #[serde(default)]
    pub interpreter: Option<String>,
    /// Explicit surface manifest; defaults to a sidecar next to the program.
    #[serde(default)]
    pub manifest: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A registry row with paths resolved and the interpreter split into words.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub program: PathBuf,
    pub interpreter: Vec<String>,
    pub manifest: Option<PathBuf>,
    pub description: Option<String>,
}

impl Scenario {
    /// Where an explicit surface manifest for this scenario lives.
    ///
    /// `Skywalker-LogicApps.py` pairs with `Skywalker-LogicApps.surface.json`.
    pub fn manifest_path(&self) -> PathBuf {
        if let Some(manifest) = &self.manifest {
            return manifest.clone();
        }
        let stem = self
            .program
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        self.program
            .with_file_name(format!("{stem}.{SURFACE_SIDECAR_SUFFIX}"))
    }
}

/// Raised when a scenario name is not in the registry.
#[derive(Debug)]
pub struct UnknownScenario {
    pub name: String,
    pub available: Vec<String>,
}

impl fmt::Display for UnknownScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid scenario '{}' (available: {})",
            self.name,
            self.available.join(", ")
        )
    }
}

impl std::error::Error for UnknownScenario {}

#[derive(Clone, Debug)]
pub struct Registry {
    source: Option<PathBuf>,
    scenarios: Vec<Scenario>,
}

impl Registry {
    /// The two recon scenarios shipped alongside the dispatcher.
    pub fn builtin() -> Self {
        let file = RegistryFile {
            schema_version: REGISTRY_SCHEMA_VERSION,
            scenarios: vec![
                builtin_entry("logicapps", "Skywalker-LogicApps.py", "Logic Apps recon"),
                builtin_entry("keyvaults", "Skywalker-KeyVaults.py", "Key Vault secrets recon"),
            ],
        };
        Self::from_file(file, Path::new(""), None)
            .unwrap_or_else(|_| Self { source: None, scenarios: Vec::new() })
    }

    /// Read and validate a registry file.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("read registry {}", path.display()))?;
        let file: RegistryFile = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse registry JSON {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_file(file, base, Some(path.to_path_buf()))
    }

    pub fn from_file(file: RegistryFile, base: &Path, source: Option<PathBuf>) -> Result<Self> {
        validate_registry(&file)?;
        let mut scenarios = Vec::with_capacity(file.scenarios.len());
        for entry in file.scenarios {
            let interpreter = match entry.interpreter.as_deref() {
                Some(raw) => shell_words::split(raw)
                    .with_context(|| format!("parse interpreter for scenario {}", entry.name))?,
                None => Vec::new(),
            };
            scenarios.push(Scenario {
                program: base.join(&entry.program),
                manifest: entry.manifest.as_deref().map(|rel| base.join(rel)),
                name: entry.name,
                interpreter,
                description: entry.description,
            });
        }
        Ok(Self { source, scenarios })
    }

    /// File the registry was loaded from; `None` for the built-in table.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn names(&self) -> Vec<String> {
        self.scenarios.iter().map(|s| s.name.clone()).collect()
    }

    pub fn resolve(&self, name: &str) -> Result<&Scenario> {
        self.scenarios
            .iter()
            .find(|scenario| scenario.name == name)
            .ok_or_else(|| {
                anyhow!(UnknownScenario {
                    name: name.to_string(),
                    available: self.names(),
                })
            })
    }
}

fn builtin_entry(name: &str, program: &str, description: &str) -> ScenarioEntry {
    ScenarioEntry {
        name: name.to_string(),
        program: program.to_string(),
        interpreter: Some(DEFAULT_INTERPRETER.to_string()),
        manifest: None,
        description: Some(description.to_string()),
    }
}

fn validate_registry(file: &RegistryFile) -> Result<()> {
    if file.schema_version != REGISTRY_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported registry schema_version {}",
            file.schema_version
        ));
    }
    let mut seen = BTreeSet::new();
    for entry in &file.scenarios {
        let name = entry.name.trim();
        if name.is_empty() {
            return Err(anyhow!("scenario names must be non-empty"));
        }
        if !seen.insert(name) {
            return Err(anyhow!("duplicate scenario name {name:?}"));
        }
        if entry.program.trim().is_empty() {
            return Err(anyhow!("scenario {name:?} has an empty program"));
        }
        if let Some(interpreter) = entry.interpreter.as_deref() {
            if interpreter.trim().is_empty() {
                return Err(anyhow!("scenario {name:?} has an empty interpreter"));
            }
        }
    }
    Ok(())
}

/// Pick the registry file to use, if any.
///
/// Precedence: explicit path, `$SKYWALKER_REGISTRY`, then the user config dir.
pub fn locate_registry(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(value) = std::env::var_os(REGISTRY_ENV) {
        if !value.is_empty() {
            return Some(PathBuf::from(value));
        }
    }
    let candidate = dirs::config_dir()?
        .join("skywalker")
        .join(REGISTRY_FILE_NAME);
    candidate.is_file().then_some(candidate)
}

/// Load the configured registry, falling back to the built-in table.
pub fn load_registry(explicit: Option<&Path>) -> Result<Registry> {
    match locate_registry(explicit) {
        Some(path) => {
            let registry = Registry::load(&path)?;
            tracing::info!(
                path = %path.display(),
                scenarios = registry.scenarios().len(),
                "loaded scenario registry"
            );
            Ok(registry)
        }
        None => {
            tracing::debug!("using built-in scenario registry");
            Ok(Registry::builtin())
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
