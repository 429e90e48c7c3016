//! Best-effort recovery of an argument surface from program source text.
//!
//! Declarations are recognized one line at a time: a call such as
//! `parser.add_argument("-name", ...)` whose first quoted token is a
//! dash-prefixed option name. Markers elsewhere on the same line refine the
//! descriptor. Declarations split across lines are only partially recovered.
use super::SurfaceSource;
use crate::descriptor::{ArgumentDescriptor, DescriptorSet, LOGLEVEL_OPTION};
use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Substring that marks a presence-only option.
const FLAG_MARKER: &str = "store_true";

struct Patterns {
    declaration: Regex,
    help: Regex,
    choices: Regex,
    default: Regex,
    loglevel: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        declaration: Regex::new(r#"add_argument\(\s*["'](-[\w-]+)["']"#).expect("declaration regex"),
        help: Regex::new(r#"help\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("help regex"),
        choices: Regex::new(r"choices\s*=\s*\[(.*?)\]").expect("choices regex"),
        default: Regex::new(r#"default\s*=\s*["']?([^,"'\])]+)["']?"#).expect("default regex"),
        loglevel: Regex::new(r"-loglevel\s+(quiet|info|verbose)").expect("loglevel regex"),
    })
}

/// Recovers descriptors by scanning a scenario program's source.
pub struct ScanSource {
    path: PathBuf,
}

impl ScanSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SurfaceSource for ScanSource {
    fn label(&self) -> &'static str {
        "source scan"
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn descriptors(&self) -> Result<DescriptorSet> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("read scenario source {}", self.path.display()))?;
        Ok(scan_source(&content))
    }
}

/// Scan source text into kind-partitioned descriptors, in declaration order.
pub fn scan_source(content: &str) -> DescriptorSet {
    let patterns = patterns();
    let mut set = DescriptorSet::default();

    for (idx, line) in content.lines().enumerate() {
        if let Some(descriptor) = parse_declaration(patterns, line) {
            let name = descriptor.name.clone();
            if !set.insert(descriptor) {
                tracing::debug!(line = idx + 1, %name, "duplicate declaration ignored");
            }
        }

        if patterns.loglevel.is_match(line) && !set.contains(LOGLEVEL_OPTION) {
            tracing::debug!(line = idx + 1, "synthesized log-level choice");
            set.insert(ArgumentDescriptor::loglevel());
        }
    }

    set
}

fn parse_declaration(patterns: &Patterns, line: &str) -> Option<ArgumentDescriptor> {
    let captures = patterns.declaration.captures(line)?;
    let name = captures.get(1)?.as_str().to_string();
    // Markers only count after the option name.
    let rest = &line[captures.get(0)?.end()..];

    let is_flag = rest.contains(FLAG_MARKER);
    let help = patterns.help.captures(rest).and_then(|c| {
        c.get(1)
            .or_else(|| c.get(2))
            .map(|m| m.as_str().to_string())
    });
    let choices = patterns
        .choices
        .captures(rest)
        .and_then(|c| c.get(1))
        .map(|m| split_choices(m.as_str()));
    let default = patterns
        .default
        .captures(rest)
        .and_then(|c| c.get(1))
        .map(|m| strip_quotes(m.as_str()).to_string())
        .filter(|value| !value.is_empty());

    let descriptor = match choices {
        Some(choices) if !choices.is_empty() => {
            ArgumentDescriptor::choice(name, help, choices, default)
        }
        _ if is_flag => ArgumentDescriptor::flag(name, help),
        _ => ArgumentDescriptor::value(name, help, default),
    };
    Some(descriptor)
}

/// Split a choice-set literal on commas.
///
/// Values that themselves contain a comma are split as well.
fn split_choices(literal: &str) -> Vec<String> {
    literal
        .split(',')
        .map(strip_quotes)
        .filter(|choice| !choice.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_quotes(raw: &str) -> &str {
    raw.trim().trim_matches(|c| c == '"' || c == '\'').trim()
}
