//! Shared test infrastructure for integration tests.
//!
//! Each fixture is a temp directory holding a registry and a few `sh`
//! scenario scripts. Scripts record the argument vector they received in
//! `<name>.args` next to themselves.

use serde_json::json;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Declarations are carried in comments; the scanner only reads text.
const RECON_SCRIPT: &str = r#"#!/bin/sh
# parser.add_argument("-json", action="store_true", help="Output results to a JSON file.")
# parser.add_argument("-query", help="search term")
# example: recon.sh -loglevel verbose -query storage
printf '%s\n' "$@" > "$0.args"
"#;

const FLAGS_SCRIPT: &str = r#"#!/bin/sh
# parser.add_argument("-csv", action="store_true", help="Output results to a CSV file.")
printf '%s\n' "$@" > "$0.args"
"#;

const FAILING_SCRIPT: &str = r#"#!/bin/sh
printf '%s\n' "$@" > "$0.args"
exit 4
"#;

/// Scenarios in menu order.
#[allow(dead_code)]
pub const SCENARIOS: [&str; 4] = ["recon", "flags", "fail", "missing"];

pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    /// Build the fixture, or `None` when `sh` is not on PATH.
    pub fn new() -> Option<Self> {
        if find_in_path("sh").is_none() {
            eprintln!("Skipping: sh not available");
            return None;
        }
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "recon.sh", RECON_SCRIPT);
        write(dir.path(), "flags.sh", FLAGS_SCRIPT);
        write(dir.path(), "fail.sh", FAILING_SCRIPT);

        let scenarios: Vec<_> = SCENARIOS
            .iter()
            .map(|name| {
                json!({
                    "name": name,
                    "program": format!("{name}.sh"),
                    "interpreter": "sh",
                    "description": format!("{name} test scenario"),
                })
            })
            .collect();
        let registry = json!({ "schema_version": 1, "scenarios": scenarios });
        write(
            dir.path(),
            "registry.json",
            &serde_json::to_string_pretty(&registry).expect("serialize registry"),
        );
        Some(Self { dir })
    }

    pub fn registry_path(&self) -> PathBuf {
        self.dir.path().join("registry.json")
    }

    /// Run the dispatcher against this fixture's registry, feeding `stdin`.
    pub fn run(&self, args: &[&str], stdin: &str) -> Output {
        let mut child = Command::new(env!("CARGO_BIN_EXE_skywalker"))
            .arg("--registry")
            .arg(self.registry_path())
            .args(args)
            .env_remove("SKYWALKER_LOG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("spawn skywalker");
        // The dispatcher may exit before reading everything; a broken pipe is fine.
        let _ = child
            .stdin
            .take()
            .expect("stdin handle")
            .write_all(stdin.as_bytes());
        child.wait_with_output().expect("wait for skywalker")
    }

    /// Arguments the named scenario was launched with, if it ran.
    pub fn recorded_args(&self, scenario: &str) -> Option<Vec<String>> {
        let path = self.dir.path().join(format!("{scenario}.sh.args"));
        let content = std::fs::read_to_string(path).ok()?;
        Some(content.lines().map(str::to_string).collect())
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).expect("write fixture file");
}

fn find_in_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}
