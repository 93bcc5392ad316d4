//! Shared test infrastructure for pkgsplit integration tests.
//!
//! `TestProject` lays out a project whose compiler step already ran: the
//! emitted tree under `build/esm` plus the `build/emit-report.json` that
//! describes it. Tests then split it through the library or the binary.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use pkgsplit::application::{BuildOptions, BuildResult, BuildUseCase};
use pkgsplit::config::Config;
use pkgsplit::infrastructure::{ChainResolver, FsDiscovery, LocalFs, ReportEmitter, ReportOptions};
use pkgsplit::SplitResult;
use serde_json::{json, Value};
use tempfile::TempDir;

pub const EMIT_DIR: &str = "build/esm";
pub const REPORT: &str = "build/emit-report.json";

/// Result of running the pkgsplit binary
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}):\n{}", self.stdout))
    }
}

/// A project directory with an emitted tree and its report
pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn builder() -> TestProjectBuilder {
        TestProjectBuilder::default()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    pub fn emit_root(&self) -> PathBuf {
        self.path(EMIT_DIR)
    }

    pub fn emitted(&self, relative: &str) -> PathBuf {
        self.emit_root().join(relative)
    }

    pub fn read(&self, relative: &str) -> String {
        let path = self.path(relative);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
    }

    pub fn read_json(&self, relative: &str) -> Value {
        serde_json::from_str(&self.read(relative)).expect("valid JSON")
    }

    /// Split through the library with the default configuration
    pub fn split(&self, options: BuildOptions) -> SplitResult<BuildResult> {
        self.use_case().execute(&options)
    }

    pub fn options(&self) -> BuildOptions {
        BuildOptions::from_config(self.root.path(), &Config::default())
    }

    fn use_case(
        &self,
    ) -> BuildUseCase<ReportEmitter<LocalFs, ChainResolver>, FsDiscovery<LocalFs>, LocalFs> {
        let config = Config::default();
        let fs = LocalFs::new();
        let emitter = ReportEmitter::new(
            fs,
            ChainResolver::standard(fs),
            self.emit_root(),
            self.path(REPORT),
            ReportOptions {
                extensions: config.packages.code_extensions.clone(),
                main_fields: config.resolve.main_fields.clone(),
                builtin_prefix: config.packages.builtin_prefix.clone(),
            },
        );
        let discovery = FsDiscovery::new(
            fs,
            config.packages.code_extensions.clone(),
            config.packages.entry_candidates.clone(),
        );
        BuildUseCase::new(emitter, discovery, fs)
    }

    /// Run the pkgsplit binary from the project root
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_pkgsplit"));
        cmd.current_dir(self.root.path()).args(args);
        for (key, _) in std::env::vars() {
            if key.starts_with("PKGSPLIT_") || key == "RUST_LOG" {
                cmd.env_remove(key);
            }
        }
        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("failed to execute pkgsplit");
        TestResult {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

#[derive(Default)]
pub struct TestProjectBuilder {
    /// (path relative to the emission root, content)
    artifacts: Vec<(String, String)>,
    /// (artifact, specifier, explicit target)
    references: Vec<(String, String, Option<String>)>,
    diagnostics: Vec<String>,
    /// Written to disk but left out of the report
    unlisted: Vec<(String, String)>,
    config: Option<String>,
}

impl TestProjectBuilder {
    /// An emitted file listed in the report
    pub fn artifact(mut self, path: &str, content: &str) -> Self {
        self.artifacts.push((path.to_string(), content.to_string()));
        self
    }

    /// A quoted specifier inside `artifact`, resolved by pkgsplit
    pub fn reference(mut self, artifact: &str, specifier: &str) -> Self {
        self.references
            .push((artifact.to_string(), specifier.to_string(), None));
        self
    }

    /// A quoted specifier with the target the compiler resolved it to
    pub fn reference_to(mut self, artifact: &str, specifier: &str, target: &str) -> Self {
        self.references.push((
            artifact.to_string(),
            specifier.to_string(),
            Some(target.to_string()),
        ));
        self
    }

    pub fn diagnostic(mut self, message: &str) -> Self {
        self.diagnostics.push(message.to_string());
        self
    }

    /// A file written under the project root but not reported
    pub fn file(mut self, path: &str, content: &str) -> Self {
        self.unlisted.push((path.to_string(), content.to_string()));
        self
    }

    pub fn config(mut self, toml: &str) -> Self {
        self.config = Some(toml.to_string());
        self
    }

    pub fn build(self) -> TestProject {
        let root = tempfile::tempdir().expect("temp project");
        let emit_root = root.path().join(EMIT_DIR);
        std::fs::create_dir_all(&emit_root).expect("emit root");

        for (path, content) in &self.artifacts {
            write(&emit_root.join(path), content);
        }
        for (path, content) in &self.unlisted {
            write(&root.path().join(path), content);
        }
        if let Some(config) = &self.config {
            write(&root.path().join("pkgsplit.toml"), config);
        }

        let artifacts: Vec<Value> = self
            .artifacts
            .iter()
            .map(|(path, content)| {
                let references: Vec<Value> = self
                    .references
                    .iter()
                    .filter(|(artifact, _, _)| artifact == path)
                    .map(|(_, specifier, target)| {
                        let start = specifier_offset(content, specifier)
                            .unwrap_or_else(|| panic!("{specifier} not quoted in {path}"));
                        let mut reference = json!({
                            "specifier": specifier,
                            "start": start,
                            "end": start + specifier.len(),
                        });
                        if let Some(target) = target {
                            reference["target"] = json!(target);
                        }
                        reference
                    })
                    .collect();
                json!({ "path": path, "references": references })
            })
            .collect();

        let report = json!({
            "diagnostics": self.diagnostics,
            "artifacts": artifacts,
        });
        write(
            &root.path().join(REPORT),
            &serde_json::to_string_pretty(&report).expect("report JSON"),
        );

        TestProject { root }
    }
}

/// Byte offset of `specifier` inside its quotes
pub fn specifier_offset(content: &str, specifier: &str) -> Option<usize> {
    ['"', '\'']
        .iter()
        .find_map(|q| content.find(&format!("{q}{specifier}{q}")))
        .map(|at| at + 1)
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("parent directory");
    }
    std::fs::write(path, content).expect("write fixture");
}

/// The `util` + `helpers` layout most scenarios start from
pub fn util_and_helpers() -> TestProjectBuilder {
    TestProject::builder()
        .artifact(
            "util.js",
            "import { h } from \"./helpers/index.js\";\nimport fs from \"fs\";\nexport const u = h + 1;\n",
        )
        .reference("util.js", "./helpers/index.js")
        .reference("util.js", "fs")
        .artifact("util.d.ts", "export declare const u: number;\n")
        .artifact("helpers/index.js", "export { h } from \"./math.js\";\n")
        .reference("helpers/index.js", "./math.js")
        .artifact("helpers/math.js", "export const h = 41;\n")
        .artifact("helpers/index.d.ts", "export { h } from \"./math.js\";\n")
}
