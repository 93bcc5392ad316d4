//! Scenario: a file module and a directory module become sibling packages.

use crate::common::{util_and_helpers, TestProject};

#[test]
fn file_and_directory_modules_become_packages() {
    let project = util_and_helpers()
        .artifact("README.md", "# emitted notes\n")
        .build();

    let result = project.split(project.options()).unwrap();

    assert_eq!(result.package_names(), vec!["util", "helpers"]);
    assert_eq!(result.packages[0].directory, project.path("util"));
    assert_eq!(result.packages[0].artifacts, 2);
    assert_eq!(result.packages[1].artifacts, 3);
    assert!(result.packages.iter().all(|p| p.entry_point));
    assert_eq!(result.unassigned, vec![project.emitted("README.md")]);

    for file in [
        "util/util.js",
        "util/util.d.ts",
        "util/package.json",
        "helpers/index.js",
        "helpers/math.js",
        "helpers/index.d.ts",
        "helpers/package.json",
    ] {
        assert!(project.path(file).is_file(), "missing {file}");
    }
    assert!(!project.path("README.md").exists());
}

#[test]
fn references_follow_their_targets() {
    let project = util_and_helpers().build();
    project.split(project.options()).unwrap();

    let util = project.read("util/util.js");
    assert!(util.contains("from \"../helpers/index.js\""), "{util}");
    assert!(util.contains("from \"node:fs\""), "{util}");
    assert!(util.ends_with("export const u = h + 1;\n"));

    assert_eq!(
        project.read("helpers/index.js"),
        "export { h } from \"./math.js\";\n"
    );
}

#[test]
fn manifests_describe_entry_points_and_exports() {
    let project = util_and_helpers().build();
    project.split(project.options()).unwrap();

    let util = project.read_json("util/package.json");
    assert_eq!(util["type"], "module");
    assert_eq!(util["main"], "./util.js");
    assert_eq!(util["types"], "./util.d.ts");
    assert_eq!(util["sideEffects"], false);
    assert_eq!(util["exports"]["."]["import"], "./util.js");

    let helpers = project.read_json("helpers/package.json");
    assert_eq!(helpers["main"], "./index.js");
    assert_eq!(helpers["exports"]["."]["import"], "./index.js");
    assert_eq!(helpers["exports"]["./math.js"]["import"], "./math.js");
    assert!(helpers["exports"].get("./index.d.ts").is_none());
}

#[test]
fn directory_without_entry_point_exports_every_file() {
    let project = TestProject::builder()
        .artifact("shapes/circle.js", "export const r = 1;\n")
        .artifact("shapes/square.js", "export const s = 2;\n")
        .build();

    let result = project.split(project.options()).unwrap();
    assert!(!result.packages[0].entry_point);

    let manifest = project.read_json("shapes/package.json");
    assert!(manifest.get("main").is_none());
    assert_eq!(manifest["exports"]["./circle.js"]["import"], "./circle.js");
    assert_eq!(manifest["exports"]["./square.js"]["import"], "./square.js");
}

#[test]
fn emitted_tree_is_left_untouched() {
    let project = util_and_helpers().build();
    let before = project.read("build/esm/util.js");

    project.split(project.options()).unwrap();

    assert_eq!(project.read("build/esm/util.js"), before);
    assert!(project.emitted("helpers/math.js").is_file());
}

#[test]
fn rebuilding_replaces_packages_and_ignore_block() {
    let project = util_and_helpers()
        .file(".gitignore", "node_modules\n")
        .file("util/stale.js", "old output\n")
        .build();

    project.split(project.options()).unwrap();
    project.split(project.options()).unwrap();

    assert!(!project.path("util/stale.js").exists());
    let ignore = project.read(".gitignore");
    assert!(ignore.starts_with("node_modules\n"));
    assert_eq!(ignore.matches("/util\n").count(), 1);
    assert_eq!(ignore.matches("/helpers\n").count(), 1);
}

#[test]
fn dry_run_plans_without_writing() {
    let project = util_and_helpers().build();

    let result = project
        .split(project.options().with_dry_run(true))
        .unwrap();

    assert!(result.is_dry_run());
    assert!(result.changes.is_phase_ordered());
    assert_eq!(result.changes.directories().count(), 2);
    assert_eq!(result.changes.moves().count(), 5);
    assert!(!project.path("util").exists());
    assert!(!project.path(".gitignore").exists());
}
