//! Property tests for partitioning and destination planning.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use proptest::prelude::*;

use proptest::sample::Index;

use pkgsplit::domain::entities::{Artifact, ByteRange, InputModule, Reference, RequiredChange};
use pkgsplit::domain::services::{ChangePlanner, Partitioner, PlanError};
use pkgsplit::domain::value_objects::normalize;

const EMIT: &str = "/project/build/esm";
const OUT: &str = "/project";
const EMPTY_MAP: &str = r#"{"version":3,"sources":[],"names":[],"mappings":""}"#;

/// Module names, biased towards a few that clash with each other or the emitted tree
fn name() -> impl Strategy<Value = String> {
    prop_oneof![
        12 => proptest::string::string_regex("[a-z]{1,6}").unwrap(),
        1 => Just("util".to_string()),
        1 => Just("build".to_string()),
    ]
}

/// File module names and directory modules with their relative files
fn layout() -> impl Strategy<Value = (BTreeSet<String>, BTreeMap<String, BTreeSet<String>>)> {
    let files = proptest::collection::btree_set(name(), 0..5);
    let nested = proptest::collection::btree_set(
        proptest::string::string_regex("([a-z]{1,4}/)?[a-z]{1,6}\\.(js|d\\.ts|js\\.map)").unwrap(),
        1..6,
    );
    let directories = proptest::collection::btree_map(name(), nested, 0..4);
    (files, directories)
}

/// Whether two modules share a package root, or one would sit over the emission root
fn roots_collide(files: &BTreeSet<String>, directories: &BTreeMap<String, BTreeSet<String>>) -> bool {
    files.iter().any(|f| directories.contains_key(f))
        || files.contains("build")
        || directories.contains_key("build")
}

fn artifact(path: PathBuf) -> Artifact {
    let content = if path.to_string_lossy().ends_with(".map") {
        EMPTY_MAP
    } else {
        ""
    };
    Artifact::new(path, content)
}

fn materialize(
    files: &BTreeSet<String>,
    directories: &BTreeMap<String, BTreeSet<String>>,
) -> (Vec<InputModule>, Vec<Artifact>) {
    let emit = Path::new(EMIT);
    let mut inputs = Vec::new();
    let mut artifacts = Vec::new();

    for file in files {
        inputs.push(InputModule::file(format!("{file}.js")));
        for ext in [".js", ".js.map", ".d.ts"] {
            artifacts.push(artifact(emit.join(format!("{file}{ext}"))));
        }
    }
    for (dir, members) in directories {
        inputs.push(InputModule::directory(dir, None));
        for member in members {
            artifacts.push(artifact(emit.join(dir).join(member)));
        }
    }
    // Outside every module
    artifacts.push(artifact(emit.join("zzz-notes.md")));

    (inputs, artifacts)
}

/// Give code artifacts quoted specifiers pointing at other code artifacts
///
/// Each `(referrer, target)` pair picks among the `.js` artifacts.
fn with_references(artifacts: Vec<Artifact>, links: &[(Index, Index)]) -> Vec<Artifact> {
    let code: Vec<PathBuf> = artifacts
        .iter()
        .map(|a| a.path().to_path_buf())
        .filter(|p| p.to_string_lossy().ends_with(".js"))
        .collect();
    if code.is_empty() {
        return artifacts;
    }

    let mut outgoing: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    for (referrer, target) in links {
        outgoing
            .entry(code[referrer.index(code.len())].clone())
            .or_default()
            .push(code[target.index(code.len())].clone());
    }

    artifacts
        .into_iter()
        .map(|artifact| {
            let Some(targets) = outgoing.get(artifact.path()) else {
                return artifact;
            };
            let mut content = String::new();
            let mut references = Vec::new();
            for (k, target) in targets.iter().enumerate() {
                let specifier = format!("./t{k}");
                let start = content.len() + "import \"".len();
                content.push_str(&format!("import \"{specifier}\";\n"));
                references.push(
                    Reference::new(&specifier, ByteRange::new(start, start + specifier.len()))
                        .with_target(target.clone()),
                );
            }
            Artifact::new(artifact.path(), content).with_references(references)
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Every artifact inside a module boundary lands in exactly
    /// that module, and nothing lands in two.
    #[test]
    fn property_partition_is_a_strict_cover((files, directories) in layout()) {
        let (inputs, artifacts) = materialize(&files, &directories);
        let modules = Partitioner::new(EMIT, ".js").partition(&inputs, &artifacts);

        prop_assert_eq!(modules.len(), inputs.len());

        let mut seen = HashSet::new();
        for module in &modules {
            for artifact in &module.artifacts {
                prop_assert!(seen.insert(artifact.path().to_path_buf()), "{:?} assigned twice", artifact.path());
            }
        }

        let notes = Path::new(EMIT).join("zzz-notes.md");
        for artifact in &artifacts {
            let assigned = seen.contains(artifact.path());
            prop_assert_eq!(assigned, artifact.path() != notes.as_path());
        }
    }

    /// PROPERTY: Planned destinations are distinct and sit inside the
    /// package directory of their module.
    #[test]
    fn property_destinations_are_unique((files, directories) in layout()) {
        prop_assume!(!roots_collide(&files, &directories));
        let (inputs, artifacts) = materialize(&files, &directories);
        let modules = Partitioner::new(EMIT, ".js").partition(&inputs, &artifacts);
        let planner = ChangePlanner::new(EMIT, OUT, "package.json");

        let paths = planner.final_paths(&modules).unwrap();
        let destinations: HashSet<&Path> = paths.iter().map(|(_, to)| to).collect();
        prop_assert_eq!(destinations.len(), paths.len());

        for module in &modules {
            let root = planner.package_root(module);
            for artifact in &module.artifacts {
                let to = paths.get(artifact.path()).unwrap();
                prop_assert!(to.starts_with(&root), "{:?} outside {:?}", to, root);
            }
        }
    }

    /// PROPERTY: A plan is phase ordered and moves every assigned artifact once.
    #[test]
    fn property_plan_moves_each_artifact_once((files, directories) in layout()) {
        let (inputs, artifacts) = materialize(&files, &directories);
        let modules = Partitioner::new(EMIT, ".js").partition(&inputs, &artifacts);
        let planned = ChangePlanner::new(EMIT, OUT, "package.json").plan(&modules);

        if roots_collide(&files, &directories) {
            prop_assert!(
                matches!(
                    planned,
                    Err(PlanError::DuplicatePackageRoot { .. })
                        | Err(PlanError::PackageRootOverlapsEmission { .. })
                ),
                "{:?}",
                planned
            );
            return Ok(());
        }
        let changes = planned.unwrap();

        prop_assert!(changes.is_phase_ordered());

        let moved: Vec<PathBuf> = changes
            .changes()
            .iter()
            .filter_map(|c| match c {
                RequiredChange::MoveArtifact { from, .. } => Some(from.clone()),
                _ => None,
            })
            .collect();
        let unique: HashSet<&PathBuf> = moved.iter().collect();
        prop_assert_eq!(unique.len(), moved.len());

        let assigned: usize = modules.iter().map(|m| m.artifacts.len()).sum();
        prop_assert_eq!(moved.len(), assigned);
        prop_assert_eq!(changes.directories().count(), modules.len());
    }

    /// PROPERTY: Every rewritten specifier, resolved from the referrer's final
    /// directory, names the target's final location.
    #[test]
    fn property_rewritten_references_reach_their_targets(
        (files, directories) in layout(),
        links in proptest::collection::vec((any::<Index>(), any::<Index>()), 0..12),
    ) {
        prop_assume!(!roots_collide(&files, &directories));
        let (inputs, plain) = materialize(&files, &directories);
        let artifacts = with_references(plain, &links);
        let modules = Partitioner::new(EMIT, ".js").partition(&inputs, &artifacts);
        let planner = ChangePlanner::new(EMIT, OUT, "package.json");

        let paths = planner.final_paths(&modules).unwrap();
        let changes = planner.plan(&modules).unwrap();

        let mut checked = 0;
        for change in changes.changes() {
            let RequiredChange::RewriteReferences { artifact, edits } = change else {
                continue;
            };
            let referrer = artifacts.iter().find(|a| a.path() == artifact.as_path()).unwrap();
            let from = paths.get(artifact).unwrap().parent().unwrap();

            for edit in edits {
                let reference = referrer
                    .references()
                    .iter()
                    .find(|r| r.range == edit.range)
                    .unwrap();
                let target = reference.target.as_deref().unwrap();
                prop_assert!(edit.replacement.starts_with("./") || edit.replacement.starts_with("../"));
                prop_assert_eq!(
                    normalize(&from.join(&edit.replacement)),
                    paths.get(target).unwrap().to_path_buf()
                );
                checked += 1;
            }
        }

        // Every linked artifact in this layout belongs to a module.
        let linked: usize = artifacts.iter().map(|a| a.references().len()).sum();
        prop_assert_eq!(checked, linked);
    }
}
