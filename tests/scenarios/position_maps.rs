//! Scenario: position maps move with their artifacts and still point at
//! the original sources.

use pkgsplit::domain::services::SourceMap;

use crate::common::{TestProject, TestProjectBuilder};

const UTIL: &str = "import { h } from \"./helpers/index.js\";\nexport const u = h;\n";

fn project_with_maps() -> TestProjectBuilder {
    TestProject::builder()
        .artifact("util.js", UTIL)
        .reference("util.js", "./helpers/index.js")
        .artifact(
            "util.js.map",
            r#"{"version":3,"file":"util.js","sources":["../../src/util.ts"],"names":[],"mappings":"AAAA;AACA"}"#,
        )
        .artifact("helpers/index.js", "export const h = 1;\n")
        .artifact(
            "helpers/index.js.map",
            r#"{"version":3,"file":"index.js","sourceRoot":"../../../src","sources":["helpers/index.ts"],"names":[],"mappings":"AAAA"}"#,
        )
}

fn read_map(project: &TestProject, relative: &str) -> SourceMap {
    SourceMap::parse(&project.read(relative)).unwrap()
}

#[test]
fn rewritten_artifact_gets_composed_map() {
    let project = project_with_maps().build();
    let result = project.split(project.options()).unwrap();
    assert_eq!(result.applied.unwrap().composed_maps, 1);

    let map = read_map(&project, "util/util.js.map");
    assert_eq!(map.file.as_deref(), Some("util.js"));
    assert_eq!(map.sources, vec![Some("../src/util.ts".to_string())]);

    let lines = map.decode().unwrap();
    let first = lines[0].first().and_then(|s| s.original).unwrap();
    assert_eq!((first.line, first.column), (0, 0));
    let second = lines[1].first().and_then(|s| s.original).unwrap();
    assert_eq!((second.line, second.column), (1, 0));
}

#[test]
fn copied_map_sources_are_re_expressed() {
    let project = project_with_maps().build();
    project.split(project.options()).unwrap();

    let map = read_map(&project, "helpers/index.js.map");
    assert_eq!(map.source_root, None);
    assert_eq!(map.sources, vec![Some("../src/helpers/index.ts".to_string())]);
    assert_eq!(map.mappings, "AAAA");
    assert_eq!(project.read("helpers/index.js"), "export const h = 1;\n");
}

#[test]
fn url_sources_are_kept() {
    let project = TestProject::builder()
        .artifact("helpers/index.js", "export const h = 1;\n")
        .artifact(
            "helpers/index.js.map",
            r#"{"version":3,"sources":["webpack://app/src/index.ts","../../../src/index.ts"],"names":[],"mappings":"AAAA"}"#,
        )
        .build();
    project.split(project.options()).unwrap();

    let map = read_map(&project, "helpers/index.js.map");
    assert_eq!(
        map.sources,
        vec![
            Some("webpack://app/src/index.ts".to_string()),
            Some("../src/index.ts".to_string()),
        ]
    );
}

#[test]
fn malformed_map_fails_before_writing() {
    let project = TestProject::builder()
        .artifact("helpers/index.js", "export const h = 1;\n")
        .artifact("helpers/index.js.map", "{ not json")
        .build();

    let err = project.split(project.options()).unwrap_err();

    assert!(err.to_string().contains("index.js.map"), "{err}");
    assert!(!project.path("helpers").exists());
}
