//! Integration tests for workspace discovery.
//!
//! Each test writes a small descriptor tree into a temp directory and runs
//! discovery from one of its projects.

mod common;

use std::fs;
use std::sync::Arc;

use berth::core::model::ModelMode;
use berth::util::overrides::TOP_LEVEL_BASEDIR;
use berth::{
    current_workspace, load_project, load_workspace, load_workspaces, ArtifactKey, LocalWorkspace,
    MapOverrides, WorkspaceConfig, WorkspaceError,
};
use common::{canonical, ctx, ctx_with, sample_workspace, Pom, GROUP};
use rstest::rstest;
use tempfile::TempDir;

fn artifact_ids(ws: &LocalWorkspace) -> Vec<&str> {
    let mut ids: Vec<&str> = ws.projects().map(|p| p.artifact_id()).collect();
    ids.sort();
    ids
}

fn parent_ids<'a>(ws: &'a LocalWorkspace, artifact_id: &str) -> Vec<&'a str> {
    let project = ws.get_project(GROUP, artifact_id).unwrap();
    ws.parents(project).map(|p| p.artifact_id()).collect()
}

fn config(effective: bool) -> WorkspaceConfig {
    WorkspaceConfig::default().with_effective_model_builder(effective)
}

// ============================================================================
// Sample workspace
// ============================================================================

#[rstest]
#[case::raw(false)]
#[case::effective(true)]
fn test_independent_project_sees_root_and_modules(#[case] effective: bool) {
    let tmp = TempDir::new().unwrap();
    let root = sample_workspace(tmp.path());
    let ctx = ctx_with(tmp.path(), config(effective));

    let ws = load_workspace(&root.join("independent"), &ctx).unwrap();

    assert_eq!(
        artifact_ids(&ws),
        vec![
            "acme-independent",
            "acme-module1",
            "acme-module2",
            "acme-module3",
            "acme-module4",
            "acme-root",
        ]
    );
    assert_eq!(ws.current_project().artifact_id(), "acme-independent");
    assert_eq!(ws.root_dir(), canonical(&root));
    assert_eq!(ws.root_project().unwrap().artifact_id(), "acme-root");
    assert!(parent_ids(&ws, "acme-independent").is_empty());
}

#[rstest]
#[case::raw(false)]
#[case::effective(true)]
fn test_module_without_parent(#[case] effective: bool) {
    let tmp = TempDir::new().unwrap();
    let root = sample_workspace(tmp.path());
    let ctx = ctx_with(tmp.path(), config(effective));

    let ws = load_workspace(&root.join("module1"), &ctx).unwrap();

    assert_eq!(ws.len(), 5);
    assert_eq!(ws.current_project().artifact_id(), "acme-module1");
    assert!(parent_ids(&ws, "acme-module1").is_empty());
    assert!(!ws.contains(&ArtifactKey::ga(GROUP, "acme-independent")));
    assert!(!ws.contains(&ArtifactKey::ga(GROUP, "acme-non-module-child")));
}

#[test]
fn test_modules_link_root_parent() {
    let tmp = TempDir::new().unwrap();
    let root = sample_workspace(tmp.path());
    let ctx = ctx(tmp.path());

    let ws = load_workspace(&root, &ctx).unwrap();

    assert_eq!(ws.len(), 5);
    assert_eq!(parent_ids(&ws, "acme-module2"), vec!["acme-root"]);
    assert_eq!(parent_ids(&ws, "acme-module3"), vec!["acme-root"]);
    assert_eq!(ws.get_project(GROUP, "acme-module2").unwrap().version(), "1.0");

    let root_project = ws.root_project().unwrap();
    let modules: Vec<&str> = ws.modules(root_project).map(|p| p.artifact_id()).collect();
    assert_eq!(
        modules,
        vec!["acme-module1", "acme-module2", "acme-module3", "acme-module4"]
    );
}

#[test]
fn test_empty_relative_path_disables_local_parent() {
    let tmp = TempDir::new().unwrap();
    let root = sample_workspace(tmp.path());
    let ctx = ctx(tmp.path());

    let ws = load_workspace(&root.join("module4"), &ctx).unwrap();

    assert_eq!(ws.len(), 5);
    assert!(parent_ids(&ws, "acme-module4").is_empty());
    let module4 = ws.current_project();
    assert_eq!(module4.group_id(), GROUP);
    assert_eq!(module4.version(), "1.0");
}

#[rstest]
#[case::raw(false)]
#[case::effective(true)]
fn test_non_module_child_is_added_with_its_modules(#[case] effective: bool) {
    let tmp = TempDir::new().unwrap();
    let root = sample_workspace(tmp.path());
    let ctx = ctx_with(tmp.path(), config(effective));

    let ws = load_workspace(&root.join("non-module-child"), &ctx).unwrap();

    assert_eq!(ws.len(), 7);
    assert_eq!(parent_ids(&ws, "acme-non-module-child"), vec!["acme-root"]);
    assert_eq!(
        parent_ids(&ws, "acme-another-child"),
        vec!["acme-non-module-child", "acme-root"]
    );
    assert_eq!(
        ws.mode(),
        if effective { ModelMode::Effective } else { ModelMode::Raw }
    );
}

#[rstest]
#[case::raw(false)]
#[case::effective(true)]
fn test_parent_reached_through_relative_path_is_expanded(#[case] effective: bool) {
    let tmp = TempDir::new().unwrap();
    let root = sample_workspace(tmp.path());
    let ctx = ctx_with(tmp.path(), config(effective));

    let ws = load_workspace(&root.join("other/module3"), &ctx).unwrap();

    // `other/` has no descriptor, so the upward walk stops there; the root is
    // still reached through the relative path and expanded
    assert_eq!(ws.directory_breaks(), &[canonical(&root.join("other"))]);
    assert_eq!(
        artifact_ids(&ws),
        vec![
            "acme-module1",
            "acme-module2",
            "acme-module3",
            "acme-module4",
            "acme-root",
        ]
    );
    assert_eq!(parent_ids(&ws, "acme-module3"), vec!["acme-root"]);
    assert_eq!(parent_ids(&ws, "acme-module2"), vec!["acme-root"]);
    assert_eq!(ws.root_dir(), canonical(&root));
    assert_eq!(ws.current_project().artifact_id(), "acme-module3");
}

#[rstest]
#[case::module1("module1")]
#[case::module2("module2")]
#[case::module3("other/module3")]
#[case::module4("module4")]
fn test_any_module_yields_the_root_workspace(#[case] module: &str) {
    let tmp = TempDir::new().unwrap();
    let root = sample_workspace(tmp.path());
    let ctx = ctx(tmp.path());

    let from_root = load_workspace(&root, &ctx).unwrap();
    let from_module = load_workspace(&root.join(module), &ctx).unwrap();

    assert_eq!(artifact_ids(&from_module), artifact_ids(&from_root));
    assert_eq!(from_module.root_dir(), from_root.root_dir());
}

#[test]
fn test_module_shared_by_two_aggregators_is_loaded_once() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("ws");
    Pom::aggregator("acme-ws").module("common").module("bundle").write(&root);
    Pom::new("acme-common").write(&root.join("common"));
    Pom::aggregator("acme-bundle")
        .module("../common")
        .write(&root.join("bundle"));

    let ws = load_workspace(&root, &ctx(tmp.path())).unwrap();

    assert_eq!(artifact_ids(&ws), vec!["acme-bundle", "acme-common", "acme-ws"]);
    let common = ws.get_project(GROUP, "acme-common").unwrap();
    let bundle = ws.get_project(GROUP, "acme-bundle").unwrap();
    let root_project = ws.root_project().unwrap();
    let via_bundle: Vec<_> = ws.modules(bundle).map(|p| p.id()).collect();
    let via_root: Vec<_> = ws.modules(root_project).map(|p| p.id()).collect();
    assert_eq!(via_bundle, vec![common.id()]);
    assert!(via_root.contains(&common.id()));
    assert_eq!(
        ws.projects().filter(|p| p.dir() == common.dir()).count(),
        1
    );
}

#[test]
fn test_project_lookup_by_directory() {
    let tmp = TempDir::new().unwrap();
    let root = sample_workspace(tmp.path());
    let ctx = ctx(tmp.path());

    let ws = load_workspace(&root, &ctx).unwrap();

    let module2 = ws.project_at(&root.join("module2")).unwrap();
    assert_eq!(module2.artifact_id(), "acme-module2");
    assert_eq!(module2.pom_file(), canonical(&root.join("module2/pom.xml")));
    assert!(ws.project_at(&root.join("independent")).is_none());
}

// ============================================================================
// Entry points
// ============================================================================

#[test]
fn test_load_project_is_detached_when_version_is_literal() {
    let tmp = TempDir::new().unwrap();
    let root = sample_workspace(tmp.path());
    let ctx = ctx(tmp.path());

    let loaded = load_project(&root.join("module2"), &ctx).unwrap();

    assert!(!loaded.is_attached());
    assert!(loaded.workspace().is_none());
    let project = loaded.project();
    assert_eq!(project.artifact_id(), "acme-module2");
    assert_eq!(project.version(), "1.0");
    assert!(project.local_parent_id().is_none());
}

#[test]
fn test_load_project_from_output_directory() {
    let tmp = TempDir::new().unwrap();
    let root = sample_workspace(tmp.path());
    let classes = root.join("module2/target/classes");
    fs::create_dir_all(&classes).unwrap();
    let ctx = ctx(tmp.path());

    let loaded = load_project(&classes, &ctx).unwrap();

    assert_eq!(loaded.project().artifact_id(), "acme-module2");
}

#[test]
fn test_load_project_from_descriptor_file() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("custom");
    let pom = Pom::new("acme-custom").write_as(&dir, "custom-pom.xml");
    let ctx = ctx(tmp.path());

    let loaded = load_project(&pom, &ctx).unwrap();

    assert_eq!(loaded.project().artifact_id(), "acme-custom");
    assert_eq!(loaded.project().pom_file(), canonical(&pom));
}

#[test]
fn test_relative_start_path_uses_context_cwd() {
    let tmp = TempDir::new().unwrap();
    let root = sample_workspace(tmp.path());
    let ctx = ctx(&root);

    let ws = load_workspace(std::path::Path::new("module2"), &ctx).unwrap();

    assert_eq!(ws.current_project().artifact_id(), "acme-module2");
}

#[test]
fn test_current_workspace_uses_configured_project() {
    let tmp = TempDir::new().unwrap();
    let root = sample_workspace(tmp.path());
    let ctx = ctx_with(
        tmp.path(),
        WorkspaceConfig::default().with_current_project(root.join("module2")),
    );

    let ws = current_workspace(&ctx).unwrap();

    assert_eq!(ws.current_project().artifact_id(), "acme-module2");
    assert_eq!(ws.len(), 5);
}

#[test]
fn test_missing_descriptor() {
    let tmp = TempDir::new().unwrap();
    let ctx = ctx(tmp.path());

    let err = load_workspace(tmp.path(), &ctx).unwrap_err();

    assert!(matches!(err, WorkspaceError::DescriptorNotFound { .. }));
}

#[test]
fn test_workspace_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<LocalWorkspace>();

    let tmp = TempDir::new().unwrap();
    let root = sample_workspace(tmp.path());
    let ws = Arc::new(load_workspace(&root, &ctx(tmp.path())).unwrap());

    let handle = {
        let ws = Arc::clone(&ws);
        std::thread::spawn(move || ws.len())
    };
    assert_eq!(handle.join().unwrap(), ws.len());
}

#[test]
fn test_load_workspaces_in_parallel() {
    let tmp = TempDir::new().unwrap();
    let first = tmp.path().join("first");
    let second = tmp.path().join("second");
    Pom::aggregator("acme-first").module("a").write(&first);
    Pom::child_of("acme-first-a", "acme-first", "1.0").write(&first.join("a"));
    Pom::new("acme-second").write(&second);
    let missing = tmp.path().join("missing");
    fs::create_dir_all(&missing).unwrap();
    let ctx = ctx(tmp.path());

    let results = load_workspaces(&[first, second, missing], &ctx);

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().len(), 2);
    assert_eq!(
        results[1].as_ref().unwrap().current_project().artifact_id(),
        "acme-second"
    );
    assert!(results[2].is_err());
}

// ============================================================================
// Roots and directory breaks
// ============================================================================

#[test]
fn test_root_override_beats_directory_break() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("repo");
    Pom::aggregator("acme-repo")
        .module("libs/core")
        .module("tools")
        .write(&root);
    Pom::new("acme-core").write(&root.join("libs/core"));
    Pom::child_of("acme-tools", "acme-repo", "1.0").write(&root.join("tools"));

    let start = root.join("libs/core");

    let plain = load_workspace(&start, &ctx(tmp.path())).unwrap();
    assert_eq!(artifact_ids(&plain), vec!["acme-core"]);
    assert_eq!(plain.root_dir(), canonical(&start));

    let ctx = ctx_with(
        tmp.path(),
        WorkspaceConfig::default().with_root_project_dir(&root),
    );
    let ws = load_workspace(&start, &ctx).unwrap();

    assert_eq!(ws.root_dir(), canonical(&root));
    assert_eq!(artifact_ids(&ws), vec!["acme-core", "acme-repo", "acme-tools"]);
    assert_eq!(ws.directory_breaks(), &[canonical(&root.join("libs"))]);
    assert_eq!(ws.current_project().artifact_id(), "acme-core");
}

#[test]
fn test_top_level_basedir_adds_non_parent_aggregator() {
    let tmp = TempDir::new().unwrap();
    let aggregator = tmp.path().join("aggregator");
    Pom::aggregator("acme-aggregator")
        .module("../app")
        .module("../lib")
        .write(&aggregator);
    Pom::new("acme-app").write(&tmp.path().join("app"));
    Pom::new("acme-lib").write(&tmp.path().join("lib"));

    let overrides = MapOverrides::new().with(TOP_LEVEL_BASEDIR, aggregator.display().to_string());
    let ctx = ctx(tmp.path()).with_overrides(Arc::new(overrides));

    let ws = load_workspace(&tmp.path().join("app"), &ctx).unwrap();

    assert_eq!(ws.root_dir(), canonical(&aggregator));
    assert_eq!(ws.current_project().artifact_id(), "acme-app");
    assert_eq!(
        artifact_ids(&ws),
        vec!["acme-aggregator", "acme-app", "acme-lib"]
    );
    assert!(parent_ids(&ws, "acme-app").is_empty());
}

// ============================================================================
// Failures and recovery
// ============================================================================

fn broken_module_workspace(tmp: &TempDir) -> std::path::PathBuf {
    let root = tmp.path().join("ws");
    Pom::aggregator("acme-ws")
        .module("good")
        .module("broken")
        .write(&root);
    Pom::child_of("acme-good", "acme-ws", "1.0").write(&root.join("good"));
    fs::create_dir_all(root.join("broken")).unwrap();
    fs::write(root.join("broken/pom.xml"), "<project><artifactId>oops</project>").unwrap();
    root
}

#[test]
fn test_broken_module_fails_discovery() {
    let tmp = TempDir::new().unwrap();
    let root = broken_module_workspace(&tmp);

    let err = load_workspace(&root, &ctx(tmp.path())).unwrap_err();

    assert!(matches!(err, WorkspaceError::DescriptorParse { .. }));
}

#[test]
fn test_broken_module_becomes_warning() {
    let tmp = TempDir::new().unwrap();
    let root = broken_module_workspace(&tmp);
    let ctx = ctx_with(
        tmp.path(),
        WorkspaceConfig::default().with_warn_on_failed_workspace_modules(true),
    );

    let ws = load_workspace(&root, &ctx).unwrap();

    assert_eq!(artifact_ids(&ws), vec!["acme-good", "acme-ws"]);
    assert_eq!(ws.warnings().len(), 1);
    assert!(ws.warnings()[0].contains("broken"));
}

#[test]
fn test_missing_module_directory_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("ws");
    Pom::aggregator("acme-ws")
        .module("a")
        .module("gone")
        .module("b")
        .write(&root);
    Pom::child_of("acme-a", "acme-ws", "1.0").write(&root.join("a"));
    Pom::child_of("acme-b", "acme-ws", "1.0").write(&root.join("b"));

    let ws = load_workspace(&root, &ctx(tmp.path())).unwrap();

    assert_eq!(ws.len(), 3);
    assert_eq!(artifact_ids(&ws), vec!["acme-a", "acme-b", "acme-ws"]);
    assert!(ws.warnings().is_empty());
}

#[test]
fn test_module_cycle() {
    let tmp = TempDir::new().unwrap();
    Pom::aggregator("acme-a").module("../b").write(&tmp.path().join("a"));
    Pom::aggregator("acme-b").module("../a").write(&tmp.path().join("b"));

    let err = load_workspace(&tmp.path().join("a"), &ctx(tmp.path())).unwrap_err();

    match err {
        WorkspaceError::CyclicModule { cycle } => {
            assert_eq!(cycle.first(), cycle.last());
            assert_eq!(cycle.len(), 3);
        }
        other => panic!("expected a module cycle, got {other:?}"),
    }
}

#[test]
fn test_duplicate_key_keeps_current_project() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("ws");
    Pom::aggregator("acme-ws").module("a").module("b").write(&root);
    Pom::new("acme-dup").write(&root.join("a"));
    Pom::new("acme-dup").write(&root.join("b"));
    let ctx = ctx(tmp.path());

    let from_b = load_workspace(&root.join("b"), &ctx).unwrap();
    let dup = from_b.get_project(GROUP, "acme-dup").unwrap();
    assert_eq!(dup.dir(), canonical(&root.join("b")));
    assert!(from_b.project_at(&root.join("a")).is_none());
    assert_eq!(from_b.len(), 2);

    let from_root = load_workspace(&root, &ctx).unwrap();
    let dup = from_root.get_project(GROUP, "acme-dup").unwrap();
    assert_eq!(dup.dir(), canonical(&root.join("a")));
}

#[test]
fn test_parent_with_duplicate_key_is_not_linked() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("ws");
    Pom::aggregator("acme-ws").module("a").module("b-child").write(&root);
    Pom::aggregator("acme-dup").write(&root.join("a"));
    Pom::aggregator("acme-dup").write(&root.join("b"));
    Pom::new("acme-b-child")
        .parent("acme-dup", "1.0", Some("../b/pom.xml"))
        .write(&root.join("b-child"));

    let ws = load_workspace(&root, &ctx(tmp.path())).unwrap();

    let child = ws.get_project(GROUP, "acme-b-child").unwrap();
    assert!(ws.local_parent(child).is_none());
    assert_eq!(
        ws.get_project(GROUP, "acme-dup").unwrap().dir(),
        canonical(&root.join("a"))
    );
    assert!(ws.project_at(&root.join("b")).is_none());
    assert_eq!(ws.len(), 3);
}

#[test]
fn test_missing_group_without_parent() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("orphan");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("pom.xml"),
        "<project><artifactId>orphan</artifactId><version>1</version></project>",
    )
    .unwrap();

    let err = load_workspace(&dir, &ctx(tmp.path())).unwrap_err();

    assert!(matches!(err, WorkspaceError::DescriptorParse { .. }));
}

// ============================================================================
// Alternate descriptors
// ============================================================================

#[test]
fn test_alternate_descriptor_name() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("ws");
    Pom::aggregator("acme-ws").module("app").write(&root);
    Pom::child_of("acme-app", "acme-ws", "1.0").write_as(&root.join("app"), "pom-alt.xml");
    let ctx = ctx_with(
        tmp.path(),
        WorkspaceConfig::default().with_alternate_descriptor("pom-alt.xml"),
    );

    let ws = load_workspace(&root.join("app"), &ctx).unwrap();

    assert_eq!(ws.len(), 2);
    assert_eq!(
        ws.current_project().pom_file(),
        canonical(&root.join("app/pom-alt.xml"))
    );
    assert_eq!(parent_ids(&ws, "acme-app"), vec!["acme-ws"]);
}

#[test]
fn test_ambiguous_alternate_descriptors() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("app");
    Pom::new("acme-one").write_as(&dir, "pom-one.xml");
    Pom::new("acme-two").write_as(&dir, "pom-two.xml");
    let ctx = ctx_with(
        tmp.path(),
        WorkspaceConfig::default()
            .with_alternate_descriptor("pom-one.xml")
            .with_alternate_descriptor("pom-two.xml"),
    );

    let err = load_workspace(&dir, &ctx).unwrap_err();

    match err {
        WorkspaceError::AmbiguousDescriptor { candidates, .. } => assert_eq!(candidates.len(), 2),
        other => panic!("expected an ambiguous descriptor, got {other:?}"),
    }
}

// ============================================================================
// Profiles
// ============================================================================

#[rstest]
#[case::raw(false)]
#[case::effective(true)]
fn test_property_activated_profile_adds_module(#[case] effective: bool) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("ws");
    Pom::aggregator("acme-ws")
        .module("core")
        .extra(
            "  <profiles>\n    <profile>\n      <id>extra</id>\n      <activation><property><name>withExtra</name></property></activation>\n      <modules><module>extra</module></modules>\n    </profile>\n  </profiles>\n",
        )
        .write(&root);
    Pom::child_of("acme-core", "acme-ws", "1.0").write(&root.join("core"));
    Pom::child_of("acme-extra", "acme-ws", "1.0").write(&root.join("extra"));

    let without = load_workspace(&root, &ctx_with(tmp.path(), config(effective))).unwrap();
    assert_eq!(artifact_ids(&without), vec!["acme-core", "acme-ws"]);

    let ctx = ctx_with(tmp.path(), config(effective))
        .with_overrides(Arc::new(MapOverrides::new().with("withExtra", "true")));
    let with = load_workspace(&root, &ctx).unwrap();
    assert_eq!(artifact_ids(&with), vec!["acme-core", "acme-extra", "acme-ws"]);
}

#[rstest]
#[case::raw(false)]
#[case::effective(true)]
fn test_default_profile_adds_module(#[case] effective: bool) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("ws");
    Pom::aggregator("acme-ws")
        .extra(
            "  <profiles>\n    <profile>\n      <id>all</id>\n      <activation><activeByDefault>true</activeByDefault></activation>\n      <modules><module>tools</module></modules>\n    </profile>\n  </profiles>\n",
        )
        .write(&root);
    Pom::child_of("acme-tools", "acme-ws", "1.0").write(&root.join("tools"));

    let ws = load_workspace(&root, &ctx_with(tmp.path(), config(effective))).unwrap();

    assert_eq!(artifact_ids(&ws), vec!["acme-tools", "acme-ws"]);
    assert_eq!(parent_ids(&ws, "acme-tools"), vec!["acme-ws"]);
}

#[test]
fn test_profile_requested_by_id() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("ws");
    Pom::aggregator("acme-ws")
        .extra(
            "  <profiles>\n    <profile>\n      <id>docs</id>\n      <modules><module>docs</module></modules>\n    </profile>\n  </profiles>\n",
        )
        .write(&root);
    Pom::child_of("acme-docs", "acme-ws", "1.0").write(&root.join("docs"));

    let ctx = ctx_with(tmp.path(), WorkspaceConfig::default().with_active_profile("docs"));
    let ws = load_workspace(&root, &ctx).unwrap();

    assert_eq!(artifact_ids(&ws), vec!["acme-docs", "acme-ws"]);
}
