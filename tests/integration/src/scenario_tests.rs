//! End-to-end reconciliation scenarios with process-backed collaborators.
//!
//! The canonicalizer is a shell script answering from dump files, so these
//! tests only run on unix hosts.

#![cfg(unix)]

use keycheck_core::{CheckEngine, CommandSpec, FileStatus, KeyStatus, KeycheckConfig};
use keycheck_test_utils::SourceTree;
use pretty_assertions::assert_eq;

fn config_with(tree: &SourceTree, dumps: &[(&str, &str)], diff: CommandSpec) -> KeycheckConfig {
    let script = tree.install_canonicalizer_script(dumps);
    KeycheckConfig {
        canonicalizer: CommandSpec::new(script.display().to_string(), &[]),
        diff,
        ..KeycheckConfig::default()
    }
}

fn builtin() -> CommandSpec {
    CommandSpec::new("builtin", &[])
}

fn status_of(tree: &SourceTree, config: KeycheckConfig, file: &str) -> KeyStatus {
    let check = CheckEngine::from_config(config)
        .unwrap()
        .check_file(&tree.path(file))
        .unwrap();
    assert_eq!(check.keys(), 1);
    check.report.records()[0].status
}

#[test]
fn scenario_alpha_unchanged() {
    let tree = SourceTree::new();
    tree.file("alpha.cfg", "[ALPHA]\nfield1=10\n\\\n");
    let config = config_with(&tree, &[("ALPHA", "[ALPHA]\nfield1=10\n\\\n")], builtin());

    assert_eq!(status_of(&tree, config, "alpha.cfg"), KeyStatus::Unchanged);
}

#[test]
fn scenario_beta_updated() {
    let tree = SourceTree::new();
    tree.file("beta.cfg", "[BETA]\nfield1=10\n\\\n");
    let config = config_with(&tree, &[("BETA", "[BETA]\nfield1=20\n\\\n")], builtin());

    assert_eq!(status_of(&tree, config, "beta.cfg"), KeyStatus::Updated);
}

#[test]
fn scenario_gamma_empty_key_unknown_to_canonicalizer() {
    let tree = SourceTree::new();
    tree.file("gamma.cfg", "[GAMMA]\n\\\n");
    let config = config_with(&tree, &[], builtin());

    assert_eq!(status_of(&tree, config, "gamma.cfg"), KeyStatus::Unchanged);
}

#[test]
fn scenario_delta_content_unknown_to_canonicalizer() {
    let tree = SourceTree::new();
    tree.file("delta.cfg", "[DELTA]\nfield1=1\n\\\n");
    let config = config_with(&tree, &[], builtin());

    assert_eq!(status_of(&tree, config, "delta.cfg"), KeyStatus::Error);
}

#[test]
fn scenario_epsilon_key_in_two_files() {
    let tree = SourceTree::new();
    tree.file("one.cfg", "[EPSILON]\nv=1\n\\\n");
    tree.file("two.cfg", "[EPSILON]\nv=1\n\\\n[OTHER]\n\\\n");
    let config = config_with(&tree, &[("EPSILON", "[EPSILON]\nv=1\n\\\n")], builtin());

    let run = CheckEngine::from_config(config)
        .unwrap()
        .check_path(tree.root())
        .unwrap();
    let rows = run.report.finalize();

    let epsilon: Vec<_> = rows.iter().filter(|r| r.key == "EPSILON").collect();
    assert_eq!(epsilon.len(), 2);
    for row in epsilon {
        assert_eq!(row.key_occurrence_count, 2);
        assert_eq!(row.sibling_files_for_key, "one.cfg,two.cfg");
        assert_eq!(row.file_aggregate_status, FileStatus::Unchanged);
    }
}

#[test]
fn scenario_compiled_source_named_key() {
    let tree = SourceTree::new();
    tree.file("tables/site_ROUTING_MAIN_TBL.cpl", "\\host=\nalpha\n");
    let config = config_with(
        &tree,
        &[("ROUTING.MAIN.TBL", "[ROUTING.MAIN.TBL]\n\\host=alpha\n\\\n")],
        builtin(),
    );

    let run = CheckEngine::from_config(config)
        .unwrap()
        .check_path(tree.root())
        .unwrap();
    let records = run.report.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].key, "ROUTING.MAIN.TBL");
    assert_eq!(records[0].status, KeyStatus::Unchanged);
}

#[test]
fn scenario_compiled_source_name_mismatch() {
    let tree = SourceTree::new();
    tree.file("readme_table.cpl", "x=1\n");
    let config = config_with(&tree, &[], builtin());

    let run = CheckEngine::from_config(config)
        .unwrap()
        .check_path(tree.root())
        .unwrap();
    assert_eq!(run.sources.len(), 1);
    assert!(run.report.finalize().is_empty());
}

#[test]
fn scenario_external_diff_tool() {
    if which::which("diff").is_err() {
        eprintln!("diff not installed, skipping");
        return;
    }

    let tree = SourceTree::new();
    tree.file("a.cfg", "[ALPHA]\nx=1\n\\\n[BETA]\nx=1\n\\\n");
    let config = config_with(
        &tree,
        &[("ALPHA", "[ALPHA]\nx=1\n\\\n"), ("BETA", "[BETA]\nx=2\n\\\n")],
        CommandSpec::new("diff", &["-u"]),
    );

    let check = CheckEngine::from_config(config)
        .unwrap()
        .check_file(&tree.path("a.cfg"))
        .unwrap();
    let statuses: Vec<KeyStatus> = check.report.records().iter().map(|r| r.status).collect();
    assert_eq!(statuses, vec![KeyStatus::Unchanged, KeyStatus::Updated]);
    assert!(check.report.records()[1].detail.as_deref().unwrap().contains("+x=2"));
}

#[test]
fn scenario_diff_tool_writing_to_stderr_is_fatal() {
    let tree = SourceTree::new();
    tree.file("a.cfg", "[ALPHA]\nx=1\n\\\n");
    // `sh -c '...' left right` prints to stderr only
    let config = config_with(
        &tree,
        &[("ALPHA", "[ALPHA]\nx=1\n\\\n")],
        CommandSpec::new("sh", &["-c", "echo broken >&2"]),
    );

    let err = CheckEngine::from_config(config)
        .unwrap()
        .check_file(&tree.path("a.cfg"))
        .unwrap_err();
    assert!(matches!(err, keycheck_core::Error::DiffToolInternalFailure { ref stderr, .. } if stderr == "broken"));
}
