//! Tests for run orchestration over files and directories

use std::path::Path;

use keycheck_blocks::Dialect;
use keycheck_core::collaborator::TextDiffTool;
use keycheck_core::report::render_csv;
use keycheck_core::{
    CheckEngine, DuplicatePolicy, Error, FileStatus, KeyStatus, KeycheckConfig, Preprocessor,
};
use keycheck_test_utils::{FailingDiffTool, FakeCanonicalizer, SourceTree};
use pretty_assertions::assert_eq;

fn engine(config: KeycheckConfig, canon: FakeCanonicalizer) -> CheckEngine {
    CheckEngine::with_collaborators(config, Box::new(canon), Box::new(TextDiffTool))
}

fn statuses(run: &keycheck_core::CheckRun) -> Vec<(String, KeyStatus)> {
    run.report
        .records()
        .iter()
        .map(|r| (r.key.clone(), r.status))
        .collect()
}

fn site_tree() -> SourceTree {
    let tree = SourceTree::new();
    tree.file(
        "site/a.cfg",
        "# site a\n[ALPHA]\n\\x=1\n\\\n\n[BETA]\n\\x=1\n\\\n",
    );
    tree.file("site/b.cfg", "[EPSILON]\n\\e=5\n\\\n[GAMMA]\n\\\n");
    tree.file("other/site_ROUTING_MAIN_TBL.cpl", "\\host=alpha\n");
    tree.file("other/notes.txt", "[IGNORED]\n\\\n");
    tree
}

fn site_canonicalizer() -> FakeCanonicalizer {
    FakeCanonicalizer::new()
        .with_dump("ALPHA", "[ALPHA]\n\\x=1\n\\\n")
        .with_dump("BETA", "[BETA]\n\\x=2\n\\\n")
        .with_dump("EPSILON", "[EPSILON]\n\\e=5\n\\\n")
        .with_dump("ROUTING.MAIN.TBL", "[ROUTING.MAIN.TBL]\n\\host=alpha\n\\\n")
}

#[test]
fn test_directory_run_in_sorted_file_order() {
    let tree = site_tree();
    let run = engine(KeycheckConfig::default(), site_canonicalizer())
        .check_path(tree.root())
        .unwrap();

    assert_eq!(
        statuses(&run),
        vec![
            ("ROUTING.MAIN.TBL".to_string(), KeyStatus::Unchanged),
            ("ALPHA".to_string(), KeyStatus::Unchanged),
            ("BETA".to_string(), KeyStatus::Updated),
            ("EPSILON".to_string(), KeyStatus::Unchanged),
            ("GAMMA".to_string(), KeyStatus::Unchanged),
        ]
    );

    let dialects: Vec<Dialect> = run.sources.iter().map(|s| s.dialect).collect();
    assert_eq!(dialects, vec![Dialect::Compiled, Dialect::KeyBlock, Dialect::KeyBlock]);
}

#[test]
fn test_records_carry_directory_and_file_name() {
    let tree = site_tree();
    let run = engine(KeycheckConfig::default(), site_canonicalizer())
        .check_path(tree.root())
        .unwrap();

    let beta = run.report.records_for_key("BETA")[0];
    assert_eq!(beta.file, "a.cfg");
    assert_eq!(Path::new(&beta.path), tree.path("site"));
    assert!(beta.detail.as_deref().unwrap_or_default().contains("+\\x=2"));
}

#[test]
fn test_single_file_status() {
    let tree = site_tree();
    let engine = engine(KeycheckConfig::default(), site_canonicalizer());

    let a = engine.check_file(&tree.path("site/a.cfg")).unwrap();
    assert_eq!(a.keys(), 2);
    assert_eq!(a.status(), FileStatus::Updated);

    let b = engine.check_file(&tree.path("site/b.cfg")).unwrap();
    assert_eq!(b.status(), FileStatus::Unchanged);
}

#[test]
fn test_parallel_run_keeps_extraction_order() {
    let tree = SourceTree::new();
    let mut source = String::new();
    let mut canon = FakeCanonicalizer::new();
    for i in 0..12 {
        source.push_str(&format!("[K{i}]\n\\v={i}\n\\\n"));
        let dumped = if i % 3 == 0 { i + 100 } else { i };
        canon = canon.with_dump(&format!("K{i}"), &format!("[K{i}]\n\\v={dumped}\n\\\n"));
    }
    let path = tree.file("many.cfg", &source);

    let mut config = KeycheckConfig::default();
    config.run.jobs = 4;
    let check = engine(config, canon).check_file(&path).unwrap();

    let got: Vec<(String, KeyStatus)> = check
        .report
        .records()
        .iter()
        .map(|r| (r.key.clone(), r.status))
        .collect();
    let expected: Vec<(String, KeyStatus)> = (0..12)
        .map(|i| {
            let status = if i % 3 == 0 { KeyStatus::Updated } else { KeyStatus::Unchanged };
            (format!("K{i}"), status)
        })
        .collect();
    assert_eq!(got, expected);
}

#[test]
fn test_diff_failure_aborts_run() {
    let tree = site_tree();
    let engine = CheckEngine::with_collaborators(
        KeycheckConfig::default(),
        Box::new(site_canonicalizer()),
        Box::new(FailingDiffTool),
    );

    let err = engine.check_path(tree.root()).unwrap_err();
    assert!(matches!(err, Error::DiffToolInternalFailure { .. }));
}

#[test]
fn test_diff_failure_aborts_parallel_run() {
    let tree = site_tree();
    let mut config = KeycheckConfig::default();
    config.run.jobs = 3;
    let engine = CheckEngine::with_collaborators(
        config,
        Box::new(site_canonicalizer()),
        Box::new(FailingDiffTool),
    );

    let err = engine.check_file(&tree.path("site/a.cfg")).unwrap_err();
    assert!(err.to_string().contains("memory exhausted"));
}

#[test]
fn test_duplicate_keys_kept_by_default() {
    let tree = SourceTree::new();
    let path = tree.file("dup.cfg", "[A]\n\\x=1\n\\\n[A]\n\\x=2\n\\\n");
    let canon = FakeCanonicalizer::new().with_dump("A", "[A]\n\\x=1\n\\\n");

    let check = engine(KeycheckConfig::default(), canon).check_file(&path).unwrap();
    let got: Vec<KeyStatus> = check.report.records().iter().map(|r| r.status).collect();
    assert_eq!(got, vec![KeyStatus::Unchanged, KeyStatus::Updated]);
}

#[test]
fn test_duplicate_keys_rejected_on_request() {
    let tree = SourceTree::new();
    let path = tree.file("dup.cfg", "[A]\n\\\n[A]\n\\\n");
    let mut config = KeycheckConfig::default();
    config.run.duplicate_keys = DuplicatePolicy::Reject;

    let err = engine(config, FakeCanonicalizer::new())
        .check_file(&path)
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateKey { ref key, .. } if key == "A"));
}

#[test]
fn test_zero_key_source_gives_empty_report() {
    let tree = SourceTree::new();
    tree.file("empty.cfg", "# nothing configured yet\n\n");
    tree.file("misc.cpl", "a=1\n");

    let run = engine(KeycheckConfig::default(), FakeCanonicalizer::new())
        .check_path(tree.root())
        .unwrap();

    assert_eq!(run.sources.len(), 2);
    assert!(run.sources.iter().all(|s| s.keys == 0));
    assert!(run.report.is_empty());
    assert_eq!(
        render_csv(&run.report.finalize()).unwrap().lines().count(),
        1
    );
}

#[test]
fn test_missing_path_is_source_unavailable() {
    let tree = SourceTree::new();
    let err = engine(KeycheckConfig::default(), FakeCanonicalizer::new())
        .check_path(&tree.path("missing"))
        .unwrap_err();
    assert!(matches!(err, Error::SourceUnavailable { .. }));
}

#[test]
fn test_unknown_extension_rejected_in_single_file_mode() {
    let tree = SourceTree::new();
    let path = tree.file("notes.txt", "[A]\n\\\n");
    let err = engine(KeycheckConfig::default(), FakeCanonicalizer::new())
        .check_path(&path)
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedSource { .. }));
}

struct Expand;

impl Preprocessor for Expand {
    fn describe(&self) -> String {
        "expand".to_string()
    }

    fn preprocess(&self, _path: &Path) -> keycheck_core::Result<Vec<String>> {
        Ok(vec!["\\host=alpha".to_string(), "\\port=80".to_string()])
    }
}

#[test]
fn test_preprocessor_feeds_compiled_sources() {
    let tree = SourceTree::new();
    let path = tree.file("ROUTE_TBL.cpl", "\u{0}\u{1}binary");
    let canon = FakeCanonicalizer::new().with_dump("ROUTE.TBL", "[ROUTE.TBL]\n\\host=alpha\n\\port=80\n\\\n");

    let check = engine(KeycheckConfig::default(), canon)
        .with_preprocessor(Box::new(Expand))
        .check_file(&path)
        .unwrap();

    assert_eq!(check.dialect, Dialect::Compiled);
    assert_eq!(check.report.records()[0].key, "ROUTE.TBL");
    assert_eq!(check.report.records()[0].status, KeyStatus::Unchanged);
}

#[test]
fn test_preprocessor_not_used_for_key_block_sources() {
    let tree = SourceTree::new();
    let path = tree.file("a.cfg", "[ALPHA]\n\\x=1\n\\\n");
    let canon = FakeCanonicalizer::new().with_dump("ALPHA", "[ALPHA]\n\\x=1\n\\\n");

    let check = engine(KeycheckConfig::default(), canon)
        .with_preprocessor(Box::new(Expand))
        .check_file(&path)
        .unwrap();
    assert_eq!(check.status(), FileStatus::Unchanged);
}
