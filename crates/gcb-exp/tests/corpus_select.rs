use std::fs;
use std::num::NonZeroU32;
use std::path::Path;

use gcb_core::errors::HarnessError;
use gcb_exp::{select, CorpusSelector, InstanceKey};

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, "p edge 2 1\ne 1 2\n").expect("write instance");
}

fn bucketed_corpus(root: &Path) {
    for size in [25, 50, 250, 500] {
        for trial in [1, 2, 10] {
            touch(&root.join(format!("random/{size}/{trial}.col")));
        }
        touch(&root.join(format!("random/{size}/notes.txt")));
    }
    touch(&root.join("random/500/best.col"));
    fs::create_dir_all(root.join("random/unsorted")).expect("mkdir");
}

fn keys(instances: &[gcb_exp::GraphInstance]) -> Vec<String> {
    instances.iter().map(|inst| inst.key.to_string()).collect()
}

#[test]
fn size_filter_selects_single_bucket() {
    let dir = tempfile::tempdir().expect("tmp dir");
    bucketed_corpus(dir.path());
    let selector = CorpusSelector::new("random", NonZeroU32::new(500));
    let instances = select(dir.path(), &selector).expect("select");
    assert_eq!(keys(&instances), vec!["500/1", "500/2", "500/10"]);
    assert_eq!(
        instances[2].path,
        dir.path().join("random").join("500").join("10.col")
    );
}

#[test]
fn buckets_are_ordered_numerically() {
    let dir = tempfile::tempdir().expect("tmp dir");
    bucketed_corpus(dir.path());
    let instances = select(dir.path(), &CorpusSelector::new("random", None)).expect("select");
    let sizes: Vec<u32> = instances
        .iter()
        .filter_map(|inst| inst.key.size())
        .map(NonZeroU32::get)
        .collect();
    assert_eq!(sizes.len(), 12);
    assert!(sizes.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(&keys(&instances)[..3], &["25/1", "25/2", "25/10"]);
}

#[test]
fn flat_folders_are_ordered_by_name() {
    let dir = tempfile::tempdir().expect("tmp dir");
    touch(&dir.path().join("reg/queen8_8.col"));
    touch(&dir.path().join("reg/fpsol2.col"));
    touch(&dir.path().join("reg/README.md"));
    let instances = select(dir.path(), &CorpusSelector::new("reg", None)).expect("select");
    assert_eq!(keys(&instances), vec!["fpsol2.col", "queen8_8.col"]);
    assert!(instances
        .iter()
        .all(|inst| matches!(inst.key, InstanceKey::Named { .. })));

    let filtered = select(dir.path(), &CorpusSelector::new("reg", NonZeroU32::new(25)))
        .expect("select");
    assert!(filtered.is_empty());
}

#[test]
fn missing_bucket_is_an_empty_selection() {
    let dir = tempfile::tempdir().expect("tmp dir");
    bucketed_corpus(dir.path());
    let selector = CorpusSelector::new("random", NonZeroU32::new(1000));
    assert!(select(dir.path(), &selector).expect("select").is_empty());
}

#[test]
fn missing_folder_is_an_error() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let err = select(dir.path(), &CorpusSelector::new("random", None)).expect_err("missing");
    assert!(matches!(err, HarnessError::Io(_)));
    assert_eq!(err.info().code, "corpus-folder-missing");
}

#[test]
fn zero_padded_names_do_not_alias_canonical_buckets() {
    let dir = tempfile::tempdir().expect("tmp dir");
    bucketed_corpus(dir.path());
    touch(&dir.path().join("random/0500/1.col"));
    touch(&dir.path().join("random/500/01.col"));

    let selector = CorpusSelector::new("random", NonZeroU32::new(500));
    let instances = select(dir.path(), &selector).expect("select");
    assert_eq!(keys(&instances), vec!["500/1", "500/2", "500/10"]);
    assert!(instances
        .iter()
        .all(|inst| inst.path.starts_with(dir.path().join("random").join("500"))));
    let paths: Vec<_> = instances.iter().map(|inst| &inst.path).collect();
    assert!(!paths.contains(&&dir.path().join("random/500/01.col")));
}
