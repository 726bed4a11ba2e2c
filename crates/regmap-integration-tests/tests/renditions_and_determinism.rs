//! # Renditions and Determinism
//!
//! Two renditions of one regulation (different line breaking, page-number
//! debris, header punctuation) must build to structurally equal artifacts,
//! and repeated builds of the same input must be byte-identical.

use std::path::Path;

use regmap_cli::build::{run_build, BuildArgs};
use regmap_cli::verify::{run_verify, VerifyArgs};
use regmap_cli::RegmapConfig;
use regmap_ingest::{ChapterMarkers, Ingestor};
use regmap_pack::{
    build, build_mappings, compare_outputs, read_manifest, read_outputs, BuildRequest,
    FeatureConfigSet, MAPPINGS_FILE, PARAGRAPHS_FILE,
};

const CLEAN: &str = "\
פרק 3 - רישוי כללי
3.1 בעל העסק יציג את רישיון העסק בכניסה
3.2 יש להתקין גלאי עשן בכל חלל
פרק 4 - משרד הבריאות
4.1 עסק ששטחו מעל 100 מ\"ר יתקין כיור נוסף
";

const MESSY: &str = "\
'פרק3 – רישוי כללי'
3.1 בעל העסק יציג את רישיון העסק
בכניסה
7
3.2 יש להתקין גלאי   עשן בכל חלל
פרק 4 – משרד הבריאות
4.1 עסק ששטחו מעל 100 מ\"ר
יתקין כיור נוסף
8
";

const FEATURES: &str = "\
signage:
  keywords: [רישיון]
detectors:
  search_all_categories: true
  keywords: [גלאי]
sinks:
  category: משרד הבריאות
  keywords: [כיור]
";

fn seed(dir: &Path) {
    std::fs::write(dir.join("clean.txt"), CLEAN).unwrap();
    std::fs::write(dir.join("messy.md"), MESSY).unwrap();
    std::fs::write(dir.join("features.yaml"), FEATURES).unwrap();
}

fn request(dir: &Path, out: &str) -> BuildRequest {
    BuildRequest {
        input: dir.join("clean.txt"),
        features: dir.join("features.yaml"),
        out_dir: dir.join(out),
        verify_other: None,
        markers: ChapterMarkers::default(),
    }
}

#[test]
fn messy_rendition_parses_to_the_same_structure() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let configs = FeatureConfigSet::load(&dir.path().join("features.yaml")).unwrap();
    let ingestor = Ingestor::new(&ChapterMarkers::default()).unwrap();

    let a = ingestor.ingest_file(&dir.path().join("clean.txt")).unwrap();
    let b = ingestor.ingest_file(&dir.path().join("messy.md")).unwrap();
    let map_a = build_mappings(&a.tree, &configs);
    let map_b = build_mappings(&b.tree, &configs);

    let report = compare_outputs(&a.tree, &map_a, &b.tree, &map_b);
    assert!(report.equal, "{report}");
    assert_eq!(
        b.tree.paragraph_text("רישוי כללי", "3.1"),
        "3.1 בעל העסק יציג את רישיון העסק בכניסה"
    );
}

#[test]
fn verified_build_through_the_cli() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let args = BuildArgs {
        input: dir.path().join("clean.txt"),
        features: Some(dir.path().join("features.yaml")),
        out: Some(dir.path().join("out")),
        verify_with: Some(dir.path().join("messy.md")),
        markers: Vec::new(),
        chapter_label: None,
    };
    assert_eq!(run_build(&args, &RegmapConfig::default()).unwrap(), 0);

    let manifest = read_manifest(&dir.path().join("out")).unwrap();
    assert_eq!(manifest.verified_against.as_deref(), Some("messy.md"));
    assert_eq!(manifest.backend, "utf-8");
}

#[test]
fn separately_built_renditions_verify_equal() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    build(&request(dir.path(), "a")).unwrap();
    let mut other = request(dir.path(), "b");
    other.input = dir.path().join("messy.md");
    build(&other).unwrap();

    let code = run_verify(&VerifyArgs {
        left: dir.path().join("a"),
        right: dir.path().join("b"),
    })
    .unwrap();
    assert_eq!(code, 0);

    // Text normalization differs only in whitespace, so the stored trees
    // still compare equal after a reload.
    let (tree_a, map_a) = read_outputs(&dir.path().join("a")).unwrap();
    let (tree_b, map_b) = read_outputs(&dir.path().join("b")).unwrap();
    assert!(compare_outputs(&tree_a, &map_a, &tree_b, &map_b).equal);
}

#[test]
fn repeated_builds_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    build(&request(dir.path(), "one")).unwrap();
    build(&request(dir.path(), "two")).unwrap();

    let read = |out: &str, file: &str| std::fs::read(dir.path().join(out).join(file)).unwrap();
    assert_eq!(read("one", PARAGRAPHS_FILE), read("two", PARAGRAPHS_FILE));
    assert_eq!(read("one", MAPPINGS_FILE), read("two", MAPPINGS_FILE));

    let m1 = read_manifest(&dir.path().join("one")).unwrap();
    let m2 = read_manifest(&dir.path().join("two")).unwrap();
    assert_eq!(m1.paragraphs_sha256, m2.paragraphs_sha256);
    assert_eq!(m1.mappings_sha256, m2.mappings_sha256);
}

#[test]
fn mapping_lists_are_sorted_and_resolvable() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    build(&request(dir.path(), "out")).unwrap();
    let (tree, mapping) = read_outputs(&dir.path().join("out")).unwrap();

    for (_, hits) in mapping.iter() {
        for (category, numbers) in hits.categories() {
            let mut sorted = numbers.clone();
            sorted.sort();
            assert_eq!(&sorted, numbers);
            for n in numbers {
                assert!(!tree.paragraph_text(category, n.as_str()).is_empty());
            }
        }
    }
    let detectors: Vec<String> = mapping
        .get("detectors")
        .unwrap()
        .paragraphs()
        .iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(detectors, vec!["3.2"]);
}
