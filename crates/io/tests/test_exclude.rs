//! Integration tests: exclusion-rule files on disk.

use std::io::Write;

use chrono::NaiveDate;
use naiad_io::{read_exclude_file, ExcludeRule, IoError};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create file");
    file.write_all(contents.as_bytes()).expect("write file");
    path
}

#[test]
fn reads_single_unbounded_rule() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = write_file(&dir, "exclude.yml", "- seg_id_nats:\n    - 2007\n");

    let rules = read_exclude_file(&path).expect("read rules");
    assert_eq!(
        rules,
        vec![ExcludeRule {
            seg_id_nats: vec![2007],
            start_date: None,
            end_date: None,
        }]
    );
}

#[test]
fn reads_bounded_rules_in_declaration_order() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = write_file(
        &dir,
        "exclude1.yml",
        "\
- seg_id_nats:
    - 2007
  start_date: 2005-09-15
- seg_id_nats:
    - 2012
  end_date: 2005-09-15
",
    );

    let rules = read_exclude_file(&path).expect("read rules");
    assert_eq!(
        rules,
        vec![
            ExcludeRule {
                seg_id_nats: vec![2007],
                start_date: Some(date(2005, 9, 15)),
                end_date: None,
            },
            ExcludeRule {
                seg_id_nats: vec![2012],
                start_date: None,
                end_date: Some(date(2005, 9, 15)),
            },
        ]
    );
}

#[test]
fn reads_multi_segment_rule() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = write_file(
        &dir,
        "exclude.yml",
        "- seg_id_nats: [2007, 2012, 2014]\n  end_date: 2004-12-31\n",
    );

    let rules = read_exclude_file(&path).expect("read rules");
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].seg_id_nats, vec![2007, 2012, 2014]);
    assert_eq!(rules[0].end_date, Some(date(2004, 12, 31)));
}

#[test]
fn malformed_file_is_a_parse_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = write_file(&dir, "exclude.yml", "seg_id_nats: not-a-sequence\n");

    let err = read_exclude_file(&path).unwrap_err();
    assert!(matches!(err, IoError::Exclude { .. }), "got {err:?}");
}

#[test]
fn bad_date_is_a_parse_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = write_file(
        &dir,
        "exclude.yml",
        "- seg_id_nats: [2007]\n  start_date: not-a-date\n",
    );

    let err = read_exclude_file(&path).unwrap_err();
    assert!(matches!(err, IoError::Exclude { .. }), "got {err:?}");
}
