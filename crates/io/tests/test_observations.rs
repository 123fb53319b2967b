//! Integration tests: sparse observation CSVs on disk.

use std::io::Write;

use chrono::NaiveDate;
use naiad_grid::Axes;
use naiad_io::{observations_to_grid, read_observations, IoError};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn write_csv(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create file");
    file.write_all(contents.as_bytes()).expect("write file");
    path
}

#[test]
fn reads_sparse_temperature_csv() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = write_csv(
        &dir,
        "obs_temp.csv",
        "\
seg_id_nat,date,temp_c
2007,2004-09-15,18.2
2007,2004-09-17,17.9
2012,2004-09-15,16.4
",
    );

    let records = read_observations(&path, "temp_c").expect("read observations");
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].seg_id, 2007);
    assert_eq!(records[0].date, date(2004, 9, 15));
    assert_eq!(records[0].value, 18.2);
    assert_eq!(records[2].seg_id, 2012);
}

#[test]
fn empty_value_fields_are_skipped() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = write_csv(
        &dir,
        "obs_flow.csv",
        "\
seg_id_nat,date,discharge_cms
2007,2004-09-15,3.1
2007,2004-09-16,
2012,2004-09-15,4.4
",
    );

    let records = read_observations(&path, "discharge_cms").expect("read observations");
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].value, 4.4);
}

#[test]
fn extra_columns_are_ignored() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = write_csv(
        &dir,
        "obs_temp.csv",
        "\
seg_id_nat,date,temp_c,source
2007,2004-09-15,18.2,usgs
",
    );

    let records = read_observations(&path, "temp_c").expect("read observations");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].value, 18.2);
}

#[test]
fn missing_value_column_is_an_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = write_csv(
        &dir,
        "obs_temp.csv",
        "seg_id_nat,date,temperature\n2007,2004-09-15,18.2\n",
    );

    let err = read_observations(&path, "temp_c").unwrap_err();
    match err {
        IoError::MissingColumn { column, .. } => assert_eq!(column, "temp_c"),
        other => panic!("expected MissingColumn, got {other:?}"),
    }
}

#[test]
fn bad_value_is_an_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = write_csv(
        &dir,
        "obs_temp.csv",
        "seg_id_nat,date,temp_c\n2007,2004-09-15,warm\n",
    );

    let err = read_observations(&path, "temp_c").unwrap_err();
    match err {
        IoError::Csv { reason, .. } => {
            assert!(reason.contains("line 2"), "reason was: {reason}");
        }
        other => panic!("expected Csv, got {other:?}"),
    }
}

#[test]
fn read_then_scatter_onto_axes() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = write_csv(
        &dir,
        "obs_temp.csv",
        "\
seg_id_nat,date,temp_c
2007,2004-09-15,18.2
2012,2004-09-16,16.4
2012,2010-01-01,12.0
",
    );

    let axes = Axes::new(
        vec![2007, 2012],
        vec![date(2004, 9, 15), date(2004, 9, 16)],
    )
    .expect("valid axes");

    let records = read_observations(&path, "temp_c").expect("read observations");
    let grid = observations_to_grid(&records, &axes);

    // The 2010 record falls outside the axes and is dropped.
    assert_eq!(grid[(0, 0)], Some(18.2));
    assert_eq!(grid[(1, 1)], Some(16.4));
    assert_eq!(grid[(0, 1)], None);
    assert_eq!(grid[(1, 0)], None);
}
