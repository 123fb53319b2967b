//! End-to-end pipeline test: simulation Parquet and observation CSVs in,
//! aligned X/Y bundles out, raw values reconstructable throughout.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use approx::assert_relative_eq;
use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, RecordBatch};
use arrow::datatypes::{DataType, Field, Schema};
use chrono::NaiveDate;
use naiad_io::read_y_bundle;
use naiad_prep::{prep_x, prep_y, unstandardize, PrepError};
use parquet::arrow::ArrowWriter;

const SEG_IDS: [i64; 2] = [2007, 2012];
const N_DATES: usize = 395;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn all_dates() -> Vec<NaiveDate> {
    (0..N_DATES)
        .map(|i| date(2004, 9, 15) + chrono::Duration::days(i as i64))
        .collect()
}

fn test_start() -> NaiveDate {
    date(2005, 9, 15)
}

// Deterministic simulated values, linear in segment row and date index so
// nothing is constant and every reconstruction is checkable.
fn air(i: usize, j: usize) -> f64 {
    10.0 + 2.0 * i as f64 + 0.01 * j as f64
}
fn rain(i: usize, j: usize) -> f64 {
    0.5 + 0.2 * i as f64 + 0.003 * j as f64
}
fn water(i: usize, j: usize) -> f64 {
    8.0 + i as f64 + 0.02 * j as f64
}
fn flow(i: usize, j: usize) -> f64 {
    30.0 + 5.0 * i as f64 + 0.05 * j as f64
}
fn inflow(i: usize, j: usize) -> f64 {
    12.0 + i as f64 + 0.03 * j as f64
}

type ValueFn = fn(usize, usize) -> f64;

const SIM_VARS: [(&str, ValueFn); 5] = [
    ("seg_tave_air", air),
    ("seg_rain", rain),
    ("seg_tave_water", water),
    ("seg_outflow", flow),
    ("seg_upstream_inflow", inflow),
];

fn write_sim(path: &Path, dates: &[NaiveDate]) {
    let epoch = date(1970, 1, 1);
    let mut fields = vec![
        Field::new("seg_id_nat", DataType::Int64, false),
        Field::new("date", DataType::Date32, false),
    ];
    for (name, _) in SIM_VARS {
        fields.push(Field::new(name, DataType::Float64, false));
    }
    let schema = Arc::new(Schema::new(fields));

    let mut seg_col = Vec::new();
    let mut date_col = Vec::new();
    let mut value_cols: Vec<Vec<f64>> = vec![Vec::new(); SIM_VARS.len()];
    for (i, &seg) in SEG_IDS.iter().enumerate() {
        for (j, &d) in dates.iter().enumerate() {
            seg_col.push(seg);
            date_col.push((d - epoch).num_days() as i32);
            for (k, (_, value_fn)) in SIM_VARS.iter().enumerate() {
                value_cols[k].push(value_fn(i, j));
            }
        }
    }

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(seg_col)),
        Arc::new(Date32Array::from(date_col)),
    ];
    for col in value_cols {
        columns.push(Arc::new(Float64Array::from(col)));
    }

    let batch = RecordBatch::try_new(schema.clone(), columns).expect("build batch");
    let file = std::fs::File::create(path).expect("create parquet file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("create writer");
    writer.write(&batch).expect("write batch");
    writer.close().expect("close writer");
}

fn write_file(path: &Path, contents: &str) {
    let mut file = std::fs::File::create(path).expect("create file");
    file.write_all(contents.as_bytes()).expect("write file");
}

/// Lays out the full fixture: simulation store, sparse observation CSVs
/// (one row outside the axes on purpose), and an X bundle.
struct Fixture {
    sim: PathBuf,
    obs_temp: PathBuf,
    obs_flow: PathBuf,
    x_dir: PathBuf,
    _dir: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let sim = dir.path().join("sntemp.parquet");
        write_sim(&sim, &all_dates());

        let obs_temp = dir.path().join("obs_temp.csv");
        write_file(
            &obs_temp,
            "\
seg_id_nat,date,temp_c
2007,2004-09-20,18.5
2012,2004-10-01,15.5
2007,2005-09-20,17.0
2012,2010-01-01,99.0
",
        );

        let obs_flow = dir.path().join("obs_flow.csv");
        write_file(
            &obs_flow,
            "\
seg_id_nat,date,discharge_cms
2007,2004-09-16,3.2
2012,2004-12-25,5.0
2012,2005-09-16,4.1
",
        );

        let x_dir = dir.path().join("x_data");
        Self {
            sim,
            obs_temp,
            obs_flow,
            x_dir,
            _dir: dir,
        }
    }

    fn x_vars(&self) -> Vec<String> {
        vec!["seg_tave_air".to_string(), "seg_rain".to_string()]
    }

    fn pt_vars(&self) -> Vec<String> {
        vec![
            "seg_tave_water".to_string(),
            "seg_outflow".to_string(),
            "seg_upstream_inflow".to_string(),
        ]
    }

    fn ft_vars(&self) -> Vec<String> {
        vec!["seg_tave_water".to_string(), "seg_outflow".to_string()]
    }

    fn run_prep_x(&self) -> naiad_prep::XBundle {
        prep_x(&self.sim, &self.x_vars(), test_start(), 1, Some(&self.x_dir))
            .expect("prep_x succeeds")
    }
}

#[test]
fn x_partitions_and_round_trip() {
    let fx = Fixture::new();
    let x = fx.run_prep_x();

    // 365 train days, 30 test days clipped at the data end.
    assert_eq!(x.x_trn.dim(), (2, 365, 2));
    assert_eq!(x.x_tst.dim(), (2, 30, 2));
    assert_eq!(x.seg_ids, SEG_IDS);
    assert_eq!(x.dates_trn.first(), Some(&date(2004, 9, 15)));
    assert_eq!(x.dates_trn.last(), Some(&date(2005, 9, 14)));
    assert_eq!(x.dates_tst.first(), Some(&date(2005, 9, 15)));
    assert_eq!(x.dates_tst.last(), Some(&date(2005, 10, 14)));

    // Partitions are disjoint and ordered.
    assert!(x.dates_trn.last() < x.dates_tst.first());

    // value * std + mean reconstructs the raw simulation everywhere.
    let value_fns: [ValueFn; 2] = [air, rain];
    for (k, value_fn) in value_fns.iter().enumerate() {
        for i in 0..2 {
            for jj in [0usize, 100, 364] {
                assert_relative_eq!(
                    unstandardize(x.x_trn[(i, jj, k)], x.x_mean[k], x.x_std[k]),
                    value_fn(i, jj),
                    epsilon = 1e-9
                );
            }
            for jj in [0usize, 29] {
                assert_relative_eq!(
                    unstandardize(x.x_tst[(i, jj, k)], x.x_mean[k], x.x_std[k]),
                    value_fn(i, 365 + jj),
                    epsilon = 1e-9
                );
            }
        }
    }
}

#[test]
fn x_statistics_come_from_the_training_partition_only() {
    let fx = Fixture::new();
    let x = fx.run_prep_x();

    // Mean of air over both segments and train dates only.
    let n = 365usize;
    let expected: f64 = (0..2)
        .flat_map(|i| (0..n).map(move |j| air(i, j)))
        .sum::<f64>()
        / (2 * n) as f64;
    assert_relative_eq!(x.x_mean[0], expected, epsilon = 1e-9);
}

#[test]
fn y_aligns_with_x_and_reconstructs_observations() {
    let fx = Fixture::new();
    let x = fx.run_prep_x();

    let y = prep_y(
        &fx.obs_temp,
        &fx.obs_flow,
        &fx.sim,
        &fx.x_dir,
        &fx.pt_vars(),
        &fx.ft_vars(),
        None,
        None,
    )
    .expect("prep_y succeeds");

    // Positional alignment with the X bundle.
    assert_eq!(y.seg_ids, x.seg_ids);
    assert_eq!(y.dates_trn, x.dates_trn);
    assert_eq!(y.dates_tst, x.dates_tst);
    assert_eq!(y.y_obs_trn.dim(), (2, 365, 2));
    assert_eq!(y.y_obs_tst.dim(), (2, 30, 2));
    assert_eq!(y.y_pre_trn.dim(), (2, 365, 3));

    // Weights count the genuine observations inside the axes; the 2010
    // temperature row fell outside and was dropped.
    assert_eq!(y.y_wgts_trn.sum() + y.y_wgts_tst.sum(), 6.0);

    let temp_k = 0usize; // seg_tave_water
    let flow_k = 1usize; // seg_outflow

    // Weighted train statistics come from train-partition observations
    // only: temps 18.5 and 15.5, flows 3.2 and 5.0.
    assert_relative_eq!(y.y_obs_mean[temp_k], 17.0, epsilon = 1e-12);
    assert_relative_eq!(y.y_obs_std[temp_k], 1.5, epsilon = 1e-12);
    assert_relative_eq!(y.y_obs_mean[flow_k], 4.1, epsilon = 1e-12);
    assert_relative_eq!(y.y_obs_std[flow_k], 0.9, epsilon = 1e-12);

    let pos = |dates: &[NaiveDate], d: NaiveDate| dates.iter().position(|&x| x == d).unwrap();

    // Observed cells reconstruct the observation.
    let j = pos(&y.dates_trn, date(2004, 9, 20));
    assert_relative_eq!(
        unstandardize(y.y_obs_trn[(0, j, temp_k)], y.y_obs_mean[temp_k], y.y_obs_std[temp_k]),
        18.5,
        epsilon = 1e-9
    );
    assert_eq!(y.y_wgts_trn[(0, j, temp_k)], 1.0);

    let j = pos(&y.dates_tst, date(2005, 9, 16));
    assert_relative_eq!(
        unstandardize(y.y_obs_tst[(1, j, flow_k)], y.y_obs_mean[flow_k], y.y_obs_std[flow_k]),
        4.1,
        epsilon = 1e-9
    );

    // Unobserved cells reconstruct the simulated value they were filled
    // from, and carry zero weight.
    let j = pos(&y.dates_trn, date(2004, 9, 15));
    assert_relative_eq!(
        unstandardize(y.y_obs_trn[(1, j, temp_k)], y.y_obs_mean[temp_k], y.y_obs_std[temp_k]),
        water(1, 0),
        epsilon = 1e-9
    );
    assert_eq!(y.y_wgts_trn[(1, j, temp_k)], 0.0);
}

#[test]
fn y_pretraining_arrays_round_trip_to_simulation() {
    let fx = Fixture::new();
    fx.run_prep_x();

    let y = prep_y(
        &fx.obs_temp,
        &fx.obs_flow,
        &fx.sim,
        &fx.x_dir,
        &fx.pt_vars(),
        &fx.ft_vars(),
        None,
        None,
    )
    .expect("prep_y succeeds");

    let value_fns: [ValueFn; 3] = [water, flow, inflow];
    for (k, value_fn) in value_fns.iter().enumerate() {
        for i in 0..2 {
            for jj in [0usize, 200, 364] {
                assert_relative_eq!(
                    unstandardize(y.y_pre_trn[(i, jj, k)], y.y_pre_mean[k], y.y_pre_std[k]),
                    value_fn(i, jj),
                    epsilon = 1e-9
                );
            }
        }
    }
}

#[test]
fn exclusions_zero_weights_and_change_statistics() {
    let fx = Fixture::new();
    fx.run_prep_x();

    let exclude = fx.sim.parent().unwrap().join("exclude.yml");
    write_file(&exclude, "- seg_id_nats:\n    - 2007\n");

    let y = prep_y(
        &fx.obs_temp,
        &fx.obs_flow,
        &fx.sim,
        &fx.x_dir,
        &fx.pt_vars(),
        &fx.ft_vars(),
        Some(&exclude),
        None,
    )
    .expect("prep_y succeeds");

    // Every 2007 weight is zero, observations or not.
    let temp_k = 0usize;
    for jj in 0..365 {
        assert_eq!(y.y_wgts_trn[(0, jj, temp_k)], 0.0);
        assert_eq!(y.y_wgts_trn[(0, jj, 1)], 0.0);
    }

    // Surviving train observations: temp 15.5 (2012), flow 5.0 (2012).
    // A single observation has zero spread, so the std guard kicks in.
    assert_relative_eq!(y.y_obs_mean[temp_k], 15.5, epsilon = 1e-12);
    assert_eq!(y.y_obs_std[temp_k], 1.0);
    assert_relative_eq!(y.y_obs_mean[1], 5.0, epsilon = 1e-12);
}

#[test]
fn y_bundle_persists_and_reloads() {
    let fx = Fixture::new();
    fx.run_prep_x();

    let y_dir = fx.sim.parent().unwrap().join("y_data");
    let y = prep_y(
        &fx.obs_temp,
        &fx.obs_flow,
        &fx.sim,
        &fx.x_dir,
        &fx.pt_vars(),
        &fx.ft_vars(),
        None,
        Some(&y_dir),
    )
    .expect("prep_y succeeds");

    let reread = read_y_bundle(&y_dir).expect("read y bundle");
    assert_eq!(reread.y_obs_trn, y.y_obs_trn);
    assert_eq!(reread.y_wgts_tst, y.y_wgts_tst);
    assert_eq!(reread.y_pre_tst, y.y_pre_tst);
    assert_eq!(reread.dates_trn, y.dates_trn);
    assert_eq!(reread.y_obs_mean, y.y_obs_mean);
}

#[test]
fn y_rejects_simulation_missing_bundle_dates() {
    let fx = Fixture::new();
    fx.run_prep_x();

    // A truncated simulation store cannot supply the bundle's test dates.
    let short_sim = fx.sim.parent().unwrap().join("short.parquet");
    write_sim(&short_sim, &all_dates()[..100]);

    let err = prep_y(
        &fx.obs_temp,
        &fx.obs_flow,
        &short_sim,
        &fx.x_dir,
        &fx.pt_vars(),
        &fx.ft_vars(),
        None,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, PrepError::ShapeMismatch { .. }), "got {err:?}");
}

#[test]
fn y_rejects_bad_finetune_variables() {
    let fx = Fixture::new();
    fx.run_prep_x();

    let err = prep_y(
        &fx.obs_temp,
        &fx.obs_flow,
        &fx.sim,
        &fx.x_dir,
        &fx.pt_vars(),
        &["seg_tave_water".to_string()],
        None,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, PrepError::Config { .. }));
}

#[test]
fn x_rejects_unknown_variable() {
    let fx = Fixture::new();
    let err = prep_x(
        &fx.sim,
        &["seg_humidity".to_string()],
        test_start(),
        1,
        None,
    )
    .unwrap_err();
    match err {
        PrepError::Config { reason } => assert!(reason.contains("seg_humidity")),
        other => panic!("expected Config, got {other:?}"),
    }
}

#[test]
fn x_rejects_split_outside_range() {
    let fx = Fixture::new();
    let err = prep_x(&fx.sim, &fx.x_vars(), date(2010, 1, 1), 1, None).unwrap_err();
    assert!(matches!(err, PrepError::Config { .. }));
}
