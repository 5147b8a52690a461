use std::fs;

use pixon_plot::data::model::RunType;
use pixon_plot::data::results::RunFiles;
use pixon_plot::sample::write_sample_run;
use pixon_plot::{run, PlotError, OUTPUT_FILE};

/// Count `/Type /Page` dictionaries (not `/Type /Pages`) in a written PDF.
fn count_page_objects(bytes: &[u8]) -> usize {
    [&b"/Type/Page"[..], &b"/Type /Page"[..]]
        .iter()
        .map(|needle| {
            bytes
                .windows(needle.len())
                .enumerate()
                .filter(|&(i, w)| w == *needle && bytes.get(i + needle.len()) != Some(&b's'))
                .count()
        })
        .sum()
}

#[test]
fn single_contfix_run_produces_two_page_pdf() {
    let dir = tempfile::tempdir().unwrap();
    write_sample_run(dir.path(), 0, 11).unwrap();

    let summary = run(dir.path()).unwrap();
    assert_eq!(summary.runs, vec![RunType::ContFix]);
    assert_eq!(summary.comparison_rows, 1);
    assert_eq!(summary.pixon_map_rows, 1);
    assert_eq!(summary.pages, 2);

    let bytes = fs::read(dir.path().join(OUTPUT_FILE)).unwrap();
    assert!(bytes.len() > 1000);
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(count_page_objects(&bytes), 2);
}

#[test]
fn all_models_draw_three_rows_in_fixed_order() {
    let dir = tempfile::tempdir().unwrap();
    write_sample_run(dir.path(), 3, 5).unwrap();

    let summary = run(dir.path()).unwrap();
    assert_eq!(summary.runs, vec![RunType::ContFix, RunType::Pixon, RunType::Drw]);
    assert_eq!(summary.comparison_rows, 3);
    assert_eq!(summary.pixon_map_rows, 3);
    assert_eq!(summary.pages, 2);
}

#[test]
fn model_one_uses_pixon_files_only() {
    let dir = tempfile::tempdir().unwrap();
    write_sample_run(dir.path(), 1, 3).unwrap();
    // Nothing for the other run types exists on disk.
    assert!(!dir.path().join("resp_drw.txt_0").exists());

    let summary = run(dir.path()).unwrap();
    assert_eq!(summary.runs, vec![RunType::Pixon]);
    assert_eq!(summary.comparison_rows, 1);
}

#[test]
fn offset_and_bounds_come_from_the_observed_curves() {
    let dir = tempfile::tempdir().unwrap();
    write_sample_run(dir.path(), 2, 9).unwrap();

    let summary = run(dir.path()).unwrap();
    assert_eq!(summary.bounds.start, 0.0);
    assert_eq!(summary.bounds.end, 200.0);
    assert!(summary.offset.is_finite());
}

#[test]
fn missing_result_file_is_fatal_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_sample_run(dir.path(), 3, 2).unwrap();
    let victim = dir.path().join(RunFiles::for_run(RunType::Drw, "0").pixon_map_uniform);
    fs::remove_file(&victim).unwrap();

    match run(dir.path()).unwrap_err() {
        PlotError::FileNotFound(path) => assert_eq!(path, victim),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!dir.path().join(OUTPUT_FILE).exists());
}

#[test]
fn missing_param_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        run(dir.path()).unwrap_err(),
        PlotError::ConfigParse { .. }
    ));
}

#[test]
fn observed_curve_without_errors_is_a_shape_error() {
    let dir = tempfile::tempdir().unwrap();
    write_sample_run(dir.path(), 0, 4).unwrap();
    fs::write(dir.path().join("line.txt"), "1 2\n2 3\n3 4\n").unwrap();

    assert!(matches!(
        run(dir.path()).unwrap_err(),
        PlotError::Shape { .. }
    ));
    assert!(!dir.path().join(OUTPUT_FILE).exists());
}
