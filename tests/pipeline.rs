#[path = "common/mod.rs"]
mod common;

use common::write_report;
use kira_mirtop::cli::args::RunArgs;
use kira_mirtop::cli::run;
use kira_mirtop::core::discover::DEFAULT_PATTERN;
use kira_mirtop::core::error::EmptyResultError;
use kira_mirtop::core::io::DEFAULT_MAX_FILE_SIZE;
use std::fs;
use std::path::PathBuf;

fn args(inputs: Vec<PathBuf>, out: PathBuf) -> RunArgs {
    RunArgs {
        inputs,
        out,
        pattern: DEFAULT_PATTERN.to_string(),
        ignore_samples: Vec::new(),
        strict: false,
        max_file_size: DEFAULT_MAX_FILE_SIZE,
        no_zip: false,
        export_latex: false,
    }
}

#[test]
fn writes_every_output_for_a_directory_of_reports() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_report(
        input.path(),
        "s1_mirtop_stats.log",
        "sample1",
        &[("isomiR_sum", "30"), ("ref_miRNA_sum", "70")],
    );
    write_report(
        input.path(),
        "s2_mirtop_stats.log",
        "sample2",
        &[("isomiR_sum", "1"), ("ref_miRNA_sum", "3"), ("isomiR_snp", "2")],
    );
    write_report(input.path(), "unrelated.txt", "nope", &[("isomiR_sum", "1")]);

    let report_dir = run::run(args(vec![input.path().to_path_buf()], out.path().to_path_buf()))
        .expect("run succeeds");

    let data = fs::read_to_string(report_dir.join("multiqc_mirtop.txt")).unwrap();
    assert_eq!(
        data,
        "Sample\tisomiR_perc\tisomiR_snp\tisomiR_sum\tread_count\tref_miRNA_sum\n\
         sample1\t30\t\t30\t100\t70\n\
         sample2\t25\t2\t1\t4\t3\n"
    );

    let general = fs::read_to_string(report_dir.join("mirtop_general_stats.txt")).unwrap();
    assert!(general.contains("sample1\t30.0\t70.0\t100.0\t30.0%"));

    let sources = fs::read_to_string(report_dir.join("multiqc_sources.txt")).unwrap();
    assert_eq!(sources.lines().count(), 3);
    assert!(sources.contains("miRTop\tsample2\t"));

    assert!(report_dir.join("mirtop_report.html").is_file());
    assert!(out.path().join("mirtop_report.zip").is_file());
}

#[test]
fn no_reports_is_a_distinct_empty_error() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let err = run::run(args(vec![input.path().to_path_buf()], out.path().to_path_buf()))
        .unwrap_err();
    assert!(err.downcast_ref::<EmptyResultError>().is_some());
    assert!(!out.path().join("mirtop_report").exists());
}

#[test]
fn ignored_samples_can_empty_the_report() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_report(
        input.path(),
        "c_mirtop_stats.log",
        "ctrl_1",
        &[("isomiR_sum", "1"), ("ref_miRNA_sum", "1")],
    );
    let mut a = args(vec![input.path().to_path_buf()], out.path().to_path_buf());
    a.ignore_samples = vec!["ctrl_*".to_string()];
    let err = run::run(a).unwrap_err();
    assert!(err.downcast_ref::<EmptyResultError>().is_some());
}

#[test]
fn later_file_wins_for_duplicate_sample() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let first = write_report(
        input.path(),
        "a_mirtop_stats.log",
        "dup",
        &[("isomiR_sum", "10"), ("ref_miRNA_sum", "10"), ("only_first", "1")],
    );
    let second = write_report(
        input.path(),
        "b_mirtop_stats.log",
        "dup",
        &[("isomiR_sum", "1"), ("ref_miRNA_sum", "9")],
    );
    let mut a = args(vec![first, second.clone()], out.path().to_path_buf());
    a.no_zip = true;
    let report_dir = run::run(a).unwrap();

    let data = fs::read_to_string(report_dir.join("multiqc_mirtop.txt")).unwrap();
    assert_eq!(
        data,
        "Sample\tisomiR_perc\tisomiR_sum\tread_count\tref_miRNA_sum\ndup\t10\t1\t10\t9\n"
    );
    let sources = fs::read_to_string(report_dir.join("multiqc_sources.txt")).unwrap();
    assert!(sources.contains(&second.display().to_string()));
    assert!(!out.path().join("mirtop_report.zip").exists());
}

#[test]
fn strict_mode_stops_on_bad_report() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_report(
        input.path(),
        "a_mirtop_stats.log",
        "good",
        &[("isomiR_sum", "1"), ("ref_miRNA_sum", "1")],
    );
    write_report(
        input.path(),
        "b_mirtop_stats.log",
        "bad",
        &[("isomiR_sum", "1")],
    );

    let lenient = run::run(args(vec![input.path().to_path_buf()], out.path().to_path_buf()));
    assert!(lenient.is_ok());

    let mut a = args(vec![input.path().to_path_buf()], out.path().join("strict"));
    a.strict = true;
    let err = run::run(a).unwrap_err();
    assert!(format!("{:#}", err).contains("b_mirtop_stats.log"));
}

#[test]
fn latex_export_is_written_and_bundled() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_report(
        input.path(),
        "s1_mirtop_stats.log",
        "sample_1",
        &[("isomiR_sum", "30"), ("ref_miRNA_sum", "70")],
    );
    write_report(
        input.path(),
        "s2_mirtop_stats.log",
        "sample_2",
        &[("isomiR_sum", "5"), ("ref_miRNA_sum", "15")],
    );
    let mut a = args(vec![input.path().to_path_buf()], out.path().to_path_buf());
    a.export_latex = true;
    let report_dir = run::run(a).unwrap();

    let latex = report_dir.join("latex");
    let pdf = fs::read(latex.join("figures").join("isomir_summary.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
    assert!(latex.join("figures").join("isomir_summary.svg").is_file());
    let tex = fs::read_to_string(latex.join("kira_mirtop.tex")).unwrap();
    assert!(tex.contains("\\input{tables/general_statistics.tex}"));
    let table = fs::read_to_string(latex.join("tables").join("general_statistics.tex")).unwrap();
    assert!(table.contains("sample\\_1 & 30.0 & 70.0 & 100.0 & 30.0\\% \\\\"));

    let inner = zip::ZipArchive::new(fs::File::open(latex.join("kira_mirtop_latex.zip")).unwrap())
        .unwrap();
    assert!(inner.file_names().any(|n| n == "latex/figures/isomir_summary.pdf"));

    let outer = zip::ZipArchive::new(fs::File::open(out.path().join("mirtop_report.zip")).unwrap())
        .unwrap();
    let names: Vec<&str> = outer.file_names().collect();
    assert!(names.contains(&"mirtop_report/mirtop_report.html"));
    assert!(names.contains(&"mirtop_report/latex/kira_mirtop.tex"));
    assert!(names.contains(&"mirtop_report/latex/figures/isomir_summary.pdf"));
    assert!(names.contains(&"mirtop_report/latex/kira_mirtop_latex.zip"));
}
