//! Command-line tests for the standalone stages and the full `run` command.
//!
//! `run` is exercised with `--reuse-alignments` and pre-written PAF files so
//! no aligner needs to be installed.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const REFERENCE: &str = ">chr\nACGTACGTACGTACGTACGT\n";
const QUERY: &str = ">q\nACGTACGTACGAACGTACGT\n";
const PAF: &str = "q\t20\t0\t20\t+\tchr\t20\t0\t20\t19\t20\t60\tcg:Z:11=1X8=\n";

fn varscen() -> Command {
    Command::cargo_bin("varscen").unwrap()
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Genomes, masks and a PAF for the pair H37Rv vs L1
fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "H37Rv.fasta", REFERENCE);
    write(dir.path(), "L1.fasta", QUERY);
    write(dir.path(), "H37Rv+L1.paf", PAF);
    dir
}

#[test]
fn test_transform_writes_difference_table() {
    let dir = fixture();
    let d = dir.path();

    varscen()
        .args(["transform", "--format", "tsv", "--paf"])
        .arg(d.join("H37Rv+L1.paf"))
        .arg("--ref")
        .arg(d.join("H37Rv.fasta"))
        .arg("--query")
        .arg(d.join("L1.fasta"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("reference_id\tquery_id\treference_contig"))
        .stdout(predicate::str::contains("H37Rv\tL1\tchr\t11\tq\t11\tSNP\t1\tT\tA"));
}

#[test]
fn test_standalone_stages_chain() {
    let dir = fixture();
    let d = dir.path();
    write(d, "H37Rv.bed", "chr\t10\t12\n");

    varscen()
        .arg("transform")
        .arg("--paf")
        .arg(d.join("H37Rv+L1.paf"))
        .arg("--ref")
        .arg(d.join("H37Rv.fasta"))
        .arg("--query")
        .arg(d.join("L1.fasta"))
        .arg("-o")
        .arg(d.join("diff.tsv"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Extracted 1 difference records"));

    varscen()
        .args(["mask", "--format", "json", "--input"])
        .arg(d.join("diff.tsv"))
        .arg("--ref")
        .arg(d.join("H37Rv.bed"))
        .arg("-o")
        .arg(d.join("masked.tsv"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"removed_by_reference\": 1"));

    // The masked table is empty, so the pair must be named explicitly
    varscen()
        .args(["count", "--input"])
        .arg(d.join("masked.tsv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--reference-id"));

    varscen()
        .args(["count", "--reference-id", "H37Rv", "--query-id", "L1", "--input"])
        .arg(d.join("masked.tsv"))
        .assert()
        .success()
        .stdout("reference_id\tquery_id\nH37Rv\tL1\n");
}

#[test]
fn test_count_without_mask() {
    let dir = fixture();
    let d = dir.path();

    varscen()
        .arg("transform")
        .arg("--paf")
        .arg(d.join("H37Rv+L1.paf"))
        .arg("--ref")
        .arg(d.join("H37Rv.fasta"))
        .arg("--query")
        .arg(d.join("L1.fasta"))
        .arg("-o")
        .arg(d.join("diff.tsv"))
        .assert()
        .success();

    varscen()
        .args(["count", "--input"])
        .arg(d.join("diff.tsv"))
        .assert()
        .success()
        .stdout("reference_id\tquery_id\tSNP\nH37Rv\tL1\t1\n");
}

#[test]
fn test_mask_missing_input() {
    varscen()
        .args(["mask", "--input", "/nonexistent/diff.tsv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing input file"));
}

#[test]
fn test_merge_duplicate_pair_fails() {
    let dir = TempDir::new().unwrap();
    let d = dir.path();
    let counts = "reference_id\tquery_id\tSNP\nH37Rv\tL1\t3\n";
    write(d, "a.counts.tsv", counts);
    write(d, "b.counts.tsv", counts);

    varscen()
        .args(["merge", "--dir"])
        .arg(d)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duplicate pair"))
        .stderr(predicate::str::contains("H37Rv vs L1"));
}

#[test]
fn test_merge_files_in_given_order() {
    let dir = TempDir::new().unwrap();
    let d = dir.path();
    let l2 = write(d, "l2.counts.tsv", "reference_id\tquery_id\tGap\nH37Rv\tL2\t2\n");
    let l1 = write(d, "l1.counts.tsv", "reference_id\tquery_id\tSNP\nH37Rv\tL1\t3\n");

    varscen()
        .arg("merge")
        .arg(&l2)
        .arg(&l1)
        .assert()
        .success()
        .stdout(
            "reference_id\tquery_id\tstatus\tSNP\tGap\ttotal\n\
             H37Rv\tL2\tcomplete\t0\t2\t2\n\
             H37Rv\tL1\tcomplete\t3\t0\t3\n",
        );
}

#[test]
fn test_run_reusing_alignments() {
    let dir = fixture();
    let d = dir.path();
    let out = d.join("out");
    std::fs::create_dir(&out).unwrap();
    std::fs::copy(d.join("H37Rv+L1.paf"), out.join("H37Rv+L1.paf")).unwrap();
    let manifest = write(d, "pairs.tsv", "reference query\nH37Rv L1\nH37Rv L9\n");

    varscen()
        .args(["run", "--format", "tsv", "--reuse-alignments", "--allow-missing-masks"])
        .arg(&manifest)
        .arg("--genome-dir")
        .arg(d)
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(
            "reference_id\tquery_id\tstatus\tSNP\ttotal\n\
             H37Rv\tL1\tcomplete\t1\t1\n\
             H37Rv\tL9\tincomplete\tNA\tNA\n",
        );

    assert!(out.join("H37Rv+L1.counts.tsv").is_file());
    assert!(out.join("summary.tsv").is_file());
}

#[test]
fn test_run_rejects_duplicate_manifest_pairs() {
    let dir = fixture();
    let d = dir.path();
    let manifest = write(d, "pairs.tsv", "reference query\nH37Rv L1\nH37Rv L1\n");

    varscen()
        .arg("run")
        .arg(&manifest)
        .arg("--genome-dir")
        .arg(d)
        .arg("--output-dir")
        .arg(d.join("out"))
        .assert()
        .failure();
}
