//! Whole-pipeline runs over tempdir fixtures.
mod common;

use pretty_assertions::assert_eq;

use common::{fixture, minimal_identity_inputs, run_pipeline};
use synweave::params::Parameters;

#[test]
fn zero_matches_leave_banner_only_outputs() {
    // genes but no clusters and no hits: both bodies stay empty
    let fx = fixture("Aa1 0 1 a0\nAa1 10 11 a1\n", "", "");
    let params = Parameters::default();
    let (aligns, blocks) = run_pipeline(&fx.prefix, &params);

    let banner_end = "##########################################\n\n";
    assert!(aligns.starts_with("############### Parameters ###############\n"));
    assert!(aligns.ends_with(banner_end));
    assert_eq!(aligns.matches("## Alignment").count(), 0);
    assert!(blocks.ends_with(banner_end));
    assert_eq!(blocks.matches("## View").count(), 0);
}

#[test]
fn pipeline_is_reproducible_byte_for_byte() {
    let (bed, mcl, blast) = minimal_identity_inputs();
    let fx = fixture(&bed, &mcl, &blast);
    let params = Parameters::default();

    let first = run_pipeline(&fx.prefix, &params);
    let second = run_pipeline(&fx.prefix, &params);
    assert_eq!(first, second);
}

#[test]
fn minimal_identity_full_outputs() {
    let (bed, mcl, blast) = minimal_identity_inputs();
    let fx = fixture(&bed, &mcl, &blast);
    let params = Parameters::default();
    let (aligns, blocks) = run_pipeline(&fx.prefix, &params);

    assert!(aligns.contains("## Alignment 0: score=300.0"));
    assert!(aligns.contains("N=6 Aa1&Bb1 plus"));
    for i in 0..6 {
        assert!(aligns.contains(&format!("\ta{i}\tb{i}\t")));
    }

    // one view per chromosome, six rows each, partner in column zero
    assert_eq!(blocks.matches("## View").count(), 2);
    assert!(blocks.contains("## View 0: pivot Aa1\n"));
    assert!(blocks.contains("## View 1: pivot Bb1\n"));
    for i in 0..6 {
        assert!(blocks.contains(&format!("\ta{i}\tb{i}\n")), "row {i} of view 0");
        assert!(blocks.contains(&format!("\tb{i}\ta{i}\n")), "row {i} of view 1");
    }
}

#[test]
fn aligns_row_format_is_stable() {
    let (bed, mcl, blast) = minimal_identity_inputs();
    let fx = fixture(&bed, &mcl, &blast);
    let params = Parameters::default();
    let (aligns, _) = run_pipeline(&fx.prefix, &params);

    // fixed-width indices, tab separation, %g-style score
    assert!(aligns.contains("  0-  0:\ta0\tb0\t  1e-50\n"));
    assert!(aligns.contains("  0-  5:\ta5\tb5\t  1e-50\n"));
}

#[test]
fn blocks_row_format_is_stable() {
    let (bed, mcl, blast) = minimal_identity_inputs();
    let fx = fixture(&bed, &mcl, &blast);
    let params = Parameters::default();
    let (_, blocks) = run_pipeline(&fx.prefix, &params);

    assert!(blocks.contains("  0-   0:\ta0\tb0\n"));
    assert!(blocks.contains("  0-   5:\ta5\tb5\n"));
    // each view ends with a blank line
    assert!(blocks.contains("\ta5\tb5\n\n## View 1"));
    assert!(blocks.ends_with("\n\n"));
}

#[test]
fn mcl_pairs_mode_emits_bare_triples() {
    // -c runs the compiled binary: it implies pairwise mode, so the .mcl
    // file is never read and no .blocks file appears
    let (bed, _mcl, blast) = minimal_identity_inputs();
    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("test");
    std::fs::write(prefix.with_extension("bed"), bed).unwrap();
    std::fs::write(prefix.with_extension("blast"), blast).unwrap();

    let status = std::process::Command::new(env!("CARGO_BIN_EXE_synweave"))
        .arg(&prefix)
        .arg("-c")
        .status()
        .unwrap();
    assert!(status.success());

    let aligns = std::fs::read_to_string(prefix.with_extension("aligns")).unwrap();
    assert!(!aligns.contains("## Alignment"));
    assert!(!aligns.contains("# MATCH_SCORE"));
    for i in 0..6 {
        assert!(aligns.contains(&format!("a{i}\tb{i}\t1e-50\n")));
    }
    assert!(!prefix.with_extension("blocks").exists());
}

#[test]
fn sub_cutoff_inputs_emit_views_without_columns() {
    // five anchors score 250 < 300: no segment, but the reference spines
    // still print with their master genes
    let mut bed = String::new();
    let mut mcl = String::new();
    let mut blast = String::new();
    for i in 0..6 {
        bed.push_str(&format!("Aa1 {} {} a{}\n", i * 100, i * 100 + 50, i));
        bed.push_str(&format!("Bb1 {} {} b{}\n", i * 100, i * 100 + 50, i));
        mcl.push_str(&format!("a{i} b{i}\n"));
        if i < 5 {
            blast.push_str(&format!("a{i} b{i} 1e-50\n"));
        }
    }
    let fx = fixture(&bed, &mcl, &blast);
    let params = Parameters::default();
    let (aligns, blocks) = run_pipeline(&fx.prefix, &params);

    assert_eq!(aligns.matches("## Alignment").count(), 0);
    assert_eq!(blocks.matches("## View").count(), 2);
    // spine rows carry masters only, no columns were allocated
    assert!(blocks.contains("  0-   0:\ta0\n"));
}
