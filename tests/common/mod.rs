//! Shared fixture plumbing for the integration tests: write the three input
//! tables into a tempdir and drive the pipeline the way the binary does.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use synweave::chainer::chain_mol_pair;
use synweave::emit;
use synweave::gene_index::GeneIndex;
use synweave::match_list::MatchSet;
use synweave::params::Parameters;
use synweave::pog::Weaver;
use synweave::segment::ChainStore;

pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub prefix: PathBuf,
}

pub fn fixture(bed: &str, mcl: &str, blast: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("test");
    std::fs::write(prefix.with_extension("bed"), bed).unwrap();
    std::fs::write(prefix.with_extension("mcl"), mcl).unwrap();
    std::fs::write(prefix.with_extension("blast"), blast).unwrap();
    Fixture { dir, prefix }
}

pub fn load(prefix: &Path, params: &Parameters) -> (GeneIndex, MatchSet) {
    let mut genes = GeneIndex::from_bed(&prefix.with_extension("bed"), params.use_bp).unwrap();
    genes.load_families(&prefix.with_extension("mcl")).unwrap();
    let matches = MatchSet::from_blast(&prefix.with_extension("blast"), &genes, true).unwrap();
    (genes, matches)
}

pub fn chain_all(genes: &GeneIndex, matches: &MatchSet, params: &Parameters) -> ChainStore {
    let mut store = ChainStore::default();
    for (mol_pair, &count) in &matches.mol_pairs {
        if count >= params.match_size {
            chain_mol_pair(mol_pair, genes, matches, params, &mut store);
        }
    }
    store
}

/// Run the whole pipeline in memory, returning the `.aligns` and `.blocks`
/// contents.
pub fn run_pipeline(prefix: &Path, params: &Parameters) -> (String, String) {
    let (genes, matches) = load(prefix, params);
    let store = chain_all(&genes, &matches, params);

    let mut aligns = Vec::new();
    emit::print_align(&mut aligns, &store, &genes, &matches, params).unwrap();

    let mut blocks = Vec::new();
    emit::print_params(&mut blocks, params).unwrap();
    let weaver = Weaver::new(&genes, &store, params);
    let chromosomes: Vec<String> = genes
        .clustered_chromosomes()
        .map(|(c, _)| c.to_string())
        .collect();
    let mut block = 0usize;
    for chrom in &chromosomes {
        if let Some(view) = weaver.weave(chrom) {
            emit::print_block_view(&mut blocks, &view, &genes, block).unwrap();
            block += 1;
        }
    }

    (
        String::from_utf8(aligns).unwrap(),
        String::from_utf8(blocks).unwrap(),
    )
}

/// Six genes per chromosome, one match per family, perfectly colinear.
pub fn minimal_identity_inputs() -> (String, String, String) {
    let mut bed = String::new();
    let mut mcl = String::new();
    let mut blast = String::new();
    for i in 0..6 {
        bed.push_str(&format!("Aa1 {} {} a{}\n", i * 100, i * 100 + 50, i));
        bed.push_str(&format!("Bb1 {} {} b{}\n", i * 100, i * 100 + 50, i));
        mcl.push_str(&format!("a{i} b{i}\n"));
        blast.push_str(&format!("a{i} b{i} 1e-50\n"));
    }
    (bed, mcl, blast)
}
