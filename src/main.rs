use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use synweave::chainer;
use synweave::emit;
use synweave::gene_index::GeneIndex;
use synweave::match_list::MatchSet;
use synweave::params::Parameters;
use synweave::pog::Weaver;
use synweave::segment::ChainStore;

/// synweave - multiple collinearity scan
///
/// Detects syntenic chains of homologous genes between chromosome pairs,
/// then weaves the chains covering each reference chromosome into a
/// partial-order alignment of parallel blocks. Reads <prefix>.bed,
/// <prefix>.mcl and <prefix>.blast; writes <prefix>.aligns and
/// <prefix>.blocks.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Input file prefix: reads <prefix>.bed, <prefix>.mcl, <prefix>.blast (each optionally gzipped)
    #[clap(value_name = "PREFIX")]
    prefix: String,

    // ============================================================================
    // Scoring
    // ============================================================================
    /// Per-anchor bonus; a chain scores MATCH_SCORE per anchor plus gap penalties
    #[clap(short = 'k', long = "match-score", default_value = "50", help_heading = "Scoring")]
    match_score: i64,

    /// Number of anchors required to call a syntenic chain
    #[clap(short = 's', long = "match-size", default_value = "6", help_heading = "Scoring")]
    match_size: usize,

    /// Penalty per UNIT_DIST of unanchored distance between consecutive anchors
    #[clap(
        short = 'g',
        long = "gap-score",
        default_value = "-3",
        allow_hyphen_values = true,
        help_heading = "Scoring"
    )]
    gap_score: i64,

    /// Alignment significance ceiling (reported in the banner)
    #[clap(short = 'e', long = "e-value", default_value = "1e-5", help_heading = "Scoring")]
    e_value: f64,

    /// Average intergenic distance; defaults to 2 in rank mode, 10000 with --use-bp
    #[clap(short = 'u', long = "unit-dist", help_heading = "Scoring")]
    unit_dist: Option<i64>,

    /// Use base-pair positions from the coordinate table instead of gene ranks
    #[clap(short = 'A', long = "use-bp", help_heading = "Scoring")]
    use_bp: bool,

    // ============================================================================
    // Block weaving
    // ============================================================================
    /// Reference chromosome label prefix; everything else is aligned against it
    #[clap(short = 'p', long = "pivot", default_value = "ALL", help_heading = "Block weaving")]
    pivot: String,

    /// Only build the pairwise .aligns file (skips the .mcl input and the .blocks output)
    #[clap(short = 'a', long = "pairwise", help_heading = "Block weaving")]
    pairwise: bool,

    /// Skip within-genome chromosome pairs when weaving blocks
    #[clap(short = 'b', long = "in-synteny", help_heading = "Block weaving")]
    in_synteny: bool,

    /// Write chained anchors as gene1<TAB>gene2<TAB>score triples for re-clustering (implies --pairwise)
    #[clap(short = 'c', long = "mcl-pairs", help_heading = "Block weaving")]
    mcl_pairs: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let pairwise = args.pairwise || args.mcl_pairs;

    let params = Parameters::new(
        args.match_score,
        args.match_size,
        args.gap_score,
        args.e_value,
        args.pivot.clone(),
        args.unit_dist,
        args.use_bp,
        args.in_synteny,
    );

    let mut genes = GeneIndex::from_bed(&PathBuf::from(format!("{}.bed", args.prefix)), params.use_bp)?;
    if !pairwise {
        genes.load_families(&PathBuf::from(format!("{}.mcl", args.prefix)))?;
    }
    let matches = MatchSet::from_blast(
        &PathBuf::from(format!("{}.blast", args.prefix)),
        &genes,
        !pairwise,
    )?;

    eprintln!(
        "[synweave] {} pairwise chromosome comparisons",
        matches.mol_pairs.len()
    );
    let mut store = ChainStore::default();
    for (mol_pair, &count) in &matches.mol_pairs {
        if count >= params.match_size {
            chainer::chain_mol_pair(mol_pair, &genes, &matches, &params, &mut store);
        }
    }
    eprintln!("[synweave] {} alignments generated", store.len());

    let align_fn = format!("{}.aligns", args.prefix);
    let mut fw = BufWriter::new(
        File::create(&align_fn).with_context(|| format!("cannot write {align_fn}"))?,
    );
    if args.mcl_pairs {
        emit::print_align_mcl(&mut fw, &store, &genes, &matches)?;
    } else {
        emit::print_align(&mut fw, &store, &genes, &matches, &params)?;
    }
    fw.flush()?;
    eprintln!("[synweave] pairwise synteny written to {align_fn}");

    if pairwise {
        return Ok(());
    }

    let block_fn = format!("{}.blocks", args.prefix);
    let mut fw = BufWriter::new(
        File::create(&block_fn).with_context(|| format!("cannot write {block_fn}"))?,
    );
    emit::print_params(&mut fw, &params)?;

    let weaver = Weaver::new(&genes, &store, &params);
    let mut block = 0usize;
    let chromosomes: Vec<String> = genes
        .clustered_chromosomes()
        .map(|(c, _)| c.to_string())
        .collect();
    for chrom in &chromosomes {
        if let Some(view) = weaver.weave(chrom) {
            emit::print_block_view(&mut fw, &view, &genes, block)?;
            block += 1;
        }
    }
    fw.flush()?;
    eprintln!("[synweave] multiple synteny written to {block_fn}");

    Ok(())
}
