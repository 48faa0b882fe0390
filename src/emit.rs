use anyhow::Result;
use std::collections::BTreeSet;
use std::io::Write;

use crate::gene_index::{GeneId, GeneIndex};
use crate::match_list::MatchSet;
use crate::params::Parameters;
use crate::pog::WovenView;
use crate::segment::ChainStore;

/// C-style `%.<sig>g` formatting: scientific notation with a signed
/// two-digit exponent outside `[1e-4, 10^sig)`, fixed-point otherwise,
/// trailing zeros trimmed.
pub fn general(x: f64, sig: usize) -> String {
    let sig = sig.max(1);
    if x == 0.0 {
        return "0".to_string();
    }
    if !x.is_finite() {
        return format!("{x}");
    }
    // format first so mantissa rounding that bumps the exponent
    // (9.7 -> "1e+01" at one digit) is accounted for
    let sci = format!("{:.*e}", sig - 1, x);
    let Some((mantissa, exp_str)) = sci.split_once('e') else {
        return sci;
    };
    let Ok(exp) = exp_str.parse::<i32>() else {
        return sci;
    };

    if exp < -4 || exp >= sig as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeros(mantissa), sign, exp.abs())
    } else {
        let decimals = (sig as i32 - 1 - exp).max(0) as usize;
        trim_zeros(&format!("{:.*}", decimals, x))
    }
}

fn trim_zeros(s: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Parameter banner, written at the top of both output files.
pub fn print_params<W: Write>(w: &mut W, p: &Parameters) -> Result<()> {
    writeln!(w, "############### Parameters ###############")?;
    writeln!(w, "# MATCH_SCORE: {}", p.match_score)?;
    writeln!(w, "# MATCH_SIZE: {}", p.match_size)?;
    writeln!(w, "# UNIT_DIST: {}", p.unit_dist)?;
    writeln!(w, "# GAP_SCORE: {}", p.gap_score)?;
    writeln!(w, "# OVERLAP_WINDOW: {}", p.overlap_window)?;
    writeln!(w, "# EXTENSION_DIST: {}", p.extension_dist)?;
    writeln!(w, "# E_VALUE: {}", general(p.e_value, 6))?;
    writeln!(w, "# PIVOT: {}", p.pivot)?;
    writeln!(w, "##########################################")?;
    writeln!(w)?;
    Ok(())
}

/// Pairwise output: one header plus one line per anchor for every segment.
pub fn print_align<W: Write>(
    w: &mut W,
    store: &ChainStore,
    genes: &GeneIndex,
    matches: &MatchSet,
    params: &Parameters,
) -> Result<()> {
    print_params(w, params)?;
    for (i, s) in store.segments.iter().enumerate() {
        writeln!(
            w,
            "## Alignment {}: score={:.1} e_value={} N={} {} {}",
            i,
            s.score as f64,
            general(s.e_value, 2),
            s.pids.len(),
            s.mol_pair,
            if s.same_strand { "plus" } else { "minus" }
        )?;
        for (j, &pid) in s.pids.iter().enumerate() {
            let m = &matches.matches[pid as usize];
            writeln!(
                w,
                "{:3}-{:3}:\t{}\t{}\t{:>7}",
                i,
                j,
                genes.gene(m.gene1).name,
                genes.gene(m.gene2).name,
                general(m.score, 1)
            )?;
        }
    }
    Ok(())
}

/// Chained anchors as bare `gene1 gene2 score` triples, ready for a fresh
/// clustering round.
pub fn print_align_mcl<W: Write>(
    w: &mut W,
    store: &ChainStore,
    genes: &GeneIndex,
    matches: &MatchSet,
) -> Result<()> {
    for s in &store.segments {
        for &pid in &s.pids {
            let m = &matches.matches[pid as usize];
            writeln!(
                w,
                "{}\t{}\t{}",
                genes.gene(m.gene1).name,
                genes.gene(m.gene2).name,
                general(m.score, 1)
            )?;
        }
    }
    Ok(())
}

/// One multi-block view: a row per spine node with its master genes and one
/// cell per layout column, blank line at the end.
pub fn print_block_view<W: Write>(
    w: &mut W,
    view: &WovenView,
    genes: &GeneIndex,
    block: usize,
) -> Result<()> {
    writeln!(w, "## View {}: pivot {}", block, view.pivot)?;
    for (j, &id) in view.spine.iter().enumerate() {
        write!(w, "{:3}-{:4}:\t", block, j)?;
        write_gene_set(w, genes, &view.arena.node(id).master_genes)?;

        let mut row: Vec<Option<crate::pog::NodeId>> = vec![None; view.cols];
        for &child in &view.arena.node(id).fusion {
            if let Some(r) = view.arena.node(child).region {
                if let Some(col) = view.regions[r].col {
                    row[col] = Some(child);
                }
            }
        }
        for cell in row {
            write!(w, "\t")?;
            match cell {
                Some(c) => write_gene_set(w, genes, &view.arena.node(c).genes)?,
                None => write!(w, ".")?,
            }
        }
        writeln!(w)?;
    }
    writeln!(w)?;
    Ok(())
}

fn write_gene_set<W: Write>(w: &mut W, genes: &GeneIndex, set: &BTreeSet<GeneId>) -> Result<()> {
    if set.is_empty() {
        write!(w, ".")?;
        return Ok(());
    }
    for (i, &id) in set.iter().enumerate() {
        if i > 0 {
            write!(w, ";")?;
        }
        write!(w, "{}", genes.gene(id).name)?;
    }
    Ok(())
}
