use anyhow::Result;
use log::warn;
use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;

use crate::gene_index::{GeneId, GeneIndex};

/// A normalized homology hit between two genes on known chromosomes.
/// `gene1` is always the lexically smaller name.
#[derive(Debug, Clone)]
pub struct Match {
    pub gene1: GeneId,
    pub gene2: GeneId,
    pub family: i64,
    /// Chromosome-pair key `chrA&chrB`, in normalized gene order.
    pub mol_pair: String,
    /// Stable id; equals this match's index in [`MatchSet::matches`].
    pub pair_id: u32,
    /// E-value-like similarity score, smaller is stronger.
    pub score: f64,
}

/// All accepted matches plus the per-chromosome-pair tally. The BTreeMap
/// keys give the lexical pair order the chainer walks, which fixes the
/// segment emission order.
pub struct MatchSet {
    pub matches: Vec<Match>,
    pub mol_pairs: BTreeMap<String, usize>,
}

impl MatchSet {
    /// Load `geneA geneB score` triples. Self hits, unknown genes, and
    /// (when `require_family` is set) family-mismatched pairs are dropped
    /// silently. A malformed row stops parsing at that row.
    pub fn from_blast(path: &Path, genes: &GeneIndex, require_family: bool) -> Result<Self> {
        let reader = crate::io_utils::open_input(path)?;
        let mut matches: Vec<Match> = Vec::new();
        let mut mol_pairs: BTreeMap<String, usize> = BTreeMap::new();
        let mut total = 0usize;

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace();
            let parsed = (|| {
                let a = fields.next()?;
                let b = fields.next()?;
                let score: f64 = fields.next()?.parse().ok()?;
                Some((a, b, score))
            })();
            let Some((a, b, score)) = parsed else {
                warn!("malformed row in {}, stopping there", path.display());
                break;
            };

            total += 1;
            let (n1, n2) = match a.cmp(b) {
                std::cmp::Ordering::Less => (a, b),
                std::cmp::Ordering::Greater => (b, a),
                std::cmp::Ordering::Equal => continue, // self hit
            };
            let (Some(g1), Some(g2)) = (genes.find(n1), genes.find(n2)) else {
                continue;
            };
            if g1.chrom.is_empty() || g2.chrom.is_empty() {
                continue;
            }
            if require_family && g1.family != g2.family {
                continue;
            }

            let mol_pair = format!("{}&{}", g1.chrom, g2.chrom);
            *mol_pairs.entry(mol_pair.clone()).or_insert(0) += 1;
            matches.push(Match {
                gene1: g1.id,
                gene2: g2.id,
                family: g1.family,
                mol_pair,
                pair_id: matches.len() as u32,
                score,
            });
        }

        eprintln!(
            "[synweave] {} matches imported ({} discarded)",
            matches.len(),
            total - matches.len()
        );

        Ok(MatchSet { matches, mol_pairs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gene_index::GeneIndex;
    use std::io::Write;

    fn write_tmp(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    fn fixture() -> GeneIndex {
        let bed = write_tmp("Aa1 0 1 a1\nAa1 10 11 a2\nBb1 0 1 b1\nBb1 10 11 b2\n");
        let mcl = write_tmp("a1 b1\na2\nb2\n");
        let mut idx = GeneIndex::from_bed(bed.path(), false).unwrap();
        idx.load_families(mcl.path()).unwrap();
        idx
    }

    #[test]
    fn normalizes_and_filters() {
        let genes = fixture();
        let blast = write_tmp(
            "b1 a1 1e-50\n\
             a1 a1 1e-99\n\
             a1 ghost 1e-10\n\
             a2 b2 1e-20\n",
        );
        let set = MatchSet::from_blast(blast.path(), &genes, true).unwrap();

        // self hit, unknown gene, and family mismatch (a2: family 1, b2: family 2) dropped
        assert_eq!(set.matches.len(), 1);
        let m = &set.matches[0];
        assert_eq!(genes.gene(m.gene1).name, "a1"); // swapped into lexical order
        assert_eq!(m.mol_pair, "Aa1&Bb1");
        assert_eq!(set.mol_pairs["Aa1&Bb1"], 1);
    }

    #[test]
    fn pairwise_mode_waives_family_gate() {
        let genes = fixture();
        let blast = write_tmp("a2 b2 1e-20\n");
        let set = MatchSet::from_blast(blast.path(), &genes, false).unwrap();
        assert_eq!(set.matches.len(), 1);
    }

    #[test]
    fn pair_ids_are_indices() {
        let genes = fixture();
        let blast = write_tmp("a1 b1 1e-50\na1 b1 1e-40\n");
        let set = MatchSet::from_blast(blast.path(), &genes, true).unwrap();
        for (i, m) in set.matches.iter().enumerate() {
            assert_eq!(m.pair_id as usize, i);
        }
    }
}
