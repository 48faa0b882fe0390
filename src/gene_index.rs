use anyhow::Result;
use log::warn;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::BufRead;
use std::path::Path;

use crate::io_utils::open_input;

/// Index into [`GeneIndex::genes`]. Ids are assigned in `(chromosome,
/// position)` sort order, so comparing two ids on the same chromosome
/// compares their genome positions.
pub type GeneId = u32;

#[derive(Debug, Clone)]
pub struct Gene {
    pub name: String,
    pub chrom: String,
    /// Zero-based rank within the chromosome, or the bp start in bp mode.
    pub position: i64,
    /// Family id from the cluster table; genes absent from it carry a
    /// sentinel (`-id - 1`) that never equals another gene's family.
    pub family: i64,
    pub id: GeneId,
}

/// All genes from the coordinate table, plus the per-chromosome sets of
/// family-clustered genes used by the block weaver. Read-only after load.
pub struct GeneIndex {
    genes: Vec<Gene>,
    by_name: HashMap<String, GeneId>,
    clustered: BTreeMap<String, BTreeSet<GeneId>>,
    family_count: usize,
}

impl GeneIndex {
    /// Load the coordinate table: whitespace-separated
    /// `chrom start end name` rows in any order. Rows are sorted by
    /// `(chrom, start, name)`; in rank mode each gene's position becomes its
    /// zero-based rank within its chromosome. A malformed row stops parsing
    /// at that row; everything before it is kept.
    pub fn from_bed(path: &Path, use_bp: bool) -> Result<Self> {
        let reader = open_input(path)?;
        let mut rows: Vec<(String, i64, String)> = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace();
            let parsed = (|| {
                let chrom = fields.next()?;
                let start: i64 = fields.next()?.parse().ok()?;
                let _end: i64 = fields.next()?.parse().ok()?;
                let name = fields.next()?;
                Some((chrom.to_string(), start, name.to_string()))
            })();
            match parsed {
                Some(row) => rows.push(row),
                None => {
                    warn!("malformed row in {}, stopping there", path.display());
                    break;
                }
            }
        }

        rows.sort_by(|a, b| (&a.0, a.1, &a.2).cmp(&(&b.0, b.1, &b.2)));

        let mut genes = Vec::with_capacity(rows.len());
        let mut by_name = HashMap::with_capacity(rows.len());
        let mut rank = 0i64;
        let mut prev_chrom: Option<&str> = None;
        for (chrom, start, name) in &rows {
            if prev_chrom != Some(chrom.as_str()) {
                rank = 0;
            }
            let id = genes.len() as GeneId;
            genes.push(Gene {
                name: name.clone(),
                chrom: chrom.clone(),
                position: if use_bp { *start } else { rank },
                family: -(id as i64) - 1,
                id,
            });
            by_name.insert(name.clone(), id); // duplicate names: last row wins
            rank += 1;
            prev_chrom = Some(chrom.as_str());
        }

        Ok(GeneIndex {
            genes,
            by_name,
            clustered: BTreeMap::new(),
            family_count: 0,
        })
    }

    /// Load the family-cluster table: one whitespace-separated cluster per
    /// line, the zero-based line index being the family id. Unknown names are
    /// skipped; a gene named on several lines keeps the last family id.
    /// Clustered genes are entered into their chromosome's ordered set.
    pub fn load_families(&mut self, path: &Path) -> Result<usize> {
        let reader = open_input(path)?;
        let mut families = 0usize;

        for (family, line) in reader.lines().enumerate() {
            let line = line?;
            for name in line.split_whitespace() {
                if let Some(&id) = self.by_name.get(name) {
                    let gene = &mut self.genes[id as usize];
                    gene.family = family as i64;
                    if !gene.chrom.is_empty() {
                        self.clustered
                            .entry(gene.chrom.clone())
                            .or_default()
                            .insert(id);
                    }
                }
            }
            families = family + 1;
        }

        self.family_count = families;
        Ok(families)
    }

    pub fn find(&self, name: &str) -> Option<&Gene> {
        self.by_name.get(name).map(|&id| &self.genes[id as usize])
    }

    pub fn gene(&self, id: GeneId) -> &Gene {
        &self.genes[id as usize]
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn family_count(&self) -> usize {
        self.family_count
    }

    /// Family-clustered genes of one chromosome, in genome order.
    pub fn clustered_on(&self, chrom: &str) -> Option<&BTreeSet<GeneId>> {
        self.clustered.get(chrom)
    }

    /// Chromosomes holding clustered genes, in lexical order.
    pub fn clustered_chromosomes(&self) -> impl Iterator<Item = (&str, &BTreeSet<GeneId>)> {
        self.clustered.iter().map(|(c, s)| (c.as_str(), s))
    }
}
