use std::collections::BTreeMap;

use crate::gene_index::{GeneId, GeneIndex};

/// A maximal colinear chain of anchors between two chromosomes.
///
/// `s1..t1` are the extreme endpoints on the first chromosome of the pair
/// (ascending by position); `s2..t2` are the endpoints on the second, with
/// `s2 <= t2` exactly when `same_strand`.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Anchor pair ids, in chain order (ascending x).
    pub pids: Vec<u32>,
    pub s1: GeneId,
    pub t1: GeneId,
    pub s2: GeneId,
    pub t2: GeneId,
    pub score: i64,
    pub e_value: f64,
    pub mol_pair: String,
    pub same_strand: bool,
}

/// Append-only store of accepted segments, with a per-chromosome index of
/// the segments that touch each chromosome. Read-only once chaining ends.
#[derive(Default)]
pub struct ChainStore {
    pub segments: Vec<Segment>,
    by_chrom: BTreeMap<String, Vec<usize>>,
}

impl ChainStore {
    pub fn push(&mut self, genes: &GeneIndex, segment: Segment) {
        let idx = self.segments.len();
        let c1 = &genes.gene(segment.s1).chrom;
        let c2 = &genes.gene(segment.s2).chrom;
        self.by_chrom.entry(c1.clone()).or_default().push(idx);
        if c2 != c1 {
            self.by_chrom.entry(c2.clone()).or_default().push(idx);
        }
        self.segments.push(segment);
    }

    /// Indices of segments with an endpoint on `chrom`, in discovery order.
    pub fn on_chromosome(&self, chrom: &str) -> &[usize] {
        self.by_chrom.get(chrom).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
