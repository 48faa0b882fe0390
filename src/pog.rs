//! Partial-order-graph weaving of pairwise chains into multi-genome blocks.
//!
//! For each reference chromosome the spine is its gene order with
//! consecutive same-family runs (tandem arrays) collapsed to one node. Every
//! chain touching the chromosome is then re-aligned against the current
//! spine by dynamic programming over graph paths, best-scoring chain first,
//! and its partner nodes are spliced in as a parallel branch. Parallel
//! branches from different chains end up in separate layout columns.

use std::collections::BTreeSet;

use log::debug;

use crate::gene_index::{Gene, GeneId, GeneIndex};
use crate::layout;
use crate::params::Parameters;
use crate::segment::ChainStore;

/// Index into [`PogArena::nodes`].
pub type NodeId = usize;

/// A vertex of the partial-order graph.
///
/// Spine nodes carry `master_genes` (a tandem run from the reference);
/// fusion-inserted nodes carry their genes in `genes` instead and point back
/// at the region that contributed them. No node is both.
pub struct PogNode {
    pub family: i64,
    pub master_genes: BTreeSet<GeneId>,
    pub genes: BTreeSet<GeneId>,
    /// Aligned partner nodes whose genes render under this spine position.
    pub fusion: BTreeSet<NodeId>,
    pub next: BTreeSet<NodeId>,
    pub region: Option<usize>,
    mark: u32,
}

/// Arena owning every node built for one reference chromosome, dropped
/// wholesale when that chromosome is done. The `mark`/`epoch` pair replaces
/// a per-DFS visited reset: a node is visited when its mark equals the
/// current query epoch.
pub struct PogArena {
    pub nodes: Vec<PogNode>,
    epoch: u32,
}

impl PogArena {
    pub fn new() -> Self {
        PogArena { nodes: Vec::new(), epoch: 0 }
    }

    pub fn node(&self, id: NodeId) -> &PogNode {
        &self.nodes[id]
    }

    fn alloc(&mut self, family: i64) -> NodeId {
        self.nodes.push(PogNode {
            family,
            master_genes: BTreeSet::new(),
            genes: BTreeSet::new(),
            fusion: BTreeSet::new(),
            next: BTreeSet::new(),
            region: None,
            mark: 0,
        });
        self.nodes.len() - 1
    }

    /// Best gap-penalized path score from `src` to `target` along `next`
    /// edges: `match_score` plus `gap_score` per intervening node. The first
    /// edge is adjacency, not a gap, so two neighboring matches cost nothing
    /// extra, mirroring the chainer's gap count. Returns None when no path
    /// survives the pruning (paths at or below `-match_score` count as
    /// unreachable, which also bounds the search depth).
    pub fn graph_distance(
        &mut self,
        src: NodeId,
        target: NodeId,
        match_score: i64,
        gap_score: i64,
    ) -> Option<i64> {
        self.epoch += 1;
        let mut best = -match_score;
        self.dfs(src, target, match_score - gap_score, gap_score, &mut best);
        (best != -match_score).then_some(best)
    }

    fn dfs(&mut self, src: NodeId, target: NodeId, score: i64, gap_score: i64, best: &mut i64) {
        if score <= *best {
            return;
        }
        if src == target {
            *best = score;
            return;
        }
        let succ: Vec<NodeId> = self.nodes[src].next.iter().copied().collect();
        for s in succ {
            if self.nodes[s].mark == self.epoch {
                continue;
            }
            self.nodes[s].mark = self.epoch;
            self.dfs(s, target, score + gap_score, gap_score, best);
        }
    }
}

impl Default for PogArena {
    fn default() -> Self {
        Self::new()
    }
}

/// A chain's claim on one reference chromosome: which segment, which of its
/// two sides lies on the reference, the re-alignment score, and the layout
/// column assigned at the end.
pub struct SynRegion {
    pub seg: usize,
    pub match1: bool,
    pub score: i64,
    pub col: Option<usize>,
}

/// Start or end marker of a fused region, anchored at a spine node.
pub struct EndPoint {
    pub region: usize,
    pub start: bool,
    pub node: NodeId,
    pub ref_index: usize,
}

/// The fused graph for one reference chromosome, ready for block output.
pub struct WovenView {
    pub pivot: String,
    pub arena: PogArena,
    pub spine: Vec<NodeId>,
    pub regions: Vec<SynRegion>,
    pub cols: usize,
}

/// Whether a chromosome-pair key compares a genome with itself, judged by
/// the two-letter genome prefix convention (e.g. `Vv1&Vv14`).
fn self_genome_pair(mol_pair: &str) -> bool {
    match mol_pair.split_once('&') {
        Some((a, b)) => a.get(..2) == b.get(..2),
        None => false,
    }
}

struct DpCell {
    s: NodeId,
    t: NodeId,
    from: Option<usize>,
    score: i64,
}

pub struct Weaver<'a> {
    genes: &'a GeneIndex,
    store: &'a ChainStore,
    params: &'a Parameters,
}

impl<'a> Weaver<'a> {
    pub fn new(genes: &'a GeneIndex, store: &'a ChainStore, params: &'a Parameters) -> Self {
        Weaver { genes, store, params }
    }

    /// Weave every qualifying chain into the spine of `chrom`. Returns None
    /// when the chromosome is excluded by the pivot prefix or has fewer than
    /// MATCH_SIZE clustered genes.
    pub fn weave(&self, chrom: &str) -> Option<WovenView> {
        if self.params.pivot != "ALL" && !chrom.contains(&self.params.pivot) {
            return None;
        }
        let clustered = self.genes.clustered_on(chrom)?;
        if clustered.len() < self.params.match_size {
            return None;
        }

        let mut arena = PogArena::new();
        let mut spine = self.tandem_collapse(&mut arena, clustered.iter().copied());
        link(&mut arena, &spine);
        eprintln!(
            "[synweave] pivot {chrom} contains {} tandem clusters",
            spine.len()
        );

        // every segment side that lies on this chromosome is a candidate
        // region, fused in score order
        let mut regions: Vec<SynRegion> = Vec::new();
        for &si in self.store.on_chromosome(chrom) {
            let s = &self.store.segments[si];
            if self.genes.gene(s.s1).chrom == chrom {
                regions.push(SynRegion { seg: si, match1: true, score: 0, col: None });
            }
            if self.genes.gene(s.s2).chrom == chrom {
                regions.push(SynRegion { seg: si, match1: false, score: 0, col: None });
            }
        }
        regions.sort_by(|a, b| {
            self.store.segments[b.seg]
                .score
                .cmp(&self.store.segments[a.seg].score)
        });

        let mut endpoints: Vec<EndPoint> = Vec::new();
        for r in 0..regions.len() {
            self.fuse_region(&mut arena, &mut spine, &mut regions, r, &mut endpoints);
        }

        let cols = layout::assign_columns(&spine, &mut endpoints, &mut regions);
        Some(WovenView { pivot: chrom.to_string(), arena, spine, regions, cols })
    }

    /// Merge a chromosome's clustered genes into tandem-collapsed nodes, in
    /// genome order. The returned order is not linked yet.
    fn tandem_collapse(
        &self,
        arena: &mut PogArena,
        genes: impl Iterator<Item = GeneId>,
    ) -> Vec<NodeId> {
        let mut order: Vec<NodeId> = Vec::new();
        for g in genes {
            let family = self.genes.gene(g).family;
            let cur = match order.last() {
                Some(&id) if arena.node(id).family == family => id,
                _ => {
                    let id = arena.alloc(family);
                    order.push(id);
                    id
                }
            };
            arena.nodes[cur].master_genes.insert(g);
        }
        order
    }

    /// Re-align one region against the current spine and splice it in.
    fn fuse_region(
        &self,
        arena: &mut PogArena,
        spine: &mut Vec<NodeId>,
        regions: &mut [SynRegion],
        r: usize,
        endpoints: &mut Vec<EndPoint>,
    ) {
        let seg = &self.store.segments[regions[r].seg];
        if self.params.in_synteny && self_genome_pair(&seg.mol_pair) {
            return;
        }
        debug!("fusing chain of score {} ({})", seg.score, seg.mol_pair);

        // reference-side range [a,b] and partner-side range [c,d], each
        // normalized to genome order; id order is genome order
        let (a, b, c, d) = if regions[r].match1 {
            (seg.s1, seg.t1, seg.s2, seg.t2)
        } else {
            (seg.s2, seg.t2, seg.s1, seg.t1)
        };
        let (a, b) = (a.min(b), a.max(b));
        let (c, d) = (c.min(d), c.max(d));

        let master = slice_between(arena, spine, self.genes.gene(a), self.genes.gene(b));
        if master.is_empty() {
            debug!("reference range {}..{} not on the spine, skipped",
                self.genes.gene(a).name, self.genes.gene(b).name);
            return;
        }

        let partner_chrom = &self.genes.gene(c).chrom;
        let Some(partner_set) = self.genes.clustered_on(partner_chrom) else {
            return;
        };
        let partner_full = self.tandem_collapse(arena, partner_set.iter().copied());
        let mut slave = slice_between(arena, &partner_full, self.genes.gene(c), self.genes.gene(d));
        if slave.is_empty() {
            return;
        }
        if !seg.same_strand {
            slave.reverse();
        }
        link(arena, &slave);
        // partner nodes carry their genes as non-masters and initially fuse
        // with themselves
        for &n in &slave {
            let node = &mut arena.nodes[n];
            node.genes = std::mem::take(&mut node.master_genes);
            node.fusion.insert(n);
            node.region = Some(r);
        }
        debug!(
            "aligning {} master against {} partner nodes",
            master.len(),
            slave.len()
        );

        self.align_and_splice(arena, spine, &master, &slave, regions, r, endpoints);
    }

    /// Sparse DP over (master, partner) family matches, with graph DFS
    /// distances as edge costs, then traceback and splice.
    fn align_and_splice(
        &self,
        arena: &mut PogArena,
        spine: &mut Vec<NodeId>,
        master: &[NodeId],
        slave: &[NodeId],
        regions: &mut [SynRegion],
        r: usize,
        endpoints: &mut Vec<EndPoint>,
    ) {
        let k = self.params.match_score;
        let g = self.params.gap_score;

        let mut v: Vec<DpCell> = Vec::new();
        for &m in master {
            for &t in slave {
                if arena.node(m).family == arena.node(t).family {
                    v.push(DpCell { s: m, t, from: None, score: k });
                }
            }
        }

        for aa in 0..v.len() {
            for bb in aa + 1..v.len() {
                if v[aa].s == v[bb].s || v[aa].t == v[bb].t {
                    continue;
                }
                let Some(del_x) = arena.graph_distance(v[aa].s, v[bb].s, k, g) else {
                    // matches are in master order; later targets are no
                    // closer
                    break;
                };
                let Some(del_y) = arena.graph_distance(v[aa].t, v[bb].t, k, g) else {
                    continue;
                };
                let del = v[aa].score + del_x.min(del_y);
                if del > v[bb].score {
                    v[bb].score = del;
                    v[bb].from = Some(aa);
                }
            }
        }

        // first maximum wins
        let mut best: Option<usize> = None;
        for (i, cell) in v.iter().enumerate() {
            if best.map_or(true, |b| cell.score > v[b].score) {
                best = Some(i);
            }
        }
        let Some(best) = best else { return };
        debug!("best pog path score {}", v[best].score);
        if v[best].score < self.params.cutoff_score {
            return;
        }
        regions[r].score = v[best].score;

        let mut track: Vec<usize> = Vec::new();
        let mut cur = Some(best);
        while let Some(i) = cur {
            track.push(i);
            cur = v[i].from;
        }
        track.reverse();

        for w in track.windows(2) {
            let (a, b) = (&v[w[0]], &v[w[1]]);
            let is = index_of(spine, a.s) + 1;
            let it = index_of(slave, a.t) + 1;
            let iy = index_of(slave, b.t);
            let inserted: Vec<NodeId> = slave[it..iy].to_vec();

            // splice the partner subpath strictly between the two aligned
            // partner nodes right after the earlier master node
            spine.splice(is..is, inserted.iter().copied());
            arena.nodes[a.s].fusion.insert(a.t);
            arena.nodes[b.s].fusion.insert(b.t);

            if let (Some(&first), Some(&last)) = (inserted.first(), inserted.last()) {
                arena.nodes[a.s].next.insert(first);
                arena.nodes[last].next.clear();
                arena.nodes[last].next.insert(b.s);
            } else {
                arena.nodes[a.s].next.insert(b.s);
            }
        }

        endpoints.push(EndPoint { region: r, start: true, node: v[track[0]].s, ref_index: 0 });
        endpoints.push(EndPoint {
            region: r,
            start: false,
            node: v[track[track.len() - 1]].s,
            ref_index: 0,
        });
    }
}

/// Populate the forward edges of a linear node order.
fn link(arena: &mut PogArena, order: &[NodeId]) {
    for w in order.windows(2) {
        arena.nodes[w[0]].next.insert(w[1]);
    }
}

/// The sub-order from the node whose masters contain `a` through the node
/// containing `b`, inclusive, in current order — including any non-master
/// nodes sitting in between. Empty when `a` is not found; runs to the end
/// when `b` is not.
fn slice_between(arena: &PogArena, order: &[NodeId], a: &Gene, b: &Gene) -> Vec<NodeId> {
    let holds = |id: NodeId, gene: &Gene| {
        let n = arena.node(id);
        n.family == gene.family && n.master_genes.contains(&gene.id)
    };
    let mut out = Vec::new();
    let mut iter = order.iter().copied().skip_while(|&id| !holds(id, a));
    for id in iter.by_ref() {
        out.push(id);
        if holds(id, b) {
            break;
        }
    }
    out
}

fn index_of(order: &[NodeId], id: NodeId) -> usize {
    order
        .iter()
        .position(|&n| n == id)
        .expect("aligned node missing from its order")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_genome_detection() {
        assert!(self_genome_pair("Vv1&Vv14"));
        assert!(self_genome_pair("Aa1&Aa1"));
        assert!(!self_genome_pair("Aa1&Bb1"));
    }

    fn linear_arena(n: usize) -> (PogArena, Vec<NodeId>) {
        let mut arena = PogArena::new();
        let order: Vec<NodeId> = (0..n).map(|i| arena.alloc(i as i64)).collect();
        link(&mut arena, &order);
        (arena, order)
    }

    #[test]
    fn adjacent_nodes_cost_no_gap() {
        let (mut arena, order) = linear_arena(4);
        assert_eq!(arena.graph_distance(order[0], order[1], 50, -3), Some(50));
    }

    #[test]
    fn intervening_nodes_cost_gaps() {
        let (mut arena, order) = linear_arena(4);
        assert_eq!(arena.graph_distance(order[0], order[2], 50, -3), Some(47));
        assert_eq!(arena.graph_distance(order[0], order[3], 50, -3), Some(44));
    }

    #[test]
    fn backward_targets_are_unreachable() {
        let (mut arena, order) = linear_arena(4);
        assert_eq!(arena.graph_distance(order[2], order[0], 50, -3), None);
    }

    #[test]
    fn queries_are_independent() {
        // the epoch bump replaces a visited reset between queries
        let (mut arena, order) = linear_arena(5);
        assert!(arena.graph_distance(order[0], order[4], 50, -3).is_some());
        assert_eq!(arena.graph_distance(order[1], order[2], 50, -3), Some(50));
    }
}
