use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::pog::{EndPoint, NodeId, SynRegion};

/// Assign layout columns to the fused regions of one spine.
///
/// Endpoints are resolved to spine indices and swept left to right, starts
/// allocating the smallest free column (freed columns are recycled through a
/// min-heap) and ends releasing it. Two regions share a column only if their
/// spine ranges do not overlap; among simultaneous starts the higher-scoring
/// region takes the lower column. Returns the number of columns used.
pub fn assign_columns(
    spine: &[NodeId],
    endpoints: &mut [EndPoint],
    regions: &mut [SynRegion],
) -> usize {
    let index: HashMap<NodeId, usize> = spine.iter().enumerate().map(|(i, &n)| (n, i)).collect();
    for ep in endpoints.iter_mut() {
        ep.ref_index = index.get(&ep.node).copied().unwrap_or(0);
    }
    // starts sort before ends at the same node: regions meeting at one
    // shared spine index still count as overlapping and may not share a
    // column; among simultaneous starts the higher score wins the lower
    // column
    endpoints.sort_by(|a, b| {
        a.ref_index
            .cmp(&b.ref_index)
            .then_with(|| b.start.cmp(&a.start))
            .then_with(|| regions[b.region].score.cmp(&regions[a.region].score))
    });

    let mut pool: BinaryHeap<Reverse<usize>> = BinaryHeap::new();
    let mut cols = 0usize;
    for ep in endpoints.iter() {
        if ep.start {
            let col = match pool.pop() {
                Some(Reverse(c)) => c,
                None => {
                    cols += 1;
                    cols - 1
                }
            };
            regions[ep.region].col = Some(col);
        } else if let Some(col) = regions[ep.region].col {
            pool.push(Reverse(col));
        }
    }
    cols
}
