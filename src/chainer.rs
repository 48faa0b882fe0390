use log::debug;

use crate::gene_index::GeneIndex;
use crate::match_list::MatchSet;
use crate::params::Parameters;
use crate::repeat_filter::{collapse_repeats, ScorePoint};
use crate::segment::{ChainStore, Segment};

/// Chain all anchors of one chromosome pair and append the surviving
/// segments to the store.
///
/// Anchors are the pair's matches plotted as `(x, y)` positions of the two
/// genes. After repeat collapse, chains are extracted best-first across both
/// orientations: re-run the sparse DP over the unmasked points, take the
/// single best endpoint, trace it back, mask its points, and stop once the
/// best chain drops below the cutoff. Best-first extraction gives the
/// score-descending segment order within each pair, and masking keeps every
/// pair id in at most one segment.
pub fn chain_mol_pair(
    mol_pair: &str,
    genes: &GeneIndex,
    matches: &MatchSet,
    params: &Parameters,
    store: &mut ChainStore,
) {
    let mut points: Vec<ScorePoint> = matches
        .matches
        .iter()
        .filter(|m| m.mol_pair == mol_pair)
        .map(|m| ScorePoint {
            pair_id: m.pair_id,
            x: genes.gene(m.gene1).position,
            y: genes.gene(m.gene2).position,
            score: m.score,
        })
        .collect();

    points = collapse_repeats(points, params.overlap_window);
    if points.is_empty() {
        return;
    }
    points.sort_by_key(|p| (p.x, p.y));
    let density = points.len();

    let mut used = vec![false; points.len()];
    loop {
        let plus = best_chain(&points, &used, params, false);
        let minus = best_chain(&points, &used, params, true);
        // a score tie goes to the plus orientation
        let (chain, minus_pass) = match (plus, minus) {
            (Some(p), Some(m)) => {
                if m.score > p.score {
                    (m, true)
                } else {
                    (p, false)
                }
            }
            (Some(p), None) => (p, false),
            (None, Some(m)) => (m, true),
            (None, None) => break,
        };
        if chain.score < params.cutoff_score {
            debug!(
                "{mol_pair}: best remaining chain scores {} (< {}), done",
                chain.score, params.cutoff_score
            );
            break;
        }

        for &i in &chain.indices {
            used[i] = true;
        }
        store.push(genes, build_segment(&chain, &points, density, mol_pair, matches, !minus_pass));
    }
}

struct Chain {
    /// Point indices in ascending x order.
    indices: Vec<usize>,
    score: i64,
}

/// One DP pass over the unmasked points for a single orientation, returning
/// the best chain, or None when no points remain.
///
/// For each point the best predecessor is any unmasked point strictly before
/// it on x and strictly before (plus) or after (minus) it on y, within the
/// extension radius on both axes. Endpoint ties break by earlier end-x, then
/// smaller y-span.
fn best_chain(points: &[ScorePoint], used: &[bool], params: &Parameters, minus: bool) -> Option<Chain> {
    let n = points.len();
    let mut score = vec![0i64; n];
    let mut from = vec![usize::MAX; n];

    let mut best: Option<usize> = None;
    for i in 0..n {
        if used[i] {
            continue;
        }
        let p = points[i];
        let mut s = params.match_score;
        let mut f = usize::MAX;
        for j in (0..i).rev() {
            if used[j] {
                continue;
            }
            let q = points[j];
            let dx = p.x - q.x;
            if dx > params.extension_dist {
                break; // sorted by x, nothing earlier can qualify
            }
            if dx <= 0 {
                continue;
            }
            let dy = if minus { q.y - p.y } else { p.y - q.y };
            if dy <= 0 || dy > params.extension_dist {
                continue;
            }
            let gaps = dx.max(dy) / params.unit_dist;
            let cand = score[j] + params.match_score + params.gap_score * gaps;
            if cand > s {
                s = cand;
                f = j;
            }
        }
        score[i] = s;
        from[i] = f;

        best = Some(match best {
            None => i,
            Some(b) if prefer_endpoint(points, &score, &from, i, b) => i,
            Some(b) => b,
        });
    }

    best.map(|e| {
        let indices = traceback(&from, e);
        Chain { score: score[e], indices }
    })
}

fn traceback(from: &[usize], endpoint: usize) -> Vec<usize> {
    let mut indices = vec![endpoint];
    let mut cur = endpoint;
    while from[cur] != usize::MAX {
        cur = from[cur];
        indices.push(cur);
    }
    indices.reverse();
    indices
}

fn prefer_endpoint(points: &[ScorePoint], score: &[i64], from: &[usize], i: usize, b: usize) -> bool {
    if score[i] != score[b] {
        return score[i] > score[b];
    }
    if points[i].x != points[b].x {
        return points[i].x < points[b].x;
    }
    let span = |e: usize| {
        let chain = traceback(from, e);
        (points[e].y - points[chain[0]].y).abs()
    };
    let (si, sb) = (span(i), span(b));
    if si != sb {
        return si < sb;
    }
    points[i].y < points[b].y
}

fn build_segment(
    chain: &Chain,
    points: &[ScorePoint],
    density: usize,
    mol_pair: &str,
    matches: &MatchSet,
    same_strand: bool,
) -> Segment {
    let pids: Vec<u32> = chain.indices.iter().map(|&i| points[i].pair_id).collect();
    let first = &matches.matches[pids[0] as usize];
    let last = &matches.matches[pids[pids.len() - 1] as usize];

    Segment {
        s1: first.gene1,
        t1: last.gene1,
        s2: first.gene2,
        t2: last.gene2,
        score: chain.score,
        e_value: chain_e_value(&chain.indices, points, density),
        mol_pair: mol_pair.to_string(),
        same_strand,
        pids,
    }
}

/// Significance estimate for a chain: the product of its anchor scores with
/// a density correction of `m^(n-1)` for the `m` candidate anchors of the
/// pair. Computed in log space; reported as-is, no semantics attached.
fn chain_e_value(indices: &[usize], points: &[ScorePoint], density: usize) -> f64 {
    let mut ln = 0.0f64;
    for &i in indices {
        ln += points[i].score.max(1e-250).ln();
    }
    ln += (indices.len().saturating_sub(1)) as f64 * (density.max(1) as f64).ln();
    ln.exp()
}
