use ordered_float::OrderedFloat;

/// One anchor in the chaining plane: positions of the two genes on their
/// respective chromosomes plus the match's similarity score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorePoint {
    pub pair_id: u32,
    pub x: i64,
    pub y: i64,
    pub score: f64,
}

/// Collapse locally repetitive anchors on both axes.
///
/// Tandem-duplicated genes produce stacks of near-identical hits that would
/// otherwise seed spurious chains. Each pass sorts by one axis, bins runs of
/// points that share the primary coordinate and sit within `window` of their
/// predecessor on the secondary axis, and keeps only the strongest
/// (smallest-score) point per bin. Running x then y removes both vertical
/// and horizontal stacks.
pub fn collapse_repeats(points: Vec<ScorePoint>, window: i64) -> Vec<ScorePoint> {
    let pass_x = collapse_axis(points, window, true);
    collapse_axis(pass_x, window, false)
}

fn collapse_axis(mut points: Vec<ScorePoint>, window: i64, x_primary: bool) -> Vec<ScorePoint> {
    if points.is_empty() {
        return points;
    }
    if x_primary {
        points.sort_by_key(|p| (p.x, p.y));
    } else {
        points.sort_by_key(|p| (p.y, p.x));
    }

    let axes = |p: &ScorePoint| if x_primary { (p.x, p.y) } else { (p.y, p.x) };

    let mut kept = Vec::with_capacity(points.len());
    let mut bin: Vec<ScorePoint> = vec![points[0]];
    for i in 1..points.len() {
        let (prev_prim, prev_sec) = axes(&points[i - 1]);
        let (prim, sec) = axes(&points[i]);
        // a bin continues only while the primary coordinate repeats and the
        // secondary coordinate stays within the linking window
        if prim != prev_prim || sec - prev_sec > window {
            if let Some(best) = best_of(&bin) {
                kept.push(best);
            }
            bin.clear();
        }
        bin.push(points[i]);
    }
    if let Some(best) = best_of(&bin) {
        kept.push(best);
    }
    kept
}

fn best_of(bin: &[ScorePoint]) -> Option<ScorePoint> {
    bin.iter().copied().min_by_key(|p| OrderedFloat(p.score))
}
