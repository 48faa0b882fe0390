/// Scoring and weaving parameters.
///
/// Holds the user-facing knobs plus the three derived constants
/// (`overlap_window`, `extension_dist`, `cutoff_score`), which are fixed at
/// construction so every component sees the same values.
#[derive(Debug, Clone)]
pub struct Parameters {
    /// Per-anchor bonus; a chain scores MATCH_SCORE per anchor plus gap penalties.
    pub match_score: i64,
    /// Minimum anchors per chain, and minimum clustered genes per pivot chromosome.
    pub match_size: usize,
    /// Penalty per UNIT_DIST of unanchored distance between consecutive anchors.
    pub gap_score: i64,
    /// Significance ceiling, reported in the output banner.
    pub e_value: f64,
    /// Reference-chromosome label prefix for the block phase; "ALL" weaves every chromosome.
    pub pivot: String,
    /// Distance unit for gap cost: gene ranks (2) or base pairs (10000).
    pub unit_dist: i64,
    /// Positions are bp midpoints from the coordinate table rather than gene ranks.
    pub use_bp: bool,
    /// Skip within-genome chromosome pairs during block weaving.
    pub in_synteny: bool,

    // Derived at construction.
    pub overlap_window: i64,
    pub extension_dist: i64,
    pub cutoff_score: i64,
}

impl Parameters {
    /// `unit_dist = None` picks the mode default: 2 for gene ranks, 10000 for bp.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        match_score: i64,
        match_size: usize,
        gap_score: i64,
        e_value: f64,
        pivot: String,
        unit_dist: Option<i64>,
        use_bp: bool,
        in_synteny: bool,
    ) -> Self {
        let unit_dist = unit_dist.unwrap_or(if use_bp { 10000 } else { 2 });
        Parameters {
            match_score,
            match_size,
            gap_score,
            e_value,
            pivot,
            unit_dist,
            use_bp,
            in_synteny,
            overlap_window: match_score * unit_dist / 10,
            extension_dist: match_score * unit_dist / 2,
            cutoff_score: match_score * match_size as i64,
        }
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters::new(50, 6, -3, 1e-5, "ALL".to_string(), None, false, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_constants() {
        let p = Parameters::default();
        assert_eq!(p.unit_dist, 2);
        assert_eq!(p.overlap_window, 10);
        assert_eq!(p.extension_dist, 50);
        assert_eq!(p.cutoff_score, 300);
    }

    #[test]
    fn bp_mode_unit_default() {
        let p = Parameters::new(50, 6, -3, 1e-5, "ALL".into(), None, true, false);
        assert_eq!(p.unit_dist, 10000);
        assert_eq!(p.overlap_window, 50000);
    }

    #[test]
    fn explicit_unit_dist_wins() {
        let p = Parameters::new(40, 5, -2, 1e-5, "ALL".into(), Some(7), true, false);
        assert_eq!(p.unit_dist, 7);
        assert_eq!(p.cutoff_score, 200);
    }
}
