//! Degree-corrected log-likelihood of a bipartite partition.
//!
//! # Score formula
//!
//! ```text
//! score = Σ_{r ∈ A} Σ_{s ∈ B} m_rs * ln( m_rs / (deg_r * deg_s) )
//! ```
//!
//! A block with no edges, or a community with no degree, makes the whole
//! score `-inf`. Zero checks truncate towards zero, so any magnitude below
//! one counts as empty.

use crate::sufficient_stats::BipartiteStats;
use graph_util::Side;

#[inline]
fn is_empty_degree(x: f64) -> bool {
    x.trunc() == 0.0
}

/// Score contribution of a single `(r, s)` block.
///
/// * `m_rs` - edges between the two communities
/// * `deg_r` - total degree of the side-A community
/// * `deg_s` - total degree of the side-B community
#[inline]
pub fn block_score(m_rs: usize, deg_r: f64, deg_s: f64) -> f64 {
    if m_rs == 0 || is_empty_degree(deg_r) || is_empty_degree(deg_s) {
        return f64::NEG_INFINITY;
    }
    let m = m_rs as f64;
    m * (m / (deg_r * deg_s)).ln()
}

/// Score the whole partition by visiting every `(r, s)` block.
///
/// This is the reference O(k_a * k_b) computation.
pub fn score_partition(stats: &BipartiteStats) -> f64 {
    let k_a = stats.k_a();
    let k_b = stats.k_b();
    let mut score = 0.0;
    for r in 0..k_a {
        for s in k_a..k_a + k_b {
            let term = block_score(
                stats.edge_stat(r, s),
                stats.community_degree(r),
                stats.community_degree(s),
            );
            if term == f64::NEG_INFINITY {
                return f64::NEG_INFINITY;
            }
            score += term;
        }
    }
    score
}

/// Per-community score contributions, used to score single-vertex moves
/// without a full pass over the block matrix.
///
/// Moving a side-A vertex from `r` to `r'` only changes the blocks in rows
/// `r` and `r'`: their edge counts and their community degrees. Every
/// other row keeps its cached contribution. Columns play the same role for
/// side-B vertices.
#[derive(Debug, Clone)]
pub struct BlockScores {
    /// `row[r]` = Σ_s block_score(r, s), for `r` in `0..k_a`
    row: Vec<f64>,
    /// `col[s - k_a]` = Σ_r block_score(r, s)
    col: Vec<f64>,
}

impl BlockScores {
    /// Cache row and column contributions of the current partition.
    pub fn new(stats: &BipartiteStats) -> Self {
        let k_a = stats.k_a();
        let k_b = stats.k_b();
        let mut row = vec![0.0; k_a];
        let mut col = vec![0.0; k_b];
        for r in 0..k_a {
            for s in k_a..k_a + k_b {
                let term = block_score(
                    stats.edge_stat(r, s),
                    stats.community_degree(r),
                    stats.community_degree(s),
                );
                row[r] += term;
                col[s - k_a] += term;
            }
        }
        BlockScores { row, col }
    }

    /// Total score, equal to [`score_partition`] up to rounding.
    pub fn total(&self) -> f64 {
        self.row.iter().sum()
    }

    /// Sum of the cached contributions of `side`'s communities other than
    /// `skip_1` and `skip_2`.
    pub fn rest(&self, stats: &BipartiteStats, side: Side, skip_1: usize, skip_2: usize) -> f64 {
        let (lines, offset) = match side {
            Side::A => (&self.row, 0),
            Side::B => (&self.col, stats.k_a()),
        };
        lines
            .iter()
            .enumerate()
            .filter(|&(i, _)| i + offset != skip_1 && i + offset != skip_2)
            .map(|(_, &x)| x)
            .sum()
    }
}

/// Whether a vertex leaves or joins the community being rescored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange {
    /// The vertex leaves the community
    Remove,
    /// The vertex joins the community
    Add,
}

/// Score contribution of community `c` (all its blocks against the other
/// side) after a vertex of degree `deg` leaves or joins it.
///
/// * `stats` - statistics before the move
/// * `side` - side of the moving vertex (and of `c`)
/// * `c` - community being rescored
/// * `tally` - `tally[i]` = edges from the moving vertex to the `i`-th
///   community of the opposite side
/// * `deg` - degree of the moving vertex
/// * `change` - whether the vertex leaves or joins `c`
pub fn moved_line_score(
    stats: &BipartiteStats,
    side: Side,
    c: usize,
    tally: &[usize],
    deg: f64,
    change: LineChange,
) -> f64 {
    let c_deg = match change {
        LineChange::Remove => stats.community_degree(c) - deg,
        LineChange::Add => stats.community_degree(c) + deg,
    };

    let mut score = 0.0;
    for (i, o) in stats.community_range(side.opposite()).enumerate() {
        let m = stats.edge_stat_between(c, o);
        let m = match change {
            LineChange::Remove => m - tally[i],
            LineChange::Add => m + tally[i],
        };
        score += block_score(m, c_deg, stats.community_degree(o));
        if score == f64::NEG_INFINITY {
            break;
        }
    }
    score
}
