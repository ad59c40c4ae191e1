//! Greedy single-vertex-swap sweep with best-prefix rewind.
//!
//! One sweep commits `n` moves. At each step every vertex not yet moved in
//! this sweep proposes its best destination; the single best proposal over
//! all of them is applied. After the last step the moves that came after
//! the best-scoring step are undone, so the net effect of a sweep is the
//! best prefix of its move sequence.
//!
//! Proposals are evaluated in parallel (rayon) against a frozen snapshot of
//! the statistics; only the chosen move mutates them.

use crate::model::{moved_line_score, score_partition, BlockScores, LineChange};
use crate::sufficient_stats::BipartiteStats;
use log::{debug, warn};
use rayon::prelude::*;

/// Relative tolerance below which a score gain does not count as progress.
pub const SCORE_TOLERANCE: f64 = 1e-9;

/// How a candidate move is scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CandidateScoring {
    /// Rescore only the two communities a move touches (read-only, parallel)
    #[default]
    Incremental,
    /// Apply the move, score the whole partition, undo the move (sequential)
    FullRescore,
}

/// One committed move within a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapRecord {
    /// The moved vertex
    pub vertex: usize,
    /// Community before the move
    pub src: usize,
    /// Community after the move
    pub dest: usize,
}

/// Summary of one sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepOutcome {
    /// Score of the partition when the sweep started
    pub start_score: f64,
    /// Best score reached by a prefix of the move sequence
    pub best_score: f64,
    /// Step index of the best prefix; `None` when no step improved
    pub best_step: Option<usize>,
    /// Steps recorded (including a trailing null step, if any)
    pub steps: usize,
    /// Moves kept after rewinding
    pub kept_moves: usize,
}

impl SweepOutcome {
    /// Whether the sweep left the partition better than it found it
    pub fn improved(&self) -> bool {
        self.best_step.is_some()
    }
}

/// Whether `candidate` beats `reference` by more than the tolerance.
pub fn improves(candidate: f64, reference: f64) -> bool {
    if reference == f64::NEG_INFINITY {
        return candidate > reference;
    }
    candidate > reference + SCORE_TOLERANCE * reference.abs().max(1.0)
}

/// Sweep driver holding buffers reused across sweeps.
pub struct GreedySweep {
    scoring: CandidateScoring,
    used: Vec<bool>,
    records: Vec<SwapRecord>,
}

impl GreedySweep {
    /// Create a sweep driver for a graph of `n` vertices.
    pub fn new(n: usize, scoring: CandidateScoring) -> Self {
        GreedySweep {
            scoring,
            used: Vec::with_capacity(n),
            records: Vec::with_capacity(n),
        }
    }

    /// Moves recorded by the most recent sweep, in commit order
    pub fn records(&self) -> &[SwapRecord] {
        &self.records
    }

    /// Run one sweep and rewind it to its best prefix.
    ///
    /// * `stats` - sufficient statistics (modified in place)
    /// * `adj_list` - `adj_list[v]` = neighbors of `v`
    /// * `start_score` - score of `stats` before the sweep
    pub fn run(
        &mut self,
        stats: &mut BipartiteStats,
        adj_list: &[Vec<usize>],
        start_score: f64,
    ) -> SweepOutcome {
        let n = stats.num_vertices();
        self.used.clear();
        self.used.resize(n, false);
        self.records.clear();

        let mut best_score = start_score;
        let mut best_step = None;

        for step in 0..n {
            let proposal = match self.scoring {
                CandidateScoring::Incremental => select_incremental(stats, adj_list, &self.used),
                CandidateScoring::FullRescore => select_full_rescore(stats, adj_list, &self.used),
            };

            let Some((v, dest, score)) = proposal else {
                // Null step: nothing changes, so every later step would be null too.
                let c = stats.membership()[0];
                self.records.push(SwapRecord {
                    vertex: 0,
                    src: c,
                    dest: c,
                });
                warn!(
                    "sweep step {}: no move yields a finite score (empty community?); stopping the sweep",
                    step
                );
                break;
            };

            let src = stats.membership()[v];
            stats.apply_swap(v, dest, &adj_list[v]);
            self.used[v] = true;
            self.records.push(SwapRecord {
                vertex: v,
                src,
                dest,
            });

            if improves(score, best_score) {
                best_score = score;
                best_step = Some(step);
            }
        }

        let steps = self.records.len();
        let kept_moves = best_step.map_or(0, |b| b + 1);
        self.rewind(stats, adj_list, kept_moves);

        debug!(
            "sweep: {} steps, best step {:?}, score {} -> {}",
            steps, best_step, start_score, best_score
        );

        SweepOutcome {
            start_score,
            best_score,
            best_step,
            steps,
            kept_moves,
        }
    }

    /// Undo, newest first, every recorded move after the first `keep`.
    fn rewind(&self, stats: &mut BipartiteStats, adj_list: &[Vec<usize>], keep: usize) {
        for rec in self.records.iter().skip(keep).rev() {
            stats.apply_swap(rec.vertex, rec.src, &adj_list[rec.vertex]);
        }
    }
}

/// Pick the best proposal; strictly greater wins, so ties keep the lowest
/// vertex and `-inf` proposals are never chosen.
fn pick_best(proposals: impl Iterator<Item = (usize, Option<(usize, f64)>)>) -> Option<(usize, usize, f64)> {
    let mut best: Option<(usize, usize, f64)> = None;
    let mut best_score = f64::NEG_INFINITY;
    for (v, proposal) in proposals {
        if let Some((dest, score)) = proposal {
            if score > best_score {
                best_score = score;
                best = Some((v, dest, score));
            }
        }
    }
    best
}

fn select_incremental(
    stats: &BipartiteStats,
    adj_list: &[Vec<usize>],
    used: &[bool],
) -> Option<(usize, usize, f64)> {
    let candidates: Vec<usize> = (0..stats.num_vertices()).filter(|&v| !used[v]).collect();
    if candidates.is_empty() {
        return None;
    }

    let cached = BlockScores::new(stats);
    let chunk_size = std::cmp::max(64, candidates.len() / rayon::current_num_threads().max(1));

    let proposals: Vec<Option<(usize, f64)>> = candidates
        .par_chunks(chunk_size)
        .flat_map(|chunk| {
            let mut tally = Vec::new();
            chunk
                .iter()
                .map(|&v| best_destination_cached(stats, &cached, v, &adj_list[v], &mut tally))
                .collect::<Vec<_>>()
        })
        .collect();

    pick_best(candidates.into_iter().zip(proposals))
}

fn select_full_rescore(
    stats: &mut BipartiteStats,
    adj_list: &[Vec<usize>],
    used: &[bool],
) -> Option<(usize, usize, f64)> {
    let n = stats.num_vertices();
    let mut proposals = Vec::with_capacity(n);
    for v in (0..n).filter(|&v| !used[v]) {
        proposals.push((v, best_destination_full_rescore(stats, v, &adj_list[v])));
    }
    pick_best(proposals.into_iter())
}

/// Best destination for `vertex` and the partition score after moving it
/// there.
///
/// Candidates are the other communities on the vertex's side, tried in
/// ascending order; a strictly greater score replaces the current best.
/// Returns `None` when there is no alternative community or every
/// alternative scores `-inf`.
pub fn best_destination(
    stats: &BipartiteStats,
    vertex: usize,
    neighbors: &[usize],
) -> Option<(usize, f64)> {
    let cached = BlockScores::new(stats);
    let mut tally = Vec::new();
    best_destination_cached(stats, &cached, vertex, neighbors, &mut tally)
}

/// Same as [`best_destination`], scoring each candidate by applying the
/// move, rescoring the whole partition and moving the vertex back.
pub fn best_destination_full_rescore(
    stats: &mut BipartiteStats,
    vertex: usize,
    neighbors: &[usize],
) -> Option<(usize, f64)> {
    let from = stats.membership()[vertex];
    let mut best = None;
    let mut best_score = f64::NEG_INFINITY;

    for to in stats.community_range(stats.side(vertex)) {
        if to == from {
            continue;
        }
        stats.apply_swap(vertex, to, neighbors);
        let score = score_partition(stats);
        stats.apply_swap(vertex, from, neighbors);

        if score > best_score {
            best_score = score;
            best = Some((to, score));
        }
    }
    best
}

/// Delta-scored candidate evaluation against cached row/column scores.
///
/// Complexity: O(degree + k_side * (k_a + k_b)) per vertex.
fn best_destination_cached(
    stats: &BipartiteStats,
    cached: &BlockScores,
    vertex: usize,
    neighbors: &[usize],
    tally: &mut Vec<usize>,
) -> Option<(usize, f64)> {
    let side = stats.side(vertex);
    let own = stats.community_range(side);
    if own.len() < 2 {
        return None;
    }

    let other = stats.community_range(side.opposite());
    tally.clear();
    tally.resize(other.len(), 0);
    for &u in neighbors {
        tally[stats.membership()[u] - other.start] += 1;
    }

    let from = stats.membership()[vertex];
    let deg = stats.vertex_degree(vertex);
    let source_line = moved_line_score(stats, side, from, tally, deg, LineChange::Remove);

    let mut best = None;
    let mut best_score = f64::NEG_INFINITY;

    for to in own {
        if to == from {
            continue;
        }
        let score = cached.rest(stats, side, from, to)
            + source_line
            + moved_line_score(stats, side, to, tally, deg, LineChange::Add);

        if score > best_score {
            best_score = score;
            best = Some((to, score));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph_util::Side;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    /// Random bipartite graph with `n_a` + `n_b` vertices; A vertices come first.
    fn random_bipartite(
        n_a: usize,
        n_b: usize,
        p: f64,
        seed: u64,
    ) -> (Vec<Vec<usize>>, Vec<Side>) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let n = n_a + n_b;
        let mut adj = vec![Vec::new(); n];
        for a in 0..n_a {
            for b in n_a..n {
                if rng.random::<f64>() < p {
                    adj[a].push(b);
                    adj[b].push(a);
                }
            }
        }
        let mut sides = vec![Side::A; n_a];
        sides.extend(vec![Side::B; n_b]);
        (adj, sides)
    }

    fn fresh_copy(stats: &BipartiteStats, adj: &[Vec<usize>], sides: &[Side]) -> BipartiteStats {
        BipartiteStats::from_adjacency(adj, sides, stats.k_a(), stats.k_b(), stats.membership())
    }

    #[test]
    fn test_improves_tolerance() {
        assert!(improves(-10.0, -11.0));
        assert!(!improves(-10.0, -10.0));
        assert!(!improves(-10.0 + 1e-12, -10.0));
        assert!(improves(-1e9, f64::NEG_INFINITY));
        assert!(!improves(f64::NEG_INFINITY, f64::NEG_INFINITY));
    }

    /// Incremental candidate scores must agree with the naive full rescore.
    #[test]
    fn test_best_destination_matches_full_rescore() {
        let (adj, sides) = random_bipartite(12, 10, 0.5, 42);
        let mut rng = SmallRng::seed_from_u64(3);
        let labels = BipartiteStats::random_membership(&sides, 3, 3, &mut rng);
        let mut stats = BipartiteStats::from_adjacency(&adj, &sides, 3, 3, &labels);

        for v in 0..adj.len() {
            let fast = best_destination(&stats, v, &adj[v]);
            let slow = best_destination_full_rescore(&mut stats, v, &adj[v]);

            match (fast, slow) {
                (None, None) => {}
                (Some((_, s_fast)), Some((_, s_slow))) => {
                    assert!(
                        (s_fast - s_slow).abs() < 1e-8 * s_slow.abs().max(1.0),
                        "v={}: fast={}, slow={}",
                        v,
                        s_fast,
                        s_slow
                    );
                }
                other => panic!("v={}: strategies disagree: {:?}", v, other),
            }
        }

        // full rescoring must leave the statistics untouched
        assert_eq!(stats, fresh_copy(&stats, &adj, &sides));
    }

    #[test]
    fn test_single_community_side_has_no_destination() {
        let (adj, sides) = random_bipartite(4, 4, 1.0, 1);
        let labels: Vec<usize> = sides.iter().map(|s| if *s == Side::A { 0 } else { 1 }).collect();
        let stats = BipartiteStats::from_adjacency(&adj, &sides, 1, 1, &labels);
        for v in 0..8 {
            assert_eq!(best_destination(&stats, v, &adj[v]), None);
        }
    }

    #[test]
    fn test_sweep_is_monotone_and_consistent() {
        let (adj, sides) = random_bipartite(15, 12, 0.4, 11);
        let mut rng = SmallRng::seed_from_u64(5);
        let labels = BipartiteStats::random_membership(&sides, 2, 3, &mut rng);
        let mut stats = BipartiteStats::from_adjacency(&adj, &sides, 2, 3, &labels);

        let mut sweep = GreedySweep::new(adj.len(), CandidateScoring::Incremental);
        let mut score = score_partition(&stats);

        for _ in 0..5 {
            let outcome = sweep.run(&mut stats, &adj, score);
            let new_score = score_partition(&stats);

            assert!(
                new_score >= score - 1e-8 * score.abs().max(1.0) || score == f64::NEG_INFINITY,
                "score decreased: {} -> {}",
                score,
                new_score
            );
            assert_eq!(stats, fresh_copy(&stats, &adj, &sides));
            assert!(outcome.kept_moves <= outcome.steps);

            if !outcome.improved() {
                break;
            }
            score = new_score;
        }
    }

    #[test]
    fn test_full_rescore_sweep_keeps_best_prefix() {
        let (adj, sides) = random_bipartite(8, 8, 0.6, 21);
        let mut rng = SmallRng::seed_from_u64(9);
        let labels = BipartiteStats::random_membership(&sides, 2, 2, &mut rng);

        let mut stats = BipartiteStats::from_adjacency(&adj, &sides, 2, 2, &labels);
        let start = score_partition(&stats);

        let mut sweep = GreedySweep::new(16, CandidateScoring::FullRescore);
        let outcome = sweep.run(&mut stats, &adj, start);
        let end = score_partition(&stats);

        assert_eq!(stats, fresh_copy(&stats, &adj, &sides));
        if outcome.improved() {
            assert!((end - outcome.best_score).abs() < 1e-8 * end.abs().max(1.0));
            assert!(end > start);
        } else {
            assert_eq!(stats.membership(), &labels[..]);
        }
    }

    #[test]
    fn test_rewind_restores_everything_without_improvement() {
        // K_{3,3} with one community per side: every move is impossible
        let (adj, sides) = random_bipartite(3, 3, 1.0, 0);
        let labels: Vec<usize> = sides.iter().map(|s| if *s == Side::A { 0 } else { 1 }).collect();
        let mut stats = BipartiteStats::from_adjacency(&adj, &sides, 1, 1, &labels);
        let before = stats.clone();

        let mut sweep = GreedySweep::new(6, CandidateScoring::Incremental);
        let start = score_partition(&stats);
        let outcome = sweep.run(&mut stats, &adj, start);

        assert!(!outcome.improved());
        assert_eq!(outcome.kept_moves, 0);
        assert_eq!(sweep.records().len(), 1);
        assert_eq!(sweep.records()[0].src, sweep.records()[0].dest);
        assert_eq!(stats, before);
    }
}
