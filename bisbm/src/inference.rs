//! Convergence loop: repeat greedy sweeps until one fails to improve.
//!
//! 1. **Initialize** a partition at random (seeded) or from a given membership.
//! 2. **Sweep** (see [`crate::greedy`]): every vertex moves once, then the
//!    sweep is rewound to its best prefix.
//! 3. **Stop** when a sweep has no improving prefix, or after `max_iter` sweeps.

use crate::error::{Error, Result};
use crate::greedy::{CandidateScoring, GreedySweep};
use crate::model::score_partition;
use crate::sufficient_stats::BipartiteStats;
use graph_util::{BipartiteGraph, Side};
use indicatif::{ProgressBar, ProgressDrawTarget};
use log::{info, log, warn, Level};
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Options for bipartite SBM fitting.
#[derive(Debug, Clone)]
pub struct BisbmOptions {
    /// Number of side-A communities. Default: 2
    pub k_a: usize,
    /// Number of side-B communities. Default: 2
    pub k_b: usize,
    /// Maximum number of sweeps. Default: 100
    pub max_iter: usize,
    /// Random seed for the initial partition. Default: 42
    pub seed: u64,
    /// Candidate scoring strategy. Default: incremental
    pub scoring: CandidateScoring,
    /// Report every sweep at info level (otherwise debug). Default: false
    pub verbose: bool,
    /// Draw a progress bar over sweeps (suppressed when verbose). Default: false
    pub show_progress: bool,
}

impl Default for BisbmOptions {
    fn default() -> Self {
        BisbmOptions {
            k_a: 2,
            k_b: 2,
            max_iter: 100,
            seed: 42,
            scoring: CandidateScoring::Incremental,
            verbose: false,
            show_progress: false,
        }
    }
}

/// Where the convergence loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceState {
    /// The last sweep still improved the score (iteration cap reached)
    Improving,
    /// A sweep found no improving move sequence
    Converged,
}

/// Outcome of a fit.
#[derive(Debug, Clone)]
pub struct FitResult {
    /// `membership[v]` = community of `v`: `0..k_a` on side A, `k_a..k_a+k_b` on side B
    pub membership: Vec<usize>,
    /// Final degree-corrected log-likelihood (may be `-inf`)
    pub score: f64,
    /// Number of sweeps run
    pub iterations: usize,
    /// Moves kept over all sweeps
    pub moves: usize,
    /// Why the loop stopped
    pub state: ConvergenceState,
    /// Score before the first sweep, then after every sweep
    pub score_trace: Vec<f64>,
    /// Final `k_a × k_b` inter-community edge counts (row-major)
    pub edge_counts: Vec<usize>,
    /// Final total degree per community
    pub community_degrees: Vec<f64>,
}

impl FitResult {
    /// Whether the loop stopped because no sweep could improve
    pub fn converged(&self) -> bool {
        self.state == ConvergenceState::Converged
    }
}

/// Greedy local search for the degree-corrected bipartite SBM.
///
/// # Usage
///
/// ```ignore
/// use bisbm::{Bisbm, BisbmOptions};
///
/// let options = BisbmOptions { k_a: 3, k_b: 2, ..Default::default() };
/// let result = Bisbm::new(options).fit(&adj_list, &sides)?;
/// println!("score = {}", result.score);
/// ```
pub struct Bisbm {
    options: BisbmOptions,
}

impl Bisbm {
    /// Create a new fitter.
    pub fn new(options: BisbmOptions) -> Self {
        Bisbm { options }
    }

    /// Options in use
    pub fn options(&self) -> &BisbmOptions {
        &self.options
    }

    /// Fit from a random (seeded) initial partition.
    ///
    /// * `adj_list` - `adj_list[v]` = neighbors of `v`, every edge listed at both ends
    /// * `sides` - side of every vertex
    pub fn fit(&self, adj_list: &[Vec<usize>], sides: &[Side]) -> Result<FitResult> {
        self.validate(adj_list, sides)?;
        let mut rng = SmallRng::seed_from_u64(self.options.seed);
        let labels =
            BipartiteStats::random_membership(sides, self.options.k_a, self.options.k_b, &mut rng);
        self.run(adj_list, sides, &labels)
    }

    /// Fit starting from a given membership.
    ///
    /// * `initial` - community of each vertex, within its side's range
    pub fn fit_from(
        &self,
        adj_list: &[Vec<usize>],
        sides: &[Side],
        initial: &[usize],
    ) -> Result<FitResult> {
        self.validate(adj_list, sides)?;
        if initial.len() != adj_list.len() {
            return Err(Error::DimensionMismatch {
                expected: adj_list.len(),
                found: initial.len(),
            });
        }
        let (k_a, k_b) = (self.options.k_a, self.options.k_b);
        for (v, (&c, side)) in initial.iter().zip(sides).enumerate() {
            let ok = match side {
                Side::A => c < k_a,
                Side::B => (k_a..k_a + k_b).contains(&c),
            };
            if !ok {
                return Err(Error::invalid(
                    "initial",
                    format!("community {} of vertex {} is outside its side's range", c, v),
                ));
            }
        }
        self.run(adj_list, sides, initial)
    }

    /// Fit a graph whose sides were already detected.
    pub fn fit_graph(&self, graph: &BipartiteGraph) -> Result<FitResult> {
        self.fit(graph.graph.adj_list(), &graph.sides)
    }

    fn validate(&self, adj_list: &[Vec<usize>], sides: &[Side]) -> Result<()> {
        let n = adj_list.len();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if sides.len() != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                found: sides.len(),
            });
        }
        if self.options.k_a == 0 {
            return Err(Error::invalid("k_a", "must be at least 1"));
        }
        if self.options.k_b == 0 {
            return Err(Error::invalid("k_b", "must be at least 1"));
        }
        if self.options.max_iter == 0 {
            return Err(Error::invalid("max_iter", "must be at least 1"));
        }
        // (lower, upper) endpoint pairs, as listed at each end
        let mut from_lower = Vec::new();
        let mut from_upper = Vec::new();

        for (u, nbrs) in adj_list.iter().enumerate() {
            for &v in nbrs {
                if v >= n {
                    return Err(Error::invalid(
                        "adj_list",
                        format!("vertex {} has neighbor {} out of range", u, v),
                    ));
                }
                if sides[u] == sides[v] {
                    return Err(Error::invalid(
                        "sides",
                        format!("edge {}-{} joins two vertices on the same side", u, v),
                    ));
                }
                if u < v {
                    from_lower.push((u, v));
                } else {
                    from_upper.push((v, u));
                }
            }
        }

        from_lower.sort_unstable();
        from_upper.sort_unstable();
        if from_lower != from_upper {
            let (u, v) = from_lower
                .iter()
                .zip(&from_upper)
                .find(|(a, b)| a != b)
                .map(|(&a, &b)| a.min(b))
                .or_else(|| from_lower.get(from_upper.len()).copied())
                .or_else(|| from_upper.get(from_lower.len()).copied())
                .unwrap_or((0, 0));
            return Err(Error::invalid(
                "adj_list",
                format!("edge {}-{} is not listed the same number of times at both ends", u, v),
            ));
        }
        Ok(())
    }

    fn run(&self, adj_list: &[Vec<usize>], sides: &[Side], labels: &[usize]) -> Result<FitResult> {
        let opts = &self.options;
        let n = adj_list.len();
        let level = if opts.verbose { Level::Info } else { Level::Debug };

        let mut stats = BipartiteStats::from_adjacency(adj_list, sides, opts.k_a, opts.k_b, labels);

        let empty = stats.count_empty_communities();
        if empty > 0 {
            warn!(
                "{} of {} communities start empty; their blocks score -inf until filled",
                empty,
                opts.k_a + opts.k_b
            );
        }

        info!(
            "bisbm: n={}, k_a={}, k_b={}, max_iter={}, scoring={:?}",
            n, opts.k_a, opts.k_b, opts.max_iter, opts.scoring
        );

        let mut sweep = GreedySweep::new(n, opts.scoring);
        let mut score = score_partition(&stats);
        let mut score_trace = vec![score];
        let mut state = ConvergenceState::Improving;
        let mut iterations = 0;
        let mut moves = 0;

        let pb = ProgressBar::new(opts.max_iter as u64);
        if !opts.show_progress || opts.verbose {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }

        for iter in 0..opts.max_iter {
            let outcome = sweep.run(&mut stats, adj_list, score);
            let new_score = score_partition(&stats);
            iterations += 1;
            moves += outcome.kept_moves;
            score_trace.push(new_score);
            pb.inc(1);

            log!(
                level,
                "[{}] score: {:.4} -> {:.4}, kept {} of {} moves",
                iter + 1,
                score,
                new_score,
                outcome.kept_moves,
                outcome.steps
            );

            score = new_score;
            if !outcome.improved() {
                state = ConvergenceState::Converged;
                break;
            }
        }
        pb.finish_and_clear();

        info!(
            "bisbm done: score={:.4}, sweeps={}, moves={}, state={:?}",
            score, iterations, moves, state
        );

        let edge_counts = stats.edge_counts().to_vec();
        let community_degrees = stats.community_degrees().to_vec();

        Ok(FitResult {
            membership: stats.into_membership(),
            score,
            iterations,
            moves,
            state,
            score_trace,
            edge_counts,
            community_degrees,
        })
    }
}

/// Fit the degree-corrected bipartite SBM with default options.
///
/// * `adj_list` - `adj_list[v]` = neighbors of `v`, every edge listed at both ends
/// * `sides` - side of every vertex
/// * `k_a`, `k_b` - number of communities on each side
/// * `max_iter` - maximum number of sweeps
pub fn fit_bipartite_sbm(
    adj_list: &[Vec<usize>],
    sides: &[Side],
    k_a: usize,
    k_b: usize,
    max_iter: usize,
) -> Result<FitResult> {
    let options = BisbmOptions {
        k_a,
        k_b,
        max_iter,
        ..Default::default()
    };
    Bisbm::new(options).fit(adj_list, sides)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k_2_2() -> (Vec<Vec<usize>>, Vec<Side>) {
        let adj = vec![vec![2, 3], vec![2, 3], vec![0, 1], vec![0, 1]];
        let sides = vec![Side::A, Side::A, Side::B, Side::B];
        (adj, sides)
    }

    #[test]
    fn test_options_default() {
        let opts = BisbmOptions::default();
        assert_eq!(opts.k_a, 2);
        assert_eq!(opts.max_iter, 100);
        assert_eq!(opts.seed, 42);
        assert_eq!(opts.scoring, CandidateScoring::Incremental);
    }

    #[test]
    fn test_validation_errors() {
        let (adj, sides) = k_2_2();
        let fitter = Bisbm::new(BisbmOptions::default());

        assert_eq!(fitter.fit(&[], &[]).unwrap_err(), Error::EmptyInput);
        assert_eq!(
            fitter.fit(&adj, &sides[..3]).unwrap_err(),
            Error::DimensionMismatch {
                expected: 4,
                found: 3
            }
        );

        let zero_k = Bisbm::new(BisbmOptions {
            k_b: 0,
            ..Default::default()
        });
        assert!(matches!(
            zero_k.fit(&adj, &sides),
            Err(Error::InvalidParameter { name: "k_b", .. })
        ));

        let zero_iter = Bisbm::new(BisbmOptions {
            max_iter: 0,
            ..Default::default()
        });
        assert!(matches!(
            zero_iter.fit(&adj, &sides),
            Err(Error::InvalidParameter {
                name: "max_iter",
                ..
            })
        ));

        let same_side = vec![Side::A; 4];
        assert!(matches!(
            fitter.fit(&adj, &same_side),
            Err(Error::InvalidParameter { name: "sides", .. })
        ));
    }

    #[test]
    fn test_asymmetric_adjacency_rejected() {
        // 0 lists 2, but 3 lists 0 without 0 listing 3
        let adj = vec![vec![2], vec![2, 3], vec![0, 1], vec![1, 0]];
        let sides = vec![Side::A, Side::A, Side::B, Side::B];
        let fitter = Bisbm::new(BisbmOptions {
            k_a: 1,
            k_b: 2,
            ..Default::default()
        });

        assert!(matches!(
            fitter.fit_from(&adj, &sides, &[0, 0, 1, 2]),
            Err(Error::InvalidParameter {
                name: "adj_list",
                ..
            })
        ));
        assert!(matches!(
            fitter.fit(&adj, &sides),
            Err(Error::InvalidParameter {
                name: "adj_list",
                ..
            })
        ));

        // a parallel edge listed twice at one end only
        let adj = vec![vec![1, 1], vec![0]];
        let sides = vec![Side::A, Side::B];
        assert!(matches!(
            fit_bipartite_sbm(&adj, &sides, 1, 1, 5),
            Err(Error::InvalidParameter {
                name: "adj_list",
                ..
            })
        ));

        // parallel edges listed at both ends are fine
        let adj = vec![vec![1, 1], vec![0, 0]];
        assert!(fit_bipartite_sbm(&adj, &sides, 1, 1, 5).is_ok());
    }

    #[test]
    fn test_fit_from_rejects_out_of_range() {
        let (adj, sides) = k_2_2();
        let fitter = Bisbm::new(BisbmOptions::default());

        // vertex 2 is on side B, community 1 belongs to side A
        let bad = vec![0, 1, 1, 3];
        assert!(matches!(
            fitter.fit_from(&adj, &sides, &bad),
            Err(Error::InvalidParameter {
                name: "initial",
                ..
            })
        ));
        assert!(matches!(
            fitter.fit_from(&adj, &sides, &[0, 1]),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_single_community_converges_immediately() {
        let (adj, sides) = k_2_2();
        let result = fit_bipartite_sbm(&adj, &sides, 1, 1, 10).unwrap();

        assert!(result.converged());
        assert_eq!(result.iterations, 1);
        assert_eq!(result.moves, 0);
        assert_eq!(result.membership, vec![0, 0, 1, 1]);
        // 4 * ln(4 / (4 * 4))
        assert!((result.score - 4.0 * (0.25f64).ln()).abs() < 1e-12);
        assert_eq!(result.score_trace.len(), 2);
    }
}
