//! Degree-corrected bipartite stochastic block model (biSBM).
//!
//! Partitions the vertices of a bipartite graph into `k_a` communities on
//! side A and `k_b` communities on side B by greedy local search on the
//! degree-corrected log-likelihood.
//!
//! # Model
//!
//! ```text
//! score = Σ_{r ∈ A} Σ_{s ∈ B} m_rs * ln( m_rs / (deg_r * deg_s) )
//! ```
//!
//! # References
//!
//! Larremore, Clauset & Jacobs (2014). "Efficiently inferring community
//! structure in bipartite networks." Phys. Rev. E 90, 012805.

#![deny(missing_docs)]

/// Error type for fitting
pub mod error;

/// Degree-corrected score functions, full and incremental
pub mod model;

/// Sufficient statistics: inter-community edge counts, community degrees
pub mod sufficient_stats;

/// Greedy single-vertex-swap sweep with best-prefix rewind
pub mod greedy;

/// Convergence loop and public entry points
pub mod inference;


pub use error::{Error, Result};
pub use greedy::CandidateScoring;
pub use inference::{fit_bipartite_sbm, Bisbm, BisbmOptions, ConvergenceState, FitResult};
