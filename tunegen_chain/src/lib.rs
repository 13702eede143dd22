// Tunegen chain engine
//
// Finite-state, time-homogeneous Markov chains that can be forced through
// known anchor states. Given a one-step weight table the engine computes
// the stationary distribution, the time-reversed transition law, and the
// conditional distribution of a state between a known past and a known
// future, then samples from it with a seeded `TuneRng`.
//
// Architecture:
// - weighted.rs: Weighted categorical sampling with first-item fallback
// - timeline.rs: Sorted (t, value) step-function container
// - linalg.rs: Dense square matrices and Gaussian elimination
// - transition.rs: Weight table validation and row normalization
// - stationary.rs: Stationary distribution solve and backward matrix
// - bridge.rs: `FiniteChain` model and the `MarkovBridge` sampler
// - chain.rs: Probability-function chains for unbounded state spaces
// - error.rs: `ChainError` and `TimelineError`
//
// Everything is synchronous and deterministic. A `FiniteChain` is immutable
// after construction and can be shared across threads behind an `Arc`; each
// `MarkovBridge` owns its current state and generator.

pub mod bridge;
pub mod chain;
pub mod error;
pub mod linalg;
pub mod stationary;
pub mod timeline;
pub mod transition;
pub mod weighted;

pub use bridge::{Condition, Direction, FiniteChain, MarkovBridge};
pub use chain::MarkovChain;
pub use error::{ChainError, TimelineError};
pub use linalg::Matrix;
pub use timeline::{Timeline, TimelineItem};
pub use transition::{ChainState, TransitionTable};
pub use weighted::{WeightedItem, WeightedRandom, sample_index};
