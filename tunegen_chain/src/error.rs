// Error types for the chain engine.
//
// Construction-time failures carry the offending state or weight so the
// caller can point at the bad row of its table. Stepping never produces
// these except for malformed bridge anchors (unknown target, zero offset).
// Degenerate sampling is not an error at all; see `weighted.rs`.

/// Errors raised while building or conditioning a chain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChainError {
    /// The transition table is malformed: missing or unknown state,
    /// duplicate entry, negative or non-finite weight, or an all-zero row.
    #[error("invalid transition spec: {reason}")]
    InvalidTransitionSpec {
        /// Human-readable description including the offending state.
        reason: String,
    },

    /// The stationary-distribution system has no unique solution.
    #[error("singular stationary system: {reason}")]
    SingularSystem {
        /// Which pivot failed and how small it was.
        reason: String,
    },

    /// A weighted sampler was built from an empty item list.
    #[error("weighted distribution has no items")]
    EmptyDistribution,

    /// A weighted item carries a negative or non-finite weight.
    #[error("item {index} has weight {weight}, expected a finite value >= 0")]
    InvalidWeight {
        /// Position of the item in the list.
        index: usize,
        /// The rejected weight.
        weight: f64,
    },
}

impl ChainError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        ChainError::InvalidTransitionSpec {
            reason: reason.into(),
        }
    }
}

/// Errors raised by timeline queries.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimelineError {
    /// No item is stored at or before the queried time.
    #[error("no timeline item at or before t = {t}")]
    NotFound {
        /// The queried time.
        t: f64,
    },
}
