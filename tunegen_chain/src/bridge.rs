// Finite-state chains with endpoint-conditioned ("bridge") sampling.
//
// `FiniteChain` is the immutable model: states, the forward matrix P, its
// stationary distribution π and the backward matrix B, all computed once.
// `MarkovBridge` is the sampler: a shared handle to a model, the current
// state, and the generator it draws from.
//
// Bridge weights for an interior state x between a past anchor p (`a` steps
// before x) and a future anchor f (`b` steps after x) are
//
//     w(x) = (e_p·P^a)[x] · (e_f·B^b)[x] / π[x] · π[f] / (e_p·P^(a+b))[f]
//
// The forward and backward filters each carry a factor of π[x], hence the
// division. The trailing factor makes the weights sum to 1; the sampler
// renormalizes anyway, so it only affects the values callers see from
// `conditional_distribution`.
//
// Time direction is a parameter. Stepping backward swaps which anchor is
// "past": the target becomes the past anchor `offset - 1` steps before x
// and the current state becomes the future anchor one step after it.
//
// Stepping consumes exactly one draw from the generator per call.

use crate::error::ChainError;
use crate::linalg::Matrix;
use crate::stationary::{backward_matrix, stationary_distribution};
use crate::transition::{ChainState, TransitionTable};
use crate::weighted::{WeightedItem, sample_index};
use std::sync::Arc;
use tracing::{debug, warn};
use tunegen_prng::TuneRng;

/// Which way time runs when stepping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    /// Draw the next state from P.
    #[default]
    Forward,
    /// Draw the previous state from B.
    Backward,
}

/// A known state at a distance from the state being sampled.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition<S> {
    pub offset: usize,
    pub state: S,
}

impl<S> Condition<S> {
    pub fn new(offset: usize, state: S) -> Self {
        Condition { offset, state }
    }
}

/// Immutable chain model: states, P, π and B.
#[derive(Clone, Debug, PartialEq)]
pub struct FiniteChain<S> {
    states: Vec<S>,
    transition: Matrix,
    backward: Matrix,
    stationary: Vec<f64>,
}

impl<S: ChainState> FiniteChain<S> {
    /// Solve for π and build B. Fails with
    /// [`ChainError::SingularSystem`] when π is not unique.
    pub fn new(table: TransitionTable<S>) -> Result<Self, ChainError> {
        let (states, transition) = table.into_parts();
        let stationary = stationary_distribution(&transition)?;
        debug!(states = states.len(), stationary = ?stationary, "solved stationary distribution");
        if let Some(i) = stationary.iter().position(|&p| p <= 0.0) {
            warn!(
                state = ?states[i],
                weight = stationary[i],
                "stationary weight is not positive; its backward row is zeroed"
            );
        }
        let backward = backward_matrix(&transition, &stationary);
        Ok(FiniteChain {
            states,
            transition,
            backward,
            stationary,
        })
    }

    /// Validate a weight table and build the model in one go.
    pub fn from_weights<I>(rows: I) -> Result<Self, ChainError>
    where
        I: IntoIterator<Item = (S, Vec<WeightedItem<S>>)>,
    {
        FiniteChain::new(TransitionTable::new(rows)?)
    }

    pub fn states(&self) -> &[S] {
        &self.states
    }

    pub fn transition_matrix(&self) -> &Matrix {
        &self.transition
    }

    pub fn backward_matrix(&self) -> &Matrix {
        &self.backward
    }

    /// π, in state order.
    pub fn stationary_distribution(&self) -> &[f64] {
        &self.stationary
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn index_of(&self, state: &S) -> Option<usize> {
        self.states.iter().position(|s| s == state)
    }

    fn require_index(&self, state: &S) -> Result<usize, ChainError> {
        self.index_of(state)
            .ok_or_else(|| ChainError::invalid(format!("state {state:?} is not in the chain")))
    }

    fn matrix(&self, direction: Direction) -> &Matrix {
        match direction {
            Direction::Forward => &self.transition,
            Direction::Backward => &self.backward,
        }
    }

    fn propagate(&self, from: usize, steps: usize, direction: Direction) -> Vec<f64> {
        let matrix = self.matrix(direction);
        let mut v = vec![0.0; self.states.len()];
        v[from] = 1.0;
        for _ in 0..steps {
            v = matrix.left_mul(&v);
        }
        v
    }

    /// `e_state · M^offset`, with M = P forward or B backward.
    pub fn distribution_after(
        &self,
        state: &S,
        offset: usize,
        direction: Direction,
    ) -> Result<Vec<f64>, ChainError> {
        let i = self.require_index(state)?;
        Ok(self.propagate(i, offset, direction))
    }

    fn bridge_weights(&self, past: (usize, usize), future: (usize, usize)) -> Vec<f64> {
        let (past_index, a) = past;
        let (future_index, b) = future;
        let forward = self.propagate(past_index, a, Direction::Forward);
        let backward = self.propagate(future_index, b, Direction::Backward);

        let through = self.propagate(past_index, a + b, Direction::Forward)[future_index];
        let scale = if through > 0.0 {
            self.stationary[future_index] / through
        } else {
            0.0
        };

        let weights: Vec<f64> = (0..self.states.len())
            .map(|x| {
                if self.stationary[x] <= 0.0 {
                    return 0.0;
                }
                let w = forward[x] * backward[x] / self.stationary[x] * scale;
                if w.is_finite() { w.max(0.0) } else { 0.0 }
            })
            .collect();

        if weights.iter().all(|&w| w == 0.0) {
            warn!(
                past = ?self.states[past_index],
                future = ?self.states[future_index],
                "bridge has no mass; sampler falls back to the first state"
            );
        }
        weights
    }

    /// Bridge weights for a state `past.offset` steps after `past.state`
    /// and `future.offset` steps before `future.state`. Sums to 1 unless
    /// the future anchor is unreachable, in which case every weight is 0.
    pub fn conditional_distribution(
        &self,
        past: &Condition<S>,
        future: &Condition<S>,
    ) -> Result<Vec<WeightedItem<S>>, ChainError> {
        let p = self.require_index(&past.state)?;
        let f = self.require_index(&future.state)?;
        let weights = self.bridge_weights((p, past.offset), (f, future.offset));
        Ok(self
            .states
            .iter()
            .zip(weights)
            .map(|(s, w)| WeightedItem::new(s.clone(), w))
            .collect())
    }
}

/// Stateful sampler over a shared [`FiniteChain`].
///
/// Each instance owns its generator. Callers that want two chains to draw
/// from one stream pass the generator along with [`into_rng`] or step
/// through [`rng_mut`].
///
/// [`into_rng`]: MarkovBridge::into_rng
/// [`rng_mut`]: MarkovBridge::rng_mut
#[derive(Clone, Debug)]
pub struct MarkovBridge<S> {
    chain: Arc<FiniteChain<S>>,
    current: usize,
    rng: TuneRng,
}

impl<S: ChainState> MarkovBridge<S> {
    /// Build the model from `table` and start at `initial`.
    pub fn new(table: TransitionTable<S>, initial: S, rng: TuneRng) -> Result<Self, ChainError> {
        MarkovBridge::from_chain(Arc::new(FiniteChain::new(table)?), initial, rng)
    }

    /// Start a sampler on an existing model.
    pub fn from_chain(
        chain: Arc<FiniteChain<S>>,
        initial: S,
        rng: TuneRng,
    ) -> Result<Self, ChainError> {
        let current = chain.require_index(&initial)?;
        Ok(MarkovBridge {
            chain,
            current,
            rng,
        })
    }

    pub fn state(&self) -> &S {
        &self.chain.states[self.current]
    }

    pub fn set_state(&mut self, state: &S) -> Result<(), ChainError> {
        self.current = self.chain.require_index(state)?;
        Ok(())
    }

    pub fn chain(&self) -> &Arc<FiniteChain<S>> {
        &self.chain
    }

    pub fn states(&self) -> &[S] {
        self.chain.states()
    }

    pub fn transition_matrix(&self) -> &Matrix {
        self.chain.transition_matrix()
    }

    pub fn backward_matrix(&self) -> &Matrix {
        self.chain.backward_matrix()
    }

    pub fn stationary_distribution(&self) -> &[f64] {
        self.chain.stationary_distribution()
    }

    pub fn rng_mut(&mut self) -> &mut TuneRng {
        &mut self.rng
    }

    pub fn into_rng(self) -> TuneRng {
        self.rng
    }

    fn advance(&mut self, weights: &[f64]) -> S {
        self.current = sample_index(weights, &mut self.rng);
        self.state().clone()
    }

    /// One unconditional forward step.
    pub fn step(&mut self) -> S {
        self.step_in(Direction::Forward)
    }

    /// One unconditional step in `direction`.
    pub fn step_in(&mut self, direction: Direction) -> S {
        let weights = self.chain.matrix(direction).row(self.current).to_vec();
        self.advance(&weights)
    }

    /// One forward step conditioned on being in `target` exactly `offset`
    /// steps from now.
    pub fn step_conditional(&mut self, offset: usize, target: &S) -> Result<S, ChainError> {
        self.step_conditional_in(offset, target, Direction::Forward)
    }

    /// One step in `direction` conditioned on reaching `target` exactly
    /// `offset` steps from now (measured in that direction).
    ///
    /// Fails with [`ChainError::InvalidTransitionSpec`] if `offset` is 0
    /// or `target` is not a chain state. No draw is consumed on failure.
    pub fn step_conditional_in(
        &mut self,
        offset: usize,
        target: &S,
        direction: Direction,
    ) -> Result<S, ChainError> {
        if offset == 0 {
            return Err(ChainError::invalid(format!(
                "bridge target {target:?} needs an offset of at least 1"
            )));
        }
        let target = self.chain.require_index(target)?;
        let (past, future) = match direction {
            Direction::Forward => ((self.current, 1), (target, offset - 1)),
            Direction::Backward => ((target, offset - 1), (self.current, 1)),
        };
        let weights = self.chain.bridge_weights(past, future);
        Ok(self.advance(&weights))
    }
}
