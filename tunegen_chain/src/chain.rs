// Chains defined by a probability function instead of a table.
//
// Some state spaces are unbounded or carry a time index, e.g. `(t, value)`
// pairs, so they cannot be laid out as a matrix. `MarkovChain` asks a
// closure for the outgoing distribution of the current state on every
// step and draws once from it. There is no stationary distribution and no
// bridge sampling here; use `MarkovBridge` for that.

use crate::weighted::{WeightedItem, sample_index};
use tunegen_prng::TuneRng;

/// Markov chain whose transitions come from `probability(&state)`.
pub struct MarkovChain<S, F> {
    state: S,
    probability: F,
    rng: TuneRng,
}

impl<S, F> MarkovChain<S, F>
where
    S: Clone,
    F: Fn(&S) -> Vec<WeightedItem<S>>,
{
    pub fn new(initial: S, probability: F, rng: TuneRng) -> Self {
        MarkovChain {
            state: initial,
            probability,
            rng,
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Draw the next state. If the function returns no candidates the chain
    /// stays where it is; the draw is still consumed.
    pub fn next_state(&mut self) -> S {
        let mut candidates = (self.probability)(&self.state);
        let weights: Vec<f64> = candidates.iter().map(|item| item.weight).collect();
        let i = sample_index(&weights, &mut self.rng);
        if i < candidates.len() {
            self.state = candidates.swap_remove(i).value;
        }
        self.state.clone()
    }

    pub fn rng_mut(&mut self) -> &mut TuneRng {
        &mut self.rng
    }

    pub fn into_rng(self) -> TuneRng {
        self.rng
    }
}

impl<S, F> Iterator for MarkovChain<S, F>
where
    S: Clone,
    F: Fn(&S) -> Vec<WeightedItem<S>>,
{
    type Item = S;

    fn next(&mut self) -> Option<S> {
        Some(self.next_state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Timed {
        t: u32,
        val: u32,
    }

    fn uniform_next(s: &Timed) -> Vec<WeightedItem<Timed>> {
        (0..3)
            .map(|val| WeightedItem::new(Timed { t: s.t + 1, val }, 1.0))
            .collect()
    }

    #[test]
    fn golden_time_indexed_chain() {
        let chain = MarkovChain::new(Timed { t: 0, val: 0 }, uniform_next, TuneRng::new(754, 489));
        let got: Vec<(u32, u32)> = chain.take(4).map(|s| (s.t, s.val)).collect();
        assert_eq!(got, vec![(1, 2), (2, 0), (3, 0), (4, 2)]);
    }

    #[test]
    fn state_tracks_last_draw() {
        let mut chain =
            MarkovChain::new(Timed { t: 0, val: 0 }, uniform_next, TuneRng::new(754, 489));
        let drawn = chain.next_state();
        assert_eq!(*chain.state(), drawn);
    }

    #[test]
    fn empty_candidates_hold_state() {
        let mut chain = MarkovChain::new(7u8, |_: &u8| Vec::new(), TuneRng::new(1, 1));
        assert_eq!(chain.next_state(), 7);
        let mut reference = TuneRng::new(1, 1);
        reference.next_u32();
        assert_eq!(*chain.rng_mut(), reference);
    }

    #[test]
    fn zero_weights_take_first_candidate() {
        let mut chain = MarkovChain::new(
            0u8,
            |s: &u8| vec![WeightedItem::new(s + 10, 0.0), WeightedItem::new(s + 20, 0.0)],
            TuneRng::new(2, 3),
        );
        assert_eq!(chain.next_state(), 10);
        assert_eq!(chain.next_state(), 20);
    }
}
