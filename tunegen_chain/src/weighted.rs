// Weighted categorical sampling.
//
// One uniform draw per sample, compared against the running cumulative
// share of the (unnormalized) weights. The first item whose cumulative
// share reaches the draw wins.
//
// **Degenerate weights fall back to the first item.** When every weight is
// zero the shares are 0/0 = NaN, no comparison succeeds, and the draw
// returns index 0. Callers (the bridge sampler, the chord generator) rely
// on this never failing, so do not turn it into an error.

use crate::error::ChainError;
use serde::{Deserialize, Serialize};
use tunegen_prng::TuneRng;

/// A value with a non-negative, not necessarily normalized weight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightedItem<T> {
    pub weight: f64,
    pub value: T,
}

impl<T> WeightedItem<T> {
    pub fn new(value: T, weight: f64) -> Self {
        WeightedItem { weight, value }
    }
}

/// Draw an index from a weight slice using exactly one generator draw.
///
/// Returns 0 when no cumulative share reaches the draw (all-zero weights,
/// NaN, underflow, or an empty slice).
pub fn sample_index(weights: &[f64], rng: &mut TuneRng) -> usize {
    let u = rng.next_f64();
    let total = weights.iter().fold(0.0, |acc, &w| acc + w);
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if u <= cumulative / total {
            return i;
        }
    }
    0
}

/// A fixed weighted list that can be sampled repeatedly.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightedRandom<T> {
    items: Vec<WeightedItem<T>>,
    weights: Vec<f64>,
}

impl<T> WeightedRandom<T> {
    /// Build a sampler. Fails on an empty item list or a negative or
    /// non-finite weight. Zero weights are accepted and handled by the
    /// first-item fallback.
    pub fn new(items: Vec<WeightedItem<T>>) -> Result<Self, ChainError> {
        if items.is_empty() {
            return Err(ChainError::EmptyDistribution);
        }
        if let Some((index, item)) = items
            .iter()
            .enumerate()
            .find(|(_, item)| !item.weight.is_finite() || item.weight < 0.0)
        {
            return Err(ChainError::InvalidWeight {
                index,
                weight: item.weight,
            });
        }
        let weights = items.iter().map(|item| item.weight).collect();
        Ok(WeightedRandom { items, weights })
    }

    /// Draw one value.
    pub fn get(&self, rng: &mut TuneRng) -> &T {
        &self.items[sample_index(&self.weights, rng)].value
    }

    pub fn items(&self) -> &[WeightedItem<T>] {
        &self.items
    }

    pub fn into_items(self) -> Vec<WeightedItem<T>> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform5() -> WeightedRandom<u32> {
        WeightedRandom::new((0..5).map(|v| WeightedItem::new(v, 1.0)).collect()).unwrap()
    }

    #[test]
    fn golden_uniform_seed0() {
        let sampler = uniform5();
        let mut rng = TuneRng::new(754, 489);
        let got: Vec<u32> = (0..4).map(|_| *sampler.get(&mut rng)).collect();
        assert_eq!(got, vec![3, 1, 0, 3]);
    }

    #[test]
    fn golden_uniform_seed1() {
        let sampler = uniform5();
        let mut rng = TuneRng::new(222, 9643);
        let got: Vec<u32> = (0..4).map(|_| *sampler.get(&mut rng)).collect();
        assert_eq!(got, vec![1, 2, 4, 0]);
    }

    #[test]
    fn all_zero_weights_fall_back_to_first() {
        let sampler = WeightedRandom::new(vec![
            WeightedItem::new('a', 0.0),
            WeightedItem::new('b', 0.0),
            WeightedItem::new('c', 0.0),
        ])
        .unwrap();
        let mut rng = TuneRng::new(754, 489);
        for _ in 0..50 {
            assert_eq!(*sampler.get(&mut rng), 'a');
        }
    }

    #[test]
    fn nan_weights_fall_back_to_first() {
        let mut rng = TuneRng::new(222, 9643);
        for _ in 0..20 {
            assert_eq!(sample_index(&[1.0, f64::NAN, 2.0], &mut rng), 0);
        }
    }

    #[test]
    fn zero_weight_items_never_drawn() {
        let mut rng = TuneRng::new(1, 2);
        for _ in 0..1000 {
            let i = sample_index(&[0.0, 3.0, 0.0, 1.0], &mut rng);
            assert!(i == 1 || i == 3, "drew zero-weight index {i}");
        }
    }

    #[test]
    fn consumes_exactly_one_draw() {
        let mut a = TuneRng::new(754, 489);
        let mut b = TuneRng::new(754, 489);
        sample_index(&[0.0, 0.0], &mut a);
        b.next_f64();
        assert_eq!(a, b);
    }

    #[test]
    fn unnormalized_scale_is_irrelevant() {
        let mut a = TuneRng::new(9, 9);
        let mut b = TuneRng::new(9, 9);
        for _ in 0..200 {
            assert_eq!(
                sample_index(&[1.0, 2.0, 3.0], &mut a),
                sample_index(&[0.5, 1.0, 1.5], &mut b)
            );
        }
    }

    #[test]
    fn bad_weights_are_rejected() {
        for weight in [-1.0, f64::NAN, f64::INFINITY] {
            let err = WeightedRandom::new(vec![
                WeightedItem::new('a', 1.0),
                WeightedItem::new('b', weight),
            ])
            .unwrap_err();
            assert!(
                matches!(err, ChainError::InvalidWeight { index: 1, .. }),
                "{weight}: {err:?}"
            );
        }
        let err = WeightedRandom::new(vec![WeightedItem::new(0u8, -0.5)]).unwrap_err();
        assert_eq!(err.to_string(), "item 0 has weight -0.5, expected a finite value >= 0");
    }

    #[test]
    fn empty_list_is_rejected() {
        let err = WeightedRandom::<u8>::new(Vec::new()).unwrap_err();
        assert_eq!(err, ChainError::EmptyDistribution);
    }
}
