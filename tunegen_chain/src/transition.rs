// Transition tables: raw domain weights → row-stochastic matrix.
//
// Generators describe a chain as "from state s, go to these states with
// these weights". Rows need not be normalized and may omit targets (an
// omitted target has weight zero). The key order of the table fixes the
// state order used by every matrix and vector in the engine.
//
// Validation happens here, once, so the rest of the engine can assume a
// closed, square, dead-end-free table.

use crate::error::ChainError;
use crate::linalg::Matrix;
use crate::weighted::WeightedItem;
use std::fmt::Debug;

/// Bound for chain states: a small closed set of comparable values,
/// typically a fieldless enum.
pub trait ChainState: Clone + PartialEq + Debug {}

impl<T: Clone + PartialEq + Debug> ChainState for T {}

/// A validated, normalized transition table.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionTable<S> {
    states: Vec<S>,
    matrix: Matrix,
}

impl<S: ChainState> TransitionTable<S> {
    /// Validate and normalize a weight table.
    ///
    /// Fails with [`ChainError::InvalidTransitionSpec`] when the table is
    /// empty, repeats a state, names an unknown target, carries a negative
    /// or non-finite weight, has a row with no positive weight, or never
    /// lists some state as a target.
    pub fn new<I>(rows: I) -> Result<Self, ChainError>
    where
        I: IntoIterator<Item = (S, Vec<WeightedItem<S>>)>,
    {
        let rows: Vec<(S, Vec<WeightedItem<S>>)> = rows.into_iter().collect();
        if rows.is_empty() {
            return Err(ChainError::invalid("transition table has no states"));
        }

        let mut states: Vec<S> = Vec::with_capacity(rows.len());
        for (state, _) in &rows {
            if states.contains(state) {
                return Err(ChainError::invalid(format!(
                    "state {state:?} appears twice as a table key"
                )));
            }
            states.push(state.clone());
        }

        let n = states.len();
        let mut matrix = Matrix::zeros(n);
        let mut referenced = vec![false; n];

        for (i, (from, targets)) in rows.iter().enumerate() {
            let mut seen = vec![false; n];
            let mut total = 0.0;
            for item in targets {
                let j = states.iter().position(|s| *s == item.value).ok_or_else(|| {
                    ChainError::invalid(format!(
                        "state {from:?} lists unknown target {:?}",
                        item.value
                    ))
                })?;
                if seen[j] {
                    return Err(ChainError::invalid(format!(
                        "state {from:?} lists target {:?} twice",
                        item.value
                    )));
                }
                if !item.weight.is_finite() || item.weight < 0.0 {
                    return Err(ChainError::invalid(format!(
                        "state {from:?} → {:?} has weight {}, expected a finite value >= 0",
                        item.value, item.weight
                    )));
                }
                seen[j] = true;
                referenced[j] = true;
                matrix.set(i, j, item.weight);
                total += item.weight;
            }
            if total <= 0.0 {
                return Err(ChainError::invalid(format!(
                    "state {from:?} has no positive outgoing weight"
                )));
            }
            for j in 0..n {
                matrix.set(i, j, matrix.get(i, j) / total);
            }
        }

        if let Some(j) = referenced.iter().position(|&r| !r) {
            return Err(ChainError::invalid(format!(
                "state {:?} is never listed as a target",
                states[j]
            )));
        }

        Ok(TransitionTable { states, matrix })
    }

    /// States in table-key order.
    pub fn states(&self) -> &[S] {
        &self.states
    }

    /// The row-stochastic matrix P.
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
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

    /// One-step probability `P(from → to)`, or `None` for unknown states.
    pub fn probability(&self, from: &S, to: &S) -> Option<f64> {
        Some(self.matrix.get(self.index_of(from)?, self.index_of(to)?))
    }

    pub(crate) fn into_parts(self) -> (Vec<S>, Matrix) {
        (self.states, self.matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w<S>(value: S, weight: f64) -> WeightedItem<S> {
        WeightedItem::new(value, weight)
    }

    fn reason(err: ChainError) -> String {
        match err {
            ChainError::InvalidTransitionSpec { reason } => reason,
            other => panic!("expected InvalidTransitionSpec, got {other:?}"),
        }
    }

    #[test]
    fn rows_are_normalized_independently() {
        let table = TransitionTable::new(vec![
            ('a', vec![w('a', 1.0), w('b', 3.0)]),
            ('b', vec![w('a', 10.0), w('b', 10.0)]),
        ])
        .unwrap();
        assert_eq!(table.matrix().row(0), &[0.25, 0.75]);
        assert_eq!(table.matrix().row(1), &[0.5, 0.5]);
        assert_eq!(table.probability(&'a', &'b'), Some(0.75));
        assert_eq!(table.probability(&'a', &'z'), None);
    }

    #[test]
    fn omitted_targets_are_zero() {
        let table = TransitionTable::new(vec![
            (0u8, vec![w(1, 1.0)]),
            (1u8, vec![w(0, 1.0), w(1, 1.0)]),
        ])
        .unwrap();
        assert_eq!(table.matrix().row(0), &[0.0, 1.0]);
    }

    #[test]
    fn empty_table_rejected() {
        let rows: Vec<(u8, Vec<WeightedItem<u8>>)> = Vec::new();
        assert!(reason(TransitionTable::new(rows).unwrap_err()).contains("no states"));
    }

    #[test]
    fn unknown_target_rejected() {
        let err = TransitionTable::new(vec![(0u8, vec![w(0, 1.0), w(7, 1.0)])]).unwrap_err();
        assert!(reason(err).contains("unknown target 7"));
    }

    #[test]
    fn duplicate_key_rejected() {
        let err = TransitionTable::new(vec![
            (0u8, vec![w(0, 1.0)]),
            (0u8, vec![w(0, 1.0)]),
        ])
        .unwrap_err();
        assert!(reason(err).contains("twice as a table key"));
    }

    #[test]
    fn duplicate_target_rejected() {
        let err = TransitionTable::new(vec![(0u8, vec![w(0, 1.0), w(0, 2.0)])]).unwrap_err();
        assert!(reason(err).contains("twice"));
    }

    #[test]
    fn dead_end_row_rejected() {
        let err = TransitionTable::new(vec![
            ('x', vec![w('x', 0.5), w('y', 0.5)]),
            ('y', vec![w('x', 0.0), w('y', 0.0)]),
        ])
        .unwrap_err();
        assert!(reason(err).contains("'y' has no positive outgoing weight"));
    }

    #[test]
    fn negative_and_nan_weights_rejected() {
        let err = TransitionTable::new(vec![(0u8, vec![w(0, -1.0)])]).unwrap_err();
        assert!(reason(err).contains("weight -1"));
        let err = TransitionTable::new(vec![(0u8, vec![w(0, f64::NAN)])]).unwrap_err();
        assert!(reason(err).contains("NaN"));
    }

    #[test]
    fn unreferenced_state_rejected() {
        let err = TransitionTable::new(vec![
            ('x', vec![w('x', 1.0)]),
            ('y', vec![w('x', 1.0)]),
        ])
        .unwrap_err();
        assert!(reason(err).contains("'y' is never listed as a target"));
    }
}
