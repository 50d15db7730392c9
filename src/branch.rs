use crate::error::CutError;
use crate::solver::{BarProblem, BarSolver, Selection};

const NAME: &str = "branch-and-bound";

/// Depth-first search over piece counts, longest piece type first.
///
/// Each level fixes the count of one piece type, trying the largest count that
/// fits before smaller ones. A branch is cut when an optimistic completion
/// cannot beat the incumbent on `(used length, squared score)`.
#[derive(Debug, Clone, Copy)]
pub struct BranchAndBound {
    max_nodes: u64,
}

struct Search<'a> {
    lengths: &'a [u64],
    bounds: &'a [u32],
    /// Total length of everything from index `i` on, capped by capacity.
    suffix: Vec<u64>,
    counts: Vec<u32>,
    best: Selection,
    nodes: u64,
    max_nodes: u64,
}

impl BranchAndBound {
    pub fn new(max_nodes: u64) -> Self {
        Self { max_nodes }
    }
}

impl BarSolver for BranchAndBound {
    fn name(&self) -> &'static str {
        NAME
    }

    fn solve(&self, problem: &BarProblem) -> Result<Selection, CutError> {
        let n = problem.lengths.len();
        // search order: longest first, so the score bound at each level holds
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| problem.lengths[b].cmp(&problem.lengths[a]));
        let lengths: Vec<u64> = order.iter().map(|&i| problem.lengths[i]).collect();
        let bounds: Vec<u32> = order.iter().map(|&i| problem.bounds[i]).collect();

        let mut suffix = vec![0u64; n + 1];
        for i in (0..n).rev() {
            suffix[i] = suffix[i + 1]
                .saturating_add(lengths[i].saturating_mul(bounds[i] as u64))
                .min(problem.capacity);
        }

        let mut search = Search {
            lengths: &lengths,
            bounds: &bounds,
            suffix,
            counts: vec![0; n],
            best: Selection::empty(n),
            nodes: 0,
            max_nodes: self.max_nodes,
        };
        search.recurse(0, problem.capacity, 0, 0)?;

        let mut counts = vec![0u32; n];
        for (pos, &i) in order.iter().enumerate() {
            counts[i] = search.best.counts[pos];
        }
        Ok(Selection {
            counts,
            used: search.best.used,
            score: search.best.score,
        })
    }
}

impl Search<'_> {
    fn recurse(&mut self, idx: usize, room: u64, used: u64, score: u128) -> Result<(), CutError> {
        self.nodes += 1;
        if self.nodes > self.max_nodes {
            return Err(CutError::solver(
                NAME,
                format!("node budget of {} exhausted", self.max_nodes),
            ));
        }

        if (used, score) > self.best.key() {
            self.best = Selection {
                counts: self.counts.clone(),
                used,
                score,
            };
        }
        if idx == self.lengths.len() || room == 0 {
            return Ok(());
        }

        // Every remaining piece is at most lengths[idx] long, so each unit of
        // length still to be placed adds at most lengths[idx] to the score.
        let extra = self.suffix[idx].min(room);
        let bound = (used + extra, score + extra as u128 * self.lengths[idx] as u128);
        if bound <= self.best.key() {
            return Ok(());
        }

        let length = self.lengths[idx];
        let most = (self.bounds[idx] as u64).min(room / length) as u32;
        for count in (0..=most).rev() {
            let len = length * count as u64;
            self.counts[idx] = count;
            self.recurse(
                idx + 1,
                room - len,
                used + len,
                score + length as u128 * len as u128,
            )?;
        }
        self.counts[idx] = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knapsack::Knapsack;

    fn problem(lengths: &[u64], bounds: &[u32], capacity: u64) -> BarProblem {
        BarProblem {
            lengths: lengths.to_vec(),
            bounds: bounds.to_vec(),
            capacity,
        }
    }

    #[test]
    fn test_exact_fill() {
        let sel = BranchAndBound::new(u64::MAX)
            .solve(&problem(&[7, 5, 3], &[1, 2, 3], 13))
            .unwrap();
        assert_eq!(sel.counts, vec![1, 0, 2]);
        assert_eq!(sel.key(), (13, 67));
    }

    #[test]
    fn test_unsorted_input_maps_back() {
        let sel = BranchAndBound::new(u64::MAX)
            .solve(&problem(&[3, 7], &[3, 1], 13))
            .unwrap();
        assert_eq!(sel.counts, vec![2, 1]);
    }

    #[test]
    fn test_agrees_with_knapsack() {
        let cases: &[(&[u64], &[u32], u64)] = &[
            (&[12, 9, 8, 5, 2], &[1, 3, 2, 4, 9], 37),
            (&[23, 17, 11, 4], &[2, 2, 5, 1], 60),
            (&[6, 4], &[10, 10], 15),
            (&[9], &[1], 8),
        ];
        for &(lengths, bounds, capacity) in cases {
            let p = problem(lengths, bounds, capacity);
            let bnb = BranchAndBound::new(u64::MAX).solve(&p).unwrap();
            let dp = Knapsack::new(u64::MAX).solve(&p).unwrap();
            assert_eq!(
                bnb.key(),
                dp.key(),
                "backends disagree on {:?} / {:?} / {}",
                lengths,
                bounds,
                capacity
            );
        }
    }

    #[test]
    fn test_node_budget() {
        let err = BranchAndBound::new(3)
            .solve(&problem(&[5, 4, 3, 2], &[3, 3, 3, 3], 29))
            .unwrap_err();
        assert!(matches!(err, CutError::SolverFailure { backend: NAME, .. }));
    }
}
