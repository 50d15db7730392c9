use crate::error::CutError;
use crate::solver::{BarProblem, BarSolver, Selection};

const NAME: &str = "dynamic-programming";

/// Bounded knapsack over capacity units.
///
/// Quantities are split into power-of-two chunks so each chunk is a 0/1 item.
/// For every exactly reachable total the table keeps the best sum of squared
/// lengths, which answers both objectives at once: the largest reachable
/// total is the best fill, and its entry is the best squared score for that
/// fill.
#[derive(Debug, Clone, Copy)]
pub struct Knapsack {
    max_table_cells: u64,
}

#[derive(Debug, Clone, Copy)]
struct Chunk {
    item: usize,
    count: u32,
    weight: usize,
    score: u128,
}

impl Knapsack {
    pub fn new(max_table_cells: u64) -> Self {
        Self { max_table_cells }
    }

    fn chunks(problem: &BarProblem, capacity: u64) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let items = problem.lengths.iter().zip(&problem.bounds);
        for (item, (&length, &bound)) in items.enumerate() {
            if length == 0 || length > capacity {
                continue;
            }
            // more than capacity / length copies can never be used
            let mut left = bound.min((capacity / length).min(u32::MAX as u64) as u32);
            let mut count = 1u32;
            while left > 0 {
                let take = count.min(left);
                chunks.push(Chunk {
                    item,
                    count: take,
                    weight: (length * take as u64) as usize,
                    score: length as u128 * length as u128 * take as u128,
                });
                left -= take;
                count = count.saturating_mul(2);
            }
        }
        chunks
    }
}

impl BarSolver for Knapsack {
    fn name(&self) -> &'static str {
        NAME
    }

    fn solve(&self, problem: &BarProblem) -> Result<Selection, CutError> {
        let chunks = Self::chunks(problem, problem.capacity);
        // no assignment can use more than every chunk together
        let reachable = chunks
            .iter()
            .fold(0u64, |sum, chunk| sum.saturating_add(chunk.weight as u64))
            .min(problem.capacity);
        let cells = (chunks.len().max(1) as u64).saturating_mul(reachable + 1);
        if cells > self.max_table_cells {
            return Err(CutError::solver(
                NAME,
                format!(
                    "table of {} cells exceeds budget of {}",
                    cells, self.max_table_cells
                ),
            ));
        }
        let capacity = reachable as usize;
        let width = capacity + 1;

        let mut best: Vec<Option<u128>> = vec![None; width];
        best[0] = Some(0);
        let mut taken = vec![false; chunks.len() * width];

        for (j, chunk) in chunks.iter().enumerate() {
            for c in (chunk.weight..=capacity).rev() {
                let Some(prev) = best[c - chunk.weight] else {
                    continue;
                };
                let candidate = prev + chunk.score;
                if best[c].is_none_or(|current| candidate > current) {
                    best[c] = Some(candidate);
                    taken[j * width + c] = true;
                }
            }
        }

        // Phase A: the longest total any assignment reaches.
        let Some(used) = (0..width).rev().find(|&c| best[c].is_some()) else {
            return Err(CutError::solver(NAME, "no reachable total, not even zero"));
        };
        // Phase B: among assignments reaching it, the table holds the best squared score.
        let score = best[used].unwrap_or_default();

        let mut counts = vec![0u32; problem.lengths.len()];
        let mut c = used;
        for (j, chunk) in chunks.iter().enumerate().rev() {
            if taken[j * width + c] {
                counts[chunk.item] += chunk.count;
                c -= chunk.weight;
            }
        }
        if c != 0 {
            return Err(CutError::solver(
                NAME,
                format!("reconstruction left {} units unaccounted", c),
            ));
        }

        Ok(Selection {
            counts,
            used: used as u64,
            score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(lengths: &[u64], bounds: &[u32], capacity: u64) -> Selection {
        let problem = BarProblem {
            lengths: lengths.to_vec(),
            bounds: bounds.to_vec(),
            capacity,
        };
        Knapsack::new(u64::MAX).solve(&problem).unwrap()
    }

    #[test]
    fn test_exact_fill() {
        let sel = solve(&[7, 5, 3], &[1, 2, 3], 13);
        assert_eq!(sel.used, 13);
        // 7+3+3 (score 67) beats 5+5+3 (score 59)
        assert_eq!(sel.counts, vec![1, 0, 2]);
        assert_eq!(sel.score, 67);
    }

    #[test]
    fn test_respects_bounds() {
        let sel = solve(&[4], &[2], 100);
        assert_eq!(sel.counts, vec![2]);
        assert_eq!(sel.used, 8);
    }

    #[test]
    fn test_large_bound_binary_split() {
        // 1000 copies available but only 33 fit
        let sel = solve(&[3], &[1000], 100);
        assert_eq!(sel.counts, vec![33]);
        assert_eq!(sel.used, 99);
    }

    #[test]
    fn test_nothing_fits() {
        let sel = solve(&[11, 12], &[1, 1], 10);
        assert_eq!(sel.counts, vec![0, 0]);
        assert_eq!(sel.key(), (0, 0));
    }

    #[test]
    fn test_table_sized_to_demand_not_bar() {
        let problem = BarProblem {
            lengths: vec![3, 1],
            bounds: vec![2, 1],
            capacity: 4_000_000_000,
        };
        let sel = Knapsack::new(100).solve(&problem).unwrap();
        assert_eq!(sel.counts, vec![2, 1]);
        assert_eq!(sel.key(), (7, 19));
    }

    #[test]
    fn test_budget_exceeded() {
        let problem = BarProblem {
            lengths: vec![1, 2, 3],
            bounds: vec![1, 1, 1],
            capacity: 1_000,
        };
        let err = Knapsack::new(10).solve(&problem).unwrap_err();
        assert!(matches!(err, CutError::SolverFailure { backend: NAME, .. }));
    }
}
