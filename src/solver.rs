use crate::branch::BranchAndBound;
use crate::config::{SolverConfig, SolverKind};
use crate::error::CutError;
use crate::knapsack::Knapsack;
use crate::types::Inventory;

/// The pieces left to choose from once the forced piece is on the bar.
///
/// Lengths and capacity are divided by the gcd of the candidate lengths, which
/// scales every total length by the same factor and every squared score by its
/// square, so comparisons between assignments are unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarProblem {
    pub lengths: Vec<u64>,
    pub bounds: Vec<u32>,
    pub capacity: u64,
}

/// Counts chosen per candidate, with the two objective values they reach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub counts: Vec<u32>,
    pub used: u64,
    pub score: u128,
}

impl Selection {
    pub fn empty(n: usize) -> Self {
        Self {
            counts: vec![0; n],
            used: 0,
            score: 0,
        }
    }

    pub fn key(&self) -> (u64, u128) {
        (self.used, self.score)
    }
}

/// An exact solver for one bar.
///
/// Implementations must return an assignment within `bounds` and `capacity`
/// that maximises the used length first and the sum of squared lengths
/// second. They hold no state between calls.
pub trait BarSolver: Send + Sync {
    fn name(&self) -> &'static str;

    fn solve(&self, problem: &BarProblem) -> Result<Selection, CutError>;
}

pub fn solver_for(config: &SolverConfig) -> Box<dyn BarSolver> {
    match config.kind {
        SolverKind::DynamicProgramming => Box::new(Knapsack::new(config.max_table_cells)),
        SolverKind::BranchAndBound => Box::new(BranchAndBound::new(config.max_nodes)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BarOutcome {
    Cut {
        /// Cut lengths, longest first.
        pieces: Vec<u32>,
        remaining: Inventory,
    },
    NoFeasibleCut,
}

/// Picks the pieces for one bar out of `inventory`.
///
/// The longest piece still owed that fits the bar is always cut, the rest of
/// the bar is filled by `solver`. The input inventory is left untouched; the
/// decremented one is returned with the cut.
pub fn optimize_bar(
    solver: &dyn BarSolver,
    inventory: &Inventory,
    bar_length: u32,
) -> Result<BarOutcome, CutError> {
    let pieces = inventory.pieces();
    let Some(forced) = inventory.largest_available(bar_length) else {
        return Ok(BarOutcome::NoFeasibleCut);
    };
    let forced_length = pieces[forced].length;
    let capacity = (bar_length - forced_length) as u64;

    // (inventory index, length, how many may still go on this bar)
    let candidates: Vec<(usize, u64, u32)> = pieces
        .iter()
        .enumerate()
        .filter_map(|(i, p)| {
            let bound = if i == forced { p.quantity - 1 } else { p.quantity };
            (bound > 0 && p.length as u64 <= capacity).then_some((i, p.length as u64, bound))
        })
        .collect();

    let scale = candidates.iter().fold(0, |g, &(_, l, _)| gcd(g, l)).max(1);
    let problem = BarProblem {
        lengths: candidates.iter().map(|&(_, l, _)| l / scale).collect(),
        bounds: candidates.iter().map(|&(_, _, b)| b).collect(),
        capacity: capacity / scale,
    };

    let selection = if problem.lengths.is_empty() {
        Selection::empty(0)
    } else {
        solver.solve(&problem)?
    };
    if selection.counts.len() != candidates.len() || selection.used > problem.capacity {
        return Err(CutError::solver(
            solver.name(),
            format!(
                "returned an infeasible assignment: used {} of capacity {}",
                selection.used, problem.capacity
            ),
        ));
    }

    let mut counts = vec![0u32; pieces.len()];
    counts[forced] = 1;
    for (&(i, _, _), &n) in candidates.iter().zip(&selection.counts) {
        counts[i] += n;
    }

    let cut = pieces
        .iter()
        .zip(&counts)
        .flat_map(|(p, &n)| std::iter::repeat_n(p.length, n as usize))
        .collect();

    Ok(BarOutcome::Cut {
        pieces: cut,
        remaining: inventory.take(&counts),
    })
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}
