use crate::config::SolverConfig;
use crate::error::CutError;
use crate::solver::{BarOutcome, BarSolver, optimize_bar, solver_for};
use crate::types::{BarCut, CuttingPlan, Inventory, PlanMetrics};

/// Turns the single-bar solver into a full cutting plan by cutting bars until
/// the inventory is used up or nothing more fits.
pub struct Planner {
    bar_length: u32,
    solver: Box<dyn BarSolver>,
}

impl Planner {
    pub fn new(bar_length: u32, config: &SolverConfig) -> Self {
        Self::with_solver(bar_length, solver_for(config))
    }

    pub fn with_solver(bar_length: u32, solver: Box<dyn BarSolver>) -> Self {
        Self { bar_length, solver }
    }

    pub fn plan(&self, inventory: Inventory) -> Result<CuttingPlan, CutError> {
        let mut working = inventory;
        let mut bars = Vec::new();
        let mut metrics = PlanMetrics::default();

        loop {
            working.sort_descending();
            if working.is_exhausted() {
                break;
            }

            match optimize_bar(self.solver.as_ref(), &working, self.bar_length)? {
                BarOutcome::Cut { pieces, remaining } => {
                    debug_assert!(remaining.total_quantity() < working.total_quantity());
                    let bar = BarCut {
                        waste: self.bar_length - pieces.iter().sum::<u32>(),
                        pieces,
                    };
                    tracing::trace!(
                        bar = bars.len() + 1,
                        pieces = ?bar.pieces,
                        waste = bar.waste,
                        "cut bar"
                    );
                    metrics.total_waste += bar.waste as u64;
                    metrics.total_pieces_cut += bar.piece_count() as u64;
                    bars.push(bar);
                    working = remaining;
                }
                BarOutcome::NoFeasibleCut => break,
            }
        }

        let leftover = working.remaining();
        tracing::debug!(
            solver = self.solver.name(),
            bars = bars.len(),
            total_waste = metrics.total_waste,
            total_pieces_cut = metrics.total_pieces_cut,
            leftover = leftover.total_quantity(),
            "cutting plan complete"
        );

        Ok(CuttingPlan {
            bar_length: self.bar_length,
            bars,
            metrics,
            leftover,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverKind;
    use crate::types::PieceType;

    /// Checks the bookkeeping every plan must satisfy:
    /// 1. No bar holds more than the bar length
    /// 2. Per-bar waste is the unused length and the totals add up
    /// 3. Cut pieces plus leftover account for every requested piece
    fn assert_plan_valid(plan: &CuttingPlan, requested: &Inventory) {
        let mut waste = 0u64;
        let mut pieces = 0u64;
        for (i, bar) in plan.bars.iter().enumerate() {
            assert!(
                bar.used_length() <= plan.bar_length as u64,
                "bar {i} overfilled: {:?} in {}",
                bar.pieces,
                plan.bar_length
            );
            assert_eq!(
                bar.waste as u64,
                plan.bar_length as u64 - bar.used_length(),
                "bar {i} waste mismatch"
            );
            waste += bar.waste as u64;
            pieces += bar.piece_count() as u64;
        }
        assert_eq!(plan.metrics.total_waste, waste);
        assert_eq!(plan.metrics.total_pieces_cut, pieces);

        for p in requested.pieces() {
            let cut = plan
                .bars
                .iter()
                .flat_map(|b| &b.pieces)
                .filter(|&&l| l == p.length)
                .count() as u32;
            let left = plan
                .leftover
                .pieces()
                .iter()
                .find(|q| q.length == p.length)
                .map_or(0, |q| q.quantity);
            assert_eq!(cut + left, p.quantity, "length {} not accounted for", p.length);
        }
    }

    fn build(pieces: &[(u32, u32)], bar_length: u32) -> (CuttingPlan, Inventory) {
        let inventory = Inventory::new(pieces.iter().map(|&(l, q)| PieceType::new(l, q)));
        let plan = Planner::new(bar_length, &SolverConfig::default())
            .plan(inventory.clone())
            .unwrap();
        assert_plan_valid(&plan, &inventory);
        (plan, inventory)
    }

    #[test]
    fn test_two_lengths_two_bars() {
        let (plan, _) = build(&[(100, 2), (50, 3)], 200);
        assert_eq!(plan.bar_count(), 2);
        assert_eq!(plan.bars[0].pieces, vec![100, 100]);
        assert_eq!(plan.bars[1].pieces, vec![50, 50, 50]);
        assert_eq!(plan.metrics.total_waste, 50);
        assert_eq!(plan.metrics.total_pieces_cut, 5);
        assert!(plan.leftover.pieces().is_empty());
    }

    #[test]
    fn test_piece_longer_than_bar() {
        let (plan, _) = build(&[(150, 1)], 100);
        assert_eq!(plan.bar_count(), 0);
        assert_eq!(plan.metrics, PlanMetrics::default());
        assert_eq!(plan.leftover.pieces(), &[PieceType::new(150, 1)]);
    }

    #[test]
    fn test_exact_pair() {
        let (plan, _) = build(&[(60, 1), (40, 1)], 100);
        assert_eq!(plan.bar_count(), 1);
        assert_eq!(plan.bars[0].pieces, vec![60, 40]);
        assert_eq!(plan.metrics.total_waste, 0);
    }

    #[test]
    fn test_duplicate_lengths_each_on_own_bar() {
        let (plan, _) = build(&[(70, 1), (70, 1)], 100);
        assert_eq!(plan.bar_count(), 2);
        assert!(plan.bars.iter().all(|b| b.pieces == vec![70] && b.waste == 30));
        assert_eq!(plan.metrics.total_waste, 60);
    }

    #[test]
    fn test_empty_inventory() {
        let (plan, _) = build(&[], 100);
        assert_eq!(plan.bar_count(), 0);
        let (plan, _) = build(&[(40, 0)], 100);
        assert_eq!(plan.bar_count(), 0);
        assert!(plan.leftover.pieces().is_empty());
    }

    #[test]
    fn test_fitting_pieces_cut_around_oversized() {
        let (plan, _) = build(&[(250, 2), (90, 3), (10, 1)], 200);
        assert_eq!(plan.bars[0].pieces, vec![90, 90, 10]);
        assert_eq!(plan.bars[1].pieces, vec![90]);
        assert_eq!(plan.leftover.pieces(), &[PieceType::new(250, 2)]);
    }

    #[test]
    fn test_realistic_batch_both_backends() {
        let pieces = [
            (2400, 4),
            (1800, 6),
            (1250, 9),
            (900, 12),
            (640, 7),
            (400, 15),
            (225, 10),
        ];
        let inventory = Inventory::new(pieces.iter().map(|&(l, q)| PieceType::new(l, q)));
        let dp = Planner::new(6000, &SolverConfig::new(SolverKind::DynamicProgramming))
            .plan(inventory.clone())
            .unwrap();
        let bnb = Planner::new(6000, &SolverConfig::new(SolverKind::BranchAndBound))
            .plan(inventory.clone())
            .unwrap();
        assert_plan_valid(&dp, &inventory);
        assert_plan_valid(&bnb, &inventory);
        assert!(dp.leftover.pieces().is_empty());

        // Lower bound: total requested length / bar length
        let total: u64 = pieces.iter().map(|&(l, q)| l as u64 * q as u64).sum();
        assert!(dp.bar_count() as u64 >= total.div_ceil(6000));
        assert!(bnb.leftover.pieces().is_empty());
        // both backends reach the same fill on the first bar
        assert_eq!(dp.bars[0].used_length(), bnb.bars[0].used_length());
    }

    #[test]
    fn test_solver_failure_propagates() {
        let inventory = Inventory::new([PieceType::new(5, 40), PieceType::new(3, 40)]);
        let config = SolverConfig::new(SolverKind::BranchAndBound).with_budget(2);
        let err = Planner::new(101, &config).plan(inventory).unwrap_err();
        assert!(matches!(err, CutError::SolverFailure { .. }));
    }
}
