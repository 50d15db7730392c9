//! One-dimensional cutting stock: cut required piece lengths out of stock
//! bars of a single length, using as few bars and wasting as little of each
//! bar as the per-bar optimizer allows.

pub mod branch;
pub mod config;
pub mod error;
pub mod knapsack;
pub mod patterns;
pub mod planner;
pub mod render;
pub mod solver;
pub mod types;

use config::SolverConfig;
use error::CutError;
use patterns::PatternSummary;
use planner::Planner;
use types::{Inventory, validate_bar_length};

/// Validates raw client input, builds the cutting plan and summarises it by
/// pattern.
pub fn optimize(
    pieces: &[(i64, i64)],
    bar_length: i64,
    config: &SolverConfig,
) -> Result<PatternSummary, CutError> {
    let bar_length = validate_bar_length(bar_length)?;
    let inventory = Inventory::from_pairs(pieces)?;
    let plan = Planner::new(bar_length, config).plan(inventory)?;
    Ok(patterns::aggregate(&plan))
}
