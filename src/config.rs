use crate::error::CutError;

/// Exact backend used to pick the pieces for a single bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SolverKind {
    /// Bounded knapsack over bar length units.
    #[default]
    DynamicProgramming,
    /// Depth-first search over piece counts with bound pruning.
    BranchAndBound,
}

impl SolverKind {
    pub fn name(&self) -> &'static str {
        match self {
            SolverKind::DynamicProgramming => "dynamic-programming",
            SolverKind::BranchAndBound => "branch-and-bound",
        }
    }
}

impl std::str::FromStr for SolverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dp" | "dynamic-programming" => Ok(SolverKind::DynamicProgramming),
            "bnb" | "branch-and-bound" => Ok(SolverKind::BranchAndBound),
            _ => Err(format!("invalid solver '{}', expected: dp or bnb", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    pub kind: SolverKind,
    /// Upper bound on `items x capacity` cells for the knapsack table.
    pub max_table_cells: u64,
    /// Upper bound on search nodes visited per bar.
    pub max_nodes: u64,
}

impl SolverConfig {
    pub const DEFAULT_MAX_TABLE_CELLS: u64 = 50_000_000;
    pub const DEFAULT_MAX_NODES: u64 = 5_000_000;

    pub fn new(kind: SolverKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Sets the budget of whichever backend is selected.
    pub fn with_budget(mut self, budget: u64) -> Self {
        match self.kind {
            SolverKind::DynamicProgramming => self.max_table_cells = budget,
            SolverKind::BranchAndBound => self.max_nodes = budget,
        }
        self
    }

    /// Reads `CUT_SOLVER` and `CUT_SOLVER_BUDGET`, falling back to defaults.
    pub fn from_env() -> Result<Self, CutError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CutError> {
        let kind = match lookup("CUT_SOLVER") {
            Some(v) => v.parse::<SolverKind>().map_err(CutError::invalid)?,
            None => SolverKind::default(),
        };
        let config = Self::new(kind);
        match lookup("CUT_SOLVER_BUDGET") {
            Some(v) => {
                let budget = v.parse::<u64>().map_err(|_| {
                    CutError::invalid(format!("invalid CUT_SOLVER_BUDGET '{}'", v))
                })?;
                Ok(config.with_budget(budget))
            }
            None => Ok(config),
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            kind: SolverKind::default(),
            max_table_cells: Self::DEFAULT_MAX_TABLE_CELLS,
            max_nodes: Self::DEFAULT_MAX_NODES,
        }
    }
}
