use bar_cutter::config::{SolverConfig, SolverKind};
use bar_cutter::patterns;
use bar_cutter::planner::Planner;
use bar_cutter::render;
use bar_cutter::types::{Inventory, validate_bar_length};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "bar_cutter",
    about = "1D cutting stock optimizer for bars of a single length"
)]
struct Cli {
    /// Stock bar length (e.g. 6000)
    #[arg(long, allow_negative_numbers = true)]
    bar_length: i64,

    /// Pieces as LEN:QTY (e.g. 1200:3 800:5)
    #[arg(long = "pieces", num_args = 1..)]
    pieces: Vec<String>,

    /// Single-bar solver: dp or bnb
    #[arg(long, default_value = "dp")]
    solver: SolverKind,

    /// Solver budget: table cells for dp, search nodes for bnb
    #[arg(long)]
    budget: Option<u64>,

    /// Show ASCII layout of each bar
    #[arg(long)]
    layout: bool,

    /// Print the pattern summary as JSON
    #[arg(long)]
    json: bool,
}

fn parse_piece(s: &str) -> Result<(i64, i64), String> {
    let (length, qty) = s
        .split_once(':')
        .ok_or_else(|| format!("invalid piece '{}', expected LEN:QTY", s))?;
    let length = length
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("invalid length in '{}'", s))?;
    let qty = qty
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("invalid quantity in '{}'", s))?;
    Ok((length, qty))
}

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", e);
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    let pairs: Vec<(i64, i64)> = cli
        .pieces
        .iter()
        .map(|p| parse_piece(p))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| fail(e));

    let bar_length = validate_bar_length(cli.bar_length).unwrap_or_else(|e| fail(e));
    let inventory = Inventory::from_pairs(&pairs).unwrap_or_else(|e| fail(e));

    let mut config = SolverConfig::new(cli.solver);
    if let Some(budget) = cli.budget {
        config = config.with_budget(budget);
    }

    let plan = Planner::new(bar_length, &config)
        .plan(inventory)
        .unwrap_or_else(|e| fail(e));
    let summary = patterns::aggregate(&plan);

    if cli.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(e),
        }
        return;
    }

    for (i, bar) in plan.bars.iter().enumerate() {
        println!(
            "Bar {}: {} (waste {})",
            i + 1,
            patterns::pattern_label(&patterns::group_lengths(&bar.pieces)),
            bar.waste
        );
        if cli.layout {
            print!("{}", render::render_bar(bar_length, bar));
        }
    }
    if !plan.bars.is_empty() {
        println!();
    }

    println!("Patterns:");
    print!("{}", render::render_summary(bar_length, &summary));
}
