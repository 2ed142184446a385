use std::collections::HashSet;
use std::path::{Path, PathBuf};

use clap::Parser;
use linear_cut::config::{DemandMode, OptimizerConfig, ProblemFile};
use linear_cut::error::{InputError, Table};
use linear_cut::input::{parse_demand_table, parse_item, parse_stock_table};
use linear_cut::optimizer::{Optimizer, Outcome};
use linear_cut::render;
use linear_cut::solver::HighsSolver;
use linear_cut::types::{CuttingPlan, DemandItem, StockItem};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "linear_cut",
    about = "1D cutting stock optimizer for bars and profiles"
)]
struct Cli {
    /// Stock bars as LENGTH:QTY (e.g. 6000:148 5400:30)
    #[arg(long, num_args = 1..)]
    stock: Vec<String>,

    /// Required pieces as LENGTH:QTY (e.g. 2465:45 2015:165)
    #[arg(long = "demand", num_args = 1..)]
    demands: Vec<String>,

    /// Stock table file with Length,Quantity rows
    #[arg(long)]
    stock_table: Option<PathBuf>,

    /// Demand table file with Length,Quantity rows
    #[arg(long)]
    demand_table: Option<PathBuf>,

    /// JSON problem file (stock, demands and optional settings)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Blade kerf width in mm (default: 5)
    #[arg(long)]
    kerf: Option<u32>,

    /// Solver time limit in seconds, 0 for none (default: 60)
    #[arg(long)]
    time_limit: Option<u32>,

    /// Demand constraint: exact or lower-bound (default: exact)
    #[arg(long, value_parser = parse_demand_mode)]
    mode: Option<DemandMode>,

    /// Reject best-effort plans from a solve that hit the time limit
    #[arg(long)]
    require_optimal: bool,

    /// Show ASCII layout of each pattern used
    #[arg(long)]
    layout: bool,

    /// Print the plan as JSON
    #[arg(long)]
    json: bool,

    /// Log pipeline progress to stderr
    #[arg(long, short)]
    verbose: bool,
}

fn parse_demand_mode(s: &str) -> Result<DemandMode, String> {
    s.parse()
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn read_table(path: &Path) -> String {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("cannot read {}: {}", path.display(), e)))
}

fn parse_items(items: &[String], table: Table) -> Result<Vec<(u32, u32)>, InputError> {
    items
        .iter()
        .enumerate()
        .map(|(i, s)| parse_item(s, table, i + 1))
        .collect()
}

fn load_problem(cli: &Cli) -> ProblemFile {
    let mut problem = match &cli.input {
        Some(path) => ProblemFile::load(path).unwrap_or_else(|e| fail(e)),
        None => ProblemFile {
            stock: Vec::new(),
            demands: Vec::new(),
            config: OptimizerConfig::default(),
        },
    };

    if let Some(path) = &cli.stock_table {
        let rows = parse_stock_table(&read_table(path)).unwrap_or_else(|e| fail(e));
        problem.stock.extend(rows);
    }
    if let Some(path) = &cli.demand_table {
        let rows = parse_demand_table(&read_table(path)).unwrap_or_else(|e| fail(e));
        problem.demands.extend(rows);
    }
    let stock = parse_items(&cli.stock, Table::Stock).unwrap_or_else(|e| fail(e));
    problem
        .stock
        .extend(stock.into_iter().map(|(l, q)| StockItem::new(l, q)));
    let demands = parse_items(&cli.demands, Table::Demand).unwrap_or_else(|e| fail(e));
    problem
        .demands
        .extend(demands.into_iter().map(|(l, q)| DemandItem::new(l, q)));

    if let Some(kerf) = cli.kerf {
        problem.config.kerf_width = kerf;
    }
    if let Some(secs) = cli.time_limit {
        problem.config.time_limit_secs = secs;
    }
    if let Some(mode) = cli.mode {
        problem.config.demand_mode = mode;
    }
    if cli.require_optimal {
        problem.config.accept_time_limit = false;
    }
    problem
}

fn print_plan(plan: &CuttingPlan, demands: &[DemandItem], kerf: u32, layout: bool) {
    println!("Cuts ({}):", plan.status);
    for cut in &plan.cuts {
        println!(
            "  #{:<4} {}mm  {}  consumed {}mm, kerf {}mm, waste {}mm, {:.2}%",
            cut.serial,
            cut.stock_length,
            cut.composition,
            cut.total_consumed,
            cut.kerf_loss,
            cut.waste,
            cut.utilization,
        );
    }
    println!();

    println!("Plan:");
    for row in &plan.summary {
        println!(
            "  {}mm x{}  {}  kerf {}mm, waste {}mm, {:.2}% avg, {:.2}% overall",
            row.stock_length,
            row.times_used,
            row.pattern,
            row.total_kerf_loss,
            row.total_waste,
            row.average_utilization,
            row.overall_utilization,
        );
    }
    println!();

    if layout {
        let mut drawn = HashSet::new();
        for cut in &plan.cuts {
            if drawn.insert((cut.stock_length, cut.composition.clone())) {
                println!("{}", render::legend(cut.stock_length, cut.total_consumed, cut.waste));
                print!("{}", render::render_bar(cut.stock_length, &cut.pieces, kerf));
                println!();
            }
        }
    }

    println!("Demand:");
    for (row, demand) in plan.demand_completion.iter().zip(demands) {
        println!(
            "  {}mm  {}/{}  {:.2}%{}",
            row.length,
            row.completed,
            demand.quantity,
            row.completion_rate,
            if row.produced > row.completed as u64 {
                format!(" ({} cut)", row.produced)
            } else {
                String::new()
            },
        );
    }
    println!();

    let stats = &plan.statistics;
    println!(
        "Summary: {} bar{} used, {}mm stock, {} piece{} ({}mm), {:.2}% utilization, max waste {}mm",
        stats.bars_used,
        if stats.bars_used == 1 { "" } else { "s" },
        stats.total_stock_length,
        stats.total_pieces,
        if stats.total_pieces == 1 { "" } else { "s" },
        stats.total_finished_length,
        stats.overall_utilization,
        stats.max_waste,
    );
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let problem = load_problem(&cli);
    if problem.stock.is_empty() {
        fail("no stock given, use --stock, --stock-table or --input");
    }
    if problem.demands.is_empty() {
        fail("no demand given, use --demand, --demand-table or --input");
    }

    let kerf = problem.config.kerf_width;
    let optimizer = Optimizer::new(HighsSolver::new(), problem.config);
    let outcome = optimizer
        .run(&problem.stock, &problem.demands)
        .unwrap_or_else(|e| fail(e));

    if cli.json {
        let json = serde_json::to_string_pretty(&outcome).unwrap_or_else(|e| fail(e));
        println!("{}", json);
        if outcome.plan().is_none() {
            std::process::exit(2);
        }
        return;
    }

    match outcome {
        Outcome::Planned(plan) => print_plan(&plan, &problem.demands, kerf, cli.layout),
        Outcome::Infeasible => {
            eprintln!("No feasible plan found");
            std::process::exit(2);
        }
        Outcome::TimeLimitExceeded { best_bars } => {
            match best_bars {
                Some(bars) => eprintln!(
                    "Time limit reached before optimality was proven (best found: {} bars)",
                    bars
                ),
                None => eprintln!("Time limit reached without a feasible plan"),
            }
            std::process::exit(2);
        }
        Outcome::Cancelled => {
            eprintln!("Cancelled");
            std::process::exit(2);
        }
    }
}
