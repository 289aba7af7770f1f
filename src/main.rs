//! permu-eval - Command Line Interface
//!
//! Evaluates permutations against QAP, PFSP and LOP benchmark instances and
//! samples permutations from a Plackett-Luce model.

use clap::{Parser, Subcommand, ValueEnum};
use permu_eval::distributions::PlackettLuce;
use permu_eval::problems::{load_evaluator, EvalConfig, Evaluator, PfspObjective, ProblemKind};
use serde::Serialize;

use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "permu-eval")]
#[command(version = "1.0")]
#[command(about = "Evaluate permutations on QAP, PFSP and LOP instances")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a batch of permutations
    Evaluate {
        /// Problem type of the instance
        #[arg(short, long, value_enum)]
        problem: Problem,

        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,

        /// JSON file holding an array of permutations
        #[arg(long)]
        permutations: PathBuf,

        /// Flow-shop objective
        #[arg(long, value_enum, default_value = "makespan")]
        objective: Objective,

        /// Disable parallel evaluation
        #[arg(long)]
        sequential: bool,

        /// Export costs to CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Sample permutations from a Plackett-Luce model
    Sample {
        /// Comma-separated positive weights
        #[arg(short, long, value_delimiter = ',', required = true)]
        weights: Vec<f64>,

        /// Number of permutations
        #[arg(short, long, default_value = "10")]
        count: usize,

        /// Random seed (OS entropy when omitted)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Draw in parallel (requires a seed for reproducibility)
        #[arg(long)]
        parallel: bool,
    },

    /// Analyze an instance
    Analyze {
        #[arg(short, long, value_enum)]
        problem: Problem,

        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Problem {
    /// Quadratic Assignment (QAPLIB)
    Qap,
    /// Permutation Flow Shop (Taillard)
    Pfsp,
    /// Linear Ordering (LOLIB)
    Lop,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Objective {
    /// Completion time of the last job
    Makespan,
    /// Sum of job completion times
    Flowtime,
}

#[derive(Serialize)]
struct CostRecord {
    index: usize,
    cost: i64,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate { problem, instance, permutations, objective, sequential, output } => {
            evaluate(problem, &instance, &permutations, objective, sequential, output);
        }

        Commands::Sample { weights, count, seed, parallel } => {
            sample(weights, count, seed, parallel);
        }

        Commands::Analyze { problem, instance } => {
            analyze(problem, &instance);
        }
    }
}

fn fail(context: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", context, err);
    std::process::exit(1);
}

fn problem_kind(problem: Problem) -> ProblemKind {
    match problem {
        Problem::Qap => ProblemKind::Qap,
        Problem::Pfsp => ProblemKind::Pfsp,
        Problem::Lop => ProblemKind::Lop,
    }
}

fn load(problem: Problem, path: &Path, config: EvalConfig) -> Box<dyn Evaluator> {
    log::info!("loading {:?} instance from {:?}", problem, path);

    match load_evaluator(problem_kind(problem), path, config) {
        Ok(evaluator) => evaluator,
        Err(e) => fail("Error loading instance", e),
    }
}

fn evaluate(
    problem: Problem,
    instance: &Path,
    permutations: &Path,
    objective: Objective,
    sequential: bool,
    output: Option<PathBuf>,
) {
    let config = if sequential { EvalConfig::sequential() } else { EvalConfig::default() };
    let config = config.with_pfsp_objective(match objective {
        Objective::Makespan => PfspObjective::Makespan,
        Objective::Flowtime => PfspObjective::TotalFlowTime,
    });
    let evaluator = load(problem, instance, config);

    let text = match std::fs::read_to_string(permutations) {
        Ok(text) => text,
        Err(e) => fail("Error reading permutations", e),
    };
    let batch: Vec<Vec<usize>> = match serde_json::from_str(&text) {
        Ok(batch) => batch,
        Err(e) => fail("Error parsing permutations", e),
    };

    let start = Instant::now();
    let costs = match evaluator.evaluate(&batch) {
        Ok(costs) => costs,
        Err(e) => fail("Evaluation failed", e),
    };
    let elapsed = start.elapsed();

    println!("========== Results ==========");
    println!("Problem: {}", evaluator.kind());
    println!("Permutations: {}", costs.len());
    if let Some(best) = costs.iter().min() {
        println!("Best cost: {}", best);
    }
    println!("Time: {:.4}s", elapsed.as_secs_f64());
    for (i, cost) in costs.iter().enumerate() {
        println!("{:>6} {}", i, cost);
    }

    if let Some(out_path) = output {
        if let Err(e) = export_costs(&out_path, &costs) {
            fail("Failed to write CSV", e);
        }
        println!("\nCosts exported to {:?}", out_path);
    }
}

fn export_costs(path: &Path, costs: &[i64]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    for (index, &cost) in costs.iter().enumerate() {
        writer.serialize(CostRecord { index, cost })?;
    }
    writer.flush()?;
    Ok(())
}

fn sample(weights: Vec<f64>, count: usize, seed: Option<u64>, parallel: bool) {
    let model = match PlackettLuce::new(weights) {
        Ok(model) => model,
        Err(e) => fail("Invalid weights", e),
    };

    log::info!("sampling {} permutations of size {}", count, model.len());

    let samples = match (parallel, seed) {
        (true, Some(seed)) => model.sample_par(seed, count),
        (true, None) => model.sample_par(rand::random(), count),
        (false, seed) => match permu_eval::sample_plackett_luce(model.weights(), count, seed) {
            Ok(samples) => samples,
            Err(e) => fail("Sampling failed", e),
        },
    };

    match serde_json::to_string(&samples) {
        Ok(json) => println!("{}", json),
        Err(e) => fail("Failed to serialize samples", e),
    }
}

fn analyze(problem: Problem, path: &Path) {
    let evaluator = load(problem, path, EvalConfig::default());

    println!("========== Instance Analysis ==========\n");
    println!("{}", evaluator.summary());

    let identity = permu_eval::permutation::identity(evaluator.size());
    match evaluator.cost(&identity) {
        Ok(cost) => println!("Identity permutation cost: {}", cost),
        Err(e) => fail("Evaluation failed", e),
    }
}
