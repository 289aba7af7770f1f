//! Benchmark problems and their batch evaluators.
//!
//! Each problem module provides an immutable instance type, loaded once from
//! a benchmark file, and an evaluator that owns it. Evaluators share the
//! [`Evaluator`] trait: a whole batch is validated first, then every
//! permutation is costed independently (in parallel for large batches) and
//! the costs are returned in input order.

pub mod lop;
pub(crate) mod parse;
pub mod pfsp;
pub mod qap;

pub use lop::{LopEvaluator, LopInstance};
pub use pfsp::{PfspEvaluator, PfspInstance, PfspObjective};
pub use qap::{QapEvaluator, QapInstance};

use crate::error::{Error, Result};
use crate::permutation;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Numeric type of matrix entries and costs.
pub type Cost = i64;

/// Problem families supported by the loaders.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemKind {
    Qap,
    Pfsp,
    Lop,
}

impl std::fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProblemKind::Qap => write!(f, "QAP"),
            ProblemKind::Pfsp => write!(f, "PFSP"),
            ProblemKind::Lop => write!(f, "LOP"),
        }
    }
}

impl std::str::FromStr for ProblemKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "qap" => Ok(ProblemKind::Qap),
            "pfsp" => Ok(ProblemKind::Pfsp),
            "lop" => Ok(ProblemKind::Lop),
            other => Err(format!("unknown problem kind: {}", other)),
        }
    }
}

/// Batch evaluation settings.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Evaluate batches on the rayon thread pool
    pub parallel: bool,
    /// Batches shorter than this are evaluated sequentially
    pub min_parallel_batch: usize,
    /// Objective of flow-shop evaluators, ignored by the other problems
    pub pfsp_objective: PfspObjective,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            parallel: true,
            min_parallel_batch: 64,
            pfsp_objective: PfspObjective::Makespan,
        }
    }
}

impl EvalConfig {
    /// Configuration that never spawns parallel work.
    pub fn sequential() -> Self {
        EvalConfig {
            parallel: false,
            ..Default::default()
        }
    }

    pub fn with_pfsp_objective(mut self, objective: PfspObjective) -> Self {
        self.pfsp_objective = objective;
        self
    }
}

/// Cost function over permutations of a loaded instance.
pub trait Evaluator: Send + Sync {
    fn kind(&self) -> ProblemKind;

    /// Required permutation length.
    fn size(&self) -> usize;

    fn config(&self) -> &EvalConfig;

    /// Cost of a permutation already known to be valid.
    ///
    /// Panics on out-of-range values; use [`Evaluator::cost`] for unchecked input.
    fn permutation_cost(&self, permutation: &[usize]) -> Cost;

    /// Validated cost of a single permutation.
    fn cost(&self, permutation: &[usize]) -> Result<Cost> {
        permutation::check(permutation, self.size()).map_err(|defect| Error::from_defect(0, defect))?;
        Ok(self.permutation_cost(permutation))
    }

    /// Costs of a batch, in input order. Fails on the first invalid permutation.
    fn evaluate(&self, batch: &[Vec<usize>]) -> Result<Vec<Cost>> {
        permutation::validate_batch(batch, self.size())?;

        let config = self.config();
        if config.parallel && batch.len() >= config.min_parallel_batch {
            log::debug!(
                "{}: evaluating {} permutations in parallel",
                self.kind(),
                batch.len()
            );
            Ok(batch.par_iter().map(|p| self.permutation_cost(p)).collect())
        } else {
            Ok(batch.iter().map(|p| self.permutation_cost(p)).collect())
        }
    }

    /// Evaluate several batches in parallel, one cost vector per batch.
    fn evaluate_batches(&self, batches: &[Vec<Vec<usize>>]) -> Result<Vec<Vec<Cost>>> {
        batches.par_iter().map(|batch| self.evaluate(batch)).collect()
    }

    fn summary(&self) -> InstanceSummary;
}

/// Short description of a loaded instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceSummary {
    pub kind: ProblemKind,
    pub name: String,
    pub size: usize,
    /// Number of machines (PFSP only)
    pub machines: Option<usize>,
    pub min_value: Cost,
    pub max_value: Cost,
    pub mean_value: f64,
}

impl std::fmt::Display for InstanceSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {} ({})", self.name, self.kind)?;
        writeln!(f, "  Size: {}", self.size)?;
        if let Some(machines) = self.machines {
            writeln!(f, "  Machines: {}", machines)?;
        }
        writeln!(f, "  Min value: {}", self.min_value)?;
        writeln!(f, "  Max value: {}", self.max_value)?;
        writeln!(f, "  Mean value: {:.2}", self.mean_value)
    }
}

/// Load an instance of the given kind and wrap it in its evaluator.
pub fn load_evaluator<P: AsRef<Path>>(
    kind: ProblemKind,
    path: P,
    config: EvalConfig,
) -> Result<Box<dyn Evaluator>> {
    let evaluator: Box<dyn Evaluator> = match kind {
        ProblemKind::Qap => Box::new(QapEvaluator::with_config(QapInstance::from_file(path)?, config)),
        ProblemKind::Pfsp => Box::new(PfspEvaluator::with_config(PfspInstance::from_file(path)?, config)),
        ProblemKind::Lop => Box::new(LopEvaluator::with_config(LopInstance::from_file(path)?, config)),
    };
    Ok(evaluator)
}
