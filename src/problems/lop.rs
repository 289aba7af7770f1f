//! Linear Ordering Problem.
//!
//! LOLIB instances hold the size `n` followed by the `n × n` matrix `C`
//! row-major. `C[a][b]` is collected whenever item `a` is placed before
//! item `b`.

use crate::error::{FormatError, Result};
use crate::problems::parse::{self, Tokens};
use crate::problems::{Cost, EvalConfig, Evaluator, InstanceSummary, ProblemKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A LOP instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LopInstance {
    pub name: String,
    pub size: usize,
    pub matrix: Vec<Vec<Cost>>,
}

impl LopInstance {
    /// Parse a LOLIB instance from text.
    pub fn parse(name: &str, text: &str) -> std::result::Result<Self, FormatError> {
        let mut tokens = Tokens::new(text);
        let size = tokens.dimension()?;
        let expected = parse::value_count(&[size, size])?;
        let matrix = tokens.matrix(size, size, false, expected)?;
        tokens.finish(expected)?;

        // n(n-1)/2 pairs contribute to a cost; a swap delta spans two entries
        let pairs = (size as u128) * (size as u128 - 1) / 2;
        parse::ensure_cost_fits(&[pairs.max(2), parse::max_abs(&matrix)])?;

        Ok(LopInstance {
            name: name.to_string(),
            size,
            matrix,
        })
    }

    /// Load a LOLIB instance file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, FormatError> {
        let path = path.as_ref();
        let text = parse::read_file(path)?;
        let instance = Self::parse(&parse::instance_name(path), &text)?;
        log::debug!("loaded LOP instance {} (n={})", instance.name, instance.size);
        Ok(instance)
    }

    /// Sum of `C[p[i]][p[j]]` over every pair `i < j`.
    pub fn cost(&self, permutation: &[usize]) -> Cost {
        permutation
            .iter()
            .enumerate()
            .map(|(i, &a)| {
                let row = &self.matrix[a];
                permutation[i + 1..].iter().map(|&b| row[b]).sum::<Cost>()
            })
            .sum()
    }

    /// Cost change of swapping positions `i` and `i + 1`.
    pub fn swap_delta(&self, permutation: &[usize], i: usize) -> Cost {
        let (a, b) = (permutation[i], permutation[i + 1]);
        self.matrix[b][a] - self.matrix[a][b]
    }
}

impl std::str::FromStr for LopInstance {
    type Err = FormatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse("", s)
    }
}

/// Batch evaluator over a LOP instance.
#[derive(Debug, Clone)]
pub struct LopEvaluator {
    instance: LopInstance,
    config: EvalConfig,
}

impl LopEvaluator {
    pub fn new(instance: LopInstance) -> Self {
        Self::with_config(instance, EvalConfig::default())
    }

    pub fn with_config(instance: LopInstance, config: EvalConfig) -> Self {
        LopEvaluator { instance, config }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(LopInstance::from_file(path)?))
    }

    pub fn instance(&self) -> &LopInstance {
        &self.instance
    }
}

impl Evaluator for LopEvaluator {
    fn kind(&self) -> ProblemKind {
        ProblemKind::Lop
    }

    fn size(&self) -> usize {
        self.instance.size
    }

    fn config(&self) -> &EvalConfig {
        &self.config
    }

    fn permutation_cost(&self, permutation: &[usize]) -> Cost {
        self.instance.cost(permutation)
    }

    fn summary(&self) -> InstanceSummary {
        let (min_value, max_value, mean_value) = parse::value_range([&self.instance.matrix]);
        InstanceSummary {
            kind: ProblemKind::Lop,
            name: self.instance.name.clone(),
            size: self.instance.size,
            machines: None,
            min_value,
            max_value,
            mean_value,
        }
    }
}
