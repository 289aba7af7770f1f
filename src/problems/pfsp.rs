//! Permutation Flow-Shop Scheduling Problem.
//!
//! Instances use the Taillard layout:
//!
//! ```text
//! number of jobs, number of machines, initial seed, upper bound and lower bound :
//!           20           5   873654221        1278        1232
//! processing times :
//!  54 83 15 71 77 36 53 38 27 87 76 91 14 29 12 77 32 87 68 94
//!  ...one row of job processing times per machine...
//! ```
//!
//! Text lines before the header and between the header and the body are
//! skipped. The body is stored transposed, one row per job.

use crate::error::{FormatError, Result};
use crate::problems::parse::{self, Tokens};
use crate::problems::{Cost, EvalConfig, Evaluator, InstanceSummary, ProblemKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Quantity minimized by a flow-shop evaluator.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum PfspObjective {
    /// Completion time of the last job on the last machine
    #[default]
    Makespan,
    /// Sum of the completion times of every job on the last machine
    TotalFlowTime,
}

/// A PFSP instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PfspInstance {
    pub name: String,
    pub jobs: usize,
    pub machines: usize,
    /// `processing_times[job][machine]`
    pub processing_times: Vec<Vec<Cost>>,
    /// Generator seed from the Taillard header
    pub seed: Option<u64>,
    /// Makespan upper bound from the Taillard header
    pub upper_bound: Option<Cost>,
    /// Makespan lower bound from the Taillard header
    pub lower_bound: Option<Cost>,
}

fn has_numeric_token(line: &str) -> bool {
    line.split_whitespace().any(|t| t.parse::<i64>().is_ok())
}

/// A header entry as a positive dimension.
fn header_dimension(line: usize, value: i64) -> std::result::Result<usize, FormatError> {
    match value {
        v if v < 0 => Err(FormatError::Negative { line, value: v }),
        0 => Err(FormatError::EmptyDimension),
        v => usize::try_from(v).map_err(|_| FormatError::InvalidNumber {
            line,
            token: v.to_string(),
        }),
    }
}

impl PfspInstance {
    /// Parse a Taillard instance from text.
    ///
    /// Lines without any integer are labels and are skipped. The first other
    /// line is the header and must be made of integers only.
    pub fn parse(name: &str, text: &str) -> std::result::Result<Self, FormatError> {
        let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l)).peekable();

        let (header_line, header) = loop {
            let (number, line) = lines.next().ok_or(FormatError::MissingHeader)?;
            if !has_numeric_token(line) {
                continue;
            }
            let values = line
                .split_whitespace()
                .map(|t| {
                    t.parse::<i64>().map_err(|_| FormatError::InvalidNumber {
                        line: number,
                        token: t.to_string(),
                    })
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            break (number, values);
        };
        if header.len() < 2 {
            return Err(FormatError::MissingHeader);
        }
        let jobs = header_dimension(header_line, header[0])?;
        let machines = header_dimension(header_line, header[1])?;
        let seed = header
            .get(2)
            .map(|&s| {
                u64::try_from(s).map_err(|_| FormatError::Negative {
                    line: header_line,
                    value: s,
                })
            })
            .transpose()?;
        let upper_bound = header.get(3).copied();
        let lower_bound = header.get(4).copied();

        // skip labels such as "processing times :"
        while let Some(&(_, line)) = lines.peek() {
            if has_numeric_token(line) {
                break;
            }
            lines.next();
        }

        let expected = parse::value_count(&[jobs, machines])?;
        let mut tokens = Tokens::from_lines(lines);
        let by_machine = tokens.matrix(machines, jobs, true, expected)?;
        tokens.finish(expected)?;

        // every completion time is at most the sum of all processing times
        let total_work: u128 = by_machine.iter().flatten().map(|&t| t as u128).sum();
        parse::ensure_cost_fits(&[jobs as u128, total_work])?;

        let processing_times = (0..jobs)
            .map(|job| by_machine.iter().map(|row| row[job]).collect())
            .collect();

        Ok(PfspInstance {
            name: name.to_string(),
            jobs,
            machines,
            processing_times,
            seed,
            upper_bound,
            lower_bound,
        })
    }

    /// Load a Taillard instance file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, FormatError> {
        let path = path.as_ref();
        let text = parse::read_file(path)?;
        let instance = Self::parse(&parse::instance_name(path), &text)?;
        log::debug!(
            "loaded PFSP instance {} ({} jobs, {} machines)",
            instance.name,
            instance.jobs,
            instance.machines
        );
        Ok(instance)
    }

    /// Full completion-time table: `table[i][j]` is when the `i`-th scheduled
    /// job leaves machine `j`.
    pub fn completion_times(&self, permutation: &[usize]) -> Vec<Vec<Cost>> {
        let mut table: Vec<Vec<Cost>> = Vec::with_capacity(permutation.len());
        for (i, &job) in permutation.iter().enumerate() {
            let mut row = Vec::with_capacity(self.machines);
            for (j, &t) in self.processing_times[job].iter().enumerate() {
                let above = if i > 0 { table[i - 1][j] } else { 0 };
                let left = if j > 0 { row[j - 1] } else { 0 };
                row.push(above.max(left) + t);
            }
            table.push(row);
        }
        table
    }

    /// Objective value of a valid permutation.
    ///
    /// Only one row of the completion table is kept.
    pub fn cost(&self, permutation: &[usize], objective: PfspObjective) -> Cost {
        let mut completion = vec![0; self.machines];
        let mut flow_time = 0;

        for &job in permutation {
            let mut previous = 0;
            for (machine, &t) in self.processing_times[job].iter().enumerate() {
                completion[machine] = completion[machine].max(previous) + t;
                previous = completion[machine];
            }
            flow_time += previous;
        }

        match objective {
            PfspObjective::Makespan => completion.last().copied().unwrap_or(0),
            PfspObjective::TotalFlowTime => flow_time,
        }
    }

    pub fn makespan(&self, permutation: &[usize]) -> Cost {
        self.cost(permutation, PfspObjective::Makespan)
    }

    pub fn total_flow_time(&self, permutation: &[usize]) -> Cost {
        self.cost(permutation, PfspObjective::TotalFlowTime)
    }
}

impl std::str::FromStr for PfspInstance {
    type Err = FormatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse("", s)
    }
}

/// Batch evaluator over a PFSP instance.
#[derive(Debug, Clone)]
pub struct PfspEvaluator {
    instance: PfspInstance,
    config: EvalConfig,
}

impl PfspEvaluator {
    pub fn new(instance: PfspInstance) -> Self {
        Self::with_config(instance, EvalConfig::default())
    }

    /// The objective is taken from `config.pfsp_objective`.
    pub fn with_config(instance: PfspInstance, config: EvalConfig) -> Self {
        PfspEvaluator { instance, config }
    }

    pub fn with_objective(mut self, objective: PfspObjective) -> Self {
        self.config.pfsp_objective = objective;
        self
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(PfspInstance::from_file(path)?))
    }

    pub fn instance(&self) -> &PfspInstance {
        &self.instance
    }

    pub fn objective(&self) -> PfspObjective {
        self.config.pfsp_objective
    }
}

impl Evaluator for PfspEvaluator {
    fn kind(&self) -> ProblemKind {
        ProblemKind::Pfsp
    }

    fn size(&self) -> usize {
        self.instance.jobs
    }

    fn config(&self) -> &EvalConfig {
        &self.config
    }

    fn permutation_cost(&self, permutation: &[usize]) -> Cost {
        self.instance.cost(permutation, self.config.pfsp_objective)
    }

    fn summary(&self) -> InstanceSummary {
        let (min_value, max_value, mean_value) = parse::value_range([&self.instance.processing_times]);
        InstanceSummary {
            kind: ProblemKind::Pfsp,
            name: self.instance.name.clone(),
            size: self.instance.jobs,
            machines: Some(self.instance.machines),
            min_value,
            max_value,
            mean_value,
        }
    }
}
