//! Quadratic Assignment Problem.
//!
//! Instances follow the QAPLIB layout: the size `n`, then the `n × n`
//! distance matrix, then the `n × n` flow matrix, all row-major. The cost of
//! assigning facility `p[i]` to location `i` is
//! `Σ_i Σ_j D[i][j] * F[p[i]][p[j]]`.

use crate::error::{FormatError, Result};
use crate::problems::parse::{self, Tokens};
use crate::problems::{Cost, EvalConfig, Evaluator, InstanceSummary, ProblemKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A QAP instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QapInstance {
    pub name: String,
    pub size: usize,
    /// Distance matrix `D`
    pub distances: Vec<Vec<Cost>>,
    /// Flow matrix `F`
    pub flows: Vec<Vec<Cost>>,
}

impl QapInstance {
    /// Parse a QAPLIB instance from text.
    pub fn parse(name: &str, text: &str) -> std::result::Result<Self, FormatError> {
        let mut tokens = Tokens::new(text);
        let size = tokens.dimension()?;
        let expected = parse::value_count(&[2, size, size])?;
        let distances = tokens.matrix(size, size, true, expected)?;
        let flows = tokens.matrix(size, size, true, expected)?;
        tokens.finish(expected)?;

        // n² terms, each at most max(D) * max(F)
        parse::ensure_cost_fits(&[
            size as u128,
            size as u128,
            parse::max_abs(&distances),
            parse::max_abs(&flows),
        ])?;

        Ok(QapInstance {
            name: name.to_string(),
            size,
            distances,
            flows,
        })
    }

    /// Load a QAPLIB instance file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, FormatError> {
        let path = path.as_ref();
        let text = parse::read_file(path)?;
        let instance = Self::parse(&parse::instance_name(path), &text)?;
        log::debug!("loaded QAP instance {} (n={})", instance.name, instance.size);
        Ok(instance)
    }

    /// Assignment cost of a valid permutation.
    pub fn cost(&self, permutation: &[usize]) -> Cost {
        let mut total = 0;
        for (i, row) in self.distances.iter().enumerate() {
            let flow_row = &self.flows[permutation[i]];
            for (j, &d) in row.iter().enumerate() {
                total += d * flow_row[permutation[j]];
            }
        }
        total
    }
}

impl std::str::FromStr for QapInstance {
    type Err = FormatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse("", s)
    }
}

/// Batch evaluator over a QAP instance.
#[derive(Debug, Clone)]
pub struct QapEvaluator {
    instance: QapInstance,
    config: EvalConfig,
}

impl QapEvaluator {
    pub fn new(instance: QapInstance) -> Self {
        Self::with_config(instance, EvalConfig::default())
    }

    pub fn with_config(instance: QapInstance, config: EvalConfig) -> Self {
        QapEvaluator { instance, config }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(QapInstance::from_file(path)?))
    }

    pub fn instance(&self) -> &QapInstance {
        &self.instance
    }
}

impl Evaluator for QapEvaluator {
    fn kind(&self) -> ProblemKind {
        ProblemKind::Qap
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
        let (min_value, max_value, mean_value) =
            parse::value_range([&self.instance.distances, &self.instance.flows]);
        InstanceSummary {
            kind: ProblemKind::Qap,
            name: self.instance.name.clone(),
            size: self.instance.size,
            machines: None,
            min_value,
            max_value,
            mean_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::permutation;
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;

    const SMALL: &str = "3

0 1 2
1 0 3
2 3 0

0 5 2
5 0 3
2 3 0
";

    fn small_evaluator() -> QapEvaluator {
        QapEvaluator::new(SMALL.parse().unwrap())
    }

    #[test]
    fn test_parse_small_instance() {
        let instance: QapInstance = SMALL.parse().unwrap();
        assert_eq!(instance.size, 3);
        assert_eq!(instance.distances[1], vec![1, 0, 3]);
        assert_eq!(instance.flows[0], vec![0, 5, 2]);
    }

    #[test]
    fn test_known_costs() {
        let evaluator = small_evaluator();
        let costs = evaluator
            .evaluate(&[vec![0, 1, 2], vec![1, 0, 2], vec![2, 1, 0]])
            .unwrap();
        assert_eq!(costs, vec![36, 34, 44]);
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let evaluator = small_evaluator();
        let batch = vec![vec![2, 0, 1]; 5];
        let first = evaluator.evaluate(&batch).unwrap();
        assert_eq!(first, evaluator.evaluate(&batch).unwrap());
        assert!(first.iter().all(|&c| c == first[0]));
    }

    #[test]
    fn test_invalid_input() {
        let evaluator = small_evaluator();
        assert!(matches!(
            evaluator.evaluate(&[vec![0, 1, 2], vec![0, 1]]),
            Err(Error::Dimension { index: 1, expected: 3, found: 2 })
        ));
        assert!(matches!(
            evaluator.evaluate(&[vec![0, 2, 2]]),
            Err(Error::InvalidPermutation { index: 0, .. })
        ));
        assert!(matches!(
            evaluator.cost(&[0, 1, 5]),
            Err(Error::InvalidPermutation { .. })
        ));
    }

    #[test]
    fn test_format_errors() {
        assert!(matches!(
            "3\n0 1 2\n1 0 3".parse::<QapInstance>(),
            Err(FormatError::Truncated { expected: 18, found: 6 })
        ));
        assert!(matches!(
            "1\n0\n0\n7".parse::<QapInstance>(),
            Err(FormatError::TrailingData { expected: 2, line: 4 })
        ));
        assert!(matches!(
            "2\n0 1\n1 0\n0 -1\n1 0".parse::<QapInstance>(),
            Err(FormatError::Negative { value: -1, .. })
        ));
        assert!(matches!(
            "2\n0 1\n1 zero\n".parse::<QapInstance>(),
            Err(FormatError::InvalidNumber { line: 3, .. })
        ));
    }

    #[test]
    fn test_huge_declared_size() {
        assert!(matches!(
            "100000000000\n1 2 3".parse::<QapInstance>(),
            Err(FormatError::DimensionTooLarge { .. })
        ));
        assert!(matches!(
            "3000000000\n1 2 3".parse::<QapInstance>(),
            Err(FormatError::Truncated { found: 3, .. })
        ));
    }

    #[test]
    fn test_rejects_values_that_overflow_costs() {
        assert!(matches!(
            "2\n0 9223372036854775807\n1 0\n0 2\n1 0".parse::<QapInstance>(),
            Err(FormatError::CostOverflow)
        ));

        // 4 * 2^30 * 2^30 = 2^62 still fits
        let fits = format!("2\n{0} {0}\n{0} {0}\n{0} {0}\n{0} {0}", 1u64 << 30);
        let instance: QapInstance = fits.parse().unwrap();
        assert_eq!(instance.cost(&[1, 0]), 1 << 62);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let n = 12;
        let random_matrix = |rng: &mut ChaCha8Rng| -> Vec<Vec<Cost>> {
            (0..n).map(|_| (0..n).map(|_| rng.gen_range(0..100)).collect()).collect()
        };
        let instance = QapInstance {
            name: "random".to_string(),
            size: n,
            distances: random_matrix(&mut rng),
            flows: random_matrix(&mut rng),
        };

        let batch: Vec<Vec<usize>> = (0..300)
            .map(|_| {
                let mut p = permutation::identity(n);
                p.shuffle(&mut rng);
                p
            })
            .collect();

        let parallel = QapEvaluator::new(instance.clone()).evaluate(&batch).unwrap();
        let sequential = QapEvaluator::with_config(instance.clone(), EvalConfig::sequential())
            .evaluate(&batch)
            .unwrap();
        assert_eq!(parallel, sequential);
        for (p, cost) in batch.iter().zip(&parallel) {
            assert_eq!(instance.cost(p), *cost);
        }
    }

    #[test]
    fn test_from_file_uses_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small3.dat");
        std::fs::write(&path, SMALL).unwrap();

        let evaluator = QapEvaluator::from_file(&path).unwrap();
        assert_eq!(evaluator.instance().name, "small3");
        let summary = evaluator.summary();
        assert_eq!(summary.kind, ProblemKind::Qap);
        assert_eq!((summary.min_value, summary.max_value), (0, 5));
    }
}
