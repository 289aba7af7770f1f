//! Permutation Problem Evaluation Library
//!
//! Fitness evaluation for permutation-based optimizers.
//!
//! # Features
//!
//! - Loaders for QAPLIB (QAP), Taillard (PFSP) and LOLIB (LOP) instances
//! - Batch cost evaluation, parallel and order preserving
//! - Makespan and total flow time objectives for the flow shop
//! - Plackett-Luce sampling with injectable, seedable randomness
//! - Permutation utilities (inverse, composition, Borda, inversion vectors)
//!
//! # Example
//!
//! ```no_run
//! use permu_eval::problems::{Evaluator, QapEvaluator};
//! use permu_eval::distributions::sample_plackett_luce;
//!
//! // Load instance
//! let qap = QapEvaluator::from_file("tai20b.dat").unwrap();
//!
//! // Sample candidate solutions
//! let weights = vec![1.0; qap.size()];
//! let population = sample_plackett_luce(&weights, 100, Some(42)).unwrap();
//!
//! // Evaluate them
//! let costs = qap.evaluate(&population).unwrap();
//! println!("Best cost: {:?}", costs.iter().min());
//! ```

pub mod distributions;
pub mod error;
pub mod permutation;
pub mod problems;

pub use distributions::{sample_plackett_luce, PlackettLuce};
pub use error::{Error, FormatError, Result};
pub use problems::{
    Cost, EvalConfig, Evaluator, LopEvaluator, LopInstance, PfspEvaluator, PfspInstance, PfspObjective,
    ProblemKind, QapEvaluator, QapInstance,
};
