//! Probability models over permutations.

pub mod plackett_luce;

pub use plackett_luce::{sample_plackett_luce, PlackettLuce};
