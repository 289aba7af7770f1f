//! Plackett-Luce distribution over permutations.
//!
//! A draw is built position by position: among the indices not yet placed,
//! index `k` is chosen with probability `w[k] / Σ w[remaining]`. Randomness
//! is always supplied by the caller; seeded [`ChaCha8Rng`] streams make runs
//! reproducible.

use crate::error::{Error, Result, WeightDefect};
use crate::permutation;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// A validated Plackett-Luce weight vector.
#[derive(Debug, Clone)]
pub struct PlackettLuce {
    weights: Vec<f64>,
}

impl PlackettLuce {
    /// Validate `weights`: non-empty, finite, strictly positive, finite sum.
    pub fn new(weights: Vec<f64>) -> Result<Self> {
        if weights.is_empty() {
            return Err(Error::InvalidWeight(WeightDefect::Empty));
        }
        for (index, &value) in weights.iter().enumerate() {
            if !value.is_finite() {
                return Err(Error::InvalidWeight(WeightDefect::NonFinite { index }));
            }
            if value <= 0.0 {
                return Err(Error::InvalidWeight(WeightDefect::NonPositive { index, value }));
            }
        }
        if !weights.iter().sum::<f64>().is_finite() {
            return Err(Error::InvalidWeight(WeightDefect::NonFiniteTotal));
        }
        Ok(PlackettLuce { weights })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Length of the sampled permutations.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// `count` independent draws from `rng`.
    pub fn sample_many<R: Rng + ?Sized>(&self, rng: &mut R, count: usize) -> Vec<Vec<usize>> {
        (0..count).map(|_| self.draw(rng)).collect()
    }

    /// `count` draws computed in parallel.
    ///
    /// Draw `k` uses the ChaCha stream `k` of `seed`, so the output does not
    /// depend on how rayon schedules the work.
    pub fn sample_par(&self, seed: u64, count: usize) -> Vec<Vec<usize>> {
        (0..count)
            .into_par_iter()
            .map(|k| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                rng.set_stream(k as u64);
                self.draw(&mut rng)
            })
            .collect()
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize> {
        let n = self.weights.len();
        let mut remaining: Vec<(usize, f64)> = self.weights.iter().copied().enumerate().collect();
        let mut sample = Vec::with_capacity(n);

        while !remaining.is_empty() {
            let total: f64 = remaining.iter().map(|&(_, w)| w).sum();
            let mut pick = rng.gen::<f64>() * total;

            // rounding can leave `pick` slightly positive after the last candidate
            let mut chosen = remaining.len() - 1;
            for (slot, &(_, w)) in remaining.iter().enumerate() {
                pick -= w;
                if pick <= 0.0 {
                    chosen = slot;
                    break;
                }
            }
            let (index, _) = remaining.remove(chosen);
            sample.push(index);
        }
        sample
    }

    /// Natural log of the probability of drawing `permutation`.
    pub fn log_probability(&self, permutation: &[usize]) -> Result<f64> {
        permutation::check(permutation, self.len()).map_err(|defect| Error::from_defect(0, defect))?;

        let mut log_p = 0.0;
        let mut suffix = 0.0;
        for &k in permutation.iter().rev() {
            suffix += self.weights[k];
            log_p += self.weights[k].ln() - suffix.ln();
        }
        Ok(log_p)
    }
}

impl Distribution<Vec<usize>> for PlackettLuce {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize> {
        self.draw(rng)
    }
}

/// Draw `count` permutations from the Plackett-Luce model of `weights`.
///
/// With `seed` the draws come from a [`ChaCha8Rng`] seeded with it and are
/// reproducible; without one the generator is seeded from OS entropy.
pub fn sample_plackett_luce(weights: &[f64], count: usize, seed: Option<u64>) -> Result<Vec<Vec<usize>>> {
    let model = PlackettLuce::new(weights.to_vec())?;
    let mut rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    Ok(model.sample_many(&mut rng, count))
}

/// Same as [`sample_plackett_luce`] with a caller-provided generator.
pub fn sample_plackett_luce_with<R: Rng + ?Sized>(
    weights: &[f64],
    count: usize,
    rng: &mut R,
) -> Result<Vec<Vec<usize>>> {
    Ok(PlackettLuce::new(weights.to_vec())?.sample_many(rng, count))
}
