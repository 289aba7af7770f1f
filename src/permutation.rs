//! Permutation validation and transformations.
//!
//! A permutation of size `n` is a `Vec<usize>` holding every value of `[0, n)`
//! exactly once. Evaluators validate whole batches through [`validate_batch`]
//! before computing any cost, so a single bad row fails the entire call.

use crate::error::{Error, PermutationDefect, Result};

/// Check that `permutation` is a permutation of `[0, n)`.
pub fn check(permutation: &[usize], n: usize) -> std::result::Result<(), PermutationDefect> {
    if permutation.len() != n {
        return Err(PermutationDefect::Length {
            expected: n,
            found: permutation.len(),
        });
    }

    let mut seen = vec![false; n];
    for (position, &value) in permutation.iter().enumerate() {
        if value >= n {
            return Err(PermutationDefect::OutOfRange { position, value });
        }
        if seen[value] {
            return Err(PermutationDefect::Duplicate { position, value });
        }
        seen[value] = true;
    }
    Ok(())
}

/// Check every permutation of a batch, failing on the first invalid one.
pub fn validate_batch(batch: &[Vec<usize>], n: usize) -> Result<()> {
    for (index, permutation) in batch.iter().enumerate() {
        check(permutation, n).map_err(|defect| Error::from_defect(index, defect))?;
    }
    Ok(())
}

/// The identity permutation `[0, 1, ..., n-1]`.
pub fn identity(n: usize) -> Vec<usize> {
    (0..n).collect()
}

/// Inverse of a valid permutation: `inverse[p[i]] = i`.
pub fn inverse(permutation: &[usize]) -> Result<Vec<usize>> {
    check(permutation, permutation.len()).map_err(|defect| Error::from_defect(0, defect))?;
    let mut out = vec![0; permutation.len()];
    for (i, &e) in permutation.iter().enumerate() {
        out[e] = i;
    }
    Ok(out)
}

/// Inverse of every permutation in a batch.
pub fn inverse_batch(batch: &[Vec<usize>]) -> Result<Vec<Vec<usize>>> {
    batch
        .iter()
        .enumerate()
        .map(|(index, p)| {
            inverse(p).map_err(|err| match err {
                Error::InvalidPermutation { defect, .. } => Error::InvalidPermutation { index, defect },
                other => other,
            })
        })
        .collect()
}

/// Compose `a` with `b`: `out[b[i]] = a[i]`.
pub fn compose(a: &[usize], b: &[usize]) -> Result<Vec<usize>> {
    let n = a.len();
    check(a, n).map_err(|defect| Error::from_defect(0, defect))?;
    check(b, n).map_err(|defect| Error::from_defect(1, defect))?;

    let mut out = vec![0; n];
    for (i, &bi) in b.iter().enumerate() {
        out[bi] = a[i];
    }
    Ok(out)
}

/// Borda consensus of a population.
///
/// Values are summed position by position across the population; positions
/// are then ranked by their sums (ties keep position order) and each position
/// receives its rank.
pub fn borda(population: &[Vec<usize>]) -> Result<Vec<usize>> {
    let Some(first) = population.first() else {
        return Ok(Vec::new());
    };
    let n = first.len();
    validate_batch(population, n)?;

    let mut sums: Vec<(usize, usize)> = (0..n).map(|i| (i, 0)).collect();
    for permutation in population {
        for (i, &e) in permutation.iter().enumerate() {
            sums[i].1 += e;
        }
    }

    sums.sort_by_key(|&(_, total)| total);
    let mut consensus = vec![0; n];
    for (rank, &(position, _)) in sums.iter().enumerate() {
        consensus[position] = rank;
    }
    Ok(consensus)
}

/// Inversion vector of a permutation: `v[i]` counts later elements smaller than `p[i]`.
pub fn to_inversion_vector(permutation: &[usize]) -> Result<Vec<usize>> {
    check(permutation, permutation.len()).map_err(|defect| Error::from_defect(0, defect))?;
    Ok(permutation
        .iter()
        .enumerate()
        .map(|(i, &e)| permutation[i + 1..].iter().filter(|&&later| later < e).count())
        .collect())
}

/// Rebuild a permutation from its inversion vector.
///
/// Each entry picks the `v[i]`-th smallest value not used so far.
pub fn from_inversion_vector(vector: &[usize]) -> Result<Vec<usize>> {
    let n = vector.len();
    let mut remaining = identity(n);
    let mut out = Vec::with_capacity(n);

    for (position, &value) in vector.iter().enumerate() {
        if value >= remaining.len() {
            return Err(Error::InvalidPermutation {
                index: 0,
                defect: PermutationDefect::InvalidInversion {
                    position,
                    value,
                    remaining: remaining.len(),
                },
            });
        }
        out.push(remaining.remove(value));
    }
    Ok(out)
}

/// Decode a batch of inversion vectors.
pub fn from_inversion_vector_batch(vectors: &[Vec<usize>]) -> Result<Vec<Vec<usize>>> {
    vectors
        .iter()
        .enumerate()
        .map(|(index, v)| {
            from_inversion_vector(v).map_err(|err| match err {
                Error::InvalidPermutation { defect, .. } => Error::InvalidPermutation { index, defect },
                other => other,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_check_accepts_permutation() {
        assert!(check(&[2, 0, 1], 3).is_ok());
        assert!(check(&[], 0).is_ok());
    }

    #[test]
    fn test_check_defects() {
        assert_eq!(
            check(&[0, 1], 3),
            Err(PermutationDefect::Length { expected: 3, found: 2 })
        );
        assert_eq!(
            check(&[0, 3, 1], 3),
            Err(PermutationDefect::OutOfRange { position: 1, value: 3 })
        );
        assert_eq!(
            check(&[1, 0, 1], 3),
            Err(PermutationDefect::Duplicate { position: 2, value: 1 })
        );
    }

    #[test]
    fn test_validate_batch_reports_first_bad_index() {
        let batch = vec![vec![0, 1, 2], vec![2, 1, 0], vec![0, 0, 2], vec![0, 1]];
        match validate_batch(&batch, 3) {
            Err(Error::InvalidPermutation { index, .. }) => assert_eq!(index, 2),
            other => panic!("unexpected result: {:?}", other),
        }

        let batch = vec![vec![0, 1, 2], vec![0, 1]];
        assert!(matches!(
            validate_batch(&batch, 3),
            Err(Error::Dimension { index: 1, expected: 3, found: 2 })
        ));
    }

    #[test]
    fn test_inverse_and_compose() {
        let p = vec![2, 0, 3, 1];
        let inv = inverse(&p).unwrap();
        assert_eq!(inv, vec![1, 3, 0, 2]);
        assert_eq!(inverse(&inv).unwrap(), p);

        // composing with the identity on the left yields the inverse
        assert_eq!(compose(&identity(4), &p).unwrap(), inv);
        assert_eq!(compose(&p, &identity(4)).unwrap(), p);
    }

    #[test]
    fn test_inverse_batch_keeps_index() {
        let batch = vec![vec![1, 0], vec![1, 1]];
        assert!(matches!(
            inverse_batch(&batch),
            Err(Error::InvalidPermutation { index: 1, .. })
        ));
        assert_eq!(inverse_batch(&batch[..1]).unwrap(), vec![vec![1, 0]]);
    }

    #[test]
    fn test_borda() {
        let population = vec![vec![0, 1, 2], vec![0, 2, 1], vec![1, 0, 2]];
        // position sums: [1, 3, 5]
        assert_eq!(borda(&population).unwrap(), vec![0, 1, 2]);

        let population = vec![vec![2, 1, 0], vec![2, 0, 1]];
        // position sums: [4, 1, 1]; ties keep position order
        assert_eq!(borda(&population).unwrap(), vec![2, 0, 1]);
        assert!(borda(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_inversion_vector() {
        assert_eq!(to_inversion_vector(&[2, 0, 3, 1]).unwrap(), vec![2, 0, 1, 0]);
        assert_eq!(from_inversion_vector(&[2, 0, 1, 0]).unwrap(), vec![2, 0, 3, 1]);

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..20 {
            let mut p = identity(9);
            p.shuffle(&mut rng);
            let v = to_inversion_vector(&p).unwrap();
            assert_eq!(from_inversion_vector(&v).unwrap(), p);
        }
    }

    #[test]
    fn test_invalid_inversion_vector() {
        let vectors = vec![vec![0, 0, 0], vec![1, 2, 0]];
        match from_inversion_vector_batch(&vectors) {
            Err(Error::InvalidPermutation { index, defect }) => {
                assert_eq!(index, 1);
                assert_eq!(
                    defect,
                    PermutationDefect::InvalidInversion { position: 1, value: 2, remaining: 2 }
                );
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
