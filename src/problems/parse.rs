//! Whitespace token reader shared by the instance loaders.

use crate::error::FormatError;
use crate::problems::Cost;
use std::path::Path;

/// Read an instance file into memory.
pub(crate) fn read_file(path: &Path) -> Result<String, FormatError> {
    std::fs::read_to_string(path).map_err(|source| FormatError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Instance name derived from a file path (file stem).
pub(crate) fn instance_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Whitespace-separated tokens, each tagged with its 1-based line number.
pub(crate) struct Tokens<'a> {
    tokens: Vec<(usize, &'a str)>,
    position: usize,
    consumed: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(text: &'a str) -> Self {
        Self::from_lines(text.lines().enumerate().map(|(i, l)| (i + 1, l)))
    }

    /// Build from numbered lines, e.g. the tail of a file after a header.
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: Iterator<Item = (usize, &'a str)>,
    {
        Tokens {
            tokens: lines
                .flat_map(|(line, text)| text.split_whitespace().map(move |tok| (line, tok)))
                .collect(),
            position: 0,
            consumed: 0,
        }
    }

    fn next(&mut self) -> Option<(usize, &'a str)> {
        let token = self.tokens.get(self.position).copied();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn remaining(&self) -> usize {
        self.tokens.len() - self.position
    }

    /// Next token parsed as a dimension.
    pub fn dimension(&mut self) -> Result<usize, FormatError> {
        let (line, token) = self.next().ok_or(FormatError::MissingHeader)?;
        let n: usize = token.parse().map_err(|_| FormatError::InvalidNumber {
            line,
            token: token.to_string(),
        })?;
        if n == 0 {
            return Err(FormatError::EmptyDimension);
        }
        Ok(n)
    }

    /// Read a `rows × cols` matrix in row-major order.
    ///
    /// `consumed` counts values across calls, so a truncation error reports
    /// how far into the body the reader got. Nothing is allocated unless
    /// enough tokens are left to fill the matrix.
    pub fn matrix(
        &mut self,
        rows: usize,
        cols: usize,
        non_negative: bool,
        expected_total: usize,
    ) -> Result<Vec<Vec<Cost>>, FormatError> {
        let needed = value_count(&[rows, cols])?;
        if needed > self.remaining() {
            return Err(FormatError::Truncated {
                expected: expected_total,
                found: self.consumed + self.remaining(),
            });
        }

        let mut matrix = Vec::with_capacity(rows);
        for _ in 0..rows {
            let mut row = Vec::with_capacity(cols);
            for _ in 0..cols {
                let (line, token) = self.next().ok_or(FormatError::Truncated {
                    expected: expected_total,
                    found: self.consumed,
                })?;
                let value: Cost = token.parse().map_err(|_| FormatError::InvalidNumber {
                    line,
                    token: token.to_string(),
                })?;
                if non_negative && value < 0 {
                    return Err(FormatError::Negative { line, value });
                }
                self.consumed += 1;
                row.push(value);
            }
            matrix.push(row);
        }
        Ok(matrix)
    }

    /// Fail if any token is left.
    pub fn finish(mut self, expected_total: usize) -> Result<(), FormatError> {
        match self.next() {
            Some((line, _)) => Err(FormatError::TrailingData {
                expected: expected_total,
                line,
            }),
            None => Ok(()),
        }
    }
}

/// Product of declared dimensions, rejected when it does not fit in `usize`.
pub(crate) fn value_count(dimensions: &[usize]) -> Result<usize, FormatError> {
    dimensions
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| FormatError::DimensionTooLarge {
            dimensions: dimensions.to_vec(),
        })
}

/// Fail unless the product of `factors`, a bound on every cost of an
/// instance, fits in `Cost`.
pub(crate) fn ensure_cost_fits(factors: &[u128]) -> Result<(), FormatError> {
    let bound = factors
        .iter()
        .try_fold(1u128, |acc, &f| acc.checked_mul(f))
        .ok_or(FormatError::CostOverflow)?;
    if bound > Cost::MAX as u128 {
        return Err(FormatError::CostOverflow);
    }
    Ok(())
}

/// Largest absolute entry of a matrix.
pub(crate) fn max_abs(matrix: &[Vec<Cost>]) -> u128 {
    matrix
        .iter()
        .flatten()
        .map(|v| v.unsigned_abs() as u128)
        .max()
        .unwrap_or(0)
}

/// Minimum, maximum and mean over every entry of a set of matrices.
pub(crate) fn value_range<'m>(matrices: impl IntoIterator<Item = &'m Vec<Vec<Cost>>>) -> (Cost, Cost, f64) {
    let mut min = Cost::MAX;
    let mut max = Cost::MIN;
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in matrices.into_iter().flatten().flatten() {
        min = min.min(*value);
        max = max.max(*value);
        sum += *value as f64;
        count += 1;
    }
    if count == 0 {
        return (0, 0, 0.0);
    }
    (min, max, sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_across_lines() {
        let mut tokens = Tokens::new("2\n1 2\n3\n4 \n");
        assert_eq!(tokens.dimension().unwrap(), 2);
        assert_eq!(tokens.matrix(2, 2, true, 4).unwrap(), vec![vec![1, 2], vec![3, 4]]);
        assert!(tokens.finish(4).is_ok());
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let mut tokens = Tokens::new("2\n1 x\n");
        tokens.dimension().unwrap();
        match tokens.matrix(2, 2, true, 4) {
            Err(FormatError::InvalidNumber { line, token }) => {
                assert_eq!(line, 2);
                assert_eq!(token, "x");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let mut tokens = Tokens::new("1 2\n-3 4");
        assert!(matches!(
            tokens.matrix(2, 2, true, 4),
            Err(FormatError::Negative { line: 2, value: -3 })
        ));
    }

    #[test]
    fn test_truncated_and_trailing() {
        let mut tokens = Tokens::new("1 2 3");
        assert!(matches!(
            tokens.matrix(2, 2, false, 4),
            Err(FormatError::Truncated { expected: 4, found: 3 })
        ));

        let mut tokens = Tokens::new("1 2\n3 4\n5");
        tokens.matrix(2, 2, false, 4).unwrap();
        assert!(matches!(
            tokens.finish(4),
            Err(FormatError::TrailingData { expected: 4, line: 3 })
        ));
    }

    #[test]
    fn test_dimension_errors() {
        assert!(matches!(Tokens::new("").dimension(), Err(FormatError::MissingHeader)));
        assert!(matches!(Tokens::new("0").dimension(), Err(FormatError::EmptyDimension)));
        assert!(matches!(
            Tokens::new("abc").dimension(),
            Err(FormatError::InvalidNumber { line: 1, .. })
        ));
    }

    #[test]
    fn test_large_declared_dimensions() {
        // a huge size with three values must not allocate for the declared size
        let mut tokens = Tokens::new("1 2 3");
        assert!(matches!(
            tokens.matrix(3_000_000_000, 3_000_000_000, false, 0),
            Err(FormatError::Truncated { found: 3, .. })
        ));

        assert_eq!(value_count(&[2, 3, 4]).unwrap(), 24);
        assert!(matches!(
            value_count(&[2, usize::MAX]),
            Err(FormatError::DimensionTooLarge { .. })
        ));
        let mut tokens = Tokens::new("1");
        assert!(matches!(
            tokens.matrix(usize::MAX, 2, false, 0),
            Err(FormatError::DimensionTooLarge { .. })
        ));
    }

    #[test]
    fn test_cost_bound() {
        assert!(ensure_cost_fits(&[4, 100, 100]).is_ok());
        assert!(ensure_cost_fits(&[1, i64::MAX as u128]).is_ok());
        assert!(matches!(
            ensure_cost_fits(&[2, i64::MAX as u128]),
            Err(FormatError::CostOverflow)
        ));
        assert!(matches!(
            ensure_cost_fits(&[u128::MAX, 2]),
            Err(FormatError::CostOverflow)
        ));
        assert_eq!(max_abs(&[vec![3, -7], vec![i64::MIN]]), 1u128 << 63);
    }

    #[test]
    fn test_value_range() {
        let a = vec![vec![1, -2], vec![3, 6]];
        let (min, max, mean) = value_range([&a]);
        assert_eq!((min, max), (-2, 6));
        assert!((mean - 2.0).abs() < 1e-12);
    }
}
