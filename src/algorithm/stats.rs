//! Rates, contingency tables and the significance tests run on them

use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{Error, Result};

/// A proportion kept as its raw counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Rate {
    pub numerator: u64,
    pub denominator: u64,
}

impl Rate {
    #[must_use]
    pub const fn new(numerator: u64, denominator: u64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Count how many items satisfy `hit`
    pub fn count_where<T>(
        items: impl IntoIterator<Item = T>,
        mut hit: impl FnMut(&T) -> bool,
    ) -> Self {
        items.into_iter().fold(Self::default(), |mut rate, item| {
            rate.denominator += 1;
            if hit(&item) {
                rate.numerator += 1;
            }
            rate
        })
    }

    /// Record one observation
    pub fn observe(&mut self, hit: bool) {
        self.denominator += 1;
        if hit {
            self.numerator += 1;
        }
    }

    /// Proportion in [0, 1], `None` for an empty denominator
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        (self.denominator > 0)
            .then(|| (self.numerator.min(self.denominator)) as f64 / self.denominator as f64)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(v) => write!(f, "{:.4} ({}/{})", v, self.numerator, self.denominator),
            None => write!(f, "n/a (0/0)"),
        }
    }
}

/// Cross-tabulated counts of two categorical variables
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContingencyTable {
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    /// `counts[row][column]`
    pub counts: Vec<Vec<u64>>,
}

impl ContingencyTable {
    /// Build a table from observed `(row, column)` pairs
    ///
    /// Rows and columns are ordered by their natural ordering, so ordinal
    /// categories keep their order.
    pub fn from_pairs<R, C>(pairs: impl IntoIterator<Item = (R, C)>) -> Self
    where
        R: Ord + fmt::Display,
        C: Ord + fmt::Display + Clone,
    {
        let mut cells: BTreeMap<R, BTreeMap<C, u64>> = BTreeMap::new();
        let mut columns: BTreeSet<C> = BTreeSet::new();

        for (row, column) in pairs {
            columns.insert(column.clone());
            *cells.entry(row).or_default().entry(column).or_default() += 1;
        }

        let column_keys: Vec<C> = columns.into_iter().collect();
        let row_labels = cells.keys().map(ToString::to_string).collect();
        let counts = cells
            .values()
            .map(|row| {
                column_keys
                    .iter()
                    .map(|c| row.get(c).copied().unwrap_or(0))
                    .collect()
            })
            .collect();

        Self {
            row_labels,
            column_labels: column_keys.iter().map(ToString::to_string).collect(),
            counts,
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// Copy of the table without all-zero rows and columns
    #[must_use]
    pub fn without_empty(&self) -> Self {
        let keep_rows: Vec<usize> = (0..self.counts.len())
            .filter(|&r| self.counts[r].iter().any(|&c| c > 0))
            .collect();
        let keep_cols: Vec<usize> = (0..self.column_labels.len())
            .filter(|&c| self.counts.iter().any(|row| row.get(c).copied().unwrap_or(0) > 0))
            .collect();

        Self {
            row_labels: keep_rows.iter().map(|&r| self.row_labels[r].clone()).collect(),
            column_labels: keep_cols
                .iter()
                .map(|&c| self.column_labels[c].clone())
                .collect(),
            counts: keep_rows
                .iter()
                .map(|&r| keep_cols.iter().map(|&c| self.counts[r][c]).collect())
                .collect(),
        }
    }
}

/// Outcome of a single significance test
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TestStatistic {
    pub statistic: f64,
    pub degrees_of_freedom: Option<f64>,
    pub p_value: f64,
}

/// Pearson chi-square test of independence
///
/// Empty rows and columns are dropped first. Fails when fewer than two rows
/// or columns remain or when any expected count is below `min_expected`.
pub fn chi_square_independence(
    table: &ContingencyTable,
    min_expected: f64,
) -> Result<TestStatistic> {
    let table = table.without_empty();
    let rows = table.row_labels.len();
    let cols = table.column_labels.len();

    if rows < 2 || cols < 2 {
        return Err(Error::insufficient(format!(
            "contingency table must be at least 2x2 after removing empty categories, got {rows}x{cols}"
        )));
    }

    let row_totals: Vec<f64> = table
        .counts
        .iter()
        .map(|row| row.iter().sum::<u64>() as f64)
        .collect();
    let col_totals: Vec<f64> = (0..cols)
        .map(|c| table.counts.iter().map(|row| row[c]).sum::<u64>() as f64)
        .collect();
    let total = table.total() as f64;

    let mut statistic = 0.0;
    for (r, row) in table.counts.iter().enumerate() {
        for (c, &observed) in row.iter().enumerate() {
            let expected = row_totals[r] * col_totals[c] / total;
            if expected < min_expected {
                return Err(Error::insufficient(format!(
                    "expected count {expected:.2} for ({}, {}) is below {min_expected}",
                    table.row_labels[r], table.column_labels[c]
                )));
            }
            let diff = observed as f64 - expected;
            statistic += diff * diff / expected;
        }
    }

    let df = ((rows - 1) * (cols - 1)) as f64;
    let dist = ChiSquared::new(df).map_err(|e| Error::InvalidInput(e.to_string()))?;

    Ok(TestStatistic {
        statistic,
        degrees_of_freedom: Some(df),
        p_value: dist.sf(statistic).clamp(0.0, 1.0),
    })
}

/// Two-sided two-proportion z-test with a pooled standard error
///
/// The statistic is positive when `second` has the higher proportion.
pub fn two_proportion_z_test(
    first: Rate,
    second: Rate,
    min_group_size: usize,
) -> Result<TestStatistic> {
    let min = (min_group_size as u64).max(1);
    if first.denominator < min || second.denominator < min {
        return Err(Error::insufficient(format!(
            "each group needs at least {min_group_size} observations, got {} and {}",
            first.denominator, second.denominator
        )));
    }

    let n1 = first.denominator as f64;
    let n2 = second.denominator as f64;
    let p1 = first.numerator as f64 / n1;
    let p2 = second.numerator as f64 / n2;
    let pooled = (first.numerator + second.numerator) as f64 / (n1 + n2);

    if pooled <= 0.0 || pooled >= 1.0 {
        return Err(Error::insufficient(format!(
            "pooled proportion is {pooled}, no variation to test"
        )));
    }

    let se = (pooled * (1.0 - pooled) * (1.0 / n1 + 1.0 / n2)).sqrt();
    let z = (p2 - p1) / se;
    let normal = Normal::standard();

    Ok(TestStatistic {
        statistic: z,
        degrees_of_freedom: None,
        p_value: (2.0 * normal.sf(z.abs())).clamp(0.0, 1.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_rate_value_and_display() {
        let rate = Rate::new(92, 100);
        assert_eq!(rate.value(), Some(0.92));
        assert_eq!(rate.to_string(), "0.9200 (92/100)");
        assert_eq!(Rate::default().value(), None);
    }

    #[test]
    fn test_rate_count_where() {
        let rate = Rate::count_where(1..=10, |n| n % 2 == 0);
        assert_eq!(rate, Rate::new(5, 10));
    }

    #[test]
    fn test_contingency_from_pairs_orders_labels() {
        let table = ContingencyTable::from_pairs(vec![
            ("b", true),
            ("a", false),
            ("a", true),
            ("a", true),
        ]);
        assert_eq!(table.row_labels, vec!["a", "b"]);
        assert_eq!(table.column_labels, vec!["false", "true"]);
        assert_eq!(table.counts, vec![vec![1, 2], vec![0, 1]]);
        assert_eq!(table.total(), 4);
    }

    #[test]
    fn test_chi_square_2x2() {
        let table = ContingencyTable {
            row_labels: vec!["x".into(), "y".into()],
            column_labels: vec!["yes".into(), "no".into()],
            counts: vec![vec![10, 20], vec![20, 10]],
        };
        let result = chi_square_independence(&table, 5.0).unwrap();
        assert!(approx(result.statistic, 6.666_666_7, 1e-6));
        assert_eq!(result.degrees_of_freedom, Some(1.0));
        assert!(approx(result.p_value, 0.009_823_27, 1e-6));
    }

    #[test]
    fn test_chi_square_3x2_drops_empty_column() {
        let table = ContingencyTable {
            row_labels: vec!["a".into(), "b".into(), "c".into()],
            column_labels: vec!["yes".into(), "never".into(), "no".into()],
            counts: vec![vec![30, 0, 10], vec![20, 0, 20], vec![10, 0, 30]],
        };
        let result = chi_square_independence(&table, 5.0).unwrap();
        assert!(approx(result.statistic, 20.0, 1e-9));
        assert_eq!(result.degrees_of_freedom, Some(2.0));
        assert!(approx(result.p_value, 4.539_993e-5, 1e-9));
    }

    #[test]
    fn test_chi_square_insufficient() {
        let small = ContingencyTable {
            row_labels: vec!["a".into(), "b".into()],
            column_labels: vec!["yes".into(), "no".into()],
            counts: vec![vec![1, 2], vec![2, 1]],
        };
        assert!(matches!(
            chi_square_independence(&small, 5.0),
            Err(Error::InsufficientSample(_))
        ));

        let single_row = ContingencyTable::from_pairs(vec![("a", 1), ("a", 2)]);
        assert!(chi_square_independence(&single_row, 0.0).is_err());
    }

    #[test]
    fn test_z_test_known_values() {
        let result = two_proportion_z_test(Rate::new(30, 100), Rate::new(45, 100), 10).unwrap();
        assert!(approx(result.statistic, 2.190_890_2, 1e-6));
        assert!(approx(result.p_value, 0.028_459_74, 1e-6));

        // Swapping the groups flips the sign, not the p-value
        let swapped = two_proportion_z_test(Rate::new(45, 100), Rate::new(30, 100), 10).unwrap();
        assert!(approx(swapped.statistic, -result.statistic, 1e-12));
        assert_eq!(swapped.p_value, result.p_value);
    }

    #[test]
    fn test_z_test_insufficient() {
        assert!(two_proportion_z_test(Rate::new(3, 5), Rate::new(40, 100), 10).is_err());
        // No variation at all
        assert!(two_proportion_z_test(Rate::new(0, 50), Rate::new(0, 50), 10).is_err());
        assert!(two_proportion_z_test(Rate::new(50, 50), Rate::new(50, 50), 10).is_err());
    }

    #[test]
    fn test_p_value_is_deterministic() {
        let table = ContingencyTable::from_pairs(
            (0..200).map(|i| (i % 3, (i * 7) % 2 == 0 || i % 5 == 0)),
        );
        let first = chi_square_independence(&table, 1.0).unwrap();
        let second = chi_square_independence(&table, 1.0).unwrap();
        assert_eq!(first, second);
    }
}
