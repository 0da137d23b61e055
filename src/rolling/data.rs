//! rolling::data — the validated return-series dataset.
//!
//! Purpose
//! -------
//! Hold everything the rolling pipeline reads about the input: the date
//! axis, entity names, the `T×N` return matrix, and the optional market
//! capitalizations and group structure. All shape and content checks happen
//! once, at construction.
//!
//! Invariants & assumptions
//! ------------------------
//! - `dates.len() == T`, strictly increasing.
//! - `entity_names.len() == N ≥ 2`; names are non-empty.
//! - Returns and capitalizations are finite; capitalizations are `T×N`.
//! - A group partition, when present, covers exactly `N` entities and has
//!   one name per group.
//!
//! Conventions
//! -----------
//! - Column order of every matrix is the entity order of `entity_names`.
//! - Date labels use the ISO `YYYY-MM-DD` format.

use crate::{
    errors::{ConnectednessError, ConnectednessResult},
    network::indicators::GroupPartition,
};
use chrono::NaiveDate;
use ndarray::{Array2, ArrayView2};

const DATE_LABEL_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnDataset {
    dates: Vec<NaiveDate>,
    entity_names: Vec<String>,
    returns: Array2<f64>,
    capitalizations: Option<Array2<f64>>,
    groups: Option<(GroupPartition, Vec<String>)>,
}

impl ReturnDataset {
    /// Build a dataset from a date axis, entity names and a `T×N` return matrix.
    ///
    /// Errors
    /// ------
    /// - `ConnectednessError::InvalidDataset` when any invariant listed in
    ///   the module docs is violated; the reason names the first failure.
    pub fn new(dates: Vec<NaiveDate>, entity_names: Vec<String>, returns: Array2<f64>) -> ConnectednessResult<Self> {
        let (t, n) = returns.dim();
        if n < 2 {
            return Err(invalid(format!("at least 2 entities are required, got {n}")));
        }
        if entity_names.len() != n {
            return Err(invalid(format!("{} entity names for {n} return columns", entity_names.len())));
        }
        if entity_names.iter().any(|name| name.trim().is_empty()) {
            return Err(invalid("entity names must be non-empty".to_string()));
        }
        if dates.len() != t {
            return Err(invalid(format!("{} dates for {t} return rows", dates.len())));
        }
        if let Some(pos) = dates.windows(2).position(|w| w[0] >= w[1]) {
            return Err(invalid(format!("dates must be strictly increasing (row {})", pos + 1)));
        }
        check_finite(returns.view(), "returns")?;
        Ok(ReturnDataset { dates, entity_names, returns, capitalizations: None, groups: None })
    }

    /// Attach `T×N` market capitalizations.
    pub fn with_capitalizations(mut self, capitalizations: Array2<f64>) -> ConnectednessResult<Self> {
        if capitalizations.dim() != self.returns.dim() {
            let (t, n) = capitalizations.dim();
            return Err(invalid(format!("capitalizations are {t}x{n}, returns are {}x{}", self.t(), self.n())));
        }
        check_finite(capitalizations.view(), "capitalizations")?;
        self.capitalizations = Some(capitalizations);
        Ok(self)
    }

    /// Attach a contiguous group structure (see [`GroupPartition`]).
    pub fn with_groups(mut self, boundaries: Vec<usize>, group_names: Vec<String>) -> ConnectednessResult<Self> {
        let partition = GroupPartition::new(boundaries, self.n())?;
        if group_names.len() != partition.group_count() {
            return Err(invalid(format!(
                "{} group names for {} groups",
                group_names.len(),
                partition.group_count()
            )));
        }
        self.groups = Some((partition, group_names));
        Ok(self)
    }

    /// Number of observations `T`.
    pub fn t(&self) -> usize {
        self.returns.nrows()
    }

    /// Number of entities `N`.
    pub fn n(&self) -> usize {
        self.returns.ncols()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn labels(&self) -> Vec<String> {
        self.dates.iter().map(|d| d.format(DATE_LABEL_FORMAT).to_string()).collect()
    }

    pub fn entity_names(&self) -> &[String] {
        &self.entity_names
    }

    pub fn returns(&self) -> ArrayView2<'_, f64> {
        self.returns.view()
    }

    pub fn capitalizations(&self) -> Option<ArrayView2<'_, f64>> {
        self.capitalizations.as_ref().map(|c| c.view())
    }

    pub fn partition(&self) -> Option<&GroupPartition> {
        self.groups.as_ref().map(|(p, _)| p)
    }

    pub fn group_names(&self) -> Option<&[String]> {
        self.groups.as_ref().map(|(_, names)| names.as_slice())
    }

    pub fn group_count(&self) -> usize {
        self.partition().map_or(0, GroupPartition::group_count)
    }
}

fn invalid(reason: String) -> ConnectednessError {
    ConnectednessError::InvalidDataset { reason }
}

fn check_finite(data: ArrayView2<f64>, what: &str) -> ConnectednessResult<()> {
    match data.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((row, col), _)) => Err(invalid(format!("non-finite {what} at row {row}, column {col}"))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn daily(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date");
        start.iter_days().take(n).collect()
    }

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("F{i}")).collect()
    }

    #[test]
    // Purpose
    // -------
    // A well-formed dataset exposes its dimensions, labels and groups.
    fn return_dataset_valid_construction() {
        // Arrange
        let returns = Array2::<f64>::from_shape_fn((4, 3), |(t, j)| (t + j) as f64 * 0.01);

        // Act
        let ds = ReturnDataset::new(daily(4), names(3), returns)
            .and_then(|d| d.with_groups(vec![1], vec!["Banks".into(), "Insurers".into()]))
            .expect("valid dataset");

        // Assert
        assert_eq!((ds.t(), ds.n()), (4, 3));
        assert_eq!(ds.labels()[0], "2020-01-01");
        assert_eq!(ds.group_count(), 2);
        assert_eq!(ds.group_names().map(<[String]>::len), Some(2));
        assert!(ds.capitalizations().is_none());
    }

    #[test]
    // Purpose
    // -------
    // Each malformed input is reported as a configuration error.
    fn return_dataset_rejects_malformed_inputs() {
        let ok = Array2::<f64>::zeros((4, 3));
        let mut nan = ok.clone();
        nan[[2, 1]] = f64::NAN;
        let mut unsorted = daily(4);
        unsorted.swap(1, 2);

        let cases = vec![
            ReturnDataset::new(daily(4), names(3), Array2::zeros((4, 1))),
            ReturnDataset::new(daily(4), names(2), ok.clone()),
            ReturnDataset::new(daily(3), names(3), ok.clone()),
            ReturnDataset::new(unsorted, names(3), ok.clone()),
            ReturnDataset::new(daily(4), names(3), nan),
            ReturnDataset::new(daily(4), names(3), ok.clone())
                .and_then(|d| d.with_capitalizations(Array2::zeros((3, 3)))),
            ReturnDataset::new(daily(4), names(3), ok).and_then(|d| d.with_groups(vec![1], vec!["A".into()])),
        ];
        for case in cases {
            let err = case.expect_err("malformed dataset");
            assert_eq!(err.kind(), ErrorKind::Configuration, "{err}");
        }
    }
}
