//! Named variables over shared axes.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use ndarray::Array2;

use crate::axes::Axes;
use crate::error::GridError;

/// A collection of named variables sharing one set of axes.
///
/// Each variable is an `(n_segs, n_dates)` grid of `Option<f64>` cells.
/// Inserting a variable with the wrong shape is rejected, so every
/// variable in a dataset is guaranteed positionally aligned with every
/// other.
#[derive(Debug, Clone)]
pub struct Dataset {
    axes: Axes,
    vars: BTreeMap<String, Array2<Option<f64>>>,
}

impl Dataset {
    /// Creates an empty dataset over the given axes.
    pub fn new(axes: Axes) -> Self {
        Self {
            axes,
            vars: BTreeMap::new(),
        }
    }

    /// Returns the shared axes.
    pub fn axes(&self) -> &Axes {
        &self.axes
    }

    /// Returns the number of variables.
    pub fn n_vars(&self) -> usize {
        self.vars.len()
    }

    /// Returns `true` if the dataset holds the named variable.
    pub fn contains_var(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Returns the variable names in sorted order.
    pub fn var_names(&self) -> Vec<&str> {
        self.vars.keys().map(String::as_str).collect()
    }

    /// Iterates over `(name, values)` pairs in sorted name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Array2<Option<f64>>)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Inserts a variable.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ShapeMismatch`] if the values do not match the
    /// axes, or [`GridError::DuplicateVariable`] if the name is taken.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        values: Array2<Option<f64>>,
    ) -> Result<(), GridError> {
        let name = name.into();
        let (got_segs, got_dates) = values.dim();
        let (expected_segs, expected_dates) = self.axes.shape();
        if (got_segs, got_dates) != (expected_segs, expected_dates) {
            return Err(GridError::ShapeMismatch {
                name,
                expected_segs,
                expected_dates,
                got_segs,
                got_dates,
            });
        }
        if self.vars.contains_key(&name) {
            return Err(GridError::DuplicateVariable { name });
        }
        self.vars.insert(name, values);
        Ok(())
    }

    /// Inserts a dense variable, converting the NaN sentinel to `None`.
    ///
    /// This is the I/O-boundary entry point: file formats encode missing
    /// cells as NaN, the pipeline never does.
    ///
    /// # Errors
    ///
    /// Same as [`Dataset::insert`].
    pub fn insert_dense(
        &mut self,
        name: impl Into<String>,
        values: Array2<f64>,
    ) -> Result<(), GridError> {
        let cells = values.mapv(|v| if v.is_nan() { None } else { Some(v) });
        self.insert(name, cells)
    }

    /// Inserts an all-missing variable.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DuplicateVariable`] if the name is taken.
    pub fn insert_empty(&mut self, name: impl Into<String>) -> Result<(), GridError> {
        let (n_segs, n_dates) = self.axes.shape();
        self.insert(name, Array2::from_elem((n_segs, n_dates), None))
    }

    /// Returns a variable's cells.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownVariable`] if the name is absent.
    pub fn var(&self, name: &str) -> Result<&Array2<Option<f64>>, GridError> {
        self.vars.get(name).ok_or_else(|| GridError::UnknownVariable {
            name: name.to_string(),
        })
    }

    /// Returns one cell, addressed by axis labels.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownVariable`], [`GridError::UnknownSegment`],
    /// or [`GridError::UnknownDate`] on a bad label.
    pub fn get(&self, name: &str, seg_id: i64, date: NaiveDate) -> Result<Option<f64>, GridError> {
        let values = self.var(name)?;
        let (i, j) = self.cell_pos(seg_id, date)?;
        Ok(values[(i, j)])
    }

    /// Sets one cell, addressed by axis labels.
    ///
    /// # Errors
    ///
    /// Same lookup errors as [`Dataset::get`].
    pub fn set(
        &mut self,
        name: &str,
        seg_id: i64,
        date: NaiveDate,
        value: Option<f64>,
    ) -> Result<(), GridError> {
        let (i, j) = self.cell_pos(seg_id, date)?;
        let values = self
            .vars
            .get_mut(name)
            .ok_or_else(|| GridError::UnknownVariable {
                name: name.to_string(),
            })?;
        values[(i, j)] = value;
        Ok(())
    }

    /// Exports a variable as a dense grid, converting `None` to NaN.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownVariable`] if the name is absent.
    pub fn to_dense(&self, name: &str) -> Result<Array2<f64>, GridError> {
        Ok(self.var(name)?.mapv(|v| v.unwrap_or(f64::NAN)))
    }

    fn cell_pos(&self, seg_id: i64, date: NaiveDate) -> Result<(usize, usize), GridError> {
        let i = self
            .axes
            .seg_pos(seg_id)
            .ok_or(GridError::UnknownSegment { seg_id })?;
        let j = self
            .axes
            .date_pos(date)
            .ok_or(GridError::UnknownDate { date })?;
        Ok((i, j))
    }
}
