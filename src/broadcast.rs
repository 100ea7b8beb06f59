//! Broadcasting of per-image options across grid cells.

use crate::error::{PlotError, Result};

/// An option bound either to one value for every cell or to one value per cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Param<T> {
    One(T),
    PerCell(Vec<T>),
}

impl<T: Clone> Param<T> {
    /// Expand to exactly `n` values.
    pub fn broadcast(&self, name: &str, n: usize) -> Result<Vec<T>> {
        match self {
            Param::One(v) => Ok(vec![v.clone(); n]),
            Param::PerCell(values) if values.len() == n => Ok(values.clone()),
            Param::PerCell(values) => Err(PlotError::ParamLength {
                name: name.to_string(),
                expected: n,
                got: values.len(),
            }),
        }
    }

    /// Like [`Param::broadcast`], but a per-cell list sized to the source
    /// images is repeated once per transform when transforms multiply the
    /// cell count.
    pub fn broadcast_tiled(&self, name: &str, n_source: usize, n_cells: usize) -> Result<Vec<T>> {
        match self {
            Param::PerCell(values)
                if values.len() == n_source && n_source > 0 && n_cells % n_source == 0 =>
            {
                let repeats = n_cells / n_source;
                Ok(values.iter().cloned().cycle().take(values.len() * repeats).collect())
            }
            _ => self.broadcast(name, n_cells),
        }
    }

    pub fn is_per_cell(&self) -> bool {
        matches!(self, Param::PerCell(_))
    }

    pub fn len(&self) -> Option<usize> {
        match self {
            Param::One(_) => None,
            Param::PerCell(v) => Some(v.len()),
        }
    }
}

impl<T: Default> Default for Param<T> {
    fn default() -> Self {
        Param::One(T::default())
    }
}

impl<T> From<T> for Param<T> {
    fn from(v: T) -> Self {
        Param::One(v)
    }
}

impl<T> From<Vec<T>> for Param<T> {
    fn from(values: Vec<T>) -> Self {
        Param::PerCell(values)
    }
}

impl<T> Param<Option<T>> {
    /// Unset for every cell.
    pub fn unset() -> Self {
        Param::One(None)
    }

    /// Same value for every cell.
    pub fn all(v: impl Into<T>) -> Self {
        Param::One(Some(v.into()))
    }

    /// One value per cell, every entry set.
    pub fn each<V: Into<T>>(values: impl IntoIterator<Item = V>) -> Self {
        Param::PerCell(values.into_iter().map(|v| Some(v.into())).collect())
    }
}
