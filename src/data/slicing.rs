use serde::{Deserialize, Serialize};

use crate::error::{PlotError, Result};

/// How an N-D stack is cut into 2-D images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackSlicing {
    /// Axis to slice along; negative values count from the end.
    /// `None` picks -1 for gray stacks and 0 for RGB stacks.
    pub axis: Option<isize>,
    /// Explicit indices, takes precedence over start/stop/step
    pub slices: Option<Vec<usize>>,
    pub start: Option<usize>,
    pub stop: Option<usize>,
    pub step: Option<usize>,
}

impl StackSlicing {
    pub fn along(axis: isize) -> Self {
        Self {
            axis: Some(axis),
            ..Default::default()
        }
    }

    pub fn with_slices(mut self, slices: Vec<usize>) -> Self {
        self.slices = Some(slices);
        self
    }

    pub fn with_range(mut self, start: Option<usize>, stop: Option<usize>, step: Option<usize>) -> Self {
        self.start = start;
        self.stop = stop;
        self.step = step;
        self
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Resolve the (possibly negative) axis against `ndim`.
    pub fn resolve_axis(&self, ndim: usize, default_axis: isize) -> Result<usize> {
        let axis = self.axis.unwrap_or(default_axis);
        let n = ndim as isize;
        if axis < -n || axis >= n {
            return Err(PlotError::InvalidAxis { axis, ndim });
        }
        Ok(if axis < 0 { (axis + n) as usize } else { axis as usize })
    }

    /// Indices selected along an axis of length `extent`.
    pub fn indices(&self, extent: usize) -> Result<Vec<usize>> {
        if let Some(slices) = &self.slices {
            if slices.is_empty() {
                return Err(PlotError::invalid_option("slices", "must not be empty"));
            }
            if let Some(bad) = slices.iter().find(|&&i| i >= extent) {
                return Err(PlotError::invalid_option(
                    "slices",
                    format!("index {bad} is out of bounds for axis of length {extent}"),
                ));
            }
            return Ok(slices.clone());
        }

        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(PlotError::invalid_option("step", "must be at least 1"));
        }
        let start = self.start.unwrap_or(0);
        let stop = self.stop.unwrap_or(extent).min(extent);
        if start >= stop {
            return Err(PlotError::invalid_option(
                "start",
                format!("start {start} selects nothing before stop {stop}"),
            ));
        }
        Ok((start..stop).step_by(step).collect())
    }
}
