//! Colour scaling: limits, robust percentiles, normalization and colorbar ticks.

use serde::{Deserialize, Serialize};

use crate::error::{PlotError, Result};

/// Default robust percentile range
pub const DEFAULT_PERCENTILES: (f64, f64) = (2.0, 98.0);

/// How values are mapped onto the colormap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    #[default]
    Linear,
    /// Base-10 logarithmic scale
    Log,
}

impl Norm {
    /// Map `v` into [0, 1] for limits `lo..hi`. Returns NaN for missing data.
    pub fn normalize(&self, v: f64, lo: f64, hi: f64) -> f64 {
        if !v.is_finite() {
            return f64::NAN;
        }
        match self {
            Norm::Linear => {
                if hi > lo {
                    (v - lo) / (hi - lo)
                } else {
                    0.0
                }
            }
            Norm::Log => {
                if v <= 0.0 {
                    return f64::NAN;
                }
                let (llo, lhi) = (lo.log10(), hi.log10());
                if lhi > llo {
                    (v.log10() - llo) / (lhi - llo)
                } else {
                    0.0
                }
            }
        }
    }

    /// Inverse of [`Norm::normalize`].
    pub fn value_at(&self, t: f64, lo: f64, hi: f64) -> f64 {
        match self {
            Norm::Linear => lo + t * (hi - lo),
            Norm::Log => 10f64.powf(lo.log10() + t * (hi.log10() - lo.log10())),
        }
    }
}

/// Which colorbar ends are drawn as extension triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Extend {
    #[default]
    Neither,
    Min,
    Max,
    Both,
}

impl Extend {
    fn from_flags(min: bool, max: bool) -> Self {
        match (min, max) {
            (true, true) => Extend::Both,
            (true, false) => Extend::Min,
            (false, true) => Extend::Max,
            (false, false) => Extend::Neither,
        }
    }

    pub fn has_min(&self) -> bool {
        matches!(self, Extend::Min | Extend::Both)
    }

    pub fn has_max(&self) -> bool {
        matches!(self, Extend::Max | Extend::Both)
    }
}

/// Resolved colour limits of one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorLimits {
    pub vmin: f64,
    pub vmax: f64,
    pub extend: Extend,
}

impl ColorLimits {
    /// Explicit limits win; robust fills only the missing ones from
    /// percentiles; otherwise the data range is used.
    pub fn resolve(
        values: &[f64],
        vmin: Option<f64>,
        vmax: Option<f64>,
        robust: bool,
        perc: (f64, f64),
    ) -> Result<Self> {
        let (data_lo, data_hi) = finite_range(values).unwrap_or((0.0, 1.0));

        let mut robust_min = false;
        let mut robust_max = false;
        let lo = match vmin {
            Some(v) => v,
            None if robust => {
                robust_min = true;
                nan_percentile(values, perc.0)?.unwrap_or(data_lo)
            }
            None => data_lo,
        };
        let hi = match vmax {
            Some(v) => v,
            None if robust => {
                robust_max = true;
                nan_percentile(values, perc.1)?.unwrap_or(data_hi)
            }
            None => data_hi,
        };
        if lo > hi {
            let name = if vmin.is_some() { "vmin" } else { "vmax" };
            return Err(PlotError::invalid_option(
                name,
                format!("resolved limits are inverted ({lo} > {hi})"),
            ));
        }

        Ok(Self {
            vmin: lo,
            vmax: hi,
            extend: Extend::from_flags(robust_min, robust_max),
        })
    }
}

/// Min and max of the finite values, if any.
pub fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Percentile `q` ∈ [0, 100] of the finite values with linear interpolation
/// between order statistics. `None` when there is no finite value.
pub fn nan_percentile(values: &[f64], q: f64) -> Result<Option<f64>> {
    if !(0.0..=100.0).contains(&q) {
        return Err(PlotError::invalid_option(
            "perc",
            format!("percentile {q} must be within [0, 100]"),
        ));
    }
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return Ok(None);
    }
    sorted.sort_by(f64::total_cmp);

    let pos = q / 100.0 * (sorted.len() - 1) as f64;
    let low = pos.floor() as usize;
    let high = pos.ceil() as usize;
    let frac = pos - low as f64;
    Ok(Some(sorted[low] + (sorted[high] - sorted[low]) * frac))
}

/// Counts of the finite values in `bins` equal-width bins over their range.
/// A constant input gets a unit-wide range around its value.
pub fn histogram(values: &[f64], bins: usize) -> (Vec<usize>, (f64, f64)) {
    let bins = bins.max(1);
    let (lo, hi) = match finite_range(values) {
        Some((lo, hi)) if hi > lo => (lo, hi),
        Some((v, _)) => (v - 0.5, v + 0.5),
        None => (0.0, 1.0),
    };
    let mut counts = vec![0; bins];
    for v in values.iter().copied().filter(|v| v.is_finite()) {
        let i = ((v - lo) / (hi - lo) * bins as f64) as usize;
        // the last bin is closed on the right
        counts[i.min(bins - 1)] += 1;
    }
    (counts, (lo, hi))
}

/// Up to `max_ticks` round tick values inside `[lo, hi]`.
pub fn nice_ticks(lo: f64, hi: f64, max_ticks: usize) -> Vec<f64> {
    if !(lo.is_finite() && hi.is_finite()) || max_ticks == 0 {
        return Vec::new();
    }
    if hi <= lo {
        return vec![lo];
    }

    let raw = (hi - lo) / max_ticks.max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| ((hi - lo) / s).floor() as usize + 1 <= max_ticks)
        .unwrap_or(10.0 * magnitude);

    let first = (lo / step).ceil() * step;
    let mut ticks = Vec::new();
    let mut t = first;
    while t <= hi + step * 1e-9 && ticks.len() < max_ticks {
        // snap -0.0 and float noise
        let snapped = (t / step).round() * step;
        ticks.push(if snapped == 0.0 { 0.0 } else { snapped });
        t += step;
    }
    ticks
}

/// Ticks for a log colorbar: powers of ten inside the range.
pub fn log_ticks(lo: f64, hi: f64, max_ticks: usize) -> Vec<f64> {
    if lo <= 0.0 || hi <= lo {
        return Vec::new();
    }
    let (a, b) = (lo.log10().ceil() as i32, hi.log10().floor() as i32);
    let span = (b - a + 1).max(1) as usize;
    let stride = span.div_ceil(max_ticks.max(1)).max(1);
    (a..=b)
        .step_by(stride)
        .map(|e| 10f64.powi(e))
        .take(max_ticks)
        .collect()
}

/// Compact label for a tick value.
pub fn format_tick(v: f64) -> String {
    let a = v.abs();
    if a != 0.0 && !(1e-3..1e4).contains(&a) {
        return format!("{v:.1e}");
    }
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_matches_linear_interpolation() {
        let values: Vec<f64> = (0..=100).map(f64::from).collect();
        assert_eq!(nan_percentile(&values, 2.0).unwrap(), Some(2.0));
        let small = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(nan_percentile(&small, 50.0).unwrap(), Some(2.5));
        let with_nan = [f64::NAN, 1.0, 3.0];
        assert_eq!(nan_percentile(&with_nan, 50.0).unwrap(), Some(2.0));
        assert!(nan_percentile(&small, 101.0).is_err());
    }

    #[test]
    fn robust_only_fills_missing_limits() {
        let values: Vec<f64> = (0..=100).map(f64::from).collect();
        let both = ColorLimits::resolve(&values, None, None, true, (2.0, 98.0)).unwrap();
        assert_eq!((both.vmin, both.vmax), (2.0, 98.0));
        assert_eq!(both.extend, Extend::Both);

        let min_fixed = ColorLimits::resolve(&values, Some(0.0), None, true, (2.0, 98.0)).unwrap();
        assert_eq!((min_fixed.vmin, min_fixed.vmax), (0.0, 98.0));
        assert_eq!(min_fixed.extend, Extend::Max);

        let fixed = ColorLimits::resolve(&values, Some(0.0), Some(1.0), true, (2.0, 98.0)).unwrap();
        assert_eq!(fixed.extend, Extend::Neither);

        let plain = ColorLimits::resolve(&values, None, None, false, (2.0, 98.0)).unwrap();
        assert_eq!((plain.vmin, plain.vmax), (0.0, 100.0));
    }

    #[test]
    fn one_sided_limit_past_the_data_is_rejected() {
        let values: Vec<f64> = (0..=10).map(f64::from).collect();
        let above = ColorLimits::resolve(&values, Some(100.0), None, true, (2.0, 98.0));
        assert!(matches!(above, Err(PlotError::InvalidOption { ref name, .. }) if name == "vmin"));

        let below = ColorLimits::resolve(&values, None, Some(-5.0), false, (2.0, 98.0));
        assert!(matches!(below, Err(PlotError::InvalidOption { ref name, .. }) if name == "vmax"));
    }

    #[test]
    fn log_norm_maps_decades_evenly() {
        let n = Norm::Log;
        assert!((n.normalize(10.0, 1.0, 100.0) - 0.5).abs() < 1e-12);
        assert!(n.normalize(-1.0, 1.0, 100.0).is_nan());
        assert!((n.value_at(0.5, 1.0, 100.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn nice_ticks_stay_in_range_and_are_few() {
        let ticks = nice_ticks(0.0, 1.0, 3);
        assert!(ticks.len() <= 3 && !ticks.is_empty());
        assert!(ticks.iter().all(|t| (0.0..=1.0).contains(t)));
        assert_eq!(nice_ticks(0.0, 10.0, 3), vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn histogram_counts_every_finite_value() {
        let values = [0.0, 0.1, 0.5, 0.9, 1.0, f64::NAN];
        let (counts, range) = histogram(&values, 2);
        assert_eq!(range, (0.0, 1.0));
        assert_eq!(counts, vec![2, 3]);
        let (flat, range) = histogram(&[2.0, 2.0], 4);
        assert_eq!(range, (1.5, 2.5));
        assert_eq!(flat.iter().sum::<usize>(), 2);
    }

    #[test]
    fn tick_labels_are_compact() {
        assert_eq!(format_tick(0.5), "0.5");
        assert_eq!(format_tick(10.0), "10");
        assert_eq!(format_tick(12345.0), "1.2e4");
    }
}
