//! Named image filters and their keyword parameters.
//!
//! A [`Filter`] is looked up by name and applied to a 2-D array with a set of
//! [`FilterParams`]. Parameters not given fall back to the usual defaults
//! (`sigma = 1`, `size = 5`, `mode = reflect`, ...).

pub mod ndimage;
pub mod spectrum;

use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{PlotError, Result};
use ndimage::{Boundary, BoundaryMode, Rank};

/// Filters that can be looked up by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    Gaussian,
    Sobel,
    Prewitt,
    Median,
    Max,
    Min,
    Percentile,
    Uniform,
    Laplace,
    GaussianLaplace,
    GaussianGradientMagnitude,
    DiffOfGaussians,
}

impl Filter {
    pub const ALL: [Filter; 12] = [
        Filter::Gaussian,
        Filter::Sobel,
        Filter::Prewitt,
        Filter::Median,
        Filter::Max,
        Filter::Min,
        Filter::Percentile,
        Filter::Uniform,
        Filter::Laplace,
        Filter::GaussianLaplace,
        Filter::GaussianGradientMagnitude,
        Filter::DiffOfGaussians,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Filter::Gaussian => "gaussian",
            Filter::Sobel => "sobel",
            Filter::Prewitt => "prewitt",
            Filter::Median => "median",
            Filter::Max => "max",
            Filter::Min => "min",
            Filter::Percentile => "percentile",
            Filter::Uniform => "uniform",
            Filter::Laplace => "laplace",
            Filter::GaussianLaplace => "gaussian_laplace",
            Filter::GaussianGradientMagnitude => "gaussian_gradient_magnitude",
            Filter::DiffOfGaussians => "diff_of_gaussians",
        }
    }

    /// Keyword arguments understood by this filter.
    pub fn accepted_params(&self) -> &'static [&'static str] {
        match self {
            Filter::Gaussian | Filter::GaussianLaplace | Filter::GaussianGradientMagnitude => {
                &["sigma", "mode", "cval", "truncate"]
            }
            Filter::Sobel | Filter::Prewitt => &["axis", "mode", "cval"],
            Filter::Median | Filter::Max | Filter::Min | Filter::Uniform => {
                &["size", "mode", "cval"]
            }
            Filter::Percentile => &["percentile", "size", "mode", "cval"],
            Filter::Laplace => &["mode", "cval"],
            Filter::DiffOfGaussians => &["low_sigma", "high_sigma", "mode", "cval", "truncate"],
        }
    }

    pub fn available() -> String {
        Filter::ALL.map(|f| f.name()).join(", ")
    }

    /// Run the filter on `input`.
    pub fn apply(&self, input: ArrayView2<f64>, params: &FilterParams) -> Result<Array2<f64>> {
        params.check_keys(self.name(), self.accepted_params())?;
        let boundary = params.boundary()?;

        let out = match self {
            Filter::Gaussian => {
                ndimage::gaussian_filter(input, params.sigma("sigma", 1.0)?, params.truncate()?, boundary)
            }
            Filter::Sobel => ndimage::sobel(input, params.axis()?, boundary),
            Filter::Prewitt => ndimage::prewitt(input, params.axis()?, boundary),
            Filter::Median => ndimage::rank_filter(input, params.size()?, Rank::Median, boundary),
            Filter::Max => ndimage::rank_filter(input, params.size()?, Rank::Max, boundary),
            Filter::Min => ndimage::rank_filter(input, params.size()?, Rank::Min, boundary),
            Filter::Percentile => {
                let p = params.get_f64("percentile", 50.0)?;
                if !(-100.0..=100.0).contains(&p) {
                    return Err(PlotError::invalid_option(
                        "percentile",
                        "must be within [-100, 100]",
                    ));
                }
                ndimage::rank_filter(input, params.size()?, Rank::Percentile(p), boundary)
            }
            Filter::Uniform => ndimage::uniform_filter(input, params.size()?, boundary),
            Filter::Laplace => ndimage::laplace(input, boundary),
            Filter::GaussianLaplace => {
                ndimage::gaussian_laplace(input, params.sigma("sigma", 1.0)?, params.truncate()?, boundary)
            }
            Filter::GaussianGradientMagnitude => ndimage::gaussian_gradient_magnitude(
                input,
                params.sigma("sigma", 1.0)?,
                params.truncate()?,
                boundary,
            ),
            Filter::DiffOfGaussians => {
                let low = params.sigma("low_sigma", 1.0)?;
                let high = params.sigma("high_sigma", 1.6 * low)?;
                if high < low {
                    return Err(PlotError::invalid_option(
                        "high_sigma",
                        "must be greater than or equal to low_sigma",
                    ));
                }
                let truncate = params.truncate()?;
                ndimage::gaussian_filter(input, low, truncate, boundary)
                    - ndimage::gaussian_filter(input, high, truncate, boundary)
            }
        };
        Ok(out)
    }
}

impl FromStr for Filter {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        Filter::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| PlotError::UnknownFilter {
                name: s.to_string(),
                available: Filter::available(),
            })
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A keyword argument value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ParamValue>),
}

impl ParamValue {
    /// Parse a command-line value: `true`, `3`, `1.5`, `reflect`, or a
    /// comma-separated list of those.
    pub fn parse(s: &str) -> Self {
        if s.contains(',') {
            return ParamValue::List(s.split(',').map(|p| ParamValue::parse(p.trim())).collect());
        }
        if let Ok(b) = s.parse::<bool>() {
            ParamValue::Bool(b)
        } else if let Ok(i) = s.parse::<i64>() {
            ParamValue::Int(i)
        } else if let Ok(f) = s.parse::<f64>() {
            ParamValue::Float(f)
        } else {
            ParamValue::Str(s.to_string())
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::List(values) => Some(values),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ParamValue::Bool(_) => "a boolean",
            ParamValue::Int(_) => "an integer",
            ParamValue::Float(_) => "a number",
            ParamValue::Str(_) => "a string",
            ParamValue::List(_) => "a list",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Str(s) => f.write_str(s),
            ParamValue::List(values) => {
                let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(i64::from(v))
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Ordered keyword arguments of a filter call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterParams(Vec<(String, ParamValue)>);

impl FilterParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FilterParams::set`].
    pub fn with(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or replace `key`, keeping the original position on replace.
    pub fn set(&mut self, key: &str, value: impl Into<ParamValue>) {
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy with `overrides` applied on top.
    pub fn merged(&self, overrides: &[(&str, ParamValue)]) -> Self {
        let mut out = self.clone();
        for (k, v) in overrides {
            out.set(k, v.clone());
        }
        out
    }

    fn check_keys(&self, filter: &str, accepted: &[&str]) -> Result<()> {
        match self.0.iter().find(|(k, _)| !accepted.contains(&k.as_str())) {
            Some((k, _)) => Err(PlotError::invalid_option(
                k.clone(),
                format!(
                    "'{filter}' got an unexpected parameter, accepted: {}",
                    accepted.join(", ")
                ),
            )),
            None => Ok(()),
        }
    }

    fn wrong_type(key: &str, expected: &str, got: &ParamValue) -> PlotError {
        PlotError::invalid_option(key, format!("expected {expected}, got {}", got.kind()))
    }

    pub fn get_f64(&self, key: &str, default: f64) -> Result<f64> {
        match self.get(key) {
            None => Ok(default),
            Some(v) => v.as_f64().ok_or_else(|| Self::wrong_type(key, "a number", v)),
        }
    }

    pub fn get_i64(&self, key: &str, default: i64) -> Result<i64> {
        match self.get(key) {
            None => Ok(default),
            Some(ParamValue::Int(i)) => Ok(*i),
            Some(ParamValue::Float(f)) if f.fract() == 0.0 => Ok(*f as i64),
            Some(v) => Err(Self::wrong_type(key, "an integer", v)),
        }
    }

    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> Result<&'a str> {
        match self.get(key) {
            None => Ok(default),
            Some(ParamValue::Str(s)) => Ok(s),
            Some(v) => Err(Self::wrong_type(key, "a string", v)),
        }
    }

    fn sigma(&self, key: &str, default: f64) -> Result<f64> {
        let sigma = self.get_f64(key, default)?;
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(PlotError::invalid_option(key, "must be a positive number"));
        }
        Ok(sigma)
    }

    fn truncate(&self) -> Result<f64> {
        let t = self.get_f64("truncate", 4.0)?;
        if !(t.is_finite() && t >= 0.0) {
            return Err(PlotError::invalid_option("truncate", "must be non-negative"));
        }
        Ok(t)
    }

    fn size(&self) -> Result<usize> {
        let size = self.get_i64("size", 5)?;
        if size < 1 {
            return Err(PlotError::invalid_option("size", "must be at least 1"));
        }
        Ok(size as usize)
    }

    fn axis(&self) -> Result<usize> {
        ndimage::resolve_axis(self.get_i64("axis", -1)?)
    }

    fn boundary(&self) -> Result<Boundary> {
        let mode: BoundaryMode = self.get_str("mode", "reflect")?.parse()?;
        Ok(Boundary {
            mode,
            cval: self.get_f64("cval", 0.0)?,
        })
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for FilterParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = FilterParams::new();
        for (k, v) in iter {
            let k: String = k.into();
            params.set(&k, v);
        }
        params
    }
}
