//! Per-image styling options and their validation.

use std::fmt;
use std::str::FromStr;

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::colormap::COLORMAP_REGISTRY;
use crate::error::{PlotError, Result};
use crate::scalebar::Dimension;
use crate::scale::{DEFAULT_PERCENTILES, Norm};

/// Colorbar placement relative to the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

impl FromStr for Orientation {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "v" | "vertical" => Ok(Orientation::Vertical),
            "h" | "horizontal" => Ok(Orientation::Horizontal),
            _ => Err(PlotError::invalid_option(
                "orientation",
                "must be either 'horizontal' or 'h' / 'vertical' or 'v'",
            )),
        }
    }
}

/// Where row 0 of the array is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    #[default]
    Upper,
    Lower,
}

impl FromStr for Origin {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "upper" => Ok(Origin::Upper),
            "lower" => Ok(Origin::Lower),
            _ => Err(PlotError::invalid_option("origin", "must be 'upper' or 'lower'")),
        }
    }
}

/// Resampling used when the image is scaled into its axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    #[default]
    Nearest,
    Bilinear,
    Bicubic,
}

impl Interpolation {
    pub fn filter_type(&self) -> FilterType {
        match self {
            Interpolation::Nearest => FilterType::Nearest,
            Interpolation::Bilinear => FilterType::Triangle,
            Interpolation::Bicubic => FilterType::CatmullRom,
        }
    }
}

impl FromStr for Interpolation {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "nearest" | "none" => Ok(Interpolation::Nearest),
            "bilinear" => Ok(Interpolation::Bilinear),
            "bicubic" => Ok(Interpolation::Bicubic),
            other => Err(PlotError::invalid_option(
                "interpolation",
                format!("'{other}' is not one of nearest, bilinear, bicubic"),
            )),
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Interpolation::Nearest => "nearest",
            Interpolation::Bilinear => "bilinear",
            Interpolation::Bicubic => "bicubic",
        };
        f.write_str(name)
    }
}

/// Every option of a single rendered image.
///
/// `None` fields fall back to the [`Theme`](crate::theme::Theme) or to the
/// data when the image is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageStyle {
    pub cmap: Option<String>,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    pub robust: bool,
    pub perc: (f64, f64),
    pub norm: Norm,
    pub alpha: f64,
    pub origin: Option<Origin>,
    pub interpolation: Option<Interpolation>,
    /// Physical size of one pixel, enables the scale bar
    pub dx: Option<f64>,
    pub units: Option<String>,
    pub dimension: Option<Dimension>,
    pub cbar: bool,
    pub orientation: Orientation,
    pub cbar_label: Option<String>,
    pub cbar_ticks: Option<Vec<f64>>,
    pub showticks: bool,
    pub despine: Option<bool>,
    pub title: Option<String>,
}

impl Default for ImageStyle {
    fn default() -> Self {
        Self {
            cmap: None,
            vmin: None,
            vmax: None,
            robust: false,
            perc: DEFAULT_PERCENTILES,
            norm: Norm::Linear,
            alpha: 1.0,
            origin: None,
            interpolation: None,
            dx: None,
            units: None,
            dimension: None,
            cbar: true,
            orientation: Orientation::Vertical,
            cbar_label: None,
            cbar_ticks: None,
            showticks: false,
            despine: None,
            title: None,
        }
    }
}

impl ImageStyle {
    pub fn with_cmap(mut self, cmap: impl Into<String>) -> Self {
        self.cmap = Some(cmap.into());
        self
    }

    pub fn with_limits(mut self, vmin: Option<f64>, vmax: Option<f64>) -> Self {
        self.vmin = vmin;
        self.vmax = vmax;
        self
    }

    pub fn robust(mut self, perc: (f64, f64)) -> Self {
        self.robust = true;
        self.perc = perc;
        self
    }

    pub fn with_scalebar(mut self, dx: f64, units: impl Into<String>) -> Self {
        self.dx = Some(dx);
        self.units = Some(units.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn without_cbar(mut self) -> Self {
        self.cbar = false;
        self
    }

    /// Check the options before anything is drawn.
    pub fn validate(&self) -> Result<()> {
        if self.dx.is_some() && self.units.is_none() {
            return Err(PlotError::invalid_option(
                "units",
                "'units' must be specified when 'dx' (scalebar) is used",
            ));
        }
        if let Some(dx) = self.dx
            && !(dx.is_finite() && dx > 0.0)
        {
            return Err(PlotError::invalid_option("dx", "must be a positive number"));
        }
        if let (Some(units), Some(_)) = (&self.units, self.dx) {
            self.dimension.unwrap_or_default().unit_factor(units)?;
        }
        if let Some(cmap) = &self.cmap {
            COLORMAP_REGISTRY.get(cmap)?;
        }

        let (lo, hi) = self.perc;
        if !(0.0 <= lo && lo < hi && hi <= 100.0) {
            return Err(PlotError::invalid_option(
                "perc",
                format!("({lo}, {hi}) must satisfy 0 <= low < high <= 100"),
            ));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(PlotError::invalid_option("alpha", "must be within [0, 1]"));
        }
        if let (Some(lo), Some(hi)) = (self.vmin, self.vmax)
            && lo > hi
        {
            return Err(PlotError::invalid_option(
                "vmin",
                format!("vmin {lo} is greater than vmax {hi}"),
            ));
        }
        if self.norm == Norm::Log
            && let Some(lo) = self.vmin
            && lo <= 0.0
        {
            return Err(PlotError::invalid_option(
                "vmin",
                "a log colour scale needs a positive lower limit",
            ));
        }
        Ok(())
    }
}
