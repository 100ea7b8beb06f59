//! Scale bars: physical dimensions, unit conversion and bar length selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PlotError, Result};

/// Physical quantity measured by the scale bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Dimension {
    /// Lengths in metres
    #[default]
    #[serde(rename = "si")]
    Si,
    /// Reciprocal lengths (1/m)
    #[serde(rename = "si-reciprocal")]
    SiReciprocal,
    #[serde(rename = "imperial")]
    Imperial,
    /// Degrees and arc minutes/seconds
    #[serde(rename = "angle")]
    Angle,
    #[serde(rename = "pixel")]
    Pixel,
}

/// `(symbol, size in base units)`, ascending by size.
type UnitTable = &'static [(&'static str, f64)];

const SI_UNITS: UnitTable = &[
    ("pm", 1e-12),
    ("nm", 1e-9),
    ("µm", 1e-6),
    ("mm", 1e-3),
    ("cm", 1e-2),
    ("m", 1.0),
    ("km", 1e3),
];

const SI_RECIPROCAL_UNITS: UnitTable = &[
    ("1/km", 1e-3),
    ("1/m", 1.0),
    ("1/cm", 1e2),
    ("1/mm", 1e3),
    ("1/µm", 1e6),
    ("1/nm", 1e9),
    ("1/pm", 1e12),
];

const IMPERIAL_UNITS: UnitTable = &[("th", 1e-3), ("in", 1.0), ("ft", 12.0), ("yd", 36.0), ("mi", 63360.0)];

const ANGLE_UNITS: UnitTable = &[("″", 1.0 / 3600.0), ("′", 1.0 / 60.0), ("°", 1.0)];

const PIXEL_UNITS: UnitTable = &[("px", 1.0), ("kpx", 1e3), ("Mpx", 1e6)];

const DIMENSION_NAMES: &str = "si, si-reciprocal, imperial, angle, pixel";

impl Dimension {
    fn units(&self) -> UnitTable {
        match self {
            Dimension::Si => SI_UNITS,
            Dimension::SiReciprocal => SI_RECIPROCAL_UNITS,
            Dimension::Imperial => IMPERIAL_UNITS,
            Dimension::Angle => ANGLE_UNITS,
            Dimension::Pixel => PIXEL_UNITS,
        }
    }

    /// Size of `units` expressed in the base unit of this dimension.
    pub fn unit_factor(&self, units: &str) -> Result<f64> {
        let symbol = canonical_symbol(units);
        self.units()
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, f)| *f)
            .ok_or_else(|| {
                let known: Vec<&str> = self.units().iter().map(|(s, _)| *s).collect();
                PlotError::invalid_option(
                    "units",
                    format!("'{units}' is not a {self} unit, expected one of {}", known.join(", ")),
                )
            })
    }
}

/// ASCII spellings of unit symbols.
fn canonical_symbol(units: &str) -> &str {
    match units {
        "um" | "micron" => "µm",
        "1/um" => "1/µm",
        "inch" => "in",
        "deg" => "°",
        "arcmin" => "′",
        "arcsec" => "″",
        "pixel" => "px",
        other => other,
    }
}

impl FromStr for Dimension {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "si" | "si-length" => Ok(Dimension::Si),
            "si-reciprocal" | "si-length-reciprocal" => Ok(Dimension::SiReciprocal),
            "imperial" | "imperial-length" => Ok(Dimension::Imperial),
            "angle" => Ok(Dimension::Angle),
            "pixel" | "pixel-length" => Ok(Dimension::Pixel),
            other => Err(PlotError::invalid_option(
                "dimension",
                format!("unsupported dimension '{other}'. Supported dimensions are: {DIMENSION_NAMES}"),
            )),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Si => "si",
            Dimension::SiReciprocal => "si-reciprocal",
            Dimension::Imperial => "imperial",
            Dimension::Angle => "angle",
            Dimension::Pixel => "pixel",
        };
        f.write_str(name)
    }
}

/// Corner of the image holding the bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScalebarLocation {
    #[default]
    LowerRight,
    LowerLeft,
    UpperRight,
    UpperLeft,
    LowerCenter,
    UpperCenter,
}

/// Where the length label sits relative to the bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelPosition {
    #[default]
    Top,
    Bottom,
    None,
}

/// Scale bar appearance, shared by every image of a figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalebarStyle {
    pub color: String,
    pub location: ScalebarLocation,
    /// Target bar length as a fraction of the image width
    pub length_fraction: f64,
    /// Bar thickness as a fraction of the image height
    pub height_fraction: f64,
    pub label_position: LabelPosition,
    pub box_color: String,
    pub box_alpha: f64,
}

impl Default for ScalebarStyle {
    fn default() -> Self {
        Self {
            color: "white".to_string(),
            location: ScalebarLocation::LowerRight,
            length_fraction: 0.3,
            height_fraction: 0.05,
            label_position: LabelPosition::Top,
            box_color: "white".to_string(),
            box_alpha: 0.0,
        }
    }
}

/// A bar ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Scalebar {
    /// Bar length in image pixels
    pub length_px: f64,
    pub value: f64,
    pub unit: &'static str,
}

impl Scalebar {
    /// Pick the bar for an image `image_width_px` pixels wide whose pixels
    /// are `dx` `units` in size.
    pub fn plan(
        dx: f64,
        units: &str,
        dimension: Dimension,
        image_width_px: usize,
        length_fraction: f64,
    ) -> Result<Self> {
        if !(dx.is_finite() && dx > 0.0) {
            return Err(PlotError::invalid_option("dx", "must be a positive number"));
        }
        if !(length_fraction > 0.0 && length_fraction <= 1.0) {
            return Err(PlotError::invalid_option(
                "length_fraction",
                "must be within (0, 1]",
            ));
        }
        let pixel = dx * dimension.unit_factor(units)?;
        let target = pixel * image_width_px.max(1) as f64 * length_fraction;

        let table = dimension.units();
        let (unit, factor) = table
            .iter()
            .rev()
            .find(|(_, f)| *f <= target)
            .or_else(|| table.first())
            .copied()
            .ok_or_else(|| PlotError::invalid_option("units", "dimension has no units"))?;

        let value = nice_floor(target / factor);
        Ok(Self {
            length_px: value * factor / pixel,
            value,
            unit,
        })
    }

    pub fn label(&self) -> String {
        let v = if self.value.fract() == 0.0 {
            format!("{}", self.value as i64)
        } else {
            format!("{}", self.value)
        };
        format!("{v} {}", self.unit)
    }
}

/// Largest value of the form {1, 2, 2.5, 5} × 10^k not exceeding `x`.
fn nice_floor(x: f64) -> f64 {
    let magnitude = 10f64.powf(x.log10().floor());
    [5.0, 2.5, 2.0, 1.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|v| *v <= x * (1.0 + 1e-9))
        .unwrap_or(magnitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_readable_si_unit() {
        // 512 px of 1 nm, 30% is 153.6 nm
        let bar = Scalebar::plan(1.0, "nm", Dimension::Si, 512, 0.3).unwrap();
        assert_eq!(bar.unit, "nm");
        assert_eq!(bar.value, 100.0);
        assert!((bar.length_px - 100.0).abs() < 1e-9);
        assert_eq!(bar.label(), "100 nm");

        let micro = Scalebar::plan(10.0, "nm", Dimension::Si, 1000, 0.3).unwrap();
        assert_eq!(micro.label(), "2.5 µm");
        assert!((micro.length_px - 250.0).abs() < 1e-9);
    }

    #[test]
    fn ascii_micro_is_accepted() {
        assert_eq!(Dimension::Si.unit_factor("um").unwrap(), 1e-6);
        assert!(Dimension::Si.unit_factor("ft").is_err());
    }

    #[test]
    fn unknown_dimension_lists_supported() {
        let err = "parsec".parse::<Dimension>().unwrap_err();
        assert!(err.to_string().contains("si-reciprocal"));
    }

    #[test]
    fn pixel_dimension_counts_pixels() {
        let bar = Scalebar::plan(1.0, "px", Dimension::Pixel, 100, 0.3).unwrap();
        assert_eq!(bar.label(), "25 px");
    }

    #[test]
    fn nice_floor_values() {
        assert_eq!(nice_floor(153.6), 100.0);
        assert_eq!(nice_floor(3.0), 2.5);
        assert_eq!(nice_floor(0.7), 0.5);
    }
}
