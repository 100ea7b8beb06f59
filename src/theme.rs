//! Figure-wide defaults: plotting context, image defaults, scale bar
//! appearance, resolution and font.
//!
//! A [`Theme`] is passed explicitly to every render call. It can be built in
//! code or loaded from a partial JSON file:
//!
//! ```json
//! { "context": "talk", "image": { "cmap": "magma" }, "save": { "dpi": 150 } }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::colormap::DEFAULT_COLORMAP;
use crate::error::{PlotError, Result};
use crate::scalebar::ScalebarStyle;
use crate::style::{Interpolation, Origin};

/// Typography and line-width preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Context {
    #[default]
    Paper,
    Notebook,
    #[serde(alias = "presentation")]
    Talk,
    Poster,
}

impl Context {
    /// Spine width in points.
    pub fn line_width(&self) -> f64 {
        match self {
            Context::Paper => 1.5,
            Context::Notebook | Context::Talk => 2.5,
            Context::Poster => 3.5,
        }
    }

    /// Title and axis label size in points.
    pub fn title_size(&self) -> f64 {
        match self {
            Context::Paper => 15.0,
            Context::Notebook | Context::Talk => 20.0,
            Context::Poster => 25.0,
        }
    }

    /// Tick label and scale bar label size in points.
    pub fn font_size(&self) -> f64 {
        match self {
            Context::Paper => 10.0,
            Context::Notebook | Context::Talk => 15.0,
            Context::Poster => 20.0,
        }
    }
}

impl FromStr for Context {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "paper" => Ok(Context::Paper),
            "notebook" => Ok(Context::Notebook),
            "talk" | "presentation" => Ok(Context::Talk),
            "poster" => Ok(Context::Poster),
            other => Err(PlotError::invalid_option(
                "context",
                format!("'{other}' is not one of paper, notebook, talk, presentation, poster"),
            )),
        }
    }
}

/// Defaults for options an [`ImageStyle`](crate::style::ImageStyle) leaves unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageDefaults {
    pub cmap: String,
    pub origin: Origin,
    pub interpolation: Interpolation,
    /// Hide image spines and colorbar outlines
    pub despine: bool,
}

impl Default for ImageDefaults {
    fn default() -> Self {
        Self {
            cmap: DEFAULT_COLORMAP.to_string(),
            origin: Origin::Upper,
            interpolation: Interpolation::Nearest,
            despine: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveSettings {
    /// Resolution used by [`Figure::save`](crate::render::Figure::save) callers
    pub dpi: f64,
    /// Resolution used when rendering for display
    pub screen_dpi: f64,
}

impl Default for SaveSettings {
    fn default() -> Self {
        Self {
            dpi: 300.0,
            screen_dpi: 100.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSettings {
    /// TTF/OTF file used for all text
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub context: Context,
    pub image: ImageDefaults,
    pub scalebar: ScalebarStyle,
    pub save: SaveSettings,
    pub font: FontSettings,
    pub background: String,
    pub foreground: String,
    /// Render at `save.dpi` instead of `save.screen_dpi`
    pub for_saving: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            context: Context::Paper,
            image: ImageDefaults::default(),
            scalebar: ScalebarStyle::default(),
            save: SaveSettings::default(),
            font: FontSettings::default(),
            background: "white".to_string(),
            foreground: "black".to_string(),
            for_saving: false,
        }
    }
}

impl Theme {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let theme: Theme = serde_json::from_str(json)?;
        theme.validate()?;
        Ok(theme)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("loading theme from {}", path.display());
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn with_image(mut self, image: ImageDefaults) -> Self {
        self.image = image;
        self
    }

    pub fn with_scalebar(mut self, scalebar: ScalebarStyle) -> Self {
        self.scalebar = scalebar;
        self
    }

    /// Render at `dpi` for saving.
    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.save.dpi = dpi;
        self.for_saving = true;
        self
    }

    pub fn with_font(mut self, path: impl Into<PathBuf>) -> Self {
        self.font.path = Some(path.into());
        self
    }

    /// Resolution of the rendered buffer.
    pub fn dpi(&self) -> f64 {
        if self.for_saving {
            self.save.dpi
        } else {
            self.save.screen_dpi
        }
    }

    /// Points to pixels at the current resolution.
    pub fn pt_to_px(&self, pt: f64) -> f64 {
        pt * self.dpi() / 72.0
    }

    pub fn validate(&self) -> Result<()> {
        for dpi in [self.save.dpi, self.save.screen_dpi] {
            if !(dpi.is_finite() && dpi > 0.0) {
                return Err(PlotError::invalid_option("dpi", "must be a positive number"));
            }
        }
        crate::colormap::colormap(&self.image.cmap)?;
        parse_color(&self.background)?;
        parse_color(&self.foreground)?;
        parse_color(&self.scalebar.color)?;
        parse_color(&self.scalebar.box_color)?;
        let sb = &self.scalebar;
        if !(sb.length_fraction > 0.0 && sb.length_fraction <= 1.0) {
            return Err(PlotError::invalid_option(
                "scalebar.length_fraction",
                "must be within (0, 1]",
            ));
        }
        if !(sb.height_fraction > 0.0 && sb.height_fraction <= 1.0) {
            return Err(PlotError::invalid_option(
                "scalebar.height_fraction",
                "must be within (0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&sb.box_alpha) {
            return Err(PlotError::invalid_option("scalebar.box_alpha", "must be within [0, 1]"));
        }
        Ok(())
    }
}

/// Parse a colour given by name or as `#rrggbb`.
pub fn parse_color(s: &str) -> Result<[u8; 3]> {
    let named = match s.to_lowercase().as_str() {
        "white" => Some([255, 255, 255]),
        "black" => Some([0, 0, 0]),
        "red" => Some([255, 0, 0]),
        "green" => Some([0, 128, 0]),
        "blue" => Some([0, 0, 255]),
        "yellow" => Some([255, 255, 0]),
        "gray" | "grey" => Some([128, 128, 128]),
        _ => None,
    };
    if let Some(rgb) = named {
        return Ok(rgb);
    }
    let c: Srgb<u8> = s
        .parse()
        .map_err(|e| PlotError::invalid_option("color", format!("'{s}': {e}")))?;
    Ok([c.red, c.green, c.blue])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_presets() {
        assert_eq!(Context::Paper.line_width(), 1.5);
        assert_eq!(Context::Talk.title_size(), 20.0);
        assert_eq!(Context::Poster.font_size(), 20.0);
        assert_eq!("presentation".parse::<Context>().unwrap(), Context::Talk);
    }

    #[test]
    fn partial_json_overrides_defaults() {
        let theme = Theme::from_json_str(
            r#"{"context": "poster", "image": {"cmap": "magma"}, "scalebar": {"color": "black"}}"#,
        )
        .unwrap();
        assert_eq!(theme.context, Context::Poster);
        assert_eq!(theme.image.cmap, "magma");
        assert!(theme.image.despine);
        assert_eq!(theme.scalebar.color, "black");
        assert_eq!(theme.scalebar.length_fraction, 0.3);
        assert_eq!(theme.dpi(), 100.0);
    }

    #[test]
    fn invalid_theme_values_are_rejected() {
        assert!(Theme::from_json_str(r#"{"image": {"cmap": "nope"}}"#).is_err());
        assert!(Theme::from_json_str(r#"{"save": {"dpi": 0}}"#).is_err());
        assert!(Theme::from_json_str(r#"{"context": "huge"}"#).is_err());
    }

    #[test]
    fn saving_uses_save_dpi() {
        let theme = Theme::default().with_dpi(150.0);
        assert_eq!(theme.dpi(), 150.0);
        assert!((theme.pt_to_px(72.0) - 150.0).abs() < 1e-12);
    }

    #[test]
    fn colours_by_name_or_hex() {
        assert_eq!(parse_color("white").unwrap(), [255, 255, 255]);
        assert_eq!(parse_color("#ff8000").unwrap(), [255, 128, 0]);
        assert!(parse_color("chartreuse-ish").is_err());
    }
}
