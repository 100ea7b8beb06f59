//! Colormap registry for mapping normalized values to colours
//!
//! Colormaps are loaded from colormaps.json (embedded at compile time) and
//! looked up by name. Each entry is a list of hex colour stops; values in
//! between are linearly interpolated in sRGB.
//!
//! Naming rules:
//! - lookup is case-insensitive
//! - friendly aliases (`blue`, `sunset-dark`, ...) resolve to a base map
//! - a trailing `_r` reverses any map

use std::collections::HashMap;
use std::sync::LazyLock;

use palette::{Mix, Srgb};
use serde::Deserialize;

use crate::error::{PlotError, Result};

/// Embedded colormaps.json content
const COLORMAPS_JSON: &str = include_str!("../../assets/colormaps.json");

/// Global colormap registry, initialized lazily on first access
pub static COLORMAP_REGISTRY: LazyLock<ColormapRegistry> = LazyLock::new(|| {
    ColormapRegistry::from_json(COLORMAPS_JSON).unwrap_or_else(|e| {
        log::error!("failed to load embedded colormaps: {e}");
        ColormapRegistry::default()
    })
});

/// Default colormap for gray images
pub const DEFAULT_COLORMAP: &str = "viridis";

#[derive(Debug, Clone, Deserialize)]
struct ColormapDefinition {
    name: String,
    colors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ColormapFile {
    colormaps: Vec<ColormapDefinition>,
    #[serde(default)]
    aliases: HashMap<String, String>,
}

/// A resolved colormap: an ordered list of sRGB stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    pub name: String,
    stops: Vec<Srgb<f32>>,
}

impl Colormap {
    /// Build from hex stops such as `"#440154"`.
    pub fn from_hex(name: &str, colors: &[String]) -> Result<Self> {
        if colors.is_empty() {
            return Err(PlotError::invalid_option(
                "cmap",
                format!("colormap '{name}' has no colours"),
            ));
        }
        let stops = colors
            .iter()
            .map(|hex| {
                hex.parse::<Srgb<u8>>()
                    .map(|c| c.into_format::<f32>())
                    .map_err(|e| {
                        PlotError::invalid_option("cmap", format!("bad colour '{hex}' in '{name}': {e}"))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: name.to_string(),
            stops,
        })
    }

    pub fn reversed(&self) -> Self {
        let mut stops = self.stops.clone();
        stops.reverse();
        Self {
            name: format!("{}_r", self.name),
            stops,
        }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Colour at position `t` ∈ [0, 1]; out-of-range values are clamped.
    pub fn sample(&self, t: f64) -> [u8; 3] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let n = self.stops.len();
        if n == 1 {
            return to_rgb8(self.stops[0]);
        }

        let pos = t * (n - 1) as f64;
        let low = (pos.floor() as usize).min(n - 1);
        let high = (low + 1).min(n - 1);
        let frac = (pos - low as f64) as f32;

        to_rgb8(self.stops[low].mix(self.stops[high], frac))
    }

    /// Precomputed lookup table with `size` entries.
    pub fn lut(&self, size: usize) -> Vec<[u8; 3]> {
        let size = size.max(2);
        (0..size)
            .map(|i| self.sample(i as f64 / (size - 1) as f64))
            .collect()
    }
}

fn to_rgb8(c: Srgb<f32>) -> [u8; 3] {
    let c: Srgb<u8> = c.into_format();
    [c.red, c.green, c.blue]
}

/// Registry of all available colormaps
#[derive(Debug, Clone, Default)]
pub struct ColormapRegistry {
    /// Colormaps by lowercase name
    maps: HashMap<String, Colormap>,
    /// Lowercase alias -> target name (target may carry `_r`)
    aliases: HashMap<String, String>,
    /// Names as written in the registry, for error messages
    names: Vec<String>,
}

impl ColormapRegistry {
    /// Load colormaps from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let file: ColormapFile = serde_json::from_str(json)?;

        let mut registry = Self::default();
        for def in file.colormaps {
            let cmap = Colormap::from_hex(&def.name, &def.colors)?;
            registry.names.push(def.name.clone());
            registry.maps.insert(def.name.to_lowercase(), cmap);
        }
        for (alias, target) in file.aliases {
            registry.names.push(alias.clone());
            registry.aliases.insert(alias.to_lowercase(), target);
        }
        registry.names.sort_by_key(|n| n.to_lowercase());

        log::debug!(
            "loaded {} colormaps and {} aliases",
            registry.maps.len(),
            registry.aliases.len()
        );
        Ok(registry)
    }

    /// Resolve a colormap by name.
    pub fn get(&self, name: &str) -> Result<Colormap> {
        let key = name.to_lowercase();
        if let Some(target) = self.aliases.get(&key) {
            return self.get_direct(target).map(|mut c| {
                c.name = name.to_string();
                c
            });
        }
        self.get_direct(&key)
    }

    fn get_direct(&self, name: &str) -> Result<Colormap> {
        let key = name.to_lowercase();
        if let Some(cmap) = self.maps.get(&key) {
            return Ok(cmap.clone());
        }
        if let Some(base) = key.strip_suffix("_r")
            && let Some(cmap) = self.maps.get(base)
        {
            return Ok(cmap.reversed());
        }
        Err(PlotError::UnknownColormap {
            name: name.to_string(),
            available: self.names.join(", "),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_ok()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Look up a colormap in the global registry.
pub fn colormap(name: &str) -> Result<Colormap> {
    COLORMAP_REGISTRY.get(name)
}
