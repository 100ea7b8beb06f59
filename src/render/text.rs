//! Font registration and text drawing.
//!
//! Text needs a TTF/OTF font registered with plotters. The font is looked up
//! from the theme's `font.path`, then `$IMAGEGRID_FONT`, then a few common
//! system locations. The lookup is repeated only when a theme asks for a
//! different `font.path`. Without a font every text element is skipped.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::Pos;
use plotters::style::{FontTransform, register_font};

use super::render_err;
use crate::error::Result;
use crate::theme::Theme;

const FONT_ENV: &str = "IMAGEGRID_FONT";

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static FONTS: Mutex<FontCache> = Mutex::new(FontCache::new());

fn candidates(requested: Option<&Path>, env: Option<PathBuf>) -> Vec<PathBuf> {
    requested
        .map(Path::to_path_buf)
        .into_iter()
        .chain(env)
        .chain(SYSTEM_FONTS.iter().map(PathBuf::from))
        .collect()
}

/// Reads and registers one font file as the `sans-serif` family.
fn load_font(path: &Path) -> bool {
    let Ok(data) = std::fs::read(path) else {
        return false;
    };
    // plotters keeps registered fonts for the lifetime of the process
    let bytes: &'static [u8] = Box::leak(data.into_boxed_slice());
    match register_font("sans-serif", FontStyle::Normal, bytes) {
        Ok(()) => {
            log::debug!("registered font {}", path.display());
            true
        }
        Err(_) => {
            log::debug!("cannot use font {}: invalid font", path.display());
            false
        }
    }
}

/// Which font was asked for last and which one ended up registered.
#[derive(Debug)]
struct FontCache {
    /// `None` until the first lookup
    requested: Option<Option<PathBuf>>,
    loaded: Option<PathBuf>,
    warned: bool,
}

impl FontCache {
    const fn new() -> Self {
        Self {
            requested: None,
            loaded: None,
            warned: false,
        }
    }

    fn resolve(
        &mut self,
        requested: Option<&Path>,
        env: Option<PathBuf>,
        mut load: impl FnMut(&Path) -> bool,
    ) -> bool {
        if self.requested.as_ref().map(|r| r.as_deref()) == Some(requested) {
            return self.loaded.is_some();
        }
        if let Some(previous) = &self.requested {
            log::debug!(
                "font changed from {:?} to {:?}, registering again",
                previous,
                requested
            );
        }
        self.requested = Some(requested.map(Path::to_path_buf));

        let current = self.loaded.take();
        self.loaded = candidates(requested, env)
            .into_iter()
            .find(|path| current.as_deref() == Some(path.as_path()) || load(path.as_path()));
        if let (Some(want), Some(got)) = (requested, &self.loaded)
            && want != got.as_path()
        {
            log::warn!("font {} is not usable, using {}", want.display(), got.display());
        }
        if self.loaded.is_none() && !self.warned {
            self.warned = true;
            log::warn!(
                "no usable font found, figure text is skipped (set `font.path` in the theme or ${FONT_ENV})"
            );
        }
        self.loaded.is_some()
    }
}

/// Whether text can be drawn with the theme's font or a fallback.
pub(crate) fn fonts_available(theme: &Theme) -> bool {
    let mut cache = FONTS.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    cache.resolve(
        theme.font.path.as_deref(),
        std::env::var_os(FONT_ENV).map(PathBuf::from),
        load_font,
    )
}

/// One text element.
pub(crate) struct Label<'a> {
    pub text: &'a str,
    pub at: (i32, i32),
    pub size_px: f64,
    pub pos: Pos,
    pub rotate: bool,
}

pub(crate) fn draw_label(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    enabled: bool,
    color: RGBColor,
    label: Label<'_>,
) -> Result<()> {
    if !enabled || label.text.is_empty() {
        return Ok(());
    }
    let mut style = TextStyle::from(("sans-serif", label.size_px.max(1.0)).into_font())
        .color(&color)
        .pos(label.pos);
    if label.rotate {
        style = style.transform(FontTransform::Rotate270);
    }
    root.draw(&Text::new(label.text.to_string(), label.at, style))
        .map_err(render_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_font_file_is_not_registered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        assert!(!load_font(&path));
        assert!(!load_font(&dir.path().join("missing.ttf")));
    }

    #[test]
    fn lookup_repeats_only_when_the_requested_font_changes() {
        let mut cache = FontCache::new();
        let mut attempts = Vec::new();
        let a = Path::new("/fonts/a.ttf");
        let b = Path::new("/fonts/b.ttf");
        let mut load = |p: &Path| {
            attempts.push(p.to_path_buf());
            p == a || p == b
        };

        assert!(cache.resolve(Some(a), None, &mut load));
        assert!(cache.resolve(Some(a), None, &mut load));
        assert_eq!(cache.loaded.as_deref(), Some(a));

        assert!(cache.resolve(Some(b), None, &mut load));
        assert_eq!(cache.loaded.as_deref(), Some(b));
        assert_eq!(attempts, vec![a.to_path_buf(), b.to_path_buf()]);
    }

    #[test]
    fn unusable_request_keeps_the_registered_font() {
        let mut cache = FontCache::new();
        let env = PathBuf::from("/fonts/env.ttf");
        let mut loads = 0;
        let mut load = |p: &Path| {
            loads += 1;
            p == env.as_path()
        };

        assert!(cache.resolve(None, Some(env.clone()), &mut load));
        assert!(cache.resolve(Some(Path::new("/fonts/missing.ttf")), Some(env.clone()), &mut load));
        assert_eq!(cache.loaded.as_deref(), Some(env.as_path()));
        assert_eq!(loads, 2);
    }
}
