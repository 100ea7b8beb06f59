//! Renders grid cells into an in-memory RGB figure.
//!
//! Rendering runs in two passes. Every cell is first resolved against the
//! theme (colormap, colour limits, geometry, scale bar); any invalid option
//! fails here, before a pixel is drawn. The second pass paints image pixels
//! and colorbar gradients directly into the buffer and then draws spines,
//! text, extension triangles and scale bars with plotters on top.

mod decor;
mod geometry;
mod raster;
mod text;

use std::path::Path;

use image::RgbImage;
use plotters::prelude::*;

pub use geometry::Rect;

use crate::colormap::{Colormap, colormap};
use crate::data::ImageData;
use crate::error::{PlotError, Result};
use crate::grid::layout::{FigureSize, GridShape};
use crate::io::ensure_parent_dir;
use crate::scale::{ColorLimits, Norm, histogram, log_ticks, nice_ticks};
use crate::scalebar::Scalebar;
use crate::style::{ImageStyle, Interpolation, Orientation, Origin};
use crate::theme::{Theme, parse_color};
use geometry::{FrameOptions, ImageFrame, Metrics};

/// Colorbar tick count when no explicit ticks are given.
const CBAR_TICKS: usize = 3;

pub(crate) fn render_err<E: std::fmt::Display>(e: E) -> PlotError {
    PlotError::Render(e.to_string())
}

/// One image cell of a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct CellSpec {
    pub image: ImageData,
    pub style: ImageStyle,
    /// Drawn vertically left of the image
    pub row_label: Option<String>,
    /// Drawn above the image, before the title
    pub col_label: Option<String>,
}

impl CellSpec {
    pub fn new(image: ImageData, style: ImageStyle) -> Self {
        Self {
            image,
            style,
            row_label: None,
            col_label: None,
        }
    }

    fn heading(&self) -> Option<String> {
        match (&self.col_label, &self.style.title) {
            (Some(c), Some(t)) => Some(format!("{c}, {t}")),
            (Some(c), None) => Some(c.clone()),
            (None, Some(t)) => Some(t.clone()),
            (None, None) => None,
        }
    }
}

/// Histogram of an image's values, bars coloured by the image colormap.
#[derive(Debug, Clone, PartialEq)]
pub struct HistSpec {
    pub values: Vec<f64>,
    pub bins: usize,
    pub style: ImageStyle,
    /// `Vertical` puts values on the vertical axis, next to a vertical colorbar
    pub orientation: Orientation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Image(Box<CellSpec>),
    Histogram(Box<HistSpec>),
    /// Surplus grid position, drawn empty
    Blank,
}

impl From<CellSpec> for Cell {
    fn from(spec: CellSpec) -> Self {
        Cell::Image(Box::new(spec))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Image,
    Histogram,
    Blank,
}

/// Where a cell ended up in the figure and what was drawn there.
#[derive(Debug, Clone, PartialEq)]
pub struct AxesLayout {
    pub index: usize,
    pub row: usize,
    pub col: usize,
    pub kind: CellKind,
    pub cell: Rect,
    /// Image area, or plot area of a histogram
    pub image: Option<Rect>,
    pub colorbar: Option<Rect>,
    pub spines_visible: bool,
    pub title: Option<String>,
    pub row_label: Option<String>,
    pub scalebar: Option<String>,
    pub limits: Option<ColorLimits>,
}

impl AxesLayout {
    fn blank(index: usize, shape: GridShape, cell: Rect) -> Self {
        let (row, col) = shape.cell_position(index);
        Self {
            index,
            row,
            col,
            kind: CellKind::Blank,
            cell,
            image: None,
            colorbar: None,
            spines_visible: false,
            title: None,
            row_label: None,
            scalebar: None,
            limits: None,
        }
    }

    pub fn has_title(&self) -> bool {
        self.title.is_some()
    }
}

/// A rendered figure: an RGB buffer plus the layout of its cells.
#[derive(Debug, Clone)]
pub struct Figure {
    width: u32,
    height: u32,
    buffer: Vec<u8>,
    axes: Vec<AxesLayout>,
}

impl Figure {
    fn new(width: u32, height: u32, background: [u8; 3]) -> Result<Self> {
        let pixel_count = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| PlotError::Render("width*height overflow".to_string()))?;
        let buffer = background.iter().copied().cycle().take(pixel_count * 3).collect();
        Ok(Self {
            width,
            height,
            buffer,
            axes: Vec::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn axes(&self) -> &[AxesLayout] {
        &self.axes
    }

    /// Raw RGB bytes, row-major.
    pub fn as_rgb(&self) -> &[u8] {
        &self.buffer
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.buffer[i], self.buffer[i + 1], self.buffer[i + 2]])
    }

    fn put_pixel(&mut self, x: i32, y: i32, rgb: [u8; 3]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        self.buffer[i..i + 3].copy_from_slice(&rgb);
    }

    pub fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.buffer.len() / 3 * 4);
        for px in self.buffer.chunks_exact(3) {
            rgba.extend_from_slice(px);
            rgba.push(255);
        }
        rgba
    }

    pub fn to_image(&self) -> Result<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.buffer.clone())
            .ok_or_else(|| PlotError::Render("figure buffer has the wrong size".to_string()))
    }

    /// Write the figure as PNG, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        ensure_parent_dir(path)?;
        self.to_image()?.save(path)?;
        log::info!("saved {}x{} figure to {}", self.width, self.height, path.display());
        Ok(())
    }
}

/// Figure-wide colours and sizes.
struct Ink {
    foreground: RGBColor,
    metrics: Metrics,
    text: bool,
}

struct ImageCell<'a> {
    spec: &'a CellSpec,
    frame: ImageFrame,
    cmap: Colormap,
    limits: ColorLimits,
    origin: Origin,
    interpolation: Interpolation,
    despine: bool,
    scalebar: Option<Scalebar>,
    cbar_ticks: Vec<f64>,
}

struct HistCell<'a> {
    spec: &'a HistSpec,
    plot: Rect,
    cmap: Colormap,
    limits: ColorLimits,
    counts: Vec<usize>,
    range: (f64, f64),
}

enum Prepared<'a> {
    Image(ImageCell<'a>),
    Histogram(HistCell<'a>),
    Blank,
}

fn resolve_limits(values: &[f64], style: &ImageStyle) -> Result<ColorLimits> {
    let mut limits = ColorLimits::resolve(values, style.vmin, style.vmax, style.robust, style.perc)?;
    if style.norm == Norm::Log && limits.vmin <= 0.0 {
        limits.vmin = values
            .iter()
            .copied()
            .filter(|v| *v > 0.0)
            .reduce(f64::min)
            .ok_or_else(|| {
                PlotError::InvalidData("a log colour scale needs positive values".to_string())
            })?;
    }
    Ok(limits)
}

fn resolve_cmap(style: &ImageStyle, theme: &Theme) -> Result<Colormap> {
    colormap(style.cmap.as_deref().unwrap_or(&theme.image.cmap))
}

fn colorbar_ticks(style: &ImageStyle, limits: &ColorLimits) -> Vec<f64> {
    match (&style.cbar_ticks, style.norm) {
        (Some(ticks), _) => ticks.clone(),
        (None, Norm::Linear) => nice_ticks(limits.vmin, limits.vmax, CBAR_TICKS),
        (None, Norm::Log) => log_ticks(limits.vmin, limits.vmax, CBAR_TICKS),
    }
}

fn prepare_image<'a>(
    spec: &'a CellSpec,
    cell: Rect,
    theme: &Theme,
    metrics: &Metrics,
) -> Result<ImageCell<'a>> {
    let style = &spec.style;
    style.validate()?;
    let (rows, cols) = spec.image.dim();
    crate::data::ensure_non_empty(&[rows, cols])?;
    let cmap = resolve_cmap(style, theme)?;
    let limits = resolve_limits(&spec.image.finite_values(), style)?;

    let show_cbar = style.cbar && !spec.image.is_rgb();
    if style.cbar && spec.image.is_rgb() {
        log::debug!("colorbar skipped for an RGB image");
    }
    let opts = FrameOptions {
        title: spec.heading().is_some(),
        row_label: spec.row_label.is_some(),
        showticks: style.showticks,
        cbar: show_cbar.then_some((style.orientation, style.cbar_label.is_some())),
    };
    let frame = geometry::frame_image(cell, spec.image.dim(), opts, metrics);

    let scalebar = match (style.dx, &style.units) {
        (Some(dx), Some(units)) => Some(Scalebar::plan(
            dx,
            units,
            style.dimension.unwrap_or_default(),
            spec.image.dim().1,
            theme.scalebar.length_fraction,
        )?),
        _ => None,
    };

    Ok(ImageCell {
        spec,
        frame,
        cmap,
        cbar_ticks: colorbar_ticks(style, &limits),
        limits,
        origin: style.origin.unwrap_or(theme.image.origin),
        interpolation: style.interpolation.unwrap_or(theme.image.interpolation),
        despine: style.despine.unwrap_or(theme.image.despine),
        scalebar,
    })
}

fn prepare_hist<'a>(
    spec: &'a HistSpec,
    cell: Rect,
    theme: &Theme,
    metrics: &Metrics,
) -> Result<HistCell<'a>> {
    spec.style.validate()?;
    if spec.bins == 0 {
        return Err(PlotError::invalid_option("bins", "must be at least 1"));
    }
    let (counts, range) = histogram(&spec.values, spec.bins);
    Ok(HistCell {
        spec,
        plot: geometry::frame_plot(cell, spec.style.title.is_some(), metrics),
        cmap: resolve_cmap(&spec.style, theme)?,
        limits: resolve_limits(&spec.values, &spec.style)?,
        counts,
        range,
    })
}

/// Render `cells` into a grid of `shape`; positions past the last cell are blank.
pub fn render_cells(
    cells: &[Cell],
    shape: GridShape,
    size: FigureSize,
    theme: &Theme,
) -> Result<Figure> {
    theme.validate()?;
    if cells.len() > shape.cells() {
        return Err(PlotError::Render(format!(
            "{} cells do not fit a {} x {} grid",
            cells.len(),
            shape.rows,
            shape.cols
        )));
    }

    let (width, height) = size.pixels(theme.dpi());
    let metrics = Metrics::new(theme);
    let rects: Vec<Rect> = (0..shape.cells())
        .map(|i| geometry::cell_rect(shape, i, (width, height)))
        .collect();

    let prepared = cells
        .iter()
        .zip(&rects)
        .map(|(cell, rect)| match cell {
            Cell::Image(spec) => prepare_image(spec, *rect, theme, &metrics).map(Prepared::Image),
            Cell::Histogram(spec) => {
                prepare_hist(spec, *rect, theme, &metrics).map(Prepared::Histogram)
            }
            Cell::Blank => Ok(Prepared::Blank),
        })
        .collect::<Result<Vec<_>>>()?;

    let background = parse_color(&theme.background)?;
    let fg = parse_color(&theme.foreground)?;
    let ink = Ink {
        foreground: RGBColor(fg[0], fg[1], fg[2]),
        metrics,
        text: text::fonts_available(theme),
    };

    log::debug!(
        "rendering {} cells on a {}x{} grid at {}x{} px",
        cells.len(),
        shape.rows,
        shape.cols,
        width,
        height
    );

    let mut figure = Figure::new(width, height, background)?;
    for cell in &prepared {
        match cell {
            Prepared::Image(c) => {
                let rgb = raster::colorize(
                    &c.spec.image,
                    &c.cmap,
                    &c.limits,
                    c.spec.style.norm,
                    c.spec.style.alpha,
                    background,
                );
                raster::paint_image(&mut figure, &rgb, c.frame.image, c.origin, c.interpolation);
                if let Some(cbar) = c.frame.colorbar {
                    let orientation = c.spec.style.orientation;
                    let gradient = geometry::colorbar_gradient(cbar, orientation, c.limits.extend);
                    raster::paint_colorbar(&mut figure, gradient, orientation, &c.cmap);
                }
            }
            Prepared::Histogram(_) | Prepared::Blank => {}
        }
    }

    {
        let root = BitMapBackend::with_buffer(&mut figure.buffer, (width, height)).into_drawing_area();
        for cell in &prepared {
            match cell {
                Prepared::Image(c) => decor::draw_image_cell(&root, c, theme, &ink)?,
                Prepared::Histogram(c) => decor::draw_histogram(&root, c, &ink)?,
                Prepared::Blank => {}
            }
        }
        root.present().map_err(render_err)?;
    }

    figure.axes = rects
        .iter()
        .enumerate()
        .map(|(i, rect)| {
            let mut layout = AxesLayout::blank(i, shape, *rect);
            match prepared.get(i) {
                Some(Prepared::Image(c)) => {
                    layout.kind = CellKind::Image;
                    layout.image = Some(c.frame.image);
                    layout.colorbar = c.frame.colorbar;
                    layout.spines_visible = !c.despine;
                    layout.title = c.spec.heading();
                    layout.row_label = c.spec.row_label.clone();
                    layout.scalebar = c.scalebar.as_ref().map(Scalebar::label);
                    layout.limits = Some(c.limits);
                }
                Some(Prepared::Histogram(c)) => {
                    layout.kind = CellKind::Histogram;
                    layout.image = Some(c.plot);
                    layout.spines_visible = true;
                    layout.title = c.spec.style.title.clone();
                    layout.limits = Some(c.limits);
                }
                Some(Prepared::Blank) | None => {}
            }
            layout
        })
        .collect();

    Ok(figure)
}
