use std::fmt;
use std::sync::Arc;

use ndarray::{Array2, ArrayView2};

use super::layout::{DEFAULT_HEIGHT, FigureSize, GridShape, check_figure_params};
use crate::broadcast::Param;
use crate::data::{ImageData, ImageSource, StackSlicing};
use crate::error::Result;
use crate::filters::{Filter, FilterParams};
use crate::render::{Cell, CellSpec, Figure, render_cells};
use crate::scale::{DEFAULT_PERCENTILES, Norm};
use crate::scalebar::Dimension;
use crate::style::{ImageStyle, Interpolation, Orientation, Origin};
use crate::theme::Theme;

/// User transform applied to every 2-D image plane.
pub type TransformFn = Arc<dyn Fn(ArrayView2<f64>) -> Result<Array2<f64>> + Send + Sync>;

/// Function applied to each image before display.
#[derive(Clone)]
pub enum Transform {
    /// A registered filter with its keyword arguments
    Filter { filter: Filter, params: FilterParams },
    /// Any closure over a 2-D plane
    Func { name: String, func: TransformFn },
}

impl Transform {
    pub fn filter(filter: Filter, params: FilterParams) -> Self {
        Transform::Filter { filter, params }
    }

    pub fn func<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(ArrayView2<f64>) -> Result<Array2<f64>> + Send + Sync + 'static,
    {
        Transform::Func {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Transform::Filter { filter, .. } => filter.name(),
            Transform::Func { name, .. } => name,
        }
    }

    /// Apply to an image; RGB images are transformed channel by channel.
    pub fn apply(&self, image: &ImageData) -> Result<ImageData> {
        match self {
            Transform::Filter { filter, params } => image.map_planes(|p| filter.apply(p, params)),
            Transform::Func { func, .. } => image.map_planes(|p| func(p)),
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Filter { filter, params } => f
                .debug_struct("Filter")
                .field("filter", filter)
                .field("params", params)
                .finish(),
            Transform::Func { name, .. } => f.debug_struct("Func").field("name", name).finish(),
        }
    }
}

impl From<Filter> for Transform {
    fn from(filter: Filter) -> Self {
        Transform::filter(filter, FilterParams::new())
    }
}

/// Options of an [`ImageGrid`].
///
/// Per-image options are [`Param`]s: one value for every cell, or one value
/// per cell. A per-cell list sized to the source images is repeated for
/// every transform when `map_func` holds several.
#[derive(Debug, Clone)]
pub struct GridOptions {
    pub slicing: StackSlicing,
    /// One transform maps every image; several multiply the cells
    pub map_func: Vec<Transform>,
    pub col_wrap: Option<usize>,
    pub height: f64,
    pub aspect: f64,

    pub cmap: Param<Option<String>>,
    pub vmin: Param<Option<f64>>,
    pub vmax: Param<Option<f64>>,
    pub robust: Param<bool>,
    pub perc: Param<(f64, f64)>,
    pub norm: Param<Norm>,
    pub alpha: Param<f64>,
    pub dx: Param<Option<f64>>,
    pub units: Param<Option<String>>,
    pub dimension: Param<Option<Dimension>>,
    pub cbar: Param<bool>,
    pub cbar_label: Param<Option<String>>,
    pub cbar_ticks: Param<Option<Vec<f64>>>,
    pub title: Param<Option<String>>,

    pub orientation: Orientation,
    pub origin: Option<Origin>,
    pub interpolation: Option<Interpolation>,
    pub showticks: bool,
    pub despine: Option<bool>,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            slicing: StackSlicing::default(),
            map_func: Vec::new(),
            col_wrap: None,
            height: DEFAULT_HEIGHT,
            aspect: 1.0,
            cmap: Param::unset(),
            vmin: Param::unset(),
            vmax: Param::unset(),
            robust: Param::One(false),
            perc: Param::One(DEFAULT_PERCENTILES),
            norm: Param::One(Norm::Linear),
            alpha: Param::One(1.0),
            dx: Param::unset(),
            units: Param::unset(),
            dimension: Param::unset(),
            cbar: Param::One(true),
            cbar_label: Param::unset(),
            cbar_ticks: Param::unset(),
            title: Param::unset(),
            orientation: Orientation::Vertical,
            origin: None,
            interpolation: None,
            showticks: false,
            despine: None,
        }
    }
}

impl GridOptions {
    /// Resolve every per-image option into one style per cell.
    fn styles(&self, n_source: usize, n_cells: usize) -> Result<Vec<ImageStyle>> {
        let cmap = self.cmap.broadcast_tiled("cmap", n_source, n_cells)?;
        let vmin = self.vmin.broadcast_tiled("vmin", n_source, n_cells)?;
        let vmax = self.vmax.broadcast_tiled("vmax", n_source, n_cells)?;
        let robust = self.robust.broadcast_tiled("robust", n_source, n_cells)?;
        let perc = self.perc.broadcast_tiled("perc", n_source, n_cells)?;
        let norm = self.norm.broadcast_tiled("norm", n_source, n_cells)?;
        let alpha = self.alpha.broadcast_tiled("alpha", n_source, n_cells)?;
        let dx = self.dx.broadcast_tiled("dx", n_source, n_cells)?;
        let units = self.units.broadcast_tiled("units", n_source, n_cells)?;
        let dimension = self.dimension.broadcast_tiled("dimension", n_source, n_cells)?;
        let cbar = self.cbar.broadcast_tiled("cbar", n_source, n_cells)?;
        let cbar_label = self.cbar_label.broadcast_tiled("cbar_label", n_source, n_cells)?;
        let cbar_ticks = self.cbar_ticks.broadcast_tiled("cbar_ticks", n_source, n_cells)?;
        let title = self.title.broadcast_tiled("title", n_source, n_cells)?;

        let styles: Vec<ImageStyle> = (0..n_cells)
            .map(|i| ImageStyle {
                cmap: cmap[i].clone(),
                vmin: vmin[i],
                vmax: vmax[i],
                robust: robust[i],
                perc: perc[i],
                norm: norm[i],
                alpha: alpha[i],
                origin: self.origin,
                interpolation: self.interpolation,
                dx: dx[i],
                units: units[i].clone(),
                dimension: dimension[i],
                cbar: cbar[i],
                orientation: self.orientation,
                cbar_label: cbar_label[i].clone(),
                cbar_ticks: cbar_ticks[i].clone(),
                showticks: self.showticks,
                despine: self.despine,
                title: title[i].clone(),
            })
            .collect();
        for style in &styles {
            style.validate()?;
        }
        Ok(styles)
    }
}

/// A grid of images sharing one styling vocabulary.
///
/// ```no_run
/// use imagegrid::prelude::*;
/// use ndarray::Array3;
///
/// let stack = Array3::<f64>::zeros((64, 64, 10));
/// let grid = ImageGrid::new(
///     stack,
///     GridOptions {
///         slicing: StackSlicing::default().with_range(None, None, Some(2)),
///         col_wrap: Some(5),
///         ..Default::default()
///     },
/// )?;
/// grid.render(&Theme::default())?.save("stack.png")?;
/// # Ok::<(), imagegrid::PlotError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ImageGrid {
    cells: Vec<CellSpec>,
    shape: GridShape,
    size: FigureSize,
}

impl ImageGrid {
    pub fn new(source: impl Into<ImageSource>, options: GridOptions) -> Result<Self> {
        check_figure_params(options.height, options.aspect)?;
        let source = source.into();
        let images = source.resolve(&options.slicing)?;

        let n_source = images.len();
        let n_cells = n_source * options.map_func.len().max(1);
        let styles = options.styles(n_source, n_cells)?;
        let shape = GridShape::wrapped(n_cells, options.col_wrap)?;

        let images = if options.map_func.is_empty() {
            images
        } else {
            let mut out = Vec::with_capacity(n_cells);
            for transform in &options.map_func {
                log::debug!("applying '{}' to {n_source} images", transform.name());
                for image in &images {
                    out.push(transform.apply(image)?);
                }
            }
            out
        };

        log::debug!(
            "image grid: {n_cells} cells from {} source images in {} x {}",
            source.source_len(),
            shape.rows,
            shape.cols
        );

        Ok(Self {
            cells: images
                .into_iter()
                .zip(styles)
                .map(|(image, style)| CellSpec::new(image, style))
                .collect(),
            shape,
            size: shape.figure_size(options.height, options.aspect),
        })
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn figure_size(&self) -> FigureSize {
        self.size
    }

    /// Number of image cells (surplus positions excluded).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[CellSpec] {
        &self.cells
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageData> {
        self.cells.iter().map(|c| &c.image)
    }

    pub fn styles(&self) -> impl Iterator<Item = &ImageStyle> {
        self.cells.iter().map(|c| &c.style)
    }

    /// Every grid position, surplus ones as [`Cell::Blank`].
    pub fn layout_cells(&self) -> Vec<Cell> {
        let mut cells: Vec<Cell> = self.cells.iter().cloned().map(Cell::from).collect();
        cells.resize(self.shape.cells(), Cell::Blank);
        cells
    }

    pub fn render(&self, theme: &Theme) -> Result<Figure> {
        render_cells(&self.layout_cells(), self.shape, self.size, theme)
    }
}
