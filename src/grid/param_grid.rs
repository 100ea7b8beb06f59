use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use ndarray::{Array2, ArrayView2};

use super::layout::{
    DEFAULT_HEIGHT, FigureSize, GridShape, check_figure_params, check_wrap_exclusive,
};
use crate::error::{PlotError, Result};
use crate::filters::{Filter, FilterParams, ParamValue};
use crate::render::{Cell, CellSpec, Figure, render_cells};
use crate::style::ImageStyle;
use crate::theme::Theme;

pub type ParamFilterFn =
    Arc<dyn Fn(ArrayView2<f64>, &FilterParams) -> Result<Array2<f64>> + Send + Sync>;

/// Filter swept by a [`ParamGrid`].
#[derive(Clone)]
pub enum FilterRef {
    Named(Filter),
    Func { name: String, func: ParamFilterFn },
}

impl FilterRef {
    pub fn func<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(ArrayView2<f64>, &FilterParams) -> Result<Array2<f64>> + Send + Sync + 'static,
    {
        FilterRef::Func {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FilterRef::Named(filter) => filter.name(),
            FilterRef::Func { name, .. } => name,
        }
    }

    pub fn apply(&self, data: ArrayView2<f64>, params: &FilterParams) -> Result<Array2<f64>> {
        match self {
            FilterRef::Named(filter) => filter.apply(data, params),
            FilterRef::Func { func, .. } => func(data, params),
        }
    }
}

impl fmt::Debug for FilterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterRef::Named(filter) => f.debug_tuple("Named").field(filter).finish(),
            FilterRef::Func { name, .. } => f.debug_struct("Func").field("name", name).finish(),
        }
    }
}

impl From<Filter> for FilterRef {
    fn from(filter: Filter) -> Self {
        FilterRef::Named(filter)
    }
}

impl FromStr for FilterRef {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(FilterRef::Named(s.parse()?))
    }
}

#[derive(Debug, Clone)]
pub struct ParamGridOptions {
    /// Shared keyword arguments; the `row` and `col` keys hold lists
    pub params: FilterParams,
    pub row: Option<String>,
    pub col: Option<String>,
    pub col_wrap: Option<usize>,
    pub height: f64,
    pub aspect: f64,
    /// Applied to every cell
    pub style: ImageStyle,
}

impl Default for ParamGridOptions {
    fn default() -> Self {
        Self {
            params: FilterParams::new(),
            row: None,
            col: None,
            col_wrap: None,
            height: DEFAULT_HEIGHT,
            aspect: 1.0,
            style: ImageStyle::default(),
        }
    }
}

/// One swept axis: the keyword and its values.
struct Sweep<'a> {
    key: &'a str,
    values: &'a [ParamValue],
}

impl Sweep<'_> {
    fn label(&self, i: usize) -> String {
        format!("{}: {}", self.key, self.values[i])
    }
}

fn sweep<'a>(params: &'a FilterParams, key: Option<&'a str>) -> Result<Option<Sweep<'a>>> {
    let Some(key) = key else {
        return Ok(None);
    };
    let value = params.get(key).ok_or_else(|| {
        PlotError::invalid_option(key, "is swept but has no values in `params`")
    })?;
    match value.as_list() {
        Some(values) if !values.is_empty() => Ok(Some(Sweep { key, values })),
        Some(_) => Err(PlotError::invalid_option(key, "value list is empty")),
        None => Err(PlotError::invalid_option(
            key,
            format!("must be a list of values to sweep, got '{value}'"),
        )),
    }
}

/// A filter applied to one image over the cartesian product of two keyword
/// arguments, rows sweeping `row` and columns sweeping `col`.
///
/// ```no_run
/// use imagegrid::prelude::*;
/// use ndarray::Array2;
///
/// let data = Array2::<f64>::zeros((64, 64));
/// let options = ParamGridOptions {
///     params: FilterParams::new()
///         .with("sigma", vec![1.0, 2.0, 4.0])
///         .with("mode", vec!["reflect", "wrap"]),
///     row: Some("mode".into()),
///     col: Some("sigma".into()),
///     ..Default::default()
/// };
/// let grid = ParamGrid::new(data.view(), Filter::Gaussian, options)?;
/// assert_eq!(grid.len(), 6);
/// # Ok::<(), imagegrid::PlotError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ParamGrid {
    cells: Vec<CellSpec>,
    params: Vec<FilterParams>,
    shape: GridShape,
    size: FigureSize,
}

impl ParamGrid {
    pub fn new(
        data: ArrayView2<f64>,
        filter: impl Into<FilterRef>,
        options: ParamGridOptions,
    ) -> Result<Self> {
        let filter = filter.into();
        check_wrap_exclusive(options.row.as_deref(), options.col_wrap)?;
        check_figure_params(options.height, options.aspect)?;
        if let (Some(r), Some(c)) = (&options.row, &options.col)
            && r == c
        {
            return Err(PlotError::invalid_option(
                "row",
                format!("'{r}' is also the column parameter"),
            ));
        }
        if options.col.is_none() && options.col_wrap.is_some() {
            return Err(PlotError::invalid_option(
                "col_wrap",
                "needs a `col` parameter to wrap",
            ));
        }
        options.style.validate()?;

        let rows = sweep(&options.params, options.row.as_deref())?;
        let cols = sweep(&options.params, options.col.as_deref())?;
        let n_rows = rows.as_ref().map_or(1, |s| s.values.len());
        let n_cols = cols.as_ref().map_or(1, |s| s.values.len());

        // a lone column sweep wraps like an image grid
        let (shape, wrapped) = match (&rows, &cols) {
            (None, Some(_)) if options.col_wrap.is_some() => {
                (GridShape::wrapped(n_cols, options.col_wrap)?, true)
            }
            _ => (GridShape::explicit(n_rows, n_cols)?, false),
        };

        let mut cells = Vec::with_capacity(n_rows * n_cols);
        let mut swept = Vec::with_capacity(n_rows * n_cols);
        for r in 0..n_rows {
            for c in 0..n_cols {
                let mut overrides = Vec::with_capacity(2);
                if let Some(s) = &rows {
                    overrides.push((s.key, s.values[r].clone()));
                }
                if let Some(s) = &cols {
                    overrides.push((s.key, s.values[c].clone()));
                }
                let params = options.params.merged(&overrides);
                log::debug!("{}: cell ({r}, {c}) with {params:?}", filter.name());

                let filtered = filter.apply(data, &params)?;
                let mut cell = CellSpec::new(filtered.into(), options.style.clone());
                if let Some(s) = &rows
                    && c == 0
                {
                    cell.row_label = Some(s.label(r));
                }
                if let Some(s) = &cols
                    && (r == 0 || wrapped)
                {
                    cell.col_label = Some(s.label(c));
                }
                cells.push(cell);
                swept.push(params);
            }
        }

        Ok(Self {
            cells,
            params: swept,
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

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[CellSpec] {
        &self.cells
    }

    /// Keyword arguments each cell was filtered with, row-major.
    pub fn params(&self) -> &[FilterParams] {
        &self.params
    }

    pub fn render(&self, theme: &Theme) -> Result<Figure> {
        let mut cells: Vec<Cell> = self.cells.iter().cloned().map(Cell::from).collect();
        cells.resize(self.shape.cells(), Cell::Blank);
        render_cells(&cells, self.shape, self.size, theme)
    }
}

/// Former name of [`ParamGrid`].
#[deprecated(note = "use `ParamGrid` instead")]
#[derive(Debug, Clone)]
pub struct FilterGrid;

#[allow(deprecated)]
impl FilterGrid {
    pub fn new(
        data: ArrayView2<f64>,
        filter: impl Into<FilterRef>,
        options: ParamGridOptions,
    ) -> Result<ParamGrid> {
        log::warn!("FilterGrid is deprecated and will be removed, use ParamGrid instead");
        ParamGrid::new(data, filter, options)
    }
}
