//! Styled scientific image figures.
//!
//! Images are drawn with a colorbar, an optional physical scale bar and
//! robust colour limits, alone ([`plot::imgplot`]), as grids of many images
//! or stack slices ([`ImageGrid`]), or as a filter swept over keyword
//! arguments ([`ParamGrid`]). Every call validates its inputs before drawing
//! and renders into an in-memory [`Figure`] that can be saved as PNG.

pub mod broadcast;
pub mod colormap;
pub mod data;
pub mod datasets;
pub mod error;
pub mod filters;
pub mod grid;
pub mod io;
pub mod plot;
pub mod render;
pub mod scale;
pub mod scalebar;
pub mod style;
pub mod theme;

pub use broadcast::Param;
pub use data::{ImageData, ImageSource, StackSlicing};
pub use error::{PlotError, Result};
pub use filters::{Filter, FilterParams, ParamValue};
#[allow(deprecated)]
pub use grid::FilterGrid;
pub use grid::{FilterRef, GridOptions, ImageGrid, ParamGrid, ParamGridOptions, Transform};
pub use render::Figure;
pub use style::ImageStyle;
pub use theme::Theme;

pub mod prelude {
    pub use crate::broadcast::Param;
    pub use crate::data::{ImageData, ImageSource, StackSlicing};
    pub use crate::error::{PlotError, Result};
    pub use crate::filters::{Filter, FilterParams, ParamValue};
    pub use crate::grid::{
        FigureSize, FilterRef, GridOptions, GridShape, ImageGrid, ParamGrid, ParamGridOptions,
        Transform,
    };
    pub use crate::plot::{
        FilterPlotOptions, HistOptions, RgbPlotOptions, filterplot, imghist, imgplot, rgbplot,
    };
    pub use crate::render::Figure;
    pub use crate::scale::Norm;
    pub use crate::scalebar::{Dimension, ScalebarStyle};
    pub use crate::style::{ImageStyle, Interpolation, Orientation, Origin};
    pub use crate::theme::{Context, Theme};
}
