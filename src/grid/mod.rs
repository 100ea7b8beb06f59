//! Multi-image grids: image lists and stacks, and parameter sweeps.

mod image_grid;
pub mod layout;
mod param_grid;

pub use image_grid::{GridOptions, ImageGrid, Transform, TransformFn};
pub use layout::{FigureSize, GridShape};
#[allow(deprecated)]
pub use param_grid::{FilterGrid, FilterRef, ParamFilterFn, ParamGrid, ParamGridOptions};
