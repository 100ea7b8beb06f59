use crate::error::{PlotError, Result};

/// Default number of columns when no `col_wrap` is given.
pub const DEFAULT_COLUMNS: usize = 3;
/// Default cell height in inches.
pub const DEFAULT_HEIGHT: f64 = 3.0;

/// Rows × columns of a subplot grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

/// Figure size in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureSize {
    pub width: f64,
    pub height: f64,
}

impl FigureSize {
    /// Pixel dimensions at `dpi`, at least one pixel each way.
    pub fn pixels(&self, dpi: f64) -> (u32, u32) {
        let w = (self.width * dpi).round().max(1.0) as u32;
        let h = (self.height * dpi).round().max(1.0) as u32;
        (w, h)
    }
}

impl GridShape {
    /// Wrap `n` cells into rows of at most `col_wrap` columns.
    pub fn wrapped(n: usize, col_wrap: Option<usize>) -> Result<Self> {
        if n == 0 {
            return Err(PlotError::InvalidData("grid needs at least one cell".to_string()));
        }
        let wrap = col_wrap.unwrap_or(DEFAULT_COLUMNS);
        if wrap == 0 {
            return Err(PlotError::invalid_option("col_wrap", "must be at least 1"));
        }
        let cols = wrap.min(n);
        Ok(Self {
            rows: n.div_ceil(cols),
            cols,
        })
    }

    /// Shape from an explicit row/column partition.
    pub fn explicit(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(PlotError::InvalidData(format!(
                "grid of {rows} x {cols} has no cells"
            )));
        }
        Ok(Self { rows, cols })
    }

    pub fn cells(&self) -> usize {
        self.rows * self.cols
    }

    /// Row-major position of cell `index`.
    pub fn cell_position(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }

    /// Trailing positions left over after `n` images are placed.
    pub fn surplus(&self, n: usize) -> usize {
        self.cells().saturating_sub(n)
    }

    pub fn figure_size(&self, height: f64, aspect: f64) -> FigureSize {
        FigureSize {
            width: self.cols as f64 * height * aspect,
            height: self.rows as f64 * height,
        }
    }
}

/// `col_wrap` only makes sense when there is no explicit row partition.
pub fn check_wrap_exclusive(row: Option<&str>, col_wrap: Option<usize>) -> Result<()> {
    if row.is_some() && col_wrap.is_some() {
        return Err(PlotError::ExclusiveOptions(
            "cannot use `row` and `col_wrap` together".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn check_figure_params(height: f64, aspect: f64) -> Result<()> {
    if !(height.is_finite() && height > 0.0) {
        return Err(PlotError::invalid_option("height", "must be a positive number"));
    }
    if !(aspect.is_finite() && aspect > 0.0) {
        return Err(PlotError::invalid_option("aspect", "must be a positive number"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_gives_ceil_rows() {
        for n in 1..20usize {
            for wrap in 1..=n {
                let shape = GridShape::wrapped(n, Some(wrap)).unwrap();
                assert_eq!(shape.cols, wrap);
                assert_eq!(shape.rows, n.div_ceil(wrap));
            }
        }
    }

    #[test]
    fn wrap_larger_than_count_is_clamped() {
        assert_eq!(
            GridShape::wrapped(1, Some(3)).unwrap(),
            GridShape { rows: 1, cols: 1 }
        );
        assert_eq!(
            GridShape::wrapped(4, None).unwrap(),
            GridShape { rows: 2, cols: 3 }
        );
        assert_eq!(
            GridShape::wrapped(3, Some(2)).unwrap(),
            GridShape { rows: 2, cols: 2 }
        );
    }

    #[test]
    fn zero_cells_or_zero_wrap_fail() {
        assert!(GridShape::wrapped(0, None).is_err());
        assert!(GridShape::wrapped(3, Some(0)).is_err());
        assert!(GridShape::explicit(0, 2).is_err());
    }

    #[test]
    fn row_and_wrap_are_exclusive() {
        assert!(check_wrap_exclusive(Some("sigma"), Some(3)).is_err());
        assert!(check_wrap_exclusive(None, Some(3)).is_ok());
        assert!(check_wrap_exclusive(Some("sigma"), None).is_ok());
    }

    #[test]
    fn figure_size_scales_with_height_and_aspect() {
        let shape = GridShape { rows: 2, cols: 3 };
        assert_eq!(
            shape.figure_size(2.0, 1.5),
            FigureSize {
                width: 9.0,
                height: 4.0
            }
        );
        assert_eq!(shape.figure_size(3.0, 1.0).pixels(100.0), (900, 600));
    }

    #[test]
    fn surplus_and_positions() {
        let shape = GridShape::wrapped(5, Some(3)).unwrap();
        assert_eq!(shape.surplus(5), 1);
        assert_eq!(shape.cell_position(4), (1, 1));
    }
}
