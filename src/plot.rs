//! Single-figure entry points: one image, its channels, a filter comparison
//! and an image with its histogram.

use ndarray::{Array2, Array3, ArrayView2, Axis};

use crate::broadcast::Param;
use crate::data::ImageData;
use crate::error::{PlotError, Result};
use crate::filters::FilterParams;
use crate::filters::spectrum::fft_magnitude;
use crate::grid::layout::{FigureSize, GridShape, check_figure_params};
use crate::grid::{FilterRef, GridOptions, ImageGrid};
use crate::render::{Cell, CellSpec, Figure, HistSpec, render_cells};
use crate::style::{ImageStyle, Orientation};
use crate::theme::Theme;

/// Size of a single-image figure in inches.
pub const SINGLE_FIGURE: FigureSize = FigureSize {
    width: 6.4,
    height: 4.8,
};

/// Size of a `filterplot` figure with spectrum panels, in inches.
pub const FFT_FIGURE: FigureSize = FigureSize {
    width: 8.0,
    height: 8.0,
};

const FFT_CMAP: &str = "sunset-dark";

const RGB_CMAPS: [&str; 3] = ["R", "G", "B"];
const RGB_TITLES: [&str; 3] = ["R: Red channel", "G: Green channel", "B: Blue channel"];

/// Draw one image.
pub fn imgplot(data: impl Into<ImageData>, style: &ImageStyle, theme: &Theme) -> Result<Figure> {
    style.validate()?;
    let cell = CellSpec::new(data.into(), style.clone());
    render_cells(&[cell.into()], GridShape { rows: 1, cols: 1 }, SINGLE_FIGURE, theme)
}

/// Options of [`rgbplot`]: grid options broadcast over the three channels.
///
/// Unset `cmap` and `title` become the channel colormaps `R`, `G`, `B` and
/// their channel names.
pub type RgbPlotOptions = GridOptions;

/// Split an H × W × 3 image into its channels, shown side by side.
pub fn rgbplot(data: &Array3<f64>, options: RgbPlotOptions, theme: &Theme) -> Result<Figure> {
    let channels = data.shape()[2];
    if channels != 3 {
        return Err(PlotError::InvalidData(format!(
            "expected an RGB image with 3 channels, got {channels}"
        )));
    }
    let planes: Vec<Array2<f64>> = data.axis_iter(Axis(2)).map(|p| p.to_owned()).collect();

    let mut options = options;
    if options.cmap == Param::unset() {
        options.cmap = Param::each(RGB_CMAPS);
    }
    if options.title == Param::unset() {
        options.title = Param::each(RGB_TITLES);
    }
    ImageGrid::new(planes, options)?.render(theme)
}

#[derive(Debug, Clone)]
pub struct FilterPlotOptions {
    /// Shared by both panels
    pub style: ImageStyle,
    pub title1: String,
    pub title2: String,
    pub height: f64,
    pub aspect: f64,
    /// Add a second row with the log FFT magnitude of both images
    pub fft: bool,
}

impl Default for FilterPlotOptions {
    fn default() -> Self {
        Self {
            style: ImageStyle::default(),
            title1: "Original Image".to_string(),
            title2: "Filtered Image".to_string(),
            height: 5.0,
            aspect: 1.0,
            fft: false,
        }
    }
}

/// Natural log of the centred FFT magnitude; zero magnitudes become `-inf`
/// and are left undrawn.
fn log_spectrum(image: ArrayView2<f64>) -> Result<Array2<f64>> {
    Ok(fft_magnitude(image)?.mapv(f64::ln))
}

/// Original and filtered image side by side. Returns the figure and the
/// filtered array.
///
/// With `fft` set, a second row shows the log magnitude spectra of both
/// images on an 8 × 8 in figure; `height` and `aspect` are then unused.
pub fn filterplot(
    data: ArrayView2<f64>,
    filter: impl Into<FilterRef>,
    params: &FilterParams,
    options: FilterPlotOptions,
    theme: &Theme,
) -> Result<(Figure, Array2<f64>)> {
    check_figure_params(options.height, options.aspect)?;
    options.style.validate()?;
    let filter = filter.into();
    log::debug!("filterplot: '{}' with {params:?}", filter.name());
    let filtered = filter.apply(data, params)?;

    let panel = |image: Array2<f64>, title: String| -> Cell {
        let style = ImageStyle {
            title: Some(title),
            ..options.style.clone()
        };
        CellSpec::new(image.into(), style).into()
    };
    let mut cells = vec![
        panel(data.to_owned(), options.title1.clone()),
        panel(filtered.clone(), options.title2.clone()),
    ];
    if !options.fft {
        let shape = GridShape { rows: 1, cols: 2 };
        let size = shape.figure_size(options.height, options.aspect);
        let figure = render_cells(&cells, shape, size, theme)?;
        return Ok((figure, filtered));
    }

    let spectrum_panel = |image: ArrayView2<f64>, title: &str| -> Result<Cell> {
        let style = ImageStyle {
            cmap: Some(FFT_CMAP.to_string()),
            cbar: options.style.cbar,
            showticks: options.style.showticks,
            title: Some(title.to_string()),
            ..ImageStyle::default()
        };
        Ok(CellSpec::new(log_spectrum(image)?.into(), style).into())
    };
    cells.push(spectrum_panel(data, "Original FFT Magnitude (log)")?);
    cells.push(spectrum_panel(filtered.view(), "Filtered FFT Magnitude (log)")?);
    let figure = render_cells(&cells, GridShape { rows: 2, cols: 2 }, FFT_FIGURE, theme)?;
    Ok((figure, filtered))
}

#[derive(Debug, Clone)]
pub struct HistOptions {
    pub bins: usize,
    /// `Vertical` puts the histogram right of the image, `Horizontal` below it
    pub orientation: Orientation,
    pub height: f64,
    pub aspect: f64,
}

impl Default for HistOptions {
    fn default() -> Self {
        Self {
            bins: 500,
            orientation: Orientation::Vertical,
            height: 3.0,
            aspect: 1.0,
        }
    }
}

/// An image and the histogram of its finite values, bars coloured by the
/// image colormap.
pub fn imghist(
    data: ArrayView2<f64>,
    style: ImageStyle,
    options: HistOptions,
    theme: &Theme,
) -> Result<Figure> {
    check_figure_params(options.height, options.aspect)?;
    if options.bins == 0 {
        return Err(PlotError::invalid_option("bins", "must be at least 1"));
    }
    let image_style = ImageStyle {
        orientation: options.orientation,
        ..style
    };
    image_style.validate()?;

    let values: Vec<f64> = data.iter().copied().filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        return Err(PlotError::InvalidData("image has no finite values".to_string()));
    }
    let hist = HistSpec {
        values,
        bins: options.bins,
        style: ImageStyle {
            title: None,
            ..image_style.clone()
        },
        orientation: options.orientation,
    };
    let shape = match options.orientation {
        Orientation::Vertical => GridShape { rows: 1, cols: 2 },
        Orientation::Horizontal => GridShape { rows: 2, cols: 1 },
    };
    let cells = [
        CellSpec::new(data.to_owned().into(), image_style).into(),
        Cell::Histogram(Box::new(hist)),
    ];
    render_cells(
        &cells,
        shape,
        shape.figure_size(options.height, options.aspect),
        theme,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::Filter;
    use crate::render::CellKind;

    fn ramp() -> Array2<f64> {
        Array2::from_shape_fn((16, 20), |(r, c)| (r * 20 + c) as f64)
    }

    fn theme() -> Theme {
        Theme::default().with_dpi(20.0)
    }

    #[test]
    fn imgplot_draws_one_cell() {
        let fig = imgplot(ramp(), &ImageStyle::default(), &theme()).unwrap();
        assert_eq!((fig.width(), fig.height()), (128, 96));
        assert_eq!(fig.axes().len(), 1);
        assert!(fig.axes()[0].colorbar.is_some());
    }

    #[test]
    fn rgbplot_requires_three_channels() {
        let rgba = Array3::<f64>::zeros((4, 4, 4));
        assert!(rgbplot(&rgba, RgbPlotOptions::default(), &theme()).is_err());

        let rgb = Array3::from_shape_fn((8, 8, 3), |(r, c, k)| (r + c + k) as f64);
        let fig = rgbplot(&rgb, RgbPlotOptions::default(), &theme()).unwrap();
        assert_eq!(fig.axes().len(), 3);
        assert_eq!(fig.axes()[1].title.as_deref(), Some("G: Green channel"));
    }

    #[test]
    fn filterplot_returns_filtered_array() {
        let data = ramp();
        let params = FilterParams::new().with("size", 3);
        let (fig, filtered) = filterplot(
            data.view(),
            Filter::Median,
            &params,
            FilterPlotOptions::default(),
            &theme(),
        )
        .unwrap();
        assert_eq!(filtered.dim(), data.dim());
        assert_eq!(fig.axes()[0].title.as_deref(), Some("Original Image"));
        assert_eq!(fig.axes()[1].title.as_deref(), Some("Filtered Image"));
    }

    #[test]
    fn filterplot_adds_spectrum_row() {
        let data = ramp();
        let params = FilterParams::new().with("sigma", 2.0);
        let options = FilterPlotOptions {
            style: ImageStyle::default().with_scalebar(0.5, "um"),
            fft: true,
            ..Default::default()
        };
        let (fig, _) = filterplot(data.view(), Filter::Gaussian, &params, options, &theme()).unwrap();
        assert_eq!((fig.width(), fig.height()), (160, 160));
        let axes = fig.axes();
        assert_eq!(axes.len(), 4);
        assert_eq!((axes[2].row, axes[2].col), (1, 0));
        assert_eq!(axes[2].title.as_deref(), Some("Original FFT Magnitude (log)"));
        assert_eq!(axes[3].title.as_deref(), Some("Filtered FFT Magnitude (log)"));
        assert!(axes[0].scalebar.is_some());
        assert!(axes[2].scalebar.is_none());
    }

    #[test]
    fn log_spectrum_of_constant_image_peaks_at_centre() {
        let data = Array2::from_elem((12, 12), 2.0);
        let spectrum = log_spectrum(data.view()).unwrap();
        let centre = spectrum[[6, 6]];
        assert!(spectrum.iter().filter(|v| v.is_finite()).all(|v| *v <= centre));
    }

    #[test]
    fn imghist_layout_follows_orientation() {
        let data = ramp();
        let fig = imghist(data.view(), ImageStyle::default(), HistOptions::default(), &theme())
            .unwrap();
        assert_eq!((fig.axes()[1].row, fig.axes()[1].col), (0, 1));
        assert_eq!(fig.axes()[1].kind, CellKind::Histogram);

        let options = HistOptions {
            orientation: Orientation::Horizontal,
            ..Default::default()
        };
        let fig = imghist(data.view(), ImageStyle::default(), options, &theme()).unwrap();
        assert_eq!((fig.axes()[1].row, fig.axes()[1].col), (1, 0));
    }
}
