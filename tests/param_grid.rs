mod common;

use imagegrid::grid::GridShape;
use imagegrid::{Filter, FilterParams, FilterRef, ImageData, ParamGrid, ParamGridOptions, ParamValue};

fn gaussian_sweep(row: Option<&str>, col: Option<&str>) -> ParamGridOptions {
    ParamGridOptions {
        params: FilterParams::new()
            .with("sigma", vec![1.0, 2.0, 3.0])
            .with("mode", vec!["reflect", "constant"])
            .with("truncate", 3.0),
        row: row.map(String::from),
        col: col.map(String::from),
        height: 1.5,
        ..Default::default()
    }
}

#[test]
fn sweep_yields_row_major_product() {
    let data = common::ramp(10, 12);
    let grid = ParamGrid::new(data.view(), Filter::Gaussian, gaussian_sweep(Some("sigma"), Some("mode")))
        .expect("sweep");
    assert_eq!(grid.shape(), GridShape { rows: 3, cols: 2 });
    assert_eq!(grid.len(), 6);

    for (i, (cell, params)) in grid.cells().iter().zip(grid.params()).enumerate() {
        let (r, c) = (i / 2, i % 2);
        assert_eq!(params.get("sigma"), Some(&ParamValue::Float([1.0, 2.0, 3.0][r])));
        assert_eq!(params.get("mode"), Some(&ParamValue::from(["reflect", "constant"][c])));
        assert_eq!(params.get("truncate"), Some(&ParamValue::Float(3.0)));

        let expected = Filter::Gaussian.apply(data.view(), params).expect("filter");
        assert_eq!(cell.image, ImageData::Gray(expected));
    }
}

#[test]
fn single_axis_sweeps() {
    let data = common::ramp(8, 8);
    let rows = ParamGrid::new(data.view(), Filter::Gaussian, {
        let mut o = gaussian_sweep(Some("sigma"), None);
        o.params.set("mode", "nearest");
        o
    })
    .expect("rows");
    assert_eq!(rows.shape(), GridShape { rows: 3, cols: 1 });

    let cols = ParamGrid::new(data.view(), Filter::Gaussian, {
        let mut o = gaussian_sweep(None, Some("mode"));
        o.params.set("sigma", 1.5);
        o
    })
    .expect("cols");
    assert_eq!(cols.shape(), GridShape { rows: 1, cols: 2 });
    assert_eq!(cols.cells()[1].col_label.as_deref(), Some("mode: constant"));
}

#[test]
fn no_sweep_applies_filter_once() {
    let data = common::ramp(8, 8);
    let options = ParamGridOptions {
        params: FilterParams::new().with("size", 3),
        ..Default::default()
    };
    let grid = ParamGrid::new(data.view(), Filter::Max, options).expect("grid");
    assert_eq!(grid.len(), 1);
    assert_eq!(grid.shape(), GridShape { rows: 1, cols: 1 });
}

#[test]
fn filters_can_be_named() {
    let data = common::ramp(8, 8);
    let filter: FilterRef = "gaussian_laplace".parse().expect("known filter");
    let mut options = gaussian_sweep(None, Some("sigma"));
    options.params.set("mode", "wrap");
    options.col_wrap = Some(2);
    let grid = ParamGrid::new(data.view(), filter, options).expect("grid");
    assert_eq!(grid.shape(), GridShape { rows: 2, cols: 2 });

    assert!("gauss".parse::<FilterRef>().is_err());
}

#[test]
fn sweep_renders_labels() {
    let data = common::ramp(16, 16);
    let grid = ParamGrid::new(data.view(), Filter::Gaussian, gaussian_sweep(Some("mode"), Some("sigma")))
        .expect("sweep");
    let fig = grid.render(&common::small_theme()).expect("render");
    let axes = fig.axes();
    assert_eq!(axes.len(), 6);
    assert_eq!(axes[0].title.as_deref(), Some("sigma: 1"));
    assert_eq!(axes[0].row_label.as_deref(), Some("mode: reflect"));
    assert_eq!(axes[3].row_label.as_deref(), Some("mode: constant"));
    assert!(axes[4].title.is_none());
}
