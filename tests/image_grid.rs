mod common;

use imagegrid::grid::{GridShape, Transform};
use imagegrid::render::CellKind;
use imagegrid::{Filter, FilterParams, GridOptions, ImageData, ImageGrid, Param, PlotError, StackSlicing};
use ndarray::{Array2, Array4, Axis};

#[test]
fn col_wrap_sets_columns_and_ceil_rows() {
    for n in 1..8usize {
        for wrap in 1..=n {
            let grid = ImageGrid::new(
                common::stack(6, 6, n),
                GridOptions {
                    col_wrap: Some(wrap),
                    ..Default::default()
                },
            )
            .expect("grid");
            assert_eq!(
                grid.shape(),
                GridShape {
                    rows: n.div_ceil(wrap),
                    cols: wrap
                }
            );
        }
    }
}

#[test]
fn stepped_slices_match_source() {
    let source = common::stack(5, 7, 10);
    for step in 1..5usize {
        let grid = ImageGrid::new(
            source.clone(),
            GridOptions {
                slicing: StackSlicing::default().with_range(None, None, Some(step)),
                ..Default::default()
            },
        )
        .expect("grid");
        assert_eq!(grid.len(), 10usize.div_ceil(step));
        for (i, image) in grid.images().enumerate() {
            let expected = source.index_axis(Axis(2), i * step).to_owned();
            assert_eq!(image, &ImageData::Gray(expected));
        }
    }
}

#[test]
fn slicing_along_first_axis_with_explicit_indices() {
    let source = common::stack(4, 6, 3);
    let grid = ImageGrid::new(
        source.clone(),
        GridOptions {
            slicing: StackSlicing::along(0).with_slices(vec![3, 1]),
            ..Default::default()
        },
    )
    .expect("grid");
    let images: Vec<&ImageData> = grid.images().collect();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0], &ImageData::Gray(source.index_axis(Axis(0), 3).to_owned()));
}

#[test]
fn out_of_range_axis_is_rejected() {
    let result = ImageGrid::new(
        common::stack(4, 4, 2),
        GridOptions {
            slicing: StackSlicing::along(3),
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(PlotError::InvalidAxis { axis: 3, ndim: 3 })));
}

#[test]
fn image_lists_keep_their_own_shapes() {
    let images = vec![common::ramp(4, 6), common::ramp(8, 3)];
    let grid = ImageGrid::new(images, GridOptions::default()).expect("grid");
    let dims: Vec<(usize, usize)> = grid.images().map(ImageData::dim).collect();
    assert_eq!(dims, [(4, 6), (8, 3)]);
}

#[test]
fn rgb_stacks_give_rgb_cells() {
    let stack = Array4::<f64>::from_elem((4, 6, 6, 3), 0.5);
    let grid = ImageGrid::new(stack, GridOptions::default()).expect("grid");
    assert_eq!(grid.len(), 4);
    assert!(grid.images().all(ImageData::is_rgb));
}

#[test]
fn every_length_mismatch_fails_before_rendering() {
    let source = || common::stack(4, 4, 3);
    let cases = [
        GridOptions {
            vmin: vec![Some(0.0), None].into(),
            ..Default::default()
        },
        GridOptions {
            robust: vec![true; 4].into(),
            ..Default::default()
        },
        GridOptions {
            units: Param::each(["nm"]),
            ..Default::default()
        },
        GridOptions {
            title: Param::each(["a", "b", "c", "d", "e"]),
            ..Default::default()
        },
    ];
    for options in cases {
        assert!(matches!(
            ImageGrid::new(source(), options),
            Err(PlotError::ParamLength { .. })
        ));
    }
}

#[test]
fn per_cell_styles_are_resolved_in_order() {
    let grid = ImageGrid::new(
        common::stack(4, 4, 2),
        GridOptions {
            cmap: Param::each(["magma", "gray"]),
            dx: Param::each([1.0, 2.0]),
            units: Param::all("nm"),
            ..Default::default()
        },
    )
    .expect("grid");
    let styles: Vec<_> = grid.styles().collect();
    assert_eq!(styles[1].cmap.as_deref(), Some("gray"));
    assert_eq!(styles[1].dx, Some(2.0));
    assert_eq!(styles[0].units.as_deref(), Some("nm"));
}

#[test]
fn filter_and_closure_transforms_multiply_cells() {
    let options = GridOptions {
        map_func: vec![
            Transform::filter(Filter::Median, FilterParams::new().with("size", 3)),
            Transform::func("clip", |p| Ok(p.mapv(|v: f64| v.min(10.0)))),
        ],
        ..Default::default()
    };
    let grid = ImageGrid::new(vec![common::ramp(6, 6), common::ramp(6, 6)], options).expect("grid");
    assert_eq!(grid.len(), 4);
    assert_eq!(grid.shape(), GridShape { rows: 2, cols: 3 });
    match grid.images().nth(3) {
        Some(ImageData::Gray(a)) => assert!(a.iter().all(|v| *v <= 10.0)),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn failing_transform_aborts_the_grid() {
    let options = GridOptions {
        map_func: vec![Transform::filter(
            Filter::Gaussian,
            FilterParams::new().with("size", 3),
        )],
        ..Default::default()
    };
    assert!(ImageGrid::new(common::ramp(4, 4), options).is_err());
}

#[test]
fn surplus_cells_render_blank() {
    let grid = ImageGrid::new(
        common::stack(8, 8, 4),
        GridOptions {
            col_wrap: Some(3),
            height: 1.5,
            ..Default::default()
        },
    )
    .expect("grid");
    let fig = grid.render(&common::small_theme()).expect("render");
    let axes = fig.axes();
    assert_eq!(axes.len(), 6);
    assert_eq!(axes[3].kind, CellKind::Image);
    for blank in &axes[4..] {
        assert_eq!(blank.kind, CellKind::Blank);
        assert!(blank.image.is_none());
        assert!(!blank.spines_visible);
        assert!(!blank.has_title());
    }
    // blank cells keep the figure background
    let r = axes[5].cell;
    let center = fig.pixel(r.x as u32 + r.width / 2, r.y as u32 + r.height / 2);
    assert_eq!(center, Some([255, 255, 255]));
}

#[test]
fn single_image_grid_has_one_cell() {
    let grid = ImageGrid::new(Array2::<f64>::zeros((3, 3)), GridOptions::default()).expect("grid");
    assert_eq!(grid.shape(), GridShape { rows: 1, cols: 1 });
}
