mod common;

use std::fs;

use imagegrid::colormap::colormap;
use imagegrid::plot::{HistOptions, imghist, imgplot};
use imagegrid::render::CellKind;
use imagegrid::scale::Extend;
use imagegrid::style::{Interpolation, Orientation, Origin};
use imagegrid::{ImageStyle, Theme};
use ndarray::Array2;

fn gray_style() -> ImageStyle {
    ImageStyle {
        cmap: Some("gray".to_string()),
        vmin: Some(0.0),
        vmax: Some(1.0),
        interpolation: Some(Interpolation::Nearest),
        ..Default::default()
    }
}

#[test]
fn figure_pixels_follow_size_and_dpi() {
    let fig = imgplot(common::ramp(10, 10), &ImageStyle::default(), &common::small_theme())
        .expect("render");
    assert_eq!((fig.width(), fig.height()), (256, 192));
    assert_eq!(fig.to_rgba().len(), 256 * 192 * 4);

    let fig = imgplot(common::ramp(10, 10), &ImageStyle::default(), &Theme::default().with_dpi(10.0))
        .expect("render");
    assert_eq!((fig.width(), fig.height()), (64, 48));
}

#[test]
fn image_pixels_come_from_the_colormap() {
    let fig = imgplot(common::constant(8, 8, 0.0), &gray_style(), &common::small_theme())
        .expect("render");
    let rect = fig.axes()[0].image.expect("image rect");
    let (cx, cy) = rect.center();
    assert_eq!(fig.pixel(cx as u32, cy as u32), Some([0, 0, 0]));
}

#[test]
fn missing_values_show_the_background() {
    let mut data = Array2::<f64>::ones((8, 8));
    data.slice_mut(ndarray::s![.., ..4]).fill(f64::NAN);
    let style = ImageStyle {
        cmap: Some("viridis".to_string()),
        ..gray_style()
    };
    let fig = imgplot(data, &style, &common::small_theme()).expect("render");
    let rect = fig.axes()[0].image.expect("image rect");
    let y = (rect.y + rect.height as i32 / 2) as u32;
    let left = rect.x as u32 + rect.width / 4;
    let right = rect.x as u32 + rect.width * 3 / 4;

    assert_eq!(fig.pixel(left, y), Some([255, 255, 255]));
    let top = colormap("viridis").expect("viridis").sample(1.0);
    assert_eq!(fig.pixel(right, y), Some(top));
}

#[test]
fn theme_background_fills_figure_and_missing_pixels() {
    let mut theme = common::small_theme();
    theme.background = "#203040".to_string();
    let mut data = Array2::<f64>::ones((8, 8));
    data.slice_mut(ndarray::s![.., ..4]).fill(f64::NAN);
    let fig = imgplot(data, &gray_style(), &theme).expect("render");

    assert_eq!(fig.pixel(0, 0), Some([0x20, 0x30, 0x40]));
    let rect = fig.axes()[0].image.expect("image rect");
    let y = (rect.y + rect.height as i32 / 2) as u32;
    assert_eq!(fig.pixel(rect.x as u32 + rect.width / 4, y), Some([0x20, 0x30, 0x40]));
}

#[test]
fn lower_origin_flips_rows() {
    let data = Array2::from_shape_fn((8, 8), |(r, _)| if r < 4 { 0.0 } else { 1.0 });
    let pixel_near_top = |origin: Origin| {
        let style = ImageStyle {
            origin: Some(origin),
            ..gray_style()
        };
        let fig = imgplot(data.clone(), &style, &common::small_theme()).expect("render");
        let rect = fig.axes()[0].image.expect("image rect");
        fig.pixel(
            rect.x as u32 + rect.width / 2,
            rect.y as u32 + rect.height / 8,
        )
    };
    assert_eq!(pixel_near_top(Origin::Upper), Some([0, 0, 0]));
    assert_eq!(pixel_near_top(Origin::Lower), Some([255, 255, 255]));
}

#[test]
fn colorbar_placement_follows_orientation() {
    let theme = common::small_theme();
    let vertical = imgplot(common::ramp(8, 8), &ImageStyle::default(), &theme).expect("render");
    let axes = &vertical.axes()[0];
    let (image, cbar) = (axes.image.expect("image"), axes.colorbar.expect("colorbar"));
    assert!(cbar.x >= image.right());
    assert_eq!(cbar.height, image.height);

    let style = ImageStyle {
        orientation: Orientation::Horizontal,
        ..Default::default()
    };
    let horizontal = imgplot(common::ramp(8, 8), &style, &theme).expect("render");
    let axes = &horizontal.axes()[0];
    let (image, cbar) = (axes.image.expect("image"), axes.colorbar.expect("colorbar"));
    assert!(cbar.y >= image.bottom());
    assert_eq!(cbar.width, image.width);

    let no_cbar = imgplot(common::ramp(8, 8), &ImageStyle::default().without_cbar(), &theme)
        .expect("render");
    assert!(no_cbar.axes()[0].colorbar.is_none());
}

#[test]
fn robust_limits_extend_the_colorbar() {
    let mut data = common::ramp(20, 20);
    data[[5, 5]] = 1e6;
    let style = ImageStyle::default().robust((2.0, 98.0));
    let fig = imgplot(data, &style, &common::small_theme()).expect("render");
    let limits = fig.axes()[0].limits.expect("limits");
    assert_eq!(limits.extend, Extend::Both);
    assert!(limits.vmax < 1e6);
}

#[test]
fn scalebar_label_is_reported() {
    let style = ImageStyle::default().with_scalebar(10.0, "nm");
    let fig = imgplot(common::ramp(100, 100), &style, &common::small_theme()).expect("render");
    assert_eq!(fig.axes()[0].scalebar.as_deref(), Some("250 nm"));
}

#[test]
fn histogram_cell_sits_next_to_the_image() {
    let data = common::ramp(12, 12);
    let fig = imghist(
        data.view(),
        ImageStyle::default(),
        HistOptions {
            bins: 20,
            height: 1.5,
            ..Default::default()
        },
        &common::small_theme(),
    )
    .expect("render");
    let kinds: Vec<CellKind> = fig.axes().iter().map(|a| a.kind).collect();
    assert_eq!(kinds, [CellKind::Image, CellKind::Histogram]);
}

#[test]
fn saved_png_matches_the_buffer() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("out").join("figure.png");
    let fig = imgplot(common::ramp(16, 16), &ImageStyle::default(), &common::small_theme())
        .expect("render");
    fig.save(&path).expect("save");

    let saved = image::open(&path).expect("open").to_rgb8();
    assert_eq!(saved.dimensions(), (fig.width(), fig.height()));
    assert_eq!(saved.as_raw().as_slice(), fig.as_rgb());
}

#[test]
fn theme_file_changes_resolution_and_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("theme.json");
    fs::write(
        &path,
        r#"{"context": "talk", "save": {"screen_dpi": 20}, "image": {"cmap": "gray", "despine": false}}"#,
    )
    .expect("write theme");
    let theme = Theme::from_json_file(&path).expect("theme");
    let fig = imgplot(common::constant(4, 4, 0.0), &ImageStyle::default(), &theme).expect("render");
    assert_eq!((fig.width(), fig.height()), (128, 96));
    assert!(fig.axes()[0].spines_visible);
}

#[test]
fn empty_image_is_rejected() {
    let empty = Array2::<f64>::zeros((0, 5));
    assert!(matches!(
        imgplot(empty, &ImageStyle::default(), &common::small_theme()),
        Err(imagegrid::PlotError::InvalidData(_))
    ));
}

#[test]
fn invalid_styles_fail_before_drawing() {
    let theme = common::small_theme();
    let bad = [
        ImageStyle {
            dx: Some(1.0),
            ..Default::default()
        },
        ImageStyle::default().with_cmap("not-a-map"),
        ImageStyle {
            perc: (50.0, 10.0),
            ..Default::default()
        },
        ImageStyle::default().with_scalebar(1.0, "furlong"),
    ];
    for style in bad {
        assert!(imgplot(common::ramp(4, 4), &style, &theme).is_err(), "{style:?}");
    }
}
