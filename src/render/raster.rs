//! Pixel painting: colormapped images and colorbar gradients.

use image::{Rgb, RgbImage, imageops};

use super::Figure;
use super::geometry::Rect;
use crate::colormap::Colormap;
use crate::data::ImageData;
use crate::scale::{ColorLimits, Norm};
use crate::style::{Interpolation, Orientation, Origin};

fn blend(c: [u8; 3], bg: [u8; 3], alpha: f64) -> [u8; 3] {
    if alpha >= 1.0 {
        return c;
    }
    let mix = |a: u8, b: u8| (a as f64 * alpha + b as f64 * (1.0 - alpha)).round() as u8;
    [mix(c[0], bg[0]), mix(c[1], bg[1]), mix(c[2], bg[2])]
}

/// Map an image to RGB at data resolution, row 0 at the top.
pub(crate) fn colorize(
    image: &ImageData,
    cmap: &Colormap,
    limits: &ColorLimits,
    norm: Norm,
    alpha: f64,
    background: [u8; 3],
) -> RgbImage {
    let (rows, cols) = image.dim();
    let mut out = RgbImage::from_pixel(cols as u32, rows as u32, Rgb(background));

    match image {
        ImageData::Gray(a) => {
            for ((r, c), v) in a.indexed_iter() {
                let t = norm.normalize(*v, limits.vmin, limits.vmax);
                if t.is_nan() {
                    continue;
                }
                out.put_pixel(c as u32, r as u32, Rgb(blend(cmap.sample(t), background, alpha)));
            }
        }
        ImageData::Rgb(a) => {
            // float images in [0, 1], anything brighter is taken as 8-bit
            let scale = if a.iter().any(|v| v.is_finite() && *v > 1.0) { 255.0 } else { 1.0 };
            let channels = a.shape()[2];
            for r in 0..rows {
                for c in 0..cols {
                    let px = [a[[r, c, 0]], a[[r, c, 1]], a[[r, c, 2]]];
                    if px.iter().any(|v| !v.is_finite()) {
                        continue;
                    }
                    let rgb = px.map(|v| ((v / scale).clamp(0.0, 1.0) * 255.0).round() as u8);
                    let pixel_alpha = if channels == 4 {
                        (a[[r, c, 3]] / scale).clamp(0.0, 1.0)
                    } else {
                        1.0
                    };
                    out.put_pixel(
                        c as u32,
                        r as u32,
                        Rgb(blend(rgb, background, alpha * pixel_alpha)),
                    );
                }
            }
        }
    }
    out
}

/// Scale `src` into `rect` and copy it into the figure.
pub(crate) fn paint_image(
    figure: &mut Figure,
    src: &RgbImage,
    rect: Rect,
    origin: Origin,
    interpolation: Interpolation,
) {
    let flipped;
    let src = match origin {
        Origin::Upper => src,
        Origin::Lower => {
            flipped = imageops::flip_vertical(src);
            &flipped
        }
    };
    let scaled = if src.dimensions() == (rect.width, rect.height) {
        src.clone()
    } else {
        imageops::resize(src, rect.width, rect.height, interpolation.filter_type())
    };
    for (x, y, px) in scaled.enumerate_pixels() {
        figure.put_pixel(rect.x + x as i32, rect.y + y as i32, px.0);
    }
}

/// Fill `gradient` with the colormap, low values at the bottom/left.
pub(crate) fn paint_colorbar(
    figure: &mut Figure,
    gradient: Rect,
    orientation: Orientation,
    cmap: &Colormap,
) {
    match orientation {
        Orientation::Vertical => {
            let len = gradient.height.max(2) - 1;
            for dy in 0..gradient.height {
                let color = cmap.sample(1.0 - dy as f64 / len as f64);
                for dx in 0..gradient.width {
                    figure.put_pixel(gradient.x + dx as i32, gradient.y + dy as i32, color);
                }
            }
        }
        Orientation::Horizontal => {
            let len = gradient.width.max(2) - 1;
            for dx in 0..gradient.width {
                let color = cmap.sample(dx as f64 / len as f64);
                for dy in 0..gradient.height {
                    figure.put_pixel(gradient.x + dx as i32, gradient.y + dy as i32, color);
                }
            }
        }
    }
}

/// Pixel offset of normalized position `t` along a gradient.
pub(crate) fn gradient_offset(gradient: Rect, orientation: Orientation, t: f64) -> (i32, i32) {
    let t = t.clamp(0.0, 1.0);
    match orientation {
        Orientation::Vertical => {
            let y = gradient.bottom() - 1 - (t * (gradient.height.max(1) - 1) as f64).round() as i32;
            (gradient.right(), y)
        }
        Orientation::Horizontal => {
            let x = gradient.x + (t * (gradient.width.max(1) - 1) as f64).round() as i32;
            (x, gradient.bottom())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::colormap;
    use crate::scale::Extend;
    use ndarray::{Array2, Array3};

    fn limits(vmin: f64, vmax: f64) -> ColorLimits {
        ColorLimits {
            vmin,
            vmax,
            extend: Extend::Neither,
        }
    }

    #[test]
    fn gray_values_map_through_colormap() {
        let mut a = Array2::zeros((1, 3));
        a[[0, 1]] = 0.5;
        a[[0, 2]] = f64::NAN;
        let img = colorize(
            &ImageData::Gray(a),
            &colormap("gray").unwrap(),
            &limits(0.0, 1.0),
            Norm::Linear,
            1.0,
            [10, 20, 30],
        );
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(img.get_pixel(2, 0).0, [10, 20, 30]);
    }

    #[test]
    fn alpha_blends_over_background() {
        let a = Array2::from_elem((1, 1), 1.0);
        let img = colorize(
            &ImageData::Gray(a),
            &colormap("gray").unwrap(),
            &limits(0.0, 1.0),
            Norm::Linear,
            0.5,
            [0, 0, 0],
        );
        let v = img.get_pixel(0, 0).0[0];
        assert!((127..=128).contains(&v));
    }

    #[test]
    fn rgb_in_unit_range_and_8bit() {
        let mut unit = Array3::zeros((1, 1, 3));
        unit[[0, 0, 0]] = 1.0;
        let img = colorize(
            &ImageData::Rgb(unit),
            &colormap("gray").unwrap(),
            &limits(0.0, 1.0),
            Norm::Linear,
            1.0,
            [255, 255, 255],
        );
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0]);

        let mut bytes = Array3::zeros((1, 1, 3));
        bytes[[0, 0, 2]] = 255.0;
        let img = colorize(
            &ImageData::Rgb(bytes),
            &colormap("gray").unwrap(),
            &limits(0.0, 1.0),
            Norm::Linear,
            1.0,
            [255, 255, 255],
        );
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 255]);
    }

    #[test]
    fn gradient_offsets_hit_the_ends() {
        let g = Rect::new(0, 0, 10, 101);
        assert_eq!(gradient_offset(g, Orientation::Vertical, 0.0), (10, 100));
        assert_eq!(gradient_offset(g, Orientation::Vertical, 1.0), (10, 0));
    }
}
