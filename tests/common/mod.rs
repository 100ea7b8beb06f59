#![allow(dead_code)]

use imagegrid::Theme;
use ndarray::{Array2, Array3};

/// Row-major ramp, value `r * cols + c`.
pub fn ramp(rows: usize, cols: usize) -> Array2<f64> {
    Array2::from_shape_fn((rows, cols), |(r, c)| (r * cols + c) as f64)
}

/// Gray stack whose slice `k` along the last axis is `ramp + 1000 k`.
pub fn stack(rows: usize, cols: usize, depth: usize) -> Array3<f64> {
    Array3::from_shape_fn((rows, cols, depth), |(r, c, k)| {
        (r * cols + c) as f64 + 1000.0 * k as f64
    })
}

pub fn constant(rows: usize, cols: usize, value: f64) -> Array2<f64> {
    Array2::from_elem((rows, cols), value)
}

/// Small on-screen theme so rendering tests stay fast.
pub fn small_theme() -> Theme {
    let mut theme = Theme::default();
    theme.save.screen_dpi = 40.0;
    theme
}
