//! Windowed Fourier magnitude spectra of 2-D images.

use std::f64::consts::PI;

use ndarray::{Array2, ArrayView2};
use rustfft::{FftPlanner, num_complex::Complex};

use crate::data::ensure_non_empty;
use crate::error::Result;

/// Radially symmetric Hann window covering `shape`.
///
/// A symmetric 1-D Hann window of length `max(rows, cols)` is rotated about
/// the array centre; pixels farther out than its half length are zero.
pub fn hann_window(shape: (usize, usize)) -> Array2<f64> {
    let (rows, cols) = shape;
    let size = rows.max(cols) as f64;
    if size < 2.0 {
        return Array2::ones(shape);
    }
    let center = size / 2.0 - 0.5;
    Array2::from_shape_fn(shape, |(r, c)| {
        let y = r as f64 * size / rows as f64 - center;
        let x = c as f64 * size / cols as f64 - center;
        let p = x.hypot(y) + center;
        if p > size - 1.0 {
            0.0
        } else {
            0.5 - 0.5 * (2.0 * PI * p / (size - 1.0)).cos()
        }
    })
}

/// Centred magnitude of the 2-D FFT of the Hann-windowed image.
///
/// The zero frequency sits at `(rows / 2, cols / 2)`.
pub fn fft_magnitude(data: ArrayView2<f64>) -> Result<Array2<f64>> {
    let (rows, cols) = data.dim();
    ensure_non_empty(&[rows, cols])?;
    let window = hann_window((rows, cols));
    let mut buffer: Vec<Complex<f64>> = data
        .iter()
        .zip(window.iter())
        .map(|(v, w)| Complex::new(v * w, 0.0))
        .collect();

    let mut planner = FftPlanner::new();
    let row_fft = planner.plan_fft_forward(cols);
    for row in buffer.chunks_mut(cols) {
        row_fft.process(row);
    }

    let mut transposed = vec![Complex::new(0.0, 0.0); rows * cols];
    for r in 0..rows {
        for c in 0..cols {
            transposed[c * rows + r] = buffer[r * cols + c];
        }
    }
    let col_fft = planner.plan_fft_forward(rows);
    for col in transposed.chunks_mut(rows) {
        col_fft.process(col);
    }

    let mut shifted = Array2::zeros((rows, cols));
    for r in 0..rows {
        for c in 0..cols {
            let sr = (r + rows / 2) % rows;
            let sc = (c + cols / 2) % cols;
            shifted[[sr, sc]] = transposed[c * rows + r].norm();
        }
    }
    Ok(shifted)
}
