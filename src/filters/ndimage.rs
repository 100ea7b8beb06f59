//! Separable and rank filters over 2-D `f64` arrays with scipy-style
//! boundary handling.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, ArrayView2};

use crate::error::{PlotError, Result};

/// How the input is extended past its edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryMode {
    /// `d c b a | a b c d | d c b a`
    #[default]
    Reflect,
    /// `a a a a | a b c d | d d d d`
    Nearest,
    /// `d c b | a b c d | c b a`
    Mirror,
    /// `k k k k | a b c d | k k k k`
    Constant,
    /// `a b c d | a b c d | a b c d`
    Wrap,
}

impl FromStr for BoundaryMode {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "reflect" => Ok(BoundaryMode::Reflect),
            "nearest" => Ok(BoundaryMode::Nearest),
            "mirror" => Ok(BoundaryMode::Mirror),
            "constant" => Ok(BoundaryMode::Constant),
            "wrap" => Ok(BoundaryMode::Wrap),
            other => Err(PlotError::invalid_option(
                "mode",
                format!("'{other}' is not one of reflect, nearest, mirror, constant, wrap"),
            )),
        }
    }
}

impl fmt::Display for BoundaryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BoundaryMode::Reflect => "reflect",
            BoundaryMode::Nearest => "nearest",
            BoundaryMode::Mirror => "mirror",
            BoundaryMode::Constant => "constant",
            BoundaryMode::Wrap => "wrap",
        };
        f.write_str(name)
    }
}

/// Boundary mode together with the fill value used by `Constant`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Boundary {
    pub mode: BoundaryMode,
    pub cval: f64,
}

impl Boundary {
    /// Map a possibly out-of-range index into `0..n`; `None` means "use cval".
    fn index(&self, i: isize, n: usize) -> Option<usize> {
        let len = n as isize;
        if (0..len).contains(&i) {
            return Some(i as usize);
        }
        let mapped = match self.mode {
            BoundaryMode::Constant => return None,
            BoundaryMode::Nearest => i.clamp(0, len - 1),
            BoundaryMode::Wrap => i.rem_euclid(len),
            BoundaryMode::Reflect => {
                let m = i.rem_euclid(2 * len);
                if m < len { m } else { 2 * len - 1 - m }
            }
            BoundaryMode::Mirror => {
                if len == 1 {
                    0
                } else {
                    let period = 2 * len - 2;
                    let m = i.rem_euclid(period);
                    if m < len { m } else { period - m }
                }
            }
        };
        Some(mapped as usize)
    }

    fn sample(&self, input: &ArrayView2<f64>, r: isize, c: isize) -> f64 {
        let (rows, cols) = input.dim();
        match (self.index(r, rows), self.index(c, cols)) {
            (Some(r), Some(c)) => input[[r, c]],
            _ => self.cval,
        }
    }
}

/// Correlate every line along `axis` with `weights`, centred on `weights.len() / 2`.
pub fn correlate1d(
    input: ArrayView2<f64>,
    weights: &[f64],
    axis: usize,
    boundary: Boundary,
) -> Array2<f64> {
    let center = (weights.len() / 2) as isize;
    let (rows, cols) = input.dim();
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        weights
            .iter()
            .enumerate()
            .map(|(k, w)| {
                let offset = k as isize - center;
                let (rr, cc) = if axis == 0 {
                    (r as isize + offset, c as isize)
                } else {
                    (r as isize, c as isize + offset)
                };
                w * boundary.sample(&input, rr, cc)
            })
            .sum()
    })
}

/// Sampled Gaussian (or its first/second derivative) with the given radius.
pub fn gaussian_kernel1d(sigma: f64, order: u8, radius: usize) -> Vec<f64> {
    let r = radius as isize;
    let s2 = sigma * sigma;
    let mut phi: Vec<f64> = (-r..=r)
        .map(|x| (-0.5 / s2 * (x * x) as f64).exp())
        .collect();
    let total: f64 = phi.iter().sum();
    phi.iter_mut().for_each(|p| *p /= total);

    match order {
        0 => phi,
        1 => (-r..=r)
            .zip(phi)
            .map(|(x, p)| -(x as f64) / s2 * p)
            .collect(),
        _ => (-r..=r)
            .zip(phi)
            .map(|(x, p)| ((x * x) as f64 - s2) / (s2 * s2) * p)
            .collect(),
    }
}

fn gaussian_radius(sigma: f64, truncate: f64) -> usize {
    (truncate * sigma + 0.5).floor().max(0.0) as usize
}

/// One-dimensional Gaussian of the given derivative order along `axis`.
pub fn gaussian_filter1d(
    input: ArrayView2<f64>,
    sigma: f64,
    axis: usize,
    order: u8,
    truncate: f64,
    boundary: Boundary,
) -> Array2<f64> {
    let mut weights = gaussian_kernel1d(sigma, order, gaussian_radius(sigma, truncate));
    // convolution, not correlation
    weights.reverse();
    correlate1d(input, &weights, axis, boundary)
}

fn gaussian_orders(
    input: ArrayView2<f64>,
    sigma: f64,
    orders: [u8; 2],
    truncate: f64,
    boundary: Boundary,
) -> Array2<f64> {
    let rows = gaussian_filter1d(input, sigma, 0, orders[0], truncate, boundary);
    gaussian_filter1d(rows.view(), sigma, 1, orders[1], truncate, boundary)
}

pub fn gaussian_filter(
    input: ArrayView2<f64>,
    sigma: f64,
    truncate: f64,
    boundary: Boundary,
) -> Array2<f64> {
    gaussian_orders(input, sigma, [0, 0], truncate, boundary)
}

/// Laplacian of Gaussian: sum of second derivatives along each axis.
pub fn gaussian_laplace(
    input: ArrayView2<f64>,
    sigma: f64,
    truncate: f64,
    boundary: Boundary,
) -> Array2<f64> {
    gaussian_orders(input, sigma, [2, 0], truncate, boundary)
        + gaussian_orders(input, sigma, [0, 2], truncate, boundary)
}

pub fn gaussian_gradient_magnitude(
    input: ArrayView2<f64>,
    sigma: f64,
    truncate: f64,
    boundary: Boundary,
) -> Array2<f64> {
    let d0 = gaussian_orders(input, sigma, [1, 0], truncate, boundary);
    let d1 = gaussian_orders(input, sigma, [0, 1], truncate, boundary);
    (&d0 * &d0 + &d1 * &d1).mapv_into(f64::sqrt)
}

/// Derivative along `axis`, smoothed with `smooth` along the other axis.
fn edge_filter(
    input: ArrayView2<f64>,
    axis: usize,
    smooth: &[f64; 3],
    boundary: Boundary,
) -> Array2<f64> {
    let derivative = correlate1d(input, &[-1.0, 0.0, 1.0], axis, boundary);
    correlate1d(derivative.view(), smooth, 1 - axis, boundary)
}

pub fn sobel(input: ArrayView2<f64>, axis: usize, boundary: Boundary) -> Array2<f64> {
    edge_filter(input, axis, &[1.0, 2.0, 1.0], boundary)
}

pub fn prewitt(input: ArrayView2<f64>, axis: usize, boundary: Boundary) -> Array2<f64> {
    edge_filter(input, axis, &[1.0, 1.0, 1.0], boundary)
}

pub fn laplace(input: ArrayView2<f64>, boundary: Boundary) -> Array2<f64> {
    let kernel = [1.0, -2.0, 1.0];
    correlate1d(input, &kernel, 0, boundary) + correlate1d(input, &kernel, 1, boundary)
}

pub fn uniform_filter(input: ArrayView2<f64>, size: usize, boundary: Boundary) -> Array2<f64> {
    let weights = vec![1.0 / size as f64; size];
    let rows = correlate1d(input, &weights, 0, boundary);
    correlate1d(rows.view(), &weights, 1, boundary)
}

/// Which element of the sorted window a rank filter keeps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rank {
    Min,
    Max,
    Median,
    Percentile(f64),
}

impl Rank {
    fn position(&self, n: usize) -> usize {
        match *self {
            Rank::Min => 0,
            Rank::Max => n - 1,
            Rank::Median => n / 2,
            Rank::Percentile(p) => {
                let p = if p < 0.0 { p + 100.0 } else { p };
                ((n as f64 * p / 100.0) as usize).min(n - 1)
            }
        }
    }
}

/// `size × size` rank filter.
pub fn rank_filter(
    input: ArrayView2<f64>,
    size: usize,
    rank: Rank,
    boundary: Boundary,
) -> Array2<f64> {
    let center = (size / 2) as isize;
    let position = rank.position(size * size);
    let mut window = Vec::with_capacity(size * size);
    Array2::from_shape_fn(input.dim(), |(r, c)| {
        window.clear();
        for dr in 0..size as isize {
            for dc in 0..size as isize {
                window.push(boundary.sample(
                    &input,
                    r as isize + dr - center,
                    c as isize + dc - center,
                ));
            }
        }
        window.select_nth_unstable_by(position, f64::total_cmp);
        window[position]
    })
}

/// Resolve a signed axis of a 2-D array.
pub(crate) fn resolve_axis(axis: i64) -> Result<usize> {
    match axis {
        0 | -2 => Ok(0),
        1 | -1 => Ok(1),
        _ => Err(PlotError::InvalidAxis {
            axis: axis as isize,
            ndim: 2,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn boundary(mode: BoundaryMode) -> Boundary {
        Boundary { mode, cval: 0.0 }
    }

    #[test]
    fn boundary_indices_follow_scipy() {
        let n = 4;
        let idx = |mode, i| boundary(mode).index(i, n);
        assert_eq!(idx(BoundaryMode::Reflect, -1), Some(0));
        assert_eq!(idx(BoundaryMode::Reflect, -2), Some(1));
        assert_eq!(idx(BoundaryMode::Reflect, 4), Some(3));
        assert_eq!(idx(BoundaryMode::Mirror, -1), Some(1));
        assert_eq!(idx(BoundaryMode::Mirror, 4), Some(2));
        assert_eq!(idx(BoundaryMode::Nearest, -3), Some(0));
        assert_eq!(idx(BoundaryMode::Wrap, -1), Some(3));
        assert_eq!(idx(BoundaryMode::Constant, -1), None);
    }

    #[test]
    fn gaussian_kernel_sums_to_one() {
        let k = gaussian_kernel1d(1.0, 0, gaussian_radius(1.0, 4.0));
        assert_eq!(k.len(), 9);
        assert!((k.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn gaussian_preserves_constant_images() {
        let flat = Array2::from_elem((6, 7), 3.0);
        let out = gaussian_filter(flat.view(), 1.5, 4.0, boundary(BoundaryMode::Reflect));
        assert!(out.iter().all(|v| (v - 3.0).abs() < 1e-12));
    }

    #[test]
    fn sobel_of_horizontal_ramp() {
        let ramp = Array2::from_shape_fn((5, 5), |(_, c)| c as f64);
        let gx = sobel(ramp.view(), 1, boundary(BoundaryMode::Reflect));
        // interior: (1 + 2 + 1) * (2 - 0)
        assert_eq!(gx[[2, 2]], 8.0);
        let gy = sobel(ramp.view(), 0, boundary(BoundaryMode::Reflect));
        assert!(gy.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn laplace_of_impulse() {
        let mut impulse = Array2::zeros((3, 3));
        impulse[[1, 1]] = 1.0;
        let out = laplace(impulse.view(), boundary(BoundaryMode::Constant));
        assert_eq!(out, array![[0.0, 1.0, 0.0], [1.0, -4.0, 1.0], [0.0, 1.0, 0.0]]);
    }

    #[test]
    fn rank_filters_pick_window_order_statistics() {
        let a = array![[1.0, 2.0, 3.0], [4.0, 100.0, 6.0], [7.0, 8.0, 9.0]];
        let b = boundary(BoundaryMode::Nearest);
        assert_eq!(rank_filter(a.view(), 3, Rank::Median, b)[[1, 1]], 6.0);
        assert_eq!(rank_filter(a.view(), 3, Rank::Max, b)[[1, 1]], 100.0);
        assert_eq!(rank_filter(a.view(), 3, Rank::Min, b)[[1, 1]], 1.0);
        assert_eq!(rank_filter(a.view(), 3, Rank::Percentile(50.0), b)[[1, 1]], 6.0);
    }

    #[test]
    fn uniform_filter_averages() {
        let a = Array2::from_shape_fn((4, 4), |(r, c)| (r * 4 + c) as f64);
        let out = uniform_filter(a.view(), 3, boundary(BoundaryMode::Reflect));
        assert!((out[[1, 1]] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn gradient_magnitude_is_non_negative() {
        let a = Array2::from_shape_fn((8, 8), |(r, c)| ((r * c) as f64).sin());
        let out = gaussian_gradient_magnitude(a.view(), 1.0, 4.0, boundary(BoundaryMode::Reflect));
        assert!(out.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn axis_resolution() {
        assert_eq!(resolve_axis(-1).unwrap(), 1);
        assert_eq!(resolve_axis(0).unwrap(), 0);
        assert!(resolve_axis(2).is_err());
    }
}
