//! Reading image data from disk and writing arrays back as images.

use std::fs;
use std::path::Path;

use image::{DynamicImage, GrayImage};
use ndarray::{Array2, Array3, ArrayD, ArrayView2};

use crate::error::{PlotError, Result};
use crate::scale::finite_range;

/// Extensions read as numeric text matrices.
const TEXT_EXTENSIONS: &[&str] = &["txt", "csv", "dat", "tsv"];

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Parse rows of whitespace- or comma-separated numbers, skipping the first
/// `skiprows` lines as well as blank and `#` comment lines.
pub fn parse_text_matrix(text: &str, skiprows: usize) -> Result<Array2<f64>> {
    let mut values = Vec::new();
    let mut cols = None;
    let mut rows = 0;

    for (lineno, line) in text.lines().enumerate().skip(skiprows) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let start = values.len();
        for token in line.split(|c: char| c.is_whitespace() || c == ',').filter(|t| !t.is_empty()) {
            let v = match token.to_lowercase().as_str() {
                "nan" => f64::NAN,
                _ => token.parse::<f64>().map_err(|e| {
                    PlotError::InvalidData(format!("line {}: '{token}': {e}", lineno + 1))
                })?,
            };
            values.push(v);
        }
        let n = values.len() - start;
        match cols {
            None => cols = Some(n),
            Some(c) if c != n => {
                return Err(PlotError::InvalidData(format!(
                    "line {} has {n} values, expected {c}",
                    lineno + 1
                )));
            }
            Some(_) => {}
        }
        rows += 1;
    }

    let cols = cols.ok_or_else(|| PlotError::InvalidData("no numeric rows found".to_string()))?;
    Array2::from_shape_vec((rows, cols), values).map_err(|e| PlotError::InvalidData(e.to_string()))
}

pub fn load_text_matrix(path: impl AsRef<Path>, skiprows: usize) -> Result<Array2<f64>> {
    parse_text_matrix(&fs::read_to_string(path)?, skiprows)
}

fn image_to_array(img: DynamicImage) -> Result<ArrayD<f64>> {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let shape_err = |e: ndarray::ShapeError| PlotError::InvalidData(e.to_string());
    if img.color().has_color() {
        let raw = img.to_rgb32f().into_raw();
        let rgb = Array3::from_shape_vec((h, w, 3), raw.into_iter().map(f64::from).collect())
            .map_err(shape_err)?;
        Ok(rgb.into_dyn())
    } else {
        let raw = img.to_luma32f().into_raw();
        let gray = Array2::from_shape_vec((h, w), raw.into_iter().map(f64::from).collect())
            .map_err(shape_err)?;
        Ok(gray.into_dyn())
    }
}

/// Load an image file or numeric text matrix.
///
/// Gray images become 2-D arrays and colour images H × W × 3 arrays, both
/// scaled to `[0, 1]`.
pub fn load_array(path: impl AsRef<Path>) -> Result<ArrayD<f64>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    log::debug!("loading {}", path.display());
    if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        return Ok(load_text_matrix(path, 0)?.into_dyn());
    }
    image_to_array(image::open(path)?)
}

/// Write a 2-D array as 8-bit grayscale, min-max scaled. NaN becomes black.
pub fn save_array_png(array: ArrayView2<f64>, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let (rows, cols) = array.dim();
    let values: Vec<f64> = array.iter().copied().collect();
    let (lo, hi) = finite_range(&values).unwrap_or((0.0, 1.0));
    let span = if hi > lo { hi - lo } else { 1.0 };

    let pixels = array
        .iter()
        .map(|v| {
            if v.is_finite() {
                ((v - lo) / span * 255.0).round().clamp(0.0, 255.0) as u8
            } else {
                0
            }
        })
        .collect();
    let img = GrayImage::from_raw(cols as u32, rows as u32, pixels)
        .ok_or_else(|| PlotError::Render("array does not fit an image buffer".to_string()))?;

    ensure_parent_dir(path)?;
    img.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whitespace_and_commas() {
        let m = parse_text_matrix("header\n1 2 3\n4,5,6\n\n# note\n7\t8 nan\n", 1).unwrap();
        assert_eq!(m.dim(), (3, 3));
        assert_eq!(m[[1, 2]], 6.0);
        assert!(m[[2, 2]].is_nan());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        assert!(parse_text_matrix("1 2\n3\n", 0).is_err());
        assert!(parse_text_matrix("a b\n", 0).is_err());
        assert!(parse_text_matrix("", 0).is_err());
    }

    #[test]
    fn png_round_trip_through_load_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ramp.png");
        let ramp = Array2::from_shape_fn((4, 6), |(r, c)| (r * 6 + c) as f64);
        save_array_png(ramp.view(), &path).unwrap();

        let loaded = load_array(&path).unwrap();
        assert_eq!(loaded.shape(), &[4, 6]);
        assert_eq!(loaded[[0, 0]], 0.0);
        assert_eq!(loaded[[3, 5]], 1.0);
    }

    #[test]
    fn text_files_load_as_matrices() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.txt");
        fs::write(&path, "1 2\n3 4\n").unwrap();
        let loaded = load_array(&path).unwrap();
        assert_eq!(loaded.shape(), &[2, 2]);
    }
}
