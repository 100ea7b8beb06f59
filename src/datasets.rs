//! Sample images fetched on demand into a local, checksummed cache.

use std::env;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use ndarray::{Array2, Array3, ArrayD, Axis};
use ndarray_npy::ReadNpyExt;
use sha2::{Digest, Sha256};
use tiff::decoder::{Decoder, DecodingResult};

use crate::data::ImageSource;
use crate::error::{PlotError, Result};
use crate::io::{ensure_parent_dir, load_text_matrix};

const BASE_URL: &str = "https://github.com/SarthakJariwala/seaborn-image/raw/master/data/";

/// Remote files and their SHA-256 digests.
const REGISTRY: &[(&str, &str)] = &[
    (
        "PolymerImage.txt",
        "7b6798865080adf3ecf11e342f3d86d7b52ea0700020a1f062544ee825fb8a0e",
    ),
    (
        "Perovskite.txt",
        "3228eeade5afec3c2b1ed116b2d4fe35877224d2d9bf7b4a17e04a432e6135c5",
    ),
    (
        "cells.tif",
        "2120cfe08e0396324793a10a905c9bbcb64b117215eb63b2c24b643e1600c8c9",
    ),
    (
        "cifar10.npy",
        "c0a12085b3b82f4a6d1f95e609a40701648a137eb9ff1fb5751071f54cc8e05c",
    ),
];

/// Dataset names accepted by [`load_image`].
pub const DATASETS: &[&str] = &[
    "polymer",
    "polymer outliers",
    "fluorescence",
    "cells",
    "cifar10",
    "cifar10 list",
];

/// Where fetched files are kept.
pub fn cache_dir() -> PathBuf {
    if let Some(dir) = env::var_os("IMAGEGRID_DATA_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(dir) = env::var_os("XDG_CACHE_HOME") {
        return PathBuf::from(dir).join("imagegrid");
    }
    match env::var_os("HOME").or_else(|| env::var_os("USERPROFILE")) {
        Some(home) => PathBuf::from(home).join(".cache").join("imagegrid"),
        None => env::temp_dir().join("imagegrid"),
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn registry_hash(file: &str) -> Result<&'static str> {
    REGISTRY
        .iter()
        .find(|(name, _)| *name == file)
        .map(|(_, hash)| *hash)
        .ok_or_else(|| PlotError::UnknownDataset {
            name: file.to_string(),
            available: REGISTRY.iter().map(|(n, _)| *n).collect::<Vec<_>>().join(", "),
        })
}

/// Whether `path` exists and matches `expected`.
fn is_cached(path: &Path, expected: &str) -> bool {
    match fs::read(path) {
        Ok(bytes) => {
            let actual = sha256_hex(&bytes);
            if actual != expected {
                log::warn!("cached {} is stale, fetching again", path.display());
            }
            actual == expected
        }
        Err(_) => false,
    }
}

/// Path to `file` in `dir`, downloading it when missing or corrupt.
pub fn fetch_into(file: &str, dir: &Path) -> Result<PathBuf> {
    let expected = registry_hash(file)?;
    let path = dir.join(file);
    if is_cached(&path, expected) {
        log::debug!("using cached {}", path.display());
        return Ok(path);
    }

    let url = format!("{BASE_URL}{file}");
    log::info!("downloading {url}");
    let bytes = reqwest::blocking::get(&url)?.error_for_status()?.bytes()?;

    let actual = sha256_hex(&bytes);
    if actual != expected {
        return Err(PlotError::Checksum {
            file: file.to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    ensure_parent_dir(&path)?;
    fs::write(&path, &bytes)?;
    Ok(path)
}

pub fn fetch(file: &str) -> Result<PathBuf> {
    fetch_into(file, &cache_dir())
}

/// Load a sample dataset by name.
///
/// `polymer`, `polymer outliers` and `fluorescence` are 2-D images, `cells`
/// is a 3-D stack whose pages lie along the last axis, `cifar10` is an
/// N × 32 × 32 × 3 RGB stack and `cifar10 list` the same images as a list.
pub fn load_image(name: &str) -> Result<ImageSource> {
    match name {
        "polymer" => Ok(polymer()?.into()),
        "polymer outliers" => {
            let mut img = polymer()?;
            if let Some(px) = img.get_mut([25, 25]) {
                *px = 80.0;
            }
            Ok(img.into())
        }
        "fluorescence" => Ok(load_text_matrix(fetch("Perovskite.txt")?, 0)?.into()),
        "cells" => Ok(cells()?.into()),
        "cifar10" => Ok(ImageSource::Array(cifar10()?)),
        "cifar10 list" => {
            let stack = cifar10()?;
            Ok(ImageSource::List(
                stack.axis_iter(Axis(0)).map(|img| img.to_owned()).collect(),
            ))
        }
        other => Err(PlotError::UnknownDataset {
            name: other.to_string(),
            available: DATASETS.join(", "),
        }),
    }
}

/// Height map in nanometres.
fn polymer() -> Result<Array2<f64>> {
    let metres = load_text_matrix(fetch("PolymerImage.txt")?, 1)?;
    Ok(metres * 1e9)
}

fn cells() -> Result<Array3<f64>> {
    let bytes = fs::read(fetch("cells.tif")?)?;
    decode_tiff_stack(&bytes)
}

fn cifar10() -> Result<ArrayD<f64>> {
    let bytes = fs::read(fetch("cifar10.npy")?)?;
    decode_npy(&bytes)
}

fn samples_to_f64(result: DecodingResult) -> Result<Vec<f64>> {
    Ok(match result {
        DecodingResult::U8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F64(v) => v,
        _ => {
            return Err(PlotError::InvalidData(
                "unsupported TIFF sample format".to_string(),
            ));
        }
    })
}

/// Decode every page of a grayscale TIFF into a width × height × pages
/// stack, so slicing the last axis yields one page per cell.
pub fn decode_tiff_stack(bytes: &[u8]) -> Result<Array3<f64>> {
    let mut decoder = Decoder::new(Cursor::new(bytes))?;
    let (width, height) = decoder.dimensions()?;
    let page_len = width as usize * height as usize;

    let mut samples = Vec::new();
    let mut pages = 0;
    loop {
        let page = decoder.dimensions()?;
        if page != (width, height) {
            return Err(PlotError::InvalidData(format!(
                "TIFF page {pages} is {}x{}, expected {width}x{height}",
                page.0, page.1
            )));
        }
        let values = samples_to_f64(decoder.read_image()?)?;
        if values.len() != page_len {
            return Err(PlotError::InvalidData(format!(
                "TIFF page {pages} has {} samples, expected {page_len} for a grayscale page",
                values.len()
            )));
        }
        samples.extend(values);
        pages += 1;
        if !decoder.more_images() {
            break;
        }
        decoder.next_image()?;
    }
    log::debug!("decoded {pages} TIFF pages of {width}x{height}");

    let stack = Array3::from_shape_vec((pages, height as usize, width as usize), samples)
        .map_err(|e| PlotError::InvalidData(e.to_string()))?;
    Ok(stack.reversed_axes())
}

/// Decode a `.npy` array of `u8`, `f32` or `f64` values.
pub fn decode_npy(bytes: &[u8]) -> Result<ArrayD<f64>> {
    if let Ok(array) = ArrayD::<u8>::read_npy(bytes) {
        return Ok(array.mapv(f64::from));
    }
    if let Ok(array) = ArrayD::<f32>::read_npy(bytes) {
        return Ok(array.mapv(f64::from));
    }
    Ok(ArrayD::<f64>::read_npy(bytes)?)
}
