//! Image data model: single images, N-D stacks and image lists.
//!
//! An [`ImageSource`] is whatever the caller hands to a grid. Resolving it
//! with a [`StackSlicing`] yields the ordered list of [`ImageData`] that will
//! occupy grid cells.

mod slicing;

pub use slicing::StackSlicing;

use ndarray::{Array2, Array3, ArrayD, ArrayView2, Axis, Ix2, Ix3};

use crate::error::{PlotError, Result};

/// One displayable image.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageData {
    /// Scalar field, rows × cols
    Gray(Array2<f64>),
    /// Colour pixels, rows × cols × channels (3 or 4)
    Rgb(Array3<f64>),
}

impl ImageData {
    /// Interpret a dynamic-dimension array as a single image.
    ///
    /// 2-D arrays are gray images; 3-D arrays with a trailing axis of 3 or 4
    /// are RGB(A). Everything else is rejected.
    pub fn from_dyn(array: ArrayD<f64>) -> Result<Self> {
        ensure_non_empty(array.shape())?;
        match array.ndim() {
            2 => {
                let gray = array
                    .into_dimensionality::<Ix2>()
                    .map_err(|e| PlotError::InvalidData(e.to_string()))?;
                Ok(ImageData::Gray(gray))
            }
            3 => {
                let channels = array.shape()[2];
                if !is_colour_axis(channels) {
                    return Err(PlotError::InvalidData(format!(
                        "3-D image must have 3 or 4 colour channels in the last axis, got shape {:?}",
                        array.shape()
                    )));
                }
                let rgb = array
                    .into_dimensionality::<Ix3>()
                    .map_err(|e| PlotError::InvalidData(e.to_string()))?;
                Ok(ImageData::Rgb(rgb))
            }
            n => Err(PlotError::InvalidData(format!(
                "an image must be 2-D or 3-D RGB(A), got {n}-D array of shape {:?}",
                array.shape()
            ))),
        }
    }

    /// (rows, cols)
    pub fn dim(&self) -> (usize, usize) {
        match self {
            ImageData::Gray(a) => a.dim(),
            ImageData::Rgb(a) => {
                let (r, c, _) = a.dim();
                (r, c)
            }
        }
    }

    pub fn is_rgb(&self) -> bool {
        matches!(self, ImageData::Rgb(_))
    }

    pub fn as_gray(&self) -> Option<&Array2<f64>> {
        match self {
            ImageData::Gray(a) => Some(a),
            ImageData::Rgb(_) => None,
        }
    }

    /// Split a 3-channel RGB image into its R, G and B planes.
    pub fn rgb_channels(&self) -> Result<[Array2<f64>; 3]> {
        match self {
            ImageData::Rgb(a) if a.shape()[2] == 3 => Ok([
                a.index_axis(Axis(2), 0).to_owned(),
                a.index_axis(Axis(2), 1).to_owned(),
                a.index_axis(Axis(2), 2).to_owned(),
            ]),
            ImageData::Rgb(a) => Err(PlotError::InvalidData(format!(
                "expected exactly 3 colour channels, got {}",
                a.shape()[2]
            ))),
            ImageData::Gray(_) => Err(PlotError::InvalidData(
                "expected an RGB image with 3 channels, got a 2-D image".to_string(),
            )),
        }
    }

    /// Apply a 2-D transform; RGB images are transformed channel by channel.
    pub fn map_planes<F>(&self, mut f: F) -> Result<ImageData>
    where
        F: FnMut(ArrayView2<f64>) -> Result<Array2<f64>>,
    {
        match self {
            ImageData::Gray(a) => Ok(ImageData::Gray(f(a.view())?)),
            ImageData::Rgb(a) => {
                let mut planes = Vec::with_capacity(a.shape()[2]);
                for plane in a.axis_iter(Axis(2)) {
                    planes.push(f(plane)?);
                }
                let views: Vec<_> = planes.iter().map(|p| p.view()).collect();
                let stacked = ndarray::stack(Axis(2), &views)
                    .map_err(|e| PlotError::InvalidData(e.to_string()))?;
                Ok(ImageData::Rgb(stacked))
            }
        }
    }

    /// Finite values of the image in row-major order.
    pub fn finite_values(&self) -> Vec<f64> {
        let iter: Box<dyn Iterator<Item = &f64>> = match self {
            ImageData::Gray(a) => Box::new(a.iter()),
            ImageData::Rgb(a) => Box::new(a.iter()),
        };
        iter.copied().filter(|v| v.is_finite()).collect()
    }
}

impl From<Array2<f64>> for ImageData {
    fn from(a: Array2<f64>) -> Self {
        ImageData::Gray(a)
    }
}

impl TryFrom<Array3<f64>> for ImageData {
    type Error = PlotError;

    fn try_from(a: Array3<f64>) -> Result<Self> {
        ImageData::from_dyn(a.into_dyn())
    }
}

/// Input handed to a grid.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// A single 2-D image, 3-D gray stack or 4-D RGB stack
    Array(ArrayD<f64>),
    /// An ordered list of 2-D or RGB images, shapes may differ
    List(Vec<ArrayD<f64>>),
}

impl ImageSource {
    /// Number of images before slicing is applied.
    pub fn source_len(&self) -> usize {
        match self {
            ImageSource::Array(_) => 1,
            ImageSource::List(items) => items.len(),
        }
    }

    /// Resolve the source into the ordered images of the grid.
    pub fn resolve(&self, slicing: &StackSlicing) -> Result<Vec<ImageData>> {
        match self {
            ImageSource::Array(array) => resolve_array(array, slicing),
            ImageSource::List(items) => {
                if items.is_empty() {
                    return Err(PlotError::InvalidData(
                        "image list must not be empty".to_string(),
                    ));
                }
                if !slicing.is_default() {
                    log::debug!("slicing options ignored for an image list");
                }
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        ImageData::from_dyn(item.clone()).map_err(|e| {
                            PlotError::InvalidData(format!("list element {i}: {e}"))
                        })
                    })
                    .collect()
            }
        }
    }
}

impl From<Array2<f64>> for ImageSource {
    fn from(a: Array2<f64>) -> Self {
        ImageSource::Array(a.into_dyn())
    }
}

impl From<Array3<f64>> for ImageSource {
    fn from(a: Array3<f64>) -> Self {
        ImageSource::Array(a.into_dyn())
    }
}

impl From<ndarray::Array4<f64>> for ImageSource {
    fn from(a: ndarray::Array4<f64>) -> Self {
        ImageSource::Array(a.into_dyn())
    }
}

impl From<ArrayD<f64>> for ImageSource {
    fn from(a: ArrayD<f64>) -> Self {
        ImageSource::Array(a)
    }
}

impl From<Vec<Array2<f64>>> for ImageSource {
    fn from(items: Vec<Array2<f64>>) -> Self {
        ImageSource::List(items.into_iter().map(|a| a.into_dyn()).collect())
    }
}

impl From<Vec<ArrayD<f64>>> for ImageSource {
    fn from(items: Vec<ArrayD<f64>>) -> Self {
        ImageSource::List(items)
    }
}

fn is_colour_axis(extent: usize) -> bool {
    extent == 3 || extent == 4
}

/// Every axis must have at least one element.
pub(crate) fn ensure_non_empty(shape: &[usize]) -> Result<()> {
    if shape.contains(&0) {
        return Err(PlotError::InvalidData(format!(
            "image data has an empty axis, shape {shape:?}"
        )));
    }
    Ok(())
}

fn resolve_array(array: &ArrayD<f64>, slicing: &StackSlicing) -> Result<Vec<ImageData>> {
    ensure_non_empty(array.shape())?;
    match array.ndim() {
        2 => {
            if !slicing.is_default() {
                log::debug!("slicing options ignored for a 2-D image");
            }
            Ok(vec![ImageData::from_dyn(array.clone())?])
        }
        3 => {
            let axis = slicing.resolve_axis(array.ndim(), -1)?;
            slicing
                .indices(array.shape()[axis])?
                .into_iter()
                .map(|i| ImageData::from_dyn(array.index_axis(Axis(axis), i).to_owned()))
                .collect()
        }
        4 => {
            let channels = array.shape()[3];
            if !is_colour_axis(channels) {
                return Err(PlotError::InvalidData(format!(
                    "4-D stacks must have 3 or 4 colour channels in the last axis, got shape {:?}",
                    array.shape()
                )));
            }
            let axis = slicing.resolve_axis(array.ndim(), 0)?;
            slicing
                .indices(array.shape()[axis])?
                .into_iter()
                .map(|i| {
                    let slice = array.index_axis(Axis(axis), i).to_owned();
                    ImageData::from_dyn(slice).map_err(|e| {
                        PlotError::InvalidData(format!(
                            "slicing axis {axis} of a 4-D stack must leave RGB(A) images: {e}"
                        ))
                    })
                })
                .collect()
        }
        n => Err(PlotError::InvalidData(format!(
            "image data must be 2-D, 3-D or 4-D, got {n}-D array of shape {:?}",
            array.shape()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, Array4, IxDyn, s};

    fn ramp(shape: &[usize]) -> ArrayD<f64> {
        let n: usize = shape.iter().product();
        Array::from_shape_vec(IxDyn(shape), (0..n).map(|v| v as f64).collect()).unwrap()
    }

    #[test]
    fn stack_sliced_along_last_axis_by_default() {
        let stack = ramp(&[4, 5, 6]);
        let images = ImageSource::Array(stack.clone())
            .resolve(&StackSlicing::default())
            .unwrap();
        assert_eq!(images.len(), 6);
        let expected = stack.slice(s![.., .., 2]).to_owned();
        assert_eq!(images[2], ImageData::Gray(expected.into_dimensionality().unwrap()));
    }

    #[test]
    fn rgb_stack_sliced_along_first_axis() {
        let stack: Array4<f64> = Array4::zeros((5, 8, 8, 3));
        let images = ImageSource::from(stack).resolve(&StackSlicing::default()).unwrap();
        assert_eq!(images.len(), 5);
        assert!(images.iter().all(ImageData::is_rgb));
    }

    #[test]
    fn rejects_bad_channel_counts() {
        let bad = ImageSource::Array(ramp(&[6, 5, 5, 5]));
        assert!(bad.resolve(&StackSlicing::default()).is_err());

        let list = ImageSource::List(vec![ramp(&[5, 5]), ramp(&[5, 5, 6])]);
        assert!(list.resolve(&StackSlicing::default()).is_err());

        let nested = ImageSource::List(vec![ramp(&[5, 5]), ramp(&[2, 5, 5, 3])]);
        assert!(nested.resolve(&StackSlicing::default()).is_err());
    }

    #[test]
    fn rejects_empty_axes() {
        let shapes: [&[usize]; 6] = [&[0, 4], &[4, 0], &[0, 4, 3], &[4, 0, 3], &[4, 4, 0], &[0, 4, 4, 3]];
        for shape in shapes {
            let source = ImageSource::Array(ramp(shape));
            assert!(
                matches!(source.resolve(&StackSlicing::default()), Err(PlotError::InvalidData(_))),
                "shape {shape:?}"
            );
        }
        let list = ImageSource::List(vec![ramp(&[3, 3]), ramp(&[0, 3])]);
        assert!(list.resolve(&StackSlicing::default()).is_err());
        assert!(ImageData::from_dyn(ramp(&[2, 0, 3])).is_err());
    }

    #[test]
    fn rejects_high_dimensional_arrays() {
        let five = ImageSource::Array(ramp(&[2, 2, 2, 2, 2]));
        assert!(matches!(
            five.resolve(&StackSlicing::default()),
            Err(PlotError::InvalidData(_))
        ));
    }

    #[test]
    fn mixed_list_keeps_order_and_kind() {
        let list = ImageSource::List(vec![ramp(&[4, 4, 3]), ramp(&[6, 7]), ramp(&[4, 4, 4])]);
        let images = list.resolve(&StackSlicing::default()).unwrap();
        assert_eq!(images.len(), 3);
        assert!(images[0].is_rgb());
        assert_eq!(images[1].dim(), (6, 7));
        assert!(images[2].is_rgb());
    }

    #[test]
    fn empty_list_is_rejected() {
        assert!(ImageSource::List(vec![]).resolve(&StackSlicing::default()).is_err());
    }

    #[test]
    fn rgb_channels_require_three_planes() {
        let rgba = ImageData::from_dyn(ramp(&[3, 3, 4])).unwrap();
        assert!(rgba.rgb_channels().is_err());

        let rgb = ImageData::from_dyn(ramp(&[3, 3, 3])).unwrap();
        let [r, g, b] = rgb.rgb_channels().unwrap();
        assert_eq!(r[[0, 0]], 0.0);
        assert_eq!(g[[0, 0]], 1.0);
        assert_eq!(b[[0, 0]], 2.0);
    }

    #[test]
    fn map_planes_transforms_each_channel() {
        let rgb = ImageData::from_dyn(ramp(&[2, 2, 3])).unwrap();
        let doubled = rgb.map_planes(|p| Ok(p.mapv(|v| v * 2.0))).unwrap();
        match doubled {
            ImageData::Rgb(a) => assert_eq!(a[[1, 1, 2]], 22.0),
            ImageData::Gray(_) => panic!("expected rgb"),
        }
    }
}
