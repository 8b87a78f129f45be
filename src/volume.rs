use crate::enums::Axis;
use crate::error::CoreError;
use crate::slice::{Slice, trim_stop};

use ndarray::Array3;
use ndarray::ArrayBase;
use ndarray::ArrayView3;
use ndarray::Data;
use ndarray::Ix3;
use ndarray::Zip;
use ndarray::concatenate;
use rayon::prelude::*;
use tracing::debug;

/// A CT scan of a rock core.
///
/// `data` holds one brightness value per voxel, NaN marking voxels with no
/// data. `pixel_dimensions[i]` is the physical size of one voxel along
/// whatever data currently occupies axis `i`. Every transform returns a new
/// `Core` backed by its own array.
#[derive(Debug, Clone, PartialEq)]
pub struct Core {
    pub data: Array3<f64>,
    pub pixel_dimensions: [f64; 3],
}

impl Default for Core {
    fn default() -> Self {
        Self::from(Array3::zeros((0, 0, 0)))
    }
}

impl From<Array3<f64>> for Core {
    /// Core with unit voxel dimensions.
    fn from(data: Array3<f64>) -> Self {
        Self::new(data, [1.0, 1.0, 1.0])
    }
}

impl Core {
    pub fn new(data: Array3<f64>, pixel_dimensions: [f64; 3]) -> Self {
        Self {
            data,
            pixel_dimensions,
        }
    }

    /// Build a core from any numeric 3D array, e.g. raw `u16` frames.
    pub fn from_elements<S, T>(data: &ArrayBase<S, Ix3>, pixel_dimensions: [f64; 3]) -> Self
    where
        S: Data<Elem = T>,
        T: Copy + Into<f64>,
    {
        Self::new(data.mapv(Into::into), pixel_dimensions)
    }

    /// Build a core from a flat buffer in row-major order.
    pub fn from_shape_vec(
        shape: (usize, usize, usize),
        values: Vec<f64>,
        pixel_dimensions: [f64; 3],
    ) -> Result<Self, CoreError> {
        Ok(Self::new(
            Array3::from_shape_vec(shape, values)?,
            pixel_dimensions,
        ))
    }

    fn with_data(&self, data: Array3<f64>) -> Self {
        Self::new(data, self.pixel_dimensions)
    }

    /// Get the extents of the volume along axis 0, 1 and 2
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Physical size of the whole volume along each axis.
    pub fn dimensions(&self) -> (f64, f64, f64) {
        let (x, y, z) = self.shape();
        let [dx, dy, dz] = self.pixel_dimensions;
        (x as f64 * dx, y as f64 * dy, z as f64 * dz)
    }

    /// Physical volume occupied by voxels that hold data (NaN excluded).
    pub fn volume(&self) -> f64 {
        let present = self.data.par_iter().filter(|value| !value.is_nan()).count();
        let [dx, dy, dz] = self.pixel_dimensions;
        present as f64 * (dx * dy * dz)
    }

    /// Get the cross-section at `loc` along `axis`.
    ///
    /// The remaining axes keep their relative order, and the slice takes the
    /// matching pair of pixel dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IndexOutOfBounds`] if `loc` is past the end of
    /// `axis`.
    pub fn slice(&self, axis: Axis, loc: usize) -> Result<Slice, CoreError> {
        let len = self.data.len_of(axis.into());
        if loc >= len {
            return Err(CoreError::IndexOutOfBounds {
                axis: axis.index(),
                index: loc,
                len,
            });
        }

        let (a, b) = axis.plane();
        let data = self
            .data
            .index_axis(axis.into(), loc)
            .as_standard_layout()
            .into_owned();
        Ok(Slice::new(
            data,
            [
                self.pixel_dimensions[a.index()],
                self.pixel_dimensions[b.index()],
            ],
        ))
    }

    /// Remove `loc_start` voxels from the start and `loc_end` voxels from the
    /// end of `axis`. The trim is symmetric when `loc_end` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TrimOutOfRange`] if more than the whole axis
    /// would be trimmed.
    pub fn trim(
        &self,
        axis: Axis,
        loc_start: usize,
        loc_end: Option<usize>,
    ) -> Result<Core, CoreError> {
        let loc_end = loc_end.unwrap_or(loc_start);
        let len = self.data.len_of(axis.into());
        let stop = trim_stop(axis.index(), len, loc_start, loc_end)?;

        let view = self
            .data
            .slice_axis(axis.into(), ndarray::Slice::from(loc_start..stop));
        Ok(self.with_data(owned(view)))
    }

    /// Like [`Core::trim`], with amounts given as fractions of the axis
    /// length. Pixel counts are truncated toward zero.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPercent`] for negative or non-finite
    /// fractions and [`CoreError::TrimPercentTooLarge`] if they sum above 1.
    pub fn trim_by_percent(
        &self,
        axis: Axis,
        percent_start: f64,
        percent_end: Option<f64>,
    ) -> Result<Core, CoreError> {
        let percent_end = percent_end.unwrap_or(percent_start);
        let valid = |p: f64| p.is_finite() && p >= 0.0;
        if !valid(percent_start) || !valid(percent_end) {
            return Err(CoreError::InvalidPercent {
                start: percent_start,
                end: percent_end,
            });
        }
        if percent_start + percent_end > 1.0 {
            return Err(CoreError::TrimPercentTooLarge {
                start: percent_start,
                end: percent_end,
            });
        }

        let len = self.data.len_of(axis.into()) as f64;
        let loc_start = (len * percent_start) as usize;
        let loc_end = (len * percent_end) as usize;
        self.trim(axis, loc_start, Some(loc_end))
    }

    /// Cut a cylinder of `radius` (physical units) around `axis` out of the
    /// core. Voxels farther than `radius` from the cylinder axis become NaN;
    /// voxels at exactly `radius` are kept.
    ///
    /// `center` gives the cylinder position per axis in voxels; missing
    /// entries default to the middle of that axis and the entry for `axis`
    /// itself is ignored. The result is cropped to the bounding box of the
    /// cylinder on the two other axes.
    pub fn trim_radial(&self, axis: Axis, radius: f64, center: [Option<usize>; 3]) -> Core {
        let (a, b) = axis.plane();
        let shape = self.data.shape();
        let [dim_a, dim_b] = [
            self.pixel_dimensions[a.index()],
            self.pixel_dimensions[b.index()],
        ];
        let center_a = center[a.index()].unwrap_or(shape[a.index()] / 2);
        let center_b = center[b.index()].unwrap_or(shape[b.index()] / 2);

        let range_a = crop_range(center_a, (radius / dim_a) as i64, shape[a.index()]);
        let range_b = crop_range(center_b, (radius / dim_b) as i64, shape[b.index()]);
        debug!(
            ?axis,
            radius,
            ?range_a,
            ?range_b,
            "cropping core to cylinder bounding box"
        );

        let local_a = center_a as f64 - range_a.start as f64;
        let local_b = center_b as f64 - range_b.start as f64;

        let mut cropped = self.data.view();
        cropped.slice_axis_inplace(a.into(), ndarray::Slice::from(range_a));
        cropped.slice_axis_inplace(b.into(), ndarray::Slice::from(range_b));
        let mut data = owned(cropped);

        Zip::indexed(&mut data).par_for_each(|(i, j, k), value| {
            let index = [i, j, k];
            let offset_a = (index[a.index()] as f64 - local_a) * dim_a;
            let offset_b = (index[b.index()] as f64 - local_b) * dim_b;
            if offset_a.hypot(offset_b) > radius {
                *value = f64::NAN;
            }
        });

        self.with_data(data)
    }

    /// Exchange two axes, along with their pixel dimensions.
    pub fn swapaxes(&self, axis1: Axis, axis2: Axis) -> Core {
        let mut view = self.data.view();
        view.swap_axes(axis1.index(), axis2.index());

        let mut pixel_dimensions = self.pixel_dimensions;
        pixel_dimensions.swap(axis1.index(), axis2.index());
        Core::new(owned(view), pixel_dimensions)
    }

    /// Reverse the order of voxels along `axis`.
    pub fn flip(&self, axis: Axis) -> Core {
        let mut view = self.data.view();
        view.invert_axis(axis.into());
        self.with_data(owned(view))
    }

    /// Rotate the core `k` quarter turns about `axis`, counter-clockwise
    /// unless `clockwise` is set.
    ///
    /// The rotation happens in the plane of the two other axes, turning the
    /// first of them towards the second. An odd number of net quarter turns
    /// swaps the pixel dimensions of the plane.
    pub fn rotate(&self, axis: Axis, k: i64, clockwise: bool) -> Core {
        let (a, b) = axis.plane();
        let turns = k.rem_euclid(4);
        let turns = if clockwise { (4 - turns) % 4 } else { turns };

        let mut view = self.data.view();
        match turns {
            1 => {
                view.invert_axis(b.into());
                view.swap_axes(a.index(), b.index());
            }
            2 => {
                view.invert_axis(a.into());
                view.invert_axis(b.into());
            }
            3 => {
                view.swap_axes(a.index(), b.index());
                view.invert_axis(b.into());
            }
            _ => {}
        }

        let mut pixel_dimensions = self.pixel_dimensions;
        if turns % 2 == 1 {
            pixel_dimensions.swap(a.index(), b.index());
        }
        debug!(?axis, turns, ?pixel_dimensions, "rotated core");
        Core::new(owned(view), pixel_dimensions)
    }

    /// Copy out the box `start[i]..end[i]` on every axis.
    ///
    /// An `end` of `None` runs to the end of the axis. Reversed bounds are
    /// swapped and bounds past the end of an axis are clamped.
    pub fn chunk(&self, start: [usize; 3], end: [Option<usize>; 3]) -> Core {
        let shape = self.data.shape();
        let mut view = self.data.view();
        for axis in Axis::ALL {
            let i = axis.index();
            let (mut lo, mut hi) = (start[i], end[i].unwrap_or(shape[i]));
            if hi < lo {
                std::mem::swap(&mut lo, &mut hi);
            }
            let hi = hi.min(shape[i]);
            let lo = lo.min(hi);
            view.slice_axis_inplace(axis.into(), ndarray::Slice::from(lo..hi));
        }
        self.with_data(owned(view))
    }

    /// Replace every voxel failing `predicate` with NaN.
    pub fn filter<F>(&self, predicate: F) -> Core
    where
        F: Fn(f64) -> bool + Sync + Send,
    {
        let data = Zip::from(&self.data)
            .par_map_collect(|&value| if predicate(value) { value } else { f64::NAN });
        self.with_data(data)
    }

    /// Append `other` to the end of this core along `axis`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PixelDimensionMismatch`] unless both cores have
    /// identical pixel dimensions, and [`CoreError::Shape`] if their extents
    /// differ on any other axis.
    pub fn join(&self, other: &Core, axis: Axis) -> Result<Core, CoreError> {
        if other.pixel_dimensions != self.pixel_dimensions {
            return Err(CoreError::PixelDimensionMismatch {
                other: other.pixel_dimensions,
                this: self.pixel_dimensions,
            });
        }

        let data = concatenate(axis.into(), &[self.data.view(), other.data.view()])?;
        debug!(?axis, shape = ?data.dim(), "joined cores");
        Ok(self.with_data(data))
    }
}

/// Inclusive window `center ± reach` clamped to `0..len`, as a half-open
/// range.
fn crop_range(center: usize, reach: i64, len: usize) -> std::ops::Range<usize> {
    let center = center as i64;
    let len = len as i64;
    let lo = center.saturating_sub(reach).clamp(0, len);
    let hi = center.saturating_add(reach).saturating_add(1).clamp(lo, len);
    lo as usize..hi as usize
}

fn owned(view: ArrayView3<'_, f64>) -> Array3<f64> {
    view.as_standard_layout().into_owned()
}
