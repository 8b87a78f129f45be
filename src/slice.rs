use crate::enums::SliceAxis;
use crate::error::CoreError;

use ndarray::Array2;
use ndarray::Zip;

/// A two-dimensional cross-section of a [`Core`](crate::volume::Core).
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub data: Array2<f64>,
    /// Physical size of one pixel along axis 0 and axis 1.
    pub pixel_dimensions: [f64; 2],
}

impl Slice {
    pub fn new(data: Array2<f64>, pixel_dimensions: [f64; 2]) -> Self {
        Self {
            data,
            pixel_dimensions,
        }
    }

    /// Get the dimensions of the data array (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Physical extent of the slice along each axis.
    pub fn dimensions(&self) -> (f64, f64) {
        let (rows, cols) = self.shape();
        (
            rows as f64 * self.pixel_dimensions[0],
            cols as f64 * self.pixel_dimensions[1],
        )
    }

    /// Create a new slice by trimming pixels off both ends of an axis.
    ///
    /// Keeps the pixels in `loc_start..len - loc_end`. When `loc_end` is
    /// `None` the trim is symmetric. Pixel dimensions are unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TrimOutOfRange`] if the end of the kept range
    /// would fall before its start.
    pub fn trim(
        &self,
        axis: SliceAxis,
        loc_start: usize,
        loc_end: Option<usize>,
    ) -> Result<Slice, CoreError> {
        let loc_end = loc_end.unwrap_or(loc_start);
        let len = self.data.len_of(axis.into());
        let stop = trim_stop(axis.index(), len, loc_start, loc_end)?;

        let data = self
            .data
            .slice_axis(axis.into(), ndarray::Slice::from(loc_start..stop))
            .to_owned();
        Ok(Slice::new(data, self.pixel_dimensions))
    }

    /// Replace every pixel failing `predicate` with NaN.
    pub fn filter<F>(&self, predicate: F) -> Slice
    where
        F: Fn(f64) -> bool + Sync + Send,
    {
        let data = Zip::from(&self.data)
            .par_map_collect(|&value| if predicate(value) { value } else { f64::NAN });
        Slice::new(data, self.pixel_dimensions)
    }
}

/// Exclusive end index for a trim of `loc_start`/`loc_end` elements off an
/// axis of length `len`.
pub(crate) fn trim_stop(
    axis: usize,
    len: usize,
    loc_start: usize,
    loc_end: usize,
) -> Result<usize, CoreError> {
    match len.checked_sub(loc_end) {
        Some(stop) if stop >= loc_start => Ok(stop),
        _ => Err(CoreError::TrimOutOfRange {
            axis,
            start: loc_start,
            end: loc_end,
            len,
        }),
    }
}
