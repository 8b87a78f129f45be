//! Quantitative analysis of core slices.

use crate::slice::Slice;

use ndarray::Array1;
use ndarray::Axis;

/// Per-row brightness statistics of a [`Slice`], in row order.
#[derive(Debug, Clone, PartialEq)]
pub struct BrightnessTrace {
    pub mean: Array1<f64>,
    /// Population standard deviation.
    pub stddev: Array1<f64>,
}

/// One row of a [`BrightnessTrace`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceRow {
    pub mean: f64,
    pub stddev: f64,
}

impl BrightnessTrace {
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<TraceRow> {
        Some(TraceRow {
            mean: *self.mean.get(index)?,
            stddev: *self.stddev.get(index)?,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = TraceRow> + '_ {
        self.mean
            .iter()
            .zip(self.stddev.iter())
            .map(|(&mean, &stddev)| TraceRow { mean, stddev })
    }
}

/// Compute the mean brightness and its standard deviation for each row of
/// a slice.
///
/// NaN values are not skipped; a row containing NaN yields NaN statistics.
pub fn brightness_trace(slice: &Slice) -> BrightnessTrace {
    let (rows, _) = slice.shape();
    let mean = slice
        .data
        .mean_axis(Axis(1))
        .unwrap_or_else(|| Array1::from_elem(rows, f64::NAN));
    let stddev = slice.data.std_axis(Axis(1), 0.0);
    BrightnessTrace { mean, stddev }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn trace_of_three_rows() {
        let slice = Slice::new(
            array![
                [1.0, 2.0, 3.0, 4.0, 5.0],
                [6.0, 7.0, 8.0, 9.0, 10.0],
                [11.0, 12.0, 13.0, 14.0, 15.0]
            ],
            [1.0, 1.0],
        );

        let trace = brightness_trace(&slice);
        assert_eq!(trace.len(), 3);
        assert_eq!(trace.mean, array![3.0, 8.0, 13.0]);
        for row in trace.rows() {
            assert!(close(row.stddev, 2.0_f64.sqrt()));
        }
        assert!(trace.row(3).is_none());
    }

    #[test]
    fn nan_propagates_into_its_row() {
        let slice = Slice::new(array![[1.0, f64::NAN], [2.0, 4.0]], [1.0, 1.0]);
        let trace = brightness_trace(&slice);

        let first = trace.row(0).unwrap();
        assert!(first.mean.is_nan());
        assert!(first.stddev.is_nan());

        let second = trace.row(1).unwrap();
        assert_eq!(second.mean, 3.0);
        assert!(close(second.stddev, 1.0));
    }

    #[test]
    fn empty_rows() {
        let slice = Slice::new(Array2::zeros((2, 0)), [1.0, 1.0]);
        let trace = brightness_trace(&slice);
        assert_eq!(trace.len(), 2);
        assert!(trace.mean.iter().all(|m| m.is_nan()));

        let slice = Slice::new(Array2::zeros((0, 3)), [1.0, 1.0]);
        assert!(brightness_trace(&slice).is_empty());
    }
}
