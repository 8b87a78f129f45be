use thiserror::Error;

/// Errors raised by [`Core`](crate::volume::Core) and
/// [`Slice`](crate::slice::Slice) operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("axis must be a value between 0 and {max} (inclusive), got {axis}")]
    InvalidAxis { axis: i64, max: usize },

    #[error("index {index} is out of bounds for axis {axis} with length {len}")]
    IndexOutOfBounds {
        axis: usize,
        index: usize,
        len: usize,
    },

    #[error(
        "starting index exceeds ending index: trimming {start} + {end} from axis {axis} of length {len}"
    )]
    TrimOutOfRange {
        axis: usize,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("trim percentages must be finite and non-negative, got {start} and {end}")]
    InvalidPercent { start: f64, end: f64 },

    #[error("cannot trim more than 100% of an axis: {start} + {end} > 1.0")]
    TrimPercentTooLarge { start: f64, end: f64 },

    #[error("pixel dimensions must match to join cores: {other:?} != {this:?}")]
    PixelDimensionMismatch { other: [f64; 3], this: [f64; 3] },

    #[error("shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}
