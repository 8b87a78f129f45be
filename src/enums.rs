use crate::error::CoreError;

/// One of the three indexing axes of a [`Core`](crate::volume::Core).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The two remaining axes, in ascending order, spanning the plane
    /// perpendicular to `self`.
    pub fn plane(self) -> (Axis, Axis) {
        match self {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::X, Axis::Z),
            Axis::Z => (Axis::X, Axis::Y),
        }
    }
}

impl From<Axis> for ndarray::Axis {
    fn from(axis: Axis) -> Self {
        ndarray::Axis(axis.index())
    }
}

impl TryFrom<i64> for Axis {
    type Error = CoreError;

    fn try_from(axis: i64) -> Result<Self, Self::Error> {
        match axis {
            0 => Ok(Axis::X),
            1 => Ok(Axis::Y),
            2 => Ok(Axis::Z),
            _ => Err(CoreError::InvalidAxis { axis, max: 2 }),
        }
    }
}

impl TryFrom<i32> for Axis {
    type Error = CoreError;

    fn try_from(axis: i32) -> Result<Self, Self::Error> {
        Axis::try_from(i64::from(axis))
    }
}

impl TryFrom<usize> for Axis {
    type Error = CoreError;

    fn try_from(axis: usize) -> Result<Self, Self::Error> {
        Axis::try_from(i64::try_from(axis).unwrap_or(i64::MAX))
    }
}

/// One of the two indexing axes of a [`Slice`](crate::slice::Slice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliceAxis {
    /// Axis 0, trims horizontally.
    Row,
    /// Axis 1, trims vertically.
    Column,
}

impl SliceAxis {
    pub fn index(self) -> usize {
        match self {
            SliceAxis::Row => 0,
            SliceAxis::Column => 1,
        }
    }
}

impl From<SliceAxis> for ndarray::Axis {
    fn from(axis: SliceAxis) -> Self {
        ndarray::Axis(axis.index())
    }
}

impl TryFrom<i64> for SliceAxis {
    type Error = CoreError;

    fn try_from(axis: i64) -> Result<Self, Self::Error> {
        match axis {
            0 => Ok(SliceAxis::Row),
            1 => Ok(SliceAxis::Column),
            _ => Err(CoreError::InvalidAxis { axis, max: 1 }),
        }
    }
}

impl TryFrom<i32> for SliceAxis {
    type Error = CoreError;

    fn try_from(axis: i32) -> Result<Self, Self::Error> {
        SliceAxis::try_from(i64::from(axis))
    }
}

impl TryFrom<usize> for SliceAxis {
    type Error = CoreError;

    fn try_from(axis: usize) -> Result<Self, Self::Error> {
        SliceAxis::try_from(i64::try_from(axis).unwrap_or(i64::MAX))
    }
}

/// Per-frame metadata used to order DICOM frames along the stacking axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    SliceLocation,
    ImagePositionPatient,
    InstanceNumber,
    /// Keep the order the files were given in.
    None,
}

/// Axis units used when rendering images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Units {
    #[default]
    Pixels,
    /// Scale each pixel by its physical size.
    Millimeters,
}
