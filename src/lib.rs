//! # core-ct
//!
//! This crate serves a high-level API for manipulating CT scans of
//! cylindrical rock cores.
//!
//! A scan is held in a [`Core`]: a 3D grid of brightness values together
//! with the physical size of one voxel along each axis. Cores can be
//! sliced, trimmed, cut down to a cylinder, rotated, flipped, chunked,
//! filtered and joined. Every operation returns a new [`Core`] and keeps
//! the voxel dimensions in step with the axes they describe. Voxels
//! without data are NaN.
//!
//! Cross-sections are returned as a [`Slice`], which can be trimmed,
//! filtered, summarised with [`brightness_trace`] and rendered to an image
//! with the [`visualize`] module.
//!
//! Cores are usually loaded from a DICOM dataset with [`DicomLoader`].
//! Frames are decoded in parallel using rayon, sorted by their slice
//! location and stacked along axis 2.
//!
//! # Examples
//!
//! ## Loading a scan and inspecting its brightness
//!
//! Load every file in the scans/ directory, cut a 25mm radius cylinder
//! around the z axis and trace the brightness of a slice through its
//! middle.
//!
//! ```no_run
//! # use core_ct::{Axis, DicomLoader, LoadOptions, brightness_trace};
//! let core = DicomLoader::load_from_directory("scans", &LoadOptions::default())
//!     .expect("should have loaded files from directory");
//! let cylinder = core.trim_radial(Axis::Z, 25.0, [None; 3]);
//! let slice = cylinder
//!     .slice(Axis::X, cylinder.shape().0 / 2)
//!     .expect("should have returned slice at center of core");
//! let trace = brightness_trace(&slice);
//! println!("{:?}", trace.mean);
//! ```
//!
//! ## Reorienting a scan
//!
//! ```
//! # use core_ct::{Axis, Core};
//! # use ndarray::Array3;
//! let core = Core::new(Array3::zeros((2, 4, 8)), [2.0, 4.0, 8.0]);
//! let rotated = core.rotate(Axis::Z, 1, false);
//! assert_eq!(rotated.shape(), (4, 2, 8));
//! assert_eq!(rotated.pixel_dimensions, [4.0, 2.0, 8.0]);
//! ```

pub mod analysis;
pub mod enums;
pub mod error;
pub mod importers;
pub mod slice;
pub mod visualize;
pub mod volume;

pub use analysis::{BrightnessTrace, TraceRow, brightness_trace};
pub use enums::{Axis, SliceAxis, SortBy, Units};
pub use error::CoreError;
pub use importers::{DicomLoader, ImportError, LoadOptions};
pub use slice::Slice;
pub use visualize::RenderError;
pub use volume::Core;
