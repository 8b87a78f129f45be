//! Loading DICOM datasets into a [`Core`].

use crate::{enums::SortBy, volume::Core};

use dicom::{
    object::{DefaultDicomObject, open_file},
    pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder},
};
use dicom_dictionary_std::tags;
use ndarray::{Array2, Array3, s};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("No valid DICOM images found")]
    NoValidImages,

    #[error("Inconsistent image dimensions")]
    InconsistentDimensions,

    #[error("Missing spacing information")]
    MissingSpacing,

    #[error("File does not contain {sort_by:?} in header: {}", .path.display())]
    MissingOrdering { path: PathBuf, sort_by: SortBy },

    #[error("Failed to load {} files, missing {sort_by:?}: {paths:?}", .paths.len())]
    SkippedFiles { paths: Vec<PathBuf>, sort_by: SortBy },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DICOM error in {}: {source}", .path.display())]
    Dicom {
        path: PathBuf,
        #[source]
        source: dicom::object::ReadError,
    },

    #[error("Pixel data error in {}: {source}", .path.display())]
    PixelData {
        path: PathBuf,
        #[source]
        source: dicom::pixeldata::Error,
    },
}

/// How a set of DICOM files is turned into a core.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Metadata used to order the frames.
    pub sort_by: SortBy,
    /// Skip files that cannot be read or ordered instead of failing.
    pub force: bool,
    /// Skip files whose name starts with a dot.
    pub ignore_hidden_files: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            sort_by: SortBy::default(),
            force: false,
            ignore_hidden_files: true,
        }
    }
}

struct Frame {
    order: f64,
    image: Array2<f64>,
    spacing: Option<[f64; 3]>,
}

enum FrameRead {
    Loaded(Frame),
    /// Ordering metadata was absent or unusable.
    Skipped(PathBuf),
    /// Unreadable file dropped in force mode.
    Dropped,
}

enum SortKey {
    Value(f64),
    Missing,
    NotNumeric,
}

pub struct DicomLoader;

impl DicomLoader {
    /// Load a core from a directory, treating every regular file in it as
    /// part of the dataset.
    pub fn load_from_directory(
        path: impl AsRef<Path>,
        options: &LoadOptions,
    ) -> Result<Core, ImportError> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(path.as_ref())? {
            let path = entry?.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        Self::load_from_files(&paths, options)
    }

    /// Load a core from a list of DICOM files.
    ///
    /// Frames are decoded in parallel, sorted ascending by the ordering
    /// metadata chosen in `options`, and stacked along axis 2. The pixel
    /// dimensions are `(PixelSpacing[0], PixelSpacing[1], SliceThickness)`
    /// of the first frame.
    ///
    /// # Errors
    ///
    /// Unless `options.force` is set, any unreadable file or file without
    /// ordering metadata fails the load. Fails in any mode if no frames
    /// remain, if frame extents differ or if spacing is missing.
    pub fn load_from_files(
        paths: &[impl AsRef<Path>],
        options: &LoadOptions,
    ) -> Result<Core, ImportError> {
        let paths: Vec<&Path> = paths
            .iter()
            .map(|path| path.as_ref())
            .filter(|path| !(options.ignore_hidden_files && is_hidden(path)))
            .collect();

        let reads = paths
            .par_iter()
            .enumerate()
            .map(|(position, path)| Self::read_frame(path, position, options))
            .collect::<Result<Vec<_>, _>>()?;

        let mut frames = Vec::with_capacity(reads.len());
        let mut skipped = Vec::new();
        for read in reads {
            match read {
                FrameRead::Loaded(frame) => frames.push(frame),
                FrameRead::Skipped(path) => skipped.push(path),
                FrameRead::Dropped => {}
            }
        }

        if !skipped.is_empty() {
            if !options.force {
                return Err(ImportError::SkippedFiles {
                    paths: skipped,
                    sort_by: options.sort_by,
                });
            }
            warn!(
                count = skipped.len(),
                sort_by = ?options.sort_by,
                "ignored files without ordering metadata"
            );
        }

        if frames.is_empty() {
            return Err(ImportError::NoValidImages);
        }

        frames.sort_by(|a, b| a.order.total_cmp(&b.order));
        Self::validate_dimensions(&frames)?;

        let spacing = frames[0].spacing.ok_or(ImportError::MissingSpacing)?;
        let volume_array = Self::build_volume_array(&frames);
        info!(
            frames = frames.len(),
            shape = ?volume_array.dim(),
            ?spacing,
            "loaded DICOM core"
        );

        Ok(Core::new(volume_array, spacing))
    }

    fn read_frame(
        path: &Path,
        position: usize,
        options: &LoadOptions,
    ) -> Result<FrameRead, ImportError> {
        let dicom_object = match open_file(path) {
            Ok(dicom_object) => dicom_object,
            Err(source) if options.force => {
                warn!(path = %path.display(), error = %source, "skipping unreadable file");
                return Ok(FrameRead::Dropped);
            }
            Err(source) => {
                return Err(ImportError::Dicom {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let order = match Self::get_sort_order(&dicom_object, options.sort_by, position) {
            SortKey::Value(order) => order,
            SortKey::Missing if !options.force => {
                return Err(ImportError::MissingOrdering {
                    path: path.to_path_buf(),
                    sort_by: options.sort_by,
                });
            }
            SortKey::Missing | SortKey::NotNumeric => {
                return Ok(FrameRead::Skipped(path.to_path_buf()));
            }
        };

        let image = match Self::decode_image(&dicom_object) {
            Ok(image) => image,
            Err(source) if options.force => {
                warn!(path = %path.display(), error = %source, "skipping undecodable pixel data");
                return Ok(FrameRead::Dropped);
            }
            Err(source) => {
                return Err(ImportError::PixelData {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Ok(FrameRead::Loaded(Frame {
            order,
            image,
            spacing: Self::get_spacing(&dicom_object),
        }))
    }

    fn get_sort_order(
        dicom_object: &DefaultDicomObject,
        sort_by: SortBy,
        position: usize,
    ) -> SortKey {
        let (tag, component) = match sort_by {
            SortBy::SliceLocation => (tags::SLICE_LOCATION, 0),
            SortBy::ImagePositionPatient => (tags::IMAGE_POSITION_PATIENT, 2),
            SortBy::InstanceNumber => (tags::INSTANCE_NUMBER, 0),
            SortBy::None => return SortKey::Value(position as f64),
        };

        let Ok(element) = dicom_object.element(tag) else {
            return SortKey::Missing;
        };
        match element.to_multi_float64() {
            Ok(values) => values
                .get(component)
                .copied()
                .map_or(SortKey::NotNumeric, SortKey::Value),
            Err(_) => SortKey::NotNumeric,
        }
    }

    // Stored values, without the modality rescale.
    fn decode_image(
        dicom_object: &DefaultDicomObject,
    ) -> Result<Array2<f64>, dicom::pixeldata::Error> {
        let pixel_data = dicom_object.decode_pixel_data()?;
        let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
        let array = pixel_data.to_ndarray_with_options::<f64>(&options)?;
        Ok(array.slice_move(s![0, .., .., 0]))
    }

    fn get_spacing(dicom_object: &DefaultDicomObject) -> Option<[f64; 3]> {
        let pixel_spacing = dicom_object
            .element(tags::PIXEL_SPACING)
            .ok()?
            .to_multi_float64()
            .ok()?;

        let slice_thickness = dicom_object
            .element(tags::SLICE_THICKNESS)
            .ok()?
            .to_float64()
            .ok()?;

        let spacing = [*pixel_spacing.first()?, *pixel_spacing.get(1)?, slice_thickness];
        spacing
            .iter()
            .all(|d| d.is_finite() && *d > 0.0)
            .then_some(spacing)
    }

    fn validate_dimensions(frames: &[Frame]) -> Result<(), ImportError> {
        let first_dim = frames[0].image.dim();
        if frames.iter().any(|frame| frame.image.dim() != first_dim) {
            return Err(ImportError::InconsistentDimensions);
        }
        Ok(())
    }

    fn build_volume_array(frames: &[Frame]) -> Array3<f64> {
        let (rows, columns) = frames[0].image.dim();
        let mut volume = Array3::<f64>::zeros((rows, columns, frames.len()));

        for (i, frame) in frames.iter().enumerate() {
            volume.slice_mut(s![.., .., i]).assign(&frame.image);
        }

        volume
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}
