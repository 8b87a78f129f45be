//! Rendering cores and slices to images.

use crate::analysis::brightness_trace;
use crate::enums::{Axis, SliceAxis, Units};
use crate::error::CoreError;
use crate::slice::{Slice, trim_stop};
use crate::volume::Core;

use image::DynamicImage;
use image::GrayImage;
use image::ImageBuffer;
use image::Luma;
use image::Rgb;
use image::RgbImage;
use image::imageops::{self, FilterType};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

const GAP: u32 = 8;
const PLOT_WIDTH: u32 = 128;
const TRIM_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const MEAN_COLOR: Rgb<u8> = Rgb([80, 200, 120]);
const STDDEV_COLOR: Rgb<u8> = Rgb([240, 160, 40]);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Lowest and highest finite value, ignoring NaN and infinities.
fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |range, v| match range {
            None => Some((v, v)),
            Some((low, high)) => Some((low.min(v), high.max(v))),
        })
}

#[inline]
fn normalize_to_u8(value: f64, low: f64, high: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    if high <= low {
        return 128;
    }
    ((value - low) / (high - low) * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Output size of a `rows` x `columns` slice, scaled by pixel size when
/// rendering in physical units. Returned as (width, height).
///
/// Falls back to pixel units when a pixel dimension is not a positive
/// finite number or the scaled image would not fit in `u32` extents.
fn output_size(
    rows: usize,
    columns: usize,
    pixel_dimensions: [f64; 2],
    units: Units,
) -> (u32, u32) {
    let pixels = (columns as u32, rows as u32);
    if units == Units::Pixels {
        return pixels;
    }

    if !pixel_dimensions.iter().all(|d| d.is_finite() && *d > 0.0) {
        warn!(?pixel_dimensions, "invalid pixel dimensions, rendering in pixels");
        return pixels;
    }
    let unit = pixel_dimensions[0].min(pixel_dimensions[1]);
    let height = (rows as f64 * pixel_dimensions[0] / unit).round();
    let width = (columns as f64 * pixel_dimensions[1] / unit).round();
    if !(width <= f64::from(u32::MAX) && height <= f64::from(u32::MAX)) {
        warn!(?pixel_dimensions, "scaled slice too large, rendering in pixels");
        return pixels;
    }
    (width as u32, height as u32)
}

/// Render a slice as a grayscale image, windowed over its finite values.
/// Missing pixels are black.
pub fn render_slice(slice: &Slice, units: Units) -> GrayImage {
    let (rows, columns) = slice.shape();
    let (low, high) = finite_range(slice.data.iter().copied()).unwrap_or((0.0, 0.0));

    let image = ImageBuffer::from_fn(columns as u32, rows as u32, |x, y| {
        Luma([normalize_to_u8(
            slice.data[[y as usize, x as usize]],
            low,
            high,
        )])
    });

    let (width, height) = output_size(rows, columns, slice.pixel_dimensions, units);
    if width == 0 || height == 0 || (width, height) == image.dimensions() {
        return image;
    }
    imageops::resize(&image, width, height, FilterType::Nearest)
}

fn to_rgb(image: GrayImage) -> RgbImage {
    DynamicImage::ImageLuma8(image).to_rgb8()
}

/// Orthogonal view of a core: the cross-sections through the middle of
/// axis 0, 1 and 2, left to right.
pub fn render_core(core: &Core, units: Units) -> Result<RgbImage, RenderError> {
    let shape = core.data.shape();
    let views = Axis::ALL
        .iter()
        .map(|&axis| {
            let slice = core.slice(axis, shape[axis.index()] / 2)?;
            Ok(render_slice(&slice, units))
        })
        .collect::<Result<Vec<_>, CoreError>>()?;

    let width = views.iter().map(|view| view.width()).sum::<u32>() + GAP * 2;
    let height = views.iter().map(|view| view.height()).max().unwrap_or(0);
    let mut canvas = RgbImage::new(width, height);

    let mut x = 0;
    for view in views {
        let view_width = view.width();
        imageops::overlay(&mut canvas, &to_rgb(view), i64::from(x), 0);
        x += view_width + GAP;
    }
    Ok(canvas)
}

fn draw_line(image: &mut RgbImage, from: (f64, f64), to: (f64, f64), color: Rgb<u8>) {
    let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs()).ceil().max(1.0) as u32;
    for step in 0..=steps {
        let t = f64::from(step) / f64::from(steps);
        let x = (from.0 + (to.0 - from.0) * t).round();
        let y = (from.1 + (to.1 - from.1) * t).round();
        if x >= 0.0 && y >= 0.0 && (x as u32) < image.width() && (y as u32) < image.height() {
            image.put_pixel(x as u32, y as u32, color);
        }
    }
}

/// Plot `values` top to bottom, one point per row, across a panel of
/// `height` pixels. NaN rows break the line.
fn plot_panel(values: &[f64], height: u32, color: Rgb<u8>) -> RgbImage {
    let mut panel = RgbImage::new(PLOT_WIDTH, height);
    let Some((low, high)) = finite_range(values.iter().copied()) else {
        return panel;
    };

    let row_height = f64::from(height) / values.len() as f64;
    let span = if high > low { high - low } else { 1.0 };
    let point = |row: usize, value: f64| {
        let x = (value - low) / span * f64::from(PLOT_WIDTH - 1);
        let y = (row as f64 + 0.5) * row_height;
        (x, y)
    };

    let mut previous = None;
    for (row, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            previous = None;
            continue;
        }
        let current = point(row, value);
        draw_line(&mut panel, previous.unwrap_or(current), current, color);
        previous = Some(current);
    }
    panel
}

/// A slice next to plots of its per-row mean brightness and standard
/// deviation, sharing the slice's vertical axis.
pub fn render_brightness_trace(slice: &Slice, units: Units) -> RgbImage {
    let trace = brightness_trace(slice);
    let image = render_slice(slice, units);
    let height = image.height();

    let mean = trace.mean.to_vec();
    let stddev = trace.stddev.to_vec();
    let panels = [
        to_rgb(image),
        plot_panel(&mean, height, MEAN_COLOR),
        plot_panel(&stddev, height, STDDEV_COLOR),
    ];

    let width = panels.iter().map(|panel| panel.width()).sum::<u32>() + GAP * 2;
    let mut canvas = RgbImage::new(width, height);
    let mut x = 0;
    for panel in &panels {
        imageops::overlay(&mut canvas, panel, i64::from(x), 0);
        x += panel.width() + GAP;
    }
    canvas
}

/// Overlay the two lines where [`Slice::trim`] would cut.
///
/// # Errors
///
/// Fails the same way [`Slice::trim`] does.
pub fn render_trim(
    slice: &Slice,
    axis: SliceAxis,
    loc_start: usize,
    loc_end: Option<usize>,
) -> Result<RgbImage, CoreError> {
    let loc_end = loc_end.unwrap_or(loc_start);
    let len = slice.data.len_of(axis.into());
    let stop = trim_stop(axis.index(), len, loc_start, loc_end)?;
    debug!(?axis, loc_start, stop, "drawing trim lines");

    let mut image = to_rgb(render_slice(slice, Units::Pixels));
    let (width, height) = image.dimensions();
    let last = len.saturating_sub(1);
    for line in [loc_start.min(last), stop.min(last)] {
        let line = line as u32;
        match axis {
            SliceAxis::Row if line < height => {
                (0..width).for_each(|x| image.put_pixel(x, line, TRIM_COLOR))
            }
            SliceAxis::Column if line < width => {
                (0..height).for_each(|y| image.put_pixel(line, y, TRIM_COLOR))
            }
            _ => {}
        }
    }
    Ok(image)
}

/// Render the slice of `core` at `loc` along `axis` and write it to
/// `path`. The format follows the file extension.
pub fn save_slice(
    core: &Core,
    path: impl AsRef<Path>,
    axis: Axis,
    loc: usize,
    units: Units,
) -> Result<(), RenderError> {
    let slice = core.slice(axis, loc)?;
    render_slice(&slice, units).save(path.as_ref())?;
    debug!(path = %path.as_ref().display(), ?axis, loc, "saved slice image");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3, array};

    #[test]
    fn slice_is_windowed_to_finite_range() {
        let slice = Slice::new(array![[0.0, 10.0], [f64::NAN, 5.0]], [1.0, 1.0]);
        let image = render_slice(&slice, Units::Pixels);
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(0, 0).0, [0]);
        assert_eq!(image.get_pixel(1, 0).0, [255]);
        assert_eq!(image.get_pixel(0, 1).0, [0]);
        assert_eq!(image.get_pixel(1, 1).0, [128]);
    }

    #[test]
    fn millimeters_scale_by_pixel_size() {
        let slice = Slice::new(Array2::zeros((3, 4)), [2.0, 0.5]);
        assert_eq!(render_slice(&slice, Units::Pixels).dimensions(), (4, 3));
        assert_eq!(render_slice(&slice, Units::Millimeters).dimensions(), (4, 12));
    }

    #[test]
    fn unusable_pixel_size_renders_in_pixels() {
        for pixel_dimensions in [[0.0, 1.0], [-1.0, 1.0], [f64::NAN, 1.0], [1.0, f64::INFINITY]] {
            assert_eq!(output_size(3, 4, pixel_dimensions, Units::Millimeters), (4, 3));
        }
        assert_eq!(output_size(3, 4, [1e-300, 1.0], Units::Millimeters), (4, 3));

        let slice = Slice::new(Array2::zeros((3, 4)), [0.0, 0.5]);
        assert_eq!(render_slice(&slice, Units::Millimeters).dimensions(), (4, 3));
    }

    #[test]
    fn orthogonal_core_view() {
        let core = Core::new(Array3::zeros((2, 4, 8)), [1.0, 1.0, 1.0]);
        let image = render_core(&core, Units::Pixels).unwrap();
        // slices are 4x8, 2x8 and 2x4 (rows x columns)
        assert_eq!(image.dimensions(), (8 + 8 + 4 + 2 * GAP, 4));

        let empty = Core::new(Array3::zeros((0, 4, 8)), [1.0, 1.0, 1.0]);
        assert!(matches!(
            render_core(&empty, Units::Pixels),
            Err(RenderError::Core(CoreError::IndexOutOfBounds { .. }))
        ));
    }

    #[test]
    fn brightness_trace_panels() {
        let slice = Slice::new(
            Array2::from_shape_fn((6, 5), |(r, c)| (r * c) as f64),
            [1.0, 1.0],
        );
        let image = render_brightness_trace(&slice, Units::Pixels);
        assert_eq!(image.dimensions(), (5 + 2 * PLOT_WIDTH + 2 * GAP, 6));

        let mean_panel = imageops::crop_imm(&image, 5 + GAP, 0, PLOT_WIDTH, 6).to_image();
        assert!(mean_panel.pixels().any(|pixel| *pixel == MEAN_COLOR));
    }

    #[test]
    fn trim_lines_are_drawn() {
        let slice = Slice::new(Array2::zeros((6, 4)), [1.0, 1.0]);
        let image = render_trim(&slice, SliceAxis::Row, 1, Some(2)).unwrap();
        assert_eq!(*image.get_pixel(0, 1), TRIM_COLOR);
        assert_eq!(*image.get_pixel(3, 4), TRIM_COLOR);
        assert_ne!(*image.get_pixel(0, 2), TRIM_COLOR);

        let image = render_trim(&slice, SliceAxis::Column, 1, None).unwrap();
        assert_eq!(*image.get_pixel(1, 0), TRIM_COLOR);
        assert_eq!(*image.get_pixel(3, 5), TRIM_COLOR);

        assert!(render_trim(&slice, SliceAxis::Column, 3, None).is_err());
    }

    #[test]
    fn save_slice_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slice.png");
        let core = Core::new(
            Array3::from_shape_fn((3, 4, 5), |(x, y, z)| (x + y + z) as f64),
            [1.0, 1.0, 1.0],
        );

        save_slice(&core, &path, Axis::Z, 0, Units::Pixels).unwrap();
        assert!(path.is_file());
        let written = image::open(&path).unwrap();
        assert_eq!((written.width(), written.height()), (4, 3));

        assert!(matches!(
            save_slice(&core, dir.path().join("bad.png"), Axis::Z, 5, Units::Pixels),
            Err(RenderError::Core(_))
        ));
    }
}
