use core_ct::{Axis, Core, Slice, SliceAxis};
use ndarray::Array3;
use proptest::prelude::*;

fn axis() -> impl Strategy<Value = Axis> {
    prop_oneof![Just(Axis::X), Just(Axis::Y), Just(Axis::Z)]
}

fn core() -> impl Strategy<Value = Core> {
    (1usize..6, 1usize..6, 1usize..6, 0.1f64..5.0, 0.1f64..5.0, 0.1f64..5.0).prop_map(
        |(nx, ny, nz, dx, dy, dz)| {
            let data = Array3::from_shape_fn((nx, ny, nz), |(x, y, z)| {
                (x * ny * nz + y * nz + z) as f64
            });
            Core::new(data, [dx, dy, dz])
        },
    )
}

fn without(shape: (usize, usize, usize), axis: Axis) -> (usize, usize) {
    let extents = [shape.0, shape.1, shape.2];
    let (a, b) = axis.plane();
    (extents[a.index()], extents[b.index()])
}

proptest! {
    #[test]
    fn slice_drops_collapsed_axis(core in core(), axis in axis(), pick in 0usize..100) {
        let loc = pick % core.data.len_of(axis.into());
        let slice = core.slice(axis, loc).unwrap();
        prop_assert_eq!(slice.shape(), without(core.shape(), axis));

        let (a, b) = axis.plane();
        prop_assert_eq!(
            slice.pixel_dimensions,
            [core.pixel_dimensions[a.index()], core.pixel_dimensions[b.index()]]
        );
    }

    #[test]
    fn flip_is_an_involution(core in core(), axis in axis()) {
        let once = core.flip(axis);
        prop_assert_eq!(once.pixel_dimensions, core.pixel_dimensions);
        prop_assert_eq!(once.flip(axis), core);
    }

    #[test]
    fn swapaxes_is_an_involution(core in core(), first in axis(), second in axis()) {
        let twice = core.swapaxes(first, second).swapaxes(first, second);
        prop_assert_eq!(twice, core);
    }

    #[test]
    fn full_turns_are_identity(core in core(), axis in axis(), turns in -3i64..4) {
        prop_assert_eq!(core.rotate(axis, 4 * turns, false), core.clone());
        prop_assert_eq!(core.rotate(axis, 4 * turns, true), core);
    }

    #[test]
    fn rotation_undone_clockwise(core in core(), axis in axis(), k in -5i64..6) {
        let back = core.rotate(axis, k, false).rotate(axis, k, true);
        prop_assert_eq!(back, core);
    }

    #[test]
    fn odd_rotation_swaps_plane_dimensions(core in core(), axis in axis()) {
        let (a, b) = axis.plane();
        let rotated = core.rotate(axis, 1, false);
        prop_assert_eq!(rotated.pixel_dimensions[a.index()], core.pixel_dimensions[b.index()]);
        prop_assert_eq!(rotated.pixel_dimensions[b.index()], core.pixel_dimensions[a.index()]);
        prop_assert_eq!(rotated.pixel_dimensions[axis.index()], core.pixel_dimensions[axis.index()]);
        prop_assert_eq!(rotated.volume(), core.volume());
    }

    #[test]
    fn chunk_without_bounds_copies(core in core()) {
        prop_assert_eq!(core.chunk([0; 3], [None; 3]), core);
    }

    #[test]
    fn radial_trim_is_idempotent(core in core(), axis in axis(), radius in 0.5f64..10.0) {
        let once = core.trim_radial(axis, radius, [None; 3]);
        let twice = once.trim_radial(axis, radius, [None; 3]);
        prop_assert_eq!(twice.shape(), once.shape());
        let same = twice
            .data
            .iter()
            .zip(once.data.iter())
            .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()));
        prop_assert!(same);
    }

    #[test]
    fn slice_trim_keeps_dimensions(rows in 0usize..8, cols in 0usize..8, start in 0usize..5, end in 0usize..5) {
        let slice = Slice::new(ndarray::Array2::zeros((rows, cols)), [0.3, 0.7]);
        match slice.trim(SliceAxis::Row, start, Some(end)) {
            Ok(trimmed) => {
                prop_assert!(start + end <= rows);
                prop_assert_eq!(trimmed.shape(), (rows - start - end, cols));
                prop_assert_eq!(trimmed.pixel_dimensions, [0.3, 0.7]);
            }
            Err(_) => prop_assert!(start + end > rows),
        }
    }
}

#[test]
fn volume_of_finite_core() {
    let core = Core::new(Array3::ones((2, 4, 8)), [2.0, 4.0, 8.0]);
    assert_eq!(core.volume(), 16384.0);
}

#[test]
fn transforms_chain_without_touching_the_source() {
    let data = Array3::from_shape_fn((6, 6, 10), |(x, y, z)| (x + y + z) as f64);
    let core = Core::new(data.clone(), [0.5, 0.5, 1.0]);

    let worked = core
        .trim(Axis::Z, 2, Some(1))
        .unwrap()
        .trim_radial(Axis::Z, 1.0, [None; 3])
        .rotate(Axis::X, 1, false)
        .flip(Axis::Y);

    assert_eq!(worked.shape(), (5, 7, 5));
    assert_eq!(worked.pixel_dimensions, [0.5, 1.0, 0.5]);
    assert_eq!(core.data, data);
    assert_eq!(core.pixel_dimensions, [0.5, 0.5, 1.0]);
}
