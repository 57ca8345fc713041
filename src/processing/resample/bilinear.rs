//! Bilinear interpolation
//!
//! Separable: each needed source row is resampled horizontally into a
//! scratch slot, then two slots are blended into the destination row.
//! Positions are 16.16 fixed point.

use super::lanes::Lane;
use crate::error::Result;
use crate::processing::locate::{Plane, PlaneMut};

pub(super) const FRAC_BITS: u32 = 16;
const FRAC_ONE: i64 = 1 << FRAC_BITS;
const FRAC_MASK: u64 = (1 << FRAC_BITS) - 1;

/// Step between destination samples in source coordinates, 16.16 fixed
/// point. First and last samples of both sides line up.
#[inline]
pub(super) fn increment(src: usize, dst: usize) -> u64 {
    if src > 1 && dst > 1 {
        (((src - 1) as u64) << FRAC_BITS) / (dst - 1) as u64
    } else {
        0
    }
}

/// Split a fixed-point position into sample index and fraction
#[inline]
pub(super) fn split(pos: u64) -> (usize, u32) {
    ((pos >> FRAC_BITS) as usize, (pos & FRAC_MASK) as u32)
}

#[inline]
fn lerp(a: i32, b: i32, frac: u32) -> i32 {
    let f = frac as i64;
    ((a as i64 * (FRAC_ONE - f) + b as i64 * f + (FRAC_ONE >> 1)) >> FRAC_BITS) as i32
}

pub(super) fn resample_row(
    lanes: &[Lane],
    src: &[u8],
    src_width: u32,
    dst: &mut [u8],
    dst_width: u32,
) {
    for lane in lanes {
        let src_count = lane.count(src_width);
        let dst_count = lane.count(dst_width);
        let inc = increment(src_count, dst_count);
        for i in 0..dst_count {
            let (j, frac) = split(i as u64 * inc);
            let a = lane.get(src, j);
            let b = lane.get(src, (j + 1).min(src_count - 1));
            lane.put(dst, i, lerp(a, b, frac));
        }
    }
}

fn blend_rows(lanes: &[Lane], a: &[u8], b: &[u8], frac: u32, dst: &mut [u8], width: u32) {
    for lane in lanes {
        for i in 0..lane.count(width) {
            lane.put(dst, i, lerp(lane.get(a, i), lane.get(b, i), frac));
        }
    }
}

pub(super) fn scale(
    lanes: &[Lane],
    dst: &mut PlaneMut<'_>,
    src: &Plane<'_>,
    scratch: &mut [u8],
) -> Result<()> {
    let slot_len = dst.stride;
    let src_rows = src.height as usize;
    let inc = increment(src_rows, dst.height as usize);
    // Source row currently held by each of the two slots
    let mut cached: [Option<usize>; 2] = [None; 2];

    for y in 0..dst.height {
        let (j, frac) = split(y as u64 * inc);
        let rows = [j, (j + 1).min(src_rows - 1)];

        for &row in &rows {
            let slot = row % 2;
            if cached[slot] != Some(row) {
                let tmp = &mut scratch[slot * slot_len..(slot + 1) * slot_len];
                resample_row(lanes, src.row(row as u32), src.width, tmp, dst.width);
                cached[slot] = Some(row);
            }
        }

        let a = &scratch[(rows[0] % 2) * slot_len..][..slot_len];
        let b = &scratch[(rows[1] % 2) * slot_len..][..slot_len];
        let width = dst.width;
        blend_rows(lanes, a, b, frac, dst.row_mut(y), width);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_identity() {
        assert_eq!(increment(10, 10), 1 << FRAC_BITS);
        assert_eq!(increment(1, 10), 0);
        assert_eq!(increment(10, 1), 0);
    }

    #[test]
    fn test_lerp_rounding() {
        assert_eq!(lerp(0, 255, 1 << 15), 128);
        assert_eq!(lerp(255, 255, 12345), 255);
        assert_eq!(lerp(7, 200, 0), 7);
    }

    #[test]
    fn test_last_position_stays_in_range() {
        for src in 1..40usize {
            for dst in 1..40usize {
                let (j, _) = split((dst as u64 - 1) * increment(src, dst));
                assert!(j < src, "{} -> {}", src, dst);
            }
        }
    }
}
