//! Nearest-neighbour sampling

use super::lanes::Lane;
use crate::error::Result;
use crate::processing::locate::{Plane, PlaneMut};

/// Source index for destination index `i` when mapping `src` samples onto
/// `dst` samples
#[inline]
fn nearest(i: usize, src: usize, dst: usize) -> usize {
    (i as u64 * src as u64 / dst as u64) as usize
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
        for i in 0..dst_count {
            let value = lane.get(src, nearest(i, src_count, dst_count));
            lane.put(dst, i, value);
        }
    }
}

pub(super) fn scale(
    lanes: &[Lane],
    dst: &mut PlaneMut<'_>,
    src: &Plane<'_>,
    _scratch: &mut [u8],
) -> Result<()> {
    let (src_height, dst_height) = (src.height as usize, dst.height as usize);
    let (src_width, dst_width) = (src.width, dst.width);

    for y in 0..dst.height {
        let sy = nearest(y as usize, src_height, dst_height) as u32;
        resample_row(lanes, src.row(sy), src_width, dst.row_mut(y), dst_width);
    }
    Ok(())
}
