//! Four-tap filtering
//!
//! Windowed-sinc (Lanczos, a = 2) filter evaluated at 256 sub-sample phases.
//! Taps are integers scaled to `1 << TAP_SHIFT` and every phase sums to
//! exactly that, so flat input stays flat.

use std::f64::consts::PI;
use std::sync::OnceLock;

use super::bilinear::{increment, split};
use super::lanes::Lane;
use crate::error::Result;
use crate::processing::locate::{Plane, PlaneMut};

const PHASES: usize = 256;
const TAP_SHIFT: u32 = 10;
const TAP_ONE: i32 = 1 << TAP_SHIFT;

type Taps = [[i32; 4]; PHASES];

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

fn lanczos2(x: f64) -> f64 {
    if x.abs() >= 2.0 {
        0.0
    } else {
        sinc(x) * sinc(x / 2.0)
    }
}

fn build_taps() -> Taps {
    let mut taps = [[0i32; 4]; PHASES];
    for (phase, row) in taps.iter_mut().enumerate() {
        let t = phase as f64 / PHASES as f64;
        let weights = [
            lanczos2(1.0 + t),
            lanczos2(t),
            lanczos2(1.0 - t),
            lanczos2(2.0 - t),
        ];
        let sum: f64 = weights.iter().sum();

        for (tap, w) in row.iter_mut().zip(weights) {
            *tap = (w / sum * TAP_ONE as f64).round() as i32;
        }

        // Fold rounding error into the dominant tap
        let error = TAP_ONE - row.iter().sum::<i32>();
        let mut dominant = 0;
        for k in 1..4 {
            if row[k] > row[dominant] {
                dominant = k;
            }
        }
        row[dominant] += error;
    }
    taps
}

fn taps() -> &'static Taps {
    static TAPS: OnceLock<Taps> = OnceLock::new();
    TAPS.get_or_init(build_taps)
}

/// Weighted sum of four samples, rounded and scaled back to sample range
#[inline]
fn filter(samples: [i32; 4], taps: &[i32; 4]) -> i32 {
    let sum: i64 = samples
        .iter()
        .zip(taps)
        .map(|(&s, &t)| s as i64 * t as i64)
        .sum();
    ((sum + (TAP_ONE as i64 >> 1)) >> TAP_SHIFT) as i32
}

/// Indices of the four neighbours of sample `j`, clamped to `0..count`
#[inline]
fn neighbours(j: usize, count: usize) -> [usize; 4] {
    let last = count - 1;
    [
        j.saturating_sub(1),
        j.min(last),
        (j + 1).min(last),
        (j + 2).min(last),
    ]
}

#[inline]
fn phase(frac: u32) -> usize {
    (frac >> 8) as usize
}

pub(super) fn resample_row(
    lanes: &[Lane],
    src: &[u8],
    src_width: u32,
    dst: &mut [u8],
    dst_width: u32,
) {
    let taps = taps();
    for lane in lanes {
        let src_count = lane.count(src_width);
        let dst_count = lane.count(dst_width);
        let inc = increment(src_count, dst_count);
        for i in 0..dst_count {
            let (j, frac) = split(i as u64 * inc);
            let idx = neighbours(j, src_count);
            let samples = idx.map(|k| lane.get(src, k));
            lane.put(dst, i, filter(samples, &taps[phase(frac)]));
        }
    }
}

pub(super) fn scale(
    lanes: &[Lane],
    dst: &mut PlaneMut<'_>,
    src: &Plane<'_>,
    scratch: &mut [u8],
) -> Result<()> {
    let taps = taps();
    let slot_len = dst.stride;
    let src_rows = src.height as usize;
    let inc = increment(src_rows, dst.height as usize);
    let mut cached: [Option<usize>; 4] = [None; 4];

    for y in 0..dst.height {
        let (j, frac) = split(y as u64 * inc);
        let rows = neighbours(j, src_rows);

        for &row in &rows {
            let slot = row % 4;
            if cached[slot] != Some(row) {
                let tmp = &mut scratch[slot * slot_len..(slot + 1) * slot_len];
                resample_row(lanes, src.row(row as u32), src.width, tmp, dst.width);
                cached[slot] = Some(row);
            }
        }

        let tap = &taps[phase(frac)];
        let width = dst.width;
        let out = dst.row_mut(y);
        for lane in lanes {
            for i in 0..lane.count(width) {
                let samples = rows.map(|row| {
                    let slot = &scratch[(row % 4) * slot_len..][..slot_len];
                    lane.get(slot, i)
                });
                lane.put(out, i, filter(samples, tap));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_phase_sums_to_one() {
        for row in taps().iter() {
            assert_eq!(row.iter().sum::<i32>(), TAP_ONE);
        }
    }

    #[test]
    fn test_phase_zero_is_identity() {
        assert_eq!(taps()[0], [0, TAP_ONE, 0, 0]);
    }

    #[test]
    fn test_taps_are_symmetric() {
        let t = taps();
        assert_eq!(t[128][1], t[128][2]);
        assert_eq!(t[128][0], t[128][3]);
        // Negative lobes
        assert!(t[128][0] < 0);
    }

    #[test]
    fn test_neighbours_clamp() {
        assert_eq!(neighbours(0, 5), [0, 0, 1, 2]);
        assert_eq!(neighbours(4, 5), [3, 4, 4, 4]);
        assert_eq!(neighbours(0, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn test_filter_rounds() {
        assert_eq!(filter([200, 200, 200, 200], &taps()[77]), 200);
        assert_eq!(filter([0, 255, 0, 0], &taps()[0]), 255);
    }
}
