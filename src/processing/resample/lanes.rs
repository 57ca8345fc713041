//! Component lanes
//!
//! A lane is one component stream inside a row: where its first sample
//! sits, how far apart consecutive samples are, and how a sample is encoded.
//! Every sample layout is described by a short lane table, so the kernels
//! only ever deal with integers in `0..=lane.max()`.

use crate::format::SampleLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LaneKind {
    /// One byte
    Byte,
    /// Native-endian 16-bit word
    Word,
    /// Bitfield inside a native-endian 16-bit word. The `first` lane of a
    /// word overwrites it, later lanes merge into it.
    Bits { shift: u32, width: u32, first: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Lane {
    /// Byte offset of sample 0 within the row
    pub offset: usize,
    /// Bytes between consecutive samples
    pub step: usize,
    /// Horizontal subsampling factor (2 for packed 4:2:2 chroma)
    pub subsample: u32,
    pub kind: LaneKind,
}

impl Lane {
    const fn byte(offset: usize, step: usize) -> Self {
        Self {
            offset,
            step,
            subsample: 1,
            kind: LaneKind::Byte,
        }
    }

    const fn chroma(offset: usize) -> Self {
        Self {
            offset,
            step: 4,
            subsample: 2,
            kind: LaneKind::Byte,
        }
    }

    const fn bits(shift: u32, width: u32, first: bool) -> Self {
        Self {
            offset: 0,
            step: 2,
            subsample: 1,
            kind: LaneKind::Bits {
                shift,
                width,
                first,
            },
        }
    }

    /// Samples this lane carries in a row `width` pixels wide
    #[inline]
    pub fn count(&self, width: u32) -> usize {
        ((width + self.subsample - 1) / self.subsample) as usize
    }

    /// Largest representable sample value
    #[inline]
    pub fn max(&self) -> i32 {
        match self.kind {
            LaneKind::Byte => u8::MAX as i32,
            LaneKind::Word => u16::MAX as i32,
            LaneKind::Bits { width, .. } => (1 << width) - 1,
        }
    }

    #[inline]
    pub fn get(&self, row: &[u8], i: usize) -> i32 {
        let pos = self.offset + i * self.step;
        match self.kind {
            LaneKind::Byte => row[pos] as i32,
            LaneKind::Word => u16::from_ne_bytes([row[pos], row[pos + 1]]) as i32,
            LaneKind::Bits { shift, width, .. } => {
                let word = u16::from_ne_bytes([row[pos], row[pos + 1]]) as i32;
                (word >> shift) & ((1 << width) - 1)
            }
        }
    }

    /// Store `value`, saturated to the lane's range
    #[inline]
    pub fn put(&self, row: &mut [u8], i: usize, value: i32) {
        let value = value.clamp(0, self.max());
        let pos = self.offset + i * self.step;
        match self.kind {
            LaneKind::Byte => row[pos] = value as u8,
            LaneKind::Word => {
                row[pos..pos + 2].copy_from_slice(&(value as u16).to_ne_bytes());
            }
            LaneKind::Bits { shift, first, .. } => {
                let field = (value as u16) << shift;
                let word = if first {
                    field
                } else {
                    let old = u16::from_ne_bytes([row[pos], row[pos + 1]]);
                    (old & !((self.max() as u16) << shift)) | field
                };
                row[pos..pos + 2].copy_from_slice(&word.to_ne_bytes());
            }
        }
    }
}

const GRAY8: &[Lane] = &[Lane::byte(0, 1)];
const GRAY16: &[Lane] = &[Lane {
    offset: 0,
    step: 2,
    subsample: 1,
    kind: LaneKind::Word,
}];
const PACKED3: &[Lane] = &[Lane::byte(0, 3), Lane::byte(1, 3), Lane::byte(2, 3)];
const PACKED4: &[Lane] = &[
    Lane::byte(0, 4),
    Lane::byte(1, 4),
    Lane::byte(2, 4),
    Lane::byte(3, 4),
];
const YUYV: &[Lane] = &[Lane::byte(0, 2), Lane::chroma(1), Lane::chroma(3)];
const UYVY: &[Lane] = &[Lane::chroma(0), Lane::byte(1, 2), Lane::chroma(2)];
const RGB565: &[Lane] = &[
    Lane::bits(11, 5, true),
    Lane::bits(5, 6, false),
    Lane::bits(0, 5, false),
];
const RGB555: &[Lane] = &[
    Lane::bits(10, 5, true),
    Lane::bits(5, 5, false),
    Lane::bits(0, 5, false),
];

/// Lane table of a sample layout. Lanes sharing a word come first-lane
/// first, and kernels walk them in order.
pub(crate) fn lanes(layout: SampleLayout) -> &'static [Lane] {
    match layout {
        SampleLayout::Gray8 => GRAY8,
        SampleLayout::Gray16 => GRAY16,
        SampleLayout::Packed3 => PACKED3,
        SampleLayout::Packed4 => PACKED4,
        SampleLayout::Yuyv => YUYV,
        SampleLayout::Uyvy => UYVY,
        SampleLayout::Rgb565 => RGB565,
        SampleLayout::Rgb555 => RGB555,
    }
}

/// Bytes of pixel data in a row `width` pixels wide
pub(crate) fn row_bytes(layout: SampleLayout, width: u32) -> usize {
    let w = width as usize;
    match layout {
        SampleLayout::Gray8 => w,
        SampleLayout::Gray16 | SampleLayout::Rgb565 | SampleLayout::Rgb555 => w * 2,
        SampleLayout::Packed3 => w * 3,
        SampleLayout::Packed4 => w * 4,
        // Whole macropixels, odd widths included
        SampleLayout::Yuyv | SampleLayout::Uyvy => (w + 1) / 2 * 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_lane_saturates() {
        let lane = Lane::byte(0, 1);
        let mut row = [0u8; 2];
        lane.put(&mut row, 0, 300);
        lane.put(&mut row, 1, -7);
        assert_eq!(row, [255, 0]);
    }

    #[test]
    fn test_word_lane_round_trip() {
        let lane = GRAY16[0];
        let mut row = [0u8; 4];
        lane.put(&mut row, 1, 70_000);
        assert_eq!(lane.get(&row, 1), 65535);
        lane.put(&mut row, 0, 4660);
        assert_eq!(lane.get(&row, 0), 4660);
    }

    #[test]
    fn test_rgb565_bitfields() {
        let word: u16 = (0b10101 << 11) | (0b110011 << 5) | 0b01110;
        let row = word.to_ne_bytes();
        let values: Vec<i32> = RGB565.iter().map(|l| l.get(&row, 0)).collect();
        assert_eq!(values, vec![0b10101, 0b110011, 0b01110]);

        let mut out = [0xffu8; 2];
        for (lane, v) in RGB565.iter().zip(&values) {
            lane.put(&mut out, 0, *v);
        }
        assert_eq!(u16::from_ne_bytes(out), word);

        // Each field saturates on its own
        let mut sat = [0u8; 2];
        RGB565[0].put(&mut sat, 0, 40);
        RGB565[1].put(&mut sat, 0, 100);
        RGB565[2].put(&mut sat, 0, -1);
        assert_eq!(u16::from_ne_bytes(sat), (31 << 11) | (63 << 5));
    }

    #[test]
    fn test_rgb555_clears_top_bit() {
        let mut out = [0xffu8; 2];
        for lane in RGB555 {
            lane.put(&mut out, 0, 31);
        }
        assert_eq!(u16::from_ne_bytes(out), 0x7fff);
    }

    #[test]
    fn test_yuyv_lane_counts() {
        assert_eq!(YUYV[0].count(5), 5);
        assert_eq!(YUYV[1].count(5), 3);
        assert_eq!(UYVY[0].count(4), 2);
        assert_eq!(row_bytes(SampleLayout::Yuyv, 5), 12);

        // Last chroma sample of an odd row still fits in the macropixel
        let last = YUYV[2].offset + (YUYV[2].count(5) - 1) * YUYV[2].step;
        assert!(last < row_bytes(SampleLayout::Yuyv, 5));
    }
}
