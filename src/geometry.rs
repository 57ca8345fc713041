//! Frame and plane geometry
//!
//! Computes per-plane width, height, stride, offset and size for a format
//! and frame size. Strides are rounded up to the alignment each format
//! mandates; chroma planes follow the luma plane in memory.

use crate::error::{Error, Result};
use crate::format::{PixelFormat, PlaneLayoutRule, PlaneRole};

/// Largest width or height accepted on either side of the scaler
pub const MAX_DIMENSION: u32 = 32767;

#[inline]
pub(crate) fn round_up(value: usize, align: usize) -> usize {
    (value + align - 1) / align * align
}

#[inline]
fn round2(v: usize) -> usize {
    round_up(v, 2)
}

#[inline]
fn round4(v: usize) -> usize {
    round_up(v, 4)
}

#[inline]
fn round8(v: usize) -> usize {
    round_up(v, 8)
}

#[inline]
fn round16(v: usize) -> usize {
    round_up(v, 16)
}

/// Width, height and format of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameGeometry {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
}

impl FrameGeometry {
    /// Create a geometry, checking both dimensions are in `1..=32767`
    pub fn new(format: PixelFormat, width: u32, height: u32) -> Result<Self> {
        check_dimension("width", width)?;
        check_dimension("height", height)?;
        Ok(Self {
            format,
            width,
            height,
        })
    }

    /// Compute the plane layout for this geometry
    pub fn layout(&self) -> Result<FrameLayout> {
        compute_layout(self.format, self.width, self.height)
    }
}

fn check_dimension(what: &str, value: u32) -> Result<()> {
    if value == 0 || value > MAX_DIMENSION {
        return Err(Error::InvalidDimensions(format!(
            "{} {} outside 1..={}",
            what, value, MAX_DIMENSION
        )));
    }
    Ok(())
}

/// One rectangular sample array inside a frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneGeometry {
    pub role: PlaneRole,
    /// Width in pixels of this plane
    pub width: u32,
    /// Logical height in rows
    pub height: u32,
    /// Bytes between consecutive rows
    pub stride: usize,
    /// Byte offset of the first row within the frame buffer
    pub offset: usize,
    /// Bytes reserved for the plane; can cover padding rows past `height`
    pub size: usize,
}

impl PlaneGeometry {
    /// One past the last byte of this plane
    pub fn end(&self) -> usize {
        self.offset + self.size
    }
}

/// All planes of one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLayout {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub planes: Vec<PlaneGeometry>,
    /// Total buffer size in bytes
    pub size: usize,
}

impl FrameLayout {
    pub fn geometry(&self) -> FrameGeometry {
        FrameGeometry {
            format: self.format,
            width: self.width,
            height: self.height,
        }
    }

    /// Plane with the given role
    pub fn plane(&self, role: PlaneRole) -> Option<&PlaneGeometry> {
        self.planes.iter().find(|p| p.role == role)
    }

    /// Widest stride over all planes
    pub fn max_stride(&self) -> usize {
        self.planes.iter().map(|p| p.stride).max().unwrap_or(0)
    }
}

/// Compute the plane layout of a `width`x`height` frame in `format`
pub fn compute_layout(format: PixelFormat, width: u32, height: u32) -> Result<FrameLayout> {
    check_dimension("width", width)?;
    check_dimension("height", height)?;

    let info = format.info();
    let w = width as usize;
    let h = height as usize;

    let planes = match info.layout {
        PlaneLayoutRule::Packed {
            bytes_per_pixel,
            align,
        } => {
            let stride = round_up(w * bytes_per_pixel as usize, align as usize);
            vec![PlaneGeometry {
                role: PlaneRole::Packed,
                width,
                height,
                stride,
                offset: 0,
                size: stride * h,
            }]
        }
        PlaneLayoutRule::Planar444 => {
            let row_stride = round4(w);
            planar(
                info.planes,
                width,
                height,
                row_stride,
                h,
                width,
                height,
                row_stride,
            )
        }
        PlaneLayoutRule::Planar422 => planar(
            info.planes,
            width,
            height,
            round4(w),
            h,
            (round2(w) / 2) as u32,
            height,
            round8(w) / 2,
        ),
        PlaneLayoutRule::Planar411 => planar(
            info.planes,
            width,
            height,
            round4(w),
            h,
            (round4(w) / 4) as u32,
            height,
            round16(w) / 4,
        ),
        PlaneLayoutRule::Planar420 => {
            let luma_stride = round4(w);
            planar(
                info.planes,
                width,
                height,
                luma_stride,
                round2(h),
                (round2(w) / 2) as u32,
                (round2(h) / 2) as u32,
                round4(luma_stride / 2),
            )
        }
    };

    let size = planes.iter().map(|p| p.size).sum();

    Ok(FrameLayout {
        format,
        width,
        height,
        planes,
        size,
    })
}

/// Lay out a luma plane followed by two identical chroma planes, in the
/// role order the format stores them
#[allow(clippy::too_many_arguments)]
fn planar(
    roles: &[PlaneRole],
    width: u32,
    height: u32,
    luma_stride: usize,
    luma_rows: usize,
    chroma_width: u32,
    chroma_height: u32,
    chroma_stride: usize,
) -> Vec<PlaneGeometry> {
    let mut offset = 0;
    roles
        .iter()
        .map(|&role| {
            let plane = if role == PlaneRole::Y {
                PlaneGeometry {
                    role,
                    width,
                    height,
                    stride: luma_stride,
                    offset,
                    size: luma_stride * luma_rows,
                }
            } else {
                PlaneGeometry {
                    role,
                    width: chroma_width,
                    height: chroma_height,
                    stride: chroma_stride,
                    offset,
                    size: chroma_stride * chroma_height as usize,
                }
            };
            offset += plane.size;
            plane
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i420_64x64() {
        let layout = compute_layout(PixelFormat::I420, 64, 64).unwrap();
        assert_eq!(layout.planes.len(), 3);

        let y = layout.plane(PlaneRole::Y).unwrap();
        assert_eq!((y.width, y.height, y.stride, y.size), (64, 64, 64, 4096));

        for role in [PlaneRole::U, PlaneRole::V] {
            let c = layout.plane(role).unwrap();
            assert_eq!((c.width, c.height, c.stride, c.size), (32, 32, 32, 1024));
        }
        assert_eq!(layout.size, 6144);
    }

    #[test]
    fn test_yv12_swaps_chroma_order() {
        let i420 = compute_layout(PixelFormat::I420, 64, 64).unwrap();
        let yv12 = compute_layout(PixelFormat::Yv12, 64, 64).unwrap();
        assert_eq!(i420.plane(PlaneRole::U).unwrap().offset, 4096);
        assert_eq!(yv12.plane(PlaneRole::V).unwrap().offset, 4096);
        assert_eq!(yv12.plane(PlaneRole::U).unwrap().offset, 4096 + 1024);
        assert_eq!(i420.size, yv12.size);
    }

    #[test]
    fn test_i420_odd_dimensions() {
        let layout = compute_layout(PixelFormat::I420, 5, 3).unwrap();
        let y = layout.planes[0];
        assert_eq!((y.width, y.height, y.stride), (5, 3, 8));
        // Two rows are allocated per chroma row
        assert_eq!(y.size, 8 * 4);
        let u = layout.planes[1];
        assert_eq!((u.width, u.height, u.stride, u.offset), (3, 2, 4, 32));
        assert_eq!(layout.size, 32 + 8 + 8);
    }

    #[test]
    fn test_packed_strides() {
        let cases = [
            (PixelFormat::Rgba, 7, 28),
            (PixelFormat::Xbgr, 7, 28),
            (PixelFormat::Ayuv, 3, 12),
            (PixelFormat::Rgb, 5, 16),
            (PixelFormat::V308, 4, 12),
            (PixelFormat::Yuy2, 5, 12),
            (PixelFormat::Uyvy, 6, 12),
            (PixelFormat::Gray8, 5, 8),
            (PixelFormat::Y800, 9, 12),
            (PixelFormat::Gray16, 3, 8),
            (PixelFormat::Rgb565, 5, 12),
            (PixelFormat::Rgb555, 4, 8),
        ];
        for (format, width, stride) in cases {
            let layout = compute_layout(format, width, 3).unwrap();
            assert_eq!(layout.planes.len(), 1, "{}", format);
            assert_eq!(layout.planes[0].stride, stride, "{}", format);
            assert_eq!(layout.size, stride * 3, "{}", format);
        }
    }

    #[test]
    fn test_y42b_layout() {
        let layout = compute_layout(PixelFormat::Y42b, 13, 5).unwrap();
        let y = layout.planes[0];
        assert_eq!((y.stride, y.size), (16, 80));
        let u = layout.planes[1];
        assert_eq!((u.width, u.height, u.stride, u.offset), (7, 5, 8, 80));
        let v = layout.planes[2];
        assert_eq!(v.offset, 80 + 40);
        // Matches (round4(w) + round8(w)) * h
        assert_eq!(layout.size, (16 + 16) * 5);
    }

    #[test]
    fn test_y41b_layout() {
        let layout = compute_layout(PixelFormat::Y41b, 18, 3).unwrap();
        let u = layout.planes[1];
        assert_eq!((u.width, u.stride, u.height), (5, 8, 3));
        assert_eq!(u.offset, 20 * 3);
        // Matches (round4(w) + round16(w) / 2) * h
        assert_eq!(layout.size, (20 + 32 / 2) * 3);
    }

    #[test]
    fn test_y444_layout() {
        let layout = compute_layout(PixelFormat::Y444, 10, 4).unwrap();
        for (i, p) in layout.planes.iter().enumerate() {
            assert_eq!((p.width, p.height, p.stride), (10, 4, 12));
            assert_eq!(p.offset, i * 48);
        }
        assert_eq!(layout.size, 12 * 4 * 3);
    }

    #[test]
    fn test_all_formats_well_formed() {
        for format in PixelFormat::ALL {
            for width in 1..=19u32 {
                for height in 1..=7u32 {
                    let layout = compute_layout(format, width, height).unwrap();
                    let name = format!("{} {}x{}", format, width, height);
                    let align = match format.info().layout {
                        PlaneLayoutRule::Packed { align, .. } => align as usize,
                        _ => 4,
                    };
                    let mut expected_offset = 0;
                    for plane in &layout.planes {
                        assert_eq!(plane.offset, expected_offset, "{}", name);
                        assert_eq!(plane.stride % align.min(4), 0);
                        assert!(plane.size >= plane.stride * plane.height as usize);
                        assert!(plane.end() <= layout.size);
                        expected_offset = plane.end();
                    }
                    assert_eq!(expected_offset, layout.size);
                }
            }
        }
    }

    #[test]
    fn test_dimension_limits() {
        assert!(compute_layout(PixelFormat::Rgba, 0, 10).is_err());
        assert!(compute_layout(PixelFormat::Rgba, 10, MAX_DIMENSION + 1).is_err());
        assert!(compute_layout(PixelFormat::Gray8, MAX_DIMENSION, 1).is_ok());
        assert!(FrameGeometry::new(PixelFormat::I420, 1, 0).is_err());
    }
}
