//! Plane resampling
//!
//! A [`Resampler`] pairs a [`ScaleMethod`] with the lane table of a sample
//! layout and scales one plane per call. Kernels are picked from a
//! method-indexed table; the scratch buffer is borrowed for the duration
//! of the call only.

mod bilinear;
mod fourtap;
mod lanes;
mod nearest;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::format::{PixelFormat, SampleLayout};
use crate::processing::locate::{Plane, PlaneMut};

pub(crate) use lanes::row_bytes;
use lanes::{lanes, Lane};

/// Scaling algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScaleMethod {
    /// Nearest neighbour (fastest, blocky)
    #[serde(rename = "nearest")]
    Nearest,
    /// Bilinear (fast, smooth)
    #[default]
    #[serde(rename = "bilinear")]
    Bilinear,
    /// Four-tap windowed sinc (sharpest, slowest)
    #[serde(rename = "4-tap")]
    FourTap,
}

impl ScaleMethod {
    pub const ALL: [ScaleMethod; 3] = [
        ScaleMethod::Nearest,
        ScaleMethod::Bilinear,
        ScaleMethod::FourTap,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScaleMethod::Nearest => "nearest",
            ScaleMethod::Bilinear => "bilinear",
            ScaleMethod::FourTap => "4-tap",
        }
    }

    /// Horizontally scaled rows kept in scratch at once
    pub fn scratch_rows(&self) -> usize {
        match self {
            ScaleMethod::Nearest => 0,
            ScaleMethod::Bilinear => 2,
            ScaleMethod::FourTap => 4,
        }
    }

    fn kernel(&self) -> KernelFn {
        KERNELS[*self as usize]
    }
}

impl fmt::Display for ScaleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ScaleMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" | "nearest-neighbour" | "nearest-neighbor" | "0" => Ok(ScaleMethod::Nearest),
            "bilinear" | "linear" | "1" => Ok(ScaleMethod::Bilinear),
            "4-tap" | "4tap" | "fourtap" | "2" => Ok(ScaleMethod::FourTap),
            _ => Err(Error::Config(format!("unknown scaling method '{}'", s))),
        }
    }
}

type KernelFn = fn(&[Lane], &mut PlaneMut<'_>, &Plane<'_>, &mut [u8]) -> Result<()>;

/// Kernels in `ScaleMethod` discriminant order
const KERNELS: [KernelFn; 3] = [nearest::scale, bilinear::scale, fourtap::scale];

/// Scales planes of one sample layout with one method
#[derive(Debug, Clone, Copy)]
pub struct Resampler {
    method: ScaleMethod,
    sample: SampleLayout,
    lanes: &'static [Lane],
}

impl Resampler {
    pub fn new(method: ScaleMethod, sample: SampleLayout) -> Result<Self> {
        let lanes = lanes(sample);
        if lanes.is_empty() {
            return Err(Error::UnsupportedMethodForFormat {
                format: format!("{:?}", sample),
                method: method.to_string(),
            });
        }
        Ok(Self {
            method,
            sample,
            lanes,
        })
    }

    /// Resampler for every plane of `format` (all planes share one layout)
    pub fn for_format(method: ScaleMethod, format: PixelFormat) -> Result<Self> {
        Self::new(method, format.info().sample)
    }

    pub fn method(&self) -> ScaleMethod {
        self.method
    }

    /// Scratch bytes a call needs for a destination with the given stride
    pub fn scratch_len(&self, dst_stride: usize) -> usize {
        self.method.scratch_rows() * dst_stride
    }

    /// Scale `src` into `dst`
    ///
    /// Both planes must hold at least `height` rows of `row_bytes(width)`
    /// bytes. Equal sizes copy rows verbatim.
    pub fn scale(&self, dst: &mut PlaneMut<'_>, src: &Plane<'_>, scratch: &mut [u8]) -> Result<()> {
        if dst.height == 0 || dst.width == 0 {
            return Ok(());
        }
        if src.height == 0 || src.width == 0 {
            return Err(Error::GeometryMismatch(format!(
                "empty source plane for {}x{} destination",
                dst.width, dst.height
            )));
        }

        self.check_rows(dst.width, dst.stride, "destination")?;
        self.check_rows(src.width, src.stride, "source")?;

        if src.width == dst.width && src.height == dst.height {
            let len = row_bytes(self.sample, dst.width);
            for y in 0..dst.height {
                dst.row_mut(y)[..len].copy_from_slice(&src.row(y)[..len]);
            }
            return Ok(());
        }

        let needed = self.scratch_len(dst.stride);
        if scratch.len() < needed {
            return Err(Error::GeometryMismatch(format!(
                "scratch holds {} bytes, {} needed",
                scratch.len(),
                needed
            )));
        }

        (self.method.kernel())(self.lanes, dst, src, scratch)
    }

    fn check_rows(&self, width: u32, stride: usize, what: &str) -> Result<()> {
        let len = row_bytes(self.sample, width);
        if len > stride {
            return Err(Error::GeometryMismatch(format!(
                "{} row needs {} bytes but stride is {}",
                what, len, stride
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale_gray(method: ScaleMethod, src: &[u8], sw: u32, sh: u32, dw: u32, dh: u32) -> Vec<u8> {
        let resampler = Resampler::new(method, SampleLayout::Gray8).unwrap();
        let mut out = vec![0u8; (dw * dh) as usize];
        let mut scratch = vec![0u8; 4 * dw as usize];
        let src = Plane::new(src, sw, sh, sw as usize);
        let mut dst = PlaneMut::new(&mut out, dw, dh, dw as usize);
        resampler.scale(&mut dst, &src, &mut scratch).unwrap();
        out
    }

    #[test]
    fn test_method_names() {
        assert_eq!("4tap".parse::<ScaleMethod>().unwrap(), ScaleMethod::FourTap);
        assert_eq!(
            "Nearest-Neighbour".parse::<ScaleMethod>().unwrap(),
            ScaleMethod::Nearest
        );
        assert_eq!(
            "linear".parse::<ScaleMethod>().unwrap(),
            ScaleMethod::Bilinear
        );
        assert!("bicubic".parse::<ScaleMethod>().is_err());
        assert_eq!(ScaleMethod::default(), ScaleMethod::Bilinear);
        for method in ScaleMethod::ALL {
            assert_eq!(method.name().parse::<ScaleMethod>().unwrap(), method);
        }
    }

    #[test]
    fn test_nearest_rgba_halving() {
        let (sw, sh) = (100u32, 100u32);
        let src: Vec<u8> = (0..sw * sh * 4).map(|i| (i * 7 % 251) as u8).collect();
        let resampler = Resampler::new(ScaleMethod::Nearest, SampleLayout::Packed4).unwrap();
        let mut out = vec![0u8; 50 * 50 * 4];
        let src_plane = Plane::new(&src, sw, sh, 400);
        let mut dst = PlaneMut::new(&mut out, 50, 50, 200);
        resampler.scale(&mut dst, &src_plane, &mut []).unwrap();

        assert_eq!(&out[0..4], &src[0..4]);
        let d = (49 * 50 + 49) * 4;
        let s = (98 * 100 + 98) * 4;
        assert_eq!(&out[d..d + 4], &src[s..s + 4]);
    }

    #[test]
    fn test_bilinear_midpoint() {
        let out = scale_gray(ScaleMethod::Bilinear, &[0, 255], 2, 1, 3, 1);
        assert_eq!(out, vec![0, 128, 255]);

        let out = scale_gray(ScaleMethod::Bilinear, &[10, 20, 30, 40], 4, 1, 7, 1);
        assert_eq!(out, vec![10, 15, 20, 25, 30, 35, 40]);
    }

    #[test]
    fn test_bilinear_vertical() {
        // One column, rows 0 and 200
        let out = scale_gray(ScaleMethod::Bilinear, &[0, 200], 1, 2, 1, 5);
        assert_eq!(out, vec![0, 50, 100, 150, 200]);
    }

    #[test]
    fn test_fourtap_step_edge() {
        let src = [0, 0, 0, 0, 255, 255, 255, 255];
        let out = scale_gray(ScaleMethod::FourTap, &src, 8, 1, 29, 1);
        for (i, &v) in out.iter().enumerate() {
            if i <= 12 {
                assert_eq!(v, 0, "sample {}", i);
            }
            if i >= 16 {
                assert_eq!(v, 255, "sample {}", i);
            }
        }
        assert_eq!(out[14], 128);
    }

    #[test]
    fn test_constant_input_preserved() {
        let src = vec![173u8; 9 * 7];
        for method in ScaleMethod::ALL {
            for (dw, dh) in [(4, 3), (23, 17), (9, 2), (1, 1)] {
                let out = scale_gray(method, &src, 9, 7, dw, dh);
                assert!(out.iter().all(|&v| v == 173), "{} {}x{}", method, dw, dh);
            }
        }
    }

    #[test]
    fn test_same_size_copies() {
        let src: Vec<u8> = (0..48).map(|i| i as u8 * 5).collect();
        for method in ScaleMethod::ALL {
            assert_eq!(scale_gray(method, &src, 8, 6, 8, 6), src);
        }
    }

    #[test]
    fn test_yuyv_chroma_stays_in_its_lane() {
        // 4 pixels: Y ramps, U = 100, V = 200
        let src = [0u8, 100, 60, 200, 120, 100, 180, 200];
        let resampler = Resampler::new(ScaleMethod::Bilinear, SampleLayout::Yuyv).unwrap();
        let mut out = vec![0u8; 16];
        let mut scratch = vec![0u8; 2 * 16];
        let src_plane = Plane::new(&src, 4, 1, 8);
        let mut dst = PlaneMut::new(&mut out, 7, 1, 16);
        resampler.scale(&mut dst, &src_plane, &mut scratch).unwrap();

        for mp in out.chunks(4) {
            assert_eq!(mp[1], 100);
            assert_eq!(mp[3], 200);
        }
        assert_eq!(out[0], 0);
        assert_eq!(out[2], 30);
        assert_eq!(out[12], 180);
    }

    #[test]
    fn test_rgb565_bilinear_saturates_per_field() {
        let white = 0xffffu16.to_ne_bytes();
        let src = [white, white].concat();
        let resampler = Resampler::new(ScaleMethod::FourTap, SampleLayout::Rgb565).unwrap();
        let mut out = vec![0u8; 10];
        let mut scratch = vec![0u8; 40];
        let src_plane = Plane::new(&src, 2, 1, 4);
        let mut dst = PlaneMut::new(&mut out, 5, 1, 10);
        resampler.scale(&mut dst, &src_plane, &mut scratch).unwrap();
        for px in out.chunks(2) {
            assert_eq!(u16::from_ne_bytes([px[0], px[1]]), 0xffff);
        }
    }

    #[test]
    fn test_short_scratch_rejected() {
        let resampler = Resampler::new(ScaleMethod::FourTap, SampleLayout::Gray8).unwrap();
        let src = [0u8; 16];
        let mut out = [0u8; 8];
        let src_plane = Plane::new(&src, 4, 4, 4);
        let mut dst = PlaneMut::new(&mut out, 2, 4, 2);
        let err = resampler.scale(&mut dst, &src_plane, &mut [0u8; 7]).unwrap_err();
        assert!(matches!(err, Error::GeometryMismatch(_)));
    }

    #[test]
    fn test_empty_source_rejected() {
        let resampler = Resampler::new(ScaleMethod::Nearest, SampleLayout::Gray8).unwrap();
        let mut out = [0u8; 4];
        let mut dst = PlaneMut::new(&mut out, 2, 2, 2);
        let src = Plane::new(&[], 2, 0, 2);
        assert!(resampler.scale(&mut dst, &src, &mut []).is_err());

        // Nothing to write is fine
        let mut none = PlaneMut::new(&mut [], 2, 0, 2);
        let src = Plane::new(&[1, 2], 2, 1, 2);
        assert!(resampler.scale(&mut none, &src, &mut []).is_ok());
    }
}
