//! Pixel format catalog
//!
//! Every supported encoding is described by one [`FormatInfo`] entry: how
//! its planes are laid out and how samples are packed inside a row. The
//! catalog is built once per process and never mutated afterwards.

use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    #[serde(rename = "RGBA")]
    Rgba,
    #[serde(rename = "ARGB")]
    Argb,
    #[serde(rename = "BGRA")]
    Bgra,
    #[serde(rename = "ABGR")]
    Abgr,
    /// Packed 4:4:4 YUV with alpha
    #[serde(rename = "AYUV")]
    Ayuv,
    #[serde(rename = "RGBx")]
    Rgbx,
    #[serde(rename = "xRGB")]
    Xrgb,
    #[serde(rename = "BGRx")]
    Bgrx,
    #[serde(rename = "xBGR")]
    Xbgr,
    /// Planar 4:4:4 YUV
    #[serde(rename = "Y444")]
    Y444,
    /// Packed 4:4:4 YUV, 3 bytes per pixel
    #[serde(rename = "v308")]
    V308,
    #[serde(rename = "RGB")]
    Rgb,
    #[serde(rename = "BGR")]
    Bgr,
    /// Planar 4:2:2 YUV
    #[serde(rename = "Y42B")]
    Y42b,
    /// Packed 4:2:2 YUV, Y0 U Y1 V
    #[serde(rename = "YUY2")]
    Yuy2,
    /// Packed 4:2:2 YUV, Y0 V Y1 U
    #[serde(rename = "YVYU")]
    Yvyu,
    /// Packed 4:2:2 YUV, U Y0 V Y1
    #[serde(rename = "UYVY")]
    Uyvy,
    /// Planar 4:2:0 YUV, planes Y U V
    #[serde(rename = "I420")]
    I420,
    /// Planar 4:2:0 YUV, planes Y V U
    #[serde(rename = "YV12")]
    Yv12,
    /// Planar 4:1:1 YUV
    #[serde(rename = "Y41B")]
    Y41b,
    #[serde(rename = "RGB565")]
    Rgb565,
    #[serde(rename = "RGB555")]
    Rgb555,
    #[serde(rename = "GRAY16")]
    Gray16,
    #[serde(rename = "GRAY8")]
    Gray8,
    /// Luma only, laid out like GRAY8
    #[serde(rename = "Y800")]
    Y800,
}

impl PixelFormat {
    /// All formats in catalog order
    pub const ALL: [PixelFormat; 25] = [
        PixelFormat::Rgba,
        PixelFormat::Argb,
        PixelFormat::Bgra,
        PixelFormat::Abgr,
        PixelFormat::Ayuv,
        PixelFormat::Rgbx,
        PixelFormat::Xrgb,
        PixelFormat::Bgrx,
        PixelFormat::Xbgr,
        PixelFormat::Y444,
        PixelFormat::V308,
        PixelFormat::Rgb,
        PixelFormat::Bgr,
        PixelFormat::Y42b,
        PixelFormat::Yuy2,
        PixelFormat::Yvyu,
        PixelFormat::Uyvy,
        PixelFormat::I420,
        PixelFormat::Yv12,
        PixelFormat::Y41b,
        PixelFormat::Rgb565,
        PixelFormat::Rgb555,
        PixelFormat::Gray16,
        PixelFormat::Gray8,
        PixelFormat::Y800,
    ];

    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            PixelFormat::Rgba => "RGBA",
            PixelFormat::Argb => "ARGB",
            PixelFormat::Bgra => "BGRA",
            PixelFormat::Abgr => "ABGR",
            PixelFormat::Ayuv => "AYUV",
            PixelFormat::Rgbx => "RGBx",
            PixelFormat::Xrgb => "xRGB",
            PixelFormat::Bgrx => "BGRx",
            PixelFormat::Xbgr => "xBGR",
            PixelFormat::Y444 => "Y444",
            PixelFormat::V308 => "v308",
            PixelFormat::Rgb => "RGB",
            PixelFormat::Bgr => "BGR",
            PixelFormat::Y42b => "Y42B",
            PixelFormat::Yuy2 => "YUY2",
            PixelFormat::Yvyu => "YVYU",
            PixelFormat::Uyvy => "UYVY",
            PixelFormat::I420 => "I420",
            PixelFormat::Yv12 => "YV12",
            PixelFormat::Y41b => "Y41B",
            PixelFormat::Rgb565 => "RGB565",
            PixelFormat::Rgb555 => "RGB555",
            PixelFormat::Gray16 => "GRAY16",
            PixelFormat::Gray8 => "GRAY8",
            PixelFormat::Y800 => "Y800",
        }
    }

    /// Catalog entry for this format
    pub fn info(&self) -> &'static FormatInfo {
        // Every variant is registered; see `build_registry`.
        &registry().entries[*self as usize]
    }

    pub fn is_planar(&self) -> bool {
        self.info().planar
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PixelFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        registry().lookup(s).map(|info| info.format)
    }
}

/// Role of a plane inside a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneRole {
    /// The only plane of a packed format
    Packed,
    /// Luma
    Y,
    /// Blue-difference chroma
    U,
    /// Red-difference chroma
    V,
}

/// How a format splits into planes and how strides are aligned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneLayoutRule {
    /// Single plane, `stride = round_up(width * bytes_per_pixel, align)`
    Packed { bytes_per_pixel: u32, align: u32 },
    /// Three full-resolution planes
    Planar444,
    /// Chroma subsampled 2x horizontally
    Planar422,
    /// Chroma subsampled 4x horizontally
    Planar411,
    /// Chroma subsampled 2x in both directions
    Planar420,
}

/// How samples are packed inside one row of one plane; selects the
/// resampler's component lanes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleLayout {
    /// One byte per sample
    Gray8,
    /// One native-endian 16-bit word per sample
    Gray16,
    /// Three interleaved bytes per pixel
    Packed3,
    /// Four interleaved bytes per pixel
    Packed4,
    /// 4:2:2 macropixels Y0 C0 Y1 C1
    Yuyv,
    /// 4:2:2 macropixels C0 Y0 C1 Y1
    Uyvy,
    /// 5-6-5 bitfields in a native-endian word
    Rgb565,
    /// 5-5-5 bitfields in a native-endian word, top bit unused
    Rgb555,
}

/// Catalog entry
#[derive(Debug, Clone)]
pub struct FormatInfo {
    pub format: PixelFormat,
    pub name: &'static str,
    /// Components per pixel (alpha or padding bytes included)
    pub channels: u32,
    pub planar: bool,
    pub layout: PlaneLayoutRule,
    /// Sample packing of every plane of this format
    pub sample: SampleLayout,
    /// Plane roles in memory order
    pub planes: &'static [PlaneRole],
}

const PACKED: &[PlaneRole] = &[PlaneRole::Packed];
const YUV: &[PlaneRole] = &[PlaneRole::Y, PlaneRole::U, PlaneRole::V];
const YVU: &[PlaneRole] = &[PlaneRole::Y, PlaneRole::V, PlaneRole::U];

/// Immutable, process-scoped format registry
#[derive(Debug)]
pub struct FormatRegistry {
    entries: Vec<FormatInfo>,
    by_name: HashMap<String, usize>,
}

impl FormatRegistry {
    /// Look a format up by name (case-insensitive)
    pub fn lookup(&self, name: &str) -> Result<&FormatInfo> {
        self.by_name
            .get(&name.trim().to_ascii_lowercase())
            .map(|&idx| &self.entries[idx])
            .ok_or_else(|| Error::UnsupportedFormat(name.to_string()))
    }

    /// All entries in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &FormatInfo> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

static REGISTRY: OnceLock<FormatRegistry> = OnceLock::new();

/// Shared format registry, built on first use
pub fn registry() -> &'static FormatRegistry {
    REGISTRY.get_or_init(build_registry)
}

fn entry(format: PixelFormat) -> FormatInfo {
    use PixelFormat::*;

    let packed = |bytes_per_pixel, align| PlaneLayoutRule::Packed {
        bytes_per_pixel,
        align,
    };

    let (channels, layout, sample, planes) = match format {
        Rgba | Argb | Bgra | Abgr | Ayuv | Rgbx | Xrgb | Bgrx | Xbgr => {
            (4, packed(4, 1), SampleLayout::Packed4, PACKED)
        }
        Rgb | Bgr | V308 => (3, packed(3, 4), SampleLayout::Packed3, PACKED),
        Y444 => (3, PlaneLayoutRule::Planar444, SampleLayout::Gray8, YUV),
        Y42b => (3, PlaneLayoutRule::Planar422, SampleLayout::Gray8, YUV),
        Y41b => (3, PlaneLayoutRule::Planar411, SampleLayout::Gray8, YUV),
        I420 => (3, PlaneLayoutRule::Planar420, SampleLayout::Gray8, YUV),
        Yv12 => (3, PlaneLayoutRule::Planar420, SampleLayout::Gray8, YVU),
        Yuy2 | Yvyu => (3, packed(2, 4), SampleLayout::Yuyv, PACKED),
        Uyvy => (3, packed(2, 4), SampleLayout::Uyvy, PACKED),
        Rgb565 => (3, packed(2, 4), SampleLayout::Rgb565, PACKED),
        Rgb555 => (3, packed(2, 4), SampleLayout::Rgb555, PACKED),
        Gray16 => (1, packed(2, 4), SampleLayout::Gray16, PACKED),
        Gray8 | Y800 => (1, packed(1, 4), SampleLayout::Gray8, PACKED),
    };

    FormatInfo {
        format,
        name: format.name(),
        channels,
        planar: planes.len() > 1,
        layout,
        sample,
        planes,
    }
}

fn build_registry() -> FormatRegistry {
    let entries: Vec<FormatInfo> = PixelFormat::ALL.iter().map(|&f| entry(f)).collect();
    let by_name = entries
        .iter()
        .enumerate()
        .map(|(idx, info)| (info.name.to_ascii_lowercase(), idx))
        .collect();

    tracing::debug!("Format registry built with {} formats", entries.len());

    FormatRegistry { entries, by_name }
}
