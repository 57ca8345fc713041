//! Common types used throughout framescale

use crate::error::{Error, Result};
use crate::format::PixelFormat;
use crate::geometry::{compute_layout, FrameLayout};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Video resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    // Common resolutions
    pub const SD_480P: Self = Self::new(854, 480);
    pub const HD_720P: Self = Self::new(1280, 720);
    pub const FHD_1080P: Self = Self::new(1920, 1080);
    pub const UHD_4K: Self = Self::new(3840, 2160);
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = Error;

    /// Parse `WIDTHxHEIGHT`, e.g. `1920x1080`
    fn from_str(s: &str) -> Result<Self> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| Error::InvalidDimensions(format!("expected WxH, got {:?}", s)))?;
        let width = w
            .trim()
            .parse()
            .map_err(|_| Error::InvalidDimensions(format!("bad width in {:?}", s)))?;
        let height = h
            .trim()
            .parse()
            .map_err(|_| Error::InvalidDimensions(format!("bad height in {:?}", s)))?;
        Ok(Self::new(width, height))
    }
}

/// Reduced rational number, used for pixel-aspect-ratios and display ratios
///
/// Serialized as `"num/den"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fraction {
    pub num: i32,
    pub den: i32,
}

impl Fraction {
    /// Square pixels
    pub const ONE: Self = Self { num: 1, den: 1 };

    /// Create a new fraction, reduced to lowest terms with a positive
    /// denominator
    pub fn new(num: i32, den: i32) -> Self {
        let mut f = Fraction { num, den };
        f.reduce();
        f
    }

    fn reduce(&mut self) {
        if self.den == 0 {
            return;
        }

        let g = gcd(self.num as i64, self.den as i64);
        if g > 1 {
            self.num = (self.num as i64 / g) as i32;
            self.den = (self.den as i64 / g) as i32;
        }

        if self.den < 0 {
            self.num = -self.num;
            self.den = -self.den;
        }
    }

    /// Multiply two fractions, cross-reducing first so intermediate values
    /// stay as small as possible. Returns `None` when the reduced product
    /// does not fit in `i32`.
    pub fn checked_mul(self, other: Fraction) -> Option<Fraction> {
        let (mut a_n, mut a_d) = (self.num as i64, self.den as i64);
        let (mut b_n, mut b_d) = (other.num as i64, other.den as i64);

        let g = gcd(a_n, b_d);
        if g > 1 {
            a_n /= g;
            b_d /= g;
        }
        let g = gcd(b_n, a_d);
        if g > 1 {
            b_n /= g;
            a_d /= g;
        }

        let num = i32::try_from(a_n.checked_mul(b_n)?).ok()?;
        let den = i32::try_from(a_d.checked_mul(b_d)?).ok()?;
        Some(Fraction::new(num, den))
    }

    /// Swap numerator and denominator
    pub fn invert(self) -> Self {
        Fraction::new(self.den, self.num)
    }

    /// Compare by value (denominators must be positive)
    pub fn cmp_value(&self, other: &Fraction) -> Ordering {
        let lhs = self.num as i64 * other.den as i64;
        let rhs = other.num as i64 * self.den as i64;
        lhs.cmp(&rhs)
    }
}

impl Default for Fraction {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl FromStr for Fraction {
    type Err = Error;

    /// Parse `N/D`, `N:D` or a bare integer `N`
    fn from_str(s: &str) -> Result<Self> {
        let bad = || Error::Config(format!("invalid fraction {:?}", s));
        let (num, den) = match s.split_once(['/', ':']) {
            Some((n, d)) => (
                n.trim().parse::<i32>().map_err(|_| bad())?,
                d.trim().parse::<i32>().map_err(|_| bad())?,
            ),
            None => (s.trim().parse::<i32>().map_err(|_| bad())?, 1),
        };
        if den == 0 {
            return Err(bad());
        }
        Ok(Fraction::new(num, den))
    }
}

impl TryFrom<String> for Fraction {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Fraction> for String {
    fn from(f: Fraction) -> Self {
        f.to_string()
    }
}

/// Greatest common divisor of the absolute values
pub(crate) fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// A raw video frame
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw frame data, exactly `layout.size` bytes
    pub data: Vec<u8>,
    /// Plane layout of `data`
    pub layout: FrameLayout,
    /// Whether the frame carries two interleaved fields
    pub interlaced: bool,
    /// Presentation timestamp in microseconds
    pub pts: i64,
    /// Duration in microseconds
    pub duration: i64,
}

impl Frame {
    /// Create a new zeroed frame sized for the format and dimensions
    pub fn new(format: PixelFormat, width: u32, height: u32) -> Result<Self> {
        let layout = compute_layout(format, width, height)?;
        Ok(Self {
            data: vec![0u8; layout.size],
            layout,
            interlaced: false,
            pts: 0,
            duration: 0,
        })
    }

    /// Create a frame from existing data; the data must match the layout size
    pub fn from_data(data: Vec<u8>, format: PixelFormat, width: u32, height: u32) -> Result<Self> {
        let layout = compute_layout(format, width, height)?;
        if data.len() != layout.size {
            return Err(Error::GeometryMismatch(format!(
                "{} {}x{} needs {} bytes, got {}",
                format,
                width,
                height,
                layout.size,
                data.len()
            )));
        }
        Ok(Self {
            data,
            layout,
            interlaced: false,
            pts: 0,
            duration: 0,
        })
    }

    pub fn with_interlaced(mut self, interlaced: bool) -> Self {
        self.interlaced = interlaced;
        self
    }

    pub fn format(&self) -> PixelFormat {
        self.layout.format
    }

    /// Get resolution
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.layout.width, self.layout.height)
    }

    /// Calculate frame size in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_reduction() {
        let f = Fraction::new(20, -30);
        assert_eq!(f, Fraction::new(-2, 3));
        assert_eq!(Fraction::new(16, 16), Fraction::ONE);
    }

    #[test]
    fn test_fraction_checked_mul() {
        let a = Fraction::new(720, 576);
        let b = Fraction::new(16, 15);
        assert_eq!(a.checked_mul(b), Some(Fraction::new(4, 3)));

        let big = Fraction::new(i32::MAX, 1);
        assert_eq!(big.checked_mul(Fraction::new(2, 1)), None);
        // Cross reduction keeps this in range
        let tiny = Fraction::new(1, i32::MAX);
        assert_eq!(big.checked_mul(tiny), Some(Fraction::ONE));
    }

    #[test]
    fn test_fraction_parse() {
        assert_eq!("16/15".parse::<Fraction>().unwrap(), Fraction::new(16, 15));
        assert_eq!("4:3".parse::<Fraction>().unwrap(), Fraction::new(4, 3));
        assert_eq!("2".parse::<Fraction>().unwrap(), Fraction::new(2, 1));
        assert!("1/0".parse::<Fraction>().is_err());
        assert!("abc".parse::<Fraction>().is_err());
    }

    #[test]
    fn test_fraction_ordering() {
        let a = Fraction::new(1, 2);
        let b = Fraction::new(2, 3);
        assert_eq!(a.cmp_value(&b), Ordering::Less);
        assert_eq!(b.cmp_value(&a), Ordering::Greater);
        assert_eq!(a.cmp_value(&Fraction::new(3, 6)), Ordering::Equal);
    }

    #[test]
    fn test_resolution_parse() {
        let r: Resolution = "1920x1080".parse().unwrap();
        assert_eq!(r, Resolution::FHD_1080P);
        assert_eq!(r.to_string(), "1920x1080");
        assert!("1920".parse::<Resolution>().is_err());
    }

    #[test]
    fn test_frame_allocation_matches_layout() {
        let frame = Frame::new(PixelFormat::I420, 64, 64).unwrap();
        assert_eq!(frame.size_bytes(), 6144);
        assert!(Frame::from_data(vec![0; 10], PixelFormat::I420, 64, 64).is_err());
    }
}
