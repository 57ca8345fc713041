//! Output geometry negotiation
//!
//! Given fixed input caps and a partially constrained output side, picks an
//! output width, height and pixel-aspect-ratio that keep the display aspect
//! ratio of the input.

use std::cmp::Ordering;

use tracing::debug;

use crate::error::{Error, Result};
use crate::format::PixelFormat;
use crate::geometry::{compute_layout, FrameGeometry, MAX_DIMENSION};
use crate::types::{Fraction, Resolution};

/// Fully decoded caps of one side of the scaler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoInfo {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub interlaced: bool,
    /// Pixel-aspect-ratio, `None` when the caps carry no PAR field
    pub par: Option<Fraction>,
}

impl VideoInfo {
    pub fn new(format: PixelFormat, width: u32, height: u32) -> Self {
        Self {
            format,
            width,
            height,
            interlaced: false,
            par: None,
        }
    }

    pub fn with_par(mut self, par: Fraction) -> Self {
        self.par = Some(par);
        self
    }

    pub fn with_interlaced(mut self, interlaced: bool) -> Self {
        self.interlaced = interlaced;
        self
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    pub fn geometry(&self) -> Result<FrameGeometry> {
        FrameGeometry::new(self.format, self.width, self.height)
    }
}

/// Constraint on one output dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DimConstraint {
    #[default]
    Any,
    Fixed(u32),
    /// Inclusive range
    Range { min: u32, max: u32 },
}

impl DimConstraint {
    pub fn fixed(&self) -> Option<u32> {
        match self {
            DimConstraint::Fixed(v) => Some(*v),
            _ => None,
        }
    }

    /// Value allowed by this constraint closest to `target`, kept inside
    /// `1..=MAX_DIMENSION`
    pub fn fixate_nearest(&self, target: u64) -> u32 {
        let limit = |v: u64| v.clamp(1, MAX_DIMENSION as u64) as u32;
        match *self {
            DimConstraint::Any => limit(target),
            DimConstraint::Fixed(v) => v,
            DimConstraint::Range { min, max } => {
                limit(target.clamp(min as u64, max.max(min) as u64))
            }
        }
    }

    /// Fails when no value in `1..=MAX_DIMENSION` satisfies the constraint
    pub fn validate(&self, what: &str) -> Result<()> {
        let (min, max) = match *self {
            DimConstraint::Any => return Ok(()),
            DimConstraint::Fixed(v) => (v, v),
            DimConstraint::Range { min, max } => (min, max),
        };
        if min.max(1) > max.min(MAX_DIMENSION) {
            return Err(Error::InvalidDimensions(format!(
                "output {} {:?} outside 1..={}",
                what, self, MAX_DIMENSION
            )));
        }
        Ok(())
    }
}

/// Constraint on the output pixel-aspect-ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParConstraint {
    /// The output caps have no PAR field at all
    Absent,
    #[default]
    Any,
    Fixed(Fraction),
    /// Inclusive range
    Range { min: Fraction, max: Fraction },
}

impl ParConstraint {
    pub fn is_absent(&self) -> bool {
        matches!(self, ParConstraint::Absent)
    }

    /// Fraction allowed by this constraint closest to `target`
    pub fn fixate_nearest(&self, target: Fraction) -> Fraction {
        match *self {
            ParConstraint::Absent | ParConstraint::Any => target,
            ParConstraint::Fixed(f) => f,
            ParConstraint::Range { min, max } => {
                if target.cmp_value(&min) == Ordering::Less {
                    min
                } else if target.cmp_value(&max) == Ordering::Greater {
                    max
                } else {
                    target
                }
            }
        }
    }
}

/// Partially constrained output caps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputCaps {
    pub width: DimConstraint,
    pub height: DimConstraint,
    pub par: ParConstraint,
}

impl OutputCaps {
    pub fn with_width(mut self, width: DimConstraint) -> Self {
        self.width = width;
        self
    }

    pub fn with_height(mut self, height: DimConstraint) -> Self {
        self.height = height;
        self
    }

    pub fn with_par(mut self, par: ParConstraint) -> Self {
        self.par = par;
        self
    }
}

/// Negotiated output geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixated {
    pub width: u32,
    pub height: u32,
    pub par: Option<Fraction>,
}

impl Fixated {
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// Output caps for input `src`: same format and interlacing
    pub fn video_info(&self, src: &VideoInfo) -> VideoInfo {
        VideoInfo {
            format: src.format,
            width: self.width,
            height: self.height,
            interlaced: src.interlaced,
            par: self.par,
        }
    }
}

fn positive(par: Fraction, what: &str) -> Result<()> {
    if par.num <= 0 || par.den <= 0 {
        return Err(Error::InvalidDimensions(format!(
            "{} pixel-aspect-ratio {} is not positive",
            what, par
        )));
    }
    Ok(())
}

/// Display aspect ratio `src_w * src_par / (src_h * dst_par)`, reduced
///
/// Fails with [`Error::NumericOverflow`] when the reduced ratio does not fit
/// in 32 bits.
pub fn display_ratio(
    src_width: u32,
    src_height: u32,
    src_par: Fraction,
    dst_par: Fraction,
) -> Result<Fraction> {
    positive(src_par, "source")?;
    positive(dst_par, "destination")?;

    let overflow = || {
        Error::NumericOverflow(format!(
            "display ratio of {}x{} with PAR {} -> {}",
            src_width, src_height, src_par, dst_par
        ))
    };
    let w = i32::try_from(src_width).map_err(|_| overflow())?;
    let h = i32::try_from(src_height).map_err(|_| overflow())?;
    if h == 0 {
        return Err(Error::InvalidDimensions("source height is 0".into()));
    }

    Fraction::new(w, h)
        .checked_mul(src_par)
        .and_then(|r| r.checked_mul(dst_par.invert()))
        .ok_or_else(overflow)
}

/// `value * num / den`, rounded to nearest
fn scale_round(value: u32, num: i32, den: i32) -> u64 {
    let (num, den) = (num as u64, den as u64);
    (value as u64 * num + den / 2) / den
}

/// Pick output width, height and PAR for input `src` within `dst`
pub fn fixate(src: &VideoInfo, dst: &OutputCaps) -> Result<Fixated> {
    dst.width.validate("width")?;
    dst.height.validate("height")?;

    let from_par = match src.par {
        Some(par) if !dst.par.is_absent() => par,
        _ => return Ok(fixate_without_par(src, dst)),
    };

    let to_par = dst.par.fixate_nearest(from_par);
    if !matches!(dst.par, ParConstraint::Fixed(_)) {
        debug!("Fixating output PAR to {} (input {})", to_par, from_par);
    }

    if let (Some(width), Some(height)) = (dst.width.fixed(), dst.height.fixed()) {
        debug!("Both dimensions fixed at {}x{}", width, height);
        return Ok(Fixated {
            width,
            height,
            par: Some(to_par),
        });
    }

    let ratio = display_ratio(src.width, src.height, from_par, to_par)?;
    let (num, den) = (ratio.num, ratio.den);
    debug!(
        "Scaling {}x{} PAR {} to PAR {}, display ratio {}",
        src.width, src.height, from_par, to_par, ratio
    );

    let (w, h) = if let Some(h) = dst.height.fixed() {
        debug!("Height is fixed, scaling width");
        (scale_round(h, num, den), h as u64)
    } else if let Some(w) = dst.width.fixed() {
        debug!("Width is fixed, scaling height");
        (w as u64, scale_round(w, den, num))
    } else if src.height % den as u32 == 0 {
        debug!("Keeping video height");
        (scale_round(src.height, num, den), src.height as u64)
    } else if src.width % num as u32 == 0 {
        debug!("Keeping video width");
        (src.width as u64, scale_round(src.width, den, num))
    } else {
        debug!("Approximating but keeping video height");
        (scale_round(src.height, num, den), src.height as u64)
    };

    let fixated = Fixated {
        width: dst.width.fixate_nearest(w),
        height: dst.height.fixate_nearest(h),
        par: Some(to_par),
    };
    debug!("Scaling to {}x{}", fixated.width, fixated.height);
    Ok(fixated)
}

/// Without a PAR on both sides each open dimension just follows the input
fn fixate_without_par(src: &VideoInfo, dst: &OutputCaps) -> Fixated {
    let par = match dst.par {
        ParConstraint::Absent | ParConstraint::Any => None,
        constrained => Some(constrained.fixate_nearest(Fraction::ONE)),
    };
    let fixated = Fixated {
        width: dst.width.fixate_nearest(src.width as u64),
        height: dst.height.fixate_nearest(src.height as u64),
        par,
    };
    debug!(
        "No PAR to preserve, fixated {}x{} to {}x{}",
        src.width, src.height, fixated.width, fixated.height
    );
    fixated
}

/// Output caps the scaler can produce from `src`
///
/// The format and interlacing never change, so only the size and PAR are
/// opened up.
pub fn transform_caps(src: &VideoInfo) -> OutputCaps {
    let any_size = DimConstraint::Range {
        min: 1,
        max: MAX_DIMENSION,
    };
    let par = match src.par {
        Some(_) => ParConstraint::Range {
            min: Fraction::new(0, 1),
            max: Fraction::new(i32::MAX, 1),
        },
        None => ParConstraint::Absent,
    };
    OutputCaps {
        width: any_size,
        height: any_size,
        par,
    }
}

/// Buffer size in bytes of one frame described by `info`
pub fn unit_size(info: &VideoInfo) -> Result<usize> {
    Ok(compute_layout(info.format, info.width, info.height)?.size)
}
