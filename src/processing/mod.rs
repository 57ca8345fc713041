//! Video processing module
//!
//! Provides frame processing capabilities:
//! - Plane location, including per-field views of interlaced frames
//! - Per-plane resampling (nearest, bilinear, 4-tap)
//! - Whole-frame scaling

pub mod locate;
mod resample;
mod scale;

pub use locate::{locate, locate_all, Field, Plane, PlaneMut, PlaneView};
pub use resample::{Resampler, ScaleMethod};
pub use scale::{run, ScaleRequest, Scaler};

use crate::error::Result;
use crate::geometry::FrameGeometry;
use crate::types::{Frame, Resolution};

/// Scale a frame to `target`, keeping its format, timing and field order
pub fn process_frame(frame: &Frame, target: Resolution, method: ScaleMethod) -> Result<Frame> {
    if frame.resolution() == target {
        return Ok(frame.clone());
    }

    let src = frame.layout.geometry();
    let dst = FrameGeometry::new(src.format, target.width, target.height)?;
    let mut scaler = Scaler::new(ScaleRequest::new(src, dst, method, frame.interlaced)?);

    let mut out = Frame::new(dst.format, dst.width, dst.height)?;
    scaler.scale_into(&frame.data, &mut out.data)?;

    Ok(Frame {
        interlaced: frame.interlaced,
        pts: frame.pts,
        duration: frame.duration,
        ..out
    })
}
