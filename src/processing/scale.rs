//! Frame scaling
//!
//! A [`ScaleRequest`] is built once per negotiated input/output pair and
//! captures both layouts and the effective method. [`run`] walks the fields
//! and planes of a frame and hands each plane to the [`Resampler`].

use tracing::{debug, trace, warn};

use super::locate::{locate_all, Field, PlaneView};
use super::resample::{Resampler, ScaleMethod};
use crate::error::{Error, Result};
use crate::geometry::{FrameGeometry, FrameLayout};

/// Source field heights below this switch 4-tap to bilinear
const FOURTAP_MIN_HEIGHT: u32 = 4;

/// Immutable description of one scaling operation
#[derive(Debug, Clone)]
pub struct ScaleRequest {
    src: FrameLayout,
    dst: FrameLayout,
    requested: ScaleMethod,
    method: ScaleMethod,
    interlaced: bool,
    resampler: Resampler,
}

impl ScaleRequest {
    /// Build a request scaling `src` frames into `dst` frames
    ///
    /// Both sides must share a pixel format. 4-tap needs four source rows
    /// per field and is replaced with bilinear below that.
    pub fn new(
        src: FrameGeometry,
        dst: FrameGeometry,
        method: ScaleMethod,
        interlaced: bool,
    ) -> Result<Self> {
        if src.format != dst.format {
            return Err(Error::FormatMismatch {
                src: src.format.to_string(),
                dst: dst.format.to_string(),
            });
        }

        let src_layout = src.layout()?;
        let dst_layout = dst.layout()?;

        let field_height = if interlaced {
            src.height / 2
        } else {
            src.height
        };
        let effective = if method == ScaleMethod::FourTap && field_height < FOURTAP_MIN_HEIGHT {
            warn!(
                "Source field height {} too small for {}, using {}",
                field_height,
                method,
                ScaleMethod::Bilinear
            );
            ScaleMethod::Bilinear
        } else {
            method
        };

        let resampler = Resampler::for_format(effective, src.format)?;

        debug!(
            "Scale request {} {}x{} -> {}x{} method={} interlaced={}",
            src.format, src.width, src.height, dst.width, dst.height, effective, interlaced
        );

        Ok(Self {
            src: src_layout,
            dst: dst_layout,
            requested: method,
            method: effective,
            interlaced,
            resampler,
        })
    }

    /// Method actually used for every plane
    pub fn method(&self) -> ScaleMethod {
        self.method
    }

    pub fn requested_method(&self) -> ScaleMethod {
        self.requested
    }

    pub fn src_layout(&self) -> &FrameLayout {
        &self.src
    }

    pub fn dst_layout(&self) -> &FrameLayout {
        &self.dst
    }

    pub fn interlaced(&self) -> bool {
        self.interlaced
    }

    /// Scratch bytes [`run`] needs: four rows of the widest destination
    /// stride, doubled for field-interleaved rows
    pub fn scratch_len(&self) -> usize {
        let fields = if self.interlaced { 2 } else { 1 };
        4 * self.dst.max_stride() * fields
    }

    fn fields(&self) -> &'static [Option<Field>] {
        if self.interlaced {
            &[Some(Field::Top), Some(Field::Bottom)]
        } else {
            &[None]
        }
    }
}

/// Scale one frame from `src` into `dst`
///
/// `dst` must be exactly the destination layout size and `src` at least the
/// source layout size. The scratch buffer is only used for this call.
pub fn run(
    request: &ScaleRequest,
    src: &[u8],
    dst: &mut [u8],
    scratch: &mut [u8],
) -> Result<()> {
    if dst.len() != request.dst.size {
        return Err(Error::GeometryMismatch(format!(
            "destination buffer is {} bytes, layout needs {}",
            dst.len(),
            request.dst.size
        )));
    }
    if src.len() < request.src.size {
        return Err(Error::GeometryMismatch(format!(
            "source buffer is {} bytes, layout needs {}",
            src.len(),
            request.src.size
        )));
    }
    let needed = request.scratch_len();
    if scratch.len() < needed {
        return Err(Error::GeometryMismatch(format!(
            "scratch buffer is {} bytes, {} needed",
            scratch.len(),
            needed
        )));
    }

    for &field in request.fields() {
        let src_views = locate_all(&request.src, field);
        let dst_views = locate_all(&request.dst, field);
        let top_views = field.map(|_| locate_all(&request.src, Some(Field::Top)));

        for (i, (from, to)) in src_views.iter().zip(&dst_views).enumerate() {
            let from = source_view(from, top_views.as_ref().map(|v| &v[i]));
            trace!(
                "field={:?} plane={:?} {}x{} -> {}x{}",
                field, to.role, from.width, from.height, to.width, to.height
            );

            let src_plane = from.plane(src)?;
            let mut dst_plane = to.plane_mut(dst)?;
            request.resampler.scale(&mut dst_plane, &src_plane, scratch)?;
        }
    }
    Ok(())
}

/// A single-row plane has nothing in its bottom field; read the top
/// field's row instead
fn source_view(view: &PlaneView, top: Option<&PlaneView>) -> PlaneView {
    match top {
        Some(top) if view.height == 0 => *top,
        _ => *view,
    }
}

/// Frame scaler owning a request and its scratch buffer
pub struct Scaler {
    request: ScaleRequest,
    scratch: Vec<u8>,
}

impl Scaler {
    pub fn new(request: ScaleRequest) -> Self {
        let scratch = vec![0u8; request.scratch_len()];
        Self { request, scratch }
    }

    pub fn request(&self) -> &ScaleRequest {
        &self.request
    }

    /// Scale `src` into a caller-provided `dst`
    pub fn scale_into(&mut self, src: &[u8], dst: &mut [u8]) -> Result<()> {
        run(&self.request, src, dst, &mut self.scratch)
    }

    /// Scale `src` into a newly allocated destination buffer
    pub fn scale(&mut self, src: &[u8]) -> Result<Vec<u8>> {
        let mut dst = vec![0u8; self.request.dst.size];
        self.scale_into(src, &mut dst)?;
        Ok(dst)
    }
}
