//! framescale - Raw Video Frame Scaler
//!
//! Rescales raw video frames between sizes, keeping the pixel format.
//! Handles packed RGB, planar and packed YUV, grayscale and 16-bit RGB
//! layouts, including interlaced content scaled field by field.
//!
//! # Features
//!
//! - **Geometry**: per-format plane strides, offsets and sizes
//! - **Negotiation**: output size and pixel-aspect-ratio selection that keeps
//!   the display aspect ratio
//! - **Scaling**: nearest-neighbour, bilinear and 4-tap resampling
//! - **Pipeline**: threaded scaling of raw video streams
//!
//! # Example
//!
//! ```rust,no_run
//! use framescale::{FrameGeometry, PixelFormat, ScaleMethod, ScaleRequest, Scaler};
//!
//! fn main() -> framescale::Result<()> {
//!     let src = FrameGeometry::new(PixelFormat::I420, 1920, 1080)?;
//!     let dst = FrameGeometry::new(PixelFormat::I420, 1280, 720)?;
//!     let request = ScaleRequest::new(src, dst, ScaleMethod::FourTap, false)?;
//!
//!     let input = vec![0u8; request.src_layout().size];
//!     let mut scaler = Scaler::new(request);
//!     let output = scaler.scale(&input)?;
//!     assert_eq!(output.len(), scaler.request().dst_layout().size);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod geometry;
pub mod navigation;
pub mod negotiate;
pub mod pipeline;
pub mod processing;
pub mod types;

// Re-exports for convenience
pub use config::{ScaleConfig, ScalePreset};
pub use error::{Error, Result};
pub use format::{registry, PixelFormat};
pub use geometry::{compute_layout, FrameGeometry, FrameLayout, PlaneGeometry};
pub use navigation::{rescale_pointer, NavigationEvent};
pub use negotiate::{
    fixate, transform_caps, unit_size, DimConstraint, Fixated, OutputCaps, ParConstraint,
    VideoInfo,
};
pub use pipeline::{PipelineStats, RawVideoPipeline};
pub use processing::{process_frame, ScaleMethod, ScaleRequest, Scaler};
pub use types::{Fraction, Frame, Resolution};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
