//! Raw video pipeline
//!
//! Connects reader → scale → writer for streams of headerless, fixed-size
//! frames. A reader thread feeds the scaler through a bounded channel so
//! I/O overlaps with scaling.

use std::io::{ErrorKind, Read, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::ScaleConfig;
use crate::error::{Error, Result};
use crate::negotiate::{fixate, VideoInfo};
use crate::processing::{ScaleRequest, Scaler};

/// Frames buffered between the reader thread and the scaler
const CHANNEL_CAPACITY: usize = 4;

/// Pipeline counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub frames_read: u64,
    pub frames_scaled: u64,
    pub bytes_written: u64,
}

/// Scales every frame of a raw video stream
pub struct RawVideoPipeline {
    request: ScaleRequest,
    stats: Arc<Mutex<PipelineStats>>,
}

impl RawVideoPipeline {
    pub fn new(request: ScaleRequest) -> Self {
        Self {
            request,
            stats: Arc::new(Mutex::new(PipelineStats::default())),
        }
    }

    /// Negotiate the output size for `src` under `config` and build a
    /// pipeline for it
    pub fn from_config(src: &VideoInfo, config: &ScaleConfig) -> Result<Self> {
        let fixated = fixate(src, &config.output_caps())?;
        let dst = fixated.video_info(src);
        tracing::info!(
            "Negotiated {} {}x{} -> {}x{} ({})",
            src.format,
            src.width,
            src.height,
            dst.width,
            dst.height,
            config.method
        );
        let request = ScaleRequest::new(
            src.geometry()?,
            dst.geometry()?,
            config.method,
            src.interlaced,
        )?;
        Ok(Self::new(request))
    }

    pub fn request(&self) -> &ScaleRequest {
        &self.request
    }

    /// Current counters
    pub fn stats(&self) -> PipelineStats {
        *self.stats.lock()
    }

    /// Scale frames from `reader` to `writer` until the reader is exhausted
    ///
    /// The stream must hold a whole number of frames; a short trailing frame
    /// fails with [`Error::Pipeline`] after the complete frames are written.
    pub fn run<R, W>(&self, reader: R, mut writer: W) -> Result<PipelineStats>
    where
        R: Read + Send,
        W: Write,
    {
        let frame_size = self.request.src_layout().size;
        let (frame_tx, frame_rx) = crossbeam_channel::bounded::<Result<Vec<u8>>>(CHANNEL_CAPACITY);
        let mut scaler = Scaler::new(self.request.clone());
        let mut out = vec![0u8; self.request.dst_layout().size];
        let stats = self.stats.clone();

        tracing::info!("Pipeline starting ({} byte frames)", frame_size);

        let result = std::thread::scope(|s| -> Result<()> {
            s.spawn(move || read_frames(reader, frame_size, frame_tx, stats));

            // Consumed by value so an early return hangs up on the reader
            for frame in frame_rx {
                let frame = frame?;
                scaler.scale_into(&frame, &mut out)?;
                writer.write_all(&out)?;

                let mut stats = self.stats.lock();
                stats.frames_scaled += 1;
                stats.bytes_written += out.len() as u64;
                tracing::trace!("Scaled frame {}", stats.frames_scaled);
            }
            writer.flush()?;
            Ok(())
        });

        let stats = self.stats();
        match &result {
            Ok(()) => tracing::info!(
                "Pipeline finished: {} frames, {} bytes written",
                stats.frames_scaled,
                stats.bytes_written
            ),
            Err(e) => tracing::error!("Pipeline error: {}", e),
        }
        result.map(|()| stats)
    }
}

/// Reader thread body. Stops at end of stream, on error, or when the
/// scaler side hangs up.
fn read_frames<R: Read>(
    mut reader: R,
    frame_size: usize,
    frame_tx: crossbeam_channel::Sender<Result<Vec<u8>>>,
    stats: Arc<Mutex<PipelineStats>>,
) {
    loop {
        let mut frame = vec![0u8; frame_size];
        let message = match read_frame(&mut reader, &mut frame) {
            Ok(false) => {
                tracing::debug!("End of stream");
                return;
            }
            Ok(true) => {
                stats.lock().frames_read += 1;
                Ok(frame)
            }
            Err(e) => Err(e),
        };
        let failed = message.is_err();
        if frame_tx.send(message).is_err() || failed {
            return;
        }
    }
}

/// Fill `buf` with one frame. `Ok(false)` on a clean end of stream.
fn read_frame<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    match filled {
        0 => Ok(false),
        n if n == buf.len() => Ok(true),
        n => Err(Error::Pipeline(format!("truncated frame: {} of {} bytes", n, buf.len()))),
    }
}
