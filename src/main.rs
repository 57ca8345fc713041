//! framescale CLI
//!
//! Command-line interface for inspecting formats and scaling raw video.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use framescale::{
    compute_layout, fixate, registry, DimConstraint, Fraction, OutputCaps, ParConstraint,
    PixelFormat, RawVideoPipeline, Resolution, ScaleConfig, ScaleMethod, ScalePreset, VideoInfo,
};

#[derive(Parser)]
#[command(name = "framescale")]
#[command(about = "Raw video frame scaler - layouts, negotiation, scaling")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported pixel formats
    Formats,

    /// List available presets
    Presets,

    /// Show the plane layout of a frame
    Layout {
        /// Pixel format (e.g., I420, RGBA, YUY2)
        format: PixelFormat,

        /// Frame size (e.g., 1920x1080)
        size: Resolution,
    },

    /// Negotiate an output size for an input
    Fixate {
        /// Input size (e.g., 720x576)
        size: Resolution,

        /// Input pixel-aspect-ratio (omit for caps without PAR)
        #[arg(long)]
        par: Option<Fraction>,

        /// Fixed output width
        #[arg(long)]
        width: Option<u32>,

        /// Fixed output height
        #[arg(long)]
        height: Option<u32>,

        /// Fixed output pixel-aspect-ratio
        #[arg(long)]
        out_par: Option<Fraction>,
    },

    /// Scale a raw video file
    Scale {
        /// Input file of headerless frames
        #[arg(short, long)]
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Pixel format of input and output
        #[arg(short, long)]
        format: PixelFormat,

        /// Input frame size (e.g., 1920x1080)
        #[arg(short, long)]
        size: Resolution,

        /// Output frame size (default: negotiated from config or preset)
        #[arg(short, long)]
        to: Option<Resolution>,

        /// Input pixel-aspect-ratio
        #[arg(long, default_value = "1/1")]
        par: Fraction,

        /// Scaling method (nearest, bilinear, 4-tap)
        #[arg(short, long)]
        method: Option<ScaleMethod>,

        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Use preset instead of a config file
        #[arg(short, long)]
        preset: Option<ScalePreset>,

        /// Input is interlaced; fields are scaled separately
        #[arg(long)]
        interlaced: bool,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("framescale=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Formats => cmd_formats(),
        Commands::Presets => cmd_presets(),
        Commands::Layout { format, size } => cmd_layout(format, size),
        Commands::Fixate {
            size,
            par,
            width,
            height,
            out_par,
        } => cmd_fixate(size, par, width, height, out_par),
        Commands::Scale {
            input,
            output,
            format,
            size,
            to,
            par,
            method,
            config,
            preset,
            interlaced,
        } => {
            let config = build_config(config, preset, to, method)?;
            let src = VideoInfo::new(format, size.width, size.height)
                .with_par(par)
                .with_interlaced(interlaced);
            cmd_scale(input, output, src, config)
        }
    }
}

fn cmd_formats() -> anyhow::Result<()> {
    println!("Supported Formats");
    println!("=================\n");

    for info in registry().iter() {
        println!(
            "  {:<8} {} plane(s), {} channel(s), {:?}",
            info.name,
            info.planes.len(),
            info.channels,
            info.sample
        );
    }
    Ok(())
}

fn cmd_presets() -> anyhow::Result<()> {
    println!("Available Presets");
    println!("=================\n");

    for preset in ScalePreset::ALL {
        let config = ScaleConfig::from(preset);
        println!(
            "  {:<10} height {}, {}",
            preset.name(),
            preset.height(),
            config.method
        );
    }
    println!("\nUsage: framescale scale --preset <name> ...");
    Ok(())
}

fn cmd_layout(format: PixelFormat, size: Resolution) -> anyhow::Result<()> {
    let layout = compute_layout(format, size.width, size.height)?;

    println!("{} {}: {} bytes", format, size, layout.size);
    for plane in &layout.planes {
        println!(
            "  {:?}: {}x{} stride {} offset {} size {}",
            plane.role, plane.width, plane.height, plane.stride, plane.offset, plane.size
        );
    }
    Ok(())
}

fn cmd_fixate(
    size: Resolution,
    par: Option<Fraction>,
    width: Option<u32>,
    height: Option<u32>,
    out_par: Option<Fraction>,
) -> anyhow::Result<()> {
    let mut src = VideoInfo::new(PixelFormat::I420, size.width, size.height);
    if let Some(par) = par {
        src = src.with_par(par);
    }

    let dim = |v: Option<u32>| v.map(DimConstraint::Fixed).unwrap_or_default();
    let caps = OutputCaps::default()
        .with_width(dim(width))
        .with_height(dim(height))
        .with_par(out_par.map(ParConstraint::Fixed).unwrap_or_default());

    let fixated = fixate(&src, &caps)?;
    match fixated.par {
        Some(par) => println!("{} PAR {}", fixated.resolution(), par),
        None => println!("{}", fixated.resolution()),
    }
    Ok(())
}

fn build_config(
    path: Option<PathBuf>,
    preset: Option<ScalePreset>,
    to: Option<Resolution>,
    method: Option<ScaleMethod>,
) -> anyhow::Result<ScaleConfig> {
    let mut config = match (path, preset) {
        (Some(path), _) => ScaleConfig::load(&path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        (None, Some(preset)) => preset.into(),
        (None, None) => ScaleConfig::default(),
    };
    if let Some(to) = to {
        config = config.with_resolution(to.width, to.height);
    }
    if let Some(method) = method {
        config = config.with_method(method);
    }
    Ok(config)
}

fn cmd_scale(
    input: PathBuf,
    output: PathBuf,
    src: VideoInfo,
    config: ScaleConfig,
) -> anyhow::Result<()> {
    let pipeline = RawVideoPipeline::from_config(&src, &config)?;
    let request = pipeline.request();
    let dst = request.dst_layout();
    let scan = if request.interlaced() {
        " (interlaced)"
    } else {
        ""
    };

    println!("Configuration:");
    println!("  Format: {}", src.format);
    println!("  Input: {}x{}{}", src.width, src.height, scan);
    println!("  Output: {}x{}", dst.width, dst.height);
    println!("  Method: {}", request.method());
    println!();

    let reader = File::open(&input)
        .map(BufReader::new)
        .with_context(|| format!("failed to open {}", input.display()))?;
    let writer = File::create(&output)
        .map(BufWriter::new)
        .with_context(|| format!("failed to create {}", output.display()))?;

    let start = Instant::now();
    let stats = pipeline.run(reader, writer)?;
    let elapsed = start.elapsed();

    println!("Statistics:");
    println!("  Frames read: {}", stats.frames_read);
    println!("  Frames scaled: {}", stats.frames_scaled);
    println!("  Bytes written: {}", stats.bytes_written);
    if stats.frames_scaled > 0 {
        println!(
            "  Scaling FPS: {:.1}",
            stats.frames_scaled as f64 / elapsed.as_secs_f64()
        );
    }
    Ok(())
}
