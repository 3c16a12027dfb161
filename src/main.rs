//! I2C protocol dissector for ILA waveform CSV exports.

mod capture;
mod decode;
mod output;

use anyhow::{Context, Result};
use capture::CaptureReader;
use clap::Parser;
use decode::BitstreamDecoder;
use output::{format_window, OutputConfig};
use std::io::Write;
use std::path::PathBuf;

/// Decode an I2C bus from an ILA waveform capture
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to ILA CSV export file
    waveform: PathBuf,

    /// Zero-indexed probe to interpret; bit 0 of the probe value is SCL,
    /// bit 1 is SDA
    #[arg(short = 'p', long, default_value_t = 0)]
    probe: usize,

    /// Show grouped bits instead of hex bytes
    #[arg(short = 'r', long)]
    raw: bool,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Enable debug logging
    #[arg(short = 'd', long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive("i2c_ila_dissect=debug".parse()?),
            )
            .init();
    }

    let mut reader = CaptureReader::open(&args.waveform)
        .with_context(|| format!("Failed to open capture file: {:?}", args.waveform))?;
    let samples = reader.samples().collect::<Result<Vec<_>>>()?;

    let windows = BitstreamDecoder::new(args.probe).decode(&samples)?;

    let config = OutputConfig {
        raw: args.raw,
        // Color only makes sense on a terminal, never inside a file.
        use_color: !args.no_color && args.output.is_none() && atty::is(atty::Stream::Stdout),
    };

    if let Some(output_path) = args.output {
        let mut file = std::fs::File::create(&output_path)
            .with_context(|| format!("Failed to create output file: {:?}", output_path))?;
        for tokens in &windows {
            writeln!(file, "{}", format_window(tokens, &config))?;
        }
    } else {
        for tokens in &windows {
            println!("{}", format_window(tokens, &config));
        }
    }

    Ok(())
}

// Check if output is a terminal (for color support)
mod atty {
    pub enum Stream {
        Stdout,
    }

    pub fn is(_stream: Stream) -> bool {
        // Simple check for terminal
        std::env::var("TERM").is_ok()
    }
}
