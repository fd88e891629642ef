use anyhow::{Context, Result};
use clap::Parser;
use drc_core::{CompressorSettings, OutputFormat, PipelineConfig};
use std::path::PathBuf;
use std::time::Instant;
use stream_filter::{build_chain, pump, AudioSource, SampleFormat, WavSink, WavSource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Apply feed-forward dynamic range compression to a WAV file
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Input WAV file
    input: PathBuf,

    /// Output WAV file
    output: PathBuf,

    /// TOML pipeline config (block size, output format, compressor stages)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Compressor stage as threshold:ratio:knee:attack:release
    /// (dB, N:1, dB, ms, ms), e.g. -20:4:6:10:100. Repeat to chain stages
    #[arg(short, long = "drc", value_name = "STAGE", allow_hyphen_values = true)]
    drc: Vec<CompressorSettings>,

    /// Frames pulled through the chain per read
    #[arg(short, long)]
    block_frames: Option<usize>,

    /// Output sample format (s16, s24, f32)
    #[arg(short, long)]
    output_format: Option<OutputFormat>,
}

impl Args {
    /// Config file (or defaults) with command-line overrides applied
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };

        config.compressors.extend(self.drc.iter().copied());
        if let Some(block_frames) = self.block_frames {
            config.block_frames = block_frames;
        }
        if let Some(output_format) = self.output_format {
            config.output_format = output_format;
        }

        config.validate().context("Invalid command-line options")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,drc=debug,stream_filter=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = args.pipeline_config()?;
    let stages = config.stages();

    let source = WavSource::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    tracing::info!("Input: {} ({})", args.input.display(), source.format());

    for (index, settings) in stages.iter().enumerate() {
        tracing::info!("Compressor {}: {}", index + 1, settings);
    }

    let chain = build_chain(source, &stages).context("Failed to build compressor chain")?;
    let stream = *chain.format();

    let sink = WavSink::create(&args.output, &stream, SampleFormat::from(config.output_format))
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    tracing::info!("Output: {} ({})", args.output.display(), sink.format());

    let started = Instant::now();
    let stats = pump(chain, sink, config.block_frames).context("Processing failed")?;

    tracing::info!(
        "Processed {} frames ({:.2} s of audio) in {} blocks, {:.2?}",
        stats.frames,
        stats.frames as f64 / stream.sample_rate as f64,
        stats.blocks,
        started.elapsed()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from([
            "drc",
            "in.wav",
            "out.wav",
            "--drc",
            "-30:2:0:5:50",
            "-d",
            "-10:8:3:1:20",
            "--output-format",
            "s24",
        ])
        .unwrap();

        assert_eq!(args.input, PathBuf::from("in.wav"));
        assert_eq!(args.drc.len(), 2);
        assert_eq!(args.drc[0], CompressorSettings::new(-30.0, 2.0, 0.0, 5.0, 50.0));
        assert_eq!(args.output_format, Some(OutputFormat::S24));

        let config = args.pipeline_config().unwrap();
        assert_eq!(config.compressors.len(), 2);
        assert_eq!(config.output_format, OutputFormat::S24);
    }

    #[test]
    fn test_defaults_to_single_stage() {
        let args = Args::try_parse_from(["drc", "in.wav", "out.wav"]).unwrap();
        let config = args.pipeline_config().unwrap();
        assert_eq!(config.stages(), vec![CompressorSettings::default()]);
    }

    #[test]
    fn test_rejects_bad_stage_and_block_size() {
        assert!(Args::try_parse_from(["drc", "in.wav", "out.wav", "--drc", "-20:4"]).is_err());

        let args = Args::try_parse_from(["drc", "in.wav", "out.wav", "--block-frames", "0"]).unwrap();
        assert!(args.pipeline_config().is_err());
    }
}
