use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use cvm_estimator::{Config, CvmRunner, LogLevel, StreamType};

/// Runs the CVM algorithm simulator.
///
/// The algorithm estimates the number of distinct elements in a stream much bigger
/// than the available buffer size.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// How to generate the stream: incremental, random or file
    #[arg(long, default_value = "incremental")]
    stream_type: StreamType,

    /// Total number of elements in the generated stream
    #[arg(long, default_value_t = 100_000_000)]
    total: usize,

    /// Number of distinct elements in the generated stream
    #[arg(long, default_value_t = 5_000_000)]
    distinct: usize,

    /// Number of elements that can be stored in the buffer while processing the stream
    #[arg(long, default_value_t = 10_000)]
    buffer_size: usize,

    /// Lower bound of values drawn by the random stream
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    random_min: i64,

    /// Upper bound of values drawn by the random stream
    #[arg(long, default_value_t = 1_000_000_000, allow_hyphen_values = true)]
    random_max: i64,

    /// File with whitespace separated integers, used by the file stream
    #[arg(long)]
    file_path: Option<PathBuf>,

    /// Logging level: info, debug or deep
    #[arg(long, default_value = "info")]
    log_level: LogLevel,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn into_config(self) -> Result<Config, cvm_estimator::CvmError> {
        let mut builder = Config::builder()
            .stream_type(self.stream_type)
            .total(self.total)
            .distinct(self.distinct)
            .buffer_size(self.buffer_size)
            .random_range(self.random_min, self.random_max)
            .log_level(self.log_level);
        if let Some(path) = self.file_path {
            builder = builder.file_path(path);
        }
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        builder.build()
    }
}

fn main() -> anyhow::Result<()> {
    let config = Args::parse()
        .into_config()
        .context("invalid configuration")?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level().as_tracing_level())
        .with_writer(std::io::stderr)
        .init();

    let summary = CvmRunner::new(config).run()?;
    println!("Size: {}", summary.snapshot.size);
    println!("Root: {}", summary.root_display());
    println!("Estimated number of distinct elements: {}", summary.estimate);
    Ok(())
}
