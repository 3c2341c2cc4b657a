// Copyright (C) 2026-present The Translytics Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::Parser;
use std::{io, path::PathBuf, str::FromStr};
use tracing::{info, warn, Level};
use translytics_log_decoder::{load_events_and_process, Config};

/// Compute the per-minute moving average of the time it took to deliver
/// translations, from a JSON Lines event log.
#[derive(Debug, Parser)]
#[command(long_about = None)]
struct Cli {
    /// Path to the file with the translation delivery events
    #[clap(short, long, default_value = "./events.json")]
    input_file: PathBuf,

    /// Width of the time window (in minutes) used to calculate the
    /// moving average
    #[clap(short, long, default_value_t = 10)]
    window_size: usize,

    /// JSON Lines output file path, if not specified
    /// output will be directed to stdout
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Logging verbosity
    #[clap(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(level: &'_ str) {
    // Diagnostics go to stderr; stdout carries the record stream.
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(Level::from_str(level).expect("invalid logging level"))
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = Config {
        input_path: cli.input_file,
        output_path: cli.output,
        window_size: cli.window_size,
    };

    let stats = load_events_and_process(&config)?;
    if stats.malformed_skipped > 0 {
        warn!(
            "skipped {} malformed record(s) in '{}'",
            stats.malformed_skipped,
            config.input_path.display()
        );
    }
    info!(
        "aggregated {} event(s) into {} record(s)",
        stats.events_aggregated, stats.records_emitted
    );

    Ok(())
}
