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

//! Translytics Log Decoder Library
//!
//! This library reads a translation-delivery event log (JSON Lines),
//! aggregates delivery durations per minute, and writes the moving-average
//! series as JSON Lines to a file or standard output.

use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::PathBuf,
};
use tracing::warn;
use translytics_analytics::{
    aggregation::{Aggregator, MinuteTotalsAggregator},
    delivery::DeliveryEvent,
};

/// Configuration for event-log processing
#[derive(Debug, Clone)]
pub struct Config {
    pub input_path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub window_size: usize,
}

/// Counters describing a completed run.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct ProcessingStats {
    /// Well-formed events folded into the per-minute totals.
    pub events_aggregated: usize,
    /// Lines that failed to decode and were skipped.
    pub malformed_skipped: usize,
    /// Moving-average records written out.
    pub records_emitted: usize,
}

/// Load and process a delivery event log with the given configuration.
///
/// This function reads the log line by line, folds every well-formed event
/// into per-minute duration totals, then sweeps the observed range and
/// writes one moving-average record per minute to the JSON Lines output
/// file or standard output.
///
/// Malformed lines are skipped with a warning and counted in the returned
/// stats; one bad record does not invalidate the rest of the series. Blank
/// lines are ignored.
///
/// # Arguments
/// * `config` - Configuration containing the input path, the optional
///   output path, and the moving-average window size in minutes.
/// # Returns
/// * `Ok(ProcessingStats)` if processing was successful
/// * `Err` if the input could not be opened or read, or the output could
///   not be created or written
pub fn load_events_and_process(
    config: &Config,
) -> Result<ProcessingStats, Box<dyn std::error::Error>> {
    let input_file = File::open(config.input_path.as_path()).map_err(|e| {
        format!(
            "Failed to open input file '{}': {}",
            config.input_path.display(),
            e
        )
    })?;
    let reader = BufReader::new(input_file);

    let mut aggregator = MinuteTotalsAggregator::init(());
    let mut stats = ProcessingStats::default();

    for (line_number, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            format!(
                "Failed to read input file '{}': {}",
                config.input_path.display(),
                e
            )
        })?;
        if line.trim().is_empty() {
            continue;
        }
        match DeliveryEvent::from_log_line(&line) {
            Ok(event) => {
                aggregator.push(event);
                stats.events_aggregated += 1;
            }
            Err(error) => {
                warn!("skipping line {}: {}", line_number + 1, error);
                stats.malformed_skipped += 1;
            }
        }
    }

    let mut writer: Box<dyn Write> = if let Some(output_path_ref) = &config.output_path {
        // If an output path is provided, create/truncate the file and use it
        let output_file = File::create(output_path_ref).map_err(|e| {
            format!(
                "Failed to create output file '{}': {}",
                output_path_ref.display(),
                e
            )
        })?;
        Box::new(BufWriter::new(output_file))
    } else {
        // If no output path is provided, write to standard output
        Box::new(BufWriter::new(io::stdout()))
    };

    if let Some(aggregate) = aggregator.flush() {
        for record in aggregate.moving_average(config.window_size) {
            writer.write_all(serde_json::to_string(&record)?.as_bytes())?;
            writer.write_all(b"\n")?;
            stats.records_emitted += 1;
        }
    }
    writer.flush()?;

    Ok(stats)
}
