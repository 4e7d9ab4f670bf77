//! # ibtrace CLI
//!
//! Prints per-frame channel traces from an IBT capture.
//!
//! ## Usage
//!
//! ```sh
//! # Session time, speed, throttle and brake for every frame
//! ibtrace mx5.ibt
//!
//! # Only lap 6, also written to trace.dat
//! ibtrace mx5.ibt --lap 6 --output trace.dat
//!
//! # Pick channels
//! ibtrace mx5.ibt --channels sessiontime,rpm,gear
//!
//! # List the recorded channels
//! ibtrace mx5.ibt --list
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use ibtrace::ibt::lap_equals;
use ibtrace::{IbtReader, Sample};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_CHANNELS: &str = "sessiontime,speed,throttle,brake";

/// Decode channel traces from iRacing IBT telemetry files
#[derive(Parser, Debug)]
#[command(name = "ibtrace")]
#[command(about = "Decode channel traces from iRacing IBT telemetry files", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the IBT file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Only print frames recorded on this lap
    #[arg(short, long, value_name = "LAP")]
    lap: Option<i32>,

    /// Comma-separated channel names (case-insensitive)
    #[arg(short, long, value_delimiter = ',', default_value = DEFAULT_CHANNELS)]
    channels: Vec<String>,

    /// Channel holding the lap number
    #[arg(long, value_name = "NAME", default_value = "lap")]
    lap_channel: String,

    /// Also write the trace to this file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// List the recorded channels instead of printing a trace
    #[arg(long)]
    list: bool,

    /// Print the channel list as JSON (with --list)
    #[arg(long, requires = "list")]
    json: bool,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init();
}

fn list_channels<W: Write>(reader: &IbtReader, json: bool, out: &mut W) -> Result<()> {
    let descriptors = reader.variables().sorted_by_offset();

    if json {
        serde_json::to_writer_pretty(&mut *out, &descriptors).context("writing channel list")?;
        writeln!(out)?;
        return Ok(());
    }

    for d in descriptors {
        let kind = reader
            .registry()
            .lookup(d.type_code)
            .map(|t| format!("{:?}", t.kind))
            .unwrap_or_else(|_| format!("type {}", d.type_code));
        writeln!(
            out,
            "{:<32} {:>6} {:>4} {:<8} {:<12} {}",
            d.name, d.offset, d.count, kind, d.unit, d.description
        )?;
    }
    Ok(())
}

/// Channels to scan and the column to leave out of the printed rows.
///
/// With a lap filter the lap channel is scanned alongside the requested ones,
/// but only printed when it was asked for.
fn scan_plan(requested: &[String], lap_channel: &str, lap: Option<i32>) -> (Vec<String>, Option<usize>) {
    let mut channels = requested.to_vec();
    let mut hidden = None;
    if lap.is_some() && !channels.iter().any(|c| c.eq_ignore_ascii_case(lap_channel)) {
        hidden = Some(channels.len());
        channels.push(lap_channel.to_string());
    }
    (channels, hidden)
}

fn format_row(row: &[Sample], skip: Option<usize>) -> String {
    row.iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != skip)
        .map(|(_, s)| s.value.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Write one line per selected frame to every sink. Returns the row count.
fn write_trace(
    reader: &IbtReader,
    requested: &[String],
    lap_channel: &str,
    lap: Option<i32>,
    sinks: &mut [&mut dyn Write],
) -> Result<usize> {
    let (channels, hidden) = scan_plan(requested, lap_channel, lap);
    debug!("Scanning channels {:?}", channels);

    let rows: Box<dyn Iterator<Item = ibtrace::Result<Vec<Sample>>> + '_> = match lap {
        Some(lap) => Box::new(reader.scan(&channels, lap_equals(lap_channel, lap))),
        None => Box::new(reader.scan_all(&channels)),
    };

    let mut written = 0usize;
    for row in rows {
        let row = row.context("Extracting samples")?;
        let line = format_row(&row, hidden);
        for sink in sinks.iter_mut() {
            writeln!(sink, "{}", line)?;
        }
        written += 1;
    }

    for sink in sinks.iter_mut() {
        sink.flush()?;
    }
    Ok(written)
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let reader = IbtReader::open(&args.file)
        .with_context(|| format!("Opening {}", args.file.display()))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if args.list {
        list_channels(&reader, args.json, &mut out)?;
        out.flush()?;
        return Ok(());
    }

    let mut trace = match &args.output {
        Some(path) => Some(BufWriter::new(
            File::create(path).with_context(|| format!("Creating {}", path.display()))?,
        )),
        None => None,
    };

    let written = match trace.as_mut() {
        Some(trace) => {
            write_trace(&reader, &args.channels, &args.lap_channel, args.lap, &mut [&mut out, trace])?
        }
        None => write_trace(&reader, &args.channels, &args.lap_channel, args.lap, &mut [&mut out])?,
    };

    info!("Wrote {} rows from {} frames", written, reader.total_frames());
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
