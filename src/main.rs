//! # Switch2 Bridge
//!
//! Bridge a Nintendo Switch 2 Pro Controller to virtual keyboard input.
//!
//! This application decodes controller input reports and converges a uinput
//! virtual keyboard to match the controller state, for use with software
//! expecting keyboard input (e.g. an emulator with keyboard bindings).

use anyhow::Result;
use bytes::Bytes;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use switch2_bridge::bridge::Bridge;
use switch2_bridge::config::Config;
use switch2_bridge::sink::UinputSink;
use switch2_bridge::transport::{ChannelSource, ReportSource};

/// Report channel capacity. Reports are ~60 bytes at ~120Hz; a small
/// buffer absorbs scheduling jitter without adding latency.
const REPORT_CHANNEL_CAPACITY: usize = 64;

/// Main entry point for the Switch2 Bridge application
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (optional path as first argument)
///    - Create the uinput virtual keyboard with every bound key registered
///    - Wire the bridge to a report channel
///
/// 2. **Main Loop**
///    - Read hex-encoded report lines from stdin (the transport
///      substitute: BLE glue or captured-packet replays pipe reports in)
///    - Decode each report and converge the virtual keyboard
///    - Log status every N decoded reports
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Graceful Shutdown**
///    - Release every held virtual key (mandatory; skipping this leaves
///      keys stuck in the held state)
///    - Log total report count
///
/// # Errors
///
/// Returns error if:
/// - Configuration fails to load or validate
/// - The uinput device cannot be created (needs /dev/uinput access)
///
/// # Examples
///
/// Replay captured reports:
/// ```bash
/// cat captures/session.hex | cargo run --release
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Switch2 Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration (defaults when no path is given)
    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            Config::load(&path)?
        }
        None => {
            let config = Config::default();
            config.validate()?;
            config
        }
    };

    // Create the virtual keyboard with every bound key registered up front
    let sink = UinputSink::new(&config.bindings.bound_keys())?;
    let mut bridge = Bridge::new(
        config.bindings.clone(),
        config.bridge.stick_threshold,
        sink,
    )?;

    // Wire the report channel; stdin feeds it as the transport substitute
    let (report_tx, mut source) = ChannelSource::channel(REPORT_CHANNEL_CAPACITY);
    tokio::spawn(read_reports_from_stdin(report_tx));

    info!("Bridge active, waiting for input reports");
    info!("Press Ctrl+C to exit");

    let log_interval = config.bridge.log_interval_packets;
    let mut last_log_count: u64 = 0;

    // Main control loop
    loop {
        tokio::select! {
            maybe_report = source.next_report() => {
                match maybe_report {
                    Some(report) => {
                        if let Err(e) = bridge.handle_report(&report) {
                            warn!("Failed to apply report: {}", e);
                            continue;
                        }

                        let count = bridge.packet_count();
                        if count - last_log_count >= log_interval {
                            info!("Processed {} reports, held: [{}]",
                                count, bridge.state().pressed_labels().join(","));
                            last_log_count = count;
                        }
                    }
                    None => {
                        info!("Transport closed, shutting down...");
                        break;
                    }
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    // Never leave virtual keys stuck behind
    bridge.shutdown()?;
    info!("Total reports processed: {}", bridge.packet_count());

    Ok(())
}

/// Reads hex-encoded report lines from stdin and forwards them as raw
/// buffers.
///
/// Accepts both spaced (`01 02 0a`) and packed (`01020a`) hex; blank lines
/// are skipped. Stops when stdin or the channel closes.
async fn read_reports_from_stdin(tx: mpsc::Sender<Bytes>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }

        match parse_hex_report(&line) {
            Some(report) => {
                if tx.send(report).await.is_err() {
                    break;
                }
            }
            None => warn!("Skipping unparseable report line: {:?}", line),
        }
    }
}

/// Parses a hex-encoded report line into raw bytes.
///
/// Returns `None` for lines that are not an even-length run of hex digits
/// (ignoring whitespace).
fn parse_hex_report(line: &str) -> Option<Bytes> {
    let hex: String = line.split_whitespace().collect();

    if hex.is_empty() || hex.len() % 2 != 0 {
        return None;
    }

    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for i in (0..hex.len()).step_by(2) {
        bytes.push(u8::from_str_radix(hex.get(i..i + 2)?, 16).ok()?);
    }

    Some(Bytes::from(bytes))
}
