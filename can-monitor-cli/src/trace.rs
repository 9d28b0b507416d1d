//! Trace replay (reception path)
//!
//! Reads CAN frames from text traces in candump log form and hands them to
//! the monitoring session through a bounded channel. The reader runs on its
//! own thread, standing in for the adapter's receive loop.
//!
//! Accepted line forms:
//! - `(1697040000.123456) can0 18F00401#0000001000000000`
//! - `119#0000002900000000`

use can_signal_matcher::Frame;
use std::io::BufRead;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

/// Classic CAN payload limit
const MAX_PAYLOAD_LEN: usize = 8;

/// Errors for a single malformed trace line
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraceError {
    #[error("Missing '#' separator")]
    MissingSeparator,

    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("Invalid payload: {0:?}")]
    InvalidPayload(String),

    #[error("Payload too long: {0} bytes (max 8)")]
    PayloadTooLong(usize),

    #[error("Invalid timestamp: {0:?}")]
    InvalidTimestamp(String),
}

/// Counters reported by the reception thread when the trace is exhausted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    pub lines: u64,
    pub frames: u64,
    pub skipped: u64,
}

/// Parse one trace line
///
/// # Returns
/// * `Ok(Some(frame))` for a frame line
/// * `Ok(None)` for blank lines and `#` comments
/// * `Err(TraceError)` for malformed lines
pub fn parse_line(line: &str) -> Result<Option<Frame>, TraceError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut timestamp_ns = 0;
    let mut frame_part = line;
    if let Some(rest) = line.strip_prefix('(') {
        let (stamp, rest) = rest
            .split_once(')')
            .ok_or_else(|| TraceError::InvalidTimestamp(line.to_string()))?;
        timestamp_ns = parse_timestamp(stamp)?;
        // Skip the interface name
        frame_part = rest.split_whitespace().last().unwrap_or_default();
    }

    let (id_str, data_str) = frame_part
        .split_once('#')
        .ok_or(TraceError::MissingSeparator)?;

    if id_str.is_empty() || id_str.len() > 8 {
        return Err(TraceError::InvalidIdentifier(id_str.to_string()));
    }
    let identifier = u32::from_str_radix(id_str, 16)
        .map_err(|_| TraceError::InvalidIdentifier(id_str.to_string()))?;

    let payload = parse_payload(data_str)?;

    Ok(Some(
        Frame::new(identifier, payload)
            .with_extended(id_str.len() > 3)
            .with_timestamp_ns(timestamp_ns),
    ))
}

fn parse_payload(data: &str) -> Result<Vec<u8>, TraceError> {
    let data: String = data.chars().filter(|c| *c != '.').collect();
    if data.len() % 2 != 0 || !data.is_ascii() {
        return Err(TraceError::InvalidPayload(data));
    }
    if data.len() / 2 > MAX_PAYLOAD_LEN {
        return Err(TraceError::PayloadTooLong(data.len() / 2));
    }

    (0..data.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&data[i..i + 2], 16)
                .map_err(|_| TraceError::InvalidPayload(data.clone()))
        })
        .collect()
}

fn parse_timestamp(stamp: &str) -> Result<u64, TraceError> {
    let invalid = || TraceError::InvalidTimestamp(stamp.to_string());
    let (secs, frac) = stamp.split_once('.').unwrap_or((stamp, ""));

    let secs: u64 = secs.parse().map_err(|_| invalid())?;
    if frac.len() > 9 || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let nanos: u64 = if frac.is_empty() {
        0
    } else {
        format!("{:0<9}", frac).parse().map_err(|_| invalid())?
    };

    secs.checked_mul(1_000_000_000)
        .and_then(|ns| ns.checked_add(nanos))
        .ok_or_else(invalid)
}

/// Start the reception thread over a line-oriented source
///
/// Malformed lines are logged and skipped. The thread ends when the source
/// is exhausted, a read fails, or the receiving side hangs up; dropping the
/// sender then disconnects the channel, which ends the session.
pub fn spawn_reader<R>(reader: R, capacity: usize) -> (Receiver<Frame>, JoinHandle<ReaderStats>)
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel(capacity);

    let handle = thread::spawn(move || {
        let mut stats = ReaderStats::default();

        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    log::error!("Trace read failed: {}", e);
                    break;
                }
            };
            stats.lines += 1;

            match parse_line(&line) {
                Ok(Some(frame)) => {
                    if tx.send(frame).is_err() {
                        log::debug!("Session closed, stopping reception");
                        break;
                    }
                    stats.frames += 1;
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!("Skipping trace line {}: {}", stats.lines, e);
                    stats.skipped += 1;
                }
            }
        }

        log::debug!(
            "Reception finished: {} line(s), {} frame(s), {} skipped",
            stats.lines,
            stats.frames,
            stats.skipped
        );
        stats
    });

    (rx, handle)
}
