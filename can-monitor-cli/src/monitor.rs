//! Monitoring loop and status report
//!
//! The session lives on the calling thread and is the only writer of the
//! latch state. Frames arrive over a channel from the reception thread;
//! every reported update is passed to a notification sink, the stand-in
//! for the status indicators.

use can_signal_matcher::{Frame, LatchSnapshot, LatchUpdate, MonitorSession, SessionStats};
use std::io::{self, Write};
use std::sync::mpsc::Receiver;

/// Drain frames into the session until the reception side disconnects
///
/// Returns the final latch snapshot.
pub fn run<F>(session: &mut MonitorSession, frames: Receiver<Frame>, mut notify: F) -> LatchSnapshot
where
    F: FnMut(&Frame, &LatchUpdate),
{
    for frame in frames {
        for update in session.handle_frame(&frame) {
            notify(&frame, &update);
        }
    }
    log::debug!("Reception channel closed, ending session");
    session.snapshot()
}

/// Default notification sink: one log line per update
pub fn log_update(frame: &Frame, update: &LatchUpdate) {
    log::info!(
        "{} {}: {}",
        frame.timestamp().format("%H:%M:%S%.3f"),
        update.name,
        status_label(update.matched)
    );
}

fn status_label(matched: bool) -> &'static str {
    if matched {
        "MATCH"
    } else {
        "NO MATCH"
    }
}

/// Write the final latch table and session counters
pub fn write_report<W: Write>(
    out: &mut W,
    configuration: &str,
    snapshot: &LatchSnapshot,
    stats: &SessionStats,
) -> io::Result<()> {
    let width = snapshot
        .keys()
        .map(|name| name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Signal".len());

    writeln!(out, "═══════════════════════════════════════════════")?;
    writeln!(out, "  Signal Status - {}", configuration)?;
    writeln!(out, "═══════════════════════════════════════════════")?;
    writeln!(out, "  {:<width$}  Status", "Signal", width = width)?;
    for (name, matched) in snapshot {
        writeln!(
            out,
            "  {:<width$}  {}",
            name,
            status_label(*matched),
            width = width
        )?;
    }
    writeln!(out)?;
    writeln!(out, "  Frames:       {}", stats.frames_seen)?;
    writeln!(out, "  Evaluations:  {}", stats.relevant_evaluations)?;
    writeln!(out, "  Changes:      {}", stats.state_changes)?;
    Ok(())
}
