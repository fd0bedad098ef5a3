//! PF-014: Append-only JSONL log of generation runs.

use crate::core::error::GenerationError;
use crate::core::types::{GenerationEvent, TimestampedEvent};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Directory inside an output directory that holds bookkeeping files.
pub const STATE_DIR: &str = ".postforge";

fn unix_now() -> std::time::Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

/// Current UTC time as ISO 8601.
pub fn now_iso8601() -> String {
    iso8601_from_unix(unix_now().as_secs())
}

/// Format seconds since the Unix epoch as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn iso8601_from_unix(secs: u64) -> String {
    let days = (secs / 86_400) as i64;
    let rem = secs % 86_400;
    let (y, m, d) = civil_from_days(days);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        y,
        m,
        d,
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60
    )
}

/// Days since 1970-01-01 to a proleptic Gregorian date.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    let y = yoe + era * 400 + i64::from(m <= 2);
    (y, m, d)
}

/// Generate a run ID.
pub fn generate_run_id() -> String {
    format!("g-{:012x}", unix_now().as_nanos() & 0xFFFF_FFFF_FFFF)
}

/// Event log location for an output directory.
pub fn event_log_path(output_dir: &Path) -> PathBuf {
    output_dir.join(STATE_DIR).join("events.jsonl")
}

/// Append an event to the output directory's log.
pub fn append_event(output_dir: &Path, event: GenerationEvent) -> Result<(), GenerationError> {
    let path = event_log_path(output_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| GenerationError::io(parent, e))?;
    }

    let te = TimestampedEvent {
        ts: now_iso8601(),
        event,
    };
    let json = serde_json::to_string(&te)
        .map_err(|e| GenerationError::Parse(format!("JSON serialize error: {}", e)))?;

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| GenerationError::io(&path, e))?;
    writeln!(file, "{}", json).map_err(|e| GenerationError::io(&path, e))?;

    Ok(())
}

/// Read back every event in the log. A missing log is empty.
pub fn read_events(output_dir: &Path) -> Result<Vec<TimestampedEvent>, GenerationError> {
    let path = event_log_path(output_dir);
    if !path.exists() {
        return Ok(vec![]);
    }
    let content = std::fs::read_to_string(&path).map_err(|e| GenerationError::io(&path, e))?;
    content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            serde_json::from_str(l).map_err(|e| {
                GenerationError::Parse(format!("invalid event in {}: {}", path.display(), e))
            })
        })
        .collect()
}
