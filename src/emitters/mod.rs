//! PF-007: Controller dialect emitters.
//!
//! Each dialect serializes a `Module` into text lines and a file map:
//! - `rapid`: ABB RAPID `.mod` + `.pgf`, side-file modules for large programs
//! - `krl`: KUKA KRL `.src`
//! - `gcode`: 5-axis machine G-code `.cnc`

pub mod gcode;
pub mod krl;
pub mod rapid;
pub mod target;

use crate::core::error::Diagnostic;
use crate::core::pose::round3;
use indexmap::IndexMap;

/// Marker carried by the one timestamp line each emitted file has.
pub const GENERATOR_MARKER: &str = "Generated by postforge";

/// Per-call emitter settings.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Timestamp written into the banner line
    pub generated_at: String,
}

impl EmitOptions {
    pub fn at(generated_at: impl Into<String>) -> Self {
        Self {
            generated_at: generated_at.into(),
        }
    }

    /// Banner text; the only non-deterministic content of an emission.
    pub fn banner(&self) -> String {
        format!(
            "{} {} on {}",
            GENERATOR_MARKER,
            env!("CARGO_PKG_VERSION"),
            self.generated_at
        )
    }
}

/// Comment openers the dialects put in front of the banner.
const COMMENT_PREFIXES: [&str; 3] = ["! ", "; ", "("];

/// True for banner lines, which are excluded from content comparisons.
/// Only a whole comment line opening with the versioned banner qualifies.
pub fn is_timestamp_line(line: &str) -> bool {
    let line = line.trim_start();
    let Some(body) = COMMENT_PREFIXES.iter().find_map(|p| line.strip_prefix(p)) else {
        return false;
    };
    body.strip_prefix(GENERATOR_MARKER)
        .and_then(|rest| rest.strip_prefix(' '))
        .and_then(|rest| rest.strip_prefix(env!("CARGO_PKG_VERSION")))
        .is_some_and(|rest| rest.starts_with(" on "))
}

/// Output of one emitter call.
#[derive(Debug, Clone, Default)]
pub struct Emission {
    /// Lines of the primary file
    pub lines: Vec<String>,

    /// Every output file (primary first) keyed by file name
    pub files: IndexMap<String, Vec<String>>,

    pub diagnostics: Vec<Diagnostic>,
}

impl Emission {
    /// Name of the primary file.
    pub fn primary_file(&self) -> Option<&str> {
        self.files.keys().next().map(String::as_str)
    }
}

/// Join lines into file content with a trailing newline.
pub fn join_lines(lines: &[String]) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Number formatted for controller text: 3 decimals, trailing zeros trimmed.
pub fn num(v: f64) -> String {
    let s = format!("{:.3}", round3(v));
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Number formatted with exactly 3 decimals (G-code words).
pub fn fixed3(v: f64) -> String {
    format!("{:.3}", round3(v))
}
