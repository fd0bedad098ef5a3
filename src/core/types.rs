//! PF-001: Job file schema and motion types.
//!
//! Defines the YAML schema for generation jobs, the motion targets they carry,
//! the export manifest, and provenance events. All serializable types derive
//! Serialize/Deserialize for YAML roundtripping.

use super::error::Diagnostic;
use super::geometry::Frame;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Top-level postforge.yaml
// ============================================================================

/// Root configuration: one generation job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Schema version (must be "1.0")
    pub version: String,

    /// Human-readable job name
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Generation switches
    pub options: GenerationOptions,

    /// Preamble lines emitted ahead of any program
    #[serde(default)]
    pub declarations: Vec<String>,

    /// Lines injected before the main program
    #[serde(default)]
    pub overrides: Vec<String>,

    /// User-supplied procedures
    #[serde(default)]
    pub procedures: Vec<CustomProcedure>,

    /// Where and whether to write files
    #[serde(default)]
    pub output: OutputSettings,

    /// Machine settings for the CNC post
    #[serde(default)]
    pub cnc: Option<CncSettings>,

    /// Ordered comments and motion targets
    #[serde(default)]
    pub program: Vec<ProgramItem>,
}

impl JobConfig {
    /// Number of motion targets in the program.
    pub fn target_count(&self) -> usize {
        self.program
            .iter()
            .filter(|item| matches!(item, ProgramItem::Target(_)))
            .count()
    }
}

// ============================================================================
// Options
// ============================================================================

/// Explicit generation switches for one call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Controller dialect
    pub manufacturer: Manufacturer,

    /// Emit `declarations`
    #[serde(default = "default_true")]
    pub include_declarations: bool,

    /// Emit `overrides`
    #[serde(default = "default_true")]
    pub include_overrides: bool,

    /// Module name (defaults per manufacturer)
    #[serde(default)]
    pub module_name: Option<String>,

    /// Never split, only warn
    #[serde(default)]
    pub ignore_length_limit: bool,
}

impl GenerationOptions {
    pub fn new(manufacturer: Manufacturer) -> Self {
        Self {
            manufacturer,
            include_declarations: true,
            include_overrides: true,
            module_name: None,
            ignore_length_limit: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Controller manufacturer / dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Manufacturer {
    Abb,
    Kuka,
    Cnc,
    Universal,
    Fanuc,
    Staubli,
}

impl fmt::Display for Manufacturer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abb => write!(f, "abb"),
            Self::Kuka => write!(f, "kuka"),
            Self::Cnc => write!(f, "cnc"),
            Self::Universal => write!(f, "universal"),
            Self::Fanuc => write!(f, "fanuc"),
            Self::Staubli => write!(f, "staubli"),
        }
    }
}

/// A user-supplied procedure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomProcedure {
    pub name: String,

    /// Body lines
    #[serde(default)]
    pub body: Vec<String>,

    /// Body is complete controller text (including its own declaration) and is
    /// emitted verbatim
    #[serde(default)]
    pub raw: bool,
}

/// Output location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Output directory
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// Base filename for single-file dialects (KRL, CNC)
    #[serde(default)]
    pub filename: Option<String>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            filename: None,
        }
    }
}

fn default_output_dir() -> String {
    "out".to_string()
}

// ============================================================================
// CNC settings
// ============================================================================

/// Settings for the 5-axis CNC post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CncSettings {
    /// Program number (`O` word)
    #[serde(default = "default_program_number")]
    pub program_number: u32,

    /// Tool table
    #[serde(default)]
    pub tools: Vec<CncTool>,

    /// Active tool number
    #[serde(default = "default_tool_number")]
    pub active_tool: u32,

    /// Spindle speed (rpm)
    #[serde(default = "default_spindle_rpm")]
    pub spindle_rpm: f64,

    /// Cutting feed (mm/min)
    #[serde(default = "default_feed_rate")]
    pub feed_rate: f64,

    /// Retract height in machine Z
    #[serde(default = "default_safe_z")]
    pub safe_z: f64,

    /// Probe distance used by the rotary-axis solver
    #[serde(default = "default_probe_distance")]
    pub probe_distance: f64,

    /// Rotary-axis sign convention
    #[serde(default)]
    pub calibration: AxisCalibration,
}

impl Default for CncSettings {
    fn default() -> Self {
        Self {
            program_number: default_program_number(),
            tools: vec![],
            active_tool: default_tool_number(),
            spindle_rpm: default_spindle_rpm(),
            feed_rate: default_feed_rate(),
            safe_z: default_safe_z(),
            probe_distance: default_probe_distance(),
            calibration: AxisCalibration::default(),
        }
    }
}

fn default_program_number() -> u32 {
    1000
}

fn default_tool_number() -> u32 {
    1
}

fn default_spindle_rpm() -> f64 {
    12000.0
}

fn default_feed_rate() -> f64 {
    1000.0
}

fn default_safe_z() -> f64 {
    50.0
}

fn default_probe_distance() -> f64 {
    5.0
}

/// One tool table entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CncTool {
    pub number: u32,
    pub name: String,
    #[serde(default)]
    pub diameter: f64,
    #[serde(default)]
    pub length: f64,
}

/// Sign convention of the two rotary axes. Not verified against hardware;
/// flip per machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisCalibration {
    #[serde(default = "default_sign")]
    pub a_sign: f64,
    #[serde(default = "default_sign")]
    pub b_sign: f64,
}

impl Default for AxisCalibration {
    fn default() -> Self {
        Self {
            a_sign: 1.0,
            b_sign: 1.0,
        }
    }
}

fn default_sign() -> f64 {
    1.0
}

// ============================================================================
// Program items and targets
// ============================================================================

/// One entry of the input program.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramItem {
    Comment(String),
    Target(Target),
}

/// Abstract motion command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Target {
    #[serde(default)]
    pub motion: MotionType,

    /// TCP pose in the work object
    #[serde(default)]
    pub frame: Frame,

    /// Axis values (degrees) for absolute joint moves
    #[serde(default)]
    pub joints: Option<Vec<f64>>,

    #[serde(default)]
    pub speed: Speed,

    #[serde(default)]
    pub zone: Zone,

    #[serde(default)]
    pub tool: Tool,

    #[serde(default)]
    pub wobj: CoordinateSystem,

    #[serde(default)]
    pub external_axes: Vec<f64>,

    /// Pre-formatted controller instruction; used verbatim when present
    #[serde(default)]
    pub instruction: Option<String>,
}

/// Interpolation type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionType {
    #[default]
    Linear,
    Joint,
    AbsoluteJoint,
}

impl fmt::Display for MotionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Joint => write!(f, "joint"),
            Self::AbsoluteJoint => write!(f, "absolute_joint"),
        }
    }
}

/// TCP (mm/s) and reorientation (deg/s) speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Speed {
    pub tcp: f64,
    #[serde(default = "default_ori_speed")]
    pub ori: f64,
}

impl Default for Speed {
    fn default() -> Self {
        Self {
            tcp: 100.0,
            ori: default_ori_speed(),
        }
    }
}

fn default_ori_speed() -> f64 {
    500.0
}

/// Blend zone; a distance of zero is a fine point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub distance: f64,
    #[serde(default)]
    pub ori: Option<f64>,
}

impl Zone {
    pub fn is_fine(&self) -> bool {
        self.distance <= 0.0
    }
}

/// Tool reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    #[serde(default = "default_tool_name")]
    pub name: String,
    /// Controller tool index (KRL `TOOL_DATA[n]`)
    #[serde(default = "default_tool_number")]
    pub number: u32,
}

impl Default for Tool {
    fn default() -> Self {
        Self {
            name: default_tool_name(),
            number: default_tool_number(),
        }
    }
}

fn default_tool_name() -> String {
    "tool0".to_string()
}

/// Work object / base reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSystem {
    #[serde(default = "default_wobj_name")]
    pub name: String,
    /// Controller base index (KRL `BASE_DATA[n]`)
    #[serde(default)]
    pub number: u32,
}

impl Default for CoordinateSystem {
    fn default() -> Self {
        Self {
            name: default_wobj_name(),
            number: 0,
        }
    }
}

fn default_wobj_name() -> String {
    "wobj0".to_string()
}

// ============================================================================
// Split regime
// ============================================================================

/// How an instruction stream was laid out across procedures and files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// One main program
    Single,
    /// Same-module sub-procedures called from main
    Medium,
    /// Separate files streamed through a double-buffer load schedule
    Large,
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Medium => write!(f, "medium"),
            Self::Large => write!(f, "large"),
        }
    }
}

// ============================================================================
// Export manifest
// ============================================================================

/// Record of the last export into an output directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputManifest {
    /// Schema version
    pub schema: String,

    /// Job name
    pub job: String,

    pub manufacturer: Manufacturer,

    /// When the files were generated
    pub generated_at: String,

    /// Generator version
    pub generator: String,

    pub regime: Regime,

    /// Flat instruction count before splitting
    pub instruction_count: usize,

    /// Per-file entries keyed by file name
    pub files: IndexMap<String, FileEntry>,
}

/// One exported file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// BLAKE3 hash of the content excluding timestamp lines
    pub hash: String,
    pub lines: usize,
}

// ============================================================================
// Provenance events
// ============================================================================

/// Provenance event for the JSONL event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GenerationEvent {
    GenerationStarted {
        job: String,
        run_id: String,
        manufacturer: Manufacturer,
        postforge_version: String,
    },
    FileWritten {
        run_id: String,
        path: String,
        hash: String,
        lines: usize,
    },
    DiagnosticRaised {
        run_id: String,
        diagnostic: Diagnostic,
    },
    GenerationCompleted {
        run_id: String,
        regime: Regime,
        instruction_count: usize,
        files: usize,
        total_seconds: f64,
    },
}

/// Timestamped event wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestampedEvent {
    pub ts: String,
    #[serde(flatten)]
    pub event: GenerationEvent,
}

// ============================================================================
// Tests
// ============================================================================
