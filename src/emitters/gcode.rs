//! PF-010: 5-axis machine G-code emitter.
//!
//! The orchestrator fills the module's declarations with the program number,
//! tool table and machine setup; this emitter frames them with the fixed
//! start/end blocks of the post.

use super::{fixed3, EmitOptions, Emission};
use crate::core::model::Module;
use crate::core::pose::{MoveKind, RotaryPose};
use crate::core::types::{CncSettings, CncTool};

const PROGRAM_DELIMITER: &str = "%";

/// Modal state every program starts from.
pub const SAFE_START: &str = "G90 G21 G17 G40 G49 G80 G94";

const FOOTER: [&str; 6] = ["M5", "M9", "G91 G28 Z0", "G90", "G28 A0 B0", "M30"];

/// G-code comment. Parentheses inside the text would close the comment early.
pub fn comment(text: &str) -> String {
    format!("({})", text.replace(['(', ')'], ""))
}

/// One rotary-head motion block.
pub fn motion_line(kind: MoveKind, pose: &RotaryPose, feed: Option<f64>) -> String {
    let mut line = format!(
        "{} X{} Y{} Z{} A{} B{}",
        kind,
        fixed3(pose.x),
        fixed3(pose.y),
        fixed3(pose.z),
        fixed3(pose.a),
        fixed3(pose.b)
    );
    if let (MoveKind::Cut, Some(f)) = (kind, feed) {
        line.push_str(&format!(" F{}", fixed3(f)));
    }
    line
}

/// Program number, tool table and machine setup for the declarations block.
pub fn header_block(name: &str, settings: &CncSettings) -> Vec<String> {
    let mut lines = vec![format!("O{} {}", settings.program_number, comment(name))];
    lines.extend(tool_table(&settings.tools));
    lines.push(SAFE_START.to_string());
    lines
}

/// Tool table as comment lines.
pub fn tool_table(tools: &[CncTool]) -> Vec<String> {
    tools
        .iter()
        .map(|t| {
            comment(&format!(
                "T{} {} D={} L={}",
                t.number,
                t.name,
                fixed3(t.diameter),
                fixed3(t.length)
            ))
        })
        .collect()
}

/// Tool change, spindle start and retract to safe height.
pub fn tool_change_block(settings: &CncSettings) -> Vec<String> {
    vec![
        format!("T{} M6", settings.active_tool),
        format!("S{} M3", settings.spindle_rpm.round() as u64),
        "M8".to_string(),
        format!("G0 Z{}", fixed3(settings.safe_z)),
    ]
}

/// Retract to safe height before the end block.
pub fn retract_line(settings: &CncSettings) -> String {
    format!("G0 Z{}", fixed3(settings.safe_z))
}

/// Serialize a module to a single `.cnc` file.
pub fn emit(module: &Module, opts: &EmitOptions) -> Emission {
    let mut lines = vec![PROGRAM_DELIMITER.to_string()];
    lines.extend(module.declarations.iter().cloned());
    lines.push(comment(&opts.banner()));
    lines.extend(module.overrides.iter().cloned());

    for program in &module.programs {
        for h in &program.header {
            lines.push(comment(h));
        }
        lines.extend(program.instructions().iter().map(|i| i.text().to_string()));
    }

    for procedure in &module.procedures {
        lines.push(comment(&procedure.name));
        lines.extend(procedure.instructions.iter().map(|i| i.text().to_string()));
    }

    lines.extend(FOOTER.iter().map(|s| s.to_string()));
    lines.push(PROGRAM_DELIMITER.to_string());

    let mut emission = Emission {
        lines: lines.clone(),
        ..Emission::default()
    };
    emission.files.insert(format!("{}.cnc", module.name), lines);
    emission
}
