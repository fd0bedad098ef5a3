//! PF-009: KUKA KRL emitter.
//!
//! One `DEF` per file. Large programs are reported, never split: KRL has no
//! counterpart to RAPID's dynamic loading here.

use super::{EmitOptions, Emission};
use crate::core::error::{Diagnostic, DiagnosticKind};
use crate::core::model::{Module, Program};

/// Instruction count above which a KRL program should be split by hand.
pub const KRL_SOFT_LIMIT: usize = 5000;

const INDENT: &str = "  ";

const HOME_DECLARATION: &str = "DECL AXIS HOME";
const HOME_POSITION: &str = "HOME = {AXIS: A1 0, A2 -90, A3 90, A4 0, A5 0, A6 0}";

/// Base/tool setup used when no custom declarations are supplied.
const DEFAULT_FRAME_SETUP: [&str; 2] = ["$BASE = BASE_DATA[1]", "$TOOL = TOOL_DATA[1]"];

const MOTION_DEFAULTS: [&str; 7] = [
    "$ACC.CP = 2.0",
    "$ACC.ORI1 = 100",
    "$ACC.ORI2 = 100",
    "$VEL.CP = 0.2",
    "$VEL.ORI1 = 200",
    "$VEL.ORI2 = 200",
    "$APO.CDIS = 1.0",
];

/// KRL comment line.
pub fn comment(text: &str) -> String {
    format!("; {}", text)
}

/// Serialize a module to a single `.src` file.
pub fn emit(module: &Module, opts: &EmitOptions) -> Emission {
    let mut lines = vec![
        "&ACCESS RVP".to_string(),
        "&REL 1".to_string(),
        format!("DEF {}()", module.name),
        comment(&opts.banner()),
        String::new(),
        HOME_DECLARATION.to_string(),
        String::new(),
        ";FOLD INI".to_string(),
        format!("{}BAS (#INITMOV, 0)", INDENT),
        ";ENDFOLD (INI)".to_string(),
        String::new(),
        HOME_POSITION.to_string(),
    ];

    if module.declarations.is_empty() {
        lines.extend(DEFAULT_FRAME_SETUP.iter().map(|s| s.to_string()));
    } else {
        lines.extend(module.declarations.iter().cloned());
    }
    lines.extend(MOTION_DEFAULTS.iter().map(|s| s.to_string()));

    if !module.overrides.is_empty() {
        lines.push(String::new());
        lines.extend(module.overrides.iter().cloned());
    }

    lines.push(String::new());
    lines.push("PTP HOME".to_string());

    let mut count = 0;
    for program in &module.programs {
        if module.programs.len() > 1 {
            lines.push(comment(program.name()));
        }
        for h in &program.header {
            lines.push(comment(h));
        }
        count += push_body(&mut lines, program);
    }

    lines.push("PTP HOME".to_string());
    lines.push("END".to_string());

    for procedure in &module.procedures {
        lines.push(String::new());
        lines.push(format!("DEF {}()", procedure.name));
        for i in &procedure.instructions {
            lines.push(format!("{}{}", INDENT, i.text()));
        }
        lines.push("END".to_string());
    }

    let mut diagnostics = Vec::new();
    if count > KRL_SOFT_LIMIT {
        diagnostics.push(Diagnostic::warning(
            DiagnosticKind::ValidationWarning,
            format!(
                "program has {} instructions, above the KRL soft limit of {}; split it manually",
                count, KRL_SOFT_LIMIT
            ),
        ));
    }

    let mut emission = Emission {
        lines: lines.clone(),
        diagnostics,
        ..Emission::default()
    };
    emission.files.insert(format!("{}.src", module.name), lines);
    emission
}

fn push_body(lines: &mut Vec<String>, program: &Program) -> usize {
    for i in program.instructions() {
        if program.declare {
            lines.push(i.text().to_string());
        } else {
            lines.push(format!("{}{}", INDENT, i.text()));
        }
    }
    program.instructions().len()
}
