//! PF-008: ABB RAPID emitter.

use super::{EmitOptions, Emission};
use crate::core::model::{Dispatch, Module, Procedure, Program};
use crate::core::splitter::{LoadAction, LoadSchedule};

/// Path constant the load schedule resolves side files against.
pub const LOAD_PATH_CONST: &str = "subModulePath";

/// Controller directory side files are copied to.
pub const DEFAULT_LOAD_PATH: &str = "HOME:/";

const INDENT: &str = "  ";

/// RAPID comment line.
pub fn comment(text: &str) -> String {
    format!("! {}", text)
}

/// Procedure call statement.
pub fn call_line(name: &str) -> String {
    format!("{};", name)
}

/// Module-level declarations the load schedule needs.
pub fn load_declarations() -> Vec<String> {
    vec![
        "VAR loadsession load1;".to_string(),
        "VAR loadsession load2;".to_string(),
        format!(
            "CONST string {} := \"{}\";",
            LOAD_PATH_CONST, DEFAULT_LOAD_PATH
        ),
    ]
}

/// Render a load schedule. `names[i]` is segment i's module and entry routine.
pub fn schedule_lines(schedule: &LoadSchedule, names: &[String]) -> Vec<String> {
    let name = |segment: usize| names.get(segment).map(String::as_str).unwrap_or("");
    schedule
        .actions
        .iter()
        .map(|action| match *action {
            LoadAction::StartLoad { segment, slot } => format!(
                "StartLoad \\Dynamic, {} \\File:=\"{}.mod\", load{};",
                LOAD_PATH_CONST,
                name(segment),
                slot
            ),
            LoadAction::WaitLoad { slot } => format!("WaitLoad load{};", slot),
            LoadAction::Invoke { segment } => format!("%\"{}\"%;", name(segment)),
            LoadAction::Unload { segment, .. } => format!(
                "UnLoad {} \\File:=\"{}.mod\";",
                LOAD_PATH_CONST,
                name(segment)
            ),
        })
        .collect()
}

/// Serialize a module to RAPID: primary `.mod`, its `.pgf` descriptor, and
/// one `.mod` per extra program.
pub fn emit(module: &Module, opts: &EmitOptions) -> Emission {
    let mut lines = vec![
        format!("MODULE {}", module.name),
        format!("{}{}", INDENT, comment(&opts.banner())),
    ];

    let mut declarations = module.declarations.clone();
    if let Some(Dispatch::Streamed { .. }) = &module.dispatch {
        declarations.extend(load_declarations());
    }
    for declaration in &declarations {
        lines.push(format!("{}{}", INDENT, declaration));
    }

    let main = module.main();
    for program in &module.programs {
        lines.push(String::new());
        if main.is_some_and(|m| std::ptr::eq(m, program)) {
            let mut tail = Vec::new();
            if let Some(dispatch) = &module.dispatch {
                tail = dispatch_lines(dispatch);
            }
            push_program(&mut lines, program, &module.overrides, &tail);
        } else {
            push_program(&mut lines, program, &[], &[]);
        }
    }

    for procedure in &module.procedures {
        lines.push(String::new());
        push_body(&mut lines, procedure, &Body::default());
    }

    lines.push("ENDMODULE".to_string());

    let primary = format!("{}.mod", module.name);
    let mut emission = Emission {
        lines: lines.clone(),
        ..Emission::default()
    };
    emission.files.insert(primary.clone(), lines);
    emission
        .files
        .insert(format!("{}.pgf", module.name), program_descriptor(&primary));

    for program in &module.extra_programs {
        emission
            .files
            .insert(format!("{}.mod", program.name()), side_module(program, opts));
    }

    emission
}

/// Main-program statements produced for a dispatch.
pub fn dispatch_lines(dispatch: &Dispatch) -> Vec<String> {
    match dispatch {
        Dispatch::Calls(names) => names.iter().map(|n| call_line(n)).collect(),
        Dispatch::Streamed { schedule, segments } => schedule_lines(schedule, segments),
    }
}

/// Lines wrapped around a routine's own instructions.
#[derive(Default)]
struct Body<'a> {
    header: &'a [String],
    prelude: &'a [String],
    tail: &'a [String],
}

/// Overrides open the main body, after its header comments; the dispatch
/// closes it.
fn push_program(lines: &mut Vec<String>, program: &Program, prelude: &[String], tail: &[String]) {
    let body = Body {
        header: &program.header,
        prelude,
        tail,
    };
    if program.declare {
        push_body(lines, &program.procedure, &body);
        return;
    }
    // Verbatim text: splice inside its own PROC ... ENDPROC when present.
    let text: Vec<&str> = program.instructions().iter().map(|i| i.text()).collect();
    let open = text.iter().position(|t| t.trim_start().starts_with("PROC "));
    let close = text.iter().rposition(|t| t.trim() == "ENDPROC");
    let (open, close) = match (open, close) {
        (Some(o), Some(c)) if o < c => (o + 1, c),
        _ => (0, text.len()),
    };
    let nested = if open > 0 { INDENT.repeat(2) } else { INDENT.to_string() };

    let own = |lines: &mut Vec<String>, range: std::ops::Range<usize>| {
        for t in &text[range] {
            lines.push(format!("{}{}", INDENT, t));
        }
    };
    own(lines, 0..open);
    for h in body.header {
        lines.push(format!("{}{}", nested, comment(h)));
    }
    for line in body.prelude {
        lines.push(format!("{}{}", nested, line));
    }
    own(lines, open..close);
    for line in body.tail {
        lines.push(format!("{}{}", nested, line));
    }
    own(lines, close..text.len());
}

fn push_body(lines: &mut Vec<String>, procedure: &Procedure, body: &Body) {
    let nested = |text: &str| format!("{0}{0}{1}", INDENT, text);
    lines.push(format!("{}PROC {}()", INDENT, procedure.name));
    for h in body.header {
        lines.push(nested(&comment(h)));
    }
    for line in body.prelude {
        lines.push(nested(line));
    }
    for i in &procedure.instructions {
        lines.push(nested(i.text()));
    }
    for line in body.tail {
        lines.push(nested(line));
    }
    lines.push(format!("{}ENDPROC", INDENT));
}

/// A side file is its own module whose entry routine shares its name.
fn side_module(program: &Program, opts: &EmitOptions) -> Vec<String> {
    let mut lines = vec![
        format!("MODULE {}", program.name()),
        format!("{}{}", INDENT, comment(&opts.banner())),
    ];
    push_program(&mut lines, program, &[], &[]);
    lines.push("ENDMODULE".to_string());
    lines
}

/// `.pgf` project descriptor naming the primary module file.
pub fn program_descriptor(module_file: &str) -> Vec<String> {
    vec![
        "<?xml version=\"1.0\" encoding=\"ISO-8859-1\" ?>".to_string(),
        "<Program>".to_string(),
        format!("{}<Module>{}</Module>", INDENT, module_file),
        "</Program>".to_string(),
    ]
}
