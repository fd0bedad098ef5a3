//! PF-005: Instruction model: instructions, procedures, programs, modules.
//!
//! Pure containers. Nothing is checked at construction; `Module::validate`
//! reports structural problems after the fact so emitters can still produce
//! best-effort text.

use super::error::{Diagnostic, DiagnosticKind};
use super::splitter::LoadSchedule;
use super::types::Manufacturer;
use rustc_hash::FxHashSet;
use std::fmt;

/// Name of the entry-point program.
pub const MAIN_PROGRAM: &str = "main";

/// One formatted controller instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    text: String,
    manufacturer: Manufacturer,
}

impl Instruction {
    pub fn new(text: impl Into<String>, manufacturer: Manufacturer) -> Self {
        Self {
            text: text.into(),
            manufacturer,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn manufacturer(&self) -> Manufacturer {
        self.manufacturer
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Named, ordered block of instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Procedure {
    pub name: String,
    pub instructions: Vec<Instruction>,
}

impl Procedure {
    pub fn new(name: impl Into<String>, instructions: Vec<Instruction>) -> Self {
        Self {
            name: name.into(),
            instructions,
        }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// A procedure that is an invocable entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub procedure: Procedure,

    /// Comment lines emitted at the top of the body
    pub header: Vec<String>,

    /// Wrap the body in a procedure declaration. When false the instructions
    /// are complete controller text and go out verbatim.
    pub declare: bool,
}

impl Program {
    pub fn new(name: impl Into<String>, instructions: Vec<Instruction>) -> Self {
        Self {
            procedure: Procedure::new(name, instructions),
            header: vec![],
            declare: true,
        }
    }

    /// A program whose text already contains its own declaration.
    pub fn inline(name: impl Into<String>, instructions: Vec<Instruction>) -> Self {
        Self {
            declare: false,
            ..Self::new(name, instructions)
        }
    }

    pub fn with_header(mut self, header: Vec<String>) -> Self {
        self.header = header;
        self
    }

    pub fn name(&self) -> &str {
        &self.procedure.name
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.procedure.instructions
    }
}

/// How the main program reaches the segments of a split instruction stream.
/// Kept as data; the dialect emitter renders it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Call same-module procedures in order
    Calls(Vec<String>),
    /// Stream side-file modules through the double-buffer load schedule
    Streamed {
        schedule: LoadSchedule,
        segments: Vec<String>,
    },
}

impl Dispatch {
    /// Segment names in invocation order.
    pub fn segments(&self) -> &[String] {
        match self {
            Self::Calls(names) => names,
            Self::Streamed { segments, .. } => segments,
        }
    }
}

/// Root aggregate: one controller-loadable code unit plus side files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub declarations: Vec<String>,
    pub programs: Vec<Program>,
    pub procedures: Vec<Procedure>,
    /// Statements run first in the main program
    pub overrides: Vec<String>,
    /// Programs written to their own files
    pub extra_programs: Vec<Program>,
    /// Segment dispatch run by the main program after its instructions
    pub dispatch: Option<Dispatch>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The entry-point program, if any.
    pub fn main(&self) -> Option<&Program> {
        self.programs
            .iter()
            .find(|p| p.name() == MAIN_PROGRAM)
            .or_else(|| self.programs.first())
    }

    /// Instructions held in this module and its side files.
    pub fn instruction_count(&self) -> usize {
        self.programs
            .iter()
            .chain(&self.extra_programs)
            .map(|p| p.instructions().len())
            .sum::<usize>()
            + self.procedures.iter().map(Procedure::len).sum::<usize>()
    }

    /// Validity predicate. Returns structural diagnostics (empty = valid).
    pub fn validate(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        if self.name.trim().is_empty() {
            diagnostics.push(Diagnostic::error(
                DiagnosticKind::StructuralInvalid,
                "module name must not be empty",
            ));
        }

        if self.programs.is_empty() {
            diagnostics.push(Diagnostic::error(
                DiagnosticKind::StructuralInvalid,
                format!("module '{}' has no main program", self.name),
            ));
        }

        let mut seen = FxHashSet::default();
        let names = self
            .programs
            .iter()
            .map(Program::name)
            .chain(self.procedures.iter().map(|p| p.name.as_str()));
        for name in names {
            if !seen.insert(name.to_ascii_lowercase()) {
                diagnostics.push(Diagnostic::error(
                    DiagnosticKind::StructuralInvalid,
                    format!("duplicate procedure '{}' in module '{}'", name, self.name),
                ));
            }
        }

        match &self.dispatch {
            Some(Dispatch::Calls(names)) => {
                for name in names {
                    if !self.procedures.iter().any(|p| &p.name == name) {
                        diagnostics.push(Diagnostic::error(
                            DiagnosticKind::StructuralInvalid,
                            format!("main calls undefined procedure '{}'", name),
                        ));
                    }
                }
            }
            Some(Dispatch::Streamed { segments, .. }) => {
                for name in segments {
                    if !self.extra_programs.iter().any(|p| p.name() == name) {
                        diagnostics.push(Diagnostic::error(
                            DiagnosticKind::StructuralInvalid,
                            format!("load schedule names missing side program '{}'", name),
                        ));
                    }
                }
            }
            None => {}
        }

        // side files are separate modules but share one load path
        let mut files = FxHashSet::default();
        for program in &self.extra_programs {
            if !files.insert(program.name().to_ascii_lowercase()) {
                diagnostics.push(Diagnostic::error(
                    DiagnosticKind::StructuralInvalid,
                    format!("duplicate side program '{}'", program.name()),
                ));
            }
        }

        diagnostics
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
