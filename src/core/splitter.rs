//! PF-006: Oversized-program splitting and the double-buffer load schedule.
//!
//! ABB controllers cap the number of instructions a single routine or module
//! can hold. Three regimes, chosen by flat instruction count N:
//! - N < low: one `main`
//! - low <= N < high: `low`-sized `SubProg<i>` procedures called from `main`
//! - N >= high: `low`-sized `progNumber<i>` modules in their own files,
//!   streamed by `main` through two load sessions
//!
//! Calls and the load schedule stay data (`model::Dispatch`); the dialect
//! emitter renders them.

use super::error::{Diagnostic, DiagnosticKind};
use super::model::{Dispatch, Instruction, Module, Procedure, Program, MAIN_PROGRAM};
use super::types::{Manufacturer, Regime};

/// Recommended maximum instructions per routine.
pub const ABB_LOW_LIMIT: usize = 5000;

/// Above this a single module no longer fits; segments move to side files.
pub const ABB_HIGH_LIMIT: usize = 65000;

/// Name prefix for same-module segments.
pub const SUB_PROCEDURE_PREFIX: &str = "SubProg";

/// Name prefix for side-file segments.
pub const SUB_FILE_PREFIX: &str = "progNumber";

/// Regime thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimits {
    pub low: usize,
    pub high: usize,
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            low: ABB_LOW_LIMIT,
            high: ABB_HIGH_LIMIT,
        }
    }
}

impl SizeLimits {
    pub fn regime(&self, count: usize) -> Regime {
        if count < self.low {
            Regime::Single
        } else if count < self.high {
            Regime::Medium
        } else {
            Regime::Large
        }
    }
}

/// Partition `items` into consecutive chunks of at most `chunk_size`.
/// A zero chunk size is treated as 1.
pub fn split<T: Clone>(items: &[T], chunk_size: usize) -> Vec<Vec<T>> {
    items.chunks(chunk_size.max(1)).map(<[T]>::to_vec).collect()
}

/// A named slice of the flat instruction list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    pub instructions: Vec<Instruction>,
}

/// One step of the dynamic load schedule. Slots are 1 and 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadAction {
    StartLoad { segment: usize, slot: usize },
    WaitLoad { slot: usize },
    Invoke { segment: usize },
    Unload { segment: usize, slot: usize },
}

/// Double-buffered load/invoke/unload sequence over `segments` side files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSchedule {
    pub segments: usize,
    pub actions: Vec<LoadAction>,
}

impl LoadSchedule {
    /// Build the schedule. Segments alternate between slot 1 (even) and
    /// slot 2 (odd); each slot is refilled two segments ahead as soon as its
    /// segment has run and been unloaded.
    pub fn build(segments: usize) -> Self {
        let mut actions = Vec::with_capacity(segments * 4);

        for (segment, slot) in [(0, 1), (1, 2)] {
            if segment < segments {
                actions.push(LoadAction::StartLoad { segment, slot });
            }
        }

        for i in (0..segments).step_by(2) {
            for (segment, slot) in [(i, 1), (i + 1, 2)] {
                if segment >= segments {
                    break;
                }
                actions.push(LoadAction::WaitLoad { slot });
                actions.push(LoadAction::Invoke { segment });
                actions.push(LoadAction::Unload { segment, slot });
                if segment + 2 < segments {
                    actions.push(LoadAction::StartLoad {
                        segment: segment + 2,
                        slot,
                    });
                }
            }
        }

        Self { segments, actions }
    }

    fn count(&self, pred: impl Fn(&LoadAction) -> bool) -> usize {
        self.actions.iter().filter(|a| pred(a)).count()
    }

    pub fn start_loads(&self) -> usize {
        self.count(|a| matches!(a, LoadAction::StartLoad { .. }))
    }

    pub fn invokes(&self) -> usize {
        self.count(|a| matches!(a, LoadAction::Invoke { .. }))
    }

    pub fn unloads(&self) -> usize {
        self.count(|a| matches!(a, LoadAction::Unload { .. }))
    }
}

/// Derived layout of one instruction stream.
#[derive(Debug, Clone)]
pub struct SplitPlan {
    pub regime: Regime,
    pub segments: Vec<Segment>,
    pub schedule: Option<LoadSchedule>,
    pub diagnostics: Vec<Diagnostic>,
}

impl SplitPlan {
    fn single(instructions: Vec<Instruction>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            regime: Regime::Single,
            segments: vec![Segment {
                name: MAIN_PROGRAM.to_string(),
                instructions,
            }],
            schedule: None,
            diagnostics,
        }
    }

    pub fn instruction_count(&self) -> usize {
        self.segments.iter().map(|s| s.instructions.len()).sum()
    }
}

/// Plan the layout of a flat instruction list for `manufacturer`.
/// Only ABB splits; every other dialect gets a single main.
pub fn plan_for(
    manufacturer: Manufacturer,
    instructions: Vec<Instruction>,
    ignore_length_limit: bool,
) -> SplitPlan {
    match manufacturer {
        Manufacturer::Abb => plan(instructions, &SizeLimits::default(), ignore_length_limit),
        _ => SplitPlan::single(instructions, vec![]),
    }
}

/// Plan the layout of a flat instruction list against `limits`.
pub fn plan(
    instructions: Vec<Instruction>,
    limits: &SizeLimits,
    ignore_length_limit: bool,
) -> SplitPlan {
    let total = instructions.len();
    let regime = limits.regime(total);

    if regime == Regime::Single {
        return SplitPlan::single(instructions, vec![]);
    }

    if ignore_length_limit {
        let warning = Diagnostic::warning(
            DiagnosticKind::ValidationWarning,
            format!(
                "program has {} instructions, above the recommended maximum of {}; splitting disabled",
                total, limits.low
            ),
        );
        return SplitPlan::single(instructions, vec![warning]);
    }

    let prefix = match regime {
        Regime::Large => SUB_FILE_PREFIX,
        _ => SUB_PROCEDURE_PREFIX,
    };
    let segments: Vec<Segment> = split(&instructions, limits.low)
        .into_iter()
        .enumerate()
        .map(|(i, instructions)| Segment {
            name: format!("{}{}", prefix, i),
            instructions,
        })
        .collect();

    let message = match regime {
        Regime::Large => format!(
            "program has {} instructions; split into {} modules loaded dynamically",
            total,
            segments.len()
        ),
        _ => format!(
            "program has {} instructions; split into {} sub-procedures",
            total,
            segments.len()
        ),
    };
    let schedule = (regime == Regime::Large).then(|| LoadSchedule::build(segments.len()));

    SplitPlan {
        regime,
        segments,
        schedule,
        diagnostics: vec![Diagnostic::warning(DiagnosticKind::ValidationWarning, message)],
    }
}

/// Materialize a plan into `module`: main program, sub-procedures, side files
/// and the dispatch that ties them together.
pub fn assemble(module: &mut Module, plan: SplitPlan) {
    let SplitPlan {
        regime,
        segments,
        schedule,
        diagnostics,
    } = plan;
    let header: Vec<String> = diagnostics.iter().map(|d| d.message.clone()).collect();

    if regime == Regime::Single {
        let instructions = segments.into_iter().flat_map(|s| s.instructions).collect();
        module
            .programs
            .insert(0, Program::new(MAIN_PROGRAM, instructions).with_header(header));
        return;
    }

    let names: Vec<String> = segments.iter().map(|s| s.name.clone()).collect();
    module
        .programs
        .insert(0, Program::new(MAIN_PROGRAM, vec![]).with_header(header));

    if regime == Regime::Large {
        let schedule = schedule.unwrap_or_else(|| LoadSchedule::build(names.len()));
        module.extra_programs.extend(
            segments
                .into_iter()
                .map(|s| Program::new(s.name, s.instructions)),
        );
        module.dispatch = Some(Dispatch::Streamed {
            schedule,
            segments: names,
        });
    } else {
        module.procedures.extend(
            segments
                .into_iter()
                .map(|s| Procedure::new(s.name, s.instructions)),
        );
        module.dispatch = Some(Dispatch::Calls(names));
    }
}
