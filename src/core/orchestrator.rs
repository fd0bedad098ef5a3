//! PF-017: Orchestrator: one generation call end to end.
//!
//! items → flat instruction list (formatter / PoseResolver) → split plan →
//! module → dialect emission → (optionally) export, manifest and events.

use super::codegen;
use super::error::{Diagnostic, GenerationError};
use super::export::{self, ExportedFile};
use super::model::{Instruction, Module, Procedure, Program};
use super::pose::{MoveKind, PoseResolver};
use super::splitter;
use super::types::*;
use crate::emitters::target::{ModalState, TargetFormatter};
use crate::emitters::{gcode, EmitOptions};
use crate::provenance::eventlog;
use indexmap::IndexMap;
use std::path::Path;
use std::time::Instant;

/// Module name used for ABB when none is configured.
pub const DEFAULT_ABB_MODULE: &str = "MainModule";

/// Everything one generation call reads.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub job_name: &'a str,
    pub items: &'a [ProgramItem],
    pub options: &'a GenerationOptions,
    pub declarations: &'a [String],
    pub overrides: &'a [String],
    pub procedures: &'a [CustomProcedure],
    pub cnc: Option<&'a CncSettings>,
    pub filename: Option<&'a str>,
}

impl<'a> GenerationRequest<'a> {
    pub fn from_job(job: &'a JobConfig) -> Self {
        Self {
            job_name: &job.name,
            items: &job.program,
            options: &job.options,
            declarations: &job.declarations,
            overrides: &job.overrides,
            procedures: &job.procedures,
            cnc: job.cnc.as_ref(),
            filename: job.output.filename.as_deref(),
        }
    }
}

/// Result of one generation call.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub module_name: String,
    /// Every output file (primary first) keyed by file name
    pub files: IndexMap<String, Vec<String>>,
    pub diagnostics: Vec<Diagnostic>,
    pub regime: Regime,
    /// Flat instruction count before splitting
    pub instruction_count: usize,
}

impl GenerationOutput {
    /// Name and lines of the primary file.
    pub fn primary(&self) -> Option<(&str, &[String])> {
        self.files
            .iter()
            .next()
            .map(|(name, lines)| (name.as_str(), lines.as_slice()))
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Module name for `request`: the configured one, else a per-dialect default.
pub fn module_name(request: &GenerationRequest) -> String {
    if let Some(name) = &request.options.module_name {
        return name.clone();
    }
    match request.options.manufacturer {
        Manufacturer::Abb => DEFAULT_ABB_MODULE.to_string(),
        _ => sanitize_identifier(request.filename.unwrap_or(request.job_name)),
    }
}

/// Replace characters a controller identifier cannot hold.
fn sanitize_identifier(raw: &str) -> String {
    let mut out: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if !out.starts_with(|c: char| c.is_ascii_alphabetic()) {
        out.insert(0, 'P');
    }
    out.truncate(32);
    out
}

/// Turn the program items into the flat instruction list.
pub fn build_instructions(
    request: &GenerationRequest,
    formatter: &dyn TargetFormatter,
) -> Result<Vec<Instruction>, GenerationError> {
    let manufacturer = request.options.manufacturer;
    if manufacturer == Manufacturer::Cnc {
        return Ok(build_cnc_instructions(request));
    }

    let mut out = Vec::with_capacity(request.items.len());
    let mut modal = ModalState::default();
    for (index, item) in request.items.iter().enumerate() {
        match item {
            ProgramItem::Comment(text) => {
                out.push(Instruction::new(
                    codegen::comment(manufacturer, text)?,
                    manufacturer,
                ));
            }
            ProgramItem::Target(target) => {
                let text = formatter
                    .format(target, manufacturer)
                    .map_err(|message| GenerationError::Target { index, message })?;
                for line in formatter.modal_lines(&mut modal, target, manufacturer) {
                    out.push(Instruction::new(line, manufacturer));
                }
                out.push(Instruction::new(text, manufacturer));
            }
        }
    }
    Ok(out)
}

fn build_cnc_instructions(request: &GenerationRequest) -> Vec<Instruction> {
    let settings = request.cnc.cloned().unwrap_or_default();
    let resolver = PoseResolver::new(settings.probe_distance, settings.calibration);
    let cnc = |text: String| Instruction::new(text, Manufacturer::Cnc);

    let mut out: Vec<Instruction> = gcode::tool_change_block(&settings)
        .into_iter()
        .map(cnc)
        .collect();
    let mut moves = 0;
    for item in request.items {
        match item {
            ProgramItem::Comment(text) => out.push(cnc(gcode::comment(text))),
            ProgramItem::Target(target) => {
                let line = match &target.instruction {
                    Some(text) => text.clone(),
                    None => gcode::motion_line(
                        MoveKind::for_index(moves),
                        &resolver.resolve(&target.frame),
                        Some(settings.feed_rate),
                    ),
                };
                out.push(cnc(line));
                moves += 1;
            }
        }
    }
    out.push(cnc(gcode::retract_line(&settings)));
    out
}

/// Assemble the module around an already-planned main program.
fn build_module(request: &GenerationRequest, name: String) -> Module {
    let manufacturer = request.options.manufacturer;
    let mut module = Module::new(name);

    if manufacturer == Manufacturer::Cnc {
        let settings = request.cnc.cloned().unwrap_or_default();
        module
            .declarations
            .extend(gcode::header_block(&module.name, &settings));
    }
    if request.options.include_declarations {
        module.declarations.extend(request.declarations.iter().cloned());
    }
    if request.options.include_overrides {
        module.overrides.extend(request.overrides.iter().cloned());
    }

    for proc in request.procedures {
        let body: Vec<Instruction> = proc
            .body
            .iter()
            .map(|line| Instruction::new(line.clone(), manufacturer))
            .collect();
        if proc.raw {
            module.programs.push(Program::inline(proc.name.clone(), body));
        } else {
            module.procedures.push(Procedure::new(proc.name.clone(), body));
        }
    }
    module
}

/// Generate controller text for `request`. Pure: nothing touches the disk.
pub fn generate(
    request: &GenerationRequest,
    formatter: &dyn TargetFormatter,
    opts: &EmitOptions,
) -> Result<GenerationOutput, GenerationError> {
    let manufacturer = request.options.manufacturer;
    codegen::ensure_supported(manufacturer)?;

    let instructions = build_instructions(request, formatter)?;
    let instruction_count = instructions.len();
    let name = module_name(request);
    tracing::info!(
        module = %name,
        manufacturer = %manufacturer,
        instructions = instruction_count,
        "generating"
    );

    let plan = splitter::plan_for(
        manufacturer,
        instructions,
        request.options.ignore_length_limit,
    );
    let regime = plan.regime;
    let mut diagnostics = plan.diagnostics.clone();

    let mut module = build_module(request, name.clone());
    splitter::assemble(&mut module, plan);

    let emission = codegen::emit(&module, manufacturer, opts)?;
    diagnostics.extend(emission.diagnostics);

    for d in &diagnostics {
        if d.is_error() {
            tracing::error!(kind = %d.kind, "{}", d.message);
        } else {
            tracing::warn!(kind = %d.kind, "{}", d.message);
        }
    }

    Ok(GenerationOutput {
        module_name: name,
        files: emission.files,
        diagnostics,
        regime,
        instruction_count,
    })
}

/// Configuration for a generate-and-export run.
pub struct RunConfig<'a> {
    pub job: &'a JobConfig,
    pub formatter: &'a dyn TargetFormatter,
    pub output_dir: &'a Path,
    /// Generate only; write nothing
    pub dry_run: bool,
}

/// Outcome of a run.
#[derive(Debug)]
pub struct RunResult {
    pub run_id: String,
    pub output: GenerationOutput,
    pub written: Vec<ExportedFile>,
    pub total_seconds: f64,
}

/// Generate, then export files, the manifest and provenance events.
pub fn run(cfg: &RunConfig) -> Result<RunResult, GenerationError> {
    let start = Instant::now();
    let run_id = eventlog::generate_run_id();
    let generated_at = eventlog::now_iso8601();

    let request = GenerationRequest::from_job(cfg.job);
    let output = generate(&request, cfg.formatter, &EmitOptions::at(&generated_at))?;

    if cfg.dry_run {
        return Ok(RunResult {
            run_id,
            output,
            written: vec![],
            total_seconds: start.elapsed().as_secs_f64(),
        });
    }

    let dir = cfg.output_dir;
    let manufacturer = cfg.job.options.manufacturer;
    eventlog::append_event(
        dir,
        GenerationEvent::GenerationStarted {
            job: cfg.job.name.clone(),
            run_id: run_id.clone(),
            manufacturer,
            postforge_version: env!("CARGO_PKG_VERSION").to_string(),
        },
    )?;

    let written = match export::export(&output.files, dir) {
        Ok(w) => w,
        Err(e) => {
            // record the failure, then propagate the original error
            if let Err(log_err) = eventlog::append_event(
                dir,
                GenerationEvent::DiagnosticRaised {
                    run_id: run_id.clone(),
                    diagnostic: Diagnostic::from_error(&e),
                },
            ) {
                tracing::warn!(error = %log_err, "cannot record export failure");
            }
            return Err(e);
        }
    };

    for f in &written {
        eventlog::append_event(
            dir,
            GenerationEvent::FileWritten {
                run_id: run_id.clone(),
                path: f.name.clone(),
                hash: f.hash.clone(),
                lines: f.lines,
            },
        )?;
    }
    for d in &output.diagnostics {
        eventlog::append_event(
            dir,
            GenerationEvent::DiagnosticRaised {
                run_id: run_id.clone(),
                diagnostic: d.clone(),
            },
        )?;
    }

    let manifest = export::new_manifest(
        &cfg.job.name,
        manufacturer,
        &generated_at,
        output.regime,
        output.instruction_count,
        &written,
    );
    export::save_manifest(dir, &manifest)?;

    let total_seconds = start.elapsed().as_secs_f64();
    eventlog::append_event(
        dir,
        GenerationEvent::GenerationCompleted {
            run_id: run_id.clone(),
            regime: output.regime,
            instruction_count: output.instruction_count,
            files: written.len(),
            total_seconds,
        },
    )?;
    tracing::info!(
        run_id = %run_id,
        files = written.len(),
        dir = %dir.display(),
        "export complete"
    );

    Ok(RunResult {
        run_id,
        output,
        written,
        total_seconds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::DiagnosticKind;
    use crate::core::geometry::{Frame, Vec3};
    use crate::core::parser::parse_job;
    use crate::core::splitter::{ABB_HIGH_LIMIT, ABB_LOW_LIMIT};
    use crate::emitters::is_timestamp_line;
    use crate::emitters::target::NativeFormatter;

    fn opts() -> EmitOptions {
        EmitOptions::at("2026-10-19T08:00:00Z")
    }

    fn job(manufacturer: &str, n: usize) -> JobConfig {
        let mut job = parse_job(&format!(
            "version: \"1.0\"\nname: weld-cell\noptions:\n  manufacturer: {}\n",
            manufacturer
        ))
        .unwrap();
        job.program = (0..n)
            .map(|i| {
                ProgramItem::Target(Target {
                    instruction: Some(format!("MoveL p{}, v100, fine, tool0;", i)),
                    ..Target::default()
                })
            })
            .collect();
        job
    }

    fn run_job(job: &JobConfig) -> Result<GenerationOutput, GenerationError> {
        generate(&GenerationRequest::from_job(job), &NativeFormatter, &opts())
    }

    #[test]
    fn test_pf017_abb_single() {
        let mut j = job("abb", 2);
        j.program.insert(0, ProgramItem::Comment("approach".to_string()));
        let out = run_job(&j).unwrap();
        assert_eq!(out.regime, Regime::Single);
        assert_eq!(out.instruction_count, 3);
        assert_eq!(out.module_name, "MainModule");
        let (name, lines) = out.primary().unwrap();
        assert_eq!(name, "MainModule.mod");
        assert!(lines.contains(&"    ! approach".to_string()));
        assert!(lines.contains(&"  PROC main()".to_string()));
        assert!(out.files.contains_key("MainModule.pgf"));
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_pf017_abb_regime_boundaries() {
        let cases = [
            (ABB_LOW_LIMIT - 1, Regime::Single),
            (ABB_LOW_LIMIT, Regime::Medium),
            (ABB_HIGH_LIMIT - 1, Regime::Medium),
            (ABB_HIGH_LIMIT, Regime::Large),
        ];
        for (n, regime) in cases {
            let out = run_job(&job("abb", n)).unwrap();
            assert_eq!(out.regime, regime, "n = {}", n);
            assert_eq!(out.instruction_count, n);
        }
    }

    #[test]
    fn test_pf017_abb_large_side_files() {
        let out = run_job(&job("abb", ABB_HIGH_LIMIT)).unwrap();
        let segments = ABB_HIGH_LIMIT.div_ceil(ABB_LOW_LIMIT);
        // primary .mod, .pgf, one side module per segment
        assert_eq!(out.files.len(), 2 + segments);
        assert!(out.files.contains_key("progNumber0.mod"));
        assert!(out.files.contains_key(&format!("progNumber{}.mod", segments - 1)));
        let (_, main) = out.primary().unwrap();
        assert!(main.iter().any(|l| l.contains("VAR loadsession load1;")));
        assert_eq!(out.diagnostics.len(), 1);
    }

    #[test]
    fn test_pf017_abb_medium_main_calls_segments() {
        let mut j = job("abb", ABB_LOW_LIMIT + 1);
        j.overrides = vec!["ConfL \\Off;".to_string()];
        let out = run_job(&j).unwrap();
        let (_, lines) = out.primary().unwrap();
        let main = lines.iter().position(|l| l == "  PROC main()").unwrap();
        let end = main + lines[main..].iter().position(|l| l == "  ENDPROC").unwrap();
        let body = &lines[main + 1..end];
        let ov = body.iter().position(|l| l == "    ConfL \\Off;").unwrap();
        let first = body.iter().position(|l| l == "    SubProg0;").unwrap();
        let second = body.iter().position(|l| l == "    SubProg1;").unwrap();
        assert!(ov < first && first < second);
        assert!(body[..ov].iter().all(|l| l.trim_start().starts_with('!')));
        assert!(lines.contains(&"  PROC SubProg1()".to_string()));
    }

    #[test]
    fn test_pf017_ignore_length_limit() {
        let mut j = job("abb", ABB_LOW_LIMIT + 10);
        j.options.ignore_length_limit = true;
        let out = run_job(&j).unwrap();
        assert_eq!(out.regime, Regime::Single);
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::ValidationWarning);
    }

    #[test]
    fn test_pf017_kuka_never_splits() {
        let mut j = job("kuka", 6000);
        j.output.filename = Some("Weld01".to_string());
        let out = run_job(&j).unwrap();
        assert_eq!(out.regime, Regime::Single);
        assert_eq!(out.files.len(), 1);
        assert_eq!(out.primary().unwrap().0, "Weld01.src");
        assert!(out
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::ValidationWarning));
    }

    #[test]
    fn test_pf017_kuka_module_name_from_job() {
        let out = run_job(&job("kuka", 1)).unwrap();
        assert_eq!(out.module_name, "weld_cell");
        assert!(out.files.contains_key("weld_cell.src"));
    }

    #[test]
    fn test_pf017_kuka_speed_changes() {
        let mut j = job("kuka", 0);
        for tcp in [200.0, 200.0, 500.0] {
            j.program.push(ProgramItem::Target(Target {
                frame: Frame::world_xy(Vec3::new(100.0, 0.0, 300.0)),
                speed: Speed { tcp, ori: 500.0 },
                ..Target::default()
            }));
        }
        let out = run_job(&j).unwrap();
        // tool, base, two speed changes and three moves; the defaults block sets 0.2 too
        assert_eq!(out.instruction_count, 7);
        let (_, lines) = out.primary().unwrap();
        assert_eq!(lines.iter().filter(|l| l.contains("$VEL.CP = 0.2")).count(), 2);
        assert!(lines.iter().any(|l| l.contains("$VEL.CP = 0.5")));
    }

    #[test]
    fn test_pf017_kuka_joint_move_keeps_cp_velocity() {
        let mut j = job("kuka", 0);
        for (motion, tcp) in [
            (MotionType::Linear, 200.0),
            (MotionType::Joint, 500.0),
            (MotionType::Linear, 500.0),
        ] {
            j.program.push(ProgramItem::Target(Target {
                motion,
                frame: Frame::world_xy(Vec3::new(100.0, 0.0, 300.0)),
                speed: Speed { tcp, ori: 500.0 },
                ..Target::default()
            }));
        }
        let out = run_job(&j).unwrap();
        let (_, lines) = out.primary().unwrap();
        let last_lin = lines.iter().rposition(|l| l.trim_start().starts_with("LIN ")).unwrap();
        let set = lines.iter().position(|l| l.trim() == "$VEL.CP = 0.5").unwrap();
        let ptp = lines.iter().rposition(|l| l.trim_start().starts_with("PTP {X")).unwrap();
        assert!(ptp < set && set < last_lin);
    }

    #[test]
    fn test_pf017_kuka_tool_and_base_selection() {
        let mut j = job("kuka", 0);
        for (tool, base) in [(2, 1), (2, 3)] {
            j.program.push(ProgramItem::Target(Target {
                frame: Frame::world_xy(Vec3::new(100.0, 0.0, 300.0)),
                tool: Tool { name: "torch".to_string(), number: tool },
                wobj: CoordinateSystem { name: "table".to_string(), number: base },
                ..Target::default()
            }));
        }
        let out = run_job(&j).unwrap();
        let (_, lines) = out.primary().unwrap();
        let body: Vec<&str> = lines.iter().map(|l| l.trim()).collect();
        let first = body.iter().position(|l| *l == "$TOOL = TOOL_DATA[2]").unwrap();
        assert_eq!(body[first + 1], "$BASE = BASE_DATA[1]");
        assert!(body.contains(&"$BASE = BASE_DATA[3]"));
        assert_eq!(body.iter().filter(|l| **l == "$TOOL = TOOL_DATA[2]").count(), 1);
    }

    #[test]
    fn test_pf017_cnc_path() {
        let yaml = r#"
version: "1.0"
name: mill
options:
  manufacturer: cnc
output:
  filename: Part7
cnc:
  program_number: 7
  feed_rate: 800
  tools:
    - { number: 1, name: ball-6, diameter: 6 }
program:
  - comment: roughing
  - target: { frame: { origin: [10, 20, 5] } }
  - target: { frame: { origin: [10, 30, 5] } }
"#;
        let out = run_job(&parse_job(yaml).unwrap()).unwrap();
        let (name, lines) = out.primary().unwrap();
        assert_eq!(name, "Part7.cnc");
        assert_eq!(lines[0], "%");
        assert_eq!(lines[1], "O7 (Part7)");
        assert!(lines.contains(&"T1 M6".to_string()));
        assert!(lines.contains(&"(roughing)".to_string()));
        assert!(lines.contains(&"G0 X20.000 Y-10.000 Z5.000 A0.000 B0.000".to_string()));
        assert!(lines.contains(&"G1 X30.000 Y-10.000 Z5.000 A0.000 B0.000 F800.000".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("%"));
    }

    #[test]
    fn test_pf017_unsupported_manufacturer() {
        for m in ["universal", "fanuc", "staubli"] {
            let err = run_job(&job(m, 3)).unwrap_err();
            assert!(matches!(err, GenerationError::Configuration(_)));
        }
    }

    #[test]
    fn test_pf017_unsupported_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("out");
        let j = job("fanuc", 3);
        let err = run(&RunConfig {
            job: &j,
            formatter: &NativeFormatter,
            output_dir: &out_dir,
            dry_run: false,
        })
        .unwrap_err();
        assert!(matches!(err, GenerationError::Configuration(Manufacturer::Fanuc)));
        assert!(!out_dir.exists());
    }

    #[test]
    fn test_pf017_target_error_has_index() {
        let mut j = job("abb", 0);
        j.program.push(ProgramItem::Comment("x".to_string()));
        j.program.push(ProgramItem::Target(Target {
            motion: MotionType::AbsoluteJoint,
            ..Target::default()
        }));
        let err = run_job(&j).unwrap_err();
        assert!(matches!(err, GenerationError::Target { index: 1, .. }));
    }

    #[test]
    fn test_pf017_options_gate_declarations() {
        let mut j = job("abb", 1);
        j.declarations = vec!["PERS num counter := 0;".to_string()];
        j.overrides = vec!["counter := 1;".to_string()];
        let with = run_job(&j).unwrap();
        assert!(with.primary().unwrap().1.iter().any(|l| l.contains("PERS num")));
        assert!(with.primary().unwrap().1.iter().any(|l| l.contains("counter := 1;")));

        j.options.include_declarations = false;
        j.options.include_overrides = false;
        let without = run_job(&j).unwrap();
        assert!(!without.primary().unwrap().1.iter().any(|l| l.contains("PERS num")));
        assert!(!without.primary().unwrap().1.iter().any(|l| l.contains("counter := 1;")));
    }

    #[test]
    fn test_pf017_custom_procedures() {
        let mut j = job("abb", 1);
        j.procedures = vec![
            CustomProcedure {
                name: "Purge".to_string(),
                body: vec!["SetDO doPurge, 1;".to_string()],
                raw: false,
            },
            CustomProcedure {
                name: "Raw".to_string(),
                body: vec!["PROC Raw()".to_string(), "ENDPROC".to_string()],
                raw: true,
            },
        ];
        let out = run_job(&j).unwrap();
        let (_, lines) = out.primary().unwrap();
        assert!(lines.contains(&"  PROC Purge()".to_string()));
        assert!(lines.contains(&"  PROC Raw()".to_string()));
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_pf017_duplicate_procedure_is_structural() {
        let mut j = job("abb", 1);
        j.procedures = vec![CustomProcedure {
            name: "MAIN".to_string(),
            body: vec![],
            raw: false,
        }];
        let out = run_job(&j).unwrap();
        assert!(out.has_errors());
        assert!(out.primary().is_some());
    }

    #[test]
    fn test_pf017_deterministic_modulo_timestamp() {
        let j = job("abb", ABB_LOW_LIMIT + 1);
        let request = GenerationRequest::from_job(&j);
        let a = generate(&request, &NativeFormatter, &EmitOptions::at("2026-01-01")).unwrap();
        let b = generate(&request, &NativeFormatter, &EmitOptions::at("2027-01-01")).unwrap();
        assert_eq!(a.files.len(), b.files.len());
        for ((na, la), (nb, lb)) in a.files.iter().zip(&b.files) {
            assert_eq!(na, nb);
            let strip = |l: &Vec<String>| -> Vec<String> {
                l.iter().filter(|x| !is_timestamp_line(x)).cloned().collect()
            };
            assert_eq!(strip(la), strip(lb));
        }
    }

    #[test]
    fn test_pf017_run_exports_manifest_and_events() {
        let dir = tempfile::tempdir().unwrap();
        let j = job("abb", 3);
        let result = run(&RunConfig {
            job: &j,
            formatter: &NativeFormatter,
            output_dir: dir.path(),
            dry_run: false,
        })
        .unwrap();
        assert_eq!(result.written.len(), 2);
        assert!(dir.path().join("MainModule.mod").exists());
        assert!(dir.path().join("MainModule.pgf").exists());

        let manifest = export::load_manifest(dir.path()).unwrap().unwrap();
        assert_eq!(manifest.instruction_count, 3);
        assert_eq!(manifest.files["MainModule.mod"].hash, result.written[0].hash);

        let events = eventlog::read_events(dir.path()).unwrap();
        assert!(matches!(
            events.first().map(|e| &e.event),
            Some(GenerationEvent::GenerationStarted { .. })
        ));
        assert!(matches!(
            events.last().map(|e| &e.event),
            Some(GenerationEvent::GenerationCompleted { files: 2, .. })
        ));
    }

    #[test]
    fn test_pf017_export_failure_is_logged_and_returned() {
        let dir = tempfile::tempdir().unwrap();
        // a directory squatting on the primary file name blocks the rename
        std::fs::create_dir_all(dir.path().join("MainModule.mod").join("keep")).unwrap();
        let j = job("abb", 1);
        let err = run(&RunConfig {
            job: &j,
            formatter: &NativeFormatter,
            output_dir: dir.path(),
            dry_run: false,
        })
        .unwrap_err();
        assert!(matches!(err, GenerationError::Io { .. }));

        let events = eventlog::read_events(dir.path()).unwrap();
        assert!(matches!(
            events.last().map(|e| &e.event),
            Some(GenerationEvent::DiagnosticRaised { diagnostic, .. })
                if diagnostic.kind == DiagnosticKind::IoFailure
        ));
    }

    #[test]
    fn test_pf017_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("out");
        let j = job("kuka", 2);
        let result = run(&RunConfig {
            job: &j,
            formatter: &NativeFormatter,
            output_dir: &out_dir,
            dry_run: true,
        })
        .unwrap();
        assert!(result.written.is_empty());
        assert!(result.output.primary().is_some());
        assert!(!out_dir.exists());
    }

    #[test]
    fn test_pf017_sanitize_identifier() {
        assert_eq!(sanitize_identifier("weld-cell"), "weld_cell");
        assert_eq!(sanitize_identifier("7axis"), "P7axis");
        assert_eq!(sanitize_identifier(&"x".repeat(40)).len(), 32);
    }
}
