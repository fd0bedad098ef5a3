//! PF-018: CLI subcommands: init, validate, plan, generate, status.

use crate::core::error::GenerationError;
use crate::core::export::{self, FileStatus};
use crate::core::orchestrator::{self, GenerationRequest, RunConfig};
use crate::core::{parser, splitter, types};
use crate::emitters::target::NativeFormatter;
use clap::Subcommand;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new postforge job
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Validate postforge.yaml without generating anything
    Validate {
        /// Path to postforge.yaml
        #[arg(short, long, default_value = "postforge.yaml")]
        file: PathBuf,
    },

    /// Show how the program will be laid out (regime, segments, load schedule)
    Plan {
        /// Path to postforge.yaml
        #[arg(short, long, default_value = "postforge.yaml")]
        file: PathBuf,
    },

    /// Generate controller programs
    Generate {
        /// Path to postforge.yaml
        #[arg(short, long, default_value = "postforge.yaml")]
        file: PathBuf,

        /// Print the primary file instead of writing
        #[arg(long)]
        dry_run: bool,

        /// Output directory (overrides output.dir)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Never split oversized programs, only warn
        #[arg(long)]
        ignore_length_limit: bool,
    },

    /// Show the last export in an output directory
    Status {
        /// Output directory
        #[arg(short, long, default_value = "out")]
        dir: PathBuf,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Plan { file } => cmd_plan(&file),
        Commands::Generate {
            file,
            dry_run,
            out,
            ignore_length_limit,
        } => cmd_generate(&file, dry_run, out.as_deref(), ignore_length_limit),
        Commands::Status { dir } => cmd_status(&dir),
    }
}

fn cmd_init(path: &Path) -> Result<(), String> {
    let config_path = path.join("postforge.yaml");
    if config_path.exists() {
        return Err(format!("{} already exists", config_path.display()));
    }

    let template = r#"version: "1.0"
name: my-cell
description: "postforge job"

options:
  manufacturer: abb
  include_declarations: true
  include_overrides: true
  ignore_length_limit: false

declarations: []
overrides: []
procedures: []

output:
  dir: out

program:
  - comment: approach
  - target:
      motion: joint
      frame:
        origin: [500, 0, 400]
      speed: { tcp: 200 }
      zone: { distance: 10 }
  - target:
      frame:
        origin: [500, 100, 400]
"#;
    std::fs::write(&config_path, template)
        .map_err(|e| format!("cannot write {}: {}", config_path.display(), e))?;

    println!("Initialized postforge job at {}", path.display());
    println!("  Created: {}", config_path.display());
    Ok(())
}

fn cmd_validate(file: &Path) -> Result<(), String> {
    let job = parser::parse_job_file(file)?;
    let errors = parser::validate_job(&job);

    if errors.is_empty() {
        println!(
            "OK: {} ({}, {} targets, {} procedures)",
            job.name,
            job.options.manufacturer,
            job.target_count(),
            job.procedures.len()
        );
        Ok(())
    } else {
        for e in &errors {
            eprintln!("  ERROR: {}", e);
        }
        Err(format!("{} validation error(s)", errors.len()))
    }
}

/// Parse and validate a job file, returning errors if invalid.
fn parse_and_validate(file: &Path) -> Result<types::JobConfig, String> {
    parser::load_job(file).map_err(|e| match e {
        GenerationError::Validation(errors) => {
            for e in &errors {
                eprintln!("  ERROR: {}", e);
            }
            format!("{} validation error(s)", errors.len())
        }
        other => other.to_string(),
    })
}

fn cmd_plan(file: &Path) -> Result<(), String> {
    let job = parse_and_validate(file)?;
    let request = GenerationRequest::from_job(&job);
    let manufacturer = job.options.manufacturer;
    crate::core::codegen::ensure_supported(manufacturer).map_err(|e| e.to_string())?;

    let instructions =
        orchestrator::build_instructions(&request, &NativeFormatter).map_err(|e| e.to_string())?;
    let plan = splitter::plan_for(manufacturer, instructions, job.options.ignore_length_limit);

    println!(
        "Plan: {} ({}), {} instructions, regime {}",
        orchestrator::module_name(&request),
        manufacturer,
        plan.instruction_count(),
        plan.regime
    );
    for segment in &plan.segments {
        println!("  {}: {} instructions", segment.name, segment.instructions.len());
    }
    if let Some(schedule) = &plan.schedule {
        println!(
            "  Load schedule: {} loads, {} invokes, {} unloads",
            schedule.start_loads(),
            schedule.invokes(),
            schedule.unloads()
        );
    }
    for d in &plan.diagnostics {
        println!("  {}", d);
    }
    Ok(())
}

fn cmd_generate(
    file: &Path,
    dry_run: bool,
    out: Option<&Path>,
    ignore_length_limit: bool,
) -> Result<(), String> {
    let mut job = parse_and_validate(file)?;
    if ignore_length_limit {
        job.options.ignore_length_limit = true;
    }

    let output_dir = match out {
        Some(dir) => dir.to_path_buf(),
        None => {
            // output.dir is relative to the job file
            let base = file.parent().unwrap_or_else(|| Path::new("."));
            base.join(&job.output.dir)
        }
    };

    let result = orchestrator::run(&RunConfig {
        job: &job,
        formatter: &NativeFormatter,
        output_dir: &output_dir,
        dry_run,
    })
    .map_err(|e| e.to_string())?;

    for d in &result.output.diagnostics {
        eprintln!("  {}", d);
    }

    if dry_run {
        if let Some((name, lines)) = result.output.primary() {
            println!("=== {} ===", name);
            for line in lines {
                println!("{}", line);
            }
        }
        println!(
            "Dry run: {} file(s), regime {}, nothing written.",
            result.output.files.len(),
            result.output.regime
        );
        return Ok(());
    }

    for f in &result.written {
        println!("  wrote {} ({} lines)", f.path.display(), f.lines);
    }
    println!(
        "Generated {} ({} instructions, regime {}) in {:.2}s [run {}]",
        result.output.module_name,
        result.output.instruction_count,
        result.output.regime,
        result.total_seconds,
        result.run_id
    );

    if result.output.has_errors() {
        return Err("generated with structural errors".to_string());
    }
    Ok(())
}

fn cmd_status(dir: &Path) -> Result<(), String> {
    let manifest = match export::load_manifest(dir).map_err(|e| e.to_string())? {
        Some(m) => m,
        None => {
            println!("No export found in {}. Run `postforge generate` first.", dir.display());
            return Ok(());
        }
    };

    println!("Job: {} ({})", manifest.job, manifest.manufacturer);
    println!("  Generated: {}", manifest.generated_at);
    println!("  Generator: {}", manifest.generator);
    println!(
        "  Regime: {} ({} instructions)",
        manifest.regime, manifest.instruction_count
    );

    let mut changed = 0;
    for (name, status) in export::check_files(dir, &manifest) {
        let lines = manifest.files.get(&name).map_or(0, |f| f.lines);
        let mark = match status {
            FileStatus::Unchanged => "ok".to_string(),
            FileStatus::Modified { actual } => {
                changed += 1;
                format!("MODIFIED ({})", actual)
            }
            FileStatus::Missing => {
                changed += 1;
                "MISSING".to_string()
            }
        };
        println!("    {}: {} lines [{}]", name, lines, mark);
    }
    if changed > 0 {
        println!("  {} file(s) differ from the manifest.", changed);
    }
    Ok(())
}
