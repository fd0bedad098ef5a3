//! PF-015: Job file parsing and validation.
//!
//! Parses postforge.yaml and validates structural constraints:
//! - Version must be "1.0"
//! - Module names must be controller identifiers
//! - Target frames must be orthonormal
//! - Absolute joint targets carry six axis values
//! - The CNC post needs a `cnc:` block

use super::error::GenerationError;
use super::types::*;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Parse a postforge.yaml file from disk.
pub fn parse_job_file(path: &Path) -> Result<JobConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    parse_job(&content)
}

/// Parse a postforge.yaml from a string.
pub fn parse_job(yaml: &str) -> Result<JobConfig, String> {
    serde_yaml_ng::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))
}

/// Parse and validate a job file in one step.
pub fn load_job(path: &Path) -> Result<JobConfig, GenerationError> {
    let job = parse_job_file(path).map_err(GenerationError::Parse)?;
    let errors = validate_job(&job);
    if !errors.is_empty() {
        return Err(GenerationError::Validation(
            errors.into_iter().map(|e| e.message).collect(),
        ));
    }
    Ok(job)
}

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]{0,31}$").expect("valid regex"))
}

/// True if `name` is usable as a module, program, or procedure identifier.
pub fn is_identifier(name: &str) -> bool {
    identifier_re().is_match(name)
}

/// Validate a parsed job. Returns a list of errors (empty = valid).
pub fn validate_job(job: &JobConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut push = |message: String| errors.push(ValidationError { message });

    if job.version != "1.0" {
        push(format!("version must be \"1.0\", got \"{}\"", job.version));
    }

    if job.name.is_empty() {
        push("name must not be empty".to_string());
    }

    if let Some(name) = &job.options.module_name {
        if !is_identifier(name) {
            push(format!("module_name '{}' is not a valid identifier", name));
        }
    }

    if let Some(filename) = &job.output.filename {
        if filename.is_empty() || filename.contains(['/', '\\']) {
            push(format!("output.filename '{}' must be a bare file name", filename));
        }
    }

    for (i, proc) in job.procedures.iter().enumerate() {
        if !is_identifier(&proc.name) {
            push(format!(
                "procedure #{} name '{}' is not a valid identifier",
                i, proc.name
            ));
        }
    }

    if job.options.manufacturer == Manufacturer::Cnc && job.cnc.is_none() {
        push("manufacturer 'cnc' requires a cnc: block".to_string());
    }

    if let Some(cnc) = &job.cnc {
        if cnc.feed_rate <= 0.0 {
            push(format!("cnc.feed_rate must be positive, got {}", cnc.feed_rate));
        }
        if !cnc.tools.is_empty() && !cnc.tools.iter().any(|t| t.number == cnc.active_tool) {
            push(format!(
                "cnc.active_tool T{} is not in the tool table",
                cnc.active_tool
            ));
        }
    }

    let targets = job.program.iter().filter_map(|item| match item {
        ProgramItem::Target(t) => Some(t),
        ProgramItem::Comment(_) => None,
    });
    for (i, target) in targets.enumerate() {
        // Pre-formatted instructions bypass pose checks.
        if target.instruction.is_some() {
            continue;
        }
        match target.motion {
            MotionType::AbsoluteJoint => {
                let n = target.joints.as_ref().map_or(0, Vec::len);
                if n != 6 {
                    push(format!(
                        "target #{} is absolute_joint but has {} joint values (need 6)",
                        i, n
                    ));
                }
            }
            MotionType::Linear | MotionType::Joint => {
                if !target.frame.is_orthonormal() {
                    push(format!("target #{} frame is not orthonormal", i));
                }
            }
        }
        if target.speed.tcp <= 0.0 {
            push(format!("target #{} speed must be positive", i));
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
version: "1.0"
name: weld-cell
options:
  manufacturer: abb
program:
  - target:
      frame:
        origin: [500, 0, 400]
"#;

    #[test]
    fn test_pf015_parse_valid() {
        let job = parse_job(MINIMAL).unwrap();
        assert_eq!(job.name, "weld-cell");
        assert!(validate_job(&job).is_empty());
    }

    #[test]
    fn test_pf015_bad_version() {
        let yaml = MINIMAL.replace("\"1.0\"", "\"2.0\"");
        let errors = validate_job(&parse_job(&yaml).unwrap());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("version"));
    }

    #[test]
    fn test_pf015_empty_name() {
        let yaml = MINIMAL.replace("name: weld-cell", "name: \"\"");
        let errors = validate_job(&parse_job(&yaml).unwrap());
        assert!(errors.iter().any(|e| e.message.contains("name must not be empty")));
    }

    #[test]
    fn test_pf015_module_name_identifier() {
        assert!(is_identifier("MainModule"));
        assert!(is_identifier("Weld_01"));
        assert!(!is_identifier("1st"));
        assert!(!is_identifier("has space"));
        assert!(!is_identifier(""));
        assert!(!is_identifier(&"A".repeat(33)));

        let mut job = parse_job(MINIMAL).unwrap();
        job.options.module_name = Some("bad-name".to_string());
        let errors = validate_job(&job);
        assert!(errors[0].message.contains("module_name"));
    }

    #[test]
    fn test_pf015_skewed_frame() {
        let yaml = r#"
version: "1.0"
name: skew
options:
  manufacturer: kuka
program:
  - target:
      frame:
        origin: [0, 0, 0]
        x_axis: [1, 0, 0]
        y_axis: [1, 1, 0]
"#;
        let errors = validate_job(&parse_job(yaml).unwrap());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("target #0 frame is not orthonormal"));
    }

    #[test]
    fn test_pf015_absolute_joint_needs_six() {
        let yaml = r#"
version: "1.0"
name: joints
options:
  manufacturer: abb
program:
  - comment: home
  - target:
      motion: absolute_joint
      joints: [0, 0, 0, 0, 90]
"#;
        let errors = validate_job(&parse_job(yaml).unwrap());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("has 5 joint values"));
    }

    #[test]
    fn test_pf015_instruction_skips_pose_checks() {
        let yaml = r#"
version: "1.0"
name: raw
options:
  manufacturer: abb
program:
  - target:
      motion: absolute_joint
      instruction: "MoveAbsJ jHome, v100, fine, tool0;"
"#;
        assert!(validate_job(&parse_job(yaml).unwrap()).is_empty());
    }

    #[test]
    fn test_pf015_cnc_requires_block() {
        let yaml = MINIMAL.replace("manufacturer: abb", "manufacturer: cnc");
        let errors = validate_job(&parse_job(&yaml).unwrap());
        assert!(errors.iter().any(|e| e.message.contains("cnc: block")));
    }

    #[test]
    fn test_pf015_cnc_active_tool() {
        let yaml = r#"
version: "1.0"
name: mill
options:
  manufacturer: cnc
cnc:
  active_tool: 3
  tools:
    - { number: 1, name: ball-6 }
"#;
        let errors = validate_job(&parse_job(yaml).unwrap());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("T3"));
    }

    #[test]
    fn test_pf015_procedure_names() {
        let mut job = parse_job(MINIMAL).unwrap();
        job.procedures.push(CustomProcedure {
            name: String::new(),
            body: vec![],
            raw: false,
        });
        let errors = validate_job(&job);
        assert!(errors[0].message.contains("procedure #0"));
    }

    #[test]
    fn test_pf015_filename_must_be_bare() {
        let mut job = parse_job(MINIMAL).unwrap();
        job.output.filename = Some("../escape".to_string());
        assert_eq!(validate_job(&job).len(), 1);
    }

    #[test]
    fn test_pf015_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("postforge.yaml");
        std::fs::write(&path, MINIMAL).unwrap();
        let job = parse_job_file(&path).unwrap();
        assert_eq!(job.target_count(), 1);
    }

    #[test]
    fn test_pf015_parse_invalid_yaml() {
        let err = parse_job("version: [").unwrap_err();
        assert!(err.starts_with("YAML parse error"));
        assert!(parse_job_file(Path::new("/nonexistent/postforge.yaml")).is_err());
    }

    #[test]
    fn test_pf015_load_job() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("postforge.yaml");
        std::fs::write(&path, MINIMAL).unwrap();
        assert_eq!(load_job(&path).unwrap().name, "weld-cell");

        std::fs::write(&path, MINIMAL.replace("\"1.0\"", "\"2.0\"")).unwrap();
        match load_job(&path) {
            Err(GenerationError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("version"));
            }
            other => panic!("expected validation failure, got {:?}", other),
        }

        std::fs::write(&path, "version: [").unwrap();
        assert!(matches!(load_job(&path), Err(GenerationError::Parse(_))));
    }
}
