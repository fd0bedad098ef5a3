//! PF-012: Code emission: dispatch to dialect emitters.
//!
//! Every dialect goes through the same module validity check; structural
//! problems are reported as diagnostics and the best-effort text is still
//! returned.

use super::error::GenerationError;
use super::model::Module;
use super::types::Manufacturer;
use crate::emitters::{gcode, krl, rapid, EmitOptions, Emission};

/// Fail fast for manufacturers without an emitter.
pub fn ensure_supported(manufacturer: Manufacturer) -> Result<(), GenerationError> {
    match manufacturer {
        Manufacturer::Abb | Manufacturer::Kuka | Manufacturer::Cnc => Ok(()),
        other => Err(GenerationError::Configuration(other)),
    }
}

/// Serialize `module` in `manufacturer`'s dialect.
pub fn emit(
    module: &Module,
    manufacturer: Manufacturer,
    opts: &EmitOptions,
) -> Result<Emission, GenerationError> {
    let mut emission = match manufacturer {
        Manufacturer::Abb => rapid::emit(module, opts),
        Manufacturer::Kuka => krl::emit(module, opts),
        Manufacturer::Cnc => gcode::emit(module, opts),
        other => return Err(GenerationError::Configuration(other)),
    };

    let mut diagnostics = module.validate();
    diagnostics.append(&mut emission.diagnostics);
    emission.diagnostics = diagnostics;
    Ok(emission)
}

/// Comment line in `manufacturer`'s dialect.
pub fn comment(manufacturer: Manufacturer, text: &str) -> Result<String, GenerationError> {
    match manufacturer {
        Manufacturer::Abb => Ok(rapid::comment(text)),
        Manufacturer::Kuka => Ok(krl::comment(text)),
        Manufacturer::Cnc => Ok(gcode::comment(text)),
        other => Err(GenerationError::Configuration(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::DiagnosticKind;
    use crate::core::model::{Instruction, Procedure, Program};
    use crate::emitters::is_timestamp_line;

    fn module(manufacturer: Manufacturer, n: usize) -> Module {
        let mut m = Module::new("Job");
        m.programs.push(Program::new(
            "main",
            (0..n)
                .map(|i| Instruction::new(format!("move {}", i), manufacturer))
                .collect(),
        ));
        m
    }

    fn opts() -> EmitOptions {
        EmitOptions::at("2026-10-19T08:00:00Z")
    }

    #[test]
    fn test_pf012_dispatches_rapid() {
        let e = emit(&module(Manufacturer::Abb, 1), Manufacturer::Abb, &opts()).unwrap();
        assert_eq!(e.primary_file(), Some("Job.mod"));
        assert!(e.diagnostics.is_empty());
    }

    #[test]
    fn test_pf012_dispatches_krl() {
        let e = emit(&module(Manufacturer::Kuka, 1), Manufacturer::Kuka, &opts()).unwrap();
        assert_eq!(e.primary_file(), Some("Job.src"));
    }

    #[test]
    fn test_pf012_dispatches_gcode() {
        let e = emit(&module(Manufacturer::Cnc, 1), Manufacturer::Cnc, &opts()).unwrap();
        assert_eq!(e.primary_file(), Some("Job.cnc"));
    }

    #[test]
    fn test_pf012_unsupported_manufacturer() {
        for m in [Manufacturer::Universal, Manufacturer::Fanuc, Manufacturer::Staubli] {
            let result = emit(&module(m, 1), m, &opts());
            assert!(matches!(result, Err(GenerationError::Configuration(x)) if x == m));
            assert!(ensure_supported(m).is_err());
            assert!(comment(m, "x").is_err());
        }
    }

    #[test]
    fn test_pf012_structural_invalid_still_emits() {
        let mut m = module(Manufacturer::Abb, 2);
        m.procedures.push(Procedure::new("main", vec![]));
        let e = emit(&m, Manufacturer::Abb, &opts()).unwrap();
        assert_eq!(e.diagnostics.len(), 1);
        assert_eq!(e.diagnostics[0].kind, DiagnosticKind::StructuralInvalid);
        assert!(e.lines.contains(&"    move 1".to_string()));
    }

    #[test]
    fn test_pf012_empty_input_rapid_and_krl() {
        for m in [Manufacturer::Abb, Manufacturer::Kuka] {
            let e = emit(&module(m, 0), m, &opts()).unwrap();
            assert!(e.diagnostics.is_empty());
            let first = e.lines.first().cloned().unwrap_or_default();
            let last = e.lines.last().cloned().unwrap_or_default();
            match m {
                Manufacturer::Abb => {
                    assert_eq!(first, "MODULE Job");
                    assert_eq!(last, "ENDMODULE");
                }
                _ => {
                    assert_eq!(first, "&ACCESS RVP");
                    assert_eq!(last, "END");
                }
            }
        }
    }

    #[test]
    fn test_pf012_deterministic() {
        for m in [Manufacturer::Abb, Manufacturer::Kuka, Manufacturer::Cnc] {
            let module = module(m, 20);
            let a = emit(&module, m, &EmitOptions::at("one")).unwrap();
            let b = emit(&module, m, &EmitOptions::at("two")).unwrap();
            for (name, lines) in &a.files {
                let other = &b.files[name];
                let strip = |l: &Vec<String>| -> Vec<String> {
                    l.iter().filter(|x| !is_timestamp_line(x)).cloned().collect()
                };
                assert_eq!(strip(lines), strip(other), "{} differs", name);
            }
        }
    }

    #[test]
    fn test_pf012_comment_per_dialect() {
        assert_eq!(comment(Manufacturer::Abb, "hi").unwrap(), "! hi");
        assert_eq!(comment(Manufacturer::Kuka, "hi").unwrap(), "; hi");
        assert_eq!(comment(Manufacturer::Cnc, "hi").unwrap(), "(hi)");
    }
}
