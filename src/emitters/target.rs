//! PF-011: Target → controller instruction formatting.
//!
//! Upstream tooling normally hands over targets that already carry their own
//! instruction text. `TargetFormatter` is the seam for that capability;
//! `NativeFormatter` covers plain linear/joint/absolute-joint moves for the
//! robot dialects.

use super::num;
use crate::core::geometry::Frame;
use crate::core::types::{Manufacturer, MotionType, Speed, Target, Zone};

/// ABB predefined `speeddata` TCP speeds (mm/s).
pub const ABB_SPEEDS: [u32; 25] = [
    5, 10, 20, 30, 40, 50, 60, 80, 100, 150, 200, 300, 400, 500, 600, 800, 1000, 1500, 2000,
    2500, 3000, 4000, 5000, 6000, 7000,
];

/// ABB predefined `zonedata` path radii (mm).
pub const ABB_ZONES: [u32; 14] = [0, 1, 5, 10, 15, 20, 30, 40, 50, 60, 80, 100, 150, 200];

/// Reorientation speed of the predefined `speeddata`.
const ABB_DEFAULT_ORI_SPEED: f64 = 500.0;

/// External axis placeholder for unused axes.
const ABB_NO_AXIS: &str = "9E9";

/// Formats a target into one controller instruction.
pub trait TargetFormatter {
    /// Instruction text for `target` in `manufacturer`'s dialect.
    fn format(&self, target: &Target, manufacturer: Manufacturer) -> Result<String, String>;

    /// Statements to emit before `target` for dialects where speed, tool and
    /// base are controller state rather than part of the move. `state` holds
    /// what the program has set so far and is updated for every line returned.
    fn modal_lines(
        &self,
        _state: &mut ModalState,
        _target: &Target,
        _manufacturer: Manufacturer,
    ) -> Vec<String> {
        Vec::new()
    }
}

/// Modal controller settings last written by the program. `None` until the
/// program sets them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModalState {
    pub cp_velocity: Option<f64>,
    pub tool: Option<u32>,
    pub base: Option<u32>,
}

/// Built-in formatter for ABB and KUKA moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFormatter;

impl TargetFormatter for NativeFormatter {
    fn format(&self, target: &Target, manufacturer: Manufacturer) -> Result<String, String> {
        if let Some(text) = &target.instruction {
            return Ok(text.clone());
        }
        match manufacturer {
            Manufacturer::Abb => abb_move(target),
            Manufacturer::Kuka => kuka_move(target),
            other => Err(format!("no native target format for {}", other)),
        }
    }

    fn modal_lines(
        &self,
        state: &mut ModalState,
        target: &Target,
        manufacturer: Manufacturer,
    ) -> Vec<String> {
        if manufacturer != Manufacturer::Kuka || target.instruction.is_some() {
            return Vec::new();
        }
        if target.motion == MotionType::AbsoluteJoint {
            return Vec::new();
        }

        let mut lines = Vec::new();
        if state.tool != Some(target.tool.number) {
            lines.push(format!("$TOOL = {}", kuka_frame_data("TOOL_DATA", target.tool.number)));
            state.tool = Some(target.tool.number);
        }
        if state.base != Some(target.wobj.number) {
            lines.push(format!("$BASE = {}", kuka_frame_data("BASE_DATA", target.wobj.number)));
            state.base = Some(target.wobj.number);
        }
        // PTP moves run on $VEL_AXIS; only LIN consumes $VEL.CP
        let cp = target.speed.tcp / 1000.0;
        if target.motion == MotionType::Linear && state.cp_velocity != Some(cp) {
            lines.push(format!("$VEL.CP = {}", num(cp)));
            state.cp_velocity = Some(cp);
        }
        lines
    }
}

/// KRL frame reference: index 0 is the null frame.
fn kuka_frame_data(table: &str, number: u32) -> String {
    if number == 0 {
        "$NULLFRAME".to_string()
    } else {
        format!("{}[{}]", table, number)
    }
}

/// `speeddata` literal: predefined name when one matches, inline data otherwise.
pub fn abb_speed(speed: &Speed) -> String {
    let named = speed.ori == ABB_DEFAULT_ORI_SPEED
        && speed.tcp.fract() == 0.0
        && ABB_SPEEDS.iter().any(|&v| f64::from(v) == speed.tcp);
    if named {
        format!("v{}", speed.tcp as u32)
    } else {
        format!("[{},{},5000,1000]", num(speed.tcp), num(speed.ori))
    }
}

/// `zonedata` literal: `fine`, a predefined name, or inline data.
pub fn abb_zone(zone: &Zone) -> String {
    if zone.is_fine() {
        return "fine".to_string();
    }
    let named = zone.ori.is_none()
        && zone.distance.fract() == 0.0
        && ABB_ZONES.iter().any(|&z| f64::from(z) == zone.distance);
    if named {
        return format!("z{}", zone.distance as u32);
    }
    let d = zone.distance;
    let ori = zone.ori.unwrap_or(d * 1.5);
    format!(
        "[FALSE,{},{},{},{},{},{}]",
        num(d),
        num(ori),
        num(ori),
        num(ori / 10.0),
        num(ori),
        num(ori / 10.0)
    )
}

fn abb_external_axes(values: &[f64]) -> String {
    let axes: Vec<String> = (0..6)
        .map(|i| values.get(i).map_or_else(|| ABB_NO_AXIS.to_string(), |v| num(*v)))
        .collect();
    format!("[{}]", axes.join(","))
}

fn abb_robtarget(frame: &Frame, external_axes: &[f64]) -> String {
    let p = frame.origin;
    let q = frame.quaternion();
    // quaternions keep 6 decimals; the controller rejects poorly normalized ones
    let quat: Vec<String> = q.iter().map(|c| format!("{:.6}", c + 0.0)).collect();
    format!(
        "[[{},{},{}],[{}],[0,0,0,0],{}]",
        num(p.x),
        num(p.y),
        num(p.z),
        quat.join(","),
        abb_external_axes(external_axes)
    )
}

fn joint_values(target: &Target) -> Result<&[f64], String> {
    match target.joints.as_deref() {
        Some(j) if j.len() == 6 => Ok(j),
        Some(j) => Err(format!("absolute joint target needs 6 joint values, got {}", j.len())),
        None => Err("absolute joint target has no joint values".to_string()),
    }
}

fn abb_move(t: &Target) -> Result<String, String> {
    let speed = abb_speed(&t.speed);
    let zone = abb_zone(&t.zone);
    let line = match t.motion {
        MotionType::Linear | MotionType::Joint => {
            let op = if t.motion == MotionType::Linear {
                "MoveL"
            } else {
                "MoveJ"
            };
            format!(
                "{} {}, {}, {}, {}\\WObj:={};",
                op,
                abb_robtarget(&t.frame, &t.external_axes),
                speed,
                zone,
                t.tool.name,
                t.wobj.name
            )
        }
        MotionType::AbsoluteJoint => {
            let joints: Vec<String> = joint_values(t)?.iter().map(|j| num(*j)).collect();
            format!(
                "MoveAbsJ [[{}],{}], {}, {}, {};",
                joints.join(","),
                abb_external_axes(&t.external_axes),
                speed,
                zone,
                t.tool.name
            )
        }
    };
    Ok(line)
}

fn kuka_external_axes(values: &[f64]) -> String {
    values
        .iter()
        .take(6)
        .enumerate()
        .map(|(i, v)| format!(", E{} {}", i + 1, num(*v)))
        .collect()
}

fn kuka_frame(frame: &Frame, external_axes: &[f64]) -> String {
    let p = frame.origin;
    let (a, b, c) = frame.euler_zyx();
    format!(
        "{{X {}, Y {}, Z {}, A {}, B {}, C {}{}}}",
        num(p.x),
        num(p.y),
        num(p.z),
        num(a),
        num(b),
        num(c),
        kuka_external_axes(external_axes)
    )
}

fn kuka_move(t: &Target) -> Result<String, String> {
    let line = match t.motion {
        MotionType::Linear => {
            let approx = if t.zone.is_fine() { "" } else { " C_DIS" };
            format!("LIN {}{}", kuka_frame(&t.frame, &t.external_axes), approx)
        }
        MotionType::Joint => {
            let approx = if t.zone.is_fine() { "" } else { " C_PTP" };
            format!("PTP {}{}", kuka_frame(&t.frame, &t.external_axes), approx)
        }
        MotionType::AbsoluteJoint => {
            let axes: Vec<String> = joint_values(t)?
                .iter()
                .enumerate()
                .map(|(i, j)| format!("A{} {}", i + 1, num(*j)))
                .collect();
            let approx = if t.zone.is_fine() { "" } else { " C_PTP" };
            format!(
                "PTP {{{}{}}}{}",
                axes.join(", "),
                kuka_external_axes(&t.external_axes),
                approx
            )
        }
    };
    Ok(line)
}
