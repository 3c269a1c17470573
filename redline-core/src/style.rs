//! The single status/risk style table.
//!
//! The overlay painter, the sidebar list, and the summary header all read
//! colours and labels from here so they cannot drift apart.

use crate::types::{Compliance, DiffStatus, RiskLevel};

/// 24-bit colour, independent of any rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Linear blend: `alpha = 0` keeps `self`, `alpha = 1` yields `over`.
    pub fn blend(self, over: Rgb, alpha: f64) -> Rgb {
        let a = alpha.clamp(0.0, 1.0);
        let mix = |base: u8, top: u8| -> u8 {
            (f64::from(base) * (1.0 - a) + f64::from(top) * a).round() as u8
        };
        Rgb(mix(self.0, over.0), mix(self.1, over.1), mix(self.2, over.2))
    }
}

/// Paint parameters for one diff status.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusStyle {
    pub fill: Rgb,
    pub stroke: Rgb,
    pub fill_opacity: f64,
    pub stroke_width: f64,
    /// Short label shown in tabs, badges and the summary.
    pub label: &'static str,
}

impl StatusStyle {
    /// Hover emphasis: 1.5x opacity (capped at 1) and doubled stroke.
    pub fn hovered(self) -> Self {
        Self {
            fill_opacity: (self.fill_opacity * 1.5).min(1.0),
            stroke_width: self.stroke_width * 2.0,
            ..self
        }
    }
}

const GREEN: Rgb = Rgb(0x52, 0xc4, 0x1a);
const RED: Rgb = Rgb(0xff, 0x4d, 0x4f);
const ORANGE: Rgb = Rgb(0xfa, 0xad, 0x14);
const BLUE: Rgb = Rgb(0x18, 0x90, 0xff);

/// Style for `status`.
pub fn status_style(status: DiffStatus) -> StatusStyle {
    let (colour, label) = match status {
        DiffStatus::Add => (GREEN, "新增"),
        DiffStatus::Delete => (RED, "删除"),
        DiffStatus::Modify => (ORANGE, "修改"),
        DiffStatus::Move => (BLUE, "移动"),
    };
    StatusStyle { fill: colour, stroke: colour, fill_opacity: 0.3, stroke_width: 1.0, label }
}

/// Colour used for removed text in MODIFY before/after substitution.
pub const REMOVED_TEXT: Rgb = RED;
/// Colour used for inserted text in MODIFY before/after substitution.
pub const INSERTED_TEXT: Rgb = GREEN;

pub fn risk_colour(risk: RiskLevel) -> Rgb {
    match risk {
        RiskLevel::High => RED,
        RiskLevel::Medium => ORANGE,
        RiskLevel::Low => GREEN,
    }
}

/// Icon glyph and colour for a compliance verdict.
pub fn compliance_icon(compliance: Compliance) -> (&'static str, Rgb) {
    match compliance {
        Compliance::Pass => ("✔", GREEN),
        Compliance::Fail => ("✘", RED),
        Compliance::Warning => ("!", ORANGE),
    }
}
