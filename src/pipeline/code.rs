//! Code block reconstruction: turns left offsets into indent levels.
//!
//! Extractors report positions, not spaces, so leading whitespace inside a
//! code region arrives as a horizontal offset. The block's left margin is
//! the minimum x0 of its lines; each line's offset from that margin is
//! divided by the calibrated width of one space and rounded to the nearest
//! whole level. Output carries indent levels, never raw spacing.

use crate::config::Settings;
use crate::model::CodeLine;

use super::lines::Line;

/// Reconstruct indent levels for the lines of one code block.
pub(crate) fn reconstruct_indents(lines: &[Line], settings: &Settings) -> Vec<CodeLine> {
    let base = lines
        .iter()
        .map(|l| l.x0())
        .fold(f32::INFINITY, f32::min);
    if !base.is_finite() {
        return vec![];
    }

    lines
        .iter()
        .map(|line| {
            let delta = (line.x0() - base).max(0.0);
            let indent = (delta / settings.indent_calibration_units_per_space).round() as u32;
            CodeLine::new(indent, line.text())
        })
        .collect()
}
