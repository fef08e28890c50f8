//! Fixed-width Ragone tables for plotting tools.

use crate::ragone::RagonePoint;
use cap_core::format_scientific;
use std::io::{self, Write};

/// One table row: power, energy, discharge time and step count.
pub fn format_ragone_line(point: &RagonePoint) -> String {
    format!(
        "  {}  {}  {}  {:>10} \n",
        format_scientific(point.power_w, 10, 7),
        format_scientific(point.energy_j, 10, 7),
        format_scientific(point.time_s, 10, 7),
        point.steps
    )
}

pub fn write_ragone_line<W: Write>(out: &mut W, point: &RagonePoint) -> io::Result<()> {
    out.write_all(format_ragone_line(point).as_bytes())
}

pub fn write_ragone_table<W: Write>(out: &mut W, points: &[RagonePoint]) -> io::Result<()> {
    for point in points {
        write_ragone_line(out, point)?;
    }
    out.flush()
}
