//! Kinds command listing the events that can be recorded.

use std::io::Write;

use anyhow::Result;
use ml_core::EventKind;

pub fn run<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer, "{:<26}{:<24}SCORES", "KIND", "LABEL")?;
    for kind in EventKind::ALL {
        let scores = if kind.counts_toward_score() { "yes" } else { "" };
        let line = format!("{:<26}{:<24}{scores}", kind.tag(), kind.label());
        writeln!(writer, "{}", line.trim_end())?;
    }
    Ok(())
}
