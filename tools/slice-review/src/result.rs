//! 运行结果.

use ct_slicer::pipeline::RunSummary;
use std::io::{self, Write};

/// 将 `s` 的结果写进 `w` 中.
fn describe_into<W: Write>(s: &RunSummary, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    writeln!(w, "Done. Outputs saved in `{}`:", s.output.display())?;
    writeln!(w, "{S4}Slices in volume: {}", s.total)?;
    writeln!(w, "{S4}Processed: {}", s.processed)?;
    writeln!(w, "{S4}Skipped (invalid or empty): {}", s.skipped)?;
    writeln!(w, "{S4}With failed writes: {}", s.failed_writes)?;
    write!(w, "{S4}Video frames: {}", s.frames)?;
    Ok(())
}

/// 一次转换的最终结果.
pub struct ReviewResult {
    summary: RunSummary,
}

impl ReviewResult {
    pub fn new(summary: RunSummary) -> Self {
        Self { summary }
    }

    /// 打印运行结果.
    pub fn analyze(&self) {
        utils::sep();
        let mut out = io::stdout().lock();
        if let Err(e) = describe_into(&self.summary, &mut out).and_then(|_| writeln!(out)) {
            log::warn!("cannot print summary: {e}");
        }
        drop(out);
        utils::sep();
    }
}
