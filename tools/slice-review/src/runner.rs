//! 程序运行函数.

use crate::result::ReviewResult;
use crate::Args;
use ct_slicer::error::RunError;
use ct_slicer::pipeline::{self, RunConfig};
use ct_slicer::sink::OutputLayout;
use ct_slicer::CtPair;

/// 实际运行.
pub fn run(args: &Args) -> Result<ReviewResult, RunError> {
    let pair = CtPair::open(&args.volume, &args.mask)?;

    let layout = if args.separate {
        OutputLayout::Separate
    } else {
        OutputLayout::Flat
    };
    log::debug!("layout: {layout:?}");

    println!("Processing {} slices...", pair.len_z());
    let summary = pipeline::run(&pair, &args.output, &RunConfig::with_layout(layout))?;
    Ok(ReviewResult::new(summary))
}
