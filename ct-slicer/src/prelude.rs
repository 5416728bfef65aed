//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::data::{CtPair, CtVolume, ImgWrite, NiftiHeaderAttr, Rescaler, ScanSlice};

pub use crate::error::{LoadError, RunError, SinkError};

pub use crate::process::{process_slice, ProcessParams, ProcessedSlice, SliceStats, Variant};

pub use crate::sink::{OutputLayout, Sinks, StatsWriter, VideoBackend, VideoSink};

pub use crate::pipeline::{run, run_files, RunConfig, RunSummary};
