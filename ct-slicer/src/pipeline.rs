//! 逐层转换流程.
//!
//! 单线程顺序执行: 对每个 z, 提取并归一化两张切片, 处理, 然后写出.
//! 空切片只跳过该层.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::consts::names;
use crate::error::RunError;
use crate::process::{process_slice, ProcessParams};
use crate::sink::{OutputLayout, Sinks, VideoBackend};
use crate::CtPair;

/// 一次运行的配置.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RunConfig {
    /// 输出目录布局.
    pub layout: OutputLayout,

    /// 视频帧率.
    pub frame_rate: u32,

    /// 切片处理参数.
    pub params: ProcessParams,

    /// 视频后端.
    pub backend: VideoBackend,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            layout: OutputLayout::default(),
            frame_rate: names::FRAME_RATE,
            params: ProcessParams::default(),
            backend: VideoBackend::default(),
        }
    }
}

impl RunConfig {
    /// 使用给定布局, 其余取默认值.
    pub fn with_layout(layout: OutputLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }
}

/// 运行结果汇总.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// 切片总数.
    pub total: usize,

    /// 成功处理 (写出了统计行) 的切片数.
    pub processed: usize,

    /// 因提取结果为空而跳过的切片数.
    pub skipped: usize,

    /// 至少有一个输出写出失败的切片数.
    pub failed_writes: usize,

    /// 视频帧数.
    pub frames: u32,

    /// 输出目录.
    pub output: PathBuf,
}

/// 将 `pair` 的每一层转换到 `out` 下.
///
/// 只有创建输出和收尾的失败会返回错误; 单层的写出失败只记录日志并计数.
pub fn run<P: AsRef<Path>>(
    pair: &CtPair,
    out: P,
    config: &RunConfig,
) -> Result<RunSummary, RunError> {
    let out = out.as_ref();
    let mut sinks = Sinks::create(out, config.layout, config.backend, config.frame_rate)?;
    info!(
        "转换 {} 层切片到 `{}` ({:?})",
        pair.len_z(),
        out.display(),
        config.layout
    );

    let mut summary = RunSummary {
        total: pair.len_z(),
        processed: 0,
        skipped: 0,
        failed_writes: 0,
        frames: 0,
        output: out.to_path_buf(),
    };

    for (z, (vol, mask)) in pair.slice_iter().enumerate() {
        let (Some(vol), Some(mask)) = (vol.normalize(), mask.normalize()) else {
            warn!("第 {z} 层切片无效或为空, 跳过");
            summary.skipped += 1;
            continue;
        };

        let slice = process_slice(z, &vol, &mask, &config.params);
        if sinks.write(&slice) > 0 {
            summary.failed_writes += 1;
        }
        summary.processed += 1;
    }

    summary.frames = sinks.finish()?;
    Ok(summary)
}

/// 打开 `volume_path` 和 `mask_path`, 并转换到 `out` 下.
pub fn run_files(
    volume_path: impl AsRef<Path>,
    mask_path: impl AsRef<Path>,
    out: impl AsRef<Path>,
    config: &RunConfig,
) -> Result<RunSummary, RunError> {
    let pair = CtPair::open(volume_path, mask_path)?;
    run(&pair, out, config)
}
