//! 输出: 统计表, 每层图片和回顾视频.
//!
//! 所有输出句柄由 [`Sinks`] 持有. 单个文件写出失败只记录日志并计数,
//! 不中断整个流程; 只有创建输出目录/统计表 ([`Sinks::create`]) 和收尾
//! ([`Sinks::finish`]) 的失败是致命的.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error};

use crate::consts::names;
use crate::error::{RunError, SinkError};
use crate::process::{ProcessedSlice, Variant};
use crate::ImgWrite;

pub mod stats;
pub mod video;

pub use stats::StatsWriter;
pub use video::{MjpegAviWriter, VideoBackend, VideoSink};

#[cfg(feature = "opencv")]
pub use video::OpenCvVideoWriter;

/// 输出目录布局.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum OutputLayout {
    /// 只把叠加图写到输出目录下, 叠加图同时作为视频帧.
    #[default]
    Flat,

    /// 每种变体写到各自的子目录, 掩码区域叠加图作为视频帧.
    Separate,
}

const FLAT_VARIANTS: [Variant; 1] = [Variant::Overlay];

impl OutputLayout {
    /// 该布局写出的变体.
    pub fn variants(&self) -> &'static [Variant] {
        match self {
            OutputLayout::Flat => &FLAT_VARIANTS,
            OutputLayout::Separate => &Variant::ALL,
        }
    }

    /// 作为视频帧的变体.
    pub fn frame_variant(&self) -> Variant {
        match self {
            OutputLayout::Flat => Variant::Overlay,
            OutputLayout::Separate => Variant::MaskedOverlay,
        }
    }

    /// 变体 `variant` 的图片目录.
    pub fn dir_for(&self, root: &Path, variant: Variant) -> PathBuf {
        match self {
            OutputLayout::Flat => root.to_path_buf(),
            OutputLayout::Separate => root.join(variant.dir_name()),
        }
    }
}

/// 一次运行的全部输出句柄.
pub struct Sinks {
    root: PathBuf,
    layout: OutputLayout,
    stats: StatsWriter,
    video: Box<dyn VideoSink>,
}

fn setup_error(path: &Path) -> impl FnOnce(SinkError) -> RunError + '_ {
    move |source| RunError::Setup {
        path: path.to_path_buf(),
        source,
    }
}

impl Sinks {
    /// 创建输出目录 (含各变体子目录) 和统计表, 准备视频.
    pub fn create<P: AsRef<Path>>(
        root: P,
        layout: OutputLayout,
        backend: VideoBackend,
        frame_rate: u32,
    ) -> Result<Self, RunError> {
        let root = root.as_ref().to_path_buf();
        for &v in layout.variants() {
            let dir = layout.dir_for(&root, v);
            fs::create_dir_all(&dir)
                .map_err(SinkError::from)
                .map_err(setup_error(&dir))?;
        }

        let stats_path = root.join(names::STATS);
        let stats = StatsWriter::create(&stats_path).map_err(setup_error(&stats_path))?;
        let video = backend.open(root.join(names::VIDEO), frame_rate);

        Ok(Self {
            root,
            layout,
            stats,
            video,
        })
    }

    /// 输出目录.
    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 输出布局.
    #[inline]
    pub fn layout(&self) -> OutputLayout {
        self.layout
    }

    /// 已写入的视频帧数.
    #[inline]
    pub fn frames(&self) -> u32 {
        self.video.frames()
    }

    /// 写出一个切片的统计行, 图片和视频帧. 返回写出失败的个数.
    pub fn write(&mut self, slice: &ProcessedSlice) -> usize {
        let z = slice.z();
        let mut failed = 0;

        if let Err(e) = self.stats.append(slice.stats()) {
            error!("第 {z} 层统计行写入失败: {e}");
            failed += 1;
        }

        let frame_variant = self.layout.frame_variant();
        for &v in self.layout.variants() {
            let img = slice.render(v);
            let dir = self.layout.dir_for(&self.root, v);
            match img.save_slice(&dir, z) {
                Ok(path) => debug!("写入 `{}`", path.display()),
                Err(e) => {
                    error!("第 {z} 层 {v:?} 图片写入 `{}` 失败: {e}", dir.display());
                    failed += 1;
                }
            }

            if v != frame_variant {
                continue;
            }
            let pushed = match img.as_rgb8() {
                Some(frame) => self.video.push(frame),
                None => self.video.push(&img.to_rgb8()),
            };
            if let Err(e) = pushed {
                error!("第 {z} 层视频帧写入失败: {e}");
                failed += 1;
            }
        }
        failed
    }

    /// 刷新统计表并封装视频, 返回视频帧数.
    pub fn finish(&mut self) -> Result<u32, RunError> {
        let rows = self.stats.finish().map_err(RunError::Finish)?;
        let frames = self.video.finish().map_err(RunError::Finish)?;
        debug!("统计表 {rows} 行, 视频 {frames} 帧");
        Ok(frames)
    }
}
