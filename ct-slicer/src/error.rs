//! 运行时错误.

use std::io;
use std::path::PathBuf;

use crate::Idx3d;

/// 加载扫描/掩码时的错误. 均为致命错误.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// 文件无法打开, 或不是受支持的 nifti 文件.
    #[error("cannot read nifti file `{}`", path.display())]
    Nifti {
        /// 出错的文件.
        path: PathBuf,

        /// 底层解码错误.
        #[source]
        source: nifti::NiftiError,
    },

    /// 数据维数不是 3.
    #[error("`{}` is not a 3D volume ({ndim} dimensions)", path.display())]
    NotVolumetric {
        /// 出错的文件.
        path: PathBuf,

        /// 实际维数.
        ndim: usize,
    },

    /// 扫描与掩码形状不一致. 形状按 (W, H, D) 给出.
    #[error("volume is {volume:?} (W, H, D) but mask is {mask:?}")]
    DimensionMismatch {
        /// 扫描形状.
        volume: Idx3d,

        /// 掩码形状.
        mask: Idx3d,
    },
}

/// 写出单个输出 (图片, 统计行, 视频帧) 时的错误.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// 底层 I/O 错误.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// 图片编码错误.
    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// CSV 写入错误.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// 视频帧大小与首帧不一致.
    #[error("frame is {got:?} but the video was opened with {expected:?} (W, H)")]
    FrameSize {
        /// 首帧大小.
        expected: (u32, u32),

        /// 当前帧大小.
        got: (u32, u32),
    },

    /// OpenCV 错误.
    #[cfg(feature = "opencv")]
    #[error(transparent)]
    OpenCv(#[from] opencv::Error),
}

/// 整个转换流程的错误.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// 加载失败.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// 创建输出目录或统计表失败.
    #[error("cannot prepare output `{}`", path.display())]
    Setup {
        /// 出错的路径.
        path: PathBuf,

        /// 底层错误.
        #[source]
        source: SinkError,
    },

    /// 收尾 (刷新统计表, 封装视频) 失败.
    #[error("cannot finalize outputs")]
    Finish(#[source] SinkError),
}
