//! 回顾视频写出.
//!
//! 视频在收到第一帧时才创建, 帧大小由第一帧决定; 之后大小不同的帧被拒绝.
//! 从未收到帧时不创建任何文件.

use std::path::Path;

use image::RgbImage;

use crate::error::SinkError;

mod avi;

pub use avi::MjpegAviWriter;

cfg_if::cfg_if! {
    if #[cfg(feature = "opencv")] {
        mod cv;

        pub use cv::OpenCvVideoWriter;
    }
}

/// 逐帧追加的视频输出.
pub trait VideoSink {
    /// 追加一帧. 第一帧决定视频大小.
    fn push(&mut self, frame: &RgbImage) -> Result<(), SinkError>;

    /// 封装视频, 返回总帧数. 重复调用时直接返回帧数.
    fn finish(&mut self) -> Result<u32, SinkError>;

    /// 已追加的帧数.
    fn frames(&self) -> u32;
}

/// 视频后端.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum VideoBackend {
    /// 纯 Rust 的 Motion-JPEG AVI 写出器.
    Mjpeg,

    /// OpenCV `VideoWriter`, fourcc 为 `MJPG`.
    #[cfg(feature = "opencv")]
    OpenCv,
}

impl Default for VideoBackend {
    /// 打开 `opencv` feature 时使用 OpenCV, 否则使用纯 Rust 写出器.
    fn default() -> Self {
        #[cfg(feature = "opencv")]
        return VideoBackend::OpenCv;

        #[cfg(not(feature = "opencv"))]
        return VideoBackend::Mjpeg;
    }
}

impl VideoBackend {
    /// 在 `path` 处准备一个帧率为 `fps` 的视频. 文件在第一帧到来时才创建.
    pub fn open<P: AsRef<Path>>(self, path: P, fps: u32) -> Box<dyn VideoSink> {
        let path = path.as_ref().to_path_buf();
        match self {
            VideoBackend::Mjpeg => Box::new(MjpegAviWriter::new(path, fps)),
            #[cfg(feature = "opencv")]
            VideoBackend::OpenCv => Box::new(OpenCvVideoWriter::new(path, fps)),
        }
    }
}
