//! OpenCV 视频后端.
//!
//! # 注意
//!
//! 需要 `opencv` feature.

use std::path::PathBuf;

use image::RgbImage;
use log::debug;
use opencv::core::{Scalar, Size, Vec3b, CV_8UC3};
use opencv::prelude::{Mat, MatTrait, MatTraitConst, VideoWriterTrait, VideoWriterTraitConst};
use opencv::videoio::VideoWriter;

use super::VideoSink;
use crate::error::SinkError;

/// `opencv::videoio::VideoWriter` 的包装, fourcc 为 `MJPG`.
pub struct OpenCvVideoWriter {
    path: PathBuf,
    fps: u32,
    open: Option<(VideoWriter, (u32, u32))>,
    frames: u32,
}

impl OpenCvVideoWriter {
    /// 在 `path` 处准备视频. 文件在第一帧到来时才创建.
    pub fn new(path: PathBuf, fps: u32) -> Self {
        Self {
            path,
            fps: fps.max(1),
            open: None,
            frames: 0,
        }
    }

    fn create(&self, (w, h): (u32, u32)) -> Result<VideoWriter, SinkError> {
        let fourcc = VideoWriter::fourcc('M', 'J', 'P', 'G')?;
        let writer = VideoWriter::new(
            &self.path.to_string_lossy(),
            fourcc,
            self.fps as f64,
            Size::new(w as i32, h as i32),
            true,
        )?;
        if !writer.is_opened()? {
            return Err(SinkError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("OpenCV cannot open `{}`", self.path.display()),
            )));
        }
        Ok(writer)
    }
}

/// RGB 图像转 OpenCV 的 BGR 矩阵.
fn rgb_to_bgr_mat(frame: &RgbImage) -> opencv::Result<Mat> {
    let (w, h) = frame.dimensions();
    let mut mat =
        Mat::new_size_with_default(Size::new(w as i32, h as i32), CV_8UC3, Scalar::from(0))?;
    for (x, y, p) in frame.enumerate_pixels() {
        let [r, g, b] = p.0;
        *mat.at_2d_mut::<Vec3b>(y as i32, x as i32)? = Vec3b::from([b, g, r]);
    }
    Ok(mat)
}

impl VideoSink for OpenCvVideoWriter {
    fn push(&mut self, frame: &RgbImage) -> Result<(), SinkError> {
        let got = frame.dimensions();
        let (writer, size) = match self.open.take() {
            Some(open) => open,
            None => (self.create(got)?, got),
        };
        let (writer, size) = self.open.insert((writer, size));
        if *size != got {
            return Err(SinkError::FrameSize {
                expected: *size,
                got,
            });
        }

        writer.write(&rgb_to_bgr_mat(frame)?)?;
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<u32, SinkError> {
        if let Some((mut writer, _)) = self.open.take() {
            writer.release()?;
            debug!("视频 `{}` 共 {} 帧", self.path.display(), self.frames);
        }
        Ok(self.frames)
    }

    #[inline]
    fn frames(&self) -> u32 {
        self.frames
    }
}
