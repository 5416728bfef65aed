//! Motion-JPEG AVI (RIFF) 写出器.
//!
//! 文件布局:
//!
//! ```text
//! RIFF 'AVI '
//!   LIST 'hdrl'
//!     avih
//!     LIST 'strl'
//!       strh  (vids / MJPG)
//!       strf  (BITMAPINFOHEADER)
//!   LIST 'movi'
//!     '00dc' <jpeg> ...
//!   idx1
//! ```
//!
//! 头部定长 224 字节, 创建时以占位值写入, 封装时回写帧数和各段长度.

use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, RgbImage};
use log::{debug, warn};

use super::VideoSink;
use crate::error::SinkError;

/// 头部长度, 即第一个数据块的文件偏移.
const HEADER_LEN: usize = 224;

/// `LIST 'hdrl'` 的长度字段.
const HDRL_LEN: u32 = 192;

/// `LIST 'strl'` 的长度字段.
const STRL_LEN: u32 = 116;

const AVIF_HASINDEX: u32 = 0x10;
const AVIIF_KEYFRAME: u32 = 0x10;

/// 默认 JPEG 质量.
const JPEG_QUALITY: u8 = 90;

/// 封装时回写到头部的可变字段.
struct Layout {
    size: (u32, u32),
    fps: u32,
    frames: u32,
    movi_len: u32,
    max_chunk: u32,
}

impl Layout {
    fn header(&self) -> io::Result<Vec<u8>> {
        type Le = LittleEndian;

        let (width, height) = self.size;
        let idx1_len = to_u32(16 * self.frames as usize)?;
        // 除 'RIFF' 和长度字段以外的全部字节.
        let riff_len = (HEADER_LEN as u32 - 8)
            .checked_add(self.movi_len)
            .and_then(|n| n.checked_add(8 + idx1_len))
            .ok_or_else(too_large)?;

        let mut h = Vec::with_capacity(HEADER_LEN);
        h.write_all(b"RIFF")?;
        h.write_u32::<Le>(riff_len)?;
        h.write_all(b"AVI ")?;

        h.write_all(b"LIST")?;
        h.write_u32::<Le>(HDRL_LEN)?;
        h.write_all(b"hdrl")?;

        h.write_all(b"avih")?;
        h.write_u32::<Le>(56)?;
        h.write_u32::<Le>(1_000_000 / self.fps)?;
        h.write_u32::<Le>(self.max_chunk.saturating_mul(self.fps))?;
        h.write_u32::<Le>(0)?;
        h.write_u32::<Le>(AVIF_HASINDEX)?;
        h.write_u32::<Le>(self.frames)?;
        h.write_u32::<Le>(0)?;
        h.write_u32::<Le>(1)?;
        h.write_u32::<Le>(self.max_chunk)?;
        h.write_u32::<Le>(width)?;
        h.write_u32::<Le>(height)?;
        for _ in 0..4 {
            h.write_u32::<Le>(0)?;
        }

        h.write_all(b"LIST")?;
        h.write_u32::<Le>(STRL_LEN)?;
        h.write_all(b"strl")?;

        h.write_all(b"strh")?;
        h.write_u32::<Le>(56)?;
        h.write_all(b"vids")?;
        h.write_all(b"MJPG")?;
        h.write_u32::<Le>(0)?;
        h.write_u16::<Le>(0)?;
        h.write_u16::<Le>(0)?;
        h.write_u32::<Le>(0)?;
        h.write_u32::<Le>(1)?;
        h.write_u32::<Le>(self.fps)?;
        h.write_u32::<Le>(0)?;
        h.write_u32::<Le>(self.frames)?;
        h.write_u32::<Le>(self.max_chunk)?;
        h.write_u32::<Le>(u32::MAX)?;
        h.write_u32::<Le>(0)?;
        h.write_u16::<Le>(0)?;
        h.write_u16::<Le>(0)?;
        h.write_u16::<Le>(width.min(u16::MAX as u32) as u16)?;
        h.write_u16::<Le>(height.min(u16::MAX as u32) as u16)?;

        h.write_all(b"strf")?;
        h.write_u32::<Le>(40)?;
        h.write_u32::<Le>(40)?;
        h.write_u32::<Le>(width)?;
        h.write_u32::<Le>(height)?;
        h.write_u16::<Le>(1)?;
        h.write_u16::<Le>(24)?;
        h.write_all(b"MJPG")?;
        h.write_u32::<Le>(width.saturating_mul(height).saturating_mul(3))?;
        for _ in 0..4 {
            h.write_u32::<Le>(0)?;
        }

        h.write_all(b"LIST")?;
        h.write_u32::<Le>(4u32.checked_add(self.movi_len).ok_or_else(too_large)?)?;
        h.write_all(b"movi")?;

        debug_assert_eq!(h.len(), HEADER_LEN);
        Ok(h)
    }
}

/// 已创建文件的写出状态.
struct OpenAvi {
    file: BufWriter<File>,
    size: (u32, u32),

    /// 每帧的 (相对 'movi' 标记的偏移, 数据长度).
    index: Vec<(u32, u32)>,

    /// 'movi' 标记之后的字节数.
    movi_len: u32,
    max_chunk: u32,
}

impl OpenAvi {
    fn create(path: &Path, size: (u32, u32), fps: u32) -> io::Result<Self> {
        let mut file = BufWriter::new(File::create(path)?);
        let placeholder = Layout {
            size,
            fps,
            frames: 0,
            movi_len: 0,
            max_chunk: 0,
        };
        file.write_all(&placeholder.header()?)?;
        Ok(Self {
            file,
            size,
            index: Vec::new(),
            movi_len: 0,
            max_chunk: 0,
        })
    }

    fn write_chunk(&mut self, jpeg: &[u8]) -> io::Result<()> {
        let len = to_u32(jpeg.len())?;
        let padded = len.checked_add(8 + (len & 1)).ok_or_else(too_large)?;
        let movi_len = self.movi_len.checked_add(padded).ok_or_else(too_large)?;

        self.file.write_all(b"00dc")?;
        self.file.write_u32::<LittleEndian>(len)?;
        self.file.write_all(jpeg)?;
        if len & 1 == 1 {
            self.file.write_u8(0)?;
        }

        self.index.push((4 + self.movi_len, len));
        self.movi_len = movi_len;
        self.max_chunk = self.max_chunk.max(len);
        Ok(())
    }

    fn finalize(mut self, fps: u32) -> io::Result<u32> {
        let frames = to_u32(self.index.len())?;

        self.file.write_all(b"idx1")?;
        self.file.write_u32::<LittleEndian>(to_u32(16 * self.index.len())?)?;
        for &(offset, len) in &self.index {
            self.file.write_all(b"00dc")?;
            self.file.write_u32::<LittleEndian>(AVIIF_KEYFRAME)?;
            self.file.write_u32::<LittleEndian>(offset)?;
            self.file.write_u32::<LittleEndian>(len)?;
        }

        let layout = Layout {
            size: self.size,
            fps,
            frames,
            movi_len: self.movi_len,
            max_chunk: self.max_chunk,
        };
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&layout.header()?)?;
        self.file.flush()?;
        Ok(frames)
    }
}

/// 纯 Rust 的 Motion-JPEG AVI 写出器. 每帧由 `image` 编码为 JPEG.
///
/// 未调用 [`VideoSink::finish`] 就被丢弃时, 在 `Drop` 中封装.
pub struct MjpegAviWriter {
    path: PathBuf,
    fps: u32,
    open: Option<OpenAvi>,
    frames: u32,
}

impl MjpegAviWriter {
    /// 在 `path` 处准备视频. 文件在第一帧到来时才创建.
    pub fn new(path: PathBuf, fps: u32) -> Self {
        Self {
            path,
            fps: fps.max(1),
            open: None,
            frames: 0,
        }
    }
}

impl VideoSink for MjpegAviWriter {
    fn push(&mut self, frame: &RgbImage) -> Result<(), SinkError> {
        let got = frame.dimensions();
        let open = match self.open.take() {
            Some(open) => open,
            None => OpenAvi::create(&self.path, got, self.fps)?,
        };
        let open = self.open.insert(open);
        if open.size != got {
            return Err(SinkError::FrameSize {
                expected: open.size,
                got,
            });
        }

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).encode(
            frame.as_raw(),
            got.0,
            got.1,
            ColorType::Rgb8,
        )?;
        open.write_chunk(&jpeg)?;
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<u32, SinkError> {
        if let Some(open) = self.open.take() {
            let frames = open.finalize(self.fps)?;
            debug!("视频 `{}` 共 {frames} 帧", self.path.display());
        }
        Ok(self.frames)
    }

    #[inline]
    fn frames(&self) -> u32 {
        self.frames
    }
}

impl Drop for MjpegAviWriter {
    fn drop(&mut self) {
        if let Some(open) = self.open.take() {
            if let Err(e) = open.finalize(self.fps) {
                warn!("视频 `{}` 封装失败: {e}", self.path.display());
            }
        }
    }
}

fn to_u32(n: usize) -> io::Result<u32> {
    u32::try_from(n).map_err(|_| too_large())
}

fn too_large() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "AVI 1.0 file exceeds 4 GiB")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb};
    use std::fs;

    fn u32_at(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    #[test]
    fn test_two_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.avi");

        let mut w = MjpegAviWriter::new(path.clone(), 5);
        w.push(&RgbImage::from_pixel(6, 4, Rgb([255, 0, 0]))).unwrap();
        w.push(&RgbImage::from_pixel(6, 4, Rgb([0, 0, 255]))).unwrap();
        assert_eq!(w.finish().unwrap(), 2);
        assert_eq!(w.finish().unwrap(), 2);

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32_at(&bytes, 4) as usize, bytes.len() - 8);
        assert_eq!(&bytes[8..12], b"AVI ");
        assert_eq!(u32_at(&bytes, 32), 200_000);
        assert_eq!(u32_at(&bytes, 48), 2);
        assert_eq!((u32_at(&bytes, 64), u32_at(&bytes, 68)), (6, 4));
        assert_eq!(u32_at(&bytes, 132), 5);
        assert_eq!(u32_at(&bytes, 140), 2);
        assert_eq!(&bytes[220..224], b"movi");
        assert_eq!(u32_at(&bytes, 216) as usize + 220, bytes.len() - 8 - 32);

        assert_eq!(&bytes[224..228], b"00dc");
        let len = u32_at(&bytes, 228) as usize;
        let first = image::load_from_memory(&bytes[232..232 + len]).unwrap();
        assert_eq!(first.dimensions(), (6, 4));

        let idx1 = bytes.len() - 8 - 32;
        assert_eq!(&bytes[idx1..idx1 + 4], b"idx1");
        assert_eq!(u32_at(&bytes, idx1 + 4), 32);
        assert_eq!(u32_at(&bytes, idx1 + 8 + 4), AVIIF_KEYFRAME);
        assert_eq!(u32_at(&bytes, idx1 + 8 + 8), 4);
        assert_eq!(u32_at(&bytes, idx1 + 8 + 12) as usize, len);
    }

    #[test]
    fn test_frame_size_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = MjpegAviWriter::new(dir.path().join("v.avi"), 5);
        w.push(&RgbImage::new(4, 4)).unwrap();
        let err = w.push(&RgbImage::new(5, 4)).unwrap_err();
        assert!(matches!(
            err,
            SinkError::FrameSize {
                expected: (4, 4),
                got: (5, 4)
            }
        ));
        assert_eq!(w.frames(), 1);
        assert_eq!(w.finish().unwrap(), 1);
    }

    #[test]
    fn test_no_frames_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.avi");
        let mut w = MjpegAviWriter::new(path.clone(), 5);
        assert_eq!(w.finish().unwrap(), 0);
        drop(w);
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_finalizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.avi");
        {
            let mut w = MjpegAviWriter::new(path.clone(), 5);
            w.push(&RgbImage::new(3, 3)).unwrap();
        }
        let bytes = fs::read(&path).unwrap();
        assert_eq!(u32_at(&bytes, 48), 1);
        assert_eq!(u32_at(&bytes, 4) as usize, bytes.len() - 8);
    }
}
