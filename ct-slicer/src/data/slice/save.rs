//! 图像的持久化存储.

use crate::consts::names;
use image::{DynamicImage, GrayImage, ImageResult, RgbImage};
use std::path::{Path, PathBuf};

/// 表明一个可以按切片编号持久化存储的图像对象.
///
/// 文件名由 [`names::slice_png`] 决定, 格式由扩展名 (PNG) 决定.
pub trait ImgWrite {
    /// 将图片保存到 `dir/slice_{z:03}.png`, 返回实际写入的路径.
    fn save_slice<P: AsRef<Path>>(&self, dir: P, z: usize) -> ImageResult<PathBuf>;
}

macro_rules! impl_img_write {
    ($($img: ty),+) => {
        $(
            impl ImgWrite for $img {
                fn save_slice<P: AsRef<Path>>(&self, dir: P, z: usize) -> ImageResult<PathBuf> {
                    let path = dir.as_ref().join(names::slice_png(z));
                    self.save(&path)?;
                    Ok(path)
                }
            }
        )+
    };
}

impl_img_write!(GrayImage, RgbImage, DynamicImage);
