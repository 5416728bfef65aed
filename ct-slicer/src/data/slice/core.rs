use std::ops::Index;

use image::{GrayImage, Luma};
use ndarray::iter::Iter;
use ndarray::{ArrayView2, Ix2};

use crate::{Idx2d, Rescaler};

/// 不可变、借用的二维水平切片.
pub struct ScanSlice<'a> {
    /// 底层数据的轻量级视图, 借用于 [`crate::CtVolume`].
    data: ArrayView2<'a, f32>,
}

impl Index<Idx2d> for ScanSlice<'_> {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl<'a> ScanSlice<'a> {
    /// 直接初始化.
    #[inline]
    pub(crate) fn new(data: ArrayView2<'a, f32>) -> Self {
        Self { data }
    }

    /// 获取可以迭代图像像素的迭代器.
    #[inline]
    pub fn iter(&self) -> Iter<'_, f32, Ix2> {
        self.data.iter()
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 图像的像素个数.
    #[inline]
    pub fn size(&self) -> usize {
        let (h, w) = self.shape();
        h * w
    }

    /// 切片是否不含任何像素.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// 以切片自身的有限值范围构建的重映射. 无有限值时为 [`Rescaler::FLAT`].
    pub fn rescaler(&self) -> Rescaler {
        Rescaler::fit(self.iter().copied()).unwrap_or(Rescaler::FLAT)
    }

    /// 将切片线性拉伸到 `[0, 255]` 并量化为 8-bit 灰度图.
    ///
    /// 常值切片映射为全黑. 如果切片为空, 则返回 `None`, 调用方应跳过该层.
    pub fn normalize(&self) -> Option<GrayImage> {
        if self.is_empty() {
            return None;
        }
        let r = self.rescaler();
        let (height, width) = self.shape();
        Some(GrayImage::from_fn(width as u32, height as u32, |w, h| {
            Luma([r.eval(self[(h as usize, w as usize)])])
        }))
    }
}
