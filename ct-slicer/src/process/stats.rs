//! 掩码区域内的切片统计.

use crate::consts::gray::is_foreground;
use image::GrayImage;
use serde::{Serialize, Serializer};

/// 单个切片的统计记录. 字段顺序即统计表的列顺序.
///
/// 掩码为空 (`area == 0`) 时, `mean`, `min`, `max` 均取 0.
///
/// 浮点字段按 `Display` 序列化, 整数值不带小数部分 (`85` 而不是 `85.0`).
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct SliceStats {
    /// 切片编号 z.
    pub slice: usize,

    /// 前景像素个数.
    pub area: u64,

    /// 前景区域内扫描灰度的平均值.
    #[serde(serialize_with = "shortest")]
    pub mean: f64,

    /// 前景区域内扫描灰度的最小值.
    #[serde(serialize_with = "shortest")]
    pub min: f64,

    /// 前景区域内扫描灰度的最大值.
    #[serde(serialize_with = "shortest")]
    pub max: f64,
}

impl SliceStats {
    /// 以 `mask` 的非零像素为选择子, 统计 `image` 的面积/均值/极值.
    ///
    /// 两图大小必须一致, 否则程序 panic.
    pub fn masked(slice: usize, image: &GrayImage, mask: &GrayImage) -> Self {
        assert_eq!(image.dimensions(), mask.dimensions());

        let mut area = 0u64;
        let mut sum = 0u64;
        let (mut min, mut max) = (u8::MAX, u8::MIN);
        for (v, m) in image.pixels().zip(mask.pixels()) {
            if !is_foreground(m.0[0]) {
                continue;
            }
            let v = v.0[0];
            area += 1;
            sum += v as u64;
            min = min.min(v);
            max = max.max(v);
        }

        if area == 0 {
            return Self::empty(slice);
        }
        Self {
            slice,
            area,
            mean: sum as f64 / area as f64,
            min: min as f64,
            max: max as f64,
        }
    }

    /// 空掩码对应的记录.
    #[inline]
    pub fn empty(slice: usize) -> Self {
        Self {
            slice,
            area: 0,
            mean: 0.0,
            min: 0.0,
            max: 0.0,
        }
    }

    /// 掩码是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.area == 0
    }
}

fn shortest<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(v)
}
