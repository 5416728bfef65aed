//! 切片的可视化变体.
//!
//! 所有逐像素操作都以 `imageproc::map` 的整体映射表达, 不手写双重循环.

use crate::consts::gray::{is_foreground, BLACK, WHITE};
use crate::consts::rgb::HIGHLIGHT;
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::contrast::{stretch_contrast, threshold as binary_threshold};
use imageproc::map::{map_colors, map_colors2};

/// 可视化变体类型. 每种变体在分目录布局下写入各自的子目录.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Variant {
    /// 灰度扫描 + 掩码高亮.
    Overlay,

    /// 只保留掩码支撑区域的扫描 + 掩码高亮.
    MaskedOverlay,

    /// 全局二值化.
    Threshold,

    /// 最小-最大对比度拉伸.
    Stretch,

    /// 灰度落在给定闭区间内的像素.
    InRange,

    /// 扫描与掩码按位或.
    Or,

    /// 扫描与掩码按位异或.
    Xor,

    /// 掩码按位取反.
    Not,

    /// Canny 边缘.
    Canny,
}

impl Variant {
    /// 全部变体, 按输出顺序排列.
    pub const ALL: [Variant; 9] = [
        Variant::Overlay,
        Variant::MaskedOverlay,
        Variant::Threshold,
        Variant::Stretch,
        Variant::InRange,
        Variant::Or,
        Variant::Xor,
        Variant::Not,
        Variant::Canny,
    ];

    /// 分目录布局下的子目录名.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Variant::Overlay => "resultados_full",
            Variant::MaskedOverlay => "resultados_masked",
            Variant::Threshold => "resultados_threshold",
            Variant::Stretch => "resultados_stretch",
            Variant::InRange => "resultados_inrange",
            Variant::Or => "resultados_or",
            Variant::Xor => "resultados_xor",
            Variant::Not => "resultados_not",
            Variant::Canny => "resultados_canny",
        }
    }
}

/// 灰度转三通道后, 将 `mask` 严格大于 `threshold` 的像素覆盖为高亮色.
/// 其余像素保持原灰度值.
pub fn overlay(image: &GrayImage, mask: &GrayImage, threshold: u8) -> RgbImage {
    map_colors2(image, mask, |Luma([v]), Luma([m])| {
        if m > threshold {
            Rgb(HIGHLIGHT)
        } else {
            Rgb([v, v, v])
        }
    })
}

/// 掩码支撑区域外的像素置黑, 区域内保持不变.
pub fn restrict(image: &GrayImage, mask: &GrayImage) -> GrayImage {
    map_colors2(image, mask, |Luma([v]), Luma([m])| {
        Luma([if is_foreground(m) { v } else { BLACK }])
    })
}

/// 全局二值化: 严格大于 `level` 的像素置白, 其余置黑.
pub fn threshold(image: &GrayImage, level: u8) -> GrayImage {
    binary_threshold(image, level)
}

/// 将图像自身的 `[min, max]` 线性拉伸到 `[0, 255]`. 常值图像映射为全黑.
pub fn stretch(image: &GrayImage) -> GrayImage {
    let (lo, hi) = image
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p.0[0]), hi.max(p.0[0])));
    if lo >= hi {
        return GrayImage::new(image.width(), image.height());
    }
    stretch_contrast(image, lo, hi)
}

/// 灰度落在闭区间 `[low, high]` 内的像素置白, 其余置黑.
pub fn in_range(image: &GrayImage, (low, high): (u8, u8)) -> GrayImage {
    map_colors(image, |Luma([v])| {
        Luma([if (low..=high).contains(&v) { WHITE } else { BLACK }])
    })
}

/// 按位或.
pub fn bit_or(a: &GrayImage, b: &GrayImage) -> GrayImage {
    map_colors2(a, b, |Luma([x]), Luma([y])| Luma([x | y]))
}

/// 按位异或.
pub fn bit_xor(a: &GrayImage, b: &GrayImage) -> GrayImage {
    map_colors2(a, b, |Luma([x]), Luma([y])| Luma([x ^ y]))
}

/// 按位取反.
pub fn bit_not(image: &GrayImage) -> GrayImage {
    map_colors(image, |Luma([x])| Luma([!x]))
}

/// Canny 边缘检测, `(low, high)` 为滞后阈值.
pub fn canny(image: &GrayImage, (low, high): (f32, f32)) -> GrayImage {
    imageproc::edges::canny(image, low, high)
}
