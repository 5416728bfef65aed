//! 单个水平切片的处理: 去噪, 掩码清理, 统计和可视化变体.
//!
//! 处理函数都是纯函数, 输入为两张同样大小的 8-bit 灰度图
//! (已归一化的扫描切片和掩码切片), 不依赖也不修改任何外部状态.

use crate::consts::params;
use image::{DynamicImage, GrayImage, RgbImage};

pub mod denoise;
pub mod morph;
pub mod stats;
pub mod variants;

pub use denoise::GaussianBlur;
pub use stats::SliceStats;
pub use variants::Variant;

/// 切片处理参数.
///
/// `Default` 即固定的处理配置; 命令行工具总是使用它.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ProcessParams {
    /// 扫描切片的高斯模糊. `None` 表示不模糊.
    pub blur: Option<GaussianBlur>,

    /// 掩码中值滤波半径. 0 表示不滤波.
    pub median_radius: u32,

    /// 掩码开/闭运算结构元半径. 0 表示不做形态学清理.
    pub morph_radius: u8,

    /// 掩码像素严格大于该值时高亮.
    pub highlight_threshold: u8,

    /// 全局二值化阈值.
    pub binary_threshold: u8,

    /// in-range 变体的闭区间.
    pub in_range: (u8, u8),

    /// Canny 低/高阈值.
    pub canny: (f32, f32),
}

impl Default for ProcessParams {
    fn default() -> Self {
        Self {
            blur: Some(GaussianBlur::new(params::BLUR_KERNEL, params::BLUR_SIGMA)),
            median_radius: params::MEDIAN_RADIUS,
            morph_radius: params::MORPH_RADIUS,
            highlight_threshold: params::HIGHLIGHT_THRESHOLD,
            binary_threshold: params::BINARY_THRESHOLD,
            in_range: (params::IN_RANGE_LOW, params::IN_RANGE_HIGH),
            canny: (params::CANNY_LOW, params::CANNY_HIGH),
        }
    }
}

impl ProcessParams {
    /// 关闭去噪和形态学清理, 其余同默认值.
    pub fn raw() -> Self {
        Self {
            blur: None,
            median_radius: 0,
            morph_radius: 0,
            ..Self::default()
        }
    }
}

/// 一个处理完毕的切片: 去噪后的扫描, 清理后的掩码和统计信息.
///
/// 各可视化变体按需从这两张图派生.
#[derive(Clone, Debug)]
pub struct ProcessedSlice {
    stats: SliceStats,
    volume: GrayImage,
    mask: GrayImage,
    params: ProcessParams,
}

/// 处理第 `z` 层切片.
///
/// 1. 扫描做高斯模糊, 掩码做中值滤波;
/// 2. 掩码依次做开运算和闭运算;
/// 3. 以清理后的掩码为选择子, 统计扫描的面积/均值/最小值/最大值.
///
/// `volume` 与 `mask` 大小必须一致, 否则程序 panic.
pub fn process_slice(
    z: usize,
    volume: &GrayImage,
    mask: &GrayImage,
    params: &ProcessParams,
) -> ProcessedSlice {
    assert_eq!(volume.dimensions(), mask.dimensions(), "扫描和掩码切片大小不一致");

    let volume = match &params.blur {
        Some(blur) => blur.apply(volume),
        None => volume.clone(),
    };
    let mask = denoise::median(mask, params.median_radius);
    let mask = morph::open_close(&mask, params.morph_radius);
    let stats = SliceStats::masked(z, &volume, &mask);

    ProcessedSlice {
        stats,
        volume,
        mask,
        params: *params,
    }
}

impl ProcessedSlice {
    /// 切片编号.
    #[inline]
    pub fn z(&self) -> usize {
        self.stats.slice
    }

    /// 统计信息.
    #[inline]
    pub fn stats(&self) -> &SliceStats {
        &self.stats
    }

    /// 去噪后的扫描切片.
    #[inline]
    pub fn volume(&self) -> &GrayImage {
        &self.volume
    }

    /// 清理后的掩码切片.
    #[inline]
    pub fn mask(&self) -> &GrayImage {
        &self.mask
    }

    /// 掩码高亮叠加图.
    pub fn overlay(&self) -> RgbImage {
        variants::overlay(&self.volume, &self.mask, self.params.highlight_threshold)
    }

    /// 只保留掩码支撑区域的高亮叠加图.
    pub fn masked_overlay(&self) -> RgbImage {
        let restricted = variants::restrict(&self.volume, &self.mask);
        variants::overlay(&restricted, &self.mask, self.params.highlight_threshold)
    }

    /// 生成给定的可视化变体.
    pub fn render(&self, variant: Variant) -> DynamicImage {
        let p = &self.params;
        match variant {
            Variant::Overlay => self.overlay().into(),
            Variant::MaskedOverlay => self.masked_overlay().into(),
            Variant::Threshold => variants::threshold(&self.volume, p.binary_threshold).into(),
            Variant::Stretch => variants::stretch(&self.volume).into(),
            Variant::InRange => variants::in_range(&self.volume, p.in_range).into(),
            Variant::Or => variants::bit_or(&self.volume, &self.mask).into(),
            Variant::Xor => variants::bit_xor(&self.volume, &self.mask).into(),
            Variant::Not => variants::bit_not(&self.mask).into(),
            Variant::Canny => variants::canny(&self.volume, p.canny).into(),
        }
    }
}
