//! 去噪滤波.

use image::{GrayImage, Luma};
use imageproc::definitions::Image;
use imageproc::filter::{median_filter, separable_filter_equal};

/// 固定核大小的可分离高斯模糊.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GaussianBlur {
    size: usize,
    sigma: f32,
}

impl GaussianBlur {
    /// 构建核大小为 `size`, 标准差为 `sigma` 的高斯模糊.
    ///
    /// `size` 必须为奇数, `sigma` 必须为正, 否则程序 panic.
    pub fn new(size: usize, sigma: f32) -> Self {
        assert!(size % 2 == 1, "高斯核大小必须为奇数");
        assert!(sigma > 0.0, "高斯核标准差必须为正");
        Self { size, sigma }
    }

    /// 核大小.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// 归一化的一维核, 按行和列各卷积一次.
    pub fn kernel(&self) -> Vec<f32> {
        let center = (self.size / 2) as f32;
        let denom = 2.0 * self.sigma * self.sigma;
        let raw: Vec<f32> = (0..self.size)
            .map(|i| {
                let x = i as f32 - center;
                (-x * x / denom).exp()
            })
            .collect();
        let sum: f32 = raw.iter().sum();
        raw.into_iter().map(|k| k / sum).collect()
    }

    /// 对 `image` 做模糊, 返回新图.
    ///
    /// 边界按 reflect-101 (`dcb|abcd|cba`) 延拓. 中间结果保持 `f32`,
    /// 最后四舍五入到 8-bit.
    pub fn apply(&self, image: &GrayImage) -> GrayImage {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return image.clone();
        }
        let pad = (self.size / 2) as u32;
        let padded = reflect_101(image, pad);
        let blurred = separable_filter_equal(&padded, &self.kernel());
        GrayImage::from_fn(width, height, |x, y| {
            let v = blurred.get_pixel(x + pad, y + pad).0[0];
            Luma([v.round().clamp(0.0, 255.0) as u8])
        })
    }
}

/// 四周各延拓 `pad` 个像素, 并转为 `f32`.
fn reflect_101(image: &GrayImage, pad: u32) -> Image<Luma<f32>> {
    let (width, height) = image.dimensions();
    Image::from_fn(width + 2 * pad, height + 2 * pad, |x, y| {
        let sx = reflect_101_index(x as i64 - pad as i64, width);
        let sy = reflect_101_index(y as i64 - pad as i64, height);
        Luma([image.get_pixel(sx, sy).0[0] as f32])
    })
}

/// `len` 必须大于 0.
fn reflect_101_index(mut i: i64, len: u32) -> u32 {
    let last = len as i64 - 1;
    if last == 0 {
        return 0;
    }
    while i < 0 || i > last {
        i = if i < 0 { -i } else { 2 * last - i };
    }
    i as u32
}

/// 半径为 `radius` 的方形窗口中值滤波. 半径为 0 时直接复制.
pub fn median(image: &GrayImage, radius: u32) -> GrayImage {
    if radius == 0 {
        return image.clone();
    }
    median_filter(image, radius, radius)
}
