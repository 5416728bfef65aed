//! 二维掩码形态学清理.
//!
//! 灰度形态学: 腐蚀取邻域最小值, 膨胀取邻域最大值. 结构元为 L∞ 范数下半径为
//! `radius` 的方形, 即 `(2r + 1) × (2r + 1)`. 图像外的邻居不参与计算,
//! 因此贴边的区域不会被边界侵蚀. 输出保留输入的灰度级.

use std::cmp;

use image::{GrayImage, Luma};

type Pick = fn(u8, u8) -> u8;

/// 先开运算 (去除孤立噪点), 再闭运算 (填补小空洞).
///
/// `radius` 为 0 时直接复制.
pub fn open_close(mask: &GrayImage, radius: u8) -> GrayImage {
    if radius == 0 {
        return mask.clone();
    }
    let r = radius as u32;
    let opened = dilate(&erode(mask, r), r);
    erode(&dilate(&opened, r), r)
}

/// 灰度腐蚀.
pub fn erode(image: &GrayImage, radius: u32) -> GrayImage {
    rank_filter(image, radius, cmp::min)
}

/// 灰度膨胀.
pub fn dilate(image: &GrayImage, radius: u32) -> GrayImage {
    rank_filter(image, radius, cmp::max)
}

/// 方形结构元可分离: 先按行, 再按列.
fn rank_filter(image: &GrayImage, radius: u32, pick: Pick) -> GrayImage {
    let rows = window_pass(image, radius, pick, true);
    window_pass(&rows, radius, pick, false)
}

fn window_pass(image: &GrayImage, radius: u32, pick: Pick, horizontal: bool) -> GrayImage {
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let (pos, len) = if horizontal { (x, width) } else { (y, height) };
        let lo = pos.saturating_sub(radius);
        let hi = cmp::min(pos.saturating_add(radius), len - 1);
        let v = (lo..=hi).fold(image.get_pixel(x, y).0[0], |acc, i| {
            let p = if horizontal {
                image.get_pixel(i, y)
            } else {
                image.get_pixel(x, i)
            };
            pick(acc, p.0[0])
        });
        Luma([v])
    })
}

#[cfg(test)]
mod tests {
    use super::{dilate, erode, open_close};
    use crate::consts::gray::WHITE;
    use image::{GrayImage, Luma};

    fn block(w: u32, h: u32, x0: u32, x1: u32, v: u8) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| {
            let inside = (x0..x1).contains(&x) && (x0..x1).contains(&y);
            Luma([if inside { v } else { 0 }])
        })
    }

    #[test]
    fn test_open_close() {
        // 7×7 实心块, 中心有一个空洞; 另有一个孤立噪点.
        let mut mask = block(12, 12, 2, 9, WHITE);
        mask.put_pixel(5, 5, Luma([0]));
        mask.put_pixel(10, 10, Luma([WHITE]));

        let out = open_close(&mask, 1);
        assert_eq!(out, block(12, 12, 2, 9, WHITE));
    }

    #[test]
    fn test_keeps_gray_levels() {
        let mask = block(9, 9, 2, 7, 3);
        let out = open_close(&mask, 1);
        assert_eq!(out, mask);
        assert_eq!(out.get_pixel(4, 4).0, [3]);
        assert_eq!(out.get_pixel(0, 0).0, [0]);
        assert_eq!(open_close(&mask, 0), mask);
    }

    #[test]
    fn test_open_flattens_thin_peak() {
        let mut mask = block(9, 9, 2, 7, 100);
        mask.put_pixel(4, 4, Luma([200]));
        assert_eq!(open_close(&mask, 1), block(9, 9, 2, 7, 100));
    }

    #[test]
    fn test_border_is_ignored() {
        let full = GrayImage::from_pixel(5, 4, Luma([9]));
        assert_eq!(erode(&full, 2), full);
        assert_eq!(open_close(&full, 1), full);

        let mut dot = GrayImage::new(5, 5);
        dot.put_pixel(0, 0, Luma([7]));
        let grown = dilate(&dot, 1);
        let expected = GrayImage::from_fn(5, 5, |x, y| Luma([if x < 2 && y < 2 { 7 } else { 0 }]));
        assert_eq!(grown, expected);
        assert_eq!(erode(&grown, 1), dot);
    }
}
