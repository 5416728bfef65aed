//! 通用常量. 处理流程的参数在运行期不可配置.

/// 单通道颜色.
pub mod gray {
    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 单通道白色.
    pub const WHITE: u8 = 0b_1111_1111;

    /// 掩码像素是否是前景?
    #[inline]
    pub const fn is_foreground(p: u8) -> bool {
        p != BLACK
    }
}

/// 三通道颜色, RGB 顺序.
pub mod rgb {
    /// 掩码区域的高亮颜色 (红色). 不透明覆盖, 不做混合.
    pub const HIGHLIGHT: [u8; 3] = [255, 0, 0];
}

/// 切片处理参数.
pub mod params {
    /// 扫描切片高斯模糊的核大小 (奇数).
    pub const BLUR_KERNEL: usize = 5;

    /// 扫描切片高斯模糊的标准差.
    pub const BLUR_SIGMA: f32 = 1.0;

    /// 掩码中值滤波半径. 1 即 3×3 窗口.
    pub const MEDIAN_RADIUS: u32 = 1;

    /// 掩码开/闭运算结构元半径 (L∞ 范数). 1 即 3×3 方形.
    pub const MORPH_RADIUS: u8 = 1;

    /// 掩码像素值 **严格大于** 该值时在叠加图上被高亮.
    pub const HIGHLIGHT_THRESHOLD: u8 = 10;

    /// 全局二值化阈值. 严格大于该值的像素置为白色.
    pub const BINARY_THRESHOLD: u8 = 127;

    /// in-range 变体的下界 (含).
    pub const IN_RANGE_LOW: u8 = 100;

    /// in-range 变体的上界 (含).
    pub const IN_RANGE_HIGH: u8 = 200;

    /// Canny 边缘检测的低阈值.
    pub const CANNY_LOW: f32 = 50.0;

    /// Canny 边缘检测的高阈值.
    pub const CANNY_HIGH: f32 = 150.0;
}

/// 输出文件和目录名.
pub mod names {
    /// 视频文件名.
    pub const VIDEO: &str = "video_slices.avi";

    /// 统计表文件名.
    pub const STATS: &str = "estadisticas.csv";

    /// 统计表表头.
    pub const STATS_HEADER: [&str; 5] = ["Slice", "Area", "Media", "Minimo", "Maximo"];

    /// 视频帧率.
    pub const FRAME_RATE: u32 = 5;

    /// 第 `z` 层切片的图片文件名, 编号补零到 3 位.
    #[inline]
    pub fn slice_png(z: usize) -> String {
        format!("slice_{z:03}.png")
    }
}
