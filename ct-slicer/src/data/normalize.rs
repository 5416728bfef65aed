/// 线性强度重映射, 将输入区间 `[lower, upper]` 拉伸到 8-bit `[0, 255]`.
///
/// 该对象是只读的. 若要修改区间, 你应该创建新的实例.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rescaler {
    lower: f32,
    upper: f32,
}

impl Rescaler {
    /// 退化区间. 所有输入都映射为 0.
    pub const FLAT: Rescaler = Rescaler {
        lower: 0.0,
        upper: 0.0,
    };

    /// 构建重映射.
    ///
    /// `lower` 和 `upper` 必须有限且 `lower <= upper`, 否则返回 `None`.
    pub fn new(lower: f32, upper: f32) -> Option<Rescaler> {
        if lower.is_finite() && upper.is_finite() && lower <= upper {
            Some(Self { lower, upper })
        } else {
            None
        }
    }

    /// 以 `it` 中有限值的最小值和最大值构建重映射.
    /// 如果 `it` 中不存在有限值, 则返回 `None`.
    pub fn fit<I: IntoIterator<Item = f32>>(it: I) -> Option<Rescaler> {
        let (lower, upper) = it
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        Self::new(lower, upper)
    }

    /// 区间是否退化为一个点.
    #[inline]
    pub fn is_flat(&self) -> bool {
        self.lower == self.upper
    }

    /// 求 `v` 对应的灰度图像素整数值 (0 <= value <= 255), 小数部分直接截断.
    ///
    /// 无意义的 `v` (inf, NaN) 以及退化区间下的任意 `v` 都映射为 0.
    pub fn eval(&self, v: f32) -> u8 {
        match self.eval_f64(v) {
            Some(f) => f as u8,
            None => u8::MIN,
        }
    }

    /// 求 `v` 对应的灰度图像素分布点 (0.0 <= value <= 255.0).
    ///
    /// 如果 `v` 无意义或区间退化, 则返回 `None`.
    pub fn eval_f64(&self, v: f32) -> Option<f64> {
        if !v.is_finite() || self.is_flat() {
            return None;
        }
        let (lb, ub) = (self.lower as f64, self.upper as f64);
        let v = v as f64;
        if v >= ub {
            // 上限恒映射为 255.
            return Some(255.0);
        }
        let scale = 255.0 / (ub - lb);
        Some((v.max(lb) - lb) * scale)
    }
}
