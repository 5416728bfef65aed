use std::ops::Index;
use std::path::Path;

use log::info;
use ndarray::{Array3, Axis, Ix3};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::error::LoadError;
use crate::Idx3d;

pub mod normalize;
pub mod slice;

pub use normalize::Rescaler;
pub use slice::{ImgWrite, ScanSlice};

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
type BoxedHeader = Box<NiftiHeader>;

/// nii 格式 3D 标量体数据, 包括 header 和体素值. 体素值以 `f32` 保存.
///
/// 扫描和掩码都用该结构表示; 掩码在切片处理阶段才被解释为二值图像.
#[derive(Debug, Clone)]
pub struct CtVolume {
    header: BoxedHeader,

    /// 按 (z, H, W) 组织.
    data: Array3<f32>,
}

/// 3D nii 文件 header 的共用属性.
///
/// 这些元信息只随数据携带, 切片处理不依赖它们.
pub trait NiftiHeaderAttr {
    /// 获取 header 部分.
    fn header(&self) -> &NiftiHeader;

    /// 获取单个体素分辨率. 该分辨率以毫米为单位, 分别代表空间 (相邻切片方向),
    /// 高 (自然图像的垂直方向), 宽 (自然图像的水平方向).
    #[inline]
    fn pix_dim(&self) -> [f64; 3] {
        let [_, w, h, z, ..] = self.header().pixdim;
        [z as f64, h as f64, w as f64]
    }

    /// 获取 width 方向 (自然 2D 图像的水平方向) 体素分辨率, 以毫米为单位.
    #[inline]
    fn width_mm(&self) -> f64 {
        self.header().pixdim[1] as f64
    }

    /// 获取 height 方向 (自然 2D 图像的垂直方向) 体素分辨率, 以毫米为单位.
    #[inline]
    fn height_mm(&self) -> f64 {
        self.header().pixdim[2] as f64
    }

    /// 获取空间方向 (相邻 2D 切片的方向) 体素分辨率, 以毫米为单位.
    #[inline]
    fn z_mm(&self) -> f64 {
        self.header().pixdim[3] as f64
    }

    /// 获取水平切片方向的像素实际面积值, 以平方毫米为单位.
    #[inline]
    fn slice_pixel(&self) -> f64 {
        self.pix_dim().iter().skip(1).product()
    }

    /// quaternion 原点偏移 (x, y, z), 以毫米为单位.
    #[inline]
    fn origin(&self) -> [f64; 3] {
        let h = self.header();
        [h.quatern_x as f64, h.quatern_y as f64, h.quatern_z as f64]
    }

    /// (qform_code, sform_code). 决定方向矩阵的来源.
    #[inline]
    fn orientation_codes(&self) -> (i16, i16) {
        (self.header().qform_code, self.header().sform_code)
    }

    /// 判断该结构是否是由 `from_array` 手动拼接的.
    #[inline]
    fn is_faked(&self) -> bool {
        self.header().intent_name.starts_with(b"fake")
    }
}

impl NiftiHeaderAttr for CtVolume {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }
}

impl Index<Idx3d> for CtVolume {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl CtVolume {
    /// 打开 nii (或 nii.gz) 文件格式的 3D 体数据. `path` 为文件的本地路径.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let nifti_err = |source| LoadError::Nifti {
            path: path.to_owned(),
            source,
        };

        let obj = ReaderOptions::new().read_file(path).map_err(nifti_err)?;
        let header = Box::new(obj.header().clone());
        let data = obj.into_volume().into_ndarray::<f32>().map_err(nifti_err)?;

        let ndim = data.ndim();
        let data = data
            .into_dimensionality::<Ix3>()
            .map_err(|_| LoadError::NotVolumetric {
                path: path.to_owned(),
                ndim,
            })?;

        Ok(Self::from_whz(header, data))
    }

    /// 根据裸数据和体素分辨率直接创建 `CtVolume` 实体.
    ///
    /// # 参数
    ///
    /// 1. `data` 按照 nifti 惯用标准以 \[w, h, z\] 格式存储.
    /// 2. `pix_dim` 按照 \[w, h, z\] 格式存储.
    pub fn from_array(data: Array3<f32>, pix_dim: [f32; 3]) -> Self {
        let mut header = Box::<NiftiHeader>::default();
        let [_, pw, ph, pz, ..] = &mut header.pixdim;
        [*pw, *ph, *pz] = pix_dim;
        header.intent_name[..4].copy_from_slice(b"fake");
        Self::from_whz(header, data)
    }

    /// [W, H, z] -> [z, H, W].
    fn from_whz(header: BoxedHeader, data: Array3<f32>) -> Self {
        // hint: 原第一维向右增长, 原第二维向下增长.
        let data = data.permuted_axes([2, 1, 0]);
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        debug_assert!(data.is_standard_layout());
        Self { header, data }
    }

    /// 获取数据形状大小 (z, H, W).
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 按 nifti 惯例 (W, H, z) 给出的形状. 主要用于报错.
    #[inline]
    pub fn dims(&self) -> Idx3d {
        let (z, h, w) = self.shape();
        (w, h, z)
    }

    /// 获取水平切片个数.
    #[inline]
    pub fn len_z(&self) -> usize {
        self.shape().0
    }

    /// 获取 3D 体数据 z 空间的第 `z_index` 层切片视图.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> ScanSlice<'_> {
        ScanSlice::new(self.data.index_axis(Axis(0), z_index))
    }

    /// 获取能按升序迭代 3D 体数据水平切片的迭代器.
    #[inline]
    pub fn slice_iter(&self) -> impl ExactSizeIterator<Item = ScanSlice<'_>> {
        (0..self.len_z()).map(move |z| self.slice_at(z))
    }
}

/// nii 格式的 3D CT 扫描与对应的分割掩码.
///
/// 两者形状在构造时校验, 之后只读.
#[derive(Debug, Clone)]
pub struct CtPair {
    /// 3D CT 扫描.
    pub volume: CtVolume,

    /// 3D 分割掩码.
    pub mask: CtVolume,
}

impl CtPair {
    /// 组合扫描与掩码. 若两者形状不一致, 返回 [`LoadError::DimensionMismatch`].
    pub fn new(volume: CtVolume, mask: CtVolume) -> Result<Self, LoadError> {
        if volume.shape() != mask.shape() {
            return Err(LoadError::DimensionMismatch {
                volume: volume.dims(),
                mask: mask.dims(),
            });
        }
        Ok(Self { volume, mask })
    }

    /// 分别打开 nii 文件格式的 3D CT 扫描和对应掩码.
    pub fn open(
        volume_path: impl AsRef<Path>,
        mask_path: impl AsRef<Path>,
    ) -> Result<Self, LoadError> {
        let volume = CtVolume::open(volume_path.as_ref())?;
        let mask = CtVolume::open(mask_path.as_ref())?;
        let pair = Self::new(volume, mask)?;

        let (w, h, z) = pair.volume.dims();
        let [mz, mh, mw] = pair.volume.pix_dim();
        info!("dimensions: {w}x{h}x{z}, spacing: {mw}x{mh}x{mz} mm");
        info!(
            "origin: {:?}, qform/sform: {:?}",
            pair.volume.origin(),
            pair.volume.orientation_codes()
        );
        Ok(pair)
    }

    /// 获取水平切片个数.
    #[inline]
    pub fn len_z(&self) -> usize {
        self.volume.len_z()
    }

    /// 按 z 升序成对迭代扫描和掩码的水平切片.
    #[inline]
    pub fn slice_iter(&self) -> impl ExactSizeIterator<Item = (ScanSlice<'_>, ScanSlice<'_>)> {
        self.volume.slice_iter().zip(self.mask.slice_iter())
    }
}
