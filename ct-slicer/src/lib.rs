#![warn(missing_docs)]

//! 核心库. 将 nifti 格式的 3D CT 扫描及其分割掩码逐层转换为可视化切片、
//! 统计表和回顾视频.
//!
//! 整个流程是单线程、顺序执行的批处理:
//!
//! 1. 加载扫描和掩码 ([`CtPair::open`]), 两者形状必须一致;
//! 2. 对每个 z 取水平切片并归一化到 8-bit ([`ScanSlice::normalize`]);
//! 3. 去噪、掩码形态学清理、统计和各类可视化变体 ([`process::process_slice`]);
//! 4. 写出统计表、每层图片和视频 ([`sink::Sinks`]).
//!
//! # 注意
//!
//! 1. 体数据解码、平滑/形态学/边缘检测、图片和视频帧编码均委托给 `nifti`,
//!   `image`, `imageproc` (以及可选的 `opencv`), 本 crate 只负责编排.
//! 2. 单个切片为空时只跳过该层; 只有加载错误和输出目录初始化错误是致命的.
//!
//! # 功能
//!
//! ### 体数据加载与形状校验 ✅
//!
//! 实现位于 `ct-slicer/src/data/mod.rs`.
//!
//! ### 切片强度归一化 ✅
//!
//! 线性拉伸到 `[0, 255]`, 常值切片映射为全黑.
//!
//! 实现位于 `ct-slicer/src/data/normalize.rs`.
//!
//! ### 切片处理 ✅
//!
//! 去噪, 开/闭运算, 面积/均值/极值统计, 叠加图及其他变体.
//!
//! 实现位于 `ct-slicer/src/process`.
//!
//! ### 输出 ✅
//!
//! CSV 统计表, PNG 切片, MJPEG AVI 视频 (或 `opencv` feature 下的 OpenCV 视频).
//!
//! 实现位于 `ct-slicer/src/sink`.

/// 二维索引 (高, 宽).
pub type Idx2d = (usize, usize);

/// 三维索引 (z, 高, 宽).
pub type Idx3d = (usize, usize, usize);

/// 3D CT nii 文件基础数据结构.
mod data;

pub use data::{CtPair, CtVolume, ImgWrite, NiftiHeaderAttr, Rescaler, ScanSlice};

pub mod consts;

pub mod error;

pub mod process;

pub mod sink;

pub mod pipeline;

pub mod prelude;
