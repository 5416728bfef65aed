//! CT 水平切片对象的操作.

mod core;
mod save;

pub use core::ScanSlice;

pub use save::ImgWrite;
