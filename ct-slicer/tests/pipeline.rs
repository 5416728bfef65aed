use std::fs;
use std::path::Path;

use ct_slicer::consts::names;
use ct_slicer::prelude::*;
use image::Rgb;
use ndarray::{Array3, Array4};
use nifti::writer::WriterOptions;
use nifti::NiftiHeader;

fn init_logger() {
    let _ = simple_logger::SimpleLogger::new().init();
}

/// v(x, y, z) = 16z + 4y + x, 按 (W, H, D) 存储.
fn ramp_volume() -> Array3<f32> {
    Array3::from_shape_fn((4, 4, 2), |(x, y, z)| (z * 16 + y * 4 + x) as f32)
}

/// 只有第 0 层左上角 2×2 为前景.
fn corner_mask() -> Array3<f32> {
    Array3::from_shape_fn((4, 4, 2), |(x, y, z)| {
        if z == 0 && x < 2 && y < 2 {
            1.0
        } else {
            0.0
        }
    })
}

fn ramp_pair() -> CtPair {
    CtPair::new(
        CtVolume::from_array(ramp_volume(), [0.7, 0.7, 2.5]),
        CtVolume::from_array(corner_mask(), [0.7, 0.7, 2.5]),
    )
    .unwrap()
}

fn raw_config(layout: OutputLayout) -> RunConfig {
    RunConfig {
        layout,
        params: ProcessParams::raw(),
        backend: VideoBackend::Mjpeg,
        ..RunConfig::default()
    }
}

fn video_frames(path: &Path) -> u32 {
    let bytes = fs::read(path).unwrap();
    assert_eq!(&bytes[0..4], b"RIFF");
    u32::from_le_bytes(bytes[48..52].try_into().unwrap())
}

#[test]
fn test_separate_layout_end_to_end() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    let summary = run(&ramp_pair(), &out, &raw_config(OutputLayout::Separate)).unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.failed_writes, 0);
    assert_eq!(summary.frames, 2);

    let csv = fs::read_to_string(out.join(names::STATS)).unwrap();
    assert_eq!(
        csv,
        "Slice,Area,Media,Minimo,Maximo\n0,4,42.5,0,85\n1,0,0,0,0\n"
    );

    for v in Variant::ALL {
        let sub = out.join(v.dir_name());
        let mut files: Vec<_> = fs::read_dir(&sub)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        files.sort();
        assert_eq!(files, ["slice_000.png", "slice_001.png"], "{v:?}");
    }
    assert_eq!(video_frames(&out.join(names::VIDEO)), 2);

    // 掩码区域叠加图: 前景为高亮色, 其余为黑色.
    let masked = image::open(out.join("resultados_masked").join("slice_000.png"))
        .unwrap()
        .to_rgb8();
    assert_eq!(*masked.get_pixel(1, 1), Rgb([255, 0, 0]));
    assert_eq!(*masked.get_pixel(3, 3), Rgb([0, 0, 0]));
}

#[test]
fn test_default_params_end_to_end() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path();

    // v = 10x + 50, 归一化后为 17x. 线性区域内高斯模糊不改变像素值.
    let volume = Array3::from_shape_fn((16, 16, 2), |(x, _, _)| (10 * x + 50) as f32);
    // 第 0 层中央 8×8 块为前景.
    let mask = Array3::from_shape_fn((16, 16, 2), |(x, y, z)| {
        let inside = (4..12).contains(&x) && (4..12).contains(&y);
        if z == 0 && inside {
            1.0
        } else {
            0.0
        }
    });
    let pair = CtPair::new(
        CtVolume::from_array(volume, [1.0; 3]),
        CtVolume::from_array(mask, [1.0; 3]),
    )
    .unwrap();
    let config = RunConfig {
        backend: VideoBackend::Mjpeg,
        ..RunConfig::default()
    };
    assert_eq!(config.params, ProcessParams::default());

    let summary = run(&pair, out, &config).unwrap();
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.frames, 2);

    // 中值滤波去掉 4 个角, 开/闭运算保持形状: 面积 60.
    // 列 4..=11 的和为 17 * 60 * 8, 再减去四个角 17 * (4 + 11) * 2.
    let csv = fs::read_to_string(out.join(names::STATS)).unwrap();
    assert_eq!(
        csv,
        "Slice,Area,Media,Minimo,Maximo\n0,60,127.5,68,187\n1,0,0,0,0\n"
    );

    let first = image::open(out.join("slice_000.png")).unwrap().to_rgb8();
    assert_eq!(*first.get_pixel(6, 6), Rgb([255, 0, 0]));
    assert_eq!(*first.get_pixel(4, 4), Rgb([68, 68, 68]));
    assert_eq!(*first.get_pixel(8, 14), Rgb([136, 136, 136]));
}

#[test]
fn test_flat_layout_overlay() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path();

    let summary = run(&ramp_pair(), out, &raw_config(OutputLayout::Flat)).unwrap();
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.frames, 2);
    assert!(!out.join("resultados_full").exists());

    let first = image::open(out.join("slice_000.png")).unwrap().to_rgb8();
    assert_eq!(*first.get_pixel(0, 1), Rgb([255, 0, 0]));
    assert_eq!(*first.get_pixel(2, 0), Rgb([34, 34, 34]));

    // 第 1 层掩码为空, 叠加图即灰度图.
    let second = image::open(out.join("slice_001.png")).unwrap().to_rgb8();
    for (x, y, p) in second.enumerate_pixels() {
        let g = ((y * 4 + x) * 17) as u8;
        assert_eq!(*p, Rgb([g, g, g]), "({x}, {y})");
    }
}

#[test]
fn test_empty_slices_are_skipped() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let empty = || CtVolume::from_array(Array3::zeros((0, 4, 3)), [1.0; 3]);
    let pair = CtPair::new(empty(), empty()).unwrap();

    let summary = run(&pair, dir.path(), &raw_config(OutputLayout::Flat)).unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.processed, 0);
    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.frames, 0);
    assert!(!dir.path().join(names::VIDEO).exists());
    assert_eq!(
        fs::read_to_string(dir.path().join(names::STATS)).unwrap(),
        "Slice,Area,Media,Minimo,Maximo\n"
    );
}

#[test]
fn test_nifti_files() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let vol_path = dir.path().join("volume.nii.gz");
    let mask_path = dir.path().join("mask.nii.gz");
    let header = NiftiHeader {
        sform_code: 0,
        quatern_x: -90.5,
        quatern_y: 12.0,
        quatern_z: 3.25,
        ..NiftiHeader::default()
    };
    WriterOptions::new(&vol_path)
        .reference_header(&header)
        .write_nifti(&ramp_volume())
        .unwrap();
    WriterOptions::new(&mask_path)
        .write_nifti(&corner_mask())
        .unwrap();

    let pair = CtPair::open(&vol_path, &mask_path).unwrap();
    assert_eq!(pair.volume.dims(), (4, 4, 2));
    assert!(!pair.volume.is_faked());
    assert_eq!(pair.volume.origin(), [-90.5, 12.0, 3.25]);
    assert_eq!(pair.volume.orientation_codes(), (1, 0));
    assert_eq!(pair.mask.origin(), [0.0; 3]);
    assert_eq!(pair.volume[(1, 2, 3)], 27.0);

    let out = dir.path().join("out");
    let summary = run_files(&vol_path, &mask_path, &out, &raw_config(OutputLayout::Flat)).unwrap();
    assert_eq!(summary.processed, 2);
    let csv = fs::read_to_string(out.join(names::STATS)).unwrap();
    assert!(csv.contains("\n0,4,42.5,0,85\n"));
}

#[test]
fn test_load_errors() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let vol_path = dir.path().join("volume.nii");
    let small_path = dir.path().join("small.nii");
    let four_d_path = dir.path().join("4d.nii");
    WriterOptions::new(&vol_path)
        .write_nifti(&ramp_volume())
        .unwrap();
    WriterOptions::new(&small_path)
        .write_nifti(&Array3::<f32>::zeros((4, 3, 2)))
        .unwrap();
    WriterOptions::new(&four_d_path)
        .write_nifti(&Array4::<f32>::zeros((2, 2, 2, 2)))
        .unwrap();

    let err = CtPair::open(&vol_path, &small_path).unwrap_err();
    assert!(matches!(
        err,
        LoadError::DimensionMismatch {
            volume: (4, 4, 2),
            mask: (4, 3, 2),
        }
    ));

    let err = CtVolume::open(&four_d_path).unwrap_err();
    assert!(matches!(err, LoadError::NotVolumetric { ndim: 4, .. }));

    let err = CtVolume::open(dir.path().join("missing.nii")).unwrap_err();
    assert!(matches!(err, LoadError::Nifti { .. }));

    let out = dir.path().join("out");
    let err = run_files(&vol_path, &small_path, &out, &RunConfig::default()).unwrap_err();
    assert!(matches!(err, RunError::Load(LoadError::DimensionMismatch { .. })));
    assert!(!out.exists());
}
