//! 将 nii 格式的 3D CT 扫描及其分割掩码逐层转换为可视化切片,
//! 统计表和回顾视频.

mod result;
mod runner;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// 3D CT 扫描 (nii 或 nii.gz).
    volume: PathBuf,

    /// 分割掩码, 形状必须与扫描一致.
    mask: PathBuf,

    /// 输出目录, 不存在时自动创建.
    output: PathBuf,

    /// 每种可视化变体写到各自的子目录.
    #[arg(long)]
    separate: bool,
}

fn main() -> ExitCode {
    // 参数错误的退出码为 1, 而不是 clap 默认的 2.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    utils::init_logger();

    match runner::run(&args) {
        Ok(result) => {
            result.analyze();
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", utils::error_chain(&e));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::Parser;

    #[test]
    fn test_missing_positional() {
        let err = Args::try_parse_from(["slice-review", "v.nii", "m.nii"]).unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn test_separate_flag() {
        let args =
            Args::try_parse_from(["slice-review", "--separate", "v.nii", "m.nii", "out"]).unwrap();
        assert!(args.separate);
        assert_eq!(args.output.to_str(), Some("out"));

        let args = Args::try_parse_from(["slice-review", "v.nii", "m.nii", "out"]).unwrap();
        assert!(!args.separate);
    }

    #[test]
    fn test_help_is_not_an_error_exit() {
        let err = Args::try_parse_from(["slice-review", "--help"]).unwrap_err();
        assert!(!err.use_stderr());
    }
}
