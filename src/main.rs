//! Sound Resources - 主程序入口
//!
//! 纯流程控制器：解析参数、安装日志订阅器、执行子命令并映射退出码。

use sound_resources::{
    error::{ErrorCategory, SoundError},
    tools::{self, AppConfig, constants::logging},
};
use std::process;
use tracing_subscriber::EnvFilter;

/// 错误退出码定义
mod exit_codes {
    /// 通用错误
    pub const GENERAL_ERROR: i32 = 1;
    /// 格式错误（不支持的格式、无提供者）
    pub const FORMAT_ERROR: i32 = 2;
    /// I/O错误（资源不存在、读取失败）
    pub const IO_ERROR: i32 = 3;
    /// 服务清单配置错误
    pub const CONFIG_ERROR: i32 = 4;
}

/// 获取错误建议文本
fn get_error_suggestion(error: &SoundError) -> &'static str {
    match error {
        SoundError::ResourceNotFound { .. } => {
            "检查资源名与 --root 目录是否正确（资源名为 / 分隔的相对路径） / Check the resource name and --root directories (names are '/'-separated relative paths)"
        }
        SoundError::NoProvider { .. } => {
            "没有提供者识别该资源，检查文件格式或 --manifest 中启用的提供者 / No provider recognized the resource, check the file format or the providers enabled in --manifest"
        }
        _ => match ErrorCategory::from_sound_error(error) {
            ErrorCategory::Io => {
                "检查文件是否存在且可读 / Check if the file exists and is readable"
            }
            ErrorCategory::Format => {
                "文件可能损坏或使用不支持的编码 / File may be corrupted or use an unsupported encoding"
            }
            ErrorCategory::Config => {
                "检查服务清单的JSON结构与提供者名（可用 providers 子命令查看） / Check the manifest JSON and provider names (see the providers subcommand)"
            }
        },
    }
}

/// 错误处理和建议
fn handle_error(error: anyhow::Error) -> ! {
    eprintln!("[ERROR] 错误 / Error: {error:#}");

    let exit_code = match error.downcast_ref::<SoundError>() {
        Some(sound_error) => {
            let category = ErrorCategory::from_sound_error(sound_error);
            eprintln!("[INFO] 类别 / Category: {}", category.display_name());
            eprintln!(
                "[INFO] 建议 / Suggestion: {}",
                get_error_suggestion(sound_error)
            );
            match category {
                ErrorCategory::Format => exit_codes::FORMAT_ERROR,
                ErrorCategory::Io => exit_codes::IO_ERROR,
                ErrorCategory::Config => exit_codes::CONFIG_ERROR,
            }
        }
        None => exit_codes::GENERAL_ERROR,
    };

    process::exit(exit_code);
}

/// 安装日志订阅器（RUST_LOG优先）
fn init_logging(config: &AppConfig) {
    let default_filter = if config.verbose {
        logging::VERBOSE_FILTER
    } else {
        logging::DEFAULT_FILTER
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // 日志输出到stderr，保持stdout只有结果（便于 --json 管道处理）
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// 应用程序主逻辑
fn run(config: &AppConfig) -> anyhow::Result<()> {
    tools::run_command(config)
}

fn main() {
    let config = tools::parse_args();
    init_logging(&config);

    if let Err(error) = run(&config) {
        handle_error(error);
    }
}
