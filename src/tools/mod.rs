//! 工具模块集合
//!
//! 包含CLI、子命令处理、格式化等工具模块，支持main.rs的流程控制。

pub mod cli;
pub mod constants;
pub mod formatter;
pub mod processor;
pub mod utils;

// 重新导出主要的公共接口
pub use cli::{AppConfig, CliCommand, ResourceKind, parse_args, parse_from};
pub use formatter::{DecodeSummary, ProbeReport};
pub use processor::{decode, probe, run_command};
