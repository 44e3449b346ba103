//! 命令行接口模块
//!
//! 负责命令行参数解析和配置管理。

use super::constants::defaults;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::path::PathBuf;

/// 应用程序版本信息
const VERSION: &str = env!("CARGO_PKG_VERSION");
const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// 资源种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Audio,
    Midi,
    Soundbank,
    /// 按扩展名自动判断
    Auto,
}

impl ResourceKind {
    fn parse(value: &str) -> Self {
        match value {
            "audio" => Self::Audio,
            "midi" => Self::Midi,
            "soundbank" => Self::Soundbank,
            _ => Self::Auto,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Midi => "midi",
            Self::Soundbank => "soundbank",
            Self::Auto => "auto",
        }
    }
}

/// 子命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// 探测资源格式
    Probe {
        name: String,
        roots: Vec<PathBuf>,
        kind: ResourceKind,
        json: bool,
    },
    /// 流式解码音频资源
    Decode { name: String, roots: Vec<PathBuf> },
    /// 列出上下文中的资源
    List { roots: Vec<PathBuf> },
    /// 显示提供者注册表
    Providers,
}

/// 应用程序配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub command: CliCommand,

    /// 是否显示详细信息（同时把日志级别提升到debug）
    pub verbose: bool,

    /// 服务清单路径（未指定时使用平台默认提供者）
    pub manifest: Option<PathBuf>,
}

fn root_arg() -> Arg {
    Arg::new("root")
        .long("root")
        .short('r')
        .help("资源根目录，可重复，按顺序搜索 / Resource root directory (repeatable, searched in order)")
        .value_name("DIR")
        .action(ArgAction::Append)
}

fn name_arg() -> Arg {
    Arg::new("NAME")
        .help("资源名（以 / 分隔的相对路径） / Resource name ('/'-separated relative path)")
        .required(true)
        .index(1)
}

/// 构建命令定义
pub fn build_command() -> Command {
    Command::new("sound-resources")
        .version(VERSION)
        .about(DESCRIPTION)
        .author("Sound Resources Team")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("显示详细处理信息 / Show verbose output")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("manifest")
                .long("manifest")
                .short('m')
                .help("服务清单（JSON） / Service manifest (JSON)")
                .value_name("FILE")
                .global(true),
        )
        .subcommand(
            Command::new("probe")
                .about("探测资源格式 / Probe the format of a resource")
                .arg(name_arg())
                .arg(root_arg())
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .short('k')
                        .help("资源种类 / Resource kind")
                        .value_parser(["audio", "midi", "soundbank", "auto"])
                        .default_value("auto"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("以JSON输出 / Print as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("decode")
                .about("流式解码音频资源直到结束 / Stream an audio resource to the end")
                .arg(name_arg())
                .arg(root_arg()),
        )
        .subcommand(
            Command::new("list")
                .about("列出可见资源 / List visible resources")
                .arg(root_arg()),
        )
        .subcommand(
            Command::new("providers").about("显示提供者注册表 / Show the provider registry"),
        )
}

fn roots(matches: &ArgMatches) -> Vec<PathBuf> {
    let roots: Vec<PathBuf> = matches
        .get_many::<String>("root")
        .map(|values| values.map(PathBuf::from).collect())
        .unwrap_or_default();
    if roots.is_empty() {
        vec![PathBuf::from(defaults::ROOT_DIR)]
    } else {
        roots
    }
}

fn name(matches: &ArgMatches) -> String {
    matches
        .get_one::<String>("NAME")
        .cloned()
        .unwrap_or_default()
}

fn from_matches(matches: &ArgMatches) -> AppConfig {
    let command = match matches.subcommand() {
        Some(("probe", sub)) => CliCommand::Probe {
            name: name(sub),
            roots: roots(sub),
            kind: sub
                .get_one::<String>("kind")
                .map(|k| ResourceKind::parse(k))
                .unwrap_or(ResourceKind::Auto),
            json: sub.get_flag("json"),
        },
        Some(("decode", sub)) => CliCommand::Decode {
            name: name(sub),
            roots: roots(sub),
        },
        Some(("list", sub)) => CliCommand::List { roots: roots(sub) },
        _ => CliCommand::Providers,
    };

    // 全局参数可能出现在子命令之后
    let sub = matches.subcommand().map(|(_, sub)| sub);
    let verbose = matches.get_flag("verbose") || sub.is_some_and(|s| s.get_flag("verbose"));
    let manifest = sub
        .and_then(|s| s.get_one::<String>("manifest"))
        .or_else(|| matches.get_one::<String>("manifest"))
        .map(PathBuf::from);

    AppConfig {
        command,
        verbose,
        manifest,
    }
}

/// 解析命令行参数并创建配置（参数错误时由clap打印用法并退出）
pub fn parse_args() -> AppConfig {
    from_matches(&build_command().get_matches())
}

/// 从给定参数解析配置
pub fn parse_from<I, T>(args: I) -> Result<AppConfig, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_command().try_get_matches_from(args)?;
    Ok(from_matches(&matches))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_defaults() {
        let config = parse_from(["sound-resources", "probe", "a/b.wav"]).unwrap();
        assert!(!config.verbose);
        assert_eq!(
            config.command,
            CliCommand::Probe {
                name: "a/b.wav".to_string(),
                roots: vec![PathBuf::from(".")],
                kind: ResourceKind::Auto,
                json: false,
            }
        );
    }

    #[test]
    fn test_repeated_roots_and_global_flags() {
        let config = parse_from([
            "sound-resources",
            "decode",
            "x.flac",
            "--root",
            "one",
            "-r",
            "two",
            "-v",
            "--manifest",
            "m.json",
        ])
        .unwrap();
        assert!(config.verbose);
        assert_eq!(config.manifest, Some(PathBuf::from("m.json")));
        match config.command {
            CliCommand::Decode { roots, .. } => {
                assert_eq!(roots, vec![PathBuf::from("one"), PathBuf::from("two")])
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_kind_rejected() {
        assert!(parse_from(["sound-resources", "probe", "x", "--kind", "video"]).is_err());
    }

    #[test]
    fn test_providers_subcommand() {
        let config = parse_from(["sound-resources", "providers"]).unwrap();
        assert_eq!(config.command, CliCommand::Providers);
    }
}
