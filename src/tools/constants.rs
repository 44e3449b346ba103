//! 常量和默认配置集中管理

/// 日志过滤默认值
pub mod logging {
    /// 默认日志级别（可被 RUST_LOG 覆盖）
    pub const DEFAULT_FILTER: &str = "warn";

    /// `-v` 时的日志级别
    pub const VERBOSE_FILTER: &str = "debug";
}

/// 资源种类识别
pub mod kinds {
    /// 按MIDI文件处理的扩展名
    pub const MIDI_EXTENSIONS: &[&str] = &["mid", "midi", "rmi", "kar"];

    /// 按音色库处理的扩展名
    pub const SOUNDBANK_EXTENSIONS: &[&str] = &["sf2"];
}

/// 默认配置值
pub mod defaults {
    /// 未指定 `--root` 时使用的根目录
    pub const ROOT_DIR: &str = ".";

    /// 表格中单元格的最大显示字符数
    pub const MAX_CELL_CHARS: usize = 64;
}
