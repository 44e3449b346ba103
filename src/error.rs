//! 统一错误处理框架
//!
//! 资源读取相关的错误类型定义，以及驱动提供者回退循环的错误标签。

use std::fmt;
use std::io;

/// 五种读取能力（每个门面操作对应一种）
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Capability {
    /// 音频文件格式探测
    AudioFileFormat,
    /// 音频输入流解码
    AudioInputStream,
    /// MIDI文件格式探测
    MidiFileFormat,
    /// MIDI序列解码
    Sequence,
    /// 音色库解码
    Soundbank,
}

impl Capability {
    /// 所有能力（固定顺序）
    pub const ALL: [Capability; 5] = [
        Capability::AudioFileFormat,
        Capability::AudioInputStream,
        Capability::MidiFileFormat,
        Capability::Sequence,
        Capability::Soundbank,
    ];

    /// 能力名称（用于日志）
    pub fn name(&self) -> &'static str {
        match self {
            Capability::AudioFileFormat => "audio-file-format",
            Capability::AudioInputStream => "audio-input-stream",
            Capability::MidiFileFormat => "midi-file-format",
            Capability::Sequence => "sequence",
            Capability::Soundbank => "soundbank",
        }
    }

    /// 所有提供者都失败时门面合成的失败信息
    pub fn exhausted_message(&self) -> &'static str {
        match self {
            Capability::AudioFileFormat => "file is not a supported file type",
            Capability::AudioInputStream => "could not get audio input stream from input resource",
            Capability::MidiFileFormat => "resource is not a supported file type",
            Capability::Sequence => "could not get sequence from resource",
            Capability::Soundbank => "cannot get soundbank from resource",
        }
    }

    /// 是否属于MIDI子系统（决定格式类错误的具体变体）
    pub fn is_midi(&self) -> bool {
        matches!(
            self,
            Capability::MidiFileFormat | Capability::Sequence | Capability::Soundbank
        )
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 资源读取相关的统一错误类型
#[derive(Debug)]
pub enum SoundError {
    /// 加载上下文中找不到指定资源（I/O类）
    ResourceNotFound { name: String, loader: String },

    /// 底层I/O错误（I/O类）
    Io(io::Error),

    /// 不支持或损坏的音频文件（格式类）
    UnsupportedAudioFile(String),

    /// 不支持或损坏的MIDI/音色库数据（格式类）
    InvalidMidiData(String),

    /// 提供者列表耗尽，无人识别该资源（格式类，由门面合成）
    NoProvider { capability: Capability },

    /// 服务清单配置错误
    Config(String),
}

impl fmt::Display for SoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundError::ResourceNotFound { name, loader } => {
                write!(f, "could not load resource \"{name}\" with loader \"{loader}\"")
            }
            SoundError::Io(err) => write!(f, "I/O错误: {err}"),
            SoundError::UnsupportedAudioFile(msg) => write!(f, "不支持的音频文件: {msg}"),
            SoundError::InvalidMidiData(msg) => write!(f, "无效的MIDI数据: {msg}"),
            SoundError::NoProvider { capability } => f.write_str(capability.exhausted_message()),
            SoundError::Config(msg) => write!(f, "服务清单配置错误: {msg}"),
        }
    }
}

impl std::error::Error for SoundError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SoundError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for SoundError {
    fn from(err: io::Error) -> Self {
        SoundError::Io(err)
    }
}

/// hound读不满缓冲区时报告的错误文本（ErrorKind::Other）
const HOUND_SHORT_READ: &str = "Failed to read enough bytes.";

/// 已打开资源上的短读：数据被截断，而不是读取失败
fn is_short_read(err: &io::Error) -> bool {
    match err.kind() {
        io::ErrorKind::UnexpectedEof => true,
        io::ErrorKind::Other => err.to_string() == HOUND_SHORT_READ,
        _ => false,
    }
}

impl From<hound::Error> for SoundError {
    fn from(err: hound::Error) -> Self {
        match err {
            // 字节已解析到但头部被截断：属于格式问题，而非资源访问失败
            hound::Error::IoError(e) if is_short_read(&e) => {
                SoundError::UnsupportedAudioFile(format!("WAV数据被截断: {e}"))
            }
            hound::Error::IoError(e) => SoundError::Io(e),
            other => SoundError::UnsupportedAudioFile(format!("WAV解码错误: {other}")),
        }
    }
}

impl From<midly::Error> for SoundError {
    fn from(err: midly::Error) -> Self {
        SoundError::InvalidMidiData(format!("SMF解析错误: {err}"))
    }
}

/// 资源读取操作的标准Result类型
pub type SoundResult<T> = Result<T, SoundError>;

// ==================== 错误转换Helper函数 ====================

/// 创建音频格式错误的helper函数
#[inline]
pub fn unsupported_audio<E: fmt::Display>(context: &str, err: E) -> SoundError {
    SoundError::UnsupportedAudioFile(format!("{context}: {err}"))
}

/// 创建MIDI数据错误的helper函数
#[inline]
pub fn invalid_midi<E: fmt::Display>(context: &str, err: E) -> SoundError {
    SoundError::InvalidMidiData(format!("{context}: {err}"))
}

/// 创建资源未找到错误的helper函数
#[inline]
pub fn resource_not_found(name: &str, loader: impl fmt::Display) -> SoundError {
    SoundError::ResourceNotFound {
        name: name.to_string(),
        loader: loader.to_string(),
    }
}

// ==================== 回退标签 ====================

/// 回退循环对错误的处置标签
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum Recovery {
    /// 格式类：可以尝试下一个提供者
    Recoverable,
    /// I/O类（及配置错误）：立即中止整个解析
    Fatal,
}

impl SoundError {
    /// 回退循环据此决定继续还是中止
    pub fn recovery(&self) -> Recovery {
        match self.category() {
            ErrorCategory::Format => Recovery::Recoverable,
            ErrorCategory::Io | ErrorCategory::Config => Recovery::Fatal,
        }
    }

    /// 是否为格式类错误
    #[inline]
    pub fn is_format_kind(&self) -> bool {
        self.category() == ErrorCategory::Format
    }

    /// 是否为I/O类错误
    #[inline]
    pub fn is_io_kind(&self) -> bool {
        self.category() == ErrorCategory::Io
    }

    /// 错误类别
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_sound_error(self)
    }

    /// 门面在提供者耗尽时合成的失败
    pub fn no_provider(capability: Capability) -> Self {
        SoundError::NoProvider { capability }
    }
}

// ==================== 错误分类系统 ====================

/// 错误类别枚举（用于CLI退出码和建议）
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum ErrorCategory {
    /// 格式相关错误（不支持的格式、数据损坏、无提供者）
    Format,
    /// I/O相关错误（资源不存在、读取失败）
    Io,
    /// 配置相关错误（服务清单）
    Config,
}

impl ErrorCategory {
    /// 从SoundError提取错误类别
    pub fn from_sound_error(e: &SoundError) -> Self {
        match e {
            SoundError::UnsupportedAudioFile(_)
            | SoundError::InvalidMidiData(_)
            | SoundError::NoProvider { .. } => Self::Format,
            SoundError::ResourceNotFound { .. } | SoundError::Io(_) => Self::Io,
            SoundError::Config(_) => Self::Config,
        }
    }

    /// 获取错误类别的显示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Format => "格式错误",
            Self::Io => "I/O错误",
            Self::Config => "配置错误",
        }
    }
}
