//! 音频格式信息模块
//!
//! 定义提供者返回的不可变格式描述符

use crate::error::{self, SoundResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// 容器文件类型
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFileType {
    Wave,
    Aiff,
    Au,
    Caf,
    Flac,
    Mp3,
    Ogg,
    Mp4,
    Matroska,
    /// 其他容器（携带编解码器或扩展名）
    Other(String),
}

impl AudioFileType {
    /// 根据扩展名推断
    pub fn from_extension(ext: &str) -> Option<Self> {
        let file_type = match ext.to_ascii_lowercase().as_str() {
            "wav" | "wave" => Self::Wave,
            "aif" | "aiff" | "aifc" => Self::Aiff,
            "au" | "snd" => Self::Au,
            "caf" => Self::Caf,
            "flac" => Self::Flac,
            "mp3" | "mp2" | "mp1" => Self::Mp3,
            "ogg" | "oga" | "opus" => Self::Ogg,
            "m4a" | "mp4" | "aac" | "alac" => Self::Mp4,
            "mkv" | "mka" | "webm" => Self::Matroska,
            _ => return None,
        };
        Some(file_type)
    }

    /// 根据文件头魔数推断（至少需要12字节才能识别RIFF/FORM/ftyp）
    pub fn sniff(header: &[u8]) -> Option<Self> {
        let tag = |range: std::ops::Range<usize>| header.get(range);

        match tag(0..4)? {
            b"RIFF" | b"RF64" if matches!(tag(8..12), Some(b"WAVE")) => Some(Self::Wave),
            b"FORM" if matches!(tag(8..12), Some(b"AIFF") | Some(b"AIFC")) => Some(Self::Aiff),
            b".snd" => Some(Self::Au),
            b"caff" => Some(Self::Caf),
            b"fLaC" => Some(Self::Flac),
            b"OggS" => Some(Self::Ogg),
            [0x1A, 0x45, 0xDF, 0xA3] => Some(Self::Matroska),
            [b'I', b'D', b'3', _] => Some(Self::Mp3),
            [0xFF, b, _, _] if b & 0xE0 == 0xE0 => Some(Self::Mp3),
            _ if matches!(tag(4..8), Some(b"ftyp")) => Some(Self::Mp4),
            _ => None,
        }
    }

    /// 常用扩展名
    pub fn extension(&self) -> &str {
        match self {
            Self::Wave => "wav",
            Self::Aiff => "aiff",
            Self::Au => "au",
            Self::Caf => "caf",
            Self::Flac => "flac",
            Self::Mp3 => "mp3",
            Self::Ogg => "ogg",
            Self::Mp4 => "m4a",
            Self::Matroska => "mka",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for AudioFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(name) => write!(f, "{name}"),
            known => f.write_str(&known.extension().to_uppercase()),
        }
    }
}

/// 样本编码
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    PcmSigned,
    PcmUnsigned,
    PcmFloat,
    ALaw,
    ULaw,
    /// 压缩编码（携带编解码器短名）
    Compressed(String),
}

impl Encoding {
    /// 是否为线性PCM
    pub fn is_pcm(&self) -> bool {
        matches!(self, Self::PcmSigned | Self::PcmUnsigned | Self::PcmFloat)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PcmSigned => f.write_str("PCM_SIGNED"),
            Self::PcmUnsigned => f.write_str("PCM_UNSIGNED"),
            Self::PcmFloat => f.write_str("PCM_FLOAT"),
            Self::ALaw => f.write_str("ALAW"),
            Self::ULaw => f.write_str("ULAW"),
            Self::Compressed(codec) => write!(f, "{}", codec.to_uppercase()),
        }
    }
}

/// 样本布局描述
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioFormat {
    pub encoding: Encoding,
    pub sample_rate: u32,
    /// 源位深度（压缩格式可能未知）
    pub sample_size_in_bits: Option<u16>,
    pub channels: u16,
    /// 每帧字节数（压缩格式为None）
    pub frame_size: Option<u32>,
    pub frame_rate: u32,
    pub big_endian: bool,
}

impl AudioFormat {
    /// 线性PCM（及A-law/μ-law）格式
    pub fn pcm(
        encoding: Encoding,
        sample_rate: u32,
        sample_size_in_bits: u16,
        channels: u16,
        big_endian: bool,
    ) -> Self {
        let bytes_per_sample = (sample_size_in_bits as u32).div_ceil(8);
        Self {
            encoding,
            sample_rate,
            sample_size_in_bits: Some(sample_size_in_bits),
            channels,
            frame_size: Some(bytes_per_sample * channels as u32),
            frame_rate: sample_rate,
            big_endian,
        }
    }

    /// 压缩格式
    pub fn compressed(
        codec: impl Into<String>,
        sample_rate: u32,
        sample_size_in_bits: Option<u16>,
        channels: u16,
    ) -> Self {
        Self {
            encoding: Encoding::Compressed(codec.into()),
            sample_rate,
            sample_size_in_bits,
            channels,
            frame_size: None,
            frame_rate: sample_rate,
            big_endian: false,
        }
    }

    /// 解码输出格式：交错 f32，本机字节序
    pub fn decoded_f32(sample_rate: u32, channels: u16) -> Self {
        Self::pcm(
            Encoding::PcmFloat,
            sample_rate,
            32,
            channels,
            cfg!(target_endian = "big"),
        )
    }

    /// 验证格式参数的有效性
    pub fn validate(&self) -> SoundResult<()> {
        if self.sample_rate == 0 {
            return Err(error::unsupported_audio("采样率不能为0", self));
        }
        if self.channels == 0 {
            return Err(error::unsupported_audio("声道数不能为0", self));
        }
        Ok(())
    }

    /// 获取声道数（usize类型）
    pub fn channels_usize(&self) -> usize {
        self.channels as usize
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} Hz, ", self.encoding, self.sample_rate)?;
        match self.sample_size_in_bits {
            Some(bits) => write!(f, "{bits} bit, ")?,
            None => f.write_str("unknown bits per sample, ")?,
        }
        match self.channels {
            1 => f.write_str("mono")?,
            2 => f.write_str("stereo")?,
            n => write!(f, "{n} channels")?,
        }
        if let Some(frame_size) = self.frame_size {
            write!(f, ", {frame_size} bytes/frame")?;
            if self.sample_size_in_bits.is_some_and(|b| b > 8) {
                f.write_str(if self.big_endian {
                    ", big-endian"
                } else {
                    ", little-endian"
                })?;
            }
        }
        Ok(())
    }
}

/// 音频文件格式描述符
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioFileFormat {
    pub file_type: AudioFileType,
    /// 文件总字节数（未知时为None）
    pub byte_length: Option<u64>,
    pub format: AudioFormat,
    /// 总帧数（未知时为None）
    pub frame_length: Option<u64>,
    /// 元数据标签
    pub properties: BTreeMap<String, String>,
}

impl AudioFileFormat {
    /// 创建文件格式描述符
    pub fn new(
        file_type: AudioFileType,
        format: AudioFormat,
        byte_length: Option<u64>,
        frame_length: Option<u64>,
    ) -> Self {
        Self {
            file_type,
            byte_length,
            format,
            frame_length,
            properties: BTreeMap::new(),
        }
    }

    /// 附加一个元数据属性
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// 获取持续时长（秒），帧数或采样率未知时为None
    pub fn duration_seconds(&self) -> Option<f64> {
        let frames = self.frame_length?;
        if self.format.frame_rate == 0 {
            return None;
        }
        Some(frames as f64 / self.format.frame_rate as f64)
    }
}

impl fmt::Display for AudioFileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.file_type)?;
        match self.byte_length {
            Some(len) => write!(f, "({len} bytes) ")?,
            None => f.write_str("(unknown length) ")?,
        }
        write!(f, "file, data format: {}", self.format)?;
        if let Some(frames) = self.frame_length {
            write!(f, ", frame length: {frames}")?;
        }
        Ok(())
    }
}
