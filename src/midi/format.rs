//! MIDI文件格式信息模块

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// 时间划分方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Division {
    /// 每四分音符tick数
    Ppq,
    /// SMPTE 24帧/秒
    Smpte24,
    /// SMPTE 25帧/秒
    Smpte25,
    /// SMPTE 29.97帧/秒（丢帧）
    Smpte30Drop,
    /// SMPTE 30帧/秒
    Smpte30,
}

impl Division {
    /// SMPTE帧率（PPQ为None）
    pub fn frames_per_second(&self) -> Option<f64> {
        match self {
            Division::Ppq => None,
            Division::Smpte24 => Some(24.0),
            Division::Smpte25 => Some(25.0),
            Division::Smpte30Drop => Some(29.97),
            Division::Smpte30 => Some(30.0),
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.frames_per_second() {
            None => f.write_str("PPQ"),
            Some(fps) => write!(f, "SMPTE {fps} fps"),
        }
    }
}

/// MIDI文件格式描述符
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MidiFileFormat {
    /// SMF类型（0: 单轨, 1: 多轨同步, 2: 多轨独立）
    pub file_type: u8,
    pub division: Division,
    /// PPQ时为每四分音符tick数；SMPTE时为每帧tick数
    pub resolution: u16,
    /// 文件总字节数（未知时为None）
    pub byte_length: Option<u64>,
    /// 总时长（微秒，未知时为None）
    pub microsecond_length: Option<u64>,
    /// 附加属性（如曲名、版权）
    pub properties: BTreeMap<String, String>,
}

impl MidiFileFormat {
    /// 创建MIDI文件格式描述符
    pub fn new(
        file_type: u8,
        division: Division,
        resolution: u16,
        byte_length: Option<u64>,
        microsecond_length: Option<u64>,
    ) -> Self {
        Self {
            file_type,
            division,
            resolution,
            byte_length,
            microsecond_length,
            properties: BTreeMap::new(),
        }
    }

    /// 获取持续时长（秒）
    pub fn duration_seconds(&self) -> Option<f64> {
        self.microsecond_length.map(|us| us as f64 / 1_000_000.0)
    }
}

impl fmt::Display for MidiFileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SMF type {}, {} resolution {}",
            self.file_type, self.division, self.resolution
        )?;
        if let Some(us) = self.microsecond_length {
            write!(f, ", {us} us")?;
        }
        if let Some(len) = self.byte_length {
            write!(f, ", {len} bytes")?;
        }
        Ok(())
    }
}
