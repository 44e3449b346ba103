//! 音色库模块

use crate::sampled::AudioFormat;
use rustysynth::SoundFont;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// 乐器信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstrumentInfo {
    pub name: String,
    pub bank: u32,
    pub program: u32,
}

/// 音色库描述信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SoundbankInfo {
    pub name: String,
    pub vendor: String,
    pub description: String,
    pub version: String,
    pub instruments: Vec<InstrumentInfo>,
}

/// 单个音频采样构成的音色库数据
#[derive(Debug, Clone)]
pub struct SampleBank {
    /// 原始（解码前）音频格式
    pub format: AudioFormat,
    /// 解码后的交错f32样本
    pub samples: Vec<f32>,
}

impl SampleBank {
    pub fn frames(&self) -> usize {
        let channels = self.format.channels_usize().max(1);
        self.samples.len() / channels
    }
}

/// 音色库的底层数据
#[derive(Clone)]
pub enum SoundbankData {
    /// SoundFont 2音色库
    SoundFont(Arc<SoundFont>),
    /// 音频采样音色库
    Sample(Arc<SampleBank>),
}

impl SoundbankData {
    pub fn kind(&self) -> &'static str {
        match self {
            SoundbankData::SoundFont(_) => "soundfont",
            SoundbankData::Sample(_) => "sample",
        }
    }
}

impl fmt::Debug for SoundbankData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundbankData::SoundFont(sf) => f
                .debug_struct("SoundFont")
                .field("presets", &sf.get_presets().len())
                .field("instruments", &sf.get_instruments().len())
                .finish(),
            SoundbankData::Sample(bank) => f
                .debug_struct("Sample")
                .field("format", &bank.format)
                .field("frames", &bank.frames())
                .finish(),
        }
    }
}

/// 音色库
#[derive(Debug, Clone)]
pub struct Soundbank {
    info: SoundbankInfo,
    data: SoundbankData,
}

impl Soundbank {
    pub fn new(info: SoundbankInfo, data: SoundbankData) -> Self {
        Self { info, data }
    }

    pub fn info(&self) -> &SoundbankInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn vendor(&self) -> &str {
        &self.info.vendor
    }

    pub fn description(&self) -> &str {
        &self.info.description
    }

    pub fn version(&self) -> &str {
        &self.info.version
    }

    pub fn instruments(&self) -> &[InstrumentInfo] {
        &self.info.instruments
    }

    pub fn data(&self) -> &SoundbankData {
        &self.data
    }

    /// 底层SoundFont（音频采样音色库为None）
    pub fn sound_font(&self) -> Option<&Arc<SoundFont>> {
        match &self.data {
            SoundbankData::SoundFont(sf) => Some(sf),
            SoundbankData::Sample(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampled::Encoding;

    #[test]
    fn test_sample_bank_accessors() {
        let format = AudioFormat::pcm(Encoding::PcmSigned, 8000, 16, 2, false);
        let bank = SampleBank {
            format,
            samples: vec![0.0; 20],
        };
        assert_eq!(bank.frames(), 10);

        let soundbank = Soundbank::new(
            SoundbankInfo {
                name: "tone".to_string(),
                instruments: vec![InstrumentInfo {
                    name: "tone".to_string(),
                    bank: 0,
                    program: 0,
                }],
                ..Default::default()
            },
            SoundbankData::Sample(Arc::new(bank)),
        );
        assert_eq!(soundbank.name(), "tone");
        assert_eq!(soundbank.instruments().len(), 1);
        assert_eq!(soundbank.data().kind(), "sample");
        assert!(soundbank.sound_font().is_none());
    }
}
