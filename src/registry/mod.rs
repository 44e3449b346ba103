//! 服务提供者注册表
//!
//! 按能力分组保存提供者，保持注册顺序。门面每次调用都通过
//! `*_readers()` 取得一份新的快照，注册表本身在构建后不可变。

pub mod manifest;

pub use manifest::ServiceManifest;

use crate::error::{self, SoundResult};
use crate::midi::{
    MidiResourceReader, PlatformMidiResourceReader, PlatformSoundbankResourceReader,
    SoundbankResourceReader,
};
use crate::sampled::{AudioResourceReader, PlatformAudioResourceReader, WavAudioResourceReader};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// hound WAV快速路径提供者名
pub const WAV_PROVIDER: &str = "wav";

/// 平台默认提供者名（symphonia / midly / rustysynth）
pub const PLATFORM_PROVIDER: &str = "platform";

/// 所有服务提供者的公共能力
pub trait Provider: Send + Sync {
    /// 提供者名（用于日志和服务清单）
    fn name(&self) -> &str;
}

/// 提供者种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Audio,
    Midi,
    Soundbank,
}

impl ProviderKind {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Audio => "audio",
            ProviderKind::Midi => "midi",
            ProviderKind::Soundbank => "soundbank",
        }
    }

    /// 内置提供者目录中该种类可用的名字
    pub fn builtin_names(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::Audio => &[WAV_PROVIDER, PLATFORM_PROVIDER],
            ProviderKind::Midi | ProviderKind::Soundbank => &[PLATFORM_PROVIDER],
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 注册表条目（用于展示）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEntry {
    pub kind: ProviderKind,
    /// 尝试顺序（从0开始）
    pub position: usize,
    pub name: String,
}

/// 服务提供者注册表
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    audio: Vec<Arc<dyn AudioResourceReader>>,
    midi: Vec<Arc<dyn MidiResourceReader>>,
    soundbank: Vec<Arc<dyn SoundbankResourceReader>>,
}

impl ProviderRegistry {
    /// 空注册表：所有能力都会以 `NoProvider` 失败
    pub fn empty() -> Self {
        Self::default()
    }

    /// 平台默认注册表
    ///
    /// - audio: wav → platform
    /// - midi: platform
    /// - soundbank: platform
    pub fn platform() -> Self {
        Self::builder()
            .audio_reader(Arc::new(WavAudioResourceReader))
            .audio_reader(Arc::new(PlatformAudioResourceReader))
            .midi_reader(Arc::new(PlatformMidiResourceReader))
            .soundbank_reader(Arc::new(PlatformSoundbankResourceReader))
            .build()
    }

    pub fn builder() -> ProviderRegistryBuilder {
        ProviderRegistryBuilder::default()
    }

    /// 按服务清单从内置目录构建注册表
    ///
    /// 未知的提供者名返回 `Config` 错误；同一种类中重复的名字只保留第一次出现。
    pub fn from_manifest(manifest: &ServiceManifest) -> SoundResult<Self> {
        let mut builder = Self::builder();

        for name in dedup(ProviderKind::Audio, &manifest.audio) {
            builder = match name {
                WAV_PROVIDER => builder.audio_reader(Arc::new(WavAudioResourceReader)),
                PLATFORM_PROVIDER => builder.audio_reader(Arc::new(PlatformAudioResourceReader)),
                other => return Err(unknown_provider(ProviderKind::Audio, other)),
            };
        }
        for name in dedup(ProviderKind::Midi, &manifest.midi) {
            builder = match name {
                PLATFORM_PROVIDER => builder.midi_reader(Arc::new(PlatformMidiResourceReader)),
                other => return Err(unknown_provider(ProviderKind::Midi, other)),
            };
        }
        for name in dedup(ProviderKind::Soundbank, &manifest.soundbank) {
            builder = match name {
                PLATFORM_PROVIDER => {
                    builder.soundbank_reader(Arc::new(PlatformSoundbankResourceReader))
                }
                other => return Err(unknown_provider(ProviderKind::Soundbank, other)),
            };
        }

        Ok(builder.build())
    }

    /// 音频读取器快照（注册顺序）
    pub fn audio_readers(&self) -> Vec<Arc<dyn AudioResourceReader>> {
        self.audio.clone()
    }

    /// MIDI读取器快照（注册顺序）
    pub fn midi_readers(&self) -> Vec<Arc<dyn MidiResourceReader>> {
        self.midi.clone()
    }

    /// 音色库读取器快照（注册顺序）
    pub fn soundbank_readers(&self) -> Vec<Arc<dyn SoundbankResourceReader>> {
        self.soundbank.clone()
    }

    /// 全部条目，按种类和尝试顺序排列
    pub fn entries(&self) -> Vec<ProviderEntry> {
        fn collect<P: Provider + ?Sized>(
            kind: ProviderKind,
            providers: &[Arc<P>],
        ) -> impl Iterator<Item = ProviderEntry> + '_ {
            providers
                .iter()
                .enumerate()
                .map(move |(position, p)| ProviderEntry {
                    kind,
                    position,
                    name: p.name().to_string(),
                })
        }

        collect(ProviderKind::Audio, &self.audio)
            .chain(collect(ProviderKind::Midi, &self.midi))
            .chain(collect(ProviderKind::Soundbank, &self.soundbank))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.audio.is_empty() && self.midi.is_empty() && self.soundbank.is_empty()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn names<P: Provider + ?Sized>(providers: &[Arc<P>]) -> Vec<&str> {
            providers.iter().map(|p| p.name()).collect()
        }
        f.debug_struct("ProviderRegistry")
            .field("audio", &names(&self.audio))
            .field("midi", &names(&self.midi))
            .field("soundbank", &names(&self.soundbank))
            .finish()
    }
}

fn dedup(kind: ProviderKind, names: &[String]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim();
        if seen.contains(&name) {
            debug!(%kind, provider = name, "duplicate provider in manifest, skipped");
            continue;
        }
        seen.push(name);
    }
    seen
}

fn unknown_provider(kind: ProviderKind, name: &str) -> error::SoundError {
    error::SoundError::Config(format!(
        "未知的{kind}提供者 \"{name}\" (unknown {kind} provider; available: {})",
        kind.builtin_names().join(", ")
    ))
}

/// 注册表构建器
#[derive(Default)]
pub struct ProviderRegistryBuilder {
    registry: ProviderRegistry,
}

impl ProviderRegistryBuilder {
    /// 追加音频读取器（排在已注册者之后）
    pub fn audio_reader(mut self, reader: Arc<dyn AudioResourceReader>) -> Self {
        self.registry.audio.push(reader);
        self
    }

    pub fn midi_reader(mut self, reader: Arc<dyn MidiResourceReader>) -> Self {
        self.registry.midi.push(reader);
        self
    }

    pub fn soundbank_reader(mut self, reader: Arc<dyn SoundbankResourceReader>) -> Self {
        self.registry.soundbank.push(reader);
        self
    }

    pub fn build(self) -> ProviderRegistry {
        self.registry
    }
}
