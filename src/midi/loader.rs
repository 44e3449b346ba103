//! MIDI资源加载门面

use super::format::MidiFileFormat;
use super::sequence::Sequence;
use super::soundbank::Soundbank;
use crate::error::{Capability, SoundResult};
use crate::registry::ProviderRegistry;
use crate::resolve;
use crate::resource::LoaderContext;
use std::sync::Arc;

/// 从资源加载MIDI文件格式、序列和音色库的门面
#[derive(Clone)]
pub struct MidiResourceLoader {
    registry: Arc<ProviderRegistry>,
}

impl MidiResourceLoader {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    /// 使用平台默认提供者
    pub fn with_platform_defaults() -> Self {
        Self::new(Arc::new(ProviderRegistry::platform()))
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// 获取资源的MIDI文件格式
    ///
    /// 全部提供者不支持时返回 `NoProvider`（"resource is not a supported file type"）。
    pub fn midi_file_format(
        &self,
        context: &dyn LoaderContext,
        name: &str,
    ) -> SoundResult<MidiFileFormat> {
        resolve::first_success(
            Capability::MidiFileFormat,
            &self.registry.midi_readers(),
            |reader| reader.midi_file_format(context, name),
        )
    }

    /// 从资源解析MIDI序列
    pub fn sequence(&self, context: &dyn LoaderContext, name: &str) -> SoundResult<Sequence> {
        resolve::first_success(
            Capability::Sequence,
            &self.registry.midi_readers(),
            |reader| reader.sequence(context, name),
        )
    }

    /// 从资源读取音色库
    ///
    /// 提供者返回 `Ok(None)` 时继续尝试下一个；任何错误都立即返回，
    /// 即使是格式类错误。
    pub fn soundbank(&self, context: &dyn LoaderContext, name: &str) -> SoundResult<Soundbank> {
        resolve::first_present(
            Capability::Soundbank,
            &self.registry.soundbank_readers(),
            |reader| reader.soundbank(context, name),
        )
    }
}

impl Default for MidiResourceLoader {
    fn default() -> Self {
        Self::with_platform_defaults()
    }
}
