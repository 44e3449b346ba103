//! 音频资源加载门面

use super::format::AudioFileFormat;
use super::stream::AudioInputStream;
use crate::error::{Capability, SoundResult};
use crate::registry::ProviderRegistry;
use crate::resolve;
use crate::resource::LoaderContext;
use std::sync::Arc;

/// 从资源加载音频的门面
///
/// 每次调用都重新获取提供者快照并从头尝试，调用之间不共享任何状态。
#[derive(Clone)]
pub struct AudioResourceLoader {
    registry: Arc<ProviderRegistry>,
}

impl AudioResourceLoader {
    /// 使用给定的提供者注册表
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    /// 使用平台默认提供者
    pub fn with_platform_defaults() -> Self {
        Self::new(Arc::new(ProviderRegistry::platform()))
    }

    /// 提供者注册表
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// 获取资源的音频文件格式
    ///
    /// # 错误
    ///
    /// - I/O类（如资源不存在）：首个遇到时立即返回，不再尝试后续提供者
    /// - 所有提供者都不支持：`NoProvider`（"file is not a supported file type"）
    pub fn audio_file_format(
        &self,
        context: &dyn LoaderContext,
        name: &str,
    ) -> SoundResult<AudioFileFormat> {
        resolve::first_success(
            Capability::AudioFileFormat,
            &self.registry.audio_readers(),
            |reader| reader.audio_file_format(context, name),
        )
    }

    /// 从资源创建音频输入流
    ///
    /// 失败语义同 [`audio_file_format`](Self::audio_file_format)。
    pub fn audio_input_stream(
        &self,
        context: &dyn LoaderContext,
        name: &str,
    ) -> SoundResult<AudioInputStream> {
        resolve::first_success(
            Capability::AudioInputStream,
            &self.registry.audio_readers(),
            |reader| reader.audio_input_stream(context, name),
        )
    }
}

impl Default for AudioResourceLoader {
    fn default() -> Self {
        Self::with_platform_defaults()
    }
}
