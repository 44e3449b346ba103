//! 音频资源读取器接口

use super::format::AudioFileFormat;
use super::stream::AudioInputStream;
use crate::error::SoundResult;
use crate::registry::Provider;
use crate::resource::LoaderContext;

/// 音频资源读取服务提供者
///
/// 实现者能从一种或多种音频资源中解析格式信息，并创建音频输入流。
///
/// # 失败约定
///
/// - 资源无法打开：返回I/O类错误（如 `ResourceNotFound`），门面立即中止
/// - 资源不是本提供者支持的格式或已损坏：返回 `UnsupportedAudioFile`，
///   门面继续尝试下一个提供者
pub trait AudioResourceReader: Provider {
    /// 获取资源的音频文件格式
    fn audio_file_format(
        &self,
        context: &dyn LoaderContext,
        name: &str,
    ) -> SoundResult<AudioFileFormat>;

    /// 从资源创建音频输入流（底层流的所有权移交给调用方）
    fn audio_input_stream(
        &self,
        context: &dyn LoaderContext,
        name: &str,
    ) -> SoundResult<AudioInputStream>;
}
