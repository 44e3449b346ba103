//! MIDI与音色库读取器接口

use super::format::MidiFileFormat;
use super::sequence::Sequence;
use super::soundbank::Soundbank;
use crate::error::SoundResult;
use crate::registry::Provider;
use crate::resource::LoaderContext;

/// MIDI资源读取服务提供者
///
/// 失败约定与音频读取器相同：I/O类错误中止解析，
/// `InvalidMidiData` 让门面继续尝试下一个提供者。
pub trait MidiResourceReader: Provider {
    /// 获取资源的MIDI文件格式
    fn midi_file_format(
        &self,
        context: &dyn LoaderContext,
        name: &str,
    ) -> SoundResult<MidiFileFormat>;

    /// 从资源解析MIDI序列
    fn sequence(&self, context: &dyn LoaderContext, name: &str) -> SoundResult<Sequence>;
}

/// 音色库读取服务提供者
///
/// 与其他读取器不同，这里用返回值表达“不是我的格式”：
///
/// - `Ok(Some(_))` - 识别并读取成功
/// - `Ok(None)` - 不识别，门面继续尝试下一个提供者
/// - `Err(_)` - 任何错误（包括格式类）都让门面立即中止
pub trait SoundbankResourceReader: Provider {
    fn soundbank(
        &self,
        context: &dyn LoaderContext,
        name: &str,
    ) -> SoundResult<Option<Soundbank>>;
}
