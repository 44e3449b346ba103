//! 默认平台MIDI与音色库读取器
//!
//! 读取类操作：一次性读入全部字节后立即释放底层流，再交给平台子系统解析。

use super::format::MidiFileFormat;
use super::sequence::Sequence;
use super::soundbank::Soundbank;
use super::spi::{MidiResourceReader, SoundbankResourceReader};
use super::system;
use crate::error::SoundResult;
use crate::registry::{PLATFORM_PROVIDER, Provider};
use crate::resource::{self, LoaderContext};

/// 打开并读入资源的全部字节
fn read_bytes(context: &dyn LoaderContext, name: &str) -> SoundResult<(Vec<u8>, Option<u64>)> {
    let resource = resource::open_required(context, name)?;
    let byte_len = resource.byte_len();
    let bytes = resource.read_all()?;
    let read_len = bytes.len() as u64;
    Ok((bytes, byte_len.or(Some(read_len))))
}

/// 基于midly的默认MIDI读取器
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformMidiResourceReader;

impl Provider for PlatformMidiResourceReader {
    fn name(&self) -> &str {
        PLATFORM_PROVIDER
    }
}

impl MidiResourceReader for PlatformMidiResourceReader {
    fn midi_file_format(
        &self,
        context: &dyn LoaderContext,
        name: &str,
    ) -> SoundResult<MidiFileFormat> {
        let (bytes, byte_len) = read_bytes(context, name)?;
        system::midi_file_format(&bytes, byte_len)
    }

    fn sequence(&self, context: &dyn LoaderContext, name: &str) -> SoundResult<Sequence> {
        let (bytes, _) = read_bytes(context, name)?;
        system::sequence(&bytes)
    }
}

/// 默认音色库读取器
///
/// 先尝试SoundFont 2，再尝试音频采样；两者都不识别时返回 `InvalidMidiData`
/// 错误，而不是 `Ok(None)`。
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformSoundbankResourceReader;

impl Provider for PlatformSoundbankResourceReader {
    fn name(&self) -> &str {
        PLATFORM_PROVIDER
    }
}

impl SoundbankResourceReader for PlatformSoundbankResourceReader {
    fn soundbank(
        &self,
        context: &dyn LoaderContext,
        name: &str,
    ) -> SoundResult<Option<Soundbank>> {
        let (bytes, _) = read_bytes(context, name)?;
        system::soundbank(bytes, name).map(Some)
    }
}
