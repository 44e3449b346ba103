//! 默认平台音频读取器
//!
//! 打开资源后转交给symphonia平台子系统。

use super::format::AudioFileFormat;
use super::spi::AudioResourceReader;
use super::stream::AudioInputStream;
use super::system;
use crate::error::SoundResult;
use crate::registry::{PLATFORM_PROVIDER, Provider};
use crate::resource::{self, LoaderContext};

/// 基于symphonia的默认音频读取器
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformAudioResourceReader;

impl Provider for PlatformAudioResourceReader {
    fn name(&self) -> &str {
        PLATFORM_PROVIDER
    }
}

impl AudioResourceReader for PlatformAudioResourceReader {
    fn audio_file_format(
        &self,
        context: &dyn LoaderContext,
        name: &str,
    ) -> SoundResult<AudioFileFormat> {
        let resource = resource::open_required(context, name)?;
        system::audio_file_format(resource)
    }

    fn audio_input_stream(
        &self,
        context: &dyn LoaderContext,
        name: &str,
    ) -> SoundResult<AudioInputStream> {
        let resource = resource::open_required(context, name)?;
        system::audio_input_stream(resource)
    }
}
