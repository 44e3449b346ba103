//! WAV快速路径读取器
//!
//! 使用hound直接解析RIFF/WAVE，不是WAV的资源交回门面，由后续提供者（symphonia）处理。

use super::format::{AudioFileFormat, AudioFileType, AudioFormat, Encoding};
use super::spi::AudioResourceReader;
use super::stream::{AudioInputStream, SampleSource};
use crate::error::{self, SoundResult};
use crate::registry::{Provider, WAV_PROVIDER};
use crate::resource::{self, LoaderContext, Resource};
use hound::{SampleFormat, WavReader, WavSpec};
use std::io::BufReader;

/// 每次读取的帧数
const CHUNK_FRAMES: usize = 4096;

type ResourceWavReader = WavReader<BufReader<Resource>>;

/// hound WAV读取器
#[derive(Debug, Clone, Copy, Default)]
pub struct WavAudioResourceReader;

impl WavAudioResourceReader {
    fn open(context: &dyn LoaderContext, name: &str) -> SoundResult<(ResourceWavReader, Option<u64>)> {
        let resource = resource::open_required(context, name)?;
        let byte_len = resource.byte_len();
        let reader = WavReader::new(BufReader::new(resource))?;
        check_supported(&reader.spec())?;
        Ok((reader, byte_len))
    }
}

impl Provider for WavAudioResourceReader {
    fn name(&self) -> &str {
        WAV_PROVIDER
    }
}

impl AudioResourceReader for WavAudioResourceReader {
    fn audio_file_format(
        &self,
        context: &dyn LoaderContext,
        name: &str,
    ) -> SoundResult<AudioFileFormat> {
        let (reader, byte_len) = Self::open(context, name)?;
        let format = describe(&reader.spec())?;
        Ok(AudioFileFormat::new(
            AudioFileType::Wave,
            format,
            byte_len,
            Some(reader.duration() as u64),
        ))
    }

    fn audio_input_stream(
        &self,
        context: &dyn LoaderContext,
        name: &str,
    ) -> SoundResult<AudioInputStream> {
        let (reader, _) = Self::open(context, name)?;
        let spec = reader.spec();
        let format = describe(&spec)?;
        let frames = reader.duration() as u64;
        Ok(AudioInputStream::new(
            format,
            Some(frames),
            Box::new(HoundSource { reader, spec }),
        ))
    }
}

/// hound可读取的样本布局
fn check_supported(spec: &WavSpec) -> SoundResult<()> {
    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) | (SampleFormat::Int, 1..=32) => Ok(()),
        (sample_format, bits) => Err(error::unsupported_audio(
            "不支持的WAV样本格式",
            format!("{sample_format:?} {bits}位"),
        )),
    }
}

fn describe(spec: &WavSpec) -> SoundResult<AudioFormat> {
    let encoding = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, _) => Encoding::PcmFloat,
        // WAV的8位PCM按规范是无符号的
        (SampleFormat::Int, 1..=8) => Encoding::PcmUnsigned,
        (SampleFormat::Int, _) => Encoding::PcmSigned,
    };
    let format = AudioFormat::pcm(
        encoding,
        spec.sample_rate,
        spec.bits_per_sample,
        spec.channels,
        false,
    );
    format.validate()?;
    Ok(format)
}

/// hound逐块读取的样本来源
struct HoundSource {
    reader: ResourceWavReader,
    spec: WavSpec,
}

impl HoundSource {
    fn read_scaled<S>(&mut self, scale: f64) -> SoundResult<Vec<f32>>
    where
        S: hound::Sample + Into<f64>,
    {
        let wanted = CHUNK_FRAMES * self.spec.channels as usize;
        let samples = self
            .reader
            .samples::<S>()
            .take(wanted)
            .map(|s| s.map(|v| (v.into() / scale) as f32))
            .collect::<Result<Vec<f32>, hound::Error>>()?;
        Ok(samples)
    }
}

impl SampleSource for HoundSource {
    fn next_chunk(&mut self) -> SoundResult<Option<Vec<f32>>> {
        let bits = self.spec.bits_per_sample;
        let full_scale = (1u64 << (bits.max(1) - 1)) as f64;

        let samples = match (self.spec.sample_format, bits) {
            (SampleFormat::Float, _) => self.read_scaled::<f32>(1.0)?,
            (SampleFormat::Int, 1..=8) => self.read_scaled::<i8>(full_scale)?,
            (SampleFormat::Int, 9..=16) => self.read_scaled::<i16>(full_scale)?,
            (SampleFormat::Int, _) => self.read_scaled::<i32>(full_scale)?,
        };

        if samples.is_empty() {
            Ok(None)
        } else {
            Ok(Some(samples))
        }
    }
}
