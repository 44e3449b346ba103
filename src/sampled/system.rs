//! 平台音频子系统
//!
//! 基于symphonia的格式探测与流式解码。默认提供者把已打开的资源转交到这里。

use super::error_handling::{handle_packet_error, map_symphonia_error};
use super::format::{AudioFileFormat, AudioFileType, AudioFormat, Encoding};
use super::stream::{AudioInputStream, SampleSource};
use crate::error::{self, SoundResult};
use crate::resource::Resource;
use std::collections::BTreeMap;
use std::io::{Read, Seek, SeekFrom};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{self, CodecParameters, CodecType, Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::{MetadataOptions, MetadataRevision};
use symphonia::core::probe::Hint;

/// 探测魔数时读取的头部字节数
const HEADER_SNIFF_BYTES: u64 = 16;

impl MediaSource for Resource {
    fn is_seekable(&self) -> bool {
        true
    }

    fn byte_len(&self) -> Option<u64> {
        Resource::byte_len(self)
    }
}

/// 探测完成、已定位到默认音轨的资源
struct ProbedResource {
    reader: Box<dyn FormatReader>,
    track_id: u32,
    params: CodecParameters,
    file_type: AudioFileType,
    byte_len: Option<u64>,
    properties: BTreeMap<String, String>,
}

/// 获取音频文件格式（读取后释放资源）
pub fn audio_file_format(resource: Resource) -> SoundResult<AudioFileFormat> {
    let probed = probe(resource)?;
    let format = describe_format(&probed.params)?;

    let mut file_format = AudioFileFormat::new(
        probed.file_type,
        format,
        probed.byte_len,
        probed.params.n_frames,
    );
    file_format.properties = probed.properties;
    Ok(file_format)
}

/// 创建音频输入流（资源所有权移交给返回的流）
pub fn audio_input_stream(resource: Resource) -> SoundResult<AudioInputStream> {
    let probed = probe(resource)?;
    let format = describe_format(&probed.params)?;

    let decoder = symphonia::default::get_codecs()
        .make(&probed.params, &DecoderOptions::default())
        .map_err(|e| map_symphonia_error("创建解码器失败 / decoder creation failed", e))?;

    let source = SymphoniaSource {
        reader: probed.reader,
        decoder,
        track_id: probed.track_id,
        skipped_packets: 0,
    };

    Ok(AudioInputStream::new(
        format,
        probed.params.n_frames,
        Box::new(source),
    ))
}

/// 完整解码资源（适用于小文件，如音色库采样）
pub fn decode_all(resource: Resource) -> SoundResult<(AudioFormat, Vec<f32>)> {
    let mut stream = audio_input_stream(resource)?;
    let samples = stream.read_to_end()?;
    if samples.is_empty() {
        return Err(error::unsupported_audio(
            "未解码到任何样本",
            "no samples decoded",
        ));
    }
    Ok((stream.source_format().clone(), samples))
}

fn probe(mut resource: Resource) -> SoundResult<ProbedResource> {
    let header = read_header(&mut resource)?;
    let byte_len = resource.byte_len();
    let extension = resource.extension();

    let mut hint = Hint::new();
    if let Some(ext) = &extension {
        hint.with_extension(ext);
    }

    let mss = MediaSourceStream::new(Box::new(resource), Default::default());
    let mut probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| map_symphonia_error("格式探测失败 / probe failed", e))?;

    let mut properties = BTreeMap::new();
    if let Some(metadata) = probed.metadata.get()
        && let Some(revision) = metadata.current()
    {
        collect_tags(revision, &mut properties);
    }

    let mut reader = probed.format;
    {
        let metadata = reader.metadata();
        if let Some(revision) = metadata.current() {
            collect_tags(revision, &mut properties);
        }
    }

    let track = reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| error::unsupported_audio("未找到音频轨道", "no audio track"))?;
    let track_id = track.id;
    let params = track.codec_params.clone();

    let file_type = AudioFileType::sniff(&header)
        .or_else(|| extension.as_deref().and_then(AudioFileType::from_extension))
        .unwrap_or_else(|| AudioFileType::Other(codec_short_name(params.codec).to_string()));

    Ok(ProbedResource {
        reader,
        track_id,
        params,
        file_type,
        byte_len,
        properties,
    })
}

/// 读取文件头用于魔数识别，然后回到开头
fn read_header(resource: &mut Resource) -> SoundResult<Vec<u8>> {
    let mut header = Vec::with_capacity(HEADER_SNIFF_BYTES as usize);
    resource
        .by_ref()
        .take(HEADER_SNIFF_BYTES)
        .read_to_end(&mut header)?;
    resource.seek(SeekFrom::Start(0))?;
    Ok(header)
}

fn collect_tags(revision: &MetadataRevision, properties: &mut BTreeMap<String, String>) {
    for tag in revision.tags() {
        let key = match &tag.std_key {
            Some(std_key) => format!("{std_key:?}").to_lowercase(),
            None => tag.key.clone(),
        };
        properties
            .entry(key)
            .or_insert_with(|| tag.value.to_string());
    }
}

fn codec_short_name(codec: CodecType) -> &'static str {
    symphonia::default::get_codecs()
        .get_codec(codec)
        .map(|descriptor| descriptor.short_name)
        .unwrap_or("unknown")
}

/// 由编解码参数构造格式描述
fn describe_format(params: &CodecParameters) -> SoundResult<AudioFormat> {
    let sample_rate = params
        .sample_rate
        .ok_or_else(|| error::unsupported_audio("无法获取采样率", "unknown sample rate"))?;
    let channels = params
        .channels
        .map(|ch| ch.count() as u16)
        .ok_or_else(|| error::unsupported_audio("无法获取声道数信息", "unknown channel layout"))?;
    let bits = detect_bit_depth(params);

    let pcm = |encoding: Encoding, default_bits: u16, big_endian: bool| {
        AudioFormat::pcm(
            encoding,
            sample_rate,
            bits.unwrap_or(default_bits),
            channels,
            big_endian,
        )
    };

    let format = match params.codec {
        codecs::CODEC_TYPE_PCM_S8 => pcm(Encoding::PcmSigned, 8, false),
        codecs::CODEC_TYPE_PCM_S16LE => pcm(Encoding::PcmSigned, 16, false),
        codecs::CODEC_TYPE_PCM_S24LE => pcm(Encoding::PcmSigned, 24, false),
        codecs::CODEC_TYPE_PCM_S32LE => pcm(Encoding::PcmSigned, 32, false),
        codecs::CODEC_TYPE_PCM_S16BE => pcm(Encoding::PcmSigned, 16, true),
        codecs::CODEC_TYPE_PCM_S24BE => pcm(Encoding::PcmSigned, 24, true),
        codecs::CODEC_TYPE_PCM_S32BE => pcm(Encoding::PcmSigned, 32, true),
        codecs::CODEC_TYPE_PCM_U8 => pcm(Encoding::PcmUnsigned, 8, false),
        codecs::CODEC_TYPE_PCM_U16LE => pcm(Encoding::PcmUnsigned, 16, false),
        codecs::CODEC_TYPE_PCM_U24LE => pcm(Encoding::PcmUnsigned, 24, false),
        codecs::CODEC_TYPE_PCM_U32LE => pcm(Encoding::PcmUnsigned, 32, false),
        codecs::CODEC_TYPE_PCM_U16BE => pcm(Encoding::PcmUnsigned, 16, true),
        codecs::CODEC_TYPE_PCM_U24BE => pcm(Encoding::PcmUnsigned, 24, true),
        codecs::CODEC_TYPE_PCM_U32BE => pcm(Encoding::PcmUnsigned, 32, true),
        codecs::CODEC_TYPE_PCM_F32LE => pcm(Encoding::PcmFloat, 32, false),
        codecs::CODEC_TYPE_PCM_F64LE => pcm(Encoding::PcmFloat, 64, false),
        codecs::CODEC_TYPE_PCM_F32BE => pcm(Encoding::PcmFloat, 32, true),
        codecs::CODEC_TYPE_PCM_F64BE => pcm(Encoding::PcmFloat, 64, true),
        codecs::CODEC_TYPE_PCM_ALAW => pcm(Encoding::ALaw, 8, false),
        codecs::CODEC_TYPE_PCM_MULAW => pcm(Encoding::ULaw, 8, false),
        other => AudioFormat::compressed(codec_short_name(other), sample_rate, bits, channels),
    };

    format.validate()?;
    Ok(format)
}

/// 检测位深度（容器未声明时按编解码器推断）
fn detect_bit_depth(params: &CodecParameters) -> Option<u16> {
    if let Some(bits) = params.bits_per_sample {
        return Some(bits as u16);
    }
    if let Some(bits) = params.bits_per_coded_sample {
        return Some(bits as u16);
    }
    match params.codec {
        codecs::CODEC_TYPE_PCM_S16LE | codecs::CODEC_TYPE_PCM_S16BE => Some(16),
        codecs::CODEC_TYPE_PCM_S24LE | codecs::CODEC_TYPE_PCM_S24BE => Some(24),
        codecs::CODEC_TYPE_PCM_S32LE
        | codecs::CODEC_TYPE_PCM_S32BE
        | codecs::CODEC_TYPE_PCM_F32LE
        | codecs::CODEC_TYPE_PCM_F32BE => Some(32),
        _ => None,
    }
}

/// symphonia逐包解码的样本来源
struct SymphoniaSource {
    reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    skipped_packets: usize,
}

impl SampleSource for SymphoniaSource {
    fn next_chunk(&mut self) -> SoundResult<Option<Vec<f32>>> {
        loop {
            let packet = handle_packet_error!(self.reader.next_packet(), self);

            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    if decoded.frames() == 0 {
                        continue;
                    }
                    let mut buffer =
                        SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
                    buffer.copy_interleaved_ref(decoded);
                    return Ok(Some(buffer.samples().to_vec()));
                }
                Err(SymphoniaError::DecodeError(_)) => {
                    // 损坏包：跳过并计数
                    self.skipped_packets += 1;
                }
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(None);
                }
                Err(e) => return Err(map_symphonia_error("解码失败 / decode failed", e)),
            }
        }
    }

    fn skipped_packets(&self) -> usize {
        self.skipped_packets
    }
}
