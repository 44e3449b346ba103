//! MIDI平台子系统
//!
//! 基于midly解析标准MIDI文件（含RIFF RMID封装），基于rustysynth读取SoundFont 2音色库。
//! 音色库读取按固定顺序尝试内部读取器（SoundFont → 音频采样），都不识别时报错。

use super::format::{Division, MidiFileFormat};
use super::hydra;
use super::sequence::{ChannelMessage, MetaEvent, MidiEvent, MidiMessage, Sequence, Track};
use super::soundbank::{InstrumentInfo, SampleBank, Soundbank, SoundbankData, SoundbankInfo};
use crate::error::{self, SoundResult};
use crate::resource::Resource;
use crate::sampled::system as sampled_system;
use midly::{Format, Fps, MetaMessage, Smf, Timing, TrackEventKind};
use rustysynth::SoundFont;
use std::io::Cursor;
use std::sync::Arc;
use tracing::trace;

/// 获取MIDI文件格式
pub fn midi_file_format(bytes: &[u8], byte_length: Option<u64>) -> SoundResult<MidiFileFormat> {
    let smf = parse_smf(bytes)?;
    let file_type = match smf.header.format {
        Format::SingleTrack => 0,
        Format::Parallel => 1,
        Format::Sequential => 2,
    };
    let sequence = convert(&smf);

    let mut format = MidiFileFormat::new(
        file_type,
        sequence.division(),
        sequence.resolution(),
        byte_length,
        Some(sequence.microsecond_length()),
    );
    format
        .properties
        .insert("tracks".to_string(), sequence.tracks().len().to_string());
    if let Some(title) = sequence.tracks().first().and_then(Track::name) {
        format
            .properties
            .insert("title".to_string(), title.to_string());
    }
    if let Some(copyright) = first_copyright(&sequence) {
        format.properties.insert("copyright".to_string(), copyright);
    }
    Ok(format)
}

/// 解析MIDI序列
pub fn sequence(bytes: &[u8]) -> SoundResult<Sequence> {
    let smf = parse_smf(bytes)?;
    Ok(convert(&smf))
}

/// 读取音色库
///
/// 依次尝试SoundFont 2和音频采样两种内部读取器；都不识别时返回 `InvalidMidiData`。
pub fn soundbank(bytes: Vec<u8>, name: &str) -> SoundResult<Soundbank> {
    if let Some(bank) = read_sound_font(&bytes)? {
        return Ok(bank);
    }
    if let Some(bank) = read_audio_sample(bytes, name)? {
        return Ok(bank);
    }
    Err(error::invalid_midi("无法识别的音色库数据", name))
}

fn parse_smf(bytes: &[u8]) -> SoundResult<Smf<'_>> {
    let payload = unwrap_rmid(bytes)?;
    Ok(Smf::parse(payload)?)
}

/// RIFF RMID封装：取出其中的 "data" 块；非RMID数据原样返回
fn unwrap_rmid(bytes: &[u8]) -> SoundResult<&[u8]> {
    if !is_riff(bytes, b"RMID") {
        return Ok(bytes);
    }

    let mut offset: usize = 12;
    while offset.checked_add(8).is_some_and(|header_end| header_end <= bytes.len()) {
        let id = &bytes[offset..offset + 4];
        let size = u32::from_le_bytes([
            bytes[offset + 4],
            bytes[offset + 5],
            bytes[offset + 6],
            bytes[offset + 7],
        ]) as usize;
        let start = offset + 8;
        let end = start.saturating_add(size);
        if id == b"data" {
            if end > bytes.len() {
                return Err(error::invalid_midi("RMID数据块被截断", format!("{end} > {}", bytes.len())));
            }
            trace!(offset = start, size, "unwrapped RMID data chunk");
            return Ok(&bytes[start..end]);
        }
        // RIFF块按偶数字节对齐
        offset = end.saturating_add(size & 1);
    }

    Err(error::invalid_midi("RMID中缺少data块", "RIFF RMID"))
}

fn is_riff(bytes: &[u8], form: &[u8; 4]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == form
}

fn convert(smf: &Smf<'_>) -> Sequence {
    let (division, resolution) = match smf.header.timing {
        Timing::Metrical(ticks) => (Division::Ppq, ticks.as_int()),
        Timing::Timecode(fps, subframes) => {
            let division = match fps {
                Fps::Fps24 => Division::Smpte24,
                Fps::Fps25 => Division::Smpte25,
                Fps::Fps29 => Division::Smpte30Drop,
                Fps::Fps30 => Division::Smpte30,
            };
            (division, subframes as u16)
        }
    };

    let tracks = smf
        .tracks
        .iter()
        .map(|events| {
            let mut tick = 0u64;
            let converted = events
                .iter()
                .map(|event| {
                    tick += event.delta.as_int() as u64;
                    MidiEvent {
                        tick,
                        message: convert_kind(&event.kind),
                    }
                })
                .collect();
            Track::new(converted)
        })
        .collect();

    Sequence::new(division, resolution, tracks)
}

fn convert_kind(kind: &TrackEventKind<'_>) -> MidiMessage {
    match kind {
        TrackEventKind::Midi { channel, message } => MidiMessage::Channel {
            channel: channel.as_int(),
            message: convert_channel(message),
        },
        TrackEventKind::SysEx(data) => MidiMessage::SysEx {
            data: data.to_vec(),
        },
        TrackEventKind::Escape(data) => MidiMessage::Escape {
            data: data.to_vec(),
        },
        TrackEventKind::Meta(meta) => MidiMessage::Meta {
            event: convert_meta(meta),
        },
    }
}

fn convert_channel(message: &midly::MidiMessage) -> ChannelMessage {
    match message {
        midly::MidiMessage::NoteOff { key, vel } => ChannelMessage::NoteOff {
            key: key.as_int(),
            velocity: vel.as_int(),
        },
        midly::MidiMessage::NoteOn { key, vel } => ChannelMessage::NoteOn {
            key: key.as_int(),
            velocity: vel.as_int(),
        },
        midly::MidiMessage::Aftertouch { key, vel } => ChannelMessage::Aftertouch {
            key: key.as_int(),
            pressure: vel.as_int(),
        },
        midly::MidiMessage::Controller { controller, value } => ChannelMessage::Controller {
            controller: controller.as_int(),
            value: value.as_int(),
        },
        midly::MidiMessage::ProgramChange { program } => ChannelMessage::ProgramChange {
            program: program.as_int(),
        },
        midly::MidiMessage::ChannelAftertouch { vel } => ChannelMessage::ChannelAftertouch {
            pressure: vel.as_int(),
        },
        midly::MidiMessage::PitchBend { bend } => ChannelMessage::PitchBend {
            value: bend.0.as_int(),
        },
    }
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn convert_meta(meta: &MetaMessage<'_>) -> MetaEvent {
    match meta {
        MetaMessage::TrackName(name) => MetaEvent::TrackName(text(name)),
        MetaMessage::Text(t) => MetaEvent::Text(text(t)),
        MetaMessage::Copyright(t) => MetaEvent::Copyright(text(t)),
        MetaMessage::Lyric(t) => MetaEvent::Lyric(text(t)),
        MetaMessage::Marker(t) => MetaEvent::Marker(text(t)),
        MetaMessage::InstrumentName(t) => MetaEvent::InstrumentName(text(t)),
        MetaMessage::Tempo(us) => MetaEvent::Tempo(us.as_int()),
        MetaMessage::TimeSignature(numerator, denominator_pow2, clocks_per_click, notated) => {
            MetaEvent::TimeSignature {
                numerator: *numerator,
                denominator_pow2: *denominator_pow2,
                clocks_per_click: *clocks_per_click,
                notated_32nds_per_quarter: *notated,
            }
        }
        MetaMessage::KeySignature(sharps, minor) => MetaEvent::KeySignature {
            sharps: *sharps,
            minor: *minor,
        },
        MetaMessage::EndOfTrack => MetaEvent::EndOfTrack,
        MetaMessage::TrackNumber(_) => MetaEvent::Other {
            kind: "track_number",
        },
        MetaMessage::CuePoint(_) => MetaEvent::Other { kind: "cue_point" },
        MetaMessage::ProgramName(_) => MetaEvent::Other {
            kind: "program_name",
        },
        MetaMessage::DeviceName(_) => MetaEvent::Other {
            kind: "device_name",
        },
        MetaMessage::MidiChannel(_) => MetaEvent::Other {
            kind: "midi_channel",
        },
        MetaMessage::MidiPort(_) => MetaEvent::Other { kind: "midi_port" },
        MetaMessage::SmpteOffset(_) => MetaEvent::Other {
            kind: "smpte_offset",
        },
        MetaMessage::SequencerSpecific(_) => MetaEvent::Other {
            kind: "sequencer_specific",
        },
        MetaMessage::Unknown(..) => MetaEvent::Other { kind: "unknown" },
    }
}

fn first_copyright(sequence: &Sequence) -> Option<String> {
    sequence
        .tracks()
        .iter()
        .flat_map(Track::events)
        .find_map(|e| match &e.message {
            MidiMessage::Meta {
                event: MetaEvent::Copyright(c),
            } => Some(c.clone()),
            _ => None,
        })
}

/// SoundFont 2读取器：非 RIFF/sfbk 数据返回None
fn read_sound_font(bytes: &[u8]) -> SoundResult<Option<Soundbank>> {
    if !is_riff(bytes, b"sfbk") {
        return Ok(None);
    }

    hydra::validate(bytes)?;
    let mut reader = bytes;
    let sound_font = SoundFont::new(&mut reader)
        .map_err(|e| error::invalid_midi("SoundFont解析失败", e))?;

    let info = sound_font.get_info();
    let version = info.get_version();
    let mut instruments: Vec<InstrumentInfo> = sound_font
        .get_presets()
        .iter()
        .map(|preset| InstrumentInfo {
            name: preset.get_name().to_string(),
            bank: preset.get_bank_number().max(0) as u32,
            program: preset.get_patch_number().max(0) as u32,
        })
        .collect();
    instruments.sort_by_key(|i| (i.bank, i.program));

    let bank_info = SoundbankInfo {
        name: info.get_bank_name().to_string(),
        vendor: info.get_author().to_string(),
        description: info.get_comments().to_string(),
        version: format!("{}.{}", version.get_major(), version.get_minor()),
        instruments,
    };
    trace!(name = %bank_info.name, presets = bank_info.instruments.len(), "loaded SoundFont");

    Ok(Some(Soundbank::new(
        bank_info,
        SoundbankData::SoundFont(Arc::new(sound_font)),
    )))
}

/// 资源名的文件主干：去掉目录与最后一个扩展名
fn file_stem(name: &str) -> &str {
    name.rsplit('/')
        .next()
        .map(|file| file.rsplit_once('.').map_or(file, |(stem, _)| stem))
        .filter(|s| !s.is_empty())
        .unwrap_or(name)
}

/// 音频采样读取器：把可解码的音频包装成单乐器音色库；不是音频时返回None
fn read_audio_sample(bytes: Vec<u8>, name: &str) -> SoundResult<Option<Soundbank>> {
    let byte_len = bytes.len() as u64;
    let resource = Resource::new(name, Box::new(Cursor::new(bytes)), Some(byte_len));

    let (format, samples) = match sampled_system::decode_all(resource) {
        Ok(decoded) => decoded,
        Err(e) if e.is_format_kind() => {
            trace!(name, error = %e, "not an audio sample soundbank");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let stem = file_stem(name).to_string();

    let info = SoundbankInfo {
        name: stem.clone(),
        vendor: String::new(),
        description: format!("audio sample: {format}"),
        version: String::new(),
        instruments: vec![InstrumentInfo {
            name: stem,
            bank: 0,
            program: 0,
        }],
    };
    Ok(Some(Soundbank::new(
        info,
        SoundbankData::Sample(Arc::new(SampleBank { format, samples })),
    )))
}
