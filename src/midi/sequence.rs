//! MIDI序列模块
//!
//! 与解析库无关的序列表示：绝对tick时间戳的事件，每条音轨以结束标记收尾。

use super::format::Division;
use serde::Serialize;

/// 默认速度：120 BPM（每四分音符500000微秒）
pub const DEFAULT_TEMPO_US: u32 = 500_000;

/// 通道消息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChannelMessage {
    NoteOff { key: u8, velocity: u8 },
    NoteOn { key: u8, velocity: u8 },
    Aftertouch { key: u8, pressure: u8 },
    Controller { controller: u8, value: u8 },
    ProgramChange { program: u8 },
    ChannelAftertouch { pressure: u8 },
    /// 14位弯音值，8192为居中
    PitchBend { value: u16 },
}

/// 元事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MetaEvent {
    TrackName(String),
    Text(String),
    Copyright(String),
    Lyric(String),
    Marker(String),
    InstrumentName(String),
    /// 每四分音符微秒数
    Tempo(u32),
    TimeSignature {
        numerator: u8,
        denominator_pow2: u8,
        clocks_per_click: u8,
        notated_32nds_per_quarter: u8,
    },
    KeySignature {
        sharps: i8,
        minor: bool,
    },
    EndOfTrack,
    /// 未单独建模的元事件
    Other {
        kind: &'static str,
    },
}

/// MIDI消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MidiMessage {
    Channel {
        channel: u8,
        message: ChannelMessage,
    },
    SysEx {
        data: Vec<u8>,
    },
    Escape {
        data: Vec<u8>,
    },
    Meta {
        event: MetaEvent,
    },
}

impl MidiMessage {
    pub fn is_end_of_track(&self) -> bool {
        matches!(
            self,
            MidiMessage::Meta {
                event: MetaEvent::EndOfTrack
            }
        )
    }
}

/// 带绝对时间戳的MIDI事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MidiEvent {
    pub tick: u64,
    pub message: MidiMessage,
}

/// 音轨
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Track {
    events: Vec<MidiEvent>,
}

impl Track {
    /// 由事件列表构建音轨（按tick排序，缺少结束标记时自动补上）
    pub fn new(mut events: Vec<MidiEvent>) -> Self {
        // 稳定排序，同一tick的事件保持原顺序
        events.sort_by_key(|e| e.tick);

        let last_tick = events.last().map_or(0, |e| e.tick);
        match events.iter().position(|e| e.message.is_end_of_track()) {
            Some(pos) if pos + 1 == events.len() => {}
            Some(pos) => {
                // 结束标记之后仍有事件：移到最后
                let mut end = events.remove(pos);
                end.tick = last_tick;
                events.push(end);
            }
            None => events.push(MidiEvent {
                tick: last_tick,
                message: MidiMessage::Meta {
                    event: MetaEvent::EndOfTrack,
                },
            }),
        }

        Self { events }
    }

    pub fn events(&self) -> &[MidiEvent] {
        &self.events
    }

    /// 事件数（含结束标记）
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// 音轨长度（tick）
    pub fn tick_length(&self) -> u64 {
        self.events.last().map_or(0, |e| e.tick)
    }

    /// 音轨名（首个TrackName元事件）
    pub fn name(&self) -> Option<&str> {
        self.events.iter().find_map(|e| match &e.message {
            MidiMessage::Meta {
                event: MetaEvent::TrackName(name),
            } => Some(name.as_str()),
            _ => None,
        })
    }
}

/// MIDI序列
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sequence {
    division: Division,
    resolution: u16,
    tracks: Vec<Track>,
}

impl Sequence {
    pub fn new(division: Division, resolution: u16, tracks: Vec<Track>) -> Self {
        Self {
            division,
            resolution,
            tracks,
        }
    }

    pub fn division(&self) -> Division {
        self.division
    }

    pub fn resolution(&self) -> u16 {
        self.resolution
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// 序列长度（tick，取最长音轨）
    pub fn tick_length(&self) -> u64 {
        self.tracks.iter().map(Track::tick_length).max().unwrap_or(0)
    }

    /// 序列时长（微秒）
    ///
    /// PPQ按所有音轨中的速度事件构建速度表；SMPTE按固定帧率换算。
    pub fn microsecond_length(&self) -> u64 {
        let ticks = self.tick_length();
        if self.resolution == 0 {
            return 0;
        }

        if let Some(fps) = self.division.frames_per_second() {
            let ticks_per_second = fps * self.resolution as f64;
            return (ticks as f64 * 1_000_000.0 / ticks_per_second).round() as u64;
        }

        let mut tempo_changes: Vec<(u64, u32)> = self
            .tracks
            .iter()
            .flat_map(|t| t.events())
            .filter_map(|e| match e.message {
                MidiMessage::Meta {
                    event: MetaEvent::Tempo(us),
                } => Some((e.tick, us)),
                _ => None,
            })
            .collect();
        tempo_changes.sort_by_key(|&(tick, _)| tick);

        let resolution = self.resolution as f64;
        let mut total_us = 0.0;
        let mut last_tick = 0u64;
        let mut tempo = DEFAULT_TEMPO_US;
        for (tick, us) in tempo_changes {
            if tick >= ticks {
                break;
            }
            total_us += (tick - last_tick) as f64 * tempo as f64 / resolution;
            last_tick = tick;
            tempo = us;
        }
        total_us += (ticks - last_tick) as f64 * tempo as f64 / resolution;
        total_us.round() as u64
    }

    /// 事件总数
    pub fn event_count(&self) -> usize {
        self.tracks.iter().map(Track::len).sum()
    }
}
