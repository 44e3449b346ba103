//! 输出格式化模块
//!
//! 负责探测结果、资源列表和提供者注册表的文本/表格/JSON输出。

use super::constants::defaults;
use super::utils;
use crate::midi::{MidiFileFormat, SoundbankInfo};
use crate::registry::ProviderEntry;
use crate::sampled::AudioFileFormat;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL};
use serde::Serialize;
use std::fmt::Write as _;

/// 探测结果
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeReport {
    Audio {
        name: String,
        format: AudioFileFormat,
    },
    Midi {
        name: String,
        format: MidiFileFormat,
        tracks: usize,
        events: usize,
    },
    Soundbank {
        name: String,
        data: &'static str,
        info: SoundbankInfo,
    },
}

/// 解码统计
#[derive(Debug, Clone, Serialize)]
pub struct DecodeSummary {
    pub name: String,
    pub format: String,
    pub frames: u64,
    pub expected_frames: Option<u64>,
    pub peak: f32,
    pub skipped_packets: usize,
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

fn push_properties<'a>(out: &mut String, properties: impl IntoIterator<Item = (&'a String, &'a String)>) {
    for (key, value) in properties {
        let _ = writeln!(out, "   {key}: {value}");
    }
}

/// 探测结果的文本输出
pub fn format_probe_text(report: &ProbeReport) -> String {
    let mut out = String::new();
    match report {
        ProbeReport::Audio { name, format } => {
            let _ = writeln!(out, "[AUDIO] {name}");
            let _ = writeln!(out, "   类型 / Type: {}", format.file_type);
            let _ = writeln!(out, "   格式 / Format: {}", format.format);
            if let Some(frames) = format.frame_length {
                let _ = writeln!(out, "   帧数 / Frames: {frames}");
            }
            if let Some(seconds) = format.duration_seconds() {
                let _ = writeln!(out, "   时长 / Duration: {seconds:.3} s");
            }
            if let Some(bytes) = format.byte_length {
                let _ = writeln!(out, "   大小 / Size: {bytes} bytes");
            }
            push_properties(&mut out, &format.properties);
        }
        ProbeReport::Midi {
            name,
            format,
            tracks,
            events,
        } => {
            let _ = writeln!(out, "[MIDI] {name}");
            let _ = writeln!(out, "   类型 / Type: SMF {}", format.file_type);
            let _ = writeln!(
                out,
                "   时间划分 / Division: {} ({})",
                format.division, format.resolution
            );
            let _ = writeln!(out, "   音轨 / Tracks: {tracks}, 事件 / Events: {events}");
            if let Some(seconds) = format.duration_seconds() {
                let _ = writeln!(out, "   时长 / Duration: {seconds:.3} s");
            }
            push_properties(
                &mut out,
                format.properties.iter().filter(|(k, _)| k.as_str() != "tracks"),
            );
        }
        ProbeReport::Soundbank { name, data, info } => {
            let _ = writeln!(out, "[SOUNDBANK] {name} ({data})");
            let _ = writeln!(out, "   名称 / Name: {}", info.name);
            if !info.vendor.is_empty() {
                let _ = writeln!(out, "   作者 / Vendor: {}", info.vendor);
            }
            if !info.version.is_empty() {
                let _ = writeln!(out, "   版本 / Version: {}", info.version);
            }
            if !info.description.is_empty() {
                let _ = writeln!(
                    out,
                    "   描述 / Description: {}",
                    utils::truncate(&info.description, defaults::MAX_CELL_CHARS)
                );
            }
            let _ = writeln!(out, "   乐器 / Instruments: {}", info.instruments.len());
        }
    }
    out
}

/// 探测结果的JSON输出
pub fn format_probe_json(report: &ProbeReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// 音色库乐器表
pub fn instrument_table(info: &SoundbankInfo) -> Table {
    let mut table = new_table(vec!["Bank / 音色组", "Program / 音色", "Name / 名称"]);
    for instrument in &info.instruments {
        table.add_row(vec![
            Cell::new(instrument.bank).set_alignment(CellAlignment::Right),
            Cell::new(instrument.program).set_alignment(CellAlignment::Right),
            Cell::new(utils::truncate(&instrument.name, defaults::MAX_CELL_CHARS)),
        ]);
    }
    table
}

/// 资源列表表格
pub fn resource_table(names: &[String]) -> Table {
    let mut table = new_table(vec!["#", "Resource / 资源", "Kind / 种类"]);
    for (index, name) in names.iter().enumerate() {
        let kind = utils::resolve_kind(super::cli::ResourceKind::Auto, name);
        table.add_row(vec![
            Cell::new(index + 1).set_alignment(CellAlignment::Right),
            Cell::new(name),
            Cell::new(kind.name()),
        ]);
    }
    table
}

/// 提供者注册表表格
pub fn provider_table(entries: &[ProviderEntry]) -> Table {
    let mut table = new_table(vec!["Kind / 种类", "Order / 顺序", "Provider / 提供者"]);
    for entry in entries {
        table.add_row(vec![
            Cell::new(entry.kind.name()),
            Cell::new(entry.position + 1).set_alignment(CellAlignment::Right),
            Cell::new(&entry.name),
        ]);
    }
    table
}

/// 解码统计文本
pub fn format_decode_summary(summary: &DecodeSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[DECODE] {}", summary.name);
    let _ = writeln!(out, "   格式 / Format: {}", summary.format);
    match summary.expected_frames {
        Some(expected) => {
            let _ = writeln!(out, "   帧数 / Frames: {} / {expected}", summary.frames);
        }
        None => {
            let _ = writeln!(out, "   帧数 / Frames: {}", summary.frames);
        }
    }
    let _ = writeln!(
        out,
        "   峰值 / Peak: {:.6} ({:.2} dBFS)",
        summary.peak,
        utils::linear_to_db(summary.peak as f64)
    );
    if summary.skipped_packets > 0 {
        let _ = writeln!(
            out,
            "   [WARNING] 跳过损坏的数据包 / Skipped corrupted packets: {}",
            summary.skipped_packets
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::Division;
    use crate::registry::ProviderKind;
    use crate::sampled::{AudioFileType, AudioFormat, Encoding};

    #[test]
    fn test_audio_probe_text_and_json() {
        let format = AudioFileFormat::new(
            AudioFileType::Wave,
            AudioFormat::pcm(Encoding::PcmSigned, 44100, 16, 2, false),
            Some(176_444),
            Some(44100),
        );
        let report = ProbeReport::Audio {
            name: "a.wav".to_string(),
            format,
        };
        let text = format_probe_text(&report);
        assert!(text.contains("[AUDIO] a.wav"));
        assert!(text.contains("Frames: 44100"));

        let json: serde_json::Value =
            serde_json::from_str(&format_probe_json(&report).unwrap()).unwrap();
        assert_eq!(json["kind"], "audio");
        assert_eq!(json["format"]["format"]["sample_rate"], 44100);
    }

    #[test]
    fn test_midi_probe_text_hides_track_property() {
        let mut format = MidiFileFormat::new(1, Division::Ppq, 480, None, Some(2_000_000));
        format
            .properties
            .insert("tracks".to_string(), "2".to_string());
        format
            .properties
            .insert("title".to_string(), "Song".to_string());
        let text = format_probe_text(&ProbeReport::Midi {
            name: "s.mid".to_string(),
            format,
            tracks: 2,
            events: 10,
        });
        assert!(text.contains("title: Song"));
        assert!(!text.contains("tracks: 2"));
        assert!(text.contains("2.000 s"));
    }

    #[test]
    fn test_provider_table_rows() {
        let entries = vec![ProviderEntry {
            kind: ProviderKind::Audio,
            position: 0,
            name: "wav".to_string(),
        }];
        let rendered = provider_table(&entries).to_string();
        assert!(rendered.contains("wav"));
        assert!(rendered.contains("audio"));
    }
}
