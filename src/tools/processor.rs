//! 子命令处理模块
//!
//! 每个子命令构建注册表与加载上下文，再通过门面完成实际工作。

use super::cli::{AppConfig, CliCommand, ResourceKind};
use super::formatter::{self, DecodeSummary, ProbeReport};
use super::utils;
use crate::error::SoundResult;
use crate::midi::MidiResourceLoader;
use crate::registry::ProviderRegistry;
use crate::resource::{DirectoryContext, LoaderContext};
use crate::sampled::AudioResourceLoader;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// 执行配置中的子命令
pub fn run_command(config: &AppConfig) -> Result<()> {
    let registry = Arc::new(
        utils::load_registry(config.manifest.as_deref()).context("加载提供者注册表失败 / Failed to load provider registry")?,
    );

    match &config.command {
        CliCommand::Probe {
            name,
            roots,
            kind,
            json,
        } => {
            let context = utils::directory_context(roots);
            let report = probe(registry, &context, name, *kind)?;
            if *json {
                println!("{}", formatter::format_probe_json(&report)?);
            } else {
                print!("{}", formatter::format_probe_text(&report));
                if config.verbose
                    && let ProbeReport::Soundbank { info, .. } = &report
                    && !info.instruments.is_empty()
                {
                    println!("{}", formatter::instrument_table(info));
                }
            }
            Ok(())
        }
        CliCommand::Decode { name, roots } => {
            let context = utils::directory_context(roots);
            let summary = decode(registry, &context, name, config.verbose)?;
            print!("{}", formatter::format_decode_summary(&summary));
            Ok(())
        }
        CliCommand::List { roots } => list(roots),
        CliCommand::Providers => {
            println!("{}", formatter::provider_table(&registry.entries()));
            Ok(())
        }
    }
}

/// 探测资源
pub fn probe(
    registry: Arc<ProviderRegistry>,
    context: &dyn LoaderContext,
    name: &str,
    kind: ResourceKind,
) -> SoundResult<ProbeReport> {
    match utils::resolve_kind(kind, name) {
        ResourceKind::Midi => {
            let loader = MidiResourceLoader::new(registry);
            let format = loader.midi_file_format(context, name)?;
            let sequence = loader.sequence(context, name)?;
            Ok(ProbeReport::Midi {
                name: name.to_string(),
                format,
                tracks: sequence.tracks().len(),
                events: sequence.event_count(),
            })
        }
        ResourceKind::Soundbank => {
            let bank = MidiResourceLoader::new(registry).soundbank(context, name)?;
            Ok(ProbeReport::Soundbank {
                name: name.to_string(),
                data: bank.data().kind(),
                info: bank.info().clone(),
            })
        }
        ResourceKind::Audio | ResourceKind::Auto => {
            let format = AudioResourceLoader::new(registry).audio_file_format(context, name)?;
            Ok(ProbeReport::Audio {
                name: name.to_string(),
                format,
            })
        }
    }
}

/// 流式解码音频资源直到结束
pub fn decode(
    registry: Arc<ProviderRegistry>,
    context: &dyn LoaderContext,
    name: &str,
    verbose: bool,
) -> SoundResult<DecodeSummary> {
    let mut stream = AudioResourceLoader::new(registry).audio_input_stream(context, name)?;
    let format = stream.source_format().to_string();
    let mut peak = 0.0f32;
    let mut last_reported = 0u32;

    while let Some(chunk) = stream.next_chunk()? {
        peak = peak.max(utils::peak(&chunk));
        if verbose {
            let percent = (stream.progress() * 100.0) as u32;
            if percent >= last_reported + 10 {
                last_reported = percent - percent % 10;
                println!("[PROCESSING] {name}: {last_reported}%");
            }
        }
    }

    Ok(DecodeSummary {
        name: name.to_string(),
        format,
        frames: stream.frames_read(),
        expected_frames: stream.frame_length(),
        peak,
        skipped_packets: stream.skipped_packets(),
    })
}

fn list(roots: &[PathBuf]) -> Result<()> {
    let context = DirectoryContext::new(roots.iter().cloned());
    let names = context
        .list()
        .with_context(|| format!("列出资源失败 / Failed to list resources in {}", context.describe()))?;
    if names.is_empty() {
        println!("[INFO] 未找到资源 / No resources found in {}", context.describe());
    } else {
        println!("{}", formatter::resource_table(&names));
    }
    Ok(())
}
