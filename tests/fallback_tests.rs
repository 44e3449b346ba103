//! 提供者回退策略测试
//!
//! 使用脚本化的模拟提供者验证两种回退策略：
//! 错误驱动（音频格式、音频流、MIDI格式、序列）与哨兵驱动（音色库）。

use sound_resources::error::{Capability, SoundError, SoundResult};
use sound_resources::midi::{
    Division, MidiFileFormat, MidiResourceLoader, MidiResourceReader, SampleBank, Sequence,
    Soundbank, SoundbankData, SoundbankInfo, SoundbankResourceReader,
};
use sound_resources::registry::{Provider, ProviderRegistry};
use sound_resources::resource::{LoaderContext, MemoryContext};
use sound_resources::sampled::{
    AudioFileFormat, AudioFileType, AudioFormat, AudioInputStream, AudioResourceLoader,
    AudioResourceReader, Encoding, SampleSource,
};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn log(msg_zh: impl AsRef<str>, msg_en: impl AsRef<str>) {
    println!("{} / {}", msg_zh.as_ref(), msg_en.as_ref());
}

/// 模拟提供者的预设结果
#[derive(Debug, Clone, Copy)]
enum Outcome {
    /// 格式类失败（可恢复）
    FormatFail,
    /// I/O类失败（致命）
    IoFail,
    /// 成功，携带可识别的标记
    Succeed(u32),
}

/// 音色库模拟提供者的预设结果
#[derive(Debug, Clone, Copy)]
enum BankOutcome {
    Decline,
    FormatFail,
    IoFail,
    Succeed(u32),
}

struct Scripted {
    name: &'static str,
    outcome: Outcome,
    calls: Arc<AtomicUsize>,
}

struct ScriptedBank {
    name: &'static str,
    outcome: BankOutcome,
    calls: Arc<AtomicUsize>,
}

impl Scripted {
    fn new(name: &'static str, outcome: Outcome) -> (Arc<Self>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = Arc::new(Self {
            name,
            outcome,
            calls: Arc::clone(&calls),
        });
        (provider, calls)
    }

    fn run<T>(&self, midi: bool, succeed: impl FnOnce(u32) -> T) -> SoundResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            Outcome::FormatFail if midi => Err(SoundError::InvalidMidiData(self.name.to_string())),
            Outcome::FormatFail => Err(SoundError::UnsupportedAudioFile(self.name.to_string())),
            Outcome::IoFail => Err(SoundError::Io(io::Error::other(self.name))),
            Outcome::Succeed(tag) => Ok(succeed(tag)),
        }
    }
}

impl ScriptedBank {
    fn new(name: &'static str, outcome: BankOutcome) -> (Arc<Self>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = Arc::new(Self {
            name,
            outcome,
            calls: Arc::clone(&calls),
        });
        (provider, calls)
    }
}

impl Provider for Scripted {
    fn name(&self) -> &str {
        self.name
    }
}

impl Provider for ScriptedBank {
    fn name(&self) -> &str {
        self.name
    }
}

struct Silence;

impl SampleSource for Silence {
    fn next_chunk(&mut self) -> SoundResult<Option<Vec<f32>>> {
        Ok(None)
    }
}

fn tagged_format(tag: u32) -> AudioFormat {
    AudioFormat::pcm(Encoding::PcmSigned, tag, 16, 1, false)
}

impl AudioResourceReader for Scripted {
    fn audio_file_format(&self, _: &dyn LoaderContext, _: &str) -> SoundResult<AudioFileFormat> {
        self.run(false, |tag| {
            AudioFileFormat::new(AudioFileType::Wave, tagged_format(tag), None, None)
        })
    }

    fn audio_input_stream(
        &self,
        _: &dyn LoaderContext,
        _: &str,
    ) -> SoundResult<AudioInputStream> {
        self.run(false, |tag| {
            AudioInputStream::new(tagged_format(tag), Some(0), Box::new(Silence))
        })
    }
}

impl MidiResourceReader for Scripted {
    fn midi_file_format(&self, _: &dyn LoaderContext, _: &str) -> SoundResult<MidiFileFormat> {
        self.run(true, |tag| {
            MidiFileFormat::new(1, Division::Ppq, tag as u16, None, None)
        })
    }

    fn sequence(&self, _: &dyn LoaderContext, _: &str) -> SoundResult<Sequence> {
        self.run(true, |tag| Sequence::new(Division::Ppq, tag as u16, Vec::new()))
    }
}

impl SoundbankResourceReader for ScriptedBank {
    fn soundbank(&self, _: &dyn LoaderContext, _: &str) -> SoundResult<Option<Soundbank>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            BankOutcome::Decline => Ok(None),
            BankOutcome::FormatFail => Err(SoundError::InvalidMidiData(self.name.to_string())),
            BankOutcome::IoFail => Err(SoundError::Io(io::Error::other(self.name))),
            BankOutcome::Succeed(tag) => {
                let bank = SampleBank {
                    format: tagged_format(tag),
                    samples: Vec::new(),
                };
                Ok(Some(Soundbank::new(
                    SoundbankInfo {
                        name: format!("bank-{tag}"),
                        ..Default::default()
                    },
                    SoundbankData::Sample(Arc::new(bank)),
                )))
            }
        }
    }
}

fn audio_loader(providers: &[Arc<Scripted>]) -> AudioResourceLoader {
    let builder = providers.iter().fold(ProviderRegistry::builder(), |b, p| {
        b.audio_reader(Arc::clone(p) as Arc<dyn AudioResourceReader>)
    });
    AudioResourceLoader::new(Arc::new(builder.build()))
}

fn midi_loader(providers: &[Arc<Scripted>]) -> MidiResourceLoader {
    let builder = providers.iter().fold(ProviderRegistry::builder(), |b, p| {
        b.midi_reader(Arc::clone(p) as Arc<dyn MidiResourceReader>)
    });
    MidiResourceLoader::new(Arc::new(builder.build()))
}

fn bank_loader(providers: &[Arc<ScriptedBank>]) -> MidiResourceLoader {
    let builder = providers.iter().fold(ProviderRegistry::builder(), |b, p| {
        b.soundbank_reader(Arc::clone(p) as Arc<dyn SoundbankResourceReader>)
    });
    MidiResourceLoader::new(Arc::new(builder.build()))
}

fn context() -> MemoryContext {
    MemoryContext::new("fallback").with("res", vec![0u8; 4])
}

#[test]
fn test_empty_registry_reports_no_provider_for_every_capability() {
    log("=== 空注册表 ===", "=== Empty registry ===");
    let ctx = context();
    let registry = Arc::new(ProviderRegistry::empty());
    let audio = AudioResourceLoader::new(Arc::clone(&registry));
    let midi = MidiResourceLoader::new(registry);

    let errors = [
        (Capability::AudioFileFormat, audio.audio_file_format(&ctx, "res").unwrap_err()),
        (Capability::AudioInputStream, audio.audio_input_stream(&ctx, "res").unwrap_err()),
        (Capability::MidiFileFormat, midi.midi_file_format(&ctx, "res").unwrap_err()),
        (Capability::Sequence, midi.sequence(&ctx, "res").unwrap_err()),
        (Capability::Soundbank, midi.soundbank(&ctx, "res").unwrap_err()),
    ];

    for (capability, err) in errors {
        log(
            format!("{capability}: {err}"),
            format!("{capability}: {err}"),
        );
        assert!(err.is_format_kind(), "{capability} 应为格式类错误");
        assert!(!err.is_io_kind());
        assert!(matches!(err, SoundError::NoProvider { capability: c } if c == capability));
        assert_eq!(err.to_string(), capability.exhausted_message());
    }
}

#[test]
fn test_exhausted_messages() {
    assert_eq!(
        Capability::AudioFileFormat.exhausted_message(),
        "file is not a supported file type"
    );
    assert_eq!(
        Capability::AudioInputStream.exhausted_message(),
        "could not get audio input stream from input resource"
    );
    assert_eq!(
        Capability::MidiFileFormat.exhausted_message(),
        "resource is not a supported file type"
    );
    assert_eq!(
        Capability::Sequence.exhausted_message(),
        "could not get sequence from resource"
    );
    assert_eq!(
        Capability::Soundbank.exhausted_message(),
        "cannot get soundbank from resource"
    );
}

#[test]
fn test_format_failure_falls_through_to_next_provider() {
    log("=== 格式失败后回退 ===", "=== Fallback after format failure ===");
    let ctx = context();
    let (a, a_calls) = Scripted::new("a", Outcome::FormatFail);
    let (b, b_calls) = Scripted::new("b", Outcome::Succeed(22050));

    let audio = audio_loader(&[Arc::clone(&a), Arc::clone(&b)]);
    let format = audio.audio_file_format(&ctx, "res").unwrap();
    assert_eq!(format.format.sample_rate, 22050);
    let stream = audio.audio_input_stream(&ctx, "res").unwrap();
    assert_eq!(stream.source_format().sample_rate, 22050);

    let midi = midi_loader(&[a, b]);
    assert_eq!(midi.midi_file_format(&ctx, "res").unwrap().resolution, 22050u32 as u16);
    assert_eq!(midi.sequence(&ctx, "res").unwrap().resolution(), 22050u32 as u16);

    assert_eq!(a_calls.load(Ordering::SeqCst), 4);
    assert_eq!(b_calls.load(Ordering::SeqCst), 4);
}

#[test]
fn test_io_failure_aborts_without_calling_next_provider() {
    log("=== I/O失败立即中止 ===", "=== I/O failure aborts ===");
    let ctx = context();
    let (a, a_calls) = Scripted::new("a", Outcome::IoFail);
    let (b, b_calls) = Scripted::new("b", Outcome::Succeed(8000));

    let audio = audio_loader(&[Arc::clone(&a), Arc::clone(&b)]);
    let midi = midi_loader(&[a, b]);

    let errors = [
        audio.audio_file_format(&ctx, "res").unwrap_err(),
        audio.audio_input_stream(&ctx, "res").unwrap_err(),
        midi.midi_file_format(&ctx, "res").unwrap_err(),
        midi.sequence(&ctx, "res").unwrap_err(),
    ];
    for err in &errors {
        assert!(err.is_io_kind(), "应传播I/O错误: {err}");
        assert!(matches!(err, SoundError::Io(_)));
    }

    assert_eq!(a_calls.load(Ordering::SeqCst), 4);
    assert_eq!(b_calls.load(Ordering::SeqCst), 0, "后续提供者不应被调用");
}

#[test]
fn test_all_format_failures_become_no_provider() {
    let ctx = context();
    let (a, _) = Scripted::new("a", Outcome::FormatFail);
    let (b, b_calls) = Scripted::new("b", Outcome::FormatFail);
    let audio = audio_loader(&[a, b]);

    let err = audio.audio_file_format(&ctx, "res").unwrap_err();
    assert!(matches!(
        err,
        SoundError::NoProvider {
            capability: Capability::AudioFileFormat
        }
    ));
    assert_eq!(b_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_registration_order_is_respected() {
    let ctx = context();
    let (a, a_calls) = Scripted::new("a", Outcome::Succeed(11025));
    let (b, b_calls) = Scripted::new("b", Outcome::Succeed(48000));

    let first = audio_loader(&[Arc::clone(&a), Arc::clone(&b)]);
    assert_eq!(first.audio_file_format(&ctx, "res").unwrap().format.sample_rate, 11025);
    assert_eq!(b_calls.load(Ordering::SeqCst), 0);

    let reversed = audio_loader(&[b, a]);
    assert_eq!(reversed.audio_file_format(&ctx, "res").unwrap().format.sample_rate, 48000);
    assert_eq!(a_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_repeated_calls_are_independent() {
    let ctx = context();
    let (a, a_calls) = Scripted::new("a", Outcome::FormatFail);
    let (b, _) = Scripted::new("b", Outcome::Succeed(32000));
    let audio = audio_loader(&[a, b]);

    let first = audio.audio_file_format(&ctx, "res").unwrap();
    let second = audio.audio_file_format(&ctx, "res").unwrap();
    assert_eq!(first, second);
    // 每次调用都从头尝试
    assert_eq!(a_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_soundbank_decline_falls_through() {
    log("=== 音色库哨兵回退 ===", "=== Soundbank sentinel fallback ===");
    let ctx = context();
    let (a, a_calls) = ScriptedBank::new("a", BankOutcome::Decline);
    let (b, _) = ScriptedBank::new("b", BankOutcome::Succeed(7));

    let bank = bank_loader(&[a, b]).soundbank(&ctx, "res").unwrap();
    assert_eq!(bank.name(), "bank-7");
    assert_eq!(a_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_soundbank_any_error_aborts() {
    let ctx = context();
    for outcome in [BankOutcome::FormatFail, BankOutcome::IoFail] {
        let (a, _) = ScriptedBank::new("a", outcome);
        let (b, b_calls) = ScriptedBank::new("b", BankOutcome::Succeed(1));

        let err = bank_loader(&[a, b]).soundbank(&ctx, "res").unwrap_err();
        log(
            format!("{outcome:?} → {err}"),
            format!("{outcome:?} → {err}"),
        );
        // 与错误驱动策略不同：格式类错误也不继续回退
        assert!(!matches!(err, SoundError::NoProvider { .. }));
        assert_eq!(b_calls.load(Ordering::SeqCst), 0, "后续提供者不应被调用");
    }
}

#[test]
fn test_soundbank_all_decline_is_no_provider() {
    let ctx = context();
    let (a, _) = ScriptedBank::new("a", BankOutcome::Decline);
    let (b, _) = ScriptedBank::new("b", BankOutcome::Decline);

    let err = bank_loader(&[a, b]).soundbank(&ctx, "res").unwrap_err();
    assert!(err.is_format_kind());
    assert_eq!(err.to_string(), "cannot get soundbank from resource");
}

#[test]
fn test_missing_resource_is_not_masked_by_platform_providers() {
    log("=== 资源不存在 ===", "=== Missing resource ===");
    let ctx = MemoryContext::new("empty");
    let audio = AudioResourceLoader::with_platform_defaults();
    let midi = MidiResourceLoader::with_platform_defaults();

    let errors = [
        audio.audio_file_format(&ctx, "missing.wav").unwrap_err(),
        audio.audio_input_stream(&ctx, "missing.wav").unwrap_err(),
        midi.midi_file_format(&ctx, "missing.mid").unwrap_err(),
        midi.sequence(&ctx, "missing.mid").unwrap_err(),
        midi.soundbank(&ctx, "missing.sf2").unwrap_err(),
    ];
    for err in &errors {
        assert!(
            matches!(err, SoundError::ResourceNotFound { loader, .. } if loader == "memory:empty"),
            "应为ResourceNotFound: {err}"
        );
        assert!(err.is_io_kind());
    }
    assert_eq!(
        errors[0].to_string(),
        "could not load resource \"missing.wav\" with loader \"memory:empty\""
    );
}
