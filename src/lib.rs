//! Sound Resources
//!
//! 通过可插拔的读取器，从命名资源加载音频文件格式、音频流、MIDI文件格式、
//! MIDI序列和音色库。
//!
//! ## 核心特性
//! - 按注册顺序尝试提供者，首个成功者胜出
//! - 格式类失败继续回退，I/O类失败立即中止
//! - 音色库采用 `Option` 哨兵回退
//! - 依赖注入的提供者注册表，可由JSON服务清单配置
//! - 平台默认提供者：hound / symphonia / midly / rustysynth

pub mod error;
pub mod midi;
pub mod registry;
pub mod resolve;
pub mod resource;
pub mod sampled;
pub mod tools;

// 重新导出核心类型
pub use error::{Capability, ErrorCategory, Recovery, SoundError, SoundResult};
pub use midi::{MidiFileFormat, MidiResourceLoader, Sequence, Soundbank};
pub use registry::{Provider, ProviderRegistry, ServiceManifest};
pub use resource::{ContextChain, DirectoryContext, LoaderContext, MemoryContext, Resource};
pub use sampled::{AudioFileFormat, AudioFormat, AudioInputStream, AudioResourceLoader};
