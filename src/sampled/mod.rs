//! 采样音频模块
//!
//! 音频文件格式探测与流式解码。
//!
//! **使用 `AudioResourceLoader`** - 按注册顺序尝试各 [`AudioResourceReader`]，首个成功者胜出

// 内部子模块（仅供平台子系统使用）
mod error_handling;

pub mod format;
pub mod loader;
pub mod platform;
pub mod spi;
pub mod stream;
pub mod system;
pub mod wav;

pub use format::{AudioFileFormat, AudioFileType, AudioFormat, Encoding};
pub use loader::AudioResourceLoader;
pub use platform::PlatformAudioResourceReader;
pub use spi::AudioResourceReader;
pub use stream::{AudioInputStream, SampleSource};
pub use wav::WavAudioResourceReader;
