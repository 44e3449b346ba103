//! MIDI模块
//!
//! MIDI文件格式、序列与音色库的加载。
//!
//! **使用 `MidiResourceLoader`** - MIDI文件格式与序列采用错误驱动回退，
//! 音色库采用返回值（`Option`）驱动回退

pub mod format;
mod hydra;
pub mod loader;
pub mod platform;
pub mod sequence;
pub mod soundbank;
pub mod spi;
pub mod system;

pub use format::{Division, MidiFileFormat};
pub use loader::MidiResourceLoader;
pub use platform::{PlatformMidiResourceReader, PlatformSoundbankResourceReader};
pub use sequence::{ChannelMessage, MetaEvent, MidiEvent, MidiMessage, Sequence, Track};
pub use soundbank::{InstrumentInfo, SampleBank, Soundbank, SoundbankData, SoundbankInfo};
pub use spi::{MidiResourceReader, SoundbankResourceReader};
