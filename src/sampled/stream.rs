//! 音频输入流模块
//!
//! 流式解码返回的 [`AudioInputStream`]，底层样本来源由各提供者实现。

use super::format::AudioFormat;
use crate::error::SoundResult;
use std::fmt;

/// 样本来源trait
///
/// 由提供者实现，按块产出交错的 f32 样本。
///
/// # 数据格式约定
///
/// - **交错样本**：`[L0, R0, L1, R1, ...]`
/// - **变长块**：块大小由编解码器/容器决定，不保证固定长度
/// - **EOF 语义**：返回 `Ok(None)` 后不会再被调用
pub trait SampleSource: Send {
    /// 获取下一个音频块
    fn next_chunk(&mut self) -> SoundResult<Option<Vec<f32>>>;

    /// 跳过的损坏包数量
    fn skipped_packets(&self) -> usize {
        0
    }
}

/// 已解码的音频输入流
///
/// 提供者把资源字节流的所有权移交到这里，调用方持有本流期间底层资源保持打开，
/// drop 时释放。
pub struct AudioInputStream {
    format: AudioFormat,
    source_format: AudioFormat,
    frame_length: Option<u64>,
    frames_read: u64,
    finished: bool,
    source: Box<dyn SampleSource>,
}

impl AudioInputStream {
    /// 创建音频输入流
    ///
    /// `source_format` 描述源数据，输出格式固定为交错 f32。
    pub fn new(
        source_format: AudioFormat,
        frame_length: Option<u64>,
        source: Box<dyn SampleSource>,
    ) -> Self {
        Self {
            format: AudioFormat::decoded_f32(source_format.sample_rate, source_format.channels),
            source_format,
            frame_length,
            frames_read: 0,
            finished: false,
            source,
        }
    }

    /// 输出样本格式（交错 f32）
    pub fn format(&self) -> &AudioFormat {
        &self.format
    }

    /// 源数据格式
    pub fn source_format(&self) -> &AudioFormat {
        &self.source_format
    }

    /// 总帧数（未知时为None）
    pub fn frame_length(&self) -> Option<u64> {
        self.frame_length
    }

    /// 已读取帧数
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// 跳过的损坏包数量
    pub fn skipped_packets(&self) -> usize {
        self.source.skipped_packets()
    }

    /// 读取进度 (0.0-1.0)，总帧数未知时返回 0.0
    pub fn progress(&self) -> f32 {
        match self.frame_length {
            Some(total) if total > 0 => (self.frames_read as f64 / total as f64).min(1.0) as f32,
            _ if self.finished => 1.0,
            _ => 0.0,
        }
    }

    /// 获取下一个音频块，到达末尾后持续返回 `Ok(None)`
    pub fn next_chunk(&mut self) -> SoundResult<Option<Vec<f32>>> {
        if self.finished {
            return Ok(None);
        }
        match self.source.next_chunk()? {
            Some(samples) => {
                let channels = self.format.channels_usize().max(1);
                self.frames_read += (samples.len() / channels) as u64;
                Ok(Some(samples))
            }
            None => {
                self.finished = true;
                Ok(None)
            }
        }
    }

    /// 读取剩余全部样本
    pub fn read_to_end(&mut self) -> SoundResult<Vec<f32>> {
        let mut all = Vec::new();
        while let Some(chunk) = self.next_chunk()? {
            all.extend_from_slice(&chunk);
        }
        Ok(all)
    }
}

impl fmt::Debug for AudioInputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioInputStream")
            .field("source_format", &self.source_format)
            .field("frame_length", &self.frame_length)
            .field("frames_read", &self.frames_read)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampled::format::Encoding;

    struct Chunks(Vec<Vec<f32>>);

    impl SampleSource for Chunks {
        fn next_chunk(&mut self) -> SoundResult<Option<Vec<f32>>> {
            if self.0.is_empty() {
                Ok(None)
            } else {
                Ok(Some(self.0.remove(0)))
            }
        }
    }

    fn stereo() -> AudioFormat {
        AudioFormat::pcm(Encoding::PcmSigned, 48000, 16, 2, false)
    }

    #[test]
    fn test_frames_and_progress_tracking() {
        let source = Chunks(vec![vec![0.0; 4], vec![0.5; 4]]);
        let mut stream = AudioInputStream::new(stereo(), Some(4), Box::new(source));
        assert_eq!(stream.format().encoding, Encoding::PcmFloat);
        assert_eq!(stream.source_format().sample_size_in_bits, Some(16));

        stream.next_chunk().unwrap();
        assert_eq!(stream.frames_read(), 2);
        assert!((stream.progress() - 0.5).abs() < f32::EPSILON);

        let rest = stream.read_to_end().unwrap();
        assert_eq!(rest, vec![0.5; 4]);
        assert_eq!(stream.frames_read(), 4);
        assert!(stream.next_chunk().unwrap().is_none());
    }

    #[test]
    fn test_unknown_length_progress() {
        let mut stream = AudioInputStream::new(stereo(), None, Box::new(Chunks(vec![vec![0.0; 2]])));
        assert_eq!(stream.progress(), 0.0);
        stream.read_to_end().unwrap();
        assert_eq!(stream.progress(), 1.0);
    }
}
