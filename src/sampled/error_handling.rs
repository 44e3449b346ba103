//! 错误处理模块
//!
//! symphonia错误到 [`SoundError`] 的统一映射。
//! 注意：此模块仅供平台子系统内部使用

use crate::error::{self, SoundError};
use symphonia::core::errors::Error as SymphoniaError;

/// 把symphonia错误映射为格式类或I/O类错误
///
/// 字节已经解析到（资源已打开）时，数据截断也算格式问题；
/// 只有真正的读取失败才是I/O类。
pub(super) fn map_symphonia_error(context: &str, err: SymphoniaError) -> SoundError {
    match err {
        SymphoniaError::IoError(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            error::unsupported_audio(context, "数据被截断 / truncated data")
        }
        SymphoniaError::IoError(e) => SoundError::Io(e),
        other => error::unsupported_audio(context, other),
    }
}

/// 🔧 逐包解码循环中的symphonia错误处理宏
///
/// - `ResetRequired` - 重置解码器并继续
/// - `UnexpectedEof` - 正常结束，返回 `Ok(None)`
/// - `DecodeError` - 跳过损坏包，计数后继续
/// - 其他错误 - 映射后返回
macro_rules! handle_packet_error {
    ($result:expr, $source:expr) => {
        match $result {
            Ok(value) => value,
            Err(symphonia::core::errors::Error::ResetRequired) => {
                $source.decoder.reset();
                continue;
            }
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                return Ok(None);
            }
            Err(symphonia::core::errors::Error::DecodeError(_)) => {
                $source.skipped_packets += 1;
                continue;
            }
            Err(e) => return Err(map_symphonia_error("解码失败 / decode failed", e)),
        }
    };
}

// 使宏在当前模块可见，但不对外暴露
pub(super) use handle_packet_error;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncation_is_format_kind() {
        let e = map_symphonia_error(
            "probe",
            SymphoniaError::IoError(std::io::Error::from(std::io::ErrorKind::UnexpectedEof)),
        );
        assert!(e.is_format_kind());
    }

    #[test]
    fn test_read_failure_is_io_kind() {
        let e = map_symphonia_error(
            "probe",
            SymphoniaError::IoError(std::io::Error::from(std::io::ErrorKind::PermissionDenied)),
        );
        assert!(e.is_io_kind());
    }

    #[test]
    fn test_unsupported_is_format_kind() {
        let e = map_symphonia_error("probe", SymphoniaError::Unsupported("no reader"));
        assert!(e.is_format_kind());
        assert!(e.to_string().contains("probe"));
    }
}
