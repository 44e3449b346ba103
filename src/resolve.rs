//! 提供者解析算法
//!
//! 门面对每种能力执行同一个“首个成功者胜出”循环，但有两种失败处置策略：
//!
//! - **错误驱动** ([`first_success`])：格式类错误继续尝试下一个提供者，
//!   I/O类错误立即中止（即使后面的提供者本可以成功）。
//! - **哨兵驱动** ([`first_present`])：提供者返回 `Ok(None)` 表示“不是我的格式”，
//!   循环继续；任何 `Err`（无论格式类还是I/O类）都立即中止。
//!
//! 两种策略都在列表耗尽时合成 [`SoundError::NoProvider`]。

use crate::error::{Capability, Recovery, SoundError, SoundResult};
use crate::registry::Provider;
use std::sync::Arc;
use tracing::{debug, warn};

/// 错误驱动的回退循环
pub fn first_success<P, T, F>(
    capability: Capability,
    providers: &[Arc<P>],
    mut invoke: F,
) -> SoundResult<T>
where
    P: Provider + ?Sized,
    F: FnMut(&P) -> SoundResult<T>,
{
    for provider in providers {
        match invoke(provider.as_ref()) {
            Ok(result) => {
                debug!(%capability, provider = provider.name(), "provider succeeded");
                return Ok(result);
            }
            Err(err) => match err.recovery() {
                Recovery::Recoverable => {
                    debug!(%capability, provider = provider.name(), error = %err, "provider rejected resource, trying next");
                }
                Recovery::Fatal => {
                    warn!(%capability, provider = provider.name(), error = %err, "provider failed, aborting resolution");
                    return Err(err);
                }
            },
        }
    }

    debug!(%capability, candidates = providers.len(), "no provider recognized the resource");
    Err(SoundError::no_provider(capability))
}

/// 哨兵驱动的回退循环
pub fn first_present<P, T, F>(
    capability: Capability,
    providers: &[Arc<P>],
    mut invoke: F,
) -> SoundResult<T>
where
    P: Provider + ?Sized,
    F: FnMut(&P) -> SoundResult<Option<T>>,
{
    for provider in providers {
        match invoke(provider.as_ref()) {
            Ok(Some(result)) => {
                debug!(%capability, provider = provider.name(), "provider succeeded");
                return Ok(result);
            }
            Ok(None) => {
                debug!(%capability, provider = provider.name(), "provider declined resource, trying next");
            }
            Err(err) => {
                warn!(%capability, provider = provider.name(), error = %err, "provider failed, aborting resolution");
                return Err(err);
            }
        }
    }

    debug!(%capability, candidates = providers.len(), "no provider recognized the resource");
    Err(SoundError::no_provider(capability))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::resource_not_found;
    use std::cell::Cell;

    struct Named(&'static str);

    impl Provider for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    fn providers(n: usize) -> Vec<Arc<Named>> {
        const NAMES: [&str; 3] = ["a", "b", "c"];
        NAMES[..n].iter().map(|&name| Arc::new(Named(name))).collect()
    }

    #[test]
    fn test_first_success_skips_format_failures() {
        let list = providers(3);
        let result = first_success(Capability::AudioFileFormat, &list, |p| match p.0 {
            "a" => Err(SoundError::UnsupportedAudioFile("not mine".into())),
            other => Ok(other),
        });
        assert_eq!(result.unwrap(), "b");
    }

    #[test]
    fn test_first_success_aborts_on_io_failure() {
        let list = providers(2);
        let calls = Cell::new(0);
        let result: SoundResult<()> = first_success(Capability::Sequence, &list, |_| {
            calls.set(calls.get() + 1);
            Err(resource_not_found("x.mid", "memory:test"))
        });
        assert!(result.unwrap_err().is_io_kind());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_first_present_aborts_on_any_error() {
        let list = providers(2);
        let calls = Cell::new(0);
        let result: SoundResult<()> = first_present(Capability::Soundbank, &list, |_| {
            calls.set(calls.get() + 1);
            Err(SoundError::InvalidMidiData("bad bank".into()))
        });
        assert!(matches!(result, Err(SoundError::InvalidMidiData(_))));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_exhausted_lists_synthesize_no_provider() {
        let empty: Vec<Arc<Named>> = Vec::new();
        let err = first_success::<_, (), _>(Capability::MidiFileFormat, &empty, |_| Ok(()))
            .unwrap_err();
        assert!(matches!(
            err,
            SoundError::NoProvider {
                capability: Capability::MidiFileFormat
            }
        ));

        let list = providers(2);
        let err = first_present::<_, (), _>(Capability::Soundbank, &list, |_| Ok(None)).unwrap_err();
        assert!(err.is_format_kind());
        assert_eq!(err.to_string(), "cannot get soundbank from resource");
    }
}
