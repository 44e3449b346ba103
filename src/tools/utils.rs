//! 工具函数模块
//!
//! 资源种类识别、注册表与上下文构建等通用工具函数。

use super::cli::ResourceKind;
use super::constants::kinds;
use crate::error::SoundResult;
use crate::registry::{ProviderRegistry, ServiceManifest};
use crate::resource::{self, DirectoryContext};
use std::path::{Path, PathBuf};

/// 按扩展名确定资源种类（`Auto` 时）
pub fn resolve_kind(kind: ResourceKind, name: &str) -> ResourceKind {
    if kind != ResourceKind::Auto {
        return kind;
    }
    match resource::extension_of(name) {
        Some(ext) if kinds::MIDI_EXTENSIONS.contains(&ext.as_str()) => ResourceKind::Midi,
        Some(ext) if kinds::SOUNDBANK_EXTENSIONS.contains(&ext.as_str()) => {
            ResourceKind::Soundbank
        }
        _ => ResourceKind::Audio,
    }
}

/// 加载提供者注册表：指定清单时按清单构建，否则使用平台默认
pub fn load_registry(manifest: Option<&Path>) -> SoundResult<ProviderRegistry> {
    match manifest {
        Some(path) => ProviderRegistry::from_manifest(&ServiceManifest::load(path)?),
        None => Ok(ProviderRegistry::platform()),
    }
}

/// 由根目录列表构建加载上下文
pub fn directory_context(roots: &[PathBuf]) -> DirectoryContext {
    DirectoryContext::new(roots.iter().cloned())
}

/// 样本绝对值峰值
#[inline]
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}

/// 将线性值转换为dB值
#[inline]
pub fn linear_to_db(value: f64) -> f64 {
    if value > 0.0 {
        20.0 * value.log10()
    } else {
        -f64::INFINITY
    }
}

/// 截断过长文本（按字符）
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
