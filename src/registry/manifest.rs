//! 服务清单
//!
//! JSON文档，按种类列出要启用的内置提供者名，顺序即尝试顺序：
//!
//! ```json
//! {
//!   "audio": ["wav", "platform"],
//!   "midi": ["platform"],
//!   "soundbank": ["platform"]
//! }
//! ```
//!
//! 缺省的种类使用平台默认列表；显式给出空数组则该种类不启用任何提供者。

use super::{PLATFORM_PROVIDER, WAV_PROVIDER};
use crate::error::{SoundError, SoundResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceManifest {
    #[serde(default = "default_audio")]
    pub audio: Vec<String>,
    #[serde(default = "default_platform_only")]
    pub midi: Vec<String>,
    #[serde(default = "default_platform_only")]
    pub soundbank: Vec<String>,
}

fn default_audio() -> Vec<String> {
    vec![WAV_PROVIDER.to_string(), PLATFORM_PROVIDER.to_string()]
}

fn default_platform_only() -> Vec<String> {
    vec![PLATFORM_PROVIDER.to_string()]
}

impl ServiceManifest {
    /// 与 `ProviderRegistry::platform()` 等价的清单
    pub fn platform_default() -> Self {
        Self {
            audio: default_audio(),
            midi: default_platform_only(),
            soundbank: default_platform_only(),
        }
    }

    /// 从JSON文本解析
    pub fn from_json(text: &str) -> SoundResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| SoundError::Config(format!("服务清单解析失败: {e}")))
    }

    /// 从文件读取
    pub fn load(path: impl AsRef<Path>) -> SoundResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded service manifest");
        Self::from_json(&text)
    }

    pub fn to_json_pretty(&self) -> SoundResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SoundError::Config(format!("服务清单序列化失败: {e}")))
    }
}

impl Default for ServiceManifest {
    fn default() -> Self {
        Self::platform_default()
    }
}
