//! 目录资源上下文
//!
//! 多个根目录按顺序搜索，行为类似类路径条目。

use super::{LoaderContext, Resource, split_resource_name};
use std::collections::BTreeSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 按顺序搜索的根目录集合
#[derive(Debug, Clone)]
pub struct DirectoryContext {
    roots: Vec<PathBuf>,
}

impl DirectoryContext {
    /// 从根目录列表创建（顺序即搜索优先级）
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// 单根目录
    pub fn single(root: impl Into<PathBuf>) -> Self {
        Self {
            roots: vec![root.into()],
        }
    }

    /// 根目录列表
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// 解析资源名在某个根下的实际路径（不检查存在性）
    fn resolve_in(root: &Path, segments: &[&str]) -> PathBuf {
        segments.iter().fold(root.to_path_buf(), |p, s| p.join(s))
    }
}

impl LoaderContext for DirectoryContext {
    fn describe(&self) -> String {
        let roots: Vec<String> = self
            .roots
            .iter()
            .map(|r| r.display().to_string())
            .collect();
        format!("dir:[{}]", roots.join(", "))
    }

    fn open(&self, name: &str) -> io::Result<Option<Resource>> {
        let Some(segments) = split_resource_name(name) else {
            return Ok(None);
        };

        for root in &self.roots {
            let path = Self::resolve_in(root, &segments);
            if !path.is_file() {
                continue;
            }
            let file = File::open(&path)?;
            let len = file.metadata().map(|m| m.len()).ok();
            tracing::trace!(resource = name, path = %path.display(), "opened file resource");
            return Ok(Some(Resource::new(name, Box::new(file), len)));
        }

        Ok(None)
    }

    fn list(&self) -> io::Result<Vec<String>> {
        let mut names = BTreeSet::new();

        for root in &self.roots {
            if !root.is_dir() {
                continue;
            }
            for entry in WalkDir::new(root).follow_links(true) {
                let entry = entry.map_err(io::Error::other)?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let Ok(relative) = entry.path().strip_prefix(root) else {
                    continue;
                };
                let parts: Option<Vec<&str>> =
                    relative.components().map(|c| c.as_os_str().to_str()).collect();
                // 非UTF-8路径无法作为资源名访问，跳过
                if let Some(parts) = parts {
                    names.insert(parts.join("/"));
                }
            }
        }

        Ok(names.into_iter().collect())
    }
}
