//! 内存资源上下文

use super::{LoaderContext, Resource, split_resource_name};
use std::collections::BTreeMap;
use std::io::{self, Cursor};
use std::sync::Arc;

/// 内存中的命名字节块集合
///
/// 同一份字节可被多次打开，每次得到独立的游标。
#[derive(Debug, Clone, Default)]
pub struct MemoryContext {
    label: String,
    entries: BTreeMap<String, Arc<[u8]>>,
}

impl MemoryContext {
    /// 创建空的内存上下文
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            entries: BTreeMap::new(),
        }
    }

    /// 添加资源（同名覆盖）
    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> &mut Self {
        self.entries.insert(name.into(), bytes.into());
        self
    }

    /// 链式添加资源
    pub fn with(mut self, name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        self.insert(name, bytes);
        self
    }

    /// 资源数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LoaderContext for MemoryContext {
    fn describe(&self) -> String {
        format!("memory:{}", self.label)
    }

    fn open(&self, name: &str) -> io::Result<Option<Resource>> {
        if split_resource_name(name).is_none() {
            return Ok(None);
        }
        Ok(self.entries.get(name).map(|bytes| {
            tracing::trace!(resource = name, len = bytes.len(), "opened memory resource");
            Resource::new(
                name,
                Box::new(Cursor::new(Arc::clone(bytes))),
                Some(bytes.len() as u64),
            )
        }))
    }

    fn list(&self) -> io::Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}
