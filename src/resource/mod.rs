//! 资源加载上下文模块
//!
//! 把 (加载上下文, 资源名) 解析为字节流。提供者通过这里打开资源，
//! 门面本身从不直接接触字节。
//!
//! - [`DirectoryContext`] - 按顺序搜索的若干根目录
//! - [`MemoryContext`] - 内存中的命名字节块（嵌入资源、测试）
//! - [`ContextChain`] - 按顺序委派给子上下文，首个命中者胜出

mod chain;
mod directory;
mod memory;

pub use chain::ContextChain;
pub use directory::DirectoryContext;
pub use memory::MemoryContext;

use crate::error::{self, SoundResult};
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};

/// 资源字节流需要满足的能力（可读、可定位、可跨线程移交）
pub trait ResourceStream: Read + Seek + Send + Sync {}

impl<T: Read + Seek + Send + Sync> ResourceStream for T {}

/// 已打开的资源
///
/// 持有底层字节流。读取类操作在单次提供者调用内消费并释放它；
/// 流式解码操作则把它移交给返回的音频流。
pub struct Resource {
    name: String,
    stream: Box<dyn ResourceStream>,
    byte_len: Option<u64>,
}

impl Resource {
    /// 创建资源
    pub fn new(name: impl Into<String>, stream: Box<dyn ResourceStream>, byte_len: Option<u64>) -> Self {
        Self {
            name: name.into(),
            stream,
            byte_len,
        }
    }

    /// 资源名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 字节长度（未知时为None）
    pub fn byte_len(&self) -> Option<u64> {
        self.byte_len
    }

    /// 资源名的扩展名（小写），用作探测提示
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.name)
    }

    /// 读取全部字节（消费资源）
    pub fn read_all(mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.byte_len.unwrap_or(0) as usize);
        self.stream.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name)
            .field("byte_len", &self.byte_len)
            .finish_non_exhaustive()
    }
}

impl Read for Resource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Seek for Resource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.stream.seek(pos)
    }
}

/// 加载上下文：按名字解析资源
///
/// 实现必须无状态地响应每次调用，可被多线程同时使用。
pub trait LoaderContext: Send + Sync {
    /// 上下文标识（出现在“资源未找到”错误中）
    fn describe(&self) -> String;

    /// 打开资源
    ///
    /// - `Ok(Some(_))` - 找到并打开
    /// - `Ok(None)` - 该上下文中不存在此资源
    /// - `Err(_)` - 资源存在但打开失败
    fn open(&self, name: &str) -> io::Result<Option<Resource>>;

    /// 列出上下文可见的全部资源名（排序）
    fn list(&self) -> io::Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// 打开资源，不存在时返回 I/O 类的 `ResourceNotFound`
pub fn open_required(context: &dyn LoaderContext, name: &str) -> SoundResult<Resource> {
    match context.open(name)? {
        Some(resource) => Ok(resource),
        None => {
            tracing::trace!(resource = name, loader = %context.describe(), "resource not found");
            Err(error::resource_not_found(name, context.describe()))
        }
    }
}

/// 校验资源名并拆分为路径段
///
/// 资源名以 `/` 分隔且必须是相对名。绝对名、空段、`..`、反斜杠或
/// 盘符都视为不存在，因此返回None。
pub fn split_resource_name(name: &str) -> Option<Vec<&str>> {
    if name.is_empty() || name.starts_with('/') || name.contains('\\') || name.contains(':') {
        return None;
    }
    let mut segments = Vec::new();
    for segment in name.split('/') {
        match segment {
            "" | ".." => return None,
            "." => continue,
            s => segments.push(s),
        }
    }
    if segments.is_empty() {
        None
    } else {
        Some(segments)
    }
}

/// 提取资源名的扩展名（小写）
pub fn extension_of(name: &str) -> Option<String> {
    let file = name.rsplit('/').next()?;
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}
