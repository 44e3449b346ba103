//! 上下文委派链

use super::{LoaderContext, Resource};
use std::collections::BTreeSet;
use std::io;
use std::sync::Arc;

/// 按顺序委派给子上下文，首个找到资源的上下文胜出
#[derive(Clone, Default)]
pub struct ContextChain {
    contexts: Vec<Arc<dyn LoaderContext>>,
}

impl ContextChain {
    /// 创建空链
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加子上下文（越早追加优先级越高）
    pub fn push(mut self, context: Arc<dyn LoaderContext>) -> Self {
        self.contexts.push(context);
        self
    }

    /// 子上下文数量
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

impl LoaderContext for ContextChain {
    fn describe(&self) -> String {
        let parts: Vec<String> = self.contexts.iter().map(|c| c.describe()).collect();
        format!("chain:[{}]", parts.join(" -> "))
    }

    fn open(&self, name: &str) -> io::Result<Option<Resource>> {
        for context in &self.contexts {
            if let Some(resource) = context.open(name)? {
                return Ok(Some(resource));
            }
        }
        Ok(None)
    }

    fn list(&self) -> io::Result<Vec<String>> {
        let mut names = BTreeSet::new();
        for context in &self.contexts {
            names.extend(context.list()?);
        }
        Ok(names.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::MemoryContext;

    #[test]
    fn test_first_context_wins() {
        let parent = MemoryContext::new("parent").with("a.bin", vec![1u8]);
        let child = MemoryContext::new("child")
            .with("a.bin", vec![2u8])
            .with("b.bin", vec![3u8]);
        let chain = ContextChain::new()
            .push(Arc::new(parent))
            .push(Arc::new(child));

        assert_eq!(chain.open("a.bin").unwrap().unwrap().read_all().unwrap(), vec![1]);
        assert_eq!(chain.open("b.bin").unwrap().unwrap().read_all().unwrap(), vec![3]);
        assert!(chain.open("c.bin").unwrap().is_none());
        assert_eq!(chain.list().unwrap(), vec!["a.bin", "b.bin"]);
        assert_eq!(chain.describe(), "chain:[memory:parent -> memory:child]");
    }
}
