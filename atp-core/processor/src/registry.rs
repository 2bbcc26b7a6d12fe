//! 处理器注册表
//!
//! 执行后端在启动时以服务名注册，停止时注销；框架按服务名把请求分派给后端。

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::{ProcessorError, Request, Response, Result, TestProcessor};

/// 处理器注册表
#[derive(Default)]
pub struct ProcessorRegistry {
    /// 服务名 -> 处理器
    processors: RwLock<HashMap<String, Arc<dyn TestProcessor>>>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册处理器，服务名已被占用时失败
    pub async fn register(&self, service: &str, processor: Arc<dyn TestProcessor>) -> Result<()> {
        let mut processors = self.processors.write().await;

        if let Some(existing) = processors.get(service) {
            debug!("服务 {} 已由 {} 提供", service, existing.name());
            return Err(ProcessorError::ProcessorAlreadyRegistered(service.to_string()));
        }

        info!("注册处理器: {} -> {}", service, processor.name());
        processors.insert(service.to_string(), processor);
        Ok(())
    }

    /// 注销处理器，返回被移除的处理器
    pub async fn unregister(&self, service: &str) -> Result<Arc<dyn TestProcessor>> {
        let removed = self
            .processors
            .write()
            .await
            .remove(service)
            .ok_or_else(|| ProcessorError::ProcessorNotFound(service.to_string()))?;

        info!("注销处理器: {} -> {}", service, removed.name());
        Ok(removed)
    }

    pub async fn is_registered(&self, service: &str) -> bool {
        self.processors.read().await.contains_key(service)
    }

    /// 把请求分派给服务对应的处理器
    ///
    /// 执行期间不持有注册表锁，注册和注销不会被长时间运行的请求阻塞。
    pub async fn dispatch(&self, service: &str, request: &Request) -> Result<Response> {
        let processor = self
            .processors
            .read()
            .await
            .get(service)
            .cloned()
            .ok_or_else(|| ProcessorError::ProcessorNotFound(service.to_string()))?;

        debug!("分派请求: {} -> {}", service, processor.name());
        Ok(processor.execute_test(request).await)
    }
}
