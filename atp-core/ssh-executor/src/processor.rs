//! SSH 测试处理器
//!
//! 组合端点解析、会话建立与命令执行，并以 `TestProcessor` 形式接入框架。

use std::sync::Arc;

use async_trait::async_trait;
use atp_processor::{
    Logger, ProcessorRegistry, PropertyStore, Request, Response, TestProcessor,
};

use crate::config::ExecutorConfig;
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::executor::CommandExecutor;
use crate::transport::Transport;

/// 注册表中的服务名
pub const SERVICE_NAME: &str = "ssh";

/// 日志组件名
pub const COMPONENT_NAME: &str = "SshTestProcessor";

/// SSH 测试处理器
pub struct SshTestProcessor {
    transport: Arc<dyn Transport>,
    properties: Arc<dyn PropertyStore>,
    logger: Arc<dyn Logger>,
    executor: CommandExecutor,
}

impl SshTestProcessor {
    pub fn new(
        transport: Arc<dyn Transport>,
        properties: Arc<dyn PropertyStore>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self::with_config(transport, properties, logger, ExecutorConfig::default())
    }

    pub fn with_config(
        transport: Arc<dyn Transport>,
        properties: Arc<dyn PropertyStore>,
        logger: Arc<dyn Logger>,
        config: ExecutorConfig,
    ) -> Self {
        let executor = CommandExecutor::new(config, Arc::clone(&logger), COMPONENT_NAME);
        Self {
            transport,
            properties,
            logger,
            executor,
        }
    }

    /// 执行请求，返回带错误类别的结果
    pub async fn run(&self, request: &Request) -> Result<String> {
        let endpoint = Endpoint::parse(&request.endpoint)?;

        let mut session = self.transport.connect(&endpoint).await?;

        let timeout = self.executor.config().resolve_response_timeout(
            self.properties.as_ref(),
            self.logger.as_ref(),
            COMPONENT_NAME,
        );
        let result = self
            .executor
            .execute(&mut *session, &request.test_block, timeout)
            .await;

        session.disconnect().await;
        result
    }

    /// 以服务名注册到处理器注册表
    pub async fn register(self: Arc<Self>, registry: &ProcessorRegistry) -> atp_processor::Result<()> {
        registry.register(SERVICE_NAME, self).await
    }

    /// 从处理器注册表注销
    pub async fn deregister(registry: &ProcessorRegistry) -> atp_processor::Result<()> {
        registry.unregister(SERVICE_NAME).await.map(|_| ())
    }
}

#[async_trait]
impl TestProcessor for SshTestProcessor {
    async fn execute_test(&self, request: &Request) -> Response {
        match self.run(request).await {
            Ok(text) => Response::success(text),
            Err(e) => {
                self.logger.error(&e.to_string(), COMPONENT_NAME);
                Response::failure()
            }
        }
    }

    fn name(&self) -> &str {
        COMPONENT_NAME
    }
}
